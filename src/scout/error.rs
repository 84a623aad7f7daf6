use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("{0} is not set")]
    MissingCredential(&'static str),
}
