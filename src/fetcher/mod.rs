pub mod client;
pub mod errors;
pub mod pipeline;
pub mod types;

pub use client::{fetch, fetch_as, get_client};
pub use errors::FetchError;
pub use types::{Charset, ContentKind, PageResponse};
