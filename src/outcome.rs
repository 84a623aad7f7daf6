//! Result of a tolerant call to an upstream service.
//!
//! The pipeline never stops because a search API, a feed, an article page or
//! the language model misbehaved. Instead every such call hands back an
//! [`Outcome`]: either the upstream answered (`Complete`, where an empty
//! value simply means "nothing found"), or it failed and the caller gets a
//! fallback value together with the cause (`Degraded`).

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Complete(T),
    Degraded { value: T, cause: String },
}

impl<T> Outcome<T> {
    pub fn degraded(value: T, cause: impl fmt::Display) -> Self {
        Self::Degraded {
            value,
            cause: cause.to_string(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn cause(&self) -> Option<&str> {
        match self {
            Self::Complete(_) => None,
            Self::Degraded { cause, .. } => Some(cause),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Complete(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Complete(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Complete(value) => Outcome::Complete(f(value)),
            Self::Degraded { value, cause } => Outcome::Degraded {
                value: f(value),
                cause,
            },
        }
    }
}

impl<T: Default> Outcome<T> {
    /// Degraded to the empty value.
    pub fn failed(cause: impl fmt::Display) -> Self {
        Self::degraded(T::default(), cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_complete_is_not_degraded() {
        let outcome: Outcome<Vec<String>> = Outcome::Complete(Vec::new());
        assert!(!outcome.is_degraded());
        assert!(outcome.value().is_empty());
        assert_eq!(outcome.cause(), None);
    }

    #[test]
    fn failed_carries_cause_and_default() {
        let outcome: Outcome<Vec<String>> = Outcome::failed("connection refused");
        assert!(outcome.is_degraded());
        assert_eq!(outcome.cause(), Some("connection refused"));
        assert!(outcome.into_value().is_empty());
    }

    #[test]
    fn map_keeps_degradation() {
        let outcome = Outcome::degraded(2, "stale").map(|n| n * 10);
        assert_eq!(
            outcome,
            Outcome::Degraded {
                value: 20,
                cause: "stale".to_string()
            }
        );
    }
}
