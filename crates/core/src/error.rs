//! Errors raised by the ledger and its building blocks.

use thiserror::Error;

use crate::id::ArticleKey;

pub type DomainResult<T> = Result<T, DomainError>;

/// A rejected ledger operation. Nothing was changed when one of these comes back.
///
/// File and parsing problems are reported by the adapters in `basar-infra`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Bad input: a negative price, an inverted number range, a percentage over 100.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The ledger state does not allow the action, e.g. a cart article sold elsewhere.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("unknown article {0}")]
    UnknownArticle(ArticleKey),

    /// Article already in the cart or already sold.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{ArticleNumber, SellerNumber};

    #[test]
    fn unknown_article_names_the_key() {
        let key = ArticleKey::new(SellerNumber::new(120), ArticleNumber::new(7));
        assert_eq!(
            DomainError::UnknownArticle(key).to_string(),
            format!("unknown article {key}")
        );
    }
}
