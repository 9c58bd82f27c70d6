//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Number of a seller (unique across the bazaar).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SellerNumber(u32);

/// Number of an article within its seller's namespace.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleNumber(u32);

macro_rules! impl_number_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u32> for $t {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl From<$t> for u32 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<u32>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {:?}: {}", $name, s, e)))?;
                Ok(Self(value))
            }
        }
    };
}

impl_number_newtype!(SellerNumber, "SellerNumber");
impl_number_newtype!(ArticleNumber, "ArticleNumber");

/// Identifier of a physical checkout terminal.
///
/// Zero is reserved: in the ledger file `soldOnPc = 0` means "unsold", so a
/// cash point can never carry it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct CashPointId(u32);

impl CashPointId {
    pub const FIRST: CashPointId = CashPointId(1);

    pub fn new(value: u32) -> Result<Self, DomainError> {
        if value == 0 {
            return Err(DomainError::invalid_id("CashPointId: 0 is reserved for unsold articles"));
        }
        Ok(Self(value))
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for CashPointId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<u32> for CashPointId {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CashPointId> for u32 {
    fn from(value: CashPointId) -> Self {
        value.0
    }
}

/// Identity of an article inside a ledger: `(seller, article)`.
///
/// Ordering is by seller first, then article, which is the order every report
/// lists articles in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArticleKey {
    pub seller: SellerNumber,
    pub article: ArticleNumber,
}

impl ArticleKey {
    pub const fn new(seller: SellerNumber, article: ArticleNumber) -> Self {
        Self { seller, article }
    }
}

impl core::fmt::Display for ArticleKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.seller, self.article)
    }
}
