//! Inclusive number ranges for seller and article numbers.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Inclusive `min..=max` range of valid numbers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberRange {
    min: u32,
    max: u32,
}

impl NumberRange {
    pub const DEFAULT_SELLERS: NumberRange = NumberRange { min: 1, max: 999 };
    pub const DEFAULT_ARTICLES: NumberRange = NumberRange { min: 1, max: 100 };
    /// Largest number a range may include. Reports iterate ranges value by value.
    pub const MAX_NUMBER: u32 = 999_999;

    pub fn new(min: u32, max: u32) -> DomainResult<Self> {
        if max > Self::MAX_NUMBER {
            return Err(DomainError::validation(format!(
                "range maximum {max} exceeds {}",
                Self::MAX_NUMBER
            )));
        }
        if min > max {
            return Err(DomainError::validation(format!(
                "range minimum {min} is greater than maximum {max}"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Number of values in the range.
    pub fn len(&self) -> u32 {
        self.max.saturating_sub(self.min).saturating_add(1)
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> core::ops::RangeInclusive<u32> {
        self.min..=self.max
    }

    /// Returns the same validation `new` applies; used after deserialization.
    pub fn validate(&self) -> DomainResult<()> {
        Self::new(self.min, self.max).map(|_| ())
    }
}
