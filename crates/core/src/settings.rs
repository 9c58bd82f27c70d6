//! Bazaar settings: deduction, valid number ranges and the local cash point.
//!
//! Settings are read-only for the domain. They are built once (from defaults,
//! a JSON file or the environment) and handed to the components that need them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::{ArticleNumber, CashPointId, SellerNumber};
use crate::range::NumberRange;

pub const ENV_DEDUCTION: &str = "BASAR_DEDUCTION";
pub const ENV_SELLER_MIN: &str = "BASAR_SELLER_MIN";
pub const ENV_SELLER_MAX: &str = "BASAR_SELLER_MAX";
pub const ENV_ARTICLE_MIN: &str = "BASAR_ARTICLE_MIN";
pub const ENV_ARTICLE_MAX: &str = "BASAR_ARTICLE_MAX";
pub const ENV_CASH_POINT: &str = "BASAR_CASH_POINT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Share of the revenue the organizers keep, in percent (0..=100).
    pub deduction_percentage: Decimal,
    pub seller_range: NumberRange,
    pub article_range: NumberRange,
    /// Cash point this installation runs on.
    pub cash_point: CashPointId,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            deduction_percentage: Decimal::from(20),
            seller_range: NumberRange::DEFAULT_SELLERS,
            article_range: NumberRange::DEFAULT_ARTICLES,
            cash_point: CashPointId::FIRST,
        }
    }
}

impl Settings {
    /// Build settings from a key lookup (usually `std::env::var`), falling back
    /// to the defaults for missing keys.
    pub fn from_lookup<F>(lookup: F) -> DomainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let deduction_percentage = match lookup(ENV_DEDUCTION) {
            Some(raw) => crate::money::parse_price(&raw).ok_or_else(|| {
                DomainError::validation(format!("{ENV_DEDUCTION}: not a number: {raw:?}"))
            })?,
            None => defaults.deduction_percentage,
        };

        let number = |key: &str, fallback: u32| -> DomainResult<u32> {
            match lookup(key) {
                Some(raw) => raw.trim().parse::<u32>().map_err(|e| {
                    DomainError::validation(format!("{key}: {raw:?}: {e}"))
                }),
                None => Ok(fallback),
            }
        };

        let seller_range = NumberRange::new(
            number(ENV_SELLER_MIN, defaults.seller_range.min())?,
            number(ENV_SELLER_MAX, defaults.seller_range.max())?,
        )?;
        let article_range = NumberRange::new(
            number(ENV_ARTICLE_MIN, defaults.article_range.min())?,
            number(ENV_ARTICLE_MAX, defaults.article_range.max())?,
        )?;
        let cash_point = CashPointId::new(number(ENV_CASH_POINT, defaults.cash_point.get())?)?;

        let settings = Self {
            deduction_percentage,
            seller_range,
            article_range,
            cash_point,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.deduction_percentage < Decimal::ZERO
            || self.deduction_percentage > Decimal::ONE_HUNDRED
        {
            return Err(DomainError::validation(format!(
                "deduction percentage must be between 0 and 100, got {}",
                self.deduction_percentage
            )));
        }
        self.seller_range.validate()?;
        self.article_range.validate()
    }

    /// Fraction of the revenue paid out to sellers: `1 - deduction / 100`.
    pub fn payout_factor(&self) -> Decimal {
        Decimal::ONE - self.deduction_percentage / Decimal::ONE_HUNDRED
    }

    pub fn is_valid_seller(&self, seller: SellerNumber) -> bool {
        self.seller_range.contains(seller.get())
    }

    pub fn is_valid_article(&self, article: ArticleNumber) -> bool {
        self.article_range.contains(article.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let settings = Settings::from_lookup(|_| None).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn lookup_overrides_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[
            (ENV_DEDUCTION, "12,5"),
            (ENV_SELLER_MAX, "300"),
            (ENV_ARTICLE_MIN, "10"),
            (ENV_CASH_POINT, "4"),
        ]))
        .unwrap();

        assert_eq!(settings.deduction_percentage, dec!(12.5));
        assert_eq!(settings.seller_range.max(), 300);
        assert_eq!(settings.article_range.min(), 10);
        assert_eq!(settings.cash_point.get(), 4);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Settings::from_lookup(lookup_from(&[(ENV_CASH_POINT, "0")])).is_err());
        assert!(Settings::from_lookup(lookup_from(&[(ENV_DEDUCTION, "120")])).is_err());
        assert!(Settings::from_lookup(lookup_from(&[(ENV_SELLER_MIN, "x")])).is_err());
        assert!(
            Settings::from_lookup(lookup_from(&[(ENV_ARTICLE_MIN, "50"), (ENV_ARTICLE_MAX, "5")]))
                .is_err()
        );
    }

    #[test]
    fn payout_factor_is_complement_of_deduction() {
        let settings = Settings {
            deduction_percentage: dec!(20),
            ..Settings::default()
        };
        assert_eq!(settings.payout_factor(), dec!(0.8));
    }
}
