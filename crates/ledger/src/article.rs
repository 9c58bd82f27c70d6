use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use basar_core::{ArticleKey, CashPointId, Entity};

/// Where and when an article was sold.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleStamp {
    pub cash_point: CashPointId,
    pub sold_at: DateTime<Utc>,
}

/// Article category, derived from the size field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Articles with a size (clothes, shoes).
    Clothing,
    Miscellaneous,
}

/// One sellable item.
///
/// The sale state can only be changed by the owning ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub key: ArticleKey,
    /// Actual sale price (may be corrected at the checkout).
    pub price: Decimal,
    /// Price from the imported article list; reference for discrepancy reporting.
    pub list_price: Decimal,
    pub size: String,
    pub description: String,
    sale: Option<SaleStamp>,
}

impl Article {
    /// A freshly listed, unsold article. The list price is the given price.
    pub fn new(
        key: ArticleKey,
        price: Decimal,
        size: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key,
            price,
            list_price: price,
            size: size.into(),
            description: description.into(),
            sale: None,
        }
    }

    /// Placeholder for an article scanned at the checkout that was never listed.
    pub fn unregistered(key: ArticleKey) -> Self {
        Self::new(key, Decimal::ZERO, "", "")
    }

    /// Rebuild an article with its full state (persistence adapters).
    pub fn restore(
        key: ArticleKey,
        price: Decimal,
        list_price: Decimal,
        size: impl Into<String>,
        description: impl Into<String>,
        sale: Option<SaleStamp>,
    ) -> Self {
        Self {
            key,
            price,
            list_price,
            size: size.into(),
            description: description.into(),
            sale,
        }
    }

    pub fn sale(&self) -> Option<&SaleStamp> {
        self.sale.as_ref()
    }

    pub fn is_sold(&self) -> bool {
        self.sale.is_some()
    }

    pub fn sold_on(&self) -> Option<CashPointId> {
        self.sale.map(|s| s.cash_point)
    }

    pub fn category(&self) -> Category {
        if self.size.trim().is_empty() {
            Category::Miscellaneous
        } else {
            Category::Clothing
        }
    }

    /// Whether the sale price differs from the listed price.
    pub fn has_price_discrepancy(&self) -> bool {
        self.price != self.list_price
    }

    pub(crate) fn mark_sold(&mut self, stamp: SaleStamp) {
        self.sale = Some(stamp);
    }

    pub(crate) fn clear_sale(&mut self) {
        self.sale = None;
    }
}

impl Entity for Article {
    type Id = ArticleKey;

    fn id(&self) -> Self::Id {
        self.key
    }
}
