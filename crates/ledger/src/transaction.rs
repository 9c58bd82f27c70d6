use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use basar_core::{ArticleKey, CashPointId};

/// A finalized checkout: the articles sold together at one cash point.
///
/// `sum` is the cart total at the moment of finalization. Later returns do not
/// change the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub cash_point: CashPointId,
    pub completed_at: DateTime<Utc>,
    pub articles: Vec<ArticleKey>,
    pub sum: Decimal,
}

impl Transaction {
    pub fn new(
        cash_point: CashPointId,
        completed_at: DateTime<Utc>,
        articles: Vec<ArticleKey>,
        sum: Decimal,
    ) -> Self {
        Self {
            cash_point,
            completed_at,
            articles,
            sum,
        }
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn contains(&self, key: ArticleKey) -> bool {
        self.articles.contains(&key)
    }

    /// Same cash point, timestamp and article list. The sum is not compared.
    pub fn same_sale(&self, other: &Transaction) -> bool {
        self.cash_point == other.cash_point
            && self.completed_at == other.completed_at
            && self.articles == other.articles
    }
}
