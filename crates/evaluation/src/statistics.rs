//! Summary figures of a ledger snapshot.

use rust_decimal::Decimal;
use serde::Serialize;

use basar_ledger::{ArticleLedger, Category};

/// Key figures of a bazaar.
///
/// Computed in one pass; computing again from the same ledger yields the same
/// values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub revenue: Decimal,
    pub deduction_percentage: Decimal,
    pub deduction: Decimal,
    pub sale_count: usize,
    pub sold_count: usize,
    pub offered_count: usize,
    pub offered_clothing: usize,
    pub offered_misc: usize,
    pub sold_clothing: usize,
    pub sold_misc: usize,
}

impl Statistics {
    pub fn compute(ledger: &ArticleLedger) -> Self {
        let deduction_percentage = ledger.settings().deduction_percentage;
        let mut stats = Self {
            revenue: Decimal::ZERO,
            deduction_percentage,
            deduction: Decimal::ZERO,
            sale_count: ledger.count_transactions(),
            sold_count: 0,
            offered_count: 0,
            offered_clothing: 0,
            offered_misc: 0,
            sold_clothing: 0,
            sold_misc: 0,
        };

        for article in ledger.articles() {
            stats.offered_count += 1;
            let clothing = article.category() == Category::Clothing;
            if clothing {
                stats.offered_clothing += 1;
            } else {
                stats.offered_misc += 1;
            }

            if article.is_sold() {
                stats.revenue += article.price;
                stats.sold_count += 1;
                if clothing {
                    stats.sold_clothing += 1;
                } else {
                    stats.sold_misc += 1;
                }
            }
        }

        stats.deduction = stats.revenue * deduction_percentage / Decimal::ONE_HUNDRED;
        stats
    }

    /// Revenue minus deduction.
    pub fn payout(&self) -> Decimal {
        self.revenue - self.deduction
    }

    pub fn articles_per_sale(&self) -> Decimal {
        ratio(self.sold_count, self.sale_count)
    }

    pub fn sold_percentage(&self) -> Decimal {
        percentage(self.sold_count, self.offered_count)
    }

    pub fn offered_clothing_percentage(&self) -> Decimal {
        percentage(self.offered_clothing, self.offered_count)
    }

    pub fn offered_misc_percentage(&self) -> Decimal {
        percentage(self.offered_misc, self.offered_count)
    }

    /// Sold clothing relative to all offered articles.
    pub fn sold_clothing_percentage(&self) -> Decimal {
        percentage(self.sold_clothing, self.offered_count)
    }

    /// Sold miscellaneous articles relative to all offered articles.
    pub fn sold_misc_percentage(&self) -> Decimal {
        percentage(self.sold_misc, self.offered_count)
    }
}

/// `part / whole * 100`, zero when `whole` is zero.
pub fn percentage(part: usize, whole: usize) -> Decimal {
    ratio(part, whole) * Decimal::ONE_HUNDRED
}

/// Share of an amount, zero when `whole` is zero.
pub fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part / whole * Decimal::ONE_HUNDRED
}

fn ratio(part: usize, whole: usize) -> Decimal {
    if whole == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(part) / Decimal::from(whole)
}
