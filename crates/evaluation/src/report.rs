//! Structured evaluation documents.
//!
//! The documents carry data only; rendering lives in [`crate::html`]. Row
//! pagination is decided here so every renderer breaks pages identically.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use basar_core::{ArticleNumber, NumberRange, SellerNumber};
use basar_ledger::{ArticleLedger, Category, CountBucket};
use basar_sellers::SellerRegistry;

use crate::statistics::{Statistics, percentage_of};

pub const PAYOUT_ROWS_PER_PAGE: usize = 42;
/// The seller header shares the first page of a sold-articles section.
pub const SOLD_ROWS_FIRST_PAGE: usize = 37;
pub const SOLD_ROWS_PER_PAGE: usize = 42;
pub const UNSOLD_GRID_COLUMNS: usize = 10;

/// One printed page of table rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// 1-based.
    pub number: usize,
    /// Set on every page after the first; renderers repeat the table header.
    pub continued: bool,
    pub rows: Vec<T>,
}

/// Split rows into pages of `first` rows, then `rest` rows each.
///
/// Always yields at least one page, empty input gives a single empty page.
pub fn paginate<T>(rows: Vec<T>, first: usize, rest: usize) -> Vec<Page<T>> {
    let first = first.max(1);
    let rest = rest.max(1);

    let mut pages = Vec::new();
    let mut rows = rows.into_iter().peekable();
    let mut size = first;
    loop {
        let chunk: Vec<T> = rows.by_ref().take(size).collect();
        pages.push(Page {
            number: pages.len() + 1,
            continued: !pages.is_empty(),
            rows: chunk,
        });
        if rows.peek().is_none() {
            return pages;
        }
        size = rest;
    }
}

// -------------------------------------------------------------------------
// Overview
// -------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayoutRow {
    pub seller: SellerNumber,
    pub revenue: Decimal,
    pub payout: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverviewReport {
    pub generated_at: NaiveDateTime,
    pub statistics: Statistics,
    pub seller_range: NumberRange,
    pub offered_ranges: BTreeMap<CountBucket, usize>,
    pub sold_ranges: BTreeMap<CountBucket, usize>,
    pub categories: Vec<CategoryRow>,
    pub payout_pages: Vec<Page<PayoutRow>>,
}

/// Offered and sold articles of one category, with its share of the revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRow {
    pub category: Category,
    pub offered: usize,
    pub sold: usize,
    pub revenue: Decimal,
    pub revenue_percentage: Decimal,
}

// -------------------------------------------------------------------------
// Sold articles
// -------------------------------------------------------------------------

/// Why a sale price differs from what the seller listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Discrepancy {
    ListPrice(Decimal),
    /// Listed without a price, or registered at the checkout.
    NotListed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoldLine {
    pub article: ArticleNumber,
    pub price: Decimal,
    pub size: String,
    pub description: String,
    pub discrepancy: Option<Discrepancy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SellerPayout {
    pub seller: SellerNumber,
    /// Empty when the seller is not in the registry.
    pub name: String,
    pub phone: String,
    pub revenue: Decimal,
    pub deduction: Decimal,
    pub payout: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoldSection {
    pub payout: SellerPayout,
    /// Whether any line of this section has a discrepancy.
    pub show_discrepancy: bool,
    pub pages: Vec<Page<SoldLine>>,
}

impl SoldSection {
    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|p| p.rows.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoldArticlesReport {
    pub sections: Vec<SoldSection>,
}

// -------------------------------------------------------------------------
// Unsold articles
// -------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsoldSection {
    pub seller: SellerNumber,
    pub name: String,
    /// Rows of [`UNSOLD_GRID_COLUMNS`] cells over the whole article range.
    /// A cell holds the article number when that article is unsold.
    pub grid: Vec<Vec<Option<ArticleNumber>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsoldArticlesReport {
    pub sections: Vec<UnsoldSection>,
}

// -------------------------------------------------------------------------
// Builder
// -------------------------------------------------------------------------

/// Builds the evaluation documents from one ledger snapshot.
pub struct Evaluation<'a> {
    ledger: &'a ArticleLedger,
    sellers: &'a SellerRegistry,
    statistics: Statistics,
}

impl<'a> Evaluation<'a> {
    pub fn new(ledger: &'a ArticleLedger, sellers: &'a SellerRegistry) -> Self {
        Self {
            ledger,
            sellers,
            statistics: Statistics::compute(ledger),
        }
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn overview(&self, generated_at: NaiveDateTime) -> OverviewReport {
        let factor = self.ledger.payout_factor();
        let rows = self
            .ledger
            .sales_per_seller()
            .into_iter()
            .map(|(seller, revenue)| PayoutRow {
                seller,
                revenue,
                payout: revenue * factor,
            })
            .collect();

        OverviewReport {
            generated_at,
            statistics: self.statistics.clone(),
            seller_range: self.ledger.settings().seller_range,
            offered_ranges: self.ledger.offered_articles_in_ranges(),
            sold_ranges: self.ledger.sold_articles_in_ranges(),
            categories: self.by_category(),
            payout_pages: paginate(rows, PAYOUT_ROWS_PER_PAGE, PAYOUT_ROWS_PER_PAGE),
        }
    }

    /// Clothing first, then miscellaneous. Both rows are always present.
    pub fn by_category(&self) -> Vec<CategoryRow> {
        [Category::Clothing, Category::Miscellaneous]
            .into_iter()
            .map(|category| {
                let mut row = CategoryRow {
                    category,
                    offered: 0,
                    sold: 0,
                    revenue: Decimal::ZERO,
                    revenue_percentage: Decimal::ZERO,
                };
                for article in self.ledger.articles().filter(|a| a.category() == category) {
                    row.offered += 1;
                    if article.is_sold() {
                        row.sold += 1;
                        row.revenue += article.price;
                    }
                }
                row.revenue_percentage = percentage_of(row.revenue, self.statistics.revenue);
                row
            })
            .collect()
    }

    pub fn sold_articles(&self) -> SoldArticlesReport {
        let factor = self.ledger.payout_factor();
        let sections = self
            .ledger
            .sales_per_seller()
            .into_iter()
            .map(|(seller, revenue)| {
                let (name, phone) = match self.sellers.seller(seller) {
                    Some(s) => (s.full_name(), s.phone.clone()),
                    None => {
                        tracing::debug!(seller = %seller, "seller not in registry");
                        (String::new(), String::new())
                    }
                };
                let payout = revenue * factor;

                let lines: Vec<SoldLine> = self
                    .ledger
                    .articles_of(seller)
                    .filter(|a| a.is_sold())
                    .map(|a| SoldLine {
                        article: a.key.article,
                        price: a.price,
                        size: a.size.clone(),
                        description: a.description.clone(),
                        discrepancy: a.has_price_discrepancy().then(|| {
                            if a.list_price.is_zero() {
                                Discrepancy::NotListed
                            } else {
                                Discrepancy::ListPrice(a.list_price)
                            }
                        }),
                    })
                    .collect();

                SoldSection {
                    payout: SellerPayout {
                        seller,
                        name,
                        phone,
                        revenue,
                        deduction: revenue - payout,
                        payout,
                    },
                    show_discrepancy: lines.iter().any(|l| l.discrepancy.is_some()),
                    pages: paginate(lines, SOLD_ROWS_FIRST_PAGE, SOLD_ROWS_PER_PAGE),
                }
            })
            .collect();

        SoldArticlesReport { sections }
    }

    pub fn unsold_articles(&self) -> UnsoldArticlesReport {
        let range = self.ledger.settings().article_range;
        let sections = self
            .ledger
            .sales_per_seller()
            .into_keys()
            .filter_map(|seller| {
                let unsold = self.ledger.unsold_articles(seller);
                if unsold.is_empty() {
                    return None;
                }
                let name = self
                    .sellers
                    .seller(seller)
                    .map(|s| s.full_name())
                    .unwrap_or_default();
                Some(UnsoldSection {
                    seller,
                    name,
                    grid: unsold_grid(range, &unsold),
                })
            })
            .collect();

        UnsoldArticlesReport { sections }
    }
}

fn unsold_grid(range: NumberRange, unsold: &[ArticleNumber]) -> Vec<Vec<Option<ArticleNumber>>> {
    let cells: Vec<Option<ArticleNumber>> = range
        .iter()
        .map(ArticleNumber::new)
        .map(|n| unsold.binary_search(&n).is_ok().then_some(n))
        .collect();

    cells
        .chunks(UNSOLD_GRID_COLUMNS)
        .map(|chunk| {
            let mut row = chunk.to_vec();
            row.resize(UNSOLD_GRID_COLUMNS, None);
            row
        })
        .collect()
}
