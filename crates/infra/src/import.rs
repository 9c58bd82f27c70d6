//! Import of the plain-text article lists sellers register online.
//!
//! ```text
//! Article List          header, literal
//! 1                     format version (ignored)
//! 120                   seller number
//! Anna                  first name
//! Berg                  last name
//! 0171 555              phone
//! 1                     article number   \
//! 3,50                  price             | repeated per article
//! 104                   size              |
//! Jacket                description      /
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use thiserror::Error;

use basar_core::money::parse_price;
use basar_core::{ArticleKey, ArticleNumber, SellerNumber, Settings};
use basar_ledger::{Article, ArticleLedger};
use basar_sellers::{Seller, SellerRegistry};

pub const HEADER: &str = "Article List";
pub const FILE_PREFIX: &str = "articleList_";
pub const FILE_SUFFIX: &str = ".txt";

const HEADER_LINES: usize = 6;
const LINES_PER_ARTICLE: usize = 4;

/// Prices below one cent count as "no price".
const MIN_PRICE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing \"{HEADER}\" header")]
    Header,

    #[error("malformed layout: {lines} lines do not form a header and 4-line article blocks")]
    Layout { lines: usize },

    #[error("invalid seller number {0:?}")]
    SellerNumber(String),

    #[error("seller {0} is outside the configured range")]
    SellerOutOfRange(SellerNumber),
}

/// One parsed article-list file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleList {
    pub seller: Seller,
    pub articles: Vec<Article>,
    /// Articles dropped for an out-of-range number or a missing price and description.
    pub skipped: usize,
}

/// Totals of a directory import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub files_read: usize,
    pub sellers_imported: usize,
    pub articles_imported: usize,
    /// Files with a broken layout, unreadable files.
    pub files_rejected: usize,
    /// Well-formed files of sellers outside the configured range.
    pub files_skipped: usize,
}

/// Parse the body of one article-list file.
pub fn parse_article_list(text: &str, settings: &Settings) -> Result<ArticleList, ImportError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text.lines().collect();

    if lines.len() < HEADER_LINES {
        return Err(ImportError::Layout { lines: lines.len() });
    }
    if lines[0].trim() != HEADER {
        return Err(ImportError::Header);
    }
    if (lines.len() - HEADER_LINES) % LINES_PER_ARTICLE != 0 {
        return Err(ImportError::Layout { lines: lines.len() });
    }

    let seller_number: SellerNumber = lines[2]
        .parse()
        .map_err(|_| ImportError::SellerNumber(lines[2].to_string()))?;
    if !settings.is_valid_seller(seller_number) {
        return Err(ImportError::SellerOutOfRange(seller_number));
    }

    let seller = Seller::new(
        seller_number,
        lines[3].trim(),
        lines[4].trim(),
        lines[5].trim(),
    );

    let mut articles = Vec::new();
    let mut skipped = 0;
    for block in lines[HEADER_LINES..].chunks_exact(LINES_PER_ARTICLE) {
        let [number, price, size, description] = block else {
            continue;
        };

        let Some(article_number) = number
            .parse::<ArticleNumber>()
            .ok()
            .filter(|n| settings.is_valid_article(*n))
        else {
            tracing::debug!(seller = %seller_number, number = %number, "article number out of range");
            skipped += 1;
            continue;
        };

        let price = parse_price(price).unwrap_or(Decimal::ZERO);
        let description = description.trim();
        if price < MIN_PRICE && description.is_empty() {
            skipped += 1;
            continue;
        }

        articles.push(Article::new(
            ArticleKey::new(seller_number, article_number),
            price,
            size.trim(),
            description,
        ));
    }

    Ok(ArticleList {
        seller,
        articles,
        skipped,
    })
}

/// Whether `path` is named like an article-list export.
pub fn is_article_list(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(FILE_PREFIX) && n.ends_with(FILE_SUFFIX))
}

/// Import every article list in `dir` into `ledger` and `sellers`.
///
/// Files are processed in name order. A broken file never aborts the batch.
pub fn import_directory(
    dir: &Path,
    settings: &Settings,
    ledger: &mut ArticleLedger,
    sellers: &mut SellerRegistry,
) -> Result<ImportSummary, ImportError> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_article_list(p))
        .collect();
    paths.sort();

    let mut summary = ImportSummary::default();
    for path in paths {
        summary.files_read += 1;

        let parsed = fs::read_to_string(&path)
            .map_err(ImportError::from)
            .and_then(|text| parse_article_list(&text, settings));

        let list = match parsed {
            Ok(list) => list,
            Err(ImportError::SellerOutOfRange(seller)) => {
                tracing::warn!(file = %path.display(), seller = %seller, "seller outside range, file skipped");
                summary.files_skipped += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "article list rejected");
                summary.files_rejected += 1;
                continue;
            }
        };

        for article in list.articles {
            let key = article.key;
            if ledger.add_article(article) {
                summary.articles_imported += 1;
            } else {
                tracing::warn!(article = %key, "article already in ledger, skipped");
            }
        }
        sellers.add_seller(list.seller);
        summary.sellers_imported += 1;
    }

    tracing::info!(
        files = summary.files_read,
        sellers = summary.sellers_imported,
        articles = summary.articles_imported,
        rejected = summary.files_rejected,
        skipped = summary.files_skipped,
        "article lists imported"
    );
    Ok(summary)
}
