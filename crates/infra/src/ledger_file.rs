//! XML ledger file.
//!
//! ## Layout
//!
//! ```text
//! <ledger>
//!   <articles>
//!     <article>
//!       <articleNumber>3</articleNumber>
//!       <sellerNumber>120</sellerNumber>
//!       <soldOnPc>2</soldOnPc>            0 = unsold
//!       <prize>4.50</prize>
//!       <listPrize>5.00</listPrize>
//!       <size>104</size>
//!       <description>Jacket</description>
//!       <soldTime>2026-03-14T10:02:11Z</soldTime>   empty while unsold
//!     </article>
//!   </articles>
//!   <transactions>
//!     <transaction>
//!       <cashPointId>2</cashPointId>
//!       <timestamp>2026-03-14T10:02:11Z</timestamp>
//!       <sum>4.50</sum>
//!       <article><sellerNumber>120</sellerNumber><articleNumber>3</articleNumber></article>
//!     </transaction>
//!   </transactions>
//! </ledger>
//! ```
//!
//! Records that do not fit the data model (a sale without a readable
//! timestamp, a duplicate key, a transaction over unknown articles) are
//! skipped with a warning. The rest of the file still loads.

use std::fs;
use std::io::Write as _;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::{de::from_str, se::to_string_with_root};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use basar_core::{ArticleKey, ArticleNumber, CashPointId, SellerNumber, Settings};
use basar_ledger::{Article, ArticleLedger, SaleStamp, Transaction};

use crate::store::StoreError;

const ROOT: &str = "ledger";

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerDocument {
    #[serde(default)]
    articles: ArticleList,
    #[serde(default)]
    transactions: TransactionList,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ArticleList {
    #[serde(rename = "article", default)]
    items: Vec<ArticleRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticleRecord {
    article_number: u32,
    seller_number: u32,
    sold_on_pc: u32,
    #[serde(with = "rust_decimal::serde::str")]
    prize: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    list_prize: Decimal,
    #[serde(default)]
    size: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    sold_time: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TransactionList {
    #[serde(rename = "transaction", default)]
    items: Vec<TransactionRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionRecord {
    cash_point_id: u32,
    timestamp: String,
    #[serde(with = "rust_decimal::serde::str")]
    sum: Decimal,
    #[serde(rename = "article", default)]
    articles: Vec<KeyRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyRecord {
    seller_number: u32,
    article_number: u32,
}

impl From<ArticleKey> for KeyRecord {
    fn from(key: ArticleKey) -> Self {
        Self {
            seller_number: key.seller.get(),
            article_number: key.article.get(),
        }
    }
}

impl KeyRecord {
    fn key(&self) -> ArticleKey {
        ArticleKey::new(
            SellerNumber::new(self.seller_number),
            ArticleNumber::new(self.article_number),
        )
    }
}

fn format_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Serialize the ledger. The current sale is not part of the file.
pub fn to_xml(ledger: &ArticleLedger) -> Result<String, StoreError> {
    let articles = ledger
        .articles_by_key()
        .map(|a| {
            let sale = a.sale();
            ArticleRecord {
                article_number: a.key.article.get(),
                seller_number: a.key.seller.get(),
                sold_on_pc: sale.map(|s| s.cash_point.get()).unwrap_or(0),
                prize: a.price,
                list_prize: a.list_price,
                size: a.size.clone(),
                description: a.description.clone(),
                sold_time: sale.map(|s| format_time(s.sold_at)).unwrap_or_default(),
            }
        })
        .collect();

    let transactions = ledger
        .transactions()
        .iter()
        .map(|t| TransactionRecord {
            cash_point_id: t.cash_point.get(),
            timestamp: format_time(t.completed_at),
            sum: t.sum,
            articles: t.articles.iter().copied().map(KeyRecord::from).collect(),
        })
        .collect();

    let document = LedgerDocument {
        articles: ArticleList { items: articles },
        transactions: TransactionList {
            items: transactions,
        },
    };
    to_string_with_root(ROOT, &document).map_err(|e| StoreError::Xml(e.to_string()))
}

/// Parse a ledger file body into a ledger evaluated against `settings`.
pub fn from_xml(xml: &str, settings: Settings) -> Result<ArticleLedger, StoreError> {
    let document: LedgerDocument = from_str(xml).map_err(|e| StoreError::Xml(e.to_string()))?;
    let mut ledger = ArticleLedger::new(settings);

    for record in document.articles.items {
        let key = ArticleKey::new(
            SellerNumber::new(record.seller_number),
            ArticleNumber::new(record.article_number),
        );

        let sale = match record.sold_on_pc {
            0 => None,
            pc => {
                let Some(sold_at) = parse_time(&record.sold_time) else {
                    tracing::warn!(article = %key, sold_time = %record.sold_time, "sold article without readable sale time skipped");
                    continue;
                };
                let Ok(cash_point) = CashPointId::new(pc) else {
                    continue;
                };
                Some(SaleStamp {
                    cash_point,
                    sold_at,
                })
            }
        };

        let article = Article::restore(
            key,
            record.prize,
            record.list_prize,
            record.size,
            record.description,
            sale,
        );
        if !ledger.add_article(article) {
            tracing::warn!(article = %key, "duplicate article record skipped");
        }
    }

    for record in document.transactions.items {
        let Some(completed_at) = parse_time(&record.timestamp) else {
            tracing::warn!(timestamp = %record.timestamp, "transaction without readable timestamp skipped");
            continue;
        };
        let Ok(cash_point) = CashPointId::new(record.cash_point_id) else {
            tracing::warn!("transaction without cash point skipped");
            continue;
        };
        let keys = record.articles.iter().map(KeyRecord::key).collect();
        // rejection is logged by the ledger
        ledger.restore_transaction(Transaction::new(cash_point, completed_at, keys, record.sum));
    }

    Ok(ledger)
}

/// Load a ledger file.
pub fn load(path: &Path, settings: Settings) -> Result<ArticleLedger, StoreError> {
    let xml = fs::read_to_string(path)?;
    let ledger = from_xml(&xml, settings)?;
    tracing::debug!(
        path = %path.display(),
        articles = ledger.len(),
        transactions = ledger.count_transactions(),
        "ledger loaded"
    );
    Ok(ledger)
}

/// Write the ledger to `path`, replacing the file atomically.
pub fn save(path: &Path, ledger: &ArticleLedger) -> Result<(), StoreError> {
    write_atomic(path, to_xml(ledger)?.as_bytes())?;
    tracing::debug!(path = %path.display(), articles = ledger.len(), "ledger saved");
    Ok(())
}

/// Write to a sibling temp file, flush it to disk, then rename over `path`.
///
/// A crash leaves either the old or the new content, never a torn file.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);

    let mut file = fs::File::create(&tmp)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn key(seller: u32, article: u32) -> ArticleKey {
        ArticleKey::new(SellerNumber::new(seller), ArticleNumber::new(article))
    }

    #[test]
    fn sold_and_unsold_articles_survive_xml() {
        let mut ledger = ArticleLedger::new(Settings::default());
        ledger.add_article(Article::new(key(120, 3), dec!(5.00), "104", "Jacket & hat"));
        ledger.add_article(Article::new(key(120, 4), dec!(1.50), "", "<Book>"));
        ledger.add_to_current_sale(key(120, 3)).unwrap();
        ledger.correct_last_price(dec!(4.50)).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 10, 2, 11).unwrap();
        ledger
            .finish_current_sale(CashPointId::new(2).unwrap(), at)
            .unwrap();

        let xml = to_xml(&ledger).unwrap();
        assert!(xml.starts_with("<ledger>"));
        assert!(xml.contains("<soldOnPc>2</soldOnPc>"));

        let restored = from_xml(&xml, Settings::default()).unwrap();
        let jacket = restored.article(key(120, 3)).unwrap();
        assert_eq!(jacket, ledger.article(key(120, 3)).unwrap());
        assert_eq!(jacket.list_price, dec!(5.00));
        assert_eq!(restored.article(key(120, 4)).unwrap().description, "<Book>");
        assert_eq!(restored.transactions(), ledger.transactions());
    }

    #[test]
    fn sub_second_sale_times_survive_xml() {
        let mut ledger = ArticleLedger::new(Settings::default());
        ledger.add_article(Article::new(key(3, 1), dec!(2.00), "", "Kite"));
        ledger.add_to_current_sale(key(3, 1)).unwrap();
        ledger
            .finish_current_sale(CashPointId::new(1).unwrap(), Utc::now())
            .unwrap();

        let restored = from_xml(&to_xml(&ledger).unwrap(), Settings::default()).unwrap();
        assert_eq!(restored.transactions(), ledger.transactions());
        assert_eq!(restored.article(key(3, 1)), ledger.article(key(3, 1)));
        assert_eq!(restored.clone().sync(&ledger).transactions_added, 0);
    }

    #[test]
    fn empty_ledger_round_trips() {
        let xml = to_xml(&ArticleLedger::new(Settings::default())).unwrap();
        let restored = from_xml(&xml, Settings::default()).unwrap();
        assert!(restored.is_empty());
        assert_eq!(restored.count_transactions(), 0);
    }

    #[test]
    fn broken_records_are_skipped() {
        let xml = r#"<ledger>
  <articles>
    <article><articleNumber>1</articleNumber><sellerNumber>7</sellerNumber><soldOnPc>0</soldOnPc><prize>2</prize><listPrize>2</listPrize><size></size><description>Car</description><soldTime></soldTime></article>
    <article><articleNumber>1</articleNumber><sellerNumber>7</sellerNumber><soldOnPc>0</soldOnPc><prize>9</prize><listPrize>9</listPrize><size></size><description>Dup</description><soldTime></soldTime></article>
    <article><articleNumber>2</articleNumber><sellerNumber>7</sellerNumber><soldOnPc>1</soldOnPc><prize>3</prize><listPrize>3</listPrize><size></size><description>Doll</description><soldTime>yesterday</soldTime></article>
  </articles>
  <transactions>
    <transaction><cashPointId>1</cashPointId><timestamp>2026-03-14T10:00:00Z</timestamp><sum>3</sum><article><sellerNumber>7</sellerNumber><articleNumber>2</articleNumber></article></transaction>
  </transactions>
</ledger>"#;

        let ledger = from_xml(xml, Settings::default()).unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.article(key(7, 1)).unwrap().description, "Car");
        assert_eq!(ledger.count_transactions(), 0);
    }

    #[test]
    fn garbage_is_an_xml_error() {
        assert!(matches!(
            from_xml("<ledger><articles>", Settings::default()),
            Err(StoreError::Xml(_))
        ));
    }
}
