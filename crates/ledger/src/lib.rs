//! Article ledger: articles, the current sale, finished transactions and the
//! aggregates the evaluation is built from.
//!
//! Pure domain logic only: no IO, no file formats. Persistence adapters live in
//! `basar-infra`.

pub mod article;
pub mod checkout;
pub mod ledger;
pub mod ranges;
pub mod transaction;

pub use article::{Article, Category, SaleStamp};
pub use checkout::{ScanCode, ScanOutcome};
pub use ledger::{ArticleId, ArticleLedger, SyncSummary};
pub use ranges::CountBucket;
pub use transaction::Transaction;
