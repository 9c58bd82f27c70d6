//! Infrastructure layer: ledger and seller files, article-list import,
//! configuration and the cash-point session.

pub mod config;
pub mod import;
pub mod ledger_file;
pub mod seller_file;
pub mod session;
pub mod store;

pub use import::{ImportError, ImportSummary};
pub use session::{CashPointSession, SessionError};
pub use store::{FileStore, InMemoryStore, LedgerStore, StoreError};
