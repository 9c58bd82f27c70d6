//! Persistence of the ledger and the seller registry.
//!
//! `LedgerStore` is the seam between the session and the storage medium:
//!
//! - [`FileStore`] keeps `ledger.xml` and `sellers.xml` in a data directory
//!   and replaces them atomically on every save;
//! - [`InMemoryStore`] keeps the XML text in memory (tests, dry runs).
//!
//! Both go through the same XML codecs, so the in-memory store exercises the
//! exact file format.

mod file;
mod in_memory;

pub use file::FileStore;
pub use in_memory::InMemoryStore;

use thiserror::Error;

use basar_core::Settings;
use basar_ledger::ArticleLedger;
use basar_sellers::SellerRegistry;

/// Infrastructure error while reading or writing stored state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("xml error: {0}")]
    Xml(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub trait LedgerStore {
    /// Stored ledger, or an empty one when nothing was saved yet.
    fn load_ledger(&self, settings: &Settings) -> Result<ArticleLedger, StoreError>;

    fn save_ledger(&self, ledger: &ArticleLedger) -> Result<(), StoreError>;

    /// Stored sellers, or an empty registry when nothing was saved yet.
    fn load_sellers(&self) -> Result<SellerRegistry, StoreError>;

    fn save_sellers(&self, sellers: &SellerRegistry) -> Result<(), StoreError>;
}
