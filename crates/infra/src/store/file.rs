use std::path::{Path, PathBuf};

use basar_core::Settings;
use basar_ledger::ArticleLedger;
use basar_sellers::SellerRegistry;

use super::{LedgerStore, StoreError};
use crate::{ledger_file, seller_file};

pub const LEDGER_FILE: &str = "ledger.xml";
pub const SELLER_FILE: &str = "sellers.xml";

/// XML files in one data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.dir.join(LEDGER_FILE)
    }

    pub fn seller_path(&self) -> PathBuf {
        self.dir.join(SELLER_FILE)
    }
}

impl LedgerStore for FileStore {
    fn load_ledger(&self, settings: &Settings) -> Result<ArticleLedger, StoreError> {
        let path = self.ledger_path();
        if !path.exists() {
            tracing::info!(path = %path.display(), "no ledger file yet, starting empty");
            return Ok(ArticleLedger::new(settings.clone()));
        }
        ledger_file::load(&path, settings.clone())
    }

    fn save_ledger(&self, ledger: &ArticleLedger) -> Result<(), StoreError> {
        ledger_file::save(&self.ledger_path(), ledger)
    }

    fn load_sellers(&self) -> Result<SellerRegistry, StoreError> {
        let path = self.seller_path();
        if !path.exists() {
            return Ok(SellerRegistry::new());
        }
        seller_file::load(&path)
    }

    fn save_sellers(&self, sellers: &SellerRegistry) -> Result<(), StoreError> {
        seller_file::save(&self.seller_path(), sellers)
    }
}
