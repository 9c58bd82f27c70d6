use std::sync::RwLock;

use basar_core::Settings;
use basar_ledger::ArticleLedger;
use basar_sellers::SellerRegistry;

use super::{LedgerStore, StoreError};
use crate::{ledger_file, seller_file};

/// In-memory store holding the serialized XML.
///
/// Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    ledger: RwLock<Option<String>>,
    sellers: RwLock<Option<String>>,
    ledger_saves: RwLock<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How often the ledger has been saved.
    pub fn ledger_saves(&self) -> usize {
        self.ledger_saves.read().map(|n| *n).unwrap_or(0)
    }

    /// Last saved ledger XML.
    pub fn ledger_xml(&self) -> Option<String> {
        self.ledger.read().ok().and_then(|x| x.clone())
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl LedgerStore for InMemoryStore {
    fn load_ledger(&self, settings: &Settings) -> Result<ArticleLedger, StoreError> {
        match self.ledger.read().map_err(poisoned)?.as_deref() {
            Some(xml) => ledger_file::from_xml(xml, settings.clone()),
            None => Ok(ArticleLedger::new(settings.clone())),
        }
    }

    fn save_ledger(&self, ledger: &ArticleLedger) -> Result<(), StoreError> {
        let xml = ledger_file::to_xml(ledger)?;
        *self.ledger.write().map_err(poisoned)? = Some(xml);
        *self.ledger_saves.write().map_err(poisoned)? += 1;
        Ok(())
    }

    fn load_sellers(&self) -> Result<SellerRegistry, StoreError> {
        match self.sellers.read().map_err(poisoned)?.as_deref() {
            Some(xml) => seller_file::from_xml(xml),
            None => Ok(SellerRegistry::new()),
        }
    }

    fn save_sellers(&self, sellers: &SellerRegistry) -> Result<(), StoreError> {
        let xml = seller_file::to_xml(sellers)?;
        *self.sellers.write().map_err(poisoned)? = Some(xml);
        Ok(())
    }
}
