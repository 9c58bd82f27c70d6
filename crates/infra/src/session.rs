//! Cash-point session: the ledger and seller registry of one installation,
//! written back to the store after every mutating action.
//!
//! The current sale lives in memory only; it becomes durable when it is
//! finished.

use std::path::Path;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use basar_core::{ArticleKey, DomainError, Settings};
use basar_evaluation::Evaluation;
use basar_ledger::{ArticleLedger, ScanCode, ScanOutcome, SyncSummary, Transaction};
use basar_sellers::SellerRegistry;

use crate::import::{self, ImportError, ImportSummary};
use crate::ledger_file;
use crate::store::{LedgerStore, StoreError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub struct CashPointSession<S: LedgerStore> {
    store: S,
    settings: Settings,
    ledger: ArticleLedger,
    sellers: SellerRegistry,
}

impl<S: LedgerStore> CashPointSession<S> {
    /// Open the session on whatever `store` holds.
    pub fn open(store: S, settings: Settings) -> Result<Self, SessionError> {
        let ledger = store.load_ledger(&settings)?;
        let sellers = store.load_sellers()?;
        tracing::info!(
            cash_point = %settings.cash_point,
            articles = ledger.len(),
            transactions = ledger.count_transactions(),
            sellers = sellers.len(),
            "session opened"
        );
        Ok(Self {
            store,
            settings,
            ledger,
            sellers,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn ledger(&self) -> &ArticleLedger {
        &self.ledger
    }

    pub fn sellers(&self) -> &SellerRegistry {
        &self.sellers
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Import the article lists in `dir`. With `clear`, the ledger and the
    /// registry start over empty.
    ///
    /// The import runs on a staged copy that replaces the session state only
    /// once it is read and stored, so a failed import changes nothing.
    pub fn import_directory(&mut self, dir: &Path, clear: bool) -> Result<ImportSummary, SessionError> {
        let (mut ledger, mut sellers) = if clear {
            tracing::info!("clearing ledger and sellers before import");
            (ArticleLedger::new(self.settings.clone()), SellerRegistry::new())
        } else {
            (self.ledger.clone(), self.sellers.clone())
        };

        let summary = import::import_directory(dir, &self.settings, &mut ledger, &mut sellers)?;
        self.store.save_ledger(&ledger)?;
        self.store.save_sellers(&sellers)?;

        self.ledger = ledger;
        self.sellers = sellers;
        Ok(summary)
    }

    pub fn scan(&mut self, code: ScanCode) -> Result<ScanOutcome, SessionError> {
        Ok(self.ledger.scan(code)?)
    }

    pub fn correct_last_price(&mut self, price: Decimal) -> Result<(), SessionError> {
        Ok(self.ledger.correct_last_price(price)?)
    }

    pub fn remove_last(&mut self) -> Option<ArticleKey> {
        self.ledger.remove_last_from_current_sale()
    }

    /// Finish the current sale on this installation's cash point.
    pub fn finish_sale(&mut self, at: DateTime<Utc>) -> Result<Option<Transaction>, SessionError> {
        let transaction = self
            .ledger
            .finish_current_sale(self.settings.cash_point, at)?
            .cloned();
        if transaction.is_some() {
            self.persist_ledger()?;
        }
        Ok(transaction)
    }

    /// Returns `false` when the article is unknown or not sold.
    pub fn return_article(&mut self, key: ArticleKey) -> Result<bool, SessionError> {
        let returned = self.ledger.return_article(key);
        if returned {
            self.persist_ledger()?;
        }
        Ok(returned)
    }

    /// Merge another cash point's ledger into this one.
    pub fn sync(&mut self, other: &ArticleLedger) -> Result<SyncSummary, SessionError> {
        let summary = self.ledger.sync(other);
        self.persist_ledger()?;
        Ok(summary)
    }

    /// Write a copy of the ledger for transfer to another cash point.
    pub fn export(&self, path: &Path) -> Result<(), SessionError> {
        ledger_file::save(path, &self.ledger)?;
        tracing::info!(path = %path.display(), "ledger exported");
        Ok(())
    }

    pub fn evaluation(&self) -> Evaluation<'_> {
        Evaluation::new(&self.ledger, &self.sellers)
    }

    fn persist_ledger(&self) -> Result<(), StoreError> {
        self.store.save_ledger(&self.ledger)
    }
}
