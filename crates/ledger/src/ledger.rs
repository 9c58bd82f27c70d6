//! The article ledger of one cash point (or of a merged evaluation).
//!
//! Articles live in an arena (`Vec<Article>`) and are addressed by
//! [`ArticleId`] handles; a `BTreeMap` index maps article keys to handles in
//! seller/article order. The current sale only holds handles. Articles are
//! never removed individually, so handles stay valid until [`ArticleLedger::clear`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use basar_core::{
    ArticleKey, ArticleNumber, CashPointId, DomainError, DomainResult, Entity, SellerNumber,
    Settings,
};

use crate::article::{Article, SaleStamp};
use crate::ranges::{self, CountBucket};
use crate::transaction::Transaction;

mod sync;

pub use sync::SyncSummary;

/// Stable handle of an article inside one ledger's arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ArticleId(usize);

#[derive(Debug, Clone)]
pub struct ArticleLedger {
    settings: Settings,
    articles: Vec<Article>,
    index: BTreeMap<ArticleKey, ArticleId>,
    transactions: Vec<Transaction>,
    current_sale: Vec<ArticleId>,
}

impl ArticleLedger {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            articles: Vec::new(),
            index: BTreeMap::new(),
            transactions: Vec::new(),
            current_sale: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Insert a new article.
    ///
    /// Returns `false` and leaves the ledger untouched when an article with the
    /// same key already exists (the first record wins).
    pub fn add_article(&mut self, article: Article) -> bool {
        let key = article.id();
        if self.index.contains_key(&key) {
            tracing::warn!(article = %key, "duplicate article rejected");
            return false;
        }
        let id = ArticleId(self.articles.len());
        self.articles.push(article);
        self.index.insert(key, id);
        true
    }

    pub fn article(&self, key: ArticleKey) -> Option<&Article> {
        self.index.get(&key).map(|id| &self.articles[id.0])
    }

    pub fn contains(&self, key: ArticleKey) -> bool {
        self.index.contains_key(&key)
    }

    /// All articles in insertion order.
    pub fn articles(&self) -> impl Iterator<Item = &Article> {
        self.articles.iter()
    }

    /// All articles ordered by seller, then article number.
    pub fn articles_by_key(&self) -> impl Iterator<Item = &Article> {
        self.index.values().map(|id| &self.articles[id.0])
    }

    /// Articles of one seller, ordered by article number.
    pub fn articles_of(&self, seller: SellerNumber) -> impl Iterator<Item = &Article> {
        let from = ArticleKey::new(seller, ArticleNumber::new(u32::MIN));
        let to = ArticleKey::new(seller, ArticleNumber::new(u32::MAX));
        self.index.range(from..=to).map(|(_, id)| &self.articles[id.0])
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    // ---------------------------------------------------------------------
    // Current sale
    // ---------------------------------------------------------------------

    pub fn is_in_current_sale(&self, key: ArticleKey) -> bool {
        match self.index.get(&key) {
            Some(id) => self.current_sale.contains(id),
            None => false,
        }
    }

    /// Append an article to the current sale.
    pub fn add_to_current_sale(&mut self, key: ArticleKey) -> DomainResult<()> {
        let id = *self.index.get(&key).ok_or(DomainError::UnknownArticle(key))?;

        if self.articles[id.0].is_sold() {
            return Err(DomainError::invariant(format!("article {key} is already sold")));
        }
        if self.current_sale.contains(&id) {
            return Err(DomainError::conflict(format!(
                "article {key} is already in the current sale"
            )));
        }

        self.current_sale.push(id);
        Ok(())
    }

    /// Remove the most recently added article from the current sale.
    pub fn remove_last_from_current_sale(&mut self) -> Option<ArticleKey> {
        self.current_sale.pop().map(|id| self.articles[id.0].key)
    }

    pub fn last_in_current_sale(&self) -> Option<&Article> {
        self.current_sale.last().map(|id| &self.articles[id.0])
    }

    pub fn is_current_sale_empty(&self) -> bool {
        self.current_sale.is_empty()
    }

    /// Articles of the current sale in scan order.
    pub fn current_sale(&self) -> impl Iterator<Item = &Article> {
        self.current_sale.iter().map(|id| &self.articles[id.0])
    }

    pub fn current_sale_sum(&self) -> Decimal {
        self.current_sale().map(|a| a.price).sum()
    }

    /// Money to hand back when the customer pays `given`.
    pub fn change_due(&self, given: Decimal) -> Decimal {
        given - self.current_sale_sum()
    }

    /// Manually set the price of the most recently scanned article.
    pub fn correct_last_price(&mut self, price: Decimal) -> DomainResult<()> {
        if price < Decimal::ZERO {
            return Err(DomainError::validation("price must not be negative"));
        }
        let id = *self
            .current_sale
            .last()
            .ok_or_else(|| DomainError::validation("current sale is empty"))?;

        let article = &mut self.articles[id.0];
        tracing::debug!(article = %article.key, old = %article.price, new = %price, "price corrected");
        article.price = price;
        Ok(())
    }

    /// Finalize the current sale on `cash_point`.
    ///
    /// Every cart article is validated before anything changes, so either all
    /// of them become sold together with one new transaction, or nothing
    /// changes. An empty cart is a no-op (`Ok(None)`).
    pub fn finish_current_sale(
        &mut self,
        cash_point: CashPointId,
        at: DateTime<Utc>,
    ) -> DomainResult<Option<&Transaction>> {
        if self.current_sale.is_empty() {
            return Ok(None);
        }

        if let Some(sold) = self
            .current_sale
            .iter()
            .map(|id| &self.articles[id.0])
            .find(|a| a.is_sold())
        {
            return Err(DomainError::invariant(format!(
                "article {} in the current sale was sold elsewhere",
                sold.key
            )));
        }

        let sum = self.current_sale_sum();
        let stamp = SaleStamp {
            cash_point,
            sold_at: at,
        };
        let cart = std::mem::take(&mut self.current_sale);
        let mut keys = Vec::with_capacity(cart.len());
        for id in cart {
            let article = &mut self.articles[id.0];
            article.mark_sold(stamp);
            keys.push(article.key);
        }

        tracing::info!(
            cash_point = %cash_point,
            articles = keys.len(),
            sum = %sum,
            "sale finished"
        );
        self.transactions.push(Transaction::new(cash_point, at, keys, sum));
        Ok(self.transactions.last())
    }

    /// Reverse the sale of an article.
    ///
    /// Returns `false` without changing anything when the article is unknown
    /// or not sold. Transactions keep listing the article.
    pub fn return_article(&mut self, key: ArticleKey) -> bool {
        let Some(id) = self.index.get(&key).copied() else {
            tracing::warn!(article = %key, "return of unknown article");
            return false;
        };
        let article = &mut self.articles[id.0];
        if !article.is_sold() {
            tracing::warn!(article = %key, "return of unsold article");
            return false;
        }
        article.clear_sale();
        tracing::info!(article = %key, "article returned");
        true
    }

    /// Append a transaction read from a ledger file.
    ///
    /// Rejected (`false`) when it references an article this ledger does not know.
    pub fn restore_transaction(&mut self, transaction: Transaction) -> bool {
        if let Some(missing) = transaction.articles.iter().find(|k| !self.index.contains_key(*k)) {
            tracing::warn!(article = %missing, "transaction references unknown article");
            return false;
        }
        self.transactions.push(transaction);
        true
    }

    /// Reset to an empty ledger (before a fresh import).
    pub fn clear(&mut self) {
        self.articles.clear();
        self.index.clear();
        self.transactions.clear();
        self.current_sale.clear();
    }

    // ---------------------------------------------------------------------
    // Aggregates
    // ---------------------------------------------------------------------

    /// Revenue per seller, ascending by seller number.
    ///
    /// Every seller with at least one article is listed, with zero revenue
    /// when nothing was sold.
    pub fn sales_per_seller(&self) -> BTreeMap<SellerNumber, Decimal> {
        let mut map = BTreeMap::new();
        for article in self.articles_by_key() {
            let revenue = map.entry(article.key.seller).or_insert(Decimal::ZERO);
            if article.is_sold() {
                *revenue += article.price;
            }
        }
        map
    }

    /// Sold articles of one seller with their sale price.
    pub fn sold_articles(&self, seller: SellerNumber) -> BTreeMap<ArticleNumber, Decimal> {
        self.articles_of(seller)
            .filter(|a| a.is_sold())
            .map(|a| (a.key.article, a.price))
            .collect()
    }

    /// Unsold article numbers of one seller, ascending.
    pub fn unsold_articles(&self, seller: SellerNumber) -> Vec<ArticleNumber> {
        self.articles_of(seller)
            .filter(|a| !a.is_sold())
            .map(|a| a.key.article)
            .collect()
    }

    /// Number of sellers per bucket of offered-article counts.
    pub fn offered_articles_in_ranges(&self) -> BTreeMap<CountBucket, usize> {
        let counts = self.counts_per_seller(|_| true);
        ranges::histogram(counts.into_values(), self.settings.article_range.len())
    }

    /// Number of sellers per bucket of sold-article counts.
    pub fn sold_articles_in_ranges(&self) -> BTreeMap<CountBucket, usize> {
        let counts = self.counts_per_seller(Article::is_sold);
        ranges::histogram(counts.into_values(), self.settings.article_range.len())
    }

    fn counts_per_seller<F>(&self, include: F) -> BTreeMap<SellerNumber, u32>
    where
        F: Fn(&Article) -> bool,
    {
        let mut counts = BTreeMap::new();
        for article in &self.articles {
            let count = counts.entry(article.key.seller).or_insert(0u32);
            if include(article) {
                *count += 1;
            }
        }
        counts
    }

    pub fn payout_factor(&self) -> Decimal {
        self.settings.payout_factor()
    }

    pub fn count_sold_articles(&self) -> usize {
        self.articles.iter().filter(|a| a.is_sold()).count()
    }

    pub fn count_transactions(&self) -> usize {
        self.transactions.len()
    }
}
