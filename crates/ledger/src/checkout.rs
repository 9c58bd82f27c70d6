//! Checkout scanning: turning a scanned code into a cart entry.

use core::str::FromStr;

use rust_decimal::Decimal;

use basar_core::{ArticleKey, ArticleNumber, DomainError, DomainResult, SellerNumber};

use crate::article::Article;
use crate::ledger::ArticleLedger;

/// Length of a scan code: three digits seller, three digits article.
pub const SCAN_CODE_LEN: usize = 6;

/// Prices below one cent count as "no price".
const MIN_PRICE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// A six-digit code `SSSAAA` as printed on the article labels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScanCode(ArticleKey);

impl ScanCode {
    pub fn key(&self) -> ArticleKey {
        self.0
    }
}

impl FromStr for ScanCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != SCAN_CODE_LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::validation(format!(
                "scan code must be {SCAN_CODE_LEN} digits, got {s:?}"
            )));
        }
        let (seller, article) = s.split_at(SCAN_CODE_LEN / 2);
        Ok(Self(ArticleKey::new(
            seller.parse::<SellerNumber>()?,
            article.parse::<ArticleNumber>()?,
        )))
    }
}

/// Result of a successful scan.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Listed article with a price, now in the cart.
    Added(ArticleKey),
    /// Listed article without a price; the cashier has to enter one.
    PriceMissing(ArticleKey),
    /// Unknown article, registered with price 0 and put in the cart; the
    /// cashier has to enter a price.
    Registered(ArticleKey),
}

impl ScanOutcome {
    pub fn key(&self) -> ArticleKey {
        match self {
            ScanOutcome::Added(k) | ScanOutcome::PriceMissing(k) | ScanOutcome::Registered(k) => *k,
        }
    }

    pub fn needs_price(&self) -> bool {
        !matches!(self, ScanOutcome::Added(_))
    }
}

impl ArticleLedger {
    /// Put the scanned article into the current sale.
    pub fn scan(&mut self, code: ScanCode) -> DomainResult<ScanOutcome> {
        let key = code.key();
        let settings = self.settings();

        let sellers = settings.seller_range;
        if key.seller.get() > sellers.max() {
            return Err(DomainError::validation(format!(
                "seller number {} is too high, maximum is {}",
                key.seller,
                sellers.max()
            )));
        }
        if key.seller.get() < sellers.min() {
            return Err(DomainError::validation(format!(
                "seller number {} is too low, minimum is {}",
                key.seller,
                sellers.min()
            )));
        }

        let articles = settings.article_range;
        if key.article.get() > articles.max() {
            return Err(DomainError::validation(format!(
                "article number {} is too high, maximum is {}",
                key.article,
                articles.max()
            )));
        }
        if key.article.get() < articles.min() {
            return Err(DomainError::validation(format!(
                "article number {} is too low, minimum is {}",
                key.article,
                articles.min()
            )));
        }

        if self.is_in_current_sale(key) {
            return Err(DomainError::conflict(format!(
                "article {key} is already in the current sale"
            )));
        }

        let outcome = match self.article(key) {
            Some(article) if article.is_sold() => {
                return Err(DomainError::invariant(format!("article {key} is already sold")));
            }
            Some(article) if article.price < MIN_PRICE => ScanOutcome::PriceMissing(key),
            Some(_) => ScanOutcome::Added(key),
            None => {
                tracing::info!(article = %key, "unlisted article registered at checkout");
                self.add_article(Article::unregistered(key));
                ScanOutcome::Registered(key)
            }
        };

        self.add_to_current_sale(key)?;
        Ok(outcome)
    }
}
