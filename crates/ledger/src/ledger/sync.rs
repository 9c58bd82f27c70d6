//! Merging the ledger of another cash point into this one.
//!
//! Every cash point starts from the same imported article lists and sells a
//! different subset, so the merge resolves key collisions by sale state:
//!
//! - an article unknown here is copied in;
//! - an unsold copy here is replaced by a sold copy from the other ledger
//!   (sale stamp and actual price are adopted);
//! - when both copies are sold, this ledger's copy wins and the collision is
//!   counted as a conflict;
//! - otherwise this ledger's copy stays.
//!
//! Transactions from the other ledger are appended unless one with the same
//! cash point, timestamp and article list is already present, so merging the
//! same file twice never counts a sale twice. An article that ends up sold
//! here under a different sale stamp is stripped from the incoming
//! transaction (its price leaves the sum), and a transaction left without
//! articles is dropped. A sold article therefore stays listed by exactly one
//! transaction. The other ledger's current sale is ignored.

use rust_decimal::Decimal;

use basar_core::{ArticleKey, Entity};

use super::ArticleLedger;
use crate::article::Article;
use crate::transaction::Transaction;

/// What a merge changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub articles_added: usize,
    pub sales_adopted: usize,
    pub conflicts: usize,
    pub transactions_added: usize,
    pub transactions_skipped: usize,
    pub transactions_dropped: usize,
}

impl ArticleLedger {
    pub fn sync(&mut self, other: &ArticleLedger) -> SyncSummary {
        let mut summary = SyncSummary::default();

        for remote in &other.articles {
            let key = remote.id();
            let Some(&id) = self.index.get(&key) else {
                // keep the remote sale state, the article comes with its history
                self.add_article(remote.clone());
                summary.articles_added += 1;
                continue;
            };

            let Some(remote_sale) = remote.sale().copied() else {
                continue;
            };

            let local = &mut self.articles[id.0];
            match local.sale().copied() {
                None => {
                    local.mark_sold(remote_sale);
                    local.price = remote.price;
                    summary.sales_adopted += 1;

                    if let Some(pos) = self.current_sale.iter().position(|c| *c == id) {
                        self.current_sale.remove(pos);
                        tracing::warn!(article = %key, "article sold on another cash point removed from current sale");
                    }
                }
                Some(local_sale) if local_sale != remote_sale => {
                    summary.conflicts += 1;
                    tracing::warn!(
                        article = %key,
                        local_cash_point = %local_sale.cash_point,
                        remote_cash_point = %remote_sale.cash_point,
                        "article sold on two cash points, keeping local sale"
                    );
                }
                Some(_) => {}
            }
        }

        for transaction in &other.transactions {
            if self.transactions.iter().any(|t| t.same_sale(transaction)) {
                summary.transactions_skipped += 1;
                continue;
            }

            let (kept, stripped): (Vec<ArticleKey>, Vec<ArticleKey>) = transaction
                .articles
                .iter()
                .copied()
                .partition(|k| !self.sold_under_other_stamp(*k, transaction));
            if kept.is_empty() {
                summary.transactions_dropped += 1;
                tracing::warn!(
                    cash_point = %transaction.cash_point,
                    articles = transaction.len(),
                    "transaction dropped, all its articles were sold here"
                );
                continue;
            }

            let mut adopted = transaction.clone();
            if !stripped.is_empty() {
                let stripped_sum: Decimal = stripped
                    .iter()
                    .filter_map(|k| other.article(*k))
                    .map(|a| a.price)
                    .sum();
                tracing::warn!(
                    cash_point = %transaction.cash_point,
                    stripped = stripped.len(),
                    "articles sold here removed from incoming transaction"
                );
                adopted.articles = kept;
                adopted.sum -= stripped_sum;
            }
            // every referenced article exists here after the article pass
            self.transactions.push(adopted);
            summary.transactions_added += 1;
        }

        tracing::info!(
            articles_added = summary.articles_added,
            sales_adopted = summary.sales_adopted,
            conflicts = summary.conflicts,
            transactions_added = summary.transactions_added,
            transactions_skipped = summary.transactions_skipped,
            transactions_dropped = summary.transactions_dropped,
            "ledgers merged"
        );
        summary
    }

    /// The article is sold here, but not by the sale `transaction` records.
    fn sold_under_other_stamp(&self, key: ArticleKey, transaction: &Transaction) -> bool {
        self.article(key)
            .and_then(Article::sale)
            .is_some_and(|s| {
                s.cash_point != transaction.cash_point || s.sold_at != transaction.completed_at
            })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use basar_core::{ArticleKey, ArticleNumber, CashPointId, SellerNumber, Settings};

    use crate::article::Article;
    use crate::ledger::{ArticleLedger, SyncSummary};

    fn key(seller: u32, article: u32) -> ArticleKey {
        ArticleKey::new(SellerNumber::new(seller), ArticleNumber::new(article))
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 11, minute, 0).unwrap()
    }

    /// Two cash points that imported the same article lists.
    fn imported() -> ArticleLedger {
        let mut ledger = ArticleLedger::new(Settings::default());
        for n in 1..=4 {
            ledger.add_article(Article::new(key(1, n), Decimal::from(n), "", "toy"));
        }
        ledger
    }

    fn sell(ledger: &mut ArticleLedger, keys: &[ArticleKey], cash_point: u32, minute: u32) {
        for k in keys {
            ledger.add_to_current_sale(*k).unwrap();
        }
        ledger
            .finish_current_sale(CashPointId::new(cash_point).unwrap(), at(minute))
            .unwrap();
    }

    #[test]
    fn sold_copy_wins_over_unsold_copy() {
        let mut first = imported();
        let mut second = imported();
        sell(&mut first, &[key(1, 1)], 1, 0);
        sell(&mut second, &[key(1, 2), key(1, 3)], 2, 5);

        let summary = first.sync(&second);

        assert_eq!(summary.sales_adopted, 2);
        assert_eq!(summary.transactions_added, 1);
        assert_eq!(first.count_sold_articles(), 3);
        assert_eq!(first.count_transactions(), 2);
        assert_eq!(
            first.article(key(1, 2)).unwrap().sold_on(),
            Some(CashPointId::new(2).unwrap())
        );
        assert_eq!(first.sales_per_seller()[&SellerNumber::new(1)], dec!(6));
    }

    #[test]
    fn syncing_the_same_ledger_twice_does_not_double_count() {
        let mut total = imported();
        let mut other = imported();
        sell(&mut other, &[key(1, 4)], 2, 1);

        total.sync(&other);
        let second = total.sync(&other);

        assert_eq!(
            second,
            SyncSummary {
                transactions_skipped: 1,
                ..SyncSummary::default()
            }
        );
        assert_eq!(total.count_transactions(), 1);
        assert_eq!(total.sales_per_seller()[&SellerNumber::new(1)], dec!(4));
    }

    #[test]
    fn conflicting_sales_keep_local_copy() {
        let mut first = imported();
        let mut second = imported();
        sell(&mut first, &[key(1, 1)], 1, 0);
        sell(&mut second, &[key(1, 1)], 2, 3);

        let summary = first.sync(&second);

        assert_eq!(summary.conflicts, 1);
        assert_eq!(summary.transactions_dropped, 1);
        assert_eq!(summary.transactions_added, 0);
        assert_eq!(
            first.article(key(1, 1)).unwrap().sold_on(),
            Some(CashPointId::new(1).unwrap())
        );
        assert_eq!(first.count_sold_articles(), 1);
        assert_eq!(first.count_transactions(), 1);
        assert_each_sold_article_listed_once(&first);
    }

    #[test]
    fn conflicting_article_is_stripped_from_mixed_transaction() {
        let mut first = imported();
        let mut second = imported();
        sell(&mut first, &[key(1, 1)], 1, 0);
        sell(&mut second, &[key(1, 1), key(1, 3)], 2, 3);

        let summary = first.sync(&second);

        assert_eq!(summary.conflicts, 1);
        assert_eq!(summary.sales_adopted, 1);
        assert_eq!(summary.transactions_added, 1);
        let adopted = &first.transactions()[1];
        assert_eq!(adopted.articles, vec![key(1, 3)]);
        assert_eq!(adopted.sum, dec!(3));
        assert_each_sold_article_listed_once(&first);
        assert_eq!(
            first.transactions().iter().map(|t| t.sum).sum::<Decimal>(),
            first.sales_per_seller()[&SellerNumber::new(1)]
        );
    }

    #[test]
    fn syncing_with_own_copy_changes_nothing() {
        let mut ledger = imported();
        ledger.add_to_current_sale(key(1, 2)).unwrap();
        ledger
            .finish_current_sale(CashPointId::new(1).unwrap(), Utc::now())
            .unwrap();
        let copy = ledger.clone();

        let summary = ledger.sync(&copy);

        assert_eq!(
            summary,
            SyncSummary {
                transactions_skipped: 1,
                ..SyncSummary::default()
            }
        );
        assert_eq!(ledger.count_transactions(), 1);
    }

    fn assert_each_sold_article_listed_once(ledger: &ArticleLedger) {
        for article in ledger.articles().filter(|a| a.is_sold()) {
            let listed = ledger
                .transactions()
                .iter()
                .filter(|t| t.contains(article.key))
                .count();
            assert_eq!(listed, 1, "article {} listed {listed} times", article.key);
        }
    }

    #[test]
    fn unknown_articles_are_copied_with_their_state() {
        let mut first = imported();
        let mut second = ArticleLedger::new(Settings::default());
        second.add_article(Article::new(key(7, 1), dec!(2.5), "98", "shirt"));
        sell(&mut second, &[key(7, 1)], 3, 9);

        let summary = first.sync(&second);

        assert_eq!(summary.articles_added, 1);
        let copied = first.article(key(7, 1)).unwrap();
        assert!(copied.is_sold());
        assert_eq!(copied.size, "98");
        assert_eq!(first.count_transactions(), 1);
    }

    #[test]
    fn adopted_sale_leaves_current_sale() {
        let mut first = imported();
        let mut second = imported();
        first.add_to_current_sale(key(1, 2)).unwrap();
        sell(&mut second, &[key(1, 2)], 2, 4);

        first.sync(&second);

        assert!(first.is_current_sale_empty());
    }
}
