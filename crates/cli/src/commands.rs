use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{Local, Utc};
use rust_decimal::Decimal;

use basar_core::ArticleKey;
use basar_core::money::format_money;
use basar_evaluation::{Evaluation, export, html};
use basar_infra::{CashPointSession, LedgerStore, ledger_file};
use basar_ledger::ScanCode;

use crate::cli::{Command, PriceOverride};

pub const OVERVIEW_FILE: &str = "overview.html";
pub const SOLD_FILE: &str = "sold-articles.html";
pub const UNSOLD_FILE: &str = "unsold-articles.html";
pub const PAYOUTS_CSV: &str = "payouts.csv";
pub const SOLD_CSV: &str = "sold-articles.csv";

pub fn run<S: LedgerStore>(session: &mut CashPointSession<S>, command: Command) -> Result<()> {
    match command {
        Command::Import { dir, clear } => import(session, &dir, clear),
        Command::Sell {
            codes,
            prices,
            given,
        } => sell(session, &codes, &prices, given),
        Command::Return { seller, article } => {
            let key = ArticleKey::new(seller, article);
            if !session.return_article(key)? {
                bail!("article {key} is unknown or not sold");
            }
            println!("returned {key}");
            Ok(())
        }
        Command::History => {
            history(session);
            Ok(())
        }
        Command::Export { out } => {
            session
                .export(&out)
                .with_context(|| format!("exporting to {}", out.display()))?;
            println!("ledger written to {}", out.display());
            Ok(())
        }
        Command::Sync { files } => sync(session, &files),
        Command::Evaluate { merge, out } => evaluate(session, &merge, &out),
    }
}

fn import<S: LedgerStore>(session: &mut CashPointSession<S>, dir: &Path, clear: bool) -> Result<()> {
    let summary = session
        .import_directory(dir, clear)
        .with_context(|| format!("importing {}", dir.display()))?;

    if summary.articles_imported == 0 {
        println!("no articles imported");
    } else {
        println!(
            "imported {} articles from {} sellers",
            summary.articles_imported, summary.sellers_imported
        );
    }
    if summary.files_rejected > 0 || summary.files_skipped > 0 {
        println!(
            "{} files rejected, {} files skipped (seller out of range)",
            summary.files_rejected, summary.files_skipped
        );
    }
    Ok(())
}

/// Scan every code, apply price overrides, then finish the sale.
///
/// Any failure aborts before the sale is finished, so nothing is stored.
fn sell<S: LedgerStore>(
    session: &mut CashPointSession<S>,
    codes: &[ScanCode],
    prices: &[PriceOverride],
    given: Option<Decimal>,
) -> Result<()> {
    for code in codes {
        let outcome = session
            .scan(*code)
            .with_context(|| format!("scanning {}", code.key()))?;
        let key = outcome.key();

        match prices.iter().find(|p| p.key == key) {
            Some(p) => session.correct_last_price(p.price)?,
            None if outcome.needs_price() => {
                bail!(
                    "article {key} has no price, pass --price {:03}{:03}=<amount>",
                    key.seller.get(),
                    key.article.get()
                );
            }
            None => {}
        }
    }

    let sum = session.ledger().current_sale_sum();
    let change = match given {
        Some(given) if given < sum => {
            bail!("{} given is less than the sum of {}", format_money(given), format_money(sum))
        }
        Some(given) => Some(session.ledger().change_due(given)),
        None => None,
    };

    let Some(transaction) = session.finish_sale(Utc::now())? else {
        return Ok(());
    };
    for key in &transaction.articles {
        if let Some(article) = session.ledger().article(*key) {
            println!(
                "{:>9}  {:<30} {:>10}",
                key.to_string(),
                article.description,
                format_money(article.price)
            );
        }
    }
    println!("{:>9}  {:<30} {:>10}", "", "sum", format_money(transaction.sum));
    if let Some(change) = change {
        println!("{:>9}  {:<30} {:>10}", "", "change", format_money(change));
    }
    Ok(())
}

fn history<S: LedgerStore>(session: &CashPointSession<S>) {
    let transactions = session.ledger().transactions();
    if transactions.is_empty() {
        println!("no transactions");
        return;
    }
    for (n, t) in transactions.iter().enumerate() {
        let keys: Vec<String> = t.articles.iter().map(ToString::to_string).collect();
        println!(
            "{:>4}  cash point {}  {}  {:>10}  {}",
            n + 1,
            t.cash_point,
            t.completed_at.with_timezone(&Local).format("%d.%m.%Y %H:%M:%S"),
            format_money(t.sum),
            keys.join(" ")
        );
    }
}

fn sync<S: LedgerStore>(session: &mut CashPointSession<S>, files: &[PathBuf]) -> Result<()> {
    for file in files {
        let other = ledger_file::load(file, session.settings().clone())
            .with_context(|| format!("reading {}", file.display()))?;
        let summary = session.sync(&other)?;
        println!(
            "{}: {} articles added, {} sales adopted, {} conflicts, {} transactions added, {} already known, {} dropped",
            file.display(),
            summary.articles_added,
            summary.sales_adopted,
            summary.conflicts,
            summary.transactions_added,
            summary.transactions_skipped,
            summary.transactions_dropped
        );
    }
    Ok(())
}

fn evaluate<S: LedgerStore>(session: &CashPointSession<S>, merge: &[PathBuf], out: &Path) -> Result<()> {
    let mut ledger = session.ledger().clone();
    for file in merge {
        let other = ledger_file::load(file, session.settings().clone())
            .with_context(|| format!("reading {}", file.display()))?;
        ledger.sync(&other);
    }

    let evaluation = Evaluation::new(&ledger, session.sellers());
    write_reports(&evaluation, out)?;

    let stats = evaluation.statistics();
    println!(
        "revenue {}, deduction {}, payout {}",
        format_money(stats.revenue),
        format_money(stats.deduction),
        format_money(stats.payout())
    );
    println!("reports written to {}", out.display());
    Ok(())
}

fn write_reports(evaluation: &Evaluation<'_>, out: &Path) -> Result<()> {
    fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;

    let overview = evaluation.overview(Local::now().naive_local());
    let sold = evaluation.sold_articles();
    let mut payouts_csv = Vec::new();
    export::write_payouts(&mut payouts_csv, &sold).context("exporting payouts")?;
    let mut sold_csv = Vec::new();
    export::write_sold_articles(&mut sold_csv, &sold).context("exporting sold articles")?;

    let documents = [
        (OVERVIEW_FILE, html::render_overview(&overview).into_bytes()),
        (SOLD_FILE, html::render_sold_articles(&sold).into_bytes()),
        (UNSOLD_FILE, html::render_unsold_articles(&evaluation.unsold_articles()).into_bytes()),
        (PAYOUTS_CSV, payouts_csv),
        (SOLD_CSV, sold_csv),
    ];
    for (name, document) in documents {
        let path = out.join(name);
        fs::write(&path, document).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "report written");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use basar_core::{ArticleNumber, SellerNumber, Settings};
    use basar_infra::InMemoryStore;
    use basar_ledger::{Article, ArticleLedger};
    use rust_decimal_macros::dec;

    fn key(seller: u32, article: u32) -> ArticleKey {
        ArticleKey::new(SellerNumber::new(seller), ArticleNumber::new(article))
    }

    fn session() -> CashPointSession<InMemoryStore> {
        let store = InMemoryStore::new();
        let mut ledger = ArticleLedger::new(Settings::default());
        ledger.add_article(Article::new(key(120, 7), dec!(4.00), "", "Lego"));
        ledger.add_article(Article::new(key(120, 8), dec!(0), "", "Puzzle"));
        store.save_ledger(&ledger).unwrap();
        CashPointSession::open(store, Settings::default()).unwrap()
    }

    fn codes(raw: &[&str]) -> Vec<ScanCode> {
        raw.iter().map(|c| c.parse().unwrap()).collect()
    }

    #[test]
    fn sell_requires_a_price_for_priceless_articles() {
        let mut session = session();
        let err = sell(&mut session, &codes(&["120007", "120008"]), &[], None).unwrap_err();
        assert!(err.to_string().contains("--price 120008="));
        assert_eq!(session.ledger().count_transactions(), 0);
    }

    #[test]
    fn sell_with_price_override_finishes_the_sale() {
        let mut session = session();
        let prices = ["120008=1,50".parse::<PriceOverride>().unwrap()];
        sell(&mut session, &codes(&["120007", "120008"]), &prices, Some(dec!(10))).unwrap();

        let transaction = &session.ledger().transactions()[0];
        assert_eq!(transaction.sum, dec!(5.50));
        assert_eq!(session.store().ledger_saves(), 2);
    }

    #[test]
    fn evaluate_writes_html_and_csv_reports() {
        let mut session = session();
        sell(&mut session, &codes(&["120007"]), &[], None).unwrap();
        let out = std::env::temp_dir().join(format!("basar-reports-{}", std::process::id()));

        evaluate(&session, &[], &out).unwrap();

        for name in [OVERVIEW_FILE, SOLD_FILE, UNSOLD_FILE, PAYOUTS_CSV, SOLD_CSV] {
            assert!(out.join(name).is_file(), "{name} missing");
        }
        let payouts = fs::read_to_string(out.join(PAYOUTS_CSV)).unwrap();
        assert!(payouts.contains("120;;;1;4,00;0,80;3,20"));
        let _ = fs::remove_dir_all(&out);
    }

    #[test]
    fn sell_rejects_insufficient_payment() {
        let mut session = session();
        assert!(sell(&mut session, &codes(&["120007"]), &[], Some(dec!(2))).is_err());
        assert_eq!(session.ledger().count_sold_articles(), 0);
    }
}
