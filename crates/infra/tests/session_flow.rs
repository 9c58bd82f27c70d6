use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

use basar_core::{ArticleKey, ArticleNumber, CashPointId, NumberRange, SellerNumber, Settings};
use basar_infra::{CashPointSession, FileStore, LedgerStore, import, ledger_file};
use basar_ledger::ArticleLedger;
use basar_sellers::SellerRegistry;

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// Scratch directory removed on drop.
struct TestDir {
    path: PathBuf,
}

impl TestDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "basar-{name}-{}-{}",
            std::process::id(),
            NEXT_DIR.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create test dir");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, name: &str, contents: &str) {
        fs::write(self.path.join(name), contents).expect("failed to write test file");
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn key(seller: u32, article: u32) -> ArticleKey {
    ArticleKey::new(SellerNumber::new(seller), ArticleNumber::new(article))
}

fn write_lists(dir: &TestDir) {
    dir.write(
        "articleList_101.txt",
        "Article List\n1\n101\nAnna\nBerg\n0171\n1\n3,50\n104\nJacket\n2\n1,00\n\nBook\n",
    );
    dir.write(
        "articleList_102.txt",
        "Article List\n1\n102\nBen\nCole\n0172\n1\n10\n\nBike seat\n",
    );
    dir.write("articleList_broken.txt", "Article Lists\n1\n103\nX\nY\nZ\n");
    dir.write("notes.txt", "Article List\n1\n104\nX\nY\nZ\n");
}

#[test]
fn import_skips_priceless_articles_without_description() {
    let dir = TestDir::new("import-priceless");
    dir.write(
        "articleList_100000.txt",
        "Article List\n1\n100000\nMia\nKurz\n555\n1\n0\n\n\n2\n0\n\n\n",
    );
    let settings = Settings {
        seller_range: NumberRange::new(1, 100_000).unwrap(),
        ..Settings::default()
    };

    let mut ledger = ArticleLedger::new(settings.clone());
    let mut sellers = SellerRegistry::new();
    let summary = import::import_directory(dir.path(), &settings, &mut ledger, &mut sellers).unwrap();

    assert_eq!(summary.articles_imported, 0);
    assert_eq!(summary.sellers_imported, 1);
    assert!(ledger.is_empty());
    assert_eq!(
        sellers.seller(SellerNumber::new(100_000)).unwrap().full_name(),
        "Mia Kurz"
    );
}

#[test]
fn import_counts_rejected_and_out_of_range_files() {
    let dir = TestDir::new("import-batch");
    write_lists(&dir);
    let settings = Settings {
        seller_range: NumberRange::new(1, 101).unwrap(),
        ..Settings::default()
    };

    let mut ledger = ArticleLedger::new(settings.clone());
    let mut sellers = SellerRegistry::new();
    let summary = import::import_directory(dir.path(), &settings, &mut ledger, &mut sellers).unwrap();

    assert_eq!(summary.files_read, 3);
    assert_eq!(summary.files_rejected, 1);
    assert_eq!(summary.files_skipped, 1);
    assert_eq!(summary.sellers_imported, 1);
    assert_eq!(summary.articles_imported, 2);
}

#[test]
fn ledger_file_round_trip_on_disk() {
    let dir = TestDir::new("ledger-file");
    write_lists(&dir);
    let settings = Settings::default();
    let mut ledger = ArticleLedger::new(settings.clone());
    let mut sellers = SellerRegistry::new();
    import::import_directory(dir.path(), &settings, &mut ledger, &mut sellers).unwrap();
    ledger.add_to_current_sale(key(101, 1)).unwrap();
    ledger
        .finish_current_sale(
            CashPointId::new(2).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
        )
        .unwrap();

    let path = dir.path().join("out").join("ledger.xml");
    ledger_file::save(&path, &ledger).unwrap();
    assert!(!dir.path().join("out").join("ledger.xml.tmp").exists());

    let restored = ledger_file::load(&path, settings).unwrap();
    assert_eq!(restored.len(), ledger.len());
    assert_eq!(restored.transactions(), ledger.transactions());
    assert_eq!(restored.sales_per_seller(), ledger.sales_per_seller());
    for article in ledger.articles() {
        assert_eq!(restored.article(article.key), Some(article));
    }
}

#[test]
fn full_session_import_sell_return_reload_evaluate() {
    let data = TestDir::new("session-data");
    let lists = TestDir::new("session-lists");
    write_lists(&lists);
    let settings = Settings {
        deduction_percentage: dec!(20),
        ..Settings::default()
    };

    let mut session = CashPointSession::open(FileStore::new(data.path()), settings.clone()).unwrap();
    let summary = session.import_directory(lists.path(), true).unwrap();
    assert_eq!(summary.articles_imported, 3);

    session.scan("101001".parse().unwrap()).unwrap();
    session.scan("102001".parse().unwrap()).unwrap();
    let sale = session
        .finish_sale(Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(sale.sum, dec!(13.50));

    session.scan("101002".parse().unwrap()).unwrap();
    session
        .finish_sale(Utc.with_ymd_and_hms(2026, 3, 14, 10, 5, 0).unwrap())
        .unwrap();
    assert!(session.return_article(key(102, 1)).unwrap());
    drop(session);

    let reopened = CashPointSession::open(FileStore::new(data.path()), settings).unwrap();
    assert_eq!(reopened.ledger().count_transactions(), 2);
    assert_eq!(reopened.ledger().count_sold_articles(), 2);
    assert_eq!(reopened.sellers().len(), 2);

    let evaluation = reopened.evaluation();
    let stats = evaluation.statistics();
    assert_eq!(stats.revenue, dec!(4.50));
    assert_eq!(stats.deduction, dec!(0.90));

    let sold = evaluation.sold_articles();
    assert_eq!(sold.sections.len(), 2);
    assert_eq!(sold.sections[0].payout.name, "Anna Berg");
    assert_eq!(sold.sections[0].payout.payout, dec!(3.60));
    assert_eq!(sold.sections[1].line_count(), 0);

    let unsold = evaluation.unsold_articles();
    assert_eq!(unsold.sections.len(), 1);
    assert_eq!(unsold.sections[0].seller, SellerNumber::new(102));
}

#[test]
fn merging_an_exported_ledger_from_another_cash_point() {
    let lists = TestDir::new("sync-lists");
    write_lists(&lists);
    let first_dir = TestDir::new("sync-first");
    let second_dir = TestDir::new("sync-second");

    let second_settings = Settings {
        cash_point: CashPointId::new(2).unwrap(),
        ..Settings::default()
    };
    let mut second = CashPointSession::open(FileStore::new(second_dir.path()), second_settings).unwrap();
    second.import_directory(lists.path(), true).unwrap();
    second.scan("102001".parse().unwrap()).unwrap();
    second.finish_sale(Utc::now()).unwrap();
    let export = second_dir.path().join("export.xml");
    second.export(&export).unwrap();

    let mut first = CashPointSession::open(FileStore::new(first_dir.path()), Settings::default()).unwrap();
    first.import_directory(lists.path(), true).unwrap();
    let other = ledger_file::load(&export, first.settings().clone()).unwrap();
    let summary = first.sync(&other).unwrap();
    assert_eq!(summary.sales_adopted, 1);
    assert_eq!(summary.transactions_added, 1);

    let again = first.sync(&other).unwrap();
    assert_eq!(again.transactions_skipped, 1);

    let stored = first.store().load_ledger(first.settings()).unwrap();
    assert_eq!(
        stored.article(key(102, 1)).unwrap().sold_on(),
        Some(CashPointId::new(2).unwrap())
    );
    assert_eq!(stored.count_transactions(), 1);
}
