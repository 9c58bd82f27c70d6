//! Spreadsheet export of payouts and sold articles.
//!
//! Semicolon separated with comma decimals, so German spreadsheet programs
//! open the files without an import dialog.

use std::io::Write;

use csv::WriterBuilder;
use serde::Serialize;

use basar_core::money::format_money;

use crate::report::{Discrepancy, SoldArticlesReport};

#[derive(Serialize)]
struct PayoutCsvRow<'a> {
    seller: u32,
    name: &'a str,
    phone: &'a str,
    sold: usize,
    revenue: String,
    deduction: String,
    payout: String,
}

#[derive(Serialize)]
struct SoldCsvRow<'a> {
    seller: u32,
    article: u32,
    price: String,
    list_price: String,
    size: &'a str,
    description: &'a str,
}

fn writer<W: Write>(w: W) -> csv::Writer<W> {
    WriterBuilder::new().delimiter(b';').from_writer(w)
}

/// One row per seller with sales.
pub fn write_payouts<W: Write>(w: W, report: &SoldArticlesReport) -> csv::Result<()> {
    let mut wrt = writer(w);
    for section in &report.sections {
        let payout = &section.payout;
        wrt.serialize(PayoutCsvRow {
            seller: payout.seller.get(),
            name: &payout.name,
            phone: &payout.phone,
            sold: section.line_count(),
            revenue: format_money(payout.revenue),
            deduction: format_money(payout.deduction),
            payout: format_money(payout.payout),
        })?;
    }
    wrt.flush()?;
    Ok(())
}

/// One row per sold article, in seller and article order.
///
/// `list_price` is empty when the article was not listed with a price.
pub fn write_sold_articles<W: Write>(w: W, report: &SoldArticlesReport) -> csv::Result<()> {
    let mut wrt = writer(w);
    for section in &report.sections {
        for line in section.pages.iter().flat_map(|p| &p.rows) {
            let list_price = match line.discrepancy {
                Some(Discrepancy::ListPrice(list)) => format_money(list),
                Some(Discrepancy::NotListed) => String::new(),
                None => format_money(line.price),
            };
            wrt.serialize(SoldCsvRow {
                seller: section.payout.seller.get(),
                article: line.article.get(),
                price: format_money(line.price),
                list_price,
                size: &line.size,
                description: &line.description,
            })?;
        }
    }
    wrt.flush()?;
    Ok(())
}
