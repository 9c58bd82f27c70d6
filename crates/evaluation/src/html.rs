//! Standalone HTML rendering of the evaluation documents.
//!
//! Each printed page is a `<div class="page">`; page breaks follow the
//! pagination already present in the documents.

use std::{borrow::Cow, fmt::Write};

use rust_decimal::Decimal;

use basar_core::money::{format_decimal, format_money};

use basar_ledger::Category;

use crate::report::{
    CategoryRow, Discrepancy, OverviewReport, Page, PayoutRow, SoldArticlesReport, SoldLine, SoldSection,
    UnsoldArticlesReport,
};

const CSS: &str = r#"body { font-family: sans-serif; font-size: 12px; }
.page { page-break-after: always; }
table { border-collapse: collapse; margin-bottom: 12px; }
th, td { border: 1px solid #cbd5e0; padding: 2px 8px; text-align: left; }
th { background: #4a5568; color: #ffffff; }
td.money { text-align: right; }
td.cell { width: 40px; text-align: center; }
.caption { font-weight: bold; margin: 8px 0; }"#;

pub fn render_overview(report: &OverviewReport) -> String {
    let stats = &report.statistics;
    let mut html = open_document("Overview");

    let _ = writeln!(&mut html, r#"<div class="page">"#);
    let _ = writeln!(&mut html, "<h1>Evaluation</h1>");
    let _ = writeln!(
        &mut html,
        "<p>Generated {}</p>",
        report.generated_at.format("%d.%m.%Y %H:%M")
    );

    let _ = writeln!(&mut html, "<table>");
    key_value(&mut html, "Revenue", &money(stats.revenue));
    key_value(
        &mut html,
        &format!("Deduction ({} %)", format_decimal(stats.deduction_percentage, 1)),
        &money(stats.deduction),
    );
    key_value(&mut html, "Payout", &money(stats.payout()));
    key_value(&mut html, "Sales", &stats.sale_count.to_string());
    key_value(&mut html, "Articles sold", &stats.sold_count.to_string());
    key_value(
        &mut html,
        "Articles per sale",
        &format_decimal(stats.articles_per_sale(), 1),
    );
    let _ = writeln!(&mut html, "</table>");

    let _ = writeln!(&mut html, "<table>");
    key_value(&mut html, "Offered articles", &stats.offered_count.to_string());
    key_value(
        &mut html,
        "Offered clothing",
        &share(stats.offered_clothing, stats.offered_clothing_percentage()),
    );
    key_value(
        &mut html,
        "Offered miscellaneous",
        &share(stats.offered_misc, stats.offered_misc_percentage()),
    );
    key_value(
        &mut html,
        "Sold articles",
        &share(stats.sold_count, stats.sold_percentage()),
    );
    key_value(
        &mut html,
        "Sold clothing",
        &share(stats.sold_clothing, stats.sold_clothing_percentage()),
    );
    key_value(
        &mut html,
        "Sold miscellaneous",
        &share(stats.sold_misc, stats.sold_misc_percentage()),
    );
    let _ = writeln!(&mut html, "</table>");

    category_table(&mut html, &report.categories);

    for (title, ranges) in [
        ("Offered articles per seller", &report.offered_ranges),
        ("Sold articles per seller", &report.sold_ranges),
    ] {
        let _ = writeln!(&mut html, "<h2>{title}</h2>");
        let _ = writeln!(&mut html, "<table>");
        header_row(&mut html, &["Articles", "Sellers"]);
        for (bucket, sellers) in ranges {
            let _ = writeln!(&mut html, "<tr><td>{bucket}</td><td>{sellers}</td></tr>");
        }
        let _ = writeln!(&mut html, "</table>");
    }
    let _ = writeln!(&mut html, "</div>");

    for page in &report.payout_pages {
        payout_page(&mut html, page);
    }

    close_document(html)
}

fn category_table(html: &mut String, rows: &[CategoryRow]) {
    let _ = writeln!(html, "<h2>By category</h2>");
    let _ = writeln!(html, "<table>");
    header_row(html, &["Category", "Offered", "Sold", "Revenue", "Share"]);
    for row in rows {
        let name = match row.category {
            Category::Clothing => "Clothing",
            Category::Miscellaneous => "Miscellaneous",
        };
        let _ = writeln!(
            html,
            r#"<tr><td>{name}</td><td>{}</td><td>{}</td><td class="money">{}</td><td class="money">{} %</td></tr>"#,
            row.offered,
            row.sold,
            money(row.revenue),
            format_decimal(row.revenue_percentage, 1)
        );
    }
    let _ = writeln!(html, "</table>");
}

fn payout_page(html: &mut String, page: &Page<PayoutRow>) {
    let _ = writeln!(html, r#"<div class="page">"#);
    let _ = writeln!(html, "<h1>Revenue per seller</h1>");
    let _ = writeln!(html, "<table>");
    header_row(html, &["Seller", "Revenue", "Payout"]);
    for row in &page.rows {
        let _ = writeln!(
            html,
            r#"<tr><td>{}</td><td class="money">{}</td><td class="money">{}</td></tr>"#,
            row.seller,
            money(row.revenue),
            money(row.payout)
        );
    }
    let _ = writeln!(html, "</table>");
    let _ = writeln!(html, "</div>");
}

pub fn render_sold_articles(report: &SoldArticlesReport) -> String {
    let mut html = open_document("Sold articles");
    for section in &report.sections {
        sold_section(&mut html, section);
    }
    close_document(html)
}

fn sold_section(html: &mut String, section: &SoldSection) {
    let payout = &section.payout;
    for page in &section.pages {
        let _ = writeln!(html, r#"<div class="page">"#);
        if page.continued {
            let _ = writeln!(
                html,
                r#"<p class="caption">Sold articles of seller {} - {} (continued)</p>"#,
                payout.seller,
                escape_html(&payout.name)
            );
        } else {
            let _ = writeln!(html, "<table>");
            key_value(html, "Seller", &payout.seller.to_string());
            key_value(html, "Name", &payout.name);
            key_value(html, "Phone", &payout.phone);
            key_value(html, "Revenue", &money(payout.revenue));
            key_value(html, "Deduction", &money(payout.deduction));
            let _ = writeln!(
                html,
                "<tr><td><b>Payout</b></td><td><b>{}</b></td></tr>",
                money(payout.payout)
            );
            let _ = writeln!(html, "</table>");
        }

        if !page.rows.is_empty() {
            let _ = writeln!(html, "<table>");
            if section.show_discrepancy {
                header_row(html, &["Article", "Price", "Size", "Description", "Note"]);
            } else {
                header_row(html, &["Article", "Price", "Size", "Description"]);
            }
            for line in &page.rows {
                sold_line(html, line, section.show_discrepancy);
            }
            let _ = writeln!(html, "</table>");
        }
        let _ = writeln!(html, "</div>");
    }
}

fn sold_line(html: &mut String, line: &SoldLine, show_discrepancy: bool) {
    let _ = write!(
        html,
        r#"<tr><td>{}</td><td class="money">{}</td><td>{}</td><td>{}</td>"#,
        line.article,
        money(line.price),
        escape_html(&line.size),
        escape_html(&line.description)
    );
    if show_discrepancy {
        let note = match line.discrepancy {
            Some(Discrepancy::ListPrice(list)) => format!("list price {}", money(list)),
            Some(Discrepancy::NotListed) => "not registered online".to_string(),
            None => String::new(),
        };
        let _ = write!(html, "<td>{note}</td>");
    }
    let _ = writeln!(html, "</tr>");
}

pub fn render_unsold_articles(report: &UnsoldArticlesReport) -> String {
    let mut html = open_document("Unsold articles");
    for section in &report.sections {
        let _ = writeln!(&mut html, r#"<div class="page">"#);
        let _ = writeln!(
            &mut html,
            r#"<p class="caption">Unsold articles of seller {} - {}</p>"#,
            section.seller,
            escape_html(&section.name)
        );
        let _ = writeln!(&mut html, "<table>");
        for row in &section.grid {
            let _ = write!(&mut html, "<tr>");
            for cell in row {
                match cell {
                    Some(article) => {
                        let _ = write!(&mut html, r#"<td class="cell">{article}</td>"#);
                    }
                    None => {
                        let _ = write!(&mut html, r#"<td class="cell"></td>"#);
                    }
                }
            }
            let _ = writeln!(&mut html, "</tr>");
        }
        let _ = writeln!(&mut html, "</table>");
        let _ = writeln!(&mut html, "</div>");
    }
    close_document(html)
}

fn open_document(title: &str) -> String {
    let mut html = String::with_capacity(8192);
    let _ = writeln!(&mut html, "<!DOCTYPE html>");
    let _ = writeln!(&mut html, r#"<html><head><meta charset="utf-8">"#);
    let _ = writeln!(&mut html, "<title>{}</title>", escape_html(title));
    let _ = writeln!(&mut html, "<style>\n{CSS}\n</style>");
    let _ = writeln!(&mut html, "</head><body>");
    html
}

fn close_document(mut html: String) -> String {
    html.push_str("</body></html>\n");
    html
}

fn header_row(html: &mut String, headers: &[&str]) {
    let _ = write!(html, "<tr>");
    for header in headers {
        let _ = write!(html, "<th>{}</th>", escape_html(header));
    }
    let _ = writeln!(html, "</tr>");
}

fn key_value(html: &mut String, key: &str, value: &str) {
    let _ = writeln!(
        html,
        "<tr><td>{}</td><td>{}</td></tr>",
        escape_html(key),
        escape_html(value)
    );
}

fn money(amount: Decimal) -> String {
    format!("{} EUR", format_money(amount))
}

fn share(count: usize, percentage: Decimal) -> String {
    format!("{count} ({} %)", format_decimal(percentage, 1))
}

fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 10);
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Evaluation, SellerPayout, UnsoldSection, paginate};
    use basar_core::{ArticleKey, ArticleNumber, CashPointId, SellerNumber, Settings};
    use basar_ledger::{Article, ArticleLedger};
    use basar_sellers::{Seller, SellerRegistry};
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn key(seller: u32, article: u32) -> ArticleKey {
        ArticleKey::new(SellerNumber::new(seller), ArticleNumber::new(article))
    }

    fn line(article: u32, discrepancy: Option<Discrepancy>) -> SoldLine {
        SoldLine {
            article: ArticleNumber::new(article),
            price: dec!(3.5),
            size: String::new(),
            description: "Teddy".into(),
            discrepancy,
        }
    }

    fn section(lines: Vec<SoldLine>, show_discrepancy: bool) -> SoldSection {
        SoldSection {
            payout: SellerPayout {
                seller: SellerNumber::new(42),
                name: "Tom & Jerry".into(),
                phone: "123".into(),
                revenue: dec!(3.5),
                deduction: dec!(0.7),
                payout: dec!(2.8),
            },
            show_discrepancy,
            pages: paginate(lines, 37, 42),
        }
    }

    #[test]
    fn escape_replaces_markup() {
        assert_eq!(escape_html("plain"), "plain");
        assert_eq!(escape_html("<b>\"x\" & 'y'"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;");
    }

    #[test]
    fn sold_articles_render_money_with_comma() {
        let report = SoldArticlesReport {
            sections: vec![section(vec![line(1, None)], false)],
        };
        let html = render_sold_articles(&report);
        assert!(html.contains("3,50 EUR"));
        assert!(html.contains("<b>2,80 EUR</b>"));
        assert!(html.contains("Tom &amp; Jerry"));
        assert!(!html.contains("<th>Note</th>"));
    }

    #[test]
    fn discrepancy_column_only_when_needed() {
        let report = SoldArticlesReport {
            sections: vec![section(
                vec![
                    line(1, Some(Discrepancy::ListPrice(dec!(4)))),
                    line(2, Some(Discrepancy::NotListed)),
                    line(3, None),
                ],
                true,
            )],
        };
        let html = render_sold_articles(&report);
        assert!(html.contains("<th>Note</th>"));
        assert!(html.contains("list price 4,00 EUR"));
        assert!(html.contains("not registered online"));
    }

    #[test]
    fn continuation_pages_repeat_header_with_caption() {
        let lines = (1..=40).map(|n| line(n, None)).collect();
        let html = render_sold_articles(&SoldArticlesReport {
            sections: vec![section(lines, false)],
        });
        assert_eq!(html.matches(r#"<div class="page">"#).count(), 2);
        assert_eq!(html.matches("<th>Article</th>").count(), 2);
        assert!(html.contains("Sold articles of seller 42 - Tom &amp; Jerry (continued)"));
    }

    #[test]
    fn unsold_grid_renders_blank_cells() {
        let report = UnsoldArticlesReport {
            sections: vec![UnsoldSection {
                seller: SellerNumber::new(7),
                name: "Eva".into(),
                grid: vec![vec![Some(ArticleNumber::new(1)), None]],
            }],
        };
        let html = render_unsold_articles(&report);
        assert!(html.contains(r#"<tr><td class="cell">1</td><td class="cell"></td></tr>"#));
    }

    #[test]
    fn overview_renders_statistics_and_payouts() {
        let mut ledger = ArticleLedger::new(Settings::default());
        ledger.add_article(Article::new(key(12, 1), dec!(10), "", "Scooter"));
        ledger.add_article(Article::new(key(12, 2), dec!(2), "86", "Dress"));
        ledger.add_to_current_sale(key(12, 1)).unwrap();
        ledger
            .finish_current_sale(CashPointId::FIRST, Utc::now())
            .unwrap();
        let mut sellers = SellerRegistry::new();
        sellers.add_seller(Seller::new(SellerNumber::new(12), "Ida", "Lund", ""));

        let generated_at = NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(17, 30, 0)
            .unwrap();
        let html = render_overview(&Evaluation::new(&ledger, &sellers).overview(generated_at));

        assert!(html.contains("Generated 14.03.2026 17:30"));
        assert!(html.contains("<td>Revenue</td><td>10,00 EUR</td>"));
        assert!(html.contains("<td>Sold articles</td><td>1 (50,0 %)</td>"));
        assert!(html.contains(
            r#"<tr><td>Miscellaneous</td><td>1</td><td>1</td><td class="money">10,00 EUR</td><td class="money">100,0 %</td></tr>"#
        ));
        assert!(html.contains(
            r#"<tr><td>Clothing</td><td>1</td><td>0</td><td class="money">0,00 EUR</td><td class="money">0,0 %</td></tr>"#
        ));
        assert!(html.contains(r#"<td>12</td><td class="money">10,00 EUR</td><td class="money">8,00 EUR</td>"#));
        assert!(html.ends_with("</body></html>\n"));
    }
}
