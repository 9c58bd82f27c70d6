//! Financial evaluation of a bazaar: statistics, payout documents, their
//! HTML rendering and the spreadsheet export.

pub mod export;
pub mod html;
pub mod report;
pub mod statistics;

pub use report::{
    CategoryRow, Discrepancy, Evaluation, OverviewReport, Page, PayoutRow, SellerPayout,
    SoldArticlesReport, SoldLine, SoldSection, UnsoldArticlesReport, UnsoldSection,
};
pub use statistics::Statistics;
