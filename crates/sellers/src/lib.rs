//! Seller registry: maps seller numbers to contact information.
//!
//! Pure domain logic only (no IO). Sellers are created by the article-list
//! import and looked up by the checkout and the evaluation reports.

pub mod registry;
pub mod seller;

pub use registry::SellerRegistry;
pub use seller::Seller;
