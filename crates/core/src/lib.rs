//! `basar-core`: domain foundation building blocks.
//!
//! Identifiers, the domain error type, number ranges, money formatting and the
//! bazaar settings. This crate contains **pure domain** primitives (no IO).

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod range;
pub mod settings;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ArticleKey, ArticleNumber, CashPointId, SellerNumber};
pub use range::NumberRange;
pub use settings::Settings;
