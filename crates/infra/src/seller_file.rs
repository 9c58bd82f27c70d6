//! XML seller file: `<sellers><seller>...</seller></sellers>`.
//!
//! Keeps names and phone numbers available for evaluations run in a later
//! process than the import.

use std::fs;
use std::path::Path;

use quick_xml::{de::from_str, se::to_string_with_root};
use serde::{Deserialize, Serialize};

use basar_core::SellerNumber;
use basar_sellers::{Seller, SellerRegistry};

use crate::ledger_file::write_atomic;
use crate::store::StoreError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SellerDocument {
    #[serde(rename = "seller", default)]
    items: Vec<SellerRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SellerRecord {
    number: u32,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    phone: String,
}

pub fn to_xml(sellers: &SellerRegistry) -> Result<String, StoreError> {
    let document = SellerDocument {
        items: sellers
            .iter()
            .map(|s| SellerRecord {
                number: s.number.get(),
                first_name: s.first_name.clone(),
                last_name: s.last_name.clone(),
                phone: s.phone.clone(),
            })
            .collect(),
    };
    to_string_with_root("sellers", &document).map_err(|e| StoreError::Xml(e.to_string()))
}

pub fn from_xml(xml: &str) -> Result<SellerRegistry, StoreError> {
    let document: SellerDocument = from_str(xml).map_err(|e| StoreError::Xml(e.to_string()))?;
    Ok(document
        .items
        .into_iter()
        .map(|r| {
            Seller::new(
                SellerNumber::new(r.number),
                r.first_name,
                r.last_name,
                r.phone,
            )
        })
        .collect())
}

pub fn load(path: &Path) -> Result<SellerRegistry, StoreError> {
    from_xml(&fs::read_to_string(path)?)
}

pub fn save(path: &Path, sellers: &SellerRegistry) -> Result<(), StoreError> {
    write_atomic(path, to_xml(sellers)?.as_bytes())?;
    tracing::debug!(path = %path.display(), sellers = sellers.len(), "sellers saved");
    Ok(())
}
