use std::collections::BTreeMap;

use basar_core::{Entity, SellerNumber};

use crate::seller::Seller;

/// Keyed store of sellers, ordered by seller number.
///
/// Re-importing a seller replaces the previous record (last write wins).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SellerRegistry {
    sellers: BTreeMap<SellerNumber, Seller>,
}

impl SellerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a seller; returns the replaced record, if any.
    pub fn add_seller(&mut self, seller: Seller) -> Option<Seller> {
        let previous = self.sellers.insert(seller.id(), seller);
        if let Some(previous) = &previous {
            tracing::debug!(seller = %previous.number, "seller record replaced");
        }
        previous
    }

    pub fn seller(&self, number: SellerNumber) -> Option<&Seller> {
        self.sellers.get(&number)
    }

    pub fn clear(&mut self) {
        self.sellers.clear();
    }

    pub fn len(&self) -> usize {
        self.sellers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sellers.is_empty()
    }

    /// Sellers in ascending number order.
    pub fn iter(&self) -> impl Iterator<Item = &Seller> {
        self.sellers.values()
    }
}

impl FromIterator<Seller> for SellerRegistry {
    fn from_iter<I: IntoIterator<Item = Seller>>(iter: I) -> Self {
        let mut registry = Self::new();
        for seller in iter {
            registry.add_seller(seller);
        }
        registry
    }
}
