use serde::{Deserialize, Serialize};

use basar_core::{Entity, SellerNumber};

/// A person offering articles at the bazaar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seller {
    pub number: SellerNumber,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl Seller {
    pub fn new(
        number: SellerNumber,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            number,
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: phone.into(),
        }
    }

    /// `"first last"`, without dangling spaces when one part is missing.
    pub fn full_name(&self) -> String {
        match (self.first_name.trim(), self.last_name.trim()) {
            ("", last) => last.to_string(),
            (first, "") => first.to_string(),
            (first, last) => format!("{first} {last}"),
        }
    }
}

impl Entity for Seller {
    type Id = SellerNumber;

    fn id(&self) -> Self::Id {
        self.number
    }
}
