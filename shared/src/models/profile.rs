//! Profile Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role stored in `profiles.role`
///
/// Accounts without a profile row are treated as buyers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Buyer,
    Supplier,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Supplier => "supplier",
            Role::Admin => "admin",
        }
    }

    /// Unknown values degrade to buyer, the least privileged role
    pub fn from_db(value: &str) -> Self {
        match value {
            "supplier" => Role::Supplier,
            "admin" => Role::Admin,
            _ => Role::Buyer,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: uuid::Uuid,
    pub role: Role,
}
