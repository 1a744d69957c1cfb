use serde::{Deserialize, Serialize};

/// Coarse authorization label attached to every user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Vendor,
}

impl Role {
    /// Signup mapping: only the exact label `ADMIN` grants admin, anything else is a vendor.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("ADMIN") => Role::Admin,
            _ => Role::Vendor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Vendor => "VENDOR",
        }
    }

    /// Whether the role may reach the product management routes.
    pub fn can_manage_catalog(&self) -> bool {
        match self {
            Role::Admin | Role::Vendor => true,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
