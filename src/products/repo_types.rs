use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Catalog record. Persisted records always have a name, a description and `price > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProductInformation {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
}

impl ProductInformation {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            price,
        }
    }
}

/// Case-insensitive substring match used by the name searches.
pub(crate) fn name_matches(name: &str, query: &str) -> bool {
    name.to_lowercase().contains(&query.to_lowercase())
}

pub(crate) fn price_within(price: f64, min: f64, max: f64) -> bool {
    price >= min && price <= max
}
