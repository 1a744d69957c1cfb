use serde::Deserialize;
use uuid::Uuid;

use super::repo_types::ProductInformation;

/// Body of `add` and `update`. Every field may be omitted or null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProductPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl ProductPayload {
    /// `Some` only when every required field is present. A missing id is generated.
    pub fn into_product(self) -> Option<ProductInformation> {
        Some(ProductInformation {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: self.name?,
            description: self.description?,
            price: self.price?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIdQuery {
    pub product_id: String,
}

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeQuery {
    pub min_price: f64,
    pub max_price: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameAndPriceQuery {
    pub name: String,
    pub min_price: f64,
    pub max_price: f64,
}
