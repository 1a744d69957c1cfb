use std::sync::Arc;

use tracing::{info, warn};

use super::{
    dto::ProductPayload, error::BadRequest, repo::ProductStore, repo_types::ProductInformation,
};

/// Validation and orchestration around the product store.
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub async fn list_all(&self) -> Result<Vec<ProductInformation>, BadRequest> {
        self.store
            .find_all()
            .await
            .map_err(|e| BadRequest::wrap("Failed to get products", e))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<ProductInformation>, BadRequest> {
        self.store
            .find_by_id(id)
            .await
            .map_err(|e| BadRequest::wrap("Failed to get product", e))
    }

    /// `true` when the payload is NOT acceptable for creation.
    pub fn validate(product: &ProductPayload) -> bool {
        product.name.is_none()
            || product.description.is_none()
            || !matches!(product.price, Some(p) if p > 0.0)
    }

    /// Persists a new record as given; validation is the caller's job.
    /// An id that is already taken is refused rather than overwritten.
    pub async fn create(
        &self,
        product: ProductInformation,
    ) -> Result<ProductInformation, BadRequest> {
        let saved = self
            .store
            .insert(product)
            .await
            .map_err(|e| BadRequest::wrap("Failed to add product", e))?;
        info!(product_id = %saved.id, "product created");
        Ok(saved)
    }

    /// Partial update: absent fields are kept, a supplied price must be positive.
    pub async fn update(
        &self,
        id: &str,
        patch: ProductPayload,
    ) -> Result<ProductInformation, BadRequest> {
        let Some(mut existing) = self
            .store
            .find_by_id(id)
            .await
            .map_err(|e| BadRequest::wrap("Failed to update product", e))?
        else {
            warn!(product_id = %id, "update of unknown product");
            return Err(not_found(id));
        };

        if matches!(patch.price, Some(p) if p <= 0.0) {
            warn!(product_id = %id, price = ?patch.price, "rejected non-positive price");
            return Err(BadRequest::new("Price cannot be less than or equal to 0"));
        }

        if let Some(description) = patch.description {
            existing.description = description;
        }
        if let Some(name) = patch.name {
            existing.name = name;
        }
        if let Some(price) = patch.price {
            existing.price = price;
        }

        let saved = self
            .store
            .save(existing)
            .await
            .map_err(|e| BadRequest::wrap("Failed to update product", e))?;
        info!(product_id = %saved.id, "product updated");
        Ok(saved)
    }

    pub async fn delete(&self, id: &str) -> Result<(), BadRequest> {
        let found = self
            .store
            .find_by_id(id)
            .await
            .map_err(|e| BadRequest::wrap("Failed to delete product", e))?;
        if found.is_none() {
            warn!(product_id = %id, "delete of unknown product");
            return Err(not_found(id));
        }
        self.store
            .delete_by_id(id)
            .await
            .map_err(|e| BadRequest::wrap("Failed to delete product", e))?;
        info!(product_id = %id, "product deleted");
        Ok(())
    }

    pub async fn search_by_name(&self, name: &str) -> Result<Vec<ProductInformation>, BadRequest> {
        self.store
            .find_by_name_containing(name)
            .await
            .map_err(|e| BadRequest::wrap("Failed to search product by name", e))
    }

    pub async fn search_by_price_range(
        &self,
        min: f64,
        max: f64,
    ) -> Result<Vec<ProductInformation>, BadRequest> {
        self.store
            .find_by_price_between(min, max)
            .await
            .map_err(|e| BadRequest::wrap("Failed to search product by price range", e))
    }

    pub async fn search_by_name_and_price(
        &self,
        name: &str,
        min: f64,
        max: f64,
    ) -> Result<Vec<ProductInformation>, BadRequest> {
        self.store
            .find_by_name_and_price_range(name, min, max)
            .await
            .map_err(|e| BadRequest::wrap("Failed to search product by name and price range", e))
    }
}

fn not_found(id: &str) -> BadRequest {
    BadRequest(format!("Product not found with ID: {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::repo::MemoryProductStore;
    use async_trait::async_trait;

    struct FailingStore;

    #[async_trait]
    impl ProductStore for FailingStore {
        async fn find_all(&self) -> anyhow::Result<Vec<ProductInformation>> {
            anyhow::bail!("Database error")
        }
        async fn find_by_id(&self, _id: &str) -> anyhow::Result<Option<ProductInformation>> {
            anyhow::bail!("Database error")
        }
        async fn insert(&self, _p: ProductInformation) -> anyhow::Result<ProductInformation> {
            anyhow::bail!("Database error")
        }
        async fn save(&self, _p: ProductInformation) -> anyhow::Result<ProductInformation> {
            anyhow::bail!("Database error")
        }
        async fn delete_by_id(&self, _id: &str) -> anyhow::Result<()> {
            anyhow::bail!("Database error")
        }
        async fn find_by_name_containing(
            &self,
            _name: &str,
        ) -> anyhow::Result<Vec<ProductInformation>> {
            anyhow::bail!("Database error")
        }
        async fn find_by_price_between(
            &self,
            _min: f64,
            _max: f64,
        ) -> anyhow::Result<Vec<ProductInformation>> {
            anyhow::bail!("Database error")
        }
        async fn find_by_name_and_price_range(
            &self,
            _name: &str,
            _min: f64,
            _max: f64,
        ) -> anyhow::Result<Vec<ProductInformation>> {
            anyhow::bail!("Database error")
        }
    }

    fn product(id: &str, name: &str, price: f64) -> ProductInformation {
        ProductInformation::new(id, name, format!("Description {id}"), price)
    }

    fn payload(name: Option<&str>, description: Option<&str>, price: Option<f64>) -> ProductPayload {
        ProductPayload {
            id: Some("p".into()),
            name: name.map(str::to_string),
            description: description.map(str::to_string),
            price,
        }
    }

    async fn seeded() -> ProductService {
        let svc = ProductService::new(Arc::new(MemoryProductStore::new()));
        svc.create(product("1", "Product 1", 100.0)).await.unwrap();
        svc.create(product("2", "Product 2", 200.0)).await.unwrap();
        svc
    }

    fn failing() -> ProductService {
        ProductService::new(Arc::new(FailingStore))
    }

    #[test]
    fn validate_accepts_complete_positive_product() {
        assert!(!ProductService::validate(&payload(Some("n"), Some("d"), Some(0.01))));
        assert!(!ProductService::validate(&payload(Some(""), Some(""), Some(10.0))));
    }

    #[test]
    fn validate_rejects_missing_fields_or_non_positive_price() {
        assert!(ProductService::validate(&payload(None, Some("d"), Some(1.0))));
        assert!(ProductService::validate(&payload(Some("n"), None, Some(1.0))));
        assert!(ProductService::validate(&payload(Some("n"), Some("d"), Some(0.0))));
        assert!(ProductService::validate(&payload(Some("n"), Some("d"), Some(-3.0))));
        assert!(ProductService::validate(&payload(Some("n"), Some("d"), None)));
    }

    #[tokio::test]
    async fn list_all_empty_is_not_an_error() {
        let svc = ProductService::new(Arc::new(MemoryProductStore::new()));
        assert!(svc.list_all().await.unwrap().is_empty());
        assert_eq!(seeded().await.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let svc = ProductService::new(Arc::new(MemoryProductStore::new()));
        let input = product("abc", "Lamp", 42.5);
        let created = svc.create(input.clone()).await.unwrap();
        assert_eq!(created, input);
        assert_eq!(svc.get_by_id("abc").await.unwrap(), Some(input));
        assert_eq!(svc.get_by_id("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn create_wraps_store_fault() {
        let err = failing().create(product("1", "P", 1.0)).await.unwrap_err();
        assert_eq!(err.message(), "Failed to add product: Database error");
    }

    #[tokio::test]
    async fn create_refuses_duplicate_id() {
        let svc = seeded().await;
        let err = svc
            .create(product("1", "Clobber", 99.0))
            .await
            .unwrap_err();
        assert_eq!(
            err.message(),
            "Failed to add product: product with ID 1 already exists"
        );
        assert_eq!(svc.get_by_id("1").await.unwrap().unwrap().name, "Product 1");
    }

    #[tokio::test]
    async fn update_merges_supplied_fields() {
        let svc = seeded().await;
        let updated = svc
            .update(
                "1",
                payload(Some("Updated Product"), Some("Updated Description"), Some(150.0)),
            )
            .await
            .unwrap();
        assert_eq!(
            updated,
            ProductInformation::new("1", "Updated Product", "Updated Description", 150.0)
        );
        assert_eq!(svc.get_by_id("1").await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn update_keeps_omitted_fields() {
        let svc = seeded().await;
        let updated = svc
            .update("1", payload(Some("Renamed"), None, None))
            .await
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.description, "Description 1");
        assert_eq!(updated.price, 100.0);
    }

    #[tokio::test]
    async fn update_rejects_non_positive_price() {
        let svc = seeded().await;
        let err = svc
            .update("1", payload(Some("Updated"), None, Some(-50.0)))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Price cannot be less than or equal to 0");

        let err = svc.update("1", payload(None, None, Some(0.0))).await.unwrap_err();
        assert_eq!(err.message(), "Price cannot be less than or equal to 0");

        assert_eq!(svc.get_by_id("1").await.unwrap().unwrap().name, "Product 1");
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let err = seeded()
            .await
            .update("9", payload(Some("x"), None, Some(5.0)))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Product not found with ID: 9");
    }

    #[tokio::test]
    async fn update_wraps_store_fault() {
        let err = failing()
            .update("1", payload(None, None, Some(5.0)))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Failed to update product: Database error");
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let svc = seeded().await;
        svc.delete("1").await.unwrap();
        assert_eq!(svc.get_by_id("1").await.unwrap(), None);
        assert_eq!(svc.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_unknown_id_is_not_found() {
        let err = seeded().await.delete("9").await.unwrap_err();
        assert!(err.message().contains("not found"));
    }

    #[tokio::test]
    async fn delete_wraps_store_fault() {
        let err = failing().delete("1").await.unwrap_err();
        assert_eq!(err.message(), "Failed to delete product: Database error");
    }

    #[tokio::test]
    async fn searches_filter_by_name_and_price() {
        let svc = seeded().await;
        assert_eq!(svc.search_by_name("product").await.unwrap().len(), 2);
        assert_eq!(svc.search_by_name("PRODUCT 2").await.unwrap()[0].id, "2");

        let in_range = svc.search_by_price_range(50.0, 150.0).await.unwrap();
        assert_eq!(in_range, vec![product("1", "Product 1", 100.0)]);

        let both = svc.search_by_name_and_price("product", 150.0, 250.0).await.unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].id, "2");
        assert!(svc
            .search_by_name_and_price("lamp", 0.0, 1000.0)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn searches_wrap_store_faults() {
        let svc = failing();
        assert_eq!(
            svc.search_by_name("Product").await.unwrap_err().message(),
            "Failed to search product by name: Database error"
        );
        assert_eq!(
            svc.search_by_price_range(50.0, 150.0).await.unwrap_err().message(),
            "Failed to search product by price range: Database error"
        );
        assert_eq!(
            svc.search_by_name_and_price("Product", 50.0, 150.0)
                .await
                .unwrap_err()
                .message(),
            "Failed to search product by name and price range: Database error"
        );
        assert_eq!(
            svc.list_all().await.unwrap_err().message(),
            "Failed to get products: Database error"
        );
    }
}
