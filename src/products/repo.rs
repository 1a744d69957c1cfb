use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use super::repo_types::{name_matches, price_within, ProductInformation};

/// Persistence for catalog records keyed by their generated id.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn find_all(&self) -> anyhow::Result<Vec<ProductInformation>>;
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<ProductInformation>>;
    /// Insert a new record; fails when the id is already taken.
    async fn insert(&self, product: ProductInformation) -> anyhow::Result<ProductInformation>;
    /// Insert or replace by id.
    async fn save(&self, product: ProductInformation) -> anyhow::Result<ProductInformation>;
    async fn delete_by_id(&self, id: &str) -> anyhow::Result<()>;
    async fn find_by_name_containing(&self, name: &str) -> anyhow::Result<Vec<ProductInformation>>;
    async fn find_by_price_between(
        &self,
        min: f64,
        max: f64,
    ) -> anyhow::Result<Vec<ProductInformation>>;
    async fn find_by_name_and_price_range(
        &self,
        name: &str,
        min: f64,
        max: f64,
    ) -> anyhow::Result<Vec<ProductInformation>>;
}

#[derive(Clone)]
pub struct PgProductStore {
    db: PgPool,
}

impl PgProductStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn find_all(&self) -> anyhow::Result<Vec<ProductInformation>> {
        let rows = sqlx::query_as::<_, ProductInformation>(
            r#"
            SELECT id, name, description, price
            FROM product_information
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<ProductInformation>> {
        let row = sqlx::query_as::<_, ProductInformation>(
            r#"
            SELECT id, name, description, price
            FROM product_information
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn insert(&self, product: ProductInformation) -> anyhow::Result<ProductInformation> {
        // The primary key rejects a reused id
        let row = sqlx::query_as::<_, ProductInformation>(
            r#"
            INSERT INTO product_information (id, name, description, price)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, price
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                anyhow::anyhow!("product with ID {} already exists", product.id)
            }
            other => other.into(),
        })?;
        Ok(row)
    }

    async fn save(&self, product: ProductInformation) -> anyhow::Result<ProductInformation> {
        let row = sqlx::query_as::<_, ProductInformation>(
            r#"
            INSERT INTO product_information (id, name, description, price)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
               SET name = EXCLUDED.name,
                   description = EXCLUDED.description,
                   price = EXCLUDED.price
            RETURNING id, name, description, price
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete_by_id(&self, id: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM product_information WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn find_by_name_containing(&self, name: &str) -> anyhow::Result<Vec<ProductInformation>> {
        // strpos keeps user input free of LIKE wildcards
        let rows = sqlx::query_as::<_, ProductInformation>(
            r#"
            SELECT id, name, description, price
            FROM product_information
            WHERE strpos(lower(name), lower($1)) > 0
            ORDER BY name, id
            "#,
        )
        .bind(name)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_price_between(
        &self,
        min: f64,
        max: f64,
    ) -> anyhow::Result<Vec<ProductInformation>> {
        let rows = sqlx::query_as::<_, ProductInformation>(
            r#"
            SELECT id, name, description, price
            FROM product_information
            WHERE price BETWEEN $1 AND $2
            ORDER BY name, id
            "#,
        )
        .bind(min)
        .bind(max)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_name_and_price_range(
        &self,
        name: &str,
        min: f64,
        max: f64,
    ) -> anyhow::Result<Vec<ProductInformation>> {
        let rows = sqlx::query_as::<_, ProductInformation>(
            r#"
            SELECT id, name, description, price
            FROM product_information
            WHERE strpos(lower(name), lower($1)) > 0
              AND price BETWEEN $2 AND $3
            ORDER BY name, id
            "#,
        )
        .bind(name)
        .bind(min)
        .bind(max)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}

/// In-process store used when no database is configured.
#[derive(Default)]
pub struct MemoryProductStore {
    by_id: RwLock<BTreeMap<String, ProductInformation>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filtered<F>(&self, keep: F) -> Vec<ProductInformation>
    where
        F: Fn(&ProductInformation) -> bool,
    {
        let mut out: Vec<_> = self
            .by_id
            .read()
            .await
            .values()
            .filter(|p| keep(p))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        out
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn find_all(&self) -> anyhow::Result<Vec<ProductInformation>> {
        Ok(self.filtered(|_| true).await)
    }

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<ProductInformation>> {
        Ok(self.by_id.read().await.get(id).cloned())
    }

    async fn insert(&self, product: ProductInformation) -> anyhow::Result<ProductInformation> {
        let mut products = self.by_id.write().await;
        anyhow::ensure!(
            !products.contains_key(&product.id),
            "product with ID {} already exists",
            product.id
        );
        products.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn save(&self, product: ProductInformation) -> anyhow::Result<ProductInformation> {
        self.by_id
            .write()
            .await
            .insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn delete_by_id(&self, id: &str) -> anyhow::Result<()> {
        self.by_id.write().await.remove(id);
        Ok(())
    }

    async fn find_by_name_containing(&self, name: &str) -> anyhow::Result<Vec<ProductInformation>> {
        Ok(self.filtered(|p| name_matches(&p.name, name)).await)
    }

    async fn find_by_price_between(
        &self,
        min: f64,
        max: f64,
    ) -> anyhow::Result<Vec<ProductInformation>> {
        Ok(self.filtered(|p| price_within(p.price, min, max)).await)
    }

    async fn find_by_name_and_price_range(
        &self,
        name: &str,
        min: f64,
        max: f64,
    ) -> anyhow::Result<Vec<ProductInformation>> {
        Ok(self
            .filtered(|p| name_matches(&p.name, name) && price_within(p.price, min, max))
            .await)
    }
}
