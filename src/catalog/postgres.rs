//! # PostgreSQL Catalog Store
//!
//! Executes compiled plans against the `products`, `categories` and
//! `product_images` tables through a `sqlx` pool.

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::{FromRow, Postgres};

use super::errors::{CatalogError, CatalogResult};
use super::model::{CatalogItem, Category, NewProduct};
use super::plan::{BoundValue, QueryPlan};
use super::store::CatalogStore;

/// Connection settings for the catalog database
#[derive(Debug, Clone)]
pub struct PgSettings {
    pub host: String,
    pub port: Option<u16>,
    pub database: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
}

impl PgSettings {
    /// Connect options for the configured service role
    pub fn connect_options(&self) -> PgConnectOptions {
        self.options_for(&self.user, &self.password)
    }

    /// Connect options for an arbitrary role on the same server
    pub fn options_for(&self, user: &str, password: &str) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .database(&self.database)
            .username(user)
            .password(password);
        match self.port {
            Some(port) => options.port(port),
            None => options,
        }
    }
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: i64,
    available: bool,
    name: String,
    description: String,
    price: f64,
    category_id: i64,
    category: String,
    url: String,
    buy_url: Option<String>,
}

impl From<ItemRow> for CatalogItem {
    fn from(row: ItemRow) -> Self {
        CatalogItem {
            id: row.id,
            available: row.available,
            name: row.name,
            description: row.description,
            price: row.price,
            category_id: row.category_id,
            category: row.category,
            url: row.url,
            buy_url: row.buy_url,
        }
    }
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
}

/// Catalog store backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a pool that connects on first use
    ///
    /// No I/O happens here; an unreachable database surfaces as a
    /// retrieval failure on the first request instead of at boot.
    pub fn connect_lazy(settings: &PgSettings) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_lazy_with(settings.connect_options());
        Self::new(pool)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn bind_scalar<'q>(
    mut query: QueryScalar<'q, Postgres, i64, PgArguments>,
    params: &[BoundValue],
) -> QueryScalar<'q, Postgres, i64, PgArguments> {
    for param in params {
        query = match param {
            BoundValue::Text(s) => query.bind(s.clone()),
            BoundValue::Int(i) => query.bind(*i),
            BoundValue::Float(f) => query.bind(*f),
        };
    }
    query
}

fn bind_rows<'q>(
    mut query: QueryAs<'q, Postgres, ItemRow, PgArguments>,
    params: &[BoundValue],
) -> QueryAs<'q, Postgres, ItemRow, PgArguments> {
    for param in params {
        query = match param {
            BoundValue::Text(s) => query.bind(s.clone()),
            BoundValue::Int(i) => query.bind(*i),
            BoundValue::Float(f) => query.bind(*f),
        };
    }
    query
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn count(&self, plan: &QueryPlan) -> CatalogResult<i64> {
        let statement = plan.count_statement();
        let total = bind_scalar(sqlx::query_scalar(&statement.sql), &statement.params)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn fetch_page(&self, plan: &QueryPlan) -> CatalogResult<Vec<CatalogItem>> {
        let statement = plan.page_statement();
        let rows = bind_rows(sqlx::query_as(&statement.sql), &statement.params)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(CatalogItem::from).collect())
    }

    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT CAST(id AS BIGINT) AS id, name FROM categories ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| Category {
                id: r.id,
                name: r.name,
            })
            .collect())
    }

    async fn category_name(&self, id: i64) -> CatalogResult<Option<String>> {
        let name = sqlx::query_scalar::<_, String>("SELECT name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(name)
    }

    async fn create_category(&self, name: &str) -> CatalogResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING CAST(id AS BIGINT)",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn delete_category(&self, id: i64) -> CatalogResult<()> {
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_product(&self, product: &NewProduct) -> CatalogResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO products (name, description, price, category_id, available, buy_url) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING CAST(id AS BIGINT)",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.category_key())
        .bind(product.available)
        .bind(product.buy_url_value())
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_product(&self, id: i64, product: &NewProduct) -> CatalogResult<()> {
        let result = sqlx::query(
            "UPDATE products \
             SET name = $1, description = $2, price = $3, category_id = $4, available = $5, buy_url = $6 \
             WHERE id = $7",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.category_key())
        .bind(product.available)
        .bind(product.buy_url_value())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound);
        }
        Ok(())
    }

    async fn delete_product(&self, id: i64) -> CatalogResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM product_images WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn attach_image(&self, product_id: i64, url: &str) -> CatalogResult<()> {
        sqlx::query(
            "INSERT INTO product_images (product_id, image_url) \
             SELECT $1, $2 WHERE NOT EXISTS \
             (SELECT 1 FROM product_images WHERE product_id = $1 AND image_url = $2)",
        )
        .bind(product_id)
        .bind(url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
