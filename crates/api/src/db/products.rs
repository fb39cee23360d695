//! Product catalog repository.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};

use storelens_core::ProductId;

use super::{Page, RepositoryError};
use crate::models::{Product, ProductFilter};

const PRODUCT_COLUMNS: &str =
    "id, name, category, price, brand, rating, stock_quantity, description";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    category: String,
    price: Decimal,
    brand: Option<String>,
    rating: Option<f64>,
    stock_quantity: i32,
    description: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            price: row.price,
            brand: row.brand,
            rating: row.rating,
            stock_quantity: row.stock_quantity,
            description: row.description,
        }
    }
}

/// Repository for catalog reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching `filter`, ordered by ID.
    ///
    /// Unset filter fields match everything.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: Page,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM analytics.products
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR category = $2)
              AND ($3::text IS NULL OR brand = $3)
              AND ($4::numeric IS NULL OR price >= $4)
              AND ($5::numeric IS NULL OR price <= $5)
            ORDER BY id
            OFFSET $6 LIMIT $7
            "
        ))
        .bind(filter.name.as_deref())
        .bind(filter.category.as_deref())
        .bind(filter.brand.as_deref())
        .bind(filter.min_price)
        .bind(filter.max_price)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(self.pool)
        .await?;

        debug!(count = rows.len(), "Listed products");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM analytics.products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Load the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM analytics.products ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}
