//! # Product Repository
//!
//! Database operations for the pricing view of products.
//!
//! ## Key Operations
//! - Lookup by SKU (the simulator's entry point)
//! - Lookup by id
//! - Insert (seeding, tests)

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vetpos_core::money::Money;
use vetpos_core::validation::{validate_price_cents, validate_sku};
use vetpos_core::Product;

/// Raw `products` row.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    sku: String,
    name: String,
    list_price_cents: i64,
    category_id: Option<String>,
    is_active: bool,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        validate_price_cents(row.list_price_cents)
            .map_err(|e| DbError::invalid_record("product", &row.id, e))?;

        Ok(Product {
            id: row.id,
            sku: row.sku,
            name: row.name,
            list_price: Money::from_cents(row.list_price_cents),
            category_id: row.category_id,
            is_active: row.is_active,
        })
    }
}

const SELECT_PRODUCT: &str = r#"
    SELECT id, sku, name, list_price_cents, category_id, is_active
    FROM products
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let product = repo.get_by_sku("AMOX-250").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found (active or not)
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("{} WHERE id = ?1", SELECT_PRODUCT);
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::try_from).transpose()
    }

    /// Gets a product by its SKU.
    ///
    /// ## Arguments
    /// * `sku` - Product SKU (e.g., "AMOX-250")
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found (active or not)
    /// * `Ok(None)` - Product not found
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        debug!(sku = %sku, "Fetching product by SKU");

        let sql = format!("{} WHERE sku = ?1", SELECT_PRODUCT);
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(sku.trim())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::try_from).transpose()
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    /// * `Err(DbError::InvalidRecord)` - Malformed SKU or negative price
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(sku = %product.sku, "Inserting product");

        validate_sku(&product.sku)
            .and_then(|_| validate_price_cents(product.list_price.cents()))
            .map_err(|e| DbError::invalid_record("product", &product.id, e))?;

        sqlx::query(
            r#"
            INSERT INTO products (id, sku, name, list_price_cents, category_id, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.list_price.cents())
        .bind(&product.category_id)
        .bind(product.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &product.sku),
            other => other,
        })?;

        Ok(product.clone())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}
