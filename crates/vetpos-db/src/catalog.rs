//! # SQLite Pricing Catalog
//!
//! Serves the pricing engine from the repositories.
//!
//! ```text
//! PriceSimulator<Database>
//!     │
//!     ├── get_product       ──► ProductRepository::get_by_sku
//!     ├── get_price_book    ──► PriceBookRepository::get_by_id
//!     ├── get_price_rules   ──► PriceRuleRepository::list_by_price_book
//!     └── get_volume_tiers  ──► VolumeTierRepository::list_for_product
//! ```

use async_trait::async_trait;

use crate::error::DbError;
use crate::pool::Database;
use vetpos_core::pricing::PricingCatalog;
use vetpos_core::{PriceBook, PriceRule, Product, VolumeTier};

#[async_trait]
impl PricingCatalog for Database {
    type Error = DbError;

    async fn get_product(&self, sku: &str) -> Result<Option<Product>, DbError> {
        self.products().get_by_sku(sku).await
    }

    async fn get_price_book(&self, price_book_id: i64) -> Result<Option<PriceBook>, DbError> {
        self.price_books().get_by_id(price_book_id).await
    }

    async fn get_price_rules(&self, price_book_id: i64) -> Result<Vec<PriceRule>, DbError> {
        self.price_rules().list_by_price_book(price_book_id).await
    }

    async fn get_volume_tiers(
        &self,
        product_id: &str,
        category_id: Option<&str>,
    ) -> Result<Vec<VolumeTier>, DbError> {
        self.volume_tiers()
            .list_for_product(product_id, category_id)
            .await
    }
}

// =============================================================================
// Integration Tests
// =============================================================================
