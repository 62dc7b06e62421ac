//! # Volume Tier Repository
//!
//! Quantity-break tiers, keyed either to one product or to a category.
//!
//! ## Lookup
//! ```text
//! list_for_product("p-amox", Some("antibiotics"))
//!       │
//!       ├── scope = 'sku'      AND product_id  = 'p-amox'
//!       └── scope = 'category' AND category_id = 'antibiotics'
//! ```
//!
//! Activity and date windows are left to `pricing::tiers`.

use sqlx::SqlitePool;
use tracing::debug;

use super::{format_window_bound, parse_window_bound, WindowBound};
use crate::error::{DbError, DbResult};
use vetpos_core::validation::validate_volume_tier;
use vetpos_core::{TierDiscount, TierScope, VolumeTier};

#[derive(Debug, sqlx::FromRow)]
struct VolumeTierRow {
    id: i64,
    scope: String,
    product_id: Option<String>,
    category_id: Option<String>,
    min_qty: i64,
    discount_percent_bps: Option<i64>,
    discount_amount_cents: Option<i64>,
    is_active: bool,
    effective_from: Option<String>,
    effective_to: Option<String>,
}

impl TryFrom<VolumeTierRow> for VolumeTier {
    type Error = DbError;

    fn try_from(row: VolumeTierRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let invalid = |reason: String| DbError::invalid_record("volume_tier", id, reason);

        let scope = row
            .scope
            .parse::<TierScope>()
            .map_err(|e| invalid(e.to_string()))?;
        let discount = TierDiscount::from_columns(row.discount_percent_bps, row.discount_amount_cents)
            .map_err(|e| invalid(e.to_string()))?;
        let effective_from = parse_window_bound(row.effective_from.as_deref(), WindowBound::From)
            .map_err(|e| invalid(format!("effective_from: {}", e)))?;
        let effective_to = parse_window_bound(row.effective_to.as_deref(), WindowBound::To)
            .map_err(|e| invalid(format!("effective_to: {}", e)))?;

        let tier = VolumeTier {
            tier_id: id,
            scope,
            product_id: row.product_id,
            category_id: row.category_id,
            min_qty: row.min_qty,
            discount,
            is_active: row.is_active,
            effective_from,
            effective_to,
        };

        validate_volume_tier(&tier).map_err(|e| invalid(e.to_string()))?;
        Ok(tier)
    }
}

/// Repository for volume tier operations.
#[derive(Debug, Clone)]
pub struct VolumeTierRepository {
    pool: SqlitePool,
}

impl VolumeTierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        VolumeTierRepository { pool }
    }

    /// Lists the tiers that could apply to a product: its own sku tiers plus
    /// the tiers of its category, if it has one.
    ///
    /// ## Arguments
    /// * `product_id` - Product UUID
    /// * `category_id` - The product's category, `None` for uncategorized
    pub async fn list_for_product(
        &self,
        product_id: &str,
        category_id: Option<&str>,
    ) -> DbResult<Vec<VolumeTier>> {
        debug!(product_id = %product_id, category_id = ?category_id, "Loading volume tiers");

        let rows = sqlx::query_as::<_, VolumeTierRow>(
            r#"
            SELECT id, scope, product_id, category_id, min_qty,
                   discount_percent_bps, discount_amount_cents, is_active,
                   effective_from, effective_to
            FROM volume_tiers
            WHERE (scope = 'sku' AND product_id = ?1)
               OR (scope = 'category' AND category_id = ?2)
            ORDER BY id
            "#,
        )
        .bind(product_id)
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(VolumeTier::try_from).collect()
    }

    /// Inserts a tier and returns it with its assigned id.
    ///
    /// The `tier_id` of the argument is ignored.
    pub async fn insert(&self, tier: &VolumeTier) -> DbResult<VolumeTier> {
        validate_volume_tier(tier).map_err(|e| DbError::invalid_record("volume_tier", "new", e))?;

        let (percent_bps, amount_cents) = match tier.discount {
            TierDiscount::Percent(rate) => (Some(rate.bps() as i64), None),
            TierDiscount::Amount(amount) => (None, Some(amount.cents())),
        };

        let result = sqlx::query(
            r#"
            INSERT INTO volume_tiers (
                scope, product_id, category_id, min_qty,
                discount_percent_bps, discount_amount_cents, is_active,
                effective_from, effective_to
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(tier.scope.as_str())
        .bind(&tier.product_id)
        .bind(&tier.category_id)
        .bind(tier.min_qty)
        .bind(percent_bps)
        .bind(amount_cents)
        .bind(tier.is_active)
        .bind(format_window_bound(tier.effective_from))
        .bind(format_window_bound(tier.effective_to))
        .execute(&self.pool)
        .await?;

        Ok(VolumeTier {
            tier_id: result.last_insert_rowid(),
            ..tier.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::product::generate_product_id;
    use crate::{Database, DbConfig};
    use vetpos_core::money::Money;
    use vetpos_core::{Percentage, Product};

    async fn setup() -> (Database, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .insert(&Product {
                id: generate_product_id(),
                sku: "AMOX-250".to_string(),
                name: "Amoxicillin 250mg".to_string(),
                list_price: Money::from_major(100_000),
                category_id: Some("antibiotics".to_string()),
                is_active: true,
            })
            .await
            .unwrap();
        (db, product)
    }

    fn sku_tier(product_id: &str, min_qty: i64, bps: i32) -> VolumeTier {
        VolumeTier {
            tier_id: 0,
            scope: TierScope::Sku,
            product_id: Some(product_id.to_string()),
            category_id: None,
            min_qty,
            discount: TierDiscount::Percent(Percentage::from_bps(bps)),
            is_active: true,
            effective_from: None,
            effective_to: None,
        }
    }

    fn category_tier(category_id: &str, min_qty: i64, cents: i64) -> VolumeTier {
        VolumeTier {
            tier_id: 0,
            scope: TierScope::Category,
            product_id: None,
            category_id: Some(category_id.to_string()),
            min_qty,
            discount: TierDiscount::Amount(Money::from_cents(cents)),
            is_active: true,
            effective_from: None,
            effective_to: None,
        }
    }

    #[tokio::test]
    async fn test_lists_sku_and_category_tiers() {
        let (db, product) = setup().await;
        let repo = db.volume_tiers();

        let own = repo.insert(&sku_tier(&product.id, 10, 500)).await.unwrap();
        let category = repo.insert(&category_tier("antibiotics", 20, 1_000)).await.unwrap();
        repo.insert(&category_tier("vaccines", 5, 2_000)).await.unwrap();

        let tiers = repo.list_for_product(&product.id, Some("antibiotics")).await.unwrap();
        assert_eq!(tiers, vec![own.clone(), category]);

        let uncategorized = repo.list_for_product(&product.id, None).await.unwrap();
        assert_eq!(uncategorized, vec![own]);
    }

    #[tokio::test]
    async fn test_tier_without_discount_is_invalid() {
        let (db, product) = setup().await;
        sqlx::query(
            "INSERT INTO volume_tiers (scope, product_id, min_qty) VALUES ('sku', ?1, 10)",
        )
        .bind(&product.id)
        .execute(db.pool())
        .await
        .unwrap();

        let err = db
            .volume_tiers()
            .list_for_product(&product.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidRecord { ref entity, .. } if entity == "volume_tier"));
    }

    #[tokio::test]
    async fn test_insert_rejects_zero_threshold() {
        let (db, product) = setup().await;

        let err = db
            .volume_tiers()
            .insert(&sku_tier(&product.id, 0, 500))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidRecord { .. }));
    }
}
