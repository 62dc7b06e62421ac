//! Price Simulation
//!
//! The high-level entry point: load a product and its price book's rules
//! through a [`PricingCatalog`], then hand everything to the pure composer.
//!
//! ## Flow
//! ```text
//! SimulationRequest { price_book_id, sku, qty, when }
//!     │
//!     ├── validate sku + qty ─────────────► Err(PricingError)
//!     ├── get_product(sku) ── missing ────► Ok(no list price)
//!     ├── get_price_book(id) ── missing ──► Ok(no list price)
//!     ├── get_price_rules(id) ── failure ─► Err(PricingError::Catalog)
//!     ├── get_volume_tiers(..) ── failure ► logged, priced without tier
//!     │
//!     ▼
//! compose_price ─► LineQuote ─► PriceSimulation
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use ts_rs::TS;

use super::composer::{compose_price, TierLookup};
use super::{PricingContext, PricingResult, VolumeTierMatch};
use crate::config::PricingConfig;
use crate::error::{CoreResult, PricingError};
use crate::money::Money;
use crate::types::{Percentage, PriceBook, PriceRule, Product, TaxRate, VolumeTier};
use crate::validation::{validate_quantity, validate_sku};

// =============================================================================
// Catalog Collaborator
// =============================================================================

/// Read access to the data the engine prices from.
///
/// "Not found" is `Ok(None)`; `Err` is reserved for real failures. No retry
/// happens on the engine side.
#[async_trait]
pub trait PricingCatalog: Send + Sync {
    type Error: std::fmt::Display + Send + Sync + 'static;

    async fn get_product(&self, sku: &str) -> Result<Option<Product>, Self::Error>;

    async fn get_price_book(&self, price_book_id: i64) -> Result<Option<PriceBook>, Self::Error>;

    /// All rules of the book, unfiltered by product.
    async fn get_price_rules(&self, price_book_id: i64) -> Result<Vec<PriceRule>, Self::Error>;

    /// Tiers targeting the product or its category.
    async fn get_volume_tiers(
        &self,
        product_id: &str,
        category_id: Option<&str>,
    ) -> Result<Vec<VolumeTier>, Self::Error>;
}

// =============================================================================
// Request / Response
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SimulationRequest {
    pub price_book_id: i64,
    pub sku: String,
    pub qty: i64,

    /// Evaluation instant for validity windows.
    #[ts(as = "String")]
    pub when: DateTime<Utc>,
}

/// One priced line with a flat tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineQuote {
    pub unit_price: Money,
    pub quantity: i64,
    pub line_subtotal: Money,
    pub tax: Money,
    pub line_total: Money,
}

impl LineQuote {
    /// ## Example
    /// ```rust
    /// use vetpos_core::money::Money;
    /// use vetpos_core::pricing::LineQuote;
    /// use vetpos_core::types::TaxRate;
    ///
    /// let line = LineQuote::new(Money::from_cents(1000), 3, TaxRate::from_bps(1100)).unwrap();
    /// assert_eq!(line.line_subtotal.cents(), 3000);
    /// assert_eq!(line.tax.cents(), 330);
    /// assert_eq!(line.line_total.cents(), 3330);
    /// ```
    ///
    /// ## Errors
    /// `LineOverflow` when any line amount leaves the `i64` cent range.
    pub fn new(unit_price: Money, quantity: i64, tax_rate: TaxRate) -> CoreResult<Self> {
        let overflow = || PricingError::LineOverflow {
            unit_cents: unit_price.cents(),
            qty: quantity,
        };

        let line_subtotal = unit_price
            .checked_multiply_quantity(quantity)
            .ok_or_else(overflow)?;
        let tax = line_subtotal.calculate_tax(tax_rate).ok_or_else(overflow)?;
        let line_total = line_subtotal.checked_add(tax).ok_or_else(overflow)?;

        Ok(LineQuote {
            unit_price,
            quantity,
            line_subtotal,
            tax,
            line_total,
        })
    }
}

/// Result of [`PriceSimulator::simulate`].
///
/// Price fields are `None` when the product or price book could not be
/// found; `applied_reason` then says which one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceSimulation {
    pub sku: String,
    pub list_price: Option<Money>,
    pub final_price: Option<Money>,
    pub applied_rule_id: Option<i64>,
    pub applied_reason: String,
    pub volume_tier_match: Option<VolumeTierMatch>,
    pub discount_amount: Option<Money>,
    pub discount_percent: Option<Percentage>,
    pub line: Option<LineQuote>,
}

impl PriceSimulation {
    fn unavailable(sku: &str, reason: String) -> Self {
        PriceSimulation {
            sku: sku.to_string(),
            list_price: None,
            final_price: None,
            applied_rule_id: None,
            applied_reason: reason,
            volume_tier_match: None,
            discount_amount: None,
            discount_percent: None,
            line: None,
        }
    }

    fn priced(sku: &str, result: PricingResult, line: LineQuote) -> Self {
        PriceSimulation {
            sku: sku.to_string(),
            list_price: Some(result.base_price),
            final_price: Some(result.final_price),
            applied_rule_id: result.applied_rule_id(),
            applied_reason: result.reason,
            volume_tier_match: result.volume_tier_match,
            discount_amount: Some(result.discount_amount),
            discount_percent: Some(result.discount_percent),
            line: Some(line),
        }
    }

    /// Whether a price could be computed.
    pub fn is_priced(&self) -> bool {
        self.final_price.is_some()
    }
}

// =============================================================================
// Simulator
// =============================================================================

/// Prices lines against a catalog.
///
/// Holds no mutable state; one simulator can serve concurrent requests.
pub struct PriceSimulator<C> {
    catalog: C,
    config: PricingConfig,
}

impl<C: PricingCatalog> PriceSimulator<C> {
    pub fn new(catalog: C, config: PricingConfig) -> Self {
        PriceSimulator { catalog, config }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Prices one line.
    ///
    /// ## Errors
    /// - `Validation` for a malformed SKU or an out-of-range quantity
    /// - `InvalidPrice` when the product's list price is negative
    /// - `Catalog` when the product, price book or rule lookup fails
    /// - `LineOverflow` when the line total leaves the `i64` cent range
    #[instrument(skip(self), fields(sku = %request.sku, price_book_id = request.price_book_id))]
    pub async fn simulate(&self, request: &SimulationRequest) -> CoreResult<PriceSimulation> {
        validate_sku(&request.sku)?;
        validate_quantity(request.qty, self.config.max_quantity)?;

        let product = match self
            .catalog
            .get_product(&request.sku)
            .await
            .map_err(|e| PricingError::catalog("get_product", e))?
        {
            Some(product) if product.is_active => product,
            _ => {
                debug!("Product missing or inactive");
                return Ok(PriceSimulation::unavailable(
                    &request.sku,
                    format!("product not found: {}", request.sku),
                ));
            }
        };

        let book_found = self
            .catalog
            .get_price_book(request.price_book_id)
            .await
            .map_err(|e| PricingError::catalog("get_price_book", e))?
            .is_some_and(|book| book.is_active);
        if !book_found {
            debug!("Price book missing or inactive");
            return Ok(PriceSimulation::unavailable(
                &request.sku,
                format!("price book not found: {}", request.price_book_id),
            ));
        }

        let rules = self
            .catalog
            .get_price_rules(request.price_book_id)
            .await
            .map_err(|e| PricingError::catalog("get_price_rules", e))?;

        let tiers = self
            .catalog
            .get_volume_tiers(&product.id, product.category_id.as_deref())
            .await
            .map_err(|e| e.to_string());

        let key = product.key();
        let ctx = PricingContext::with_max_quantity(
            product.list_price,
            request.qty,
            request.when,
            &rules,
            self.config.max_quantity,
        )?
        .for_product(key.clone());

        let lookup = match &tiers {
            Ok(tiers) => TierLookup::Loaded(tiers),
            Err(message) => TierLookup::Unavailable(message),
        };
        let result = compose_price(&ctx, &key, lookup, &self.config);
        let line = LineQuote::new(result.final_price, request.qty, self.config.tax_rate)?;

        info!(
            qty = request.qty,
            list_price = %result.base_price,
            final_price = %result.final_price,
            rule_id = ?result.applied_rule_id(),
            "Price simulated"
        );

        Ok(PriceSimulation::priced(&request.sku, result, line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TierStacking;
    use crate::types::{RuleAction, Scope, TierDiscount, TierScope};
    use chrono::TimeZone;

    /// In-memory catalog with switchable failures.
    #[derive(Default)]
    struct FakeCatalog {
        products: Vec<Product>,
        books: Vec<PriceBook>,
        rules: Vec<PriceRule>,
        tiers: Vec<VolumeTier>,
        fail_rules: bool,
        fail_tiers: bool,
    }

    #[async_trait]
    impl PricingCatalog for FakeCatalog {
        type Error = String;

        async fn get_product(&self, sku: &str) -> Result<Option<Product>, String> {
            Ok(self.products.iter().find(|p| p.sku == sku).cloned())
        }

        async fn get_price_book(&self, price_book_id: i64) -> Result<Option<PriceBook>, String> {
            Ok(self.books.iter().find(|b| b.id == price_book_id).cloned())
        }

        async fn get_price_rules(&self, price_book_id: i64) -> Result<Vec<PriceRule>, String> {
            if self.fail_rules {
                return Err("database is locked".to_string());
            }
            Ok(self
                .rules
                .iter()
                .filter(|r| r.price_book_id == price_book_id)
                .cloned()
                .collect())
        }

        async fn get_volume_tiers(
            &self,
            product_id: &str,
            category_id: Option<&str>,
        ) -> Result<Vec<VolumeTier>, String> {
            if self.fail_tiers {
                return Err("connection reset".to_string());
            }
            Ok(self
                .tiers
                .iter()
                .filter(|t| {
                    t.product_id.as_deref() == Some(product_id)
                        || (category_id.is_some() && t.category_id.as_deref() == category_id)
                })
                .cloned()
                .collect())
        }
    }

    fn when() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 10, 0, 0).unwrap()
    }

    fn catalog() -> FakeCatalog {
        FakeCatalog {
            products: vec![Product {
                id: "p-1".to_string(),
                sku: "AMOX-250".to_string(),
                name: "Amoxicillin 250mg".to_string(),
                list_price: Money::from_major(100_000),
                category_id: Some("antibiotics".to_string()),
                is_active: true,
            }],
            books: vec![PriceBook {
                id: 1,
                name: "Clinic".to_string(),
                is_active: true,
            }],
            rules: vec![PriceRule {
                id: 7,
                price_book_id: 1,
                name: "Bulk antibiotics".to_string(),
                action: RuleAction::Percent(Percentage::from_percent(10)),
                priority: 10,
                min_qty: Some(10),
                max_qty: None,
                scope: Scope::Category,
                target: Some("antibiotics".to_string()),
                is_active: true,
                effective_from: None,
                effective_to: None,
            }],
            tiers: vec![VolumeTier {
                tier_id: 3,
                scope: TierScope::Sku,
                product_id: Some("p-1".to_string()),
                category_id: None,
                min_qty: 10,
                discount: TierDiscount::Percent(Percentage::from_percent(5)),
                is_active: true,
                effective_from: None,
                effective_to: None,
            }],
            ..FakeCatalog::default()
        }
    }

    fn request(sku: &str, qty: i64) -> SimulationRequest {
        SimulationRequest {
            price_book_id: 1,
            sku: sku.to_string(),
            qty,
            when: when(),
        }
    }

    #[tokio::test]
    async fn test_simulate_stacks_rule_and_tier() {
        let config = PricingConfig {
            tax_rate: TaxRate::from_bps(1100),
            ..PricingConfig::default()
        };
        let simulator = PriceSimulator::new(catalog(), config);

        let sim = simulator.simulate(&request("AMOX-250", 12)).await.unwrap();

        assert_eq!(sim.list_price, Some(Money::from_major(100_000)));
        assert_eq!(sim.final_price, Some(Money::from_major(85_500)));
        assert_eq!(sim.applied_rule_id, Some(7));
        assert_eq!(sim.volume_tier_match.as_ref().map(|m| m.tier.tier_id), Some(3));
        assert_eq!(sim.discount_percent, Some(Percentage::from_bps(1450)));

        let line = sim.line.unwrap();
        assert_eq!(line.line_subtotal, Money::from_major(1_026_000));
        assert_eq!(line.tax, Money::from_major(112_860));
        assert_eq!(line.line_total, Money::from_major(1_138_860));
    }

    #[tokio::test]
    async fn test_simulate_small_quantity_gets_list_price() {
        let simulator = PriceSimulator::new(catalog(), PricingConfig::default());

        let sim = simulator.simulate(&request("AMOX-250", 2)).await.unwrap();

        assert_eq!(sim.final_price, Some(Money::from_major(100_000)));
        assert_eq!(sim.applied_reason, "no matching rule");
        assert!(sim.volume_tier_match.is_none());
    }

    #[tokio::test]
    async fn test_simulate_unknown_sku_is_not_an_error() {
        let simulator = PriceSimulator::new(catalog(), PricingConfig::default());

        let sim = simulator.simulate(&request("NOPE-1", 1)).await.unwrap();

        assert!(!sim.is_priced());
        assert!(sim.list_price.is_none());
        assert_eq!(sim.applied_reason, "product not found: NOPE-1");
    }

    #[tokio::test]
    async fn test_simulate_inactive_price_book() {
        let mut catalog = catalog();
        catalog.books[0].is_active = false;
        let simulator = PriceSimulator::new(catalog, PricingConfig::default());

        let sim = simulator.simulate(&request("AMOX-250", 1)).await.unwrap();

        assert!(!sim.is_priced());
        assert_eq!(sim.applied_reason, "price book not found: 1");
    }

    #[tokio::test]
    async fn test_simulate_tier_failure_degrades_to_rule_price() {
        let catalog = FakeCatalog {
            fail_tiers: true,
            ..catalog()
        };
        let simulator = PriceSimulator::new(catalog, PricingConfig::default());

        let sim = simulator.simulate(&request("AMOX-250", 12)).await.unwrap();

        assert_eq!(sim.final_price, Some(Money::from_major(90_000)));
        assert_eq!(sim.applied_rule_id, Some(7));
        assert!(sim.volume_tier_match.is_none());
    }

    #[tokio::test]
    async fn test_simulate_rule_failure_propagates() {
        let catalog = FakeCatalog {
            fail_rules: true,
            ..catalog()
        };
        let simulator = PriceSimulator::new(catalog, PricingConfig::default());

        let err = simulator.simulate(&request("AMOX-250", 12)).await.unwrap_err();

        assert!(matches!(err, PricingError::Catalog { ref operation, .. } if operation == "get_price_rules"));
    }

    #[tokio::test]
    async fn test_simulate_rejects_bad_input() {
        let config = PricingConfig {
            max_quantity: 100,
            ..PricingConfig::default()
        };
        let simulator = PriceSimulator::new(catalog(), config);

        assert!(matches!(
            simulator.simulate(&request("AMOX-250", 0)).await,
            Err(PricingError::Validation(_))
        ));
        assert!(matches!(
            simulator.simulate(&request("AMOX-250", 101)).await,
            Err(PricingError::Validation(_))
        ));
        assert!(matches!(
            simulator.simulate(&request("", 1)).await,
            Err(PricingError::Validation(_))
        ));
    }

    #[test]
    fn test_line_quote_overflow_is_an_error() {
        let err = LineQuote::new(Money::from_cents(i64::MAX / 1000), 9999, TaxRate::zero()).unwrap_err();
        assert!(matches!(err, PricingError::LineOverflow { qty: 9999, .. }));

        let err = LineQuote::new(Money::from_cents(i64::MAX / 2), 1, TaxRate::from_bps(15_000)).unwrap_err();
        assert!(matches!(err, PricingError::LineOverflow { qty: 1, .. }));
    }

    #[tokio::test]
    async fn test_simulate_huge_list_price_reports_overflow() {
        let mut catalog = catalog();
        catalog.products[0].list_price = Money::from_cents(i64::MAX / 1000);
        let simulator = PriceSimulator::new(catalog, PricingConfig::default());

        let err = simulator.simulate(&request("AMOX-250", 9999)).await.unwrap_err();

        assert!(matches!(err, PricingError::LineOverflow { qty: 9999, .. }));
    }

    #[tokio::test]
    async fn test_simulate_best_of_mode() {
        let config = PricingConfig {
            tier_stacking: TierStacking::BestOf,
            ..PricingConfig::default()
        };
        let simulator = PriceSimulator::new(catalog(), config);

        let sim = simulator.simulate(&request("AMOX-250", 12)).await.unwrap();

        // 10% rule beats the 5% tier applied to the list price
        assert_eq!(sim.final_price, Some(Money::from_major(90_000)));
        assert_eq!(sim.applied_rule_id, Some(7));
        assert!(sim.volume_tier_match.is_none());
    }
}
