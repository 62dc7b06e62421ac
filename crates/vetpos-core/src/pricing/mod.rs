//! # Pricing Engine
//!
//! Turns a list price, a quantity and a catalog of rules and tiers into one
//! explained price.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Price Calculation                               │
//! │                                                                         │
//! │  PricingContext (list price, qty, now, rules)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  resolver::resolve_rule ── filter → rank → apply winning rule          │
//! │       │ rule price                                                      │
//! │       ▼                                                                 │
//! │  tiers::match_volume_tier ── highest min_qty reached wins              │
//! │       │ tier price                                                      │
//! │       ▼                                                                 │
//! │  composer::compose_price ── final price + discount + reason            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PricingResult                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function in this module is pure. The evaluation instant is always
//! passed in; nothing here reads the clock. Loading data is the job of
//! [`simulate::PricingCatalog`] implementations.

pub mod composer;
pub mod resolver;
pub mod simulate;
pub mod tiers;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, PricingError};
use crate::money::Money;
use crate::types::{Percentage, PriceRule, ProductKey, VolumeTier};
use crate::MAX_ITEM_QUANTITY;

pub use composer::{compose_price, TierLookup};
pub use resolver::{compute_price, resolve_rule, RuleResolution, NO_MATCHING_RULE};
pub use simulate::{LineQuote, PriceSimulation, PriceSimulator, PricingCatalog, SimulationRequest};
pub use tiers::match_volume_tier;

// =============================================================================
// Validity Window
// =============================================================================

/// Checks an inclusive, optionally open-ended `[from, to]` window.
#[inline]
pub fn window_contains(
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    from.map_or(true, |from| from <= now) && to.map_or(true, |to| to >= now)
}

// =============================================================================
// Pricing Context
// =============================================================================

/// How rules are matched against the product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMatching {
    /// The caller already filtered rules by scope and target.
    PreScoped,
    /// Rules are raw; scope and target are checked against this product.
    Product(ProductKey),
}

/// Validated input for one price calculation.
///
/// Construction is the only fallible step: once a context exists, every
/// pricing function over it is infallible.
#[derive(Debug, Clone)]
pub struct PricingContext<'a> {
    base_price: Money,
    qty: i64,
    now: DateTime<Utc>,
    rules: &'a [PriceRule],
    matching: RuleMatching,
}

impl<'a> PricingContext<'a> {
    /// Creates a context over pre-scoped rules.
    ///
    /// ## Errors
    /// - `InvalidQuantity` when `qty` is outside `1..=MAX_ITEM_QUANTITY`
    /// - `InvalidPrice` when `base_price` is negative
    ///
    /// ## Example
    /// ```rust
    /// use chrono::Utc;
    /// use vetpos_core::money::Money;
    /// use vetpos_core::pricing::PricingContext;
    ///
    /// let ctx = PricingContext::new(Money::from_major(50_000), 1, Utc::now(), &[]).unwrap();
    /// assert_eq!(ctx.qty(), 1);
    ///
    /// assert!(PricingContext::new(Money::from_major(50_000), 0, Utc::now(), &[]).is_err());
    /// ```
    pub fn new(
        base_price: Money,
        qty: i64,
        now: DateTime<Utc>,
        rules: &'a [PriceRule],
    ) -> CoreResult<Self> {
        Self::with_max_quantity(base_price, qty, now, rules, MAX_ITEM_QUANTITY)
    }

    /// Same as [`PricingContext::new`] with a caller-chosen quantity limit.
    pub fn with_max_quantity(
        base_price: Money,
        qty: i64,
        now: DateTime<Utc>,
        rules: &'a [PriceRule],
        max_qty: i64,
    ) -> CoreResult<Self> {
        if qty < 1 || qty > max_qty {
            return Err(PricingError::InvalidQuantity { qty, max: max_qty });
        }
        if base_price.is_negative() {
            return Err(PricingError::InvalidPrice {
                cents: base_price.cents(),
            });
        }

        Ok(PricingContext {
            base_price,
            qty,
            now,
            rules,
            matching: RuleMatching::PreScoped,
        })
    }

    /// Switches to raw-rule mode: scope and target are matched against
    /// `product`.
    pub fn for_product(mut self, product: ProductKey) -> Self {
        self.matching = RuleMatching::Product(product);
        self
    }

    #[inline]
    pub fn base_price(&self) -> Money {
        self.base_price
    }

    #[inline]
    pub fn qty(&self) -> i64 {
        self.qty
    }

    #[inline]
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    #[inline]
    pub fn rules(&self) -> &'a [PriceRule] {
        self.rules
    }

    #[inline]
    pub fn matching(&self) -> &RuleMatching {
        &self.matching
    }
}

// =============================================================================
// Results
// =============================================================================

/// The best volume tier for a line and what it does to the price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VolumeTierMatch {
    pub tier: VolumeTier,

    /// Price the tier discount was applied to.
    pub base_price: Money,

    pub discounted_price: Money,

    /// Per-unit savings: `base_price - discounted_price`.
    pub savings: Money,

    /// `savings / base_price × 100`, in basis points.
    pub savings_percent: Percentage,
}

impl VolumeTierMatch {
    /// e.g. `volume tier #3: 5% off at qty >= 10`
    pub fn describe(&self) -> String {
        format!(
            "volume tier #{}: {} at qty >= {}",
            self.tier.tier_id, self.tier.discount, self.tier.min_qty
        )
    }
}

/// The explained outcome of a price calculation.
///
/// Discount fields are always measured against the original `base_price`,
/// never against an intermediate price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingResult {
    pub base_price: Money,

    pub final_price: Money,

    pub applied_rule: Option<PriceRule>,

    /// `base_price - final_price`; negative when a net rule marks up.
    pub discount_amount: Money,

    /// `discount_amount / base_price × 100`, zero when `base_price` is zero.
    pub discount_percent: Percentage,

    /// Human-readable explanation naming the rule id and tier threshold.
    pub reason: String,

    pub volume_tier_match: Option<VolumeTierMatch>,
}

impl PricingResult {
    pub(crate) fn new(
        base_price: Money,
        final_price: Money,
        applied_rule: Option<PriceRule>,
        reason: String,
        volume_tier_match: Option<VolumeTierMatch>,
    ) -> Self {
        let discount_amount = base_price - final_price;
        PricingResult {
            base_price,
            final_price,
            applied_rule,
            discount_amount,
            discount_percent: discount_amount.percentage_of(base_price),
            reason,
            volume_tier_match,
        }
    }

    /// Id of the winning rule, if any.
    pub fn applied_rule_id(&self) -> Option<i64> {
        self.applied_rule.as_ref().map(|rule| rule.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_window_contains_is_inclusive() {
        assert!(window_contains(None, None, at(10)));
        assert!(window_contains(Some(at(10)), Some(at(10)), at(10)));
        assert!(window_contains(Some(at(1)), None, at(10)));
        assert!(!window_contains(Some(at(11)), None, at(10)));
        assert!(!window_contains(None, Some(at(9)), at(10)));
    }

    #[test]
    fn test_context_rejects_invalid_input() {
        let err = PricingContext::new(Money::from_major(10), -3, at(1), &[]).unwrap_err();
        assert!(matches!(err, PricingError::InvalidQuantity { qty: -3, .. }));

        let err = PricingContext::new(Money::from_major(10), 10_000, at(1), &[]).unwrap_err();
        assert!(matches!(err, PricingError::InvalidQuantity { max: 9999, .. }));

        let ok = PricingContext::with_max_quantity(Money::from_major(10), 10_000, at(1), &[], 20_000);
        assert!(ok.is_ok());

        let err = PricingContext::new(Money::from_cents(-1), 1, at(1), &[]).unwrap_err();
        assert!(matches!(err, PricingError::InvalidPrice { cents: -1 }));
    }

    #[test]
    fn test_result_discount_fields() {
        let result = PricingResult::new(
            Money::from_major(100_000),
            Money::from_major(85_500),
            None,
            "test".to_string(),
            None,
        );
        assert_eq!(result.discount_amount, Money::from_major(14_500));
        assert_eq!(result.discount_percent.bps(), 1450);

        let free = PricingResult::new(Money::zero(), Money::zero(), None, String::new(), None);
        assert!(free.discount_percent.is_zero());
    }
}
