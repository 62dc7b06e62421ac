//! Rule Resolver
//!
//! Picks at most one winning price rule and computes the price it implies.
//!
//! ## Ranking
//! ```text
//! eligible rules
//!     │
//!     ├── 1. priority          (higher wins)
//!     ├── 2. scope specificity (sku 3 > category 2 > tag 1 > all 0)
//!     └── 3. id                (lowest wins)
//! ```
//! The order is total, so the winner never depends on input order.

use std::cmp::Ordering;

use tracing::debug;

use super::{window_contains, PricingContext, PricingResult, RuleMatching};
use crate::money::Money;
use crate::types::{PriceRule, ProductKey, Scope};

/// Reason reported when no rule is eligible.
pub const NO_MATCHING_RULE: &str = "no matching rule";

/// Output of [`resolve_rule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleResolution<'a> {
    /// Price implied by the winning rule, or the base price.
    pub price: Money,

    pub rule: Option<&'a PriceRule>,
}

impl RuleResolution<'_> {
    /// e.g. `rule #7 "Clinic": 10% off`, or `no matching rule`.
    pub fn describe(&self) -> String {
        match self.rule {
            Some(rule) => format!("{}: {}", rule.label(), rule.action),
            None => NO_MATCHING_RULE.to_string(),
        }
    }
}

// =============================================================================
// Eligibility
// =============================================================================

/// Checks a rule's scope and target against a product.
///
/// Tag rules never match: products carry no tags yet, so there is nothing to
/// compare the target with.
pub fn matches_product_scope(rule: &PriceRule, product: &ProductKey) -> bool {
    match rule.scope {
        Scope::All => true,
        Scope::Sku => rule.target.as_deref() == Some(product.sku.as_str()),
        Scope::Category => match (rule.target.as_deref(), product.category_id.as_deref()) {
            (Some(target), Some(category_id)) => target == category_id,
            _ => false,
        },
        Scope::Tag => {
            debug!(rule_id = rule.id, "Tag-scoped rule skipped: tag matching disabled");
            false
        }
    }
}

/// Checks the quantity window `[min_qty, max_qty]`; absent bounds are open.
#[inline]
fn qty_in_range(rule: &PriceRule, qty: i64) -> bool {
    rule.min_qty.map_or(true, |min| qty >= min) && rule.max_qty.map_or(true, |max| qty <= max)
}

/// Whether `rule` is a candidate for this context.
pub fn is_eligible(rule: &PriceRule, ctx: &PricingContext<'_>) -> bool {
    if !rule.is_active
        || !window_contains(rule.effective_from, rule.effective_to, ctx.now())
        || !qty_in_range(rule, ctx.qty())
    {
        return false;
    }

    match ctx.matching() {
        RuleMatching::PreScoped => true,
        RuleMatching::Product(product) => matches_product_scope(rule, product),
    }
}

// =============================================================================
// Ranking
// =============================================================================

/// Orders two rules; `Greater` means `a` beats `b`.
pub fn compare_rules(a: &PriceRule, b: &PriceRule) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| a.scope.specificity().cmp(&b.scope.specificity()))
        .then_with(|| b.id.cmp(&a.id))
}

/// Selects the best eligible rule, if any.
pub fn select_rule<'a>(ctx: &PricingContext<'a>) -> Option<&'a PriceRule> {
    ctx.rules()
        .iter()
        .filter(|rule| is_eligible(rule, ctx))
        .max_by(|a, b| compare_rules(a, b))
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolves the winning rule and the price it implies.
///
/// Never fails: no eligible rule leaves the base price untouched.
pub fn resolve_rule<'a>(ctx: &PricingContext<'a>) -> RuleResolution<'a> {
    match select_rule(ctx) {
        Some(rule) => {
            let price = rule.action.apply(ctx.base_price());
            debug!(
                rule_id = rule.id,
                priority = rule.priority,
                scope = %rule.scope,
                price = %price,
                "Price rule selected"
            );
            RuleResolution {
                price,
                rule: Some(rule),
            }
        }
        None => {
            debug!(
                candidates = ctx.rules().len(),
                qty = ctx.qty(),
                "No eligible price rule"
            );
            RuleResolution {
                price: ctx.base_price(),
                rule: None,
            }
        }
    }
}

/// Prices a line from rules alone, without volume tiers.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use vetpos_core::money::Money;
/// use vetpos_core::pricing::{compute_price, PricingContext};
///
/// let ctx = PricingContext::new(Money::from_major(50_000), 1, Utc::now(), &[]).unwrap();
/// let result = compute_price(&ctx);
///
/// assert_eq!(result.final_price, Money::from_major(50_000));
/// assert_eq!(result.reason, "no matching rule");
/// ```
pub fn compute_price(ctx: &PricingContext<'_>) -> PricingResult {
    let resolution = resolve_rule(ctx);
    PricingResult::new(
        ctx.base_price(),
        resolution.price,
        resolution.rule.cloned(),
        resolution.describe(),
        None,
    )
}
