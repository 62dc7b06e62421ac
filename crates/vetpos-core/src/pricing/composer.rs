//! Price Composer
//!
//! Runs the resolver and the tier matcher, settles on one final price and
//! explains it.
//!
//! ## Stacking
//! ```text
//! Stack (default)                      BestOf
//! ───────────────                      ──────
//! list ─► rule price ─► tier price     list ─► rule price ─┐
//!                          │           list ─► tier price ─┴─► lower wins
//!                          ▼                                    │
//!                       final                                 final
//! ```
//! Discount amount and percent are always reported against the list price.

use tracing::{debug, warn};

use super::resolver::resolve_rule;
use super::tiers::match_volume_tier;
use super::{PricingContext, PricingResult};
use crate::config::{PricingConfig, TierStacking};
use crate::types::{ProductKey, VolumeTier};

/// Volume tiers as delivered by the data layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierLookup<'a> {
    Loaded(&'a [VolumeTier]),
    /// The lookup failed; pricing continues without a tier.
    Unavailable(&'a str),
}

/// Composes the final price for one line.
///
/// `product` identifies the line for tier matching, independent of whether
/// `ctx` carries raw or pre-scoped rules.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use vetpos_core::config::PricingConfig;
/// use vetpos_core::money::Money;
/// use vetpos_core::pricing::{compose_price, PricingContext, TierLookup};
/// use vetpos_core::types::ProductKey;
///
/// let product = ProductKey {
///     product_id: "p-1".to_string(),
///     sku: "AMOX-250".to_string(),
///     category_id: None,
/// };
/// let ctx = PricingContext::new(Money::from_major(50_000), 1, Utc::now(), &[]).unwrap();
///
/// let result = compose_price(
///     &ctx,
///     &product,
///     TierLookup::Unavailable("connection reset"),
///     &PricingConfig::default(),
/// );
/// assert_eq!(result.final_price, Money::from_major(50_000));
/// ```
pub fn compose_price(
    ctx: &PricingContext<'_>,
    product: &ProductKey,
    tiers: TierLookup<'_>,
    config: &PricingConfig,
) -> PricingResult {
    let resolution = resolve_rule(ctx);

    let tiers: &[VolumeTier] = match tiers {
        TierLookup::Loaded(tiers) => tiers,
        TierLookup::Unavailable(reason) => {
            warn!(
                product_id = %product.product_id,
                reason,
                "Volume tiers unavailable, pricing without tier"
            );
            &[]
        }
    };

    let tier_base = match config.tier_stacking {
        TierStacking::Stack => resolution.price,
        TierStacking::BestOf => ctx.base_price(),
    };
    let tier_match = match_volume_tier(tiers, product, ctx.qty(), tier_base, ctx.now());

    let (final_price, applied_rule, reason, tier_match) = match (config.tier_stacking, tier_match) {
        (_, None) => (
            resolution.price,
            resolution.rule,
            resolution.describe(),
            None,
        ),
        (TierStacking::Stack, Some(hit)) => {
            let reason = match resolution.rule {
                Some(_) => format!("{} (after {})", hit.describe(), resolution.describe()),
                None => hit.describe(),
            };
            (hit.discounted_price, resolution.rule, reason, Some(hit))
        }
        (TierStacking::BestOf, Some(hit)) => {
            if hit.discounted_price < resolution.price {
                let reason = match resolution.rule {
                    Some(rule) => format!("{} (better than {})", hit.describe(), rule.label()),
                    None => hit.describe(),
                };
                (hit.discounted_price, None, reason, Some(hit))
            } else {
                debug!(
                    tier_id = hit.tier.tier_id,
                    "Rule price beats volume tier, tier not applied"
                );
                (
                    resolution.price,
                    resolution.rule,
                    resolution.describe(),
                    None,
                )
            }
        }
    };

    PricingResult::new(
        ctx.base_price(),
        final_price,
        applied_rule.cloned(),
        reason,
        tier_match,
    )
}
