//! Volume Tier Matcher
//!
//! Finds the quantity break a line has reached and prices it.
//!
//! ## Selection
//! ```text
//! qty = 25
//!
//!   tier  min_qty  scope
//!   #1       5     category   eligible
//!   #2      10     category   eligible
//!   #3      20     sku        eligible   ◄── highest threshold reached
//!   #4      50     sku        not reached
//! ```
//! On an equal `min_qty`, the sku tier beats the category tier; a remaining
//! tie goes to the lowest `tier_id`.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{window_contains, VolumeTierMatch};
use crate::money::Money;
use crate::types::{ProductKey, TierScope, VolumeTier};

/// Whether `tier` applies to `product` at `qty` and `now`.
pub fn is_tier_eligible(
    tier: &VolumeTier,
    product: &ProductKey,
    qty: i64,
    now: DateTime<Utc>,
) -> bool {
    if !tier.is_active || qty < tier.min_qty {
        return false;
    }
    if !window_contains(tier.effective_from, tier.effective_to, now) {
        return false;
    }

    match tier.scope {
        TierScope::Sku => tier.product_id.as_deref() == Some(product.product_id.as_str()),
        TierScope::Category => match (tier.category_id.as_deref(), product.category_id.as_deref()) {
            (Some(tier_category), Some(category_id)) => tier_category == category_id,
            _ => false,
        },
    }
}

/// Orders two tiers; `Greater` means `a` beats `b`.
pub fn compare_tiers(a: &VolumeTier, b: &VolumeTier) -> Ordering {
    a.min_qty
        .cmp(&b.min_qty)
        .then_with(|| a.scope.precedence().cmp(&b.scope.precedence()))
        .then_with(|| b.tier_id.cmp(&a.tier_id))
}

/// Selects the best eligible tier, if any.
pub fn select_tier<'a>(
    tiers: &'a [VolumeTier],
    product: &ProductKey,
    qty: i64,
    now: DateTime<Utc>,
) -> Option<&'a VolumeTier> {
    tiers
        .iter()
        .filter(|tier| is_tier_eligible(tier, product, qty, now))
        .max_by(|a, b| compare_tiers(a, b))
}

/// Matches the best tier and applies it to `base_price`.
///
/// `base_price` may already be a rule price; that is how tiers stack.
/// Returns `None` when no tier is eligible, which simply means no volume
/// discount.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use vetpos_core::money::Money;
/// use vetpos_core::pricing::match_volume_tier;
/// use vetpos_core::types::{Percentage, ProductKey, TierDiscount, TierScope, VolumeTier};
///
/// let tiers = vec![VolumeTier {
///     tier_id: 1,
///     scope: TierScope::Sku,
///     product_id: Some("p-1".to_string()),
///     category_id: None,
///     min_qty: 10,
///     discount: TierDiscount::Percent(Percentage::from_percent(5)),
///     is_active: true,
///     effective_from: None,
///     effective_to: None,
/// }];
/// let product = ProductKey {
///     product_id: "p-1".to_string(),
///     sku: "AMOX-250".to_string(),
///     category_id: None,
/// };
///
/// let hit = match_volume_tier(&tiers, &product, 12, Money::from_major(90_000), Utc::now()).unwrap();
/// assert_eq!(hit.discounted_price, Money::from_major(85_500));
///
/// assert!(match_volume_tier(&tiers, &product, 9, Money::from_major(90_000), Utc::now()).is_none());
/// ```
pub fn match_volume_tier(
    tiers: &[VolumeTier],
    product: &ProductKey,
    qty: i64,
    base_price: Money,
    now: DateTime<Utc>,
) -> Option<VolumeTierMatch> {
    let tier = select_tier(tiers, product, qty, now)?;

    let discounted_price = tier.discount.apply(base_price);
    let savings = base_price - discounted_price;

    debug!(
        tier_id = tier.tier_id,
        min_qty = tier.min_qty,
        scope = tier.scope.as_str(),
        discounted_price = %discounted_price,
        "Volume tier matched"
    );

    Some(VolumeTierMatch {
        tier: tier.clone(),
        base_price,
        discounted_price,
        savings,
        savings_percent: savings.percentage_of(base_price),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Percentage, TierDiscount};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 10, 0, 0).unwrap()
    }

    fn product() -> ProductKey {
        ProductKey {
            product_id: "p-1".to_string(),
            sku: "AMOX-250".to_string(),
            category_id: Some("antibiotics".to_string()),
        }
    }

    fn sku_tier(tier_id: i64, min_qty: i64, pct: i32) -> VolumeTier {
        VolumeTier {
            tier_id,
            scope: TierScope::Sku,
            product_id: Some("p-1".to_string()),
            category_id: None,
            min_qty,
            discount: TierDiscount::Percent(Percentage::from_percent(pct)),
            is_active: true,
            effective_from: None,
            effective_to: None,
        }
    }

    fn category_tier(tier_id: i64, min_qty: i64, pct: i32) -> VolumeTier {
        VolumeTier {
            scope: TierScope::Category,
            product_id: None,
            category_id: Some("antibiotics".to_string()),
            ..sku_tier(tier_id, min_qty, pct)
        }
    }

    #[test]
    fn test_highest_threshold_reached_wins() {
        let tiers = vec![
            category_tier(1, 5, 2),
            category_tier(2, 10, 4),
            sku_tier(3, 20, 6),
            sku_tier(4, 50, 10),
        ];

        let hit = match_volume_tier(&tiers, &product(), 25, Money::from_major(1_000), now()).unwrap();
        assert_eq!(hit.tier.tier_id, 3);
        assert_eq!(hit.discounted_price, Money::from_major(940));
        assert_eq!(hit.savings, Money::from_major(60));
        assert_eq!(hit.savings_percent.bps(), 600);
    }

    #[test]
    fn test_below_every_threshold_is_no_match() {
        let tiers = vec![sku_tier(1, 10, 5)];
        assert!(match_volume_tier(&tiers, &product(), 9, Money::from_major(100), now()).is_none());
        assert!(match_volume_tier(&[], &product(), 9, Money::from_major(100), now()).is_none());
    }

    #[test]
    fn test_sku_tier_beats_category_tier_at_same_threshold() {
        let tiers = vec![category_tier(1, 10, 8), sku_tier(2, 10, 5)];
        let hit = match_volume_tier(&tiers, &product(), 10, Money::from_major(100), now()).unwrap();
        assert_eq!(hit.tier.tier_id, 2);

        let tiers = vec![sku_tier(7, 10, 5), sku_tier(4, 10, 3)];
        let hit = match_volume_tier(&tiers, &product(), 10, Money::from_major(100), now()).unwrap();
        assert_eq!(hit.tier.tier_id, 4);
    }

    #[test]
    fn test_target_must_match() {
        let mut other_product = sku_tier(1, 1, 5);
        other_product.product_id = Some("p-2".to_string());
        let mut other_category = category_tier(2, 1, 5);
        other_category.category_id = Some("vaccines".to_string());

        let tiers = vec![other_product, other_category];
        assert!(match_volume_tier(&tiers, &product(), 10, Money::from_major(100), now()).is_none());
    }

    #[test]
    fn test_inactive_and_expired_tiers_are_skipped() {
        let mut inactive = sku_tier(1, 1, 5);
        inactive.is_active = false;
        let mut expired = sku_tier(2, 1, 5);
        expired.effective_to = Some(now() - Duration::hours(1));

        let tiers = vec![inactive, expired];
        assert!(match_volume_tier(&tiers, &product(), 10, Money::from_major(100), now()).is_none());
    }

    #[test]
    fn test_amount_tier_floors_at_zero() {
        let mut tier = sku_tier(1, 1, 0);
        tier.discount = TierDiscount::Amount(Money::from_major(150));

        let hit = match_volume_tier(&[tier], &product(), 1, Money::from_major(100), now()).unwrap();
        assert_eq!(hit.discounted_price, Money::zero());
        assert_eq!(hit.savings, Money::from_major(100));
    }
}
