//! # Domain Types
//!
//! Catalog and rule types consumed by the pricing engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   PriceRule     │   │   VolumeTier    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (i64)       │   │  tier_id (i64)  │       │
//! │  │  sku            │   │  action         │   │  scope          │       │
//! │  │  list_price     │   │  priority       │   │  min_qty        │       │
//! │  │  category_id    │   │  scope + target │   │  discount       │       │
//! │  └─────────────────┘   │  qty + dates    │   │  dates          │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Percentage    │   │     Scope       │   │   RuleAction    │       │
//! │  │  bps (i32)      │   │  Sku      (3)   │   │  Net(Money)     │       │
//! │  │  1000 = 10%     │   │  Category (2)   │   │  Percent(%)     │       │
//! │  └─────────────────┘   │  Tag      (1)   │   │  Amount(Money)  │       │
//! │                        │  All      (0)   │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All of these are read-only to the engine. They are created and edited by
//! store administrators elsewhere and handed in per calculation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Flat tax rate in basis points (1100 = 11%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for configuration input).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Percentage
// =============================================================================

/// A percentage in basis points (1 bp = 0.01%).
///
/// Signed because reported discount percentages can be negative when a `net`
/// rule prices above the list price. Rule and tier inputs are validated to be
/// non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percentage(i32);

impl Percentage {
    #[inline]
    pub const fn from_bps(bps: i32) -> Self {
        Percentage(bps)
    }

    /// Creates a percentage from whole percent (`10` → 10%).
    #[inline]
    pub const fn from_percent(pct: i32) -> Self {
        Percentage(pct * 100)
    }

    #[inline]
    pub const fn bps(&self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Percentage(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// Renders `1000` as `10%`, `1250` as `12.5%`, `1234` as `12.34%`.
impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / 100;
        let frac = abs % 100;
        match frac {
            0 => write!(f, "{}{}%", sign, whole),
            f10 if f10 % 10 == 0 => write!(f, "{}{}.{}%", sign, whole, f10 / 10),
            _ => write!(f, "{}{}.{:02}%", sign, whole, frac),
        }
    }
}

// =============================================================================
// Scope
// =============================================================================

/// The matching dimension of a price rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Matches one SKU code.
    Sku,
    /// Matches every product in a category.
    Category,
    /// Matches products carrying a tag.
    ///
    /// Tag matching against raw rules is disabled until the product-tag model
    /// is defined; see `pricing::resolver`.
    Tag,
    /// Matches every product.
    All,
}

impl Scope {
    /// Narrowness used as the second ranking key: sku > category > tag > all.
    #[inline]
    pub const fn specificity(&self) -> u8 {
        match self {
            Scope::Sku => 3,
            Scope::Category => 2,
            Scope::Tag => 1,
            Scope::All => 0,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Scope::Sku => "sku",
            Scope::Category => "category",
            Scope::Tag => "tag",
            Scope::All => "all",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sku" => Ok(Scope::Sku),
            "category" => Ok(Scope::Category),
            "tag" => Ok(Scope::Tag),
            "all" => Ok(Scope::All),
            _ => Err(ValidationError::NotAllowed {
                field: "scope".to_string(),
                allowed: vec![
                    "sku".to_string(),
                    "category".to_string(),
                    "tag".to_string(),
                    "all".to_string(),
                ],
            }),
        }
    }
}

/// The matching dimension of a volume tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TierScope {
    Sku,
    Category,
}

impl TierScope {
    /// Sku tiers win ties against category tiers at the same threshold.
    #[inline]
    pub const fn precedence(&self) -> u8 {
        match self {
            TierScope::Sku => 1,
            TierScope::Category => 0,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            TierScope::Sku => "sku",
            TierScope::Category => "category",
        }
    }
}

impl FromStr for TierScope {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sku" => Ok(TierScope::Sku),
            "category" => Ok(TierScope::Category),
            _ => Err(ValidationError::NotAllowed {
                field: "tier scope".to_string(),
                allowed: vec!["sku".to_string(), "category".to_string()],
            }),
        }
    }
}

// =============================================================================
// Rule Action
// =============================================================================

/// What a winning rule does to the base price.
///
/// Serialized as `{ "action_type": "percent", "action_value": 1000 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "action_type", content = "action_value", rename_all = "snake_case")]
pub enum RuleAction {
    /// Sets the final price, ignoring the base price.
    Net(Money),
    /// Relative discount off the base price.
    Percent(Percentage),
    /// Absolute amount subtracted from the base price.
    Amount(Money),
}

impl RuleAction {
    /// Builds an action from its storage form.
    ///
    /// `scaled_value` is the magnitude × 100: cents for `net`/`amount`,
    /// basis points for `percent`.
    ///
    /// ## Example
    /// ```rust
    /// use vetpos_core::types::{Percentage, RuleAction};
    ///
    /// let action = RuleAction::from_parts("percent", 1000).unwrap();
    /// assert_eq!(action, RuleAction::Percent(Percentage::from_bps(1000)));
    /// assert!(RuleAction::from_parts("bogo", 1).is_err());
    /// ```
    pub fn from_parts(action_type: &str, scaled_value: i64) -> Result<Self, ValidationError> {
        if scaled_value < 0 {
            return Err(ValidationError::OutOfRange {
                field: "action_value".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }

        match action_type {
            "net" => Ok(RuleAction::Net(Money::from_cents(scaled_value))),
            "amount" => Ok(RuleAction::Amount(Money::from_cents(scaled_value))),
            "percent" => {
                let bps = i32::try_from(scaled_value).map_err(|_| ValidationError::OutOfRange {
                    field: "action_value".to_string(),
                    min: 0,
                    max: i32::MAX as i64,
                })?;
                Ok(RuleAction::Percent(Percentage::from_bps(bps)))
            }
            _ => Err(ValidationError::NotAllowed {
                field: "action_type".to_string(),
                allowed: vec!["net".to_string(), "percent".to_string(), "amount".to_string()],
            }),
        }
    }

    pub const fn action_type(&self) -> &'static str {
        match self {
            RuleAction::Net(_) => "net",
            RuleAction::Percent(_) => "percent",
            RuleAction::Amount(_) => "amount",
        }
    }

    /// Storage magnitude (× 100), inverse of [`RuleAction::from_parts`].
    pub const fn scaled_value(&self) -> i64 {
        match self {
            RuleAction::Net(m) | RuleAction::Amount(m) => m.cents(),
            RuleAction::Percent(p) => p.bps() as i64,
        }
    }

    /// Applies the action to a base price, floored at zero.
    pub fn apply(&self, base_price: Money) -> Money {
        match self {
            RuleAction::Net(price) => price.floor_zero(),
            RuleAction::Percent(rate) => base_price.apply_percentage_discount(*rate),
            RuleAction::Amount(discount) => base_price.saturating_discount(*discount),
        }
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleAction::Net(price) => write!(f, "net price {}", price),
            RuleAction::Percent(rate) => write!(f, "{} off", rate),
            RuleAction::Amount(amount) => write!(f, "{} off", amount),
        }
    }
}

// =============================================================================
// Price Rule
// =============================================================================

/// A conditional discount or price override belonging to a price book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceRule {
    pub id: i64,

    pub price_book_id: i64,

    /// Display name for administrators.
    pub name: String,

    pub action: RuleAction,

    /// Higher value wins.
    pub priority: i32,

    /// Inclusive lower quantity bound; `None` = unbounded.
    pub min_qty: Option<i64>,

    /// Inclusive upper quantity bound; `None` = unbounded.
    pub max_qty: Option<i64>,

    pub scope: Scope,

    /// SKU code, category id or tag. Ignored for `Scope::All`.
    pub target: Option<String>,

    pub is_active: bool,

    #[ts(as = "Option<String>")]
    pub effective_from: Option<DateTime<Utc>>,

    #[ts(as = "Option<String>")]
    pub effective_to: Option<DateTime<Utc>>,
}

impl PriceRule {
    /// Short identifier used in explanations, e.g. `rule #5 "Member price"`.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            format!("rule #{}", self.id)
        } else {
            format!("rule #{} \"{}\"", self.id, self.name)
        }
    }
}

// =============================================================================
// Volume Tier
// =============================================================================

/// The discount granted by a volume tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TierDiscount {
    Percent(Percentage),
    Amount(Money),
}

impl TierDiscount {
    /// Builds a discount from the two nullable storage columns.
    ///
    /// Percent wins when both are present. Neither present is malformed.
    pub fn from_columns(
        percent_bps: Option<i64>,
        amount_cents: Option<i64>,
    ) -> Result<Self, ValidationError> {
        match (percent_bps, amount_cents) {
            (Some(bps), _) => {
                let bps = i32::try_from(bps)
                    .ok()
                    .filter(|b| *b >= 0)
                    .ok_or_else(|| ValidationError::OutOfRange {
                        field: "discount_percent".to_string(),
                        min: 0,
                        max: i32::MAX as i64,
                    })?;
                Ok(TierDiscount::Percent(Percentage::from_bps(bps)))
            }
            (None, Some(cents)) if cents >= 0 => Ok(TierDiscount::Amount(Money::from_cents(cents))),
            (None, Some(_)) => Err(ValidationError::OutOfRange {
                field: "discount_amount".to_string(),
                min: 0,
                max: i64::MAX,
            }),
            (None, None) => Err(ValidationError::Required {
                field: "discount_percent or discount_amount".to_string(),
            }),
        }
    }

    /// Applies the discount to a base price, floored at zero.
    pub fn apply(&self, base_price: Money) -> Money {
        match self {
            TierDiscount::Percent(rate) => base_price.apply_percentage_discount(*rate),
            TierDiscount::Amount(amount) => base_price.saturating_discount(*amount),
        }
    }
}

impl fmt::Display for TierDiscount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierDiscount::Percent(rate) => write!(f, "{} off", rate),
            TierDiscount::Amount(amount) => write!(f, "{} off", amount),
        }
    }
}

/// A quantity-break discount for a product or a whole category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VolumeTier {
    pub tier_id: i64,

    pub scope: TierScope,

    /// Set for `TierScope::Sku`.
    pub product_id: Option<String>,

    /// Set for `TierScope::Category`.
    pub category_id: Option<String>,

    /// Inclusive lower bound. There is no upper bound; a higher tier takes
    /// over once its threshold is reached.
    pub min_qty: i64,

    pub discount: TierDiscount,

    pub is_active: bool,

    #[ts(as = "Option<String>")]
    pub effective_from: Option<DateTime<Utc>>,

    #[ts(as = "Option<String>")]
    pub effective_to: Option<DateTime<Utc>>,
}

// =============================================================================
// Catalog
// =============================================================================

/// The pricing view of a product, as served by the catalog collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    pub name: String,

    /// Catalog price before any rule or tier.
    pub list_price: Money,

    pub category_id: Option<String>,

    /// Soft delete flag.
    pub is_active: bool,
}

impl Product {
    /// Returns the identity used for rule and tier matching.
    pub fn key(&self) -> ProductKey {
        ProductKey {
            product_id: self.id.clone(),
            sku: self.sku.clone(),
            category_id: self.category_id.clone(),
        }
    }
}

/// The identity a rule or tier is matched against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductKey {
    pub product_id: String,
    pub sku: String,
    pub category_id: Option<String>,
}

/// A named collection of price rules for a channel, branch or customer group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceBook {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================
