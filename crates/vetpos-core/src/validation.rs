//! # Validation Module
//!
//! Input validation for pricing requests and rule/tier records.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request boundary                                             │
//! │  ├── validate_sku, validate_quantity                                   │
//! │  └── Rejects caller bugs before any lookup                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Record loading (vetpos-db)                                   │
//! │  ├── validate_price_rule, validate_volume_tier                         │
//! │  └── Malformed records never reach the engine                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL / CHECK / FOREIGN KEY constraints                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vetpos_core::validation::{validate_sku, validate_quantity};
//!
//! validate_sku("AMOX-250").unwrap();
//! validate_quantity(12, 9999).unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::{PriceRule, RuleAction, Scope, TierScope, VolumeTier};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use vetpos_core::validation::validate_sku;
///
/// assert!(validate_sku("AMOX-250").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a requested quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed `max`
pub fn validate_quantity(qty: i64, max: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > max {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (free items).
///
/// ## Example
/// ```rust
/// use vetpos_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a price rule record.
///
/// ## Rules
/// - `net`/`amount` values and `percent` rates are non-negative
/// - Quantity bounds are non-negative and `min_qty <= max_qty`
/// - Non-`all` scopes carry a non-empty target
/// - `effective_from <= effective_to` when both are set
pub fn validate_price_rule(rule: &PriceRule) -> ValidationResult<()> {
    let negative = match rule.action {
        RuleAction::Net(m) | RuleAction::Amount(m) => m.is_negative(),
        RuleAction::Percent(p) => p.bps() < 0,
    };
    if negative {
        return Err(ValidationError::OutOfRange {
            field: "action_value".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    validate_qty_bounds(rule.min_qty, rule.max_qty)?;

    if rule.scope != Scope::All && rule.target.as_deref().map_or(true, |t| t.trim().is_empty()) {
        return Err(ValidationError::Required {
            field: format!("target for {} scope", rule.scope),
        });
    }

    if let (Some(from), Some(to)) = (rule.effective_from, rule.effective_to) {
        if from > to {
            return Err(ValidationError::InvalidFormat {
                field: "effective_to".to_string(),
                reason: "must not be before effective_from".to_string(),
            });
        }
    }

    Ok(())
}

/// Validates a volume tier record.
///
/// ## Rules
/// - `min_qty >= 1`
/// - Sku tiers carry a product id, category tiers a category id
/// - `effective_from <= effective_to` when both are set
pub fn validate_volume_tier(tier: &VolumeTier) -> ValidationResult<()> {
    if tier.min_qty < 1 {
        return Err(ValidationError::MustBePositive {
            field: "min_qty".to_string(),
        });
    }

    let target = match tier.scope {
        TierScope::Sku => tier.product_id.as_deref(),
        TierScope::Category => tier.category_id.as_deref(),
    };
    if target.map_or(true, |t| t.trim().is_empty()) {
        return Err(ValidationError::Required {
            field: format!("target for {} tier", tier.scope.as_str()),
        });
    }

    if let (Some(from), Some(to)) = (tier.effective_from, tier.effective_to) {
        if from > to {
            return Err(ValidationError::InvalidFormat {
                field: "effective_to".to_string(),
                reason: "must not be before effective_from".to_string(),
            });
        }
    }

    Ok(())
}

fn validate_qty_bounds(min: Option<i64>, max: Option<i64>) -> ValidationResult<()> {
    for (field, bound) in [("min_qty", min), ("max_qty", max)] {
        if let Some(value) = bound {
            if value < 0 {
                return Err(ValidationError::OutOfRange {
                    field: field.to_string(),
                    min: 0,
                    max: i64::MAX,
                });
            }
        }
    }

    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(ValidationError::OutOfRange {
                field: "max_qty".to_string(),
                min,
                max: i64::MAX,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
