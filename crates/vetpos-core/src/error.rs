//! # Error Types
//!
//! Domain-specific error types for vetpos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vetpos-core errors (this file)                                        │
//! │  ├── PricingError     - Rejected input or failed catalog fetch         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vetpos-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → PricingError ← DbError (via PricingCatalog)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! - No eligible rule or tier: a normal result with reason `"no matching rule"`
//! - Unknown SKU or price book: a normal simulation with no list price
//! - Failed volume tier lookup: logged, priced without a tier

use thiserror::Error;

// =============================================================================
// Pricing Error
// =============================================================================

/// Errors surfaced to callers of the pricing engine.
///
/// Only caller bugs and failures of mandatory data fetches end up here.
#[derive(Debug, Error)]
pub enum PricingError {
    /// Quantity outside `1..=max`.
    #[error("Invalid quantity {qty}: must be between 1 and {max}")]
    InvalidQuantity { qty: i64, max: i64 },

    /// Negative base price.
    #[error("Invalid base price {cents} cents: must not be negative")]
    InvalidPrice { cents: i64 },

    /// The line subtotal, tax or total does not fit in `i64` cents.
    #[error("Line amount overflows for unit price {unit_cents} cents x {qty}")]
    LineOverflow { unit_cents: i64, qty: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The data-access collaborator failed on a mandatory lookup.
    ///
    /// ## When This Occurs
    /// - Product lookup failed (not "not found", an actual failure)
    /// - Price book or price rule lookup failed
    ///
    /// No retry happens at this layer.
    #[error("Catalog {operation} failed: {message}")]
    Catalog { operation: String, message: String },
}

impl PricingError {
    /// Creates a Catalog error from any displayable collaborator error.
    pub fn catalog(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        PricingError::Catalog {
            operation: operation.into(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used both for request validation and for rejecting malformed rule or tier
/// records when they are loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with PricingError.
pub type CoreResult<T> = Result<T, PricingError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PricingError::InvalidQuantity { qty: 0, max: 9999 };
        assert_eq!(err.to_string(), "Invalid quantity 0: must be between 1 and 9999");

        let err = PricingError::catalog("get_price_rules", "database is locked");
        assert_eq!(err.to_string(), "Catalog get_price_rules failed: database is locked");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "sku".to_string(),
        };
        assert_eq!(err.to_string(), "sku is required");
    }

    #[test]
    fn test_validation_converts_to_pricing_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let err: PricingError = validation_err.into();
        assert!(matches!(err, PricingError::Validation(_)));
    }
}
