//! # vetpos-core: Pricing Engine for VetPOS
//!
//! This crate decides what a product costs at the counter. It contains the
//! rule resolver, the volume tier matcher and the price composer as pure
//! functions, plus the async seam through which catalog data is loaded.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        VetPOS Pricing                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Callers (POS, admin tools)                   │   │
//! │  │    "what does AMOX-250 cost in book 1 at qty 12?"              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ SimulationRequest                      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vetpos-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │ PriceRule │  │   Money   │  │ resolver  │  │  records  │  │   │
//! │  │   │VolumeTier │  │ rounding  │  │ tiers     │  │  input    │  │   │
//! │  │   └───────────┘  └───────────┘  │ composer  │  └───────────┘  │   │
//! │  │                                 └─────┬─────┘                  │   │
//! │  │   PURE FUNCTIONS • EXPLICIT `now` • NO HIDDEN STATE            │   │
//! │  └───────────────────────────────────────┼─────────────────────────┘   │
//! │                                          │ PricingCatalog (trait)       │
//! │  ┌───────────────────────────────────────▼─────────────────────────┐   │
//! │  │                    vetpos-db (Database Layer)                   │   │
//! │  │          SQLite products, price books, rules, tiers             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Rules, tiers, products and price books
//! - [`money`] - Money type and the shared half-up rounding policy
//! - [`pricing`] - Resolver, tier matcher, composer and simulator
//! - [`config`] - Stacking mode, tax rate, quantity limit
//! - [`error`] - Domain error types
//! - [`validation`] - Request and record validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same inputs, same price, every time
//! 2. **Explicit Time**: the evaluation instant is a parameter, never read from the clock
//! 3. **Integer Money**: all monetary values are in cents (i64)
//! 4. **Explainable**: every result carries a reason naming the rule and tier used
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use vetpos_core::money::Money;
//! use vetpos_core::pricing::{compute_price, PricingContext};
//! use vetpos_core::types::{PriceRule, RuleAction, Scope};
//!
//! let rules = vec![PriceRule {
//!     id: 5,
//!     price_book_id: 1,
//!     name: "Clinic price".to_string(),
//!     action: RuleAction::Net(Money::from_major(190_000)),
//!     priority: 10,
//!     min_qty: None,
//!     max_qty: None,
//!     scope: Scope::All,
//!     target: None,
//!     is_active: true,
//!     effective_from: None,
//!     effective_to: None,
//! }];
//!
//! let ctx = PricingContext::new(Money::from_major(220_000), 1, Utc::now(), &rules).unwrap();
//! let result = compute_price(&ctx);
//!
//! assert_eq!(result.final_price, Money::from_major(190_000));
//! assert_eq!(result.applied_rule_id(), Some(5));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use config::{PricingConfig, TierStacking};
pub use error::{CoreResult, PricingError, ValidationError};
pub use money::Money;
pub use pricing::{PricingContext, PricingResult, VolumeTierMatch};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single line
///
/// ## Business Reason
/// Catches typing mistakes (10000 instead of 10) before they reach a tier
/// lookup. Overridable through [`PricingConfig::max_quantity`].
pub const MAX_ITEM_QUANTITY: i64 = 9999;
