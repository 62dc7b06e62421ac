//! # Pricing Configuration
//!
//! Settings that shape how a price is composed.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`VETPOS_*`)
//! 2. TOML document supplied by the host application
//! 3. Defaults (this file)
//!
//! ## TOML Format
//! ```toml
//! tax_rate = 1100          # basis points (11%)
//! tier_stacking = "stack"  # stack | best_of
//! max_quantity = 9999
//! currency_symbol = "Rp"
//! ```
//!
//! Configuration is read-only once loaded; the engine receives it by
//! reference on every call.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::money::Money;
use crate::types::TaxRate;
use crate::MAX_ITEM_QUANTITY;

/// How a volume tier combines with the rule-resolved price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierStacking {
    /// Tier discount applies on top of the rule price.
    #[default]
    Stack,

    /// Tier discount applies to the list price; the lower of the rule price
    /// and the tier price wins.
    BestOf,
}

impl std::str::FromStr for TierStacking {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stack" => Ok(TierStacking::Stack),
            "best_of" | "best-of" => Ok(TierStacking::BestOf),
            other => Err(ConfigError::InvalidValue {
                key: "tier_stacking".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid pricing config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

/// Pricing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Flat tax applied to line subtotals in simulations.
    pub tax_rate: TaxRate,

    pub tier_stacking: TierStacking,

    /// Largest quantity accepted at the request boundary.
    pub max_quantity: i64,

    /// Symbol used by [`PricingConfig::format_currency`].
    pub currency_symbol: String,
}

impl Default for PricingConfig {
    /// ## Default Values
    /// - Tax: 0%
    /// - Tiers stack on top of rule prices
    /// - Max quantity: 9999
    /// - Currency: Rp
    fn default() -> Self {
        PricingConfig {
            tax_rate: TaxRate::zero(),
            tier_stacking: TierStacking::Stack,
            max_quantity: MAX_ITEM_QUANTITY,
            currency_symbol: "Rp".to_string(),
        }
    }
}

impl PricingConfig {
    /// Parses a TOML document; missing keys keep their defaults.
    ///
    /// ## Example
    /// ```rust
    /// use vetpos_core::config::{PricingConfig, TierStacking};
    ///
    /// let config = PricingConfig::from_toml_str("tier_stacking = \"best_of\"").unwrap();
    /// assert_eq!(config.tier_stacking, TierStacking::BestOf);
    /// assert_eq!(config.max_quantity, 9999);
    /// ```
    pub fn from_toml_str(doc: &str) -> Result<Self, ConfigError> {
        let config: PricingConfig = toml::from_str(doc)?;
        if config.max_quantity < 1 {
            return Err(ConfigError::InvalidValue {
                key: "max_quantity".to_string(),
                value: config.max_quantity.to_string(),
            });
        }
        Ok(config)
    }

    /// Creates a config from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `VETPOS_TAX_RATE`: tax in percent (e.g., "11")
    /// - `VETPOS_TIER_STACKING`: `stack` or `best_of`
    /// - `VETPOS_MAX_QUANTITY`: positive integer
    /// - `VETPOS_CURRENCY_SYMBOL`: display symbol
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `VETPOS_*` overrides from an arbitrary lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup("VETPOS_TAX_RATE") {
            match raw.trim().parse::<f64>() {
                Ok(pct) if pct >= 0.0 => self.tax_rate = TaxRate::from_percentage(pct),
                _ => warn!(value = %raw, "Ignoring invalid VETPOS_TAX_RATE"),
            }
        }

        if let Some(raw) = lookup("VETPOS_TIER_STACKING") {
            match raw.parse::<TierStacking>() {
                Ok(mode) => self.tier_stacking = mode,
                Err(err) => warn!(error = %err, "Ignoring invalid VETPOS_TIER_STACKING"),
            }
        }

        if let Some(raw) = lookup("VETPOS_MAX_QUANTITY") {
            match raw.trim().parse::<i64>() {
                Ok(max) if max >= 1 => self.max_quantity = max,
                _ => warn!(value = %raw, "Ignoring invalid VETPOS_MAX_QUANTITY"),
            }
        }

        if let Some(symbol) = lookup("VETPOS_CURRENCY_SYMBOL") {
            self.currency_symbol = symbol;
        }

        self
    }

    /// Formats an amount with the configured currency symbol.
    ///
    /// ## Example
    /// ```rust
    /// use vetpos_core::config::PricingConfig;
    /// use vetpos_core::money::Money;
    ///
    /// let config = PricingConfig::default();
    /// assert_eq!(config.format_currency(Money::from_major(85_500)), "Rp85500.00");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let sign = if amount.is_negative() { "-" } else { "" };
        format!("{}{}{}", sign, self.currency_symbol, amount.abs())
    }
}
