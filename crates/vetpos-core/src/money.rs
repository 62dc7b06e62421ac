//! # Money Module
//!
//! Provides the `Money` type and the single rounding policy shared by every
//! pricing step.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    220000 × 0.9 = 198000.00000000003  ❌                                │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (cents)                              │
//! │    22_000_000 × 9000 / 10000 = 19_800_000  ✓                            │
//! │                                                                         │
//! │  "Round to 2 decimals, half-up" is exactly "round to whole cents,      │
//! │   half-up" once amounts are stored as cents.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Policy
//! Every discount in the engine goes through [`Money::apply_percentage_discount`]
//! or [`Money::saturating_discount`]:
//! 1. compute in `i128`
//! 2. round half-up to whole cents (ties go towards +∞)
//! 3. floor at zero
//!
//! The Rule Resolver and the Volume Tier Matcher never round on their own.
//!
//! ## Usage
//! ```rust
//! use vetpos_core::money::Money;
//! use vetpos_core::types::Percentage;
//!
//! let list = Money::from_major(100_000);
//! let after_rule = list.apply_percentage_discount(Percentage::from_bps(1000));
//! assert_eq!(after_rule, Money::from_major(90_000));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::types::{Percentage, TaxRate};

/// Basis points in 100%.
const BPS_SCALE: i128 = 10_000;

/// Divides `numerator` by a positive `denominator`, rounding half-up.
///
/// Ties round towards positive infinity, so `-0.5` becomes `0` and `0.5`
/// becomes `1`.
#[inline]
fn div_round_half_up(numerator: i128, denominator: i128) -> i128 {
    debug_assert!(denominator > 0);
    (numerator * 2 + denominator).div_euclid(denominator * 2)
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: differences such as `list - final` may be negative
///   when a `net` rule sets a price above the list price
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **No currency**: the engine never converts currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use vetpos_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    ///
    /// ## Example
    /// ```rust
    /// use vetpos_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(220_000).cents(), 22_000_000);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor-unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is greater than zero.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is less than zero.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Clamps negative values to zero.
    ///
    /// ## Example
    /// ```rust
    /// use vetpos_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-1).floor_zero(), Money::zero());
    /// assert_eq!(Money::from_cents(7).floor_zero().cents(), 7);
    /// ```
    #[inline]
    pub const fn floor_zero(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Applies a percentage discount: `self × (1 − rate)`, rounded half-up to
    /// whole cents, floored at zero.
    ///
    /// Rates above 100% are allowed and produce zero. Negative rates count as
    /// zero, so the result never exceeds `self`.
    ///
    /// ## Example
    /// ```rust
    /// use vetpos_core::money::Money;
    /// use vetpos_core::types::Percentage;
    ///
    /// let base = Money::from_major(90_000);
    /// let tiered = base.apply_percentage_discount(Percentage::from_bps(500));
    /// assert_eq!(tiered, Money::from_major(85_500));
    ///
    /// // 0.05 × 50% = 0.025 → 0.03 (half-up)
    /// let tiny = Money::from_cents(5).apply_percentage_discount(Percentage::from_bps(5000));
    /// assert_eq!(tiny.cents(), 3);
    /// ```
    pub fn apply_percentage_discount(&self, rate: Percentage) -> Money {
        let keep_bps = BPS_SCALE - rate.bps().max(0) as i128;
        let cents = div_round_half_up(self.0 as i128 * keep_bps, BPS_SCALE);
        Money::from_cents(cents as i64).floor_zero()
    }

    /// Subtracts an absolute discount, floored at zero.
    ///
    /// ## Example
    /// ```rust
    /// use vetpos_core::money::Money;
    ///
    /// let base = Money::from_major(50_000);
    /// assert_eq!(base.saturating_discount(Money::from_major(60_000)), Money::zero());
    /// ```
    #[inline]
    pub fn saturating_discount(&self, discount: Money) -> Money {
        (*self - discount).floor_zero()
    }

    /// Expresses `self` as a percentage of `whole`, rounded half-up to the
    /// nearest basis point.
    ///
    /// Returns zero when `whole` is not positive (no meaningful percentage).
    /// Saturates at the `i32` basis-point range.
    ///
    /// ## Example
    /// ```rust
    /// use vetpos_core::money::Money;
    ///
    /// let savings = Money::from_major(14_500);
    /// let pct = savings.percentage_of(Money::from_major(100_000));
    /// assert_eq!(pct.bps(), 1450);
    /// ```
    pub fn percentage_of(&self, whole: Money) -> Percentage {
        if !whole.is_positive() {
            return Percentage::zero();
        }
        let bps = div_round_half_up(self.0 as i128 * BPS_SCALE, whole.0 as i128);
        Percentage::from_bps(bps.clamp(i32::MIN as i128, i32::MAX as i128) as i32)
    }

    /// Calculates a flat tax, rounded half-up.
    ///
    /// Returns `None` when the tax does not fit in `i64` cents.
    ///
    /// ## Example
    /// ```rust
    /// use vetpos_core::money::Money;
    /// use vetpos_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(1000);
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(825)).unwrap();
    /// // 10.00 × 8.25% = 0.825 → 0.83
    /// assert_eq!(tax.cents(), 83);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Option<Money> {
        let tax_cents = div_round_half_up(self.0 as i128 * rate.bps() as i128, BPS_SCALE);
        i64::try_from(tax_cents).ok().map(Money::from_cents)
    }

    /// Multiplies a unit price by a quantity, `None` on overflow.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders as `1234.56`. The currency symbol is a display concern handled by
/// [`crate::config::PricingConfig::format_currency`].
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major() {
        let money = Money::from_major(220_000);
        assert_eq!(money.cents(), 22_000_000);
        assert_eq!(money.major(), 220_000);
        assert_eq!(money.minor_part(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_major(190_000).to_string(), "190000.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_half_up_division() {
        assert_eq!(div_round_half_up(5, 10), 1);
        assert_eq!(div_round_half_up(4, 10), 0);
        assert_eq!(div_round_half_up(15, 10), 2);
        assert_eq!(div_round_half_up(25, 10), 3);
        // Ties go towards +infinity, like Math.round
        assert_eq!(div_round_half_up(-5, 10), 0);
        assert_eq!(div_round_half_up(-6, 10), -1);
    }

    #[test]
    fn test_percentage_discount_rounds_half_up() {
        // 0.15 × 0.5 = 0.075 → 0.08
        let price = Money::from_cents(15);
        assert_eq!(price.apply_percentage_discount(Percentage::from_bps(5000)).cents(), 8);

        // 333.33 × 0.9 = 299.997 → 300.00
        let price = Money::from_cents(33_333);
        assert_eq!(price.apply_percentage_discount(Percentage::from_bps(1000)).cents(), 30_000);
    }

    #[test]
    fn test_percentage_discount_floors_at_zero() {
        let price = Money::from_major(100);
        assert_eq!(
            price.apply_percentage_discount(Percentage::from_bps(15_000)),
            Money::zero()
        );
        assert_eq!(
            price.apply_percentage_discount(Percentage::from_bps(10_000)),
            Money::zero()
        );
    }

    #[test]
    fn test_saturating_discount() {
        let price = Money::from_major(50_000);
        assert_eq!(price.saturating_discount(Money::from_major(10_000)), Money::from_major(40_000));
        assert_eq!(price.saturating_discount(Money::from_major(60_000)), Money::zero());
    }

    #[test]
    fn test_percentage_of() {
        let base = Money::from_major(220_000);
        let saved = Money::from_major(30_000);
        // 13.636...% → 13.64%
        assert_eq!(saved.percentage_of(base).bps(), 1364);

        // Negative savings (net price above list) stay negative
        let markup = Money::from_major(-11_000);
        assert_eq!(markup.percentage_of(base).bps(), -500);

        assert_eq!(saved.percentage_of(Money::zero()), Percentage::zero());
    }

    #[test]
    fn test_tax_calculation_with_rounding() {
        let amount = Money::from_cents(1000);
        assert_eq!(amount.calculate_tax(TaxRate::from_bps(825)), Some(Money::from_cents(83)));
        assert_eq!(amount.calculate_tax(TaxRate::zero()), Some(Money::zero()));
    }

    #[test]
    fn test_line_arithmetic_overflow_is_reported() {
        let huge = Money::from_cents(i64::MAX / 1000);
        assert_eq!(huge.checked_multiply_quantity(9999), None);
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
        assert_eq!(Money::from_cents(i64::MAX).calculate_tax(TaxRate::from_bps(20_000)), None);
    }

    #[test]
    fn test_negative_rate_never_raises_price() {
        let price = Money::from_major(100);
        assert_eq!(price.apply_percentage_discount(Percentage::from_bps(-500)), price);

        let top = Money::from_cents(i64::MAX);
        assert_eq!(top.apply_percentage_discount(Percentage::from_bps(i32::MIN)), top);
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.checked_multiply_quantity(12), Some(Money::from_cents(12_000)));
        assert_eq!(a.checked_add(b), Some(Money::from_cents(1500)));

        let mut c = a;
        c += b;
        c -= Money::from_cents(200);
        assert_eq!(c.cents(), 1300);
    }
}
