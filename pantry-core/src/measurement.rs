use std::fmt;

use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uom::si::{
    f64::{Mass, Volume},
    mass::gram,
    volume::liter,
};

/// Decimal places kept when converting from a floating-point `uom` quantity.
const CONVERSION_SCALE: u32 = 9;

/// The kind of quantity a [`Measurement`] holds.
///
/// Each unit has a single base unit in which quantities are stored:
/// grams for [`Unit::Mass`], liters for [`Unit::Volume`], and pieces for
/// [`Unit::Count`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Mass,
    Volume,
    Count,
}

impl Unit {
    /// Returns the name of the base unit quantities are stored in.
    #[must_use]
    pub fn base_name(self) -> &'static str {
        match self {
            Unit::Mass => "gram",
            Unit::Volume => "liter",
            Unit::Count => "piece",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_name())
    }
}

/// Errors produced by measurement construction and arithmetic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasurementError {
    /// The quantity is negative.
    #[error("quantity must be non-negative, got {quantity}")]
    Validation { quantity: Decimal },

    /// A floating-point quantity is NaN, infinite, or out of decimal range.
    #[error("{value} cannot be represented as a decimal quantity")]
    NotRepresentable { value: f64 },

    /// The result of an addition is too large to represent.
    #[error("quantity overflow")]
    Overflow,

    /// The operands do not share a unit.
    #[error("unit mismatch: expected {expected}, found {found}")]
    UnitMismatch { expected: Unit, found: Unit },

    /// A subtraction would take more than is available.
    #[error("insufficient quantity: requested {requested}, only {available} available")]
    InsufficientQuantity {
        requested: Measurement,
        available: Measurement,
    },
}

/// An immutable, non-negative decimal quantity in a given [`Unit`].
///
/// Quantities are exact decimals, so adding an amount and then removing it
/// again always restores the original value. Arithmetic never mutates a
/// measurement in place; [`Measurement::add`] and [`Measurement::subtract`]
/// return a new value and reject operands whose unit differs from `self`.
///
/// # Example
///
/// ```
/// use pantry_core::{Decimal, Measurement, Unit};
///
/// let stock = Measurement::new(Unit::Mass, 1000).unwrap();
/// let used = Measurement::new(Unit::Mass, 800).unwrap();
///
/// let left = stock.subtract(used).unwrap();
/// assert_eq!(left.to_string(), "200 gram");
///
/// let splash = Measurement::new(Unit::Volume, Decimal::new(1, 1)).unwrap();
/// assert_eq!(splash.to_string(), "0.1 liter");
/// assert!(stock.add(splash).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMeasurement")]
pub struct Measurement {
    unit: Unit,
    quantity: Decimal,
}

#[derive(Deserialize)]
struct RawMeasurement {
    unit: Unit,
    quantity: Decimal,
}

impl TryFrom<RawMeasurement> for Measurement {
    type Error = MeasurementError;

    fn try_from(raw: RawMeasurement) -> Result<Self, Self::Error> {
        Measurement::new(raw.unit, raw.quantity)
    }
}

impl Measurement {
    /// Creates a measurement of `quantity` base units.
    ///
    /// Trailing zeros are dropped, so `1000.0` and `1000` render alike.
    ///
    /// # Errors
    ///
    /// Returns [`MeasurementError::Validation`] if `quantity` is negative.
    pub fn new(unit: Unit, quantity: impl Into<Decimal>) -> Result<Self, MeasurementError> {
        let quantity = quantity.into();
        if quantity < Decimal::ZERO {
            return Err(MeasurementError::Validation { quantity });
        }
        // Also turns -0 into 0.
        Ok(Self {
            unit,
            quantity: quantity.normalize(),
        })
    }

    /// Returns an empty measurement in the given unit.
    #[must_use]
    pub fn zero(unit: Unit) -> Self {
        Self {
            unit,
            quantity: Decimal::ZERO,
        }
    }

    /// Creates a mass measurement, stored in grams.
    ///
    /// The mass is rounded to nine decimal places of a gram.
    ///
    /// # Errors
    ///
    /// Fails if the mass is negative, NaN, or infinite.
    pub fn from_mass(mass: Mass) -> Result<Self, MeasurementError> {
        Self::from_float(Unit::Mass, mass.get::<gram>())
    }

    /// Creates a volume measurement, stored in liters.
    ///
    /// The volume is rounded to nine decimal places of a liter.
    ///
    /// # Errors
    ///
    /// Fails if the volume is negative, NaN, or infinite.
    pub fn from_volume(volume: Volume) -> Result<Self, MeasurementError> {
        Self::from_float(Unit::Volume, volume.get::<liter>())
    }

    fn from_float(unit: Unit, value: f64) -> Result<Self, MeasurementError> {
        let quantity = Decimal::from_f64(value)
            .ok_or(MeasurementError::NotRepresentable { value })?
            .round_dp(CONVERSION_SCALE);
        Self::new(unit, quantity)
    }

    /// Creates a count measurement.
    ///
    /// # Errors
    ///
    /// Returns [`MeasurementError::Validation`] if `count` is negative.
    pub fn pieces(count: impl Into<Decimal>) -> Result<Self, MeasurementError> {
        Self::new(Unit::Count, count)
    }

    #[must_use]
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Returns the quantity in base units.
    #[must_use]
    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.quantity.is_zero()
    }

    /// Returns the measurement as a typed mass, or `None` for other units.
    #[must_use]
    pub fn as_mass(&self) -> Option<Mass> {
        if self.unit != Unit::Mass {
            return None;
        }
        self.quantity.to_f64().map(|grams| Mass::new::<gram>(grams))
    }

    /// Returns the measurement as a typed volume, or `None` for other units.
    #[must_use]
    pub fn as_volume(&self) -> Option<Volume> {
        if self.unit != Unit::Volume {
            return None;
        }
        self.quantity.to_f64().map(|liters| Volume::new::<liter>(liters))
    }

    /// Returns the sum of two measurements.
    ///
    /// # Errors
    ///
    /// Returns [`MeasurementError::UnitMismatch`] if `other` has a different
    /// unit, or [`MeasurementError::Overflow`] if the sum is out of range.
    #[allow(clippy::should_implement_trait)]
    pub fn add(self, other: Measurement) -> Result<Self, MeasurementError> {
        self.check_unit(other)?;
        let sum = self
            .quantity
            .checked_add(other.quantity)
            .ok_or(MeasurementError::Overflow)?;
        Self::new(self.unit, sum)
    }

    /// Returns `self - other`.
    ///
    /// # Errors
    ///
    /// Returns [`MeasurementError::UnitMismatch`] if `other` has a different
    /// unit, or [`MeasurementError::InsufficientQuantity`] if `other` is larger
    /// than `self`.
    pub fn subtract(self, other: Measurement) -> Result<Self, MeasurementError> {
        self.check_unit(other)?;
        if other.quantity > self.quantity {
            return Err(MeasurementError::InsufficientQuantity {
                requested: other,
                available: self,
            });
        }
        let difference = self
            .quantity
            .checked_sub(other.quantity)
            .ok_or(MeasurementError::Overflow)?;
        Self::new(self.unit, difference)
    }

    /// Returns `max(0, self - other)`.
    ///
    /// This is the shortfall when `self` is required and `other` is on hand.
    ///
    /// # Errors
    ///
    /// Returns [`MeasurementError::UnitMismatch`] if `other` has a different unit.
    pub fn saturating_sub(self, other: Measurement) -> Result<Self, MeasurementError> {
        self.check_unit(other)?;
        if other.quantity >= self.quantity {
            return Ok(Self::zero(self.unit));
        }
        Self::new(self.unit, self.quantity - other.quantity)
    }

    /// Verifies that `other` shares this measurement's unit.
    ///
    /// # Errors
    ///
    /// Returns [`MeasurementError::UnitMismatch`] if the units differ.
    pub fn check_unit(&self, other: Measurement) -> Result<(), MeasurementError> {
        if self.unit == other.unit {
            Ok(())
        } else {
            Err(MeasurementError::UnitMismatch {
                expected: self.unit,
                found: other.unit,
            })
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quantity, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{mass::kilogram, volume::milliliter};

    fn grams(quantity: impl Into<Decimal>) -> Measurement {
        Measurement::new(Unit::Mass, quantity).unwrap()
    }

    fn liters(quantity: &str) -> Measurement {
        Measurement::new(Unit::Volume, quantity.parse::<Decimal>().unwrap()).unwrap()
    }

    #[test]
    fn rejects_negative_quantities() {
        assert!(Measurement::new(Unit::Mass, 0).is_ok(), "Zero is ok");
        assert_eq!(
            Measurement::new(Unit::Mass, -1),
            Err(MeasurementError::Validation {
                quantity: Decimal::NEGATIVE_ONE
            }),
        );
        assert!(Measurement::pieces(Decimal::new(-5, 1)).is_err());
    }

    #[test]
    fn arithmetic_returns_new_values() {
        let stock = grams(1000);

        let left = stock.subtract(grams(800)).unwrap();
        assert_eq!(left, grams(200));
        assert_eq!(stock, grams(1000));

        let restocked = left.add(grams(800)).unwrap();
        assert_eq!(restocked, stock);
    }

    #[test]
    fn fractional_amounts_round_trip_exactly() {
        let milk = liters("0.1");

        let topped_up = milk.add(liters("0.2")).unwrap();
        assert_eq!(topped_up, liters("0.3"));
        assert_eq!(topped_up.subtract(liters("0.2")).unwrap(), milk);
        assert!(liters("0.3").saturating_sub(topped_up).unwrap().is_zero());
    }

    #[test]
    fn subtract_rejects_more_than_available() {
        let result = grams(200).subtract(grams(250));

        assert_eq!(
            result,
            Err(MeasurementError::InsufficientQuantity {
                requested: grams(250),
                available: grams(200),
            })
        );
    }

    #[test]
    fn add_reports_overflow() {
        assert_eq!(
            grams(Decimal::MAX).add(grams(1)),
            Err(MeasurementError::Overflow)
        );
    }

    #[test]
    fn mismatched_units_are_rejected() {
        let water = liters("1");

        let expected = Err(MeasurementError::UnitMismatch {
            expected: Unit::Mass,
            found: Unit::Volume,
        });
        assert_eq!(grams(1).add(water), expected);
        assert_eq!(grams(1).subtract(water), expected);
        assert_eq!(grams(1).saturating_sub(water), expected);
    }

    #[test]
    fn saturating_sub_clamps_at_zero() {
        assert_eq!(grams(250).saturating_sub(grams(200)).unwrap(), grams(50));
        assert!(grams(250).saturating_sub(grams(1000)).unwrap().is_zero());
    }

    #[test]
    fn converts_through_typed_quantities() {
        let flour = Measurement::from_mass(Mass::new::<kilogram>(1.5)).unwrap();
        assert_eq!(flour, grams(1500));
        assert_relative_eq!(flour.as_mass().unwrap().get::<kilogram>(), 1.5, epsilon = 1e-12);
        assert!(flour.as_volume().is_none());

        let milk = Measurement::from_volume(Volume::new::<milliliter>(250.0)).unwrap();
        assert_eq!(milk, liters("0.25"));
        assert_relative_eq!(milk.as_volume().unwrap().get::<milliliter>(), 250.0, epsilon = 1e-9);

        assert!(matches!(
            Measurement::from_mass(Mass::new::<gram>(-3.0)),
            Err(MeasurementError::Validation { .. })
        ));
        assert!(matches!(
            Measurement::from_volume(Volume::new::<liter>(f64::NAN)),
            Err(MeasurementError::NotRepresentable { .. })
        ));
    }

    #[test]
    fn display_renders_quantity_then_unit() {
        assert_eq!(grams(1000).to_string(), "1000 gram");
        assert_eq!(grams(Decimal::new(10000, 1)).to_string(), "1000 gram");
        assert_eq!(Measurement::pieces(1).unwrap().to_string(), "1 piece");
        assert_eq!(liters("0.5").to_string(), "0.5 liter");
        assert_eq!(liters("-0").to_string(), "0 liter");
    }

    #[test]
    fn deserialization_enforces_invariants() {
        let ok: Measurement =
            serde_json::from_str(r#"{"unit":"mass","quantity":"250.0"}"#).unwrap();
        assert_eq!(ok, grams(250));

        let negative = serde_json::from_str::<Measurement>(r#"{"unit":"mass","quantity":"-1"}"#);
        assert!(negative.is_err());
    }
}
