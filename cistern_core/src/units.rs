//! # Unit Types
//!
//! Type-safe wrappers for the hydrology units used by the sizing method.
//! They are plain `f64` newtypes so JSON stays clean (just numbers).
//!
//! ## Metric Units
//!
//! - Rainfall depth: millimeters (mm)
//! - Area: square meters (m²)
//! - Volume: liters (L), cubic meters (m³)
//! - Flow: liters per day (L/day)
//! - Time: days
//!
//! One millimeter of rain falling on one square meter yields one liter,
//! so `Millimeters * SquareMeters` produces `Liters` directly.
//!
//! ## Example
//!
//! ```rust
//! use cistern_core::units::{CubicMeters, Liters, Millimeters, SquareMeters};
//!
//! let capture: Liters = Millimeters(1600.0) * SquareMeters(100.0);
//! assert_eq!(capture.0, 160_000.0);
//!
//! let m3: CubicMeters = capture.into();
//! assert_eq!(m3.0, 160.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Days in the year used by the sizing method
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Months in the year used for monthly averages
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Liters in one cubic meter
pub const LITERS_PER_CUBIC_METER: f64 = 1000.0;

// ============================================================================
// Depth and Area
// ============================================================================

/// Rainfall depth in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Area in square meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquareMeters(pub f64);

impl Mul<SquareMeters> for Millimeters {
    type Output = Liters;
    fn mul(self, rhs: SquareMeters) -> Liters {
        Liters(self.0 * rhs.0)
    }
}

// ============================================================================
// Volume Units
// ============================================================================

/// Volume in liters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Liters(pub f64);

/// Volume in cubic meters (1 m³ = 1000 L)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubicMeters(pub f64);

impl From<Liters> for CubicMeters {
    fn from(l: Liters) -> Self {
        CubicMeters(l.0 / LITERS_PER_CUBIC_METER)
    }
}

impl From<CubicMeters> for Liters {
    fn from(m3: CubicMeters) -> Self {
        Liters(m3.0 * LITERS_PER_CUBIC_METER)
    }
}

impl Liters {
    /// The smaller of two volumes
    pub fn min(self, other: Liters) -> Liters {
        Liters(self.0.min(other.0))
    }

    /// Spread an annual volume evenly over the months of the year
    pub fn per_month(self) -> Liters {
        Liters(self.0 / MONTHS_PER_YEAR)
    }
}

// ============================================================================
// Flow and Time
// ============================================================================

/// Consumption rate in liters per day
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LitersPerDay(pub f64);

impl LitersPerDay {
    /// Volume drawn over a full year at this rate
    pub fn over_year(self) -> Liters {
        Liters(self.0 * DAYS_PER_YEAR)
    }
}

/// Duration in days
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Days(pub f64);

impl Div<LitersPerDay> for Liters {
    type Output = Days;
    fn div(self, rhs: LitersPerDay) -> Days {
        Days(self.0 / rhs.0)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Millimeters);
impl_arithmetic!(SquareMeters);
impl_arithmetic!(Liters);
impl_arithmetic!(CubicMeters);
impl_arithmetic!(LitersPerDay);
impl_arithmetic!(Days);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rain_over_area_is_liters() {
        let v = Millimeters(1600.0) * SquareMeters(100.0);
        assert_eq!(v, Liters(160_000.0));
    }

    #[test]
    fn test_liters_to_cubic_meters() {
        let m3: CubicMeters = Liters(6570.0).into();
        assert!((m3.0 - 6.57).abs() < 1e-12);
        let back: Liters = m3.into();
        assert!((back.0 - 6570.0).abs() < 1e-9);
    }

    #[test]
    fn test_year_and_month_helpers() {
        assert_eq!(LitersPerDay(300.0).over_year(), Liters(109_500.0));
        assert_eq!(Liters(109_500.0).per_month(), Liters(9125.0));
    }

    #[test]
    fn test_autonomy_division() {
        let days = Liters(6570.0) / LitersPerDay(300.0);
        assert!((days.0 - 21.9).abs() < 1e-12);
    }

    #[test]
    fn test_arithmetic() {
        let a = Liters(10.0);
        let b = Liters(5.0);
        assert_eq!((a + b).0, 15.0);
        assert_eq!((a - b).0, 5.0);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((a / 2.0).0, 5.0);
        assert_eq!(a.min(b), b);
    }

    #[test]
    fn test_serialization_is_transparent() {
        let json = serde_json::to_string(&SquareMeters(12.5)).unwrap();
        assert_eq!(json, "12.5");
        let roundtrip: SquareMeters = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, SquareMeters(12.5));
    }
}
