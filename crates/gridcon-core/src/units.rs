//! Compile-time unit safety for sizing quantities.
//!
//! Prevents mixing incompatible units like kW and kWh.
//!
//! # Design Philosophy
//!
//! The sizing model handles a handful of physical and economic quantities:
//! - Power (kW): flows, transformer capacity
//! - Energy (kWh): storage capacity, state of charge, energy per timestep
//! - Duration (h): timestep length
//!
//! All types use `#[repr(transparent)]` so they have the same memory layout
//! as `f64`.
//!
//! # Usage
//!
//! ```
//! use gridcon_core::units::{Hours, KilowattHours, Kilowatts};
//!
//! let p = Kilowatts(40.0);
//! let e: KilowattHours = p * Hours(0.25);
//! assert_eq!(e, KilowattHours(10.0));
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Macro to implement common arithmetic operations for unit types
macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
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

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Mul<$type> for f64 {
            type Output = $type;
            fn mul(self, rhs: $type) -> Self::Output {
                <$type>::new(self * rhs.0)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            /// Create a new value
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            /// Absolute value
            #[inline]
            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            /// Check if value is finite
            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            /// Maximum of two values
            #[inline]
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }

        impl<'a> std::iter::Sum<&'a $type> for $type {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

// =============================================================================
// Power and Energy
// =============================================================================

/// Active power in kilowatts (kW)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilowatts(pub f64);

impl_unit_ops!(Kilowatts, "kW");

/// Energy in kilowatt-hours (kWh)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct KilowattHours(pub f64);

impl_unit_ops!(KilowattHours, "kWh");

/// Duration in hours (h)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Hours(pub f64);

impl_unit_ops!(Hours, "h");

impl Mul<Hours> for Kilowatts {
    type Output = KilowattHours;
    fn mul(self, rhs: Hours) -> Self::Output {
        KilowattHours(self.0 * rhs.0)
    }
}

impl Div<Hours> for KilowattHours {
    type Output = Kilowatts;
    fn div(self, rhs: Hours) -> Self::Output {
        Kilowatts(self.0 / rhs.0)
    }
}
