//! # Validated Measures
//!
//! Numeric newtypes with range-checked constructors. A `CoveragePercent`
//! is in [0, 100] and a `RiskWeight` in [1, 10] by construction — the
//! scoring and drift engines never re-validate these ranges.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A coverage percentage in [0, 100].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CoveragePercent(u8);

impl CoveragePercent {
    /// Full coverage.
    pub const FULL: Self = Self(100);
    /// Zero coverage.
    pub const ZERO: Self = Self(0);

    /// Construct from an integer percentage.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the value exceeds 100.
    pub fn new(value: u8) -> Result<Self, CoreError> {
        if value > 100 {
            return Err(CoreError::Validation(format!(
                "coverage percentage must be in [0, 100], got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Construct from a signed integer, rejecting negatives and overflow.
    pub fn from_i64(value: i64) -> Result<Self, CoreError> {
        if !(0..=100).contains(&value) {
            return Err(CoreError::Validation(format!(
                "coverage percentage must be in [0, 100], got {value}"
            )));
        }
        Ok(Self(value as u8))
    }

    /// The percentage as an integer.
    pub fn value(self) -> u8 {
        self.0
    }

    /// The percentage as a fraction for aggregation math.
    pub fn as_fraction(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl std::fmt::Display for CoveragePercent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// A requirement risk weight in [1, 10].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RiskWeight(u8);

impl RiskWeight {
    /// Construct from an integer weight.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the value is outside [1, 10].
    pub fn new(value: u8) -> Result<Self, CoreError> {
        if !(1..=10).contains(&value) {
            return Err(CoreError::Validation(format!(
                "risk weight must be in [1, 10], got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// The weight as an integer.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Difference `self - other`, negative when the weight decreased.
    pub fn delta(self, other: Self) -> i8 {
        self.0 as i8 - other.0 as i8
    }
}

impl std::fmt::Display for RiskWeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
