//! Fixed-length load and generation profiles.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{GridconError, GridconResult};

/// Ordered samples, one per timestep, in absolute kW.
///
/// The buffer is shared behind an `Arc` so flows that pin their value to a
/// profile can hold it without copying a full year of samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSeries {
    values: Arc<[f64]>,
}

impl TimeSeries {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values: values.into(),
        }
    }

    /// A profile with the same value at every timestep
    pub fn constant(len: usize, value: f64) -> Self {
        Self::new(vec![value; len])
    }

    pub fn zeros(len: usize) -> Self {
        Self::constant(len, 0.0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn get(&self, t: usize) -> Option<f64> {
        self.values.get(t).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Fail with [`GridconError::DataShapeMismatch`] unless the profile has
    /// exactly `expected` samples.
    pub fn require_len(&self, name: &str, expected: usize) -> GridconResult<()> {
        if self.len() != expected {
            return Err(GridconError::DataShapeMismatch(format!(
                "profile '{}' has {} samples, horizon has {} timesteps",
                name,
                self.len(),
                expected
            )));
        }
        Ok(())
    }

    /// Fail unless every sample is finite and non-negative.
    pub fn require_non_negative(&self, name: &str) -> GridconResult<()> {
        if let Some((t, v)) = self
            .values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(GridconError::DataShapeMismatch(format!(
                "profile '{}' has invalid sample {} at timestep {}",
                name, v, t
            )));
        }
        Ok(())
    }
}

impl From<Vec<f64>> for TimeSeries {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_len() {
        let ts = TimeSeries::new(vec![1.0, 2.0, 3.0]);
        assert!(ts.require_len("pv", 3).is_ok());
        let err = ts.require_len("pv", 4).unwrap_err();
        assert!(matches!(err, GridconError::DataShapeMismatch(_)));
        assert!(err.to_string().contains("'pv' has 3 samples"));
    }

    #[test]
    fn test_require_non_negative() {
        assert!(TimeSeries::zeros(4).require_non_negative("load").is_ok());
        let ts = TimeSeries::new(vec![1.0, -0.5]);
        assert!(ts.require_non_negative("load").is_err());
        let ts = TimeSeries::new(vec![f64::NAN]);
        assert!(ts.require_non_negative("load").is_err());
    }

    #[test]
    fn test_stats() {
        let ts = TimeSeries::new(vec![1.0, 4.0, 2.0]);
        assert_eq!(ts.sum(), 7.0);
        assert_eq!(ts.max(), 4.0);
        assert_eq!(ts.get(1), Some(4.0));
        assert_eq!(ts.get(3), None);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let ts = TimeSeries::new(vec![0.5, 1.5]);
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "[0.5,1.5]");

        let back: TimeSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }
}
