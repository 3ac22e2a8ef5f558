//! Append-only observation store.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::space::Sample;

/// All observations seen so far, as encoded samples and objective values.
///
/// Rows are kept in insertion order; optimizers only rely on set membership
/// and aggregate statistics.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DataBuffer {
    num_dims: usize,
    x: Vec<Sample>,
    y: Vec<f64>,
}

impl DataBuffer {
    /// Creates an empty buffer for samples with `num_dims` coordinates.
    #[must_use]
    pub fn new(num_dims: usize) -> Self {
        Self {
            num_dims,
            x: Vec::new(),
            y: Vec::new(),
        }
    }

    /// Appends a batch of observations.
    ///
    /// The batch is validated in full before anything is stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ObservationMismatch`] if `x` and `y` differ in
    /// length, or [`Error::DimensionMismatch`] if a sample has the wrong
    /// number of coordinates.
    pub fn append(&mut self, x: &[Sample], y: &[f64]) -> Result<()> {
        if x.len() != y.len() {
            return Err(Error::ObservationMismatch {
                n_x: x.len(),
                n_y: y.len(),
            });
        }
        if let Some(bad) = x.iter().find(|s| s.len() != self.num_dims) {
            return Err(Error::DimensionMismatch {
                expected: self.num_dims,
                got: bad.len(),
            });
        }
        self.x.extend_from_slice(x);
        self.y.extend_from_slice(y);
        Ok(())
    }

    /// All observed samples.
    #[must_use]
    pub fn x(&self) -> &[Sample] {
        &self.x
    }

    /// All observed objective values.
    #[must_use]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.y.len()
    }

    /// Returns `true` if nothing has been observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Smallest observed objective value.
    #[must_use]
    pub fn y_min(&self) -> Option<f64> {
        self.argmin().map(|i| self.y[i])
    }

    /// Smallest observed objective value's sample.
    #[must_use]
    pub fn x_min(&self) -> Option<&Sample> {
        self.argmin().map(|i| &self.x[i])
    }

    /// Largest observed objective value.
    #[must_use]
    pub fn y_max(&self) -> Option<f64> {
        self.y.iter().copied().reduce(f64::max)
    }

    /// Returns `true` if `sample` was observed before.
    #[must_use]
    pub fn contains(&self, sample: &[usize]) -> bool {
        self.x.iter().any(|s| s.as_slice() == sample)
    }

    /// Drops every observation.
    pub fn restart(&mut self) {
        self.x.clear();
        self.y.clear();
    }

    fn argmin(&self) -> Option<usize> {
        self.y
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
    }
}
