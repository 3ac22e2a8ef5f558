#![allow(clippy::cast_precision_loss)]

mod bandit;
mod genetic;

use combopt::prelude::*;

/// Sum of coordinates; minimized at all zeros.
pub(crate) fn coordinate_sum(sample: &[usize]) -> f64 {
    sample.iter().sum::<usize>() as f64
}

/// Evaluates canonical samples with `coordinate_sum`.
pub(crate) fn evaluate(samples: &[Sample]) -> Vec<f64> {
    samples.iter().map(|s| coordinate_sum(s)).collect()
}
