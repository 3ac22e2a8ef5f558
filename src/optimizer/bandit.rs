//! Per-dimension EXP3-style multi-armed bandit.
//!
//! Every canonical dimension is an independent bandit whose arms are the
//! dimension's categories. Each round the log-weights are turned into a
//! sampling distribution mixed with a uniform exploration floor:
//!
//! ```text
//! prob[c] = (1 - gamma) * exp(w[c]) / sum(exp(w)) + gamma / n_cats
//! ```
//!
//! Batches of size `1 < n < n_cats` are drawn per dimension without
//! replacement by [dependent rounding](crate::dependent_rounding), so the
//! batch covers `n` distinct categories while every category keeps its
//! marginal. Other batch sizes sample each row independently.
//!
//! After an observation, the reward of a category is the best negated
//! objective among all observed points that share it, min-max scaled into
//! `[-1, 1]` over everything observed so far. The chosen category's
//! log-weight grows by `batch_size * reward * gamma / n_cats` and is clipped
//! to `[-30, 30]`.
//!
//! Suggestions never repeat inside a batch and, unless the objective is
//! declared noisy, never repeat an observed point. Colliding rows are
//! redrawn up to `resample_tol` times, after which a random point is
//! accepted with a warning.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Incumbent, Optimizer, encode_observations, validate_space};
use crate::buffer::DataBuffer;
use crate::dependent_rounding::dependent_rounding;
use crate::error::{Error, Result};
use crate::rng_util;
use crate::space::{Sample, SearchSpace, uniform_sample};
use crate::trust_region::{TrustRegionReader, project_into_hamming_ball, sample_within_trust_region};

/// Log-weights are clipped to `[-LOG_WEIGHT_LIMIT, LOG_WEIGHT_LIMIT]`.
const LOG_WEIGHT_LIMIT: f64 = 30.0;

type Region = (Sample, usize);

/// Resolved configuration of a [`MultiArmedBandit`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MultiArmedBanditConfig {
    /// Expected suggestions per round; scales exploration and weight updates.
    pub batch_size: usize,
    /// Planned number of rounds, used to derive the exploration rate.
    pub max_n_iter: usize,
    /// When `true`, observed points may be suggested again.
    pub noisy_black_box: bool,
    /// Redraws per colliding row before a random point is accepted.
    pub resample_tol: usize,
    /// RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for MultiArmedBanditConfig {
    fn default() -> Self {
        Self {
            batch_size: 1,
            max_n_iter: 200,
            noisy_black_box: false,
            resample_tol: 500,
            seed: None,
        }
    }
}

impl MultiArmedBanditConfig {
    /// Checks that `batch_size` and `max_n_iter` are positive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBatchSize`] naming the offending field.
    pub fn validated(self) -> Result<Self> {
        if self.batch_size == 0 {
            return Err(Error::InvalidBatchSize { name: "batch_size" });
        }
        if self.max_n_iter == 0 {
            return Err(Error::InvalidBatchSize { name: "max_n_iter" });
        }
        Ok(self)
    }
}

/// Multi-armed bandit optimizer, optionally confined to a fixed trust region.
pub struct MultiArmedBandit<S: SearchSpace> {
    space: S,
    config: MultiArmedBanditConfig,
    trust_region: Option<TrustRegionReader>,
    rng: fastrand::Rng,
    lower: Vec<usize>,
    upper: Vec<usize>,
    n_cats: Vec<usize>,
    gamma: Vec<f64>,
    log_weights: Vec<Vec<f64>>,
    prob_dist: Vec<Vec<f64>>,
    buffer: DataBuffer,
    incumbent: Incumbent,
    fallback_count: usize,
}

impl<S: SearchSpace> MultiArmedBandit<S> {
    /// Creates a builder over `space`.
    #[must_use]
    pub fn builder(space: S) -> MultiArmedBanditBuilder<S> {
        MultiArmedBanditBuilder::new(space)
    }

    /// The validated configuration.
    #[must_use]
    pub fn config(&self) -> &MultiArmedBanditConfig {
        &self.config
    }

    /// The search space.
    #[must_use]
    pub fn space(&self) -> &S {
        &self.space
    }

    /// Exploration rate per dimension.
    #[must_use]
    pub fn gamma(&self) -> &[f64] {
        &self.gamma
    }

    /// Log-weights per dimension and category.
    #[must_use]
    pub fn log_weights(&self) -> &[Vec<f64>] {
        &self.log_weights
    }

    /// Sampling distribution per dimension as of the last
    /// [`update_prob_dist`](Self::update_prob_dist).
    #[must_use]
    pub fn prob_dist(&self) -> &[Vec<f64>] {
        &self.prob_dist
    }

    /// Every observation so far.
    #[must_use]
    pub fn data_buffer(&self) -> &DataBuffer {
        &self.buffer
    }

    /// How many suggested rows fell back to a random draw after
    /// `resample_tol` collisions.
    #[must_use]
    pub fn fallback_count(&self) -> usize {
        self.fallback_count
    }

    /// Recomputes the sampling distribution from the current log-weights.
    pub fn update_prob_dist(&mut self) {
        self.prob_dist = self
            .log_weights
            .iter()
            .zip(&self.gamma)
            .map(|(weights, &gamma)| mixed_distribution(weights, gamma))
            .collect();
    }

    /// Replaces the fixed trust region, or removes it with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRadius`], [`Error::MissingCenter`] or
    /// [`Error::DimensionMismatch`] if the new region is unusable; the
    /// previous region is kept in that case.
    pub fn update_fixed_trust_region(&mut self, reader: Option<TrustRegionReader>) -> Result<()> {
        if let Some(reader) = &reader {
            check_region(reader, self.space.num_dims())?;
        }
        self.trust_region = reader;
        trace_debug!(trust_region = self.trust_region.is_some(), "fixed trust region updated");
        Ok(())
    }

    /// Has no effect on a bandit: its suggestions come from the weights.
    #[allow(clippy::unused_self)]
    pub fn set_x_init(&mut self, _points: &[S::Point]) {
        trace_warn!("set_x_init does not apply to the multi-armed bandit; ignoring");
    }

    /// Like [`suggest`](Optimizer::suggest), but returns canonical samples.
    ///
    /// # Errors
    ///
    /// Returns a trust-region error if the fixed region lost its center or
    /// radius.
    pub fn suggest_encoded(&mut self, n: usize) -> Result<Vec<Sample>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let region = self
            .trust_region
            .as_ref()
            .map(TrustRegionReader::snapshot)
            .transpose()?;
        self.update_prob_dist();

        let num_dims = self.n_cats.len();
        let mut batch: Vec<Sample> = vec![vec![0; num_dims]; n];
        for j in 0..num_dims {
            let low = self.lower[j];
            if 1 < n && n < self.n_cats[j] {
                let mut chosen = dependent_rounding(&mut self.rng, &self.prob_dist[j], n);
                self.rng.shuffle(&mut chosen);
                for (row, c) in batch.iter_mut().zip(chosen) {
                    row[j] = low + c;
                }
            } else {
                for row in &mut batch {
                    row[j] = low + rng_util::categorical(&mut self.rng, &self.prob_dist[j]);
                }
            }
        }

        if let Some((center, radius)) = &region {
            for row in &mut batch {
                project_into_hamming_ball(&mut self.rng, row, center, *radius);
            }
        }

        for i in 0..n {
            let mut attempts = 0;
            while self.was_seen(&batch, i) {
                if attempts >= self.config.resample_tol {
                    trace_warn!(
                        resample_tol = self.config.resample_tol,
                        "failed to draw an unseen sample; falling back to a random one"
                    );
                    self.fallback_count += 1;
                    batch[i] = self.random_sample(region.as_ref());
                    break;
                }
                batch[i] = self.draw_row(region.as_ref());
                attempts += 1;
            }
        }
        Ok(batch)
    }

    /// Like [`observe`](Optimizer::observe), but takes canonical samples.
    ///
    /// # Errors
    ///
    /// Returns an error if lengths differ or a sample is out of bounds;
    /// nothing is recorded in that case.
    pub fn observe_encoded(&mut self, x: &[Sample], y: &[f64]) -> Result<()> {
        if x.len() != y.len() {
            return Err(Error::ObservationMismatch {
                n_x: x.len(),
                n_y: y.len(),
            });
        }
        self.space.inverse_transform(x)?;
        self.record(x, y)
    }

    fn record(&mut self, x: &[Sample], y: &[f64]) -> Result<()> {
        self.buffer.append(x, y)?;
        if self.incumbent.update(x, y) {
            trace_debug!(best_y = ?self.incumbent.y(), "new best observation");
        }
        let rewards = self.rewards(x);
        self.update_weights(x, &rewards);
        Ok(())
    }

    /// Reward per row of `x` and dimension, from everything in the buffer.
    ///
    /// Zero when no observed point with a finite value shares the category,
    /// or when the finite observed values span no (or an unbounded) range.
    /// Non-finite objective values never contribute.
    pub(crate) fn rewards(&self, x: &[Sample]) -> Vec<Vec<f64>> {
        let ys = self.buffer.y();
        let finite = || ys.iter().copied().filter(|y| y.is_finite());
        let y_min = finite().fold(f64::INFINITY, f64::min);
        let y_max = finite().fold(f64::NEG_INFINITY, f64::max);
        // Rewards are negated objectives, so their range is [-y_max, -y_min].
        let (r_min, r_max) = (-y_max, -y_min);
        let span = r_max - r_min;
        let degenerate = !span.is_finite() || span <= 0.0;

        x.iter()
            .map(|row| {
                (0..row.len())
                    .map(|j| {
                        let best = self
                            .buffer
                            .x()
                            .iter()
                            .zip(ys)
                            .filter(|(observed, y)| observed[j] == row[j] && y.is_finite())
                            .map(|(_, &y)| -y)
                            .reduce(f64::max);
                        match best {
                            Some(r) if !degenerate => 2.0 * (r - r_min) / span - 1.0,
                            _ => 0.0,
                        }
                    })
                    .collect()
            })
            .collect()
    }

    #[allow(clippy::cast_precision_loss)]
    fn update_weights(&mut self, x: &[Sample], rewards: &[Vec<f64>]) {
        let batch_size = self.config.batch_size as f64;
        for (row, row_rewards) in x.iter().zip(rewards) {
            for (j, &reward) in row_rewards.iter().enumerate() {
                let c = row[j] - self.lower[j];
                let step = batch_size * reward * self.gamma[j] / self.n_cats[j] as f64;
                let weight = &mut self.log_weights[j][c];
                *weight = (*weight + step).clamp(-LOG_WEIGHT_LIMIT, LOG_WEIGHT_LIMIT);
            }
        }
    }

    fn was_seen(&self, batch: &[Sample], i: usize) -> bool {
        let row = &batch[i];
        let in_batch = batch
            .iter()
            .enumerate()
            .any(|(k, other)| k != i && other == row);
        in_batch || (!self.config.noisy_black_box && self.buffer.contains(row))
    }

    fn draw_row(&mut self, region: Option<&Region>) -> Sample {
        let mut row: Sample = (0..self.n_cats.len())
            .map(|j| self.lower[j] + rng_util::categorical(&mut self.rng, &self.prob_dist[j]))
            .collect();
        if let Some((center, radius)) = region {
            project_into_hamming_ball(&mut self.rng, &mut row, center, *radius);
        }
        row
    }

    fn random_sample(&mut self, region: Option<&Region>) -> Sample {
        match region {
            Some((center, radius)) => sample_within_trust_region(
                &mut self.rng,
                &self.lower,
                &self.upper,
                center,
                *radius,
                1,
            )
            .pop()
            .unwrap_or_else(|| center.clone()),
            None => self
                .space
                .sample_encoded(&mut self.rng, 1)
                .pop()
                .unwrap_or_else(|| uniform_sample(&mut self.rng, &self.lower, &self.upper)),
        }
    }
}

impl<S: SearchSpace> Optimizer for MultiArmedBandit<S> {
    type Point = S::Point;

    fn name(&self) -> &'static str {
        if self.trust_region.is_some() {
            "Tr-based Multi-Armed Bandit"
        } else {
            "Multi-Armed Bandit"
        }
    }

    fn suggest(&mut self, n: usize) -> Result<Vec<S::Point>> {
        let samples = self.suggest_encoded(n)?;
        self.space.inverse_transform(&samples)
    }

    fn observe(&mut self, x: &[S::Point], y: &[f64]) -> Result<()> {
        let x = encode_observations(&self.space, x, y)?;
        self.record(&x, y)
    }

    /// Records prior data without touching the weights.
    fn initialize(&mut self, x: &[S::Point], y: &[f64]) -> Result<()> {
        let x = encode_observations(&self.space, x, y)?;
        self.buffer.append(&x, y)?;
        self.incumbent.update(&x, y);
        Ok(())
    }

    /// Recomputes the exploration rates and zeroes every log-weight. The
    /// observation buffer is kept.
    fn restart(&mut self) {
        self.gamma = exploration_rates(&self.n_cats, self.config.batch_size, self.config.max_n_iter);
        self.log_weights = self.n_cats.iter().map(|&n| vec![0.0; n]).collect();
        self.update_prob_dist();
    }

    fn best_x(&self) -> Option<S::Point> {
        let x = self.incumbent.x()?;
        self.space
            .inverse_transform(core::slice::from_ref(x))
            .ok()?
            .pop()
    }

    fn best_y(&self) -> Option<f64> {
        self.incumbent.y()
    }
}

/// Builder for [`MultiArmedBandit`].
///
/// | Option | Default |
/// |--------|---------|
/// | `batch_size` | 1 |
/// | `max_n_iter` | 200 |
/// | `noisy_black_box` | `false` |
/// | `resample_tol` | 500 |
/// | `seed` | random |
pub struct MultiArmedBanditBuilder<S: SearchSpace> {
    space: S,
    config: MultiArmedBanditConfig,
    trust_region: Option<TrustRegionReader>,
}

impl<S: SearchSpace> MultiArmedBanditBuilder<S> {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new(space: S) -> Self {
        Self {
            space,
            config: MultiArmedBanditConfig::default(),
            trust_region: None,
        }
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn config(mut self, config: MultiArmedBanditConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the expected batch size.
    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Sets the planned number of rounds.
    #[must_use]
    pub fn max_n_iter(mut self, max_n_iter: usize) -> Self {
        self.config.max_n_iter = max_n_iter;
        self
    }

    /// Declares the objective noisy, allowing observed points to be suggested again.
    #[must_use]
    pub fn noisy_black_box(mut self, noisy: bool) -> Self {
        self.config.noisy_black_box = noisy;
        self
    }

    /// Sets the number of redraws per colliding row.
    #[must_use]
    pub fn resample_tol(mut self, resample_tol: usize) -> Self {
        self.config.resample_tol = resample_tol;
        self
    }

    /// Sets the RNG seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Confines suggestions to a fixed trust region.
    #[must_use]
    pub fn trust_region(mut self, reader: TrustRegionReader) -> Self {
        self.trust_region = Some(reader);
        self
    }

    /// Validates the configuration and initializes the weights.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedSearchSpace`] for spaces with numeric
    /// variables, [`Error::InvalidBatchSize`] for a zero batch size or
    /// horizon, and a trust-region error for an unusable region.
    pub fn build(self) -> Result<MultiArmedBandit<S>> {
        validate_space(&self.space)?;
        let config = self.config.validated()?;
        let num_dims = self.space.num_dims();
        if let Some(reader) = &self.trust_region {
            check_region(reader, num_dims)?;
        }

        let n_cats: Vec<usize> = (0..num_dims).map(|j| self.space.n_categories(j)).collect();
        let gamma = exploration_rates(&n_cats, config.batch_size, config.max_n_iter);
        let log_weights = n_cats.iter().map(|&n| vec![0.0; n]).collect();
        let rng = config
            .seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);

        let mut mab = MultiArmedBandit {
            lower: self.space.lower_bounds().to_vec(),
            upper: self.space.upper_bounds().to_vec(),
            buffer: DataBuffer::new(num_dims),
            space: self.space,
            config,
            trust_region: self.trust_region,
            rng,
            n_cats,
            gamma,
            log_weights,
            prob_dist: Vec::new(),
            incumbent: Incumbent::default(),
            fallback_count: 0,
        };
        mab.update_prob_dist();
        trace_debug!(
            dims = num_dims,
            trust_region = mab.trust_region.is_some(),
            "multi-armed bandit initialized"
        );
        Ok(mab)
    }
}

fn check_region(reader: &TrustRegionReader, num_dims: usize) -> Result<()> {
    let (center, _) = reader.snapshot()?;
    if center.len() != num_dims {
        return Err(Error::DimensionMismatch {
            expected: num_dims,
            got: center.len(),
        });
    }
    Ok(())
}

/// EXP3 exploration rate per dimension, capped at 1.
///
/// Uses a horizon estimate of `2 * max_n_iter / 3`.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn exploration_rates(n_cats: &[usize], batch_size: usize, max_n_iter: usize) -> Vec<f64> {
    let best_ube = 2.0 * max_n_iter as f64 / 3.0;
    let b = batch_size as f64;
    let e_minus_one = core::f64::consts::E - 1.0;
    n_cats
        .iter()
        .map(|&n| {
            let n = n as f64;
            let gamma = if n > b {
                (n * (n / b).ln() / (e_minus_one * b * best_ube)).sqrt()
            } else {
                (n * n.ln() / (e_minus_one * best_ube)).sqrt()
            };
            gamma.min(1.0)
        })
        .collect()
}

/// Softmax of `log_weights` mixed with a uniform floor of `gamma / n`.
#[allow(clippy::cast_precision_loss)]
fn mixed_distribution(log_weights: &[f64], gamma: f64) -> Vec<f64> {
    let n = log_weights.len() as f64;
    let max = log_weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let weights: Vec<f64> = log_weights.iter().map(|w| (w - max).exp()).collect();
    let norm: f64 = weights.iter().sum();
    weights
        .iter()
        .map(|w| (1.0 - gamma) * (w / norm) + gamma / n)
        .collect()
}
