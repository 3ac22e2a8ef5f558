//! Elitist genetic algorithm for nominal and ordinal search spaces.
//!
//! The population lives in canonical encoding. Each generation:
//!
//! 1. **Ranking** — the points observed since the last generation are sorted
//!    by objective value and turned into a roulette wheel: values are shifted
//!    to be non-negative, inverted (`max - y + 1`) and normalized.
//! 2. **Elitism** — the best `num_elite` points ever seen are merged with
//!    this generation's best and re-trimmed, so the elite set never gets worse.
//! 3. **Parents** — the elite set, topped up to `num_parents` by
//!    fitness-proportional draws.
//! 4. **Offspring** — pairs of random parents are recombined with
//!    single-point crossover and each child gets one coordinate mutated to
//!    a different category. Children that repeat a point already in the new
//!    population, a point suggested but not yet observed, or an observed
//!    point (unless repeats are allowed) are
//!    mutated again; after `max_mutation_attempts` the crossover is redrawn,
//!    and after `max_crossover_redraws` redraws the repeat is accepted with
//!    a warning.
//!
//! # Trust regions
//!
//! With a [`TrustRegionReader`] attached, the initial population is the
//! region center plus points sampled inside the region, crossover children
//! are projected back into the Hamming ball, and mutations that leave the
//! ball are rejected. The region is read again on every `suggest`: queued
//! points that fell outside a shrunken or moved ball are projected back into
//! it, and dropped if the projection repeats a known point. Every suggested
//! point is within the nominal radius of the center at the time of the call.
//!
//! # Configuration
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `pop_size` | 40 | Offspring per generation; upper bound for one `suggest` |
//! | `num_parents` | 20 | Size of the mating pool |
//! | `num_elite` | 10 | Best points carried across generations; rounded up to even |
//! | `store_observations` | `true` | Keep every observation in the data buffer |
//! | `allow_repeating_suggestions` | `false` | Permit suggesting observed points again |
//! | `max_mutation_attempts` | 100 | Mutations tried per crossover before redrawing it |
//! | `max_crossover_redraws` | 100 | Crossover redraws before a repeat is accepted |
//! | `seed` | random | RNG seed for reproducibility |
//!
//! # Examples
//!
//! ```
//! use combopt::optimizer::Optimizer;
//! use combopt::optimizer::genetic::GeneticAlgorithm;
//! use combopt::space::{CategoricalSpace, SearchSpace};
//!
//! let space = CategoricalSpace::nominal_grid(4, 3).unwrap();
//! let mut ga = GeneticAlgorithm::builder(space.clone())
//!     .pop_size(8)
//!     .num_parents(4)
//!     .num_elite(2)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! for _ in 0..3 {
//!     let points = ga.suggest(4).unwrap();
//!     let encoded = space.transform(&points).unwrap();
//!     let y: Vec<f64> = encoded
//!         .iter()
//!         .map(|s| s.iter().sum::<usize>() as f64)
//!         .collect();
//!     ga.observe(&points, &y).unwrap();
//! }
//! assert!(ga.best_y().is_some());
//! ```

use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Incumbent, Optimizer, encode_observations, validate_space};
use crate::buffer::DataBuffer;
use crate::distance::hamming_distance;
use crate::error::{Error, Result};
use crate::rng_util;
use crate::space::{Sample, SearchSpace, uniform_sample};
use crate::trust_region::{
    TrustRegionReader, project_into_hamming_ball, random_other_category,
    sample_within_trust_region,
};

/// Center and nominal radius of the trust region for one generation.
type Region = (Sample, usize);

/// Resolved configuration of a [`GeneticAlgorithm`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeneticAlgorithmConfig {
    /// Offspring per generation.
    pub pop_size: usize,
    /// Size of the mating pool.
    pub num_parents: usize,
    /// Elite points carried across generations. Always even once validated.
    pub num_elite: usize,
    /// Keep every observation in the data buffer.
    pub store_observations: bool,
    /// Permit suggesting previously observed points again.
    pub allow_repeating_suggestions: bool,
    /// Mutations tried per crossover before it is redrawn.
    pub max_mutation_attempts: usize,
    /// Crossover redraws before a repeated offspring is accepted.
    pub max_crossover_redraws: usize,
    /// RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for GeneticAlgorithmConfig {
    fn default() -> Self {
        Self {
            pop_size: 40,
            num_parents: 20,
            num_elite: 10,
            store_observations: true,
            allow_repeating_suggestions: false,
            max_mutation_attempts: 100,
            max_crossover_redraws: 100,
            seed: None,
        }
    }
}

impl GeneticAlgorithmConfig {
    /// Rounds `num_elite` up to an even number and checks
    /// `num_elite <= num_parents <= pop_size`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPopulation`] or [`Error::InvalidBatchSize`].
    pub fn validated(mut self) -> Result<Self> {
        if self.num_elite % 2 != 0 {
            self.num_elite += 1;
        }
        if self.pop_size == 0
            || self.num_parents == 0
            || self.num_elite > self.num_parents
            || self.num_parents > self.pop_size
        {
            return Err(Error::InvalidPopulation {
                pop_size: self.pop_size,
                num_parents: self.num_parents,
                num_elite: self.num_elite,
            });
        }
        if self.max_mutation_attempts == 0 {
            return Err(Error::InvalidBatchSize {
                name: "max_mutation_attempts",
            });
        }
        Ok(self)
    }
}

/// Genetic algorithm optimizer.
///
/// See the [module documentation](self) for the algorithm and options.
pub struct GeneticAlgorithm<S: SearchSpace> {
    space: S,
    config: GeneticAlgorithmConfig,
    trust_region: Option<TrustRegionReader>,
    rng: fastrand::Rng,
    lower: Vec<usize>,
    upper: Vec<usize>,
    /// Dimensions with more than one category.
    mutable_dims: Vec<usize>,
    x_queue: VecDeque<Sample>,
    /// Suggested points not observed yet.
    pending: Vec<Sample>,
    x_pop: Vec<Sample>,
    y_pop: Vec<f64>,
    x_elite: Vec<Sample>,
    y_elite: Vec<f64>,
    buffer: DataBuffer,
    incumbent: Incumbent,
    generation: usize,
    fallback_count: usize,
}

impl<S: SearchSpace> GeneticAlgorithm<S> {
    /// Creates a builder over `space`.
    #[must_use]
    pub fn builder(space: S) -> GeneticAlgorithmBuilder<S> {
        GeneticAlgorithmBuilder::new(space)
    }

    /// The validated configuration.
    #[must_use]
    pub fn config(&self) -> &GeneticAlgorithmConfig {
        &self.config
    }

    /// The search space.
    #[must_use]
    pub fn space(&self) -> &S {
        &self.space
    }

    /// Elite samples and their objective values, best first.
    #[must_use]
    pub fn elite(&self) -> (&[Sample], &[f64]) {
        (&self.x_elite, &self.y_elite)
    }

    /// Every observation kept so far.
    #[must_use]
    pub fn data_buffer(&self) -> &DataBuffer {
        &self.buffer
    }

    /// Number of generations produced since construction.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Number of points still queued from the current generation.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.x_queue.len()
    }

    /// How many times offspring generation fell back to accepting a repeat
    /// or reseeding an empty population.
    #[must_use]
    pub fn fallback_count(&self) -> usize {
        self.fallback_count
    }

    /// Replaces the suggestion queue with `points`.
    ///
    /// # Errors
    ///
    /// Returns an error if a point cannot be encoded; the queue is unchanged.
    pub fn set_x_init(&mut self, points: &[S::Point]) -> Result<()> {
        self.x_queue = self.space.transform(points)?.into();
        Ok(())
    }

    /// Like [`suggest`](Optimizer::suggest), but returns canonical samples.
    ///
    /// Points are distinct from each other and from every point suggested
    /// earlier but not yet observed. With a trust region attached they lie
    /// within its current nominal radius.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BatchTooLarge`] if `n > pop_size`, or a trust-region
    /// error if the attached region lost its center or radius.
    pub fn suggest_encoded(&mut self, n: usize) -> Result<Vec<Sample>> {
        if n > self.config.pop_size {
            return Err(Error::BatchTooLarge {
                requested: n,
                pop_size: self.config.pop_size,
            });
        }
        let region = self.region_snapshot()?;
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            if self.x_queue.is_empty() {
                self.generate_new_population()?;
            }
            while out.len() < n {
                let Some(candidate) = self.x_queue.pop_front() else {
                    break;
                };
                if let Some(candidate) = self.fit_to_region(candidate, region.as_ref()) {
                    self.pending.push(candidate.clone());
                    out.push(candidate);
                }
            }
        }
        Ok(out)
    }

    fn region_snapshot(&self) -> Result<Option<Region>> {
        self.trust_region
            .as_ref()
            .map(TrustRegionReader::snapshot)
            .transpose()
    }

    /// Projects a queued point into the current region if the region changed
    /// after its generation was bred. `None` if the projection is not novel.
    fn fit_to_region(&mut self, mut candidate: Sample, region: Option<&Region>) -> Option<Sample> {
        let Some((center, radius)) = region else {
            return Some(candidate);
        };
        if hamming_distance(&candidate, center) <= *radius {
            return Some(candidate);
        }
        project_into_hamming_ball(&mut self.rng, &mut candidate, center, *radius);
        if self.is_novel(&candidate, &[]) {
            Some(candidate)
        } else {
            trace_debug!("dropping a queued point that left the trust region");
            None
        }
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

    /// Breeds the next generation from everything observed since the last
    /// one and replaces the queue with it.
    ///
    /// Called automatically by `suggest` when the queue runs dry.
    ///
    /// # Errors
    ///
    /// Returns a trust-region error if the attached region lost its center
    /// or radius.
    pub fn generate_new_population(&mut self) -> Result<()> {
        let region = self.region_snapshot()?;

        if self.x_pop.is_empty() {
            if self.x_elite.is_empty() {
                trace_warn!("no observations since the last generation; reseeding the population");
                self.fallback_count += 1;
                self.x_queue = self.seed_queue(region.as_ref());
                return Ok(());
            }
            self.x_pop.clone_from(&self.x_elite);
            self.y_pop.clone_from(&self.y_elite);
        }

        let mut order: Vec<usize> = (0..self.y_pop.len()).collect();
        order.sort_by(|&a, &b| self.y_pop[a].total_cmp(&self.y_pop[b]));
        let x_sorted: Vec<Sample> = order.iter().map(|&i| self.x_pop[i].clone()).collect();
        let y_sorted: Vec<f64> = order.iter().map(|&i| self.y_pop[i]).collect();

        let cumulative = fitness_cdf(&y_sorted);
        self.update_elite(&x_sorted, &y_sorted);

        let mut parents = self.x_elite.clone();
        while parents.len() < self.config.num_parents {
            let idx = rng_util::search_sorted(&cumulative, self.rng.f64());
            parents.push(x_sorted[idx].clone());
        }

        let pop_size = self.config.pop_size;
        let mut pop: Vec<Sample> = Vec::with_capacity(pop_size);
        while pop.len() < pop_size {
            let (first, second) = self.crossover_random(&parents, region.as_ref());
            let child = self.breed(first, &parents, &pop, region.as_ref());
            pop.push(child);
            if pop.len() < pop_size {
                let child = self.breed(second, &parents, &pop, region.as_ref());
                pop.push(child);
            }
        }

        self.x_queue = pop.into();
        self.x_pop.clear();
        self.y_pop.clear();
        self.generation += 1;
        trace_info!(
            generation = self.generation,
            best_elite = ?self.y_elite.first(),
            "generated new population"
        );
        Ok(())
    }

    fn record(&mut self, x: &[Sample], y: &[f64]) -> Result<()> {
        if self.config.store_observations || !self.config.allow_repeating_suggestions {
            self.buffer.append(x, y)?;
        }
        for sample in x {
            if let Some(i) = self.pending.iter().position(|p| p == sample) {
                self.pending.swap_remove(i);
            }
        }
        self.x_pop.extend_from_slice(x);
        self.y_pop.extend_from_slice(y);
        if self.incumbent.update(x, y) {
            trace_debug!(best_y = ?self.incumbent.y(), "new best observation");
        }
        Ok(())
    }

    fn seed_queue(&mut self, region: Option<&Region>) -> VecDeque<Sample> {
        match region {
            Some((center, radius)) => self.seed_queue_in_region(center, *radius),
            None => self.seed_queue_uniform(),
        }
    }

    fn seed_queue_in_region(&mut self, center: &[usize], radius: usize) -> VecDeque<Sample> {
        let mut queue = VecDeque::with_capacity(self.config.pop_size);
        queue.push_back(center.to_vec());
        queue.extend(sample_within_trust_region(
            &mut self.rng,
            &self.lower,
            &self.upper,
            center,
            radius,
            self.config.pop_size - 1,
        ));
        let fresh: VecDeque<Sample> = queue
            .iter()
            .filter(|p| !self.pending.contains(p))
            .cloned()
            .collect();
        if fresh.is_empty() {
            trace_warn!("every seeded point is still pending; reusing them");
            self.fallback_count += 1;
            return queue;
        }
        fresh
    }

    fn seed_queue_uniform(&mut self) -> VecDeque<Sample> {
        let pop_size = self.config.pop_size;
        let mut queue: Vec<Sample> = Vec::with_capacity(pop_size);
        while queue.len() < pop_size {
            let mut candidate = uniform_sample(&mut self.rng, &self.lower, &self.upper);
            if !self.config.allow_repeating_suggestions {
                let mut attempts = 1;
                while attempts < self.config.max_mutation_attempts
                    && (queue.contains(&candidate)
                        || self.pending.contains(&candidate)
                        || self.buffer.contains(&candidate))
                {
                    candidate = uniform_sample(&mut self.rng, &self.lower, &self.upper);
                    attempts += 1;
                }
            }
            queue.push(candidate);
        }
        queue.into()
    }

    fn update_elite(&mut self, x_sorted: &[Sample], y_sorted: &[f64]) {
        let num_elite = self.config.num_elite;
        let take = num_elite.min(x_sorted.len());

        let mut merged: Vec<(Sample, f64)> = self
            .x_elite
            .drain(..)
            .zip(self.y_elite.drain(..))
            .collect();
        merged.extend(
            x_sorted[..take]
                .iter()
                .cloned()
                .zip(y_sorted[..take].iter().copied()),
        );
        merged.sort_by(|a, b| a.1.total_cmp(&b.1));

        for (x, y) in merged {
            if self.x_elite.len() == num_elite {
                break;
            }
            if !self.x_elite.contains(&x) {
                self.x_elite.push(x);
                self.y_elite.push(y);
            }
        }
        trace_debug!(elite = self.x_elite.len(), "elite set updated");
    }

    fn crossover_random(&mut self, parents: &[Sample], region: Option<&Region>) -> (Sample, Sample) {
        let r1 = self.rng.usize(..parents.len());
        let r2 = self.rng.usize(..parents.len());
        self.crossover(&parents[r1], &parents[r2], region)
    }

    /// Single-point crossover: coordinates before the cut are exchanged.
    ///
    /// The cut is drawn from `[1, num_dims - 1)` so both children mix both
    /// parents; two-dimensional spaces always cut at 1.
    fn crossover(&mut self, p1: &[usize], p2: &[usize], region: Option<&Region>) -> (Sample, Sample) {
        let mut c1 = p1.to_vec();
        let mut c2 = p2.to_vec();
        let n = c1.len();
        if n >= 2 {
            let cut = self.rng.usize(1..(n - 1).max(2));
            c1[..cut].copy_from_slice(&p2[..cut]);
            c2[..cut].copy_from_slice(&p1[..cut]);
        }
        if let Some((center, radius)) = region {
            project_into_hamming_ball(&mut self.rng, &mut c1, center, *radius);
            project_into_hamming_ball(&mut self.rng, &mut c2, center, *radius);
        }
        (c1, c2)
    }

    /// Moves one random coordinate to a different category.
    ///
    /// Inside a trust region, mutations leaving the ball are rejected and
    /// redrawn; if none is accepted the input is returned unchanged.
    fn mutate(&mut self, x: &[usize], region: Option<&Region>) -> Sample {
        if self.mutable_dims.is_empty() {
            return x.to_vec();
        }
        let attempts = if region.is_some() {
            self.config.max_mutation_attempts
        } else {
            1
        };
        for _ in 0..attempts {
            let mut candidate = x.to_vec();
            let dim = self.mutable_dims[self.rng.usize(..self.mutable_dims.len())];
            if let Some(v) = random_other_category(&mut self.rng, self.lower[dim], self.upper[dim], x[dim]) {
                candidate[dim] = v;
            }
            let within = region
                .is_none_or(|(center, radius)| hamming_distance(&candidate, center) <= *radius);
            if within {
                return candidate;
            }
        }
        x.to_vec()
    }

    /// Mutates `child` until it is novel, redrawing the crossover when
    /// mutation alone keeps producing repeats.
    fn breed(
        &mut self,
        child: Sample,
        parents: &[Sample],
        pop: &[Sample],
        region: Option<&Region>,
    ) -> Sample {
        let mut child = child;
        let mut attempts = 0;
        let mut redraws = 0;
        loop {
            let candidate = self.mutate(&child, region);
            if self.is_novel(&candidate, pop) {
                return candidate;
            }
            attempts += 1;
            if attempts >= self.config.max_mutation_attempts {
                if redraws >= self.config.max_crossover_redraws {
                    trace_warn!(
                        redraws,
                        "could not breed an unseen offspring; accepting a repeated point"
                    );
                    self.fallback_count += 1;
                    return candidate;
                }
                attempts = 0;
                redraws += 1;
                child = self.crossover_random(parents, region).0;
            }
        }
    }

    fn is_novel(&self, candidate: &Sample, pop: &[Sample]) -> bool {
        if pop.contains(candidate) || self.pending.contains(candidate) {
            return false;
        }
        if self.config.allow_repeating_suggestions {
            !self.x_elite.contains(candidate)
        } else {
            !self.buffer.contains(candidate)
        }
    }
}

impl<S: SearchSpace> Optimizer for GeneticAlgorithm<S> {
    type Point = S::Point;

    fn name(&self) -> &'static str {
        "Genetic Algorithm"
    }

    fn suggest(&mut self, n: usize) -> Result<Vec<S::Point>> {
        let samples = self.suggest_encoded(n)?;
        self.space.inverse_transform(&samples)
    }

    fn observe(&mut self, x: &[S::Point], y: &[f64]) -> Result<()> {
        let x = encode_observations(&self.space, x, y)?;
        self.record(&x, y)
    }

    fn initialize(&mut self, x: &[S::Point], y: &[f64]) -> Result<()> {
        if x.len() >= self.config.pop_size {
            return Err(Error::TooManyInitialPoints {
                got: x.len(),
                pop_size: self.config.pop_size,
            });
        }
        self.observe(x, y)
    }

    /// Clears the population accumulators and reseeds the queue uniformly.
    /// The elite set, data buffer and trust-region link are kept.
    fn restart(&mut self) {
        self.x_pop.clear();
        self.y_pop.clear();
        self.x_queue = self.seed_queue_uniform();
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

/// Builder for [`GeneticAlgorithm`].
///
/// Defaults are listed in the [module documentation](self).
pub struct GeneticAlgorithmBuilder<S: SearchSpace> {
    space: S,
    config: GeneticAlgorithmConfig,
    trust_region: Option<TrustRegionReader>,
}

impl<S: SearchSpace> GeneticAlgorithmBuilder<S> {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new(space: S) -> Self {
        Self {
            space,
            config: GeneticAlgorithmConfig::default(),
            trust_region: None,
        }
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn config(mut self, config: GeneticAlgorithmConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the population size.
    #[must_use]
    pub fn pop_size(mut self, pop_size: usize) -> Self {
        self.config.pop_size = pop_size;
        self
    }

    /// Sets the number of parents in the mating pool.
    #[must_use]
    pub fn num_parents(mut self, num_parents: usize) -> Self {
        self.config.num_parents = num_parents;
        self
    }

    /// Sets the elite size; odd values are rounded up.
    #[must_use]
    pub fn num_elite(mut self, num_elite: usize) -> Self {
        self.config.num_elite = num_elite;
        self
    }

    /// Whether to keep every observation in the data buffer.
    #[must_use]
    pub fn store_observations(mut self, store: bool) -> Self {
        self.config.store_observations = store;
        self
    }

    /// Whether observed points may be suggested again.
    #[must_use]
    pub fn allow_repeating_suggestions(mut self, allow: bool) -> Self {
        self.config.allow_repeating_suggestions = allow;
        self
    }

    /// Mutations tried per crossover before it is redrawn.
    #[must_use]
    pub fn max_mutation_attempts(mut self, attempts: usize) -> Self {
        self.config.max_mutation_attempts = attempts;
        self
    }

    /// Crossover redraws before a repeated offspring is accepted.
    #[must_use]
    pub fn max_crossover_redraws(mut self, redraws: usize) -> Self {
        self.config.max_crossover_redraws = redraws;
        self
    }

    /// Sets the RNG seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Constrains offspring to a trust region. The region must already have
    /// a center and a nominal radius.
    #[must_use]
    pub fn trust_region(mut self, reader: TrustRegionReader) -> Self {
        self.trust_region = Some(reader);
        self
    }

    /// Validates the configuration and seeds the initial population.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedSearchSpace`] for spaces with numeric
    /// variables, [`Error::InvalidPopulation`] for inconsistent sizes, and
    /// [`Error::MissingRadius`] / [`Error::MissingCenter`] /
    /// [`Error::DimensionMismatch`] for an unusable trust region.
    pub fn build(self) -> Result<GeneticAlgorithm<S>> {
        validate_space(&self.space)?;
        let config = self.config.validated()?;
        let region = self
            .trust_region
            .as_ref()
            .map(TrustRegionReader::snapshot)
            .transpose()?;
        let num_dims = self.space.num_dims();
        if let Some((center, _)) = &region
            && center.len() != num_dims
        {
            return Err(Error::DimensionMismatch {
                expected: num_dims,
                got: center.len(),
            });
        }

        let lower = self.space.lower_bounds().to_vec();
        let upper = self.space.upper_bounds().to_vec();
        let mutable_dims = (0..num_dims).filter(|&d| upper[d] > lower[d]).collect();
        let rng = config
            .seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);

        let mut ga = GeneticAlgorithm {
            buffer: DataBuffer::new(num_dims),
            space: self.space,
            config,
            trust_region: self.trust_region,
            rng,
            lower,
            upper,
            mutable_dims,
            x_queue: VecDeque::new(),
            pending: Vec::new(),
            x_pop: Vec::new(),
            y_pop: Vec::new(),
            x_elite: Vec::new(),
            y_elite: Vec::new(),
            incumbent: Incumbent::default(),
            generation: 0,
            fallback_count: 0,
        };
        ga.x_queue = ga.seed_queue(region.as_ref());
        trace_debug!(
            pop_size = ga.config.pop_size,
            trust_region = ga.trust_region.is_some(),
            "genetic algorithm initialized"
        );
        Ok(ga)
    }
}

/// Cumulative roulette-wheel distribution over ascending objective values.
///
/// Lower objective values get higher fitness: each value is inverted as
/// `max - y + 1` (which also keeps negative values positive) and
/// normalized. `-inf` counts as
/// the best finite value and `+inf`/NaN as the worst; without any usable
/// spread the wheel is uniform.
#[allow(clippy::cast_precision_loss)]
fn fitness_cdf(y_sorted: &[f64]) -> Vec<f64> {
    let finite = || y_sorted.iter().copied().filter(|y| y.is_finite());
    let lo = finite().fold(f64::INFINITY, f64::min);
    let hi = finite().fold(f64::NEG_INFINITY, f64::max);
    let clamped: Vec<f64> = y_sorted
        .iter()
        .map(|&y| {
            if y.is_finite() {
                y
            } else if y < 0.0 {
                lo
            } else {
                hi
            }
        })
        .collect();

    let fitness: Vec<f64> = clamped.iter().map(|y| hi - y + 1.0).collect();
    let total: f64 = fitness.iter().sum();

    let n = y_sorted.len() as f64;
    let mut acc = 0.0;
    fitness
        .iter()
        .map(|f| {
            acc += if total.is_finite() && total > 0.0 {
                f / total
            } else {
                1.0 / n
            };
            acc
        })
        .collect()
}
