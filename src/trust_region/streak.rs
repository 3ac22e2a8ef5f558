//! Success/failure-streak trust-region manager.

use super::{NOMINAL, TrustRegion, TrustRegionManager, sample_within_trust_region};
use crate::buffer::DataBuffer;
use crate::error::Result;
use crate::space::{Sample, SearchSpace, uniform_sample};

/// Grows the nominal radius after a run of improving batches and shrinks it
/// after a run of non-improving ones.
///
/// A batch improves when its best value beats the region's best by a
/// relative margin of `1e-3`. After `succ_tol` consecutive improvements the
/// radius grows by one (up to its maximum); after `fail_tol` consecutive
/// failures it shrinks by one. Once it reaches its minimum the region is
/// exhausted and [`restart_required`](Self::restart_required) turns `true`;
/// the orchestration layer then calls
/// [`propose_region`](TrustRegionManager::propose_region).
///
/// # Examples
///
/// ```
/// use combopt::space::CategoricalSpace;
/// use combopt::trust_region::{StreakTrustRegion, TrustRegionManager};
///
/// let space = CategoricalSpace::nominal_grid(4, 3).unwrap();
/// let mut tr = StreakTrustRegion::new(&space, 0, 4, 1)
///     .unwrap()
///     .tolerances(2, 1)
///     .seed(7);
/// tr.region_mut().set_center(Some(vec![0; 4])).unwrap();
///
/// tr.observe(&[vec![0, 0, 0, 0]], &[5.0]).unwrap();
/// tr.observe(&[vec![1, 0, 0, 0]], &[6.0]).unwrap(); // no improvement: shrink to 0
/// assert!(tr.restart_required());
/// ```
pub struct StreakTrustRegion {
    region: TrustRegion,
    lower: Vec<usize>,
    upper: Vec<usize>,
    succ_tol: usize,
    fail_tol: usize,
    succ_count: usize,
    fail_count: usize,
    restart_required: bool,
    rng: fastrand::Rng,
}

impl StreakTrustRegion {
    /// Creates a manager with a nominal radius registered as
    /// `(min, max, init)`, default tolerances (3 successes, 40 failures) and
    /// a random seed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRadius`](crate::Error::InvalidRadius) unless `min < init <= max`.
    pub fn new<S: SearchSpace + ?Sized>(
        space: &S,
        min: usize,
        max: usize,
        init: usize,
    ) -> Result<Self> {
        let mut region = TrustRegion::new(space);
        region.register_radius(NOMINAL, min, max, init)?;
        Ok(Self {
            region,
            lower: space.lower_bounds().to_vec(),
            upper: space.upper_bounds().to_vec(),
            succ_tol: 3,
            fail_tol: 40,
            succ_count: 0,
            fail_count: 0,
            restart_required: false,
            rng: fastrand::Rng::new(),
        })
    }

    /// Sets the success and failure streak lengths that trigger a radius change.
    #[must_use]
    pub fn tolerances(mut self, succ_tol: usize, fail_tol: usize) -> Self {
        self.succ_tol = succ_tol.max(1);
        self.fail_tol = fail_tol.max(1);
        self
    }

    /// Seeds the manager's RNG.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    /// Returns `true` once the nominal radius has shrunk to its minimum.
    #[must_use]
    pub fn restart_required(&self) -> bool {
        self.restart_required
    }

    /// Adjusts radii for the batch, records it and recenters on the best point.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `x` and `y` are malformed; nothing is
    /// changed in that case.
    pub fn observe(&mut self, x: &[Sample], y: &[f64]) -> Result<()> {
        DataBuffer::new(self.lower.len()).append(x, y)?;
        self.adjust_radii(y);
        self.region.append(x, y)?;
        self.adjust_center();
        Ok(())
    }
}

impl TrustRegionManager for StreakTrustRegion {
    fn region(&self) -> &TrustRegion {
        &self.region
    }

    fn region_mut(&mut self) -> &mut TrustRegion {
        &mut self.region
    }

    fn adjust_radii(&mut self, y: &[f64]) {
        let Some(batch_best) = y.iter().copied().reduce(f64::min) else {
            return;
        };
        let improved = self
            .region
            .buffer()
            .y_min()
            .is_none_or(|best| batch_best < best - 1e-3 * best.abs());

        if improved {
            self.succ_count += 1;
            self.fail_count = 0;
        } else {
            self.fail_count += 1;
            self.succ_count = 0;
        }

        let Some(radius) = self.region.radius_mut(NOMINAL) else {
            trace_warn!("no nominal radius registered; radius left unchanged");
            return;
        };
        if self.succ_count >= self.succ_tol {
            self.succ_count = 0;
            radius.expand();
            trace_info!(radius = radius.current, "trust region expanded");
        } else if self.fail_count >= self.fail_tol {
            self.fail_count = 0;
            let exhausted = radius.shrink();
            trace_info!(radius = radius.current, "trust region shrunk");
            if exhausted {
                self.restart_required = true;
                trace_info!("trust region exhausted");
            }
        }
    }

    fn propose_region(&mut self, n_init: usize, observed: &DataBuffer) -> Result<Vec<Sample>> {
        self.restart();

        let center = match observed.x_min() {
            Some(best) => best.clone(),
            None => uniform_sample(&mut self.rng, &self.lower, &self.upper),
        };
        self.region.set_center(Some(center.clone()))?;
        let radius = self.region.nominal_radius()?;
        trace_info!(radius, "new trust region proposed");

        if n_init == 0 {
            return Ok(Vec::new());
        }
        let mut points = Vec::with_capacity(n_init);
        points.push(center.clone());
        points.extend(sample_within_trust_region(
            &mut self.rng,
            &self.lower,
            &self.upper,
            &center,
            radius,
            n_init - 1,
        ));
        Ok(points)
    }

    fn restart(&mut self) {
        self.region.restart();
        self.succ_count = 0;
        self.fail_count = 0;
        self.restart_required = false;
    }
}
