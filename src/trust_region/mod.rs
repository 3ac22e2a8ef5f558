//! Trust regions over the canonical encoding.
//!
//! A trust region is a center sample plus one radius per variable-type
//! class. For nominal variables the radius bounds the Hamming distance to
//! the center, so the region is a Hamming ball.
//!
//! # Ownership
//!
//! A [`TrustRegionManager`] is the only thing allowed to move the center or
//! change radii. It is wrapped in a [`SharedTrustRegion`] held by the
//! orchestration layer; optimizers receive a [`TrustRegionReader`], which
//! can read the center and radius but has no way to mutate them.
//!
//! ```
//! use combopt::space::CategoricalSpace;
//! use combopt::trust_region::{SharedTrustRegion, StreakTrustRegion, TrustRegionManager};
//!
//! let space = CategoricalSpace::nominal_grid(5, 4).unwrap();
//! let mut manager = StreakTrustRegion::new(&space, 0, 5, 3).unwrap();
//! manager.region_mut().set_center(Some(vec![0; 5])).unwrap();
//!
//! let shared = SharedTrustRegion::new(manager);
//! let reader = shared.reader();
//! assert_eq!(reader.nominal_radius().unwrap(), 3);
//!
//! // Only the owner of `shared` can adjust the region.
//! shared.write().region_mut().set_center(Some(vec![1; 5])).unwrap();
//! assert_eq!(reader.center(), Some(vec![1; 5]));
//! ```

mod sampling;
mod streak;

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use sampling::sample_within_trust_region;
pub(crate) use sampling::random_other_category;
pub use streak::StreakTrustRegion;

use crate::buffer::DataBuffer;
use crate::distance::hamming_distance;
use crate::error::{Error, Result};
use crate::rng_util;
use crate::space::{Sample, SearchSpace};

/// Name of the radius class that bounds nominal variables.
pub const NOMINAL: &str = "nominal";

/// Bounds and current value of one registered radius.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Radius {
    /// Lower bound; a region shrunk to this size is exhausted.
    pub min: usize,
    /// Upper bound.
    pub max: usize,
    /// Value restored on restart.
    pub init: usize,
    /// Current value.
    pub current: usize,
}

impl Radius {
    /// Grows the current value by one, up to `max`.
    pub fn expand(&mut self) {
        self.current = (self.current + 1).min(self.max);
    }

    /// Shrinks the current value by one. Returns `true` once it is at or
    /// below `min`.
    pub fn shrink(&mut self) -> bool {
        self.current = self.current.saturating_sub(1);
        self.current <= self.min
    }
}

/// Bookkeeping shared by every trust-region manager: center, radii and a
/// private observation buffer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrustRegion {
    num_dims: usize,
    num_nominal: usize,
    radii: BTreeMap<String, Radius>,
    center: Option<Sample>,
    buffer: DataBuffer,
}

impl TrustRegion {
    /// Creates an empty region (no radii, no center) for `space`.
    #[must_use]
    pub fn new<S: SearchSpace + ?Sized>(space: &S) -> Self {
        Self {
            num_dims: space.num_dims(),
            num_nominal: space.num_nominal(),
            radii: BTreeMap::new(),
            center: None,
            buffer: DataBuffer::new(space.num_dims()),
        }
    }

    /// Registers a named radius, starting at `init`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRadius`] unless `min < init <= max`.
    pub fn register_radius(
        &mut self,
        variable_type: impl Into<String>,
        min: usize,
        max: usize,
        init: usize,
    ) -> Result<()> {
        let variable_type = variable_type.into();
        if !(min < init && init <= max) {
            return Err(Error::InvalidRadius {
                variable_type,
                min,
                max,
                init,
            });
        }
        self.radii.insert(
            variable_type,
            Radius {
                min,
                max,
                init,
                current: init,
            },
        );
        Ok(())
    }

    /// Replaces the center; `None` clears it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the center has the wrong length.
    pub fn set_center(&mut self, center: Option<Sample>) -> Result<()> {
        if let Some(c) = &center
            && c.len() != self.num_dims
        {
            return Err(Error::DimensionMismatch {
                expected: self.num_dims,
                got: c.len(),
            });
        }
        self.center = center;
        Ok(())
    }

    /// A copy of the current center.
    #[must_use]
    pub fn center(&self) -> Option<Sample> {
        self.center.clone()
    }

    /// Returns `true` if a radius named `variable_type` is registered.
    #[must_use]
    pub fn has_radius(&self, variable_type: &str) -> bool {
        self.radii.contains_key(variable_type)
    }

    /// Bounds and current value of a registered radius.
    #[must_use]
    pub fn radius(&self, variable_type: &str) -> Option<Radius> {
        self.radii.get(variable_type).copied()
    }

    /// Mutable access to a registered radius.
    pub fn radius_mut(&mut self, variable_type: &str) -> Option<&mut Radius> {
        self.radii.get_mut(variable_type)
    }

    /// Sets the current value of a registered radius, capped at its maximum.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRadius`] if the radius was never registered.
    pub fn set_radius(&mut self, variable_type: &str, value: usize) -> Result<()> {
        let radius = self
            .radii
            .get_mut(variable_type)
            .ok_or_else(|| Error::MissingRadius(variable_type.to_string()))?;
        radius.current = value.min(radius.max);
        Ok(())
    }

    /// The radius bounding nominal variables.
    ///
    /// A space with exactly one nominal dimension always has radius 1: any
    /// change to it is already maximal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRadius`] if no nominal radius was registered.
    pub fn nominal_radius(&self) -> Result<usize> {
        if self.num_nominal == 1 {
            return Ok(1);
        }
        self.radius(NOMINAL)
            .map(|r| r.current)
            .ok_or_else(|| Error::MissingRadius(NOMINAL.to_string()))
    }

    /// Records observations in the region's private buffer.
    ///
    /// # Errors
    ///
    /// Propagates [`DataBuffer::append`] validation errors.
    pub fn append(&mut self, x: &[Sample], y: &[f64]) -> Result<()> {
        self.buffer.append(x, y)
    }

    /// The region's private observations.
    #[must_use]
    pub fn buffer(&self) -> &DataBuffer {
        &self.buffer
    }

    /// Moves the center to the best point of the private buffer. Leaves the
    /// center unchanged if the buffer is empty.
    pub fn recenter_on_best(&mut self) {
        if let Some(best) = self.buffer.x_min() {
            self.center = Some(best.clone());
        }
    }

    /// Clears the buffer and center and resets every radius to its initial value.
    pub fn restart(&mut self) {
        self.buffer.restart();
        for radius in self.radii.values_mut() {
            radius.current = radius.init;
        }
        self.center = None;
    }
}

/// A trust-region adaptation strategy.
///
/// Implementors own a [`TrustRegion`] and decide how radii react to new
/// observations and how a fresh region is proposed once the current one is
/// exhausted.
pub trait TrustRegionManager: Send + Sync {
    /// The underlying region state.
    fn region(&self) -> &TrustRegion;

    /// Mutable access to the underlying region state.
    fn region_mut(&mut self) -> &mut TrustRegion;

    /// Shrinks or grows radii in response to the objective values of the
    /// latest batch.
    fn adjust_radii(&mut self, y: &[f64]);

    /// Produces `n_init` points for a new region, re-initializing the center.
    ///
    /// # Errors
    ///
    /// Returns an error if the strategy cannot build a region, e.g. when a
    /// required radius is missing.
    fn propose_region(&mut self, n_init: usize, observed: &DataBuffer) -> Result<Vec<Sample>>;

    /// Recenters the region. Defaults to the best point observed by the region.
    fn adjust_center(&mut self) {
        self.region_mut().recenter_on_best();
    }

    /// Resets the region to its initial state.
    fn restart(&mut self) {
        self.region_mut().restart();
    }
}

type ManagerCell = Arc<RwLock<Box<dyn TrustRegionManager>>>;

/// Owning handle to a trust-region manager.
///
/// The holder of this handle is the single writer. Hand out
/// [`TrustRegionReader`]s to optimizers.
#[derive(Clone)]
pub struct SharedTrustRegion {
    inner: ManagerCell,
}

impl SharedTrustRegion {
    /// Wraps `manager` for shared use.
    #[must_use]
    pub fn new<M: TrustRegionManager + 'static>(manager: M) -> Self {
        let manager: Box<dyn TrustRegionManager> = Box::new(manager);
        Self {
            inner: Arc::new(RwLock::new(manager)),
        }
    }

    /// A read-only view for optimizers.
    #[must_use]
    pub fn reader(&self) -> TrustRegionReader {
        TrustRegionReader {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Locks the manager for reading.
    #[must_use]
    pub fn read(&self) -> RwLockReadGuard<'_, Box<dyn TrustRegionManager>> {
        self.inner.read()
    }

    /// Locks the manager for writing.
    #[must_use]
    pub fn write(&self) -> RwLockWriteGuard<'_, Box<dyn TrustRegionManager>> {
        self.inner.write()
    }
}

impl core::fmt::Debug for SharedTrustRegion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharedTrustRegion")
            .field("region", self.inner.read().region())
            .finish()
    }
}

/// Read-only view of a shared trust region.
#[derive(Clone)]
pub struct TrustRegionReader {
    inner: ManagerCell,
}

impl TrustRegionReader {
    /// A copy of the current center.
    #[must_use]
    pub fn center(&self) -> Option<Sample> {
        self.inner.read().region().center()
    }

    /// The current nominal radius.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRadius`] if no nominal radius was registered.
    pub fn nominal_radius(&self) -> Result<usize> {
        self.inner.read().region().nominal_radius()
    }

    /// Returns `true` if a radius named `variable_type` is registered.
    #[must_use]
    pub fn has_radius(&self, variable_type: &str) -> bool {
        self.inner.read().region().has_radius(variable_type)
    }

    /// Center and nominal radius, checked for use by an optimizer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRadius`] or [`Error::MissingCenter`].
    pub(crate) fn snapshot(&self) -> Result<(Sample, usize)> {
        let guard = self.inner.read();
        let region = guard.region();
        if !region.has_radius(NOMINAL) {
            return Err(Error::MissingRadius(NOMINAL.to_string()));
        }
        let center = region.center().ok_or(Error::MissingCenter)?;
        Ok((center, region.nominal_radius()?))
    }
}

impl core::fmt::Debug for TrustRegionReader {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TrustRegionReader")
            .field("center", &self.center())
            .field("nominal_radius", &self.nominal_radius().ok())
            .finish()
    }
}

/// Pulls `sample` back into the Hamming ball of `radius` around `center`.
///
/// When the sample is too far, `distance - radius` of the coordinates where
/// it differs from the center are picked uniformly at random and reset to
/// the center's value.
pub fn project_into_hamming_ball(
    rng: &mut fastrand::Rng,
    sample: &mut [usize],
    center: &[usize],
    radius: usize,
) {
    let distance = hamming_distance(sample, center);
    if distance <= radius {
        return;
    }
    let differing: Vec<usize> = sample
        .iter()
        .zip(center)
        .enumerate()
        .filter(|(_, (s, c))| s != c)
        .map(|(i, _)| i)
        .collect();
    for i in rng_util::choose_distinct(rng, &differing, distance - radius) {
        sample[i] = center[i];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::CategoricalSpace;

    fn region(num_dims: usize) -> TrustRegion {
        TrustRegion::new(&CategoricalSpace::nominal_grid(num_dims, 3).unwrap())
    }

    #[test]
    fn register_radius_validates_order() {
        let mut tr = region(4);
        assert!(tr.register_radius(NOMINAL, 1, 4, 2).is_ok());
        assert!(matches!(
            tr.register_radius(NOMINAL, 2, 4, 2),
            Err(Error::InvalidRadius { .. })
        ));
        assert!(matches!(
            tr.register_radius(NOMINAL, 0, 3, 4),
            Err(Error::InvalidRadius { .. })
        ));
    }

    #[test]
    fn radius_steps_stay_within_bounds() {
        let mut r = Radius {
            min: 1,
            max: 3,
            init: 2,
            current: 2,
        };
        r.expand();
        r.expand();
        assert_eq!(r.current, 3);
        assert!(!r.shrink());
        assert!(r.shrink());
        assert_eq!(r.current, 1);
        assert!(r.shrink());
        assert!(r.shrink());
        assert_eq!(r.current, 0);
    }

    #[test]
    fn nominal_radius_is_one_for_single_nominal_dim() {
        let tr = region(1);
        assert_eq!(tr.nominal_radius().unwrap(), 1);

        let tr = region(3);
        assert!(matches!(tr.nominal_radius(), Err(Error::MissingRadius(_))));
    }

    #[test]
    fn center_is_returned_by_copy() {
        let mut tr = region(3);
        tr.set_center(Some(vec![0, 1, 2])).unwrap();
        let mut c = tr.center().unwrap();
        c[0] = 2;
        assert_eq!(tr.center(), Some(vec![0, 1, 2]));
        assert!(tr.set_center(Some(vec![0])).is_err());
        tr.set_center(None).unwrap();
        assert!(tr.center().is_none());
    }

    #[test]
    fn restart_resets_state() {
        let mut tr = region(3);
        tr.register_radius(NOMINAL, 0, 3, 2).unwrap();
        tr.set_radius(NOMINAL, 3).unwrap();
        tr.set_center(Some(vec![0, 0, 0])).unwrap();
        tr.append(&[vec![1, 1, 1]], &[1.0]).unwrap();
        tr.restart();
        assert_eq!(tr.nominal_radius().unwrap(), 2);
        assert!(tr.center().is_none());
        assert!(tr.buffer().is_empty());
    }

    #[test]
    fn recenter_moves_to_best() {
        let mut tr = region(2);
        tr.recenter_on_best();
        assert!(tr.center().is_none());
        tr.append(&[vec![0, 0], vec![2, 1]], &[3.0, 1.0]).unwrap();
        tr.recenter_on_best();
        assert_eq!(tr.center(), Some(vec![2, 1]));
    }

    #[test]
    fn projection_lands_inside_ball() {
        let mut rng = fastrand::Rng::with_seed(5);
        let center = vec![0; 8];
        for radius in 0..=8 {
            let mut s = vec![1, 2, 1, 2, 1, 2, 1, 2];
            project_into_hamming_ball(&mut rng, &mut s, &center, radius);
            assert_eq!(hamming_distance(&s, &center), radius);
        }
    }
}
