//! Suggest/observe optimizers over categorical search spaces.
//!
//! Every optimizer follows the same loop: a driver calls
//! [`suggest`](Optimizer::suggest) for a batch of candidates, evaluates the
//! objective itself and feeds the results back through
//! [`observe`](Optimizer::observe). All internal state (population,
//! weights, buffers) changes only in `observe` and `suggest`.
//!
//! | Optimizer | Algorithm | Trust region |
//! |-----------|-----------|--------------|
//! | [`GeneticAlgorithm`](genetic::GeneticAlgorithm) | Elitist GA with single-point crossover and one-site mutation | optional, read live |
//! | [`MultiArmedBandit`](bandit::MultiArmedBandit) | Per-dimension EXP3-style bandit with dependent rounding | optional, fixed |

pub mod bandit;
pub mod genetic;

use crate::error::{Error, Result};
use crate::space::{Sample, SearchSpace};

/// The suggest/observe protocol shared by every optimizer. Minimizes.
pub trait Optimizer {
    /// The structured point type of the underlying search space.
    type Point;

    /// Human-readable optimizer name.
    fn name(&self) -> &'static str;

    /// Proposes `n` candidates.
    ///
    /// # Errors
    ///
    /// Returns an error if `n` violates the optimizer's batch limits or the
    /// trust region it reads from is no longer valid.
    fn suggest(&mut self, n: usize) -> Result<Vec<Self::Point>>;

    /// Feeds back objective values for evaluated points.
    ///
    /// Input is validated before any state changes.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` and `y` differ in length or a point cannot be
    /// encoded.
    fn observe(&mut self, x: &[Self::Point], y: &[f64]) -> Result<()>;

    /// Seeds the optimizer with previously evaluated points.
    ///
    /// # Errors
    ///
    /// Same as [`observe`](Self::observe), plus optimizer-specific limits.
    fn initialize(&mut self, x: &[Self::Point], y: &[f64]) -> Result<()>;

    /// Resets the optimizer's search state.
    fn restart(&mut self);

    /// Best point observed so far.
    fn best_x(&self) -> Option<Self::Point>;

    /// Best objective value observed so far.
    fn best_y(&self) -> Option<f64>;
}

/// Best observation seen so far, replaced only on strict improvement.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Incumbent {
    x: Option<Sample>,
    y: Option<f64>,
}

impl Incumbent {
    /// Considers the best row of a batch; returns `true` if it became the incumbent.
    pub(crate) fn update(&mut self, x: &[Sample], y: &[f64]) -> bool {
        let Some((idx, &batch_best)) = y.iter().enumerate().min_by(|a, b| a.1.total_cmp(b.1))
        else {
            return false;
        };
        if self.y.is_none_or(|best| batch_best < best) {
            self.y = Some(batch_best);
            self.x = Some(x[idx].clone());
            return true;
        }
        false
    }

    pub(crate) fn x(&self) -> Option<&Sample> {
        self.x.as_ref()
    }

    pub(crate) fn y(&self) -> Option<f64> {
        self.y
    }
}

/// Rejects spaces that are not purely nominal and ordinal.
pub(crate) fn validate_space<S: SearchSpace + ?Sized>(space: &S) -> Result<()> {
    if space.num_numeric() > 0 {
        return Err(Error::UnsupportedSearchSpace {
            reason: format!("{} numeric dimensions", space.num_numeric()),
        });
    }
    if space.num_nominal() + space.num_ordinal() != space.num_dims() {
        return Err(Error::UnsupportedSearchSpace {
            reason: format!(
                "{} nominal + {} ordinal dimensions do not add up to {}",
                space.num_nominal(),
                space.num_ordinal(),
                space.num_dims()
            ),
        });
    }
    if space.num_dims() == 0 {
        return Err(Error::UnsupportedSearchSpace {
            reason: "no dimensions".to_string(),
        });
    }
    let (lb, ub) = (space.lower_bounds(), space.upper_bounds());
    if lb.len() != space.num_dims() || ub.len() != space.num_dims() {
        return Err(Error::DimensionMismatch {
            expected: space.num_dims(),
            got: lb.len().min(ub.len()),
        });
    }
    if let Some(dim) = (0..lb.len()).find(|&d| lb[d] > ub[d]) {
        return Err(Error::InvalidBounds {
            dim,
            low: lb[dim],
            high: ub[dim],
        });
    }
    Ok(())
}

/// Encodes `x` and checks it pairs up with `y`.
pub(crate) fn encode_observations<S: SearchSpace + ?Sized>(
    space: &S,
    x: &[S::Point],
    y: &[f64],
) -> Result<Vec<Sample>> {
    if x.len() != y.len() {
        return Err(Error::ObservationMismatch {
            n_x: x.len(),
            n_y: y.len(),
        });
    }
    space.transform(x)
}
