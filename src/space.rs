//! Search-space abstraction over nominal and ordinal variables.
//!
//! Optimizers in this crate never look at user-facing values directly.
//! They work on the *canonical encoding*: a fixed-length vector of category
//! indices where nominal dimensions come first, followed by ordinal
//! dimensions. The [`SearchSpace`] trait is the seam between that encoding
//! and whatever structured representation the caller uses.
//!
//! [`CategoricalSpace`] is the stock implementation: every variable is a
//! list of string labels and a structured point is one label per variable,
//! in declaration order.
//!
//! ```
//! use combopt::space::{CategoricalSpace, SearchSpace};
//!
//! let space = CategoricalSpace::builder()
//!     .ordinal("size", ["s", "m", "l"])
//!     .nominal("color", ["red", "green"])
//!     .build()
//!     .unwrap();
//!
//! // Canonical order puts the nominal "color" first.
//! let encoded = space
//!     .transform(&[vec!["l".to_string(), "green".to_string()]])
//!     .unwrap();
//! assert_eq!(encoded, vec![vec![1, 2]]);
//! ```

use core::fmt::Debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A point in canonical encoding: one category index per dimension.
pub type Sample = Vec<usize>;

/// The interface optimizers consume from a search space.
///
/// All bounds and indices refer to the canonical encoding (nominal
/// dimensions first, then ordinal ones).
pub trait SearchSpace: Send + Sync {
    /// The structured, user-facing representation of a point.
    type Point: Clone + Debug + PartialEq;

    /// Total number of dimensions.
    fn num_dims(&self) -> usize;

    /// Number of nominal (unordered) dimensions.
    fn num_nominal(&self) -> usize;

    /// Number of ordinal (ordered) dimensions.
    fn num_ordinal(&self) -> usize;

    /// Number of numeric dimensions. Optimizers in this crate reject spaces
    /// where this is non-zero.
    fn num_numeric(&self) -> usize {
        0
    }

    /// Inclusive lower category bound per canonical dimension.
    fn lower_bounds(&self) -> &[usize];

    /// Inclusive upper category bound per canonical dimension.
    fn upper_bounds(&self) -> &[usize];

    /// Encode structured points into canonical samples.
    ///
    /// # Errors
    ///
    /// Returns an error if a point has the wrong length or holds a value
    /// outside its variable's domain.
    fn transform(&self, points: &[Self::Point]) -> Result<Vec<Sample>>;

    /// Decode canonical samples back into structured points.
    ///
    /// # Errors
    ///
    /// Returns an error if a sample has the wrong length or a coordinate
    /// outside its bounds.
    fn inverse_transform(&self, samples: &[Sample]) -> Result<Vec<Self::Point>>;

    /// Draw `n` points uniformly at random.
    fn sample(&self, rng: &mut fastrand::Rng, n: usize) -> Vec<Self::Point>;

    /// Canonical indices of the nominal dimensions.
    fn nominal_dims(&self) -> Vec<usize> {
        (0..self.num_nominal()).collect()
    }

    /// Canonical indices of the ordinal dimensions.
    fn ordinal_dims(&self) -> Vec<usize> {
        (self.num_nominal()..self.num_nominal() + self.num_ordinal()).collect()
    }

    /// Number of categories in canonical dimension `dim`.
    fn n_categories(&self, dim: usize) -> usize {
        self.upper_bounds()[dim] - self.lower_bounds()[dim] + 1
    }

    /// Draw `n` canonical samples uniformly at random.
    fn sample_encoded(&self, rng: &mut fastrand::Rng, n: usize) -> Vec<Sample> {
        (0..n)
            .map(|_| uniform_sample(rng, self.lower_bounds(), self.upper_bounds()))
            .collect()
    }
}

/// One sample drawn uniformly within `[lower, upper]` per dimension.
pub(crate) fn uniform_sample(
    rng: &mut fastrand::Rng,
    lower: &[usize],
    upper: &[usize],
) -> Sample {
    lower.iter().zip(upper).map(|(&l, &u)| rng.usize(l..=u)).collect()
}

/// Whether a variable's categories carry an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VariableKind {
    /// Unordered categories.
    Nominal,
    /// Ordered categories; the declaration order of labels is the order.
    Ordinal,
}

/// A single categorical variable.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Variable {
    /// Variable name.
    pub name: String,
    /// Nominal or ordinal.
    pub kind: VariableKind,
    /// Category labels; the canonical encoding of a label is its index here.
    pub categories: Vec<String>,
}

/// A search space made only of nominal and ordinal variables.
///
/// Structured points are `Vec<String>`, one label per variable in
/// declaration order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CategoricalSpace {
    variables: Vec<Variable>,
    /// `canonical[c]` is the declaration index of canonical dimension `c`.
    canonical: Vec<usize>,
    lower: Vec<usize>,
    upper: Vec<usize>,
    num_nominal: usize,
}

impl CategoricalSpace {
    /// Creates a builder for a [`CategoricalSpace`].
    #[must_use]
    pub fn builder() -> CategoricalSpaceBuilder {
        CategoricalSpaceBuilder::default()
    }

    /// A space of `num_dims` nominal variables `x0, x1, …`, each with labels
    /// `"0"` to `"{num_categories - 1}"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyChoices`] if `num_categories` is zero.
    pub fn nominal_grid(num_dims: usize, num_categories: usize) -> Result<Self> {
        let labels: Vec<String> = (0..num_categories).map(|c| c.to_string()).collect();
        (0..num_dims)
            .fold(Self::builder(), |b, d| {
                b.nominal(format!("x{d}"), labels.iter().cloned())
            })
            .build()
    }

    /// The variables in declaration order.
    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn encode_point(&self, point: &[String]) -> Result<Sample> {
        if point.len() != self.variables.len() {
            return Err(Error::DimensionMismatch {
                expected: self.variables.len(),
                got: point.len(),
            });
        }
        self.canonical
            .iter()
            .map(|&v| {
                let var = &self.variables[v];
                var.categories
                    .iter()
                    .position(|c| *c == point[v])
                    .ok_or_else(|| Error::UnknownCategory {
                        name: var.name.clone(),
                        value: point[v].clone(),
                    })
            })
            .collect()
    }

    fn decode_sample(&self, sample: &[usize]) -> Result<Vec<String>> {
        if sample.len() != self.canonical.len() {
            return Err(Error::DimensionMismatch {
                expected: self.canonical.len(),
                got: sample.len(),
            });
        }
        let mut point = vec![String::new(); self.variables.len()];
        for (dim, (&v, &value)) in self.canonical.iter().zip(sample).enumerate() {
            let var = &self.variables[v];
            let label = var.categories.get(value).ok_or(Error::OutOfBounds {
                dim,
                value,
                low: self.lower[dim],
                high: self.upper[dim],
            })?;
            point[v].clone_from(label);
        }
        Ok(point)
    }
}

impl SearchSpace for CategoricalSpace {
    type Point = Vec<String>;

    fn num_dims(&self) -> usize {
        self.canonical.len()
    }

    fn num_nominal(&self) -> usize {
        self.num_nominal
    }

    fn num_ordinal(&self) -> usize {
        self.canonical.len() - self.num_nominal
    }

    fn lower_bounds(&self) -> &[usize] {
        &self.lower
    }

    fn upper_bounds(&self) -> &[usize] {
        &self.upper
    }

    fn transform(&self, points: &[Self::Point]) -> Result<Vec<Sample>> {
        points.iter().map(|p| self.encode_point(p)).collect()
    }

    fn inverse_transform(&self, samples: &[Sample]) -> Result<Vec<Self::Point>> {
        samples.iter().map(|s| self.decode_sample(s)).collect()
    }

    fn sample(&self, rng: &mut fastrand::Rng, n: usize) -> Vec<Self::Point> {
        (0..n)
            .map(|_| {
                self.variables
                    .iter()
                    .map(|v| v.categories[rng.usize(0..v.categories.len())].clone())
                    .collect()
            })
            .collect()
    }
}

/// Builder for [`CategoricalSpace`].
#[derive(Clone, Debug, Default)]
pub struct CategoricalSpaceBuilder {
    variables: Vec<Variable>,
}

impl CategoricalSpaceBuilder {
    /// Adds a nominal variable.
    #[must_use]
    pub fn nominal<S, I, L>(self, name: S, categories: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.variable(name, VariableKind::Nominal, categories)
    }

    /// Adds an ordinal variable. Labels are given lowest first.
    #[must_use]
    pub fn ordinal<S, I, L>(self, name: S, categories: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.variable(name, VariableKind::Ordinal, categories)
    }

    fn variable<S, I, L>(mut self, name: S, kind: VariableKind, categories: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.variables.push(Variable {
            name: name.into(),
            kind,
            categories: categories.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Builds the space.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyChoices`] if any variable has no categories.
    pub fn build(self) -> Result<CategoricalSpace> {
        if let Some(v) = self.variables.iter().find(|v| v.categories.is_empty()) {
            return Err(Error::EmptyChoices {
                name: v.name.clone(),
            });
        }

        let nominal = self
            .variables
            .iter()
            .enumerate()
            .filter(|(_, v)| v.kind == VariableKind::Nominal)
            .map(|(i, _)| i);
        let ordinal = self
            .variables
            .iter()
            .enumerate()
            .filter(|(_, v)| v.kind == VariableKind::Ordinal)
            .map(|(i, _)| i);
        let canonical: Vec<usize> = nominal.chain(ordinal).collect();
        let num_nominal = self
            .variables
            .iter()
            .filter(|v| v.kind == VariableKind::Nominal)
            .count();

        let lower = vec![0; canonical.len()];
        let upper = canonical
            .iter()
            .map(|&v| self.variables[v].categories.len() - 1)
            .collect();

        Ok(CategoricalSpace {
            variables: self.variables,
            canonical,
            lower,
            upper,
            num_nominal,
        })
    }
}
