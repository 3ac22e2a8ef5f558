//! Trust-region-constrained combinatorial optimizers for black-box objectives
//! over nominal and ordinal variables. A driver asks an optimizer for
//! candidates, evaluates them, and reports the objective values back; the
//! optimizer learns from the feedback and proposes better points.
//!
//! # Getting Started
//!
//! ```
//! use combopt::distance::hamming_distance;
//! use combopt::prelude::*;
//!
//! let space = CategoricalSpace::nominal_grid(6, 4).unwrap();
//! let target = vec![3, 1, 0, 2, 3, 1];
//!
//! let mut ga = GeneticAlgorithm::builder(space.clone())
//!     .pop_size(20)
//!     .num_parents(10)
//!     .num_elite(4)
//!     .seed(0)
//!     .build()
//!     .unwrap();
//!
//! for _ in 0..20 {
//!     let points = ga.suggest(10).unwrap();
//!     let y: Vec<f64> = space
//!         .transform(&points)
//!         .unwrap()
//!         .iter()
//!         .map(|s| hamming_distance(s, &target) as f64)
//!         .collect();
//!     ga.observe(&points, &y).unwrap();
//! }
//! println!("best = {:?} at {:?}", ga.best_y(), ga.best_x());
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`SearchSpace`](space::SearchSpace) | Maps structured points to canonical integer samples and back. [`CategoricalSpace`](space::CategoricalSpace) is the stock implementation. |
//! | [`Optimizer`](optimizer::Optimizer) | The suggest/observe protocol. |
//! | [`TrustRegionManager`](trust_region::TrustRegionManager) | Owns a center and radii and adapts them from observed progress. |
//! | [`TrustRegionReader`](trust_region::TrustRegionReader) | Read-only view of a shared region, handed to optimizers. |
//! | [`DataBuffer`](buffer::DataBuffer) | Append-only store of observed samples and values. |
//!
//! # Optimizers
//!
//! | Optimizer | Algorithm | Best for |
//! |-----------|-----------|----------|
//! | [`GeneticAlgorithm`](optimizer::genetic::GeneticAlgorithm) | Elitist GA, single-point crossover, one-site mutation | Large batches, rugged landscapes |
//! | [`MultiArmedBandit`](optimizer::bandit::MultiArmedBandit) | Per-dimension EXP3 with dependent rounding | Cheap online rounds, separable objectives |
//!
//! Both accept an optional trust region; every suggestion then lies within
//! the nominal radius (in Hamming distance) of the region's center.
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing): generations, radius changes, resampling fallbacks | on |
//! | `serde` | `Serialize`/`Deserialize` on configs, spaces, buffers and radii | off |

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::warn!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($($arg:tt)*) => {};
}

pub mod buffer;
pub mod dependent_rounding;
pub mod distance;
mod error;
pub mod optimizer;
mod rng_util;
pub mod space;
pub mod trust_region;

pub use error::{Error, Result};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use combopt::prelude::*;
/// ```
pub mod prelude {
    pub use crate::buffer::DataBuffer;
    pub use crate::error::{Error, Result};
    pub use crate::optimizer::Optimizer;
    pub use crate::optimizer::bandit::{
        MultiArmedBandit, MultiArmedBanditBuilder, MultiArmedBanditConfig,
    };
    pub use crate::optimizer::genetic::{
        GeneticAlgorithm, GeneticAlgorithmBuilder, GeneticAlgorithmConfig,
    };
    pub use crate::space::{CategoricalSpace, Sample, SearchSpace, VariableKind};
    pub use crate::trust_region::{
        SharedTrustRegion, StreakTrustRegion, TrustRegion, TrustRegionManager, TrustRegionReader,
    };
}
