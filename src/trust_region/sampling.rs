//! Neighborhood sampling inside a Hamming-ball trust region.

use crate::rng_util;
use crate::space::Sample;

/// Attempts per requested point before a duplicate is accepted.
const MAX_DISTINCT_ATTEMPTS: usize = 100;

/// A uniformly random category in `[low, high]` other than `current`.
///
/// Returns `None` when the dimension has a single category.
pub(crate) fn random_other_category(
    rng: &mut fastrand::Rng,
    low: usize,
    high: usize,
    current: usize,
) -> Option<usize> {
    if high <= low {
        return None;
    }
    let v = rng.usize(low..high);
    Some(if v >= current && (low..=high).contains(&current) {
        v + 1
    } else {
        v
    })
}

/// Draws `n` points within Hamming distance `radius` of `center`.
///
/// Each point perturbs between 1 and `radius` distinct coordinates, each
/// moved to a different category within `[lower, upper]`. Points are kept
/// distinct from each other and from the center when the neighborhood is
/// large enough; otherwise duplicates are accepted after a bounded number
/// of attempts.
pub fn sample_within_trust_region(
    rng: &mut fastrand::Rng,
    lower: &[usize],
    upper: &[usize],
    center: &[usize],
    radius: usize,
    n: usize,
) -> Vec<Sample> {
    let mutable: Vec<usize> = (0..center.len()).filter(|&d| upper[d] > lower[d]).collect();
    let max_perturb = radius.min(mutable.len());

    let mut points: Vec<Sample> = Vec::with_capacity(n);
    while points.len() < n {
        let mut candidate = center.to_vec();
        for _ in 0..MAX_DISTINCT_ATTEMPTS {
            candidate = perturb(rng, lower, upper, center, &mutable, max_perturb);
            if candidate.as_slice() != center && !points.contains(&candidate) {
                break;
            }
        }
        points.push(candidate);
    }
    points
}

fn perturb(
    rng: &mut fastrand::Rng,
    lower: &[usize],
    upper: &[usize],
    center: &[usize],
    mutable: &[usize],
    max_perturb: usize,
) -> Sample {
    let mut point = center.to_vec();
    if max_perturb == 0 {
        return point;
    }
    let k = rng.usize(1..=max_perturb);
    for d in rng_util::choose_distinct(rng, mutable, k) {
        if let Some(v) = random_other_category(rng, lower[d], upper[d], center[d]) {
            point[d] = v;
        }
    }
    point
}
