/// Index of the first entry of the non-decreasing `cumulative` that is `>= u`.
///
/// Clamped to the last index so floating-point shortfall in the final
/// cumulative value never yields an out-of-range index.
pub(crate) fn search_sorted(cumulative: &[f64], u: f64) -> usize {
    let idx = cumulative.partition_point(|&c| c < u);
    idx.min(cumulative.len().saturating_sub(1))
}

/// Draw one index from a categorical distribution by inverse CDF.
pub(crate) fn categorical(rng: &mut fastrand::Rng, probs: &[f64]) -> usize {
    let u = rng.f64();
    let mut acc = 0.0;
    for (i, &p) in probs.iter().enumerate() {
        acc += p;
        if u < acc {
            return i;
        }
    }
    // Numerical fallback.
    probs.len().saturating_sub(1)
}

/// Choose `k` distinct elements of `pool` uniformly at random.
///
/// Returns all of `pool` (shuffled) if `k >= pool.len()`.
pub(crate) fn choose_distinct(rng: &mut fastrand::Rng, pool: &[usize], k: usize) -> Vec<usize> {
    let mut items = pool.to_vec();
    let k = k.min(items.len());
    for i in 0..k {
        let j = rng.usize(i..items.len());
        items.swap(i, j);
    }
    items.truncate(k);
    items
}
