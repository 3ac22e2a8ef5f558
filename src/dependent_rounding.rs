//! Fixed-size subset sampling that preserves per-item inclusion marginals.
//!
//! Given a distribution `p` over `n` items and a subset size `k < n`, the
//! target marginals are `q = k·p` with any entry above 1 capped at 1 and the
//! excess mass redistributed proportionally over the remaining items. Pairs
//! of fractional entries are then rounded against each other so that one of
//! them reaches 0 or 1 while their sum and both expectations stay unchanged.
//! After at most `n - 1` steps every entry is 0 or 1 and exactly `k` items are
//! selected, each with probability `q[i]`.

const EPS: f64 = 1e-9;

/// Draws `k` distinct indices from `probs` with inclusion probability
/// `min(1, k·p[i])` (after redistribution of capped mass).
///
/// `probs` need not be normalized. Non-finite or non-positive total mass is
/// treated as the uniform distribution. Returns all indices when
/// `k >= probs.len()`. The result is sorted ascending.
pub fn dependent_rounding(rng: &mut fastrand::Rng, probs: &[f64], k: usize) -> Vec<usize> {
    let n = probs.len();
    if k == 0 {
        return Vec::new();
    }
    if k >= n {
        return (0..n).collect();
    }

    let mut q = capped_marginals(probs, k);

    loop {
        let mut fractional = (0..n).filter(|&i| q[i] > EPS && q[i] < 1.0 - EPS);
        let (Some(i), Some(j)) = (fractional.next(), fractional.next()) else {
            break;
        };
        let alpha = (1.0 - q[i]).min(q[j]);
        let beta = q[i].min(1.0 - q[j]);
        if rng.f64() * (alpha + beta) < beta {
            q[i] += alpha;
            q[j] -= alpha;
        } else {
            q[i] -= beta;
            q[j] += beta;
        }
        for idx in [i, j] {
            if q[idx] <= EPS {
                q[idx] = 0.0;
            } else if q[idx] >= 1.0 - EPS {
                q[idx] = 1.0;
            }
        }
    }

    // Rounding leaves exactly k ones up to floating-point residue; taking the
    // k largest entries absorbs that residue.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| q[b].total_cmp(&q[a]));
    order.truncate(k);
    order.sort_unstable();
    order
}

/// Scales `probs` to sum to `k`, capping entries at 1 until none exceeds it.
#[allow(clippy::cast_precision_loss)]
fn capped_marginals(probs: &[f64], k: usize) -> Vec<f64> {
    let n = probs.len();
    let total: f64 = probs.iter().map(|p| p.max(0.0)).sum();
    let mut q: Vec<f64> = if total.is_finite() && total > 0.0 {
        probs.iter().map(|p| p.max(0.0) / total * k as f64).collect()
    } else {
        vec![k as f64 / n as f64; n]
    };

    let mut capped = vec![false; n];
    loop {
        let over: Vec<usize> = (0..n).filter(|&i| !capped[i] && q[i] > 1.0).collect();
        if over.is_empty() {
            break;
        }
        for i in over {
            capped[i] = true;
            q[i] = 1.0;
        }
        let num_capped = capped.iter().filter(|&&c| c).count();
        let target = (k - num_capped) as f64;
        let free_mass: f64 = (0..n).filter(|&i| !capped[i]).map(|i| q[i]).sum();
        let num_free = n - num_capped;
        for i in (0..n).filter(|&i| !capped[i]) {
            q[i] = if free_mass > 0.0 {
                q[i] * target / free_mass
            } else {
                target / num_free as f64
            };
        }
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_k_distinct_sorted_indices() {
        let mut rng = fastrand::Rng::with_seed(11);
        let probs = [0.1, 0.2, 0.3, 0.15, 0.25];
        for k in 1..5 {
            for _ in 0..200 {
                let picked = dependent_rounding(&mut rng, &probs, k);
                assert_eq!(picked.len(), k);
                assert!(picked.windows(2).all(|w| w[0] < w[1]));
                assert!(picked.iter().all(|&i| i < probs.len()));
            }
        }
    }

    #[test]
    fn degenerate_sizes() {
        let mut rng = fastrand::Rng::with_seed(1);
        assert!(dependent_rounding(&mut rng, &[0.5, 0.5], 0).is_empty());
        assert_eq!(dependent_rounding(&mut rng, &[0.5, 0.5], 2), vec![0, 1]);
        assert_eq!(dependent_rounding(&mut rng, &[0.5, 0.5], 5), vec![0, 1]);
    }

    #[test]
    fn capping_redistributes_excess() {
        let q = capped_marginals(&[0.7, 0.1, 0.1, 0.1], 2);
        assert!((q[0] - 1.0).abs() < 1e-12);
        for &v in &q[1..] {
            assert!((v - 1.0 / 3.0).abs() < 1e-12);
        }
        assert!((q.iter().sum::<f64>() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn empirical_marginals_match() {
        let mut rng = fastrand::Rng::with_seed(42);
        let probs = [0.5, 0.3, 0.2];
        let trials = 20_000;
        let mut counts = [0usize; 3];
        for _ in 0..trials {
            for i in dependent_rounding(&mut rng, &probs, 2) {
                counts[i] += 1;
            }
        }
        #[allow(clippy::cast_precision_loss)]
        let freq: Vec<f64> = counts.iter().map(|&c| c as f64 / f64::from(trials)).collect();
        assert!((freq[0] - 1.0).abs() < 1e-12);
        assert!((freq[1] - 0.6).abs() < 0.02, "freq {freq:?}");
        assert!((freq[2] - 0.4).abs() < 0.02, "freq {freq:?}");
    }

    #[test]
    fn zero_mass_is_uniform() {
        let q = capped_marginals(&[0.0, 0.0, 0.0, 0.0], 2);
        assert!(q.iter().all(|&v| (v - 0.5).abs() < 1e-12));
    }
}
