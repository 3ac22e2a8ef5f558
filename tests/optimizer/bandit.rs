use combopt::distance::hamming_distance;
use combopt::prelude::*;

use crate::evaluate;

#[test]
fn probabilities_respect_exploration_floor() {
    let space = CategoricalSpace::nominal_grid(4, 5).unwrap();
    let mut mab = MultiArmedBandit::builder(space)
        .batch_size(3)
        .seed(21)
        .build()
        .unwrap();

    for _ in 0..10 {
        let batch = mab.suggest_encoded(3).unwrap();
        mab.observe_encoded(&batch, &evaluate(&batch)).unwrap();
        mab.update_prob_dist();

        for (probs, &gamma) in mab.prob_dist().iter().zip(mab.gamma()) {
            let floor = gamma / probs.len() as f64;
            let total: f64 = probs.iter().sum();
            assert!((total - 1.0).abs() < 1e-9, "probabilities sum to {total}");
            assert!(probs.iter().all(|&p| p >= floor - 1e-12));
        }
    }
}

#[test]
fn rewards_favour_low_objective_categories() {
    let space = CategoricalSpace::nominal_grid(1, 3).unwrap();
    let mut mab = MultiArmedBandit::builder(space).seed(2).build().unwrap();
    mab.observe_encoded(&[vec![0], vec![1], vec![2]], &[5.0, 3.0, 1.0])
        .unwrap();

    let gamma = mab.gamma()[0];
    let w = &mab.log_weights()[0];
    assert!((w[0] + gamma / 3.0).abs() < 1e-12);
    assert!(w[1].abs() < 1e-12);
    assert!((w[2] - gamma / 3.0).abs() < 1e-12);

    mab.update_prob_dist();
    let p = &mab.prob_dist()[0];
    assert!(p[2] > p[1] && p[1] > p[0]);
}

#[test]
fn restart_is_idempotent() {
    let space = CategoricalSpace::nominal_grid(3, 4).unwrap();
    let mut mab = MultiArmedBandit::builder(space)
        .batch_size(2)
        .max_n_iter(50)
        .seed(8)
        .build()
        .unwrap();
    let initial_gamma = mab.gamma().to_vec();

    for _ in 0..5 {
        let batch = mab.suggest_encoded(2).unwrap();
        mab.observe_encoded(&batch, &evaluate(&batch)).unwrap();
    }
    assert!(mab.log_weights().iter().flatten().any(|&w| w != 0.0));

    mab.restart();
    let once = (
        mab.gamma().to_vec(),
        mab.log_weights().to_vec(),
        mab.prob_dist().to_vec(),
    );
    mab.restart();
    let twice = (
        mab.gamma().to_vec(),
        mab.log_weights().to_vec(),
        mab.prob_dist().to_vec(),
    );
    assert_eq!(once, twice);
    assert_eq!(once.0, initial_gamma);
    assert!(once.1.iter().flatten().all(|&w| w == 0.0));
    // The buffer survives a restart.
    assert_eq!(mab.data_buffer().len(), 10);
}

#[test]
fn no_repeats_when_not_noisy() {
    let space = CategoricalSpace::nominal_grid(3, 3).unwrap();
    let mut mab = MultiArmedBandit::builder(space.clone())
        .batch_size(4)
        .seed(13)
        .build()
        .unwrap();

    for _ in 0..3 {
        let points = mab.suggest(4).unwrap();
        let encoded = space.transform(&points).unwrap();
        for (i, s) in encoded.iter().enumerate() {
            assert!(!mab.data_buffer().contains(s), "{s:?} was already observed");
            assert!(!encoded[..i].contains(s), "{s:?} repeated in batch");
        }
        mab.observe(&points, &evaluate(&encoded)).unwrap();
    }
    assert_eq!(mab.fallback_count(), 0);
}

#[test]
fn exhausted_space_falls_back() {
    let space = CategoricalSpace::nominal_grid(1, 2).unwrap();
    let mut mab = MultiArmedBandit::builder(space)
        .resample_tol(5)
        .seed(1)
        .build()
        .unwrap();
    mab.observe_encoded(&[vec![0], vec![1]], &[1.0, 2.0]).unwrap();

    let batch = mab.suggest_encoded(1).unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(mab.fallback_count(), 1);
}

#[test]
fn noisy_objective_allows_repeats() {
    let space = CategoricalSpace::nominal_grid(1, 2).unwrap();
    let mut mab = MultiArmedBandit::builder(space)
        .noisy_black_box(true)
        .resample_tol(5)
        .seed(1)
        .build()
        .unwrap();
    mab.observe_encoded(&[vec![0], vec![1]], &[1.0, 2.0]).unwrap();

    let batch = mab.suggest_encoded(1).unwrap();
    assert!(mab.data_buffer().contains(&batch[0]));
    assert_eq!(mab.fallback_count(), 0);
}

#[test]
fn fixed_trust_region_bounds_suggestions() {
    let space = CategoricalSpace::nominal_grid(6, 5).unwrap();
    let mut manager = StreakTrustRegion::new(&space, 0, 4, 2).unwrap();
    let center = vec![1, 2, 3, 4, 0, 1];
    manager.region_mut().set_center(Some(center.clone())).unwrap();
    let shared = SharedTrustRegion::new(manager);

    let mut mab = MultiArmedBandit::builder(space)
        .batch_size(4)
        .trust_region(shared.reader())
        .seed(30)
        .build()
        .unwrap();
    assert_eq!(mab.name(), "Tr-based Multi-Armed Bandit");

    for _ in 0..5 {
        let batch = mab.suggest_encoded(4).unwrap();
        for s in &batch {
            assert!(hamming_distance(s, &center) <= 2, "{s:?} left the region");
        }
        mab.observe_encoded(&batch, &evaluate(&batch)).unwrap();
    }

    mab.update_fixed_trust_region(None).unwrap();
    assert_eq!(mab.name(), "Multi-Armed Bandit");
}

#[test]
fn unusable_trust_region_is_rejected() {
    let space = CategoricalSpace::nominal_grid(3, 3).unwrap();
    let shared = SharedTrustRegion::new(StreakTrustRegion::new(&space, 0, 3, 1).unwrap());
    let mut mab = MultiArmedBandit::builder(space).build().unwrap();
    let err = mab.update_fixed_trust_region(Some(shared.reader())).unwrap_err();
    assert!(matches!(err, Error::MissingCenter));
    assert_eq!(mab.name(), "Multi-Armed Bandit");
}

#[test]
fn initialize_leaves_weights_untouched() {
    let space = CategoricalSpace::nominal_grid(2, 3).unwrap();
    let mut mab = MultiArmedBandit::builder(space).seed(6).build().unwrap();
    let points = vec![
        vec!["0".to_string(), "1".to_string()],
        vec!["2".to_string(), "2".to_string()],
    ];
    mab.initialize(&points, &[3.0, 1.0]).unwrap();
    assert!(mab.log_weights().iter().flatten().all(|&w| w == 0.0));
    assert_eq!(mab.best_y(), Some(1.0));
    assert_eq!(mab.best_x(), Some(points[1].clone()));
}

#[test]
fn zero_batch_size_is_rejected() {
    let space = CategoricalSpace::nominal_grid(2, 3).unwrap();
    let err = MultiArmedBandit::builder(space)
        .batch_size(0)
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, Error::InvalidBatchSize { name: "batch_size" }));
}

#[test]
fn ordinal_variables_are_supported() {
    let space = CategoricalSpace::builder()
        .nominal("color", ["red", "green", "blue"])
        .ordinal("size", ["s", "m", "l", "xl"])
        .build()
        .unwrap();
    let mut mab = MultiArmedBandit::builder(space).batch_size(2).seed(3).build().unwrap();
    let points = mab.suggest(2).unwrap();
    assert_eq!(points.len(), 2);
    assert_ne!(points[0], points[1]);
    mab.observe(&points, &[1.0, 2.0]).unwrap();
    assert_eq!(mab.best_x(), Some(points[0].clone()));
}
