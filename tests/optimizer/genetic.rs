use combopt::distance::hamming_distance;
use combopt::prelude::*;
use combopt::trust_region::NOMINAL;

use crate::evaluate;

fn small_ga(space: CategoricalSpace) -> GeneticAlgorithm<CategoricalSpace> {
    GeneticAlgorithm::builder(space)
        .pop_size(4)
        .num_parents(2)
        .num_elite(2)
        .seed(42)
        .build()
        .unwrap()
}

#[test]
fn forced_generation_keeps_best_in_elite() {
    let mut ga = small_ga(CategoricalSpace::nominal_grid(2, 3).unwrap());
    let x = vec![vec![0, 0], vec![1, 1], vec![2, 2], vec![0, 1]];
    ga.observe_encoded(&x, &[5.0, 1.0, 3.0, 4.0]).unwrap();
    ga.generate_new_population().unwrap();

    let (elite_x, elite_y) = ga.elite();
    assert_eq!(elite_x, &[vec![1, 1], vec![2, 2]]);
    assert_eq!(elite_y, &[1.0, 3.0]);
    assert_eq!(ga.queue_len(), 4);
    assert_eq!(ga.generation(), 1);
    assert_eq!(ga.best_y(), Some(1.0));
    assert_eq!(ga.best_x(), Some(vec!["1".to_string(), "1".to_string()]));
}

#[test]
fn elite_never_gets_worse() {
    let space = CategoricalSpace::nominal_grid(6, 5).unwrap();
    let mut ga = GeneticAlgorithm::builder(space)
        .pop_size(8)
        .num_parents(4)
        .num_elite(4)
        .seed(7)
        .build()
        .unwrap();

    let mut rng = fastrand::Rng::with_seed(1);
    let mut previous_best = f64::INFINITY;
    for _ in 0..12 {
        let batch = ga.suggest_encoded(8).unwrap();
        // Noisy objective so generations see both better and worse points.
        let y: Vec<f64> = evaluate(&batch)
            .into_iter()
            .map(|v| v + rng.f64() * 10.0)
            .collect();
        ga.observe_encoded(&batch, &y).unwrap();
        ga.generate_new_population().unwrap();

        let (elite_x, elite_y) = ga.elite();
        assert!(elite_x.len() <= 4);
        assert!(elite_y.windows(2).all(|w| w[0] <= w[1]));
        assert!(elite_y[0] <= previous_best);
        previous_best = elite_y[0];
    }
}

#[test]
fn odd_elite_rounds_up() {
    let ga = GeneticAlgorithm::builder(CategoricalSpace::nominal_grid(3, 3).unwrap())
        .pop_size(10)
        .num_parents(6)
        .num_elite(3)
        .build()
        .unwrap();
    let cfg = ga.config();
    assert_eq!(cfg.num_elite, 4);
    assert!(cfg.num_elite <= cfg.num_parents && cfg.num_parents <= cfg.pop_size);
}

#[test]
fn rejects_inconsistent_population() {
    let err = GeneticAlgorithm::builder(CategoricalSpace::nominal_grid(3, 3).unwrap())
        .pop_size(4)
        .num_parents(6)
        .num_elite(2)
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, Error::InvalidPopulation { .. }));
}

#[test]
fn no_repeats_across_rounds() {
    let space = CategoricalSpace::nominal_grid(3, 3).unwrap();
    let mut ga = GeneticAlgorithm::builder(space.clone())
        .pop_size(5)
        .num_parents(4)
        .num_elite(2)
        .seed(3)
        .build()
        .unwrap();

    for _ in 0..3 {
        let points = ga.suggest(5).unwrap();
        let encoded = space.transform(&points).unwrap();
        for (i, s) in encoded.iter().enumerate() {
            assert!(!ga.data_buffer().contains(s), "{s:?} was already observed");
            assert!(!encoded[..i].contains(s), "{s:?} repeated in batch");
        }
        ga.observe(&points, &evaluate(&encoded)).unwrap();
    }
    assert_eq!(ga.data_buffer().len(), 15);
    assert_eq!(ga.fallback_count(), 0);
}

#[test]
fn partial_batches_never_repeat_across_generations() {
    let space = CategoricalSpace::nominal_grid(4, 4).unwrap();
    for seed in 0..20 {
        let mut ga = GeneticAlgorithm::builder(space.clone())
            .pop_size(5)
            .num_parents(4)
            .num_elite(2)
            .seed(seed)
            .build()
            .unwrap();

        let mut seen: Vec<Sample> = Vec::new();
        for _ in 0..6 {
            let batch = ga.suggest_encoded(3).unwrap();
            for s in &batch {
                assert!(!seen.contains(s), "seed {seed}: {s:?} suggested twice");
                seen.push(s.clone());
            }
            ga.observe_encoded(&batch, &evaluate(&batch)).unwrap();
        }
        assert!(ga.generation() >= 3);
    }
}

#[test]
fn unobserved_suggestions_are_not_repeated() {
    let space = CategoricalSpace::nominal_grid(4, 3).unwrap();
    let mut ga = GeneticAlgorithm::builder(space)
        .pop_size(4)
        .num_parents(2)
        .num_elite(2)
        .seed(3)
        .build()
        .unwrap();

    let first = ga.suggest_encoded(3).unwrap();
    ga.observe_encoded(&first, &evaluate(&first)).unwrap();
    let second = ga.suggest_encoded(3).unwrap();
    let third = ga.suggest_encoded(3).unwrap();
    let all: Vec<&Sample> = first.iter().chain(&second).chain(&third).collect();
    for (i, s) in all.iter().enumerate() {
        assert!(!all[..i].contains(s), "{s:?} suggested twice");
    }
}

#[test]
fn queued_points_follow_a_shrinking_region() {
    let space = CategoricalSpace::nominal_grid(6, 5).unwrap();
    let mut manager = StreakTrustRegion::new(&space, 0, 4, 3).unwrap().seed(2);
    let center = vec![0; 6];
    manager.region_mut().set_center(Some(center.clone())).unwrap();
    let shared = SharedTrustRegion::new(manager);

    let mut ga = GeneticAlgorithm::builder(space)
        .pop_size(8)
        .num_parents(4)
        .num_elite(2)
        .trust_region(shared.reader())
        .seed(17)
        .build()
        .unwrap();

    let first = ga.suggest_encoded(2).unwrap();
    ga.observe_encoded(&first, &evaluate(&first)).unwrap();
    assert_eq!(ga.queue_len(), 6);

    shared.write().region_mut().set_radius(NOMINAL, 1).unwrap();
    let rest = ga.suggest_encoded(6).unwrap();
    for (i, s) in rest.iter().enumerate() {
        assert!(hamming_distance(s, &center) <= 1, "{s:?} outside radius 1");
        assert!(!first.contains(s) && !rest[..i].contains(s));
    }
}

#[test]
fn suggestions_stay_inside_trust_region() {
    let space = CategoricalSpace::nominal_grid(8, 4).unwrap();
    let mut manager = StreakTrustRegion::new(&space, 0, 4, 2).unwrap().seed(5);
    manager.region_mut().set_center(Some(vec![0; 8])).unwrap();
    let shared = SharedTrustRegion::new(manager);

    let mut ga = GeneticAlgorithm::builder(space)
        .pop_size(6)
        .num_parents(4)
        .num_elite(2)
        .trust_region(shared.reader())
        .seed(11)
        .build()
        .unwrap();

    let center = vec![0; 8];
    for round in 0..6 {
        if round == 3 {
            shared.write().region_mut().set_radius(NOMINAL, 1).unwrap();
        }
        let radius = shared.reader().nominal_radius().unwrap();
        let batch = ga.suggest_encoded(6).unwrap();
        for s in &batch {
            assert!(hamming_distance(s, &center) <= radius, "{s:?} outside radius {radius}");
        }
        ga.observe_encoded(&batch, &evaluate(&batch)).unwrap();
    }
}

#[test]
fn trust_region_without_center_is_rejected() {
    let space = CategoricalSpace::nominal_grid(4, 3).unwrap();
    let manager = StreakTrustRegion::new(&space, 0, 3, 1).unwrap();
    let shared = SharedTrustRegion::new(manager);
    let err = GeneticAlgorithm::builder(space)
        .pop_size(4)
        .num_parents(2)
        .num_elite(2)
        .trust_region(shared.reader())
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, Error::MissingCenter));
}

#[test]
fn suggest_larger_than_population_fails() {
    let mut ga = small_ga(CategoricalSpace::nominal_grid(3, 3).unwrap());
    let err = ga.suggest(5).unwrap_err();
    assert!(matches!(
        err,
        Error::BatchTooLarge {
            requested: 5,
            pop_size: 4
        }
    ));
    assert_eq!(ga.queue_len(), 4);
}

#[test]
fn malformed_observations_change_nothing() {
    let mut ga = small_ga(CategoricalSpace::nominal_grid(2, 3).unwrap());
    let points = vec![vec!["0".to_string(), "1".to_string()]];
    assert!(matches!(
        ga.observe(&points, &[1.0, 2.0]),
        Err(Error::ObservationMismatch { n_x: 1, n_y: 2 })
    ));
    let unknown = vec![vec!["0".to_string(), "7".to_string()]];
    assert!(matches!(
        ga.observe(&unknown, &[1.0]),
        Err(Error::UnknownCategory { .. })
    ));
    assert!(ga.data_buffer().is_empty());
    assert_eq!(ga.best_y(), None);
}

#[test]
fn initialize_requires_fewer_points_than_population() {
    let mut ga = small_ga(CategoricalSpace::nominal_grid(2, 3).unwrap());
    let points: Vec<Vec<String>> = (0..4)
        .map(|i| vec![(i % 3).to_string(), "0".to_string()])
        .collect();
    let err = ga.initialize(&points, &[1.0; 4]).unwrap_err();
    assert!(matches!(err, Error::TooManyInitialPoints { got: 4, pop_size: 4 }));

    ga.initialize(&points[..2], &[2.0, 1.0]).unwrap();
    assert_eq!(ga.data_buffer().len(), 2);
    assert_eq!(ga.best_y(), Some(1.0));
}

#[test]
fn set_x_init_replaces_queue() {
    let mut ga = small_ga(CategoricalSpace::nominal_grid(2, 3).unwrap());
    let init = vec![
        vec!["2".to_string(), "2".to_string()],
        vec!["1".to_string(), "0".to_string()],
    ];
    ga.set_x_init(&init).unwrap();
    assert_eq!(ga.queue_len(), 2);
    assert_eq!(ga.suggest(2).unwrap(), init);
}

#[test]
fn restart_keeps_elite_and_refills_queue() {
    let mut ga = small_ga(CategoricalSpace::nominal_grid(3, 3).unwrap());
    let batch = ga.suggest_encoded(4).unwrap();
    ga.observe_encoded(&batch, &evaluate(&batch)).unwrap();
    ga.generate_new_population().unwrap();
    let elite_before = ga.elite().0.to_vec();

    ga.restart();
    assert_eq!(ga.queue_len(), 4);
    assert_eq!(ga.elite().0, elite_before.as_slice());
    assert_eq!(ga.data_buffer().len(), 4);
}

#[test]
fn empty_population_reseeds_with_warning() {
    let mut ga = small_ga(CategoricalSpace::nominal_grid(3, 3).unwrap());
    ga.generate_new_population().unwrap();
    assert_eq!(ga.fallback_count(), 1);
    assert_eq!(ga.queue_len(), 4);
    assert_eq!(ga.generation(), 0);
}

#[test]
fn converges_on_separable_objective() {
    let space = CategoricalSpace::nominal_grid(5, 4).unwrap();
    let mut ga = GeneticAlgorithm::builder(space)
        .pop_size(10)
        .num_parents(6)
        .num_elite(2)
        .seed(99)
        .build()
        .unwrap();
    for _ in 0..30 {
        let batch = ga.suggest_encoded(10).unwrap();
        ga.observe_encoded(&batch, &evaluate(&batch)).unwrap();
    }
    let best = ga.best_y().unwrap();
    assert!(best <= 2.0, "best value should be <= 2.0, got {best}");
    assert_eq!(ga.name(), "Genetic Algorithm");
}
