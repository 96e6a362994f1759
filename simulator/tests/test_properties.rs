//! Property-based tests for sampling and aggregation.

use proptest::prelude::*;

use failure_sim::constants::MAX_HISTOGRAM_BINS;
use failure_sim::simulation::{simulate, summarize, BinomialSampler, SamplingMethod};
use failure_sim::types::ThresholdMode;
use failure_sim::SimulationError;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Strategy: a probability including both endpoints.
fn probability_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), Just(1.0), 0.0..=1.0f64]
}

fn method_strategy() -> impl Strategy<Value = SamplingMethod> {
    prop_oneof![
        Just(SamplingMethod::BernoulliSum),
        Just(SamplingMethod::Inversion),
        Just(SamplingMethod::Btpe),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // 1. Exactly `count` values, each in [0, trials]
    #[test]
    fn samples_have_count_and_range(
        trials in 0..400i64,
        p in probability_strategy(),
        count in 1..2000i64,
        seed in any::<u64>(),
    ) {
        let set = simulate(trials, p, count, Some(seed)).unwrap();
        prop_assert_eq!(set.len(), count as usize);
        prop_assert!(set.iter().all(|&s| s <= trials as u64));
    }

    // 2. Same seed, same parameters → same sequence
    #[test]
    fn seeded_runs_are_deterministic(
        trials in 0..400i64,
        p in probability_strategy(),
        count in 1..500i64,
        seed in any::<u64>(),
    ) {
        let a = simulate(trials, p, count, Some(seed)).unwrap();
        let b = simulate(trials, p, count, Some(seed)).unwrap();
        prop_assert_eq!(a.as_slice(), b.as_slice());
    }

    // 3. Histogram frequencies sum exactly to count
    #[test]
    fn histogram_sums_to_count(samples in prop::collection::vec(0..60u64, 1..500)) {
        let stats = summarize(&samples, 5).unwrap();
        let sum: u64 = stats.histogram.bins().iter().map(|b| b.count).sum();
        prop_assert_eq!(sum, samples.len() as u64);
        prop_assert_eq!(stats.histogram.len() as u64, stats.max + 1);
    }

    // 4. P(>= t) - P(> t) == frequency(t) / count
    #[test]
    fn threshold_variants_differ_by_threshold_frequency(
        samples in prop::collection::vec(0..30u64, 1..500),
        threshold in 0..35u64,
    ) {
        let stats = summarize(&samples, threshold).unwrap();
        let freq = samples.iter().filter(|&&s| s == threshold).count() as f64
            / samples.len() as f64;
        let diff = stats.prob_above(ThresholdMode::AtLeast)
            - stats.prob_above(ThresholdMode::Exceeds);
        prop_assert!((diff - freq).abs() < 1e-12, "diff={diff} freq={freq}");
    }

    // 5. Moments stay inside the observed range
    #[test]
    fn summary_is_internally_consistent(samples in prop::collection::vec(0..100u64, 1..300)) {
        let stats = summarize(&samples, 10).unwrap();
        prop_assert!(stats.min as f64 <= stats.mean + 1e-9);
        prop_assert!(stats.mean <= stats.max as f64 + 1e-9);
        prop_assert!(stats.std_dev >= 0.0);
        prop_assert!(stats.min <= stats.median && stats.median <= stats.max);
        prop_assert!((0.0..=1.0).contains(&stats.prob_zero));
        prop_assert!(stats.prob_exceeds <= stats.prob_at_least);
    }

    // 6. Every sampling method honors the degenerate endpoints
    #[test]
    fn endpoints_are_exact_for_every_method(
        trials in 0..200u64,
        method in method_strategy(),
        seed in any::<u64>(),
    ) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let none = BinomialSampler::with_method(trials, 0.0, method).unwrap();
        let all = BinomialSampler::with_method(trials, 1.0, method).unwrap();
        for _ in 0..20 {
            prop_assert_eq!(none.sample(&mut rng), 0);
            prop_assert_eq!(all.sample(&mut rng), trials);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // 7. Any value past the histogram cap is an error, never an allocation
    #[test]
    fn oversized_samples_are_rejected(
        small in prop::collection::vec(0..100u64, 0..20),
        huge in (MAX_HISTOGRAM_BINS as u64)..=u64::MAX,
    ) {
        let mut samples = small;
        samples.push(huge);
        let rejected = matches!(
            summarize(&samples, 5),
            Err(SimulationError::HistogramTooWide { .. })
        );
        prop_assert!(rejected);
    }
}

// 8. Each invalid input is rejected with its own parameter name
#[test]
fn invalid_inputs_are_rejected() {
    let cases = [
        (-1i64, 0.5, 10i64, "trials"),
        (10, 1.5, 10, "probability"),
        (10, -0.5, 10, "probability"),
        (10, 0.5, 0, "count"),
        (10, 0.5, -3, "count"),
    ];
    for (trials, p, count, name) in cases {
        let err = simulate(trials, p, count, None).unwrap_err();
        assert_eq!(err.parameter(), Some(name), "trials={trials} p={p} count={count}");
    }
}
