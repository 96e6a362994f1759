//! End-to-end convergence checks: empirical statistics against Binomial(n, p).
//!
//! All runs are seeded, so the tolerances below are checked against fixed
//! sequences rather than flaky draws.

use failure_sim::presets::Preset;
use failure_sim::simulation::{
    run_scenario, run_scenario_with, simulate, simulate_batch, summarize, BinomialModel,
    BinomialSampler, SamplingMethod, Scenario, ScenarioOverrides,
};
use failure_sim::types::ThresholdMode;
use failure_sim::SimulationError;
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[test]
fn mean_and_std_dev_converge() {
    // n = 500, p = 0.05: μ = 25, σ ≈ 4.87
    let set = simulate(500, 0.05, 50_000, Some(42)).unwrap();
    let stats = set.summarize(5).unwrap();
    assert!((stats.mean - 25.0).abs() / 25.0 < 0.02, "mean={}", stats.mean);
    let sigma = (500.0f64 * 0.05 * 0.95).sqrt();
    assert!(
        (stats.std_dev - sigma).abs() / sigma < 0.03,
        "std_dev={} expected≈{}",
        stats.std_dev,
        sigma
    );
}

#[test]
fn prob_zero_converges() {
    // n = 10, p = 0.05: P(0) = 0.95^10 ≈ 0.5987
    let set = simulate(10, 0.05, 100_000, Some(7)).unwrap();
    let stats = set.summarize(5).unwrap();
    assert!(
        (stats.prob_zero - 0.95f64.powi(10)).abs() < 0.01,
        "prob_zero={}",
        stats.prob_zero
    );
}

#[test]
fn threshold_probabilities_track_theory() {
    let set = simulate(50, 0.05, 50_000, Some(11)).unwrap();
    let stats = set.summarize(5).unwrap();
    let theory = BinomialModel::new(50, 0.05).unwrap();
    assert!((stats.prob_exceeds - theory.prob_exceeds(5)).abs() < 0.01);
    assert!((stats.prob_at_least - theory.prob_at_least(5)).abs() < 0.01);
}

#[test]
fn histogram_matches_pmf() {
    let set = simulate(20, 0.3, 100_000, Some(3)).unwrap();
    let stats = set.summarize(6).unwrap();
    let theory = BinomialModel::new(20, 0.3).unwrap();
    for bin in stats.histogram.bins() {
        let observed = stats.histogram.relative_frequency(bin.failures);
        assert!(
            (observed - theory.pmf(bin.failures)).abs() < 0.01,
            "k={} observed={} pmf={}",
            bin.failures,
            observed,
            theory.pmf(bin.failures)
        );
    }
    assert_eq!(stats.histogram.total(), 100_000);
}

#[test]
fn forced_methods_agree_on_moments() {
    let mut scenario = Preset::Release.scenario();
    scenario.parameters.simulation_count = 20_000;
    let means: Vec<f64> = [
        SamplingMethod::BernoulliSum,
        SamplingMethod::Inversion,
        SamplingMethod::Btpe,
    ]
    .into_iter()
    .map(|m| run_scenario_with(&scenario, Some(m)).unwrap().summary.mean)
    .collect();
    for mean in means {
        assert!((mean - 7.5).abs() < 0.1, "mean={mean}");
    }
}

#[test]
fn release_preset_is_reproducible() {
    let a = run_scenario(&Preset::Release.scenario()).unwrap();
    let b = run_scenario(&Preset::Release.scenario()).unwrap();
    assert_eq!(a.samples, b.samples);
    assert_eq!(a.summary, b.summary);
    assert_eq!(a.scenario.mode, ThresholdMode::AtLeast);
    assert_eq!(a.prob_over_threshold(), a.summary.prob_at_least);
}

#[test]
fn batch_runs_every_preset() {
    let scenarios: Vec<_> = Preset::ALL.iter().map(|p| p.scenario()).collect();
    let runs = simulate_batch(&scenarios);
    assert_eq!(runs.len(), 3);
    for (run, preset) in runs.iter().zip(Preset::ALL) {
        let run = run.as_ref().unwrap();
        assert_eq!(run.scenario.name, preset.name());
        assert_eq!(
            run.summary.count as i64,
            preset.scenario().parameters.simulation_count
        );
    }
}

#[test]
fn unseeded_runs_draw_fresh_entropy() {
    let a = simulate(1000, 0.5, 200, None).unwrap();
    let b = simulate(1000, 0.5, 200, None).unwrap();
    // 200 draws with σ ≈ 15.8 each: identical sequences would mean reused state.
    assert_ne!(a.as_slice(), b.as_slice());
    assert_eq!(a.seed(), None);
}

#[test]
fn forced_methods_agree_at_the_largest_slider_model() {
    // 200 features x 50 deploys at 6.8 %: P(X = 0) ≈ e^-704, still a normal f64.
    let (n, p) = (10_000u64, 0.068);
    let expected = n as f64 * p;
    let se = (n as f64 * p * (1.0 - p) / 4000.0).sqrt();
    for method in SamplingMethod::FORCEABLE {
        let sampler = BinomialSampler::with_method(n, p, method).unwrap();
        let mut rng = SmallRng::seed_from_u64(31);
        let samples = sampler.sample_n(&mut rng, 4000);
        let mean = samples.iter().sum::<u64>() as f64 / samples.len() as f64;
        assert!(
            (mean - expected).abs() < 5.0 * se,
            "{method}: mean={mean} expected={expected}"
        );
    }
}

#[test]
fn forced_inversion_is_refused_once_zero_mass_goes_subnormal() {
    let scenario = Scenario::custom().with_overrides(&ScenarioOverrides {
        features_per_version: Some(200),
        deploys_per_version: Some(50),
        failure_probability: Some(0.0718),
        seed: Some(5),
        ..Default::default()
    });
    assert!(scenario.parameters.check_input_bounds().is_ok());
    let err = run_scenario_with(&scenario, Some(SamplingMethod::Inversion)).unwrap_err();
    assert_eq!(err.parameter(), Some("method"));

    let run = run_scenario_with(&scenario, Some(SamplingMethod::Btpe)).unwrap();
    assert!((run.summary.mean - 718.0).abs() < 4.0, "mean={}", run.summary.mean);
}

#[test]
fn huge_values_are_reported_not_allocated() {
    assert!(matches!(
        summarize(&[u64::MAX], 0),
        Err(SimulationError::HistogramTooWide { .. })
    ));

    let set = simulate(i64::MAX, 0.5, 1, Some(1)).unwrap();
    assert!(matches!(
        set.summarize(5),
        Err(SimulationError::HistogramTooWide { .. })
    ));
}
