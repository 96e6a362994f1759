//! Monte Carlo engine: draws one failure count per simulated version.
//!
//! Each [`Simulator`] owns its generator. Nothing is process-global, so
//! repeated or concurrent runs never share random state and a fixed seed
//! reproduces a run exactly.

use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;

use crate::constants::DEFAULT_THRESHOLD;
use crate::error::{Result, SimulationError};
use crate::types::{
    validate_count, validate_probability, validate_trials, SampleSet, SimulationParameters,
    ThresholdMode,
};

use super::binomial::{BinomialSampler, SamplingMethod};
use super::statistics::SummaryStatistics;
use super::theory::BinomialModel;

/// Sampling driver owning one generator.
pub struct Simulator {
    rng: SmallRng,
    seed: Option<u64>,
    method: Option<SamplingMethod>,
}

impl Simulator {
    /// Reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            seed: Some(seed),
            method: None,
        }
    }

    /// Fresh OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
            seed: None,
            method: None,
        }
    }

    pub fn for_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::seeded(s),
            None => Self::from_entropy(),
        }
    }

    /// Force a sampling method instead of selecting by regime.
    pub fn with_method(mut self, method: SamplingMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Sampler for Binomial(trials, p), honoring a forced method.
    pub fn sampler(&self, trials: u64, p: f64) -> Result<BinomialSampler> {
        match self.method {
            Some(method) => BinomialSampler::with_method(trials, p, method),
            None => BinomialSampler::new(trials, p),
        }
    }

    /// `count` draws from `sampler`. Advances this generator only.
    pub fn draw_from(&mut self, sampler: &BinomialSampler, count: usize) -> Result<SampleSet> {
        if count == 0 {
            return Err(SimulationError::invalid("count", 0, "must be at least 1"));
        }
        let samples = sampler.sample_n(&mut self.rng, count);
        Ok(SampleSet::from_parts(
            sampler.trials(),
            sampler.probability(),
            self.seed,
            samples,
        ))
    }

    /// `count` draws from Binomial(trials, p).
    pub fn draw(&mut self, trials: u64, p: f64, count: usize) -> Result<SampleSet> {
        validate_probability(p)?;
        let sampler = self.sampler(trials, p)?;
        self.draw_from(&sampler, count)
    }

    /// Validate `params` and draw `simulation_count` versions.
    pub fn run(&mut self, params: &SimulationParameters) -> Result<SampleSet> {
        let trials = params.validate()?;
        let count = validate_count(params.simulation_count)?;
        self.draw(trials, params.failure_probability, count)
    }
}

/// Draw `count` independent samples from Binomial(trials, p).
///
/// With `seed`, the sequence is fully determined by (seed, trials, p, count).
/// Without it, fresh entropy is used on every call.
pub fn simulate(trials: i64, p: f64, count: i64, seed: Option<u64>) -> Result<SampleSet> {
    let trials = validate_trials(trials)?;
    validate_probability(p)?;
    let count = validate_count(count)?;
    Simulator::for_seed(seed).draw(trials, p, count)
}

/// One scenario to run: a model plus the threshold question asked of it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Scenario {
    pub name: String,
    pub parameters: SimulationParameters,
    pub threshold: u64,
    pub mode: ThresholdMode,
}

impl Scenario {
    /// Default model, `P(failures > 5)`, fresh entropy.
    pub fn custom() -> Self {
        Self {
            name: "custom".to_string(),
            parameters: SimulationParameters::default(),
            threshold: DEFAULT_THRESHOLD,
            mode: ThresholdMode::Exceeds,
        }
    }

    /// Replace every field `overrides` sets; keep the rest.
    pub fn with_overrides(mut self, overrides: &ScenarioOverrides) -> Self {
        let params = &mut self.parameters;
        if let Some(v) = overrides.features_per_version {
            params.features_per_version = v;
        }
        if let Some(v) = overrides.deploys_per_version {
            params.deploys_per_version = v;
        }
        if let Some(v) = overrides.failure_probability {
            params.failure_probability = v;
        }
        if let Some(v) = overrides.simulation_count {
            params.simulation_count = v;
        }
        if overrides.seed.is_some() {
            params.seed = overrides.seed;
        }
        if let Some(v) = overrides.threshold {
            self.threshold = v;
        }
        if let Some(v) = overrides.mode {
            self.mode = v;
        }
        self
    }
}

/// Per-field replacements applied on top of a custom or preset scenario.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScenarioOverrides {
    pub features_per_version: Option<i64>,
    pub deploys_per_version: Option<i64>,
    pub failure_probability: Option<f64>,
    pub simulation_count: Option<i64>,
    pub threshold: Option<u64>,
    pub mode: Option<ThresholdMode>,
    pub seed: Option<u64>,
}

/// Samples, summary, and closed-form reference for one scenario.
#[derive(Debug, Serialize)]
pub struct SimulationRun {
    pub scenario: Scenario,
    pub trials: u64,
    pub method: SamplingMethod,
    #[serde(skip)]
    pub samples: SampleSet,
    pub summary: SummaryStatistics,
    pub theory: BinomialModel,
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl SimulationRun {
    /// Probability of "too many failures" under the scenario's own mode.
    pub fn prob_over_threshold(&self) -> f64 {
        self.summary.prob_above(self.scenario.mode)
    }
}

fn serialize_millis<S>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_f64(d.as_secs_f64() * 1000.0)
}

/// Simulate, summarize, and attach the theoretical reference.
pub fn run_scenario(scenario: &Scenario) -> Result<SimulationRun> {
    run_scenario_with(scenario, None)
}

pub fn run_scenario_with(
    scenario: &Scenario,
    method: Option<SamplingMethod>,
) -> Result<SimulationRun> {
    let params = &scenario.parameters;
    let trials = params.validate()?;
    let count = validate_count(params.simulation_count)?;
    let start = Instant::now();

    let mut simulator = Simulator::for_seed(params.seed);
    if let Some(m) = method {
        simulator = simulator.with_method(m);
    }
    let sampler = simulator.sampler(trials, params.failure_probability)?;
    let samples = simulator.draw_from(&sampler, count)?;
    let summary = samples.summarize(scenario.threshold)?;
    let elapsed = start.elapsed();

    let method = sampler.method();
    let theory = BinomialModel::new(trials, params.failure_probability)?;

    tracing::info!(
        scenario = %scenario.name,
        trials,
        p = params.failure_probability,
        count = samples.len(),
        method = %method,
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        "simulation complete"
    );

    Ok(SimulationRun {
        scenario: scenario.clone(),
        trials,
        method,
        samples,
        summary,
        theory,
        elapsed,
    })
}

/// Run several scenarios in parallel, each on its own generator.
///
/// Results keep input order; one scenario failing does not affect the rest.
pub fn simulate_batch(scenarios: &[Scenario]) -> Vec<Result<SimulationRun>> {
    simulate_batch_with(scenarios, None)
}

pub fn simulate_batch_with(
    scenarios: &[Scenario],
    method: Option<SamplingMethod>,
) -> Vec<Result<SimulationRun>> {
    scenarios
        .par_iter()
        .map(|scenario| run_scenario_with(scenario, method))
        .collect()
}
