//! Core data types: simulation parameters, sample sets, threshold semantics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, SimulationError};

/// Which comparison counts as "too many failures".
///
/// The named presets disagree (`> 5` vs `>= 5`), so callers always pick
/// one explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    /// `failures > threshold`
    Exceeds,
    /// `failures >= threshold`
    AtLeast,
}

impl ThresholdMode {
    pub fn symbol(self) -> &'static str {
        match self {
            ThresholdMode::Exceeds => ">",
            ThresholdMode::AtLeast => ">=",
        }
    }

    /// Does `value` count as over the threshold under this mode?
    #[inline]
    pub fn is_over(self, value: u64, threshold: u64) -> bool {
        match self {
            ThresholdMode::Exceeds => value > threshold,
            ThresholdMode::AtLeast => value >= threshold,
        }
    }
}

impl fmt::Display for ThresholdMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ThresholdMode {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gt" | ">" | "exceeds" => Ok(ThresholdMode::Exceeds),
            "ge" | ">=" | "at_least" | "at-least" => Ok(ThresholdMode::AtLeast),
            _ => Err(SimulationError::invalid(
                "mode",
                s,
                "expected one of gt, ge, exceeds, at_least",
            )),
        }
    }
}

/// Convert a slider percentage (e.g. `5.0`) into a probability (`0.05`).
pub fn probability_from_percent(percent: f64) -> f64 {
    percent / 100.0
}

/// Parameters of one simulated release model.
///
/// Integer fields are signed so that bad input from a surface reaches
/// [`SimulationParameters::validate`] instead of failing to parse.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub features_per_version: i64,
    pub deploys_per_version: i64,
    pub failure_probability: f64,
    pub simulation_count: i64,
    pub seed: Option<u64>,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            features_per_version: DEFAULT_FEATURES_PER_VERSION,
            deploys_per_version: DEFAULT_DEPLOYS_PER_VERSION,
            failure_probability: probability_from_percent(DEFAULT_FAILURE_PERCENT),
            simulation_count: DEFAULT_SIMULATION_COUNT,
            seed: None,
        }
    }
}

impl SimulationParameters {
    /// Single-deploy model: trials == features.
    pub fn new(features_per_version: i64, failure_probability: f64, simulation_count: i64) -> Self {
        Self {
            features_per_version,
            deploys_per_version: DEFAULT_DEPLOYS_PER_VERSION,
            failure_probability,
            simulation_count,
            seed: None,
        }
    }

    pub fn with_deploys(mut self, deploys_per_version: i64) -> Self {
        self.deploys_per_version = deploys_per_version;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// n = features × deploys.
    pub fn trials(&self) -> Result<u64> {
        if self.features_per_version < 1 {
            return Err(SimulationError::invalid(
                "features_per_version",
                self.features_per_version,
                "must be a positive integer",
            ));
        }
        if self.deploys_per_version < 1 {
            return Err(SimulationError::invalid(
                "deploys_per_version",
                self.deploys_per_version,
                "must be a positive integer",
            ));
        }
        (self.features_per_version as u64)
            .checked_mul(self.deploys_per_version as u64)
            .ok_or_else(|| {
                SimulationError::invalid(
                    "trials",
                    format!("{} x {}", self.features_per_version, self.deploys_per_version),
                    "features x deploys overflows",
                )
            })
    }

    /// Check the model's mathematical preconditions. Returns the trial count.
    pub fn validate(&self) -> Result<u64> {
        let trials = self.trials()?;
        validate_probability(self.failure_probability)?;
        validate_count(self.simulation_count)?;
        Ok(trials)
    }

    /// Check the interactive surface's slider ranges. Not part of the model.
    pub fn check_input_bounds(&self) -> Result<()> {
        if !(MIN_FEATURES_PER_VERSION..=MAX_FEATURES_PER_VERSION)
            .contains(&self.features_per_version)
        {
            return Err(SimulationError::invalid(
                "features_per_version",
                self.features_per_version,
                "outside input range 1..=200",
            ));
        }
        if !(MIN_DEPLOYS_PER_VERSION..=MAX_DEPLOYS_PER_VERSION).contains(&self.deploys_per_version)
        {
            return Err(SimulationError::invalid(
                "deploys_per_version",
                self.deploys_per_version,
                "outside input range 1..=50",
            ));
        }
        let percent = self.failure_probability * 100.0;
        // Small slack so 0.2 (not exactly representable) still passes at 20 %.
        if !(percent >= MIN_FAILURE_PERCENT && percent <= MAX_FAILURE_PERCENT + 1e-9) {
            return Err(SimulationError::invalid(
                "failure_probability",
                self.failure_probability,
                "outside input range 0..=20 %",
            ));
        }
        if !(MIN_SIMULATION_COUNT..=MAX_SIMULATION_COUNT).contains(&self.simulation_count) {
            return Err(SimulationError::invalid(
                "simulation_count",
                self.simulation_count,
                "outside input range 100..=50000",
            ));
        }
        Ok(())
    }
}

pub(crate) fn validate_probability(p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        // Also rejects NaN.
        return Err(SimulationError::invalid(
            "probability",
            p,
            "must lie in [0, 1]",
        ));
    }
    Ok(())
}

pub(crate) fn validate_count(count: i64) -> Result<usize> {
    if count < 1 {
        return Err(SimulationError::invalid(
            "count",
            count,
            "must be at least 1",
        ));
    }
    usize::try_from(count).map_err(|_| SimulationError::invalid("count", count, "too large"))
}

pub(crate) fn validate_trials(trials: i64) -> Result<u64> {
    u64::try_from(trials)
        .map_err(|_| SimulationError::invalid("trials", trials, "must be non-negative"))
}

/// Failure counts drawn from Binomial(trials, probability), one per
/// simulated version. Never empty; every value lies in `[0, trials]`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SampleSet {
    trials: u64,
    probability: f64,
    seed: Option<u64>,
    samples: Vec<u64>,
}

impl SampleSet {
    /// Wrap externally produced counts, checking the set's invariants.
    pub fn new(trials: u64, probability: f64, samples: Vec<u64>) -> Result<Self> {
        validate_probability(probability)?;
        if samples.is_empty() {
            return Err(SimulationError::EmptySampleSet);
        }
        if let Some(&bad) = samples.iter().find(|&&s| s > trials) {
            return Err(SimulationError::invalid(
                "samples",
                bad,
                "sample exceeds the trial count",
            ));
        }
        Ok(Self {
            trials,
            probability,
            seed: None,
            samples,
        })
    }

    pub(crate) fn from_parts(
        trials: u64,
        probability: f64,
        seed: Option<u64>,
        samples: Vec<u64>,
    ) -> Self {
        debug_assert!(!samples.is_empty());
        Self {
            trials,
            probability,
            seed,
            samples,
        }
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, u64> {
        self.samples.iter()
    }

    pub fn into_vec(self) -> Vec<u64> {
        self.samples
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a u64;
    type IntoIter = std::slice::Iter<'a, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
