//! Named scenarios: the interactive dashboard, the batch script, and the
//! per-deploy release study, as parameter sets over one engine.

use std::str::FromStr;

use serde::Serialize;

use crate::error::{Result, SimulationError};
use crate::simulation::Scenario;
use crate::types::{probability_from_percent, SimulationParameters, ThresholdMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Slider defaults: 50 features, 5 %, 1000 versions, P(> 5).
    Dashboard,
    /// Fixed batch run: 50 features, 5 %, 10 000 versions, P(> 5).
    Script,
    /// 10 features × 15 deploys, 5 %, 10 000 versions, seed 42, P(>= 5).
    Release,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Dashboard, Preset::Script, Preset::Release];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Dashboard => "dashboard",
            Preset::Script => "script",
            Preset::Release => "release",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Preset::Dashboard => "Interactive defaults, one deploy per version",
            Preset::Script => "Batch run, one deploy per version",
            Preset::Release => "Features deployed separately, fixed seed",
        }
    }

    pub fn scenario(self) -> Scenario {
        let p = probability_from_percent(5.0);
        let (parameters, mode) = match self {
            Preset::Dashboard => (SimulationParameters::new(50, p, 1000), ThresholdMode::Exceeds),
            Preset::Script => (SimulationParameters::new(50, p, 10_000), ThresholdMode::Exceeds),
            Preset::Release => (
                SimulationParameters::new(10, p, 10_000)
                    .with_deploys(15)
                    .with_seed(42),
                ThresholdMode::AtLeast,
            ),
        };
        Scenario {
            name: self.name().to_string(),
            parameters,
            threshold: 5,
            mode,
        }
    }
}

impl FromStr for Preset {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                SimulationError::invalid("preset", s, "expected dashboard, script, or release")
            })
    }
}
