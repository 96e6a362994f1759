//! Error taxonomy for the simulator.

use std::fmt::Display;

/// Errors surfaced by the simulator and its adapters.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// A mathematical precondition on an input was violated.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("cannot summarize an empty sample set")]
    EmptySampleSet,

    /// A dense histogram over `0..=max_failures` would exceed `limit` bins.
    #[error("histogram over 0..={max_failures} exceeds {limit} bins")]
    HistogramTooWide { max_failures: u64, limit: usize },

    #[error("binomial distribution rejected its parameters: {0}")]
    Distribution(#[from] rand_distr::BinomialError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimulationError {
    pub fn invalid(name: &'static str, value: impl Display, reason: &'static str) -> Self {
        SimulationError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Name of the offending parameter, if this is a parameter error.
    pub fn parameter(&self) -> Option<&'static str> {
        match self {
            SimulationError::InvalidParameter { name, .. } => Some(*name),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
