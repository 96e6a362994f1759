//! # failure-sim: Monte Carlo estimation of critical failures per release
//!
//! Models the number of critical post-deploy failures in one software
//! version as X ~ Binomial(n, p), where n = features × deploys and p is the
//! per-trial failure probability, and approximates X's distribution by
//! drawing many simulated versions.
//!
//! ## Pipeline
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Parameters | [`types`] | `SimulationParameters` (validated, n = features × deploys) |
//! | Sampling | [`simulation::engine`], [`simulation::binomial`] | `SampleSet`: one failure count per version |
//! | Aggregation | [`simulation::statistics`] | `SummaryStatistics`: mean, population σ, P(> t), P(≥ t), P(0), dense histogram |
//! | Reference | [`simulation::theory`] | Closed-form μ, σ, P(0) and threshold probabilities |
//! | Presentation | [`report`], [`server`] | Text/JSON/CSV reports, HTTP endpoints |
//!
//! Data flows one way. Each run owns its generator, so a fixed seed
//! reproduces a run exactly and concurrent runs never share random state.
//!
//! ## Threshold semantics
//!
//! "Too many failures" is reported both as P(X > t) and P(X ≥ t). The two
//! differ by exactly the observed frequency of t; callers choose which one
//! they mean via [`types::ThresholdMode`].

pub mod constants;
pub mod env_config;
pub mod error;
pub mod presets;
pub mod report;
pub mod server;
pub mod simulation;
pub mod types;

pub use error::{Result, SimulationError};
pub use simulation::{simulate, summarize, Simulator, SummaryStatistics};
pub use types::{SampleSet, SimulationParameters, ThresholdMode};
