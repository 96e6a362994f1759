//! Monte Carlo simulation of critical failures per release.
//!
//! - [`binomial`]: Binomial(n, p) sampler (Bernoulli sum, inversion, BTPE)
//! - [`engine`]: Generator ownership, single runs, parallel scenario batches
//! - [`statistics`]: Empirical summary and dense histogram
//! - [`theory`]: Closed-form reference values for the same model

pub mod binomial;
pub mod engine;
pub mod statistics;
pub mod theory;

// Re-export commonly used items
pub use binomial::{BinomialSampler, SamplingMethod};
pub use engine::{
    run_scenario, run_scenario_with, simulate, simulate_batch, simulate_batch_with, Scenario,
    ScenarioOverrides, SimulationRun, Simulator,
};
pub use statistics::{summarize, Histogram, HistogramBin, Percentiles, SummaryStatistics};
pub use theory::BinomialModel;
