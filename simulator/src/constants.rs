//! Model defaults, input-surface bounds, and sampler cut-over points.
//!
//! The release model is X ~ Binomial(n, p) with
//! n = features per version × deploys per version. Defaults reproduce the
//! interactive dashboard's initial slider positions.

/// Default features per version (dashboard slider start).
pub const DEFAULT_FEATURES_PER_VERSION: i64 = 50;

/// Default deploys per version. One deploy means trials == features.
pub const DEFAULT_DEPLOYS_PER_VERSION: i64 = 1;

/// Default per-trial critical failure probability, in percent.
pub const DEFAULT_FAILURE_PERCENT: f64 = 5.0;

/// Default number of simulated versions.
pub const DEFAULT_SIMULATION_COUNT: i64 = 1000;

/// Default "too many failures" threshold.
pub const DEFAULT_THRESHOLD: u64 = 5;

// ── Input-surface bounds ────────────────────────────────────────────
//
// Enforced by the CLI and HTTP surfaces only. The core validates its own
// mathematical preconditions and nothing more.

pub const MIN_FEATURES_PER_VERSION: i64 = 1;
pub const MAX_FEATURES_PER_VERSION: i64 = 200;

pub const MIN_DEPLOYS_PER_VERSION: i64 = 1;
pub const MAX_DEPLOYS_PER_VERSION: i64 = 50;

pub const MIN_FAILURE_PERCENT: f64 = 0.0;
pub const MAX_FAILURE_PERCENT: f64 = 20.0;

pub const MIN_SIMULATION_COUNT: i64 = 100;
pub const MAX_SIMULATION_COUNT: i64 = 50_000;

// ── Sampler selection ───────────────────────────────────────────────

/// Up to this many trials, a direct Bernoulli sum is cheapest.
pub const BERNOULLI_SUM_MAX_TRIALS: u64 = 16;

/// Below this mean (n · min(p, 1-p)), sequential CDF inversion is used.
/// At or above it, BTPE.
pub const INVERSION_MAX_MEAN: f64 = 10.0;

/// Inversion restarts if its search passes this value. With a mean below
/// [`INVERSION_MAX_MEAN`] the tail beyond it has negligible mass.
pub const INVERSION_SEARCH_LIMIT: u64 = 110;

// ── Aggregation ─────────────────────────────────────────────────────

/// Largest dense histogram `summarize` will build (bins 0..=max).
/// Wider sample ranges are rejected instead of allocated.
pub const MAX_HISTOGRAM_BINS: usize = 1 << 20;

/// Width (in characters) of the longest bar in the text histogram.
pub const HISTOGRAM_BAR_WIDTH: usize = 50;
