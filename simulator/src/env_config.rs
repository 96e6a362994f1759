//! Shared environment configuration for the simulator binaries.
//!
//! Every knob is an environment variable: `FAILSIM_LOG` (log filter),
//! `FAILSIM_PORT` (server) and `RAYON_NUM_THREADS` (batch pool).

use std::str::FromStr;
use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TRACING: Once = Once::new();

/// Install the stderr tracing subscriber. Idempotent.
///
/// Filter comes from `FAILSIM_LOG` (e.g. `failure_sim=debug`), falling back
/// to `failure_sim=info`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_env("FAILSIM_LOG")
            .unwrap_or_else(|_| EnvFilter::new("failure_sim=info"));
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(filter)
            .init();
    });
}

/// First of `keys` that is set and parses as `T`.
fn env_value<T: FromStr>(keys: &[&str]) -> Option<T> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .find_map(|raw| raw.trim().parse().ok())
}

/// Size the global pool for parallel scenario batches from
/// `RAYON_NUM_THREADS` or `OMP_NUM_THREADS` (default 8). A pool that is
/// already running keeps its size. Returns the requested thread count.
pub fn init_rayon_threads() -> usize {
    let num_threads = env_value(&["RAYON_NUM_THREADS", "OMP_NUM_THREADS"]).unwrap_or(8);
    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        Ok(()) => tracing::debug!(num_threads, "rayon pool ready"),
        Err(err) => tracing::debug!(error = %err, "keeping existing rayon pool"),
    }
    num_threads
}

/// HTTP port from `FAILSIM_PORT` (default 9000).
pub fn server_port() -> u16 {
    env_value(&["FAILSIM_PORT"]).unwrap_or(9000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_value_skips_unset_and_unparsable_keys() {
        std::env::set_var("FAILSIM_TEST_BAD", "lots");
        std::env::set_var("FAILSIM_TEST_GOOD", " 12 ");
        let v: Option<usize> =
            env_value(&["FAILSIM_TEST_UNSET", "FAILSIM_TEST_BAD", "FAILSIM_TEST_GOOD"]);
        assert_eq!(v, Some(12));
        assert_eq!(env_value::<u16>(&["FAILSIM_TEST_UNSET"]), None);
    }
}
