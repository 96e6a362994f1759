//! Binomial(n, p) sampler with size-dependent method selection.
//!
//! | Regime | Method |
//! |--------|--------|
//! | n = 0, p = 0, p = 1 | constant |
//! | n ≤ [`BERNOULLI_SUM_MAX_TRIALS`] | sum of n Bernoulli(p) draws |
//! | n · min(p, 1-p) < [`INVERSION_MAX_MEAN`] | sequential CDF inversion (BINV) |
//! | otherwise | BTPE, via `rand_distr::Binomial` |
//!
//! Inversion always runs on p' = min(p, 1-p) and reflects the result
//! (x → n - x) when p > 0.5, so the search walks the short side of the
//! distribution. All methods draw from the same distribution; the choice
//! only changes cost per sample.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand_distr::{Binomial, Distribution};
use serde::Serialize;

use crate::constants::{BERNOULLI_SUM_MAX_TRIALS, INVERSION_MAX_MEAN, INVERSION_SEARCH_LIMIT};
use crate::error::{Result, SimulationError};
use crate::types::validate_probability;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMethod {
    /// Degenerate model (n = 0, p = 0 or p = 1). Selected, never forced.
    Constant,
    BernoulliSum,
    Inversion,
    Btpe,
}

impl SamplingMethod {
    /// Methods a caller may force.
    pub const FORCEABLE: [SamplingMethod; 3] = [
        SamplingMethod::BernoulliSum,
        SamplingMethod::Inversion,
        SamplingMethod::Btpe,
    ];

    /// Cheapest correct method for these parameters.
    pub fn select(trials: u64, p: f64) -> Self {
        let mean = trials as f64 * p.min(1.0 - p);
        if is_degenerate(trials, p) {
            SamplingMethod::Constant
        } else if trials <= BERNOULLI_SUM_MAX_TRIALS {
            SamplingMethod::BernoulliSum
        } else if mean < INVERSION_MAX_MEAN {
            SamplingMethod::Inversion
        } else {
            SamplingMethod::Btpe
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SamplingMethod::Constant => "constant",
            SamplingMethod::BernoulliSum => "bernoulli",
            SamplingMethod::Inversion => "inversion",
            SamplingMethod::Btpe => "btpe",
        }
    }
}

fn is_degenerate(trials: u64, p: f64) -> bool {
    trials == 0 || p == 0.0 || p == 1.0
}

impl fmt::Display for SamplingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SamplingMethod {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bernoulli" | "bernoulli_sum" | "sum" => Ok(SamplingMethod::BernoulliSum),
            "inversion" | "binv" => Ok(SamplingMethod::Inversion),
            "btpe" => Ok(SamplingMethod::Btpe),
            _ => Err(SimulationError::invalid(
                "method",
                s,
                "expected one of bernoulli, inversion, btpe",
            )),
        }
    }
}

#[derive(Clone, Debug)]
enum Kernel {
    Constant(u64),
    BernoulliSum {
        trials: u64,
        p: f64,
    },
    Inversion {
        trials: u64,
        /// p > 0.5: sample on 1-p and return n - x.
        flipped: bool,
        /// p' / q'
        s: f64,
        /// (n + 1) · s
        a: f64,
        /// q'^n = P(X = 0)
        r0: f64,
        limit: u64,
    },
    Btpe(Binomial),
}

/// Draws failure counts from Binomial(trials, p).
///
/// Holds no generator; callers pass their own, so one sampler can be
/// shared across independently seeded runs.
#[derive(Clone, Debug)]
pub struct BinomialSampler {
    trials: u64,
    probability: f64,
    method: SamplingMethod,
    kernel: Kernel,
}

impl BinomialSampler {
    /// Sampler using [`SamplingMethod::select`].
    pub fn new(trials: u64, p: f64) -> Result<Self> {
        validate_probability(p)?;
        Self::build(trials, p, SamplingMethod::select(trials, p))
    }

    /// Sampler forced onto one method.
    ///
    /// Degenerate parameters still resolve to [`SamplingMethod::Constant`].
    /// Inversion is refused when P(X = 0) is not a normal `f64`, since the
    /// walked mass would then fall short of 1.
    pub fn with_method(trials: u64, p: f64, method: SamplingMethod) -> Result<Self> {
        validate_probability(p)?;
        Self::build(trials, p, method)
    }

    fn build(trials: u64, p: f64, method: SamplingMethod) -> Result<Self> {
        let (method, kernel) = if trials == 0 || p == 0.0 {
            (SamplingMethod::Constant, Kernel::Constant(0))
        } else if p == 1.0 {
            (SamplingMethod::Constant, Kernel::Constant(trials))
        } else {
            let kernel = match method {
                SamplingMethod::Constant => {
                    return Err(SimulationError::invalid(
                        "method",
                        method,
                        "only applies to n = 0, p = 0 or p = 1",
                    ))
                }
                SamplingMethod::BernoulliSum => Kernel::BernoulliSum { trials, p },
                SamplingMethod::Inversion => inversion_kernel(trials, p)?,
                SamplingMethod::Btpe => Kernel::Btpe(Binomial::new(trials, p)?),
            };
            (method, kernel)
        };
        tracing::debug!(trials, p, method = %method, "binomial sampler ready");
        Ok(Self {
            trials,
            probability: p,
            method,
            kernel,
        })
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Method actually in use, after degenerate parameters are resolved.
    pub fn method(&self) -> SamplingMethod {
        self.method
    }

    /// One draw, in `[0, trials]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        match &self.kernel {
            Kernel::Constant(v) => *v,
            Kernel::BernoulliSum { trials, p } => {
                (0..*trials).filter(|_| rng.random_bool(*p)).count() as u64
            }
            Kernel::Inversion {
                trials,
                flipped,
                s,
                a,
                r0,
                limit,
            } => {
                let x = invert(rng, *s, *a, *r0, *limit);
                if *flipped {
                    trials - x
                } else {
                    x
                }
            }
            Kernel::Btpe(dist) => dist.sample(rng),
        }
    }

    /// `count` independent draws, in draw order.
    pub fn sample_n<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<u64> {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.sample(rng));
        }
        out
    }
}

fn inversion_kernel(trials: u64, p: f64) -> Result<Kernel> {
    let flipped = p > 0.5;
    let p = if flipped { 1.0 - p } else { p };
    let q = 1.0 - p;
    let s = p / q;
    let a = (trials as f64 + 1.0) * s;
    let r0 = (trials as f64 * (-p).ln_1p()).exp();
    // Subnormal r0 loses most of its significand and the walk undercounts.
    if r0 < f64::MIN_POSITIVE {
        return Err(SimulationError::invalid(
            "method",
            "inversion",
            "P(X = 0) underflows for these parameters; use btpe",
        ));
    }
    let limit = if trials as f64 * p < INVERSION_MAX_MEAN {
        trials.min(INVERSION_SEARCH_LIMIT)
    } else {
        trials
    };
    Ok(Kernel::Inversion {
        trials,
        flipped,
        s,
        a,
        r0,
        limit,
    })
}

/// Walk the CDF from 0 until the uniform draw is covered.
///
/// Restarts with a fresh uniform if round-off pushes the search past
/// `limit`.
#[inline]
fn invert<R: Rng + ?Sized>(rng: &mut R, s: f64, a: f64, r0: f64, limit: u64) -> u64 {
    loop {
        let mut u: f64 = rng.random();
        let mut r = r0;
        let mut x = 0u64;
        loop {
            if u < r {
                return x;
            }
            u -= r;
            x += 1;
            if x > limit {
                break;
            }
            r *= a / x as f64 - s;
        }
    }
}
