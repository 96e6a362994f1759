//! Closed-form Binomial(n, p) reference values.
//!
//! Shown beside the empirical statistics so a reader can see the Monte Carlo
//! estimates converge: μ = n·p, σ² = n·p·(1-p), P(X = 0) = (1-p)^n.
//! Point and tail probabilities come from `statrs` (log-factorial pmf,
//! regularized incomplete beta for the cdf), so their cost does not grow
//! with n or the threshold.

use serde::Serialize;
use statrs::distribution::{Binomial, Discrete, DiscreteCDF};

use crate::error::{Result, SimulationError};
use crate::types::{validate_probability, ThresholdMode};

#[derive(Clone, Debug, Serialize)]
pub struct BinomialModel {
    trials: u64,
    probability: f64,
    mean: f64,
    variance: f64,
    std_dev: f64,
    prob_zero: f64,
    #[serde(skip)]
    dist: Binomial,
}

impl BinomialModel {
    pub fn new(trials: u64, probability: f64) -> Result<Self> {
        validate_probability(probability)?;
        let dist = Binomial::new(probability, trials).map_err(|_| {
            SimulationError::invalid("probability", probability, "rejected by the closed-form model")
        })?;
        let n = trials as f64;
        let variance = n * probability * (1.0 - probability);
        let mut model = Self {
            trials,
            probability,
            mean: n * probability,
            variance,
            std_dev: variance.sqrt(),
            prob_zero: 0.0,
            dist,
        };
        model.prob_zero = model.pmf(0);
        Ok(model)
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    pub fn prob_zero(&self) -> f64 {
        self.prob_zero
    }

    /// P(X = k)
    pub fn pmf(&self, k: u64) -> f64 {
        if k > self.trials {
            return 0.0;
        }
        if let Some(point) = self.point_mass() {
            return if k == point { 1.0 } else { 0.0 };
        }
        self.dist.pmf(k)
    }

    /// P(X <= k)
    pub fn cdf(&self, k: u64) -> f64 {
        if k >= self.trials {
            return 1.0;
        }
        if let Some(point) = self.point_mass() {
            return if point <= k { 1.0 } else { 0.0 };
        }
        self.dist.cdf(k).clamp(0.0, 1.0)
    }

    /// P(X > k)
    pub fn prob_exceeds(&self, k: u64) -> f64 {
        if k >= self.trials {
            return 0.0;
        }
        if let Some(point) = self.point_mass() {
            return if point > k { 1.0 } else { 0.0 };
        }
        self.dist.sf(k).clamp(0.0, 1.0)
    }

    /// P(X >= k)
    pub fn prob_at_least(&self, k: u64) -> f64 {
        match k.checked_sub(1) {
            Some(below) => self.prob_exceeds(below),
            None => 1.0,
        }
    }

    pub fn prob_over(&self, k: u64, mode: ThresholdMode) -> f64 {
        match mode {
            ThresholdMode::Exceeds => self.prob_exceeds(k),
            ThresholdMode::AtLeast => self.prob_at_least(k),
        }
    }

    /// Value carrying all the mass when the model is degenerate.
    fn point_mass(&self) -> Option<u64> {
        if self.trials == 0 || self.probability == 0.0 {
            Some(0)
        } else if self.probability == 1.0 {
            Some(self.trials)
        } else {
            None
        }
    }
}
