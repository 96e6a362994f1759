//! Summary statistics over a set of simulated failure counts.
//!
//! Everything is empirical: moments, threshold probabilities, and a dense
//! histogram over `0..=max`. Percentiles use the nearest-rank rule
//! `sorted[round(q · (n - 1))]`, read off the histogram's cumulative counts
//! rather than a sorted copy.

use serde::Serialize;

use crate::constants::MAX_HISTOGRAM_BINS;
use crate::error::{Result, SimulationError};
use crate::types::{SampleSet, ThresholdMode};

// ── Histogram ───────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct HistogramBin {
    pub failures: u64,
    pub count: u64,
}

/// Frequency of every failure count from 0 to the observed maximum.
///
/// Bins are contiguous: a count that never occurred still has a bin with
/// `count == 0`. `bins[k].failures == k` for every k.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Histogram {
    bins: Vec<HistogramBin>,
    total: u64,
}

impl Histogram {
    /// Fails when `0..=max` would need more than [`MAX_HISTOGRAM_BINS`] bins.
    pub fn from_samples(samples: &[u64]) -> Result<Self> {
        let Some(&max) = samples.iter().max() else {
            return Ok(Self {
                bins: Vec::new(),
                total: 0,
            });
        };
        let width = usize::try_from(max)
            .ok()
            .and_then(|m| m.checked_add(1))
            .filter(|&w| w <= MAX_HISTOGRAM_BINS)
            .ok_or(SimulationError::HistogramTooWide {
                max_failures: max,
                limit: MAX_HISTOGRAM_BINS,
            })?;
        let mut counts = vec![0u64; width];
        for &s in samples {
            counts[s as usize] += 1;
        }
        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(k, count)| HistogramBin {
                failures: k as u64,
                count,
            })
            .collect();
        Ok(Self {
            bins,
            total: samples.len() as u64,
        })
    }

    pub fn bins(&self) -> &[HistogramBin] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Sum of all bin counts; equals the number of samples.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Largest observed failure count.
    pub fn max_failures(&self) -> Option<u64> {
        self.bins.last().map(|b| b.failures)
    }

    /// Occurrences of exactly `failures`; 0 beyond the observed range.
    pub fn frequency(&self, failures: u64) -> u64 {
        self.bins
            .get(failures as usize)
            .map(|b| b.count)
            .unwrap_or(0)
    }

    pub fn relative_frequency(&self, failures: u64) -> f64 {
        self.ratio(self.frequency(failures))
    }

    /// Share of samples with `failures > threshold`.
    pub fn prob_exceeds(&self, threshold: u64) -> f64 {
        self.prob_over(threshold, ThresholdMode::Exceeds)
    }

    /// Share of samples with `failures >= threshold`.
    pub fn prob_at_least(&self, threshold: u64) -> f64 {
        self.prob_over(threshold, ThresholdMode::AtLeast)
    }

    pub fn prob_over(&self, threshold: u64, mode: ThresholdMode) -> f64 {
        let over: u64 = self
            .bins
            .iter()
            .filter(|b| mode.is_over(b.failures, threshold))
            .map(|b| b.count)
            .sum();
        self.ratio(over)
    }

    /// Nearest-rank percentile, `q` in [0, 1].
    pub fn percentile(&self, q: f64) -> u64 {
        if self.total == 0 {
            return 0;
        }
        let rank = (q.clamp(0.0, 1.0) * (self.total - 1) as f64).round() as u64;
        let mut cumulative = 0u64;
        for bin in &self.bins {
            cumulative += bin.count;
            if cumulative > rank {
                return bin.failures;
            }
        }
        self.max_failures().unwrap_or(0)
    }

    fn ratio(&self, count: u64) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64
        }
    }
}

// ── Summary ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Percentiles {
    pub p5: u64,
    pub p25: u64,
    pub p50: u64,
    pub p75: u64,
    pub p95: u64,
}

/// Read-only snapshot derived from one [`SampleSet`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub count: usize,
    pub threshold: u64,
    pub mean: f64,
    /// Population standard deviation (divides by `count`).
    pub std_dev: f64,
    pub min: u64,
    pub max: u64,
    pub median: u64,
    pub percentiles: Percentiles,
    /// P(failures > threshold)
    pub prob_exceeds: f64,
    /// P(failures >= threshold)
    pub prob_at_least: f64,
    /// P(failures == 0)
    pub prob_zero: f64,
    pub histogram: Histogram,
}

impl SummaryStatistics {
    /// Threshold probability under the caller's chosen comparison.
    pub fn prob_above(&self, mode: ThresholdMode) -> f64 {
        match mode {
            ThresholdMode::Exceeds => self.prob_exceeds,
            ThresholdMode::AtLeast => self.prob_at_least,
        }
    }
}

/// Summarize raw failure counts.
///
/// Fails on an empty slice, or when the observed range is too wide for a
/// dense histogram.
pub fn summarize(samples: &[u64], threshold: u64) -> Result<SummaryStatistics> {
    if samples.is_empty() {
        return Err(SimulationError::EmptySampleSet);
    }
    aggregate(samples, threshold)
}

impl SampleSet {
    /// Summarize this set. Never empty, so only the histogram width can fail.
    pub fn summarize(&self, threshold: u64) -> Result<SummaryStatistics> {
        aggregate(self.as_slice(), threshold)
    }
}

fn aggregate(samples: &[u64], threshold: u64) -> Result<SummaryStatistics> {
    let n = samples.len() as f64;

    let mean = samples.iter().map(|&s| s as f64).sum::<f64>() / n;
    let variance = samples
        .iter()
        .map(|&s| (s as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();

    let histogram = Histogram::from_samples(samples)?;
    let min = samples.iter().copied().min().unwrap_or(0);
    let max = histogram.max_failures().unwrap_or(0);

    let percentiles = Percentiles {
        p5: histogram.percentile(0.05),
        p25: histogram.percentile(0.25),
        p50: histogram.percentile(0.50),
        p75: histogram.percentile(0.75),
        p95: histogram.percentile(0.95),
    };

    Ok(SummaryStatistics {
        count: samples.len(),
        threshold,
        mean,
        std_dev,
        min,
        max,
        median: percentiles.p50,
        percentiles,
        prob_exceeds: histogram.prob_exceeds(threshold),
        prob_at_least: histogram.prob_at_least(threshold),
        prob_zero: histogram.relative_frequency(0),
        histogram,
    })
}
