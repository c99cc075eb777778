//! Wall-clock instrumentation for search calls

use nearpoint_core::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};

/// Run `f` and return its output together with the elapsed wall-clock time
pub fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let output = f();
    (output, start.elapsed())
}

/// Elapsed time in fractional milliseconds
pub fn as_millis_f64(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}

/// Summary of repeated timings, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BenchmarkStats {
    pub runs: usize,
    pub mean_ms: f64,
    /// Population standard deviation
    pub std_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl BenchmarkStats {
    /// Summarize a set of samples, `None` when there are none
    pub fn from_samples(samples: &[Duration]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let ms: Vec<f64> = samples.iter().copied().map(as_millis_f64).collect();
        let n = ms.len() as f64;
        let mean = ms.iter().sum::<f64>() / n;
        let variance = ms.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            runs: ms.len(),
            mean_ms: mean,
            std_ms: variance.sqrt(),
            min_ms: ms.iter().copied().fold(f64::INFINITY, f64::min),
            max_ms: ms.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

impl fmt::Display for BenchmarkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} ({:.2}) ms.", self.mean_ms, self.std_ms)
    }
}

/// Call `f` `runs` times, timing each call.
///
/// Returns the statistics and the output of the last run. The first error
/// aborts the benchmark.
pub fn run_repeated<T>(runs: usize, mut f: impl FnMut() -> Result<T>) -> Result<(BenchmarkStats, T)> {
    if runs == 0 {
        return Err(Error::InvalidData("benchmark needs at least one run".to_string()));
    }

    let mut samples = Vec::with_capacity(runs);
    let mut last = None;
    for _ in 0..runs {
        let (output, elapsed) = timed(&mut f);
        last = Some(output?);
        samples.push(elapsed);
    }

    match (BenchmarkStats::from_samples(&samples), last) {
        (Some(stats), Some(output)) => Ok((stats, output)),
        _ => Err(Error::InvalidData("benchmark produced no samples".to_string())),
    }
}
