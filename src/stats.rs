use std::collections::BTreeMap;

/// Process counts the program is benchmarked with, in reporting order.
pub const PROCESS_COUNTS: [u32; 4] = [1, 2, 4, 8];

/// Values parsed out of a single run's stdout.
#[derive(Debug, Default, PartialEq)]
pub struct Sample {
  /// Every `Circles` value, in output order.
  pub areas: Vec<f64>,
  /// Every `Elapsed` value, in output order.
  pub elapsed: Vec<f64>,
}

/// Everything collected over a full benchmark.
#[derive(Debug)]
pub struct Stats {
  pub num_repeats: u32,
  /// Elapsed time samples, keyed by process count.
  pub times: BTreeMap<u32, Vec<f64>>,
  /// Sum of every area reported by every run.
  pub total_area: f64,
}

impl Stats {
  pub fn new(num_repeats: u32) -> Self {
    Self {
      num_repeats,
      times: PROCESS_COUNTS.iter().map(|&procs| (procs, Vec::new())).collect(),
      total_area: 0.0,
    }
  }

  /// Adds the results of one run with `procs` processes.
  pub fn record(&mut self, procs: u32, sample: Sample) {
    self.total_area += sample.areas.iter().fold(0.0, |sum, area| sum + area);
    self.times.entry(procs).or_default().extend(sample.elapsed);
  }

  /// Mean elapsed time, over the configured number of repeats.
  pub fn average(&self, times: &[f64]) -> f64 {
    // Folded from `+0.0`, an empty `f64` sum is `-0.0`.
    times.iter().fold(0.0, |sum, time| sum + time) / f64::from(self.num_repeats)
  }

  /// Sample variance of `times`. A single repeat divides by one rather than
  /// zero.
  pub fn dispersion(&self, times: &[f64]) -> f64 {
    let average = self.average(times);
    let squares = times.iter().fold(0.0, |sum, time| sum + (time - average).powi(2));

    let denominator = self.num_repeats.saturating_sub(1).max(1);

    squares / f64::from(denominator)
  }

  /// Area averaged over every run of every process count.
  pub fn average_area(&self) -> f64 {
    let runs = PROCESS_COUNTS.len() as f64 * f64::from(self.num_repeats);

    self.total_area / runs
  }
}
