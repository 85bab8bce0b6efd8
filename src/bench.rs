use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};

use crate::{
  run::{self, Launch},
  stats::{Stats, PROCESS_COUNTS},
};

/// What to benchmark and how.
pub struct Config {
  /// Program to benchmark.
  pub program: PathBuf,
  /// Input file passed to the program on every run.
  pub input_file: PathBuf,
  /// Runs per process count.
  pub num_repeats: u32,
  pub launch: Launch,
  /// Upper bound on a single run, unbounded if `None`.
  pub timeout: Option<Duration>,
  /// Suppresses progress messages.
  pub quiet: bool,
}

pub struct Bench {
  config: Config,
  /// Statistics collected over every run.
  pub stats: Stats,
}

impl Bench {
  pub fn new(config: Config) -> Self {
    let stats = Stats::new(config.num_repeats);

    Self { config, stats }
  }

  /// Runs the program `num_repeats` times for each process count. The first
  /// failing run aborts the whole benchmark.
  pub fn bench(&mut self) -> Result<()> {
    for procs in PROCESS_COUNTS {
      self.progress(format_args!("benchmarking {:?} with {procs} processes", self.config.program));

      for repeat in 1..=self.config.num_repeats {
        self.progress(format_args!("  run {repeat}/{}", self.config.num_repeats));
        self.bench_once(procs)?;
      }
    }

    Ok(())
  }

  fn bench_once(&mut self, procs: u32) -> Result<()> {
    let Config {
      program,
      input_file,
      launch,
      timeout,
      ..
    } = &self.config;

    let mut cmd = run::command(*launch, program, input_file, procs);
    let stdout = run::run_program(&mut cmd, *timeout)
      .with_context(|| format!("{program:?} {input_file:?} with {procs} processes"))
      .context("Cannot run programm")?;

    let sample =
      run::parse_stdout(&stdout).with_context(|| format!("parse output of {program:?} with {procs} processes"))?;
    self.stats.record(procs, sample);

    Ok(())
  }

  fn progress(&self, message: std::fmt::Arguments) {
    if !self.config.quiet {
      eprintln!("{message}");
    }
  }
}
