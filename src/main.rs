mod bench;
mod ext;
mod format;
mod run;
mod stats;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;

use self::{
  bench::{Bench, Config},
  run::Launch,
};

/// Benchmarks a program under `mpiexec` with 1, 2, 4 and 8 processes.
#[derive(Parser)]
#[command(version)]
struct Args {
  /// Program to benchmark.
  program: PathBuf,
  /// Input file passed to the program.
  input_file: PathBuf,
  /// How many times the program is run for each process count.
  #[arg(value_parser = clap::value_parser!(u32).range(1..))]
  num_repeats: u32,
  /// How the program is launched.
  #[arg(long, value_enum, default_value_t = Launch::Mpi)]
  launch: Launch,
  /// Abort if a single run takes longer than this many seconds.
  #[arg(long, value_name = "SECONDS")]
  timeout: Option<u64>,
  /// Do not print progress to stderr.
  #[arg(short, long)]
  quiet: bool,
}

fn main() -> Result<()> {
  let args = Args::parse();

  let mut bench = Bench::new(Config {
    program: args.program,
    input_file: args.input_file,
    num_repeats: args.num_repeats,
    launch: args.launch,
    timeout: args.timeout.map(Duration::from_secs),
    quiet: args.quiet,
  });
  bench.bench()?;

  print!("{}", format::format(&bench.stats).context("format")?);

  Ok(())
}
