use std::{path::Path, process::Command, time::Duration};

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::{ext::CommandExt, stats::Sample};

/// Launcher used to start the program with several processes.
pub const MPI_LAUNCHER: &str = "mpiexec";
/// Number of dots every run of the program generates.
pub const NUM_DOTS: &str = "1000000";

const CIRCLES_MARKER: &str = "Circles";
const ELAPSED_MARKER: &str = "Elapsed";

/// How the benchmarked program is started.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Launch {
  /// `mpiexec -np <procs> <program> <input> 1000000`
  Mpi,
  /// `<program> <input> 1000000 <procs>`, for builds that spawn their own
  /// threads.
  Direct,
}

/// Builds the command for a single run of `program` with `procs` processes.
pub fn command(launch: Launch, program: &Path, input_file: &Path, procs: u32) -> Command {
  match launch {
    Launch::Mpi => {
      let mut cmd = Command::new(MPI_LAUNCHER);
      cmd.arg("-np").arg(procs.to_string()).arg(program).arg(input_file).arg(NUM_DOTS);

      cmd
    }
    Launch::Direct => {
      let mut cmd = Command::new(program);
      cmd.arg(input_file).arg(NUM_DOTS).arg(procs.to_string());

      cmd
    }
  }
}

/// Runs `cmd` to completion and returns its stdout.
///
/// # Errors
///
/// This will return an error if:
/// - the command could not be spawned.
/// - the exit status is non-zero.
/// - `timeout` is set and the command ran for longer.
pub fn run_program(cmd: &mut Command, timeout: Option<Duration>) -> Result<String> {
  match timeout {
    None => cmd.status_stdout(),
    Some(timeout) => cmd
      .status_stdout_timeout(timeout)?
      .with_context(|| format!("timed out after {}s", timeout.as_secs_f64())),
  }
}

/// Collects every `Circles` and `Elapsed` value in a run's stdout. A line
/// containing both markers counts towards both.
pub fn parse_stdout(stdout: &str) -> Result<Sample> {
  let mut sample = Sample::default();

  for line in stdout.lines() {
    if line.contains(CIRCLES_MARKER) {
      sample.areas.push(last_number(line)?);
    }
    if line.contains(ELAPSED_MARKER) {
      sample.elapsed.push(last_number(line)?);
    }
  }

  Ok(sample)
}

fn last_number(line: &str) -> Result<f64> {
  let token = line.split_whitespace().last().with_context(|| format!("empty line {line:?}"))?;

  token.parse().with_context(|| format!("invalid number {token:?} in line {line:?}"))
}

#[cfg(test)]
mod tests {
  use std::ffi::OsStr;

  use super::*;

  fn args(cmd: &Command) -> Vec<&OsStr> {
    cmd.get_args().collect()
  }

  #[test]
  fn mpi_command() {
    let cmd = command(Launch::Mpi, Path::new("./parallel"), Path::new("circles.txt"), 4);

    assert_eq!(cmd.get_program(), "mpiexec");
    assert_eq!(args(&cmd), ["-np", "4", "./parallel", "circles.txt", "1000000"]);
  }

  #[test]
  fn direct_command() {
    let cmd = command(Launch::Direct, Path::new("./parallel"), Path::new("circles.txt"), 8);

    assert_eq!(cmd.get_program(), "./parallel");
    assert_eq!(args(&cmd), ["circles.txt", "1000000", "8"]);
  }

  #[test]
  fn parses_program_output() {
    let stdout = "\
Total generated dots: 1000000
Total dots in: 785398
Square area: 4
Circles area: 3.14159
Elapsed time: 0.25
";

    let sample = parse_stdout(stdout).unwrap();
    assert_eq!(sample, Sample { areas: vec![3.14159], elapsed: vec![0.25] });
  }

  #[test]
  fn line_with_both_markers() {
    let sample = parse_stdout("Elapsed Circles 5.0\n").unwrap();
    assert_eq!(sample, Sample { areas: vec![5.0], elapsed: vec![5.0] });
  }

  #[test]
  fn every_matching_line_counts() {
    let sample = parse_stdout("Elapsed 1\nCircles 2\nElapsed 3\nCircles 4\n").unwrap();
    assert_eq!(sample, Sample { areas: vec![2.0, 4.0], elapsed: vec![1.0, 3.0] });
  }

  #[test]
  fn ignores_other_lines() {
    assert_eq!(parse_stdout("hello\n\nsquare 12\n").unwrap(), Sample::default());
  }

  #[test]
  fn invalid_number_is_an_error() {
    let err = parse_stdout("Elapsed time: soon\n").unwrap_err();
    assert!(err.to_string().contains("\"soon\""), "{err}");
  }

  #[test]
  fn marker_as_last_token_is_an_error() {
    assert!(parse_stdout("Circles\n").is_err());
  }
}
