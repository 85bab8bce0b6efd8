use std::fmt::Write;

use anyhow::Result;

use crate::stats::Stats;

/// Formats one line per process count followed by the average area.
pub fn format(stats: &Stats) -> Result<String> {
  let mut report = String::new();

  for (procs, times) in &stats.times {
    let average = stats.average(times);
    let dispersion = stats.dispersion(times);

    writeln!(
      report,
      "{procs} threads: average = {}, dispersion = {}",
      float(average),
      float(dispersion)
    )?;
  }

  writeln!(report, "Average area = {}", float(stats.average_area()))?;

  Ok(report)
}

/// Shortest round-trip representation, with a signed two digit exponent
/// (`1e-05`, `1.5e+16`) when one is needed.
fn float(value: f64) -> String {
  if value.is_nan() {
    return "nan".to_string();
  }

  let debug = format!("{value:?}");
  let Some((mantissa, exponent)) = debug.split_once('e') else {
    return debug;
  };

  let (sign, digits) = match exponent.strip_prefix('-') {
    Some(digits) => ('-', digits),
    None => ('+', exponent),
  };

  format!("{mantissa}e{sign}{digits:0>2}")
}
