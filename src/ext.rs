use std::{
  io::Read,
  process::{Child, Command, ExitStatus, Stdio},
  thread,
  time::Duration,
};

use anyhow::{Context, Result};
use wait_timeout::ChildExt as WaitExt;

#[extend::ext]
pub impl ExitStatus {
  fn check_success(&self) -> Result<()> {
    if !self.success() {
      anyhow::bail!("exited with non-zero status {self}");
    }

    Ok(())
  }
}

#[extend::ext]
pub impl Child {
  /// Returns an error if the exit status was non-zero. On timeout, the child is
  /// killed and `Ok(None)` is returned.
  fn check_success_timeout(&mut self, timeout: Duration) -> Result<Option<()>> {
    let Some(status) = self.wait_timeout(timeout).context("wait")? else {
      // Only the direct child is killed. Anything it spawned, such as the
      // workers started by `mpiexec`, is left to the launcher to clean up.
      self.kill().context("kill after timeout")?;
      self.wait().context("reap after timeout")?;

      return Ok(None);
    };

    status.check_success()?;

    Ok(Some(()))
  }
}

#[extend::ext]
pub impl Command {
  /// Runs the command, capturing only stdout, returning an error on non-zero
  /// exit. Stderr goes straight to ours.
  fn status_stdout(&mut self) -> Result<String> {
    let output = self.stdout(Stdio::piped()).stderr(Stdio::inherit()).output().context("output")?;
    output.status.check_success()?;

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
  }

  /// Like `status_stdout`, but returns `Ok(None)` if the command is still
  /// running after `timeout`.
  fn status_stdout_timeout(&mut self, timeout: Duration) -> Result<Option<String>> {
    let mut child = self.stdout(Stdio::piped()).stderr(Stdio::inherit()).spawn().context("spawn")?;
    let mut stdout = child.stdout.take().context("stdout")?;

    // Drained on a separate thread so a chatty child can't fill the pipe and
    // block before we're done waiting on it.
    let reader = thread::spawn(move || {
      let mut buf = Vec::new();
      stdout.read_to_end(&mut buf).map(|_| buf)
    });

    if child.check_success_timeout(timeout)?.is_none() {
      return Ok(None);
    }

    let buf = reader
      .join()
      .map_err(|_| anyhow::anyhow!("stdout reader panicked"))?
      .context("read")?;

    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
  }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
  use super::*;

  fn sh(script: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(script);

    cmd
  }

  #[test]
  fn captures_stdout() {
    let stdout = sh("echo hello; echo world").status_stdout().unwrap();
    assert_eq!(stdout, "hello\nworld\n");
  }

  #[test]
  fn non_zero_exit_is_an_error() {
    let err = sh("echo partial; exit 3").status_stdout().unwrap_err();
    assert!(err.to_string().contains("non-zero status"), "{err}");
  }

  #[test]
  fn captures_stdout_within_timeout() {
    let stdout = sh("echo fast").status_stdout_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(stdout.as_deref(), Some("fast\n"));
  }

  #[test]
  fn times_out() {
    let stdout = sh("exec sleep 10").status_stdout_timeout(Duration::from_millis(100)).unwrap();
    assert_eq!(stdout, None);
  }

  #[test]
  fn non_zero_exit_with_timeout_is_an_error() {
    assert!(sh("exit 1").status_stdout_timeout(Duration::from_secs(10)).is_err());
  }
}
