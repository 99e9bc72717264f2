//! External process execution with captured output.

use std::ffi::OsStr;
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::build::{CancelToken, Interrupted};

/// Errors raised while running an external command.
#[derive(Debug, Error)]
pub enum ExecError {
  #[error("failed to start {program}: {source}")]
  Spawn { program: String, source: std::io::Error },

  #[error("failed to read command output: {0}")]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Interrupted(Interrupted),
}

/// Exit status plus stdout and stderr interleaved in arrival order.
#[derive(Debug)]
pub struct CommandOutput {
  pub status: ExitStatus,
  pub log: String,
}

/// Run `program` to completion, capturing both output streams.
///
/// Each output line is logged at debug level as it arrives. If `cancel` is
/// cancelled or its deadline passes first, the child is killed and
/// [`ExecError::Interrupted`] is returned.
pub async fn run_captured<I, S>(program: &str, args: I, cancel: &CancelToken) -> Result<CommandOutput, ExecError>
where
  I: IntoIterator<Item = S>,
  S: AsRef<OsStr>,
{
  info!(program = %program, "running external command");

  let mut child = Command::new(program)
    .args(args)
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true)
    .spawn()
    .map_err(|e| ExecError::Spawn {
      program: program.to_string(),
      source: e,
    })?;

  let stdout = child
    .stdout
    .take()
    .ok_or_else(|| std::io::Error::other("stdout was not captured"))?;
  let stderr = child
    .stderr
    .take()
    .ok_or_else(|| std::io::Error::other("stderr was not captured"))?;

  let capture = async {
    let mut out = BufReader::new(stdout);
    let mut err = BufReader::new(stderr);
    let (mut out_buf, mut err_buf) = (Vec::new(), Vec::new());
    let mut log = String::new();
    let (mut out_done, mut err_done) = (false, false);

    while !(out_done && err_done) {
      // Partial reads stay in the buffers, so losing a race drops no bytes.
      let (read, from_out) = tokio::select! {
        read = out.read_until(b'\n', &mut out_buf), if !out_done => (read?, true),
        read = err.read_until(b'\n', &mut err_buf), if !err_done => (read?, false),
      };
      let (buf, done) = if from_out {
        (&mut out_buf, &mut out_done)
      } else {
        (&mut err_buf, &mut err_done)
      };
      *done = read == 0;

      if let Some(line) = take_line(buf) {
        debug!(program = %program, "{}", line);
        log.push_str(&line);
        log.push('\n');
      }
    }

    let status = child.wait().await?;
    Ok::<_, std::io::Error>(CommandOutput { status, log })
  };

  let outcome = tokio::select! {
    result = capture => Ok(result?),
    reason = cancel.interrupted() => Err(reason),
  };

  match outcome {
    Ok(output) => {
      debug!(program = %program, status = %output.status, "command exited");
      Ok(output)
    }
    Err(reason) => {
      warn!(program = %program, reason = %reason, "killing external command");
      if let Err(e) = child.kill().await {
        warn!(program = %program, error = %e, "failed to kill external command");
      }
      Err(ExecError::Interrupted(reason))
    }
  }
}

/// Drain one buffered line, without its terminator and with invalid UTF-8
/// replaced.
fn take_line(buf: &mut Vec<u8>) -> Option<String> {
  if buf.is_empty() {
    return None;
  }
  let mut end = buf.len();
  if buf[end - 1] == b'\n' {
    end -= 1;
    if end > 0 && buf[end - 1] == b'\r' {
      end -= 1;
    }
  }
  let line = String::from_utf8_lossy(&buf[..end]).into_owned();
  buf.clear();
  Some(line)
}
