//! Cooperative cancellation for a single build.
//!
//! A [`CancelToken`] combines a shared [`CancellationToken`] with an optional
//! deadline. Long-running steps call [`CancelToken::check`] between units of
//! work and race [`CancelToken::interrupted`] against external process waits.

use std::time::{Duration, Instant};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Why a build stopped before finishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interrupted {
  #[error("build cancelled")]
  Cancelled,

  #[error("build deadline exceeded")]
  DeadlineExceeded,
}

/// Cancellation handle plus optional deadline, cheap to clone and share.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
  token: CancellationToken,
  deadline: Option<Instant>,
}

impl CancelToken {
  pub fn new() -> Self {
    Self::default()
  }

  /// A copy of this token that additionally expires `timeout` from now.
  ///
  /// Cancellation stays shared with `self`.
  pub fn with_timeout(&self, timeout: Duration) -> Self {
    Self {
      token: self.token.clone(),
      deadline: Some(Instant::now() + timeout),
    }
  }

  pub fn cancel(&self) {
    self.token.cancel();
  }

  pub fn is_cancelled(&self) -> bool {
    self.token.is_cancelled()
  }

  pub fn deadline(&self) -> Option<Instant> {
    self.deadline
  }

  /// Time left before the deadline, if one is set.
  pub fn remaining(&self) -> Option<Duration> {
    self.deadline.map(|d| d.saturating_duration_since(Instant::now()))
  }

  /// Fail if the token was cancelled or its deadline has passed.
  pub fn check(&self) -> Result<(), Interrupted> {
    if self.is_cancelled() {
      return Err(Interrupted::Cancelled);
    }
    if self.remaining().is_some_and(|r| r.is_zero()) {
      return Err(Interrupted::DeadlineExceeded);
    }
    Ok(())
  }

  /// Resolve once the token is cancelled or its deadline passes.
  pub async fn interrupted(&self) -> Interrupted {
    match self.deadline {
      Some(deadline) => {
        tokio::select! {
          biased;
          _ = self.token.cancelled() => Interrupted::Cancelled,
          _ = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => Interrupted::DeadlineExceeded,
        }
      }
      None => {
        self.token.cancelled().await;
        Interrupted::Cancelled
      }
    }
  }
}
