use {
  crate::transport::{RemoteError, RemoteErrorKind},
  std::{fmt::Display, time::Duration},
};

/// Remote conditions that are expected to clear up on their own and are
/// worth retrying with the very same request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransientCondition {
  DeadlineExceeded,
  ConnectionReset,
  ExecutionTimeExceeded,
  CpuLimitExceeded,
  SerializationTimeExceeded,

  /// The node sits on a fork that does not contain the reference block.
  ReferenceBlockMismatch,
}

impl Display for TransientCondition {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      TransientCondition::DeadlineExceeded => "deadline exceeded",
      TransientCondition::ConnectionReset => "connection reset",
      TransientCondition::ExecutionTimeExceeded => "execution time exceeded",
      TransientCondition::CpuLimitExceeded => "cpu limit exceeded",
      TransientCondition::SerializationTimeExceeded => {
        "serialization time exceeded"
      }
      TransientCondition::ReferenceBlockMismatch => "reference block mismatch",
    })
  }
}

/// Chain exception names reported in structured error bodies.
const CHAIN_ERRORS: &[(&str, TransientCondition)] = &[
  ("deadline_exception", TransientCondition::ExecutionTimeExceeded),
  ("tx_cpu_usage_exceeded", TransientCondition::CpuLimitExceeded),
  (
    "abi_serialization_deadline_exception",
    TransientCondition::SerializationTimeExceeded,
  ),
  (
    "invalid_ref_block_exception",
    TransientCondition::ReferenceBlockMismatch,
  ),
];

/// Message fragments for transports that only report text. Checked in
/// order, so the generic `deadline` comes after the messages containing it.
const MESSAGE_FRAGMENTS: &[(&str, TransientCondition)] = &[
  ("connection reset by peer", TransientCondition::ConnectionReset),
  (
    "Transaction took too long",
    TransientCondition::ExecutionTimeExceeded,
  ),
  (
    "exceeded the current CPU usage limit",
    TransientCondition::CpuLimitExceeded,
  ),
  (
    "ABI serialization time has exceeded",
    TransientCondition::SerializationTimeExceeded,
  ),
  (
    "Transaction's reference block did not match",
    TransientCondition::ReferenceBlockMismatch,
  ),
  ("deadline", TransientCondition::DeadlineExceeded),
];

/// Decides whether a failed remote call is attempted again.
///
/// `max_attempts` counts the first attempt, so the default of 11 allows
/// ten retries. Attempts are separated by a fixed `sleep`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  pub max_attempts: u32,
  pub sleep: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 11,
      sleep: Duration::from_secs(2),
    }
  }
}

impl RetryPolicy {
  pub fn new(max_attempts: u32, sleep: Duration) -> Self {
    Self {
      max_attempts,
      sleep,
    }
  }

  /// Never fewer than one attempt.
  pub fn attempt_budget(&self) -> u32 {
    self.max_attempts.max(1)
  }

  pub fn classify(&self, error: &RemoteError) -> Option<TransientCondition> {
    let structured = match &error.kind {
      RemoteErrorKind::Timeout => Some(TransientCondition::DeadlineExceeded),
      RemoteErrorKind::ConnectionReset => {
        Some(TransientCondition::ConnectionReset)
      }
      RemoteErrorKind::Chain { name, .. } => CHAIN_ERRORS
        .iter()
        .find(|(known, _)| known == name)
        .map(|(_, condition)| *condition),
      _ => None,
    };

    structured.or_else(|| {
      MESSAGE_FRAGMENTS
        .iter()
        .find(|(fragment, _)| error.message.contains(fragment))
        .map(|(_, condition)| *condition)
    })
  }

  pub fn should_retry(&self, error: &RemoteError, attempts_remaining: u32) -> bool {
    attempts_remaining > 0 && self.classify(error).is_some()
  }
}
