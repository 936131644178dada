use {
  crate::transport::{AbiError, RemoteError, SignerError},
  ledger_primitives::{Name, NameError, PermissionLevelError},
  thiserror::Error,
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("{operation} failed after {attempts} attempts: {last}")]
  ExhaustedRetries {
    operation: &'static str,
    attempts: u32,
    #[source]
    last: RemoteError,
  },

  #[error("{operation} failed: {source}")]
  Fatal {
    operation: &'static str,
    source: RemoteError,
  },

  #[error(transparent)]
  Signing(#[from] SignerError),

  #[error(transparent)]
  Abi(#[from] AbiError),

  #[error("No ABI encoder configured to encode {account}::{action} arguments")]
  NoAbiEncoder { account: Name, action: Name },

  #[error("Table row has no key field {field:?}")]
  MissingKeyField { field: String },

  #[error("Failed decoding table rows: {0}")]
  Deserialize(#[from] serde_json::Error),

  #[error(transparent)]
  Name(#[from] NameError),

  #[error(transparent)]
  PermissionLevel(#[from] PermissionLevelError),
}

impl Error {
  /// The remote failure behind this error, if it came from the node.
  pub fn remote(&self) -> Option<&RemoteError> {
    match self {
      Error::ExhaustedRetries { last, .. } => Some(last),
      Error::Fatal { source, .. } => Some(source),
      _ => None,
    }
  }
}
