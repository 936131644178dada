//! Collaborators the client core talks to and the request and response
//! shapes of the chain API endpoints it uses.

use {
  ledger_primitives::{
    Checksum256,
    Name,
    SignedTransaction,
    TimePoint,
    Transaction,
  },
  serde::{Deserialize, Serialize},
  serde_json::{Map, Value},
  std::{fmt::Display, time::Duration},
  thiserror::Error,
};

/// A table row as returned by a JSON table read.
pub type Row = Map<String, Value>;

/// What went wrong with a remote call, as far as the transport can tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteErrorKind {
  /// The request did not complete within the transport deadline.
  Timeout,

  /// The peer dropped an established connection.
  ConnectionReset,

  /// The connection could not be established.
  Connect,

  /// The node rejected the request with a structured chain error.
  Chain { code: i64, name: String },

  /// A non-success HTTP status without a recognizable error body.
  Http { status: u16 },

  /// The response could not be decoded.
  Decode,

  /// No structure available, only the message text.
  Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteError {
  pub kind: RemoteErrorKind,
  pub message: String,
}

impl RemoteError {
  pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
    Self {
      kind,
      message: message.into(),
    }
  }

  /// An error carrying only a human readable message.
  pub fn other(message: impl Into<String>) -> Self {
    Self::new(RemoteErrorKind::Other, message)
  }

  pub fn chain(code: i64, name: impl Into<String>, message: impl Display) -> Self {
    Self::new(
      RemoteErrorKind::Chain {
        code,
        name: name.into(),
      },
      message.to_string(),
    )
  }

  /// Name of the chain exception, when the node reported one.
  pub fn chain_error_name(&self) -> Option<&str> {
    match &self.kind {
      RemoteErrorKind::Chain { name, .. } => Some(name),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Signing failed: {0}")]
pub struct SignerError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ABI encoding failed: {0}")]
pub struct AbiError(pub String);

/// Access to a chain node.
///
/// Implementations perform exactly one remote call per method invocation,
/// retries are layered on top by the executor.
pub trait Transport: Send + Sync {
  fn chain_info(&self) -> Result<ChainInfo, RemoteError>;

  fn push_transaction(
    &self,
    trx: &SignedTransaction,
  ) -> Result<PushResponse, RemoteError>;

  fn get_table_rows(
    &self,
    request: &TableRowsRequest,
  ) -> Result<TableRowPage, RemoteError>;

  fn get_table_by_scope(
    &self,
    request: &TableScopesRequest,
  ) -> Result<ScopePage, RemoteError>;

  /// Reads one block from the node's trace history.
  fn get_block(&self, block_num: u32) -> Result<Block, RemoteError>;
}

/// Produces signatures for transactions. Keys never enter the client.
pub trait Signer: Send + Sync {
  fn sign(&self, trx: &Transaction) -> Result<SignedTransaction, SignerError>;
}

/// Encodes structured action arguments using the contract ABI.
pub trait AbiEncoder: Send + Sync {
  fn encode(
    &self,
    account: Name,
    action: Name,
    args: &Value,
  ) -> Result<Vec<u8>, AbiError>;
}

/// Pause between retry attempts.
pub trait Sleep: Send + Sync {
  fn sleep(&self, duration: Duration);
}

/// Blocks the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
  fn sleep(&self, duration: Duration) {
    std::thread::sleep(duration);
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
  #[serde(default)]
  pub server_version: String,
  pub chain_id: Checksum256,
  pub head_block_num: u32,
  pub head_block_id: Checksum256,
  pub head_block_time: TimePoint,
  #[serde(default)]
  pub last_irreversible_block_num: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushResponse {
  pub transaction_id: Checksum256,
  #[serde(default)]
  pub processed: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRowsRequest {
  pub code: Name,
  pub scope: String,
  pub table: Name,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub lower_bound: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub upper_bound: String,
  pub limit: u32,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub index_position: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub key_type: String,
  #[serde(default)]
  pub reverse: bool,
  pub json: bool,
}

impl TableRowsRequest {
  pub fn new(code: Name, scope: impl Into<String>, table: Name) -> Self {
    Self {
      code,
      scope: scope.into(),
      table,
      limit: 10,
      json: true,
      ..Default::default()
    }
  }

  /// Reads through a secondary index, for example with a key built by
  /// [`ledger_primitives::compose`] and `key_type = "i128"`.
  pub fn by_index(
    mut self,
    index_position: impl Into<String>,
    key_type: impl Into<String>,
  ) -> Self {
    self.index_position = index_position.into();
    self.key_type = key_type.into();
    self
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRowPage {
  pub rows: Vec<Row>,
  #[serde(default)]
  pub more: bool,
  #[serde(default)]
  pub next_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableScopesRequest {
  pub code: Name,
  pub table: Name,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub lower_bound: String,
  #[serde(default, skip_serializing_if = "String::is_empty")]
  pub upper_bound: String,
  pub limit: u32,
  #[serde(default)]
  pub reverse: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableScope {
  pub code: Name,
  pub scope: String,
  pub table: Name,
  pub payer: Name,
  pub count: u32,
}

/// One page of a scope listing. `more` is the lower bound of the next
/// page, empty when the listing is exhausted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopePage {
  #[serde(rename = "rows")]
  pub scopes: Vec<TableScope>,
  #[serde(default)]
  pub more: String,
}

/// A block as recorded by the trace history plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
  pub id: Checksum256,
  #[serde(default)]
  pub previous_id: Checksum256,
  pub number: u32,
  pub timestamp: TimePoint,
  pub producer: Name,
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub transactions: Vec<BlockTransaction>,
}

impl Block {
  /// Up to `quantity` actions received by `account` under the name
  /// `action`, newest first.
  pub fn find_actions(
    &self,
    account: Name,
    action: Name,
    quantity: usize,
  ) -> Vec<&BlockAction> {
    self
      .transactions
      .iter()
      .rev()
      .flat_map(|trx| trx.actions.iter().rev())
      .filter(|act| act.is_action(account, action))
      .take(quantity)
      .collect()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTransaction {
  pub id: Checksum256,
  #[serde(default)]
  pub block_num: u32,
  #[serde(default)]
  pub block_time: TimePoint,
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub actions: Vec<BlockAction>,
}

/// An executed action. `params` holds the arguments decoded by the node,
/// `Null` when it had no ABI for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockAction {
  #[serde(default)]
  pub global_sequence: u64,
  pub receiver: Name,
  pub account: Name,
  pub action: Name,
  #[serde(default)]
  pub params: Value,
}

impl BlockAction {
  /// Matches on the receiver, so notifications delivered to `account`
  /// count as well.
  pub fn is_action(&self, account: Name, action: Name) -> bool {
    self.receiver == account && self.action == action
  }
}
