#![allow(dead_code)]

use {
  ledger_client_sdk::{
    Block,
    BlockAction,
    BlockTransaction,
    ChainInfo,
    PushResponse,
    RemoteError,
    RemoteErrorKind,
    RetryPolicy,
    Row,
    RpcExecutor,
    ScopePage,
    Signer,
    SignerError,
    Sleep,
    TableRowPage,
    TableRowsRequest,
    TableScope,
    TableScopesRequest,
    Transport,
  },
  ledger_primitives::{
    Checksum256,
    Name,
    SignedTransaction,
    TimePoint,
    Transaction,
  },
  serde_json::{json, Value},
  std::{
    collections::{BTreeMap, VecDeque},
    sync::{
      atomic::{AtomicUsize, Ordering},
      Arc,
      Mutex,
    },
    time::Duration,
  },
};

pub const CHAIN_ID: &str =
  "1eaa0824707c8c16bd25145493bf062aecddfeb56c736f6ba6397f3195f33c9f";
pub const HEAD_BLOCK_ID: &str =
  "0001e2406fbd4bd8aabbccdd1122334455667788990011223344556677889900";
pub const HEAD_BLOCK_NUM: u32 = 0x0001_e240;
pub const HEAD_BLOCK_TIME: &str = "2021-06-01T12:00:00.500";

pub fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
}

pub fn name(s: &str) -> Name {
  s.parse().unwrap()
}

pub fn id_row(id: u64) -> Row {
  match json!({ "id": id, "value": format!("row-{id}") }) {
    Value::Object(row) => row,
    _ => unreachable!(),
  }
}

pub fn ids(rows: &[Row]) -> Vec<u64> {
  rows.iter().map(|row| row["id"].as_u64().unwrap()).collect()
}

/// In-memory chain node.
///
/// Tables are keyed by the numeric `id` column of their rows and honor an
/// inclusive lower bound, like real nodes do. Every call is counted and
/// failures can be scripted per endpoint.
#[derive(Default)]
pub struct SimulatedChain {
  scopes: BTreeMap<String, Vec<Row>>,
  blocks: BTreeMap<u32, Block>,

  pub push_outcomes: Mutex<VecDeque<Result<PushResponse, RemoteError>>>,
  pub row_failures: Mutex<VecDeque<RemoteError>>,
  pub scope_failures: Mutex<VecDeque<RemoteError>>,
  pub info_failures: Mutex<VecDeque<RemoteError>>,
  pub block_failures: Mutex<VecDeque<RemoteError>>,

  pub pushed: Mutex<Vec<SignedTransaction>>,
  pub row_requests: Mutex<Vec<TableRowsRequest>>,
  pub scope_requests: Mutex<Vec<TableScopesRequest>>,
  pub block_requests: Mutex<Vec<u32>>,

  pub info_calls: AtomicUsize,
  pub push_calls: AtomicUsize,
  pub row_calls: AtomicUsize,
  pub scope_calls: AtomicUsize,
}

impl SimulatedChain {
  /// A single scope named `scope` holding rows with the given ids.
  pub fn with_rows(scope: &str, ids: impl IntoIterator<Item = u64>) -> Self {
    Self::default().scope(scope, ids)
  }

  pub fn scope(mut self, scope: &str, ids: impl IntoIterator<Item = u64>) -> Self {
    let mut rows: Vec<Row> = ids.into_iter().map(id_row).collect();
    rows.sort_by_key(|row| row["id"].as_u64());
    self.scopes.insert(scope.to_owned(), rows);
    self
  }

  /// A traced block holding one transaction per entry of `transactions`.
  pub fn block(
    mut self,
    number: u32,
    transactions: Vec<Vec<BlockAction>>,
  ) -> Self {
    let time: TimePoint = HEAD_BLOCK_TIME.parse().unwrap();
    let transactions = transactions
      .into_iter()
      .enumerate()
      .map(|(i, actions)| BlockTransaction {
        id: Checksum256::from_bytes([i as u8; 32]),
        block_num: number,
        block_time: time,
        status: "executed".into(),
        actions,
      })
      .collect();
    self.blocks.insert(number, Block {
      id: Checksum256::from_bytes([number as u8; 32]),
      previous_id: Checksum256::default(),
      number,
      timestamp: time,
      producer: name("eosio"),
      status: "irreversible".into(),
      transactions,
    });
    self
  }

  pub fn fail_next_block_read(&self, error: RemoteError) {
    self.block_failures.lock().unwrap().push_back(error);
  }

  pub fn script_push(&self, outcome: Result<PushResponse, RemoteError>) {
    self.push_outcomes.lock().unwrap().push_back(outcome);
  }

  pub fn fail_next_row_read(&self, error: RemoteError) {
    self.row_failures.lock().unwrap().push_back(error);
  }

  pub fn fail_next_scope_read(&self, error: RemoteError) {
    self.scope_failures.lock().unwrap().push_back(error);
  }

  pub fn fail_next_info(&self, error: RemoteError) {
    self.info_failures.lock().unwrap().push_back(error);
  }

  pub fn calls(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
  }

  pub fn row_requests(&self) -> Vec<(String, u32)> {
    self
      .row_requests
      .lock()
      .unwrap()
      .iter()
      .map(|r| (r.lower_bound.clone(), r.limit))
      .collect()
  }
}

/// An action received by `receiver`, tagged with `sequence`.
pub fn block_action(
  receiver: &str,
  action: &str,
  sequence: u64,
) -> BlockAction {
  BlockAction {
    global_sequence: sequence,
    receiver: name(receiver),
    account: name(receiver),
    action: name(action),
    params: json!({ "sequence": sequence }),
  }
}

pub fn accepted(id_byte: u8) -> PushResponse {
  PushResponse {
    transaction_id: Checksum256::from_bytes([id_byte; 32]),
    processed: json!({ "receipt": { "status": "executed" } }),
  }
}

impl Transport for SimulatedChain {
  fn chain_info(&self) -> Result<ChainInfo, RemoteError> {
    self.info_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(error) = self.info_failures.lock().unwrap().pop_front() {
      return Err(error);
    }
    Ok(ChainInfo {
      server_version: "simulated".into(),
      chain_id: CHAIN_ID.parse().unwrap(),
      head_block_num: HEAD_BLOCK_NUM,
      head_block_id: HEAD_BLOCK_ID.parse().unwrap(),
      head_block_time: HEAD_BLOCK_TIME.parse::<TimePoint>().unwrap(),
      last_irreversible_block_num: HEAD_BLOCK_NUM - 330,
    })
  }

  fn push_transaction(
    &self,
    trx: &SignedTransaction,
  ) -> Result<PushResponse, RemoteError> {
    self.push_calls.fetch_add(1, Ordering::SeqCst);
    self.pushed.lock().unwrap().push(trx.clone());
    self
      .push_outcomes
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or_else(|| Ok(accepted(0xab)))
  }

  fn get_table_rows(
    &self,
    request: &TableRowsRequest,
  ) -> Result<TableRowPage, RemoteError> {
    self.row_calls.fetch_add(1, Ordering::SeqCst);
    self.row_requests.lock().unwrap().push(request.clone());
    if let Some(error) = self.row_failures.lock().unwrap().pop_front() {
      return Err(error);
    }
    assert!(request.json, "table reads must ask for json rows");

    let lower: u64 = if request.lower_bound.is_empty() {
      0
    } else {
      request.lower_bound.parse().expect("numeric lower bound")
    };
    let matching: Vec<&Row> = self
      .scopes
      .get(&request.scope)
      .map(|rows| {
        rows
          .iter()
          .filter(|row| row["id"].as_u64().unwrap() >= lower)
          .collect()
      })
      .unwrap_or_default();

    let limit = request.limit as usize;
    let more = matching.len() > limit;
    let next_key = matching
      .get(limit)
      .map(|row| row["id"].to_string())
      .unwrap_or_default();

    Ok(TableRowPage {
      rows: matching.into_iter().take(limit).cloned().collect(),
      more,
      next_key,
    })
  }

  fn get_table_by_scope(
    &self,
    request: &TableScopesRequest,
  ) -> Result<ScopePage, RemoteError> {
    self.scope_calls.fetch_add(1, Ordering::SeqCst);
    self.scope_requests.lock().unwrap().push(request.clone());
    if let Some(error) = self.scope_failures.lock().unwrap().pop_front() {
      return Err(error);
    }

    let mut names = self
      .scopes
      .iter()
      .filter(|(_, rows)| !rows.is_empty())
      .map(|(scope, rows)| (scope.clone(), rows.len()))
      .filter(|(scope, _)| scope.as_str() >= request.lower_bound.as_str());

    let scopes: Vec<TableScope> = names
      .by_ref()
      .take(request.limit as usize)
      .map(|(scope, count)| TableScope {
        code: request.code,
        scope: scope.clone(),
        table: request.table,
        payer: scope.parse().unwrap_or_default(),
        count: count as u32,
      })
      .collect();

    Ok(ScopePage {
      scopes,
      more: names.next().map(|(scope, _)| scope).unwrap_or_default(),
    })
  }

  fn get_block(&self, block_num: u32) -> Result<Block, RemoteError> {
    self.block_requests.lock().unwrap().push(block_num);
    if let Some(error) = self.block_failures.lock().unwrap().pop_front() {
      return Err(error);
    }
    self.blocks.get(&block_num).cloned().ok_or_else(|| {
      RemoteError::new(
        RemoteErrorKind::Http { status: 404 },
        "HTTP 404: Trace API: block trace missing",
      )
    })
  }
}

/// Records requested pauses instead of sleeping.
#[derive(Default)]
pub struct RecordingSleep {
  pub pauses: Mutex<Vec<Duration>>,
}

impl RecordingSleep {
  pub fn count(&self) -> usize {
    self.pauses.lock().unwrap().len()
  }
}

impl Sleep for RecordingSleep {
  fn sleep(&self, duration: Duration) {
    self.pauses.lock().unwrap().push(duration);
  }
}

#[derive(Default)]
pub struct StubSigner {
  pub calls: AtomicUsize,
}

impl Signer for StubSigner {
  fn sign(&self, trx: &Transaction) -> Result<SignedTransaction, SignerError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    let digest_len = trx.signing_payload().len();
    Ok(SignedTransaction::new(trx.clone(), vec![format!(
      "SIG_K1_stub_{digest_len}"
    )]))
  }
}

pub struct Harness {
  pub chain: Arc<SimulatedChain>,
  pub sleep: Arc<RecordingSleep>,
  pub signer: Arc<StubSigner>,
  pub executor: RpcExecutor,
}

impl Harness {
  pub fn new(chain: SimulatedChain, max_attempts: u32) -> Self {
    init_tracing();
    let chain = Arc::new(chain);
    let sleep = Arc::new(RecordingSleep::default());
    let signer = Arc::new(StubSigner::default());
    let executor = RpcExecutor::with_sleep(
      chain.clone(),
      signer.clone(),
      sleep.clone(),
      RetryPolicy::new(max_attempts, Duration::from_secs(2)),
    );
    Self {
      chain,
      sleep,
      signer,
      executor,
    }
  }
}
