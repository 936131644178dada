use {
  crate::{
    retry::RetryPolicy,
    transport::{
      Block,
      ChainInfo,
      PushResponse,
      RemoteError,
      ScopePage,
      Signer,
      Sleep,
      TableRowPage,
      TableRowsRequest,
      TableScopesRequest,
      ThreadSleep,
      Transport,
    },
    Error,
  },
  ledger_primitives::Transaction,
  std::sync::Arc,
  tracing::{debug, warn},
};

/// Runs single remote calls under a [`RetryPolicy`].
///
/// Transient failures are retried with the same request after a fixed
/// pause, anything else is returned immediately. The executor holds no
/// mutable state and can be shared between threads.
#[derive(Clone)]
pub struct RpcExecutor {
  transport: Arc<dyn Transport>,
  signer: Arc<dyn Signer>,
  sleep: Arc<dyn Sleep>,
  policy: RetryPolicy,
}

impl RpcExecutor {
  pub fn new(
    transport: Arc<dyn Transport>,
    signer: Arc<dyn Signer>,
    policy: RetryPolicy,
  ) -> Self {
    Self::with_sleep(transport, signer, Arc::new(ThreadSleep), policy)
  }

  pub fn with_sleep(
    transport: Arc<dyn Transport>,
    signer: Arc<dyn Signer>,
    sleep: Arc<dyn Sleep>,
    policy: RetryPolicy,
  ) -> Self {
    Self {
      transport,
      signer,
      sleep,
      policy,
    }
  }

  pub fn policy(&self) -> &RetryPolicy {
    &self.policy
  }

  /// Signs the transaction once and pushes it.
  ///
  /// Retries resubmit the same signed transaction. After a reference block
  /// mismatch the node may keep rejecting it until it expires, rebuilding
  /// is left to the caller.
  pub fn submit(&self, trx: &Transaction) -> Result<PushResponse, Error> {
    let signed = self.signer.sign(trx)?;
    let response = self.run("push_transaction", || {
      self.transport.push_transaction(&signed)
    })?;
    debug!("transaction {} accepted", response.transaction_id);
    Ok(response)
  }

  /// Reads one page of table rows, always in JSON form.
  pub fn fetch_rows(
    &self,
    request: &TableRowsRequest,
  ) -> Result<TableRowPage, Error> {
    let request = TableRowsRequest {
      json: true,
      ..request.clone()
    };
    self.run("get_table_rows", || self.transport.get_table_rows(&request))
  }

  pub fn fetch_scopes(
    &self,
    request: &TableScopesRequest,
  ) -> Result<ScopePage, Error> {
    self.run("get_table_by_scope", || {
      self.transport.get_table_by_scope(request)
    })
  }

  pub fn chain_info(&self) -> Result<ChainInfo, Error> {
    self.run("get_info", || self.transport.chain_info())
  }

  pub fn fetch_block(&self, block_num: u32) -> Result<Block, Error> {
    self.run("get_block", || self.transport.get_block(block_num))
  }

  fn run<T>(
    &self,
    operation: &'static str,
    mut call: impl FnMut() -> Result<T, RemoteError>,
  ) -> Result<T, Error> {
    let budget = self.policy.attempt_budget();
    let mut attempt = 1;
    loop {
      let error = match call() {
        Ok(value) => return Ok(value),
        Err(error) => error,
      };

      let condition = match self.policy.classify(&error) {
        Some(condition) => condition,
        None => {
          return Err(Error::Fatal {
            operation,
            source: error,
          })
        }
      };

      if !self.policy.should_retry(&error, budget - attempt) {
        return Err(Error::ExhaustedRetries {
          operation,
          attempts: attempt,
          last: error,
        });
      }

      warn!(
        "{operation} attempt {attempt}/{budget} hit {condition}, retrying \
         in {:?}: {error}",
        self.policy.sleep
      );
      self.sleep.sleep(self.policy.sleep);
      attempt += 1;
    }
  }
}
