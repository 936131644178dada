use {
  crate::{executor::RpcExecutor, transport::BlockAction, Error},
  ledger_primitives::ToName,
  tracing::debug,
};

/// Blocks above the reported head that are read as well, they may have
/// been produced between the head lookup and the scan.
pub const DEFAULT_HEAD_LOOKAHEAD: u32 = 10;

const MISSING_TRACE: &str = "block trace missing";

/// Finds recent actions by walking the trace history backwards from the
/// chain head.
///
/// Blocks the node has no trace for are skipped. Every other failure ends
/// the scan.
pub struct ActionHistory<'a> {
  executor: &'a RpcExecutor,
  lookahead: u32,
  lowest_block: u32,
}

impl<'a> ActionHistory<'a> {
  pub fn new(executor: &'a RpcExecutor) -> Self {
    Self {
      executor,
      lookahead: DEFAULT_HEAD_LOOKAHEAD,
      lowest_block: 1,
    }
  }

  pub fn with_lookahead(mut self, lookahead: u32) -> Self {
    self.lookahead = lookahead;
    self
  }

  /// Oldest block the scan reads, inclusive.
  pub fn with_lowest_block(mut self, block_num: u32) -> Self {
    self.lowest_block = block_num;
    self
  }

  /// Up to `quantity` actions received by `account` under the name
  /// `action`, newest first.
  pub fn find_actions(
    &self,
    account: impl ToName,
    action: impl ToName,
    quantity: usize,
  ) -> Result<Vec<BlockAction>, Error> {
    let account = account.to_name()?;
    let action = action.to_name()?;
    if quantity == 0 {
      return Ok(vec![]);
    }

    let head = self.executor.chain_info()?.head_block_num;
    let top = head.saturating_add(self.lookahead);
    let mut found = Vec::new();

    for block_num in (self.lowest_block..=top).rev() {
      let block = match self.executor.fetch_block(block_num) {
        Ok(block) => block,
        Err(error) if is_missing_trace(&error) => {
          debug!("no trace for block {block_num}, skipping");
          continue;
        }
        Err(error) => return Err(error),
      };

      let remaining = quantity - found.len();
      found.extend(
        block
          .find_actions(account, action, remaining)
          .into_iter()
          .cloned(),
      );
      if found.len() >= quantity {
        break;
      }
    }

    debug!(
      "found {} {account}::{action} actions below block {top}",
      found.len()
    );
    Ok(found)
  }

  /// The action at position `pos` counting back from the newest, if the
  /// history reaches that far.
  pub fn action_at(
    &self,
    account: impl ToName,
    action: impl ToName,
    pos: usize,
  ) -> Result<Option<BlockAction>, Error> {
    let mut found =
      self.find_actions(account, action, pos.saturating_add(1))?;
    Ok(if found.len() > pos {
      Some(found.swap_remove(pos))
    } else {
      None
    })
  }
}

fn is_missing_trace(error: &Error) -> bool {
  matches!(error, Error::Fatal { source, .. }
    if source.message.contains(MISSING_TRACE))
}
