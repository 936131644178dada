use {
  common::{block_action, name, Harness, SimulatedChain, HEAD_BLOCK_NUM},
  ledger_client_sdk::{
    ActionHistory,
    BlockAction,
    Error,
    RemoteError,
    RemoteErrorKind,
  },
};

mod common;

const HEAD: u32 = HEAD_BLOCK_NUM;

/// Votes in three blocks below the head, with noise around them.
fn voting_chain() -> SimulatedChain {
  SimulatedChain::default()
    .block(HEAD, vec![
      vec![block_action("dao", "vote", 5), block_action("dao", "close", 50)],
      vec![block_action("dao", "vote", 6)],
    ])
    .block(HEAD - 2, vec![vec![
      block_action("dao", "vote", 3),
      block_action("alice", "vote", 30),
    ]])
    .block(HEAD - 4, vec![vec![block_action("dao", "vote", 1)]])
}

fn sequences(actions: &[BlockAction]) -> Vec<u64> {
  actions.iter().map(|a| a.global_sequence).collect()
}

#[test]
fn finds_newest_actions_first() -> anyhow::Result<()> {
  let harness = Harness::new(voting_chain(), 11);
  let history = ActionHistory::new(&harness.executor).with_lowest_block(1);

  let actions = history.find_actions("dao", "vote", 3)?;

  assert_eq!(sequences(&actions), vec![6, 5, 3]);
  assert_eq!(actions[0].params["sequence"], 6);
  let requests = harness.chain.block_requests.lock().unwrap();
  assert_eq!(requests.first(), Some(&(HEAD + 10)));
  assert_eq!(requests.last(), Some(&(HEAD - 2)));
  assert_eq!(requests.len(), 13);
  assert_eq!(harness.sleep.count(), 0);
  Ok(())
}

#[test]
fn short_history_ends_at_the_lowest_block() -> anyhow::Result<()> {
  let harness = Harness::new(voting_chain(), 11);
  let history = ActionHistory::new(&harness.executor)
    .with_lookahead(0)
    .with_lowest_block(HEAD - 6);

  let actions = history.find_actions(name("dao"), name("vote"), 10)?;

  assert_eq!(sequences(&actions), vec![6, 5, 3, 1]);
  let requests = harness.chain.block_requests.lock().unwrap();
  assert_eq!(*requests, (HEAD - 6..=HEAD).rev().collect::<Vec<_>>());
  Ok(())
}

#[test]
fn matches_on_the_receiver() -> anyhow::Result<()> {
  let harness = Harness::new(voting_chain(), 11);
  let history =
    ActionHistory::new(&harness.executor).with_lowest_block(HEAD - 6);

  let actions = history.find_actions("alice", "vote", 5)?;

  assert_eq!(sequences(&actions), vec![30]);
  assert!(history.find_actions("bob", "vote", 5)?.is_empty());
  Ok(())
}

#[test]
fn action_at_counts_back_from_the_newest() -> anyhow::Result<()> {
  let harness = Harness::new(voting_chain(), 11);
  let history =
    ActionHistory::new(&harness.executor).with_lowest_block(HEAD - 6);

  let newest = history.action_at("dao", "vote", 0)?;
  assert_eq!(newest.map(|a| a.global_sequence), Some(6));

  let third = history.action_at("dao", "vote", 2)?;
  assert_eq!(third.map(|a| a.global_sequence), Some(3));

  assert_eq!(history.action_at("dao", "vote", 4)?, None);
  Ok(())
}

#[test]
fn zero_quantity_reads_nothing() -> anyhow::Result<()> {
  let harness = Harness::new(voting_chain(), 11);
  let history = ActionHistory::new(&harness.executor);

  assert!(history.find_actions("dao", "vote", 0)?.is_empty());
  assert_eq!(SimulatedChain::calls(&harness.chain.info_calls), 0);
  assert!(harness.chain.block_requests.lock().unwrap().is_empty());
  Ok(())
}

#[test]
fn transient_block_reads_are_retried() -> anyhow::Result<()> {
  let harness = Harness::new(voting_chain(), 11);
  harness.chain.fail_next_block_read(RemoteError::new(
    RemoteErrorKind::Timeout,
    "operation timed out",
  ));
  let history = ActionHistory::new(&harness.executor)
    .with_lookahead(0)
    .with_lowest_block(HEAD - 6);

  let actions = history.find_actions("dao", "vote", 1)?;

  assert_eq!(sequences(&actions), vec![6]);
  assert_eq!(harness.sleep.count(), 1);
  assert_eq!(*harness.chain.block_requests.lock().unwrap(), vec![HEAD, HEAD]);
  Ok(())
}

#[test]
fn other_block_failures_end_the_scan() {
  let harness = Harness::new(voting_chain(), 11);
  harness.chain.fail_next_block_read(RemoteError::chain(
    3010000,
    "chain_type_exception",
    "chain type exception",
  ));
  let history = ActionHistory::new(&harness.executor);

  let error = history.find_actions("dao", "vote", 3).unwrap_err();

  assert!(matches!(error, Error::Fatal {
    operation: "get_block",
    ..
  }));
  assert_eq!(harness.chain.block_requests.lock().unwrap().len(), 1);
}

#[test]
fn rejects_malformed_names() {
  let harness = Harness::new(voting_chain(), 11);
  let history = ActionHistory::new(&harness.executor);

  assert!(matches!(
    history.find_actions("Dao!", "vote", 1),
    Err(Error::Name(_))
  ));
}
