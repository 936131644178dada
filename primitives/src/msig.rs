//! Argument structs of the multisig contract actions.

use {
  crate::{codec::Pack, Name, PermissionLevel, Transaction},
  bytes::BufMut,
  serde::Serialize,
};

/// Stages `trx` under `proposal_name` until every `requested` level has
/// approved it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposeArgs {
  pub proposer: Name,
  pub proposal_name: Name,
  pub requested: Vec<PermissionLevel>,
  pub trx: Transaction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApproveArgs {
  pub proposer: Name,
  pub proposal_name: Name,
  pub level: PermissionLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecArgs {
  pub proposer: Name,
  pub proposal_name: Name,
  pub executer: Name,
}

impl Pack for ProposeArgs {
  fn pack<B: BufMut>(&self, out: &mut B) {
    self.proposer.pack(out);
    self.proposal_name.pack(out);
    self.requested.pack(out);
    self.trx.pack(out);
  }
}

impl Pack for ApproveArgs {
  fn pack<B: BufMut>(&self, out: &mut B) {
    self.proposer.pack(out);
    self.proposal_name.pack(out);
    self.level.pack(out);
  }
}

impl Pack for ExecArgs {
  fn pack<B: BufMut>(&self, out: &mut B) {
    self.proposer.pack(out);
    self.proposal_name.pack(out);
    self.executer.pack(out);
  }
}
