use {
  crate::{
    config::ClientConfig,
    executor::RpcExecutor,
    transport::{AbiEncoder, PushResponse},
    Error,
  },
  ledger_primitives::{
    Action,
    ApproveArgs,
    ExecArgs,
    Name,
    Pack,
    PermissionLevel,
    ProposeArgs,
    TimePointSec,
    ToName,
    ToPermissionLevel,
    Transaction,
  },
  serde_json::Value,
  std::{sync::Arc, time::Duration},
  tracing::info,
};

pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(30);

/// `eosio.msig`
pub const DEFAULT_MSIG_ACCOUNT: Name = Name::from_u64(6138663587900751872);

const PROPOSE: Name = Name::from_u64(12531646811867185152);
const APPROVE: Name = Name::from_u64(3849304916161986560);
const EXEC: Name = Name::from_u64(6292795316831780864);

/// Arguments of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionPayload {
  /// Already in the binary wire layout.
  Packed(Vec<u8>),

  /// Structured arguments, encoded through the configured [`AbiEncoder`].
  Json(Value),
}

impl ActionPayload {
  pub fn pack(args: &impl Pack) -> Self {
    ActionPayload::Packed(args.packed())
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalResponse {
  pub proposal_name: Name,
  pub response: PushResponse,
}

/// Assembles actions into transactions stamped against the current chain
/// head and submits them, directly or as multisig proposals.
pub struct TransactionBuilder<'a> {
  executor: &'a RpcExecutor,
  abi: Option<Arc<dyn AbiEncoder>>,
  expire_in: Duration,
  msig_account: Name,
}

impl<'a> TransactionBuilder<'a> {
  pub fn new(executor: &'a RpcExecutor) -> Self {
    Self {
      executor,
      abi: None,
      expire_in: DEFAULT_EXPIRATION,
      msig_account: DEFAULT_MSIG_ACCOUNT,
    }
  }

  /// Expiration and multisig account taken from `config`.
  pub fn from_config(
    executor: &'a RpcExecutor,
    config: &ClientConfig,
  ) -> Self {
    Self::new(executor)
      .with_expiration(config.trx_expiration)
      .with_msig_account(config.msig_account)
  }

  pub fn with_abi_encoder(mut self, abi: Arc<dyn AbiEncoder>) -> Self {
    self.abi = Some(abi);
    self
  }

  pub fn with_expiration(mut self, expire_in: Duration) -> Self {
    self.expire_in = expire_in;
    self
  }

  pub fn with_msig_account(mut self, account: Name) -> Self {
    self.msig_account = account;
    self
  }

  /// Builds an action authorized by a single permission level.
  ///
  /// A missing payload encodes as empty action data, the binary form of an
  /// action without arguments, rather than the JSON text `{}`.
  pub fn build_action(
    &self,
    contract: impl ToName,
    action: impl ToName,
    permission: impl ToPermissionLevel,
    payload: Option<ActionPayload>,
  ) -> Result<Action, Error> {
    let account = contract.to_name()?;
    let name = action.to_name()?;
    let level = permission.to_permission_level()?;

    let data = match payload {
      None => vec![],
      Some(ActionPayload::Packed(bytes)) => bytes,
      Some(ActionPayload::Json(args)) => match &self.abi {
        Some(abi) => abi.encode(account, name, &args)?,
        None => {
          return Err(Error::NoAbiEncoder {
            account,
            action: name,
          })
        }
      },
    };

    Ok(Action {
      account,
      name,
      authorization: vec![level],
      data,
    })
  }

  /// Stamps `actions` with the reference block and expiration derived from
  /// the current chain head.
  pub fn build_transaction(
    &self,
    expire_in: Duration,
    actions: Vec<Action>,
  ) -> Result<Transaction, Error> {
    let info = self.executor.chain_info()?;
    let head_id = info.head_block_id.as_bytes();

    let mut trx = Transaction::new(info.chain_id, actions);
    trx.expiration =
      TimePointSec::from(info.head_block_time).saturating_add(expire_in);
    trx.ref_block_num = (info.head_block_num & 0xffff) as u16;
    trx.ref_block_prefix =
      u32::from_le_bytes([head_id[8], head_id[9], head_id[10], head_id[11]]);
    Ok(trx)
  }

  pub fn push(&self, actions: Vec<Action>) -> Result<PushResponse, Error> {
    let trx = self.build_transaction(self.expire_in, actions)?;
    self.executor.submit(&trx)
  }

  /// Stages `actions` as a multisig proposal under a freshly generated
  /// random name. Name collisions are not checked upfront, they surface as
  /// a remote error.
  pub fn propose_multisig(
    &self,
    proposer: impl ToName,
    requested: Vec<PermissionLevel>,
    expire_in: Duration,
    actions: Vec<Action>,
  ) -> Result<ProposalResponse, Error> {
    let proposer = proposer.to_name()?;
    let proposal_name = Name::random(&mut rand::thread_rng());
    let trx = self.build_transaction(expire_in, actions)?;

    let args = ProposeArgs {
      proposer,
      proposal_name,
      requested,
      trx,
    };
    let propose = self.msig_action(PROPOSE, PermissionLevel::active(proposer), &args);
    let response = self.push(vec![propose])?;

    info!("{proposer} proposed {proposal_name}");
    Ok(ProposalResponse {
      proposal_name,
      response,
    })
  }

  pub fn approve_multisig(
    &self,
    proposer: impl ToName,
    proposal_name: impl ToName,
    level: impl ToPermissionLevel,
  ) -> Result<PushResponse, Error> {
    let level = level.to_permission_level()?;
    let args = ApproveArgs {
      proposer: proposer.to_name()?,
      proposal_name: proposal_name.to_name()?,
      level,
    };
    self.push(vec![self.msig_action(APPROVE, level, &args)])
  }

  pub fn exec_multisig(
    &self,
    proposer: impl ToName,
    proposal_name: impl ToName,
    executer: impl ToName,
  ) -> Result<PushResponse, Error> {
    let executer = executer.to_name()?;
    let args = ExecArgs {
      proposer: proposer.to_name()?,
      proposal_name: proposal_name.to_name()?,
      executer,
    };
    self.push(vec![self.msig_action(
      EXEC,
      PermissionLevel::active(executer),
      &args,
    )])
  }

  fn msig_action(
    &self,
    name: Name,
    level: PermissionLevel,
    args: &impl Pack,
  ) -> Action {
    Action {
      account: self.msig_account,
      name,
      authorization: vec![level],
      data: args.packed(),
    }
  }
}

#[cfg(test)]
mod tests {
  use {
    super::{ActionPayload, APPROVE, DEFAULT_MSIG_ACCOUNT, EXEC, PROPOSE},
    ledger_primitives::{FlexValue, ModifySettingArgs, Name, Pack},
  };

  #[test]
  fn msig_names() {
    let parse = |s: &str| s.parse::<Name>().unwrap();
    assert_eq!(DEFAULT_MSIG_ACCOUNT, parse("eosio.msig"));
    assert_eq!(PROPOSE, parse("propose"));
    assert_eq!(APPROVE, parse("approve"));
    assert_eq!(EXEC, parse("exec"));
  }

  #[test]
  fn packed_payload_helper() {
    let args = ModifySettingArgs {
      setter: "dao".parse().unwrap(),
      key: "quorum".into(),
      value: FlexValue::Uint32(20),
    };
    assert_eq!(
      ActionPayload::pack(&args),
      ActionPayload::Packed(args.packed())
    );
  }
}
