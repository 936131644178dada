use {
  crate::{
    action::hex_bytes,
    codec::{self, read_varuint32, write_varuint32, Pack, Unpack},
    Action,
    Checksum256,
    TimePointSec,
  },
  bytes::{Buf, BufMut},
  serde::{Deserialize, Serialize},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
  #[serde(rename = "type")]
  pub kind: u16,
  #[serde(with = "hex_bytes")]
  pub data: Vec<u8>,
}

/// One or more actions applied atomically, bound to a recent block of a
/// specific chain and valid until `expiration`.
///
/// The chain id is not part of the packed transaction, it only enters the
/// digest that gets signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
  pub expiration: TimePointSec,
  pub ref_block_num: u16,
  pub ref_block_prefix: u32,
  pub max_net_usage_words: u32,
  pub max_cpu_usage_ms: u8,
  pub delay_sec: u32,
  pub context_free_actions: Vec<Action>,
  pub actions: Vec<Action>,
  #[serde(rename = "transaction_extensions")]
  pub extensions: Vec<Extension>,

  #[serde(skip)]
  pub chain_id: Checksum256,
}

impl Transaction {
  /// An unlimited transaction carrying `actions`. Expiration and
  /// reference block are stamped by the caller.
  pub fn new(chain_id: Checksum256, actions: Vec<Action>) -> Self {
    Self {
      expiration: TimePointSec::default(),
      ref_block_num: 0,
      ref_block_prefix: 0,
      max_net_usage_words: 0,
      max_cpu_usage_ms: 0,
      delay_sec: 0,
      context_free_actions: vec![],
      actions,
      extensions: vec![],
      chain_id,
    }
  }

  /// The bytes an external signer hashes and signs:
  /// chain id, packed transaction, then the digest of the context free
  /// data, which is all zeros when there is none.
  pub fn signing_payload(&self) -> Vec<u8> {
    let mut out = Vec::with_capacity(32 + 64 + 32);
    out.put_slice(self.chain_id.as_bytes());
    self.pack(&mut out);
    out.put_slice(&[0u8; 32]);
    out
  }
}

impl Pack for Extension {
  fn pack<B: BufMut>(&self, out: &mut B) {
    self.kind.pack(out);
    write_varuint32(out, self.data.len() as u32);
    out.put_slice(&self.data);
  }
}

impl Unpack for Extension {
  fn unpack<B: Buf>(buf: &mut B) -> Result<Self, codec::Error> {
    let kind = u16::unpack(buf)?;
    let len = read_varuint32(buf)? as usize;
    codec::ensure(buf, len, "extension data")?;
    let mut data = vec![0u8; len];
    buf.copy_to_slice(&mut data);
    Ok(Self { kind, data })
  }
}

impl Pack for Transaction {
  fn pack<B: BufMut>(&self, out: &mut B) {
    self.expiration.pack(out);
    self.ref_block_num.pack(out);
    self.ref_block_prefix.pack(out);
    write_varuint32(out, self.max_net_usage_words);
    self.max_cpu_usage_ms.pack(out);
    write_varuint32(out, self.delay_sec);
    self.context_free_actions.pack(out);
    self.actions.pack(out);
    self.extensions.pack(out);
  }
}

impl Unpack for Transaction {
  /// The chain id is not on the wire and comes back zeroed.
  fn unpack<B: Buf>(buf: &mut B) -> Result<Self, codec::Error> {
    Ok(Self {
      expiration: TimePointSec::unpack(buf)?,
      ref_block_num: u16::unpack(buf)?,
      ref_block_prefix: u32::unpack(buf)?,
      max_net_usage_words: read_varuint32(buf)?,
      max_cpu_usage_ms: u8::unpack(buf)?,
      delay_sec: read_varuint32(buf)?,
      context_free_actions: Vec::unpack(buf)?,
      actions: Vec::unpack(buf)?,
      extensions: Vec::unpack(buf)?,
      chain_id: Checksum256::default(),
    })
  }
}

/// A transaction together with the signatures produced by a signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
  pub transaction: Transaction,
  pub signatures: Vec<String>,
}

impl SignedTransaction {
  pub fn new(transaction: Transaction, signatures: Vec<String>) -> Self {
    Self {
      transaction,
      signatures,
    }
  }

  pub fn to_packed(&self) -> PackedTransaction {
    PackedTransaction {
      signatures: self.signatures.clone(),
      compression: "none".to_owned(),
      packed_context_free_data: vec![],
      packed_trx: self.transaction.packed(),
    }
  }
}

/// Request body of the push endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedTransaction {
  pub signatures: Vec<String>,
  pub compression: String,
  #[serde(with = "hex_bytes")]
  pub packed_context_free_data: Vec<u8>,
  #[serde(with = "hex_bytes")]
  pub packed_trx: Vec<u8>,
}
