use {
  crate::codec::{self, Pack, Unpack},
  bytes::{Buf, BufMut},
  serde::{Deserialize, Deserializer, Serialize, Serializer},
  std::{
    fmt::{Debug, Display},
    str::FromStr,
  },
  thiserror::Error,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
  #[error("Invalid checksum hex: {0}")]
  InvalidHex(#[from] hex::FromHexError),
}

/// A 256-bit digest: block ids, transaction ids, chain ids.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Checksum256([u8; 32]);

impl Checksum256 {
  pub const fn from_bytes(bytes: [u8; 32]) -> Self {
    Self(bytes)
  }

  pub fn as_bytes(&self) -> &[u8; 32] {
    &self.0
  }
}

impl AsRef<[u8]> for Checksum256 {
  fn as_ref(&self) -> &[u8] {
    &self.0
  }
}

impl FromStr for Checksum256 {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(s, &mut bytes)?;
    Ok(Self(bytes))
  }
}

impl Display for Checksum256 {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&hex::encode(self.0))
  }
}

impl Debug for Checksum256 {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "checksum256({self})")
  }
}

impl Serialize for Checksum256 {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for Checksum256 {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
  }
}

impl Pack for Checksum256 {
  fn pack<B: BufMut>(&self, out: &mut B) {
    out.put_slice(&self.0);
  }
}

impl Unpack for Checksum256 {
  fn unpack<B: Buf>(buf: &mut B) -> Result<Self, codec::Error> {
    codec::ensure(buf, 32, "checksum256")?;
    let mut bytes = [0u8; 32];
    buf.copy_to_slice(&mut bytes);
    Ok(Self(bytes))
  }
}
