use {
  crate::{
    codec::{self, Pack, Unpack},
    name::{self, ToName},
    Name,
  },
  bytes::{Buf, BufMut},
  serde::{Deserialize, Serialize},
  std::{
    fmt::{Debug, Display},
    str::FromStr,
  },
  thiserror::Error,
};

/// Permission assumed when a level is given as a bare actor name.
pub const DEFAULT_PERMISSION: Name = Name::from_u64(3617214756542218240);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("Invalid permission level {input:?}: {source}")]
  InvalidLevel { input: String, source: name::Error },
}

/// An (actor, permission) pair authorizing an action.
#[derive(
  Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PermissionLevel {
  pub actor: Name,
  pub permission: Name,
}

impl PermissionLevel {
  pub fn new(actor: Name, permission: Name) -> Self {
    Self { actor, permission }
  }

  pub fn active(actor: Name) -> Self {
    Self::new(actor, DEFAULT_PERMISSION)
  }
}

impl FromStr for PermissionLevel {
  type Err = Error;

  /// Parses `actor@permission`, or a bare `actor` meaning `actor@active`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = |source| Error::InvalidLevel {
      input: s.to_owned(),
      source,
    };
    match s.split_once('@') {
      Some((actor, permission)) => Ok(Self::new(
        actor.parse().map_err(invalid)?,
        permission.parse().map_err(invalid)?,
      )),
      None => Ok(Self::active(s.parse().map_err(invalid)?)),
    }
  }
}

impl Display for PermissionLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}@{}", self.actor, self.permission)
  }
}

impl Debug for PermissionLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "permission_level({self})")
  }
}

impl Pack for PermissionLevel {
  fn pack<B: BufMut>(&self, out: &mut B) {
    self.actor.pack(out);
    self.permission.pack(out);
  }
}

impl Unpack for PermissionLevel {
  fn unpack<B: Buf>(buf: &mut B) -> Result<Self, codec::Error> {
    Ok(Self {
      actor: Name::unpack(buf)?,
      permission: Name::unpack(buf)?,
    })
  }
}

/// Anything that can be normalized into a [`PermissionLevel`].
pub trait ToPermissionLevel {
  fn to_permission_level(&self) -> Result<PermissionLevel, Error>;
}

impl ToPermissionLevel for PermissionLevel {
  fn to_permission_level(&self) -> Result<PermissionLevel, Error> {
    Ok(*self)
  }
}

impl ToPermissionLevel for Name {
  fn to_permission_level(&self) -> Result<PermissionLevel, Error> {
    Ok(PermissionLevel::active(*self))
  }
}

impl ToPermissionLevel for str {
  fn to_permission_level(&self) -> Result<PermissionLevel, Error> {
    self.parse()
  }
}

impl ToPermissionLevel for String {
  fn to_permission_level(&self) -> Result<PermissionLevel, Error> {
    self.parse()
  }
}

impl<T: ToPermissionLevel + ?Sized> ToPermissionLevel for &T {
  fn to_permission_level(&self) -> Result<PermissionLevel, Error> {
    (**self).to_permission_level()
  }
}

/// A single invocation of a contract entry point.
///
/// `data` is the already encoded argument struct, it is opaque at this
/// level and rendered as hex in JSON.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
  pub account: Name,
  pub name: Name,
  pub authorization: Vec<PermissionLevel>,
  #[serde(with = "hex_bytes")]
  pub data: Vec<u8>,
}

impl Action {
  pub fn new(
    account: impl ToName,
    name: impl ToName,
    authorization: Vec<PermissionLevel>,
    data: Vec<u8>,
  ) -> Result<Self, name::Error> {
    Ok(Self {
      account: account.to_name()?,
      name: name.to_name()?,
      authorization,
      data,
    })
  }
}

impl Debug for Action {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Action")
      .field("account", &self.account)
      .field("name", &self.name)
      .field("authorization", &self.authorization)
      .field("data", &hex::encode(&self.data))
      .finish()
  }
}

impl Pack for Action {
  fn pack<B: BufMut>(&self, out: &mut B) {
    self.account.pack(out);
    self.name.pack(out);
    self.authorization.pack(out);
    codec::write_varuint32(out, self.data.len() as u32);
    out.put_slice(&self.data);
  }
}

impl Unpack for Action {
  fn unpack<B: Buf>(buf: &mut B) -> Result<Self, codec::Error> {
    let account = Name::unpack(buf)?;
    let name = Name::unpack(buf)?;
    let authorization = Vec::unpack(buf)?;
    let len = codec::read_varuint32(buf)? as usize;
    codec::ensure(buf, len, "action data")?;
    let mut data = vec![0u8; len];
    buf.copy_to_slice(&mut data);
    Ok(Self {
      account,
      name,
      authorization,
      data,
    })
  }
}

pub(crate) mod hex_bytes {
  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(
    bytes: &[u8],
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Vec<u8>, D::Error> {
    let s = String::deserialize(deserializer)?;
    hex::decode(s).map_err(serde::de::Error::custom)
  }
}
