//! A closed tagged union over the primitive kinds that can be stored in
//! generic key/value tables, for example contract settings.
//!
//! Two wire forms are supported and both round-trip:
//!
//!   - binary: a varuint32 tag followed by the kind's packed payload,
//!   - JSON: `{"<kind>": <value>}`. The `["<kind>", <value>]` pair form
//!     that chain nodes emit in table rows is accepted when decoding.

use {
  crate::{
    codec::{self, read_varuint32, write_varuint32, Pack, Unpack},
    name,
    Asset,
    Checksum256,
    Name,
    TimePoint,
  },
  bytes::{Buf, BufMut},
  serde::{
    de::{self, Deserializer, MapAccess, SeqAccess, Visitor},
    ser::{SerializeMap, Serializer},
    Deserialize,
    Serialize,
  },
  std::{
    fmt::{Debug, Display},
    str::FromStr,
    time::SystemTime,
  },
  thiserror::Error,
  tracing::debug,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("FlexValue holds {actual}, expected {expected}")]
  TypeMismatch { expected: FlexKind, actual: FlexKind },

  #[error("Unsupported flex value kind {0:?}")]
  UnsupportedKind(String),

  #[error("Cannot convert {literal:?} to {kind}: {reason}")]
  InvalidLiteral {
    kind: FlexKind,
    literal: String,
    reason: String,
  },
}

/// Discriminant of [`FlexValue`]. The numeric tags are part of the
/// binary wire format and must never be reordered.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FlexKind {
  Monostate = 0,
  Name = 1,
  String = 2,
  Asset = 3,
  TimePoint = 4,
  Int64 = 5,
  Uint32 = 6,
  Uint64 = 7,
  Checksum256 = 8,
}

impl FlexKind {
  pub const ALL: [FlexKind; 9] = [
    FlexKind::Monostate,
    FlexKind::Name,
    FlexKind::String,
    FlexKind::Asset,
    FlexKind::TimePoint,
    FlexKind::Int64,
    FlexKind::Uint32,
    FlexKind::Uint64,
    FlexKind::Checksum256,
  ];

  pub fn tag(&self) -> u32 {
    *self as u32
  }

  pub fn from_tag(tag: u32) -> Option<Self> {
    Self::ALL.get(tag as usize).copied()
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      FlexKind::Monostate => "monostate",
      FlexKind::Name => "name",
      FlexKind::String => "string",
      FlexKind::Asset => "asset",
      FlexKind::TimePoint => "time_point",
      FlexKind::Int64 => "int64",
      FlexKind::Uint32 => "uint32",
      FlexKind::Uint64 => "uint64",
      FlexKind::Checksum256 => "checksum256",
    }
  }
}

impl Display for FlexKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for FlexKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .iter()
      .find(|kind| kind.as_str() == s)
      .copied()
      .ok_or_else(|| Error::UnsupportedKind(s.to_owned()))
  }
}

/// A value of exactly one of the [`FlexKind`]s.
#[derive(Clone)]
pub enum FlexValue {
  Monostate,
  Name(Name),
  String(String),
  Asset(Asset),
  TimePoint(TimePoint),
  Int64(i64),
  Uint32(u32),
  Uint64(u64),
  Checksum256(Checksum256),
}

impl FlexValue {
  pub fn kind(&self) -> FlexKind {
    match self {
      FlexValue::Monostate => FlexKind::Monostate,
      FlexValue::Name(_) => FlexKind::Name,
      FlexValue::String(_) => FlexKind::String,
      FlexValue::Asset(_) => FlexKind::Asset,
      FlexValue::TimePoint(_) => FlexKind::TimePoint,
      FlexValue::Int64(_) => FlexKind::Int64,
      FlexValue::Uint32(_) => FlexKind::Uint32,
      FlexValue::Uint64(_) => FlexKind::Uint64,
      FlexValue::Checksum256(_) => FlexKind::Checksum256,
    }
  }

  /// Parses a literal for one of the kinds settings can be configured
  /// with from text: string, name, int64, uint32, uint64 and asset.
  pub fn parse(kind: &str, literal: &str) -> Result<Self, Error> {
    let kind = match kind.parse::<FlexKind>()? {
      k @ (FlexKind::String
      | FlexKind::Name
      | FlexKind::Int64
      | FlexKind::Uint32
      | FlexKind::Uint64
      | FlexKind::Asset) => k,
      other => return Err(Error::UnsupportedKind(other.to_string())),
    };

    let invalid = |reason: String| Error::InvalidLiteral {
      kind,
      literal: literal.to_owned(),
      reason,
    };

    Ok(match kind {
      FlexKind::String => FlexValue::String(literal.to_owned()),
      FlexKind::Name => FlexValue::Name(
        literal
          .parse::<Name>()
          .map_err(|e: name::Error| invalid(e.to_string()))?,
      ),
      FlexKind::Int64 => FlexValue::Int64(
        literal
          .parse::<i64>()
          .map_err(|e| invalid(e.to_string()))?,
      ),
      FlexKind::Uint32 => FlexValue::Uint32(
        literal
          .parse::<u32>()
          .map_err(|e| invalid(e.to_string()))?,
      ),
      FlexKind::Uint64 => FlexValue::Uint64(
        literal
          .parse::<u64>()
          .map_err(|e| invalid(e.to_string()))?,
      ),
      FlexKind::Asset => FlexValue::Asset(
        literal
          .parse::<Asset>()
          .map_err(|e: crate::AssetError| invalid(e.to_string()))?,
      ),
      _ => return Err(Error::UnsupportedKind(kind.to_string())),
    })
  }

  pub fn from_system_time(value: SystemTime) -> Self {
    FlexValue::TimePoint(value.into())
  }

  fn mismatch(&self, expected: FlexKind) -> Error {
    Error::TypeMismatch {
      expected,
      actual: self.kind(),
    }
  }

  pub fn as_name(&self) -> Result<Name, Error> {
    match self {
      FlexValue::Name(v) => Ok(*v),
      _ => Err(self.mismatch(FlexKind::Name)),
    }
  }

  pub fn as_str(&self) -> Result<&str, Error> {
    match self {
      FlexValue::String(v) => Ok(v),
      _ => Err(self.mismatch(FlexKind::String)),
    }
  }

  pub fn as_asset(&self) -> Result<Asset, Error> {
    match self {
      FlexValue::Asset(v) => Ok(*v),
      _ => Err(self.mismatch(FlexKind::Asset)),
    }
  }

  pub fn as_time_point(&self) -> Result<TimePoint, Error> {
    match self {
      FlexValue::TimePoint(v) => Ok(*v),
      _ => Err(self.mismatch(FlexKind::TimePoint)),
    }
  }

  pub fn as_int64(&self) -> Result<i64, Error> {
    match self {
      FlexValue::Int64(v) => Ok(*v),
      _ => Err(self.mismatch(FlexKind::Int64)),
    }
  }

  pub fn as_uint32(&self) -> Result<u32, Error> {
    match self {
      FlexValue::Uint32(v) => Ok(*v),
      _ => Err(self.mismatch(FlexKind::Uint32)),
    }
  }

  pub fn as_uint64(&self) -> Result<u64, Error> {
    match self {
      FlexValue::Uint64(v) => Ok(*v),
      _ => Err(self.mismatch(FlexKind::Uint64)),
    }
  }

  pub fn as_checksum256(&self) -> Result<Checksum256, Error> {
    match self {
      FlexValue::Checksum256(v) => Ok(*v),
      _ => Err(self.mismatch(FlexKind::Checksum256)),
    }
  }

  /// Two values are equal when they hold the same kind and render to the
  /// same text.
  pub fn is_equal(&self, other: &FlexValue) -> bool {
    if self.kind() != other.kind() {
      debug!("FlexValue kinds differ: {} vs {}", self.kind(), other.kind());
      return false;
    }

    let (left, right) = (self.to_string(), other.to_string());
    if left != right {
      debug!("FlexValue values differ: {left} vs {right}");
      return false;
    }
    true
  }

  pub fn to_bytes(&self) -> Vec<u8> {
    self.packed()
  }

  pub fn from_bytes(bytes: &[u8]) -> Result<Self, codec::Error> {
    Self::unpack_exact(bytes)
  }

  fn to_json_value(&self) -> serde_json::Value {
    use serde_json::Value;
    match self {
      FlexValue::Monostate => Value::from(0),
      FlexValue::Name(v) => Value::from(v.to_string()),
      FlexValue::String(v) => Value::from(v.as_str()),
      FlexValue::Asset(v) => Value::from(v.to_string()),
      FlexValue::TimePoint(v) => Value::from(v.to_string()),
      FlexValue::Int64(v) => Value::from(*v),
      FlexValue::Uint32(v) => Value::from(*v),
      FlexValue::Uint64(v) => Value::from(*v),
      FlexValue::Checksum256(v) => Value::from(v.to_string()),
    }
  }

  fn from_json_value(
    kind: FlexKind,
    value: serde_json::Value,
  ) -> Result<Self, String> {
    use serde_json::Value;

    fn text(kind: FlexKind, value: &Value) -> Result<&str, String> {
      value
        .as_str()
        .ok_or_else(|| format!("{kind} must be a JSON string, got {value}"))
    }

    // 64-bit integers may arrive as decimal strings to survive
    // javascript number precision.
    fn integer<T: FromStr + TryFrom<i64> + TryFrom<u64>>(
      kind: FlexKind,
      value: &Value,
    ) -> Result<T, String> {
      let converted = match value {
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
          (Some(i), _) => <T as TryFrom<i64>>::try_from(i).ok(),
          (None, Some(u)) => <T as TryFrom<u64>>::try_from(u).ok(),
          _ => None,
        },
        Value::String(s) => s.parse::<T>().ok(),
        _ => None,
      };
      converted.ok_or_else(|| format!("{value} is not a valid {kind}"))
    }

    Ok(match kind {
      FlexKind::Monostate => FlexValue::Monostate,
      FlexKind::Name => FlexValue::Name(
        text(kind, &value)?
          .parse::<Name>()
          .map_err(|e| format!("{e}"))?,
      ),
      FlexKind::String => FlexValue::String(text(kind, &value)?.to_owned()),
      FlexKind::Asset => FlexValue::Asset(
        text(kind, &value)?
          .parse::<Asset>()
          .map_err(|e| format!("{e}"))?,
      ),
      FlexKind::TimePoint => FlexValue::TimePoint(
        text(kind, &value)?
          .parse::<TimePoint>()
          .map_err(|e| format!("{e}"))?,
      ),
      FlexKind::Int64 => FlexValue::Int64(integer(kind, &value)?),
      FlexKind::Uint32 => FlexValue::Uint32(integer(kind, &value)?),
      FlexKind::Uint64 => FlexValue::Uint64(integer(kind, &value)?),
      FlexKind::Checksum256 => FlexValue::Checksum256(
        text(kind, &value)?
          .parse::<Checksum256>()
          .map_err(|e| format!("{e}"))?,
      ),
    })
  }
}

impl PartialEq for FlexValue {
  fn eq(&self, other: &Self) -> bool {
    self.is_equal(other)
  }
}

impl Eq for FlexValue {}

impl Display for FlexValue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      FlexValue::Monostate => Ok(()),
      FlexValue::Name(v) => Display::fmt(v, f),
      FlexValue::String(v) => f.write_str(v),
      FlexValue::Asset(v) => Display::fmt(v, f),
      FlexValue::TimePoint(v) => Display::fmt(v, f),
      FlexValue::Int64(v) => Display::fmt(v, f),
      FlexValue::Uint32(v) => Display::fmt(v, f),
      FlexValue::Uint64(v) => Display::fmt(v, f),
      FlexValue::Checksum256(v) => Display::fmt(v, f),
    }
  }
}

impl Debug for FlexValue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}({:?})", self.kind(), self.to_string())
  }
}

macro_rules! impl_from {
  ($ty:ty, $variant:ident) => {
    impl From<$ty> for FlexValue {
      fn from(value: $ty) -> Self {
        FlexValue::$variant(value)
      }
    }
  };
}

impl_from!(Name, Name);
impl_from!(String, String);
impl_from!(Asset, Asset);
impl_from!(TimePoint, TimePoint);
impl_from!(i64, Int64);
impl_from!(u32, Uint32);
impl_from!(u64, Uint64);
impl_from!(Checksum256, Checksum256);

impl From<&str> for FlexValue {
  fn from(value: &str) -> Self {
    FlexValue::String(value.to_owned())
  }
}

impl Pack for FlexValue {
  fn pack<B: BufMut>(&self, out: &mut B) {
    write_varuint32(out, self.kind().tag());
    match self {
      FlexValue::Monostate => {}
      FlexValue::Name(v) => v.pack(out),
      FlexValue::String(v) => v.pack(out),
      FlexValue::Asset(v) => v.pack(out),
      FlexValue::TimePoint(v) => v.pack(out),
      FlexValue::Int64(v) => v.pack(out),
      FlexValue::Uint32(v) => v.pack(out),
      FlexValue::Uint64(v) => v.pack(out),
      FlexValue::Checksum256(v) => v.pack(out),
    }
  }
}

impl Unpack for FlexValue {
  fn unpack<B: Buf>(buf: &mut B) -> Result<Self, codec::Error> {
    let tag = read_varuint32(buf)?;
    let kind = FlexKind::from_tag(tag).ok_or(codec::Error::UnknownTag(tag))?;
    Ok(match kind {
      FlexKind::Monostate => FlexValue::Monostate,
      FlexKind::Name => FlexValue::Name(Name::unpack(buf)?),
      FlexKind::String => FlexValue::String(String::unpack(buf)?),
      FlexKind::Asset => FlexValue::Asset(Asset::unpack(buf)?),
      FlexKind::TimePoint => FlexValue::TimePoint(TimePoint::unpack(buf)?),
      FlexKind::Int64 => FlexValue::Int64(i64::unpack(buf)?),
      FlexKind::Uint32 => FlexValue::Uint32(u32::unpack(buf)?),
      FlexKind::Uint64 => FlexValue::Uint64(u64::unpack(buf)?),
      FlexKind::Checksum256 => {
        FlexValue::Checksum256(Checksum256::unpack(buf)?)
      }
    })
  }
}

impl Serialize for FlexValue {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(self.kind().as_str(), &self.to_json_value())?;
    map.end()
  }
}

impl<'de> Deserialize<'de> for FlexValue {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    struct FlexVisitor;

    fn build<E: de::Error>(
      kind: &str,
      value: serde_json::Value,
    ) -> Result<FlexValue, E> {
      let kind: FlexKind = kind.parse().map_err(E::custom)?;
      FlexValue::from_json_value(kind, value).map_err(E::custom)
    }

    impl<'de> Visitor<'de> for FlexVisitor {
      type Value = FlexValue;

      fn expecting(
        &self,
        formatter: &mut std::fmt::Formatter,
      ) -> std::fmt::Result {
        formatter.write_str("{\"<kind>\": value} or [\"<kind>\", value]")
      }

      fn visit_map<A: MapAccess<'de>>(
        self,
        mut map: A,
      ) -> Result<Self::Value, A::Error> {
        let (kind, value): (String, serde_json::Value) = map
          .next_entry()?
          .ok_or_else(|| de::Error::custom("empty flex value object"))?;
        if map.next_key::<String>()?.is_some() {
          return Err(de::Error::custom(
            "flex value object must have exactly one kind",
          ));
        }
        build(&kind, value)
      }

      fn visit_seq<A: SeqAccess<'de>>(
        self,
        mut seq: A,
      ) -> Result<Self::Value, A::Error> {
        let kind: String = seq
          .next_element()?
          .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let value: serde_json::Value = seq
          .next_element()?
          .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        if seq.next_element::<de::IgnoredAny>()?.is_some() {
          return Err(de::Error::invalid_length(3, &self));
        }
        build(&kind, value)
      }
    }

    deserializer.deserialize_any(FlexVisitor)
  }
}
