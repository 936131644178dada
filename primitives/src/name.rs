use {
  crate::codec::{self, Pack, Unpack},
  bytes::{Buf, BufMut},
  rand::Rng,
  serde::{Deserialize, Deserializer, Serialize, Serializer},
  std::{
    fmt::{Debug, Display},
    str::FromStr,
  },
  thiserror::Error,
};

const CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";
const MAX_LEN: usize = 13;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("Name {0:?} is longer than 13 characters")]
  TooLong(String),

  #[error("Name {0:?} contains characters outside of [.1-5a-z]")]
  InvalidCharacter(String),

  #[error("Name {0:?} is not in canonical form")]
  NotCanonical(String),
}

/// A 64-bit base-32 identifier.
///
/// Accounts, actions, permissions, tables and scopes are all addressed
/// by names. The string form uses the alphabet `.12345a-z`, at most 12
/// characters followed by an optional 13th character from `.1-5a-j`.
#[derive(
  Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct Name(u64);

impl Name {
  pub const fn from_u64(value: u64) -> Self {
    Self(value)
  }

  pub const fn as_u64(&self) -> u64 {
    self.0
  }

  pub fn is_empty(&self) -> bool {
    self.0 == 0
  }

  /// Generates a random 12 character name.
  ///
  /// The first character is always a letter and dots are never used, so
  /// the result is always canonical. Uniqueness is not guaranteed.
  pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
    const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
    const ALL: &[u8] = b"abcdefghijklmnopqrstuvwxyz12345";

    let mut value = [0u8; 12];
    value[0] = LETTERS[rng.gen_range(0..LETTERS.len())];
    for c in value.iter_mut().skip(1) {
      *c = ALL[rng.gen_range(0..ALL.len())];
    }

    let mut encoded = 0u64;
    for (i, c) in value.iter().enumerate() {
      encoded |= (symbol_of(*c).unwrap_or(0) & 0x1f) << (64 - 5 * (i + 1));
    }
    Self(encoded)
  }
}

fn symbol_of(c: u8) -> Option<u64> {
  match c {
    b'a'..=b'z' => Some(u64::from(c - b'a') + 6),
    b'1'..=b'5' => Some(u64::from(c - b'1') + 1),
    b'.' => Some(0),
    _ => None,
  }
}

impl FromStr for Name {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s.len() > MAX_LEN {
      return Err(Error::TooLong(s.to_owned()));
    }

    let mut value = 0u64;
    for (i, c) in s.bytes().enumerate() {
      let symbol =
        symbol_of(c).ok_or_else(|| Error::InvalidCharacter(s.to_owned()))?;
      if i < 12 {
        value |= (symbol & 0x1f) << (64 - 5 * (i + 1));
      } else {
        value |= symbol & 0x0f;
      }
    }

    // the 13th character only has four bits available and trailing dots
    // are dropped when rendering, both make the input ambiguous.
    let name = Self(value);
    if name.to_string() != s {
      return Err(Error::NotCanonical(s.to_owned()));
    }
    Ok(name)
  }
}

impl TryFrom<&str> for Name {
  type Error = Error;

  fn try_from(value: &str) -> Result<Self, Self::Error> {
    FromStr::from_str(value)
  }
}

impl Display for Name {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut out = [b'.'; MAX_LEN];
    let mut tmp = self.0;
    for i in 0..MAX_LEN {
      let mask = if i == 0 { 0x0f } else { 0x1f };
      out[12 - i] = CHARMAP[(tmp & mask) as usize];
      tmp >>= if i == 0 { 4 } else { 5 };
    }

    let len = out
      .iter()
      .rposition(|c| *c != b'.')
      .map(|p| p + 1)
      .unwrap_or(0);

    // every byte comes from CHARMAP which is plain ascii
    f.write_str(std::str::from_utf8(&out[..len]).map_err(|_| std::fmt::Error)?)
  }
}

impl Debug for Name {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "name({self})")
  }
}

impl From<Name> for String {
  fn from(name: Name) -> Self {
    name.to_string()
  }
}

impl From<Name> for u64 {
  fn from(name: Name) -> Self {
    name.0
  }
}

impl Serialize for Name {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for Name {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
  }
}

impl Pack for Name {
  fn pack<B: BufMut>(&self, out: &mut B) {
    self.0.pack(out);
  }
}

impl Unpack for Name {
  fn unpack<B: Buf>(buf: &mut B) -> Result<Self, codec::Error> {
    Ok(Self(u64::unpack(buf)?))
  }
}

/// Anything that can be normalized into a [`Name`].
///
/// Lets call sites pass either already validated names or plain strings
/// that get validated on the way in.
pub trait ToName {
  fn to_name(&self) -> Result<Name, Error>;
}

impl ToName for Name {
  fn to_name(&self) -> Result<Name, Error> {
    Ok(*self)
  }
}

impl ToName for str {
  fn to_name(&self) -> Result<Name, Error> {
    self.parse()
  }
}

impl ToName for String {
  fn to_name(&self) -> Result<Name, Error> {
    self.parse()
  }
}

impl<T: ToName + ?Sized> ToName for &T {
  fn to_name(&self) -> Result<Name, Error> {
    (**self).to_name()
  }
}

#[cfg(test)]
mod tests {
  use {
    super::{Error, Name},
    crate::codec::{Pack, Unpack},
  };

  #[test]
  fn known_encodings() {
    assert_eq!("eosio".parse::<Name>().unwrap().as_u64(), 6138663577826885632);
    assert_eq!(
      "eosio.token".parse::<Name>().unwrap().as_u64(),
      6138663591592764928
    );
    assert_eq!("".parse::<Name>().unwrap().as_u64(), 0);
    assert_eq!(Name::from_u64(6138663577826885632).to_string(), "eosio");
  }

  #[test]
  fn thirteenth_character() {
    let name: Name = "zzzzzzzzzzzzj".parse().unwrap();
    assert_eq!(name.to_string(), "zzzzzzzzzzzzj");
    assert_eq!(
      "zzzzzzzzzzzzk".parse::<Name>(),
      Err(Error::NotCanonical("zzzzzzzzzzzzk".into()))
    );
  }

  #[test]
  fn rejects_invalid_names() {
    assert!(matches!(
      "Alice".parse::<Name>(),
      Err(Error::InvalidCharacter(_))
    ));
    assert!(matches!("alice6".parse::<Name>(), Err(Error::InvalidCharacter(_))));
    assert!(matches!(
      "abcdefghijklmn".parse::<Name>(),
      Err(Error::TooLong(_))
    ));
    assert!(matches!("alice.".parse::<Name>(), Err(Error::NotCanonical(_))));
  }

  #[test]
  fn order_follows_string_order() {
    let a: Name = "alice".parse().unwrap();
    let b: Name = "bob".parse().unwrap();
    let c: Name = "bob.a".parse().unwrap();
    assert!(a < b);
    assert!(b < c);
  }

  #[test]
  fn random_names_are_canonical() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
      let name = Name::random(&mut rng);
      let rendered = name.to_string();
      assert_eq!(rendered.len(), 12);
      assert_eq!(rendered.parse::<Name>().unwrap(), name);
      assert!(rendered.as_bytes()[0].is_ascii_lowercase());
    }
  }

  #[test]
  fn packs_as_little_endian_u64() {
    let name: Name = "eosio".parse().unwrap();
    let packed = name.packed();
    assert_eq!(packed, 6138663577826885632u64.to_le_bytes().to_vec());
    assert_eq!(Name::unpack_exact(&packed).unwrap(), name);
  }

  #[test]
  fn json_is_a_plain_string() {
    let name: Name = "alice".parse().unwrap();
    assert_eq!(serde_json::to_string(&name).unwrap(), "\"alice\"");
    assert_eq!(serde_json::from_str::<Name>("\"alice\"").unwrap(), name);
    assert!(serde_json::from_str::<Name>("\"ALICE\"").is_err());
  }
}
