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

const MAX_PRECISION: u8 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("Symbol code {0:?} must be 1 to 7 upper case letters")]
  InvalidSymbolCode(String),

  #[error("Symbol precision {0} exceeds the maximum of 18")]
  InvalidPrecision(u8),

  #[error("Symbol {0:?} must have the form <precision>,<CODE>")]
  InvalidSymbol(String),

  #[error("Asset {0:?} must have the form <amount> <CODE>")]
  InvalidAsset(String),

  #[error("Asset amount {0:?} is out of range")]
  AmountOutOfRange(String),
}

/// Up to seven upper case letters packed little-endian into a u64.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolCode(u64);

impl SymbolCode {
  pub const fn as_u64(&self) -> u64 {
    self.0
  }
}

impl FromStr for SymbolCode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s.is_empty() || s.len() > 7 || !s.bytes().all(|c| c.is_ascii_uppercase())
    {
      return Err(Error::InvalidSymbolCode(s.to_owned()));
    }
    Ok(Self(
      s.bytes()
        .rev()
        .fold(0u64, |acc, c| (acc << 8) | u64::from(c)),
    ))
  }
}

impl Display for SymbolCode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut tmp = self.0;
    while tmp != 0 {
      write!(f, "{}", char::from((tmp & 0xff) as u8))?;
      tmp >>= 8;
    }
    Ok(())
  }
}

impl Debug for SymbolCode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "symbol_code({self})")
  }
}

/// Asset symbol, the number of decimals plus the symbol code.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
  precision: u8,
  code: SymbolCode,
}

impl Symbol {
  pub fn new(precision: u8, code: SymbolCode) -> Result<Self, Error> {
    if precision > MAX_PRECISION {
      return Err(Error::InvalidPrecision(precision));
    }
    Ok(Self { precision, code })
  }

  pub fn precision(&self) -> u8 {
    self.precision
  }

  pub fn code(&self) -> SymbolCode {
    self.code
  }

  pub fn as_u64(&self) -> u64 {
    u64::from(self.precision) | (self.code.0 << 8)
  }
}

impl FromStr for Symbol {
  type Err = Error;

  /// Parses the `4,TLOS` form.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (precision, code) = s
      .split_once(',')
      .ok_or_else(|| Error::InvalidSymbol(s.to_owned()))?;
    let precision = precision
      .trim()
      .parse()
      .map_err(|_| Error::InvalidSymbol(s.to_owned()))?;
    Self::new(precision, code.trim().parse()?)
  }
}

impl Display for Symbol {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{},{}", self.precision, self.code)
  }
}

impl Debug for Symbol {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "symbol({self})")
  }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Asset {
  pub amount: i64,
  pub symbol: Symbol,
}

impl Asset {
  pub fn new(amount: i64, symbol: Symbol) -> Self {
    Self { amount, symbol }
  }
}

impl FromStr for Asset {
  type Err = Error;

  /// Parses `"10.0000 TLOS"`, the precision is the number of decimals.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || Error::InvalidAsset(s.to_owned());
    let (amount, code) = s.trim().split_once(' ').ok_or_else(invalid)?;
    let code: SymbolCode = code.trim().parse()?;

    let (negative, digits) = match amount.strip_prefix('-') {
      Some(rest) => (true, rest),
      None => (false, amount),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
      Some((int_part, frac_part)) => (int_part, frac_part),
      None => (digits, ""),
    };

    if int_part.is_empty()
      || !int_part.bytes().all(|c| c.is_ascii_digit())
      || !frac_part.bytes().all(|c| c.is_ascii_digit())
      || (digits.contains('.') && frac_part.is_empty())
    {
      return Err(invalid());
    }

    let precision = u8::try_from(frac_part.len())
      .map_err(|_| Error::InvalidPrecision(u8::MAX))?;
    let symbol = Symbol::new(precision, code)?;

    let out_of_range = || Error::AmountOutOfRange(s.to_owned());
    let magnitude: u64 = format!("{int_part}{frac_part}")
      .parse()
      .map_err(|_| out_of_range())?;
    let magnitude = i128::from(magnitude);
    let amount = if negative { -magnitude } else { magnitude };

    Ok(Self {
      amount: i64::try_from(amount).map_err(|_| out_of_range())?,
      symbol,
    })
  }
}

impl Display for Asset {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let precision = u32::from(self.symbol.precision);
    let sign = if self.amount < 0 { "-" } else { "" };
    let magnitude = self.amount.unsigned_abs();

    if precision == 0 {
      return write!(f, "{sign}{magnitude} {}", self.symbol.code);
    }

    let scale = 10u64.pow(precision);
    write!(
      f,
      "{sign}{}.{:0width$} {}",
      magnitude / scale,
      magnitude % scale,
      self.symbol.code,
      width = precision as usize
    )
  }
}

impl Debug for Asset {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "asset({self})")
  }
}

impl Serialize for Asset {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for Asset {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
  }
}

impl Serialize for Symbol {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for Symbol {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
  }
}

impl Pack for Symbol {
  fn pack<B: BufMut>(&self, out: &mut B) {
    self.as_u64().pack(out);
  }
}

impl Unpack for Symbol {
  fn unpack<B: Buf>(buf: &mut B) -> Result<Self, codec::Error> {
    let raw = u64::unpack(buf)?;
    let code = SymbolCode(raw >> 8);
    let rendered = code.to_string();
    if rendered.parse::<SymbolCode>() != Ok(code) {
      return Err(codec::Error::InvalidValue(format!(
        "symbol code {rendered:?}"
      )));
    }
    Symbol::new((raw & 0xff) as u8, code)
      .map_err(|e| codec::Error::InvalidValue(e.to_string()))
  }
}

impl Pack for Asset {
  fn pack<B: BufMut>(&self, out: &mut B) {
    self.amount.pack(out);
    self.symbol.pack(out);
  }
}

impl Unpack for Asset {
  fn unpack<B: Buf>(buf: &mut B) -> Result<Self, codec::Error> {
    Ok(Self {
      amount: i64::unpack(buf)?,
      symbol: Symbol::unpack(buf)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use {
    super::{Asset, Error, Symbol, SymbolCode},
    crate::codec::{Pack, Unpack},
  };

  #[test]
  fn symbol_code_encoding() {
    let code: SymbolCode = "TLOS".parse().unwrap();
    assert_eq!(code.as_u64(), 0x534f4c54);
    assert_eq!(code.to_string(), "TLOS");
    assert!("tlos".parse::<SymbolCode>().is_err());
    assert!("ABCDEFGH".parse::<SymbolCode>().is_err());
    assert!("".parse::<SymbolCode>().is_err());
  }

  #[test]
  fn parse_and_render_assets() {
    let cases = [
      ("10.0000 TLOS", 100000, 4),
      ("0.0001 TLOS", 1, 4),
      ("-1.50 USD", -150, 2),
      ("42 VOTE", 42, 0),
    ];
    for (text, amount, precision) in cases {
      let asset: Asset = text.parse().unwrap();
      assert_eq!(asset.amount, amount, "{text}");
      assert_eq!(asset.symbol.precision(), precision, "{text}");
      assert_eq!(asset.to_string(), text);
    }
  }

  #[test]
  fn rejects_malformed_assets() {
    for text in ["10.0000", "abc TLOS", "1. TLOS", ".5 TLOS", "1.0 tlos"] {
      assert!(text.parse::<Asset>().is_err(), "{text}");
    }
    for text in [
      "99999999999999999999 TLOS",
      "9223372036854775808 TLOS",
      "-9223372036854775809 TLOS",
    ] {
      assert!(
        matches!(text.parse::<Asset>(), Err(Error::AmountOutOfRange(_))),
        "{text}"
      );
    }
  }

  #[test]
  fn extreme_amounts_round_trip() -> anyhow::Result<()> {
    let symbol: Symbol = "4,ABC".parse()?;
    for amount in [i64::MIN, i64::MAX, -1, 0] {
      let asset = Asset::new(amount, symbol);
      let text = asset.to_string();
      assert_eq!(text.parse::<Asset>()?, asset, "{text}");
    }
    assert_eq!(
      Asset::new(i64::MIN, symbol).to_string(),
      "-922337203685477.5808 ABC"
    );
    Ok(())
  }

  #[test]
  fn empty_symbol_code_never_decodes() {
    let packed = [0u8; 16];
    assert!(Asset::unpack_exact(&packed).is_err());
    assert!("0 ".parse::<Asset>().is_err());
  }

  #[test]
  fn symbol_form() {
    let symbol: Symbol = "4,TLOS".parse().unwrap();
    assert_eq!(symbol.precision(), 4);
    assert_eq!(symbol.to_string(), "4,TLOS");
    assert_eq!(symbol.as_u64(), 0x534f4c5404);
    assert!(matches!(
      "19,TLOS".parse::<Symbol>(),
      Err(Error::InvalidPrecision(19))
    ));
  }

  #[test]
  fn binary_layout() {
    let asset: Asset = "1.0000 TLOS".parse().unwrap();
    let packed = asset.packed();
    assert_eq!(packed.len(), 16);
    assert_eq!(&packed[..8], &10000i64.to_le_bytes());
    assert_eq!(&packed[8..], &0x534f4c5404u64.to_le_bytes());
    assert_eq!(Asset::unpack_exact(&packed).unwrap(), asset);
  }
}
