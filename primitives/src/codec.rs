//! Binary serialization in the layout ledger nodes use on the wire.
//!
//! Integers are little-endian, collection lengths and variant tags are
//! LEB128-style varuint32 values, and there is no framing or padding
//! between fields. Types opt in through [`Pack`] and [`Unpack`].

use {
  bytes::{Buf, BufMut},
  thiserror::Error,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("Unexpected end of input while reading {0}")]
  UnexpectedEof(&'static str),

  #[error("Varuint32 value does not fit in 32 bits")]
  VaruintOverflow,

  #[error("Invalid UTF-8 string: {0}")]
  InvalidUtf8(#[from] std::string::FromUtf8Error),

  #[error("Unknown variant tag {0}")]
  UnknownTag(u32),

  #[error("Input has {0} trailing bytes after the decoded value")]
  TrailingBytes(usize),

  #[error("Decoded an invalid value: {0}")]
  InvalidValue(String),
}

/// Types that can be written in the binary wire layout.
pub trait Pack {
  fn pack<B: BufMut>(&self, out: &mut B);

  fn packed(&self) -> Vec<u8> {
    let mut out = Vec::new();
    self.pack(&mut out);
    out
  }
}

/// Types that can be read back from the binary wire layout.
pub trait Unpack: Sized {
  fn unpack<B: Buf>(buf: &mut B) -> Result<Self, Error>;

  /// Decodes a value that must span the whole input.
  fn unpack_exact(bytes: &[u8]) -> Result<Self, Error> {
    let mut buf = bytes;
    let value = Self::unpack(&mut buf)?;
    match buf.remaining() {
      0 => Ok(value),
      n => Err(Error::TrailingBytes(n)),
    }
  }
}

pub(crate) fn ensure<B: Buf>(
  buf: &B,
  len: usize,
  what: &'static str,
) -> Result<(), Error> {
  if buf.remaining() < len {
    return Err(Error::UnexpectedEof(what));
  }
  Ok(())
}

pub fn write_varuint32<B: BufMut>(out: &mut B, mut value: u32) {
  loop {
    let byte = (value & 0x7f) as u8;
    value >>= 7;
    if value == 0 {
      out.put_u8(byte);
      return;
    }
    out.put_u8(byte | 0x80);
  }
}

pub fn read_varuint32<B: Buf>(buf: &mut B) -> Result<u32, Error> {
  let mut value: u64 = 0;
  let mut shift = 0;
  loop {
    ensure(buf, 1, "varuint32")?;
    let byte = buf.get_u8();
    value |= u64::from(byte & 0x7f) << shift;
    if value > u64::from(u32::MAX) {
      return Err(Error::VaruintOverflow);
    }
    if byte & 0x80 == 0 {
      return Ok(value as u32);
    }
    shift += 7;
    if shift > 28 {
      return Err(Error::VaruintOverflow);
    }
  }
}

macro_rules! impl_int {
  ($ty:ty, $put:ident, $get:ident) => {
    impl Pack for $ty {
      fn pack<B: BufMut>(&self, out: &mut B) {
        out.$put(*self);
      }
    }

    impl Unpack for $ty {
      fn unpack<B: Buf>(buf: &mut B) -> Result<Self, Error> {
        ensure(buf, std::mem::size_of::<$ty>(), stringify!($ty))?;
        Ok(buf.$get())
      }
    }
  };
}

impl_int!(u16, put_u16_le, get_u16_le);
impl_int!(u32, put_u32_le, get_u32_le);
impl_int!(u64, put_u64_le, get_u64_le);
impl_int!(i64, put_i64_le, get_i64_le);

impl Pack for u8 {
  fn pack<B: BufMut>(&self, out: &mut B) {
    out.put_u8(*self);
  }
}

impl Unpack for u8 {
  fn unpack<B: Buf>(buf: &mut B) -> Result<Self, Error> {
    ensure(buf, 1, "u8")?;
    Ok(buf.get_u8())
  }
}

impl Pack for str {
  fn pack<B: BufMut>(&self, out: &mut B) {
    write_varuint32(out, self.len() as u32);
    out.put_slice(self.as_bytes());
  }
}

impl Pack for String {
  fn pack<B: BufMut>(&self, out: &mut B) {
    self.as_str().pack(out);
  }
}

impl Unpack for String {
  fn unpack<B: Buf>(buf: &mut B) -> Result<Self, Error> {
    let len = read_varuint32(buf)? as usize;
    ensure(buf, len, "string")?;
    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);
    Ok(String::from_utf8(bytes)?)
  }
}

impl<T: Pack> Pack for Vec<T> {
  fn pack<B: BufMut>(&self, out: &mut B) {
    write_varuint32(out, self.len() as u32);
    for item in self {
      item.pack(out);
    }
  }
}

impl<T: Unpack> Unpack for Vec<T> {
  fn unpack<B: Buf>(buf: &mut B) -> Result<Self, Error> {
    let len = read_varuint32(buf)? as usize;
    // every element occupies at least one byte, so a length larger than
    // what is left can only come from corrupt input.
    ensure(buf, len.min(buf.remaining() + 1), "collection")?;
    let mut items = Vec::with_capacity(len);
    for _ in 0..len {
      items.push(T::unpack(buf)?);
    }
    Ok(items)
  }
}

impl<T: Pack + ?Sized> Pack for &T {
  fn pack<B: BufMut>(&self, out: &mut B) {
    (**self).pack(out);
  }
}
