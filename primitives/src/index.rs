use {
  crate::{Name, SymbolCode},
  std::fmt::Display,
  thiserror::Error,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot use {component} as a 64-bit index key component: {reason}")]
pub struct InvalidKeyComponent {
  pub component: String,
  pub reason: String,
}

/// One half of a 128-bit composite secondary index key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyComponent {
  Name(Name),
  Uint(u64),
  Int(i64),
  Symbol(SymbolCode),

  /// Textual identifier, resolved through its [`Name`] encoding.
  Text(String),
}

impl KeyComponent {
  pub fn to_u64(&self) -> Result<u64, InvalidKeyComponent> {
    match self {
      KeyComponent::Name(name) => Ok(name.as_u64()),
      KeyComponent::Uint(value) => Ok(*value),
      KeyComponent::Int(value) => {
        u64::try_from(*value).map_err(|_| invalid(value, "negative integer"))
      }
      KeyComponent::Symbol(code) => Ok(code.as_u64()),
      KeyComponent::Text(text) => text
        .parse::<Name>()
        .map(|name| name.as_u64())
        .map_err(|e| invalid(format!("{text:?}"), e)),
    }
  }
}

fn invalid(component: impl Display, reason: impl Display) -> InvalidKeyComponent {
  InvalidKeyComponent {
    component: component.to_string(),
    reason: reason.to_string(),
  }
}

impl From<Name> for KeyComponent {
  fn from(value: Name) -> Self {
    KeyComponent::Name(value)
  }
}

impl From<u64> for KeyComponent {
  fn from(value: u64) -> Self {
    KeyComponent::Uint(value)
  }
}

impl From<i64> for KeyComponent {
  fn from(value: i64) -> Self {
    KeyComponent::Int(value)
  }
}

impl From<SymbolCode> for KeyComponent {
  fn from(value: SymbolCode) -> Self {
    KeyComponent::Symbol(value)
  }
}

impl From<&str> for KeyComponent {
  fn from(value: &str) -> Self {
    KeyComponent::Text(value.to_owned())
  }
}

impl From<String> for KeyComponent {
  fn from(value: String) -> Self {
    KeyComponent::Text(value)
  }
}

/// `(first << 64) | second`, so that ordering a single 128-bit column
/// orders rows by `first` and then by `second`.
pub fn compose_u128(
  first: impl Into<KeyComponent>,
  second: impl Into<KeyComponent>,
) -> Result<u128, InvalidKeyComponent> {
  let high = first.into().to_u64()?;
  let low = second.into().to_u64()?;
  Ok((u128::from(high) << 64) | u128::from(low))
}

/// Decimal rendering of [`compose_u128`], the form accepted as a table
/// read lower or upper bound.
pub fn compose(
  first: impl Into<KeyComponent>,
  second: impl Into<KeyComponent>,
) -> Result<String, InvalidKeyComponent> {
  compose_u128(first, second).map(|key| key.to_string())
}
