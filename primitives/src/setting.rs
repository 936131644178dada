use {
  crate::{
    codec::Pack,
    flex,
    Asset,
    Checksum256,
    FlexValue,
    Name,
    TimePoint,
  },
  bytes::BufMut,
  serde::{Deserialize, Serialize},
  thiserror::Error,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("Setting {key:?} has no value at position {pos}, value count: {count}")]
  NoValueAt {
    key: String,
    pos: usize,
    count: usize,
  },

  #[error("Setting {key:?}: {source}")]
  Value { key: String, source: flex::Error },
}

/// A row of a contract's settings table. Settings can hold more than one
/// value, each of any [`FlexValue`] kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
  pub id: u64,
  pub key: String,
  pub values: Vec<FlexValue>,
  pub created_date: TimePoint,
  pub updated_date: TimePoint,
}

impl Setting {
  pub fn value_count(&self) -> usize {
    self.values.len()
  }

  pub fn get(&self, pos: usize) -> Result<&FlexValue, Error> {
    self.values.get(pos).ok_or_else(|| Error::NoValueAt {
      key: self.key.clone(),
      pos,
      count: self.values.len(),
    })
  }

  fn get_with<T>(
    &self,
    pos: usize,
    access: impl FnOnce(&FlexValue) -> Result<T, flex::Error>,
  ) -> Result<T, Error> {
    access(self.get(pos)?).map_err(|source| Error::Value {
      key: self.key.clone(),
      source,
    })
  }

  pub fn get_as_name(&self, pos: usize) -> Result<Name, Error> {
    self.get_with(pos, FlexValue::as_name)
  }

  pub fn get_as_string(&self, pos: usize) -> Result<String, Error> {
    self.get_with(pos, |v| v.as_str().map(str::to_owned))
  }

  pub fn get_as_asset(&self, pos: usize) -> Result<Asset, Error> {
    self.get_with(pos, FlexValue::as_asset)
  }

  pub fn get_as_time_point(&self, pos: usize) -> Result<TimePoint, Error> {
    self.get_with(pos, FlexValue::as_time_point)
  }

  pub fn get_as_int64(&self, pos: usize) -> Result<i64, Error> {
    self.get_with(pos, FlexValue::as_int64)
  }

  pub fn get_as_uint32(&self, pos: usize) -> Result<u32, Error> {
    self.get_with(pos, FlexValue::as_uint32)
  }

  pub fn get_as_uint64(&self, pos: usize) -> Result<u64, Error> {
    self.get_with(pos, FlexValue::as_uint64)
  }

  pub fn get_as_checksum256(&self, pos: usize) -> Result<Checksum256, Error> {
    self.get_with(pos, FlexValue::as_checksum256)
  }
}

/// Arguments of the actions that set, append to or clip a setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifySettingArgs {
  pub setter: Name,
  pub key: String,
  pub value: FlexValue,
}

impl Pack for ModifySettingArgs {
  fn pack<B: BufMut>(&self, out: &mut B) {
    self.setter.pack(out);
    self.key.pack(out);
    self.value.pack(out);
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EraseSettingArgs {
  pub setter: Name,
  pub key: String,
}

impl Pack for EraseSettingArgs {
  fn pack<B: BufMut>(&self, out: &mut B) {
    self.setter.pack(out);
    self.key.pack(out);
  }
}
