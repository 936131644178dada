use {
  crate::codec::{self, Pack, Unpack},
  bytes::{Buf, BufMut},
  serde::{Deserialize, Deserializer, Serialize, Serializer},
  std::{
    fmt::{Debug, Display},
    str::FromStr,
    time::{Duration, SystemTime, UNIX_EPOCH},
  },
  thiserror::Error,
  time::{
    format_description::FormatItem,
    macros::format_description,
    OffsetDateTime,
    PrimitiveDateTime,
  },
};

const PARSE_FORMAT: &[FormatItem<'static>] = format_description!(
  "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
);
const MILLIS_FORMAT: &[FormatItem<'static>] = format_description!(
  "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]"
);
const MICROS_FORMAT: &[FormatItem<'static>] = format_description!(
  "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]"
);
const SECONDS_FORMAT: &[FormatItem<'static>] =
  format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("Timestamp {0:?} is not in YYYY-MM-DDTHH:MM:SS[.ffffff] form")]
  InvalidFormat(String),

  #[error("Timestamp {0:?} is out of range")]
  OutOfRange(String),
}

fn parse_utc(s: &str) -> Result<OffsetDateTime, Error> {
  // nodes sometimes append a zulu designator, the value is always UTC
  let trimmed = s.strip_suffix('Z').unwrap_or(s);
  PrimitiveDateTime::parse(trimmed, PARSE_FORMAT)
    .map(PrimitiveDateTime::assume_utc)
    .map_err(|_| Error::InvalidFormat(s.to_owned()))
}

/// Microseconds since the Unix epoch, UTC.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimePoint(i64);

impl TimePoint {
  pub const fn from_micros(micros: i64) -> Self {
    Self(micros)
  }

  pub const fn as_micros(&self) -> i64 {
    self.0
  }

  pub fn now() -> Self {
    Self::from(SystemTime::now())
  }

  /// Calendar form, only for years the text format can carry.
  fn to_datetime(self) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(self.0) * 1000)
      .ok()
      .filter(|dt| (0..=9999).contains(&dt.year()))
  }
}

impl From<SystemTime> for TimePoint {
  fn from(value: SystemTime) -> Self {
    let micros = match value.duration_since(UNIX_EPOCH) {
      Ok(after) => after.as_micros() as i64,
      Err(before) => -(before.duration().as_micros() as i64),
    };
    Self(micros)
  }
}

impl FromStr for TimePoint {
  type Err = Error;

  /// Accepts the calendar form and the raw `<micros>us` form that
  /// `Display` falls back to outside years 0 to 9999.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if let Some(micros) = s.strip_suffix("us") {
      return micros
        .parse()
        .map(Self)
        .map_err(|_| Error::InvalidFormat(s.to_owned()));
    }
    let nanos = parse_utc(s)?.unix_timestamp_nanos();
    i64::try_from(nanos / 1000)
      .map(Self)
      .map_err(|_| Error::OutOfRange(s.to_owned()))
  }
}

impl Display for TimePoint {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let format = if self.0 % 1000 == 0 {
      MILLIS_FORMAT
    } else {
      MICROS_FORMAT
    };
    match self.to_datetime().and_then(|dt| dt.format(format).ok()) {
      Some(rendered) => f.write_str(&rendered),
      None => write!(f, "{}us", self.0),
    }
  }
}

impl Debug for TimePoint {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "time_point({self})")
  }
}

/// Whole seconds since the Unix epoch, used for transaction expiration.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimePointSec(u32);

impl TimePointSec {
  pub const fn from_secs(secs: u32) -> Self {
    Self(secs)
  }

  pub const fn as_secs(&self) -> u32 {
    self.0
  }

  /// Saturates at the bounds of the 32-bit representation.
  pub fn saturating_add(self, duration: Duration) -> Self {
    let secs = u32::try_from(duration.as_secs()).unwrap_or(u32::MAX);
    Self(self.0.saturating_add(secs))
  }
}

impl From<TimePoint> for TimePointSec {
  fn from(value: TimePoint) -> Self {
    let secs = value.0.div_euclid(1_000_000);
    Self(u32::try_from(secs.max(0)).unwrap_or(u32::MAX))
  }
}

impl FromStr for TimePointSec {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let secs = parse_utc(s)?.unix_timestamp();
    u32::try_from(secs)
      .map(Self)
      .map_err(|_| Error::OutOfRange(s.to_owned()))
  }
}

impl Display for TimePointSec {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match OffsetDateTime::from_unix_timestamp(i64::from(self.0))
      .ok()
      .and_then(|dt| dt.format(SECONDS_FORMAT).ok())
    {
      Some(rendered) => f.write_str(&rendered),
      None => write!(f, "{}s", self.0),
    }
  }
}

impl Debug for TimePointSec {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "time_point_sec({self})")
  }
}

macro_rules! string_serde {
  ($ty:ty) => {
    impl Serialize for $ty {
      fn serialize<S: Serializer>(
        &self,
        serializer: S,
      ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
      }
    }

    impl<'de> Deserialize<'de> for $ty {
      fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
      ) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
      }
    }
  };
}

string_serde!(TimePoint);
string_serde!(TimePointSec);

impl Pack for TimePoint {
  fn pack<B: BufMut>(&self, out: &mut B) {
    self.0.pack(out);
  }
}

impl Unpack for TimePoint {
  fn unpack<B: Buf>(buf: &mut B) -> Result<Self, codec::Error> {
    Ok(Self(i64::unpack(buf)?))
  }
}

impl Pack for TimePointSec {
  fn pack<B: BufMut>(&self, out: &mut B) {
    self.0.pack(out);
  }
}

impl Unpack for TimePointSec {
  fn unpack<B: Buf>(buf: &mut B) -> Result<Self, codec::Error> {
    Ok(Self(u32::unpack(buf)?))
  }
}

#[cfg(test)]
mod tests {
  use {
    super::{TimePoint, TimePointSec},
    std::time::Duration,
  };

  #[test]
  fn renders_milliseconds_by_default() {
    let tp = TimePoint::from_micros(1_577_836_800_123_000);
    assert_eq!(tp.to_string(), "2020-01-01T00:00:00.123");
    assert_eq!("2020-01-01T00:00:00.123".parse::<TimePoint>().unwrap(), tp);
  }

  #[test]
  fn keeps_sub_millisecond_precision() {
    let tp = TimePoint::from_micros(1_577_836_800_123_456);
    assert_eq!(tp.to_string(), "2020-01-01T00:00:00.123456");
    assert_eq!(tp.to_string().parse::<TimePoint>().unwrap(), tp);
  }

  #[test]
  fn accepts_missing_fraction_and_zulu() {
    let expected = TimePoint::from_micros(1_577_836_800_000_000);
    assert_eq!("2020-01-01T00:00:00".parse::<TimePoint>().unwrap(), expected);
    assert_eq!("2020-01-01T00:00:00.000Z".parse::<TimePoint>().unwrap(), expected);
    assert!("2020-01-01 00:00:00".parse::<TimePoint>().is_err());
  }

  #[test]
  fn out_of_calendar_range_uses_raw_micros() {
    let edges = [
      i64::MAX,
      i64::MIN,
      300_000_000_000_000_000,
      -62_200_000_000_000_000,
    ];
    for micros in edges {
      let tp = TimePoint::from_micros(micros);
      assert_eq!(tp.to_string(), format!("{micros}us"));
      assert_eq!(tp.to_string().parse::<TimePoint>().unwrap(), tp);
    }
    let last = "9999-12-31T23:59:59.999999".parse::<TimePoint>().unwrap();
    assert_eq!(last.to_string(), "9999-12-31T23:59:59.999999");
    assert!("12xus".parse::<TimePoint>().is_err());
  }

  #[test]
  fn seconds_precision() {
    let tp: TimePointSec = "2020-01-01T00:00:30".parse().unwrap();
    assert_eq!(tp.as_secs(), 1_577_836_830);
    assert_eq!(tp.to_string(), "2020-01-01T00:00:30");
    assert_eq!(
      tp.saturating_add(Duration::from_secs(30)).to_string(),
      "2020-01-01T00:01:00"
    );
    assert_eq!(
      TimePointSec::from(TimePoint::from_micros(1_577_836_830_999_999)),
      tp
    );
  }
}
