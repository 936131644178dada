use {
  crate::{
    builder::{DEFAULT_EXPIRATION, DEFAULT_MSIG_ACCOUNT},
    pager::{DEFAULT_PAGE_SIZE, DEFAULT_SCOPE_PAGE_SIZE},
    retry::RetryPolicy,
  },
  ledger_primitives::Name,
  std::{fmt::Display, str::FromStr, time::Duration},
  thiserror::Error,
};

pub const ENDPOINT_VAR: &str = "LEDGER_RPC_ENDPOINT";
pub const MAX_ATTEMPTS_VAR: &str = "LEDGER_RPC_MAX_ATTEMPTS";
pub const RETRY_SLEEP_VAR: &str = "LEDGER_RPC_RETRY_SLEEP";
pub const PAGE_SIZE_VAR: &str = "LEDGER_RPC_PAGE_SIZE";
pub const SCOPE_PAGE_SIZE_VAR: &str = "LEDGER_RPC_SCOPE_PAGE_SIZE";
pub const TRX_EXPIRATION_VAR: &str = "LEDGER_RPC_TRX_EXPIRATION";
pub const HTTP_TIMEOUT_VAR: &str = "LEDGER_RPC_HTTP_TIMEOUT";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value {value:?} for {var}: {reason}")]
pub struct Error {
  pub var: &'static str,
  pub value: String,
  pub reason: String,
}

/// Client wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
  /// Base URL of the node HTTP API.
  pub endpoint: String,

  /// Attempts per remote call, including the first one.
  pub max_attempts: u32,

  /// Fixed pause between attempts.
  pub retry_sleep: Duration,

  /// Rows requested per table read while paginating.
  pub page_size: u32,

  /// Scopes requested per scope listing read.
  pub scope_page_size: u32,

  /// How long after the head block time transactions stay valid.
  pub trx_expiration: Duration,

  pub msig_account: Name,

  /// Deadline of a single HTTP request.
  pub http_timeout: Duration,
}

impl Default for ClientConfig {
  fn default() -> Self {
    let retry = RetryPolicy::default();
    Self {
      endpoint: "http://127.0.0.1:8888".to_owned(),
      max_attempts: retry.max_attempts,
      retry_sleep: retry.sleep,
      page_size: DEFAULT_PAGE_SIZE,
      scope_page_size: DEFAULT_SCOPE_PAGE_SIZE,
      trx_expiration: DEFAULT_EXPIRATION,
      msig_account: DEFAULT_MSIG_ACCOUNT,
      http_timeout: Duration::from_secs(30),
    }
  }
}

impl ClientConfig {
  /// Defaults overridden by any `LEDGER_RPC_*` environment variables.
  /// Durations use the humantime format, e.g. `2s` or `1m 30s`.
  pub fn from_env() -> Result<Self, Error> {
    Self::from_lookup(|var| std::env::var(var).ok())
  }

  pub fn from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
  ) -> Result<Self, Error> {
    let mut config = Self::default();
    if let Some(endpoint) = lookup(ENDPOINT_VAR) {
      config.endpoint = endpoint;
    }
    if let Some(value) = lookup(MAX_ATTEMPTS_VAR) {
      config.max_attempts = parse(MAX_ATTEMPTS_VAR, &value)?;
    }
    if let Some(value) = lookup(RETRY_SLEEP_VAR) {
      config.retry_sleep = parse_duration(RETRY_SLEEP_VAR, &value)?;
    }
    if let Some(value) = lookup(PAGE_SIZE_VAR) {
      config.page_size = parse(PAGE_SIZE_VAR, &value)?;
    }
    if let Some(value) = lookup(SCOPE_PAGE_SIZE_VAR) {
      config.scope_page_size = parse(SCOPE_PAGE_SIZE_VAR, &value)?;
    }
    if let Some(value) = lookup(TRX_EXPIRATION_VAR) {
      config.trx_expiration = parse_duration(TRX_EXPIRATION_VAR, &value)?;
    }
    if let Some(value) = lookup(HTTP_TIMEOUT_VAR) {
      config.http_timeout = parse_duration(HTTP_TIMEOUT_VAR, &value)?;
    }
    Ok(config)
  }

  pub fn retry_policy(&self) -> RetryPolicy {
    RetryPolicy::new(self.max_attempts, self.retry_sleep)
  }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, Error>
where
  T: FromStr,
  T::Err: Display,
{
  value.trim().parse().map_err(|e: T::Err| Error {
    var,
    value: value.to_owned(),
    reason: e.to_string(),
  })
}

fn parse_duration(var: &'static str, value: &str) -> Result<Duration, Error> {
  parse::<humantime::Duration>(var, value).map(Into::into)
}
