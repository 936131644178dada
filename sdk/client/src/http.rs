use {
  crate::{
    config::ClientConfig,
    transport::{
      Block,
      ChainInfo,
      PushResponse,
      RemoteError,
      RemoteErrorKind,
      ScopePage,
      TableRowPage,
      TableRowsRequest,
      TableScopesRequest,
      Transport,
    },
  },
  ledger_primitives::SignedTransaction,
  reqwest::blocking::Client,
  serde::{de::DeserializeOwned, Deserialize, Serialize},
  serde_json::json,
  std::{error::Error as StdError, io, time::Duration},
  tracing::debug,
};

/// [`Transport`] over the node's HTTP chain API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
  client: Client,
  endpoint: String,
}

impl HttpTransport {
  pub fn new(
    endpoint: impl Into<String>,
    timeout: Duration,
  ) -> Result<Self, reqwest::Error> {
    let endpoint: String = endpoint.into();
    Ok(Self {
      client: Client::builder().timeout(timeout).build()?,
      endpoint: endpoint.trim_end_matches('/').to_owned(),
    })
  }

  pub fn from_config(config: &ClientConfig) -> Result<Self, reqwest::Error> {
    Self::new(config.endpoint.clone(), config.http_timeout)
  }

  pub fn endpoint(&self) -> &str {
    &self.endpoint
  }

  /// Posts `body` to `/v1/{api}/{path}`.
  fn call<B, R>(
    &self,
    api: &str,
    path: &str,
    body: &B,
  ) -> Result<R, RemoteError>
  where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
  {
    let url = format!("{}/v1/{api}/{path}", self.endpoint);
    debug!("POST {url}");

    let response = self
      .client
      .post(&url)
      .json(body)
      .send()
      .map_err(from_reqwest)?;
    let status = response.status();
    let text = response.text().map_err(from_reqwest)?;

    if !status.is_success() {
      return Err(parse_api_error(status.as_u16(), &text));
    }

    serde_json::from_str(&text).map_err(|e| {
      RemoteError::new(
        RemoteErrorKind::Decode,
        format!("invalid {path} response: {e}"),
      )
    })
  }
}

impl Transport for HttpTransport {
  fn chain_info(&self) -> Result<ChainInfo, RemoteError> {
    self.call("chain", "get_info", &json!({}))
  }

  fn push_transaction(
    &self,
    trx: &SignedTransaction,
  ) -> Result<PushResponse, RemoteError> {
    self.call("chain", "push_transaction", &trx.to_packed())
  }

  fn get_table_rows(
    &self,
    request: &TableRowsRequest,
  ) -> Result<TableRowPage, RemoteError> {
    self.call("chain", "get_table_rows", request)
  }

  fn get_table_by_scope(
    &self,
    request: &TableScopesRequest,
  ) -> Result<ScopePage, RemoteError> {
    self.call("chain", "get_table_by_scope", request)
  }

  fn get_block(&self, block_num: u32) -> Result<Block, RemoteError> {
    self.call("trace_api", "get_block", &json!({ "block_num": block_num }))
  }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
  #[serde(default)]
  message: String,
  error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
  #[serde(default)]
  code: i64,
  #[serde(default)]
  name: String,
  #[serde(default)]
  what: String,
  #[serde(default)]
  details: Vec<ApiErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorMessage {
  #[serde(default)]
  message: String,
}

/// Maps a non-success response body to a [`RemoteError`].
///
/// Chain errors keep their exception code and name. The detail messages
/// are folded into the message text since they often carry the only
/// useful explanation, such as an assertion message.
pub fn parse_api_error(status: u16, body: &str) -> RemoteError {
  let parsed = match serde_json::from_str::<ApiErrorBody>(body) {
    Ok(parsed) => parsed,
    Err(_) => {
      return RemoteError::new(
        RemoteErrorKind::Http { status },
        format!("HTTP {status}: {body}"),
      )
    }
  };

  let detail = match parsed.error {
    Some(detail) => detail,
    None => {
      return RemoteError::new(
        RemoteErrorKind::Http { status },
        format!("HTTP {status}: {}", parsed.message),
      )
    }
  };

  let mut message = if detail.what.is_empty() {
    parsed.message
  } else {
    detail.what
  };
  for item in detail.details.iter().filter(|d| !d.message.is_empty()) {
    message.push_str(": ");
    message.push_str(&item.message);
  }

  RemoteError::chain(detail.code, detail.name, message)
}

fn from_reqwest(error: reqwest::Error) -> RemoteError {
  let message = describe(&error);
  let kind = if error.is_timeout() {
    RemoteErrorKind::Timeout
  } else if io_error_kind(&error) == Some(io::ErrorKind::ConnectionReset) {
    RemoteErrorKind::ConnectionReset
  } else if error.is_connect() {
    RemoteErrorKind::Connect
  } else if error.is_decode() {
    RemoteErrorKind::Decode
  } else {
    RemoteErrorKind::Other
  };
  RemoteError::new(kind, message)
}

/// The error and all of its causes, so that text matching sees the
/// underlying io error.
fn describe(error: &(dyn StdError + 'static)) -> String {
  let mut message = error.to_string();
  let mut source = error.source();
  while let Some(cause) = source {
    message.push_str(": ");
    message.push_str(&cause.to_string());
    source = cause.source();
  }
  message
}

fn io_error_kind(error: &(dyn StdError + 'static)) -> Option<io::ErrorKind> {
  let mut current = Some(error);
  while let Some(err) = current {
    if let Some(io) = err.downcast_ref::<io::Error>() {
      return Some(io.kind());
    }
    current = err.source();
  }
  None
}
