mod builder;
mod config;
mod error;
mod executor;
mod history;
mod http;
mod pager;
mod retry;
mod transport;

pub use {
  builder::{
    ActionPayload,
    ProposalResponse,
    TransactionBuilder,
    DEFAULT_EXPIRATION,
    DEFAULT_MSIG_ACCOUNT,
  },
  config::{ClientConfig, Error as ConfigError},
  error::Error,
  executor::RpcExecutor,
  history::{ActionHistory, DEFAULT_HEAD_LOOKAHEAD},
  http::{parse_api_error, HttpTransport},
  pager::{ScopedRow, TablePager, DEFAULT_PAGE_SIZE, DEFAULT_SCOPE_PAGE_SIZE},
  retry::{RetryPolicy, TransientCondition},
  transport::{
    AbiEncoder,
    AbiError,
    Block,
    BlockAction,
    BlockTransaction,
    ChainInfo,
    PushResponse,
    RemoteError,
    RemoteErrorKind,
    Row,
    ScopePage,
    Signer,
    SignerError,
    Sleep,
    TableRowPage,
    TableRowsRequest,
    TableScope,
    TableScopesRequest,
    ThreadSleep,
    Transport,
  },
};
