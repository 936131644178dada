mod action;
mod asset;
mod checksum;
mod flex;
mod index;
mod msig;
mod name;
mod setting;
mod timestamp;
mod transaction;

pub mod codec;

pub use {
  action::{
    Action,
    Error as PermissionLevelError,
    PermissionLevel,
    ToPermissionLevel,
    DEFAULT_PERMISSION,
  },
  asset::{Asset, Error as AssetError, Symbol, SymbolCode},
  checksum::{Checksum256, Error as ChecksumError},
  codec::{Error as CodecError, Pack, Unpack},
  flex::{Error as FlexError, FlexKind, FlexValue},
  index::{compose, compose_u128, InvalidKeyComponent, KeyComponent},
  msig::{ApproveArgs, ExecArgs, ProposeArgs},
  name::{Error as NameError, Name, ToName},
  setting::{EraseSettingArgs, Error as SettingError, ModifySettingArgs, Setting},
  timestamp::{Error as TimeError, TimePoint, TimePointSec},
  transaction::{Extension, PackedTransaction, SignedTransaction, Transaction},
};
