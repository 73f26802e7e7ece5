//! Bridges ethereum assets into a Cosmos chain.
//!
//! Validators attest to lock and burn events observed on ethereum by submitting an
//! [`EthBridgeClaim`](msg::EthBridgeClaim).  Claims about the same event are aggregated by the
//! `oracle` crate and, once enough voting power agrees, the [`Keeper`] mints the claimed coins
//! and delivers them to the receiver.  Users move coins the other way with
//! [`MsgLock`](msg::MsgLock) and [`MsgBurn`](msg::MsgBurn).

pub mod contract;
mod error;
#[cfg(any(test, feature = "fake"))]
pub mod fake;
pub mod keeper;
pub mod msg;
pub mod querier;
pub mod state;

pub use error::{error_code, AnyError, BridgeError};
pub use keeper::{Keeper, SupplyKeeper};
