//! Aggregation of independent validator claims about the same external event.
//!
//! Claims are grouped into a [`Prophecy`] by a caller-supplied [`ProphecyId`].  Every new claim
//! re-tallies the voting power behind each distinct claim content and may move the prophecy from
//! [`Status::Pending`] into one of the terminal states.  This crate never acts on a successful
//! prophecy: reacting to the transition is left to the caller.

mod contract;
mod error;
pub mod state;

pub use contract::{process_claim, query_all_prophecies, query_prophecy, StakingKeeper};
pub use error::OracleError;
pub use state::{Config, Prophecy, ProphecyId, Status, ValidatorClaim};
