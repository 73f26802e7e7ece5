use anyhow::{ensure, Context};
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Coin};
use cw_storage_plus::Map;
use oracle::ProphecyId;

use crate::BridgeError;

mod address;
pub mod claim;

pub use address::EthereumAddress;
pub use claim::{prophecy_id, ClaimType, OracleClaimContent, Witness};

pub const SETTLEMENTS: Map<&str, Settlement> = Map::new("ethbridge/settlements");

pub const DEFAULT_MODULE_NAME: &str = "ethbridge";
pub const DEFAULT_PEGGED_COIN_PREFIX: &str = "peggy/";

#[cw_serde]
pub struct Config {
    // The module account that holds minted, locked and to-be-burned coins.
    pub module_name: String,

    // Prepended to ethereum token symbols to form the denom of their pegged representation.
    pub pegged_coin_prefix: String,

    pub oracle: oracle::Config,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            !self.module_name.is_empty(),
            BridgeError::InvalidConfig("empty module name".into())
        );
        ensure!(
            !self.pegged_coin_prefix.is_empty(),
            BridgeError::InvalidConfig("empty pegged coin prefix".into())
        );

        self.oracle
            .validate()
            .context("invalid oracle configuration")
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            module_name: DEFAULT_MODULE_NAME.into(),
            pegged_coin_prefix: DEFAULT_PEGGED_COIN_PREFIX.into(),
            oracle: oracle::Config::default(),
        }
    }
}

/// Record of the economic action taken for a successful prophecy.  Its presence marks the
/// prophecy as settled.
#[cw_serde]
pub struct Settlement {
    pub id: ProphecyId,
    pub claim_type: ClaimType,
    pub receiver: Addr,
    pub coin: Coin,
}
