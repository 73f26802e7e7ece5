use cosmwasm_schema::cw_serde;
use cosmwasm_std::Decimal;
use cw_storage_plus::Map;

use crate::OracleError;

mod prophecy;

pub use prophecy::{Prophecy, ProphecyId, Status, ValidatorClaim};

pub const PROPHECIES_NAMESPACE: &str = "oracle/prophecies";

/// Typed access to the stored prophecies.  The map is generic over the claim content so it is
/// built on demand rather than kept in a `const`.
pub fn prophecies<'a, T>() -> Map<'a, &'a str, Prophecy<T>> {
    Map::new(PROPHECIES_NAMESPACE)
}

#[cw_serde]
pub struct Config {
    // The fraction of the total voting power that must back a single claim before the prophecy
    // succeeds.
    pub consensus_needed: Decimal,
}

impl Config {
    pub const fn new(consensus_needed: Decimal) -> Self {
        Self { consensus_needed }
    }

    pub fn validate(&self) -> Result<(), OracleError> {
        if self.consensus_needed.is_zero() || self.consensus_needed > Decimal::one() {
            return Err(OracleError::InvalidConsensusNeeded(
                self.consensus_needed.to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(Decimal::percent(70))
    }
}
