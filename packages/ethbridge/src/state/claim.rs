use std::{fmt, str::FromStr};

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Uint128};
use oracle::ProphecyId;

use crate::{state::EthereumAddress, BridgeError};

#[cw_serde]
#[derive(Copy, Eq, PartialOrd, Ord, Hash)]
pub enum ClaimType {
    Lock,
    Burn,
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimType::Lock => f.write_str("lock"),
            ClaimType::Burn => f.write_str("burn"),
        }
    }
}

impl FromStr for ClaimType {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lock" => Ok(ClaimType::Lock),
            "burn" => Ok(ClaimType::Burn),
            _ => Err(BridgeError::InvalidClaimType),
        }
    }
}

/// The part of a witness claim that validators must agree on.  Everything that identifies the
/// event itself is already part of the prophecy id.
#[cw_serde]
#[derive(Eq)]
pub struct Witness {
    // The host chain account that receives the coins.
    pub cosmos_receiver: Addr,

    pub amount: Uint128,

    // Always lower-case.
    pub symbol: String,

    // The token contract on ethereum.  The zero address denotes ether.
    pub token_contract_address: EthereumAddress,
}

/// Structured claim content stored by the oracle.  Two claims agree exactly when their contents
/// are equal.
#[cw_serde]
#[derive(Eq)]
#[serde(tag = "type", content = "data")]
pub enum OracleClaimContent {
    // Tokens were locked in the ethereum bridge contract.
    LockWitness(Witness),
    // Pegged tokens were burned on ethereum.
    BurnWitness(Witness),
}

impl OracleClaimContent {
    pub fn new(claim_type: ClaimType, witness: Witness) -> Self {
        match claim_type {
            ClaimType::Lock => OracleClaimContent::LockWitness(witness),
            ClaimType::Burn => OracleClaimContent::BurnWitness(witness),
        }
    }

    pub fn claim_type(&self) -> ClaimType {
        match self {
            OracleClaimContent::LockWitness(_) => ClaimType::Lock,
            OracleClaimContent::BurnWitness(_) => ClaimType::Burn,
        }
    }

    pub fn witness(&self) -> &Witness {
        match self {
            OracleClaimContent::LockWitness(w) | OracleClaimContent::BurnWitness(w) => w,
        }
    }
}

/// Derives the id of the prophecy that groups every claim about the ethereum event identified by
/// `chain_id`, `nonce` and `sender`.
pub fn prophecy_id(chain_id: i64, nonce: i64, sender: &EthereumAddress) -> ProphecyId {
    ProphecyId::new(format!("{chain_id}/{nonce}/{sender}"))
}
