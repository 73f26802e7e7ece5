use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Api, Coin, Uint128};
use oracle::{Prophecy, ProphecyId, Status};

use crate::{
    state::{prophecy_id, ClaimType, EthereumAddress, OracleClaimContent, Settlement, Witness},
    BridgeError,
};

/// A validator's attestation that an event happened on ethereum.  The field order is the one
/// used by the relayer that produces these claims.
#[cw_serde]
pub struct EthBridgeClaim {
    pub ethereum_chain_id: i64,
    pub bridge_contract_address: String,
    // Monotonic per bridge contract.
    pub nonce: i64,
    pub symbol: String,
    pub token_contract_address: String,
    pub ethereum_sender: String,
    pub cosmos_receiver: String,
    pub validator_address: String,
    pub amount: i64,
    pub claim_type: ClaimType,
}

/// A validated claim in the form the oracle aggregates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleClaim {
    pub id: ProphecyId,
    // Canonical form of `EthBridgeClaim::validator_address`.
    pub validator: Addr,
    pub content: OracleClaimContent,
}

impl EthBridgeClaim {
    /// Runs the stateless checks on the claim.  The first failing check determines the error.
    pub fn validate_basic(&self, api: &dyn Api) -> Result<(), BridgeError> {
        self.to_oracle_claim(api).map(drop)
    }

    /// Validates the claim and splits it into the id of the prophecy it belongs to, the
    /// validator that made it and the content that validators must agree on.  Host addresses are
    /// stored in canonical form so that differently spelled claims about the same event agree.
    pub fn to_oracle_claim(&self, api: &dyn Api) -> Result<OracleClaim, BridgeError> {
        let receiver = host_address(api, &self.cosmos_receiver, "cosmos receiver")?;
        let validator = host_address(api, &self.validator_address, "cosmos validator")?;

        if self.nonce < 0 {
            return Err(BridgeError::InvalidEthNonce);
        }

        let sender = parse_eth_address(&self.ethereum_sender, "ethereum sender address")?;
        parse_eth_address(
            &self.bridge_contract_address,
            "ethereum bridge contract address",
        )?;
        let token = parse_eth_address(
            &self.token_contract_address,
            "ethereum token contract address",
        )?;

        if self.symbol.eq_ignore_ascii_case("eth") && !token.is_zero() {
            return Err(BridgeError::InvalidEthSymbol);
        }

        if self.amount <= 0 {
            return Err(BridgeError::InvalidAmount);
        }

        if self.symbol.is_empty() {
            return Err(BridgeError::InvalidSymbol);
        }

        let witness = Witness {
            cosmos_receiver: receiver,
            amount: Uint128::from(self.amount.unsigned_abs()),
            symbol: self.symbol.to_lowercase(),
            token_contract_address: token,
        };

        Ok(OracleClaim {
            id: prophecy_id(self.ethereum_chain_id, self.nonce, &sender),
            validator,
            content: OracleClaimContent::new(self.claim_type, witness),
        })
    }

    /// Rebuilds the claim that `validator` submitted from the coordinates of its prophecy and the
    /// content the oracle stored for it.  Fails with `BridgeError::Marshal` if the result is not a
    /// well-formed claim.
    pub fn from_oracle_claim(
        api: &dyn Api,
        ethereum_chain_id: i64,
        bridge_contract_address: &EthereumAddress,
        nonce: i64,
        ethereum_sender: &EthereumAddress,
        validator: &str,
        content: &OracleClaimContent,
    ) -> Result<Self, BridgeError> {
        let w = content.witness();
        let amount = i64::try_from(w.amount.u128()).map_err(|_| {
            BridgeError::Marshal(format!(
                "amount {} claimed by validator {validator} does not fit in an i64",
                w.amount
            ))
        })?;

        let claim = EthBridgeClaim {
            ethereum_chain_id,
            bridge_contract_address: bridge_contract_address.to_string(),
            nonce,
            symbol: w.symbol.clone(),
            token_contract_address: w.token_contract_address.to_string(),
            ethereum_sender: ethereum_sender.to_string(),
            cosmos_receiver: w.cosmos_receiver.to_string(),
            validator_address: validator.into(),
            amount,
            claim_type: content.claim_type(),
        };

        claim.validate_basic(api).map_err(|e| {
            BridgeError::Marshal(format!("claim from validator {validator:?}: {e}"))
        })?;

        Ok(claim)
    }
}

/// Locks host chain coins in the bridge module so that they can be claimed on ethereum.
#[cw_serde]
pub struct MsgLock {
    pub cosmos_sender: String,
    pub amount: i64,
    pub symbol: String,
    pub ethereum_chain_id: i64,
    pub ethereum_receiver: String,
}

impl MsgLock {
    pub fn validate_basic(&self, api: &dyn Api) -> Result<(), BridgeError> {
        validate_outbound(
            api,
            self.ethereum_chain_id,
            &self.cosmos_sender,
            &self.ethereum_receiver,
            self.amount,
        )?;

        if self.symbol.is_empty() {
            return Err(BridgeError::InvalidSymbol);
        }

        Ok(())
    }

    /// The canonical address of the account the coins are taken from.
    pub fn sender(&self, api: &dyn Api) -> Result<Addr, BridgeError> {
        host_address(api, &self.cosmos_sender, "cosmos sender")
    }

    /// The coins moved by this message.  Only meaningful after `validate_basic` succeeded.
    pub fn coin(&self) -> Coin {
        Coin::new(u128::from(self.amount.unsigned_abs()), &self.symbol)
    }
}

/// Burns pegged coins so that the original tokens can be released on ethereum.
#[cw_serde]
pub struct MsgBurn {
    pub cosmos_sender: String,
    pub amount: i64,
    pub symbol: String,
    pub ethereum_chain_id: i64,
    pub ethereum_receiver: String,
}

impl MsgBurn {
    pub fn validate_basic(
        &self,
        api: &dyn Api,
        pegged_coin_prefix: &str,
    ) -> Result<(), BridgeError> {
        validate_outbound(
            api,
            self.ethereum_chain_id,
            &self.cosmos_sender,
            &self.ethereum_receiver,
            self.amount,
        )?;

        let invalid = || BridgeError::InvalidBurnSymbol(pegged_coin_prefix.into());
        if self.symbol.len() <= pegged_coin_prefix.len() + 1 {
            return Err(invalid());
        }

        match self.symbol.strip_prefix(pegged_coin_prefix) {
            Some(suffix) if !suffix.is_empty() => Ok(()),
            _ => Err(invalid()),
        }
    }

    /// The canonical address of the account the coins are burned from.
    pub fn sender(&self, api: &dyn Api) -> Result<Addr, BridgeError> {
        host_address(api, &self.cosmos_sender, "cosmos sender")
    }

    /// The coins moved by this message.  Only meaningful after `validate_basic` succeeded.
    pub fn coin(&self) -> Coin {
        Coin::new(u128::from(self.amount.unsigned_abs()), &self.symbol)
    }
}

// Checks shared by the messages that move coins from the host chain to ethereum.
fn validate_outbound(
    api: &dyn Api,
    ethereum_chain_id: i64,
    cosmos_sender: &str,
    ethereum_receiver: &str,
    amount: i64,
) -> Result<(), BridgeError> {
    if ethereum_chain_id <= 0 {
        return Err(BridgeError::InvalidEthereumChainId(ethereum_chain_id));
    }

    host_address(api, cosmos_sender, "cosmos sender")?;

    if ethereum_receiver.is_empty() {
        return Err(BridgeError::InvalidEthAddress(
            "empty ethereum receiver address string".into(),
        ));
    }

    parse_eth_address(ethereum_receiver, "ethereum receiver")?;

    if amount <= 0 {
        return Err(BridgeError::InvalidAmount);
    }

    Ok(())
}

/// Validates a host chain account address and returns its canonical form.  Bech32 addresses are
/// case-insensitive, so the lower-case spelling is the one checked and kept.
pub(crate) fn host_address(api: &dyn Api, s: &str, what: &str) -> Result<Addr, BridgeError> {
    if s.is_empty() {
        return Err(BridgeError::InvalidAddress(format!(
            "empty {what} address string"
        )));
    }

    api.addr_validate(&s.to_lowercase())
        .map_err(|e| BridgeError::InvalidAddress(format!("{what} {s:?}: {e}")))
}

pub(crate) fn parse_eth_address(s: &str, what: &str) -> Result<EthereumAddress, BridgeError> {
    s.parse()
        .map_err(|e| BridgeError::InvalidEthAddress(format!("{what} {s:?}: {e:#}")))
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Lock coins in the bridge module.  Must be signed by `cosmos_sender`.
    Lock(MsgLock),

    /// Burn pegged coins.  Must be signed by `cosmos_sender`.
    Burn(MsgBurn),

    /// Submit a validator's claim about an ethereum event.  Must be signed by
    /// `validator_address`.  Once enough voting power agrees on the claim the coins are minted
    /// and delivered to the receiver as part of the same transaction.
    CreateEthBridgeClaim(EthBridgeClaim),
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(QueryEthProphecyResponse)]
    EthProphecy(QueryEthProphecyParams),
    #[returns(Prophecy<OracleClaimContent>)]
    Prophecy { id: ProphecyId },
    #[returns(AllPropheciesResponse)]
    AllProphecies {
        start_after: Option<ProphecyId>,
        limit: Option<u32>,
    },
    #[returns(Settlement)]
    Settlement { id: ProphecyId },
}

/// Coordinates of an ethereum event.  `symbol` and `token_contract_address` are accepted for
/// compatibility with the relayer; the reconstructed claims take both from the stored content.
#[cw_serde]
pub struct QueryEthProphecyParams {
    pub ethereum_chain_id: i64,
    pub bridge_contract_address: String,
    pub nonce: i64,
    pub symbol: String,
    pub token_contract_address: String,
    pub ethereum_sender: String,
}

#[cw_serde]
pub struct QueryEthProphecyResponse {
    pub id: ProphecyId,
    pub status: Status<OracleClaimContent>,
    pub claims: Vec<EthBridgeClaim>,
    // Voting power behind each entry of `claims`, measured at the last tally.
    pub powers: Vec<u64>,
    // Combined power of the active validator set at the last tally.
    pub total_power: u64,
}

#[cw_serde]
pub struct AllPropheciesResponse {
    pub prophecies: Vec<Prophecy<OracleClaimContent>>,
}
