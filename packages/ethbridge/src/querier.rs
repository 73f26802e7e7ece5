use anyhow::Context;
use cosmwasm_std::{Api, ConversionOverflowError, Deps, StdResult};
use oracle::{Prophecy, ProphecyId};

use crate::{
    msg::{
        parse_eth_address, AllPropheciesResponse, EthBridgeClaim, QueryEthProphecyParams,
        QueryEthProphecyResponse,
    },
    state::{prophecy_id, EthereumAddress, OracleClaimContent, Settlement, SETTLEMENTS},
    BridgeError,
};

/// Looks up the prophecy for the ethereum event described by `params` and rebuilds the claim
/// every validator submitted for it.
pub fn query_eth_prophecy(
    deps: Deps,
    params: &QueryEthProphecyParams,
) -> anyhow::Result<QueryEthProphecyResponse> {
    let sender = parse_eth_address(&params.ethereum_sender, "ethereum sender address")?;
    let bridge = parse_eth_address(
        &params.bridge_contract_address,
        "ethereum bridge contract address",
    )?;

    let id = prophecy_id(params.ethereum_chain_id, params.nonce, &sender);
    let prophecy = oracle::query_prophecy::<OracleClaimContent>(deps.storage, &id)?;
    let claims = map_oracle_claims(
        deps.api,
        params.ethereum_chain_id,
        &bridge,
        params.nonce,
        &sender,
        &prophecy,
    )?;

    Ok(QueryEthProphecyResponse {
        powers: prophecy.claims.iter().map(|c| c.power).collect(),
        total_power: prophecy.total_power,
        id: prophecy.id,
        status: prophecy.status,
        claims,
    })
}

/// Rebuilds the claims stored in `prophecy`, in the order they were submitted.  A single
/// malformed claim fails the whole reconstruction so that every counted vote stays accounted for.
pub fn map_oracle_claims(
    api: &dyn Api,
    ethereum_chain_id: i64,
    bridge_contract_address: &EthereumAddress,
    nonce: i64,
    ethereum_sender: &EthereumAddress,
    prophecy: &Prophecy<OracleClaimContent>,
) -> Result<Vec<EthBridgeClaim>, BridgeError> {
    prophecy
        .claims
        .iter()
        .map(|c| {
            EthBridgeClaim::from_oracle_claim(
                api,
                ethereum_chain_id,
                bridge_contract_address,
                nonce,
                ethereum_sender,
                &c.validator,
                &c.content,
            )
        })
        .collect()
}

pub fn query_prophecy(deps: Deps, id: &ProphecyId) -> anyhow::Result<Prophecy<OracleClaimContent>> {
    oracle::query_prophecy(deps.storage, id)
}

pub fn query_all_prophecies(
    deps: Deps,
    start_after: Option<ProphecyId>,
    limit: Option<u32>,
) -> StdResult<AllPropheciesResponse> {
    let start = start_after.as_ref().map(ProphecyId::as_str);
    let iter = oracle::query_all_prophecies::<OracleClaimContent>(deps.storage, start);

    if let Some(lim) = limit {
        let l = lim
            .try_into()
            .map_err(|_| ConversionOverflowError::new("u32", "usize", lim.to_string()))?;
        iter.take(l)
            .collect::<StdResult<Vec<_>>>()
            .map(|prophecies| AllPropheciesResponse { prophecies })
    } else {
        iter.collect::<StdResult<Vec<_>>>()
            .map(|prophecies| AllPropheciesResponse { prophecies })
    }
}

/// Query the settlement of prophecy `id`.  A prophecy that has not been settled is reported as
/// `BridgeError::SettlementNotFound`.
pub fn query_settlement(deps: Deps, id: &ProphecyId) -> anyhow::Result<Settlement> {
    SETTLEMENTS
        .may_load(deps.storage, id.as_str())
        .context("failed to load settlement")?
        .ok_or_else(|| BridgeError::SettlementNotFound(id.to_string()).into())
}
