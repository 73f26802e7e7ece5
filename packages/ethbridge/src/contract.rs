use cosmwasm_std::{
    to_json_binary, Addr, Binary, Deps, DepsMut, Event, MessageInfo, Response,
};
use log::warn;
use oracle::{StakingKeeper, Status};

use crate::{
    error::AnyError,
    keeper::{Keeper, SupplyKeeper},
    msg::{EthBridgeClaim, ExecuteMsg, MsgBurn, MsgLock, QueryMsg},
    querier::{
        query_all_prophecies, query_eth_prophecy, query_prophecy, query_settlement,
    },
    state::Settlement,
    BridgeError,
};

/// Handles one transaction message.  Returning an error leaves the host to discard every state
/// change made while handling the message.
pub fn execute<B, S>(
    deps: DepsMut,
    keeper: &mut Keeper<B, S>,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, AnyError>
where
    B: SupplyKeeper,
    S: StakingKeeper,
{
    match msg {
        ExecuteMsg::Lock(msg) => lock(deps, keeper, info, msg),
        ExecuteMsg::Burn(msg) => burn(deps, keeper, info, msg),
        ExecuteMsg::CreateEthBridgeClaim(claim) => {
            create_eth_bridge_claim(deps, keeper, info, claim)
        }
    }
}

fn ensure_signer(info: &MessageInfo, expected: &Addr) -> Result<(), BridgeError> {
    if info.sender != *expected {
        return Err(BridgeError::Unauthorized {
            expected: expected.to_string(),
            actual: info.sender.to_string(),
        });
    }

    Ok(())
}

fn lock<B: SupplyKeeper, S: StakingKeeper>(
    deps: DepsMut,
    keeper: &mut Keeper<B, S>,
    info: MessageInfo,
    msg: MsgLock,
) -> Result<Response, AnyError> {
    msg.validate_basic(deps.api)?;
    let sender = msg.sender(deps.api)?;
    ensure_signer(&info, &sender)?;

    let coin = msg.coin();
    keeper.process_lock(&sender, &[coin.clone()])?;

    let evt = Event::new("lock")
        .add_attribute("ethereum_chain_id", msg.ethereum_chain_id.to_string())
        .add_attribute("cosmos_sender", sender)
        .add_attribute("ethereum_receiver", msg.ethereum_receiver.to_lowercase())
        .add_attribute("amount", coin.amount.to_string())
        .add_attribute("symbol", coin.denom);

    Ok(Response::new()
        .add_attribute("action", "lock")
        .add_attribute("owner", info.sender)
        .add_event(evt))
}

fn burn<B: SupplyKeeper, S: StakingKeeper>(
    deps: DepsMut,
    keeper: &mut Keeper<B, S>,
    info: MessageInfo,
    msg: MsgBurn,
) -> Result<Response, AnyError> {
    msg.validate_basic(deps.api, &keeper.config().pegged_coin_prefix)?;
    let sender = msg.sender(deps.api)?;
    ensure_signer(&info, &sender)?;

    let coin = msg.coin();
    keeper.process_burn(&sender, &[coin.clone()])?;

    let evt = Event::new("burn")
        .add_attribute("ethereum_chain_id", msg.ethereum_chain_id.to_string())
        .add_attribute("cosmos_sender", sender)
        .add_attribute("ethereum_receiver", msg.ethereum_receiver.to_lowercase())
        .add_attribute("amount", coin.amount.to_string())
        .add_attribute("symbol", coin.denom);

    Ok(Response::new()
        .add_attribute("action", "burn")
        .add_attribute("owner", info.sender)
        .add_event(evt))
}

fn create_eth_bridge_claim<B: SupplyKeeper, S: StakingKeeper>(
    deps: DepsMut,
    keeper: &mut Keeper<B, S>,
    info: MessageInfo,
    msg: EthBridgeClaim,
) -> Result<Response, AnyError> {
    let claim = msg.to_oracle_claim(deps.api)?;
    ensure_signer(&info, &claim.validator)?;

    let status = keeper.process_claim(deps.storage, &claim)?;
    let id = &claim.id;
    let witness = claim.content.witness();

    let mut resp = Response::new()
        .add_attribute("action", "create_claim")
        .add_attribute("owner", info.sender)
        .add_event(
            Event::new("create_claim")
                .add_attribute("prophecy_id", id.as_str())
                .add_attribute("validator", claim.validator.as_str())
                .add_attribute("claim_type", msg.claim_type.to_string())
                .add_attribute("cosmos_receiver", witness.cosmos_receiver.as_str())
                .add_attribute("amount", witness.amount.to_string())
                .add_attribute("symbol", &witness.symbol),
        )
        .add_event(
            Event::new("prophecy_status")
                .add_attribute("prophecy_id", id.as_str())
                .add_attribute("status", status.text()),
        );

    match &status {
        Status::Success(content) => {
            let settlement = keeper.process_successful_claim(deps.storage, id, content)?;
            resp = resp.add_event(settlement_event(&settlement));
        }
        Status::Failed => warn!("prophecy {id} failed to reach consensus"),
        Status::Pending => {}
    }

    Ok(resp.set_data(to_json_binary(&status)?))
}

fn settlement_event(s: &Settlement) -> Event {
    Event::new("settlement")
        .add_attribute("prophecy_id", s.id.as_str())
        .add_attribute("claim_type", s.claim_type.to_string())
        .add_attribute("receiver", s.receiver.as_str())
        .add_attribute("amount", s.coin.amount.to_string())
        .add_attribute("symbol", &s.coin.denom)
}

pub fn query(deps: Deps, msg: QueryMsg) -> Result<Binary, AnyError> {
    match msg {
        QueryMsg::EthProphecy(params) => {
            Ok(to_json_binary(&query_eth_prophecy(deps, &params)?)?)
        }
        QueryMsg::Prophecy { id } => Ok(to_json_binary(&query_prophecy(deps, &id)?)?),
        QueryMsg::AllProphecies { start_after, limit } => {
            Ok(to_json_binary(&query_all_prophecies(deps, start_after, limit)?)?)
        }
        QueryMsg::Settlement { id } => Ok(to_json_binary(&query_settlement(deps, &id)?)?),
    }
}
