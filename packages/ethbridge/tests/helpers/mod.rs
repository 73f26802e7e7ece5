#![allow(dead_code)]

use std::marker::PhantomData;

use cosmwasm_std::{
    from_json,
    testing::{mock_info, MockQuerier, MockStorage},
    Decimal, OwnedDeps, Response,
};
use ethbridge::{
    contract::{execute, query},
    fake::{FakeApi, MockBank, MockStaking},
    msg::{
        EthBridgeClaim, ExecuteMsg, MsgBurn, MsgLock, QueryEthProphecyParams,
        QueryEthProphecyResponse, QueryMsg,
    },
    state::{ClaimType, Config, OracleClaimContent, Settlement},
    AnyError, Keeper,
};
use oracle::{Prophecy, ProphecyId};

pub const VALIDATORS: [&str; 3] = ["cosmosvaloper1", "cosmosvaloper2", "cosmosvaloper3"];
pub const BRIDGE: &str = "0xc4a5b7f0c1e8b8e1a1b5b8d9e4f1a2b3c4d5e6f7";
pub const ETH_SENDER: &str = "0x7b95b6ec7ebd73572c2b1a2b202f1a3a1a5c3e7f";
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";
pub const RECEIVER: &str = "cosmos1receiver";
pub const USER: &str = "cosmos1user";
pub const THIEF: &str = "cosmos1thief";
pub const CHAIN_ID: i64 = 3;

pub struct Bridge {
    deps: OwnedDeps<MockStorage, FakeApi, MockQuerier>,
    keeper: Keeper<MockBank, MockStaking>,
    bank: MockBank,
    staking: MockStaking,
}

impl Bridge {
    pub fn bank(&self) -> &MockBank {
        &self.bank
    }

    pub fn staking(&self) -> &MockStaking {
        &self.staking
    }

    /// Makes `addr` a valid host address without giving it any voting power.
    pub fn register_address(&mut self, addr: &str) {
        self.deps.api.register(addr);
    }

    pub fn execute(&mut self, sender: &str, msg: ExecuteMsg) -> Result<Response, AnyError> {
        execute(
            self.deps.as_mut(),
            &mut self.keeper,
            mock_info(sender, &[]),
            msg,
        )
    }

    /// Submits `claim` signed by its own validator.
    pub fn submit(&mut self, claim: EthBridgeClaim) -> Result<Response, AnyError> {
        let sender = claim.validator_address.clone();
        self.execute(&sender, ExecuteMsg::CreateEthBridgeClaim(claim))
    }

    pub fn lock(&mut self, msg: MsgLock) -> Result<Response, AnyError> {
        let sender = msg.cosmos_sender.clone();
        self.execute(&sender, ExecuteMsg::Lock(msg))
    }

    pub fn burn(&mut self, msg: MsgBurn) -> Result<Response, AnyError> {
        let sender = msg.cosmos_sender.clone();
        self.execute(&sender, ExecuteMsg::Burn(msg))
    }

    pub fn query_eth_prophecy(
        &self,
        params: QueryEthProphecyParams,
    ) -> Result<QueryEthProphecyResponse, AnyError> {
        self.query(QueryMsg::EthProphecy(params))
    }

    pub fn query_prophecy(&self, id: ProphecyId) -> Result<Prophecy<OracleClaimContent>, AnyError> {
        self.query(QueryMsg::Prophecy { id })
    }

    pub fn query_settlement(&self, id: ProphecyId) -> Result<Settlement, AnyError> {
        self.query(QueryMsg::Settlement { id })
    }

    fn query<T: serde::de::DeserializeOwned>(&self, msg: QueryMsg) -> Result<T, AnyError> {
        let raw = query(self.deps.as_ref(), msg)?;
        Ok(from_json(raw)?)
    }
}

/// Sets up a bridge with three validators of equal power that needs two of them to agree.
pub fn proper_instantiate() -> Bridge {
    let mut cfg = Config::default();
    cfg.oracle.consensus_needed = Decimal::percent(66);

    let bank = MockBank::new();
    let staking = MockStaking::new(VALIDATORS.map(|v| (v, 1u64)));
    let keeper = Keeper::new(cfg, bank.clone(), staking.clone()).unwrap();

    let mut api = FakeApi::new([RECEIVER, USER, THIEF]);
    for v in VALIDATORS {
        api.register(v);
    }

    Bridge {
        deps: OwnedDeps {
            storage: MockStorage::default(),
            api,
            querier: MockQuerier::default(),
            custom_query_type: PhantomData,
        },
        keeper,
        bank,
        staking,
    }
}

pub fn lock_claim(validator: &str, nonce: i64, amount: i64) -> EthBridgeClaim {
    EthBridgeClaim {
        ethereum_chain_id: CHAIN_ID,
        bridge_contract_address: BRIDGE.into(),
        nonce,
        symbol: "eth".into(),
        token_contract_address: ZERO_ADDRESS.into(),
        ethereum_sender: ETH_SENDER.into(),
        cosmos_receiver: RECEIVER.into(),
        validator_address: validator.into(),
        amount,
        claim_type: ClaimType::Lock,
    }
}

pub fn eth_prophecy_params(nonce: i64) -> QueryEthProphecyParams {
    QueryEthProphecyParams {
        ethereum_chain_id: CHAIN_ID,
        bridge_contract_address: BRIDGE.into(),
        nonce,
        symbol: "eth".into(),
        token_contract_address: ZERO_ADDRESS.into(),
        ethereum_sender: ETH_SENDER.into(),
    }
}

pub fn prophecy_id(nonce: i64) -> ProphecyId {
    ProphecyId::new(format!("{CHAIN_ID}/{nonce}/{ETH_SENDER}"))
}

pub fn burn_msg(sender: &str, amount: i64, symbol: &str) -> MsgBurn {
    MsgBurn {
        cosmos_sender: sender.into(),
        amount,
        symbol: symbol.into(),
        ethereum_chain_id: CHAIN_ID,
        ethereum_receiver: ETH_SENDER.into(),
    }
}

pub fn lock_msg(sender: &str, amount: i64, symbol: &str) -> MsgLock {
    MsgLock {
        cosmos_sender: sender.into(),
        amount,
        symbol: symbol.into(),
        ethereum_chain_id: CHAIN_ID,
        ethereum_receiver: ETH_SENDER.into(),
    }
}
