use anyhow::{bail, Context};
use cosmwasm_std::{Addr, Coin, Storage};
use log::{debug, info};
use oracle::{ProphecyId, StakingKeeper, Status};

use crate::{
    msg::OracleClaim,
    state::{Config, OracleClaimContent, Settlement, SETTLEMENTS},
    BridgeError,
};

/// Token supply operations provided by the host chain.  Coins held by a module live in that
/// module's own account.
pub trait SupplyKeeper {
    fn mint_coins(&mut self, module: &str, coins: &[Coin]) -> anyhow::Result<()>;

    fn burn_coins(&mut self, module: &str, coins: &[Coin]) -> anyhow::Result<()>;

    fn send_coins_from_module_to_account(
        &mut self,
        module: &str,
        recipient: &Addr,
        coins: &[Coin],
    ) -> anyhow::Result<()>;

    fn send_coins_from_account_to_module(
        &mut self,
        sender: &Addr,
        module: &str,
        coins: &[Coin],
    ) -> anyhow::Result<()>;
}

/// Ties the oracle to the host's supply module.  The keeper never touches the module account
/// except to settle a successful prophecy or to process a lock or burn request.
pub struct Keeper<B, S> {
    config: Config,
    bank: B,
    staking: S,
}

impl<B, S> Keeper<B, S>
where
    B: SupplyKeeper,
    S: StakingKeeper,
{
    pub fn new(config: Config, bank: B, staking: S) -> anyhow::Result<Self> {
        config.validate()?;

        Ok(Keeper {
            config,
            bank,
            staking,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    pub fn staking(&self) -> &S {
        &self.staking
    }

    /// Adds the validated `claim` to the prophecy for its ethereum event and returns the new
    /// status of the prophecy.
    pub fn process_claim(
        &self,
        storage: &mut dyn Storage,
        claim: &OracleClaim,
    ) -> anyhow::Result<Status<OracleClaimContent>> {
        oracle::process_claim(
            storage,
            &self.staking,
            &self.config.oracle,
            &claim.id,
            claim.validator.as_str(),
            claim.content.clone(),
        )
    }

    /// Mints the coins described by the winning claim `content` of prophecy `id` and delivers
    /// them to the receiver.  Lock witnesses mint the pegged representation of the ethereum token
    /// while burn witnesses mint the symbol as claimed.
    ///
    /// Each prophecy is settled at most once; a second attempt fails with
    /// `BridgeError::ProphecyAlreadySettled` without touching the supply.  A failure to mint is
    /// returned to the caller.  A failure to deliver coins that were already minted panics since
    /// the supply would no longer match the settled prophecies.
    pub fn process_successful_claim(
        &mut self,
        storage: &mut dyn Storage,
        id: &ProphecyId,
        content: &OracleClaimContent,
    ) -> anyhow::Result<Settlement> {
        let key = SETTLEMENTS.key(id.as_str());
        if key.has(storage) {
            bail!(BridgeError::ProphecyAlreadySettled(id.to_string()));
        }

        let denom = match content {
            OracleClaimContent::LockWitness(w) => {
                format!("{}{}", self.config.pegged_coin_prefix, w.symbol)
            }
            OracleClaimContent::BurnWitness(w) => w.symbol.clone(),
        };
        let witness = content.witness();
        let coin = Coin::new(witness.amount.u128(), denom);
        let coins = [coin.clone()];
        let module = self.config.module_name.as_str();

        self.bank
            .mint_coins(module, &coins)
            .with_context(|| format!("failed to mint {coin} for prophecy {id}"))?;

        if let Err(e) =
            self.bank
                .send_coins_from_module_to_account(module, &witness.cosmos_receiver, &coins)
        {
            panic!(
                "{}",
                BridgeError::InvariantViolation(format!(
                    "minted {coin} for prophecy {id} but failed to deliver it to {}: {e:#}",
                    witness.cosmos_receiver
                ))
            );
        }

        let settlement = Settlement {
            id: id.clone(),
            claim_type: content.claim_type(),
            receiver: witness.cosmos_receiver.clone(),
            coin,
        };
        key.save(storage, &settlement)
            .context("failed to save settlement")?;

        info!(
            "settled prophecy {id}: delivered {} to {}",
            settlement.coin, settlement.receiver
        );

        Ok(settlement)
    }

    /// Moves `coins` from `sender` into the module account.
    pub fn process_lock(&mut self, sender: &Addr, coins: &[Coin]) -> anyhow::Result<()> {
        self.bank
            .send_coins_from_account_to_module(sender, &self.config.module_name, coins)
            .with_context(|| format!("failed to lock coins of {sender}"))?;

        debug!("locked {coins:?} from {sender}");
        Ok(())
    }

    /// Moves `coins` from `sender` into the module account and destroys them.  Panics if the
    /// coins reach the module account but cannot be burned.
    pub fn process_burn(&mut self, sender: &Addr, coins: &[Coin]) -> anyhow::Result<()> {
        let module = self.config.module_name.as_str();
        self.bank
            .send_coins_from_account_to_module(sender, module, coins)
            .with_context(|| format!("failed to collect coins to burn from {sender}"))?;

        if let Err(e) = self.bank.burn_coins(module, coins) {
            panic!(
                "{}",
                BridgeError::InvariantViolation(format!(
                    "collected {coins:?} from {sender} but failed to burn them: {e:#}"
                ))
            );
        }

        debug!("burned {coins:?} from {sender}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    use cosmwasm_std::{testing::MockStorage, Uint128};

    use super::*;
    use crate::{
        fake::{FakeApi, MockBank, MockStaking},
        msg::EthBridgeClaim,
        state::{ClaimType, EthereumAddress, Witness},
    };

    const MODULE: &str = "ethbridge";

    fn keeper() -> (MockBank, Keeper<MockBank, MockStaking>) {
        let bank = MockBank::new();
        let staking = MockStaking::new([("val1", 1), ("val2", 1), ("val3", 1)]);
        let keeper = Keeper::new(Config::default(), bank.clone(), staking).unwrap();
        (bank, keeper)
    }

    fn content(claim_type: ClaimType, symbol: &str, amount: u128) -> OracleClaimContent {
        OracleClaimContent::new(
            claim_type,
            Witness {
                cosmos_receiver: Addr::unchecked("cosmos1receiver"),
                amount: Uint128::new(amount),
                symbol: symbol.into(),
                token_contract_address: EthereumAddress::ZERO,
            },
        )
    }

    #[test]
    fn settle_lock_witness() {
        let mut storage = MockStorage::new();
        let (bank, mut keeper) = keeper();
        let id = ProphecyId::new("3/7/0xabc");

        let s = keeper
            .process_successful_claim(&mut storage, &id, &content(ClaimType::Lock, "eth", 100))
            .unwrap();

        assert_eq!(Coin::new(100, "peggy/eth"), s.coin);
        assert_eq!(ClaimType::Lock, s.claim_type);
        assert_eq!(Uint128::new(100), bank.balance("cosmos1receiver", "peggy/eth"));
        assert_eq!(Uint128::new(100), bank.supply("peggy/eth"));
        assert_eq!(Uint128::zero(), bank.module_balance(MODULE, "peggy/eth"));
        assert_eq!(s, SETTLEMENTS.load(&storage, id.as_str()).unwrap());
    }

    #[test]
    fn settle_burn_witness() {
        let mut storage = MockStorage::new();
        let (bank, mut keeper) = keeper();
        let id = ProphecyId::new("3/8/0xabc");

        keeper
            .process_successful_claim(&mut storage, &id, &content(ClaimType::Burn, "stake", 25))
            .unwrap();

        assert_eq!(Uint128::new(25), bank.balance("cosmos1receiver", "stake"));
        assert_eq!(Uint128::zero(), bank.supply("peggy/stake"));
    }

    #[test]
    fn settle_once() {
        let mut storage = MockStorage::new();
        let (bank, mut keeper) = keeper();
        let id = ProphecyId::new("3/7/0xabc");
        let c = content(ClaimType::Lock, "eth", 100);

        keeper
            .process_successful_claim(&mut storage, &id, &c)
            .unwrap();
        let err = keeper
            .process_successful_claim(&mut storage, &id, &c)
            .expect_err("settled the same prophecy twice");

        assert_eq!(
            Some(&BridgeError::ProphecyAlreadySettled(id.to_string())),
            err.downcast_ref::<BridgeError>()
        );
        assert_eq!(Uint128::new(100), bank.supply("peggy/eth"));
        assert_eq!(Uint128::new(100), bank.balance("cosmos1receiver", "peggy/eth"));
    }

    #[test]
    fn failed_mint_is_recoverable() {
        let mut storage = MockStorage::new();
        let (bank, mut keeper) = keeper();
        let id = ProphecyId::new("3/7/0xabc");
        let c = content(ClaimType::Lock, "eth", 100);

        bank.fail_mints(true);
        keeper
            .process_successful_claim(&mut storage, &id, &c)
            .expect_err("settled without minting");
        assert!(!SETTLEMENTS.has(&storage, id.as_str()));

        bank.fail_mints(false);
        keeper
            .process_successful_claim(&mut storage, &id, &c)
            .unwrap();
        assert_eq!(Uint128::new(100), bank.balance("cosmos1receiver", "peggy/eth"));
    }

    #[test]
    #[should_panic(expected = "invariant violation")]
    fn failed_delivery_is_fatal() {
        let mut storage = MockStorage::new();
        let (bank, mut keeper) = keeper();
        bank.fail_module_sends(true);

        let _ = keeper.process_successful_claim(
            &mut storage,
            &ProphecyId::new("3/7/0xabc"),
            &content(ClaimType::Lock, "eth", 100),
        );
    }

    #[test]
    fn lock() {
        let (bank, mut keeper) = keeper();
        let alice = Addr::unchecked("alice");
        bank.set_balance("alice", Coin::new(10, "stake"));

        keeper
            .process_lock(&alice, &[Coin::new(11, "stake")])
            .expect_err("locked more than the balance");
        assert_eq!(Uint128::new(10), bank.balance("alice", "stake"));

        keeper.process_lock(&alice, &[Coin::new(4, "stake")]).unwrap();
        assert_eq!(Uint128::new(6), bank.balance("alice", "stake"));
        assert_eq!(Uint128::new(4), bank.module_balance(MODULE, "stake"));
        assert_eq!(Uint128::new(10), bank.supply("stake"));
    }

    #[test]
    fn burn() {
        let (bank, mut keeper) = keeper();
        let alice = Addr::unchecked("alice");
        bank.set_balance("alice", Coin::new(10, "peggy/eth"));

        keeper
            .process_burn(&alice, &[Coin::new(10, "peggy/eth")])
            .unwrap();

        assert_eq!(Uint128::zero(), bank.balance("alice", "peggy/eth"));
        assert_eq!(Uint128::zero(), bank.module_balance(MODULE, "peggy/eth"));
        assert_eq!(Uint128::zero(), bank.supply("peggy/eth"));
    }

    #[test]
    fn burn_insufficient_funds() {
        let (bank, mut keeper) = keeper();
        let alice = Addr::unchecked("alice");
        bank.set_balance("alice", Coin::new(3, "peggy/eth"));

        keeper
            .process_burn(&alice, &[Coin::new(10, "peggy/eth")])
            .expect_err("burned more than the balance");
        assert_eq!(Uint128::new(3), bank.supply("peggy/eth"));
    }

    #[test]
    fn failed_burn_is_fatal() {
        let (bank, mut keeper) = keeper();
        let alice = Addr::unchecked("alice");
        bank.set_balance("alice", Coin::new(10, "peggy/eth"));
        bank.fail_burns(true);

        let res = catch_unwind(AssertUnwindSafe(|| {
            keeper.process_burn(&alice, &[Coin::new(10, "peggy/eth")])
        }));
        res.expect_err("ignored a failed burn");
    }

    #[test]
    fn claims_flow_into_oracle() {
        let mut storage = MockStorage::new();
        let (_, keeper) = keeper();
        let api = FakeApi::new(["cosmos1receiver", "val1"]);
        let claim = EthBridgeClaim {
            ethereum_chain_id: 3,
            bridge_contract_address: format!("0x{}", "11".repeat(20)),
            nonce: 1,
            symbol: "eth".into(),
            token_contract_address: EthereumAddress::ZERO.to_string(),
            ethereum_sender: format!("0x{}", "22".repeat(20)),
            cosmos_receiver: "cosmos1receiver".into(),
            validator_address: "val1".into(),
            amount: 5,
            claim_type: ClaimType::Lock,
        };

        let claim = claim.to_oracle_claim(&api).unwrap();
        assert_eq!(format!("3/1/0x{}", "22".repeat(20)), claim.id.as_str());
        let status = keeper.process_claim(&mut storage, &claim).unwrap();
        assert_eq!(Status::Pending, status);

        let prophecy = oracle::query_prophecy::<OracleClaimContent>(&storage, &claim.id).unwrap();
        assert_eq!(1, prophecy.claims.len());
        assert_eq!(3, prophecy.total_power);
    }
}
