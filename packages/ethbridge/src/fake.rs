//! In-memory implementations of the host capabilities consumed by the bridge.  Handles are cheap
//! to clone and share their state, so a test can keep one handle for inspection while the
//! `Keeper` owns another.

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
};

use anyhow::{bail, ensure, Context};
use cosmwasm_std::{
    testing::MockApi, Addr, Api, CanonicalAddr, Coin, RecoverPubkeyError, StdError, StdResult,
    Uint128, VerificationError,
};
use log::debug;
use oracle::StakingKeeper;

use crate::SupplyKeeper;

/// Returns the account address used for the holdings of `module`.
pub fn module_address(module: &str) -> String {
    format!("module/{module}")
}

/// An `Api` that only accepts a fixed set of host addresses.  Each registered address is its own
/// canonical, lower-case form.  Signature checks are forwarded to `MockApi`.
#[derive(Clone, Default)]
pub struct FakeApi {
    known: BTreeSet<String>,
    crypto: MockApi,
}

impl FakeApi {
    pub fn new<I, S>(addrs: I) -> FakeApi
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FakeApi {
            known: addrs.into_iter().map(Into::into).collect(),
            crypto: MockApi::default(),
        }
    }

    pub fn register(&mut self, addr: impl Into<String>) {
        self.known.insert(addr.into());
    }
}

impl Api for FakeApi {
    fn addr_validate(&self, input: &str) -> StdResult<Addr> {
        if self.known.contains(input) {
            return Ok(Addr::unchecked(input));
        }

        Err(StdError::generic_err(format!("unknown address {input:?}")))
    }

    fn addr_canonicalize(&self, input: &str) -> StdResult<CanonicalAddr> {
        self.addr_validate(input)
            .map(|addr| CanonicalAddr::from(addr.as_str().as_bytes()))
    }

    fn addr_humanize(&self, canonical: &CanonicalAddr) -> StdResult<Addr> {
        let human = String::from_utf8(canonical.as_slice().to_vec())
            .map_err(|_| StdError::generic_err("canonical address is not utf8"))?;
        self.addr_validate(&human)
    }

    fn secp256k1_verify(
        &self,
        message_hash: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<bool, VerificationError> {
        self.crypto
            .secp256k1_verify(message_hash, signature, public_key)
    }

    fn secp256k1_recover_pubkey(
        &self,
        message_hash: &[u8],
        signature: &[u8],
        recovery_param: u8,
    ) -> Result<Vec<u8>, RecoverPubkeyError> {
        self.crypto
            .secp256k1_recover_pubkey(message_hash, signature, recovery_param)
    }

    fn ed25519_verify(
        &self,
        message: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<bool, VerificationError> {
        self.crypto.ed25519_verify(message, signature, public_key)
    }

    fn ed25519_batch_verify(
        &self,
        messages: &[&[u8]],
        signatures: &[&[u8]],
        public_keys: &[&[u8]],
    ) -> Result<bool, VerificationError> {
        self.crypto
            .ed25519_batch_verify(messages, signatures, public_keys)
    }

    fn debug(&self, message: &str) {
        debug!("{message}");
    }
}

#[derive(Debug, Default)]
struct Inner {
    // Keyed by (account, denom).
    balances: BTreeMap<(String, String), Uint128>,
    supply: BTreeMap<String, Uint128>,
    fail_mints: bool,
    fail_burns: bool,
    fail_module_sends: bool,
}

impl Inner {
    fn balance(&self, account: &str, denom: &str) -> Uint128 {
        self.balances
            .get(&(account.to_owned(), denom.to_owned()))
            .copied()
            .unwrap_or_default()
    }

    // Moves all of `coins` or none of them.
    fn send(&mut self, from: &str, to: &str, coins: &[Coin]) -> anyhow::Result<()> {
        let mut balances = self.balances.clone();
        for c in coins {
            let src = balances
                .entry((from.to_owned(), c.denom.clone()))
                .or_default();
            *src = src
                .checked_sub(c.amount)
                .with_context(|| format!("insufficient funds: {from} cannot send {c}"))?;

            let dst = balances.entry((to.to_owned(), c.denom.clone())).or_default();
            *dst = dst.checked_add(c.amount)?;
        }

        self.balances = balances;
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct MockBank(Rc<RefCell<Inner>>);

impl MockBank {
    pub fn new() -> MockBank {
        MockBank::default()
    }

    /// Gives `account` an initial balance of `coin`, increasing the total supply accordingly.
    pub fn set_balance(&self, account: &str, coin: Coin) {
        let mut this = self.0.borrow_mut();
        let old = this.balance(account, &coin.denom);
        let supply = this.supply.entry(coin.denom.clone()).or_default();
        *supply = *supply - old + coin.amount;
        this.balances.insert((account.into(), coin.denom), coin.amount);
    }

    pub fn balance(&self, account: &str, denom: &str) -> Uint128 {
        self.0.borrow().balance(account, denom)
    }

    pub fn module_balance(&self, module: &str, denom: &str) -> Uint128 {
        self.balance(&module_address(module), denom)
    }

    pub fn supply(&self, denom: &str) -> Uint128 {
        self.0
            .borrow()
            .supply
            .get(denom)
            .copied()
            .unwrap_or_default()
    }

    pub fn fail_mints(&self, fail: bool) {
        self.0.borrow_mut().fail_mints = fail;
    }

    pub fn fail_burns(&self, fail: bool) {
        self.0.borrow_mut().fail_burns = fail;
    }

    pub fn fail_module_sends(&self, fail: bool) {
        self.0.borrow_mut().fail_module_sends = fail;
    }
}

impl SupplyKeeper for MockBank {
    fn mint_coins(&mut self, module: &str, coins: &[Coin]) -> anyhow::Result<()> {
        let mut this = self.0.borrow_mut();
        ensure!(!this.fail_mints, "minting disabled");

        let account = module_address(module);
        for c in coins {
            let supply = this.supply.entry(c.denom.clone()).or_default();
            *supply = supply.checked_add(c.amount)?;
            let bal = this
                .balances
                .entry((account.clone(), c.denom.clone()))
                .or_default();
            *bal = bal.checked_add(c.amount)?;
        }

        Ok(())
    }

    fn burn_coins(&mut self, module: &str, coins: &[Coin]) -> anyhow::Result<()> {
        let mut this = self.0.borrow_mut();
        ensure!(!this.fail_burns, "burning disabled");

        let account = module_address(module);
        for c in coins {
            if this.balance(&account, &c.denom) < c.amount {
                bail!("insufficient module funds: {module} cannot burn {c}");
            }
        }

        for c in coins {
            let bal = this
                .balances
                .entry((account.clone(), c.denom.clone()))
                .or_default();
            *bal -= c.amount;
            let supply = this.supply.entry(c.denom.clone()).or_default();
            *supply -= c.amount;
        }

        Ok(())
    }

    fn send_coins_from_module_to_account(
        &mut self,
        module: &str,
        recipient: &Addr,
        coins: &[Coin],
    ) -> anyhow::Result<()> {
        let mut this = self.0.borrow_mut();
        ensure!(!this.fail_module_sends, "module sends disabled");
        this.send(&module_address(module), recipient.as_str(), coins)
    }

    fn send_coins_from_account_to_module(
        &mut self,
        sender: &Addr,
        module: &str,
        coins: &[Coin],
    ) -> anyhow::Result<()> {
        self.0
            .borrow_mut()
            .send(sender.as_str(), &module_address(module), coins)
    }
}

#[derive(Clone, Debug, Default)]
pub struct MockStaking(Rc<RefCell<BTreeMap<String, u64>>>);

impl MockStaking {
    pub fn new<I, S>(validators: I) -> MockStaking
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        MockStaking(Rc::new(RefCell::new(
            validators
                .into_iter()
                .map(|(v, power)| (v.into(), power))
                .collect(),
        )))
    }

    /// Sets the power of `validator`.  A power of 0 removes it from the active set.
    pub fn set_power(&self, validator: &str, power: u64) {
        let mut this = self.0.borrow_mut();
        if power == 0 {
            this.remove(validator);
        } else {
            this.insert(validator.into(), power);
        }
    }
}

impl StakingKeeper for MockStaking {
    fn validator_power(&self, validator: &str) -> anyhow::Result<u64> {
        Ok(self.0.borrow().get(validator).copied().unwrap_or(0))
    }

    fn total_power(&self) -> anyhow::Result<u64> {
        Ok(self.0.borrow().values().sum())
    }
}
