use anyhow::{bail, ensure, Context};
use cosmwasm_std::{Decimal, Order, StdResult, Storage};
use cw_storage_plus::Bound;
use log::{debug, info};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    state::{prophecies, Config, Prophecy, ProphecyId, Status},
    OracleError,
};

/// Source of the voting power used to weigh claims.  Implemented by the host's staking module.
pub trait StakingKeeper {
    /// Returns the voting power of `validator`, or 0 if it is not part of the active set.
    fn validator_power(&self, validator: &str) -> anyhow::Result<u64>;

    /// Returns the combined voting power of the active validator set.
    fn total_power(&self) -> anyhow::Result<u64>;
}

impl<K: StakingKeeper + ?Sized> StakingKeeper for &K {
    fn validator_power(&self, validator: &str) -> anyhow::Result<u64> {
        (**self).validator_power(validator)
    }

    fn total_power(&self) -> anyhow::Result<u64> {
        (**self).total_power()
    }
}

/// Records the claim `content` made by `validator` under the prophecy `id` and returns the
/// resulting status of the prophecy.  The prophecy is created if this is the first claim for `id`.
///
/// If an error occurs that is not due to the underlying storage or staking module, the returned
/// error will be downcastable to `OracleError`.  No state is modified when an error is returned.
///
/// A prophecy moves to `Status::Success` the first time the power behind a single claim content
/// reaches `config.consensus_needed` of the total power.  It moves to `Status::Failed` once no
/// content can reach that threshold even if every validator that has not voted yet agrees with
/// the strongest one.  Only the call that causes a transition ever observes the terminal status:
/// later claims are rejected with `OracleError::ClaimAfterFinalization`.
///
/// Every call refreshes the stored power of each claim and the total power it was measured
/// against, so the stored prophecy always explains its own status.
pub fn process_claim<T, K>(
    storage: &mut dyn Storage,
    staking: &K,
    config: &Config,
    id: &ProphecyId,
    validator: &str,
    content: T,
) -> anyhow::Result<Status<T>>
where
    T: Clone + PartialEq + Serialize + DeserializeOwned,
    K: StakingKeeper + ?Sized,
{
    ensure!(!id.is_empty(), OracleError::InvalidIdentifier);

    let power = staking
        .validator_power(validator)
        .context("failed to query validator power")?;
    ensure!(power > 0, OracleError::InvalidValidator(validator.into()));

    let key = prophecies::<T>().key(id.as_str());
    let mut prophecy = key
        .may_load(storage)
        .context("failed to load prophecy")?
        .unwrap_or_else(|| Prophecy::new(id.clone()));

    if prophecy.status.is_finalized() {
        bail!(OracleError::ClaimAfterFinalization(id.to_string()));
    }

    if prophecy.has_claim(validator) {
        bail!(OracleError::DuplicateClaim {
            validator: validator.into(),
            id: id.to_string(),
        });
    }

    prophecy.add_claim(validator.into(), content);
    prophecy.status = tally(&mut prophecy, staking, config)?;

    key.save(storage, &prophecy)
        .context("failed to save prophecy")?;

    if prophecy.status.is_finalized() {
        info!(
            "prophecy {id} finalized as {} after {} claims",
            prophecy.status.text(),
            prophecy.claims.len()
        );
    } else {
        debug!("prophecy {id} pending with {} claims", prophecy.claims.len());
    }

    Ok(prophecy.status)
}

// Refreshes the power of every recorded claim from the staking module and derives the status
// from the result.
fn tally<T, K>(prophecy: &mut Prophecy<T>, staking: &K, config: &Config) -> anyhow::Result<Status<T>>
where
    T: Clone + PartialEq,
    K: StakingKeeper + ?Sized,
{
    let total = staking
        .total_power()
        .context("failed to query total voting power")?;
    ensure!(total > 0, OracleError::NoVotingPower);

    for c in &mut prophecy.claims {
        c.power = staking
            .validator_power(&c.validator)
            .with_context(|| format!("failed to query power of validator {}", c.validator))?;
    }
    prophecy.total_power = total;

    let mut candidates: Vec<(&T, u64)> = Vec::new();
    for c in &prophecy.claims {
        match candidates.iter().position(|(content, _)| **content == c.content) {
            Some(i) => candidates[i].1 = candidates[i].1.saturating_add(c.power),
            None => candidates.push((&c.content, c.power)),
        }
    }

    // Ties go to the content that was submitted first.
    let Some((best, best_power)) = candidates
        .iter()
        .copied()
        .reduce(|acc, c| if c.1 > acc.1 { c } else { acc })
    else {
        return Ok(Status::Pending);
    };

    if Decimal::from_ratio(best_power, total) >= config.consensus_needed {
        return Ok(Status::Success(best.clone()));
    }

    let unclaimed = total.saturating_sub(prophecy.claimed_power());
    let reachable = best_power.saturating_add(unclaimed);
    if Decimal::from_ratio(reachable, total) < config.consensus_needed {
        return Ok(Status::Failed);
    }

    Ok(Status::Pending)
}

/// Query the prophecy associated with `id`.  A missing prophecy is reported as
/// `OracleError::ProphecyNotFound`.
pub fn query_prophecy<T>(storage: &dyn Storage, id: &ProphecyId) -> anyhow::Result<Prophecy<T>>
where
    T: Serialize + DeserializeOwned,
{
    prophecies::<T>()
        .may_load(storage, id.as_str())
        .context("failed to load prophecy")?
        .ok_or_else(|| OracleError::ProphecyNotFound(id.to_string()).into())
}

/// Query all prophecies, ordered by id.
pub fn query_all_prophecies<'a, T>(
    storage: &'a dyn Storage,
    start_after: Option<&'a str>,
) -> impl Iterator<Item = StdResult<Prophecy<T>>> + 'a
where
    T: Serialize + DeserializeOwned + 'a,
{
    let start: Option<Bound<&str>> = start_after.map(Bound::exclusive);

    prophecies::<T>()
        .range(storage, start, None, Order::Ascending)
        .map(|item| item.map(|(_, p)| p))
}
