use std::fmt;

use cosmwasm_schema::cw_serde;

#[cw_serde]
#[derive(Eq, PartialOrd, Ord, Hash, Default)]
pub struct ProphecyId(String);

impl ProphecyId {
    pub fn new(id: impl Into<String>) -> Self {
        ProphecyId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for ProphecyId {
    fn from(id: String) -> Self {
        ProphecyId(id)
    }
}

impl AsRef<str> for ProphecyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProphecyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Adjacently tagged so that the unit variants and the newtype variant share one JSON shape:
// `{"type": "success", "data": {...}}`.
#[cw_serde]
#[serde(tag = "type", content = "data")]
pub enum Status<T> {
    Pending,
    // Carries the claim content that reached consensus.
    Success(T),
    Failed,
}

impl<T> Status<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Status::Pending)
    }

    /// Returns true once the prophecy can no longer change.
    pub fn is_finalized(&self) -> bool {
        !self.is_pending()
    }

    pub fn text(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Success(_) => "success",
            Status::Failed => "failed",
        }
    }
}

#[cw_serde]
pub struct ValidatorClaim<T> {
    pub validator: String,
    // Voting power of `validator` at the last tally.
    pub power: u64,
    pub content: T,
}

#[cw_serde]
pub struct Prophecy<T> {
    pub id: ProphecyId,
    pub status: Status<T>,
    // Combined power of the active validator set at the last tally.
    pub total_power: u64,
    // At most one entry per validator, in submission order.
    pub claims: Vec<ValidatorClaim<T>>,
}

impl<T> Prophecy<T> {
    pub fn new(id: ProphecyId) -> Self {
        Self {
            id,
            status: Status::Pending,
            total_power: 0,
            claims: Vec::new(),
        }
    }

    /// Power behind all recorded claims, as measured at the last tally.
    pub fn claimed_power(&self) -> u64 {
        self.claims
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.power))
    }

    /// Power behind the claims whose content equals `content`, as measured at the last tally.
    pub fn power_of(&self, content: &T) -> u64
    where
        T: PartialEq,
    {
        self.claims
            .iter()
            .filter(|c| c.content == *content)
            .fold(0u64, |acc, c| acc.saturating_add(c.power))
    }

    pub fn has_claim(&self, validator: &str) -> bool {
        self.claim(validator).is_some()
    }

    pub fn claim(&self, validator: &str) -> Option<&T> {
        self.claims
            .iter()
            .find(|c| c.validator == validator)
            .map(|c| &c.content)
    }

    /// Records `content` for `validator`.  Callers must check [`Prophecy::has_claim`] first.  The
    /// power of the claim is filled in by the next tally.
    pub fn add_claim(&mut self, validator: String, content: T) {
        debug_assert!(!self.has_claim(&validator));
        self.claims.push(ValidatorClaim {
            validator,
            power: 0,
            content,
        });
    }
}
