use thiserror::Error as ThisError;

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("prophecy with id {0} not found")]
    ProphecyNotFound(String),
    #[error("consensus threshold {0} must be greater than 0 and at most 1")]
    InvalidConsensusNeeded(String),
    #[error("invalid prophecy identifier")]
    InvalidIdentifier,
    #[error("prophecy {0} has already been finalized")]
    ClaimAfterFinalization(String),
    #[error("validator {validator} already submitted a claim for prophecy {id}")]
    DuplicateClaim { validator: String, id: String },
    #[error("validator {0} has no voting power")]
    InvalidValidator(String),
    #[error("total voting power is zero")]
    NoVotingPower,
}

impl OracleError {
    pub const CODESPACE: &'static str = "oracle";

    /// Stable identifier for this error within [`OracleError::CODESPACE`].
    pub fn code(&self) -> u32 {
        match self {
            OracleError::ProphecyNotFound(_) => 1,
            OracleError::InvalidConsensusNeeded(_) => 2,
            OracleError::InvalidIdentifier => 3,
            OracleError::ClaimAfterFinalization(_) => 4,
            OracleError::DuplicateClaim { .. } => 5,
            OracleError::InvalidValidator(_) => 6,
            OracleError::NoVotingPower => 7,
        }
    }
}
