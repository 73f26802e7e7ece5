use std::ops::{Deref, DerefMut};

use cosmwasm_std::StdError;
use oracle::OracleError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("invalid ethereum nonce provided, must be >= 0")]
    InvalidEthNonce,
    #[error("invalid ethereum address provided, must be a valid hex-encoded Ethereum address: {0}")]
    InvalidEthAddress(String),
    #[error("failed to marshal claim: {0}")]
    Marshal(String),
    #[error("invalid symbol provided, symbol \"eth\" must have null address set as token contract address")]
    InvalidEthSymbol,
    #[error("invalid claim type provided")]
    InvalidClaimType,
    #[error("invalid ethereum chain id '{0}'")]
    InvalidEthereumChainId(i64),
    #[error("amount must be a valid integer > 0")]
    InvalidAmount,
    #[error("symbol must be 1 character or more")]
    InvalidSymbol,
    #[error("symbol of token to burn must be in the form {0}{{ethereumSymbol}}")]
    InvalidBurnSymbol(String),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("message must be signed by {expected}, got {actual}")]
    Unauthorized { expected: String, actual: String },
    #[error("prophecy {0} has already been settled")]
    ProphecyAlreadySettled(String),
    // Only ever used as a panic message.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("no settlement for prophecy {0}")]
    SettlementNotFound(String),
}

impl BridgeError {
    pub const CODESPACE: &'static str = "ethbridge";

    /// Stable identifier for this error within [`BridgeError::CODESPACE`].
    pub fn code(&self) -> u32 {
        match self {
            BridgeError::InvalidEthNonce => 1,
            BridgeError::InvalidEthAddress(_) => 2,
            BridgeError::Marshal(_) => 3,
            BridgeError::InvalidEthSymbol => 4,
            BridgeError::InvalidClaimType => 5,
            BridgeError::InvalidEthereumChainId(_) => 6,
            BridgeError::InvalidAmount => 7,
            BridgeError::InvalidSymbol => 8,
            BridgeError::InvalidBurnSymbol(_) => 9,
            BridgeError::InvalidAddress(_) => 10,
            BridgeError::Unauthorized { .. } => 11,
            BridgeError::ProphecyAlreadySettled(_) => 12,
            BridgeError::InvariantViolation(_) => 13,
            BridgeError::InvalidConfig(_) => 14,
            BridgeError::SettlementNotFound(_) => 15,
        }
    }
}

/// Returns the codespace and code of the bridge or oracle error carried by `err`, if any.
pub fn error_code(err: &anyhow::Error) -> Option<(&'static str, u32)> {
    if let Some(e) = err.downcast_ref::<BridgeError>() {
        return Some((BridgeError::CODESPACE, e.code()));
    }

    err.downcast_ref::<OracleError>()
        .map(|e| (OracleError::CODESPACE, e.code()))
}

// Handlers return this instead of `anyhow::Error` so that it can be used anywhere a
// `std::error::Error` is expected.
#[derive(Error, Debug)]
#[repr(transparent)]
#[error("{0:#}")]
pub struct AnyError(#[from] anyhow::Error);

impl Deref for AnyError {
    type Target = anyhow::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for AnyError {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<StdError> for AnyError {
    fn from(e: StdError) -> AnyError {
        anyhow::Error::from(e).into()
    }
}

impl From<BridgeError> for AnyError {
    fn from(e: BridgeError) -> AnyError {
        anyhow::Error::from(e).into()
    }
}

impl From<OracleError> for AnyError {
    fn from(e: OracleError) -> AnyError {
        anyhow::Error::from(e).into()
    }
}
