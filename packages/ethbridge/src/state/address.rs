use std::{fmt, ops::Deref, str::FromStr};

use anyhow::{ensure, Context};
use schemars::{gen::SchemaGenerator, schema::Schema, JsonSchema};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A 20 byte ethereum account or contract address.  The canonical text form is `0x` followed by
/// 40 lower-case hex characters, which is also how the address is encoded in JSON.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EthereumAddress([u8; 20]);

impl EthereumAddress {
    pub const ZERO: EthereumAddress = EthereumAddress([0u8; 20]);

    pub const fn new(addr: [u8; 20]) -> EthereumAddress {
        EthereumAddress(addr)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl From<[u8; 20]> for EthereumAddress {
    fn from(addr: [u8; 20]) -> Self {
        EthereumAddress(addr)
    }
}

impl From<EthereumAddress> for [u8; 20] {
    fn from(addr: EthereumAddress) -> Self {
        addr.0
    }
}

impl Deref for EthereumAddress {
    type Target = [u8; 20];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for EthereumAddress {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for EthereumAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// Accepts the same inputs as geth's `IsHexAddress`: an optional `0x`/`0X` prefix followed by
// exactly 40 hex characters of any case.
impl FromStr for EthereumAddress {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        ensure!(
            digits.len() == 40,
            "invalid length; want 40 hex characters, got {}",
            digits.len()
        );

        let mut addr = [0u8; 20];
        hex::decode_to_slice(digits, &mut addr).context("failed to decode hex")?;
        Ok(EthereumAddress(addr))
    }
}

impl Serialize for EthereumAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EthereumAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|e| de::Error::custom(format!("{e:#}")))
    }
}

impl JsonSchema for EthereumAddress {
    fn schema_name() -> String {
        "EthereumAddress".into()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        String::json_schema(gen)
    }
}
