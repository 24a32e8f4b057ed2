use serde::{Deserialize, Serialize};

use crate::address::AddressFormat;

pub const DEFAULT_DENOM: &str = "uluna";
pub const DEFAULT_DECIMALS: u32 = 6;

/// A token the form can donate: a native denom or a contract address,
/// plus its decimal precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    pub identifier: String,
    pub decimals: u32,
}

impl Default for TokenDescriptor {
    fn default() -> Self {
        Self {
            identifier: DEFAULT_DENOM.to_string(),
            decimals: DEFAULT_DECIMALS,
        }
    }
}

/// How a token moves on chain, decided by the shape of its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind<'a> {
    Native { denom: &'a str },
    Contract { address: &'a str },
}

impl TokenDescriptor {
    pub fn new(identifier: impl Into<String>, decimals: u32) -> Self {
        Self {
            identifier: identifier.into(),
            decimals,
        }
    }

    pub fn kind(&self, format: &AddressFormat) -> TokenKind<'_> {
        if format.is_valid(&self.identifier) {
            TokenKind::Contract {
                address: &self.identifier,
            }
        } else {
            TokenKind::Native {
                denom: &self.identifier,
            }
        }
    }

    pub fn is_contract(&self, format: &AddressFormat) -> bool {
        matches!(self.kind(format), TokenKind::Contract { .. })
    }

    /// Display symbol: `uluna` -> `LUNA`, contracts and other denoms as-is.
    pub fn symbol(&self, format: &AddressFormat) -> String {
        match self.kind(format) {
            TokenKind::Native { denom } if denom.starts_with('u') && denom.len() > 1 => {
                denom[1..].to_uppercase()
            }
            TokenKind::Native { denom } => denom.to_string(),
            TokenKind::Contract { address } => address.to_string(),
        }
    }
}
