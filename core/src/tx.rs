//! Donation transaction payloads.
//!
//! A payload carries exactly one message: a bank send for native denoms or
//! a cw20 `transfer` execute for contract tokens. Which one is decided by
//! the token identifier on every build.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::address::AddressFormat;
use crate::amount::{to_base_units, to_input, AmountError};
use crate::token::{TokenDescriptor, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSend {
    pub from_address: String,
    pub to_address: String,
    pub amount: Vec<Coin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgExecuteContract {
    pub sender: String,
    pub contract: String,
    pub execute_msg: serde_json::Value,
    pub coins: Vec<Coin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum Msg {
    #[serde(rename = "/cosmos.bank.v1beta1.MsgSend")]
    NativeSend(MsgSend),
    #[serde(rename = "/terra.wasm.v1beta1.MsgExecuteContract")]
    ContractExecute(MsgExecuteContract),
}

/// Execute messages understood by cw20 token contracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cw20ExecuteMsg {
    Transfer { recipient: String, amount: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxPayload {
    pub messages: Vec<Msg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

/// Form values a payload is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxValues {
    pub address: Option<String>,
    /// Human-entered decimal amount.
    pub input: Option<String>,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("No wallet connected")]
    NoSender,
    #[error("No recipient address")]
    MissingAddress,
    #[error("Invalid recipient address '{0}'")]
    InvalidAddress(String),
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),
    #[error("Failed to encode execute message: {0}")]
    Encode(String),
}

/// Queries a host should refetch once the donation lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum RefreshKey {
    ContractBalance { contract: String, owner: String },
}

#[derive(Debug, Clone)]
pub struct TxBuilder {
    format: AddressFormat,
    token: TokenDescriptor,
    sender: Option<String>,
}

impl TxBuilder {
    pub fn new(format: AddressFormat, token: TokenDescriptor, sender: Option<String>) -> Self {
        Self {
            format,
            token,
            sender,
        }
    }

    pub fn token(&self) -> &TokenDescriptor {
        &self.token
    }

    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    /// Build the payload, or `None` when the form is not ready for one.
    pub fn build(&self, values: &TxValues) -> Option<TxPayload> {
        match self.try_build(values) {
            Ok(payload) => Some(payload),
            Err(e) => {
                debug!(reason = %e, "no payload");
                None
            }
        }
    }

    pub fn try_build(&self, values: &TxValues) -> Result<TxPayload, BuildError> {
        let sender = self.sender.as_deref().ok_or(BuildError::NoSender)?;
        let address = values.address.as_deref().ok_or(BuildError::MissingAddress)?;
        if !self.format.is_valid(address) {
            return Err(BuildError::InvalidAddress(address.to_string()));
        }

        let amount = to_base_units(values.input.as_deref().unwrap_or(""), self.token.decimals)?;
        let amount = amount.to_string();

        let msg = match self.token.kind(&self.format) {
            TokenKind::Native { denom } => Msg::NativeSend(MsgSend {
                from_address: sender.to_string(),
                to_address: address.to_string(),
                amount: vec![Coin {
                    denom: denom.to_string(),
                    amount,
                }],
            }),
            TokenKind::Contract { address: contract } => {
                let execute_msg = serde_json::to_value(Cw20ExecuteMsg::Transfer {
                    recipient: address.to_string(),
                    amount,
                })
                .map_err(|e| BuildError::Encode(e.to_string()))?;
                Msg::ContractExecute(MsgExecuteContract {
                    sender: sender.to_string(),
                    contract: contract.to_string(),
                    execute_msg,
                    coins: Vec::new(),
                })
            }
        };

        info!(token = %self.token.identifier, recipient = %address, "built donation payload");
        Ok(TxPayload {
            messages: vec![msg],
            memo: values.memo.clone(),
        })
    }

    /// Sample values for fee estimation: one base unit sent to ourselves.
    pub fn estimation_values(&self) -> TxValues {
        TxValues {
            address: self.sender.clone(),
            input: Some(to_input(1, self.token.decimals)),
            memo: None,
        }
    }

    pub fn refresh_keys(&self) -> Vec<RefreshKey> {
        match (self.token.kind(&self.format), &self.sender) {
            (TokenKind::Contract { address }, Some(owner)) => vec![RefreshKey::ContractBalance {
                contract: address.to_string(),
                owner: owner.clone(),
            }],
            _ => Vec::new(),
        }
    }
}
