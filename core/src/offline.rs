//! File-backed stand-ins for the chain, the name service and the executor.
//!
//! The ledger file is JSON; amounts are strings so they survive as u128:
//!
//! ```json
//! {
//!   "balances": { "terra1...": { "uluna": "5000000" } },
//!   "contract_balances": { "terra1<contract>": { "terra1<owner>": "100" } },
//!   "names": { "alice.ust": "terra1..." }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::balance::NativeBalances;
use crate::service::{ChainQuery, NameService, TxExecutor, TxOutcome, TxRequest};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfflineChain {
    #[serde(default)]
    balances: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    contract_balances: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    names: BTreeMap<String, String>,
}

fn parse_amount(raw: &str, what: &str) -> Result<u128> {
    raw.parse()
        .map_err(|_| anyhow!("Invalid {what} amount '{raw}' in ledger"))
}

impl OfflineChain {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read ledger {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse ledger {}", path.display()))
    }

    pub fn set_native_balance(&mut self, owner: &str, denom: &str, amount: u128) {
        self.balances
            .entry(owner.to_string())
            .or_default()
            .insert(denom.to_string(), amount.to_string());
    }

    pub fn set_contract_balance(&mut self, contract: &str, owner: &str, amount: u128) {
        self.contract_balances
            .entry(contract.to_string())
            .or_default()
            .insert(owner.to_string(), amount.to_string());
    }

    pub fn register_name(&mut self, name: &str, address: &str) {
        self.names.insert(name.to_string(), address.to_string());
    }
}

#[async_trait]
impl ChainQuery for OfflineChain {
    async fn native_balances(&self, owner: &str) -> Result<NativeBalances> {
        let Some(coins) = self.balances.get(owner) else {
            return Ok(NativeBalances::new());
        };
        coins
            .iter()
            .map(|(denom, raw)| -> Result<(String, u128)> {
                Ok((denom.clone(), parse_amount(raw, denom)?))
            })
            .collect()
    }

    async fn contract_balance(&self, contract: &str, owner: &str) -> Result<Option<u128>> {
        let raw = self
            .contract_balances
            .get(contract)
            .and_then(|holders| holders.get(owner));
        match raw {
            Some(raw) => Ok(Some(parse_amount(raw, contract)?)),
            // cw20 contracts report zero for unknown holders
            None => Ok(Some(0)),
        }
    }
}

#[async_trait]
impl NameService for OfflineChain {
    async fn resolve(&self, name: &str) -> Result<Option<String>> {
        Ok(self.names.get(name).cloned())
    }
}

/// Records requests instead of signing them.
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    requests: Mutex<Vec<TxRequest>>,
}

impl DryRunExecutor {
    pub async fn requests(&self) -> Vec<TxRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl TxExecutor for DryRunExecutor {
    async fn execute(&self, request: &TxRequest) -> Result<TxOutcome> {
        let mut requests = self.requests.lock().await;
        requests.push(request.clone());
        Ok(TxOutcome {
            txhash: format!("DRYRUN-{}", requests.len()),
            status: "dry-run".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::fixtures::{CONTRACT, RECIPIENT, SENDER};
    use std::io::Write;

    #[tokio::test]
    async fn load_ledger_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "balances": {{ "{SENDER}": {{ "uluna": "5000000", "uusd": "7" }} }},
                "contract_balances": {{ "{CONTRACT}": {{ "{SENDER}": "12" }} }},
                "names": {{ "alice.ust": "{RECIPIENT}" }}
            }}"#
        )
        .unwrap();

        let chain = OfflineChain::load(file.path()).unwrap();
        let native = chain.native_balances(SENDER).await.unwrap();
        assert_eq!(native.get("uluna"), Some(&5_000_000));
        assert_eq!(native.get("uusd"), Some(&7));
        assert_eq!(chain.contract_balance(CONTRACT, SENDER).await.unwrap(), Some(12));
        assert_eq!(
            chain.resolve("alice.ust").await.unwrap().as_deref(),
            Some(RECIPIENT)
        );
        assert_eq!(chain.resolve("bob.ust").await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_ledger_sections_are_optional() {
        let chain: OfflineChain = serde_json::from_str("{}").unwrap();
        assert!(chain.native_balances(SENDER).await.unwrap().is_empty());
        assert_eq!(chain.contract_balance(CONTRACT, SENDER).await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn bad_amount_is_an_error() {
        let mut chain = OfflineChain::default();
        chain
            .balances
            .entry(SENDER.to_string())
            .or_default()
            .insert("uluna".to_string(), "lots".to_string());
        let err = chain.native_balances(SENDER).await.unwrap_err().to_string();
        assert!(err.contains("lots"), "got: {err}");
    }

    #[test]
    fn missing_ledger_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(OfflineChain::load(&dir.path().join("nope.json")).is_err());
    }
}
