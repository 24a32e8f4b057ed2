use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::address::AddressFormat;
use crate::balance::{initial_gas_denom, select_balance, NativeBalances};
use crate::form::{DonationForm, Field, FormEffect, FormMessage};
use crate::resolver::{LookupRequest, LookupResponse, RecipientResolver};
use crate::token::{TokenDescriptor, TokenKind};
use crate::tx::{RefreshKey, TxBuilder, TxPayload};

/// Balance queries against the chain.
#[async_trait]
pub trait ChainQuery: Send + Sync {
    async fn native_balances(&self, owner: &str) -> Result<NativeBalances>;

    /// `None` while the contract has not answered yet.
    async fn contract_balance(&self, contract: &str, owner: &str) -> Result<Option<u128>>;
}

/// Human-readable name -> address lookups.
#[async_trait]
pub trait NameService: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<Option<String>>;
}

/// Fee estimation, signing and broadcast live behind this.
#[async_trait]
pub trait TxExecutor: Send + Sync {
    async fn execute(&self, request: &TxRequest) -> Result<TxOutcome>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessTarget {
    pub label: String,
    pub path: String,
}

impl Default for SuccessTarget {
    fn default() -> Self {
        Self {
            label: "Wallet".to_string(),
            path: "/wallet".to_string(),
        }
    }
}

/// Everything the executor needs for one submit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TxRequest {
    pub payload: TxPayload,
    /// Sample payload used for fee estimation before the real one exists.
    pub estimation: Option<TxPayload>,
    pub gas_denom: String,
    pub refresh: Vec<RefreshKey>,
    pub on_success: SuccessTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxOutcome {
    pub txhash: String,
    pub status: String,
}

pub struct DonationService {
    chain: Arc<dyn ChainQuery>,
    names: Arc<dyn NameService>,
    executor: Arc<dyn TxExecutor>,
    format: AddressFormat,
    name_suffix: String,
    token: TokenDescriptor,
    sender: Option<String>,
}

impl DonationService {
    pub fn new(
        chain: Arc<dyn ChainQuery>,
        names: Arc<dyn NameService>,
        executor: Arc<dyn TxExecutor>,
        format: AddressFormat,
        name_suffix: String,
        token: TokenDescriptor,
        sender: Option<String>,
    ) -> Self {
        Self {
            chain,
            names,
            executor,
            format,
            name_suffix,
            token,
            sender,
        }
    }

    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    pub fn token(&self) -> &TokenDescriptor {
        &self.token
    }

    pub fn format(&self) -> &AddressFormat {
        &self.format
    }

    async fn native_balances(&self, owner: &str) -> Result<NativeBalances> {
        self.chain
            .native_balances(owner)
            .await
            .context("Failed to query native balances")
    }

    /// Spendable balance of the configured token, `None` while not ready.
    pub async fn load_balance(&self) -> Result<Option<u128>> {
        let Some(owner) = self.sender.as_deref() else {
            return Ok(None);
        };
        let native = self.native_balances(owner).await?;
        let contract = match self.token.kind(&self.format) {
            TokenKind::Contract { address } => self
                .chain
                .contract_balance(address, owner)
                .await
                .context("Failed to query contract balance")?,
            TokenKind::Native { .. } => None,
        };
        Ok(select_balance(
            &self.format,
            &self.token.identifier,
            &native,
            contract,
        ))
    }

    pub async fn gas_denom(&self) -> Result<String> {
        let native = match self.sender.as_deref() {
            Some(owner) => self.native_balances(owner).await?,
            None => NativeBalances::new(),
        };
        Ok(initial_gas_denom(&native))
    }

    pub fn builder(&self) -> TxBuilder {
        TxBuilder::new(self.format.clone(), self.token.clone(), self.sender.clone())
    }

    pub fn resolver(&self) -> RecipientResolver {
        RecipientResolver::new(self.format.clone(), self.name_suffix.clone())
    }

    /// Open the form, or `None` while the balance is not available.
    pub async fn open_form(
        &self,
        prefill: Option<String>,
    ) -> Result<Option<(DonationForm, Vec<FormEffect>)>> {
        let Some(balance) = self.load_balance().await? else {
            return Ok(None);
        };
        Ok(Some(DonationForm::open(
            self.builder(),
            self.resolver(),
            balance,
            prefill,
        )))
    }

    /// Answer a lookup request. A failing name service counts as "no result".
    pub async fn lookup(&self, request: LookupRequest) -> LookupResponse {
        let address = match self.names.resolve(&request.key).await {
            Ok(address) => address,
            Err(e) => {
                warn!(name = %request.key, error = %e, "name lookup failed");
                None
            }
        };
        LookupResponse {
            key: request.key,
            address,
        }
    }

    /// Carry out effects in place, awaiting each lookup before moving on.
    pub async fn drive(&self, form: &mut DonationForm, effects: Vec<FormEffect>) {
        let mut pending = effects;
        while let Some(effect) = pending.pop() {
            if let FormEffect::Lookup(request) = effect {
                let response = self.lookup(request).await;
                pending.extend(form.update(FormMessage::LookupCompleted(response)));
            }
        }
    }

    pub fn request(&self, form: &DonationForm, gas_denom: String) -> Option<TxRequest> {
        let payload = form.payload()?;
        let builder = form.builder();
        Some(TxRequest {
            payload,
            estimation: builder.build(&builder.estimation_values()),
            gas_denom,
            refresh: builder.refresh_keys(),
            on_success: SuccessTarget::default(),
        })
    }

    /// Hand the current payload to the executor.
    pub async fn submit(&self, form: &DonationForm) -> Result<(TxOutcome, TxRequest)> {
        if let Some(reason) = form.disabled() {
            bail!("{reason}");
        }
        if let Some(reason) = form.field_error(Field::Input) {
            bail!("{reason}");
        }
        let gas_denom = self.gas_denom().await?;
        let Some(request) = self.request(form, gas_denom) else {
            let reason = form
                .builder()
                .try_build(&form.values())
                .err()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Form is not ready".to_string());
            bail!("{reason}");
        };

        let outcome = self
            .executor
            .execute(&request)
            .await
            .context("Failed to execute transaction")?;
        info!(txhash = %outcome.txhash, status = %outcome.status, "donation submitted");
        Ok((outcome, request))
    }
}
