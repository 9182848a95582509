//! Stateless HTTP request builder and response parser for the wallet API.
//!
//! # Design
//! `WaasClient` holds only validated configuration and carries no mutable
//! state between calls. Each operation is split into a `build_*` method that
//! validates arguments and produces an `HttpRequest`, and a `parse_*` method
//! that consumes an `HttpResponse`. All status handling goes through
//! [`classify`], so operations differ only in which statuses they remap.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    CreateWallet, SoftDeletedWallet, TokenBalance, TokenMint, TokenTransfer, TransactionReceipt,
    Wallet, WalletBalance, WalletPage,
};

pub const CLIENT_ID_HEADER: &str = "tangany-client-id";
pub const CLIENT_SECRET_HEADER: &str = "tangany-client-secret";
pub const SUBSCRIPTION_HEADER: &str = "tangany-subscription";

/// Maximum number of wallets the service returns per listing page.
pub const LIST_PAGE_SIZE: usize = 25;

/// Each API call the client can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateWallet,
    GetWallet,
    DeleteWallet,
    ListWallets,
    GetWalletBalance,
    GetTokenBalance,
    SendToken,
    MintToken,
    Approve,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::CreateWallet => "create_wallet",
            Operation::GetWallet => "get_wallet",
            Operation::DeleteWallet => "delete_wallet",
            Operation::ListWallets => "list_wallets",
            Operation::GetWalletBalance => "get_wallet_balance",
            Operation::GetTokenBalance => "get_token_balance",
            Operation::SendToken => "send_token",
            Operation::MintToken => "mint_token",
            Operation::Approve => "approve",
        }
    }

    /// Whether a 404 means "no such wallet" for this call.
    pub fn maps_not_found(self) -> bool {
        matches!(
            self,
            Operation::GetWallet
                | Operation::DeleteWallet
                | Operation::GetWalletBalance
                | Operation::GetTokenBalance
        )
    }

    /// Whether a 409 means "wallet name taken" for this call.
    pub fn maps_conflict(self) -> bool {
        matches!(self, Operation::CreateWallet)
    }
}

/// Error envelope the service returns on failures.
#[derive(Deserialize)]
struct ServiceError {
    message: String,
}

fn service_message(body: &str) -> Option<String> {
    serde_json::from_str::<ServiceError>(body).ok().map(|e| e.message)
}

/// Map a response status to success or the appropriate `ApiError` variant.
///
/// Any 2xx is success. 404 and 409 are remapped only for operations that
/// declare them; every other failure is returned as `ApiError::Transport`
/// with the original status and body.
pub fn classify(operation: Operation, response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        debug!(operation = operation.name(), status = response.status, "request succeeded");
        return Ok(());
    }
    debug!(
        operation = operation.name(),
        status = response.status,
        body = %response.body,
        "request failed"
    );

    match response.status {
        404 if operation.maps_not_found() => Err(ApiError::NotFound {
            message: service_message(&response.body)
                .unwrap_or_else(|| "wallet not found for given name".to_string()),
        }),
        409 if operation.maps_conflict() => Err(ApiError::Conflict {
            message: service_message(&response.body)
                .unwrap_or_else(|| "wallet name already exists".to_string()),
        }),
        status => Err(ApiError::Transport {
            status: Some(status),
            body: response.body.clone(),
            message: service_message(&response.body)
                .unwrap_or_else(|| format!("{} failed with HTTP {status}", operation.name())),
        }),
    }
}

fn require<'a>(arg: &'static str, value: &'a str) -> Result<&'a str, ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidArgument(format!("missing {arg} arg")));
    }
    Ok(value)
}

/// A required value that becomes one URL path segment. `.` and `..` are
/// rejected because URL normalization would drop them and change the route.
fn require_segment<'a>(arg: &'static str, value: &'a str) -> Result<&'a str, ApiError> {
    let value = require(arg, value)?;
    if matches!(value, "." | "..") {
        return Err(ApiError::InvalidArgument(format!("{arg} arg cannot be {value:?}")));
    }
    Ok(value)
}

/// Amounts are decimal strings: digits with an optional fractional part.
fn require_amount(amount: &str) -> Result<&str, ApiError> {
    let amount = require("amount", amount)?;
    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (amount, None),
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(whole) || !fraction.map_or(true, digits) {
        return Err(ApiError::InvalidArgument(format!(
            "amount must be a decimal number, got {amount:?}"
        )));
    }
    Ok(amount)
}

fn to_json<T: Serialize>(body: &T) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Stateless client for the wallet API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The caller executes the HTTP round-trip between
/// `build_*` and `parse_*`.
#[derive(Debug, Clone)]
pub struct WaasClient {
    config: ClientConfig,
    base_url: Url,
}

impl WaasClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let base_url = config.validate()?;
        Ok(Self { config, base_url })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for `segments` below the base, each one percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Configuration("base url cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(
        &self,
        operation: Operation,
        method: HttpMethod,
        url: Url,
        body: Option<String>,
    ) -> HttpRequest {
        let credentials = &self.config.credentials;
        let mut headers = vec![
            (CLIENT_ID_HEADER.to_string(), credentials.client_id().to_string()),
            (CLIENT_SECRET_HEADER.to_string(), credentials.client_secret().to_string()),
            (SUBSCRIPTION_HEADER.to_string(), credentials.subscription().to_string()),
            ("accept".to_string(), "application/json".to_string()),
        ];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        debug!(operation = operation.name(), method = method.as_str(), url = %url, "built request");
        HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        }
    }

    pub fn build_create_wallet(&self, name: &str) -> Result<HttpRequest, ApiError> {
        let name = require("wallet", name)?;
        let body = to_json(&CreateWallet {
            wallet: name.to_string(),
            use_hsm: self.config.use_hsm,
        })?;
        let url = self.endpoint(&["wallet"])?;
        Ok(self.request(Operation::CreateWallet, HttpMethod::Post, url, Some(body)))
    }

    pub fn build_get_wallet(&self, name: &str) -> Result<HttpRequest, ApiError> {
        let name = require_segment("wallet", name)?;
        let url = self.endpoint(&["wallet", name])?;
        Ok(self.request(Operation::GetWallet, HttpMethod::Get, url, None))
    }

    /// Soft-deletes the wallet; restoring it is only possible out of band.
    pub fn build_delete_wallet(&self, name: &str) -> Result<HttpRequest, ApiError> {
        let name = require_segment("wallet", name)?;
        let url = self.endpoint(&["wallet", name])?;
        Ok(self.request(Operation::DeleteWallet, HttpMethod::Delete, url, None))
    }

    /// Lists up to [`LIST_PAGE_SIZE`] wallets. Pass the previous page's
    /// continuation token to fetch the next one; an empty token is treated
    /// as no token.
    pub fn build_list_wallets(&self, continuation_token: Option<&str>) -> Result<HttpRequest, ApiError> {
        let mut url = self.endpoint(&["wallet"])?;
        if let Some(token) = continuation_token.filter(|t| !t.is_empty()) {
            url.query_pairs_mut().append_pair("skiptoken", token);
        }
        Ok(self.request(Operation::ListWallets, HttpMethod::Get, url, None))
    }

    pub fn build_get_wallet_balance(&self, name: &str) -> Result<HttpRequest, ApiError> {
        let name = require_segment("wallet", name)?;
        let url = self.endpoint(&["eth", "wallet", name])?;
        Ok(self.request(Operation::GetWalletBalance, HttpMethod::Get, url, None))
    }

    pub fn build_get_token_balance(&self, name: &str, token_address: &str) -> Result<HttpRequest, ApiError> {
        let name = require_segment("wallet", name)?;
        let token_address = require_segment("tokenAddress", token_address)?;
        let url = self.endpoint(&["eth", "erc20", token_address, name])?;
        Ok(self.request(Operation::GetTokenBalance, HttpMethod::Get, url, None))
    }

    pub fn build_send_token(
        &self,
        name: &str,
        recipient_address: &str,
        token_address: &str,
        amount: &str,
    ) -> Result<HttpRequest, ApiError> {
        let name = require_segment("wallet", name)?;
        let recipient_address = require("recipientAddress", recipient_address)?;
        let token_address = require_segment("tokenAddress", token_address)?;
        let amount = require_amount(amount)?;
        let body = to_json(&TokenTransfer {
            to: recipient_address.to_string(),
            amount: amount.to_string(),
        })?;
        let url = self.endpoint(&["eth", "erc20", token_address, name, "send"])?;
        Ok(self.request(Operation::SendToken, HttpMethod::Post, url, Some(body)))
    }

    pub fn build_mint_token(&self, name: &str, token_address: &str, amount: &str) -> Result<HttpRequest, ApiError> {
        let name = require_segment("wallet", name)?;
        let token_address = require_segment("tokenAddress", token_address)?;
        let amount = require_amount(amount)?;
        let body = to_json(&TokenMint {
            amount: amount.to_string(),
        })?;
        let url = self.endpoint(&["eth", "erc20", token_address, name, "mint"])?;
        Ok(self.request(Operation::MintToken, HttpMethod::Post, url, Some(body)))
    }

    pub fn build_approve(
        &self,
        name: &str,
        token_address: &str,
        spender_address: &str,
        amount: &str,
    ) -> Result<HttpRequest, ApiError> {
        let name = require_segment("wallet", name)?;
        let token_address = require_segment("tokenAddress", token_address)?;
        let spender_address = require("spenderAddress", spender_address)?;
        let amount = require_amount(amount)?;
        let body = to_json(&TokenTransfer {
            to: spender_address.to_string(),
            amount: amount.to_string(),
        })?;
        let url = self.endpoint(&["eth", "erc20", token_address, name, "approve"])?;
        Ok(self.request(Operation::Approve, HttpMethod::Post, url, Some(body)))
    }

    pub fn parse_create_wallet(&self, response: HttpResponse) -> Result<Wallet, ApiError> {
        parse_json(Operation::CreateWallet, response)
    }

    pub fn parse_get_wallet(&self, response: HttpResponse) -> Result<Wallet, ApiError> {
        parse_json(Operation::GetWallet, response)
    }

    pub fn parse_delete_wallet(&self, response: HttpResponse) -> Result<SoftDeletedWallet, ApiError> {
        parse_json(Operation::DeleteWallet, response)
    }

    pub fn parse_list_wallets(&self, response: HttpResponse) -> Result<WalletPage, ApiError> {
        parse_json(Operation::ListWallets, response)
    }

    pub fn parse_get_wallet_balance(&self, response: HttpResponse) -> Result<WalletBalance, ApiError> {
        parse_json(Operation::GetWalletBalance, response)
    }

    pub fn parse_get_token_balance(&self, response: HttpResponse) -> Result<TokenBalance, ApiError> {
        parse_json(Operation::GetTokenBalance, response)
    }

    pub fn parse_send_token(&self, response: HttpResponse) -> Result<TransactionReceipt, ApiError> {
        parse_json(Operation::SendToken, response)
    }

    pub fn parse_mint_token(&self, response: HttpResponse) -> Result<TransactionReceipt, ApiError> {
        parse_json(Operation::MintToken, response)
    }

    pub fn parse_approve(&self, response: HttpResponse) -> Result<TransactionReceipt, ApiError> {
        parse_json(Operation::Approve, response)
    }
}

fn parse_json<T: DeserializeOwned>(operation: Operation, response: HttpResponse) -> Result<T, ApiError> {
    classify(operation, &response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
