//! Async wallet API client.

use waas_core::{
    ApiError, ClientConfig, HttpRequest, HttpResponse, SoftDeletedWallet, TokenBalance, TransactionReceipt,
    WaasClient, Wallet, WalletBalance, WalletPage,
};

use crate::transport::{HttpTransport, Transport};

/// Async client for the wallet service.
///
/// Every method validates its arguments, performs exactly one
/// `Transport::send`, and classifies the response. Holds only immutable
/// configuration, so a single instance can be shared across tasks (wrap it
/// in an `Arc`) and called concurrently.
#[derive(Debug, Clone)]
pub struct WaasApi<T = HttpTransport> {
    core: WaasClient,
    transport: T,
}

impl WaasApi<HttpTransport> {
    /// Client using `reqwest` with `config.timeout` applied to every request.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(config.timeout)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> WaasApi<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ApiError> {
        Ok(Self {
            core: WaasClient::new(config)?,
            transport,
        })
    }

    pub fn core(&self) -> &WaasClient {
        &self.core
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn execute<R>(
        &self,
        request: Result<HttpRequest, ApiError>,
        parse: impl FnOnce(&WaasClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let response = self.transport.send(request?).await?;
        parse(&self.core, response)
    }

    /// Create a software (or HSM, per config) wallet named `name`.
    /// Fails with `ApiError::Conflict` if the name is taken.
    pub async fn create_wallet(&self, name: &str) -> Result<Wallet, ApiError> {
        self.execute(self.core.build_create_wallet(name), WaasClient::parse_create_wallet)
            .await
    }

    pub async fn get_wallet(&self, name: &str) -> Result<Wallet, ApiError> {
        self.execute(self.core.build_get_wallet(name), WaasClient::parse_get_wallet)
            .await
    }

    /// Ethereum address and ether balance of a wallet.
    pub async fn get_wallet_balance(&self, name: &str) -> Result<WalletBalance, ApiError> {
        self.execute(self.core.build_get_wallet_balance(name), WaasClient::parse_get_wallet_balance)
            .await
    }

    pub async fn get_token_balance(&self, name: &str, token_address: &str) -> Result<TokenBalance, ApiError> {
        self.execute(
            self.core.build_get_token_balance(name, token_address),
            WaasClient::parse_get_token_balance,
        )
        .await
    }

    /// Soft-delete a wallet. Restoring it is only possible through the
    /// service's support channel, before the scheduled purge date.
    pub async fn delete_wallet(&self, name: &str) -> Result<SoftDeletedWallet, ApiError> {
        self.execute(self.core.build_delete_wallet(name), WaasClient::parse_delete_wallet)
            .await
    }

    /// One page of wallets. Pass the previous page's `continuation_token` to
    /// continue.
    pub async fn list_wallets(&self, continuation_token: Option<&str>) -> Result<WalletPage, ApiError> {
        self.execute(self.core.build_list_wallets(continuation_token), WaasClient::parse_list_wallets)
            .await
    }

    pub async fn send_token(
        &self,
        name: &str,
        recipient_address: &str,
        token_address: &str,
        amount: &str,
    ) -> Result<TransactionReceipt, ApiError> {
        self.execute(
            self.core.build_send_token(name, recipient_address, token_address, amount),
            WaasClient::parse_send_token,
        )
        .await
    }

    pub async fn mint_token(&self, name: &str, token_address: &str, amount: &str) -> Result<TransactionReceipt, ApiError> {
        self.execute(
            self.core.build_mint_token(name, token_address, amount),
            WaasClient::parse_mint_token,
        )
        .await
    }

    pub async fn approve(
        &self,
        name: &str,
        token_address: &str,
        spender_address: &str,
        amount: &str,
    ) -> Result<TransactionReceipt, ApiError> {
        self.execute(
            self.core.build_approve(name, token_address, spender_address, amount),
            WaasClient::parse_approve,
        )
        .await
    }
}
