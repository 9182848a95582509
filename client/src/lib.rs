//! Async host for the wallet-as-a-service API.
//!
//! # Overview
//! `waas-core` builds requests and classifies responses; this crate runs the
//! round-trip. [`WaasApi`] is the client most callers want. [`Transport`] is
//! the seam for swapping the HTTP stack (tests use an in-memory one).
//!
//! ```no_run
//! # async fn demo() -> Result<(), waas_client::ApiError> {
//! use waas_client::{ClientConfig, WaasApi};
//!
//! let api = WaasApi::new(ClientConfig::new("client-id", "client-secret", "subscription")?)?;
//! let wallet = api.create_wallet("alice").await?;
//! let balance = api.get_wallet_balance(&wallet.wallet).await?;
//! println!("{} holds {} {}", balance.address, balance.balance, balance.currency);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod transport;

pub use api::WaasApi;
pub use transport::{HttpTransport, Transport};
pub use waas_core::{
    ApiError, ClientConfig, Credentials, ErrorKind, SoftDeletedWallet, TokenBalance, TransactionReceipt, Wallet,
    WalletBalance, WalletPage, WalletSecurity,
};
