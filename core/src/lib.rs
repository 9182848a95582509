//! Sans-IO core for the wallet-as-a-service API client.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The `waas-client` crate runs
//! the round-trip asynchronously; any other host can do the same.
//!
//! # Design
//! - `WaasClient` is stateless: it holds only validated `ClientConfig`.
//! - Each operation is split into `build_*` (validates arguments, produces a
//!   request) and `parse_*` (classifies the status, deserializes the body).
//!   A `build_*` error means no request exists, so nothing reaches the wire.
//! - Status-to-error mapping lives in one place, [`client::classify`].
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use client::{classify, Operation, WaasClient, LIST_PAGE_SIZE};
pub use config::{ClientConfig, Credentials};
pub use error::{ApiError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{
    CreateWallet, SoftDeletedWallet, TokenBalance, TokenMint, TokenTransfer, TransactionReceipt,
    Wallet, WalletBalance, WalletPage, WalletSecurity,
};
