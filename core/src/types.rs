//! Domain DTOs for the wallet API.
//!
//! # Design
//! Field names follow the service's JSON so response bodies pass through
//! unchanged. Timestamps, versions and amounts stay strings: the client does
//! no arithmetic or date handling, it only types what the service sends.

use serde::{Deserialize, Deserializer, Serialize};

/// Key storage backing a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletSecurity {
    Software,
    Hsm,
}

/// A named custody unit on the service. `wallet` is the caller-chosen name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub wallet: String,
    pub security: WalletSecurity,
    pub created: String,
    pub updated: String,
    pub version: String,
}

/// Ethereum address and ether balance of a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalance {
    pub address: String,
    pub balance: String,
    pub currency: String,
}

/// ERC20 token balance of a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub balance: String,
    pub currency: String,
}

/// Returned by a wallet deletion. The wallet can only be restored out of band
/// before `scheduled_purge_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftDeletedWallet {
    pub recovery_id: String,
    pub scheduled_purge_date: String,
}

/// Hash of a transaction submitted by the service. Mining happens later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub hash: String,
}

/// One page of a wallet listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletPage {
    #[serde(rename = "list")]
    pub wallets: Vec<Wallet>,
    /// Opaque cursor for the next page; `None` on the last page.
    #[serde(
        rename = "skiptoken",
        default,
        deserialize_with = "non_empty_token",
        skip_serializing_if = "Option::is_none"
    )]
    pub continuation_token: Option<String>,
}

impl WalletPage {
    pub fn has_more(&self) -> bool {
        self.continuation_token.is_some()
    }
}

// The service sends `null` or `""` on the last page.
fn non_empty_token<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let token: Option<String> = Option::deserialize(deserializer)?;
    Ok(token.filter(|t| !t.is_empty()))
}

/// Request payload for creating a wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWallet {
    pub wallet: String,
    pub use_hsm: bool,
}

/// Request payload for `send` and `approve`. For `approve`, `to` is the
/// spender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenTransfer {
    pub to: String,
    pub amount: String,
}

/// Request payload for `mint`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenMint {
    pub amount: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_security_uses_lowercase_names() {
        assert_eq!(serde_json::to_value(WalletSecurity::Hsm).unwrap(), "hsm");
        let sec: WalletSecurity = serde_json::from_str(r#""software""#).unwrap();
        assert_eq!(sec, WalletSecurity::Software);
    }

    #[test]
    fn create_wallet_serializes_use_hsm_in_camel_case() {
        let body = CreateWallet {
            wallet: "alice".to_string(),
            use_hsm: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"wallet": "alice", "useHsm": false}));
    }

    #[test]
    fn soft_deleted_wallet_reads_camel_case() {
        let deleted: SoftDeletedWallet = serde_json::from_str(
            r#"{"recoveryId":"https://vault/deletedsecrets/alice","scheduledPurgeDate":"2019-07-11T09:33:05Z"}"#,
        )
        .unwrap();
        assert_eq!(deleted.recovery_id, "https://vault/deletedsecrets/alice");
        assert_eq!(deleted.scheduled_purge_date, "2019-07-11T09:33:05Z");
    }

    #[test]
    fn wallet_page_without_skiptoken_is_last() {
        let page: WalletPage = serde_json::from_str(r#"{"list":[]}"#).unwrap();
        assert!(page.wallets.is_empty());
        assert!(!page.has_more());
    }

    #[test]
    fn wallet_page_treats_null_and_empty_skiptoken_as_last() {
        let page: WalletPage = serde_json::from_str(r#"{"list":[],"skiptoken":null}"#).unwrap();
        assert!(!page.has_more());
        let page: WalletPage = serde_json::from_str(r#"{"list":[],"skiptoken":""}"#).unwrap();
        assert!(!page.has_more());
    }

    #[test]
    fn wallet_page_keeps_opaque_skiptoken() {
        let page: WalletPage =
            serde_json::from_str(r#"{"list":[],"skiptoken":"Mi4xNDU+MA=="}"#).unwrap();
        assert_eq!(page.continuation_token.as_deref(), Some("Mi4xNDU+MA=="));
    }

    #[test]
    fn wallet_rejects_unknown_security_mode() {
        let result: Result<Wallet, _> = serde_json::from_str(
            r#"{"wallet":"a","security":"paper","created":"c","updated":"u","version":"v"}"#,
        );
        assert!(result.is_err());
    }
}
