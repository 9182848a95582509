//! Wallet lifecycle tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every client
//! operation over real HTTP through `reqwest`. Validates that request
//! building, header auth, and status classification work end-to-end with an
//! actual server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use waas_client::{ApiError, ClientConfig, ErrorKind, WaasApi, WalletSecurity};
use waas_core::LIST_PAGE_SIZE;

const TOKEN: &str = "0xC32AE45504Ee9482db99CfA21066A59E877Bc0e6";

async fn start_mock_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    addr
}

fn config(addr: SocketAddr) -> ClientConfig {
    ClientConfig::new("client-id", "client-secret", "subscription")
        .unwrap()
        .with_base_url(format!("http://{addr}/v1"))
}

#[tokio::test]
async fn wallet_lifecycle() {
    let addr = start_mock_server().await;
    let api = WaasApi::new(config(addr)).unwrap();

    // Step 1: list: should be empty.
    let page = api.list_wallets(None).await.unwrap();
    assert!(page.wallets.is_empty());
    assert!(!page.has_more());

    // Step 2: create a wallet.
    let created = api.create_wallet("func-spec").await.unwrap();
    assert_eq!(created.wallet, "func-spec");
    assert_eq!(created.security, WalletSecurity::Software);

    // Step 3: creating it again conflicts.
    let err = api.create_wallet("func-spec").await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }), "{err:?}");
    assert_eq!(err.status(), Some(409));

    // Step 4: get it back.
    let fetched = api.get_wallet("func-spec").await.unwrap();
    assert_eq!(fetched, created);

    // Step 5: balances.
    let balance = api.get_wallet_balance("func-spec").await.unwrap();
    assert!(balance.address.starts_with("0x"));
    assert_eq!(balance.currency, "ETH");
    let token_balance = api.get_token_balance("func-spec", TOKEN).await.unwrap();
    assert_eq!(token_balance.balance, "0");

    // Step 6: token transactions.
    let minted = api.mint_token("func-spec", TOKEN, "3").await.unwrap();
    assert!(minted.hash.starts_with("0x"));
    let sent = api
        .send_token("func-spec", "0x1e2f7b7c4b1e0d2c3a4b5c6d7e8f9a0b1c2d3e4f", TOKEN, "0.5")
        .await
        .unwrap();
    assert_ne!(sent.hash, minted.hash);
    let approved = api
        .approve("func-spec", TOKEN, "0x9b8c7d6e5f4a3b2c1d0e9f8a7b6c5d4e3f2a1b0c", "10")
        .await
        .unwrap();
    assert_eq!(approved.hash.len(), 66);

    // Step 7: soft delete.
    let deleted = api.delete_wallet("func-spec").await.unwrap();
    assert!(deleted.recovery_id.ends_with("/func-spec"));

    // Step 8: every lookup after delete is NotFound.
    let errors = [
        api.get_wallet("func-spec").await.unwrap_err(),
        api.get_wallet_balance("func-spec").await.unwrap_err(),
        api.get_token_balance("func-spec", TOKEN).await.unwrap_err(),
        api.delete_wallet("func-spec").await.unwrap_err(),
    ];
    for err in errors {
        assert_eq!(err.kind(), ErrorKind::NotFound, "{err:?}");
    }

    // Step 9: transactions on a missing wallet pass the 404 through untouched.
    let err = api.mint_token("func-spec", TOKEN, "1").await.unwrap_err();
    assert!(matches!(err, ApiError::Transport { status: Some(404), .. }), "{err:?}");
}

#[tokio::test]
async fn wallet_names_are_percent_encoded() {
    let addr = start_mock_server().await;
    let api = WaasApi::new(config(addr)).unwrap();

    api.create_wallet("user 42/alice").await.unwrap();
    let wallet = api.get_wallet("user 42/alice").await.unwrap();
    assert_eq!(wallet.wallet, "user 42/alice");
}

#[tokio::test]
async fn hsm_mode_is_configurable() {
    let addr = start_mock_server().await;
    let api = WaasApi::new(config(addr).with_hsm(true)).unwrap();

    let wallet = api.create_wallet("vault").await.unwrap();
    assert_eq!(wallet.security, WalletSecurity::Hsm);
}

#[tokio::test]
async fn pagination_follows_skiptoken() {
    let addr = start_mock_server().await;
    let api = WaasApi::new(config(addr)).unwrap();

    for i in 0..LIST_PAGE_SIZE + 5 {
        api.create_wallet(&format!("wallet-{i:02}")).await.unwrap();
    }

    let first = api.list_wallets(None).await.unwrap();
    assert_eq!(first.wallets.len(), LIST_PAGE_SIZE);
    let token = first.continuation_token.clone().expect("expected a second page");

    let second = api.list_wallets(Some(&token)).await.unwrap();
    assert_eq!(second.wallets.len(), 5);
    assert_eq!(second.wallets[0].wallet, format!("wallet-{LIST_PAGE_SIZE:02}"));
    assert!(!second.has_more());
}

#[tokio::test]
async fn concurrent_calls_share_one_client() {
    let addr = start_mock_server().await;
    let api = Arc::new(WaasApi::new(config(addr)).unwrap());

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let api = Arc::clone(&api);
            tokio::spawn(async move { api.create_wallet(&format!("concurrent-{i}")).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let page = api.list_wallets(None).await.unwrap();
    assert_eq!(page.wallets.len(), 10);
}

#[tokio::test]
async fn unmapped_statuses_pass_through_as_transport_error() {
    use waas_client::{HttpTransport, Transport};
    use waas_core::WaasClient;

    let addr = start_mock_server().await;
    let core = WaasClient::new(config(addr)).unwrap();
    let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();

    // Strip the secret header so the server rejects the request.
    let mut request = core.build_get_wallet("alice").unwrap();
    request.headers.retain(|(name, _)| name != "tangany-client-secret");

    let response = transport.send(request).await.unwrap();
    assert_eq!(response.status, 401);
    let err = core.parse_get_wallet(response).unwrap_err();
    match err {
        ApiError::Transport { status, body, message } => {
            assert_eq!(status, Some(401));
            assert!(body.contains("statusCode"));
            assert_eq!(message, "Missing authentication headers");
        }
        other => panic!("expected Transport, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let api = WaasApi::new(config(addr).with_timeout(Duration::from_secs(2))).unwrap();

    let err = api.get_wallet("alice").await.unwrap_err();
    assert!(matches!(err, ApiError::Transport { status: None, .. }), "{err:?}");
}

#[tokio::test]
async fn slow_server_times_out() {
    use axum::{routing::get, Router};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let slow = Router::new().route(
        "/v1/wallet",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "{}"
        }),
    );
    tokio::spawn(async move { axum::serve(listener, slow).await });

    let api = WaasApi::new(config(addr).with_timeout(Duration::from_millis(200))).unwrap();
    let err = api.list_wallets(None).await.unwrap_err();
    match err {
        ApiError::Transport { status, message, .. } => {
            assert_eq!(status, None);
            assert!(message.contains("timed out"), "{message}");
        }
        other => panic!("expected Transport, got {other:?}"),
    }
}

/// Serves one connection with `head`, a body shorter than its
/// Content-Length, then hangs up.
async fn start_truncating_server(head: &'static str) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        let response = format!("{head}\r\nContent-Length: 100\r\nConnection: close\r\n\r\n{{\"partial");
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });
    addr
}

#[tokio::test]
async fn truncated_error_body_still_classifies_status() {
    let addr = start_truncating_server("HTTP/1.1 404 Not Found").await;
    let api = WaasApi::new(config(addr)).unwrap();

    let err = api.get_wallet("alice").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound, "{err:?}");
}

#[tokio::test]
async fn truncated_success_body_is_a_transport_error() {
    let addr = start_truncating_server("HTTP/1.1 200 OK").await;
    let api = WaasApi::new(config(addr)).unwrap();

    let err = api.get_wallet("alice").await.unwrap_err();
    assert!(matches!(err, ApiError::Transport { status: Some(200), .. }), "{err:?}");
}
