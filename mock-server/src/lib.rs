use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const PAGE_SIZE: usize = 25;

const AUTH_HEADERS: [&str; 3] = ["tangany-client-id", "tangany-client-secret", "tangany-subscription"];
const CREATED_AT: &str = "2019-03-12T11:25:32Z";
const PURGE_DATE: &str = "2019-07-11T09:33:05Z";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Wallet {
    pub wallet: String,
    pub security: String,
    pub created: String,
    pub updated: String,
    pub version: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletList {
    pub list: Vec<Wallet>,
    pub skiptoken: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWallet {
    pub wallet: String,
    #[serde(default)]
    pub use_hsm: bool,
}

#[derive(Deserialize)]
pub struct Transfer {
    pub to: String,
    pub amount: String,
}

#[derive(Deserialize)]
pub struct Mint {
    pub amount: String,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub skiptoken: Option<String>,
}

/// Body the service sends with every error status.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub activity_id: Uuid,
    pub message: String,
}

struct Record {
    wallet: Wallet,
    address: String,
}

type Db = Arc<RwLock<BTreeMap<String, Record>>>;

struct ApiFailure(StatusCode, String);

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status_code: self.0.as_u16(),
            activity_id: Uuid::new_v4(),
            message: self.1,
        };
        (self.0, Json(body)).into_response()
    }
}

fn not_found(name: &str) -> ApiFailure {
    ApiFailure(StatusCode::NOT_FOUND, format!("No wallet found for name {name}"))
}

fn random_hex(len: usize) -> String {
    let mut hex = String::with_capacity(len);
    while hex.len() < len {
        hex.push_str(&Uuid::new_v4().simple().to_string());
    }
    hex.truncate(len);
    hex
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(BTreeMap::new()));
    let api = Router::new()
        .route("/wallet", get(list_wallets).post(create_wallet))
        .route("/wallet/{name}", get(get_wallet).delete(delete_wallet))
        .route("/eth/wallet/{name}", get(wallet_balance))
        .route("/eth/erc20/{token}/{name}", get(token_balance))
        .route("/eth/erc20/{token}/{name}/send", post(send_token))
        .route("/eth/erc20/{token}/{name}/mint", post(mint_token))
        .route("/eth/erc20/{token}/{name}/approve", post(approve))
        .route_layer(middleware::from_fn(require_auth))
        .with_state(db);
    Router::new().nest("/v1", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_auth(request: Request, next: Next) -> Response {
    let authorized = AUTH_HEADERS.iter().all(|name| {
        request
            .headers()
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| !v.is_empty())
    });
    if !authorized {
        tracing::warn!(uri = %request.uri(), "rejected request without authentication headers");
        return ApiFailure(StatusCode::UNAUTHORIZED, "Missing authentication headers".to_string()).into_response();
    }
    next.run(request).await
}

async fn create_wallet(
    State(db): State<Db>,
    Json(input): Json<CreateWallet>,
) -> Result<(StatusCode, Json<Wallet>), ApiFailure> {
    if input.wallet.is_empty() {
        return Err(ApiFailure(StatusCode::BAD_REQUEST, "Missing wallet name".to_string()));
    }
    let mut wallets = db.write().await;
    if wallets.contains_key(&input.wallet) {
        return Err(ApiFailure(
            StatusCode::CONFLICT,
            format!("Won't overwrite existing wallet with name {}", input.wallet),
        ));
    }
    let wallet = Wallet {
        wallet: input.wallet.clone(),
        security: if input.use_hsm { "hsm" } else { "software" }.to_string(),
        created: CREATED_AT.to_string(),
        updated: CREATED_AT.to_string(),
        version: Uuid::new_v4().simple().to_string(),
    };
    let record = Record {
        wallet: wallet.clone(),
        address: format!("0x{}", random_hex(40)),
    };
    tracing::info!(wallet = %input.wallet, use_hsm = input.use_hsm, "created wallet");
    wallets.insert(input.wallet, record);
    Ok((StatusCode::CREATED, Json(wallet)))
}

/// Pages are ordered by name. The skiptoken is the offset of the next page,
/// which clients must treat as opaque.
async fn list_wallets(
    State(db): State<Db>,
    Query(query): Query<ListQuery>,
) -> Result<Json<WalletList>, ApiFailure> {
    let offset = match query.skiptoken.as_deref() {
        None | Some("") => 0,
        Some(token) => token
            .parse::<usize>()
            .map_err(|_| ApiFailure(StatusCode::BAD_REQUEST, format!("Invalid skiptoken {token}")))?,
    };
    let wallets = db.read().await;
    let list: Vec<Wallet> = wallets
        .values()
        .skip(offset)
        .take(PAGE_SIZE)
        .map(|r| r.wallet.clone())
        .collect();
    let next = offset + list.len();
    let skiptoken = (next < wallets.len()).then(|| next.to_string());
    Ok(Json(WalletList { list, skiptoken }))
}

async fn get_wallet(State(db): State<Db>, Path(name): Path<String>) -> Result<Json<Wallet>, ApiFailure> {
    let wallets = db.read().await;
    wallets
        .get(&name)
        .map(|r| Json(r.wallet.clone()))
        .ok_or_else(|| not_found(&name))
}

async fn delete_wallet(
    State(db): State<Db>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiFailure> {
    let mut wallets = db.write().await;
    wallets.remove(&name).ok_or_else(|| not_found(&name))?;
    tracing::info!(wallet = %name, "soft-deleted wallet");
    Ok(Json(serde_json::json!({
        "recoveryId": format!("https://waas-mock.vault/deletedsecrets/{name}"),
        "scheduledPurgeDate": PURGE_DATE,
    })))
}

async fn wallet_balance(
    State(db): State<Db>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiFailure> {
    let wallets = db.read().await;
    let record = wallets.get(&name).ok_or_else(|| not_found(&name))?;
    Ok(Json(serde_json::json!({
        "address": record.address,
        "balance": "0",
        "currency": "ETH",
    })))
}

async fn token_balance(
    State(db): State<Db>,
    Path((_token, name)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiFailure> {
    let wallets = db.read().await;
    wallets.get(&name).ok_or_else(|| not_found(&name))?;
    Ok(Json(serde_json::json!({
        "balance": "0",
        "currency": "TOKEN",
    })))
}

async fn submit(db: &Db, name: &str, amount: &str) -> Result<(StatusCode, Json<serde_json::Value>), ApiFailure> {
    if !db.read().await.contains_key(name) {
        return Err(not_found(name));
    }
    if amount.is_empty() {
        return Err(ApiFailure(StatusCode::BAD_REQUEST, "Missing amount".to_string()));
    }
    let hash = format!("0x{}", random_hex(64));
    Ok((StatusCode::ACCEPTED, Json(serde_json::json!({ "hash": hash }))))
}

async fn send_token(
    State(db): State<Db>,
    Path((_token, name)): Path<(String, String)>,
    Json(input): Json<Transfer>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiFailure> {
    if input.to.is_empty() {
        return Err(ApiFailure(StatusCode::BAD_REQUEST, "Missing recipient".to_string()));
    }
    submit(&db, &name, &input.amount).await
}

async fn mint_token(
    State(db): State<Db>,
    Path((_token, name)): Path<(String, String)>,
    Json(input): Json<Mint>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiFailure> {
    submit(&db, &name, &input.amount).await
}

async fn approve(
    State(db): State<Db>,
    Path((_token, name)): Path<(String, String)>,
    Json(input): Json<Transfer>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiFailure> {
    if input.to.is_empty() {
        return Err(ApiFailure(StatusCode::BAD_REQUEST, "Missing spender".to_string()));
    }
    submit(&db, &name, &input.amount).await
}
