//! In-memory aggregation backend speaking the envelope protocol.
//!
//! Every JSON route answers `{"success": true, "data": ...}` or
//! `{"success": false, "error": {"message": ..., "details": ...}}`. Sign-in
//! sets a `session-id` cookie; account and payment routes require it.
//! `/health` answers plain text.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session-id";
pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "demo-password";

const BANKS: [(i64, &str); 3] = [(1, "VBank"), (2, "SBank"), (3, "ABank")];

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub account_type: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_id: String,
    pub client_id: i64,
    pub client_name: String,
    pub account_name: Option<String>,
    pub is_active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Balance {
    pub amount: f64,
    pub currency: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub currency: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Deserialize)]
pub struct SignIn {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccount {
    pub client_id: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    #[serde(default)]
    pub from_account_id: Option<String>,
    #[serde(default)]
    pub to_phone: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct AccountsFilter {
    pub client_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct HistoryFilter {
    pub client_id: Option<i64>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

struct StoredAccount {
    owner: i64,
    account: Account,
    balance: Balance,
    history: Vec<Transaction>,
}

pub struct Store {
    users: Vec<(String, String, User)>,
    sessions: HashMap<String, i64>,
    accounts: Vec<StoredAccount>,
    next_account: u32,
}

pub type Db = Arc<RwLock<Store>>;

impl Store {
    /// One demo user with an account at VBank and one at SBank.
    pub fn seeded() -> Self {
        let user = User {
            id: 1,
            name: "Demo User".to_string(),
            account_type: "free".to_string(),
        };
        let mut store = Store {
            users: vec![(DEMO_EMAIL.to_string(), DEMO_PASSWORD.to_string(), user)],
            sessions: HashMap::new(),
            accounts: Vec::new(),
            next_account: 1,
        };
        store.open_account(1, 1, 1500.0);
        store.open_account(1, 2, 250.5);
        if let Some(first) = store.accounts.first_mut() {
            first.history = vec![
                tx("t1", "2025-01-05", "Salary", 1000.0, "credit"),
                tx("t2", "2025-01-15", "Coffee", 3.5, "debit"),
                tx("t3", "2025-02-01", "Rent", 400.0, "debit"),
            ];
        }
        store
    }

    fn open_account(&mut self, owner: i64, client_id: i64, amount: f64) -> Option<&Account> {
        let (_, bank) = BANKS.iter().find(|(id, _)| *id == client_id)?;
        let account = Account {
            account_id: format!("a{}", self.next_account),
            client_id,
            client_name: bank.to_string(),
            account_name: None,
            is_active: true,
        };
        self.next_account += 1;
        self.accounts.push(StoredAccount {
            owner,
            account,
            balance: Balance {
                amount,
                currency: "RUB".to_string(),
            },
            history: Vec::new(),
        });
        self.accounts.last().map(|s| &s.account)
    }

    fn owned_mut(&mut self, user: i64, account_id: &str, client_id: Option<i64>) -> Option<&mut StoredAccount> {
        self.accounts.iter_mut().find(|s| {
            s.owner == user
                && s.account.account_id == account_id
                && client_id.is_none_or(|id| s.account.client_id == id)
        })
    }
}

fn tx(id: &str, date: &str, description: &str, amount: f64, kind: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        date: date.to_string(),
        description: description.to_string(),
        amount,
        currency: "RUB".to_string(),
        kind: kind.to_string(),
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/sign-in", post(sign_in))
        .route("/api/auth/me", get(me))
        .route("/api/auth/logout", post(logout))
        .route("/api/accounts", get(list_accounts).post(create_account))
        .route("/api/accounts/{id}/balances", get(get_balance))
        .route("/api/accounts/{id}/transactions", get(list_transactions))
        .route("/api/payments/transfer", post(transfer))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn success<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(json!({ "success": true, "data": data }))).into_response()
}

fn failure(status: StatusCode, message: &str, details: Option<Value>) -> Response {
    let mut error = json!({ "message": message });
    if let Some(details) = details {
        error["details"] = details;
    }
    (status, Json(json!({ "success": false, "error": error }))).into_response()
}

fn unauthenticated() -> Response {
    failure(StatusCode::UNAUTHORIZED, "Not authenticated", None)
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

fn current_user(store: &Store, headers: &HeaderMap) -> Option<i64> {
    let sid = session_id(headers)?;
    store.sessions.get(&sid).copied()
}

async fn health() -> &'static str {
    "ok"
}

async fn sign_in(State(db): State<Db>, Json(input): Json<SignIn>) -> Response {
    let mut store = db.write().await;
    let Some(user) = store
        .users
        .iter()
        .find(|(email, password, _)| *email == input.email && *password == input.password)
        .map(|(_, _, user)| user.clone())
    else {
        return failure(StatusCode::UNAUTHORIZED, "Invalid email or password", None);
    };

    let sid = Uuid::new_v4().to_string();
    store.sessions.insert(sid.clone(), user.id);
    info!(user = user.id, "session opened");

    let mut response = success(StatusCode::OK, json!({ "message": "Signed in", "user": user }));
    let cookie = format!("{SESSION_COOKIE}={sid}; Path=/; HttpOnly; SameSite=Lax");
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

async fn me(State(db): State<Db>, headers: HeaderMap) -> Response {
    let store = db.read().await;
    let Some(user_id) = current_user(&store, &headers) else {
        return unauthenticated();
    };
    match store.users.iter().find(|(_, _, u)| u.id == user_id) {
        Some((_, _, user)) => success(StatusCode::OK, user),
        None => unauthenticated(),
    }
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> Response {
    let mut store = db.write().await;
    if let Some(sid) = session_id(&headers) {
        store.sessions.remove(&sid);
    }
    let mut response = success(StatusCode::OK, json!({ "message": "Signed out" }));
    let cookie = format!("{SESSION_COOKIE}=; Path=/; Max-Age=0");
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

async fn list_accounts(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(filter): Query<AccountsFilter>,
) -> Response {
    let store = db.read().await;
    let Some(user) = current_user(&store, &headers) else {
        return unauthenticated();
    };
    let accounts: Vec<&Account> = store
        .accounts
        .iter()
        .filter(|s| s.owner == user && filter.client_id.is_none_or(|id| s.account.client_id == id))
        .map(|s| &s.account)
        .collect();
    success(StatusCode::OK, accounts)
}

async fn create_account(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateAccount>,
) -> Response {
    let mut store = db.write().await;
    let Some(user) = current_user(&store, &headers) else {
        return unauthenticated();
    };
    match store.open_account(user, input.client_id, 0.0) {
        Some(account) => success(
            StatusCode::CREATED,
            json!({
                "message": "Account created",
                "account": {
                    "accountId": account.account_id,
                    "accountName": account.account_name,
                    "clientId": account.client_id,
                    "isActive": account.is_active,
                }
            }),
        ),
        None => failure(
            StatusCode::BAD_REQUEST,
            "Unknown bank",
            Some(json!({ "clientId": input.client_id })),
        ),
    }
}

async fn get_balance(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(filter): Query<AccountsFilter>,
) -> Response {
    let mut store = db.write().await;
    let Some(user) = current_user(&store, &headers) else {
        return unauthenticated();
    };
    let Some(client_id) = filter.client_id else {
        return failure(StatusCode::UNPROCESSABLE_ENTITY, "client_id is required", None);
    };
    match store.owned_mut(user, &id, Some(client_id)) {
        Some(stored) => success(StatusCode::OK, &stored.balance),
        None => failure(StatusCode::NOT_FOUND, "Balance unavailable", None),
    }
}

async fn list_transactions(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(filter): Query<HistoryFilter>,
) -> Response {
    let mut store = db.write().await;
    let Some(user) = current_user(&store, &headers) else {
        return unauthenticated();
    };
    let Some(stored) = store.owned_mut(user, &id, filter.client_id) else {
        return failure(StatusCode::NOT_FOUND, "Account not found", None);
    };
    let limit = filter.limit.unwrap_or(20).clamp(1, 100);
    let page: Vec<&Transaction> = stored
        .history
        .iter()
        .filter(|t| filter.start_date.as_deref().is_none_or(|d| t.date.as_str() >= d))
        .filter(|t| filter.end_date.as_deref().is_none_or(|d| &t.date[..d.len().min(t.date.len())] <= d))
        .skip(filter.offset.unwrap_or(0))
        .take(limit)
        .collect();
    success(StatusCode::OK, page)
}

async fn transfer(State(db): State<Db>, headers: HeaderMap, Json(input): Json<Transfer>) -> Response {
    let mut store = db.write().await;
    let Some(user) = current_user(&store, &headers) else {
        return unauthenticated();
    };
    if input.amount.is_nan() || input.amount <= 0.0 {
        return failure(
            StatusCode::BAD_REQUEST,
            "Invalid amount",
            Some(json!({ "field": "amount" })),
        );
    }
    let Some(from) = input.from_account_id.as_deref() else {
        return failure(StatusCode::UNPROCESSABLE_ENTITY, "fromAccountId is required", None);
    };
    let Some(stored) = store.owned_mut(user, from, None) else {
        return failure(StatusCode::NOT_FOUND, "Sender account not found", None);
    };
    if stored.balance.amount < input.amount {
        return failure(
            StatusCode::BAD_REQUEST,
            "Insufficient funds",
            Some(json!({ "available": stored.balance.amount })),
        );
    }

    let payment_id = Uuid::new_v4().to_string();
    stored.balance.amount -= input.amount;
    let description = input
        .description
        .unwrap_or_else(|| format!("Transfer to {}", input.to_phone.as_deref().unwrap_or("recipient")));
    stored
        .history
        .push(tx(&payment_id, "2025-03-01", &description, input.amount, "debit"));
    debug!(%payment_id, amount = input.amount, "transfer booked");

    success(
        StatusCode::OK,
        json!({
            "message": "Transfer completed",
            "paymentId": payment_id,
            "balance": stored.balance,
        }),
    )
}
