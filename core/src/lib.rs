//! Client for the multi-bank aggregation API.
//!
//! # Overview
//! Every backend endpoint answers with an envelope, either
//! `{"success": true, "data": ...}` or
//! `{"success": false, "error": {"message": ..., "details": ...}}`.
//! `ApiClient` turns a request descriptor into an HTTP call, decodes the
//! envelope and returns `data`, or raises an `ApiError`.
//!
//! # Design
//! - `ApiClient` holds a base URL and a `Transport`; it has no other state.
//! - A call is `build_request` (pure), `Transport::execute` (I/O), then
//!   `parse_response` (pure), so the normalization rules are testable without
//!   a server.
//! - `ReqwestTransport` keeps a cookie store; the session cookie set at
//!   sign-in travels with every later request.
//! - No retries, timeouts or caching at this layer.

pub mod accounts;
pub mod auth;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod envelope;
pub mod error;
pub mod http;
pub mod payments;
pub mod query;
pub mod transport;
pub mod types;

pub use client::{ApiClient, RequestOptions};
pub use config::ClientConfig;
pub use envelope::{Envelope, ErrorBody};
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::{QueryParams, QueryValue};
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    Account, AccountCreateRequest, AccountType, Balance, CreatedAccount, MessageResponse, NewAccount,
    SignInRequest, SignInResponse, Transaction, TransactionKind, TransactionsQuery, TransferReceipt,
    TransferRequest, UserProfile,
};
