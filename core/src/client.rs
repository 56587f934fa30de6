//! The response normalizer.
//!
//! # Design
//! `ApiClient` holds only a base URL and a `Transport`. A call is split into
//! `build_request` (descriptor to `HttpRequest`), the transport round-trip,
//! and `parse_response` (`HttpResponse` to data or `ApiError`). The two pure
//! halves are public so callers with their own I/O can reuse them.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::envelope::Envelope;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::QueryParams;
use crate::transport::{ReqwestTransport, Transport};

/// Per-call request descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub body: Option<Value>,
    pub params: Option<QueryParams>,
}

impl RequestOptions {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            body: None,
            params: None,
        }
    }

    /// Serialize `body` to JSON. `null` counts as no body.
    pub fn body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(ApiError::transport)?;
        self.body = (!value.is_null()).then_some(value);
        Ok(self)
    }

    pub fn params(mut self, params: QueryParams) -> Self {
        self.params = Some(params);
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(HttpMethod::Get)
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient<T = ReqwestTransport> {
    base_url: String,
    transport: T,
}

impl ApiClient<ReqwestTransport> {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self::with_transport(base_url, ReqwestTransport::new()?))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.base_url)
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve `path` against the base URL and attach the query string.
    /// Absolute `http(s)://` paths skip the base URL.
    pub fn build_request(&self, path: &str, options: &RequestOptions) -> Result<HttpRequest> {
        let path = match &options.params {
            Some(params) => params.append_to(path),
            None => path.to_string(),
        };
        let url = if path.starts_with("http://") || path.starts_with("https://") {
            path
        } else if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        };
        let body = options
            .body
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(ApiError::transport)?;

        Ok(HttpRequest {
            method: options.method,
            url,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body,
        })
    }

    /// Decode an envelope. A `success: false` envelope becomes
    /// `ApiError::Api` with the response status; a body that is not a valid
    /// envelope for `R` becomes `ApiError::Transport`.
    pub fn parse_response<R: DeserializeOwned>(&self, response: HttpResponse) -> Result<R> {
        let envelope: Envelope<R> = serde_json::from_str(&response.body).map_err(ApiError::transport)?;
        envelope.into_result().map_err(|error| ApiError::Api {
            message: error.message,
            status: response.status,
            details: error.details,
        })
    }

    pub async fn request<R: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<R> {
        let request = self.build_request(path, &options)?;
        let method = request.method;
        let url = request.url.clone();
        debug!(%method, %url, "sending request");

        let result = match self.transport.execute(request).await {
            Ok(response) => self.parse_response(response),
            Err(err) => Err(err),
        };
        match &result {
            Err(err @ ApiError::Api { .. }) => {
                warn!(%method, %url, status = ?err.status(), error = %err, "request rejected");
            }
            Err(err) => debug!(%method, %url, error = %err, "request failed"),
            Ok(_) => {}
        }
        result
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str, params: Option<QueryParams>) -> Result<R> {
        let mut options = RequestOptions::new(HttpMethod::Get);
        options.params = params;
        self.request(path, options).await
    }

    pub async fn post<R, B>(&self, path: &str, body: &B) -> Result<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(path, RequestOptions::new(HttpMethod::Post).body(body)?).await
    }

    pub async fn put<R, B>(&self, path: &str, body: &B) -> Result<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(path, RequestOptions::new(HttpMethod::Put).body(body)?).await
    }

    pub async fn delete<R, B>(&self, path: &str, body: &B) -> Result<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(path, RequestOptions::new(HttpMethod::Delete).body(body)?).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    /// Replays queued responses and records every request it sees.
    #[derive(Default)]
    pub(crate) struct FakeTransport {
        responses: Mutex<Vec<Result<HttpResponse>>>,
        pub(crate) seen: Mutex<Vec<HttpRequest>>,
    }

    impl FakeTransport {
        pub(crate) fn replying(status: u16, body: &str) -> Self {
            let fake = Self::default();
            fake.push(Ok(HttpResponse::json(status, body)));
            fake
        }

        pub(crate) fn push(&self, response: Result<HttpResponse>) {
            self.responses.lock().unwrap().insert(0, response);
        }

        pub(crate) fn last(&self) -> HttpRequest {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.seen.lock().unwrap().push(request);
            self.responses.lock().unwrap().pop().expect("no response queued")
        }
    }

    fn client(fake: FakeTransport) -> ApiClient<FakeTransport> {
        ApiClient::with_transport("http://localhost:8000/", fake)
    }

    #[test]
    fn from_config_trims_base_url() {
        let c = ApiClient::from_config(&ClientConfig::new("http://bank.test/")).unwrap();
        assert_eq!(c.base_url(), "http://bank.test");
    }

    #[test]
    fn build_get_with_params() {
        let c = client(FakeTransport::default());
        let options = RequestOptions::new(HttpMethod::Get)
            .params(QueryParams::new().with("client_id", 42).with_opt::<&str>("end_date", None));
        let req = c.build_request("/api/accounts", &options).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:8000/api/accounts?client_id=42");
        assert!(req.body.is_none());
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn build_without_leading_slash_or_with_absolute_url() {
        let c = client(FakeTransport::default());
        let options = RequestOptions::default();
        assert_eq!(
            c.build_request("api/auth/me", &options).unwrap().url,
            "http://localhost:8000/api/auth/me"
        );
        assert_eq!(
            c.build_request("https://other.host/x", &options).unwrap().url,
            "https://other.host/x"
        );
    }

    #[test]
    fn null_body_is_omitted() {
        let options = RequestOptions::new(HttpMethod::Delete).body(&()).unwrap();
        assert!(options.body.is_none());
        let options = RequestOptions::new(HttpMethod::Post).body(&json!({"amount": 5})).unwrap();
        assert_eq!(options.body, Some(json!({"amount": 5})));
    }

    #[test]
    fn parse_success_returns_data_unchanged() {
        let c = client(FakeTransport::default());
        let data: Value = c
            .parse_response(HttpResponse::json(200, r#"{"success":true,"data":{"a":[1,{"b":null}]}}"#))
            .unwrap();
        assert_eq!(data, json!({"a": [1, {"b": null}]}));
    }

    #[test]
    fn parse_failure_carries_status_and_details() {
        let c = client(FakeTransport::default());
        let err = c
            .parse_response::<Value>(HttpResponse::json(
                422,
                r#"{"success":false,"error":{"message":"Bad input","details":{"field":"amount"}}}"#,
            ))
            .unwrap_err();
        assert_eq!(err.message(), "Bad input");
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.details(), Some(&json!({"field": "amount"})));
    }

    #[test]
    fn failure_envelope_wins_over_2xx_status() {
        let c = client(FakeTransport::default());
        let err = c
            .parse_response::<Value>(HttpResponse::json(200, r#"{"success":false,"error":{"message":"nope"}}"#))
            .unwrap_err();
        assert_eq!(err.status(), Some(200));
        assert!(err.details().is_none());
    }

    #[test]
    fn success_envelope_wins_over_error_status() {
        let c = client(FakeTransport::default());
        let n: u32 = c
            .parse_response(HttpResponse::json(500, r#"{"success":true,"data":7}"#))
            .unwrap();
        assert_eq!(n, 7);
    }

    #[test]
    fn non_json_body_is_a_transport_error() {
        let c = client(FakeTransport::default());
        let err = c
            .parse_response::<Value>(HttpResponse::json(502, "<html>Bad Gateway</html>"))
            .unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn get_sends_query_and_returns_data() {
        let fake = FakeTransport::replying(200, r#"{"success":true,"data":[{"accountId":"a1"}]}"#);
        let c = client(fake);
        let data: Value = c
            .get("/accounts", Some(QueryParams::new().with("client_id", 42)))
            .await
            .unwrap();
        assert_eq!(data, json!([{"accountId": "a1"}]));
        let sent = c.transport().last();
        assert_eq!(sent.url, "http://localhost:8000/accounts?client_id=42");
    }

    #[tokio::test]
    async fn post_rejection_surfaces_server_message() {
        let fake = FakeTransport::replying(400, r#"{"success":false,"error":{"message":"Invalid amount"}}"#);
        let c = client(fake);
        let err = c
            .post::<Value, _>("/payments/transfer", &json!({"amount": -5}))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Invalid amount");
        assert_eq!(err.status(), Some(400));

        let sent = c.transport().last();
        assert_eq!(sent.method, HttpMethod::Post);
        let body: Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"amount": -5}));
    }

    #[tokio::test]
    async fn put_and_delete_fix_their_methods() {
        let fake = FakeTransport::default();
        fake.push(Ok(HttpResponse::json(200, r#"{"success":true,"data":null}"#)));
        fake.push(Ok(HttpResponse::json(200, r#"{"success":true,"data":null}"#)));
        let c = client(fake);

        c.put::<(), _>("/api/accounts/1/rename", &json!({"accountName": "Main"}))
            .await
            .unwrap();
        assert_eq!(c.transport().last().method, HttpMethod::Put);

        c.delete::<(), _>("/api/groups", &()).await.unwrap();
        let sent = c.transport().last();
        assert_eq!(sent.method, HttpMethod::Delete);
        assert!(sent.body.is_none());
    }

    #[tokio::test]
    async fn transport_failure_is_propagated_unchanged() {
        let fake = FakeTransport::default();
        fake.push(Err(ApiError::Transport {
            message: "connection refused".to_string(),
            cause: None,
        }));
        let c = client(fake);
        let err = c.get::<Value>("/api/auth/me", None).await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.message(), "connection refused");
    }
}
