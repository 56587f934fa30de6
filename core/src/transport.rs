//! Network execution of `HttpRequest` values.
//!
//! `Transport` is the only I/O seam. `ReqwestTransport` keeps a cookie store
//! so a `session-id` set by the server is sent back on every later request.
//! HTTP error statuses are returned as data; interpreting them is the
//! client's job.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::Method;
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one round-trip. Fails only when no response was received.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    jar: Arc<Jar>,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Self::with_jar(Arc::new(Jar::default()))
    }

    /// Share a cookie jar, e.g. to seed a session cookie or to let two
    /// clients act as the same user.
    pub fn with_jar(jar: Arc<Jar>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(ApiError::transport)?;
        Ok(Self { client, jar })
    }

    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.jar
    }
}

impl From<HttpMethod> for Method {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.request(request.method.into(), &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(ApiError::transport)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response.text().await.map_err(ApiError::transport)?;
        debug!(status, bytes = body.len(), "response received");

        Ok(HttpResponse { status, headers, body })
    }
}
