//! HTTP client for a DynamoDB-compatible token table.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use tokengate_core::{
    LookupRequest, StoreError, StoreResult, TokenRecord, TokenStore, TokenWriter,
};
use tracing::{debug, warn};
use url::Url;

use crate::config::{Credentials, DynamoConfig};
use crate::sigv4::{self, CanonicalInput};
use crate::wire;

const CONTENT_TYPE_VALUE: &str = "application/x-amz-json-1.0";
const SERVICE: &str = "dynamodb";
const USER_AGENT_VALUE: &str = concat!("tokengate-dynamo/", env!("CARGO_PKG_VERSION"));

/// Token store backed by a DynamoDB table (or a local emulator).
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct DynamoTokenStore {
    client: reqwest::Client,
    endpoint: Url,
    host: String,
    region: String,
    key_attribute: String,
    credentials: Credentials,
    timeout: Duration,
    max_retries: u32,
}

impl DynamoTokenStore {
    pub fn new(config: DynamoConfig) -> StoreResult<Self> {
        let endpoint = config
            .resolved_endpoint()
            .map_err(|e| StoreError::Config {
                message: format!("invalid endpoint: {}", e),
            })?;

        let host = match (endpoint.host_str(), endpoint.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(StoreError::Config {
                    message: "endpoint has no host".to_string(),
                })
            }
        };

        let credentials = config.credentials.ok_or_else(|| StoreError::Config {
            message: "no credentials configured".to_string(),
        })?;

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT_VALUE)
            .build()
            .map_err(|e| StoreError::Config {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint,
            host,
            region: config.region,
            key_attribute: config.key_attribute,
            credentials,
            timeout,
            max_retries: config.max_retries,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn key_attribute(&self) -> &str {
        &self.key_attribute
    }

    /// Issue an API call, retrying transient failures up to `max_retries` times.
    async fn call(&self, target: &'static str, body: &Value) -> StoreResult<Vec<u8>> {
        let payload = serde_json::to_vec(body).map_err(|e| StoreError::Config {
            message: format!("failed to encode request: {}", e),
        })?;

        let mut retries = 0;
        loop {
            match self.call_once(target, &payload).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) if e.is_retryable() && retries < self.max_retries => {
                    retries += 1;
                    let backoff = backoff(retries);
                    warn!(
                        target_op = target,
                        error_kind = e.kind(),
                        retry = retries,
                        max_retries = self.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "retrying store request"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn call_once(&self, target: &'static str, payload: &[u8]) -> StoreResult<Vec<u8>> {
        let now = chrono::Utc::now();
        let amz_date = sigv4::amz_date(now);

        let mut headers = vec![
            ("content-type", CONTENT_TYPE_VALUE),
            ("host", self.host.as_str()),
            ("x-amz-date", amz_date.as_str()),
            ("x-amz-target", target),
        ];
        if let Some(token) = &self.credentials.session_token {
            headers.push(("x-amz-security-token", token.as_str()));
        }

        let signature = sigv4::sign(
            &CanonicalInput {
                method: "POST",
                path: self.endpoint.path(),
                query: "",
                headers: &headers,
                payload,
            },
            &self.credentials,
            &self.region,
            SERVICE,
            now,
        );

        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_VALUE))
            .header("x-amz-target", target)
            .header("x-amz-date", signature.amz_date.as_str())
            .header(reqwest::header::AUTHORIZATION, signature.authorization.as_str());
        if let Some(token) = &signature.security_token {
            request = request.header("x-amz-security-token", token.as_str());
        }

        let response = request
            .body(payload.to_vec())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        if status.is_success() {
            debug!(target_op = target, status = status.as_u16(), "store request ok");
            Ok(bytes.to_vec())
        } else {
            Err(wire::decode_error(status.as_u16(), &bytes))
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout {
                elapsed: self.timeout,
            }
        } else {
            StoreError::Transport {
                message: err.without_url().to_string(),
            }
        }
    }
}

/// Exponential backoff starting at 50ms, capped at 2s, with up to 50% jitter.
fn backoff(retry: u32) -> Duration {
    let base = (50u64 << retry.min(6)).min(2_000);
    let jitter = rand::thread_rng().gen_range(0..=base / 2);
    Duration::from_millis(base + jitter)
}

#[async_trait]
impl TokenStore for DynamoTokenStore {
    async fn lookup(&self, request: &LookupRequest<'_>) -> StoreResult<Option<TokenRecord>> {
        let body = wire::get_item(
            request.table,
            &self.key_attribute,
            request.token.as_str(),
            request.consistency.is_strong(),
        );
        let bytes = self.call(wire::TARGET_GET_ITEM, &body).await?;
        wire::decode_get_item(&bytes, &self.key_attribute)
    }
}

#[async_trait]
impl TokenWriter for DynamoTokenStore {
    async fn put_record(&self, table: &str, token: &str, record: &TokenRecord) -> StoreResult<()> {
        let body = wire::put_item(table, &self.key_attribute, token, record);
        self.call(wire::TARGET_PUT_ITEM, &body).await?;
        Ok(())
    }

    async fn delete_record(&self, table: &str, token: &str) -> StoreResult<()> {
        let body = wire::delete_item(table, &self.key_attribute, token);
        self.call(wire::TARGET_DELETE_ITEM, &body).await?;
        Ok(())
    }
}
