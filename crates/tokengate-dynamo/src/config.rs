//! Connection settings for the DynamoDB token store.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Static AWS credentials used to sign requests.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamoConfig {
    /// Endpoint override, e.g. a local emulator. Defaults to the regional AWS endpoint.
    #[serde(default)]
    pub endpoint: Option<Url>,

    /// Signing region.
    #[serde(default = "default_region")]
    pub region: String,

    /// Name of the hash-key attribute holding the token.
    #[serde(default = "default_key_attribute")]
    pub key_attribute: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Transport retries for throttling and transient failures.
    #[serde(default)]
    pub max_retries: u32,

    #[serde(default)]
    pub credentials: Option<Credentials>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_key_attribute() -> String {
    "token".to_string()
}

fn default_timeout() -> u64 {
    5
}

impl Default for DynamoConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: default_region(),
            key_attribute: default_key_attribute(),
            timeout_secs: default_timeout(),
            max_retries: 0,
            credentials: None,
        }
    }
}

impl DynamoConfig {
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_key_attribute(mut self, name: impl Into<String>) -> Self {
        self.key_attribute = name.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// The endpoint requests go to.
    pub fn resolved_endpoint(&self) -> Result<Url, url::ParseError> {
        match &self.endpoint {
            Some(url) => Ok(url.clone()),
            None => Url::parse(&format!("https://dynamodb.{}.amazonaws.com/", self.region)),
        }
    }
}
