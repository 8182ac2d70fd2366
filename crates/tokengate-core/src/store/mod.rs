//! Credential store interface.
//!
//! The decision engine only ever reads through [`TokenStore`]. Writing
//! records is the job of provisioning tooling, which goes through
//! [`TokenWriter`].

mod memory;

pub use memory::MemoryTokenStore;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::normalize::NormalizedToken;

/// Read consistency requested from the backing store.
///
/// Only affects freshness and latency of a lookup. Both levels yield the
/// same [`TokenRecord`] shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadConsistency {
    Eventual,
    #[default]
    Strong,
}

impl ReadConsistency {
    pub fn is_strong(self) -> bool {
        matches!(self, Self::Strong)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eventual => "eventual",
            Self::Strong => "strong",
        }
    }
}

/// A stored token entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Revocation flag. Absent is treated as active.
    #[serde(default)]
    pub active: Option<bool>,

    /// Additional string attributes held on the record.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl TokenRecord {
    /// A record with `active` explicitly set.
    pub fn with_active(active: bool) -> Self {
        Self {
            active: Some(active),
            attributes: BTreeMap::new(),
        }
    }

    /// A record without an `active` attribute.
    pub fn without_active() -> Self {
        Self::default()
    }

    /// Add a string attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// `true` unless `active` is explicitly `false`.
    pub fn is_active(&self) -> bool {
        self.active != Some(false)
    }
}

/// An exact-key point lookup.
#[derive(Debug, Clone)]
pub struct LookupRequest<'a> {
    pub table: &'a str,
    pub token: &'a NormalizedToken,
    pub consistency: ReadConsistency,
}

/// Read side of the backing store.
///
/// Implementations must be safe to share across concurrent requests and
/// must not keep request-scoped state. Failures are reported as errors; it
/// is up to the caller to decide what a failed lookup means.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Fetch the record stored under `request.token`, if any.
    async fn lookup(&self, request: &LookupRequest<'_>) -> StoreResult<Option<TokenRecord>>;
}

/// Write side of the backing store, used by setup and test tooling.
#[async_trait]
pub trait TokenWriter: Send + Sync {
    async fn put_record(&self, table: &str, token: &str, record: &TokenRecord) -> StoreResult<()>;

    async fn delete_record(&self, table: &str, token: &str) -> StoreResult<()>;
}

#[async_trait]
impl<T: TokenStore + ?Sized> TokenStore for std::sync::Arc<T> {
    async fn lookup(&self, request: &LookupRequest<'_>) -> StoreResult<Option<TokenRecord>> {
        (**self).lookup(request).await
    }
}

#[async_trait]
impl<T: TokenWriter + ?Sized> TokenWriter for std::sync::Arc<T> {
    async fn put_record(&self, table: &str, token: &str, record: &TokenRecord) -> StoreResult<()> {
        (**self).put_record(table, token, record).await
    }

    async fn delete_record(&self, table: &str, token: &str) -> StoreResult<()> {
        (**self).delete_record(table, token).await
    }
}
