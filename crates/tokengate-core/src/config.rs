//! Authorizer configuration.
//!
//! Everything the engine needs is passed in explicitly; nothing here reads
//! process environment.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::enrich::{Chain, Enricher, RecordClaims, StaticClaims};
use crate::error::ConfigError;
use crate::store::ReadConsistency;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizerConfig {
    /// Table (or collection) holding token records.
    #[serde(default = "default_table")]
    pub table: String,

    /// Read consistency for lookups.
    #[serde(default)]
    pub consistency: ReadConsistency,

    /// Upper bound for a single store lookup, in milliseconds.
    #[serde(default)]
    pub lookup_timeout_ms: Option<u64>,

    /// Claims added to every Allow context.
    #[serde(default)]
    pub static_claims: BTreeMap<String, String>,

    /// Record attributes copied into the Allow context.
    #[serde(default)]
    pub record_claims: Vec<String>,
}

fn default_table() -> String {
    "AllowedTokens".to_string()
}

impl Default for AuthorizerConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            consistency: ReadConsistency::default(),
            lookup_timeout_ms: None,
            static_claims: BTreeMap::new(),
            record_claims: Vec::new(),
        }
    }
}

impl AuthorizerConfig {
    /// Parse from YAML. Missing fields take their defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_consistency(mut self, consistency: ReadConsistency) -> Self {
        self.consistency = consistency;
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn with_static_claim(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.static_claims.insert(key.into(), value.into());
        self
    }

    pub fn with_record_claim(mut self, attribute: impl Into<String>) -> Self {
        self.record_claims.push(attribute.into());
        self
    }

    pub fn lookup_timeout(&self) -> Option<Duration> {
        self.lookup_timeout_ms.map(Duration::from_millis)
    }

    /// The enricher described by this config, if any claims are configured.
    ///
    /// Record attributes are applied after static claims.
    pub fn enricher(&self) -> Option<Box<dyn Enricher>> {
        let mut chain = Chain::new();
        if !self.static_claims.is_empty() {
            chain = chain.then(StaticClaims::new(self.static_claims.clone()));
        }
        if !self.record_claims.is_empty() {
            chain = chain.then(RecordClaims::new(self.record_claims.iter().cloned()));
        }

        if chain.is_empty() {
            None
        } else {
            Some(Box::new(chain))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TokenRecord;

    #[test]
    fn test_defaults() {
        let cfg = AuthorizerConfig::default();
        assert_eq!(cfg.table, "AllowedTokens");
        assert_eq!(cfg.consistency, ReadConsistency::Strong);
        assert_eq!(cfg.lookup_timeout(), None);
        assert!(cfg.enricher().is_none());
    }

    #[test]
    fn test_from_yaml_partial() {
        let cfg = AuthorizerConfig::from_yaml_str(
            r#"
table: AllowedTokens_Test
consistency: eventual
lookup_timeout_ms: 250
static_claims:
  scope: "read:stores"
"#,
        )
        .unwrap();

        assert_eq!(cfg.table, "AllowedTokens_Test");
        assert_eq!(cfg.consistency, ReadConsistency::Eventual);
        assert_eq!(cfg.lookup_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(cfg.static_claims["scope"], "read:stores");
        assert!(cfg.record_claims.is_empty());
    }

    #[test]
    fn test_from_yaml_rejects_bad_consistency() {
        let err = AuthorizerConfig::from_yaml_str("consistency: sometimes").unwrap_err();
        assert!(err.to_string().contains("failed to parse authorizer config"));
    }

    #[test]
    fn test_enricher_from_config() {
        let cfg = AuthorizerConfig::default()
            .with_static_claim("tenant", "default")
            .with_record_claim("tenant");
        let enricher = cfg.enricher().unwrap();

        let record = TokenRecord::with_active(true).with_attribute("tenant", "acme");
        assert_eq!(enricher.claims(&record)["tenant"], "acme");
    }
}
