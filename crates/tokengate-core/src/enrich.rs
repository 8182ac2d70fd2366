//! Claims attached to the context of an Allow decision.
//!
//! Enrichment runs only after an active record was found. It can add claims
//! but can never change the effect, and it cannot replace the `token` entry.

use std::collections::{BTreeMap, BTreeSet};

use crate::store::TokenRecord;

/// Produces extra context claims for an allowed token.
pub trait Enricher: Send + Sync {
    fn claims(&self, record: &TokenRecord) -> BTreeMap<String, String>;
}

/// Fixed claims taken from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticClaims {
    claims: BTreeMap<String, String>,
}

impl StaticClaims {
    pub fn new(claims: BTreeMap<String, String>) -> Self {
        Self { claims }
    }

    pub fn with_claim(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.claims.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

impl Enricher for StaticClaims {
    fn claims(&self, _record: &TokenRecord) -> BTreeMap<String, String> {
        self.claims.clone()
    }
}

/// Copies an allowlisted set of record attributes into the context.
#[derive(Debug, Clone, Default)]
pub struct RecordClaims {
    allowed: BTreeSet<String>,
}

impl RecordClaims {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

impl Enricher for RecordClaims {
    fn claims(&self, record: &TokenRecord) -> BTreeMap<String, String> {
        record
            .attributes
            .iter()
            .filter(|(name, _)| self.allowed.contains(name.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Runs enrichers in order; later ones win on key collisions.
#[derive(Default)]
pub struct Chain {
    links: Vec<Box<dyn Enricher>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, enricher: impl Enricher + 'static) -> Self {
        self.links.push(Box::new(enricher));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl Enricher for Chain {
    fn claims(&self, record: &TokenRecord) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        for link in &self.links {
            out.extend(link.claims(record));
        }
        out
    }
}
