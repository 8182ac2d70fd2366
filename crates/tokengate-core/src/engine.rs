//! The decision engine.
//!
//! One request flows through: normalize → lookup → state → decision.
//! Nothing is remembered between calls; the only shared resource is the
//! store handle, which the engine never mutates.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::AuthorizerConfig;
use crate::enrich::Enricher;
use crate::error::{InvalidPolicyInput, StoreError, StoreResult};
use crate::normalize::{normalize, NormalizedToken};
use crate::policy::{
    self, Decision, DecisionContext, Effect, CONTEXT_ERROR, CONTEXT_REASON, CONTEXT_TOKEN,
    ERROR_LOOKUP_FAILED, PRINCIPAL_ANONYMOUS, PRINCIPAL_USER, REASON_TOKEN_NOT_FOUND,
};
use crate::store::{LookupRequest, TokenRecord, TokenStore};

/// Inbound decision request, already extracted from the transport envelope.
#[derive(Clone)]
pub struct AuthorizationRequest {
    /// Credential exactly as presented, scheme prefix and all.
    pub raw_credential: String,
    /// Identifier of the protected operation (method + path, opaque here).
    pub resource: String,
}

impl AuthorizationRequest {
    pub fn new(raw_credential: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            raw_credential: raw_credential.into(),
            resource: resource.into(),
        }
    }
}

impl fmt::Debug for AuthorizationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationRequest")
            .field("raw_credential", &"<redacted>")
            .field("resource", &self.resource)
            .finish()
    }
}

/// Where a request ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionState {
    Empty,
    LookupError,
    NotFound,
    FoundInactive,
    FoundActive,
}

impl DecisionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::LookupError => "lookup_error",
            Self::NotFound => "not_found",
            Self::FoundInactive => "found_inactive",
            Self::FoundActive => "found_active",
        }
    }

    pub fn effect(self) -> Effect {
        match self {
            Self::FoundActive => Effect::Allow,
            _ => Effect::Deny,
        }
    }
}

impl fmt::Display for DecisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decision together with the state that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub state: DecisionState,
    pub decision: Decision,
}

/// Token authorizer parameterized by store handle, table, consistency and
/// optional enrichment.
pub struct Authorizer<S> {
    config: AuthorizerConfig,
    store: S,
    enricher: Option<Arc<dyn Enricher>>,
}

impl<S: Clone> Clone for Authorizer<S> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            store: self.store.clone(),
            enricher: self.enricher.clone(),
        }
    }
}

impl<S: TokenStore> Authorizer<S> {
    /// Create an authorizer. Enrichment is taken from the config's claim settings.
    pub fn new(config: AuthorizerConfig, store: S) -> Self {
        let enricher: Option<Arc<dyn Enricher>> = config.enricher().map(Arc::from);
        Self {
            config,
            store,
            enricher,
        }
    }

    /// Replace the enrichment collaborator.
    pub fn with_enricher(mut self, enricher: impl Enricher + 'static) -> Self {
        self.enricher = Some(Arc::new(enricher));
        self
    }

    /// Drop any enrichment; Allow contexts will carry only the token.
    pub fn without_enrichment(mut self) -> Self {
        self.enricher = None;
        self
    }

    pub fn config(&self) -> &AuthorizerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Decide a request.
    ///
    /// Only a malformed request (empty resource) returns an error. Every
    /// store outcome, failures included, becomes a decision.
    pub async fn authorize(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<Decision, InvalidPolicyInput> {
        Ok(self.evaluate(request).await?.decision)
    }

    /// Like [`Authorizer::authorize`], also reporting the state reached.
    pub async fn evaluate(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<Evaluation, InvalidPolicyInput> {
        // Malformed requests must not reach the store.
        policy::validate_resource(&request.resource)?;

        let token = normalize(&request.raw_credential);
        let (state, record) = if token.is_empty() {
            (DecisionState::Empty, None)
        } else {
            classify(self.lookup(&token).await)
        };

        let principal = match state {
            DecisionState::Empty => PRINCIPAL_ANONYMOUS,
            _ => PRINCIPAL_USER,
        };

        let context = match state {
            DecisionState::Empty | DecisionState::FoundInactive => None,
            DecisionState::LookupError => {
                Some(policy::single(CONTEXT_ERROR, ERROR_LOOKUP_FAILED))
            }
            DecisionState::NotFound => {
                Some(policy::single(CONTEXT_REASON, REASON_TOKEN_NOT_FOUND))
            }
            DecisionState::FoundActive => Some(self.allow_context(&token, record.as_ref())),
        };

        let decision = policy::build(
            principal,
            state.effect(),
            request.resource.as_str(),
            context,
        )?;

        debug!(
            state = state.as_str(),
            effect = decision.effect.as_str(),
            table = %self.config.table,
            "authorization decided"
        );

        Ok(Evaluation { state, decision })
    }

    async fn lookup(&self, token: &NormalizedToken) -> StoreResult<Option<TokenRecord>> {
        let request = LookupRequest {
            table: &self.config.table,
            token,
            consistency: self.config.consistency,
        };

        let result = match self.config.lookup_timeout() {
            Some(limit) => tokio::time::timeout(limit, self.store.lookup(&request))
                .await
                .unwrap_or(Err(StoreError::Timeout { elapsed: limit })),
            None => self.store.lookup(&request).await,
        };

        if let Err(e) = &result {
            warn!(
                error_kind = e.kind(),
                table = %self.config.table,
                consistency = self.config.consistency.as_str(),
                "token lookup failed, denying"
            );
        }

        result
    }

    fn allow_context(
        &self,
        token: &NormalizedToken,
        record: Option<&TokenRecord>,
    ) -> DecisionContext {
        let mut context = match (&self.enricher, record) {
            (Some(enricher), Some(record)) => enricher.claims(record),
            _ => DecisionContext::new(),
        };
        context.insert(CONTEXT_TOKEN.to_string(), token.as_str().to_string());
        context
    }
}

fn classify(result: StoreResult<Option<TokenRecord>>) -> (DecisionState, Option<TokenRecord>) {
    match result {
        Err(_) => (DecisionState::LookupError, None),
        Ok(None) => (DecisionState::NotFound, None),
        Ok(Some(record)) if !record.is_active() => (DecisionState::FoundInactive, None),
        Ok(Some(record)) => (DecisionState::FoundActive, Some(record)),
    }
}
