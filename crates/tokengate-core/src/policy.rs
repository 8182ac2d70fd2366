//! Authorization decision objects and their construction.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidPolicyInput;

/// Context key carrying the normalized token on Allow.
pub const CONTEXT_TOKEN: &str = "token";
/// Context key for the not-found diagnostic.
pub const CONTEXT_REASON: &str = "reason";
/// Context key for the store-failure diagnostic.
pub const CONTEXT_ERROR: &str = "error";

pub const REASON_TOKEN_NOT_FOUND: &str = "token_not_found";
pub const ERROR_LOOKUP_FAILED: &str = "lookup_failed";

pub const PRINCIPAL_ANONYMOUS: &str = "anonymous";
pub const PRINCIPAL_USER: &str = "user";

/// String-keyed context handed to downstream services.
pub type DecisionContext = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "Allow",
            Self::Deny => "Deny",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Effect {
    type Err = InvalidPolicyInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Allow" => Ok(Self::Allow),
            "Deny" => Ok(Self::Deny),
            other => Err(InvalidPolicyInput::UnsupportedEffect {
                value: other.to_string(),
            }),
        }
    }
}

/// The outcome of one authorization request. Built fresh per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub principal: String,
    pub effect: Effect,
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<DecisionContext>,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        self.effect == Effect::Allow
    }

    /// Look up a single context entry.
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|ctx| ctx.get(key))
            .map(String::as_str)
    }
}

/// Assemble a decision.
///
/// The resource identifier comes from the caller and must be present; an
/// empty one is rejected rather than turned into an Allow or a Deny.
pub fn build(
    principal: impl Into<String>,
    effect: Effect,
    resource: impl Into<String>,
    context: Option<DecisionContext>,
) -> Result<Decision, InvalidPolicyInput> {
    let resource = resource.into();
    validate_resource(&resource)?;

    Ok(Decision {
        principal: principal.into(),
        effect,
        resource,
        context,
    })
}

/// Like [`build`], for callers holding the effect as a string.
pub fn build_from_str(
    principal: impl Into<String>,
    effect: &str,
    resource: impl Into<String>,
    context: Option<DecisionContext>,
) -> Result<Decision, InvalidPolicyInput> {
    let effect = effect.parse::<Effect>()?;
    build(principal, effect, resource, context)
}

pub(crate) fn validate_resource(resource: &str) -> Result<(), InvalidPolicyInput> {
    if resource.trim().is_empty() {
        return Err(InvalidPolicyInput::EmptyResource);
    }
    Ok(())
}

/// Single-entry context helper.
pub(crate) fn single(key: &str, value: &str) -> DecisionContext {
    let mut ctx = DecisionContext::new();
    ctx.insert(key.to_string(), value.to_string());
    ctx
}
