//! Bearer-token authorization decisions.
//!
//! Given the credential presented on an inbound request and the identifier of
//! the operation being invoked, the [`Authorizer`] decides Allow or Deny and
//! produces a [`Decision`] that downstream services can trust.
//!
//! Tokens are opaque: they are looked up by exact key in a [`TokenStore`],
//! never verified cryptographically. Every store failure fails closed.
//!
//! # Quick Start
//!
//! ```
//! use tokengate_core::{
//!     AuthorizationRequest, Authorizer, AuthorizerConfig, Effect, MemoryTokenStore,
//!     TokenRecord, TokenWriter,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = MemoryTokenStore::new();
//! store
//!     .put_record("AllowedTokens", "abc123", &TokenRecord::with_active(true))
//!     .await?;
//!
//! let authorizer = Authorizer::new(AuthorizerConfig::default(), store);
//! let decision = authorizer
//!     .authorize(&AuthorizationRequest::new("Bearer abc123", "GET/resource"))
//!     .await?;
//!
//! assert_eq!(decision.effect, Effect::Allow);
//! assert_eq!(decision.context_value("token"), Some("abc123"));
//! # Ok(())
//! # }
//! ```
//!
//! # Decision table
//!
//! | State | Effect | Principal | Context |
//! |-------|--------|-----------|---------|
//! | empty token | Deny | `anonymous` | none |
//! | store error | Deny | `user` | `error: lookup_failed` |
//! | no record | Deny | `user` | `reason: token_not_found` |
//! | `active: false` | Deny | `user` | none |
//! | `active: true` or absent | Allow | `user` | `token` + enrichment |

pub mod config;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod normalize;
pub mod policy;
pub mod store;

pub use config::AuthorizerConfig;
pub use engine::{AuthorizationRequest, Authorizer, DecisionState, Evaluation};
pub use enrich::{Chain, Enricher, RecordClaims, StaticClaims};
pub use error::{ConfigError, InvalidPolicyInput, StoreError, StoreResult};
pub use normalize::{normalize, NormalizedToken};
pub use policy::{build, build_from_str, Decision, DecisionContext, Effect};
pub use store::{
    LookupRequest, MemoryTokenStore, ReadConsistency, TokenRecord, TokenStore, TokenWriter,
};
