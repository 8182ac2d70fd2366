//! DynamoDB-compatible token store for `tokengate-core`.
//!
//! Speaks the DynamoDB JSON 1.0 protocol directly over HTTPS with
//! Signature Version 4, so the same client works against AWS and against
//! local emulators such as LocalStack (set [`DynamoConfig::endpoint`]).
//!
//! Only point operations are issued: `GetItem` for lookups and
//! `PutItem`/`DeleteItem` for provisioning tooling. Table lifecycle is
//! outside this crate.
//!
//! ```no_run
//! use tokengate_core::{AuthorizationRequest, Authorizer, AuthorizerConfig};
//! use tokengate_dynamo::{Credentials, DynamoConfig, DynamoTokenStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = DynamoTokenStore::new(
//!     DynamoConfig::default()
//!         .with_endpoint("http://localhost:4566".parse()?)
//!         .with_credentials(Credentials::new("test", "test")),
//! )?;
//! let authorizer = Authorizer::new(AuthorizerConfig::default(), store);
//! let decision = authorizer
//!     .authorize(&AuthorizationRequest::new("Bearer abc123", "GET/resource"))
//!     .await?;
//! println!("{}", decision.effect);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
mod sigv4;
mod wire;

pub use client::DynamoTokenStore;
pub use config::{Credentials, DynamoConfig};
