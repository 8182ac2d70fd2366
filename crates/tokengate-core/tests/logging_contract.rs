//! Credential material must never reach log output, on any decision path.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokengate_core::{
    AuthorizationRequest, Authorizer, AuthorizerConfig, LookupRequest, MemoryTokenStore,
    StoreError, StoreResult, TokenRecord, TokenStore, TokenWriter,
};
use tracing_subscriber::fmt::MakeWriter;

const RESOURCE: &str = "GET/resource";

#[derive(Clone)]
struct MockWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl std::io::Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for MockWriter {
    type Writer = MockWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn setup_capture() -> (MockWriter, tracing::subscriber::DefaultGuard) {
    let writer = MockWriter {
        buf: Arc::new(Mutex::new(Vec::new())),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_max_level(tracing::Level::TRACE)
        .json()
        .finish();

    (writer, tracing::subscriber::set_default(subscriber))
}

fn captured(writer: &MockWriter) -> String {
    String::from_utf8(writer.buf.lock().unwrap().clone()).unwrap()
}

struct FailingStore;

#[async_trait]
impl TokenStore for FailingStore {
    async fn lookup(&self, _request: &LookupRequest<'_>) -> StoreResult<Option<TokenRecord>> {
        Err(StoreError::Service {
            status: 500,
            code: "InternalServerError".into(),
            message: "internal failure".into(),
        })
    }
}

#[tokio::test]
async fn test_no_token_in_logs_for_store_outcomes() {
    let (writer, _guard) = setup_capture();

    let active = format!("active-secret-{}", uuid::Uuid::new_v4());
    let inactive = format!("inactive-secret-{}", uuid::Uuid::new_v4());
    let missing = format!("missing-secret-{}", uuid::Uuid::new_v4());

    let store = MemoryTokenStore::new();
    store
        .put_record("AllowedTokens", &active, &TokenRecord::with_active(true))
        .await
        .unwrap();
    store
        .put_record("AllowedTokens", &inactive, &TokenRecord::with_active(false))
        .await
        .unwrap();
    let authorizer = Authorizer::new(AuthorizerConfig::default(), store);

    for token in [&active, &inactive, &missing] {
        authorizer
            .authorize(&AuthorizationRequest::new(format!("Bearer {}", token), RESOURCE))
            .await
            .unwrap();
    }

    let output = captured(&writer);
    assert!(
        output.contains("authorization decided"),
        "expected decision events in captured output"
    );
    for token in [&active, &inactive, &missing] {
        assert!(!output.contains(token.as_str()), "token leaked into logs");
    }
    assert!(output.contains("found_active"));
    assert!(output.contains("found_inactive"));
    assert!(output.contains("not_found"));
}

#[tokio::test]
async fn test_no_token_in_logs_for_store_failure() {
    let (writer, _guard) = setup_capture();

    let token = format!("failing-secret-{}", uuid::Uuid::new_v4());
    let authorizer = Authorizer::new(AuthorizerConfig::default(), FailingStore);
    let decision = authorizer
        .authorize(&AuthorizationRequest::new(format!("bearer {}", token), RESOURCE))
        .await
        .unwrap();
    assert_eq!(decision.context_value("error"), Some("lookup_failed"));

    let output = captured(&writer);
    assert!(output.contains("token lookup failed"));
    assert!(output.contains("\"error_kind\":\"service\""));
    assert!(!output.contains(&token), "token leaked into logs");
}
