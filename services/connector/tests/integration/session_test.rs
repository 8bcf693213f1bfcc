use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::Utc;

use tessera_connector::domain::ports::{RemoteAccountConnector, SignInOutcome};
use tessera_connector::domain::types::{SESSION_TTL_SECS, SessionState};
use tessera_connector::error::ConnectorError;
use tessera_connector::session::PendingSessionStore;
use tessera_connector::usecase::request_code::{RequestCodeInput, RequestCodeUseCase};
use tessera_connector::usecase::verify_code::{
    VerifyCodeInput, VerifyCodeOutput, VerifyCodeUseCase,
};
use tessera_connector::usecase::verify_password::{VerifyPasswordInput, VerifyPasswordUseCase};
use tessera_domain::id::SessionId;

use crate::helpers::{
    MemorySink, MockClient, MockConnector, TEST_ACCOUNT_ID, test_identity, test_registry,
};

fn request_code_usecase(
    connector: Arc<dyn RemoteAccountConnector>,
    sessions: Arc<PendingSessionStore>,
) -> RequestCodeUseCase {
    RequestCodeUseCase {
        connector,
        sessions,
    }
}

struct VerifyHarness {
    sessions: Arc<PendingSessionStore>,
    sink: Arc<MemorySink>,
    registry: Arc<tessera_connector::discovery::registry::DiscoveryRegistry>,
}

impl VerifyHarness {
    fn new() -> Self {
        Self {
            sessions: Arc::new(PendingSessionStore::new()),
            sink: Arc::new(MemorySink::new()),
            registry: test_registry(Duration::from_millis(200), Duration::from_millis(50)),
        }
    }

    fn verify_code(&self) -> VerifyCodeUseCase {
        VerifyCodeUseCase {
            sessions: self.sessions.clone(),
            sink: self.sink.clone(),
            discovery: self.registry.clone(),
        }
    }

    fn verify_password(&self) -> VerifyPasswordUseCase {
        VerifyPasswordUseCase {
            sessions: self.sessions.clone(),
            sink: self.sink.clone(),
            discovery: self.registry.clone(),
        }
    }

    /// Run the happy request-code step with `client` and return the new id.
    async fn start_session(&self, client: MockClient) -> SessionId {
        let connector = Arc::new(MockConnector::with_client(client));
        let uc = request_code_usecase(connector, self.sessions.clone());
        uc.execute(RequestCodeInput {
            phone: "+15551234567".to_owned(),
        })
        .await
        .expect("request_code failed")
        .session_id
    }
}

// ── RequestCode ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_pending_session_on_request_code() {
    let sessions = Arc::new(PendingSessionStore::new());
    let connector = Arc::new(MockConnector::with_client(MockClient::new()));
    let uc = request_code_usecase(connector, sessions.clone());

    let out = uc
        .execute(RequestCodeInput {
            phone: "+15551234567".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(sessions.len(), 1);
    let claimed = sessions.claim(&out.session_id).expect("session missing");
    assert_eq!(claimed.state, SessionState::AwaitingCode);
    assert_eq!(claimed.phone, "+15551234567");
    assert_eq!(claimed.challenge.0, "challenge-1");
}

#[tokio::test]
async fn should_reject_blank_phone_without_connecting() {
    let sessions = Arc::new(PendingSessionStore::new());
    // Empty connector: any connect attempt would fail the test via Internal.
    let connector = Arc::new(MockConnector::default());
    let uc = request_code_usecase(connector, sessions.clone());

    let result = uc
        .execute(RequestCodeInput {
            phone: "   ".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(ConnectorError::InvalidPhoneNumber)),
        "expected InvalidPhoneNumber, got {result:?}"
    );
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn should_disconnect_client_when_code_request_rejected() {
    let client = MockClient::new().failing_request_code(ConnectorError::InvalidPhoneNumber);
    let disconnects = client.disconnect_counter();
    let sessions = Arc::new(PendingSessionStore::new());
    let uc = request_code_usecase(
        Arc::new(MockConnector::with_client(client)),
        sessions.clone(),
    );

    let result = uc
        .execute(RequestCodeInput {
            phone: "not-a-phone".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(ConnectorError::InvalidPhoneNumber)));
    assert_eq!(disconnects.load(Ordering::SeqCst), 1, "client leaked");
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn should_surface_remote_unavailable_from_connect() {
    let sessions = Arc::new(PendingSessionStore::new());
    let connector = Arc::new(MockConnector::failing(ConnectorError::RemoteUnavailable(
        anyhow::anyhow!("connection refused"),
    )));
    let uc = request_code_usecase(connector, sessions.clone());

    let result = uc
        .execute(RequestCodeInput {
            phone: "+15551234567".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(ConnectorError::RemoteUnavailable(_))));
    assert!(sessions.is_empty());
}

// ── VerifyCode ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_keep_session_alive_when_code_rejected() {
    let harness = VerifyHarness::new();
    let client = MockClient::new().with_sign_in_outcome(Err(ConnectorError::InvalidCode));
    let session_id = harness.start_session(client).await;

    let result = harness
        .verify_code()
        .execute(VerifyCodeInput {
            session_id,
            code: "00000".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(ConnectorError::InvalidCode)),
        "expected InvalidCode, got {result:?}"
    );
    // The attempt survives in AWAITING_CODE for a retry.
    let session = harness.sessions.claim(&session_id).expect("session dropped");
    assert_eq!(session.state, SessionState::AwaitingCode);
}

#[tokio::test]
async fn should_authenticate_and_start_discovery_on_code_success() {
    let harness = VerifyHarness::new();
    let client =
        MockClient::new().with_sign_in_outcome(Ok(SignInOutcome::Authenticated(test_identity())));
    let session_id = harness.start_session(client).await;
    let records = harness.sink.records_handle();

    let before = Utc::now();
    let out = harness
        .verify_code()
        .execute(VerifyCodeInput {
            session_id,
            code: "12345".to_owned(),
        })
        .await
        .unwrap();

    let VerifyCodeOutput::Authenticated { identity } = out else {
        panic!("expected Authenticated, got {out:?}");
    };
    assert_eq!(identity, test_identity());

    // Credential exported before the hand-off, entry released.
    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].credential.0, "exported-credential");
    assert!(harness.sessions.is_empty());

    // A discovery job exists and started roughly now.
    let record = harness
        .registry
        .status(TEST_ACCOUNT_ID)
        .expect("no discovery job");
    assert!(record.search_started_at >= before);
    assert!(record.search_started_at <= Utc::now());
}

#[tokio::test]
async fn should_request_password_and_complete_second_step() {
    let harness = VerifyHarness::new();
    let client = MockClient::new()
        .with_sign_in_outcome(Ok(SignInOutcome::PasswordRequired))
        .with_password_outcome(Ok(test_identity()));
    let session_id = harness.start_session(client).await;

    let out = harness
        .verify_code()
        .execute(VerifyCodeInput {
            session_id,
            code: "12345".to_owned(),
        })
        .await
        .unwrap();
    assert!(
        matches!(out, VerifyCodeOutput::PasswordRequired { session_id: id } if id == session_id)
    );
    assert_eq!(harness.sessions.len(), 1, "session must stay parked for 2FA");

    let out = harness
        .verify_password()
        .execute(VerifyPasswordInput {
            session_id,
            password: "correct-pw".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(out.identity, test_identity());
    assert!(harness.sessions.is_empty());
    assert_eq!(harness.sink.records_handle().lock().unwrap().len(), 1);
    assert!(harness.registry.status(TEST_ACCOUNT_ID).is_some());
}

#[tokio::test]
async fn should_drop_session_when_code_expired() {
    let harness = VerifyHarness::new();
    let client = MockClient::new().with_sign_in_outcome(Err(ConnectorError::CodeExpired));
    let disconnects = client.disconnect_counter();
    let session_id = harness.start_session(client).await;

    let result = harness
        .verify_code()
        .execute(VerifyCodeInput {
            session_id,
            code: "12345".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(ConnectorError::CodeExpired)));
    assert_eq!(disconnects.load(Ordering::SeqCst), 1);
    assert!(harness.sessions.is_empty(), "no retry after an expired code");
}

#[tokio::test]
async fn should_surface_rate_limit_and_drop_session() {
    let harness = VerifyHarness::new();
    let client = MockClient::new().with_sign_in_outcome(Err(ConnectorError::RateLimited(42)));
    let disconnects = client.disconnect_counter();
    let session_id = harness.start_session(client).await;

    let result = harness
        .verify_code()
        .execute(VerifyCodeInput {
            session_id,
            code: "12345".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(ConnectorError::RateLimited(42))),
        "expected RateLimited(42), got {result:?}"
    );
    assert_eq!(disconnects.load(Ordering::SeqCst), 1);
    assert!(harness.sessions.is_empty());
}

#[tokio::test]
async fn should_not_find_unknown_session() {
    let harness = VerifyHarness::new();
    let result = harness
        .verify_code()
        .execute(VerifyCodeInput {
            session_id: SessionId::generate(),
            code: "12345".to_owned(),
        })
        .await;
    assert!(matches!(result, Err(ConnectorError::SessionNotFound)));
}

// ── Expiry ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_purge_expired_session_and_release_client() {
    let harness = VerifyHarness::new();
    let client = MockClient::new();
    let disconnects = client.disconnect_counter();
    let session_id = harness.start_session(client).await;

    // Age the entry past the TTL.
    let mut session = harness.sessions.claim(&session_id).unwrap();
    session.created_at = Utc::now() - chrono::Duration::seconds(SESSION_TTL_SECS + 10);
    harness.sessions.restore(session);

    let result = harness
        .verify_code()
        .execute(VerifyCodeInput {
            session_id,
            code: "12345".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(ConnectorError::SessionNotFound)),
        "expired session must be unreachable, got {result:?}"
    );
    assert_eq!(
        disconnects.load(Ordering::SeqCst),
        1,
        "expired session leaked its client"
    );
    assert!(harness.sessions.is_empty());
}

// ── VerifyPassword ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_password_when_session_never_asked_for_one() {
    let harness = VerifyHarness::new();
    let client = MockClient::new();
    let session_id = harness.start_session(client).await;

    let result = harness
        .verify_password()
        .execute(VerifyPasswordInput {
            session_id,
            password: "hunter2".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(ConnectorError::SessionNotFound)),
        "password on AWAITING_CODE must be rejected, got {result:?}"
    );
    // The attempt is untouched: the code step is still available.
    let session = harness.sessions.claim(&session_id).expect("session dropped");
    assert_eq!(session.state, SessionState::AwaitingCode);
}

#[tokio::test]
async fn should_drop_session_on_wrong_password() {
    let harness = VerifyHarness::new();
    let client = MockClient::new()
        .with_sign_in_outcome(Ok(SignInOutcome::PasswordRequired))
        .with_password_outcome(Err(ConnectorError::InvalidPassword));
    let disconnects = client.disconnect_counter();
    let session_id = harness.start_session(client).await;

    harness
        .verify_code()
        .execute(VerifyCodeInput {
            session_id,
            code: "12345".to_owned(),
        })
        .await
        .unwrap();

    let result = harness
        .verify_password()
        .execute(VerifyPasswordInput {
            session_id,
            password: "wrong".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(ConnectorError::InvalidPassword)));
    assert_eq!(disconnects.load(Ordering::SeqCst), 1);
    assert!(
        harness.sessions.is_empty(),
        "no retry slot after a failed password"
    );
}

// ── Export failures ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_not_start_discovery_when_export_fails() {
    let harness = VerifyHarness::new();
    let client = MockClient::new()
        .with_sign_in_outcome(Ok(SignInOutcome::Authenticated(test_identity())))
        .failing_export(ConnectorError::RemoteUnavailable(anyhow::anyhow!(
            "connection lost"
        )));
    let disconnects = client.disconnect_counter();
    let session_id = harness.start_session(client).await;

    let result = harness
        .verify_code()
        .execute(VerifyCodeInput {
            session_id,
            code: "12345".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(ConnectorError::RemoteUnavailable(_))));
    assert_eq!(disconnects.load(Ordering::SeqCst), 1);
    assert!(harness.registry.status(TEST_ACCOUNT_ID).is_none());
    assert!(harness.sink.records_handle().lock().unwrap().is_empty());
}
