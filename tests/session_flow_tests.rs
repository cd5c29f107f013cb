use std::sync::Arc;
use std::time::Duration;

use chatai::core::directory::{ConversationDirectory, DirectoryError, MutationState};
use chatai::core::history::{FileHistoryStore, MemoryHistoryStore};
use chatai::core::session::{SessionController, SessionOptions};
use chatai::core::transcript::{ANSWER_FAILURE_MESSAGE, EntryStatus};
use chatai::remote::{HttpAnsweringService, HttpConversationStore, SavedConversation};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

fn fast_options() -> SessionOptions {
    SessionOptions {
        typing_interval: Duration::from_millis(1),
        ..SessionOptions::default()
    }
}

async fn answer_server(response: ResponseTemplate) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/answer"))
        .respond_with(response)
        .mount(&mock_server)
        .await;
    mock_server
}

fn session_against(server: &MockServer, history: MemoryHistoryStore) -> SessionController {
    session_with_options(server, history, fast_options())
}

fn session_with_options(
    server: &MockServer,
    history: MemoryHistoryStore,
    options: SessionOptions,
) -> SessionController {
    SessionController::new(
        Arc::new(HttpAnsweringService::new(format!("{}/api/answer", server.uri()))),
        Box::new(history),
        options,
    )
}

fn directory_against(server: &MockServer) -> ConversationDirectory {
    let store = assert_ok!(HttpConversationStore::new(
        server.uri(),
        Some("sid=abc"),
        Duration::from_secs(5),
    ));
    ConversationDirectory::new(Arc::new(store), Some("u1".to_string()))
}

// ============================================================================
// Asking
// ============================================================================

#[tokio::test]
async fn test_question_answered_and_persisted() {
    let server =
        answer_server(ResponseTemplate::new(200).set_body_json(json!({ "text": "Hi there" })))
            .await;
    let history = MemoryHistoryStore::new();
    let mut session = session_against(&server, history.clone());

    assert!(session.submit("Hello"));
    assert!(session.is_busy());
    session.settle().await;

    let entry = &session.transcript().entries()[0];
    assert_eq!(entry.status(), EntryStatus::Complete);
    assert_eq!(entry.answer(), "Hi there");
    assert_eq!(
        history.raw().as_deref(),
        Some(r#"[{"question":"Hello","answer":"Hi there"}]"#)
    );
}

#[tokio::test]
async fn test_server_error_fails_exchange() {
    let server = answer_server(ResponseTemplate::new(500)).await;
    let history = MemoryHistoryStore::new();
    let mut session = session_against(&server, history.clone());

    session.submit("Hello");
    session.settle().await;

    let entry = &session.transcript().entries()[0];
    assert_eq!(entry.status(), EntryStatus::Failed);
    assert_eq!(entry.answer(), ANSWER_FAILURE_MESSAGE);
    assert!(!session.is_busy());

    // The session accepts the next question
    assert!(session.submit("Again"));
}

#[tokio::test]
async fn test_slow_answer_times_out() {
    let server = answer_server(
        ResponseTemplate::new(200)
            .set_body_json(json!({ "text": "too late" }))
            .set_delay(Duration::from_secs(5)),
    )
    .await;
    let options = SessionOptions {
        answer_timeout: Duration::from_millis(100),
        ..fast_options()
    };
    let mut session = session_with_options(&server, MemoryHistoryStore::new(), options);

    session.submit("Hello");
    session.settle().await;
    assert_eq!(
        session.transcript().entries()[0].status(),
        EntryStatus::Failed
    );
}

#[tokio::test]
async fn test_history_survives_restart() {
    let server =
        answer_server(ResponseTemplate::new(200).set_body_json(json!({ "text": "Hi there" })))
            .await;
    let dir = tempfile::tempdir().unwrap();

    {
        let store = FileHistoryStore::new(dir.path()).unwrap();
        let mut session = SessionController::new(
            Arc::new(HttpAnsweringService::new(format!("{}/api/answer", server.uri()))),
            Box::new(store),
            fast_options(),
        );
        session.submit("Hello");
        session.settle().await;
    }

    let store = FileHistoryStore::new(dir.path()).unwrap();
    let restored = SessionController::new(
        Arc::new(HttpAnsweringService::new(format!("{}/api/answer", server.uri()))),
        Box::new(store),
        fast_options(),
    );
    let entries = restored.transcript().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].question(), "Hello");
    assert_eq!(entries[0].answer(), "Hi there");
    assert_eq!(entries[0].status(), EntryStatus::Complete);
}

// ============================================================================
// Saved conversations
// ============================================================================

#[tokio::test]
async fn test_select_saved_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "7", "question": "Saved question", "answer": "Saved answer" }
        ])))
        .mount(&server)
        .await;

    let history = MemoryHistoryStore::new();
    let mut session = session_against(&server, history.clone());
    let mut directory = directory_against(&server);

    let conversations = assert_ok!(directory.list().await).to_vec();
    directory.select(&conversations[0], &mut session);

    let entries = session.transcript().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status(), EntryStatus::Complete);
    assert_eq!(entries[0].answer(), "Saved answer");
    assert_eq!(
        history.raw().as_deref(),
        Some(r#"[{"question":"Saved question","answer":"Saved answer"}]"#)
    );
}

#[tokio::test]
async fn test_failed_delete_keeps_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "42", "question": "Q", "answer": "A" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/conversation/42"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut session = session_against(&server, MemoryHistoryStore::new());
    let mut directory = directory_against(&server);
    assert_ok!(directory.list().await);

    assert_ok!(directory.request_delete("42"));
    let err = assert_err!(directory.confirm(&mut session).await);
    assert_eq!(
        err.alert().as_deref(),
        Some("Failed to delete conversation. Please try again.")
    );
    assert_eq!(directory.state(), &MutationState::Idle);
    assert_eq!(
        directory.conversations(),
        &[SavedConversation {
            id: "42".to_string(),
            question: "Q".to_string(),
            answer: "A".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_delete_all_resets_session() {
    let server =
        answer_server(ResponseTemplate::new(200).set_body_json(json!({ "text": "Hi there" })))
            .await;
    Mock::given(method("GET"))
        .and(path("/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "1", "question": "Q1", "answer": "A1" },
            { "_id": "2", "question": "Q2", "answer": "A2" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/conversations/all"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let history = MemoryHistoryStore::new();
    let mut session = session_against(&server, history.clone());
    let mut directory = directory_against(&server);
    session.submit("Hello");
    session.settle().await;
    assert_ok!(directory.list().await);

    assert_ok!(directory.request_delete_all());
    assert_ok!(directory.confirm(&mut session).await);

    assert!(directory.conversations().is_empty());
    assert!(session.transcript().is_empty());
    assert_eq!(history.raw(), None);
}

#[tokio::test]
async fn test_expired_session_requires_sign_in() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut directory = directory_against(&server);
    assert_eq!(
        assert_err!(directory.verify_session().await),
        DirectoryError::SignInRequired
    );
    assert_eq!(
        assert_err!(directory.list().await),
        DirectoryError::SignInRequired
    );
    // Profile lookup never fails outward
    assert_eq!(directory.refresh_user().await.name, "User");
}
