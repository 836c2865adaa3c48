// Gemini provider against a mock HTTP server
//
// Verifies the generateContent wire format (path, auth header, body) and how
// statuses and bodies map onto RemoteError kinds.

use anyhow::Result;
use mockito::Matcher;
use ramani::config::ProviderConfig;
use ramani::conversation::{ChatSession, Exchange, Transcript, Turn};
use ramani::errors::{ChatError, RemoteFailure};
use ramani::providers::{CompletionProvider, CompletionRequest, GeminiProvider};
use ramani::Persona;
use serde_json::json;
use std::sync::Arc;

const PATH: &str = "/models/gemini-pro:generateContent";

fn provider_for(server: &mockito::Server) -> GeminiProvider {
    let config = ProviderConfig::gemini("test-key")
        .with_model("gemini-pro")
        .with_base_url(server.url());
    GeminiProvider::from_config(&config).unwrap()
}

fn reply_body(text: &str) -> String {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

fn request(message: &str) -> CompletionRequest {
    let transcript = Transcript::build(&[Turn::system("You are Ramani.")], &[] as &[Exchange], message);
    CompletionRequest::new(transcript, 100)
}

#[tokio::test]
async fn test_successful_reply() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::Json(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "You are Ramani."}]},
                {"role": "user", "parts": [{"text": "When should I plant maize?"}]}
            ],
            "generationConfig": {"maxOutputTokens": 100}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply_body("After the first heavy rains."))
        .create_async()
        .await;

    let provider = provider_for(&server);
    let reply = provider.complete(&request("When should I plant maize?")).await?;

    assert_eq!(reply, "After the first heavy rains.");
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_error_status_maps_to_status_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(403)
        .with_body(r#"{"error":{"code":403,"message":"API key not valid"}}"#)
        .create_async()
        .await;

    let err = provider_for(&server)
        .complete(&request("hi"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, RemoteFailure::Status(403));
    assert!(err.message.contains("API key not valid"));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(503)
        .with_body("overloaded")
        .create_async()
        .await;

    let err = provider_for(&server)
        .complete(&request("hi"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, RemoteFailure::Status(503));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let err = provider_for(&server)
        .complete(&request("hi"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, RemoteFailure::Malformed);
}

#[tokio::test]
async fn test_missing_candidates_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(r#"{"candidates":[]}"#)
        .create_async()
        .await;

    let err = provider_for(&server)
        .complete(&request("hi"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, RemoteFailure::Malformed);
}

#[tokio::test]
async fn test_unreachable_server() {
    let config = ProviderConfig::gemini("test-key").with_base_url("http://127.0.0.1:1");
    let provider = GeminiProvider::from_config(&config).unwrap();

    let err = provider.complete(&request("hi")).await.unwrap_err();
    assert_eq!(err.kind, RemoteFailure::Unreachable);
}

#[tokio::test]
async fn test_session_sends_history_over_the_wire() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let persona = Persona {
        name: "Ramani".to_string(),
        description: String::new(),
        preamble: vec!["You are Ramani.".to_string()],
    };

    let first = server
        .mock("POST", PATH)
        .match_body(Matcher::Json(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "You are Ramani."}]},
                {"role": "user", "parts": [{"text": "hello"}]}
            ],
            "generationConfig": {"maxOutputTokens": 100}
        })))
        .with_status(200)
        .with_body(reply_body("Hello, I am Ramani."))
        .expect(1)
        .create_async()
        .await;

    let second = server
        .mock("POST", PATH)
        .match_body(Matcher::Json(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "You are Ramani."}]},
                {"role": "user", "parts": [{"text": "hello"}]},
                {"role": "model", "parts": [{"text": "Hello, I am Ramani."}]},
                {"role": "user", "parts": [{"text": "Will it flood?"}]}
            ],
            "generationConfig": {"maxOutputTokens": 100}
        })))
        .with_status(200)
        .with_body(reply_body("Risk is low this week."))
        .expect(1)
        .create_async()
        .await;

    let session = ChatSession::new(Arc::new(provider_for(&server))).with_persona(&persona);

    assert_eq!(session.send_turn("hello").await?, "Hello, I am Ramani.");
    assert_eq!(session.send_turn("Will it flood?").await?, "Risk is low this week.");
    assert_eq!(session.exchange_count().await, 2);

    first.assert_async().await;
    second.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_blank_message_makes_no_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .expect(0)
        .create_async()
        .await;

    let session = ChatSession::new(Arc::new(provider_for(&server)));
    assert_eq!(session.send_turn("   ").await, Err(ChatError::InvalidInput));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_http_failure_leaves_history_unchanged() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(500)
        .with_body("internal")
        .create_async()
        .await;

    let session = ChatSession::new(Arc::new(provider_for(&server)));
    let err = session.send_turn("hello").await.unwrap_err();

    assert_eq!(err.remote_kind(), Some(RemoteFailure::Status(500)));
    assert_eq!(session.exchange_count().await, 0);
}

#[derive(Clone, Default)]
struct CapturedLog(Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test(flavor = "current_thread")]
async fn test_reply_length_logged_in_characters() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", PATH)
        .with_status(200)
        .with_body(reply_body("Mvua 🌧🌧"))
        .create_async()
        .await;

    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let reply = provider_for(&server).complete(&request("rain?")).await?;
    assert_eq!(reply, "Mvua 🌧🌧");

    let output = String::from_utf8(log.0.lock().unwrap().clone())?;
    let line = output
        .lines()
        .find(|l| l.contains("Received reply from Gemini API"))
        .expect("reply log line");
    assert!(line.contains("chars=7"), "{}", line);
    Ok(())
}
