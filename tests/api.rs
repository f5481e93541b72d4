//! HTTP API tests against a real socket, backed by an in-memory engine

use assert_json_diff::assert_json_include;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use lingo_voice::core::languages::resolve;
use lingo_voice::server::api::router;
use lingo_voice::{ChatController, EngineProvider, LanguageCode, TranslationEngine, TranslationError};

/// Reverses the text, counting calls
#[derive(Default)]
struct ReverseEngine {
    calls: AtomicUsize,
}

impl TranslationEngine for ReverseEngine {
    fn translate(&self, text: &str, _source: LanguageCode, _target: LanguageCode) -> Result<String, TranslationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(text.chars().rev().collect())
    }

    fn model_name(&self) -> &str {
        "reverse"
    }
}

struct TestProvider {
    engine: Arc<ReverseEngine>,
    offline: AtomicBool,
}

impl TestProvider {
    fn new(offline: bool) -> Arc<Self> {
        Arc::new(Self {
            engine: Arc::new(ReverseEngine::default()),
            offline: AtomicBool::new(offline),
        })
    }

    fn calls(&self) -> usize {
        self.engine.calls.load(Ordering::SeqCst)
    }
}

impl EngineProvider for TestProvider {
    fn load(&self) -> Result<Arc<dyn TranslationEngine>, TranslationError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(TranslationError::model_unavailable("no network"));
        }
        let engine: Arc<dyn TranslationEngine> = self.engine.clone();
        Ok(engine)
    }

    fn model_id(&self) -> &str {
        "test/reverse"
    }
}

async fn spawn_app(provider: Arc<TestProvider>) -> String {
    let controller = Arc::new(ChatController::new(
        provider,
        resolve("eng_Latn").unwrap(),
        resolve("spa_Latn").unwrap(),
    ));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(controller)).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn get(url: String) -> (u16, Value) {
    let response = reqwest::get(url).await.unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

async fn post(url: String, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new().post(url).json(&body).send().await.unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_index_serves_chat_page() {
    let base = spawn_app(TestProvider::new(false)).await;

    let response = reqwest::get(format!("{}/", base)).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("<title>Lingo-Voice</title>"));
}

#[tokio::test]
async fn test_health_reports_model_state() {
    let base = spawn_app(TestProvider::new(false)).await;

    let (status, body) = get(format!("{}/health", base)).await;
    assert_eq!(status, 200);
    assert_json_include!(
        actual: body,
        expected: json!({"status": "ok", "service": "lingo-voice", "model_loaded": false})
    );
}

#[tokio::test]
async fn test_languages_lists_catalog() {
    let base = spawn_app(TestProvider::new(false)).await;

    let (status, body) = get(format!("{}/api/languages", base)).await;
    assert_eq!(status, 200);
    assert_eq!(body["object"], "list");
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 202);
    assert!(data.contains(&json!({"code": "eng_Latn", "name": "English"})));
}

#[tokio::test]
async fn test_translate_appends_exchange() {
    let provider = TestProvider::new(false);
    let base = spawn_app(provider.clone()).await;

    let (status, body) = post(format!("{}/api/translate", base), json!({"text": "hola"})).await;
    assert_eq!(status, 200);
    assert_json_include!(
        actual: body,
        expected: json!({
            "id": 1,
            "user": {"role": "user", "text": "hola", "source_lang": "eng_Latn", "target_lang": "spa_Latn"},
            "assistant": {"role": "assistant", "text": "aloh"}
        })
    );

    let (_, session) = get(format!("{}/api/session", base)).await;
    assert_json_include!(
        actual: session.clone(),
        expected: json!({"model_loaded": true, "model_name": "reverse", "phase": "idle"})
    );
    assert_eq!(session["history"].as_array().unwrap().len(), 1);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_rejections_are_bad_requests() {
    let provider = TestProvider::new(false);
    let base = spawn_app(provider.clone()).await;

    let (status, body) = post(format!("{}/api/translate", base), json!({"text": "  "})).await;
    assert_eq!(status, 400);
    assert_json_include!(
        actual: body,
        expected: json!({"error": {"code": "empty_input", "type": "invalid_request_error"}})
    );

    let (status, body) = post(
        format!("{}/api/translate", base),
        json!({"text": "hello", "target_lang": "tlh_Latn"}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "unsupported_language");

    let (_, session) = get(format!("{}/api/session", base)).await;
    assert_eq!(session["history"], json!([]));
    assert_eq!(session["model_loaded"], false);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_model_unavailable_is_service_unavailable() {
    let provider = TestProvider::new(true);
    let base = spawn_app(provider.clone()).await;

    let (status, body) = post(format!("{}/api/model/load", base), json!({})).await;
    assert_eq!(status, 503);
    assert_eq!(body["error"]["code"], "model_unavailable");

    let (status, _) = post(format!("{}/api/translate", base), json!({"text": "hello"})).await;
    assert_eq!(status, 503);

    // retry after the network comes back
    provider.offline.store(false, Ordering::SeqCst);
    let (status, body) = post(format!("{}/api/model/load", base), json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"model_loaded": true, "model": "reverse"}));
}

#[tokio::test]
async fn test_select_languages_and_clear_history() {
    let provider = TestProvider::new(false);
    let base = spawn_app(provider.clone()).await;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("{}/api/session/languages", base))
        .json(&json!({"source_lang": "French", "target_lang": "French"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["source_lang"]["code"], "fra_Latn");

    // same language on both sides echoes the text without the model
    let (status, body) = post(format!("{}/api/translate", base), json!({"text": "bonjour"})).await;
    assert_eq!(status, 200);
    assert_eq!(body["assistant"]["text"], "bonjour");
    assert_eq!(provider.calls(), 0);

    let response = client.delete(format!("{}/api/history", base)).send().await.unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"cleared": 1}));

    let response = client
        .put(format!("{}/api/session/languages", base))
        .json(&json!({"source_lang": "French", "target_lang": "Atlantean"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn test_malformed_bodies_get_error_envelope() {
    let provider = TestProvider::new(false);
    let base = spawn_app(provider.clone()).await;

    // missing text counts as empty input
    let (status, body) = post(format!("{}/api/translate", base), json!({})).await;
    assert_eq!(status, 400);
    assert_json_include!(
        actual: body,
        expected: json!({"error": {"code": "empty_input", "type": "invalid_request_error"}})
    );

    for payload in [json!({"text": null}), json!({"text": 42}), json!({"text": "hi", "target_lang": 7})] {
        let (status, body) = post(format!("{}/api/translate", base), payload).await;
        assert_eq!(status, 400);
        assert_json_include!(
            actual: body,
            expected: json!({"error": {"code": "invalid_request", "type": "invalid_request_error"}})
        );
        assert!(body["error"]["message"].as_str().unwrap().starts_with("Invalid request"));
    }

    let response = reqwest::Client::new()
        .post(format!("{}/api/translate", base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "invalid_request");

    let response = reqwest::Client::new()
        .put(format!("{}/api/session/languages", base))
        .json(&json!({"source_lang": "French"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], "invalid_request_error");

    let (_, session) = get(format!("{}/api/session", base)).await;
    assert_eq!(session["history"], json!([]));
    assert_eq!(session["source_lang"]["code"], "eng_Latn");
    assert_eq!(provider.calls(), 0);
}
