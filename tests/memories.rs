//! Memory endpoints against a mock server

mod common;

use lara_sdk::{ImportJob, ImportStatus, LaraError, TranslationUnit, WaitOptions};
use mockito::{Matcher, Server};
use serde_json::json;
use std::time::Duration;

fn fast_polling() -> WaitOptions {
    WaitOptions::default().with_polling_interval(Duration::from_millis(10))
}

#[tokio::test]
async fn test_create_memory_sends_signed_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/memories")
        .match_header("x-http-method-override", "POST")
        .match_header("authorization", common::signed())
        .match_header("content-md5", Matcher::Regex("^[0-9a-f]{32}$".to_string()))
        .match_header("content-type", "application/json")
        .match_header("date", Matcher::Regex(r"^\w{3}, \d{2} \w{3} \d{4} \d{2}:\d{2}:\d{2} \+0000$".to_string()))
        .match_header("x-lara-sdk-name", "lara-rust")
        .match_body(Matcher::Json(json!({"name": "MyDemoMemory"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(common::content(json!({
            "id": "mem_1",
            "name": "MyDemoMemory",
            "owner_id": "acc_1",
            "collaborators_count": 0,
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z"
        })))
        .create_async()
        .await;

    let translator = common::translator(&server);
    let memory = translator.memories().create("MyDemoMemory", None).await.unwrap();

    assert_eq!(memory.id, "mem_1");
    assert_eq!(memory.owner_id.as_deref(), Some("acc_1"));
    assert!(memory.created_at.is_some());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_memories() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/memories")
        .match_header("x-http-method-override", "GET")
        .with_status(200)
        .with_body(common::content(json!([
            {"id": "mem_1", "name": "First"},
            {"id": "mem_2", "name": "Second"}
        ])))
        .create_async()
        .await;

    let translator = common::translator(&server);
    let memories = translator.memories().list().await.unwrap();

    assert_eq!(memories.len(), 2);
    assert_eq!(memories[1].name, "Second");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_missing_memory_is_none() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/memories/mem_missing")
        .with_status(404)
        .with_body(common::error(404, "NotFoundException", "Memory not found"))
        .create_async()
        .await;

    let translator = common::translator(&server);
    let memory = translator.memories().get("mem_missing").await.unwrap();

    assert!(memory.is_none());
}

#[tokio::test]
async fn test_get_memory_server_error_is_propagated() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/memories/mem_1")
        .with_status(500)
        .with_body(common::error(500, "InternalServerError", "boom"))
        .create_async()
        .await;

    let translator = common::translator(&server);
    let err = translator.memories().get("mem_1").await.unwrap_err();

    match err {
        LaraError::Api { status, kind, .. } => {
            assert_eq!(status, 500);
            assert_eq!(kind, "InternalServerError");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_add_translation_to_many_memories() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/memories/content")
        .match_header("x-http-method-override", "PUT")
        .match_body(Matcher::Json(json!({
            "ids": ["mem_1", "mem_2"],
            "source": "en-US",
            "target": "it-IT",
            "sentence": "Hello World!",
            "translation": "Ciao Mondo!",
            "tuid": "greeting_003"
        })))
        .with_status(200)
        .with_body(common::content(json!({"id": "imp_9", "progress": 0.0})))
        .create_async()
        .await;

    let translator = common::translator(&server);
    let unit = TranslationUnit::new("en-US", "it-IT", "Hello World!", "Ciao Mondo!")
        .with_tuid("greeting_003");
    let ids = vec!["mem_1".to_string(), "mem_2".to_string()];

    let job = translator
        .memories()
        .add_translation_to_many(&ids, &unit)
        .await
        .unwrap();

    assert_eq!(job.id, "imp_9");
    assert_eq!(job.status, ImportStatus::Pending);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_translation_uses_delete_override() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/memories/mem_1/content")
        .match_header("x-http-method-override", "DELETE")
        .match_body(Matcher::PartialJson(json!({"sentence": "Hello", "tuid": "greeting_001"})))
        .with_status(200)
        .with_body(common::content(json!({"id": "imp_10", "progress": 0.0})))
        .create_async()
        .await;

    let translator = common::translator(&server);
    let unit = TranslationUnit::new("en-US", "fr-FR", "Hello", "Bonjour").with_tuid("greeting_001");

    translator
        .memories()
        .delete_translation("mem_1", &unit)
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_import_tmx_then_wait_until_done() {
    let mut server = Server::new_async().await;
    let upload = server
        .mock("POST", "/memories/mem_1/import")
        .match_header("x-http-method-override", "POST")
        .match_header("authorization", common::signed())
        .match_header("content-type", Matcher::Regex("^multipart/form-data; boundary=".to_string()))
        .with_status(200)
        .with_body(common::content(json!({
            "id": "imp_123", "begin": 0, "end": 10, "channel": 1, "size": 128, "progress": 0.0
        })))
        .create_async()
        .await;
    let status = server
        .mock("POST", "/memories/imports/imp_123")
        .match_header("x-http-method-override", "GET")
        .with_status(200)
        .with_body_from_request(common::sequence(vec![
            json!({"id": "imp_123", "progress": 0.0}),
            json!({"id": "imp_123", "progress": 0.5}),
            json!({"id": "imp_123", "progress": 1.0}),
        ]))
        .expect(3)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let tmx = dir.path().join("sample_memory.tmx");
    std::fs::write(&tmx, "<tmx version=\"1.4\"><body/></tmx>").unwrap();

    let translator = common::translator(&server);
    let memories = translator.memories();
    let job = memories.import_tmx("mem_1", &tmx).await.unwrap();
    assert_eq!(job.status, ImportStatus::Pending);

    let mut progress = Vec::new();
    let done = memories
        .wait_for_import_with_progress(&job, fast_polling(), |job| progress.push(job.progress))
        .await
        .unwrap();

    assert_eq!(done.status, ImportStatus::Done);
    assert_eq!(progress, vec![0.0, 0.5, 1.0]);
    upload.assert_async().await;
    status.assert_async().await;
}

#[tokio::test]
async fn test_wait_propagates_lookup_failure() {
    let mut server = Server::new_async().await;
    let status = server
        .mock("POST", "/memories/imports/imp_1")
        .with_status(503)
        .with_body(common::error(503, "ServiceUnavailable", "try later"))
        .expect(1)
        .create_async()
        .await;

    let translator = common::translator(&server);
    let err = translator
        .memories()
        .wait_for_import(&ImportJob::new("imp_1"), fast_polling())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(503));
    status.assert_async().await;
}
