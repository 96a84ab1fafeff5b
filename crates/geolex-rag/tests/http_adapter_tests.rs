//! # Integration Tests for the Service HTTP Adapters
//!
//! Tests the real HTTP adapter implementations (HttpEmbedder,
//! HttpVectorStore, HttpChatJudge) against wiremock mock servers to verify
//! correct request construction, response parsing, and error handling
//! without requiring live model or store access.

use geolex_core::{CorpusDocument, DocumentMetadata, FeatureSubmission, KnowledgeBase, Region,
    RegionVerdict};
use geolex_rag::{
    DocumentStore, EmbeddingConfig, EmbeddingError, EmbeddingService, HttpChatJudge, HttpEmbedder,
    HttpVectorStore, JudgeConfig, JudgmentError, JudgmentService, VectorStoreConfig,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn submission() -> FeatureSubmission {
    FeatureSubmission::new(
        "Curfew login blocker",
        "Restricts under-18 logins after 10pm in Utah only",
    )
    .expect("valid submission")
}

// ── Embedding Adapter ────────────────────────────────────────────────────

#[tokio::test]
async fn embed_decodes_vector() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(serde_json::json!({
            "model": "nomic-embed-text",
            "input": "hello laws"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"embedding": [0.25, -0.5, 0.75]}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let embedder =
        HttpEmbedder::new(EmbeddingConfig::new(server.uri(), "nomic-embed-text")).expect("build");
    let vector = embedder.embed("hello laws").await.expect("embed");
    assert_eq!(vector, vec![0.25, -0.5, 0.75]);
}

#[tokio::test]
async fn embed_empty_vector_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})),
        )
        .mount(&server)
        .await;

    let embedder =
        HttpEmbedder::new(EmbeddingConfig::new(server.uri(), "nomic-embed-text")).expect("build");
    let err = embedder.embed("anything").await.unwrap_err();
    assert!(matches!(err, EmbeddingError::EmptyVector { .. }));
}

#[tokio::test]
async fn embed_non_success_status_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let embedder =
        HttpEmbedder::new(EmbeddingConfig::new(server.uri(), "nomic-embed-text")).expect("build");
    let err = embedder.embed("anything").await.unwrap_err();
    match err {
        EmbeddingError::Api { status, body, .. } => {
            assert_eq!(status, 500);
            assert!(body.contains("model not loaded"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

// ── Vector Store Adapter ─────────────────────────────────────────────────

#[tokio::test]
async fn retrieve_maps_rows_and_sends_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/match_documents"))
        .and(header("apikey", "store-key"))
        .and(body_partial_json(serde_json::json!({
            "match_count": 3,
            "kb": "Utah_Social_Media_Regulation_Act"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "text": "Section 13-63-102. Curfew hours for minor accounts.",
                "similarity": 0.91,
                "metadata": {"kb": "Utah_Social_Media_Regulation_Act", "section": "13-63-102"}
            },
            {
                "text": "Garbage row.",
                "metadata": {"kb": "Not_A_Corpus"}
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let store =
        HttpVectorStore::new(VectorStoreConfig::new(server.uri(), "store-key")).expect("build");
    let docs = store
        .retrieve(&[0.1, 0.2], 3, KnowledgeBase::UtahSocialMediaAct)
        .await
        .expect("retrieve");

    // The row with an unknown corpus is skipped, not fatal.
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].metadata.kb, KnowledgeBase::UtahSocialMediaAct);
    assert_eq!(docs[0].metadata.section.as_deref(), Some("13-63-102"));
}

#[tokio::test]
async fn retrieve_empty_result_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/match_documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let store =
        HttpVectorStore::new(VectorStoreConfig::new(server.uri(), "store-key")).expect("build");
    let docs = store
        .retrieve(&[0.1], 3, KnowledgeBase::FloridaSenate)
        .await
        .expect("retrieve");
    assert!(docs.is_empty());
}

#[tokio::test]
async fn insert_posts_document_row() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/documents"))
        .and(header("apikey", "store-key"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let store =
        HttpVectorStore::new(VectorStoreConfig::new(server.uri(), "store-key")).expect("build");
    let doc = CorpusDocument {
        text: "Article 28. Online protection of minors.".to_string(),
        metadata: DocumentMetadata::for_kb(KnowledgeBase::EuDigitalServicesAct),
    };
    store.insert(&doc, &[0.3, 0.4]).await.expect("insert");
}

// ── Chat Judge Adapter ───────────────────────────────────────────────────

#[tokio::test]
async fn validate_feature_accepts_exact_yes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": {"content": "  Yes \n"}
        })))
        .mount(&server)
        .await;

    let judge = HttpChatJudge::new(JudgeConfig::new(server.uri(), "llama3.2")).expect("build");
    assert!(judge.validate_feature(&submission()).await.expect("call"));
}

#[tokio::test]
async fn validate_feature_rejects_anything_else() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": {"content": "yes, this looks like a feature"}
        })))
        .mount(&server)
        .await;

    let judge = HttpChatJudge::new(JudgeConfig::new(server.uri(), "llama3.2")).expect("build");
    assert!(!judge.validate_feature(&submission()).await.expect("call"));
}

#[tokio::test]
async fn evaluate_decodes_prose_wrapped_payload() {
    let server = MockServer::start().await;

    let content = "Here is my evaluation:\n\
        {\"isCompliant\": {\"utah\": false}, \"reason\": \"Violates curfew provisions\"}\n\
        Hope that helps!";
    Mock::given(method("POST"))
        .and(path("/v1/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"content": content}}]
        })))
        .mount(&server)
        .await;

    let judge = HttpChatJudge::new(JudgeConfig::new(server.uri(), "llama3.2")).expect("build");
    let verdict = judge
        .evaluate_compliance(&submission(), &[])
        .await
        .expect("evaluate");

    let map = verdict.compliance.expect("compliance map present");
    assert_eq!(map.get(Region::Utah), Some(RegionVerdict::NonCompliant));
    assert_eq!(verdict.reason.as_deref(), Some("Violates curfew provisions"));
}

#[tokio::test]
async fn evaluate_malformed_output_carries_raw_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": {"content": "I am unable to produce JSON today."}
        })))
        .mount(&server)
        .await;

    let judge = HttpChatJudge::new(JudgeConfig::new(server.uri(), "llama3.2")).expect("build");
    let err = judge
        .evaluate_compliance(&submission(), &[])
        .await
        .unwrap_err();
    match err {
        JudgmentError::MalformedOutput { raw } => assert!(raw.contains("unable")),
        other => panic!("expected MalformedOutput, got: {other:?}"),
    }
}
