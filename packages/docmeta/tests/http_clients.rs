//! Tests for the HTTP clients against a mock server.

use indexmap::IndexMap;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use docmeta::{
    builtin_template, HttpExtractor, HttpMetadataStore, MetadataTemplate, PatchOp, ProviderConfig,
    ProviderError, StoreConfig, StoreError, TemplateRegistry,
};
use docmeta::traits::{Extractor, MetadataStore};

mod common;
use common::setup_tracing;

const SCOPE: &str = "enterprise_1";

fn extractor(server: &MockServer) -> HttpExtractor {
    HttpExtractor::new(ProviderConfig::new(server.uri(), "test-token")).unwrap()
}

fn store(server: &MockServer) -> HttpMetadataStore {
    HttpMetadataStore::new(StoreConfig::new(server.uri(), "test-token")).unwrap()
}

fn base_template() -> MetadataTemplate {
    builtin_template(SCOPE, "financialDocumentBase").unwrap()
}

#[tokio::test]
async fn test_extract_sends_template_reference() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/extract_structured"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "items": [{"id": "f1", "type": "file"}],
            "metadata_template": {
                "template_key": "financialDocumentBase",
                "type": "metadata_template",
                "scope": SCOPE,
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fields": [{"key": "documentType", "value": "W-2"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let raw = extractor(&server)
        .extract_structured("f1", &base_template())
        .await
        .unwrap();
    assert_eq!(raw["fields"][0]["value"], json!("W-2"));
}

#[tokio::test]
async fn test_extract_sends_inline_fields_for_unheld_template() {
    setup_tracing();
    let server = MockServer::start().await;

    // address_validation is not held by the provider, so the request
    // carries inline field definitions instead of a template reference.
    Mock::given(method("POST"))
        .and(path("/ai/extract_structured"))
        .and(body_partial_json(json!({
            "fields": [{"key": "street_address", "type": "string"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let template = builtin_template(SCOPE, "address_validation").unwrap();
    extractor(&server)
        .extract_structured("f1", &template)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert!(body.get("metadata_template").is_none());
    let options = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["key"] == "validation_status")
        .unwrap()["options"]
        .clone();
    assert_eq!(options[0], json!({"key": "Match"}));
}

#[tokio::test]
async fn test_extract_5xx_is_unavailable() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/extract_structured"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = extractor(&server)
        .extract_structured("f1", &base_template())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Unavailable(_)));
}

#[tokio::test]
async fn test_ask_round_trip() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ai/ask"))
        .and(body_partial_json(json!({
            "mode": "single_item_qa",
            "ai_agent": {"type": "ai_agent_ask"}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"answer": "Account Statement"})),
        )
        .mount(&server)
        .await;

    let answer = extractor(&server).ask("f1", "What is this?").await.unwrap();
    assert_eq!(answer, "Account Statement");
}

#[tokio::test]
async fn test_create_conflict_maps_to_conflict_error() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!(
            "/files/f1/metadata/{SCOPE}/financialDocumentBase"
        )))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let fields: IndexMap<String, serde_json::Value> =
        [("documentType".to_string(), json!("W-2"))].into_iter().collect();
    let err = store(&server)
        .create_instance("f1", SCOPE, "financialDocumentBase", &fields)
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_update_sends_patch_content_type_and_ops() {
    setup_tracing();
    let server = MockServer::start().await;

    let ops = vec![PatchOp::add("documentType", json!("W-2"))];
    Mock::given(method("PUT"))
        .and(path(format!(
            "/files/f1/metadata/{SCOPE}/financialDocumentBase"
        )))
        .and(header("content-type", "application/json-patch+json"))
        .and(body_json(json!([
            {"op": "add", "path": "/documentType", "value": "W-2"}
        ])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    store(&server)
        .update_instance("f1", SCOPE, "financialDocumentBase", &ops)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_update_rejection_surfaces_status_and_body() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("/files/f1/metadata/{SCOPE}/irsw2")))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad value for /box1Wages"))
        .mount(&server)
        .await;

    let ops = vec![PatchOp::add("box1Wages", json!("not a number"))];
    let err = store(&server)
        .update_instance("f1", SCOPE, "irsw2", &ops)
        .await
        .unwrap_err();
    match err {
        StoreError::Rejected { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("box1Wages"));
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_schema_fetch_builds_template() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/metadata_templates/{SCOPE}/irsw2/schema"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "templateKey": "irsw2",
            "scope": SCOPE,
            "fields": [
                {"key": "employerEinMasked", "type": "string"},
                {"key": "box1Wages", "type": "float"},
                {"key": "formKind", "type": "enum", "options": [{"key": "Standard"}]},
                {"key": "issued", "type": "date"},
                {"key": "pages", "type": "int"},
            ]
        })))
        .mount(&server)
        .await;

    let template = store(&server).template(SCOPE, "irsw2").await.unwrap();
    assert_eq!(template.template_key, "irsw2");
    assert_eq!(template.scope, SCOPE);
    assert_eq!(template.float_keys(), vec!["box1Wages", "pages"]);
    assert!(template.field("formKind").unwrap().allows_option("Standard"));
}

#[tokio::test]
async fn test_schema_404_is_template_not_found() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/metadata_templates/{SCOPE}/mortgageStatement/schema"
        )))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = store(&server)
        .template(SCOPE, "mortgageStatement")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::TemplateNotFound { .. }));
}
