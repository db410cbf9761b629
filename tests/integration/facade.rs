//! The top-level re-exports wired together against a mock server.

use super::common::init_tracing;
use mendeley_sdk::{AuthMode, MendeleyApi, Settings, StaticToken};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_facade_round_trip() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents/"))
        .and(header("authorization", "Bearer rotated"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Mendeley-Count", "1")
                .set_body_json(json!([{"id": "15"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = MendeleyApi::new(Settings::new(server.uri(), AuthMode::bearer("initial")).unwrap())
        .unwrap();
    api.set_auth_flow(StaticToken::new("rotated"));

    let docs = api.documents.list(&()).await.unwrap();
    assert_eq!(docs, json!([{"id": "15"}]));
    assert_eq!(api.documents.count(), 1);
}
