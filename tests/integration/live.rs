//! Tests against the live API. Run with `--ignored`.

use super::common::live_api;
use serde_json::json;

#[tokio::test]
#[ignore]
async fn test_live_catalog_search_by_doi() {
    let api = live_api();
    let found = api
        .catalog
        .search(&[("doi", "10.1103/PhysRevA.20.1521"), ("view", "bib")])
        .await
        .expect("Catalog search should succeed");

    assert!(found.is_array(), "Catalog search returns a list");
}

#[tokio::test]
#[ignore]
async fn test_live_documents_pagination() {
    let api = live_api();
    api.documents.reset_pagination();

    let first = api
        .documents
        .list(&json!({"limit": 1}))
        .await
        .expect("Listing documents should succeed");
    assert!(first.as_array().map(|docs| docs.len() <= 1).unwrap_or(false));

    if api.documents.count() > 1 {
        let links = api.documents.pagination_links();
        assert!(links.next.is_some(), "More documents means a next link");

        let second = api.documents.next_page().await.expect("Next page should load");
        assert_ne!(first, second);
    }
}

#[tokio::test]
#[ignore]
async fn test_live_folder_lifecycle() {
    let api = live_api();
    let name = format!("sdk-test-{}", std::process::id());

    let folder = api
        .folders
        .create(&json!({"name": name}))
        .await
        .expect("Folder creation should succeed");
    let id = folder["id"].as_str().expect("Created folder has an id").to_string();
    assert_eq!(folder["name"], name.as_str());

    let renamed = api
        .folders
        .update(&id, &json!({"name": format!("{name}-renamed")}))
        .await
        .expect("Folder update should succeed");
    assert_eq!(renamed["name"], format!("{name}-renamed").as_str());

    api.folders.delete(&id).await.expect("Folder deletion should succeed");
}
