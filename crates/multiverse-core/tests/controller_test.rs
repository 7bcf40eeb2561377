// Integration tests for `CatalogController` against a wiremock backend.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::watch;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use multiverse_api::CatalogClient;
use multiverse_core::{CatalogController, CoreError, ListSnapshot, QueryMode};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, CatalogController) {
    let server = MockServer::start().await;
    let client =
        CatalogClient::from_reqwest(&server.uri(), reqwest::Client::new()).expect("valid base url");
    (server, CatalogController::new(client))
}

fn character_json(id: u64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "status": "Alive",
        "species": "Human",
        "gender": "Male",
        "origin": { "name": "Earth" },
        "location": { "name": "Earth" },
        "image": format!("https://example.test/{id}.jpeg"),
        "episode": []
    })
}

fn page_json(ids: &[u64], has_next: bool) -> serde_json::Value {
    let next = has_next.then_some("https://example.test/character?page=2");
    json!({
        "info": {
            "count": 826,
            "pages": 42,
            "next": next,
            "prev": null
        },
        "results": ids
            .iter()
            .map(|id| character_json(*id, &format!("Character {id}")))
            .collect::<Vec<_>>()
    })
}

async fn mount_page(server: &MockServer, page: u32, ids: &[u64], has_next: bool) {
    Mock::given(method("GET"))
        .and(path("/character"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(ids, has_next)))
        .mount(server)
        .await;
}

/// Wait until a published snapshot satisfies `pred`, or panic after 5s.
async fn wait_for<F>(rx: &mut watch::Receiver<ListSnapshot>, mut pred: F) -> ListSnapshot
where
    F: FnMut(&ListSnapshot) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let snap = rx.borrow_and_update();
                if pred(&snap) {
                    return snap.clone();
                }
            }
            rx.changed().await.expect("snapshot channel closed");
        }
    })
    .await
    .expect("timed out waiting for snapshot")
}

fn ids(snap: &ListSnapshot) -> Vec<u64> {
    snap.items.iter().map(|c| c.id).collect()
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn initialize_loads_the_first_page() {
    let (server, controller) = setup().await;
    mount_page(&server, 1, &[1, 2, 3], true).await;

    let mut rx = controller.subscribe();
    controller.initialize();

    // The pre-fetch snapshot shows the initial-load spinner.
    let loading = wait_for(&mut rx, |s| s.is_loading).await;
    assert!(loading.is_initial_loading());

    let snap = wait_for(&mut rx, |s| !s.is_loading && !s.items.is_empty()).await;
    assert_eq!(ids(&snap), vec![1, 2, 3]);
    assert!(snap.has_more);
    assert_eq!(snap.current_page, 1);
    assert!(snap.last_error.is_none());
}

#[tokio::test]
async fn end_reached_appends_the_next_page() {
    let (server, controller) = setup().await;
    mount_page(&server, 1, &[1, 2], true).await;
    mount_page(&server, 2, &[3, 4], false).await;

    let mut rx = controller.subscribe();
    controller.initialize();
    wait_for(&mut rx, |s| !s.is_loading && s.items.len() == 2).await;

    controller.end_reached();
    let snap = wait_for(&mut rx, |s| !s.is_loading && s.items.len() == 4).await;

    assert_eq!(ids(&snap), vec![1, 2, 3, 4]);
    assert_eq!(snap.current_page, 2);
    assert!(!snap.has_more);
}

#[tokio::test]
async fn search_replaces_the_list_with_a_single_entity() {
    let (server, controller) = setup().await;
    mount_page(&server, 1, &[1, 2], true).await;
    Mock::given(method("GET"))
        .and(path("/character/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(character_json(7, "Abadango")))
        .mount(&server)
        .await;

    let mut rx = controller.subscribe();
    controller.initialize();
    wait_for(&mut rx, |s| !s.is_loading && !s.items.is_empty()).await;

    controller.search_text_changed("7");
    let snap = wait_for(&mut rx, |s| !s.is_loading && !s.items.is_empty()).await;

    assert_eq!(ids(&snap), vec![7]);
    assert_eq!(snap.mode, QueryMode::Search("7".into()));
    assert!(!snap.has_more);
}

#[tokio::test]
async fn failed_search_reports_not_found() {
    let (server, controller) = setup().await;
    Mock::given(method("GET"))
        .and(path("/character/9999"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "Character not found" })),
        )
        .mount(&server)
        .await;

    let mut rx = controller.subscribe();
    controller.search_text_changed("9999");

    let snap = wait_for(&mut rx, |s| s.last_error.is_some()).await;
    assert_eq!(snap.last_error, Some(CoreError::NotFound));
    assert!(snap.items.is_empty());
    assert!(!snap.is_loading);
}

#[tokio::test]
async fn append_failure_keeps_loaded_items() {
    let (server, controller) = setup().await;
    mount_page(&server, 1, &[1, 2], true).await;
    Mock::given(method("GET"))
        .and(path("/character"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "boom" })))
        .mount(&server)
        .await;

    let mut rx = controller.subscribe();
    controller.initialize();
    wait_for(&mut rx, |s| !s.is_loading && s.items.len() == 2).await;

    controller.end_reached();
    let snap = wait_for(&mut rx, |s| s.last_error.is_some()).await;

    assert_eq!(ids(&snap), vec![1, 2]);
    assert_eq!(snap.current_page, 1);
    assert!(matches!(snap.last_error, Some(CoreError::Service { status: 500, .. })));
}

#[tokio::test]
async fn slow_page_response_is_discarded_after_a_search() {
    let (server, controller) = setup().await;
    mount_page(&server, 1, &[1, 2], true).await;
    // Page 2 is slow enough for the user to start a search first.
    Mock::given(method("GET"))
        .and(path("/character"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_json(&[3, 4], true))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/character/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(character_json(5, "Jerry Smith")))
        .mount(&server)
        .await;

    let mut rx = controller.subscribe();
    controller.initialize();
    wait_for(&mut rx, |s| !s.is_loading && s.items.len() == 2).await;

    controller.end_reached();
    controller.search_text_changed("5");
    let snap = wait_for(&mut rx, |s| !s.is_loading && !s.items.is_empty()).await;
    assert_eq!(ids(&snap), vec![5]);

    // Let the slow page-2 response land; it must not resurface.
    tokio::time::sleep(Duration::from_millis(400)).await;
    let snap = controller.snapshot();
    assert_eq!(ids(&snap), vec![5]);
    assert_eq!(snap.mode, QueryMode::Search("5".into()));
}

#[tokio::test]
async fn retry_after_failure_recovers() {
    let (server, controller) = setup().await;
    // First attempt fails, retry succeeds.
    Mock::given(method("GET"))
        .and(path("/character"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "boom" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, 1, &[1, 2], true).await;

    let mut rx = controller.subscribe();
    controller.initialize();
    wait_for(&mut rx, |s| s.last_error.is_some()).await;

    controller.retry();
    let snap = wait_for(&mut rx, |s| !s.is_loading && !s.items.is_empty()).await;
    assert_eq!(ids(&snap), vec![1, 2]);
    assert!(snap.last_error.is_none());
}

#[tokio::test]
async fn detail_lookup_bypasses_the_list() {
    let (server, controller) = setup().await;
    Mock::given(method("GET"))
        .and(path("/character/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(character_json(1, "Rick Sanchez")))
        .mount(&server)
        .await;

    let before = controller.snapshot();
    let character = controller.character(1).await.expect("character 1");

    assert_eq!(character.id, 1);
    assert_eq!(character.name, "Rick Sanchez");
    // The list state is untouched by a detail lookup.
    let after = controller.snapshot();
    assert_eq!(ids(&before), ids(&after));
    assert_eq!(before.is_loading, after.is_loading);
}
