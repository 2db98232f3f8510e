mod helpers;

use helpers::gateway;
use serde_json::{json, Value};

#[tokio::test]
async fn resources_list_covers_root_folders_and_notes() {
    let gw = gateway(false).await;
    gw.mock.seed_note("projects/alpha.md", "a");
    gw.mock.seed_note("inbox.md", "b");

    let response = gw.rpc("resources/list", json!({})).await;
    let resources = response.result.unwrap()["resources"]
        .as_array()
        .unwrap()
        .clone();

    let uris: Vec<&str> = resources
        .iter()
        .map(|r| r["uri"].as_str().unwrap())
        .collect();
    assert_eq!(uris[0], "vault://notes/");
    assert!(uris.contains(&"vault://notes/projects/"));
    assert!(uris.contains(&"vault://notes/projects/alpha.md"));
    assert!(uris.contains(&"vault://notes/inbox.md"));

    let folder = resources
        .iter()
        .find(|r| r["uri"] == "vault://notes/projects/")
        .unwrap();
    assert_eq!(folder["mimeType"], "application/json");
    let note = resources
        .iter()
        .find(|r| r["uri"] == "vault://notes/inbox.md")
        .unwrap();
    assert_eq!(note["mimeType"], "text/markdown");
}

#[tokio::test]
async fn root_listing_returns_json_folder_view() {
    let gw = gateway(false).await;
    gw.mock.seed_note("projects/alpha.md", "a");
    gw.mock.seed_note("inbox.md", "b");

    let response = gw
        .rpc("resources/read", json!({"uri": "vault://notes/"}))
        .await;
    let contents = &response.result.unwrap()["contents"][0];
    assert_eq!(contents["mimeType"], "application/json");

    let listing: Value = serde_json::from_str(contents["text"].as_str().unwrap()).unwrap();
    assert_eq!(listing["folder_path"], "/");
    assert_eq!(listing["total_items"], 2);
    assert_eq!(listing["folders"][0]["path"], "projects");
    assert_eq!(listing["notes"][0]["path"], "inbox.md");
    // Every entry carries a URI for further navigation.
    assert_eq!(listing["folders"][0]["uri"], "vault://notes/projects/");
    assert_eq!(listing["notes"][0]["uri"], "vault://notes/inbox.md");
}

#[tokio::test]
async fn folder_listing_scopes_to_direct_children() {
    let gw = gateway(false).await;
    gw.mock.seed_note("p/direct.md", "x");
    gw.mock.seed_note("p/sub/nested.md", "y");

    let response = gw
        .rpc("resources/read", json!({"uri": "vault://notes/p/"}))
        .await;
    let contents = &response.result.unwrap()["contents"][0];
    let listing: Value = serde_json::from_str(contents["text"].as_str().unwrap()).unwrap();

    assert_eq!(listing["folder_path"], "p");
    assert_eq!(listing["total_items"], 2);
    assert_eq!(listing["folders"][0]["path"], "p/sub");
    assert_eq!(listing["notes"][0]["path"], "p/direct.md");
}

#[tokio::test]
async fn note_read_returns_markdown_with_headers() {
    let gw = gateway(false).await;
    gw.mock.seed_note(
        "projects/alpha.md",
        "---\ntype: project\nstatus: active\n---\n# Alpha\nbody",
    );

    let response = gw
        .rpc(
            "resources/read",
            json!({"uri": "vault://notes/projects/alpha.md"}),
        )
        .await;
    let contents = &response.result.unwrap()["contents"][0];
    assert_eq!(contents["mimeType"], "text/markdown");
    assert!(contents["text"].as_str().unwrap().contains("# Alpha"));
    assert_eq!(contents["metadata"]["headers"]["type"], "project");
    assert_eq!(contents["metadata"]["resource_type"], "note");
}

#[tokio::test]
async fn wrong_scheme_is_invalid_params() {
    let gw = gateway(false).await;
    let response = gw
        .rpc("resources/read", json!({"uri": "obsidian://notes/a.md"}))
        .await;
    assert_eq!(response.error.unwrap().code, -32602);
}

#[tokio::test]
async fn traversal_uri_is_rejected() {
    let gw = gateway(false).await;
    let response = gw
        .rpc("resources/read", json!({"uri": "vault://notes/../escape.md"}))
        .await;
    assert_eq!(response.error.unwrap().code, -32602);
}

#[tokio::test]
async fn missing_note_is_internal_with_data() {
    let gw = gateway(false).await;
    let response = gw
        .rpc("resources/read", json!({"uri": "vault://notes/ghost.md"}))
        .await;
    let error = response.error.unwrap();
    assert_eq!(error.code, -32603);
    assert_eq!(error.data.unwrap()["kind"], "not_found");
}

#[tokio::test]
async fn missing_folder_is_not_found() {
    let gw = gateway(false).await;
    gw.mock.seed_note("real/note.md", "x");

    let response = gw
        .rpc("resources/read", json!({"uri": "vault://notes/ghost/"}))
        .await;
    let error = response.error.unwrap();
    assert_eq!(error.code, -32603);
    assert_eq!(error.data.unwrap()["kind"], "not_found");
}

#[tokio::test]
async fn percent_encoded_paths_resolve() {
    let gw = gateway(false).await;
    gw.mock.seed_note("daily notes/today.md", "spaces in folder names");

    let response = gw
        .rpc(
            "resources/read",
            json!({"uri": "vault://notes/daily%20notes/today.md"}),
        )
        .await;
    let contents = &response.result.unwrap()["contents"][0];
    assert_eq!(contents["text"], "spaces in folder names");
}
