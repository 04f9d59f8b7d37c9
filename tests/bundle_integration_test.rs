use arloader::app::commands::{
    command_update_bundle_statuses, command_upload_bundles, command_upload_nfts,
};
use arloader::core::arweave::DEFAULT_ORACLE_URL;
use arloader::utils::monitor::UploadMonitor;
use arloader::{Arweave, RetryPolicy, StatusCode};
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use url::Url;

async fn arweave_for(server: &MockServer) -> Arweave {
    Arweave::from_keypair_path(
        "tests/fixtures/arweave-keyfile.json",
        Url::parse(&server.base_url()).unwrap(),
        Url::parse(DEFAULT_ORACLE_URL).unwrap(),
    )
    .await
    .unwrap()
    .with_retry_policy(RetryPolicy::new(0, Duration::ZERO))
}

async fn mock_network(server: &MockServer) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/price/");
            then.status(200).body("2000");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/tx_anchor");
            then.status(200).body("");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/tx");
            then.status(200);
        })
        .await
}

fn glob_files(pattern: String) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = glob::glob(&pattern)
        .unwrap()
        .filter_map(|p| p.ok())
        .collect();
    paths.sort();
    paths
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_upload_bundles_and_update_statuses() {
    let server = MockServer::start_async().await;
    let post_tx = mock_network(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/status");
            then.status(202);
        })
        .await;

    let files_dir = TempDir::new().unwrap();
    let log_dir = TempDir::new().unwrap();
    for name in ["0.png", "1.png", "2.png"] {
        std::fs::copy(Path::new("tests/fixtures").join(name), files_dir.path().join(name))
            .unwrap();
    }
    let arweave = arweave_for(&server).await;

    // 73 + 74 fit in 150 bytes, 75 goes to a second bundle.
    command_upload_bundles(
        &arweave,
        &format!("{}/*.png", files_dir.path().display()),
        Some(log_dir.path().to_path_buf()),
        &["Collection:test".to_string()],
        1.0,
        150,
        2,
        &UploadMonitor::new(false),
    )
    .await
    .unwrap();
    post_tx.assert_hits_async(2).await;

    let statuses = arweave.read_bundle_statuses(log_dir.path()).await.unwrap();
    assert_eq!(statuses.len(), 2);
    let mut files: Vec<u64> = statuses.iter().map(|s| s.number_of_files).collect();
    files.sort();
    assert_eq!(files, vec![1, 2]);

    command_update_bundle_statuses(&arweave, log_dir.path(), 2)
        .await
        .unwrap();
    let statuses = arweave.read_bundle_statuses(log_dir.path()).await.unwrap();
    assert!(statuses.iter().all(|s| s.status == StatusCode::Pending));
}

#[tokio::test]
async fn test_upload_nfts_writes_metaplex_items() {
    let server = MockServer::start_async().await;
    let post_tx = mock_network(&server).await;

    let nfts_dir = TempDir::new().unwrap();
    for (i, name) in ["0.png", "1.png"].iter().enumerate() {
        std::fs::copy(Path::new("tests/fixtures").join(name), nfts_dir.path().join(name))
            .unwrap();
        std::fs::write(
            nfts_dir.path().join(format!("{}.json", i)),
            json!({"name": format!("NFT #{}", i), "symbol": "ARL"}).to_string(),
        )
        .unwrap();
    }
    let arweave = arweave_for(&server).await;

    command_upload_nfts(
        &arweave,
        &format!("{}/*.png", nfts_dir.path().display()),
        None,
        &[],
        1.0,
        10_000_000,
        2,
        false,
        false,
        &UploadMonitor::new(false),
    )
    .await
    .unwrap();

    // Asset bundle, asset manifest, metadata bundle, metadata manifest.
    post_tx.assert_hits_async(4).await;

    let log_dirs = glob_files(format!("{}/arloader_*", nfts_dir.path().display()));
    assert_eq!(log_dirs.len(), 2);

    let metadata = read_json(&nfts_dir.path().join("0.json"));
    let image = metadata["image"].as_str().unwrap();
    assert!(image.starts_with(&server.base_url()));
    assert_eq!(metadata["properties"]["files"][0]["type"], "image/png");
    assert_eq!(metadata["symbol"], "ARL");

    let items_files: Vec<PathBuf> = log_dirs
        .iter()
        .flat_map(|d| glob_files(format!("{}/metaplex_items_*.json", d.display())))
        .collect();
    assert_eq!(items_files.len(), 1);

    let items = read_json(&items_files[0]);
    assert_eq!(items.as_object().unwrap().len(), 2);
    assert_eq!(items["1"]["name"], "NFT #1");
    assert_eq!(items["1"]["onChain"], false);
    assert!(items["1"]["link"]
        .as_str()
        .unwrap()
        .starts_with(&server.base_url()));
}
