//! Bulk upload against a mock server

use mockito::{Matcher, Server};
use std::fs;
use std::path::Path;
use xyzt_ergonomic::{BatchMode, BulkUploader, Error, XyztClient};

fn create_mock_client(mock_server: &Server) -> XyztClient {
    XyztClient::builder()
        .username("api-user@example.com")
        .password("api-password")
        .dataset_id("ds1")
        .base_url(mock_server.url())
        .build()
}

fn write(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, [0x1f, 0x8b, 0x08, 0x00]).unwrap();
}

/// Three `.csv.gz` files and two that must be ignored
fn fixture_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "vessels_2024_01.csv.gz");
    write(dir.path(), "q1/vessels_2024_02.csv.gz");
    write(dir.path(), "q1/march/vessels_2024_03.csv.gz");
    write(dir.path(), "README.txt");
    write(dir.path(), "q1/vessels_2024_02.csv");
    dir
}

#[tokio::test]
async fn test_uploads_only_matching_files() {
    let mut server = Server::new_async().await;
    let dir = fixture_tree();

    let tokens = server
        .mock("POST", "/tokens")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jwtToken": "abc"}"#)
        .expect(3)
        .create_async()
        .await;
    let uploads = server
        .mock("POST", "/datasets/ds1/data/upload")
        .match_header("authorization", "Bearer abc")
        .with_status(200)
        .expect(3)
        .create_async()
        .await;

    let client = create_mock_client(&server);
    let report = BulkUploader::builder()
        .root(dir.path())
        .build()
        .run(&client)
        .await
        .unwrap();

    tokens.assert_async().await;
    uploads.assert_async().await;
    assert!(report.is_success());

    let mut names: Vec<_> = report
        .uploaded
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "vessels_2024_01.csv.gz",
            "vessels_2024_02.csv.gz",
            "vessels_2024_03.csv.gz"
        ]
    );
}

#[tokio::test]
async fn test_failed_authentication_skips_file_and_continues() {
    let mut server = Server::new_async().await;
    let dir = fixture_tree();

    let tokens = server
        .mock("POST", "/tokens")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "bad credentials"}"#)
        .expect(3)
        .create_async()
        .await;
    let uploads = server
        .mock("POST", "/datasets/ds1/data/upload")
        .expect(0)
        .create_async()
        .await;

    let client = create_mock_client(&server);
    let report = BulkUploader::builder()
        .root(dir.path())
        .build()
        .run(&client)
        .await
        .unwrap();

    tokens.assert_async().await;
    uploads.assert_async().await;
    assert!(report.uploaded.is_empty());
    assert_eq!(report.failed.len(), 3);
    assert!(report
        .failed
        .iter()
        .all(|f| matches!(f.error, Error::Authentication { status: 401, .. })));
}

#[tokio::test]
async fn test_token_gateway_page_counts_as_authentication_failure() {
    let mut server = Server::new_async().await;
    let dir = fixture_tree();

    let _tokens = server
        .mock("POST", "/tokens")
        .with_status(403)
        .with_header("content-type", "text/html")
        .with_body("<html>Forbidden</html>")
        .expect(3)
        .create_async()
        .await;

    let client = create_mock_client(&server);
    let report = BulkUploader::builder()
        .root(dir.path())
        .build()
        .run(&client)
        .await
        .unwrap();

    assert_eq!(report.failed.len(), 3);
    for failure in &report.failed {
        match &failure.error {
            Error::Authentication { status, message } => {
                assert_eq!(*status, 403);
                assert!(message.contains("Forbidden"));
            }
            other => panic!("expected an authentication error, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_failed_upload_does_not_stop_the_run() {
    let mut server = Server::new_async().await;
    let dir = fixture_tree();

    let _tokens = server
        .mock("POST", "/tokens")
        .with_status(200)
        .with_body(r#"{"jwtToken": "abc"}"#)
        .expect(3)
        .create_async()
        .await;
    let _rejected = server
        .mock("POST", "/datasets/ds1/data/upload")
        .match_body(Matcher::Regex(r#"filename="vessels_2024_02.csv.gz""#.to_string()))
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "invalid timestamp"}"#)
        .create_async()
        .await;
    let _accepted = server
        .mock("POST", "/datasets/ds1/data/upload")
        .match_body(Matcher::Regex(r#"filename="vessels_2024_0[13].csv.gz""#.to_string()))
        .with_status(200)
        .expect(2)
        .create_async()
        .await;

    let client = create_mock_client(&server);
    let report = BulkUploader::builder()
        .root(dir.path())
        .build()
        .run(&client)
        .await
        .unwrap();

    assert_eq!(report.uploaded.len(), 2);
    assert_eq!(report.failed.len(), 1);
    let failure = &report.failed[0];
    assert!(failure.path.ends_with("q1/vessels_2024_02.csv.gz"));
    assert!(matches!(failure.error, Error::Upload { status: 400, .. }));
}

#[tokio::test]
async fn test_batch_by_top_level_directory() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "root_file.csv.gz");
    write(dir.path(), "subdir one/a.csv.gz");
    write(dir.path(), "subdir one/nested/b.csv.gz");

    let _tokens = server
        .mock("POST", "/tokens")
        .with_status(200)
        .with_body(r#"{"jwtToken": "abc"}"#)
        .expect(3)
        .create_async()
        .await;
    let batched = server
        .mock("POST", "/datasets/ds1/data/upload")
        .match_query(Matcher::Exact("batch=subdir_one".to_string()))
        .with_status(200)
        .expect(2)
        .create_async()
        .await;
    let unbatched = server
        .mock("POST", "/datasets/ds1/data/upload")
        .match_body(Matcher::Regex(r#"filename="root_file.csv.gz""#.to_string()))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let client = create_mock_client(&server);
    let report = BulkUploader::builder()
        .root(dir.path())
        .batch_mode(BatchMode::TopLevelDirectory)
        .build()
        .run(&client)
        .await
        .unwrap();

    batched.assert_async().await;
    unbatched.assert_async().await;
    assert_eq!(report.uploaded.len(), 3);
}

#[tokio::test]
async fn test_missing_root_fails_the_run() {
    let server = Server::new_async().await;
    let client = create_mock_client(&server);

    let result = BulkUploader::builder()
        .root("/definitely/not/a/real/dir")
        .build()
        .run(&client)
        .await;

    assert!(matches!(result, Err(Error::InvalidInput(_))));
}
