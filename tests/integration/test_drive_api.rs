use chores::drive::{convert_to_doc, DriveApi, DriveClient, DriveError, GOOGLE_DOC_MIME};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

fn client_for(server: &MockServer) -> DriveClient {
    DriveClient::new(&server.uri(), &server.uri(), TOKEN.to_string())
        .expect("invalid mock server URL")
}

async fn mount_conversion_mocks(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/drive/v3/files/file-1"))
        .and(query_param("fields", "name,parents"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "weekly-report.html",
            "parents": ["folder-9"]
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files/file-1"))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Weekly</h1>"))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_convert_to_doc_gets_downloads_then_uploads() {
    let mock_server = MockServer::start().await;
    mount_conversion_mocks(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .and(query_param("uploadType", "multipart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "doc-1",
            "name": "weekly-report",
            "webViewLink": "https://docs.google.com/document/d/doc-1/edit"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let created = convert_to_doc(&client, "file-1", None).await.unwrap();

    assert_eq!(created.id, "doc-1");
    assert_eq!(created.name, "weekly-report");
    assert_eq!(
        created.web_view_link.as_deref(),
        Some("https://docs.google.com/document/d/doc-1/edit")
    );

    let requests = mock_server.received_requests().await.unwrap();
    let order: Vec<_> = requests
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect();
    assert_eq!(
        order,
        vec![
            "GET /drive/v3/files/file-1",
            "GET /drive/v3/files/file-1",
            "POST /upload/drive/v3/files",
        ]
    );
    assert!(requests[1].url.query().unwrap_or_default().contains("alt=media"));

    let upload = &requests[2];
    let content_type = upload
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("multipart/related; boundary=chores-"));

    let body = String::from_utf8(upload.body.clone()).unwrap();
    let metadata_line = body
        .lines()
        .find(|line| line.starts_with('{'))
        .expect("metadata part");
    let metadata: Value = serde_json::from_str(metadata_line).unwrap();
    assert_eq!(
        metadata,
        json!({"name": "weekly-report", "mimeType": GOOGLE_DOC_MIME, "parents": ["folder-9"]})
    );
    assert!(body.contains("Content-Type: text/html\r\n\r\n<h1>Weekly</h1>\r\n"));
}

#[tokio::test]
async fn test_failed_upload_surfaces_server_error() {
    let mock_server = MockServer::start().await;
    mount_conversion_mocks(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = convert_to_doc(&client, "file-1", None).await.unwrap_err();

    match err {
        DriveError::Server { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "backend error");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_rejected_token_is_auth_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files/file-1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.file_metadata("file-1").await.unwrap_err();
    assert!(matches!(err, DriveError::Auth(_)));
}

#[tokio::test]
async fn test_latest_html_queries_newest_first() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param(
            "q",
            "'folder-9' in parents and mimeType='text/html'",
        ))
        .and(query_param("orderBy", "createdTime desc"))
        .and(query_param("pageSize", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{"id": "newest", "name": "latest.html"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let latest = client.latest_html("folder-9").await.unwrap().unwrap();

    assert_eq!(latest.id, "newest");
    assert_eq!(latest.name, "latest.html");
}

#[tokio::test]
async fn test_latest_html_empty_folder() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"files": []})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert!(client.latest_html("empty").await.unwrap().is_none());
}
