mod helpers;

use std::time::Duration;

use helpers::signed_url_body;
use mockito::Matcher;
use taskgen_api_client::TaskApiClient;
use taskgen_core::{SignedUrlRequest, SignedUrlResponse, TaskgenError};

fn client_for(server: &mockito::Server) -> TaskApiClient {
    TaskApiClient::new(server.url(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_request_signed_url_posts_filename() {
    let mut server = mockito::Server::new_async().await;
    let body = signed_url_body(&server.url(), "tmp1234.jpg", "image/jpeg");
    let mock = server
        .mock("POST", "/uploadSignedUrl")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(serde_json::json!({ "filename": "tmp1234.jpg" })))
        .with_status(201)
        .with_header("content-type", "text/plain; charset=utf-8")
        .with_body(body)
        .create_async()
        .await;

    let client = client_for(&server);
    let signed = client
        .request_signed_url(&SignedUrlRequest::new("tmp1234.jpg", None))
        .await
        .unwrap();

    assert_eq!(signed.gcs_path, "gs://test-bucket/upload/tmp1234.jpg");
    assert_eq!(
        signed.signed_url,
        format!("{}/signed/upload/tmp1234.jpg", server.url())
    );
    assert_eq!(signed.expected_content_type, "image/jpeg");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_request_signed_url_sends_content_type_when_set() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/uploadSignedUrl")
        .match_body(Matcher::Json(serde_json::json!({
            "filename": "photo.jpg",
            "contentType": "application/octet-stream",
        })))
        .with_status(201)
        .with_body(signed_url_body(
            &server.url(),
            "photo.jpg",
            "application/octet-stream",
        ))
        .create_async()
        .await;

    let client = client_for(&server);
    let signed = client
        .request_signed_url(&SignedUrlRequest::new(
            "photo.jpg",
            Some("application/octet-stream".to_string()),
        ))
        .await
        .unwrap();

    assert_eq!(signed.expected_content_type, "application/octet-stream");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_request_signed_url_error_status() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/uploadSignedUrl")
        .with_status(500)
        .with_body("bucket not configured")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .request_signed_url(&SignedUrlRequest::new("a.jpg", None))
        .await
        .unwrap_err();

    match err {
        TaskgenError::SignedUrl(msg) => {
            assert!(msg.contains("500"));
            assert!(msg.contains("bucket not configured"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_request_signed_url_malformed_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/uploadSignedUrl")
        .with_status(201)
        .with_body(r#"{"gcsPath":"gs://b/o"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .request_signed_url(&SignedUrlRequest::new("a.jpg", None))
        .await
        .unwrap_err();

    assert!(matches!(err, TaskgenError::SignedUrl(ref msg) if msg.contains("parse")));
    assert!(err.is_remote());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_to_signed_url_puts_bytes_with_expected_type() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PUT", "/signed/upload/a.png")
        .match_header("content-type", "image/png")
        .match_header("authorization", Matcher::Missing)
        .match_body("image-bytes")
        .with_status(200)
        .create_async()
        .await;

    let signed = SignedUrlResponse {
        gcs_path: "gs://test-bucket/upload/a.png".to_string(),
        signed_url: format!("{}/signed/upload/a.png", server.url()),
        expected_content_type: "image/png".to_string(),
    };

    let client = client_for(&server);
    let status = client
        .upload_to_signed_url(&signed, b"image-bytes".to_vec())
        .await
        .unwrap();

    assert_eq!(status.as_u16(), 200);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_to_signed_url_rejected() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PUT", "/signed/upload/a.jpg")
        .with_status(403)
        .with_body("<Error><Code>SignatureDoesNotMatch</Code></Error>")
        .create_async()
        .await;

    let signed = SignedUrlResponse {
        gcs_path: "gs://test-bucket/upload/a.jpg".to_string(),
        signed_url: format!("{}/signed/upload/a.jpg", server.url()),
        expected_content_type: "image/jpeg".to_string(),
    };

    let client = client_for(&server);
    let err = client
        .upload_to_signed_url(&signed, vec![1, 2, 3])
        .await
        .unwrap_err();

    assert!(matches!(err, TaskgenError::Upload(ref msg) if msg.contains("SignatureDoesNotMatch")));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_ping() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/ping")
        .with_status(200)
        .with_body("pong\n")
        .create_async()
        .await;

    let client = client_for(&server);
    assert_eq!(client.ping().await.unwrap(), "pong");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_ping_error_status_is_task_api_error() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/ping")
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let err = client_for(&server).ping().await.unwrap_err();

    assert!(matches!(err, TaskgenError::TaskApi(ref msg) if msg.contains("503")));
    assert!(err.to_string().starts_with("Task API request failed"));
    assert!(err.is_remote());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_task_api_is_transport_error() {
    // Bind then drop a listener so the port is very likely closed.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let client =
        TaskApiClient::new(format!("http://127.0.0.1:{}", port), Duration::from_secs(2)).unwrap();
    let err = client.ping().await.unwrap_err();

    assert!(matches!(err, TaskgenError::Transport { .. }));
    assert!(err.is_remote());
}
