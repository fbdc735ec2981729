//! API integration tests for image retrieval and error handling.
//!
//! Tests verify:
//! - Retrieval with and without resizing
//! - Token scoping and traversal attempts
//! - HTTP response codes, headers and plain-text error bodies

use axum::http::StatusCode;
use http_body_util::BodyExt;
use tower::ServiceExt;

use super::test_utils::{
    create_gif_header, create_jpeg, create_png, dimensions_of, get, is_valid_jpeg, is_valid_png,
    TestServer,
};

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn body_text(response: axum::response::Response) -> String {
    String::from_utf8(body_bytes(response).await.to_vec()).unwrap()
}

// =============================================================================
// Successful Retrieval
// =============================================================================

#[tokio::test]
async fn test_resize_jpeg() {
    let server = TestServer::new();
    server.put_file("abc", "receipt.jpg", &create_jpeg(100, 100));

    let response = server
        .router()
        .oneshot(get("/receipts/receipt.jpg?width=50&height=50", Some("abc")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/jpeg"
    );
    assert_eq!(response.headers().get("x-image-width").unwrap(), "50");
    assert_eq!(response.headers().get("x-image-height").unwrap(), "50");
    assert_eq!(response.headers().get("x-image-resized").unwrap(), "true");

    let body = body_bytes(response).await;
    assert!(is_valid_jpeg(&body));
    assert_eq!(dimensions_of(&body), (50, 50));
}

#[tokio::test]
async fn test_no_params_serves_original_size() {
    let server = TestServer::new();
    server.put_file("abc", "receipt.jpg", &create_jpeg(64, 48));

    let response = server
        .router()
        .oneshot(get("/receipts/receipt.jpg", Some("abc")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-image-resized").unwrap(), "false");
    assert_eq!(dimensions_of(&body_bytes(response).await), (64, 48));
}

#[tokio::test]
async fn test_partial_params_match_unresized_output() {
    let server = TestServer::new();
    server.put_file("abc", "receipt.jpg", &create_jpeg(80, 60));

    let plain = server
        .router()
        .oneshot(get("/receipts/receipt.jpg", Some("abc")))
        .await
        .unwrap();
    let plain = body_bytes(plain).await;

    for uri in [
        "/receipts/receipt.jpg?width=50",
        "/receipts/receipt.jpg?height=50",
        "/receipts/receipt.jpg?width=50&height=",
    ] {
        let response = server.router().oneshot(get(uri, Some("abc"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        assert_eq!(body_bytes(response).await, plain, "{}", uri);
    }
}

#[tokio::test]
async fn test_zero_width_keeps_aspect_ratio() {
    let server = TestServer::new();
    server.put_file("abc", "receipt.jpg", &create_jpeg(100, 50));

    let response = server
        .router()
        .oneshot(get("/receipts/receipt.jpg?width=0&height=25", Some("abc")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-image-width").unwrap(), "50");
    assert_eq!(response.headers().get("x-image-height").unwrap(), "25");
    assert_eq!(dimensions_of(&body_bytes(response).await), (50, 25));
}

#[tokio::test]
async fn test_png_stays_png() {
    let server = TestServer::new();
    server.put_file("abc", "scan.png", &create_png(40, 20));

    let response = server
        .router()
        .oneshot(get("/receipts/scan.png?width=120&height=30", Some("abc")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/png");

    let body = body_bytes(response).await;
    assert!(is_valid_png(&body));
    assert_eq!(dimensions_of(&body), (120, 30));
}

#[tokio::test]
async fn test_format_detected_from_content() {
    let server = TestServer::new();
    server.put_file("abc", "actually-a-jpeg.png", &create_jpeg(10, 10));

    let response = server
        .router()
        .oneshot(get("/receipts/actually-a-jpeg.png", Some("abc")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/jpeg"
    );
}

#[tokio::test]
async fn test_upload_url_form_is_served() {
    let server = TestServer::new();
    server.put_file("abc", "receipt.jpg", &create_jpeg(30, 30));

    let response = server
        .router()
        .oneshot(get("/receipts/abc/receipt.jpg", Some("abc")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Authorization and Scoping
// =============================================================================

#[tokio::test]
async fn test_missing_token() {
    let server = TestServer::new();
    server.put_file("abc", "receipt.jpg", &create_jpeg(10, 10));

    let response = server
        .router()
        .oneshot(get("/receipts/receipt.jpg", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, "Unauthorized");
}

#[tokio::test]
async fn test_empty_token() {
    let server = TestServer::new();

    let response = server
        .router()
        .oneshot(get("/receipts/receipt.jpg", Some("")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_other_users_files_invisible() {
    let server = TestServer::new();
    server.put_file("alice", "receipt.jpg", &create_jpeg(10, 10));

    let response = server
        .router()
        .oneshot(get("/receipts/receipt.jpg", Some("bob")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_path_like_token_rejected() {
    let server = TestServer::new();

    let response = server
        .router()
        .oneshot(get("/receipts/receipt.jpg", Some("../alice")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_traversal_never_escapes_user_dir() {
    let server = TestServer::new();
    // A file outside every user directory
    std::fs::write(server.root().join("secret.jpg"), create_jpeg(10, 10)).unwrap();

    for uri in [
        "/receipts/../../etc/passwd",
        "/receipts/../secret.jpg",
        "/receipts/%2e%2e",
        "/receipts/..%2Fsecret.jpg",
    ] {
        let response = server.router().oneshot(get(uri, Some("abc"))).await.unwrap();
        let status = response.status();
        assert!(
            status == StatusCode::BAD_REQUEST || status == StatusCode::NOT_FOUND,
            "{} returned {}",
            uri,
            status
        );
    }
}

// =============================================================================
// Error Cases
// =============================================================================

#[tokio::test]
async fn test_missing_file() {
    let server = TestServer::new();

    let response = server
        .router()
        .oneshot(get("/receipts/nope.jpg", Some("abc")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("not found"));
}

#[tokio::test]
async fn test_missing_file_checked_before_dimensions() {
    let server = TestServer::new();

    let response = server
        .router()
        .oneshot(get("/receipts/nope.jpg?width=abc&height=10", Some("abc")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_width() {
    let server = TestServer::new();
    server.put_file("abc", "receipt.jpg", &create_jpeg(10, 10));

    for uri in [
        "/receipts/receipt.jpg?width=abc&height=50",
        "/receipts/receipt.jpg?width=abc",
        "/receipts/receipt.jpg?width=1.5&height=10",
        "/receipts/receipt.jpg?width=10&height=-1",
    ] {
        let response = server.router().oneshot(get(uri, Some("abc"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_dimension_above_limit() {
    let server = TestServer::new();
    server.put_file("abc", "receipt.jpg", &create_jpeg(10, 10));

    let response = server
        .router()
        .oneshot(get(
            "/receipts/receipt.jpg?width=100000&height=10",
            Some("abc"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unsupported_format() {
    let server = TestServer::new();
    server.put_file("abc", "anim.gif", &create_gif_header());

    let response = server
        .router()
        .oneshot(get("/receipts/anim.gif", Some("abc")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_corrupt_file() {
    let server = TestServer::new();
    server.put_file("abc", "notes.jpg", b"definitely not an image");

    let response = server
        .router()
        .oneshot(get("/receipts/notes.jpg", Some("abc")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
}

#[tokio::test]
async fn test_directory_is_not_found() {
    let server = TestServer::new();
    std::fs::create_dir_all(server.root().join("abc").join("folder")).unwrap();

    let response = server
        .router()
        .oneshot(get("/receipts/folder", Some("abc")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let server = TestServer::new();

    let response = server.router().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
}
