use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

fn router() -> axum::Router {
    api::routes::build_router(&codec_core::config::Config::default())
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn healthz_returns_ok() {
    let app = router();
    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn rle_round_trips_through_compress_and_decompress() {
    let app = router();
    let compress_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/compression/rle/compress")
                .body(Body::from("WWWWBBBWBB"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(compress_response.status(), StatusCode::OK);
    let compressed = body_json(compress_response).await;
    let compressed_bytes = BASE64.decode(compressed["data"].as_str().unwrap()).unwrap();
    assert_eq!(compressed_bytes, b"4W3B1W2B");

    let decompress_response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/compression/rle/decompress")
                .body(Body::from(compressed_bytes))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(decompress_response.status(), StatusCode::OK);
    let decompressed = body_json(decompress_response).await;
    let decompressed_bytes = BASE64.decode(decompressed["data"].as_str().unwrap()).unwrap();
    assert_eq!(decompressed_bytes, b"WWWWBBBWBB");
}

#[tokio::test]
async fn huffman_compress_with_details_includes_codes() {
    let app = router();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/compression/huffman/compress?details=1")
                .body(Body::from("mississippi"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let envelope = body_json(response).await;
    assert!(envelope["details"]["codes"].as_array().unwrap().len() > 0);
}

#[tokio::test]
async fn unknown_codec_is_a_bad_request() {
    let app = router();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/compression/bz2/compress")
                .body(Body::from("hello"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_arithmetic_frame_is_a_bad_request() {
    let app = router();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/compression/arithmetic/decompress")
                .body(Body::from(vec![0u8; 2]))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rsa_generate_keys_returns_a_usable_key_pair() {
    let app = router();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/rsa/generate-keys?bits=256")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let envelope = body_json(response).await;
    assert!(envelope["public"].as_str().unwrap().len() > 0);
    assert!(envelope["private"].as_str().unwrap().len() > 0);
}
