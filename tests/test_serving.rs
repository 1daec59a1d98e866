//! Integration test: leaf photo upload through the /pest endpoint

use neokrishi::advisory::AdvisoryTables;
use neokrishi::inference::{
    ClassLabelTable, Classifier, ImageClassificationService, InferenceConfig, NormalizedTensor,
};
use neokrishi::server::{create_router, AppState, ServerConfig};
use neokrishi::AgriError;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use image::{ImageFormat, Rgb, RgbImage};
use tower::ServiceExt;

const BOUNDARY: &str = "neokrishi-test-boundary";

/// Returns the same scores for every image and counts invocations.
struct FixedScores {
    scores: Vec<f32>,
    calls: AtomicUsize,
}

impl Classifier for FixedScores {
    fn predict(&self, _tensor: &NormalizedTensor) -> neokrishi::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.scores.clone())
    }

    fn num_classes(&self) -> usize {
        self.scores.len()
    }
}

/// Scores are the mean of each RGB channel, so the dominant colour wins.
struct ChannelMean;

impl Classifier for ChannelMean {
    fn predict(&self, tensor: &NormalizedTensor) -> neokrishi::Result<Vec<f32>> {
        let data = tensor.as_slice().unwrap();
        let mut sums = [0.0f32; 3];
        for pixel in data.chunks_exact(3) {
            for (sum, value) in sums.iter_mut().zip(pixel) {
                *sum += value;
            }
        }
        let pixels = (data.len() / 3) as f32;
        // Slow enough that requests overlap on the blocking pool.
        std::thread::sleep(std::time::Duration::from_millis(20));
        Ok(sums.iter().map(|s| s / pixels).collect())
    }

    fn num_classes(&self) -> usize {
        3
    }
}

/// Fails every call with an internal detail that must not leak.
struct Broken;

impl Classifier for Broken {
    fn predict(&self, _tensor: &NormalizedTensor) -> neokrishi::Result<Vec<f32>> {
        Err(AgriError::Inference(
            "onnx node /features/conv3 produced NaN".to_string(),
        ))
    }

    fn num_classes(&self) -> usize {
        2
    }
}

struct Stalled;

impl Classifier for Stalled {
    fn predict(&self, _tensor: &NormalizedTensor) -> neokrishi::Result<Vec<f32>> {
        std::thread::sleep(std::time::Duration::from_millis(1500));
        Ok(vec![1.0, 0.0])
    }

    fn num_classes(&self) -> usize {
        2
    }
}

fn test_config(max_upload_size: usize) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        model_path: "/tmp/neokrishi-test/unused.onnx".into(),
        labels_path: "/tmp/neokrishi-test/unused.txt".into(),
        tables_path: None,
        max_upload_size,
        inference: InferenceConfig::default().with_max_concurrent(2),
    }
}

fn app_with(
    classifier: Arc<dyn Classifier>,
    labels: &[&str],
    max_upload_size: usize,
) -> (axum::Router, Arc<AppState>) {
    app_with_config(classifier, labels, test_config(max_upload_size))
}

fn app_with_config(
    classifier: Arc<dyn Classifier>,
    labels: &[&str],
    config: ServerConfig,
) -> (axum::Router, Arc<AppState>) {
    let labels = ClassLabelTable::new(labels.iter().copied()).unwrap();
    let service =
        ImageClassificationService::new(config.inference.clone(), classifier, labels).unwrap();
    let state = Arc::new(AppState::new(config.clone(), service, AdvisoryTables::default()));
    (create_router(Arc::clone(&state), &config), state)
}

fn solid_image(color: [u8; 3], format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::from_pixel(48, 32, Rgb(color))
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

fn multipart_request(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/pest")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Successful classification
// ============================================================================

#[tokio::test]
async fn test_pest_detection_maps_argmax_to_label() {
    let classifier = Arc::new(FixedScores {
        scores: vec![0.1, 0.87, 0.03],
        calls: AtomicUsize::new(0),
    });
    let (app, _) = app_with(classifier.clone(), &["A", "B", "C"], 1024 * 1024);

    let image = solid_image([30, 140, 40], ImageFormat::Png);
    let response = app
        .oneshot(multipart_request("file", "leaf.png", "image/png", &image))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["filename"], "leaf.png");
    assert_eq!(json["disease"], "B");
    assert_eq!(json["confidence"], "87.00%");
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_pest_detection_trusts_content_over_declared_type() {
    let classifier = Arc::new(FixedScores {
        scores: vec![0.6, 0.4],
        calls: AtomicUsize::new(0),
    });
    let (app, _) = app_with(classifier, &["Early Blight", "Healthy"], 1024 * 1024);

    // JPEG bytes declared as PNG
    let image = solid_image([120, 90, 30], ImageFormat::Jpeg);
    let response = app
        .oneshot(multipart_request("file", "photo.png", "image/png", &image))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["disease"], "Early Blight");
    assert_eq!(json["confidence"], "60.00%");
}

// ============================================================================
// Rejected uploads
// ============================================================================

#[tokio::test]
async fn test_corrupt_image_never_reaches_classifier() {
    let classifier = Arc::new(FixedScores {
        scores: vec![0.5, 0.5],
        calls: AtomicUsize::new(0),
    });
    let (app, state) = app_with(classifier.clone(), &["A", "B"], 1024 * 1024);

    let response = app
        .oneshot(multipart_request(
            "file",
            "notes.txt",
            "image/jpeg",
            b"this is not an image at all",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error"], true);
    assert!(json["message"].as_str().unwrap().starts_with("Invalid image"));
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    assert_eq!(state.classifier.stats().invalid_images, 1);
}

#[tokio::test]
async fn test_missing_file_field() {
    let classifier = Arc::new(FixedScores {
        scores: vec![0.5, 0.5],
        calls: AtomicUsize::new(0),
    });
    let (app, _) = app_with(classifier.clone(), &["A", "B"], 1024 * 1024);

    let image = solid_image([0, 200, 0], ImageFormat::Png);
    let response = app
        .oneshot(multipart_request("photo", "leaf.png", "image/png", &image))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert!(json["message"].as_str().unwrap().contains("file"));
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let classifier = Arc::new(FixedScores {
        scores: vec![0.5, 0.5],
        calls: AtomicUsize::new(0),
    });
    let (app, _) = app_with(classifier.clone(), &["A", "B"], 64 * 1024);

    let payload = vec![0u8; 256 * 1024];
    let response = app
        .oneshot(multipart_request("file", "huge.png", "image/png", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_non_multipart_body_gets_json_error() {
    let classifier = Arc::new(FixedScores {
        scores: vec![0.5, 0.5],
        calls: AtomicUsize::new(0),
    });
    let (app, _) = app_with(classifier.clone(), &["A", "B"], 1024 * 1024);

    let request = Request::builder()
        .method("POST")
        .uri("/pest")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"file": "leaf.png"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()["content-type"],
        "application/json"
    );

    let json = json_body(response).await;
    assert_eq!(json["error"], true);
    assert!(json["message"].is_string());
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_classifier_failure_hides_details() {
    let (app, state) = app_with(Arc::new(Broken), &["A", "B"], 1024 * 1024);

    let image = solid_image([40, 160, 40], ImageFormat::Png);
    let response = app
        .oneshot(multipart_request("file", "leaf.png", "image/png", &image))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = json_body(response).await;
    assert_eq!(json["error"], true);
    assert_eq!(
        json["message"],
        "Classification failed. Check server logs for details."
    );
    assert!(!json.to_string().contains("conv3"));
    assert_eq!(state.classifier.stats().inference_errors, 1);
}

#[tokio::test]
async fn test_slow_classifier_returns_gateway_timeout() {
    let mut config = test_config(1024 * 1024);
    config.inference = config.inference.clone().with_timeout_secs(1);
    let (app, state) = app_with_config(Arc::new(Stalled), &["A", "B"], config);

    let image = solid_image([40, 160, 40], ImageFormat::Png);
    let response = app
        .oneshot(multipart_request("file", "leaf.png", "image/png", &image))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

    let json = json_body(response).await;
    assert_eq!(json["error"], true);
    assert_eq!(state.classifier.stats().timeouts, 1);
}

#[tokio::test]
async fn test_pest_requires_post() {
    let (app, _) = app_with(Arc::new(ChannelMean), &["Red", "Green", "Blue"], 1024 * 1024);
    let response = app
        .oneshot(Request::builder().uri("/pest").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// ============================================================================
// Concurrency and stats
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_uploads_are_isolated() {
    let (app, state) = app_with(Arc::new(ChannelMean), &["Red", "Green", "Blue"], 1024 * 1024);

    let cases = [
        ([230u8, 20, 20], "Red"),
        ([20, 230, 20], "Green"),
        ([20, 20, 230], "Blue"),
    ];

    let mut handles = Vec::new();
    for round in 0..4 {
        for (color, expected) in cases {
            let app = app.clone();
            let filename = format!("{expected}-{round}.png");
            handles.push(tokio::spawn(async move {
                let image = solid_image(color, ImageFormat::Png);
                let response = app
                    .oneshot(multipart_request("file", &filename, "image/png", &image))
                    .await
                    .unwrap();
                assert_eq!(response.status(), StatusCode::OK);
                let json = json_body(response).await;
                assert_eq!(json["filename"], filename.as_str());
                assert_eq!(json["disease"], expected);
            }));
        }
    }

    for handle in handles {
        handle.await.unwrap();
    }

    let stats = state.classifier.stats();
    assert_eq!(stats.successes, 12);
    assert_eq!(stats.total_requests, 12);
}

#[tokio::test]
async fn test_pest_stats_endpoint() {
    let (app, _) = app_with(Arc::new(ChannelMean), &["Red", "Green", "Blue"], 1024 * 1024);

    let image = solid_image([250, 0, 0], ImageFormat::Png);
    let response = app
        .clone()
        .oneshot(multipart_request("file", "red.png", "image/png", &image))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(multipart_request("file", "bad.png", "image/png", b"garbage"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(Request::builder().uri("/pest/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["classes"], 3);
    assert_eq!(json["stats"]["successes"], 1);
    assert_eq!(json["stats"]["invalid_images"], 1);
    assert_eq!(json["stats"]["total_requests"], 2);
}
