//! Local stand-in for the OpenAI Images API, shared by unit and integration tests.

#![allow(clippy::expect_used)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose;
use image::{ImageFormat, Rgb, RgbImage};
use serde_json::{Value, json};
use url::Url;

use crate::cli::GenerationOptions;
use crate::prompt::PromptMode;

/// The only key the mock accepts.
pub const VALID_KEY: &str = "sk-test-valid";

/// How long the `Slow` payload stalls before answering.
pub const SLOW_ANSWER: Duration = Duration::from_secs(3);

/// What the mock answers to an authorized generation request.
#[derive(Clone, Copy, Debug)]
pub enum MockPayload {
    /// URL answer, URL serves a PNG
    Png,
    /// Inline b64_json answer
    Base64,
    /// URL answer, URL serves HTML
    NotAnImage,
    /// URL answer, URL is a 404
    Gone,
    /// Answers only after [`SLOW_ANSWER`]
    Slow,
    /// `{"data": []}`
    EmptyData,
    /// 200 OK with an `{"error": {...}}` body
    ErrorBody200,
    /// Inline b64_json that is not base64
    BadBase64,
}

#[derive(Clone)]
struct MockState {
    origin: String,
    payload: MockPayload,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Value>>>,
}

/// A running mock and the options that point a client at it.
pub struct MockImageApi {
    /// Generation options aimed at the mock, with a short timeout
    pub options: GenerationOptions,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl MockImageApi {
    /// Number of generation requests received, authorized or not.
    pub fn generation_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// JSON bodies of every generation request received.
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().expect("requests lock").clone()
    }
}

/// A 4x4 PNG in a blue that names as "blue".
pub fn png_bytes() -> Vec<u8> {
    let img = RgbImage::from_pixel(4, 4, Rgb([30, 60, 255]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    buf
}

async fn images_handler(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    state.requests.lock().expect("requests lock").push(body);

    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {VALID_KEY}"));
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": {
                    "message": "Incorrect API key provided: sk-wrong.",
                    "type": "invalid_request_error",
                    "code": "invalid_api_key"
                }
            })),
        )
            .into_response();
    }

    let item = match state.payload {
        MockPayload::Base64 => json!({"b64_json": general_purpose::STANDARD.encode(png_bytes())}),
        MockPayload::BadBase64 => json!({"b64_json": "not*base64!"}),
        MockPayload::EmptyData => return Json(json!({"created": 0, "data": []})).into_response(),
        MockPayload::ErrorBody200 => {
            return Json(json!({
                "error": {"message": "Your request was rejected by the content policy."}
            }))
            .into_response();
        }
        MockPayload::Slow => {
            tokio::time::sleep(SLOW_ANSWER).await;
            json!({"url": format!("{}/files/mandala.png", state.origin)})
        }
        MockPayload::Png | MockPayload::NotAnImage | MockPayload::Gone => json!({
            "url": format!("{}/files/mandala.png", state.origin),
            "revised_prompt": "A revised mandala"
        }),
    };
    Json(json!({"created": 0, "data": [item]})).into_response()
}

async fn file_handler(State(state): State<MockState>) -> Response {
    match state.payload {
        MockPayload::NotAnImage => {
            ([(CONTENT_TYPE, "text/html")], "<html>not an image</html>").into_response()
        }
        MockPayload::Gone => StatusCode::NOT_FOUND.into_response(),
        _ => ([(CONTENT_TYPE, "image/png")], png_bytes()).into_response(),
    }
}

/// Starts a mock on an ephemeral port of 127.0.0.1.
pub async fn spawn_mock_api(payload: MockPayload) -> MockImageApi {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock api");
    let origin = format!("http://{}", listener.local_addr().expect("local addr"));
    let calls = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));

    let app = Router::new()
        .route("/v1/images/generations", post(images_handler))
        .route("/files/mandala.png", get(file_handler))
        .with_state(MockState {
            origin: origin.clone(),
            payload,
            calls: calls.clone(),
            requests: requests.clone(),
        });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockImageApi {
        options: GenerationOptions {
            api_base: Url::parse(&format!("{origin}/v1/")).expect("mock url"),
            image_model: "dall-e-3".to_string(),
            image_size: "1024x1024".to_string(),
            image_quality: "standard".to_string(),
            timeout_secs: 5,
            prompt_mode: PromptMode::Emphatic,
        },
        calls,
        requests,
    }
}
