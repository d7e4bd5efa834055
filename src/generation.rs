//! Client for the OpenAI Images API.
//!
//! One generation is two requests: `POST images/generations`, then a `GET` of
//! the URL it hands back. Both share one timeout and neither is retried.

use std::fmt;
use std::io::Cursor;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose;
use image::{DynamicImage, ImageFormat};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::cli::GenerationOptions;

/// Request body for POST /v1/images/generations
/// Docs: https://platform.openai.com/docs/api-reference/images
#[derive(Serialize, Debug)]
struct ImagesGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    quality: &'a str,
}

#[derive(Deserialize, Debug)]
struct ImagesGenerateResponse {
    #[serde(default)]
    data: Vec<ImageData>,
    #[serde(default)]
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize, Debug)]
struct ImageData {
    url: Option<String>,
    b64_json: Option<String>,
    revised_prompt: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize, Debug)]
struct ApiErrorDetail {
    message: String,
}

/// Anything that can go wrong between sending the prompt and holding a decoded image.
#[derive(Debug)]
pub enum GenerationError {
    /// No API key was supplied
    MissingCredential,
    /// The configured API base could not be turned into an endpoint
    InvalidEndpoint(url::ParseError),
    /// Network or protocol failure talking to `stage`
    Request {
        /// Which call failed
        stage: &'static str,
        /// Underlying client error
        source: reqwest::Error,
    },
    /// The API answered with an error (bad key, quota, content policy...)
    Api {
        /// HTTP status of the answer
        status: StatusCode,
        /// Message reported by the API, or the raw body
        message: String,
    },
    /// The API answer was not the JSON we expected
    InvalidResponse(serde_json::Error),
    /// The API answered without any image
    NoImage,
    /// Fetching the image URL gave a non-success status
    Download(StatusCode),
    /// Inline image data was not valid base64
    Base64(base64::DecodeError),
    /// The image bytes could not be decoded
    Decode(image::ImageError),
    /// The image could not be re-encoded as PNG
    Encode(image::ImageError),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredential => write!(f, "No OpenAI API key provided"),
            Self::InvalidEndpoint(err) => write!(f, "Invalid API base URL: {err}"),
            Self::Request { stage, source } => write!(f, "Request to {stage} failed: {source}"),
            Self::Api { status, message } => write!(f, "OpenAI Images API error {status}: {message}"),
            Self::InvalidResponse(err) => {
                write!(f, "Failed to parse /images/generations JSON: {err}")
            }
            Self::NoImage => write!(f, "No image data returned"),
            Self::Download(status) => write!(f, "Image download error {status}"),
            Self::Base64(err) => write!(f, "Failed to base64-decode image: {err}"),
            Self::Decode(err) => write!(f, "Downloaded content is not a valid image: {err}"),
            Self::Encode(err) => write!(f, "Failed to encode image as PNG: {err}"),
        }
    }
}

impl std::error::Error for GenerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidEndpoint(err) => Some(err),
            Self::Request { source, .. } => Some(source),
            Self::InvalidResponse(err) => Some(err),
            Self::Base64(err) => Some(err),
            Self::Decode(err) | Self::Encode(err) => Some(err),
            Self::MissingCredential | Self::Api { .. } | Self::NoImage | Self::Download(_) => None,
        }
    }
}

/// Where the image bytes came from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ImageSource {
    /// Downloaded from this URL
    Url(String),
    /// Sent inline as base64 in the API answer
    Inline,
}

impl ImageSource {
    /// The source URL, when there is one.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::Inline => None,
        }
    }
}

/// A decoded image fresh from the API.
#[derive(Debug)]
pub struct GeneratedImage {
    /// The decoded bitmap
    pub image: DynamicImage,
    /// Where it was fetched from
    pub source: ImageSource,
    /// The prompt as rewritten by the model, when it reports one
    pub revised_prompt: Option<String>,
}

impl GeneratedImage {
    /// Encodes the image as PNG for download.
    pub fn to_png(&self) -> Result<Vec<u8>, GenerationError> {
        let mut buf = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(GenerationError::Encode)?;
        Ok(buf)
    }
}

/// Talks to the Images API. Cheap to clone; clones share a connection pool.
#[derive(Clone, Debug)]
pub struct GenerationClient {
    http: reqwest::Client,
    endpoint: Url,
    model: String,
    size: String,
    quality: String,
}

impl GenerationClient {
    /// Builds a client with the configured endpoint, model and timeout.
    pub fn new(options: &GenerationOptions) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|source| GenerationError::Request {
                stage: "client setup",
                source,
            })?;
        Ok(Self {
            http,
            endpoint: images_endpoint(&options.api_base)?,
            model: options.image_model.clone(),
            size: options.image_size.clone(),
            quality: options.image_quality.clone(),
        })
    }

    /// Generates one image for `prompt`, downloads it and decodes it.
    pub async fn generate(
        &self,
        prompt: &str,
        credential: &str,
    ) -> Result<GeneratedImage, GenerationError> {
        if credential.trim().is_empty() {
            return Err(GenerationError::MissingCredential);
        }

        let req_body = ImagesGenerateRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: &self.size,
            quality: &self.quality,
        };

        info!("Requesting image from {} with model {}", self.endpoint, self.model);
        let resp = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(credential.trim())
            .json(&req_body)
            .send()
            .await
            .map_err(|source| GenerationError::Request {
                stage: "/images/generations",
                source,
            })?;

        let status = resp.status();
        let resp_bytes = resp.bytes().await.map_err(|source| GenerationError::Request {
            stage: "/images/generations",
            source,
        })?;
        if !status.is_success() {
            return Err(GenerationError::Api {
                status,
                message: api_error_message(&resp_bytes),
            });
        }

        let parsed: ImagesGenerateResponse =
            serde_json::from_slice(&resp_bytes).map_err(GenerationError::InvalidResponse)?;
        if let Some(err) = parsed.error {
            return Err(GenerationError::Api {
                status,
                message: err.message,
            });
        }

        let first = parsed
            .data
            .into_iter()
            .next()
            .ok_or(GenerationError::NoImage)?;

        if let Some(revised_prompt) = &first.revised_prompt {
            debug!("Revised prompt from OpenAI: {revised_prompt}");
        }

        let (bytes, source) = if let Some(url) = first.url {
            (self.download(&url).await?, ImageSource::Url(url))
        } else if let Some(b64_json) = first.b64_json {
            let bytes = general_purpose::STANDARD
                .decode(b64_json)
                .map_err(GenerationError::Base64)?;
            (bytes, ImageSource::Inline)
        } else {
            return Err(GenerationError::NoImage);
        };

        let image = image::load_from_memory(&bytes).map_err(GenerationError::Decode)?;
        debug!("Decoded {}x{} image", image.width(), image.height());
        Ok(GeneratedImage {
            image,
            source,
            revised_prompt: first.revised_prompt,
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, GenerationError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| GenerationError::Request {
                stage: "image download",
                source,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(GenerationError::Download(status));
        }
        let bytes = resp.bytes().await.map_err(|source| GenerationError::Request {
            stage: "image download",
            source,
        })?;
        Ok(bytes.to_vec())
    }
}

/// `images/generations` under `base`, whether or not `base` ends in a slash.
fn images_endpoint(base: &Url) -> Result<Url, GenerationError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("images/generations")
        .map_err(GenerationError::InvalidEndpoint)
}

/// Reduces `{"error": {"message": ...}}` to its message, else the raw body.
fn api_error_message(body: &[u8]) -> String {
    serde_json::from_slice::<ApiErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockPayload, VALID_KEY, spawn_mock_api};

    #[test]
    fn endpoint_joins_with_or_without_slash() {
        for base in ["https://api.openai.com/v1", "https://api.openai.com/v1/"] {
            let base = Url::parse(base).expect("valid url");
            assert_eq!(
                images_endpoint(&base).expect("endpoint").as_str(),
                "https://api.openai.com/v1/images/generations"
            );
        }
    }

    #[test]
    fn api_error_message_prefers_structured_body() {
        let body = br#"{"error": {"message": "Billing hard limit has been reached", "type": "x"}}"#;
        assert_eq!(api_error_message(body), "Billing hard limit has been reached");
        assert_eq!(api_error_message(b" upstream gone \n"), "upstream gone");
    }

    #[tokio::test]
    async fn generates_and_downloads() {
        let mock = spawn_mock_api(MockPayload::Png).await;
        let client = GenerationClient::new(&mock.options).expect("client");

        let generated = client
            .generate("a calm mandala", VALID_KEY)
            .await
            .expect("generation succeeds");

        assert_eq!(generated.image.width(), 4);
        let url = generated.source.url().expect("url source");
        assert!(url.ends_with("/files/mandala.png"));
        assert_eq!(generated.revised_prompt.as_deref(), Some("A revised mandala"));
        assert!(!generated.to_png().expect("png").is_empty());

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        let body = &requests[0];
        assert_eq!(body["prompt"], "a calm mandala");
        assert_eq!(body["model"], "dall-e-3");
        assert_eq!(body["size"], "1024x1024");
        assert_eq!(body["quality"], "standard");
        assert_eq!(body["n"], 1);
    }

    #[tokio::test]
    async fn decodes_inline_base64() {
        let mock = spawn_mock_api(MockPayload::Base64).await;
        let client = GenerationClient::new(&mock.options).expect("client");

        let generated = client
            .generate("inline", VALID_KEY)
            .await
            .expect("generation succeeds");
        assert_eq!(generated.source, ImageSource::Inline);
        assert_eq!(generated.image.height(), 4);
    }

    #[tokio::test]
    async fn invalid_key_is_an_api_error() {
        let mock = spawn_mock_api(MockPayload::Png).await;
        let client = GenerationClient::new(&mock.options).expect("client");

        let err = client
            .generate("a mandala", "sk-wrong")
            .await
            .expect_err("bad key must fail");
        match &err {
            GenerationError::Api { status, message } => {
                assert_eq!(*status, StatusCode::UNAUTHORIZED);
                assert!(message.contains("Incorrect API key"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(mock.generation_calls(), 1);
    }

    #[tokio::test]
    async fn empty_key_never_hits_the_network() {
        let mock = spawn_mock_api(MockPayload::Png).await;
        let client = GenerationClient::new(&mock.options).expect("client");

        let err = client.generate("a mandala", "  ").await.expect_err("no key");
        assert!(matches!(err, GenerationError::MissingCredential));
        assert_eq!(mock.generation_calls(), 0);
    }

    #[tokio::test]
    async fn non_image_body_fails_to_decode() {
        let mock = spawn_mock_api(MockPayload::NotAnImage).await;
        let client = GenerationClient::new(&mock.options).expect("client");

        let err = client
            .generate("a mandala", VALID_KEY)
            .await
            .expect_err("html is not an image");
        assert!(matches!(err, GenerationError::Decode(_)));
    }

    #[tokio::test]
    async fn slow_api_hits_the_timeout() {
        let mut mock = spawn_mock_api(MockPayload::Slow).await;
        mock.options.timeout_secs = 1;
        let client = GenerationClient::new(&mock.options).expect("client");

        let err = client
            .generate("a mandala", VALID_KEY)
            .await
            .expect_err("timed out");
        match &err {
            GenerationError::Request { stage, source } => {
                assert_eq!(*stage, "/images/generations");
                assert!(source.is_timeout(), "not a timeout: {source}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_data_is_no_image() {
        let mock = spawn_mock_api(MockPayload::EmptyData).await;
        let client = GenerationClient::new(&mock.options).expect("client");

        let err = client
            .generate("a mandala", VALID_KEY)
            .await
            .expect_err("nothing returned");
        assert!(matches!(err, GenerationError::NoImage));
        assert_eq!(err.to_string(), "No image data returned");
    }

    #[tokio::test]
    async fn error_body_with_ok_status_is_an_api_error() {
        let mock = spawn_mock_api(MockPayload::ErrorBody200).await;
        let client = GenerationClient::new(&mock.options).expect("client");

        let err = client
            .generate("a mandala", VALID_KEY)
            .await
            .expect_err("rejected prompt");
        match &err {
            GenerationError::Api { status, message } => {
                assert_eq!(*status, StatusCode::OK);
                assert!(message.contains("content policy"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_inline_data_is_a_base64_error() {
        let mock = spawn_mock_api(MockPayload::BadBase64).await;
        let client = GenerationClient::new(&mock.options).expect("client");

        let err = client
            .generate("a mandala", VALID_KEY)
            .await
            .expect_err("bad base64");
        assert!(matches!(err, GenerationError::Base64(_)));
    }

    #[tokio::test]
    async fn missing_download_is_reported() {
        let mock = spawn_mock_api(MockPayload::Gone).await;
        let client = GenerationClient::new(&mock.options).expect("client");

        let err = client
            .generate("a mandala", VALID_KEY)
            .await
            .expect_err("404 download");
        assert!(matches!(err, GenerationError::Download(StatusCode::NOT_FOUND)));
    }
}
