//! Talking to the Stability AI text-to-image API.
//!
//! A [`GenerationClient`] is built once at startup and shared. It is either
//! ready (holding a [`GenerationTransport`]) or disabled, in which case every
//! call fails fast without touching the network.

use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::constants::{
    DEFAULT_API_HOST, DEFAULT_ENGINE, GENERATION_CFG_SCALE, GENERATION_HEIGHT, GENERATION_SAMPLER,
    GENERATION_SAMPLES, GENERATION_SEED, GENERATION_STEPS, GENERATION_WIDTH, NO_RESULT_MESSAGE,
};
use crate::prompt::Prompt;

/// Things that go wrong while building a client or making a call.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Missing API key, bad host etc.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Network-level failure or unreadable response.
    #[error("{0}")]
    Transport(String),
    /// The API answered with a non-success status.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },
    /// Payload couldn't be decoded.
    #[error("failed to decode image: {0}")]
    Decode(String),
    /// No answer within the configured wait.
    #[error("generation timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Transport(err.to_string())
    }
}

/// Returned by [`GenerationClient::generate`] when the client never initialised.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("image generation is not configured: {reason}")]
pub struct NotConfigured {
    /// Why the client is disabled.
    pub reason: String,
}

/// Why an artifact stopped generating.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FinishReason {
    /// Normal completion
    Success,
    /// The safety filter kicked in
    Filter,
    /// Server-side failure
    Error,
    /// Anything we don't recognise
    Unknown,
}

impl FinishReason {
    fn from_api(value: &str) -> Self {
        match value {
            "SUCCESS" => FinishReason::Success,
            "CONTENT_FILTERED" => FinishReason::Filter,
            "ERROR" => FinishReason::Error,
            _ => FinishReason::Unknown,
        }
    }
}

/// What kind of payload an artifact carries.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArtifactKind {
    /// Encoded image bytes
    Image,
    /// Anything else
    Other,
}

/// Artifact payload as it arrived.
#[derive(Clone, Debug)]
pub enum Payload {
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Standard base64, only decoded if the artifact is the one we use
    Base64(String),
}

impl Payload {
    fn into_bytes(self) -> Result<Vec<u8>, GenerationError> {
        match self {
            Payload::Bytes(bytes) => Ok(bytes),
            Payload::Base64(b64) => general_purpose::STANDARD
                .decode(b64)
                .map_err(|err| GenerationError::Decode(err.to_string())),
        }
    }
}

/// One unit of output from the service.
#[derive(Clone, Debug)]
pub struct Artifact {
    /// Payload type
    pub kind: ArtifactKind,
    /// Why generation stopped
    pub finish_reason: FinishReason,
    /// Payload, empty for non-image artifacts
    pub payload: Payload,
}

impl Artifact {
    /// An image artifact that finished normally.
    pub fn image(binary: Vec<u8>) -> Self {
        Self {
            kind: ArtifactKind::Image,
            finish_reason: FinishReason::Success,
            payload: Payload::Bytes(binary),
        }
    }

    /// An artifact flagged by the safety filter.
    pub fn filtered() -> Self {
        Self {
            kind: ArtifactKind::Image,
            finish_reason: FinishReason::Filter,
            payload: Payload::Bytes(Vec::new()),
        }
    }
}

/// A group of artifacts returned together.
#[derive(Clone, Debug, Default)]
pub struct AnswerBatch {
    /// Artifacts in the order the service sent them
    pub artifacts: Vec<Artifact>,
}

/// Parameters for one text-to-image call.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    /// Prompt text
    pub prompt: String,
    /// Seed
    pub seed: u32,
    /// Diffusion steps
    pub steps: u32,
    /// Guidance scale
    pub cfg_scale: f32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Number of images
    pub samples: u32,
    /// Sampler name
    pub sampler: &'static str,
}

impl GenerationRequest {
    /// A request for `prompt` using the fixed house parameters.
    pub fn fixed(prompt: &Prompt) -> Self {
        Self {
            prompt: prompt.as_str().to_string(),
            seed: GENERATION_SEED,
            steps: GENERATION_STEPS,
            cfg_scale: GENERATION_CFG_SCALE,
            width: GENERATION_WIDTH,
            height: GENERATION_HEIGHT,
            samples: GENERATION_SAMPLES,
            sampler: GENERATION_SAMPLER,
        }
    }
}

/// Something that can turn a request into answer batches.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    /// Issues a single text-to-image call.
    async fn text_to_image(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<AnswerBatch>, GenerationError>;

    /// Engine identifier, for logging.
    fn engine(&self) -> &str;
}

/// A successfully decoded image.
#[derive(Clone, Debug)]
pub struct GeneratedImage {
    /// Encoded bytes as returned by the service
    pub bytes: Vec<u8>,
    /// Detected format
    pub format: image::ImageFormat,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Prompt that produced it
    pub prompt: String,
}

impl GeneratedImage {
    /// MIME type of the encoded bytes.
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// Bytes as standard base64.
    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.bytes)
    }

    /// `data:` URI suitable for an `<img src>`.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), self.to_base64())
    }
}

/// Result of one generation call.
#[derive(Clone, Debug)]
pub enum GenerationOutcome {
    /// Got an image
    Image(GeneratedImage),
    /// Safety filter blocked it
    Filtered,
    /// Anything else that went wrong
    Failed(String),
}

/// Decodes image bytes, returning what we need to show them.
fn decode_image(bytes: Vec<u8>, prompt: &Prompt) -> Result<GeneratedImage, GenerationError> {
    let reader = image::ImageReader::new(Cursor::new(bytes.as_slice()))
        .with_guessed_format()
        .map_err(|err| GenerationError::Decode(err.to_string()))?;
    let format = reader
        .format()
        .ok_or_else(|| GenerationError::Decode("unrecognised image format".to_string()))?;
    let decoded = reader
        .decode()
        .map_err(|err| GenerationError::Decode(err.to_string()))?;
    Ok(GeneratedImage {
        width: decoded.width(),
        height: decoded.height(),
        bytes,
        format,
        prompt: prompt.as_str().to_string(),
    })
}

/// Scans batches in order and returns the first filter or image hit.
pub fn interpret_batches(batches: Vec<AnswerBatch>, prompt: &Prompt) -> GenerationOutcome {
    for artifact in batches.into_iter().flat_map(|batch| batch.artifacts) {
        if artifact.finish_reason == FinishReason::Filter {
            warn!("Request triggered the API safety filter, adjust the prompt and try again");
            return GenerationOutcome::Filtered;
        }
        if artifact.kind == ArtifactKind::Image {
            return match artifact
                .payload
                .into_bytes()
                .and_then(|bytes| decode_image(bytes, prompt))
            {
                Ok(image) => GenerationOutcome::Image(image),
                Err(err) => {
                    error!("Image generation failed: {}", err);
                    GenerationOutcome::Failed(err.to_string())
                }
            };
        }
    }
    GenerationOutcome::Failed(NO_RESULT_MESSAGE.to_string())
}

/// Whether the client can make calls.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ClientStatus {
    /// Credential present, transport built
    Ready {
        /// Engine in use
        engine: String,
    },
    /// Construction failed
    Disabled {
        /// What went wrong
        reason: String,
    },
}

enum Backend {
    Ready(Box<dyn GenerationTransport>),
    Disabled(String),
}

/// Long-lived handle to the image service.
pub struct GenerationClient {
    backend: Backend,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("status", &self.status())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GenerationClient {
    /// A ready client using `transport`.
    pub fn new(transport: impl GenerationTransport + 'static) -> Self {
        Self {
            backend: Backend::Ready(Box::new(transport)),
            timeout: None,
        }
    }

    /// A client that refuses every call.
    pub fn disabled(reason: impl Into<String>) -> Self {
        Self {
            backend: Backend::Disabled(reason.into()),
            timeout: None,
        }
    }

    /// Builds a Stability client, falling back to a disabled one if that fails.
    pub fn stability(builder: StabilityTransportBuilder) -> Self {
        match builder.build() {
            Ok(transport) => {
                info!(
                    "Stability AI API initialised (engine {})",
                    transport.engine()
                );
                Self::new(transport)
            }
            Err(err) => {
                warn!("Stability AI API failed to initialise: {}", err);
                Self::disabled(err.to_string())
            }
        }
    }

    /// Caps how long a single call may take.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Current status.
    pub fn status(&self) -> ClientStatus {
        match &self.backend {
            Backend::Ready(transport) => ClientStatus::Ready {
                engine: transport.engine().to_string(),
            },
            Backend::Disabled(reason) => ClientStatus::Disabled {
                reason: reason.clone(),
            },
        }
    }

    /// True when calls will actually be attempted.
    pub fn is_ready(&self) -> bool {
        matches!(self.backend, Backend::Ready(_))
    }

    /// Requests an image for `prompt`.
    ///
    /// Only a disabled client returns `Err`. Every failure during the call
    /// itself comes back as [`GenerationOutcome::Failed`].
    pub async fn generate(&self, prompt: &Prompt) -> Result<GenerationOutcome, NotConfigured> {
        let transport = match &self.backend {
            Backend::Ready(transport) => transport,
            Backend::Disabled(reason) => {
                return Err(NotConfigured {
                    reason: reason.clone(),
                });
            }
        };

        let request = GenerationRequest::fixed(prompt);
        debug!("Sending generation request to {}", transport.engine());
        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, transport.text_to_image(&request))
                .await
                .unwrap_or(Err(GenerationError::Timeout(limit))),
            None => transport.text_to_image(&request).await,
        };

        match response {
            Ok(batches) => Ok(interpret_batches(batches, prompt)),
            Err(err) => {
                error!("Image generation failed: {}", err);
                Ok(GenerationOutcome::Failed(err.to_string()))
            }
        }
    }
}

/// Builder for [`StabilityTransport`].
#[derive(Clone, Debug)]
pub struct StabilityTransportBuilder {
    api_key: Option<String>,
    engine: String,
    api_host: String,
}

impl Default for StabilityTransportBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            engine: DEFAULT_ENGINE.to_string(),
            api_host: DEFAULT_API_HOST.to_string(),
        }
    }
}

impl StabilityTransportBuilder {
    /// Default engine and host, no key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    pub fn api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    /// Sets the engine identifier.
    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }

    /// Sets the API host, eg. `https://api.stability.ai`.
    pub fn api_host(mut self, host: impl Into<String>) -> Self {
        self.api_host = host.into();
        self
    }

    /// Validates settings and builds the transport.
    pub fn build(self) -> Result<StabilityTransport, GenerationError> {
        let api_key = self
            .api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                GenerationError::Configuration(format!(
                    "{} is not set",
                    crate::constants::STABILITY_KEY_ENV
                ))
            })?;
        let engine = self.engine.trim().to_string();
        if engine.is_empty() {
            return Err(GenerationError::Configuration(
                "engine must not be empty".to_string(),
            ));
        }
        // join() replaces the last segment unless the base ends in a slash
        let mut host = self.api_host.trim().to_string();
        if !host.ends_with('/') {
            host.push('/');
        }
        let host = Url::parse(&host).map_err(|err| {
            GenerationError::Configuration(format!("invalid API host {:?}: {err}", self.api_host))
        })?;
        let endpoint = host
            .join(&format!("v1/generation/{engine}/text-to-image"))
            .map_err(|err| GenerationError::Configuration(err.to_string()))?;

        Ok(StabilityTransport {
            client: reqwest::Client::new(),
            api_key,
            engine,
            endpoint,
        })
    }
}

/// Request body for POST /v1/generation/{engine}/text-to-image
#[derive(Serialize, Debug)]
struct TextToImageBody<'a> {
    text_prompts: [TextPrompt<'a>; 1],
    cfg_scale: f32,
    height: u32,
    width: u32,
    samples: u32,
    steps: u32,
    seed: u32,
    sampler: &'a str,
}

#[derive(Serialize, Debug)]
struct TextPrompt<'a> {
    text: &'a str,
    weight: f32,
}

impl<'a> From<&'a GenerationRequest> for TextToImageBody<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        Self {
            text_prompts: [TextPrompt {
                text: &request.prompt,
                weight: 1.0,
            }],
            cfg_scale: request.cfg_scale,
            height: request.height,
            width: request.width,
            samples: request.samples,
            steps: request.steps,
            seed: request.seed,
            sampler: request.sampler,
        }
    }
}

#[derive(Deserialize, Debug)]
struct TextToImageResponse {
    #[serde(default)]
    artifacts: Vec<ResponseArtifact>,
}

#[derive(Deserialize, Debug)]
struct ResponseArtifact {
    #[serde(default)]
    base64: Option<String>,
    #[serde(rename = "finishReason", default)]
    finish_reason: Option<String>,
}

impl From<ResponseArtifact> for Artifact {
    fn from(value: ResponseArtifact) -> Self {
        let finish_reason = value
            .finish_reason
            .as_deref()
            .map(FinishReason::from_api)
            .unwrap_or(FinishReason::Unknown);
        let (kind, payload) = match value.base64.filter(|b64| !b64.is_empty()) {
            Some(b64) => (ArtifactKind::Image, Payload::Base64(b64)),
            None => (ArtifactKind::Other, Payload::Bytes(Vec::new())),
        };
        Artifact {
            kind,
            finish_reason,
            payload,
        }
    }
}

/// Parses a text-to-image JSON body into a single answer batch.
///
/// Base64 payloads are left encoded, [`interpret_batches`] decodes the one it picks.
fn parse_response(bytes: &[u8]) -> Result<Vec<AnswerBatch>, GenerationError> {
    let parsed: TextToImageResponse = serde_json::from_slice(bytes)
        .map_err(|err| GenerationError::Transport(format!("malformed response: {err}")))?;
    let artifacts = parsed.artifacts.into_iter().map(Artifact::from).collect();
    Ok(vec![AnswerBatch { artifacts }])
}

/// Stability AI REST v1 transport.
#[derive(Clone, Debug)]
pub struct StabilityTransport {
    client: reqwest::Client,
    api_key: String,
    engine: String,
    endpoint: Url,
}

impl StabilityTransport {
    /// Builder with defaults.
    pub fn builder() -> StabilityTransportBuilder {
        StabilityTransportBuilder::new()
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationTransport for StabilityTransport {
    async fn text_to_image(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<AnswerBatch>, GenerationError> {
        let body = TextToImageBody::from(request);
        let resp = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&bytes).trim().to_string(),
            });
        }
        parse_response(&bytes)
    }

    fn engine(&self) -> &str {
        &self.engine
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::testing::*;
    use super::*;
    use crate::prompt::{Selection, build_prompt};

    fn prompt() -> Prompt {
        build_prompt(&Selection::new(["写实风格", "自然风景", "暖色调"]))
    }

    #[tokio::test]
    async fn returns_decoded_image() {
        let client = GenerationClient::new(CannedTransport::image(4, 3));
        let image = match client.generate(&prompt()).await.expect("configured") {
            GenerationOutcome::Image(image) => image,
            other => panic!("expected an image, got {other:?}"),
        };
        assert_eq!((image.width, image.height), (4, 3));
        assert_eq!(image.format, image::ImageFormat::Png);
        assert_eq!(image.mime_type(), "image/png");
        assert!(image.data_uri().starts_with("data:image/png;base64,"));
        assert_eq!(image.prompt, prompt().as_str());
    }

    #[tokio::test]
    async fn sends_fixed_parameters() {
        let transport = CannedTransport::image(1, 1);
        let last = transport.last_prompt.clone();
        let client = GenerationClient::new(transport);
        client.generate(&prompt()).await.expect("configured");
        let request = last.lock().expect("lock").clone().expect("request recorded");
        assert_eq!(request.prompt, prompt().as_str());
        assert_eq!(request.seed, 992_446_758);
        assert_eq!(request.steps, 30);
        assert_eq!(request.cfg_scale, 8.0);
        assert_eq!((request.width, request.height), (1024, 1024));
        assert_eq!(request.samples, 1);
        assert_eq!(request.sampler, "K_DPMPP_2M");
    }

    #[test]
    fn filter_wins_when_first() {
        let batches = vec![AnswerBatch {
            artifacts: vec![
                Artifact::filtered(),
                Artifact::image(png_bytes(2, 2)),
            ],
        }];
        assert!(matches!(
            interpret_batches(batches, &prompt()),
            GenerationOutcome::Filtered
        ));
    }

    #[test]
    fn first_image_wins_over_later_filter() {
        let batches = vec![
            AnswerBatch::default(),
            AnswerBatch {
                artifacts: vec![Artifact::image(png_bytes(2, 2)), Artifact::filtered()],
            },
        ];
        assert!(matches!(
            interpret_batches(batches, &prompt()),
            GenerationOutcome::Image(_)
        ));
    }

    #[test]
    fn skips_non_image_artifacts() {
        let other = Artifact {
            kind: ArtifactKind::Other,
            finish_reason: FinishReason::Success,
            payload: Payload::Bytes(b"text".to_vec()),
        };
        let batches = vec![
            AnswerBatch {
                artifacts: vec![other.clone()],
            },
            AnswerBatch {
                artifacts: vec![other, Artifact::image(png_bytes(5, 5))],
            },
        ];
        let GenerationOutcome::Image(image) = interpret_batches(batches, &prompt()) else {
            panic!("expected image");
        };
        assert_eq!(image.width, 5);
    }

    #[test]
    fn empty_response_is_no_result() {
        for batches in [Vec::new(), vec![AnswerBatch::default(), AnswerBatch::default()]] {
            match interpret_batches(batches, &prompt()) {
                GenerationOutcome::Failed(message) => {
                    assert_eq!(message, "generation produced no result")
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn undecodable_image_fails() {
        let batches = vec![AnswerBatch {
            artifacts: vec![Artifact::image(b"not an image at all".to_vec())],
        }];
        match interpret_batches(batches, &prompt()) {
            GenerationOutcome::Failed(message) => {
                assert!(message.starts_with("failed to decode image"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_error_becomes_failed() {
        let client = GenerationClient::new(CannedTransport::new(Canned::Error(
            "connection reset by peer".to_string(),
        )));
        match client.generate(&prompt()).await.expect("configured") {
            GenerationOutcome::Failed(message) => assert_eq!(message, "connection reset by peer"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn disabled_client_never_calls_transport() {
        let client = GenerationClient::disabled("STABILITY_KEY is not set");
        assert!(!client.is_ready());
        assert_eq!(
            client.status(),
            ClientStatus::Disabled {
                reason: "STABILITY_KEY is not set".to_string()
            }
        );
        let err = client.generate(&prompt()).await.expect_err("disabled");
        assert_eq!(err.reason, "STABILITY_KEY is not set");
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_becomes_failed() {
        let transport = CannedTransport::new(Canned::Hang);
        let calls = transport.calls.clone();
        let client =
            GenerationClient::new(transport).with_timeout(Some(Duration::from_secs(45)));
        match client.generate(&prompt()).await.expect("configured") {
            GenerationOutcome::Failed(message) => {
                assert_eq!(message, "generation timed out after 45s")
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn builder_requires_key() {
        let err = StabilityTransport::builder()
            .api_key(Some("   ".to_string()))
            .build()
            .expect_err("blank key");
        assert!(matches!(err, GenerationError::Configuration(_)));

        let client = GenerationClient::stability(StabilityTransport::builder());
        assert!(!client.is_ready());
    }

    #[test]
    fn builder_builds_endpoint() {
        let transport = StabilityTransport::builder()
            .api_key(Some("sk-test".to_string()))
            .api_host("http://127.0.0.1:9999")
            .build()
            .expect("build");
        assert_eq!(
            transport.endpoint().as_str(),
            "http://127.0.0.1:9999/v1/generation/stable-diffusion-xl-1024-v1-0/text-to-image"
        );
        let client = GenerationClient::new(transport);
        assert_eq!(
            client.status(),
            ClientStatus::Ready {
                engine: "stable-diffusion-xl-1024-v1-0".to_string()
            }
        );
    }

    #[test]
    fn builder_rejects_bad_host() {
        let err = StabilityTransport::builder()
            .api_key(Some("sk-test".to_string()))
            .api_host("not a url")
            .build()
            .expect_err("bad host");
        assert!(err.to_string().contains("invalid API host"));
    }

    #[test]
    fn disabled_status_carries_build_error() {
        let client = GenerationClient::stability(
            StabilityTransport::builder()
                .api_key(Some("sk-test".to_string()))
                .engine("  "),
        );
        match client.status() {
            ClientStatus::Disabled { reason } => {
                assert_eq!(reason, "configuration error: engine must not be empty")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn request_body_uses_api_field_names() {
        let request = GenerationRequest::fixed(&prompt());
        let body = serde_json::to_value(TextToImageBody::from(&request)).expect("serialize");
        assert_eq!(body["text_prompts"][0]["text"], prompt().as_str());
        assert_eq!(body["cfg_scale"], 8.0);
        assert_eq!(body["steps"], 30);
        assert_eq!(body["seed"], 992_446_758u32);
        assert_eq!(body["sampler"], "K_DPMPP_2M");
        assert_eq!(body["samples"], 1);
        assert_eq!(body["width"], 1024);
    }

    #[test]
    fn parses_api_response() {
        let b64 = general_purpose::STANDARD.encode(png_bytes(3, 3));
        let body = serde_json::json!({
            "artifacts": [
                {"seed": 1, "finishReason": "CONTENT_FILTERED"},
                {"base64": b64, "seed": 1, "finishReason": "SUCCESS"}
            ]
        });
        let batches = parse_response(body.to_string().as_bytes()).expect("parse");
        assert_eq!(batches.len(), 1);
        let artifacts = &batches[0].artifacts;
        assert_eq!(artifacts[0].finish_reason, FinishReason::Filter);
        assert_eq!(artifacts[0].kind, ArtifactKind::Other);
        assert_eq!(artifacts[1].kind, ArtifactKind::Image);
        assert!(matches!(
            interpret_batches(batches, &prompt()),
            GenerationOutcome::Filtered
        ));
    }

    #[test]
    fn malformed_response_is_transport_error() {
        let err = parse_response(b"<html>gateway timeout</html>").expect_err("not json");
        assert!(err.to_string().starts_with("malformed response"));
    }

    #[test]
    fn bad_base64_fails_only_when_picked() {
        let batches =
            parse_response(br#"{"artifacts":[{"base64":"@@@","finishReason":"SUCCESS"}]}"#)
                .expect("parse");
        match interpret_batches(batches, &prompt()) {
            GenerationOutcome::Failed(message) => {
                assert!(message.starts_with("failed to decode image"), "{message}")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn filter_before_bad_base64_is_filtered() {
        let batches = parse_response(
            br#"{"artifacts":[{"finishReason":"CONTENT_FILTERED"},{"base64":"@@@","finishReason":"SUCCESS"}]}"#,
        )
        .expect("parse");
        assert!(matches!(
            interpret_batches(batches, &prompt()),
            GenerationOutcome::Filtered
        ));
    }

    #[test]
    fn image_before_bad_base64_is_image() {
        let b64 = general_purpose::STANDARD.encode(png_bytes(3, 2));
        let body = serde_json::json!({
            "artifacts": [
                {"base64": b64, "finishReason": "SUCCESS"},
                {"base64": "@@@", "finishReason": "SUCCESS"}
            ]
        });
        let batches = parse_response(body.to_string().as_bytes()).expect("parse");
        match interpret_batches(batches, &prompt()) {
            GenerationOutcome::Image(image) => assert_eq!((image.width, image.height), (3, 2)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn api_host_path_is_kept() {
        for host in ["https://proxy.example/stability", "https://proxy.example/stability/"] {
            let transport = StabilityTransport::builder()
                .api_key(Some("sk-test".to_string()))
                .api_host(host)
                .build()
                .expect("build");
            assert_eq!(
                transport.endpoint().as_str(),
                "https://proxy.example/stability/v1/generation/stable-diffusion-xl-1024-v1-0/text-to-image"
            );
        }
    }
}
