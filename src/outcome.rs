//! Mapping pipeline outcomes onto what the user sees.

use crate::generation::{GeneratedImage, GenerationOutcome, NotConfigured};
use crate::prompt::ValidationError;

/// Shown when the safety filter blocks a request.
pub const FILTERED_MESSAGE: &str =
    "Content was blocked by the safety filter, please try a different combination of options";

/// Shown when the client was never configured.
pub const NOT_CONFIGURED_MESSAGE: &str =
    "Error: the image generation API is not initialised, please check your API key";

/// What a single request ends up showing.
#[derive(Clone, Debug)]
pub enum GenerationResult {
    /// The generated picture
    Image(GeneratedImage),
    /// Selection failed validation
    Rejected(String),
    /// Blocked by the safety filter
    Filtered(String),
    /// Something else failed
    Failed(String),
}

impl GenerationResult {
    /// The message for non-image results.
    pub fn message(&self) -> Option<&str> {
        match self {
            GenerationResult::Image(_) => None,
            GenerationResult::Rejected(message)
            | GenerationResult::Filtered(message)
            | GenerationResult::Failed(message) => Some(message),
        }
    }

    /// The image, if there is one.
    pub fn image(&self) -> Option<&GeneratedImage> {
        match self {
            GenerationResult::Image(image) => Some(image),
            _ => None,
        }
    }

    /// Short lowercase name, used for CSS classes and JSON tags.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationResult::Image(_) => "image",
            GenerationResult::Rejected(_) => "rejected",
            GenerationResult::Filtered(_) => "filtered",
            GenerationResult::Failed(_) => "error",
        }
    }
}

/// Turns a generation outcome into a displayable result.
pub fn interpret(outcome: GenerationOutcome) -> GenerationResult {
    match outcome {
        GenerationOutcome::Image(image) => GenerationResult::Image(image),
        GenerationOutcome::Filtered => GenerationResult::Filtered(FILTERED_MESSAGE.to_string()),
        GenerationOutcome::Failed(message) => GenerationResult::Failed(format!(
            "An error occurred during image generation: {message}"
        )),
    }
}

impl From<ValidationError> for GenerationResult {
    fn from(err: ValidationError) -> Self {
        GenerationResult::Rejected(err.to_string())
    }
}

impl From<NotConfigured> for GenerationResult {
    fn from(_: NotConfigured) -> Self {
        GenerationResult::Failed(NOT_CONFIGURED_MESSAGE.to_string())
    }
}
