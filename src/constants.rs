//! Shared constants for prompt building and generation requests
//!

/// How many labels a selection needs before we'll generate anything.
pub const REQUIRED_SELECTIONS: usize = 3;

/// Appended to every prompt.
pub const PROMPT_SUFFIX: &str = ", high quality, detailed, masterpiece";

/// Separator between translated labels in a prompt.
pub const PROMPT_SEPARATOR: &str = ", ";

/// Fixed seed so repeated prompts are reproducible.
pub const GENERATION_SEED: u32 = 992_446_758;

/// Diffusion steps per request.
pub const GENERATION_STEPS: u32 = 30;

/// Classifier-free guidance scale.
pub const GENERATION_CFG_SCALE: f32 = 8.0;

/// Output width in pixels.
pub const GENERATION_WIDTH: u32 = 1024;

/// Output height in pixels.
pub const GENERATION_HEIGHT: u32 = 1024;

/// Number of images requested per call.
pub const GENERATION_SAMPLES: u32 = 1;

/// Sampler identifier understood by the Stability REST API.
pub const GENERATION_SAMPLER: &str = "K_DPMPP_2M";

/// Default engine (model) identifier.
pub const DEFAULT_ENGINE: &str = "stable-diffusion-xl-1024-v1-0";

/// Default API host.
pub const DEFAULT_API_HOST: &str = "https://api.stability.ai";

/// Default listener port.
pub const DEFAULT_PORT: u16 = 7861;

/// Environment variable carrying the Stability API key.
pub const STABILITY_KEY_ENV: &str = "STABILITY_KEY";

/// Message used when a scan of the response finds nothing usable.
pub const NO_RESULT_MESSAGE: &str = "generation produced no result";
