//! CLI parser
use clap::Parser;
use std::num::NonZeroU16;
use std::time::Duration;

use crate::generation::StabilityTransportBuilder;

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "PROMPTFORGE_DEBUG")]
    /// Enable debug logging. Env: PROMPTFORGE_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "7861", env = "PROMPTFORGE_PORT")]
    /// http listener, defaults to `7861`.
    /// Env: PROMPTFORGE_PORT
    pub port: NonZeroU16,
    #[clap(long, short, default_value = "0.0.0.0", env = "PROMPTFORGE_LISTEN_ADDRESS")]
    /// Listen address, defaults to `0.0.0.0`.
    /// Env: PROMPTFORGE_LISTEN_ADDRESS
    pub listen_address: String,

    #[clap(long, env = "STABILITY_KEY", hide_env_values = true)]
    /// Stability AI API key. Without it the server still starts, but every
    /// generation fails with a configuration error.
    /// Env: STABILITY_KEY
    pub stability_key: Option<String>,
    #[clap(
        long,
        default_value = crate::constants::DEFAULT_ENGINE,
        env = "STABILITY_ENGINE"
    )]
    /// Engine to generate with.
    /// Env: STABILITY_ENGINE
    pub engine: String,
    #[clap(
        long,
        default_value = crate::constants::DEFAULT_API_HOST,
        env = "STABILITY_API_HOST"
    )]
    /// Base URL of the Stability API.
    /// Env: STABILITY_API_HOST
    pub api_host: String,

    #[clap(long, env = "PROMPTFORGE_GENERATION_TIMEOUT")]
    /// Give up on a generation after this many seconds. Unset waits forever.
    /// Env: PROMPTFORGE_GENERATION_TIMEOUT
    pub generation_timeout_secs: Option<u64>,
}

impl CliOptions {
    /// Transport settings from the parsed options.
    pub fn transport_builder(&self) -> StabilityTransportBuilder {
        StabilityTransportBuilder::new()
            .api_key(self.stability_key.clone())
            .engine(self.engine.clone())
            .api_host(self.api_host.clone())
    }

    /// Generation timeout, if any.
    pub fn generation_timeout(&self) -> Option<Duration> {
        self.generation_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
