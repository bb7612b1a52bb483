use clap::Parser;
use promptforge::config::{load_dotenv, setup_logging};
use promptforge::constants::STABILITY_KEY_ENV;
use promptforge::generation::{ClientStatus, GenerationClient};
use promptforge::pipeline::Pipeline;
use tracing::{error, info, warn};

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    // before parsing, so clap's env fallbacks see it
    let dotenv_path = load_dotenv();
    let cli = promptforge::cli::CliOptions::parse();

    if setup_logging(cli.debug).is_err() {
        return;
    }
    if let Some(path) = dotenv_path {
        info!("Loaded environment from {}", path.display());
    }

    let client = GenerationClient::stability(cli.transport_builder())
        .with_timeout(cli.generation_timeout());
    if let ClientStatus::Disabled { reason } = client.status() {
        warn!("Image generation is disabled: {}", reason);
        if cli.stability_key.as_deref().is_none_or(|key| key.trim().is_empty()) {
            warn!(
                "Set it in a .env file or run: export {}='your-api-key-here'",
                STABILITY_KEY_ENV
            );
        }
    }

    if let Err(err) =
        promptforge::web::setup_server(&cli.listen_address, cli.port, Pipeline::new(client)).await
    {
        error!("Application error: {}", err);
    }
}
