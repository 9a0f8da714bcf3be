mod assets;
mod config;
mod file;
mod listing;
mod registry;
mod share_server;
mod template;
mod token;
mod traits;

use anyhow::Result;
use assets::EmbeddedAssets;
use config::Config;
use registry::LinkRegistry;
use share_server::ShareServer;
use template::Templates;
use token::TOKEN_LENGTH;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = Config::get();

    init_logging(config.debug);

    let registry = LinkRegistry::build(&config.files, TOKEN_LENGTH)?;
    let templates = Templates::load(&EmbeddedAssets)?;

    ShareServer::new(config, registry, Box::new(EmbeddedAssets), templates).start()
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={level}", env!("CARGO_CRATE_NAME"))));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
