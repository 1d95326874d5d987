use anyhow::Context;
use clap::Parser;

use elementum_bridge::util::{init_tracing, install_panic_hook};
use elementum_bridge::{Cli, Config};

fn main() -> anyhow::Result<()> {
    init_tracing();
    install_panic_hook();

    let cli = Cli::parse();
    let config = Config::load(&cli).context("loading configuration")?;
    let catalog = config.load_catalog()?;
    tracing::info!(module = %config.module_path.display(), "Elementum starting");

    elementum_bridge::shell::run(config, catalog, cli.location)
}
