use std::fs;
use std::path::Path;

use anyhow::Result;
use clap::Parser;
use log::info;

use referral_service::{repositories::PgRepository, services, settings::Settings};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config.toml")]
    config: String,
    /// Overrides `server.address` from the config file.
    #[arg(short, long)]
    listen: Option<String>,
    #[arg(long, default_value = "log4rs.yaml")]
    log4rs: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    init_logging(&args.log4rs)?;
    info!("Starting referral service.");

    let mut settings = Settings::load(&args.config)?;
    if let Some(listen) = args.listen {
        settings.server.address = listen;
    }

    let repository = PgRepository::connect(&settings.postgres).await?;

    services::start_services(repository, settings).await
}

fn init_logging(path: &str) -> Result<(), anyhow::Error> {
    if !Path::new("logs").exists() {
        fs::create_dir("logs")?;
    }

    if let Err(e) = log4rs::init_file(path, Default::default()) {
        // No logger yet, so this is the only place that prints directly.
        eprintln!("Failed to initialize logging from {path}: {e}");
        return Err(anyhow::anyhow!("Could not initialize logging: {}", e));
    }

    info!("Logging initialized from {path}.");
    Ok(())
}
