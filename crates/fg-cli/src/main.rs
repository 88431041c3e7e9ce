//! fg-admin - Future Gateway administration tool

use clap::Parser;
use fg_cli::{build_client, execute, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr, command output to stdout
    let log_level = if cli.global.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("fg_cli={0},fg_client={0}", log_level).into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.global.to_config();
    tracing::debug!(
        "Tenant {} as user {}, endpoints in {}",
        config.tenant,
        config.user,
        config.store_path.display()
    );
    if config.token.is_none() {
        tracing::warn!("No access token configured (--token / FG_TOKEN)");
    }

    let client = build_client(&config)?;
    let output = execute(&client, &config, cli.command).await?;
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}
