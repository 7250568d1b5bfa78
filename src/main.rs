use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sentinel::config::Config;
use sentinel::repl;

#[derive(Parser)]
#[command(name = "sentinel", version, about = "Conversational security-assistant shell")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "sentinel.yaml")]
    config: PathBuf,

    /// Override the completion endpoint base URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Override the model identifier.
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to stderr so chat output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(&cli.config).await?;
    if let Some(base_url) = cli.base_url {
        config.endpoint.base_url = base_url;
    }
    if let Some(model) = cli.model {
        config.endpoint.model = model;
    }

    repl::run(config).await
}
