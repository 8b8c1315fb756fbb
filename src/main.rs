//! CLI entry point: answer one churn question from the command line.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use shopease_agent::agent::Analyst;
use shopease_agent::inference::config;

const DEFAULT_QUERY: &str = "Does delivery time affect churn?";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shopease_agent=info,warn")),
        )
        .init();

    let cwd = std::env::current_dir()?;
    let cfg = config::load_or_default(&cwd)?;
    tracing::info!(model = %cfg.model, data_dir = %cfg.data_dir.display(), "configuration loaded");

    let analyst = Analyst::initialize(&cfg);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let query = if args.is_empty() {
        DEFAULT_QUERY.to_string()
    } else {
        args.join(" ")
    };

    tracing::info!(%query, mode = ?analyst.mode(), "processing query");
    let response = analyst.process(&query).await;
    println!("{response}");

    Ok(())
}
