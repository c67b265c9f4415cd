use std::env;
use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use rdflangserver::cache::resolve_cache_dir;
use rdflangserver::completion::CompletionEngine;
use rdflangserver::config::Settings;
use rdflangserver::server;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Listen for one client on a TCP socket instead of stdio
    #[arg(long)]
    tcp: bool,

    /// Address to listen on with --tcp
    #[arg(long, default_value = "127.0.0.1:7612")]
    address: SocketAddr,

    /// Vocabulary cache directory (overrides settings and discovery)
    #[arg(long)]
    cache_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let root_dir = env::current_dir()?;
    let mut settings = Settings::new(&root_dir)?;
    if let Some(cache_dir) = cli.cache_dir {
        settings.cache_dir = cache_dir;
    }

    let cache_dir = resolve_cache_dir(&settings.cache_dir)
        .context("Could not create a vocabulary cache directory")?;
    info!("Using vocabulary cache '{}'", cache_dir.display());

    let engine = CompletionEngine::from_settings(&settings, cache_dir);

    if cli.tcp {
        server::run_tcp(cli.address, settings, engine).await?;
    } else {
        server::run_stdio(settings, engine).await;
    }

    Ok(())
}
