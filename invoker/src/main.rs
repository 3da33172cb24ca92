use std::path::PathBuf;
use std::sync::Arc;
use clap::{Parser, Subcommand};
use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use invoker::{build_coordinator, ApiServer, ApiServerConfig, ConfigOverrides, ServiceConfig};
use invoker_cache::ViewerId;

#[derive(Parser)]
#[command(name = "invoker")]
#[command(about = "Per-viewer recommendation service with tiered caching", long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "INVOKER_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Print the effective configuration
    Config,

    /// Resolve recommendations for one viewer and print them
    Recommend {
        /// Viewer to look up
        viewer_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "invoker=info,invoker_cache=info,tower_http=info".into())
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = ServiceConfig::load(cli.config.as_deref())?;
    config.apply(&cli.overrides);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let coordinator = Arc::new(build_coordinator(&config).await?);
            let server = ApiServer::new(
                ApiServerConfig {
                    host: config.host.clone(),
                    port: config.port,
                },
                coordinator,
            );
            server.start().await?;
        }

        Commands::Config => {
            config.validate()?;
            print!("{}", serde_yaml::to_string(&config.redacted())?);
        }

        Commands::Recommend { viewer_id } => {
            let viewer = ViewerId::parse(viewer_id)?;
            let coordinator = build_coordinator(&config).await?;
            let resolution = coordinator.get_or_compute(&viewer).await?;

            println!("Served from {} tier", resolution.tier);
            for result in &resolution.results {
                println!("  {:<12} {}", result.source_name(), result.value());
            }
        }
    }

    Ok(())
}
