//! curvemon - Entry Point
//!
//! `watch` follows the live curve feed, `serve`/`invoke` answer requests for
//! the dashboard bundle, `package` stages the bundle for deployment.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use curvemon_app::app::EventSource;
use curvemon_app::{AppConfig, Application};
use curvemon_feed::FeedMode;
use tracing::info;

/// Live yield curve monitor
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via CURVEMON_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Follow the curve feed and render the dashboard (default)
    Watch {
        /// Feed endpoint, overrides config and STREAM_URL
        #[arg(long)]
        url: Option<String>,
        /// Poll the endpoint instead of opening an event stream
        #[arg(long)]
        poll: bool,
        /// Write the chart SVG here on every new curve
        #[arg(long)]
        svg_out: Option<PathBuf>,
        /// Print snapshots as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Serve the dashboard bundle over HTTP
    Serve {
        #[arg(long)]
        dist: Option<PathBuf>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Answer one API Gateway event (file path or `-` for stdin)
    Invoke {
        event: String,
        #[arg(long)]
        dist: Option<PathBuf>,
    },
    /// Build and stage the deployable bundle
    Package {
        /// Skip the frontend build command
        #[arg(long)]
        skip_build: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    curvemon_telemetry::init_logging()?;

    info!("Starting curvemon v{}", env!("CARGO_PKG_VERSION"));

    let config_path = AppConfig::resolve_path(args.config);
    info!(config_path = %config_path, "Loading configuration");

    let mut config = AppConfig::load(&config_path)?;
    config.apply_env();

    let command = args.command.unwrap_or(Command::Watch {
        url: None,
        poll: false,
        svg_out: None,
        json: false,
    });

    match command {
        Command::Watch {
            url,
            poll,
            svg_out,
            json,
        } => {
            if let Some(url) = url {
                config.feed.url = Some(url);
            }
            if poll {
                config.feed.mode = FeedMode::Poll;
            }
            if svg_out.is_some() {
                config.dashboard.svg_out = svg_out;
            }
            config.dashboard.json |= json;

            let app = Application::new(config);
            let mut stdout = std::io::stdout();
            app.run_watch(&mut stdout, shutdown_signal()).await?;
        }
        Command::Serve { dist, port } => {
            if let Some(dist) = dist {
                config.site.dist_dir = dist;
            }
            if let Some(port) = port {
                config.site.port = port;
            }
            Application::new(config).run_serve(shutdown_signal()).await?;
        }
        Command::Invoke { event, dist } => {
            if let Some(dist) = dist {
                config.site.dist_dir = dist;
            }
            let response = Application::new(config).invoke(&EventSource::from(event.as_str()))?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Package { skip_build } => {
            let staged = Application::new(config).package(skip_build)?;
            info!(staged = %staged.display(), "Package ready");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
