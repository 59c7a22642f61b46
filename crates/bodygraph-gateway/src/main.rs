//! Bodygraph gateway binary: HTTP server and offline chart resolution

use anyhow::Context;
use bodygraph_gateway::{render_svg, start_gateway, BindMode, ChartReport, GatewayConfig, ResolveRequest};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bodygraph", about = "Bodygraph chart resolver and gateway")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
        /// "loopback" or "lan"
        #[arg(short, long)]
        bind: Option<String>,
        /// Base URL of the calculation service
        #[arg(long)]
        service_url: Option<String>,
        /// TOML config file
        #[arg(short, long, default_value = "bodygraph.toml")]
        config: PathBuf,
        /// Print the effective config as TOML and exit
        #[arg(long)]
        print_config: bool,
    },
    /// Resolve activations from a JSON file and print the chart report
    Resolve {
        /// File holding {"personality": [...], "design": [...]}
        file: PathBuf,
        /// Also write the bodygraph as SVG
        #[arg(long)]
        svg: Option<PathBuf>,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bodygraph=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Serve {
            port,
            bind,
            service_url,
            config,
            print_config,
        } => {
            let mut config = GatewayConfig::load(&config).with_env();
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(bind) = bind {
                config.server.bind = BindMode::from_flag(&bind);
            }
            if let Some(url) = service_url {
                config.service.base_url = url;
            }
            if print_config {
                print!("{}", config.to_toml());
                return Ok(());
            }
            start_gateway(config).await?;
        }

        Commands::Resolve { file, svg } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let request: ResolveRequest = serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", file.display()))?;
            let activations = request.to_activation_set()?;
            let report = ChartReport::build(request.name, &activations);

            if let Some(path) = svg {
                std::fs::write(&path, render_svg(&report.layout))
                    .with_context(|| format!("writing {}", path.display()))?;
                tracing::info!("Wrote {}", path.display());
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Version => {
            println!("bodygraph v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
