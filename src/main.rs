use std::io::Read;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use promptpress::{config, gateway, render};

#[derive(Parser)]
#[command(name = "promptpress")]
#[command(about = "A tiny gateway that turns LLM chat completions into safe, embeddable HTML")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server
    Gateway {
        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Bind address (overrides config)
        #[arg(short, long)]
        bind: Option<String>,

        /// Auth token (required for non-loopback)
        #[arg(long, env = "PROMPTPRESS_TOKEN")]
        token: Option<String>,
    },

    /// Render text from a file (or stdin) to HTML on stdout
    Render {
        /// Input file; reads stdin when omitted
        file: Option<std::path::PathBuf>,
    },

    /// Show configuration summary
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Gateway { port, bind, token } => {
            let mut config = config::load()?;
            if let Some(port) = port {
                config.gateway.port = port;
            }
            if let Some(bind) = bind {
                config.gateway.bind = bind;
            }
            gateway::run(config, token).await
        }

        Commands::Render { file } => {
            let text = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            println!("{}", render::render(Some(&text)));
            Ok(())
        }

        Commands::Status => {
            let config = config::load()?;
            println!("promptpress v{}", env!("CARGO_PKG_VERSION"));
            println!("gateway: {}:{}", config.gateway.bind, config.gateway.port);
            println!(
                "provider: {} ({})",
                config.model.provider, config.model.model
            );
            println!(
                "api key: {}",
                if config.model.api_key.is_some() {
                    "configured"
                } else {
                    "missing"
                }
            );
            Ok(())
        }
    }
}
