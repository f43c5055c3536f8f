use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use dynamic_watermark::infrastructure::axum_handler::{router, AppState};
use dynamic_watermark::infrastructure::config::AppConfig;
use dynamic_watermark::infrastructure::file_storage::LocalFileStorage;
use dynamic_watermark::infrastructure::logging;
use dynamic_watermark::{WatermarkService, WatermarkSpec};

#[derive(Parser, Debug)]
#[command(name = "dynamic_watermark", version, about = "Stamp an image or text watermark onto a remote image")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watermark one image and write the result to a file
    Apply {
        /// URL, data URL or local path of the base image
        #[arg(long)]
        base: String,

        #[command(flatten)]
        watermark: WatermarkArgs,

        /// top-left, top-right, center, bottom-left or bottom-right
        #[arg(long, default_value = "center")]
        position: String,

        #[arg(long, default_value = "watermarked-image.png")]
        output: String,
    },
    /// Serve the HTTP API
    Serve,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct WatermarkArgs {
    /// URL, data URL or local path of a watermark image
    #[arg(long)]
    image: Option<String>,

    /// Literal watermark text
    #[arg(long)]
    text: Option<String>,
}

impl WatermarkArgs {
    fn into_spec(self) -> Result<WatermarkSpec> {
        match (self.image, self.text) {
            (Some(locator), None) => Ok(WatermarkSpec::Image(locator)),
            (None, Some(text)) => Ok(WatermarkSpec::Text(text)),
            _ => Err(anyhow!("exactly one of --image or --text is required")),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    logging::init_subscriber(&config.log.filter)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    let service = Arc::new(WatermarkService::from_config(&config)?);

    match cli.command {
        Command::Apply {
            base,
            watermark,
            position,
            output,
        } => {
            let spec = watermark.into_spec()?;
            let applied = service.apply(&base, &spec, &position, &output).await?;
            println!("Watermarked image saved to {}", applied.location);
        }
        Command::Serve => {
            let addr: SocketAddr = config
                .server
                .bind
                .parse()
                .with_context(|| format!("Invalid bind address {}", config.server.bind))?;
            let state = AppState {
                watermark_service: service,
                file_storage: Arc::new(LocalFileStorage::new()),
                output_path: config.server.output_path.to_string_lossy().into_owned(),
            };

            tracing::info!(%addr, "listening");
            axum::Server::bind(&addr)
                .serve(router(state).into_make_service())
                .await
                .context("HTTP server failed")?;
        }
    }

    Ok(())
}
