//! Remodesk host — entry point.
//!
//! ```text
//! remodesk-host                     Serve with defaults
//! remodesk-host --config <path>     Use custom config TOML
//! remodesk-host --listen <ip:port>  Override the listen address
//! remodesk-host --gen-config       Dump default config and exit
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use remodesk_host::capture::{ScrapSource, ScreenSource, SourceFactory};
use remodesk_host::config::HostConfig;
use remodesk_host::inject::SystemInput;
use remodesk_host::session::Session;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "remodesk-host", about = "Remodesk screen-streaming host")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "remodesk-host.toml")]
    config: PathBuf,

    /// Listen address (overrides config). Example: 0.0.0.0:2222
    #[arg(short, long)]
    listen: Option<String>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        println!("{}", toml::to_string_pretty(&HostConfig::default())?);
        return Ok(());
    }

    let mut config = HostConfig::load(&cli.config)?;
    if let Some(listen) = cli.listen {
        let addr: std::net::SocketAddr = listen.parse()?;
        config.server.ip = addr.ip().to_string();
        config.server.port = addr.port();
    }

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("remodesk-host v{}", env!("CARGO_PKG_VERSION"));

    // Unsupported formats abort here, before any socket is bound.
    let format = config.video_format()?;
    info!(
        "streaming {} q{} at {}, compression level {}",
        format,
        config.video.quality,
        config.target_size(),
        config.general.compression
    );
    if config.audio.enable {
        info!("audio streaming is not implemented; ignoring [audio] section");
    }

    let factory = Box::new(|| -> SourceFactory {
        Box::new(|| {
            let source = ScrapSource::new()?;
            Ok(Box::new(source) as Box<dyn ScreenSource>)
        })
    });
    let session = Session::new(config, factory, Arc::new(SystemInput::new()))?;
    session.run().await?;

    Ok(())
}
