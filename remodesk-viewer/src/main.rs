//! Remodesk viewer — entry point and render loop.
//!
//! ```text
//! remodesk-viewer                    Connect with defaults
//! remodesk-viewer --config <path>    Use custom config TOML
//! remodesk-viewer --host <addr>      Override the host address
//! remodesk-viewer --gen-config      Dump default config and exit
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use remodesk_core::decode_image;
use remodesk_viewer::config::ViewerConfig;
use remodesk_viewer::input::translate;
use remodesk_viewer::receiver;
use remodesk_viewer::state::ViewerShared;
use remodesk_viewer::stats::{REPORT_TICKS, StatsWindow};
use remodesk_viewer::window::{Surface, SurfaceEvent};

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "remodesk-viewer", about = "Remodesk remote screen viewer")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short = 'c', long, default_value = "remodesk-viewer.toml")]
    config: PathBuf,

    /// Host to connect to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to connect to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        println!("{}", toml::to_string_pretty(&ViewerConfig::default())?);
        return Ok(());
    }

    let mut config = ViewerConfig::load(&cli.config)?;
    if let Some(host) = cli.host {
        config.connection.host = host;
    }
    if let Some(port) = cli.port {
        config.connection.port = port;
    }

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("remodesk-viewer v{}", env!("CARGO_PKG_VERSION"));

    // An unknown transport aborts here, before the first dial.
    config.connection.transport_kind()?;

    let shared = Arc::new(ViewerShared::new(config.start_size()));
    receiver::spawn(config.connection.clone(), Arc::clone(&shared));

    let mut surface = Surface::new("Remodesk Viewer", config.start_size())?;
    let mut stats = StatsWindow::start();
    let mut ticks = 0u32;

    while shared.running() {
        // 1. Local events → commands. Transforms read last tick's
        //    sizes; one stale tick is harmless.
        let viewport = shared.sizes.requested();
        let negotiated = shared.sizes.current();
        for event in surface.poll() {
            match event {
                SurfaceEvent::Quit => shared.stop(),
                SurfaceEvent::Resized(size) => shared.sizes.note_requested(size),
                ref input_event => {
                    if let Some(cmd) = translate(input_event, viewport, negotiated) {
                        if let Err(e) = shared.link.send(&cmd) {
                            warn!("input send failed: {e}");
                        }
                    }
                }
            }
        }
        if !shared.running() {
            break;
        }

        // 2. Reconcile the size triple: a new negotiated resolution
        //    recreates the surface at that size.
        if let Some(size) = shared.sizes.pending_adopt() {
            info!("adopting negotiated resolution {size}");
            surface.recreate(size)?;
            shared.sizes.adopt(size);
        }

        // 3. Draw the freshest frame, if any arrived.
        match shared.cell.snapshot() {
            Some(bytes) => match decode_image(&bytes) {
                Ok(image) => {
                    if let Err(e) = surface.blit(&image) {
                        warn!("blit failed: {e}");
                    }
                }
                Err(e) => {
                    warn!("frame decode failed: {e}");
                    surface.idle();
                }
            },
            None => surface.idle(),
        }

        // 4. Periodic rate report in the title.
        ticks += 1;
        if ticks == REPORT_TICKS {
            ticks = 0;
            let (frames, bytes) = shared.counters.snapshot();
            shared.counters.reset();
            let (fps, kbps) = stats.report(frames, bytes);
            surface.set_title(&format!(
                "Remodesk Viewer - {} - {fps:.2} fps - {kbps} Kbps",
                shared.status()
            ));
        }
    }

    info!("viewer exiting");
    Ok(())
}
