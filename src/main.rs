//! xframe-filter server.
//!
//! ```text
//!     Client Request ──▶ listener ──▶ router ──▶ handler / admin API
//!                                                    │
//!     Client Response ◀── XFrameLayer ◀──────────────┘
//!                             │
//!                             └── PolicyStore::current()
//!                                     ▲
//!                      admin update ──┤
//!                 file watcher/SIGHUP ┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use xframe_filter::config::loader::load_config;
use xframe_filter::lifecycle::{signals, startup};
use xframe_filter::observability::{logging, metrics};
use xframe_filter::{HttpServer, ServiceConfig, Shutdown};

#[derive(Parser)]
#[command(name = "xframe-filter")]
#[command(about = "Serve responses decorated with a configurable X-Frame-Options header", long_about = None)]
struct Args {
    /// Service configuration file (TOML). Built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init_logging(&config.observability);

    tracing::info!("xframe-filter v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        admin_enabled = config.admin.enabled,
        policy_path = ?config.policy.path,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = startup::open_store(&config.policy);
    let _watcher = startup::start_watcher(&config.policy, store.clone());
    signals::reload_on_hangup(store.clone());

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, store);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
