//! Issue tracker management CLI
//!
//! ```text
//! manage runserver [ADDRESS]   serve the API until Ctrl-C
//! manage check                 validate settings and ping the store
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use issuetracker::config::settings::{Settings, get_settings, open_store};
use issuetracker::config::urls;
use issuetracker_server::{ShutdownCoordinator, serve_with_shutdown, shutdown_signal};
use std::net::SocketAddr;
use std::process;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "manage")]
#[command(about = "Issue tracker management interface", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Start the API server
	Runserver {
		/// Server address (default: host and port from settings)
		#[arg(value_name = "ADDRESS")]
		address: Option<String>,
	},

	/// Check the settings and the document store
	Check,
}

fn init_tracing(settings: &Settings) {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer())
		.init();
}

async fn run_runserver(settings: Settings, address: Option<String>) -> Result<()> {
	let addr: SocketAddr = match address {
		Some(address) => address
			.parse()
			.with_context(|| format!("invalid server address '{}'", address))?,
		None => settings.bind_addr()?,
	};

	let store = open_store(&settings)
		.await
		.context("failed to open the document store")?;
	let handler = urls::handler(store).context("invalid URL configuration")?;

	let coordinator = ShutdownCoordinator::new(settings.shutdown_timeout());
	let trigger = coordinator.clone();
	tokio::spawn(async move {
		shutdown_signal().await;
		tracing::info!("shutdown signal received");
		trigger.shutdown();
	});

	tracing::info!(%addr, debug = settings.debug, "starting issue tracker");
	serve_with_shutdown(addr, handler, coordinator)
		.await
		.map_err(|e| anyhow::anyhow!(e))
		.context("server error")
}

async fn run_check(settings: Settings) -> Result<()> {
	let store = open_store(&settings)
		.await
		.context("failed to open the document store")?;
	store
		.health_check()
		.await
		.context("document store health check failed")?;
	urls::url_patterns(store).context("invalid URL configuration")?;

	println!(
		"System check identified no issues (store: {}, collection: {}).",
		settings.database_url,
		settings.collection
	);
	Ok(())
}

async fn run() -> Result<()> {
	let cli = Cli::parse();
	let settings = get_settings().context("failed to load settings")?;
	init_tracing(&settings);

	match cli.command {
		Commands::Runserver { address } => run_runserver(settings, address).await,
		Commands::Check => run_check(settings).await,
	}
}

#[tokio::main]
async fn main() {
	if let Err(e) = run().await {
		eprintln!("Error: {:#}", e);
		process::exit(1);
	}
}
