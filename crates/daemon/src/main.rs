//! lacquer binary.
//!
//! Runs the theme manager against an in-memory host: commands act on the
//! real theme and config files, while fragment injection is recorded only.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lacquer_catalog::ProcessFetcher;
use lacquer_core::{Host, MemoryHost};
use lacquer_daemon::{App, Settings};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "lacquer")]
#[command(about = "Theme manager for injectable style fragments")]
struct Args {
	/// Settings file (TOML)
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Keep themes applied and repair reloaded targets until interrupted
	Run,
	/// Print every loaded theme
	List,
	/// Enable a theme and its dependencies
	Enable { theme: String },
	/// Disable a theme
	Disable { theme: String },
	/// Select a patch option
	Set { theme: String, patch: String, value: String },
	/// Set a component value of a patch
	SetComponent {
		theme: String,
		patch: String,
		component: String,
		value: String,
	},
	/// Delete a user-installed theme
	Delete { theme: String },
	/// Print the remote catalog
	Catalog {
		/// Fetch again even if cached
		#[arg(long)]
		refresh: bool,
	},
	/// Install a theme from the catalog, with its missing dependencies
	Install { id: String },
	/// Print the backend protocol version
	Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let settings = Settings::load(args.config.as_deref()).context("loading settings")?;
	info!(themes = %settings.themes_dir.display(), "starting lacquer");

	let shutdown = CancellationToken::new();
	let host: Arc<dyn Host> = Arc::new(MemoryHost::new());
	let app = App::start(settings, host, Arc::new(ProcessFetcher), shutdown.clone())
		.await
		.context("starting lacquer")?;

	match args.command {
		Command::Run => {
			tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
			info!("shutting down");
			shutdown.cancel();
		}
		Command::List => print(&app.get_themes().await)?,
		Command::Enable { theme } => print(&app.set_theme_state(&theme, true).await)?,
		Command::Disable { theme } => print(&app.set_theme_state(&theme, false).await)?,
		Command::Set { theme, patch, value } => print(&app.set_patch_of_theme(&theme, &patch, &value).await)?,
		Command::SetComponent {
			theme,
			patch,
			component,
			value,
		} => print(&app.set_component_of_theme_patch(&theme, &patch, &component, &value).await)?,
		Command::Delete { theme } => print(&app.delete_theme(&theme).await)?,
		Command::Catalog { refresh } => {
			if refresh {
				print(&app.reload_theme_db_data().await)?;
			}
			print(&app.get_theme_db_data().await)?;
		}
		Command::Install { id } => print(&app.download_theme(&id).await)?,
		Command::Version => print(&app.backend_version())?,
	}

	app.shutdown().await;
	Ok(())
}

fn print(value: &impl Serialize) -> anyhow::Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = || {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("lacquer=debug,info")
			} else {
				EnvFilter::new("lacquer=info,warn")
			}
		})
	};

	if let Some(log_dir) = std::env::var("LACQUER_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("lacquer.{}.log", std::process::id()));

		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_target(true);

			tracing_subscriber::registry().with(filter()).with(file_layer).init();

			tracing::info!(path = ?log_path, "tracing initialized");
			return;
		}
	}

	tracing_subscriber::registry()
		.with(filter())
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();
}
