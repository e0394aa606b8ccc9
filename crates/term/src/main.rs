//! Meadow blog composer driver.
//!
//! Replays JSON-lines action scripts against a composer session and prints
//! one JSON report per action.

mod cli;
mod config;
mod outbox;
mod script;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command};
use meadow_composer::{ComposerSession, RewriteService};
use meadow_rewrite::DisabledRewriter;
use outbox::Outbox;
use script::{Runner, parse_script, session_config};
use tokio::io::AsyncReadExt;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let config = config::load(cli.config.as_deref())?;

	match cli.command {
		Command::Config => {
			print!("{}", toml::to_string_pretty(&config).context("serializing config")?);
			Ok(())
		}
		Command::Run {
			ref script,
			offline,
			ref outbox,
		} => {
			let text = read_script(cli.command.script_path()).await?;
			let steps = parse_script(&text).with_context(|| format!("parsing {}", describe(script.as_ref())))?;

			let service_available = !offline && config.rewrite.is_enabled();
			let service: Arc<dyn RewriteService> = if service_available {
				meadow_rewrite::build_service(&config.rewrite)
			} else {
				Arc::new(DisabledRewriter)
			};
			let outbox = Outbox::new(outbox.clone());
			let session = ComposerSession::open(session_config(config.composer, service_available), service);
			let mut runner = Runner::new(session, &outbox);

			info!(steps = steps.len(), "running script");
			for step in steps {
				let report = runner.step(step).await;
				println!("{}", serde_json::to_string(&report)?);
			}

			let draft = runner.finish();
			info!(posted = outbox.posted(), title = %draft.title, "session closed");
			Ok(())
		}
	}
}

async fn read_script(path: Option<&PathBuf>) -> anyhow::Result<String> {
	match path {
		Some(path) => tokio::fs::read_to_string(path)
			.await
			.with_context(|| format!("reading {}", path.display())),
		None => {
			let mut text = String::new();
			tokio::io::stdin().read_to_string(&mut text).await.context("reading stdin")?;
			Ok(text)
		}
	}
}

fn describe(script: Option<&PathBuf>) -> String {
	script.map_or_else(|| "stdin".to_string(), |path| path.display().to_string())
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let default_filter = if verbose {
		"meadow_composer=trace,meadow_rewrite=debug,meadow_term=debug,info"
	} else {
		"warn"
	};
	let filter = || {
		EnvFilter::try_from_env("MEADOW_LOG")
			.or_else(|_| EnvFilter::try_from_default_env())
			.unwrap_or_else(|_| EnvFilter::new(default_filter))
	};

	// MEADOW_LOG_DIR sends logs to a per-process file instead of stderr.
	if let Some(log_dir) = std::env::var("MEADOW_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("meadow.{}.log", std::process::id()));

		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_target(true);

			tracing_subscriber::registry().with(filter()).with(file_layer).init();

			tracing::info!(path = ?log_path, "meadow tracing initialized");
			return;
		}
	}

	// Reports own stdout, so logs stay on stderr.
	tracing_subscriber::fmt()
		.with_env_filter(filter())
		.with_writer(std::io::stderr)
		.init();
}
