//! CLI schema for the meadow binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "meadow")]
#[command(about = "Compose blog posts with debounced undo history and an optional rewrite service")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Config file (defaults to `<config dir>/meadow/config.toml`)
	#[arg(long, short = 'c', value_name = "PATH", global = true)]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(long, short = 'v', global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Replay a JSON-lines action script against a fresh session
	Run {
		/// Script file (reads stdin when omitted or `-`)
		script: Option<PathBuf>,

		/// Ignore the configured rewrite service
		#[arg(long)]
		offline: bool,

		/// Directory that receives submitted posts as JSON files
		#[arg(long, value_name = "DIR")]
		outbox: Option<PathBuf>,
	},
	/// Print the effective configuration as TOML
	Config,
}

impl Command {
	/// Script path, `None` meaning stdin.
	pub fn script_path(&self) -> Option<&PathBuf> {
		match self {
			Self::Run { script, .. } => script.as_ref().filter(|path| path.as_os_str() != "-"),
			Self::Config => None,
		}
	}
}
