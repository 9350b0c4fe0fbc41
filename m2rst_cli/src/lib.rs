use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct M2rstCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Initialize a project by creating a sample m2rst.toml.
	Init,
	/// Reformat every source file's leading comment block into an .rst
	/// fragment in the output directory.
	Format {
		/// Show what would be written without writing files.
		#[arg(long, default_value_t = false)]
		dry_run: bool,
		/// Compare against the existing output files and fail when any are
		/// stale or missing.
		#[arg(long, default_value_t = false)]
		check: bool,
	},
	/// Build and print the heuristic call graph for the source directory.
	Graph {
		/// Output format.
		#[arg(long, value_enum, default_value = "text")]
		format: GraphFormat,
	},
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum GraphFormat {
	Text,
	Json,
}
