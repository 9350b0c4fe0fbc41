use std::path::PathBuf;
use std::process;

use clap::Parser;
use m2rst_cli::Commands;
use m2rst_cli::GraphFormat;
use m2rst_cli::M2rstCli;
use m2rst_core::CallGraph;
use m2rst_core::DocFilter;
use m2rst_core::M2rstConfig;
use m2rst_core::M2rstError;
use m2rst_core::UnitKind;
use m2rst_core::source_scanner::build_exclude_set;
use m2rst_core::source_scanner::extract_comment_block;
use m2rst_core::source_scanner::function_name;
use m2rst_core::source_scanner::is_function_source;
use m2rst_core::source_scanner::list_source_files;
use owo_colors::OwoColorize;
use owo_colors::Stream;
use similar::TextDiff;

fn main() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_writer(std::io::stderr)
		.try_init();

	let args = M2rstCli::parse();

	let result = match args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Format { dry_run, check }) => run_format(&args, dry_run, check),
		Some(Commands::Graph { format }) => run_graph(&args, format),
		None => {
			eprintln!("No subcommand specified. Run `m2rst --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		eprintln!("error: {e}");
		process::exit(1);
	}
}

fn resolve_root(args: &M2rstCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn run_init(args: &M2rstCli) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config_path = root.join("m2rst.toml");

	if config_path.exists() {
		println!("Config file already exists: {}", config_path.display());
		return Ok(());
	}

	let sample_content = "# Directory containing the source files to document.\nsource_dir = \
	                      \"src\"\n\n# Where `m2rst format` writes rendered .rst \
	                      fragments.\noutput_dir = \"doc/api\"\n\n# Recognized source extensions \
	                      and the line comment marker.\nextensions = [\"m\"]\ncomment_prefix = \
	                      \"%\"\n\n[exclude]\npatterns = [\"Contents.m\"]\n\n[filter]\n\
	                      remove_license = true\nm2html_style = true\nformat_fixes = \
	                      true\nparam_placeholders = true\n";

	std::fs::write(&config_path, sample_content)?;
	println!("Created config file: {}", config_path.display());
	println!();
	println!("Next steps:");
	println!("  1. Point `source_dir` at your source directory");
	println!("  2. Run `m2rst graph` to inspect the detected call graph");
	println!("  3. Run `m2rst format` to write the reformatted .rst fragments");

	Ok(())
}

fn run_format(args: &M2rstCli, dry_run: bool, check: bool) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = M2rstConfig::load_or_default(&root)?;
	let source_dir = config
		.resolved_source_dir(&root)
		.ok_or(M2rstError::NoSourceDir)?;
	if !source_dir.is_dir() {
		return Err(M2rstError::MissingSourceDir(source_dir.display().to_string()).into());
	}

	let exclude = build_exclude_set(&config.exclude.patterns);
	let files = list_source_files(&source_dir, &config.extensions, &exclude)?;
	let output_dir = config.resolved_output_dir(&root);
	let mut filter = DocFilter::new(config.clone(), root.clone());

	if args.verbose {
		println!("Scanning {} source file(s) in {}", files.len(), source_dir.display());
	}

	let mut stale = 0usize;
	let mut written = 0usize;
	let mut planned = 0usize;

	for file in &files {
		let Some(name) = function_name(file) else {
			continue;
		};
		let content = match std::fs::read_to_string(file) {
			Ok(content) => content,
			Err(e) => {
				eprintln!("warning: skipping unreadable file {}: {e}", file.display());
				continue;
			}
		};

		let mut block = extract_comment_block(&content, &config.comment_prefix);
		if block.is_empty() {
			if args.verbose {
				println!("  no comment block in {}", file.display());
			}
			continue;
		}

		let kind = if is_function_source(&content) {
			UnitKind::Function
		} else {
			UnitKind::Script
		};
		filter.process_docstring(kind, name, &mut block);

		let rendered = format!("{}\n", block.join("\n"));
		let target = output_dir.join(format!("{name}.rst"));

		if check {
			let existing = std::fs::read_to_string(&target).unwrap_or_default();
			if existing != rendered {
				println!(
					"{} {}",
					"stale:".if_supports_color(Stream::Stdout, |text| text.yellow()),
					target.display()
				);
				let diff = TextDiff::from_lines(existing.as_str(), rendered.as_str());
				print!("{}", diff.unified_diff().header("on disk", "generated"));
				stale += 1;
			}
		} else if dry_run {
			println!("would write {}", target.display());
			planned += 1;
		} else {
			std::fs::create_dir_all(&output_dir)?;
			std::fs::write(&target, &rendered)?;
			written += 1;
			if args.verbose {
				println!("  wrote {}", target.display());
			}
		}
	}

	if check {
		if stale == 0 {
			println!(
				"{}",
				"All output files are up to date."
					.if_supports_color(Stream::Stdout, |text| text.green())
			);
			Ok(())
		} else {
			eprintln!("\n{stale} output file(s) are stale. Run `m2rst format` to regenerate.");
			process::exit(1);
		}
	} else if dry_run {
		println!(
			"Dry run: would write {planned} file(s) to {}",
			output_dir.display()
		);
		Ok(())
	} else {
		println!("Wrote {written} file(s) to {}", output_dir.display());
		Ok(())
	}
}

fn run_graph(args: &M2rstCli, format: GraphFormat) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = M2rstConfig::load_or_default(&root)?;
	let source_dir = config
		.resolved_source_dir(&root)
		.ok_or(M2rstError::NoSourceDir)?;
	let exclude = build_exclude_set(&config.exclude.patterns);
	let graph = CallGraph::build(&source_dir, &config.extensions, &exclude)?;

	match format {
		GraphFormat::Json => println!("{}", serde_json::to_string_pretty(&graph)?),
		GraphFormat::Text => {
			if args.verbose {
				let total: usize = graph.calls.values().map(|callees| callees.len()).sum();
				println!("{} function(s), {total} detected call(s)", graph.len());
			}
			for (func, callees) in &graph.calls {
				if !callees.is_empty() {
					let joined = callees.iter().map(String::as_str).collect::<Vec<_>>();
					println!("{func} calls: {}", joined.join(", "));
				}
			}
			for (func, callers) in &graph.called_by {
				if !callers.is_empty() {
					let joined = callers.iter().map(String::as_str).collect::<Vec<_>>();
					println!("{func} is called by: {}", joined.join(", "));
				}
			}
		}
	}

	Ok(())
}
