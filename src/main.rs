use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lambdafix_cli::config::{
	CONFIG_FILE_NAME, MergedConfig, discover_configs, generate_init_template, load_merged_config,
	merge_configs, user_config_path,
};
use lambdafix_cli::file::{WriteMode, read_source, write_source};
use lambdafix_cli::rewrite::{RandomIdents, Rewriter};

/// Script rewritten when neither the command line nor a config names one.
const DEFAULT_TARGET: &str = "combat_manager.gd";

/// Environment variable holding tracing filter directives.
const LOG_ENV: &str = "LAMBDAFIX_LOG";

#[derive(Parser)]
#[command(name = "lambdafix")]
#[command(
	author,
	version,
	about = "Hoist inline lambda callbacks in game scripts into named local variables"
)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Script to rewrite in place (default: config `target`, then combat_manager.gd)
	path: Option<PathBuf>,

	/// Print the rewritten script to stdout instead of writing it back
	#[arg(long)]
	dry_run: bool,

	/// Write through a temporary file and rename it over the target
	#[arg(long)]
	atomic: bool,

	/// Seed for generated identifiers, for reproducible output
	#[arg(long, value_name = "N")]
	seed: Option<u64>,

	/// Create a template .lambdafix.toml in the current directory
	#[arg(long)]
	init: bool,

	/// Overwrite existing .lambdafix.toml when using --init
	#[arg(long, requires = "init")]
	force: bool,

	/// Increase log verbosity (-v info, -vv debug)
	#[arg(short, long, action = ArgAction::Count)]
	verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Configuration management commands
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

#[derive(Subcommand)]
enum ConfigAction {
	/// Display the config cascade and the effective rules
	Show,
	/// Check all config files for errors without rewriting anything
	Validate,
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	match run(cli) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn init_tracing(verbose: u8) {
	let default_level = match verbose {
		0 => "warn",
		1 => "info",
		_ => "debug",
	};
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level)),
		)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}

fn run(cli: Cli) -> Result<ExitCode> {
	if cli.init {
		return handle_init(cli.force);
	}

	if let Some(ref command) = cli.command {
		return match command {
			Commands::Config { action } => match action {
				ConfigAction::Show => handle_config_show(),
				ConfigAction::Validate => handle_config_validate(),
			},
		};
	}

	handle_rewrite(&cli)
}

fn handle_init(force: bool) -> Result<ExitCode> {
	let config_path = PathBuf::from(CONFIG_FILE_NAME);

	if config_path.exists() && !force {
		anyhow::bail!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
	}

	std::fs::write(&config_path, generate_init_template())
		.with_context(|| format!("Failed to write {}", config_path.display()))?;

	println!("Created {CONFIG_FILE_NAME}");
	Ok(ExitCode::SUCCESS)
}

fn handle_rewrite(cli: &Cli) -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	let config = load_merged_config(&cwd).context("Failed to load configuration")?;

	let target = resolve_target(cli.path.as_deref(), &config);
	let mode = if cli.atomic || config.atomic.unwrap_or(false) {
		WriteMode::Atomic
	} else {
		WriteMode::InPlace
	};

	let rewriter = Rewriter::new(config.callback_rules(), config.indent())
		.context("Failed to build rewriter from configuration")?;
	let mut idents = match cli.seed {
		Some(seed) => RandomIdents::with_seed(seed),
		None => RandomIdents::new(),
	};

	let source =
		read_source(&target).with_context(|| format!("Failed to read {}", target.display()))?;
	let result = rewriter.rewrite(&source, &mut idents);
	info!(
		path = %target.display(),
		hoisted = result.count(),
		skipped = result.skipped_count(),
		"rewrite complete"
	);

	if cli.dry_run {
		print!("{}", result.text);
		eprintln!(
			"Dry run: {} inline lambda(s) would be rewritten in {}{}",
			result.count(),
			target.display(),
			skipped_suffix(result.skipped_count())
		);
		return Ok(ExitCode::SUCCESS);
	}

	write_source(&target, &result.text, mode)
		.with_context(|| format!("Failed to write {}", target.display()))?;

	println!(
		"Rewrote {} inline lambda(s) in {}{}",
		result.count(),
		target.display(),
		skipped_suffix(result.skipped_count())
	);
	if result.skipped.is_empty() {
		println!("All lambda errors fixed!");
	} else {
		let lines: Vec<String> = result.skipped.iter().map(|s| s.line.to_string()).collect();
		println!(
			"{} inline lambda(s) need manual fixing (lines {})",
			result.skipped_count(),
			lines.join(", ")
		);
	}
	Ok(ExitCode::SUCCESS)
}

fn skipped_suffix(skipped: usize) -> String {
	if skipped == 0 {
		String::new()
	} else {
		format!(", {} left unchanged", skipped)
	}
}

/// Command-line path, then the configured target, then the default script name.
fn resolve_target(cli_path: Option<&Path>, config: &MergedConfig) -> PathBuf {
	cli_path
		.map(Path::to_path_buf)
		.or_else(|| config.target.clone())
		.unwrap_or_else(|| PathBuf::from(DEFAULT_TARGET))
}

fn handle_config_show() -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	let configs = discover_configs(&cwd).context("Failed to discover config files")?;

	if configs.is_empty() {
		println!("No configuration files found.");
	} else {
		println!("Configuration files (in cascade order):\n");
	}

	for loaded in &configs {
		println!("# Source: {}", loaded.path.display());
		println!("# root: {}", loaded.config.root);
		if let Some(ref target) = loaded.config.target {
			println!("# target: {}", target.display());
		}
		if let Some(ref indent) = loaded.config.indent {
			println!("# indent: {:?}", indent);
		}
		if let Some(atomic) = loaded.config.atomic {
			println!("# atomic: {}", atomic);
		}
		println!(
			"# replace-default-rules: {}",
			loaded.config.replace_default_rules
		);
		println!("# rules: {}", loaded.config.rules.len());
		println!();
	}

	let merged = merge_configs(&configs);
	println!(
		"Effective target: {}",
		resolve_target(None, &merged).display()
	);
	println!("Effective indent: {:?}", merged.indent());
	println!("Effective rules (in priority order):");
	for (i, rule) in merged.callback_rules().iter().enumerate() {
		println!("  Rule {}:", i + 1);
		println!("    call: {}", rule.call);
		println!("    prefix: {}", rule.prefix);
		println!("    comment: {}", rule.comment);
	}
	println!();

	if let Ok(user_path) = user_config_path() {
		println!("User config path: {}", user_path.display());
		if user_path.exists() {
			println!("  (exists)");
		} else {
			println!("  (not found)");
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_config_validate() -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;

	match discover_configs(&cwd) {
		Ok(configs) => {
			if configs.is_empty() {
				println!("No configuration files found.");
				return Ok(ExitCode::SUCCESS);
			}

			let merged = merge_configs(&configs);
			if let Err(e) = Rewriter::new(merged.callback_rules(), merged.indent()) {
				eprintln!("Configuration error: {}", e);
				return Ok(ExitCode::FAILURE);
			}

			println!("All configuration files are valid:");
			for loaded in &configs {
				println!(
					"  {} ({} rules)",
					loaded.path.display(),
					loaded.config.rules.len()
				);
			}
			Ok(ExitCode::SUCCESS)
		}
		Err(e) => {
			eprintln!("Configuration error: {}", e);
			Ok(ExitCode::FAILURE)
		}
	}
}
