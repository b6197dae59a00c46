use clap::{Arg, ArgAction, Command};
use std::error::Error;
use std::path::{Path, PathBuf};

use keepr::config::{self, Configuration};
use keepr::engine::BackupEngine;
use keepr::logging;
use keepr::store::Store;
use keepr::util::{human_size, CancelFlag};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
	let matches = Command::new("keepr")
		.version("0.1.0")
		.about("Personal file-versioning backup tool")
		.subcommand_required(true)
		.arg(
			Arg::new("config")
				.short('c')
				.long("config")
				.value_name("FILE")
				.help("Configuration file (default: ~/.keepr/config.json)"),
		)
		.arg(
			Arg::new("verbose")
				.short('v')
				.long("verbose")
				.action(ArgAction::SetTrue)
				.help("Enable debug logging"),
		)
		.subcommand(Command::new("init").about("Write a default configuration file"))
		.subcommand(Command::new("backup").about("Back up all monitored folders now"))
		.subcommand(
			Command::new("list").about("List recorded files").arg(
				Arg::new("versions")
					.long("versions")
					.action(ArgAction::SetTrue)
					.help("Show the version history of each file"),
			),
		)
		.subcommand(Command::new("status").about("Show configuration and database status"))
		.subcommand(
			Command::new("prune")
				.about("Delete old versions beyond the configured retention count"),
		)
		.get_matches();

	logging::init_tracing(matches.get_flag("verbose"));

	let config_path = matches
		.get_one::<String>("config")
		.map(PathBuf::from)
		.unwrap_or_else(config::default_config_path);

	match matches.subcommand() {
		Some(("init", _)) => cmd_init(&config_path),
		Some(("backup", _)) => cmd_backup(&config_path).await,
		Some(("list", sub)) => cmd_list(&config_path, sub.get_flag("versions")),
		Some(("status", _)) => cmd_status(&config_path),
		Some(("prune", _)) => cmd_prune(&config_path),
		_ => unreachable!("subcommand required"),
	}
}

fn cmd_init(config_path: &Path) -> Result<(), Box<dyn Error>> {
	if config_path.exists() {
		return Err(format!(
			"Configuration already exists: {} (edit it instead)",
			config_path.display()
		)
		.into());
	}

	let mut config = Configuration::default();
	config.save(config_path)?;
	println!("Wrote default configuration to {}", config_path.display());
	println!("Add monitored folders before running 'keepr backup'.");
	Ok(())
}

async fn cmd_backup(config_path: &Path) -> Result<(), Box<dyn Error>> {
	let config = Configuration::load(config_path)?;
	config.validate()?;

	let store = Store::open(&config.database_location)?;

	// Ctrl-C requests cooperative cancellation; the engine stops before the
	// next file and the run transaction rolls back
	let cancel = CancelFlag::new();
	{
		let cancel = cancel.clone();
		tokio::spawn(async move {
			if tokio::signal::ctrl_c().await.is_ok() {
				warn!("Interrupt received, aborting run...");
				cancel.cancel();
			}
		});
	}

	let engine = BackupEngine::new(&store, &config);
	let summaries = engine.run_all(&cancel).await?;

	for summary in &summaries {
		println!(
			"{}: {} added, {} modified, {} moved, {} deleted, {} unchanged, {} skipped",
			summary.root.display(),
			summary.added,
			summary.modified,
			summary.moved,
			summary.deleted,
			summary.unchanged,
			summary.skipped
		);
	}
	Ok(())
}

fn cmd_list(config_path: &Path, show_versions: bool) -> Result<(), Box<dyn Error>> {
	let config = Configuration::load(config_path)?;
	let store = Store::open(&config.database_location)?;

	let files = store.all_files()?;
	if files.is_empty() {
		println!("No files recorded yet.");
		return Ok(());
	}

	for file in &files {
		if file.is_deleted {
			println!(
				"{} [deleted at {}]",
				file.full_path().display(),
				file.deleted_version.unwrap_or(0)
			);
		} else {
			println!("{}", file.full_path().display());
		}

		if show_versions {
			for version in store.versions_for(&file.id)? {
				println!(
					"    {}  {}  {}  {}",
					version.version_number,
					human_size(version.size),
					version.created_at.format("%Y-%m-%d %H:%M:%S"),
					&version.hash[..12.min(version.hash.len())]
				);
			}
		}
	}
	Ok(())
}

fn cmd_status(config_path: &Path) -> Result<(), Box<dyn Error>> {
	let config = Configuration::load(config_path)?;

	println!("Configuration: {}", config_path.display());
	println!("  monitored folders:  {}", config.monitored_folders.len());
	for folder in &config.monitored_folders {
		let marker = if folder.is_dir() { "" } else { "  (missing!)" };
		println!("    {}{}", folder.display(), marker);
	}
	println!("  versions to keep:   {}", config.versions_to_keep);
	println!("  auto interval:      {} min", config.auto_backup_interval_minutes);
	println!("  compression:        {}", config.enable_compression);
	println!("  database:           {}", config.database_location.display());

	if !config.database_location.exists() {
		println!("Database not created yet (run 'keepr backup').");
		return Ok(());
	}

	let db_size = std::fs::metadata(&config.database_location)?.len();
	let store = Store::open(&config.database_location)?;
	let files = store.all_files()?;
	let live = files.iter().filter(|f| !f.is_deleted).count();

	println!("Database:");
	println!("  size:               {}", human_size(db_size));
	println!("  files:              {} ({} live, {} deleted)", files.len(), live, files.len() - live);
	println!("  versions:           {}", store.version_count()?);

	if config.max_database_size_mb > 0 {
		let limit = config.max_database_size_mb as u64 * 1024 * 1024;
		if db_size > limit {
			println!(
				"WARNING: database exceeds the configured bound of {} MB, consider 'keepr prune'",
				config.max_database_size_mb
			);
		}
	}
	Ok(())
}

fn cmd_prune(config_path: &Path) -> Result<(), Box<dyn Error>> {
	let config = Configuration::load(config_path)?;
	if config.versions_to_keep == 0 {
		return Err("versions_to_keep must be greater than 0".into());
	}

	let store = Store::open(&config.database_location)?;
	let pruned = store.prune(config.versions_to_keep as usize)?;
	println!(
		"Pruned {} version(s), keeping the newest {} per file.",
		pruned, config.versions_to_keep
	);
	Ok(())
}

// vim: ts=4
