//! Change-detection and reconciliation engine
//!
//! One backup invocation fixes a single run stamp, then reconciles each
//! monitored root independently: enumerate the disk, load the recorded live
//! files, classify every observed file as unchanged / modified / moved /
//! new, and soft-delete whatever was recorded but is no longer observed.
//!
//! All writes of one root go through a single run transaction; a store
//! failure anywhere aborts the run and rolls the transaction back, leaving
//! the previously persisted history untouched. Per-file read failures are
//! tolerated: the file is skipped (and kept out of the soft-delete set), the
//! run continues.
//!
//! Matching is keyed by the file's full path. A recorded file that vanished
//! from its path while a file with an identical fingerprint appeared at a
//! new path is treated as a move: the record is updated in place, keeping
//! its identity and version history, and no delete/create pair is written.

use crate::config::Configuration;
use crate::error::BackupError;
use crate::hash;
use crate::logging::*;
use crate::scan;
use crate::stamp;
use crate::store::{BackupStore, RunWrite};
use crate::types::{FileRecord, LiveFile, RunSummary, VersionRecord};
use crate::util::CancelFlag;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Reconciliation engine over an abstract store
pub struct BackupEngine<'a, S: BackupStore> {
	store: &'a S,
	config: &'a Configuration,
}

impl<'a, S: BackupStore> BackupEngine<'a, S> {
	/// The configuration is expected to be validated by the caller
	pub fn new(store: &'a S, config: &'a Configuration) -> Self {
		BackupEngine { store, config }
	}

	/// Run one backup over every monitored folder.
	///
	/// The run stamp is computed once, before any enumeration, and shared by
	/// every change across every root.
	pub async fn run_all(&self, cancel: &CancelFlag) -> Result<Vec<RunSummary>, BackupError> {
		let run_stamp = stamp::run_stamp_now();
		info!("Starting backup run {}", run_stamp);

		let mut summaries = Vec::new();
		for root in &self.config.monitored_folders {
			summaries.push(self.run_root(root, run_stamp, cancel).await?);
		}
		Ok(summaries)
	}

	/// Reconcile one monitored root under the given run stamp
	pub async fn run_root(
		&self,
		root: &Path,
		run_stamp: u64,
		cancel: &CancelFlag,
	) -> Result<RunSummary, BackupError> {
		let started = Instant::now();

		let root = std::fs::canonicalize(root).map_err(|e| BackupError::Scan {
			root: root.display().to_string(),
			source: e,
		})?;
		info!("Backing up {} (run {})", root.display(), run_stamp);

		// Validated earlier; a pattern that still fails to compile is dropped
		let exclude: Vec<glob::Pattern> = self
			.config
			.exclude_patterns
			.iter()
			.filter_map(|p| glob::Pattern::new(p).ok())
			.collect();

		let scanned = scan::scan_root(&root, &exclude, cancel)?;
		let observed: BTreeSet<PathBuf> =
			scanned.files.iter().map(|f| f.abs_path.clone()).collect();
		debug!("Observed {} files under {}", observed.len(), root.display());

		let mut summary = RunSummary {
			root: root.clone(),
			stamp: run_stamp,
			files_seen: scanned.files.len(),
			skipped: scanned.skipped,
			..Default::default()
		};

		// Recorded live files, keyed by full path. Entries are consumed as
		// they match; whatever stays and is not on disk gets soft-deleted.
		let mut remaining: BTreeMap<PathBuf, LiveFile> = self
			.store
			.live_files_under(&root)?
			.into_iter()
			.map(|f| (f.full_path(), f))
			.collect();
		debug!("Loaded {} recorded live files", remaining.len());

		let mut writer = self.store.begin_run()?;

		for file in &scanned.files {
			if cancel.is_cancelled() {
				// Writer dropped here, nothing of this run persists
				warn!("Backup of {} aborted", root.display());
				return Err(BackupError::Aborted);
			}

			let content = match tokio::fs::read(&file.abs_path).await {
				Ok(c) => c,
				Err(e) => {
					warn!("Cannot read {}: {} (skipped)", file.abs_path.display(), e);
					summary.skipped += 1;
					continue;
				}
			};
			let fingerprint = hash::fingerprint(&content);

			if let Some(prior) = remaining.remove(&file.abs_path) {
				if stamp::is_changed(&prior.current_hash, &fingerprint) {
					debug!("Modified: {}", file.abs_path.display());
					let version =
						VersionRecord::new(&prior.id, &fingerprint, run_stamp, content);
					writer.insert_version(&version)?;
					summary.modified += 1;
				} else {
					summary.unchanged += 1;
				}
			} else if let Some((old_path, prior)) =
				take_move_source(&mut remaining, &observed, &fingerprint)
			{
				debug!(
					"Moved: {} -> {}",
					old_path.display(),
					file.abs_path.display()
				);
				writer.move_file(&prior.id, &file.dir, &file.name)?;
				summary.moved += 1;
			} else {
				debug!("New: {}", file.abs_path.display());
				let record = FileRecord::new(&file.dir, &file.name);
				writer.insert_file(&record)?;
				let version =
					VersionRecord::new(&record.id, &fingerprint, run_stamp, content);
				writer.insert_version(&version)?;
				summary.added += 1;
			}
		}

		// Whatever is still recorded but absent from the disk vanished.
		// Paths we observed but could not read stay live.
		let doomed: Vec<String> = remaining
			.iter()
			.filter(|(path, _)| !observed.contains(*path))
			.map(|(_, f)| f.id.clone())
			.collect();
		if !doomed.is_empty() {
			writer.mark_deleted(&doomed, run_stamp)?;
			summary.deleted = doomed.len();
		}

		writer.commit()?;

		summary.duration = started.elapsed();
		info!(
			"Backup of {} done: {} added, {} modified, {} moved, {} deleted, {} unchanged, {} skipped ({:.1?})",
			root.display(),
			summary.added,
			summary.modified,
			summary.moved,
			summary.deleted,
			summary.unchanged,
			summary.skipped,
			summary.duration
		);
		Ok(summary)
	}
}

/// Claim the move source for a fingerprint: the first (lowest-path) recorded
/// file that is no longer observed on disk and stored identical content.
fn take_move_source(
	remaining: &mut BTreeMap<PathBuf, LiveFile>,
	observed: &BTreeSet<PathBuf>,
	fingerprint: &str,
) -> Option<(PathBuf, LiveFile)> {
	let old_path = remaining
		.iter()
		.find(|(path, prior)| !observed.contains(*path) && prior.current_hash == fingerprint)
		.map(|(path, _)| path.clone())?;
	remaining.remove_entry(&old_path)
}

// vim: ts=4
