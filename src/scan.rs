//! Filesystem enumeration for a monitored root
//!
//! Walks a root recursively and returns every regular file (and symlink; a
//! dangling one surfaces later as a per-file read failure). Entries that
//! cannot be inspected are logged and skipped rather than failing the run;
//! only an unreadable root is fatal. Cancellation is honored between
//! entries.

use crate::error::BackupError;
use crate::logging::*;
use crate::types::{ScanOutcome, ScannedFile};
use crate::util::CancelFlag;
use std::fs;
use std::path::Path;

/// Enumerate all files under `root`.
///
/// `exclude` patterns are matched against the path relative to `root`; a
/// matching directory is pruned from the walk entirely.
pub fn scan_root(
	root: &Path,
	exclude: &[glob::Pattern],
	cancel: &CancelFlag,
) -> Result<ScanOutcome, BackupError> {
	// The root itself must be enumerable
	let entries = fs::read_dir(root).map_err(|e| BackupError::Scan {
		root: root.display().to_string(),
		source: e,
	})?;

	let mut outcome = ScanOutcome::default();
	walk(root, entries, root, exclude, cancel, &mut outcome)?;
	outcome.files.sort();
	Ok(outcome)
}

fn walk(
	dir: &Path,
	entries: fs::ReadDir,
	root: &Path,
	exclude: &[glob::Pattern],
	cancel: &CancelFlag,
	outcome: &mut ScanOutcome,
) -> Result<(), BackupError> {
	for entry_result in entries {
		if cancel.is_cancelled() {
			return Err(BackupError::Aborted);
		}

		let entry = match entry_result {
			Ok(e) => e,
			Err(e) => {
				warn!("Cannot read entry in {}: {}", dir.display(), e);
				outcome.skipped += 1;
				continue;
			}
		};

		let path = entry.path();
		if is_excluded(&path, root, exclude) {
			debug!("Excluded: {}", path.display());
			continue;
		}

		let file_type = match entry.file_type() {
			Ok(t) => t,
			Err(e) => {
				warn!("Cannot inspect {}: {}", path.display(), e);
				outcome.skipped += 1;
				continue;
			}
		};

		if file_type.is_dir() {
			match fs::read_dir(&path) {
				Ok(sub) => walk(&path, sub, root, exclude, cancel, outcome)?,
				Err(e) => {
					warn!("Cannot read directory {}: {}", path.display(), e);
					outcome.skipped += 1;
				}
			}
		} else {
			let dir_str = path
				.parent()
				.map(|p| p.display().to_string())
				.unwrap_or_default();
			let name = entry.file_name().to_string_lossy().into_owned();
			outcome.files.push(ScannedFile { abs_path: path, dir: dir_str, name });
		}
	}
	Ok(())
}

fn is_excluded(path: &Path, root: &Path, exclude: &[glob::Pattern]) -> bool {
	if exclude.is_empty() {
		return false;
	}
	let rel = match path.strip_prefix(root) {
		Ok(r) => r,
		Err(_) => return false,
	};
	let rel_str = rel.to_string_lossy();
	exclude.iter().any(|p| p.matches(&rel_str))
}


// vim: ts=4
