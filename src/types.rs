//! Core data types for the backup engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// Identity of a logical file across its whole lifetime.
///
/// Created once at first discovery and never re-created; a soft delete only
/// flips `is_deleted`/`deleted_version`, a move only rewrites `path`/`name`.
/// The version history hangs off `id` and survives both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
	/// Time-sortable unique id (UUIDv7), immutable after creation
	pub id: String,

	/// Absolute directory the file was last seen in
	pub path: String,

	/// Leaf file name
	pub name: String,

	/// True once the file is no longer found on disk
	pub is_deleted: bool,

	/// Run stamp at which the file was first observed missing, None while live
	pub deleted_version: Option<u64>,

	/// Fingerprint of the latest stored version ("" until the first one)
	pub current_hash: String,

	/// Run stamp of the latest stored version (0 until the first one)
	pub current_version: u64,
}

impl FileRecord {
	/// Create a fresh live record for a newly discovered file
	pub fn new(path: &str, name: &str) -> Self {
		FileRecord {
			id: Uuid::now_v7().to_string(),
			path: path.to_string(),
			name: name.to_string(),
			is_deleted: false,
			deleted_version: None,
			current_hash: String::new(),
			current_version: 0,
		}
	}

	/// Full path (directory + leaf) of the last known location
	pub fn full_path(&self) -> PathBuf {
		Path::new(&self.path).join(&self.name)
	}
}

/// One immutable full-content snapshot of a file.
///
/// The metadata row and the content payload are persisted separately; records
/// loaded for inspection carry an empty `content`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionRecord {
	pub id: String,
	pub file_id: String,

	/// SHA-256 of `content`, lowercase hex
	pub hash: String,

	/// Byte length of `content`, stored for fast inspection
	pub size: u64,

	/// Run stamp this version was created under
	pub version_number: u64,

	pub created_at: DateTime<Utc>,

	/// Full byte payload of the snapshot
	#[serde(skip)]
	pub content: Vec<u8>,
}

impl VersionRecord {
	/// Build a snapshot of `content` for the given file under the given run stamp
	pub fn new(file_id: &str, hash: &str, version_number: u64, content: Vec<u8>) -> Self {
		VersionRecord {
			id: Uuid::now_v7().to_string(),
			file_id: file_id.to_string(),
			hash: hash.to_string(),
			size: content.len() as u64,
			version_number,
			created_at: Utc::now(),
			content,
		}
	}
}

/// Typed row returned by the live-files query: one live record together with
/// the fingerprint and stamp of its latest stored version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveFile {
	pub id: String,
	pub path: String,
	pub name: String,
	pub current_hash: String,
	pub current_version: u64,
}

impl LiveFile {
	pub fn full_path(&self) -> PathBuf {
		Path::new(&self.path).join(&self.name)
	}
}

/// One file found on disk during enumeration
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScannedFile {
	/// Absolute path of the file itself
	pub abs_path: PathBuf,

	/// Absolute directory component
	pub dir: String,

	/// Leaf name component
	pub name: String,
}

/// Result of enumerating one monitored root
#[derive(Debug, Default)]
pub struct ScanOutcome {
	/// Files found, sorted by absolute path
	pub files: Vec<ScannedFile>,

	/// Entries that could not be read and were skipped
	pub skipped: usize,
}

/// Counters for one reconciliation of one monitored root
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
	/// The monitored root this summary describes
	pub root: PathBuf,

	/// Run stamp shared by every change in this summary
	pub stamp: u64,

	/// Files observed on disk
	pub files_seen: usize,

	/// Newly discovered files (record + first version created)
	pub added: usize,

	/// Files with changed content (new version created)
	pub modified: usize,

	/// Files relocated with identical content (record updated in place)
	pub moved: usize,

	/// Recorded files no longer on disk (soft-deleted)
	pub deleted: usize,

	/// Files whose fingerprint matched the latest version (nothing written)
	pub unchanged: usize,

	/// Files skipped because their content could not be read
	pub skipped: usize,

	pub duration: Duration,
}

impl RunSummary {
	/// True when the run wrote nothing to the store
	pub fn is_noop(&self) -> bool {
		self.added == 0 && self.modified == 0 && self.moved == 0 && self.deleted == 0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_file_record_new_is_live() {
		let rec = FileRecord::new("/data/photos", "cat.jpg");
		assert!(!rec.is_deleted);
		assert_eq!(rec.deleted_version, None);
		assert_eq!(rec.current_version, 0);
		assert!(rec.current_hash.is_empty());
		assert_eq!(rec.full_path(), PathBuf::from("/data/photos/cat.jpg"));
	}

	#[test]
	fn test_file_record_ids_unique() {
		let a = FileRecord::new("/d", "a");
		let b = FileRecord::new("/d", "b");
		assert_ne!(a.id, b.id);
	}

	#[test]
	fn test_version_record_size_matches_content() {
		let v = VersionRecord::new("file-1", "abc", 20240101120000, b"hello".to_vec());
		assert_eq!(v.size, 5);
		assert_eq!(v.version_number, 20240101120000);
		assert_eq!(v.file_id, "file-1");
	}

	#[test]
	fn test_run_summary_noop() {
		let mut s = RunSummary::default();
		s.unchanged = 10;
		s.skipped = 2;
		assert!(s.is_noop());
		s.modified = 1;
		assert!(!s.is_noop());
	}
}

// vim: ts=4
