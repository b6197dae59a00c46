//! Error types for backup operations

use std::error::Error;
use std::fmt;
use std::io;

/// Top-level error for a backup run
#[derive(Debug)]
pub enum BackupError {
	/// The monitored root could not be enumerated at all
	Scan { root: String, source: io::Error },

	/// Persistence failure; the run transaction has been rolled back
	Store(StoreError),

	/// Invalid configuration, reported before any run starts
	Config(ConfigError),

	/// Run cancelled cooperatively between files
	Aborted,

	/// I/O error outside the per-file tolerance (e.g. resolving a root)
	Io(io::Error),
}

impl fmt::Display for BackupError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BackupError::Scan { root, source } => {
				write!(f, "Failed to enumerate {}: {}", root, source)
			}
			BackupError::Store(e) => write!(f, "Store error: {}", e),
			BackupError::Config(e) => write!(f, "Configuration error: {}", e),
			BackupError::Aborted => write!(f, "Backup run aborted"),
			BackupError::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl Error for BackupError {}

impl From<StoreError> for BackupError {
	fn from(e: StoreError) -> Self {
		BackupError::Store(e)
	}
}

impl From<ConfigError> for BackupError {
	fn from(e: ConfigError) -> Self {
		BackupError::Config(e)
	}
}

impl From<io::Error> for BackupError {
	fn from(e: io::Error) -> Self {
		BackupError::Io(e)
	}
}

/// Persistence-boundary errors; every variant names the failing operation
#[derive(Debug)]
pub enum StoreError {
	/// Could not open or create the database
	OpenFailed { message: String },

	/// A read query failed
	ReadFailed { message: String },

	/// An insert or update failed
	WriteFailed { message: String },

	/// Committing a run transaction failed
	CommitFailed { message: String },

	/// A stored row could not be decoded
	Corrupted { message: String },
}

impl fmt::Display for StoreError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			StoreError::OpenFailed { message } => {
				write!(f, "Failed to open database: {}", message)
			}
			StoreError::ReadFailed { message } => write!(f, "Query failed: {}", message),
			StoreError::WriteFailed { message } => write!(f, "Write failed: {}", message),
			StoreError::CommitFailed { message } => write!(f, "Commit failed: {}", message),
			StoreError::Corrupted { message } => {
				write!(f, "Stored record corrupted: {}", message)
			}
		}
	}
}

impl Error for StoreError {}

impl From<redb::DatabaseError> for StoreError {
	fn from(e: redb::DatabaseError) -> Self {
		StoreError::OpenFailed { message: e.to_string() }
	}
}

impl From<redb::TransactionError> for StoreError {
	fn from(e: redb::TransactionError) -> Self {
		StoreError::WriteFailed { message: e.to_string() }
	}
}

impl From<redb::TableError> for StoreError {
	fn from(e: redb::TableError) -> Self {
		StoreError::WriteFailed { message: e.to_string() }
	}
}

impl From<redb::StorageError> for StoreError {
	fn from(e: redb::StorageError) -> Self {
		StoreError::WriteFailed { message: e.to_string() }
	}
}

impl From<redb::CommitError> for StoreError {
	fn from(e: redb::CommitError) -> Self {
		StoreError::CommitFailed { message: e.to_string() }
	}
}

impl From<serde_json::Error> for StoreError {
	fn from(e: serde_json::Error) -> Self {
		StoreError::Corrupted { message: e.to_string() }
	}
}

/// Configuration loading and validation errors
#[derive(Debug)]
pub enum ConfigError {
	/// The config file exists but could not be read
	LoadFailed { path: String, source: io::Error },

	/// The config file could not be parsed
	ParseFailed { path: String, message: String },

	/// The config file could not be written
	SaveFailed { path: String, source: io::Error },

	/// One or more validation rules failed; all problems are listed
	Invalid { problems: Vec<String> },
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigError::LoadFailed { path, source } => {
				write!(f, "Failed to read config {}: {}", path, source)
			}
			ConfigError::ParseFailed { path, message } => {
				write!(f, "Failed to parse config {}: {}", path, message)
			}
			ConfigError::SaveFailed { path, source } => {
				write!(f, "Failed to write config {}: {}", path, source)
			}
			ConfigError::Invalid { problems } => {
				write!(f, "Invalid configuration: {}", problems.join("; "))
			}
		}
	}
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_backup_error_names_failing_stage() {
		let e = BackupError::Scan {
			root: "/missing".to_string(),
			source: io::Error::new(io::ErrorKind::NotFound, "not found"),
		};
		assert!(e.to_string().contains("enumerate"));
		assert!(e.to_string().contains("/missing"));

		let e = BackupError::Store(StoreError::WriteFailed { message: "disk full".to_string() });
		assert!(e.to_string().contains("Write failed"));
	}

	#[test]
	fn test_config_error_lists_all_problems() {
		let e = ConfigError::Invalid {
			problems: vec!["no folders".to_string(), "bad db path".to_string()],
		};
		let msg = e.to_string();
		assert!(msg.contains("no folders"));
		assert!(msg.contains("bad db path"));
	}

	#[test]
	fn test_store_error_converts_into_backup_error() {
		let e: BackupError = StoreError::CommitFailed { message: "x".to_string() }.into();
		assert!(matches!(e, BackupError::Store(StoreError::CommitFailed { .. })));
	}
}

// vim: ts=4
