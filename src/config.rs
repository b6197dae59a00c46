//! Configuration loading, defaults and validation
//!
//! Configuration lives in a single JSON file (by default
//! `~/.keepr/config.json`). A missing file yields the built-in defaults; a
//! present file is parsed with json5 so hand-written comments and trailing
//! commas are tolerated. The loaded value is passed around explicitly; there
//! is no global configuration state. Reload semantics are
//! load-once-per-invocation; a long-lived caller re-reads by calling
//! [`Configuration::load`] again.

use crate::error::ConfigError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tool configuration, stored as snake_case JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
	/// Folders whose contents are versioned; each must exist on disk
	pub monitored_folders: Vec<PathBuf>,

	/// Versions retained per file when pruning (never enforced during a
	/// backup run, only by the explicit prune command)
	pub versions_to_keep: u32,

	/// Location of the version database
	pub database_location: PathBuf,

	/// Minutes between automatic runs; 0 = manual only. Recorded for
	/// external schedulers, the tool itself never schedules runs.
	pub auto_backup_interval_minutes: u32,

	/// Advisory database size bound; 0 = unlimited. Reported by status.
	pub max_database_size_mb: u32,

	/// Reserved; stored content is currently always the raw byte payload
	pub enable_compression: bool,

	/// Glob patterns excluded from enumeration (matched against paths
	/// relative to the monitored root)
	pub exclude_patterns: Vec<String>,

	/// Refreshed every time the configuration is saved
	pub last_modified: DateTime<Utc>,
}

impl Default for Configuration {
	fn default() -> Self {
		Configuration {
			monitored_folders: vec![],
			versions_to_keep: 5,
			database_location: default_keepr_dir().join("keepr.db"),
			auto_backup_interval_minutes: 0,
			max_database_size_mb: 0,
			enable_compression: false,
			exclude_patterns: vec![],
			last_modified: Utc::now(),
		}
	}
}

/// Default state directory (`~/.keepr`, falling back to the working dir)
pub fn default_keepr_dir() -> PathBuf {
	std::env::var("HOME")
		.ok()
		.map(|h| PathBuf::from(h).join(".keepr"))
		.unwrap_or_else(|| PathBuf::from(".keepr"))
}

/// Default configuration file path
pub fn default_config_path() -> PathBuf {
	default_keepr_dir().join("config.json")
}

impl Configuration {
	/// Load from `path`, falling back to defaults when the file is absent
	pub fn load(path: &Path) -> Result<Configuration, ConfigError> {
		if !path.exists() {
			return Ok(Configuration::default());
		}

		let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
			path: path.display().to_string(),
			source: e,
		})?;

		json5::from_str(&contents).map_err(|e| ConfigError::ParseFailed {
			path: path.display().to_string(),
			message: e.to_string(),
		})
	}

	/// Write to `path` as indented JSON, refreshing `last_modified`
	pub fn save(&mut self, path: &Path) -> Result<(), ConfigError> {
		self.last_modified = Utc::now();

		if let Some(dir) = path.parent() {
			if !dir.exists() {
				std::fs::create_dir_all(dir).map_err(|e| ConfigError::SaveFailed {
					path: path.display().to_string(),
					source: e,
				})?;
			}
		}

		// Serialization of a well-formed struct cannot fail; I/O can
		let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed {
			path: path.display().to_string(),
			message: e.to_string(),
		})?;

		std::fs::write(path, json).map_err(|e| ConfigError::SaveFailed {
			path: path.display().to_string(),
			source: e,
		})
	}

	/// Check every validation rule, collecting all problems
	pub fn validate(&self) -> Result<(), ConfigError> {
		let mut problems = Vec::new();

		if self.monitored_folders.is_empty() {
			problems.push("at least one monitored folder must be specified".to_string());
		} else {
			for folder in &self.monitored_folders {
				if !folder.is_dir() {
					problems.push(format!(
						"monitored folder does not exist: {}",
						folder.display()
					));
				}
			}
		}

		if self.versions_to_keep == 0 {
			problems.push("versions_to_keep must be greater than 0".to_string());
		}

		if self.database_location.as_os_str().is_empty() {
			problems.push("database_location must be specified".to_string());
		}

		for pattern in &self.exclude_patterns {
			if let Err(e) = glob::Pattern::new(pattern) {
				problems.push(format!("invalid exclude pattern '{}': {}", pattern, e));
			}
		}

		if problems.is_empty() {
			Ok(())
		} else {
			Err(ConfigError::Invalid { problems })
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test]
	fn test_defaults() {
		let config = Configuration::default();
		assert!(config.monitored_folders.is_empty());
		assert_eq!(config.versions_to_keep, 5);
		assert_eq!(config.auto_backup_interval_minutes, 0);
		assert_eq!(config.max_database_size_mb, 0);
		assert!(!config.enable_compression);
		assert!(config.database_location.ends_with("keepr.db"));
	}

	#[test]
	fn test_load_missing_file_yields_defaults() {
		let tmp = TempDir::new().unwrap();
		let config = Configuration::load(&tmp.path().join("nope.json")).unwrap();
		assert_eq!(config.versions_to_keep, 5);
	}

	#[test]
	fn test_load_partial_file_fills_defaults() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("config.json");
		std::fs::write(&path, r#"{ "versions_to_keep": 9 }"#).unwrap();

		let config = Configuration::load(&path).unwrap();
		assert_eq!(config.versions_to_keep, 9);
		assert!(config.monitored_folders.is_empty());
	}

	#[test]
	fn test_load_rejects_garbage() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("config.json");
		std::fs::write(&path, "{ not json at all").unwrap();

		let result = Configuration::load(&path);
		assert!(matches!(result, Err(ConfigError::ParseFailed { .. })));
	}

	#[test]
	fn test_save_load_round_trip_refreshes_last_modified() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("sub").join("config.json");

		let mut config = Configuration::default();
		let before = config.last_modified;
		config.versions_to_keep = 3;
		std::thread::sleep(std::time::Duration::from_millis(5));
		config.save(&path).unwrap();
		assert!(config.last_modified > before);

		let loaded = Configuration::load(&path).unwrap();
		assert_eq!(loaded.versions_to_keep, 3);
		assert_eq!(loaded.last_modified, config.last_modified);
	}

	#[test]
	fn test_validate_requires_folders() {
		let config = Configuration::default();
		let err = config.validate().unwrap_err();
		assert!(err.to_string().contains("at least one monitored folder"));
	}

	#[test]
	fn test_validate_rejects_missing_folder() {
		let mut config = Configuration::default();
		config.monitored_folders = vec![PathBuf::from("/definitely/not/here")];
		let err = config.validate().unwrap_err();
		assert!(err.to_string().contains("does not exist"));
	}

	#[test]
	fn test_validate_collects_all_problems() {
		let mut config = Configuration::default();
		config.versions_to_keep = 0;
		config.database_location = PathBuf::new();
		let err = config.validate().unwrap_err();
		let msg = err.to_string();
		assert!(msg.contains("monitored folder"));
		assert!(msg.contains("versions_to_keep"));
		assert!(msg.contains("database_location"));
	}

	#[test]
	fn test_validate_rejects_bad_glob() {
		let tmp = TempDir::new().unwrap();
		let mut config = Configuration::default();
		config.monitored_folders = vec![tmp.path().to_path_buf()];
		config.exclude_patterns = vec!["[".to_string()];
		let err = config.validate().unwrap_err();
		assert!(err.to_string().contains("invalid exclude pattern"));
	}

	#[test]
	fn test_validate_accepts_good_config() {
		let tmp = TempDir::new().unwrap();
		let mut config = Configuration::default();
		config.monitored_folders = vec![tmp.path().to_path_buf()];
		config.exclude_patterns = vec!["*.tmp".to_string(), "**/.git/**".to_string()];
		assert!(config.validate().is_ok());
	}
}

// vim: ts=4
