//! # Keepr - Personal File-Versioning Backup Tool
//!
//! Keepr watches a configured set of folders and, on every backup run,
//! stores a full snapshot of each file whose content changed, as an
//! immutable numbered version in a local database. Files that disappear are
//! soft-deleted: the record is flagged, the version history stays. Change
//! detection is content-based (SHA-256), so touching a file without
//! changing its bytes writes nothing.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use keepr::config::Configuration;
//! use keepr::engine::BackupEngine;
//! use keepr::store::Store;
//! use keepr::util::CancelFlag;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Configuration::load(&keepr::config::default_config_path())?;
//!     config.validate()?;
//!
//!     let store = Store::open(&config.database_location)?;
//!     let engine = BackupEngine::new(&store, &config);
//!     let summaries = engine.run_all(&CancelFlag::new()).await?;
//!     for summary in &summaries {
//!         println!("{}: {} added", summary.root.display(), summary.added);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod hash;
pub mod logging;
pub mod scan;
pub mod stamp;
pub mod store;
pub mod types;
pub mod util;

// Re-export commonly used types and functions
pub use config::Configuration;
pub use engine::BackupEngine;
pub use error::{BackupError, ConfigError, StoreError};
pub use store::{BackupStore, RunWrite, Store};
pub use types::{FileRecord, LiveFile, RunSummary, VersionRecord};
pub use util::CancelFlag;

// vim: ts=4
