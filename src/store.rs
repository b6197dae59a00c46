//! Embedded file/version store backed by redb
//!
//! Three tables: `files` (file id -> FileRecord JSON), `versions` (version
//! id -> version metadata JSON) and `version_content` (version id -> raw
//! snapshot bytes). Content lives in its own table so metadata queries never
//! touch payloads.
//!
//! All writes of one backup run go through a single [`RunWriter`], which
//! wraps one redb write transaction: either the whole run's changes land at
//! `commit`, or the transaction is dropped and redb discards every write.
//! redb also keeps the database exclusively open per process and allows a
//! single writer, so two runs against the same database cannot interleave.

use crate::error::StoreError;
use crate::types::{FileRecord, LiveFile, VersionRecord};
use redb::{ReadableDatabase, ReadableTable, TableDefinition};
use std::collections::BTreeMap;
use std::path::Path;

/// File records, keyed by file id
const FILES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("files");

/// Version metadata, keyed by version id
const VERSIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("versions");

/// Version payloads, keyed by version id
const CONTENT_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("version_content");

/// Store contract consumed by the reconciliation engine
pub trait BackupStore {
	type Writer: RunWrite;

	/// All live (non-deleted) records whose directory lies under `root`,
	/// together with the fingerprint and stamp of their latest version
	fn live_files_under(&self, root: &Path) -> Result<Vec<LiveFile>, StoreError>;

	/// Open the transactional writer for one backup run
	fn begin_run(&self) -> Result<Self::Writer, StoreError>;
}

/// Write side of one backup run. Dropping the writer without committing
/// rolls back everything written through it.
pub trait RunWrite {
	fn insert_file(&mut self, file: &FileRecord) -> Result<(), StoreError>;

	/// Insert a version and update the owning file's current hash/stamp
	fn insert_version(&mut self, version: &VersionRecord) -> Result<(), StoreError>;

	/// Record a relocation: rewrite path/name, keep identity and history
	fn move_file(&mut self, id: &str, new_path: &str, new_name: &str)
		-> Result<(), StoreError>;

	/// Batched soft delete: flag every id with the run stamp
	fn mark_deleted(&mut self, ids: &[String], stamp: u64) -> Result<(), StoreError>;

	fn commit(self) -> Result<(), StoreError>;
}

/// redb-backed store
pub struct Store {
	db: redb::Database,
}

impl Store {
	/// Open or create the database at `path`
	pub fn open(path: &Path) -> Result<Self, StoreError> {
		if let Some(dir) = path.parent() {
			if !dir.as_os_str().is_empty() && !dir.exists() {
				std::fs::create_dir_all(dir).map_err(|e| StoreError::OpenFailed {
					message: format!("cannot create {}: {}", dir.display(), e),
				})?;
			}
		}

		let db = redb::Database::create(path)?;

		// Ensure all tables exist
		{
			let txn = db.begin_write()?;
			let _ = txn.open_table(FILES_TABLE)?;
			let _ = txn.open_table(VERSIONS_TABLE)?;
			let _ = txn.open_table(CONTENT_TABLE)?;
			txn.commit()?;
		}

		Ok(Store { db })
	}

	/// Every file record, live and soft-deleted, sorted by location
	pub fn all_files(&self) -> Result<Vec<FileRecord>, StoreError> {
		let mut files = self.read_files()?;
		files.sort_by(|a, b| (&a.path, &a.name).cmp(&(&b.path, &b.name)));
		Ok(files)
	}

	/// Version metadata for one file, oldest first (content not loaded)
	pub fn versions_for(&self, file_id: &str) -> Result<Vec<VersionRecord>, StoreError> {
		let mut versions = Vec::new();
		for version in self.read_versions()? {
			if version.file_id == file_id {
				versions.push(version);
			}
		}
		versions.sort_by(|a, b| {
			(a.version_number, a.created_at, &a.id).cmp(&(b.version_number, b.created_at, &b.id))
		});
		Ok(versions)
	}

	/// Full snapshot bytes of one version
	pub fn version_content(&self, version_id: &str) -> Result<Option<Vec<u8>>, StoreError> {
		let txn = read_txn(&self.db)?;
		let table = txn
			.open_table(CONTENT_TABLE)
			.map_err(|e| StoreError::ReadFailed { message: e.to_string() })?;
		let value = table
			.get(version_id)
			.map_err(|e| StoreError::ReadFailed { message: e.to_string() })?;
		Ok(value.map(|g| g.value().to_vec()))
	}

	/// Total number of version rows
	pub fn version_count(&self) -> Result<usize, StoreError> {
		Ok(self.read_versions()?.len())
	}

	/// Delete the oldest versions of every file beyond `versions_to_keep`.
	///
	/// Maintenance operation, never called from the reconciliation path. The
	/// newest versions and all file records are left untouched. Returns the
	/// number of versions removed.
	pub fn prune(&self, versions_to_keep: usize) -> Result<usize, StoreError> {
		if versions_to_keep == 0 {
			return Err(StoreError::WriteFailed {
				message: "refusing to prune with versions_to_keep = 0".to_string(),
			});
		}

		let mut by_file: BTreeMap<String, Vec<VersionRecord>> = BTreeMap::new();
		for version in self.read_versions()? {
			by_file.entry(version.file_id.clone()).or_default().push(version);
		}

		let mut doomed = Vec::new();
		for (_, mut versions) in by_file {
			versions.sort_by(|a, b| {
				(a.version_number, a.created_at, &a.id)
					.cmp(&(b.version_number, b.created_at, &b.id))
			});
			if versions.len() > versions_to_keep {
				let cut = versions.len() - versions_to_keep;
				for version in versions.drain(..cut) {
					doomed.push(version.id);
				}
			}
		}

		if doomed.is_empty() {
			return Ok(0);
		}

		let txn = self.db.begin_write()?;
		{
			let mut versions = txn.open_table(VERSIONS_TABLE)?;
			let mut content = txn.open_table(CONTENT_TABLE)?;
			for id in &doomed {
				versions.remove(id.as_str())?;
				content.remove(id.as_str())?;
			}
		}
		txn.commit()?;

		Ok(doomed.len())
	}

	fn read_files(&self) -> Result<Vec<FileRecord>, StoreError> {
		let txn = read_txn(&self.db)?;
		let table = txn
			.open_table(FILES_TABLE)
			.map_err(|e| StoreError::ReadFailed { message: e.to_string() })?;

		let mut files = Vec::new();
		let mut iter = table.iter().map_err(|e| StoreError::ReadFailed { message: e.to_string() })?;
		loop {
			match iter.next() {
				Some(Ok((_, value))) => {
					let record: FileRecord = serde_json::from_slice(value.value())?;
					files.push(record);
				}
				Some(Err(e)) => {
					return Err(StoreError::ReadFailed { message: e.to_string() });
				}
				None => break,
			}
		}
		Ok(files)
	}

	fn read_versions(&self) -> Result<Vec<VersionRecord>, StoreError> {
		let txn = read_txn(&self.db)?;
		let table = txn
			.open_table(VERSIONS_TABLE)
			.map_err(|e| StoreError::ReadFailed { message: e.to_string() })?;

		let mut versions = Vec::new();
		let mut iter = table.iter().map_err(|e| StoreError::ReadFailed { message: e.to_string() })?;
		loop {
			match iter.next() {
				Some(Ok((_, value))) => {
					let record: VersionRecord = serde_json::from_slice(value.value())?;
					versions.push(record);
				}
				Some(Err(e)) => {
					return Err(StoreError::ReadFailed { message: e.to_string() });
				}
				None => break,
			}
		}
		Ok(versions)
	}
}

fn read_txn(db: &redb::Database) -> Result<redb::ReadTransaction, StoreError> {
	db.begin_read().map_err(|e| StoreError::ReadFailed { message: e.to_string() })
}

impl BackupStore for Store {
	type Writer = RunWriter;

	fn live_files_under(&self, root: &Path) -> Result<Vec<LiveFile>, StoreError> {
		let mut live = Vec::new();
		for record in self.read_files()? {
			if record.is_deleted {
				continue;
			}
			if !Path::new(&record.path).starts_with(root) {
				continue;
			}
			live.push(LiveFile {
				id: record.id,
				path: record.path,
				name: record.name,
				current_hash: record.current_hash,
				current_version: record.current_version,
			});
		}
		Ok(live)
	}

	fn begin_run(&self) -> Result<RunWriter, StoreError> {
		let txn = self.db.begin_write()?;
		Ok(RunWriter { txn })
	}
}

/// One backup run's write transaction
pub struct RunWriter {
	txn: redb::WriteTransaction,
}

impl RunWriter {
	fn load_file(&self, id: &str) -> Result<FileRecord, StoreError> {
		let table = self.txn.open_table(FILES_TABLE)?;
		let raw = table
			.get(id)?
			.map(|g| g.value().to_vec())
			.ok_or_else(|| StoreError::Corrupted {
				message: format!("no file record with id {}", id),
			})?;
		Ok(serde_json::from_slice(&raw)?)
	}

	fn put_file(&mut self, record: &FileRecord) -> Result<(), StoreError> {
		let bytes = serde_json::to_vec(record)?;
		let mut table = self.txn.open_table(FILES_TABLE)?;
		table.insert(record.id.as_str(), bytes.as_slice())?;
		Ok(())
	}
}

impl RunWrite for RunWriter {
	fn insert_file(&mut self, file: &FileRecord) -> Result<(), StoreError> {
		self.put_file(file)
	}

	fn insert_version(&mut self, version: &VersionRecord) -> Result<(), StoreError> {
		// Version rows and the owning file's current hash/stamp move together
		let mut record = self.load_file(&version.file_id)?;
		record.current_hash = version.hash.clone();
		record.current_version = version.version_number;
		self.put_file(&record)?;

		let meta = serde_json::to_vec(version)?;
		{
			let mut table = self.txn.open_table(VERSIONS_TABLE)?;
			table.insert(version.id.as_str(), meta.as_slice())?;
		}
		{
			let mut table = self.txn.open_table(CONTENT_TABLE)?;
			table.insert(version.id.as_str(), version.content.as_slice())?;
		}
		Ok(())
	}

	fn move_file(&mut self, id: &str, new_path: &str, new_name: &str)
		-> Result<(), StoreError>
	{
		let mut record = self.load_file(id)?;
		record.path = new_path.to_string();
		record.name = new_name.to_string();
		self.put_file(&record)
	}

	fn mark_deleted(&mut self, ids: &[String], stamp: u64) -> Result<(), StoreError> {
		for id in ids {
			let mut record = self.load_file(id)?;
			record.is_deleted = true;
			record.deleted_version = Some(stamp);
			self.put_file(&record)?;
		}
		Ok(())
	}

	fn commit(self) -> Result<(), StoreError> {
		self.txn.commit()?;
		Ok(())
	}
}


// vim: ts=4
