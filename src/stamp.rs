//! Versioning policy: run stamps and the change predicate
//!
//! A run stamp is a single `u64` derived from the run's UTC start time with
//! second granularity (`yyyyMMddHHmmss`). Every file and version change
//! produced by one backup invocation shares the stamp, so the history can be
//! queried by run ("what did the backup at time T change"). Stamps compare
//! in chronological order because the digits are ordered most significant
//! first.
//!
//! Two invocations starting within the same second produce the same stamp.
//! That is accepted: unchanged files never write rows, so a same-second
//! re-run is a no-op rather than a duplicate.

use chrono::{DateTime, Datelike, Timelike, Utc};

/// Derive the run stamp from a point in time
pub fn run_stamp(at: DateTime<Utc>) -> u64 {
	at.year() as u64 * 10_000_000_000
		+ at.month() as u64 * 100_000_000
		+ at.day() as u64 * 1_000_000
		+ at.hour() as u64 * 10_000
		+ at.minute() as u64 * 100
		+ at.second() as u64
}

/// Run stamp for the current moment
pub fn run_stamp_now() -> u64 {
	run_stamp(Utc::now())
}

/// Did the content change since the last recorded version?
///
/// Byte equality of the fingerprint strings; a file with no recorded version
/// (empty prior) always counts as changed.
pub fn is_changed(prior_hash: &str, current_hash: &str) -> bool {
	prior_hash != current_hash
}


// vim: ts=4
