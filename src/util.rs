//! Small shared helpers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag for a backup run.
///
/// Cloned handles share one flag. The engine checks it between files, never
/// mid-hash, so a cancelled run aborts before the next file is processed.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
	pub fn new() -> Self {
		CancelFlag::default()
	}

	/// Request cancellation; takes effect at the next between-files check
	pub fn cancel(&self) {
		self.0.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}
}

/// Render a byte count for humans ("1.5 MB")
pub fn human_size(bytes: u64) -> String {
	const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
	let mut value = bytes as f64;
	let mut unit = 0;
	while value >= 1024.0 && unit < UNITS.len() - 1 {
		value /= 1024.0;
		unit += 1;
	}
	if unit == 0 {
		format!("{} {}", bytes, UNITS[unit])
	} else {
		format!("{:.1} {}", value, UNITS[unit])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_cancel_flag_shared_between_clones() {
		let flag = CancelFlag::new();
		let other = flag.clone();
		assert!(!flag.is_cancelled());
		other.cancel();
		assert!(flag.is_cancelled());
	}

	#[test]
	fn test_human_size() {
		assert_eq!(human_size(0), "0 B");
		assert_eq!(human_size(512), "512 B");
		assert_eq!(human_size(2048), "2.0 KB");
		assert_eq!(human_size(1536 * 1024), "1.5 MB");
	}
}

// vim: ts=4
