//! SHA-256 content fingerprints
//!
//! A fingerprint is the SHA-256 digest of a file's full byte content,
//! rendered as lowercase hex. Two files are considered unchanged exactly
//! when their fingerprint strings are equal.

use sha2::{Digest, Sha256};

/// Compute the fingerprint of a byte buffer
pub fn fingerprint(data: &[u8]) -> String {
	let digest = Sha256::digest(data);
	hex::encode(digest)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_fingerprint_deterministic() {
		let a = fingerprint(b"hello world");
		let b = fingerprint(b"hello world");
		assert_eq!(a, b);
	}

	#[test]
	fn test_fingerprint_known_value() {
		// sha256("hello")
		assert_eq!(
			fingerprint(b"hello"),
			"2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
		);
	}

	#[test]
	fn test_fingerprint_empty() {
		// sha256("")
		assert_eq!(
			fingerprint(b""),
			"e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
		);
	}

	#[test]
	fn test_fingerprint_shape() {
		let hex = fingerprint(b"anything");
		assert_eq!(hex.len(), 64);
		assert!(hex.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
	}

	#[test]
	fn test_different_content_different_fingerprint() {
		assert_ne!(fingerprint(b"hello"), fingerprint(b"world"));
		assert_ne!(fingerprint(b"a"), fingerprint(b"a "));
	}
}

// vim: ts=4
