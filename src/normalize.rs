//! Key normalization for collection and history matching.
//!
//! Traktor writes path fragments with `/:`-style separators and an
//! optional drive-letter volume; keys become comparable after
//! lowercasing and converting backslashes to forward slashes. No
//! separators are inserted beyond what the fragments already carry.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches a single leading drive prefix like "d:" on an already-lowercased key.
static DRIVE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]:").unwrap());

/// Canonicalize a raw identifier or path key for lookup.
pub fn normalize_key(raw: &str) -> String {
    raw.to_lowercase()
}

/// Full-path lookup key: volume, then dir, then file.
/// Empty fragments contribute nothing; they are never an error.
pub fn full_path_key(volume: &str, dir: &str, file: &str) -> String {
    normalize_key(&format!("{volume}{dir}{file}").replace('\\', "/"))
}

/// Volume-less lookup key (dir, then file) for volume-agnostic fallback.
pub fn dir_file_key(dir: &str, file: &str) -> String {
    normalize_key(&format!("{dir}{file}").replace('\\', "/"))
}

/// Strip a leading single-letter-plus-colon drive prefix from a
/// normalized key, used when falling back from a full-path lookup to a
/// volume-less one.
pub fn strip_drive_prefix(key: &str) -> String {
    DRIVE_PREFIX.replace(key, "").to_string()
}
