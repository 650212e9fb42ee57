//! Core data models for NML resolution.
//!
//! This module contains the metadata record, the output track type,
//! the three-way collection index, and the resolution statistics.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;

// ============================================================================
// Type Aliases
// ============================================================================

/// Index mapping a normalized lookup key to a shared metadata record.
pub type MetaIndex = FxHashMap<String, Arc<TrackMeta>>;

// ============================================================================
// Collection Models
// ============================================================================

/// Metadata extracted from one collection ENTRY.
/// One record is shared (via Arc) across all indices it is registered under.
#[derive(Clone, Debug)]
pub struct TrackMeta {
    pub artist: String,
    pub title: String,
    /// Raw volume+dir+file concatenation, kept for diagnostics.
    pub location: String,
}

/// The three lookup indices derived from one collection parse pass.
///
/// Owned by the caller and passed by reference into the history resolver;
/// a collection reload builds a fresh value and swaps it wholesale, so a
/// resolution in progress always reads one consistent snapshot.
#[derive(Debug, Default)]
pub struct CollectionIndex {
    /// Normalized AUDIO_ID or primary key -> metadata.
    pub key_index: MetaIndex,
    /// Normalized volume+dir+file -> metadata.
    pub full_path_index: MetaIndex,
    /// Normalized dir+file (no volume) -> metadata, for volume-agnostic matching.
    pub dir_file_index: MetaIndex,
}

impl CollectionIndex {
    pub fn path_count(&self) -> usize {
        self.full_path_index.len()
    }

    pub fn key_count(&self) -> usize {
        self.key_index.len()
    }

    /// A collection counts as loaded when either path or key lookups exist.
    /// Unparsable documents and documents with zero usable entries both
    /// report as not loaded.
    pub fn is_loaded(&self) -> bool {
        self.path_count() > 0 || self.key_count() > 0
    }
}

// ============================================================================
// Output Models
// ============================================================================

/// Resolved track for output. No identity beyond its field values;
/// either field may be empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    pub artist: String,
    pub title: String,
}

impl Track {
    /// Composite key used by the order-preserving de-duplication pass.
    pub fn dedup_key(&self) -> String {
        format!("{}|{}", self.artist, self.title)
    }
}

// ============================================================================
// Statistics (Instrumentation)
// ============================================================================

/// Per-tier resolution counters for one history document.
#[derive(Default, Debug, Clone, Serialize)]
pub struct ResolveStats {
    /// Key-referenced (Shape A) entries seen in the document.
    pub key_references: usize,
    pub full_path_hits: usize,
    pub id_key_hits: usize,
    pub dir_file_hits: usize,
    pub heuristic_fallbacks: usize,
    /// Inline (Shape B) entries emitted when no key references exist.
    pub inline_entries: usize,
    pub duplicates_dropped: usize,
    /// Final track count after de-duplication.
    pub emitted: usize,
}

impl ResolveStats {
    /// Log counters to stderr in JSON format.
    pub fn log(&self, label: &str) {
        if let Ok(json) = serde_json::to_string_pretty(self) {
            eprintln!("[STATS:{}]\n{}", label, json);
        }
    }
}
