//! History document parsing and tiered track resolution.
//!
//! A history document comes in one of two shapes, probed once per
//! document: key-referenced playlist entries (resolved against the
//! collection indices with a heuristic fallback), or inline artist/title
//! entries (used only when no key references exist at all). Either way
//! the emitted sequence is de-duplicated preserving first-occurrence
//! order.

use roxmltree::{Document, Node};
use rustc_hash::FxHashSet;

use crate::heuristic::guess_track;
use crate::models::{CollectionIndex, ResolveStats, Track};
use crate::normalize::{normalize_key, strip_drive_prefix};

/// Resolve raw history document text into an ordered, de-duplicated
/// track sequence. Malformed XML yields an empty sequence.
pub fn resolve(xml: &str, index: &CollectionIndex) -> Vec<Track> {
    resolve_with_stats(xml, index).0
}

/// Like [`resolve`] but also returns per-tier resolution counters.
pub fn resolve_with_stats(xml: &str, index: &CollectionIndex) -> (Vec<Track>, ResolveStats) {
    let mut stats = ResolveStats::default();
    let tracks = try_resolve(xml, index, &mut stats).unwrap_or_default();
    stats.emitted = tracks.len();
    (tracks, stats)
}

fn try_resolve(
    xml: &str,
    index: &CollectionIndex,
    stats: &mut ResolveStats,
) -> Result<Vec<Track>, roxmltree::Error> {
    let doc = Document::parse(xml)?;

    let mut out = resolve_key_references(&doc, index, stats);
    // Shape B applies only when the document carried zero key references,
    // not merely when none of them resolved.
    if stats.key_references == 0 {
        out = collect_inline(&doc, stats);
    }

    let mut seen = FxHashSet::default();
    let deduped = out
        .into_iter()
        .filter(|track| {
            let fresh = seen.insert(track.dedup_key());
            if !fresh {
                stats.duplicates_dropped += 1;
            }
            fresh
        })
        .collect();
    Ok(deduped)
}

/// Shape A: PRIMARYKEY references under playlist entries, in document
/// order. Each is resolved through the index tiers, falling back to
/// filename heuristics.
fn resolve_key_references(
    doc: &Document,
    index: &CollectionIndex,
    stats: &mut ResolveStats,
) -> Vec<Track> {
    let mut out = Vec::new();
    for reference in doc.descendants().filter(|n| is_key_reference(*n)) {
        stats.key_references += 1;
        let raw = reference
            .attribute("KEY")
            .or_else(|| reference.attribute("VALUE"))
            .unwrap_or("");
        let key = normalize_key(raw);

        let meta = if let Some(meta) = index.full_path_index.get(&key) {
            stats.full_path_hits += 1;
            Some(meta)
        } else if let Some(meta) = index.key_index.get(&key) {
            stats.id_key_hits += 1;
            Some(meta)
        } else if let Some(meta) = index.dir_file_index.get(strip_drive_prefix(&key).as_str()) {
            stats.dir_file_hits += 1;
            Some(meta)
        } else {
            None
        };

        match meta {
            Some(meta) => out.push(Track {
                artist: meta.artist.clone(),
                title: meta.title.clone(),
            }),
            None => {
                stats.heuristic_fallbacks += 1;
                let segment = key.rsplit('/').next().unwrap_or("");
                out.push(guess_track(if segment.is_empty() { raw } else { segment }));
            }
        }
    }
    out
}

/// A PRIMARYKEY element directly under an ENTRY inside a PLAYLIST.
fn is_key_reference(node: Node) -> bool {
    node.has_tag_name("PRIMARYKEY")
        && node.parent().map_or(false, |p| p.has_tag_name("ENTRY"))
        && node.ancestors().any(|a| a.has_tag_name("PLAYLIST"))
}

/// Shape B: entries carrying artist/title inline, either as attributes
/// of an INFO child or as VALUE attributes of dedicated sub-elements.
/// Entries lacking both fields are dropped silently.
fn collect_inline(doc: &Document, stats: &mut ResolveStats) -> Vec<Track> {
    let mut out = Vec::new();

    for info in doc.descendants().filter(|n| {
        n.has_tag_name("INFO") && n.parent().map_or(false, |p| p.has_tag_name("ENTRY"))
    }) {
        let artist = info.attribute("ARTIST").unwrap_or("").trim();
        let title = info.attribute("TITLE").unwrap_or("").trim();
        if !artist.is_empty() || !title.is_empty() {
            stats.inline_entries += 1;
            out.push(Track {
                artist: artist.to_string(),
                title: title.to_string(),
            });
        }
    }

    for entry in doc.descendants().filter(|n| n.has_tag_name("ENTRY")) {
        let artist = child_value(entry, "ARTIST");
        let title = child_value(entry, "TITLE");
        if !artist.is_empty() || !title.is_empty() {
            stats.inline_entries += 1;
            out.push(Track {
                artist: artist.to_string(),
                title: title.to_string(),
            });
        }
    }

    out
}

fn child_value<'a, 'input: 'a>(entry: Node<'a, 'input>, name: &str) -> &'a str {
    entry
        .descendants()
        .find(|n| n.has_tag_name(name))
        .and_then(|n| n.attribute("VALUE"))
        .unwrap_or("")
        .trim()
}
