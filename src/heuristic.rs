//! Best-effort (artist, title) extraction from raw filenames.
//!
//! Used when a history reference resolves against none of the collection
//! indices. Intentionally lossy: it never fails, an unparseable input
//! simply yields an empty-artist, possibly-empty-title track.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Track;

/// Matches a trailing audio file extension.
static AUDIO_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(mp3|wav|aiff|flac|m4a)$").unwrap());

/// Matches a hyphen with optional surrounding whitespace, the usual
/// "Artist - Title" filename separator.
static HYPHEN_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-\s*").unwrap());

/// Derive a track from a raw path fragment.
///
/// Operates on the last slash-delimited component (the whole input when
/// that component is empty), strips a leading `:` separator artifact and
/// a known audio extension, then splits on "Artist - Title" hyphens.
pub fn guess_track(raw: &str) -> Track {
    let segment = raw
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(raw);
    let segment = segment.strip_prefix(':').unwrap_or(segment);
    let cleaned = AUDIO_EXTENSION.replace(segment, "").trim().to_string();

    let parts: Vec<&str> = HYPHEN_SPLIT.split(&cleaned).collect();
    if parts.len() >= 2 {
        let title = parts[1..].join(" - ").trim().to_string();
        Track {
            artist: parts[0].trim().to_string(),
            // A split that leaves no title falls back to the cleaned string
            title: if title.is_empty() { cleaned } else { title },
        }
    } else {
        Track {
            artist: String::new(),
            title: cleaned,
        }
    }
}
