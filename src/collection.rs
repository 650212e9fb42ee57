//! Collection document parsing and index building.
//!
//! One parse pass over the collection NML populates all three lookup
//! indices; the same metadata record (behind an `Arc`) is reachable from
//! every index it registers under. A reload builds a fresh
//! `CollectionIndex` and replaces the old one wholesale.

use roxmltree::{Document, Node};
use std::sync::Arc;

use crate::models::{CollectionIndex, TrackMeta};
use crate::normalize::{dir_file_key, full_path_key, normalize_key};

/// First descendant element with the given tag name, if any.
fn descendant<'a, 'input: 'a>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants().find(|n| n.has_tag_name(name))
}

/// Ordered extraction strategies for an ENTRY text field (ARTIST or
/// TITLE): an attribute on the INFO sub-element, an attribute on the
/// entry itself, then a dedicated sub-element's VALUE attribute. First
/// non-empty source wins; the result is trimmed.
fn entry_field(entry: Node, name: &str) -> String {
    let sources = [
        descendant(entry, "INFO").and_then(|n| n.attribute(name)),
        entry.attribute(name),
        descendant(entry, name).and_then(|n| n.attribute("VALUE")),
    ];
    sources
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .map(|s| s.trim())
        .unwrap_or("")
        .to_string()
}

/// Build the three lookup indices from raw collection document text.
///
/// A document that fails to parse as XML yields three empty indices;
/// callers observe the failure only through the resulting index sizes.
pub fn build_index(xml: &str) -> CollectionIndex {
    try_build_index(xml).unwrap_or_default()
}

fn try_build_index(xml: &str) -> Result<CollectionIndex, roxmltree::Error> {
    let doc = Document::parse(xml)?;
    let mut index = CollectionIndex::default();

    // ENTRY elements may sit under a COLLECTION root or at top level;
    // both forms are accepted.
    for entry in doc.descendants().filter(|n| n.has_tag_name("ENTRY")) {
        let artist = entry_field(entry, "ARTIST");
        let title = entry_field(entry, "TITLE");

        let location = descendant(entry, "LOCATION");
        let volume = location.and_then(|n| n.attribute("VOLUME")).unwrap_or("");
        let dir = location.and_then(|n| n.attribute("DIR")).unwrap_or("");
        let file = location.and_then(|n| n.attribute("FILE")).unwrap_or("");

        let meta = Arc::new(TrackMeta {
            artist,
            title,
            location: format!("{volume}{dir}{file}"),
        });

        if !(volume.is_empty() && dir.is_empty() && file.is_empty()) {
            index
                .full_path_index
                .insert(full_path_key(volume, dir, file), Arc::clone(&meta));
            index
                .dir_file_index
                .insert(dir_file_key(dir, file), Arc::clone(&meta));
        }

        // Identifier registrations are independent of each other; later
        // entries overwrite earlier ones on key collision.
        let audio_id = entry
            .attribute("AUDIO_ID")
            .or_else(|| descendant(entry, "AUDIO_ID").and_then(|n| n.attribute("VALUE")));
        if let Some(aid) = audio_id.filter(|s| !s.is_empty()) {
            index.key_index.insert(normalize_key(aid), Arc::clone(&meta));
        }

        let primary_key = descendant(entry, "PRIMARYKEY")
            .and_then(|n| n.attribute("KEY").or_else(|| n.attribute("VALUE")))
            .or_else(|| entry.attribute("KEY"));
        if let Some(pk) = primary_key.filter(|s| !s.is_empty()) {
            index.key_index.insert(normalize_key(pk), meta);
        }
    }

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<NML VERSION="19">
  <COLLECTION ENTRIES="2">
    <ENTRY AUDIO_ID="AQIDBA==">
      <INFO ARTIST="Burial" TITLE="Archangel"/>
      <LOCATION VOLUME="D:" DIR="/:Music/:Dubstep/:" FILE="01 Archangel.flac"/>
      <PRIMARYKEY TYPE="TRACK" KEY="D:/:Music/:Dubstep/:01 Archangel.flac"/>
    </ENTRY>
    <ENTRY ARTIST="Rrose" TITLE="Waterfall">
      <LOCATION VOLUME="D:" DIR="/:Music/:Techno/:" FILE="Waterfall.wav"/>
    </ENTRY>
  </COLLECTION>
</NML>"#;

    #[test]
    fn test_build_registers_all_indices() {
        let index = build_index(COLLECTION);
        assert_eq!(index.path_count(), 2);
        assert_eq!(index.dir_file_index.len(), 2);
        // AUDIO_ID plus PRIMARYKEY for the first entry
        assert_eq!(index.key_count(), 2);
        assert!(index.is_loaded());

        let meta = &index.full_path_index["d:/:music/:dubstep/:01 archangel.flac"];
        assert_eq!(meta.artist, "Burial");
        assert_eq!(meta.title, "Archangel");

        let by_id = &index.key_index["aqidba=="];
        assert_eq!(by_id.artist, "Burial");
        let by_pk = &index.key_index["d:/:music/:dubstep/:01 archangel.flac"];
        assert_eq!(by_pk.title, "Archangel");
    }

    #[test]
    fn test_same_record_shared_across_indices() {
        let index = build_index(COLLECTION);
        let full = &index.full_path_index["d:/:music/:techno/:waterfall.wav"];
        let dir = &index.dir_file_index["/:music/:techno/:waterfall.wav"];
        assert!(Arc::ptr_eq(full, dir));
    }

    #[test]
    fn test_top_level_entries_accepted() {
        let xml = r#"<ROOT>
            <ENTRY ARTIST="A" TITLE="T">
              <LOCATION DIR="/:d/:" FILE="f.mp3"/>
            </ENTRY>
        </ROOT>"#;
        let index = build_index(xml);
        assert_eq!(index.path_count(), 1);
        assert_eq!(index.full_path_index["/:d/:f.mp3"].artist, "A");
    }

    #[test]
    fn test_field_priority_info_wins() {
        let xml = r#"<ENTRY ARTIST="EntryAttr">
            <INFO ARTIST="FromInfo"/>
            <ARTIST VALUE="FromChild"/>
            <LOCATION FILE="x.mp3"/>
        </ENTRY>"#;
        let index = build_index(xml);
        assert_eq!(index.full_path_index["x.mp3"].artist, "FromInfo");
    }

    #[test]
    fn test_field_priority_entry_attr_then_child_value() {
        let xml = r#"<ROOT>
            <ENTRY ARTIST="EntryAttr">
              <ARTIST VALUE="FromChild"/>
              <LOCATION FILE="a.mp3"/>
            </ENTRY>
            <ENTRY>
              <ARTIST VALUE="FromChild"/>
              <TITLE VALUE="  Trimmed  "/>
              <LOCATION FILE="b.mp3"/>
            </ENTRY>
        </ROOT>"#;
        let index = build_index(xml);
        assert_eq!(index.full_path_index["a.mp3"].artist, "EntryAttr");
        assert_eq!(index.full_path_index["b.mp3"].artist, "FromChild");
        assert_eq!(index.full_path_index["b.mp3"].title, "Trimmed");
    }

    #[test]
    fn test_entry_without_location_not_in_path_indices() {
        let xml = r#"<ENTRY AUDIO_ID="XYZ">
            <INFO ARTIST="A" TITLE="T"/>
        </ENTRY>"#;
        let index = build_index(xml);
        assert_eq!(index.path_count(), 0);
        assert_eq!(index.dir_file_index.len(), 0);
        assert_eq!(index.key_index["xyz"].artist, "A");
    }

    #[test]
    fn test_entry_level_key_attribute_fallback() {
        let xml = r#"<ENTRY KEY="Some/Key">
            <INFO ARTIST="A" TITLE="T"/>
        </ENTRY>"#;
        let index = build_index(xml);
        assert_eq!(index.key_index["some/key"].title, "T");
    }

    #[test]
    fn test_primarykey_value_attribute_fallback() {
        let xml = r#"<ENTRY>
            <INFO ARTIST="A" TITLE="T"/>
            <PRIMARYKEY VALUE="PK-Value"/>
        </ENTRY>"#;
        let index = build_index(xml);
        assert_eq!(index.key_index["pk-value"].artist, "A");
    }

    #[test]
    fn test_identifier_collision_last_write_wins() {
        let xml = r#"<ROOT>
            <ENTRY AUDIO_ID="SAME"><INFO ARTIST="First" TITLE="One"/></ENTRY>
            <ENTRY AUDIO_ID="SAME"><INFO ARTIST="Second" TITLE="Two"/></ENTRY>
        </ROOT>"#;
        let index = build_index(xml);
        assert_eq!(index.key_count(), 1);
        assert_eq!(index.key_index["same"].artist, "Second");
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let first = build_index(COLLECTION);
        let second = build_index(COLLECTION);
        assert_eq!(first.path_count(), second.path_count());
        assert_eq!(first.key_count(), second.key_count());
        for (key, meta) in &first.full_path_index {
            let other = &second.full_path_index[key];
            assert_eq!(meta.artist, other.artist);
            assert_eq!(meta.title, other.title);
        }
    }

    #[test]
    fn test_malformed_document_yields_empty_indices() {
        let index = build_index("not xml at all <<<");
        assert_eq!(index.path_count(), 0);
        assert_eq!(index.key_count(), 0);
        assert!(!index.is_loaded());
    }

    #[test]
    fn test_no_usable_entries_reports_not_loaded() {
        let index = build_index("<NML><COLLECTION ENTRIES=\"0\"/></NML>");
        assert!(!index.is_loaded());
    }
}
