//! Queue entry model.

use bridge_traits::time::Clock;
use chrono::{DateTime, Utc};
use core_classifier::{StreamCandidate, StreamType, ThumbnailColor};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, stable identifier of a queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generate a new entry identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse an identifier from its string form. Returns `None` for
    /// anything that is not a UUID.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One entry of the playback queue.
///
/// Entries are immutable once created: mutation of the queue happens only by
/// whole-entry replace-or-remove, never by partial field updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoEntry {
    /// Unique, stable for the lifetime of the queue.
    pub id: EntryId,
    pub url: String,
    /// Manifest URL; equal to `url` when the resource is its own manifest.
    pub manifest_url: String,
    pub stream_type: StreamType,
    /// Content type as observed at detection time, when any.
    pub content_type: Option<String>,
    pub title: String,
    pub domain: String,
    pub thumbnail_color: ThumbnailColor,
    pub added_at: DateTime<Utc>,
}

impl VideoEntry {
    /// Promote a classified candidate into a queue entry.
    pub fn from_candidate(candidate: StreamCandidate, clock: &dyn Clock) -> Self {
        Self {
            id: EntryId::new(),
            url: candidate.url,
            manifest_url: candidate.manifest_url,
            stream_type: candidate.stream_type,
            content_type: candidate.content_type,
            title: candidate.title,
            domain: candidate.domain,
            thumbnail_color: candidate.thumbnail_color,
            added_at: clock.now(),
        }
    }

    /// URL handed to the player: the manifest when one is known, the plain
    /// URL otherwise.
    pub fn playback_url(&self) -> &str {
        if self.manifest_url.is_empty() {
            &self.url
        } else {
            &self.manifest_url
        }
    }

    /// Dedup equality: two entries are duplicates when either their URLs or
    /// their manifest URLs match.
    pub fn duplicates(&self, other: &VideoEntry) -> bool {
        self.url == other.url || self.manifest_url == other.manifest_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::time::SystemClock;
    use core_classifier::{classify, Observation};

    fn entry(url: &str, manifest: &str) -> VideoEntry {
        VideoEntry {
            id: EntryId::new(),
            url: url.to_string(),
            manifest_url: manifest.to_string(),
            stream_type: StreamType::Hls,
            content_type: None,
            title: "t".into(),
            domain: "e.com".into(),
            thumbnail_color: ThumbnailColor::for_domain("e.com"),
            added_at: Utc::now(),
        }
    }

    #[test]
    fn dedup_matches_on_either_url() {
        let a = entry("https://e.com/a.m3u8", "https://e.com/a.m3u8");
        let same_url = entry("https://e.com/a.m3u8", "https://e.com/other.m3u8");
        let same_manifest = entry("https://e.com/b.m3u8", "https://e.com/a.m3u8");
        let distinct = entry("https://e.com/c.m3u8", "https://e.com/c.m3u8");

        assert!(a.duplicates(&same_url));
        assert!(a.duplicates(&same_manifest));
        assert!(!a.duplicates(&distinct));
    }

    #[test]
    fn promotion_keeps_candidate_fields() {
        let candidate = classify(&Observation::network(
            "https://cdn.e.com/live/master.m3u8",
            Some("application/x-mpegurl".into()),
        ))
        .unwrap();

        let entry = VideoEntry::from_candidate(candidate.clone(), &SystemClock);
        assert_eq!(entry.url, candidate.url);
        assert_eq!(entry.manifest_url, candidate.manifest_url);
        assert_eq!(entry.stream_type, candidate.stream_type);
        assert_eq!(entry.thumbnail_color, candidate.thumbnail_color);
    }

    #[test]
    fn entry_id_round_trips_through_string() {
        let id = EntryId::new();
        assert_eq!(EntryId::parse(&id.to_string()), Some(id));
        assert_eq!(EntryId::parse("junk"), None);
    }
}
