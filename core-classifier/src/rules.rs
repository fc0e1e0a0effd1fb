//! Table-driven classification rules.
//!
//! Pure predicates over a URL and an optional content type. All URL handling
//! is fallible-by-`Option`: a malformed URL never classifies, never panics.

use url::Url;

use crate::types::StreamType;

/// Domains whose streams are never cataloged. Matched as case-insensitive
/// substrings of the hostname, so subdomains are covered.
pub const BLOCKED_DOMAINS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "netflix.com",
    "disneyplus.com",
    "hbomax.com",
    "primevideo.com",
];

/// Check whether a URL's hostname contains any blocked-domain substring.
///
/// A URL that cannot be parsed is not "blocked" — it simply fails every
/// later rule as well.
pub fn is_blocked_domain(url: &str) -> bool {
    match host_of(url) {
        Some(host) => BLOCKED_DOMAINS.iter().any(|d| host.contains(d)),
        None => false,
    }
}

/// Lowercased hostname of a URL, or `None` if the URL is malformed.
pub fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed.host_str().map(|h| h.to_ascii_lowercase())
}

/// Lowercased file extension of the URL path, ignoring the query string.
pub fn extension_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let path = parsed.path();
    let last = path.rsplit('/').next()?;
    let (_, ext) = last.rsplit_once('.')?;
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Map a content-type header to a stream family. Matching is substring-based
/// and case-insensitive, mirroring how servers mangle these values in the
/// wild.
pub fn type_from_content_type(content_type: &str) -> Option<StreamType> {
    let ct = content_type.to_ascii_lowercase();

    if ct.contains("mpegurl") || ct.contains("m3u") {
        return Some(StreamType::Hls);
    }
    if ct.contains("dash+xml") {
        return Some(StreamType::Dash);
    }
    // Transport-stream segments belong to an HLS presentation.
    if ct.contains("mp2t") {
        return Some(StreamType::Hls);
    }
    if ct.contains("video/mp4") {
        return Some(StreamType::Mp4);
    }
    if ct.contains("video/webm") {
        return Some(StreamType::Webm);
    }

    None
}

/// Map a URL extension to a stream family.
pub fn type_from_url(url: &str) -> Option<StreamType> {
    let ext = extension_of(url)?;

    match ext.as_str() {
        "m3u8" | "m3u" => Some(StreamType::Hls),
        "mpd" => Some(StreamType::Dash),
        // Segment extensions still identify the HLS family.
        "ts" | "m4s" => Some(StreamType::Hls),
        "mp4" => Some(StreamType::Mp4),
        "webm" => Some(StreamType::Webm),
        _ => None,
    }
}

/// Whether the resource is a manifest: the top-level descriptor of an
/// adaptive stream, as opposed to one of its segments.
pub fn is_manifest(url: &str, content_type: Option<&str>) -> bool {
    let ext = extension_of(url);
    let ct = content_type.map(|c| c.to_ascii_lowercase()).unwrap_or_default();

    // HLS manifest
    if matches!(ext.as_deref(), Some("m3u8") | Some("m3u")) || ct.contains("mpegurl") {
        return true;
    }

    // DASH manifest
    if ext.as_deref() == Some("mpd") || ct.contains("dash+xml") {
        return true;
    }

    false
}

/// Whether the resource looks like a media segment. One video produces
/// hundreds of segment requests, so these are dropped before they can flood
/// the catalog.
pub fn is_segment(url: &str, content_type: Option<&str>) -> bool {
    let ext = extension_of(url);
    let ct = content_type.map(|c| c.to_ascii_lowercase()).unwrap_or_default();
    let lower_url = url.to_ascii_lowercase();

    // Bare transport-stream chunk.
    if ext.as_deref() == Some("ts") && !lower_url.contains("playlist") {
        return true;
    }

    // Fragmented MP4 chunks.
    if matches!(ext.as_deref(), Some("m4s") | Some("mp4"))
        && (lower_url.contains("segment") || lower_url.contains("chunk"))
    {
        return true;
    }

    // Transport-stream content type.
    if ct.contains("mp2t") {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocklist_covers_subdomains() {
        assert!(is_blocked_domain("https://sub.youtube.com/watch?v=x"));
        assert!(is_blocked_domain("https://WWW.NETFLIX.COM/title/1"));
        assert!(!is_blocked_domain("https://example.com/video.m3u8"));
    }

    #[test]
    fn malformed_url_is_not_blocked() {
        assert!(!is_blocked_domain("not a url"));
    }

    #[test]
    fn extension_ignores_query() {
        assert_eq!(
            extension_of("https://cdn.example.com/v/master.m3u8?token=abc"),
            Some("m3u8".to_string())
        );
        assert_eq!(extension_of("https://example.com/plain"), None);
        assert_eq!(extension_of("nonsense"), None);
    }

    #[test]
    fn content_type_mapping() {
        assert_eq!(
            type_from_content_type("application/x-mpegURL"),
            Some(StreamType::Hls)
        );
        assert_eq!(
            type_from_content_type("application/dash+xml"),
            Some(StreamType::Dash)
        );
        assert_eq!(type_from_content_type("video/MP2T"), Some(StreamType::Hls));
        assert_eq!(type_from_content_type("video/mp4"), Some(StreamType::Mp4));
        assert_eq!(type_from_content_type("text/html"), None);
    }

    #[test]
    fn manifest_vs_segment() {
        assert!(is_manifest("https://e.com/master.m3u8", None));
        assert!(is_manifest("https://e.com/stream", Some("application/vnd.apple.mpegurl")));
        assert!(is_manifest("https://e.com/manifest.mpd", None));
        assert!(!is_manifest("https://e.com/seg001.ts", None));

        assert!(is_segment("https://e.com/seg001.ts", None));
        assert!(!is_segment("https://e.com/playlist.ts", None));
        assert!(is_segment("https://e.com/chunk-12.m4s", None));
        assert!(is_segment("https://e.com/video/segment-3.mp4", None));
        assert!(!is_segment("https://e.com/full-movie.mp4", None));
        assert!(is_segment("https://e.com/anything", Some("video/mp2t")));
    }
}
