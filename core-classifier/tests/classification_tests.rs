//! Classification behavior across the rule pipeline.

use core_classifier::{classify, Observation, StreamCandidate, StreamType, ThumbnailColor};

fn network(url: &str, content_type: &str) -> Observation {
    Observation::network(url, Some(content_type.to_string()))
}

#[test]
fn content_type_takes_priority_over_extension() {
    // Extension says transport-stream segment, content type says HLS
    // manifest family: content type wins and the result is HLS.
    let candidate = classify(&network(
        "https://stream.example.com/out/playlist.ts",
        "application/x-mpegurl",
    ))
    .expect("should classify as HLS");
    assert_eq!(candidate.stream_type, StreamType::Hls);
}

#[test]
fn blocklist_applies_regardless_of_type_information() {
    for ct in ["application/x-mpegurl", "video/mp4", "application/dash+xml"] {
        let obs = network("https://sub.youtube.com/media/master.m3u8", ct);
        assert!(classify(&obs).is_none(), "content type {ct} must not bypass blocklist");
    }
}

#[test]
fn dash_manifest_classifies() {
    let candidate = classify(&network(
        "https://cdn.example.com/vod/stream.mpd",
        "application/dash+xml",
    ))
    .unwrap();
    assert_eq!(candidate.stream_type, StreamType::Dash);
    assert_eq!(candidate.manifest_url, "https://cdn.example.com/vod/stream.mpd");
}

#[test]
fn segment_flood_never_reaches_the_catalog() {
    let segments = [
        "https://cdn.example.com/hls/seg-0001.ts",
        "https://cdn.example.com/hls/seg-0002.ts",
        "https://cdn.example.com/dash/chunk-0001.m4s",
        "https://cdn.example.com/dash/segment-0001.mp4",
    ];
    for url in segments {
        assert!(
            classify(&Observation::network(url, None)).is_none(),
            "{url} is a segment and must be dropped"
        );
    }
}

#[test]
fn thumbnail_colors_are_stable_and_distinct() {
    let a1 = classify(&network("https://foo.com/master.m3u8", "application/x-mpegurl")).unwrap();
    let a2 = classify(&network("https://foo.com/other.m3u8", "application/x-mpegurl")).unwrap();
    let b = classify(&network("https://bar.com/master.m3u8", "application/x-mpegurl")).unwrap();

    assert_eq!(a1.thumbnail_color, a2.thumbnail_color);
    assert_ne!(a1.thumbnail_color, b.thumbnail_color);
    assert_eq!(a1.thumbnail_color, ThumbnailColor::for_domain("foo.com"));
}

#[test]
fn candidate_serializes_round_trip() {
    let candidate = classify(&network(
        "https://cdn.example.com/live/master.m3u8",
        "application/vnd.apple.mpegurl",
    ))
    .unwrap();

    let json = serde_json::to_string(&candidate).unwrap();
    let back: StreamCandidate = serde_json::from_str(&json).unwrap();
    assert_eq!(candidate, back);
}
