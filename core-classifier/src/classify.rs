//! Observation classification.
//!
//! `classify` is the single entry point that turns a raw observation into an
//! optional [`StreamCandidate`]. It never fails: malformed input is a
//! non-match, not an error.

use tracing::trace;

use crate::color::ThumbnailColor;
use crate::rules;
use crate::types::{Observation, ObservationSource, StreamCandidate, StreamType};

/// Classify an observation into a catalog candidate.
///
/// Rules apply in order:
/// 1. Blocked domain (case-insensitive hostname substring) — hard filter.
/// 2. Segment resources are silently dropped; manifests always pass; a
///    non-manifest whole-file resource passes only if a later rule
///    recognizes it.
/// 3. Stream type: content-type mapping takes priority over URL extension;
///    if neither matches, the observation does not classify.
/// 4. Domain, default title, and deterministic thumbnail color.
///
/// Returns `None` for anything that should not reach the catalog, including
/// URLs that do not parse.
pub fn classify(observation: &Observation) -> Option<StreamCandidate> {
    // Media-element observations skip the network heuristics: the page is
    // already playing the URL, so the only checks left are the blocklist and
    // the family guess.
    if observation.source == ObservationSource::MediaElement {
        return classify_element(observation);
    }

    let url = observation.url.as_str();
    let content_type = observation.content_type.as_deref();

    if rules::is_blocked_domain(url) {
        trace!(url, "dropping observation from blocked domain");
        return None;
    }

    if !rules::is_manifest(url, content_type) {
        if rules::is_segment(url, content_type) {
            trace!(url, "dropping segment observation");
            return None;
        }
        // A whole-file resource: keep going, type mapping decides.
    }

    let stream_type = content_type
        .and_then(rules::type_from_content_type)
        .or_else(|| rules::type_from_url(url))?;

    build_candidate(observation, stream_type)
}

/// Classify a `<video>`-element observation. The page already committed to
/// the URL, so the family is guessed from the URL alone: `.m3u8` means HLS,
/// anything else plays progressively.
fn classify_element(observation: &Observation) -> Option<StreamCandidate> {
    let url = observation.url.as_str();

    if rules::is_blocked_domain(url) {
        trace!(url, "dropping element observation from blocked domain");
        return None;
    }

    let stream_type = if rules::extension_of(url).as_deref() == Some("m3u8") {
        StreamType::Hls
    } else {
        StreamType::Mp4
    };

    build_candidate(observation, stream_type)
}

fn build_candidate(observation: &Observation, stream_type: StreamType) -> Option<StreamCandidate> {
    let domain = rules::host_of(&observation.url)?;

    let title = observation
        .page_title
        .clone()
        .unwrap_or_else(|| format!("Video from {domain}"));

    Some(StreamCandidate {
        url: observation.url.clone(),
        manifest_url: observation.url.clone(),
        stream_type,
        content_type: observation.content_type.clone(),
        title,
        domain: domain.clone(),
        thumbnail_color: ThumbnailColor::for_domain(&domain),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_observation_classifies() {
        let obs = Observation::network(
            "https://cdn.example.com/live/master.m3u8",
            Some("application/vnd.apple.mpegurl".into()),
        );
        let candidate = classify(&obs).expect("manifest should classify");
        assert_eq!(candidate.stream_type, StreamType::Hls);
        assert_eq!(candidate.domain, "cdn.example.com");
        assert_eq!(candidate.manifest_url, candidate.url);
        assert_eq!(candidate.title, "Video from cdn.example.com");
    }

    #[test]
    fn content_type_wins_over_extension() {
        // `.ts` extension but a manifest content type: the content-type
        // mapping decides, so this is an HLS manifest, not a segment.
        let obs = Observation::network(
            "https://cdn.example.com/stream/playlist.ts",
            Some("application/x-mpegurl".into()),
        );
        let candidate = classify(&obs).expect("content type should win");
        assert_eq!(candidate.stream_type, StreamType::Hls);
    }

    #[test]
    fn blocked_domain_rejected_before_anything_else() {
        let obs = Observation::network(
            "https://sub.youtube.com/master.m3u8",
            Some("application/x-mpegurl".into()),
        );
        assert!(classify(&obs).is_none());
    }

    #[test]
    fn segments_are_dropped() {
        let obs = Observation::network("https://cdn.example.com/seg-00042.ts", None);
        assert!(classify(&obs).is_none());

        let obs = Observation::network(
            "https://cdn.example.com/chunks/chunk_114.m4s",
            Some("video/iso.segment".into()),
        );
        assert!(classify(&obs).is_none());
    }

    #[test]
    fn whole_file_mp4_classifies() {
        let obs = Observation::network(
            "https://media.example.com/films/feature.mp4",
            Some("video/mp4".into()),
        );
        let candidate = classify(&obs).expect("whole-file mp4 should classify");
        assert_eq!(candidate.stream_type, StreamType::Mp4);
    }

    #[test]
    fn unrecognized_resource_does_not_classify() {
        let obs = Observation::network("https://example.com/page.html", Some("text/html".into()));
        assert!(classify(&obs).is_none());
    }

    #[test]
    fn malformed_url_is_a_non_match() {
        let obs = Observation::network("::::not a url::::", Some("video/mp4".into()));
        assert!(classify(&obs).is_none());
    }

    #[test]
    fn page_title_overrides_default() {
        let obs = Observation::network("https://e.com/master.m3u8", None)
            .with_page_title("Great Documentary");
        let candidate = classify(&obs).unwrap();
        assert_eq!(candidate.title, "Great Documentary");
    }

    #[test]
    fn element_observation_guesses_family_from_url() {
        let hls = Observation::media_element("https://e.com/live/index.m3u8", None);
        assert_eq!(classify(&hls).unwrap().stream_type, StreamType::Hls);

        let mp4 = Observation::media_element("https://e.com/clip.webm", None);
        assert_eq!(classify(&mp4).unwrap().stream_type, StreamType::Mp4);
    }

    #[test]
    fn element_observation_respects_blocklist() {
        let obs = Observation::media_element("https://youtu.be/clip.mp4", None);
        assert!(classify(&obs).is_none());
    }
}
