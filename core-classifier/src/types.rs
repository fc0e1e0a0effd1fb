//! Classification input and output types.

use serde::{Deserialize, Serialize};

use crate::color::ThumbnailColor;

/// Stream container/delivery family of a catalog entry.
///
/// A closed set: every dispatch site (classifier output, playback dispatch,
/// display badge) matches exhaustively on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    /// HTTP Live Streaming (manifest-driven adaptive).
    Hls,
    /// MPEG-DASH (manifest-driven adaptive).
    Dash,
    /// Progressive MP4.
    Mp4,
    /// Progressive WebM.
    Webm,
    /// Media Source Extensions capture. The capture feature is disabled;
    /// entries of this type exist only so the variant stays representable.
    Mse,
    /// Recognized as a stream but of no known family.
    Unknown,
}

impl StreamType {
    /// Content-type hint for handing the entry to an external receiver.
    pub fn content_type_hint(&self) -> &'static str {
        match self {
            StreamType::Hls => "application/x-mpegurl",
            StreamType::Dash => "application/dash+xml",
            StreamType::Mp4 => "video/mp4",
            StreamType::Webm => "video/webm",
            StreamType::Mse | StreamType::Unknown => "application/octet-stream",
        }
    }

    /// Whether this family is driven by a manifest rather than a single file.
    pub fn is_adaptive(&self) -> bool {
        matches!(self, StreamType::Hls | StreamType::Dash)
    }
}

impl std::fmt::Display for StreamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StreamType::Hls => "hls",
            StreamType::Dash => "dash",
            StreamType::Mp4 => "mp4",
            StreamType::Webm => "webm",
            StreamType::Mse => "mse",
            StreamType::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Where an observation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationSource {
    /// Completed network response with headers.
    NetworkResponse,
    /// A media element discovered in the page DOM.
    MediaElement,
}

/// A raw network/DOM observation handed to the classifier.
#[derive(Debug, Clone)]
pub struct Observation {
    /// Resource URL as observed.
    pub url: String,
    /// `Content-Type` header value, when the observation carries one.
    pub content_type: Option<String>,
    /// Title of the originating page, when known.
    pub page_title: Option<String>,
    pub source: ObservationSource,
}

impl Observation {
    /// Observation of a completed network response.
    pub fn network(url: impl Into<String>, content_type: Option<String>) -> Self {
        Self {
            url: url.into(),
            content_type,
            page_title: None,
            source: ObservationSource::NetworkResponse,
        }
    }

    /// Observation of a `<video>`-style element found in the page.
    pub fn media_element(url: impl Into<String>, page_title: Option<String>) -> Self {
        Self {
            url: url.into(),
            content_type: None,
            page_title,
            source: ObservationSource::MediaElement,
        }
    }

    /// Attach the originating page title.
    pub fn with_page_title(mut self, title: impl Into<String>) -> Self {
        self.page_title = Some(title.into());
        self
    }
}

/// A successfully classified observation.
///
/// A candidate is not yet a queue entry: promotion into the durable queue is
/// a separate, explicit user action handled by the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamCandidate {
    pub url: String,
    /// Manifest URL; equal to `url` when the resource is its own manifest.
    pub manifest_url: String,
    pub stream_type: StreamType,
    /// Content type as observed, when any.
    pub content_type: Option<String>,
    /// Display title. Defaults to `"Video from {domain}"` until the real
    /// page title is known.
    pub title: String,
    pub domain: String,
    pub thumbnail_color: ThumbnailColor,
}
