//! Deterministic per-domain thumbnail color.
//!
//! Entries have no real artwork, so the display falls back to a solid color
//! derived from the originating domain. The same domain must always yield the
//! same color across sessions and contexts.

use serde::{Deserialize, Serialize};

/// Fixed saturation applied to every generated color, in percent.
pub const THUMBNAIL_SATURATION: u8 = 70;
/// Fixed lightness applied to every generated color, in percent.
pub const THUMBNAIL_LIGHTNESS: u8 = 60;

/// An HSL color with fixed saturation and lightness; only the hue varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThumbnailColor {
    /// Hue in degrees. May be negative; consumers of HSL notation accept
    /// out-of-range hues and normalize them.
    pub hue: i32,
}

impl ThumbnailColor {
    /// Derive the color for a domain.
    ///
    /// Folds the domain string into a 32-bit hash (`hash = c + hash * 31`
    /// with wrapping arithmetic) and reduces it modulo 360 to a hue.
    pub fn for_domain(domain: &str) -> Self {
        let mut hash: i32 = 0;
        for c in domain.chars() {
            hash = (c as i32).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash));
        }
        Self { hue: hash % 360 }
    }

    /// CSS `hsl()` notation for the color.
    pub fn to_css(&self) -> String {
        format!(
            "hsl({}, {}%, {}%)",
            self.hue, THUMBNAIL_SATURATION, THUMBNAIL_LIGHTNESS
        )
    }
}

impl std::fmt::Display for ThumbnailColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_css())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_domain_same_color() {
        let a = ThumbnailColor::for_domain("example.com");
        let b = ThumbnailColor::for_domain("example.com");
        assert_eq!(a, b);
    }

    #[test]
    fn different_domains_differ() {
        let a = ThumbnailColor::for_domain("foo.com");
        let b = ThumbnailColor::for_domain("bar.com");
        assert_ne!(a, b);
    }

    #[test]
    fn hue_is_within_modulus() {
        for domain in ["a", "media.example.org", "cdn-03.video.example"] {
            let color = ThumbnailColor::for_domain(domain);
            assert!(color.hue > -360 && color.hue < 360, "hue {}", color.hue);
        }
    }

    #[test]
    fn css_notation() {
        let color = ThumbnailColor { hue: 120 };
        assert_eq!(color.to_css(), "hsl(120, 70%, 60%)");
    }
}
