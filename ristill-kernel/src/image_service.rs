//! Image-serving collaborator.
//!
//! The gallery never touches image bytes. It asks an optimizer for a URL of a
//! resized variant and for a tiny blurred placeholder shown while the
//! variant loads.

/// Builds URLs for optimized image variants.
pub trait ImageService {
    /// URL of `source` rendered at `width` x `height` with a quality hint (1-100).
    fn variant_url(&self, source: &str, width: u32, height: u32, quality: u8) -> String;

    /// URL of a low-resolution blurred placeholder of `source`.
    fn placeholder_url(&self, source: &str, blur: u8) -> String;
}

/// Width of placeholder images.
const PLACEHOLDER_WIDTH: u32 = 16;

/// Quality of placeholder images.
const PLACEHOLDER_QUALITY: u8 = 10;

/// An optimizer reachable at a base URL taking query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizerEndpoint {
    base: String,
}

impl OptimizerEndpoint {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

impl ImageService for OptimizerEndpoint {
    fn variant_url(&self, source: &str, width: u32, height: u32, quality: u8) -> String {
        format!(
            "{}?url={}&w={width}&h={height}&q={}",
            self.base,
            urlencoding::encode(source),
            quality.clamp(1, 100),
        )
    }

    fn placeholder_url(&self, source: &str, blur: u8) -> String {
        format!(
            "{}?url={}&w={PLACEHOLDER_WIDTH}&q={PLACEHOLDER_QUALITY}&blur={blur}",
            self.base,
            urlencoding::encode(source),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_url_encodes_source() {
        let endpoint = OptimizerEndpoint::new("/_image");
        assert_eq!(
            endpoint.variant_url("https://cdn.example.com/a b.webp", 240, 427, 75),
            "/_image?url=https%3A%2F%2Fcdn.example.com%2Fa%20b.webp&w=240&h=427&q=75"
        );
    }

    #[test]
    fn quality_is_clamped() {
        let endpoint = OptimizerEndpoint::new("/_image");
        assert!(endpoint.variant_url("/a.png", 1, 1, 0).ends_with("&q=1"));
        assert!(endpoint.variant_url("/a.png", 1, 1, 255).ends_with("&q=100"));
    }

    #[test]
    fn placeholder_is_tiny_and_blurred() {
        let endpoint = OptimizerEndpoint::new("https://img.example.com/optimize");
        assert_eq!(
            endpoint.placeholder_url("/m/1.webp", 10),
            "https://img.example.com/optimize?url=%2Fm%2F1.webp&w=16&q=10&blur=10"
        );
    }
}
