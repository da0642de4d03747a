//! Gallery configuration, optionally loaded from a JSON file.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::TimeDelta;
use ristill_kernel::routing::DEFAULT_RELATED_COUNT;
use ristill_kernel::scroll_cache::DEFAULT_EXPIRY_MINUTES;
use serde::{Deserialize, Serialize};
use tessella::breakpoints::{DEFAULT_CAPTION_PADDING, DEFAULT_HEIGHT_FACTOR};
use tessella::{Breakpoint, LayoutPolicy, DEFAULT_OVERSCAN};

use crate::constants::{
    DEFAULT_CAPTION_HEIGHT, DEFAULT_IMAGE_QUALITY, DEFAULT_OPTIMIZER_URL,
    DEFAULT_PLACEHOLDER_BLUR, SCROLL_SETTLE_MS,
};

/// Every field has a default; a config file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub breakpoints: Vec<Breakpoint>,
    /// Height-to-width factor of the average image, for scroll estimates.
    pub height_factor: f32,
    /// Caption allowance added to every estimate.
    pub caption_padding: f32,
    pub overscan: usize,
    pub debounce_ms: i64,
    pub cache_expiry_minutes: i64,
    pub related_count: usize,
    pub image_quality: u8,
    pub placeholder_blur: u8,
    pub optimizer_url: String,
    /// Rendered caption height, used when measuring items.
    pub caption_height: f32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            breakpoints: LayoutPolicy::standard_breakpoints(),
            height_factor: DEFAULT_HEIGHT_FACTOR,
            caption_padding: DEFAULT_CAPTION_PADDING,
            overscan: DEFAULT_OVERSCAN,
            debounce_ms: SCROLL_SETTLE_MS,
            cache_expiry_minutes: DEFAULT_EXPIRY_MINUTES,
            related_count: DEFAULT_RELATED_COUNT,
            image_quality: DEFAULT_IMAGE_QUALITY,
            placeholder_blur: DEFAULT_PLACEHOLDER_BLUR,
            optimizer_url: DEFAULT_OPTIMIZER_URL.to_string(),
            caption_height: DEFAULT_CAPTION_HEIGHT,
        }
    }
}

impl GalleryConfig {
    /// Load from a JSON file. Missing fields use defaults; anything
    /// malformed or out of range is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.debounce_ms >= 0, "debounce_ms must not be negative");
        anyhow::ensure!(
            self.cache_expiry_minutes > 0,
            "cache_expiry_minutes must be positive"
        );
        anyhow::ensure!(
            self.height_factor.is_finite() && self.height_factor > 0.0,
            "height_factor must be a positive number"
        );
        self.layout_policy()?;
        Ok(())
    }

    pub fn layout_policy(&self) -> Result<LayoutPolicy> {
        LayoutPolicy::new(self.breakpoints.clone(), self.height_factor, self.caption_padding)
            .context("Invalid breakpoint table")
    }

    pub fn debounce(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.debounce_ms)
    }

    pub fn cache_expiry(&self) -> TimeDelta {
        TimeDelta::minutes(self.cache_expiry_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_standard_layout() {
        let config = GalleryConfig::default();
        assert_eq!(config.overscan, 2);
        assert_eq!(config.debounce(), TimeDelta::milliseconds(150));
        assert_eq!(config.cache_expiry(), TimeDelta::minutes(30));
        assert_eq!(config.layout_policy().unwrap(), LayoutPolicy::default());
    }

    #[test]
    fn partial_file_overrides_only_listed_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"debounce_ms": 300, "optimizer_url": "https://img.example.com"}}"#).unwrap();
        let config = GalleryConfig::load(file.path()).unwrap();
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.optimizer_url, "https://img.example.com");
        assert_eq!(config.related_count, 25);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"breakpoints": []}}"#).unwrap();
        assert!(GalleryConfig::load(file.path()).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"debounce_ms": "soon"}}"#).unwrap();
        assert!(GalleryConfig::load(file.path()).is_err());
    }
}
