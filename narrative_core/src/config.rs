//! Media configuration.

use serde::{Deserialize, Serialize};

use crate::media::AudioFormat;

/// Shown when an illustration cannot be produced.
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "https://picsum.photos/800/600?grayscale&blur=2";

/// Style preamble prepended to every scene prompt.
pub const DEFAULT_IMAGE_STYLE: &str = "Classic Victorian storybook illustration, oil painting on canvas style, masterpiece, highly detailed, realistic proportions, warm golden lighting, 19th century atmosphere.";

/// Errors loading a [`MediaConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse media config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid media config: {0}")]
    Invalid(&'static str),
}

/// Configuration for media synthesis and caching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Layout of speech payloads returned by the provider.
    pub audio_format: AudioFormat,

    /// Image reference used when synthesis fails. Never cached.
    pub placeholder_image: String,

    /// Byte budget of the in-memory session store.
    pub cache_capacity_bytes: usize,

    /// Preamble prepended to scene prompts, if any.
    pub image_style: Option<String>,

    /// Serve a node's bundled image instead of painting a new one.
    pub prefer_static_images: bool,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            audio_format: AudioFormat::default(),
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
            cache_capacity_bytes: 5 * 1024 * 1024,
            image_style: Some(DEFAULT_IMAGE_STYLE.to_string()),
            prefer_static_images: false,
        }
    }
}

impl MediaConfig {
    /// Parse and validate a TOML config. Missing fields take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: MediaConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audio_format.channels == 0 {
            return Err(ConfigError::Invalid("audio_format.channels must be at least 1"));
        }
        if self.audio_format.sample_rate == 0 {
            return Err(ConfigError::Invalid("audio_format.sample_rate must be positive"));
        }
        if self.placeholder_image.is_empty() {
            return Err(ConfigError::Invalid("placeholder_image must not be empty"));
        }
        Ok(())
    }

    /// The full prompt sent to the provider for a scene.
    pub fn image_prompt(&self, scene: &str) -> String {
        match &self.image_style {
            Some(style) => format!("{} Scene: {}", style, scene),
            None => scene.to_string(),
        }
    }
}
