//! Core types for image generation.

use crate::error::{ImageGenError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Size used when a request does not name one.
pub const DEFAULT_SIZE: &str = "1024x1024";

/// Image provider kind.
///
/// Declaration order is the fallback priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI DALL-E.
    OpenAI,
    /// Google Imagen through the Gemini API.
    Gemini,
    /// Stable Diffusion hosted on Replicate.
    Replicate,
}

impl ProviderKind {
    /// Every provider, in priority order.
    pub const ALL: [ProviderKind; 3] = [Self::OpenAI, Self::Gemini, Self::Replicate];

    /// Returns the lowercase identifier (e.g., "openai").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Gemini => "gemini",
            Self::Replicate => "replicate",
        }
    }

    /// Environment variable holding this provider's credential.
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
            Self::Replicate => "REPLICATE_API_TOKEN",
        }
    }

    /// Human readable provider name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAI => "OpenAI (dall-e-3)",
            Self::Gemini => "Imagen (Google)",
            Self::Replicate => "Replicate (Stable Diffusion 3.5)",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ImageGenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "gemini" => Ok(Self::Gemini),
            "replicate" => Ok(Self::Replicate),
            other => Err(ImageGenError::InvalidRequest(format!(
                "unsupported provider: {other}"
            ))),
        }
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageSize {
    /// Creates a new size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self::new(1024, 1024)
    }
}

impl FromStr for ImageSize {
    type Err = ImageGenError;

    /// Parses `<width>x<height>`, e.g. `1920x1080`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ImageGenError::InvalidRequest(format!("invalid size {s:?}, expected <width>x<height>"));
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width = w.trim().parse::<u32>().map_err(|_| invalid())?;
        let height = h.trim().parse::<u32>().map_err(|_| invalid())?;
        Ok(Self::new(width, height))
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Aspect ratios understood by ratio-based providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1:1 square aspect ratio.
    #[serde(rename = "1:1")]
    Square,
    /// 16:9 landscape (widescreen) aspect ratio.
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16 portrait (tall) aspect ratio.
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    /// Returns the aspect ratio as a string (e.g., "16:9").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }

    /// Buckets pixel dimensions: equal is square, wider is landscape, taller is portrait.
    pub fn from_size(size: ImageSize) -> Self {
        use std::cmp::Ordering;

        match size.width.cmp(&size.height) {
            Ordering::Equal => Self::Square,
            Ordering::Greater => Self::Landscape,
            Ordering::Less => Self::Portrait,
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rendering style hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStyle {
    /// More natural, less hyper-real images.
    #[default]
    Natural,
    /// Hyper-real and dramatic images.
    Vivid,
}

impl ImageStyle {
    /// Returns the wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Natural => "natural",
            Self::Vivid => "vivid",
        }
    }
}

impl FromStr for ImageStyle {
    type Err = ImageGenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "natural" => Ok(Self::Natural),
            "vivid" => Ok(Self::Vivid),
            other => Err(ImageGenError::InvalidRequest(format!("unknown style: {other}"))),
        }
    }
}

/// Output quality hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    /// Standard quality.
    Standard,
    /// Finer detail, slower.
    #[default]
    Hd,
}

impl ImageQuality {
    /// Returns the wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Hd => "hd",
        }
    }
}

/// Caller-facing generation options. Unset fields take request defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOptions {
    /// Force a specific provider instead of the registry default.
    pub provider: Option<ProviderKind>,
    /// Size as `<width>x<height>`.
    pub size: Option<String>,
    /// Rendering style.
    pub style: Option<ImageStyle>,
    /// Output quality.
    pub quality: Option<ImageQuality>,
}

impl GenerationOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces a provider.
    pub fn with_provider(mut self, provider: ProviderKind) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Sets the size string.
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Sets the style.
    pub fn with_style(mut self, style: ImageStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Sets the quality.
    pub fn with_quality(mut self, quality: ImageQuality) -> Self {
        self.quality = Some(quality);
        self
    }
}

/// A normalized request handed to provider adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The text prompt describing the desired image.
    pub prompt: String,
    /// Requested size, kept verbatim. See [`GenerationRequest::dimensions`].
    pub size: String,
    /// Rendering style.
    pub style: ImageStyle,
    /// Output quality.
    pub quality: ImageQuality,
}

impl GenerationRequest {
    /// Creates a new request with the given prompt and default settings.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            size: DEFAULT_SIZE.to_string(),
            style: ImageStyle::default(),
            quality: ImageQuality::default(),
        }
    }

    /// Builds a request from a prompt and caller options.
    pub fn from_options(prompt: impl Into<String>, options: &GenerationOptions) -> Self {
        let mut request = Self::new(prompt);
        if let Some(size) = &options.size {
            request.size = size.clone();
        }
        if let Some(style) = options.style {
            request.style = style;
        }
        if let Some(quality) = options.quality {
            request.quality = quality;
        }
        request
    }

    /// Sets the size string.
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    /// Sets the style.
    pub fn with_style(mut self, style: ImageStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets the quality.
    pub fn with_quality(mut self, quality: ImageQuality) -> Self {
        self.quality = quality;
        self
    }

    /// Parses the size string, returning `None` when it is malformed.
    pub fn dimensions(&self) -> Option<ImageSize> {
        self.size.parse().ok()
    }

    /// Rejects requests no provider could serve.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(ImageGenError::InvalidRequest("prompt must not be empty".into()));
        }
        Ok(())
    }
}

/// The normalized outcome of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[must_use = "generation result should be used or downloaded"]
pub struct GenerationResult {
    /// Remote URL or storage URI of the produced image.
    pub url: String,
    /// Provider that actually produced the image.
    pub provider: ProviderKind,
    /// Prompt as rewritten by the provider, if it rewrote it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
}

impl GenerationResult {
    /// Creates a new result.
    pub fn new(url: impl Into<String>, provider: ProviderKind) -> Self {
        Self {
            url: url.into(),
            provider,
            revised_prompt: None,
        }
    }

    /// Attaches the provider's rewritten prompt.
    pub fn with_revised_prompt(mut self, revised_prompt: Option<String>) -> Self {
        self.revised_prompt = revised_prompt;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_from_size() {
        let landscape: ImageSize = "1024x768".parse().unwrap();
        let portrait: ImageSize = "768x1024".parse().unwrap();
        let square: ImageSize = "1024x1024".parse().unwrap();

        assert_eq!(AspectRatio::from_size(landscape), AspectRatio::Landscape);
        assert_eq!(AspectRatio::from_size(portrait), AspectRatio::Portrait);
        assert_eq!(AspectRatio::from_size(square), AspectRatio::Square);
    }

    #[test]
    fn test_aspect_ratio_as_str() {
        assert_eq!(AspectRatio::Square.as_str(), "1:1");
        assert_eq!(AspectRatio::Landscape.as_str(), "16:9");
        assert_eq!(AspectRatio::Portrait.as_str(), "9:16");
    }

    #[test]
    fn test_size_parsing() {
        assert_eq!("1920x1080".parse::<ImageSize>().unwrap(), ImageSize::new(1920, 1080));
        assert_eq!(" 512X512 ".parse::<ImageSize>().unwrap(), ImageSize::new(512, 512));
        assert!("large".parse::<ImageSize>().is_err());
        assert!("1024x".parse::<ImageSize>().is_err());
        assert!("-5x10".parse::<ImageSize>().is_err());
    }

    #[test]
    fn test_request_defaults() {
        let req = GenerationRequest::new("A lighthouse");
        assert_eq!(req.size, "1024x1024");
        assert_eq!(req.style, ImageStyle::Natural);
        assert_eq!(req.quality, ImageQuality::Hd);
        assert_eq!(req.dimensions(), Some(ImageSize::default()));
    }

    #[test]
    fn test_request_from_options() {
        let options = GenerationOptions::new()
            .with_size("1200x800")
            .with_style(ImageStyle::Vivid);
        let req = GenerationRequest::from_options("A lighthouse", &options);

        assert_eq!(req.size, "1200x800");
        assert_eq!(req.style, ImageStyle::Vivid);
        assert_eq!(req.quality, ImageQuality::Hd);
    }

    #[test]
    fn test_malformed_size_has_no_dimensions() {
        let req = GenerationRequest::new("A lighthouse").with_size("huge");
        assert_eq!(req.dimensions(), None);
    }

    #[test]
    fn test_validate_rejects_blank_prompt() {
        assert!(GenerationRequest::new("   ").validate().is_err());
        assert!(GenerationRequest::new("cat").validate().is_ok());
    }

    #[test]
    fn test_provider_kind_display_and_parse() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.to_string().parse::<ProviderKind>().unwrap(), kind);
        }
        assert_eq!(ProviderKind::OpenAI.to_string(), "openai");
        assert!("midjourney".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_result_serialization() {
        let result = GenerationResult::new("http://x/y.png", ProviderKind::Replicate);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"url": "http://x/y.png", "provider": "replicate"})
        );

        let result = GenerationResult::new("http://x/y.png", ProviderKind::OpenAI)
            .with_revised_prompt(Some("A calm lake".into()));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["revised_prompt"], "A calm lake");
    }
}
