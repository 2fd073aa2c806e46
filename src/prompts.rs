//! Prompt templates for common marketing images.
//!
//! Each template returns the prompt together with the options it should be
//! generated with; pass both to [`Generator::generate`](crate::Generator::generate).

use crate::image::{GenerationOptions, ImageQuality, ImageStyle};

/// A ready-to-generate prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// The rendered prompt text.
    pub prompt: String,
    /// Size, style and quality the template is designed for.
    pub options: GenerationOptions,
}

impl PromptTemplate {
    fn new(prompt: String, size: &str, style: ImageStyle, quality: Option<ImageQuality>) -> Self {
        let mut options = GenerationOptions::new().with_size(size).with_style(style);
        options.quality = quality;
        Self { prompt, options }
    }
}

/// Website hero image for `brand` aimed at `persona`. Style defaults to "professional".
pub fn hero_image(brand: &str, persona: &str, style: Option<&str>) -> PromptTemplate {
    let style = style.unwrap_or("professional");
    let prompt = format!(
        "Create a hero image for a {brand} website targeting {persona}.\n\
         Style: {style}, high-quality, modern, clean composition.\n\
         Focus on conveying trust and professionalism.\n\
         Lighting: bright, welcoming, professional photography style.\n\
         No text or logos in the image."
    );
    PromptTemplate::new(prompt, "1920x1080", ImageStyle::Natural, Some(ImageQuality::Hd))
}

/// Product photography of `product` in `context`. Style defaults to "clean".
pub fn product_image(product: &str, context: &str, style: Option<&str>) -> PromptTemplate {
    let style = style.unwrap_or("clean");
    let prompt = format!(
        "Professional product photography of {product} in {context}.\n\
         Style: {style}, minimal background, excellent lighting.\n\
         High-end commercial photography quality.\n\
         Focus on showcasing the product clearly and attractively."
    );
    PromptTemplate::new(prompt, "1024x1024", ImageStyle::Natural, Some(ImageQuality::Hd))
}

/// Corporate team photo for `industry`. Setting defaults to "modern office".
pub fn team_photo(industry: &str, diverse: bool, setting: Option<&str>) -> PromptTemplate {
    let setting = setting.unwrap_or("modern office");
    let team = if diverse {
        "diverse team of professionals"
    } else {
        "team of professionals"
    };
    let prompt = format!(
        "Professional corporate photography of a {team} in {industry}.\n\
         Setting: {setting}, natural lighting, authentic interactions.\n\
         Style: professional but approachable, high-quality business photography.\n\
         People should look confident and collaborative."
    );
    PromptTemplate::new(prompt, "1200x800", ImageStyle::Natural, Some(ImageQuality::Hd))
}

/// Business illustration of `concept`.
///
/// Style defaults to "modern" and mood to "professional". Quality is left to
/// the request default.
pub fn illustration(concept: &str, style: Option<&str>, mood: Option<&str>) -> PromptTemplate {
    let style = style.unwrap_or("modern");
    let mood = mood.unwrap_or("professional");
    let prompt = format!(
        "{style} illustration representing {concept}.\n\
         Mood: {mood}, clean design, suitable for business use.\n\
         Vector-style artwork, professional quality.\n\
         Color palette should be modern and sophisticated."
    );
    PromptTemplate::new(prompt, "1024x1024", ImageStyle::Vivid, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hero_image() {
        let t = hero_image("Acme", "small business owners", None);
        assert!(t.prompt.starts_with("Create a hero image for a Acme website targeting small business owners."));
        assert!(t.prompt.contains("Style: professional,"));
        assert_eq!(t.options.size.as_deref(), Some("1920x1080"));
        assert_eq!(t.options.style, Some(ImageStyle::Natural));
        assert_eq!(t.options.quality, Some(ImageQuality::Hd));
        assert!(t.options.provider.is_none());
    }

    #[test]
    fn test_product_image_custom_style() {
        let t = product_image("a ceramic mug", "a sunlit kitchen", Some("rustic"));
        assert!(t.prompt.contains("of a ceramic mug in a sunlit kitchen."));
        assert!(t.prompt.contains("Style: rustic,"));
        assert_eq!(t.options.size.as_deref(), Some("1024x1024"));
    }

    #[test]
    fn test_team_photo() {
        let diverse = team_photo("fintech", true, None);
        assert!(diverse.prompt.contains("a diverse team of professionals in fintech."));
        assert!(diverse.prompt.contains("Setting: modern office,"));
        assert_eq!(diverse.options.size.as_deref(), Some("1200x800"));

        let plain = team_photo("fintech", false, Some("rooftop terrace"));
        assert!(plain.prompt.contains("a team of professionals in fintech."));
        assert!(plain.prompt.contains("Setting: rooftop terrace,"));
    }

    #[test]
    fn test_illustration() {
        let t = illustration("cloud security", None, Some("optimistic"));
        assert!(t.prompt.starts_with("modern illustration representing cloud security."));
        assert!(t.prompt.contains("Mood: optimistic,"));
        assert_eq!(t.options.style, Some(ImageStyle::Vivid));
        assert!(t.options.quality.is_none());
    }
}
