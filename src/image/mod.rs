//! Image generation module.

mod generator;
mod provider;
pub mod providers;
mod registry;
mod types;

pub use generator::{Generator, GeneratorBuilder};
pub use provider::ImageProvider;
pub use registry::ProviderRegistry;
pub use types::{
    AspectRatio, GenerationOptions, GenerationRequest, GenerationResult, ImageQuality, ImageSize,
    ImageStyle, ProviderKind, DEFAULT_SIZE,
};
