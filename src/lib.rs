#![warn(missing_docs)]
//! imagegen - AI image generation with automatic provider fallback.
//!
//! Credentials are read once from the environment. The first configured
//! provider (OpenAI, then Gemini, then Replicate) is tried first; if it fails,
//! the remaining configured providers are tried in the same order until one
//! succeeds.
//!
//! # Quick Start
//!
//! ```no_run
//! use imagegen::{GenerationOptions, Generator};
//!
//! #[tokio::main]
//! async fn main() -> imagegen::Result<()> {
//!     let generator = Generator::from_env()?;
//!     let options = GenerationOptions::new().with_size("1792x1024");
//!     let image = generator.generate("A lighthouse at dusk", options).await?;
//!     println!("{} via {}", image.url, image.provider);
//!     image.download("lighthouse.png").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Providers
//!
//! | Provider  | Credential            | Mode                 |
//! |-----------|-----------------------|----------------------|
//! | OpenAI    | `OPENAI_API_KEY`      | synchronous, pixels  |
//! | Gemini    | `GEMINI_API_KEY`      | synchronous, ratio   |
//! | Replicate | `REPLICATE_API_TOKEN` | submit and poll      |
//!
//! Replicate polling runs every second without a bound by default. Set
//! `IMAGEGEN_POLL_TIMEOUT_SECS` or `IMAGEGEN_POLL_MAX_ATTEMPTS` (or use
//! [`PollPolicy`]) to cap it.

mod asset;
mod config;
mod error;
pub mod image;
pub mod prompts;

pub use asset::download_image;
pub use config::{Credential, Credentials, PollPolicy};
pub use error::{ImageGenError, ProviderFailure, Result};

pub use image::{
    AspectRatio, GenerationOptions, GenerationRequest, GenerationResult, Generator,
    GeneratorBuilder, ImageProvider, ImageQuality, ImageSize, ImageStyle, ProviderKind,
    ProviderRegistry,
};

pub use image::providers::{
    GeminiModel, GeminiProvider, GeminiProviderBuilder, OpenAiImageModel, OpenAiImageProvider,
    OpenAiImageProviderBuilder, ReplicateModel, ReplicateProvider, ReplicateProviderBuilder,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{ImageGenError, Result};
    pub use crate::image::{
        GenerationOptions, GenerationRequest, GenerationResult, Generator, ImageProvider,
        ProviderKind,
    };
}
