//! Image generation providers.

mod gemini;
mod openai;
mod replicate;

pub use gemini::{GeminiModel, GeminiProvider, GeminiProviderBuilder};
pub use openai::{OpenAiImageModel, OpenAiImageProvider, OpenAiImageProviderBuilder};
pub use replicate::{ReplicateModel, ReplicateProvider, ReplicateProviderBuilder};
