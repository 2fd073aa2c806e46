//! Basic image generation with a single provider.
//!
//! Run with: `cargo run --example generate_image`
//!
//! Requires `OPENAI_API_KEY` environment variable.

use imagegen::{GenerationRequest, ImageProvider, OpenAiImageProvider};

#[tokio::main]
async fn main() -> imagegen::Result<()> {
    let provider = OpenAiImageProvider::builder().build()?;

    let request = GenerationRequest::new("A golden retriever puppy playing in snow")
        .with_size("1792x1024");
    let image = provider.generate(&request).await?;

    if let Some(revised) = &image.revised_prompt {
        println!("Revised prompt: {revised}");
    }
    let path = image.download("output.png").await?;
    println!("Generated image: {} saved to {}", image.url, path.display());

    Ok(())
}
