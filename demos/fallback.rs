//! Generates through every configured provider, falling back on failure.
//!
//! Run with: `cargo run --example fallback`
//!
//! Requires at least one of: `OPENAI_API_KEY`, `GEMINI_API_KEY`, or
//! `REPLICATE_API_TOKEN`.

use imagegen::{prompts, Generator, ImageGenError};

#[tokio::main]
async fn main() -> imagegen::Result<()> {
    let generator = Generator::from_env()?;

    let usable = generator.registry().usable_providers();
    if usable.is_empty() {
        eprintln!("Set at least one API key environment variable.");
        std::process::exit(1);
    }
    println!("Configured providers, in the order they are tried:");
    for kind in &usable {
        println!("  {}", kind.display_name());
    }

    let template = prompts::product_image("a ceramic mug", "a sunlit kitchen", None);
    match generator.generate(template.prompt, template.options).await {
        Ok(image) => {
            println!("Generated by {}: {}", image.provider, image.url);
            if image.url.starts_with("http") {
                let path = image.download(format!("{}_output.png", image.provider)).await?;
                println!("Saved to {}", path.display());
            }
            Ok(())
        }
        Err(ImageGenError::AllProvidersFailed { attempts }) => {
            for failure in &attempts {
                eprintln!("{}: {}", failure.provider, failure.error);
            }
            std::process::exit(1);
        }
        Err(err) => Err(err),
    }
}
