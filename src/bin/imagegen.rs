//! CLI for imagegen - templated AI image generation.

use clap::{Args, Parser, Subcommand, ValueEnum};
use imagegen::prompts::{self, PromptTemplate};
use imagegen::{
    GenerationOptions, GenerationResult, Generator, ImageQuality, ImageStyle, ProviderKind,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "imagegen")]
#[command(about = "Generate images via OpenAI, Imagen or Replicate with automatic fallback")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct CommonArgs {
    /// Provider to try first (defaults to the first configured one)
    #[arg(short, long, value_enum, global = true)]
    provider: Option<ProviderArg>,

    /// Download the generated image to this path
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Output as JSON (for `providers`)
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a hero image for a website
    Hero {
        /// Brand name
        brand: String,
        /// Target audience
        persona: String,
        /// Visual style (default: professional)
        style: Option<String>,
    },

    /// Generate product photography
    Product {
        /// Product to photograph
        product: String,
        /// Scene or context
        context: String,
        /// Visual style (default: clean)
        style: Option<String>,
    },

    /// Generate a team photo
    Team {
        /// Industry the team works in
        industry: String,
        /// Setting (default: modern office)
        setting: Option<String>,
        /// Do not ask for a diverse team
        #[arg(long)]
        no_diversity: bool,
    },

    /// Generate a business illustration
    Illustration {
        /// Concept to illustrate
        concept: String,
        /// Illustration style (default: modern)
        style: Option<String>,
        /// Mood (default: professional)
        mood: Option<String>,
    },

    /// Generate an image from a custom prompt
    Custom {
        /// The text prompt describing the image
        prompt: String,
        /// Size as <width>x<height> (default: 1024x1024)
        size: Option<String>,
        /// Rendering style
        #[arg(value_enum)]
        style: Option<StyleArg>,
        /// Output quality
        #[arg(long, value_enum)]
        quality: Option<QualityArg>,
    },

    /// List providers and whether they are configured
    Providers,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProviderArg {
    Openai,
    Gemini,
    Replicate,
}

impl From<ProviderArg> for ProviderKind {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Openai => ProviderKind::OpenAI,
            ProviderArg::Gemini => ProviderKind::Gemini,
            ProviderArg::Replicate => ProviderKind::Replicate,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StyleArg {
    Natural,
    Vivid,
}

impl From<StyleArg> for ImageStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Natural => ImageStyle::Natural,
            StyleArg::Vivid => ImageStyle::Vivid,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum QualityArg {
    Standard,
    Hd,
}

impl From<QualityArg> for ImageQuality {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::Standard => ImageQuality::Standard,
            QualityArg::Hd => ImageQuality::Hd,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let template = match cli.command {
        Commands::Hero {
            brand,
            persona,
            style,
        } => prompts::hero_image(&brand, &persona, style.as_deref()),
        Commands::Product {
            product,
            context,
            style,
        } => prompts::product_image(&product, &context, style.as_deref()),
        Commands::Team {
            industry,
            setting,
            no_diversity,
        } => prompts::team_photo(&industry, !no_diversity, setting.as_deref()),
        Commands::Illustration {
            concept,
            style,
            mood,
        } => prompts::illustration(&concept, style.as_deref(), mood.as_deref()),
        Commands::Custom {
            prompt,
            size,
            style,
            quality,
        } => PromptTemplate {
            prompt,
            options: GenerationOptions {
                provider: None,
                size,
                style: style.map(Into::into),
                quality: quality.map(Into::into),
            },
        },
        Commands::Providers => {
            list_providers(cli.common.json)?;
            return Ok(());
        }
    };

    let result = generate(template, &cli.common).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

async fn generate(template: PromptTemplate, common: &CommonArgs) -> anyhow::Result<GenerationResult> {
    let generator = Generator::from_env()?;

    let mut options = template.options;
    if let Some(provider) = common.provider {
        options.provider = Some(provider.into());
    }

    let result = generator.generate(template.prompt, options).await?;

    if let Some(ref path) = common.output {
        let saved = result.download(path).await?;
        eprintln!("Saved image to {}", saved.display());
    }

    Ok(result)
}

fn list_providers(json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct ProviderInfo {
        name: &'static str,
        kind: ProviderKind,
        env_var: &'static str,
        configured: bool,
        default: bool,
    }

    let generator = Generator::from_env()?;
    let registry = generator.registry();
    let default = registry.default_provider().ok();

    let providers: Vec<ProviderInfo> = ProviderKind::ALL
        .into_iter()
        .map(|kind| ProviderInfo {
            name: kind.display_name(),
            kind,
            env_var: kind.env_var(),
            configured: registry.is_usable(kind),
            default: default == Some(kind),
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&providers)?);
    } else {
        println!("Providers (in fallback order):\n");
        for p in &providers {
            let status = if p.configured { "✓" } else { "✗" };
            let marker = if p.default { " [default]" } else { "" };
            println!("  {} {} ({}){}", status, p.name, p.kind, marker);
            println!("    API key: {}", p.env_var);
        }
    }

    Ok(())
}
