//! Command-line front end for recipe extraction.
//!
//! Prints results as JSON on stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use recipe_extraction::ai::OpenAI;
use recipe_extraction::{
    extract_name_or_degrade, generate_from_knowledge, ExtractionRouter, GeneratedRecipeResult,
    GenerationRequest, RecipeConfig, RecipeExtractor, UnifiedResult,
};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "recipe")]
#[command(about = "Extract structured recipes from web pages, Instagram posts and videos")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a recipe from a URL
    Extract {
        url: String,

        /// Generate from knowledge when extraction finds a dish but no full recipe
        #[arg(long)]
        fallback_generate: bool,
    },

    /// Generate a recipe for a dish name from model knowledge
    Generate { name: String },

    /// Pull a dish name out of free text
    Name {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

#[derive(Serialize)]
struct ExtractOutput {
    extraction: UnifiedResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    generated: Option<GeneratedRecipeResult>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,recipe_extraction=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = RecipeConfig::from_env().context("Failed to load configuration")?;
    let ai = OpenAI::new(config.require_openai()?.clone());

    let succeeded = match cli.command {
        Commands::Extract {
            url,
            fallback_generate,
        } => {
            let router = ExtractionRouter::from_config(&config)
                .context("Failed to build extraction router")?;
            let extractor =
                RecipeExtractor::new(router, ai).with_config(config.pipeline.clone());

            let extraction = extractor.extract_and_process(&url).await;

            let generated = match GenerationRequest::from_failed(&extraction) {
                Some(request) if fallback_generate => {
                    tracing::info!(recipe_name = %request.recipe_name, "Falling back to generation");
                    Some(generate_from_knowledge(extractor.judge(), &request).await)
                }
                _ => None,
            };

            let succeeded = extraction.success || generated.as_ref().is_some_and(|g| g.success);
            print_json(&ExtractOutput {
                extraction,
                generated,
            })?;
            succeeded
        }
        Commands::Generate { name } => {
            let result = generate_from_knowledge(&ai, &GenerationRequest::new(name)).await;
            print_json(&result)?;
            result.success
        }
        Commands::Name { text } => {
            let extraction = extract_name_or_degrade(&ai, &text.join(" ")).await;
            print_json(&extraction)?;
            extraction.recipe_name.is_some()
        }
    };

    if !succeeded {
        std::process::exit(1);
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
