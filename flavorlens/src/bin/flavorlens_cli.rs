//! Command-line front end for the FlavorLens relay.
//!
//! Usage:
//! ```bash
//! # Suggest recipes for a photo using a local relay
//! flavorlens-cli dinner.jpg
//!
//! # Show the full method for the second suggestion
//! flavorlens-cli dinner.jpg --detail 2
//! ```

use anyhow::Result;
use clap::Parser;
use flavorlens::client::{self, ErrorKind, RelayClient, ViewState};
use flavorlens::models::Recipe;
use service_core::observability::init_tracing;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "flavorlens-cli",
    about = "Get recipe ideas from a food photo",
    long_about = "Upload a JPEG, PNG or WebP photo of food or ingredients to a FlavorLens relay and print the suggested recipes"
)]
struct CliArgs {
    /// Image to analyze
    image: PathBuf,

    /// Base URL of the relay
    #[arg(long, env = "FLAVORLENS_RELAY_URL", default_value = "http://localhost:8080")]
    relay_url: String,

    /// Print the full recipe at this position (1-based)
    #[arg(long, short = 'd')]
    detail: Option<usize>,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = CliArgs::parse();

    if args.verbose {
        init_tracing("flavorlens-cli", "debug", None);
    }

    let mime_type = client::mime_type_for_path(&args.image)?;
    let bytes = tokio::fs::read(&args.image).await?;

    let mut state = ViewState::new();
    state.begin_upload(client::preview_data_url(&bytes, mime_type));
    println!("Analyzing {}...", args.image.display());

    let relay = RelayClient::new(&args.relay_url);
    state.finish(relay.analyze(&bytes, mime_type).await);

    if let Some(notice) = state.error() {
        match notice.kind {
            ErrorKind::NoFood => eprintln!("No food found: {}", notice.message),
            ErrorKind::General => eprintln!("Error: {}", notice.message),
        }
        return Ok(ExitCode::FAILURE);
    }

    if state.recipes().is_empty() {
        println!("No recipes suggested.");
        return Ok(ExitCode::SUCCESS);
    }

    match args.detail {
        Some(position) => {
            let available = state.recipes().len();
            let Some(recipe) = position.checked_sub(1).and_then(|i| state.select(i)) else {
                eprintln!("No recipe at position {}; {} available", position, available);
                return Ok(ExitCode::FAILURE);
            };
            print_detail(recipe);
        }
        None => {
            for (i, recipe) in state.recipes().iter().enumerate() {
                print_card(i + 1, recipe);
            }
            println!("\nUse --detail <N> for the full method.");
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_card(position: usize, recipe: &Recipe) {
    println!("\n{}. {} ({})", position, recipe.recipe_name, recipe.time);
    println!("   {}", recipe.description);
    if !recipe.main_ingredients.is_empty() {
        println!("   Ingredients: {}", recipe.main_ingredients.join(", "));
    }
}

fn print_detail(recipe: &Recipe) {
    println!("\n{}", recipe.recipe_name);
    println!("{}", "=".repeat(recipe.recipe_name.chars().count()));
    println!("{}\n", recipe.description);
    println!("Time: {}\n", recipe.time);

    println!("Ingredients:");
    for ingredient in &recipe.main_ingredients {
        println!("  - {}", ingredient);
    }

    println!("\nInstructions:");
    for (i, step) in recipe.instructions.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
}
