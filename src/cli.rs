use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Recipes from your ingredients or a photo of a dish", long_about = None)]
pub struct Cli {
    /// LLM backend used for recipes and dish identification
    #[arg(long, value_enum, env = "CULINARY_BACKEND", default_value_t = Backend::OpenRouter, global = true)]
    pub backend: Backend,

    /// Model name, defaults to the backend's own default
    #[arg(long, env = "CULINARY_MODEL", global = true)]
    pub model: Option<String>,

    /// Path of the favorites file
    #[arg(long, env = "CULINARY_FAVORITES_FILE", global = true)]
    pub favorites_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Interactive prompt (the default)
    Interactive,

    /// Generate recipes from ingredients and goals
    Generate {
        /// Ingredients at hand, e.g. "chicken, broccoli, rice"
        #[arg(short, long, default_value = "")]
        ingredients: String,

        /// Goals for the meal, e.g. "under 500 calories, high protein"
        #[arg(short, long, default_value = "")]
        goals: String,
    },

    /// Identify the dish in a photo and get its recipes
    Photo {
        /// Image file
        path: PathBuf,
    },

    /// List saved favorite recipes
    Favorites,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    #[value(name = "openrouter")]
    OpenRouter,
    Gemini,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
