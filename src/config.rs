use std::path::PathBuf;
use std::time::Duration;

use crate::api_connection::Provider;
use crate::cli::{Backend, Cli};
use crate::favorites::FAVORITES_SLOT;

pub const OPENROUTER_API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";
pub const GEMINI_API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// How long a message banner stays up unless dismissed.
pub const ERROR_DISPLAY: Duration = Duration::from_secs(5);

const DATA_DIR_NAME: &str = "culinary-ai";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: Backend,
    pub model: Option<String>,
    pub favorites_path: PathBuf,
    pub error_display: Duration,
}

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            backend: cli.backend,
            model: cli.model.clone().filter(|m| !m.trim().is_empty()),
            favorites_path: cli
                .favorites_file
                .clone()
                .unwrap_or_else(default_favorites_path),
            error_display: ERROR_DISPLAY,
        }
    }

    pub fn provider(&self) -> Provider {
        match self.backend {
            Backend::OpenRouter => Provider::openrouter(OPENROUTER_API_KEY_ENV_VAR, self.model.clone()),
            Backend::Gemini => Provider::gemini(GEMINI_API_KEY_ENV_VAR, self.model.clone()),
        }
    }
}

/// `<data dir>/culinary-ai/recipeFavorites.json`, or the working directory
/// when the platform has no data directory.
pub fn default_favorites_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(DATA_DIR_NAME))
        .unwrap_or_default()
        .join(FAVORITES_SLOT)
}
