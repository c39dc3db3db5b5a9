use anyhow::{bail, Context, Result};
use culinary_ai::app::{App, ImageSource, Intent};
use culinary_ai::app_state::View;
use culinary_ai::cli::{parse_args, Command};
use culinary_ai::config::AppConfig;
use culinary_ai::favorites::JsonFileStore;
use culinary_ai::logging::init_logging;
use culinary_ai::recipe_provider::LlmRecipeProvider;
use culinary_ai::renderer::TerminalRenderer;
use culinary_ai::repl::run_interactive;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok(); // Load .env file for API keys

    let cli_args = parse_args();
    init_logging(cli_args.verbose);

    let config = AppConfig::from_cli(&cli_args);
    let provider = config.provider();
    info!(
        "Using {} with favorites at {}",
        provider.model(),
        config.favorites_path.display()
    );

    let mut app = App::new(
        LlmRecipeProvider::new(provider),
        JsonFileStore::new(&config.favorites_path),
        TerminalRenderer::stdout(),
        config.error_display,
    );

    let intent = match cli_args.command.unwrap_or(Command::Interactive) {
        Command::Interactive => {
            return run_interactive(&mut app)
                .await
                .context("Interactive session failed");
        }
        Command::Generate { ingredients, goals } => Intent::Generate { ingredients, goals },
        Command::Photo { path } => Intent::UploadImage(ImageSource::File(path)),
        Command::Favorites => Intent::NavigateFavorites,
    };
    app.dispatch(intent).await;

    // One-shot commands that fall back to the home view have failed.
    if app.state().view() == View::Initial {
        if let Some(banner) = app.state().error() {
            bail!("{}", banner.message);
        }
    }
    Ok(())
}
