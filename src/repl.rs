use anyhow::Result;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{sleep_until, Instant as TokioInstant};
use tracing::debug;

use crate::app::{App, ImageSource, Intent};
use crate::app_state::{AppState, View};
use crate::favorites::FavoritesStore;
use crate::recipe_provider::RecipeProvider;
use crate::renderer::ViewRenderer;

pub const HELP: &str = "\
Commands:
  generate <ingredients> | <goals>   ask for recipes
  photo <path>                       identify a dish photo and get its recipes
  open <n>                           show recipe n of the current list
  fav [<n>]                          toggle favorite (recipe n, or the open recipe)
  back                               leave the recipe detail
  home | favorites                   switch views
  dismiss                            hide the current message
  help | quit";

#[derive(Debug, Clone)]
pub enum Command {
    Intent(Intent),
    Help,
    Quit,
    Empty,
    Invalid(String),
}

/// Parses one input line against what is currently on screen.
pub fn parse_command(line: &str, state: &AppState) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let word = word.to_ascii_lowercase();
    let starts_request = matches!(word.as_str(), "generate" | "g" | "photo" | "p");
    if starts_request && state.view() != View::Initial {
        return Command::Invalid(format!("{} works from the home view, type `home` first", word));
    }

    match word.as_str() {
        "generate" | "g" => {
            let (ingredients, goals) = match rest.split_once('|') {
                Some((ingredients, goals)) => (ingredients.trim(), goals.trim()),
                None => (rest, ""),
            };
            Command::Intent(Intent::Generate {
                ingredients: ingredients.to_string(),
                goals: goals.to_string(),
            })
        }
        "photo" | "p" if !rest.is_empty() => {
            Command::Intent(Intent::UploadImage(ImageSource::File(PathBuf::from(rest))))
        }
        "photo" | "p" => Command::Invalid("photo needs a file path".to_string()),
        "open" | "o" => match pick(rest, state) {
            Ok(recipe) => Command::Intent(Intent::SelectRecipe(recipe)),
            Err(message) => Command::Invalid(message),
        },
        "fav" | "f" if rest.is_empty() => match (state.view(), state.selected()) {
            (View::Detail, Some(recipe)) => Command::Intent(Intent::ToggleFavorite(recipe.clone())),
            _ => Command::Invalid("fav needs a recipe number here".to_string()),
        },
        "fav" | "f" => match pick(rest, state) {
            Ok(recipe) => Command::Intent(Intent::ToggleFavorite(recipe)),
            Err(message) => Command::Invalid(message),
        },
        "back" | "b" => Command::Intent(Intent::Back),
        "home" => Command::Intent(Intent::NavigateHome),
        "favorites" | "favs" => Command::Intent(Intent::NavigateFavorites),
        "dismiss" | "x" => Command::Intent(Intent::DismissError),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => Command::Invalid(format!("unknown command '{}'", other)),
    }
}

fn pick(arg: &str, state: &AppState) -> Result<crate::recipe::Recipe, String> {
    let number: usize = arg
        .parse()
        .map_err(|_| format!("'{}' is not a recipe number", arg))?;
    let recipes = state.visible_recipes();
    number
        .checked_sub(1)
        .and_then(|index| recipes.get(index))
        .cloned()
        .ok_or_else(|| format!("no recipe {} in the {} view", number, state.view()))
}

/// Reads commands from stdin until `quit` or end of input. The banner is
/// cleared when its deadline passes while waiting for input.
pub async fn run_interactive<P, S, R>(app: &mut App<P, S, R>) -> Result<()>
where
    P: RecipeProvider,
    S: FavoritesStore,
    R: ViewRenderer,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Type `help` for commands.");

    loop {
        let line = match app.state().error_deadline() {
            Some(deadline) => {
                tokio::select! {
                    line = lines.next_line() => line?,
                    _ = sleep_until(TokioInstant::from_std(deadline)) => {
                        app.expire_error(std::time::Instant::now());
                        continue;
                    }
                }
            }
            None => lines.next_line().await?,
        };
        let Some(line) = line else { break };

        match parse_command(&line, app.state()) {
            Command::Intent(intent) => {
                debug!("Dispatching {:?}", intent);
                app.dispatch(intent).await;
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
            Command::Empty => {}
            Command::Invalid(message) => println!("{}. Type `help` for commands.", message),
        }
    }
    Ok(())
}
