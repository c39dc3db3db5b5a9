pub mod api_connection;
pub mod app;
pub mod app_state;
pub mod cli;
pub mod config;
pub mod favorites;
pub mod logging;
pub mod recipe;
pub mod recipe_parser;
pub mod recipe_provider;
pub mod renderer;
pub mod repl;
