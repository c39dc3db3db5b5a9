pub mod connection;
pub mod endpoints;

pub use connection::ApiConnectionError;
pub use endpoints::{CompletionPrompt, InlineImage, Provider};
