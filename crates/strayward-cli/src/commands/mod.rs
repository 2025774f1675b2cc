//! Subcommand handlers.
//!
//! Handlers print their results to stdout and return an error carrying a
//! message fit for display.

pub mod account;
pub mod admin;
pub mod dogs;

pub use account::ProfileCommand;
pub use admin::AdminCommand;
pub use dogs::DogsCommand;

use strayward_core::api::ApiError;

/// Turn a failed call into its display message, preferring the server's
/// own explanation.
fn failure(fallback: &'static str) -> impl FnOnce(ApiError) -> anyhow::Error {
    move |e| {
        tracing::warn!(error = %e, "{}", fallback);
        anyhow::anyhow!(e.user_message(fallback))
    }
}
