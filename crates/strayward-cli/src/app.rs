//! Wiring shared by every subcommand.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::warn;

use strayward_core::api::{Api, HttpClient, LoginRedirect};
use strayward_core::auth::{open_token_store, SessionContext};
use strayward_core::config::Config;
use strayward_core::models::CurrentUser;

const LOGIN_REQUIRED: &str = "You must be logged in";
const ADMIN_REQUIRED: &str = "Administrator access required";

/// Tells the terminal user their session is gone.
pub struct TerminalRedirect;

impl LoginRedirect for TerminalRedirect {
    fn redirect_to_login(&self) {
        eprintln!("Session expired. Run `strayward login` to sign in again.");
    }
}

pub struct App {
    pub config: Config,
    pub api: Api,
    session: SessionContext,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let tokens = open_token_store(&config)?;
        let http = HttpClient::new(config.api_url(), tokens, Arc::new(TerminalRedirect))?;
        let api = Api::new(http);
        let session = SessionContext::new(&api);
        Ok(Self { config, api, session })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn require_user(&self) -> Result<CurrentUser> {
        match self.session.current_user() {
            Some(user) => Ok(user),
            None => bail!(LOGIN_REQUIRED),
        }
    }

    pub fn require_admin(&self) -> Result<CurrentUser> {
        let user = self.require_user()?;
        if !user.is_admin {
            bail!(ADMIN_REQUIRED);
        }
        Ok(user)
    }

    /// Remember the email for the next login prompt.
    ///
    /// Saves on top of the file as loaded so run-time API overrides are
    /// not persisted.
    pub fn remember_email(&mut self, email: &str) {
        self.config.last_email = Some(email.to_string());
        let saved = Config::load().and_then(|mut on_disk| {
            on_disk.last_email = Some(email.to_string());
            on_disk.save()
        });
        if let Err(e) = saved {
            warn!(error = %e, "Failed to save config");
        }
    }
}

/// Read a line, falling back to `default` on empty input.
pub fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(value) => print!("{} [{}]: ", label, value),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    if input.is_empty() {
        Ok(default.unwrap_or_default().to_string())
    } else {
        Ok(input.to_string())
    }
}

pub fn prompt_password() -> Result<String> {
    let password = rpassword::prompt_password("Password: ")?;
    Ok(password)
}

/// Ask a yes/no question; anything but `y` declines.
pub fn confirm(question: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    print!("{} [y/N]: ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
