use anyhow::{anyhow, bail, Result};
use clap::Subcommand;

use strayward_core::models::ProfileUpdate;

use super::failure;
use crate::app::{confirm, prompt, prompt_password, App};
use crate::format::format_timestamp;

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Show your profile
    Show,

    /// Change your name or email
    Update {
        #[arg(short = 'n', long)]
        full_name: Option<String>,

        #[arg(short, long)]
        email: Option<String>,
    },

    /// Deactivate your account
    Delete {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn login(app: &mut App, email: Option<String>) -> Result<()> {
    println!("\n=== Strayward Login ===\n");

    let email = match email {
        Some(email) => email,
        None => prompt("Email", app.config.last_email.as_deref())?,
    };
    if email.is_empty() {
        bail!("Email and password required");
    }
    let password = prompt_password()?;

    println!("\nAuthenticating...");
    app.session().login(&email, &password).await.map_err(|e| anyhow!(e))?;
    app.remember_email(&email);

    if let Some(user) = app.session().current_user() {
        println!("Logged in as {} <{}>", user.full_name, user.email);
    }
    Ok(())
}

pub async fn signup(app: &mut App, email: Option<String>, full_name: Option<String>) -> Result<()> {
    println!("\n=== Strayward Signup ===\n");

    let email = match email {
        Some(email) => email,
        None => prompt("Email", None)?,
    };
    let full_name = match full_name {
        Some(name) => name,
        None => prompt("Full name", None)?,
    };
    let password = prompt_password()?;
    let repeated = rpassword::prompt_password("Repeat password: ")?;

    if email.is_empty() || full_name.is_empty() || password.is_empty() {
        bail!("Email, full name and password are required");
    }
    if password != repeated {
        bail!("Passwords do not match");
    }

    app.session()
        .signup_and_login(&email, &password, &full_name)
        .await
        .map_err(|e| anyhow!(e))?;
    app.remember_email(&email);

    println!("Account created. Logged in as {}", email);
    Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
    app.session().logout().await;
    println!("Logged out");
    Ok(())
}

pub fn whoami(app: &App) -> Result<()> {
    match app.session().current_user() {
        Some(user) => println!("{} <{}> ({})", user.full_name, user.email, user.role_label()),
        None => println!("Not logged in"),
    }
    Ok(())
}

pub async fn profile(app: &App, command: ProfileCommand) -> Result<()> {
    let user = app.require_user()?;

    match command {
        ProfileCommand::Show => {
            println!("Name:    {}", user.full_name);
            println!("Email:   {}", user.email);
            println!("Role:    {}", user.role_label());
            println!("Joined:  {}", format_timestamp(user.created_at));
        }
        ProfileCommand::Update { full_name, email } => {
            let update = ProfileUpdate { full_name, email };
            if update.is_empty() {
                bail!("Nothing to update; pass --full-name or --email");
            }
            let updated = app
                .api
                .auth()
                .update_profile(&update)
                .await
                .map_err(failure("Failed to update profile"))?;
            app.session().update_user(updated.clone());
            println!("Profile updated: {} <{}>", updated.full_name, updated.email);
        }
        ProfileCommand::Delete { yes } => {
            if !confirm("Delete your account? This cannot be undone.", yes)? {
                println!("Cancelled");
                return Ok(());
            }
            app.session().delete_account().await.map_err(|e| anyhow!(e))?;
            println!("Account deleted");
        }
    }
    Ok(())
}
