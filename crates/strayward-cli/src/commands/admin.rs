use anyhow::Result;
use clap::Subcommand;

use super::dogs::print_dog;
use super::failure;
use crate::app::{confirm, App};
use crate::format::{format_coordinates, truncate_string};

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Dogs waiting for rescue confirmation
    Pending,

    /// Confirm a rescue
    Confirm {
        id: i64,

        #[arg(short, long)]
        yes: bool,
    },

    /// Reject a rescue and return the dog to reported
    Reject {
        id: i64,

        #[arg(short, long)]
        yes: bool,
    },

    /// Grant or revoke administrator rights
    Role {
        user_id: i64,

        #[arg(long, conflicts_with = "revoke")]
        grant: bool,

        #[arg(long)]
        revoke: bool,
    },

    /// Delete a dog photo
    DeleteImage {
        image_id: i64,

        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn run(app: &App, command: AdminCommand) -> Result<()> {
    app.require_admin()?;
    let admin = app.api.admin();

    match command {
        AdminCommand::Pending => {
            let pending = admin
                .pending_dogs()
                .await
                .map_err(failure("Failed to load pending dogs"))?;
            if pending.is_empty() {
                println!("No dogs awaiting confirmation");
                return Ok(());
            }
            for dog in &pending {
                let rescuer = dog
                    .picked_up_by
                    .as_ref()
                    .map(|u| u.display_name())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:>5}  {:<32}  {:<20}  picked up by {}",
                    dog.id,
                    truncate_string(&dog.title, 32),
                    format_coordinates(dog.latitude, dog.longitude),
                    rescuer
                );
            }
        }
        AdminCommand::Confirm { id, yes } => {
            if !confirm(&format!("Confirm rescue of dog #{}?", id), yes)? {
                println!("Cancelled");
                return Ok(());
            }
            let dog = admin
                .confirm_rescue(id)
                .await
                .map_err(failure("Failed to confirm rescue"))?;
            print_dog(&dog);
        }
        AdminCommand::Reject { id, yes } => {
            if !confirm(&format!("Reject rescue of dog #{}?", id), yes)? {
                println!("Cancelled");
                return Ok(());
            }
            let dog = admin
                .reject_rescue(id)
                .await
                .map_err(failure("Failed to reject rescue"))?;
            print_dog(&dog);
        }
        AdminCommand::Role { user_id, grant, revoke } => {
            if grant == revoke {
                anyhow::bail!("Pass exactly one of --grant or --revoke");
            }
            let ack = admin
                .set_user_role(user_id, grant)
                .await
                .map_err(failure("Failed to change user role"))?;
            println!("{}", ack.message);
        }
        AdminCommand::DeleteImage { image_id, yes } => {
            if !confirm(&format!("Delete image #{}?", image_id), yes)? {
                println!("Cancelled");
                return Ok(());
            }
            let ack = admin
                .delete_image(image_id)
                .await
                .map_err(failure("Failed to delete image"))?;
            println!("{}", ack.message);
        }
    }
    Ok(())
}
