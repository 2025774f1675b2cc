use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Subcommand;

use strayward_core::api::FileUpload;
use strayward_core::models::{Dog, DogFilter, DogStatus, DogUpdate, NewDog};

use super::failure;
use crate::app::{confirm, App};
use crate::format::{format_coordinates, format_optional, format_timestamp, truncate_string};

#[derive(Subcommand)]
pub enum DogsCommand {
    /// List reported dogs
    List {
        /// reported, pending_admin, confirmed or removed
        #[arg(short, long)]
        status: Option<DogStatus>,

        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
    },

    /// Show one dog with its photos
    Show { id: i64 },

    /// Report a stray dog
    Report {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },

    /// Edit a dog you reported
    Edit {
        id: i64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        lng: Option<f64>,
    },

    /// Delete a dog you reported
    Delete {
        id: i64,

        #[arg(short, long)]
        yes: bool,
    },

    /// Attach a photo (jpg, jpeg or png)
    Upload { id: i64, path: PathBuf },

    /// Mark a dog as picked up
    Pickup {
        id: i64,

        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn run(app: &App, command: DogsCommand) -> Result<()> {
    let dogs = app.api.dogs();

    match command {
        DogsCommand::List { status, lat, lng } => {
            let filter = DogFilter {
                status,
                latitude: lat,
                longitude: lng,
            };
            let listed = dogs.list(&filter).await.map_err(failure("Failed to load dogs"))?;
            if listed.is_empty() {
                println!("No dogs found");
                return Ok(());
            }
            println!("{:>5}  {:<32}  {:<22}  {:<20}  {}", "ID", "TITLE", "STATUS", "LOCATION", "PHOTOS");
            for dog in &listed {
                println!(
                    "{:>5}  {:<32}  {:<22}  {:<20}  {}",
                    dog.id,
                    truncate_string(&dog.title, 32),
                    dog.status.label(),
                    format_coordinates(dog.latitude, dog.longitude),
                    dog.images.len()
                );
            }
        }
        DogsCommand::Show { id } => {
            let (dog, images) = futures::join!(dogs.get(id), dogs.images(id));
            let dog = dog.map_err(failure("Failed to load dog"))?;
            print_dog(&dog);

            match images {
                Ok(images) if !images.is_empty() => {
                    println!("Photos:");
                    for image in images {
                        println!("  [{}] {}", image.id, app.config.image_url(&image.url));
                    }
                }
                Ok(_) => println!("Photos:      none"),
                Err(e) => tracing::warn!(error = %e, dog_id = id, "Failed to load photos"),
            }
        }
        DogsCommand::Report { title, description, lat, lng } => {
            app.require_user()?;
            let dog = dogs
                .create(&NewDog {
                    title,
                    description,
                    latitude: lat,
                    longitude: lng,
                })
                .await
                .map_err(failure("Failed to report dog"))?;
            println!("Reported dog #{}", dog.id);
        }
        DogsCommand::Edit { id, title, description, lat, lng } => {
            app.require_user()?;
            let update = DogUpdate {
                title,
                description,
                latitude: lat,
                longitude: lng,
            };
            if update.is_empty() {
                bail!("Nothing to update");
            }
            let dog = dogs.update(id, &update).await.map_err(failure("Failed to update dog"))?;
            print_dog(&dog);
        }
        DogsCommand::Delete { id, yes } => {
            app.require_user()?;
            if !confirm(&format!("Delete dog #{}?", id), yes)? {
                println!("Cancelled");
                return Ok(());
            }
            let ack = dogs.delete(id).await.map_err(failure("Failed to delete dog"))?;
            println!("{}", ack.message);
        }
        DogsCommand::Upload { id, path } => {
            app.require_user()?;
            let upload = FileUpload::from_path(&path)?;
            let receipt = dogs
                .upload_image(id, upload)
                .await
                .map_err(failure("Failed to upload image"))?;
            println!("{}: {}", receipt.message, app.config.image_url(&receipt.url));
        }
        DogsCommand::Pickup { id, yes } => {
            app.require_user()?;
            if !confirm(&format!("Mark dog #{} as picked up?", id), yes)? {
                println!("Cancelled");
                return Ok(());
            }
            let dog = dogs
                .mark_picked_up(id)
                .await
                .map_err(failure("Failed to mark dog as picked up"))?;
            println!("Dog #{} is now: {}", dog.id, dog.status);
        }
    }
    Ok(())
}

pub(crate) fn print_dog(dog: &Dog) {
    println!("#{} {}", dog.id, dog.title);
    println!("Status:      {}", dog.status);
    println!("Location:    {}", format_coordinates(dog.latitude, dog.longitude));
    println!("Description: {}", format_optional(&dog.description, "-"));
    if let Some(reporter) = &dog.reporter {
        println!("Reported by: {}", reporter.display_name());
    }
    if let Some(rescuer) = &dog.picked_up_by {
        println!("Picked up by: {}", rescuer.display_name());
    }
    println!("Reported:    {}", format_timestamp(dog.created_at));
}
