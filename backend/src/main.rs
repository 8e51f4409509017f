//! `fitcoach` operator CLI: schema migrations and support utilities.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, WrapErr, eyre};
use fitcoach::domain::ports::DownloadUrlRequest;
use fitcoach::domain::{Actor, AssignmentId, UserId};
use fitcoach::outbound::persistence::{DbPool, run_pending_migrations};
use fitcoach::outbound::storage::S3ObjectStorage;
use fitcoach::{AppSettings, DrivenPorts, Services, telemetry};
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use tracing::info;

/// `fitcoach` command arguments.
#[derive(Debug, Parser)]
#[command(name = "fitcoach", about = "Coaching backend operator tools", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending database migrations.
    Migrate,
    /// Issue a read URL for the video linked to an assignment.
    DownloadUrl {
        /// Whether `--user` is the trainer or the client.
        #[arg(long, value_enum)]
        role: ViewerRole,
        #[arg(long, value_name = "uuid")]
        user: UserId,
        #[arg(long, value_name = "uuid")]
        assignment: AssignmentId,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ViewerRole {
    Trainer,
    Client,
}

impl ViewerRole {
    fn actor(self, user: UserId) -> Actor {
        match self {
            Self::Trainer => Actor::Trainer(user),
            Self::Client => Actor::Client(user),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    telemetry::init();

    let cli = Cli::parse();
    // Settings come from the environment and config files; the arguments
    // above belong to the subcommands.
    let settings = AppSettings::load_from_iter([OsString::from("fitcoach")])
        .map_err(|err| eyre!("failed to load configuration: {err}"))?;

    match cli.command {
        Command::Migrate => migrate(&settings).await,
        Command::DownloadUrl {
            role,
            user,
            assignment,
        } => download_url(&settings, role.actor(user), assignment).await,
    }
}

async fn migrate(settings: &AppSettings) -> Result<()> {
    let database = settings.database()?;
    let applied = run_pending_migrations(database.database_url())
        .await
        .wrap_err("apply migrations")?;
    if applied.is_empty() {
        println!("schema is up to date");
    }
    for version in &applied {
        info!(version = %version, "migration applied");
        println!("applied {version}");
    }
    Ok(())
}

async fn download_url(
    settings: &AppSettings,
    viewer: Actor,
    assignment_id: AssignmentId,
) -> Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let pool = DbPool::new(settings.database()?)
        .await
        .wrap_err("create database pool")?;
    let storage = S3ObjectStorage::new(settings.storage()?, Arc::clone(&clock))
        .wrap_err("create storage client")?;
    let ports = DrivenPorts::from_pool(&pool, Arc::new(storage), clock);
    let services = Services::new(&ports, settings.uploads()?);

    let presigned = services
        .uploads
        .download_url(DownloadUrlRequest {
            viewer,
            assignment_id,
        })
        .await
        .map_err(|err| eyre!("download url request failed: {err}"))?;

    println!("url={}", presigned.url);
    println!("expires_in={}s", presigned.expires_in.as_secs());
    Ok(())
}
