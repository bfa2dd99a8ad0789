//! Administrative CLI: schema migrations and seeding.

use clap::{Parser, Subcommand};
use diesel::r2d2::PoolError;
use dotenvy::dotenv;
use thiserror::Error;

use fieldops::db::{self, MigrationError, establish_connection_pool};
use fieldops::models::config::ServerConfig;
use fieldops::repository::DieselRepository;
use fieldops::repository::errors::RepositoryError;
use fieldops::seed;

#[derive(Parser)]
#[command(name = "fieldops-admin", about = "Schema and seed management for fieldops")]
struct Cli {
    /// SQLite database; defaults to `database_url` from the configuration
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply every pending migration
    Migrate,

    /// Revert the last applied migration
    Rollback {
        /// Revert every applied migration
        #[arg(long)]
        all: bool,
    },

    /// List migrations and whether each is applied
    Status,

    /// Register the permission catalog and the system roles
    Seed {
        /// Also create the demo tenants and users
        #[arg(long)]
        demo: bool,
    },
}

#[derive(Debug, Error)]
enum AdminError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("connection error: {0}")]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error("seeding failed: {0}")]
    Seed(#[from] RepositoryError),
}

fn database_url(cli_value: Option<String>) -> Result<String, AdminError> {
    match cli_value {
        Some(url) => Ok(url),
        None => Ok(ServerConfig::load()?.database_url),
    }
}

fn execute(command: Commands, database_url: &str) -> Result<(), AdminError> {
    let pool = establish_connection_pool(database_url)?;

    match command {
        Commands::Migrate => {
            let mut conn = pool.get()?;
            let applied = db::run_pending_migrations(&mut conn)?;
            if applied.is_empty() {
                println!("Schema is up to date");
            } else {
                println!("Applied {} migrations", applied.len());
            }
        }
        Commands::Rollback { all } => {
            let mut conn = pool.get()?;
            if all {
                let reverted = db::revert_all_migrations(&mut conn)?;
                println!("Reverted {} migrations", reverted.len());
            } else {
                let version = db::revert_last_migration(&mut conn)?;
                println!("Reverted {version}");
            }
        }
        Commands::Status => {
            let mut conn = pool.get()?;
            for state in db::migration_status(&mut conn)? {
                let mark = if state.applied { "applied" } else { "pending" };
                println!("{mark:>8}  {}", state.version);
            }
        }
        Commands::Seed { demo } => {
            let repo = DieselRepository::new(pool);
            let report = seed::seed_permissions(&repo)?;
            println!(
                "Permissions: {} total, {} created; {} roles synced",
                report.total, report.created, report.roles
            );
            if demo {
                let report = seed::seed_demo(&repo)?;
                println!(
                    "Demo: {} tenants created, {} skipped, {} users created",
                    report.tenants_created, report.tenants_skipped, report.users_created
                );
            }
        }
    }

    Ok(())
}

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = Cli::parse();

    let result = database_url(cli.database_url).and_then(|url| execute(cli.command, &url));

    if let Err(err) = result {
        log::error!("{err}");
        std::process::exit(1);
    }
}
