//! Store toolkit: inspect error translation and pagination, check store reachability.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mongodb::bson::doc;
use sea_orm::{ConnectOptions, Database};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common::StoreConfig;
use domain::{translate_details, Filter};

#[derive(Parser)]
#[command(name = "storekit")]
#[command(about = "Data-access toolkit for relational, document and key-value stores")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate raw `<path>_<CODE>` fields into error details
    Details {
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Normalize pagination parameters the way list operations do
    Filter {
        #[arg(long)]
        page: Option<String>,
        #[arg(long)]
        size: Option<String>,
        #[arg(long)]
        query: Option<String>,
    },
    /// Connect to every configured store
    Ping,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Details { fields } => {
            let details = translate_details(&fields);
            println!("{}", serde_json::to_string_pretty(&details)?);
        }
        Commands::Filter { page, size, query } => {
            let filter = Filter::from_params(page.as_deref(), size.as_deref(), query.as_deref());
            let window = filter.window();
            let output = serde_json::json!({
                "filter": filter,
                "offset": window.offset,
                "limit": window.limit,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Ping => {
            let config = StoreConfig::from_env();
            if !ping(&config).await {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Report reachability of each store, returning whether all of them answered.
async fn ping(config: &StoreConfig) -> bool {
    let mut reachable = true;

    let mut options = ConnectOptions::new(config.database.url.clone());
    options
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections);
    match Database::connect(options).await {
        Ok(db) => match db.ping().await {
            Ok(()) => info!("Relational database reachable"),
            Err(e) => {
                error!("Relational database ping failed: {}", e);
                reachable = false;
            }
        },
        Err(e) => {
            error!("Relational database connection failed: {}", e);
            reachable = false;
        }
    }

    match ping_document_store(config).await {
        Ok(()) => info!("Document store reachable"),
        Err(e) => {
            error!("Document store ping failed: {}", e);
            reachable = false;
        }
    }

    match ping_cache(config).await {
        Ok(()) => info!("Key-value store reachable"),
        Err(e) => {
            error!("Key-value store connection failed: {}", e);
            reachable = false;
        }
    }

    reachable
}

async fn ping_document_store(config: &StoreConfig) -> Result<(), mongodb::error::Error> {
    let client = mongodb::Client::with_uri_str(&config.document.url).await?;
    client
        .database(&config.document.database)
        .run_command(doc! { "ping": 1 })
        .await?;
    Ok(())
}

async fn ping_cache(config: &StoreConfig) -> Result<(), redis::RedisError> {
    let client = redis::Client::open(config.cache.url.as_str())?;
    redis::aio::ConnectionManager::new(client).await?;
    Ok(())
}
