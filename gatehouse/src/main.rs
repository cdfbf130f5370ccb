use clap::Parser;
use sqlx::SqlitePool;

use gatehouse::SqliteRepositoryProvider;
use gatehouse_core::repositories::RepositoryProvider;

/// Command line interface for Gatehouse
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database connection string
    #[arg(long, env = "GATEHOUSE_DB_URL")]
    db_url: String,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(clap::Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate => {
            tracing::info!("Running migrations...");
            let pool = SqlitePool::connect(&cli.db_url).await?;
            let repositories = SqliteRepositoryProvider::new(pool);
            repositories.migrate().await?;
            tracing::info!("Migrations complete");
        }
        Commands::Version => {
            println!("Gatehouse v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
