use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use otp_core::{MailerOtpNotifier, OtpDispatchService, RepositoryProvider};
use otp_storage_postgres::{DatabaseConfig, PostgresRepositoryProvider};
use otp_storage_sqlite::SqliteRepositoryProvider;
use otp_worker::{LogFormat, handle_event, init_tracing};
use tokio::io::AsyncReadExt;

/// Command line interface for the OTP worker
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Json, global = true)]
    log_format: LogFormat,

    /// Database connection string; overrides the DB_* variables.
    /// `sqlite:` URLs select the SQLite backend.
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(clap::Subcommand)]
enum Commands {
    /// Process one queue event and print the trigger response
    Process {
        /// File holding the event JSON; read from stdin when absent
        #[arg(long)]
        event: Option<PathBuf>,
    },
    /// Run database migrations
    Migrate,
    /// Check database connectivity
    Health,
    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    if let Commands::Version = cli.command {
        println!("otp-worker v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    match cli.database_url.as_deref() {
        Some(url) if url.starts_with("sqlite:") => {
            let pool = otp_storage_sqlite::connect(url).await?;
            run(SqliteRepositoryProvider::new(pool), cli.command).await
        }
        Some(url) => run(PostgresRepositoryProvider::connect_url(url).await?, cli.command).await,
        None => {
            let config = DatabaseConfig::from_env()?;
            run(PostgresRepositoryProvider::connect(&config).await?, cli.command).await
        }
    }
}

async fn run<R: RepositoryProvider>(repositories: R, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Process { event } => {
            let payload = read_event(event).await?;
            let notifier = MailerOtpNotifier::from_env()?;
            let service = OtpDispatchService::new(Arc::new(repositories), Arc::new(notifier));

            let response = handle_event(&service, &payload).await?;
            println!("{}", serde_json::to_string(&response)?);
        }
        Commands::Migrate => {
            tracing::info!("Running migrations");
            repositories.migrate().await?;
            tracing::info!("Migrations complete");
        }
        Commands::Health => {
            repositories.health_check().await?;
            println!("ok");
        }
        Commands::Version => println!("otp-worker v{}", env!("CARGO_PKG_VERSION")),
    }
    Ok(())
}

async fn read_event(path: Option<PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) => Ok(tokio::fs::read_to_string(&path).await?),
        None => {
            let mut payload = String::new();
            tokio::io::stdin().read_to_string(&mut payload).await?;
            Ok(payload)
        }
    }
}
