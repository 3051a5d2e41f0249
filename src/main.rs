use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use pgcomment::commands::{self, ApplyOutcome, ExecutionMode, ResourceArgs};
use pgcomment::config::{self, ConfigBuilder, ConfigInput, ConnectionArgs};
use pgcomment::constants::CONFIG_FILENAME;
use pgcomment::db::PgClient;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, default_value = CONFIG_FILENAME, global = true)]
    config_file: String,

    /// Enable verbose output (info level)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress all non-essential output (error level only)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug output (debug level)
    #[arg(long, global = true)]
    debug: bool,

    #[command(flatten)]
    connection_args: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set the declared comment and print the observed state
    Create(ResourceArgs),

    /// Print the comment currently stored for the object
    Read(ResourceArgs),

    /// Set the comment to the declared value
    Update(ResourceArgs),

    /// Clear the comment
    Delete(ResourceArgs),

    /// Print whether the stored comment equals the declared one
    Exists(ResourceArgs),

    /// Read an existing comment by id (<database>.<object_name>)
    Import {
        id: String,

        /// Object type (database, table, role)
        #[arg(long)]
        object_type: String,
    },

    /// Reconcile every declared resource from the config or a resource list file
    Apply {
        /// How to handle the changes
        #[arg(long, value_enum, default_value = "force")]
        mode: ExecutionMode,

        /// YAML list of resources (defaults to `resources` in the config file)
        #[arg(long)]
        resource_file: Option<PathBuf>,
    },

    /// Print the resource schema
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    initialize_logging(&cli);

    // Dropping the in-flight operation rolls back its open transaction
    tokio::select! {
        result = run_main(cli) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, abandoning operation");
            Err(anyhow!("Interrupted"))
        }
    }
}

fn initialize_logging(cli: &Cli) {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn" // default level
    };

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level)
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_main(cli: Cli) -> Result<()> {
    if let Commands::Schema = cli.command {
        return commands::cmd_schema();
    }

    let file_config = config::load_config(&cli.config_file)?;
    let cli_config = ConfigInput {
        connection: Some(cli.connection_args.clone().into()),
        resources: None,
    };
    let config = ConfigBuilder::new()
        .with_file(file_config)
        .with_cli_args(cli_config)
        .resolve()?;

    let client = PgClient::connect(&config.connection).await?;

    match cli.command {
        Commands::Create(args) => commands::cmd_create(&client, args).await,
        Commands::Read(args) => commands::cmd_read(&client, args).await,
        Commands::Update(args) => commands::cmd_update(&client, args).await,
        Commands::Delete(args) => commands::cmd_delete(&client, args).await,
        Commands::Exists(args) => commands::cmd_exists(&client, args).await,
        Commands::Import { id, object_type } => {
            commands::cmd_import(&client, &id, &object_type).await
        }
        Commands::Apply {
            mode,
            resource_file,
        } => {
            match commands::cmd_apply(&client, config.resources, resource_file.as_deref(), mode)
                .await?
            {
                ApplyOutcome::Skipped => {
                    Err(anyhow!("Destructive changes were skipped (safe-only mode)"))
                }
                ApplyOutcome::NoChanges | ApplyOutcome::Applied | ApplyOutcome::DryRun => Ok(()),
            }
        }
        Commands::Schema => commands::cmd_schema(),
    }
}
