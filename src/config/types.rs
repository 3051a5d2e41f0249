use clap::Args;
use serde::{Deserialize, Serialize};

use crate::comment::CommentResourceInput;

/// Raw configuration input - all fields Optional for merging
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigInput {
    pub connection: Option<ConnectionInput>,
    pub resources: Option<Vec<CommentResourceInput>>,
}

/// Resolved configuration with all defaults applied
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub connection: Connection,
    /// Declared comments reconciled by `apply`
    pub resources: Vec<CommentResourceInput>,
}

// Connection configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConnectionInput {
    pub url: Option<String>,
    pub database: Option<String>,
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Connection {
    pub url: String,
    /// Database used for cluster-wide objects (databases, roles) and for
    /// reading the server version
    pub database: String,
    pub connect_timeout_secs: u64,
}

// CLI argument group for connection options
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    #[arg(long, help = "PostgreSQL connection URL")]
    pub database_url: Option<String>,

    #[arg(long, help = "Database to connect to for database and role comments")]
    pub default_database: Option<String>,

    #[arg(long, help = "Seconds to wait for a connection")]
    pub connect_timeout: Option<u64>,
}

impl From<ConnectionArgs> for ConnectionInput {
    fn from(args: ConnectionArgs) -> Self {
        Self {
            url: args.database_url,
            database: args.default_database,
            connect_timeout_secs: args.connect_timeout,
        }
    }
}
