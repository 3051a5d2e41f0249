use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool, Postgres, Transaction};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Connection;
use crate::db::feature::{FeatureGate, ServerVersion};
use crate::db::transaction::{CommentTransaction, ConnectionProvider};
use crate::error::CommentError;

/// Mask password in database URL for display
pub fn mask_url_password(url: &str) -> String {
    // Handle case where URL doesn't contain ://
    if !url.contains("://") {
        return url.to_string();
    }

    // Split on :// to get protocol and rest
    let parts: Vec<&str> = url.splitn(2, "://").collect();
    if parts.len() != 2 {
        return url.to_string();
    }

    let protocol = parts[0];
    let rest = parts[1];

    // Check if there's user info (user:pass@host or user@host)
    if let Some(at_pos) = rest.find('@') {
        let user_info = &rest[..at_pos];
        let host_and_path = &rest[at_pos + 1..];

        // Check if there's a password (user:pass)
        if let Some(colon_pos) = user_info.find(':') {
            let username = &user_info[..colon_pos];
            return format!("{}://{}:***@{}", protocol, username, host_and_path);
        }
    }

    url.to_string()
}

/// Connection handle shared by all comment operations.
///
/// Holds the parsed connection options and the server version read at
/// connect time. Each transaction opens its own short-lived single
/// connection to the requested database.
#[derive(Debug, Clone)]
pub struct PgClient {
    options: PgConnectOptions,
    default_database: String,
    connect_timeout: Duration,
    version: ServerVersion,
}

impl PgClient {
    pub async fn connect(config: &Connection) -> Result<Self> {
        let options = PgConnectOptions::from_str(&config.url)
            .map_err(|e| anyhow::anyhow!("Invalid database URL: {}", e))?
            .log_slow_statements(LevelFilter::Off, Duration::from_secs(0));
        let connect_timeout = Duration::from_secs(config.connect_timeout_secs);

        let pool = single_connection_pool(
            options.clone().database(&config.database),
            connect_timeout,
        )
        .await
        .with_context(|| {
            format!(
                "Failed to connect to database \"{}\" at {}",
                config.database,
                mask_url_password(&config.url)
            )
        })?;

        let raw: (String,) = sqlx::query_as("SHOW server_version_num")
            .fetch_one(&pool)
            .await
            .context("Failed to query server_version_num")?;
        pool.close().await;

        let version = ServerVersion::parse(&raw.0)
            .with_context(|| format!("Unrecognised server_version_num: {}", raw.0))?;

        info!(
            "✅ Connected to PostgreSQL {} at {}",
            version,
            mask_url_password(&config.url)
        );

        Ok(Self {
            options,
            default_database: config.database.clone(),
            connect_timeout,
            version,
        })
    }
}

impl FeatureGate for PgClient {
    fn server_version(&self) -> ServerVersion {
        self.version
    }
}

#[async_trait]
impl ConnectionProvider for PgClient {
    fn default_database(&self) -> &str {
        &self.default_database
    }

    async fn begin(&self, database: &str) -> Result<Box<dyn CommentTransaction>, CommentError> {
        let to_error = |source: sqlx::Error| CommentError::Transaction {
            database: database.to_string(),
            source,
        };

        let pool = single_connection_pool(self.options.clone().database(database), self.connect_timeout)
            .await
            .map_err(to_error)?;
        let tx = pool.begin().await.map_err(to_error)?;

        Ok(Box::new(PgCommentTransaction { pool, tx }))
    }
}

async fn single_connection_pool(
    options: PgConnectOptions,
    timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(timeout)
        .connect_with(options)
        .await
}

struct PgCommentTransaction {
    pool: PgPool,
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CommentTransaction for PgCommentTransaction {
    async fn execute(&mut self, sql: &str) -> Result<(), sqlx::Error> {
        // COMMENT ON cannot take bind parameters; an unbound &str runs over the simple protocol
        sqlx::Executor::execute(&mut *self.tx, sql).await?;
        Ok(())
    }

    async fn fetch_description(
        &mut self,
        query: &str,
        object_name: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as(query)
            .bind(object_name)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(|(description,)| description))
    }

    async fn commit(self: Box<Self>) -> Result<(), sqlx::Error> {
        let PgCommentTransaction { pool, tx } = *self;
        let result = tx.commit().await;
        pool.close().await;
        result
    }

    fn rollback(self: Box<Self>) {
        // Dropping an sqlx transaction queues the ROLLBACK on its connection
        let PgCommentTransaction { pool, tx } = *self;
        drop(tx);
        drop(pool);
    }
}
