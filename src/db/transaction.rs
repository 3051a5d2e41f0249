//! Connection provider contract and the scoped transaction guard.
//!
//! Every lifecycle operation runs inside exactly one [`ScopedTransaction`].
//! The guard rolls back whenever it is dropped without a successful
//! [`ScopedTransaction::commit`], which covers early returns via `?` and
//! unwinding alike.

use async_trait::async_trait;
use tracing::debug;

use crate::error::CommentError;

/// One open database transaction, as handed out by a [`ConnectionProvider`]
#[async_trait]
pub trait CommentTransaction: Send {
    /// Run a statement that returns no rows
    async fn execute(&mut self, sql: &str) -> Result<(), sqlx::Error>;

    /// Run a catalog lookup bound to `object_name`, returning the first
    /// `description`, or `None` when no row matched.
    async fn fetch_description(
        &mut self,
        query: &str,
        object_name: &str,
    ) -> Result<Option<String>, sqlx::Error>;

    async fn commit(self: Box<Self>) -> Result<(), sqlx::Error>;

    /// Abandon the transaction. Must not block and must be safe to call on
    /// a transaction whose connection is already gone.
    fn rollback(self: Box<Self>);
}

/// Hands out transactions scoped to a named database
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Database used when an object type does not need a specific one
    fn default_database(&self) -> &str;

    async fn begin(&self, database: &str) -> Result<Box<dyn CommentTransaction>, CommentError>;

    async fn start_transaction(&self, database: &str) -> Result<ScopedTransaction, CommentError> {
        let database = if database.is_empty() {
            self.default_database()
        } else {
            database
        };
        debug!("Starting transaction on database \"{}\"", database);
        let inner = self.begin(database).await?;
        Ok(ScopedTransaction::new(database, inner))
    }
}

/// Rolls back on drop unless committed
pub struct ScopedTransaction {
    database: String,
    inner: Option<Box<dyn CommentTransaction>>,
}

impl ScopedTransaction {
    pub fn new(database: impl Into<String>, inner: Box<dyn CommentTransaction>) -> Self {
        Self {
            database: database.into(),
            inner: Some(inner),
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub async fn execute(&mut self, sql: &str) -> Result<(), CommentError> {
        debug!("Executing on \"{}\": {}", self.database, sql);
        self.transaction()
            .execute(sql)
            .await
            .map_err(|source| CommentError::StatementExecution {
                statement: sql.to_string(),
                source,
            })
    }

    pub async fn fetch_description(
        &mut self,
        query: &str,
        object: &str,
        object_name: &str,
    ) -> Result<Option<String>, CommentError> {
        debug!("Looking up comment on {} in \"{}\"", object, self.database);
        self.transaction()
            .fetch_description(query, object_name)
            .await
            .map_err(|source| CommentError::Lookup {
                object: object.to_string(),
                source,
            })
    }

    pub async fn commit(mut self) -> Result<(), CommentError> {
        match self.inner.take() {
            Some(inner) => inner
                .commit()
                .await
                .map_err(|source| CommentError::Commit { source }),
            None => Ok(()),
        }
    }

    fn transaction(&mut self) -> &mut Box<dyn CommentTransaction> {
        // `inner` is only taken by `commit` and `drop`, both of which consume the guard
        match self.inner.as_mut() {
            Some(inner) => inner,
            None => unreachable!("scoped transaction used after commit"),
        }
    }
}

impl Drop for ScopedTransaction {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            debug!("Rolling back uncommitted transaction on \"{}\"", self.database);
            inner.rollback();
        }
    }
}
