//! Error type shared by the SQL translator and the resource controller.

use crate::db::error_context::SqlErrorContext;
use crate::db::feature::{Feature, ServerVersion};

#[derive(Debug, thiserror::Error)]
pub enum CommentError {
    /// `object_type` outside of the supported set. Configuration error, never retried.
    #[error("{0} is not supported")]
    UnsupportedObjectType(String),

    #[error("{resource} resource is not supported for this Postgres version ({version})")]
    FeatureUnsupported {
        resource: &'static str,
        feature: Feature,
        version: ServerVersion,
    },

    /// Opening the connection or transaction against `database` failed.
    #[error("could not start transaction on database \"{database}\": {source}")]
    Transaction {
        database: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("could not execute `{statement}`: {}", SqlErrorContext::from_sqlx_error(.source))]
    StatementExecution {
        statement: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("could not read comment on {object}: {}", SqlErrorContext::from_sqlx_error(.source))]
    Lookup {
        object: String,
        #[source]
        source: sqlx::Error,
    },

    /// The statement ran but the commit did not go through.
    #[error("could not commit comment change: {source}")]
    Commit {
        #[source]
        source: sqlx::Error,
    },

    #[error("invalid comment id \"{0}\": expected <database>.<object_name>")]
    InvalidId(String),

    #[error("invalid attribute \"{attribute}\": {reason}")]
    InvalidAttribute {
        attribute: &'static str,
        reason: String,
    },
}

impl CommentError {
    /// Errors caused by the declared configuration rather than the server.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            CommentError::UnsupportedObjectType(_)
                | CommentError::InvalidId(_)
                | CommentError::InvalidAttribute { .. }
        )
    }
}
