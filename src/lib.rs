//! Declarative management of PostgreSQL comments on databases, roles and tables.
//!
//! [`render`] turns a declared comment into `COMMENT ON` statements and
//! catalog lookups; [`resource::CommentController`] runs them through a
//! [`db::ConnectionProvider`] and reports the observed state.

pub mod comment;
pub mod commands;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod render;
pub mod resource;
pub mod schema;

pub use comment::{CommentId, CommentResource, CommentResourceInput, ObjectType};
pub use error::CommentError;
pub use resource::CommentController;
