//! SQL for setting and reading object comments

use crate::comment::ObjectType;
use crate::error::CommentError;
use crate::render::{RenderedSql, escape_string, quote_ident};

const DATABASE_COMMENT_QUERY: &str = "SELECT description FROM pg_catalog.pg_shdescription WHERE objoid = (SELECT oid FROM pg_database WHERE datname = $1);";
const ROLE_COMMENT_QUERY: &str = "SELECT description FROM pg_catalog.pg_shdescription WHERE objoid = (SELECT oid FROM pg_roles WHERE rolname = $1);";
const TABLE_COMMENT_QUERY: &str = "SELECT description FROM pg_catalog.pg_description WHERE objoid = (SELECT oid FROM pg_class WHERE relkind = 'r' and relname = $1);";

/// `COMMENT ON <KEYWORD> "<name>" IS '<comment>'`
///
/// An empty comment removes the comment server-side, so it is flagged destructive.
pub fn render_set_statement(object_type: ObjectType, object_name: &str, comment: &str) -> RenderedSql {
    let sql = format!(
        "COMMENT ON {} {} IS {}",
        object_type.sql_keyword(),
        quote_ident(object_name),
        escape_string(comment)
    );

    if comment.is_empty() {
        RenderedSql::destructive(sql)
    } else {
        RenderedSql::new(sql)
    }
}

/// Catalog query returning the current description; `$1` is the object name.
pub fn lookup_query(object_type: ObjectType) -> &'static str {
    match object_type {
        ObjectType::Database => DATABASE_COMMENT_QUERY,
        ObjectType::Role => ROLE_COMMENT_QUERY,
        ObjectType::Table => TABLE_COMMENT_QUERY,
    }
}

/// Untyped entry point for callers holding the raw `object_type` attribute
pub fn build_set_statement(
    object_type: &str,
    object_name: &str,
    comment: &str,
) -> Result<RenderedSql, CommentError> {
    let object_type: ObjectType = object_type.parse()?;
    Ok(render_set_statement(object_type, object_name, comment))
}

pub fn build_lookup_query(object_type: &str) -> Result<&'static str, CommentError> {
    let object_type: ObjectType = object_type.parse()?;
    Ok(lookup_query(object_type))
}
