//! Typed model of a declared comment resource.
//!
//! The host hands over loosely typed attributes ([`CommentResourceInput`]);
//! they are validated once at the boundary and everything past that point
//! works on [`CommentResource`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CommentError;
use crate::schema::{
    ATTR_COMMENT, ATTR_DATABASE, ATTR_OBJECT_NAME, ATTR_OBJECT_TYPE, COMMENT_RESOURCE_SCHEMA,
};

/// The PostgreSQL object kinds a comment can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ObjectType {
    Database,
    Role,
    Table,
}

impl ObjectType {
    pub const ALL: [ObjectType; 3] = [ObjectType::Database, ObjectType::Table, ObjectType::Role];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Database => "database",
            ObjectType::Role => "role",
            ObjectType::Table => "table",
        }
    }

    /// Keyword used after `COMMENT ON`
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            ObjectType::Database => "DATABASE",
            ObjectType::Role => "ROLE",
            ObjectType::Table => "TABLE",
        }
    }

    /// Tables live inside one database, so statements must run there.
    /// Databases and roles are cluster-wide objects.
    pub fn is_database_scoped(&self) -> bool {
        matches!(self, ObjectType::Table)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = CommentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "database" => Ok(ObjectType::Database),
            "role" => Ok(ObjectType::Role),
            "table" => Ok(ObjectType::Table),
            other => Err(CommentError::UnsupportedObjectType(other.to_string())),
        }
    }
}

impl TryFrom<String> for ObjectType {
    type Error = CommentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Durable resource key: `<database>.<object_name>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommentId {
    pub database: String,
    pub object_name: String,
}

impl CommentId {
    pub fn new(database: impl Into<String>, object_name: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            object_name: object_name.into(),
        }
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.object_name)
    }
}

impl FromStr for CommentId {
    type Err = CommentError;

    /// Splits on the first dot: database names are taken to be dot-free,
    /// object names may contain dots.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((database, object_name)) if !database.is_empty() && !object_name.is_empty() => {
                Ok(Self::new(database, object_name))
            }
            _ => Err(CommentError::InvalidId(s.to_string())),
        }
    }
}

/// A declared comment plus what was last observed in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentResource {
    pub object_type: ObjectType,
    pub object_name: String,
    /// Connection target for database-scoped kinds; ignored for databases and roles
    pub database: String,
    /// Empty means "no comment"
    pub comment: String,
    /// Set once the resource has been written or read back
    #[serde(serialize_with = "serialize_id")]
    pub id: Option<CommentId>,
}

fn serialize_id<S: serde::Serializer>(id: &Option<CommentId>, s: S) -> Result<S::Ok, S::Error> {
    match id {
        Some(id) => s.serialize_str(&id.to_string()),
        None => s.serialize_none(),
    }
}

impl CommentResource {
    pub fn new(
        object_type: ObjectType,
        object_name: impl Into<String>,
        database: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            object_type,
            object_name: object_name.into(),
            database: database.into(),
            comment: comment.into(),
            id: None,
        }
    }

    /// Id derived from the declared fields, regardless of whether it has been stored yet
    pub fn computed_id(&self) -> CommentId {
        CommentId::new(self.database.clone(), self.object_name.clone())
    }

    /// Human readable label used in logs and errors, e.g. `table "table1"`
    pub fn describe(&self) -> String {
        format!("{} \"{}\"", self.object_type, self.object_name)
    }
}

/// Untyped attributes as they arrive from configuration or the command line
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CommentResourceInput {
    pub object_name: Option<String>,
    pub object_type: Option<String>,
    pub database: Option<String>,
    pub comment: Option<String>,
}

impl CommentResourceInput {
    /// Validate and apply schema defaults
    pub fn resolve(self) -> Result<CommentResource, CommentError> {
        let schema = &COMMENT_RESOURCE_SCHEMA;

        let object_name = self
            .object_name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| CommentError::InvalidAttribute {
                attribute: ATTR_OBJECT_NAME,
                reason: "is required".to_string(),
            })?;

        let object_type: ObjectType = self
            .object_type
            .ok_or_else(|| CommentError::InvalidAttribute {
                attribute: ATTR_OBJECT_TYPE,
                reason: format!("must be one of: {}", schema.allowed_object_types()),
            })?
            .parse()?;

        let database = self
            .database
            .or_else(|| schema.default_for(ATTR_DATABASE).map(str::to_string))
            .unwrap_or_default();
        let comment = self
            .comment
            .or_else(|| schema.default_for(ATTR_COMMENT).map(str::to_string))
            .unwrap_or_default();

        Ok(CommentResource::new(object_type, object_name, database, comment))
    }
}
