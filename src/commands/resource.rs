//! Single-resource lifecycle commands: create, read, update, delete, exists, import

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::comment::{CommentResource, CommentResourceInput, ObjectType};
use crate::db::PgClient;
use crate::resource::CommentController;

/// Declared attributes, from flags and/or a YAML resource file
#[derive(Debug, Clone, Default, Args)]
pub struct ResourceArgs {
    #[arg(long, help = "Object type to comment on (database, table, role)")]
    pub object_type: Option<String>,

    #[arg(long, help = "Name of the object to comment on")]
    pub object_name: Option<String>,

    #[arg(long, help = "Database holding the object (tables only)")]
    pub database: Option<String>,

    #[arg(long, help = "Comment text; empty clears the comment")]
    pub comment: Option<String>,

    #[arg(long, help = "YAML file with the declared attributes")]
    pub resource_file: Option<PathBuf>,
}

impl ResourceArgs {
    /// Flags take precedence over the resource file
    pub fn into_resource(self) -> Result<CommentResource> {
        let file_input = match &self.resource_file {
            Some(path) => read_resource_file(path)?,
            None => CommentResourceInput::default(),
        };

        let input = CommentResourceInput {
            object_name: self.object_name.or(file_input.object_name),
            object_type: self.object_type.or(file_input.object_type),
            database: self.database.or(file_input.database),
            comment: self.comment.or(file_input.comment),
        };

        Ok(input.resolve()?)
    }
}

fn read_resource_file(path: &Path) -> Result<CommentResourceInput> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read resource file {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse resource file {}", path.display()))
}

/// Prints the observed state as JSON
pub(crate) fn print_resource<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn cmd_create(client: &PgClient, args: ResourceArgs) -> Result<()> {
    let mut resource = args.into_resource()?;
    CommentController::new(client)
        .create(&mut resource)
        .await
        .context("Error creating comment")?;
    print_resource(&resource)
}

pub async fn cmd_read(client: &PgClient, args: ResourceArgs) -> Result<()> {
    let mut resource = args.into_resource()?;
    CommentController::new(client)
        .read(&mut resource)
        .await
        .context("Error reading comment")?;
    print_resource(&resource)
}

pub async fn cmd_update(client: &PgClient, args: ResourceArgs) -> Result<()> {
    let mut resource = args.into_resource()?;
    let comment = resource.comment.clone();
    CommentController::new(client)
        .update(&mut resource, comment)
        .await
        .context("Error updating comment")?;
    print_resource(&resource)
}

pub async fn cmd_delete(client: &PgClient, args: ResourceArgs) -> Result<()> {
    let mut resource = args.into_resource()?;
    CommentController::new(client)
        .delete(&mut resource)
        .await
        .context("Error deleting comment")?;
    print_resource(&resource)
}

pub async fn cmd_exists(client: &PgClient, args: ResourceArgs) -> Result<()> {
    let resource = args.into_resource()?;
    let exists = CommentController::new(client)
        .exists(&resource)
        .await
        .context("Error reading info about comment")?;
    debug!("{} exists: {}", resource.describe(), exists);
    println!("{}", exists);
    Ok(())
}

pub async fn cmd_import(client: &PgClient, id: &str, object_type: &str) -> Result<()> {
    let object_type: ObjectType = object_type.parse()?;
    let resource = CommentController::new(client)
        .import(id, object_type)
        .await
        .with_context(|| format!("Error importing comment {}", id))?;
    print_resource(&resource)
}
