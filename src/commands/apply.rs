//! Reconcile a list of declared comments with what the catalog holds.
//!
//! For each resource `exists` decides whether anything needs doing; drifted
//! or missing comments are corrected with `update`.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use crate::comment::{CommentResource, CommentResourceInput};
use crate::db::{ConnectionProvider, FeatureGate, PgClient};
use crate::render::render_set_statement;
use crate::resource::CommentController;

/// Execution mode for apply operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExecutionMode {
    /// Preview changes without applying them
    DryRun,
    /// Apply all changes, including clearing comments
    Force,
    /// Apply only safe operations, skip clearing comments
    SafeOnly,
}

/// What happened to one declared resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceOutcome {
    /// Stored comment already matches the declaration
    Unchanged,
    Updated,
    /// Would be updated (dry run)
    Planned,
    /// Clearing a comment is destructive and was skipped (safe-only mode)
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceReport {
    pub id: String,
    pub outcome: ResourceOutcome,
    pub statement: Option<String>,
}

/// Outcome of an apply operation, used for exit code determination
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// No changes were needed
    NoChanges,
    /// All changes were applied successfully
    Applied,
    /// Changes were only previewed
    DryRun,
    /// Safe changes applied, destructive skipped (safe-only mode)
    Skipped,
}

impl ApplyOutcome {
    pub fn from_reports(reports: &[ResourceReport]) -> Self {
        let has = |outcome: ResourceOutcome| reports.iter().any(|r| r.outcome == outcome);
        if has(ResourceOutcome::Skipped) {
            ApplyOutcome::Skipped
        } else if has(ResourceOutcome::Planned) {
            ApplyOutcome::DryRun
        } else if has(ResourceOutcome::Updated) {
            ApplyOutcome::Applied
        } else {
            ApplyOutcome::NoChanges
        }
    }
}

/// Reconcile every declared resource, stopping at the first failure
pub async fn apply_resources<C>(
    client: &C,
    resources: Vec<CommentResource>,
    mode: ExecutionMode,
) -> Result<Vec<ResourceReport>>
where
    C: ConnectionProvider + FeatureGate,
{
    let controller = CommentController::new(client);
    let mut reports = Vec::with_capacity(resources.len());

    for mut resource in resources {
        let id = resource.computed_id().to_string();

        let mut up_to_date = controller
            .exists(&resource)
            .await
            .with_context(|| format!("Error reading comment {}", id))?;

        // `exists` needs a stored row, so a declared empty comment is checked by reading
        if !up_to_date && resource.comment.is_empty() {
            let mut observed = resource.clone();
            controller
                .read(&mut observed)
                .await
                .with_context(|| format!("Error reading comment {}", id))?;
            up_to_date = observed.comment.is_empty();
        }

        if up_to_date {
            info!("{} is up to date", id);
            reports.push(ResourceReport {
                id,
                outcome: ResourceOutcome::Unchanged,
                statement: None,
            });
            continue;
        }

        let statement =
            render_set_statement(resource.object_type, &resource.object_name, &resource.comment);

        let outcome = match mode {
            ExecutionMode::DryRun => ResourceOutcome::Planned,
            ExecutionMode::SafeOnly if statement.is_destructive() => {
                warn!("Skipping destructive change to {}: {}", id, statement.sql);
                ResourceOutcome::Skipped
            }
            ExecutionMode::Force | ExecutionMode::SafeOnly => {
                let comment = resource.comment.clone();
                controller
                    .update(&mut resource, comment)
                    .await
                    .with_context(|| format!("Error updating comment {}", id))?;
                ResourceOutcome::Updated
            }
        };

        reports.push(ResourceReport {
            id,
            outcome,
            statement: Some(statement.sql),
        });
    }

    Ok(reports)
}

/// Read a YAML list of resource declarations
fn read_resource_list(path: &Path) -> Result<Vec<CommentResourceInput>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read resource file {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse resource file {}", path.display()))
}

/// Apply the resources from `resource_file` when given, otherwise the ones
/// declared in the config file.
pub async fn cmd_apply(
    client: &PgClient,
    configured: Vec<CommentResourceInput>,
    resource_file: Option<&Path>,
    mode: ExecutionMode,
) -> Result<ApplyOutcome> {
    let declared = match resource_file {
        Some(path) => read_resource_list(path)?,
        None => configured,
    };

    let resources = declared
        .into_iter()
        .map(CommentResourceInput::resolve)
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid resource declaration")?;

    if resources.is_empty() {
        println!("No resources declared");
        return Ok(ApplyOutcome::NoChanges);
    }

    let reports = apply_resources(client, resources, mode).await?;
    for report in &reports {
        let marker = match report.outcome {
            ResourceOutcome::Unchanged => "✓",
            ResourceOutcome::Updated => "✅",
            ResourceOutcome::Planned => "📋",
            ResourceOutcome::Skipped => "⏭️ ",
        };
        match &report.statement {
            Some(sql) => println!("{} {}: {}", marker, report.id, sql),
            None => println!("{} {}", marker, report.id),
        }
    }

    Ok(ApplyOutcome::from_reports(&reports))
}
