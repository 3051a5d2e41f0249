//! Lifecycle operations of the comment resource.
//!
//! Each operation opens one scoped transaction, runs a single statement or
//! catalog lookup through it and leaves the resource holding what was
//! observed. Nothing is retried; errors go straight back to the caller.

use tracing::{debug, info};

use crate::comment::{CommentId, CommentResource, ObjectType};
use crate::db::feature::{Feature, FeatureGate};
use crate::db::transaction::ConnectionProvider;
use crate::error::CommentError;
use crate::render::{lookup_query, render_set_statement};
use crate::schema::{ATTR_OBJECT_NAME, COMMENT_RESOURCE_SCHEMA, RESOURCE_NAME};

pub struct CommentController<'a, C> {
    client: &'a C,
}

impl<'a, C> CommentController<'a, C>
where
    C: ConnectionProvider + FeatureGate,
{
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    pub async fn create(&self, resource: &mut CommentResource) -> Result<(), CommentError> {
        self.ensure_supported()?;
        info!(
            "Creating comment on {} ({})",
            resource.describe(),
            resource.computed_id()
        );
        self.set_comment(resource, &resource.comment).await?;
        self.read_impl(resource).await
    }

    pub async fn read(&self, resource: &mut CommentResource) -> Result<(), CommentError> {
        self.ensure_supported()?;
        info!(
            "Reading comment on {} ({})",
            resource.describe(),
            resource.computed_id()
        );
        self.read_impl(resource).await
    }

    /// True only when a comment is stored and equals the declared value
    pub async fn exists(&self, resource: &CommentResource) -> Result<bool, CommentError> {
        info!(
            "Checking comment on {} ({})",
            resource.describe(),
            resource.computed_id()
        );
        let stored = self.get_comment(resource).await?;
        Ok(stored.as_deref() == Some(resource.comment.as_str()))
    }

    pub async fn update(
        &self,
        resource: &mut CommentResource,
        comment: impl Into<String>,
    ) -> Result<(), CommentError> {
        self.ensure_supported()?;
        let comment = comment.into();
        info!(
            "Updating comment on {} ({})",
            resource.describe(),
            resource.computed_id()
        );
        self.set_comment(resource, &comment).await?;
        resource.comment = comment;
        self.read_impl(resource).await
    }

    /// Reconcile prior state with a new declaration. A changed object name
    /// cannot be updated in place.
    pub async fn update_from(
        &self,
        prior: &CommentResource,
        declared: &mut CommentResource,
    ) -> Result<(), CommentError> {
        if !COMMENT_RESOURCE_SCHEMA
            .requires_replacement(prior, declared)
            .is_empty()
        {
            return Err(CommentError::InvalidAttribute {
                attribute: ATTR_OBJECT_NAME,
                reason: format!(
                    "cannot change from \"{}\" to \"{}\" in place; the resource must be replaced",
                    prior.object_name, declared.object_name
                ),
            });
        }
        let comment = declared.comment.clone();
        self.update(declared, comment).await
    }

    /// Clear the comment and forget the id
    pub async fn delete(&self, resource: &mut CommentResource) -> Result<(), CommentError> {
        self.ensure_supported()?;
        info!(
            "Deleting comment on {} ({})",
            resource.describe(),
            resource.computed_id()
        );
        self.set_comment(resource, "").await?;
        resource.comment.clear();
        resource.id = None;
        Ok(())
    }

    /// Passthrough import: the id names the database and object, the type
    /// has to be supplied by the caller.
    pub async fn import(
        &self,
        id: &str,
        object_type: ObjectType,
    ) -> Result<CommentResource, CommentError> {
        let id: CommentId = id.parse()?;
        info!("Importing comment on {} {}", object_type, id);
        let mut resource =
            CommentResource::new(object_type, id.object_name, id.database, String::new());
        self.ensure_supported()?;
        self.read_impl(&mut resource).await?;
        Ok(resource)
    }

    fn ensure_supported(&self) -> Result<(), CommentError> {
        if self.client.feature_supported(Feature::Comment) {
            Ok(())
        } else {
            Err(CommentError::FeatureUnsupported {
                resource: RESOURCE_NAME,
                feature: Feature::Comment,
                version: self.client.server_version(),
            })
        }
    }

    async fn read_impl(&self, resource: &mut CommentResource) -> Result<(), CommentError> {
        let stored = self.get_comment(resource).await?;
        resource.comment = stored.unwrap_or_default();
        resource.id = Some(resource.computed_id());
        debug!(
            "Read comment on {} as {:?}",
            resource.describe(),
            resource.comment
        );
        Ok(())
    }

    async fn set_comment(
        &self,
        resource: &CommentResource,
        comment: &str,
    ) -> Result<(), CommentError> {
        let statement = render_set_statement(resource.object_type, &resource.object_name, comment);
        if statement.is_destructive() {
            debug!("Clearing comment on {}", resource.describe());
        }

        let mut tx = self
            .client
            .start_transaction(target_database(resource))
            .await?;
        tx.execute(&statement.sql).await?;
        tx.commit().await
    }

    async fn get_comment(&self, resource: &CommentResource) -> Result<Option<String>, CommentError> {
        let mut tx = self
            .client
            .start_transaction(target_database(resource))
            .await?;
        let stored = tx
            .fetch_description(
                lookup_query(resource.object_type),
                &resource.describe(),
                &resource.object_name,
            )
            .await?;

        // Read-only, the guard rolls back on drop
        Ok(stored)
    }
}

/// Database to run statements in. Empty selects the connection's default.
pub fn target_database(resource: &CommentResource) -> &str {
    if resource.object_type.is_database_scoped() {
        &resource.database
    } else {
        ""
    }
}
