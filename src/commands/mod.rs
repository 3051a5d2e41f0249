pub mod apply;
pub mod resource;
pub mod schema;

// Re-export all command functions
pub use apply::{ApplyOutcome, ExecutionMode, apply_resources, cmd_apply};
pub use resource::{
    ResourceArgs, cmd_create, cmd_delete, cmd_exists, cmd_import, cmd_read, cmd_update,
};
pub use schema::cmd_schema;
