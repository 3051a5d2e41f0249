use anyhow::Result;

use crate::commands::resource::print_resource;
use crate::schema::COMMENT_RESOURCE_SCHEMA;

/// Print the resource schema; needs no database
pub fn cmd_schema() -> Result<()> {
    print_resource(&COMMENT_RESOURCE_SCHEMA)
}
