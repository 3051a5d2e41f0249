//! Attribute schema of the comment resource, shared by the host adapter and the controller.

use serde::Serialize;

use crate::comment::{CommentResource, ObjectType};

pub const RESOURCE_NAME: &str = "postgresql_comment";

pub const ATTR_OBJECT_NAME: &str = "object_name";
pub const ATTR_OBJECT_TYPE: &str = "object_type";
pub const ATTR_DATABASE: &str = "database";
pub const ATTR_COMMENT: &str = "comment";

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AttributeSchema {
    pub name: &'static str,
    pub required: bool,
    /// Changing the value means replacing the resource, not updating it
    pub force_new: bool,
    pub default: Option<&'static str>,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResourceSchema {
    pub name: &'static str,
    pub attributes: &'static [AttributeSchema],
    pub object_types: &'static [ObjectType],
}

pub const COMMENT_RESOURCE_SCHEMA: ResourceSchema = ResourceSchema {
    name: RESOURCE_NAME,
    attributes: &[
        AttributeSchema {
            name: ATTR_OBJECT_NAME,
            required: true,
            force_new: true,
            default: None,
            description: "The object upon which to comment",
        },
        AttributeSchema {
            name: ATTR_OBJECT_TYPE,
            required: true,
            force_new: false,
            default: None,
            description: "The PostgreSQL object type to comment on (one of: database, table, role)",
        },
        AttributeSchema {
            name: ATTR_DATABASE,
            required: false,
            force_new: false,
            default: Some("postgres"),
            description: "The database holding the object. Only used for database objects (eg. table).",
        },
        AttributeSchema {
            name: ATTR_COMMENT,
            required: false,
            force_new: false,
            default: Some(""),
            description: "Comment to set on the object",
        },
    ],
    object_types: &ObjectType::ALL,
};

impl ResourceSchema {
    pub fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    pub fn default_for(&self, name: &str) -> Option<&'static str> {
        self.attribute(name).and_then(|attr| attr.default)
    }

    /// Comma separated list for error messages
    pub fn allowed_object_types(&self) -> String {
        self.object_types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Names of force-new attributes whose value differs between prior state and the declaration
    pub fn requires_replacement(
        &self,
        prior: &CommentResource,
        declared: &CommentResource,
    ) -> Vec<&'static str> {
        self.attributes
            .iter()
            .filter(|attr| attr.force_new)
            .filter(|attr| attribute_value(prior, attr.name) != attribute_value(declared, attr.name))
            .map(|attr| attr.name)
            .collect()
    }
}

fn attribute_value<'a>(resource: &'a CommentResource, name: &str) -> Option<&'a str> {
    match name {
        ATTR_OBJECT_NAME => Some(&resource.object_name),
        ATTR_OBJECT_TYPE => Some(resource.object_type.as_str()),
        ATTR_DATABASE => Some(&resource.database),
        ATTR_COMMENT => Some(&resource.comment),
        _ => None,
    }
}
