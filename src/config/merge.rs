use crate::config::types::*;

/// Trait for merging optional configuration values
pub trait Merge<T> {
    fn merge(self, other: T) -> T;
}

impl<T> Merge<Option<T>> for Option<T> {
    fn merge(self, other: Option<T>) -> Option<T> {
        other.or(self)
    }
}

impl Merge<ConfigInput> for ConfigInput {
    fn merge(self, other: ConfigInput) -> ConfigInput {
        ConfigInput {
            connection: match (self.connection, other.connection) {
                (None, None) => None,
                (Some(a), None) => Some(a),
                (None, Some(b)) => Some(b),
                (Some(a), Some(b)) => Some(a.merge_with(b)),
            },
            resources: self.resources.merge(other.resources),
        }
    }
}

impl ConnectionInput {
    pub fn merge_with(self, other: ConnectionInput) -> ConnectionInput {
        ConnectionInput {
            url: other.url.or(self.url),
            database: other.database.or(self.database),
            connect_timeout_secs: other.connect_timeout_secs.or(self.connect_timeout_secs),
        }
    }
}
