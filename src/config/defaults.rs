use crate::config::types::*;
use crate::constants::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_DATABASE};

impl Default for Connection {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/postgres".to_string(),
            database: DEFAULT_DATABASE.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}
