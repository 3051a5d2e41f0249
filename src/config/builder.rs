use crate::config::{merge::Merge, types::*};
use crate::constants::DATABASE_URL_ENV;
use anyhow::{Result, anyhow};

pub struct ConfigBuilder {
    config_input: ConfigInput,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config_input: ConfigInput::default(),
        }
    }

    pub fn with_file(mut self, file_input: ConfigInput) -> Self {
        self.config_input = self.config_input.merge(file_input);
        self
    }

    pub fn with_cli_args(mut self, cli_input: ConfigInput) -> Self {
        self.config_input = self.config_input.merge(cli_input);
        self
    }

    pub fn resolve(self) -> Result<Config> {
        let defaults = Config::default();

        Ok(Config {
            connection: self.resolve_connection(&defaults.connection)?,
            resources: self.config_input.resources.clone().unwrap_or_default(),
        })
    }

    fn resolve_connection(&self, defaults: &Connection) -> Result<Connection> {
        let conn_input = self.config_input.connection.as_ref();

        let url = conn_input
            .and_then(|c| c.url.as_ref())
            .cloned()
            .or_else(|| std::env::var(DATABASE_URL_ENV).ok())
            .unwrap_or_else(|| defaults.url.clone());

        let database = conn_input
            .and_then(|c| c.database.as_ref())
            .cloned()
            .unwrap_or_else(|| defaults.database.clone());
        if database.is_empty() {
            return Err(anyhow!("connection.database must not be empty"));
        }

        let connect_timeout_secs = conn_input
            .and_then(|c| c.connect_timeout_secs)
            .unwrap_or(defaults.connect_timeout_secs);
        if connect_timeout_secs == 0 {
            return Err(anyhow!("connection.connect_timeout_secs must be at least 1"));
        }

        Ok(Connection {
            url,
            database,
            connect_timeout_secs,
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
