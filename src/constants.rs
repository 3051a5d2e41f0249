// Configuration file name
pub const CONFIG_FILENAME: &str = "pgcomment.yaml";

// Environment variable consulted when no URL is configured
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

// Connection defaults
pub const DEFAULT_DATABASE: &str = "postgres";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
