//! Server capability checks keyed to the connected PostgreSQL version.

use std::fmt;

use serde::Serialize;

/// A version as reported by `SHOW server_version_num` (e.g. 160002)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ServerVersion(u32);

impl ServerVersion {
    pub const fn from_num(num: u32) -> Self {
        Self(num)
    }

    /// Parse the text form of `server_version_num`
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<u32>().ok().map(Self)
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Since 10 the number is MAJOR * 10000 + MINOR; before it was MAJOR.MINOR.PATCH in pairs.
        if self.0 >= 100_000 {
            write!(f, "{}.{}", self.0 / 10_000, self.0 % 10_000)
        } else {
            write!(
                f,
                "{}.{}.{}",
                self.0 / 10_000,
                (self.0 / 100) % 100,
                self.0 % 100
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// `COMMENT ON DATABASE | ROLE | TABLE`
    Comment,
}

impl Feature {
    pub fn minimum_version(&self) -> ServerVersion {
        match self {
            // Roles (and COMMENT ON ROLE) arrived in 8.1
            Feature::Comment => ServerVersion::from_num(80100),
        }
    }

    pub fn supported_by(&self, version: ServerVersion) -> bool {
        version >= self.minimum_version()
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Comment => write!(f, "comment"),
        }
    }
}

/// Implemented by anything that knows which server it is talking to.
pub trait FeatureGate {
    fn server_version(&self) -> ServerVersion;

    fn feature_supported(&self, feature: Feature) -> bool {
        feature.supported_by(self.server_version())
    }
}
