//! Connection-related data models.
//!
//! The connection payload arrives as a JSON object. Every field is optional on
//! the wire so that "required" is an explicit validation step instead of a
//! deserialization failure.

use crate::error::{CliError, CliResult};
use serde::Deserialize;

/// Connection parameters exactly as decoded from the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectionInfo {
    #[serde(default)]
    pub username: Option<String>,
    /// Contains sensitive data - never log
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<i64>,
    /// Default schema. None connects at server level.
    #[serde(default)]
    pub database: Option<String>,
}

impl ConnectionInfo {
    /// Parse the decoded connection payload.
    pub fn parse(payload: &str) -> CliResult<Self> {
        serde_json::from_str(payload).map_err(|e| CliError::config_parse(e.to_string()))
    }

    /// Check required fields and produce a connection target.
    ///
    /// Fields are checked in a fixed order: host, port, username.
    pub fn validate(self) -> CliResult<ConnectionTarget> {
        let host = self.host.ok_or_else(|| CliError::missing_field("host"))?;
        let port = self.port.ok_or_else(|| CliError::missing_field("port"))?;
        let username = self
            .username
            .ok_or_else(|| CliError::missing_field("username"))?;

        let port = u16::try_from(port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| {
                CliError::config_validation(format!(
                    "port must be between 1 and 65535, got {port}"
                ))
            })?;

        Ok(ConnectionTarget {
            host,
            port,
            username,
            password: self.password.unwrap_or_default(),
            database: self.database.filter(|db| !db.is_empty()),
        })
    }
}

/// A validated connection target.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub host: String,
    pub port: u16,
    pub username: String,
    /// May be empty
    pub password: String,
    pub database: Option<String>,
}

impl ConnectionTarget {
    /// True when no default schema was requested.
    pub fn is_server_level(&self) -> bool {
        self.database.is_none()
    }

    /// Get a display-safe version of the target (password masked).
    pub fn masked(&self) -> String {
        format!(
            "{}:***@{}:{}/{}",
            self.username,
            self.host,
            self.port,
            self.database.as_deref().unwrap_or("")
        )
    }
}

impl std::fmt::Debug for ConnectionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}
