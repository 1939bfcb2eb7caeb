use std::fmt;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Parameters needed to reach and authenticate against an SFTP server
#[derive(Clone, Deserialize)]
pub struct ConnectionParams {
    /// User to authenticate as
    pub username: String,
    /// Plaintext password for password authentication
    pub password: String,
    /// Hostname or IP address of the server
    pub host: String,
    /// SSH port, 22 when omitted from a config file
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    22
}

impl ConnectionParams {
    /// Creates connection parameters from their parts
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            host: host.into(),
            port,
        }
    }

    /// Parses connection parameters from a JSON document
    ///
    /// # Example
    ///
    /// ```ignore
    /// let params = ConnectionParams::from_json_str(
    ///     r#"{"username": "tester", "password": "password", "host": "127.0.0.1"}"#,
    /// )?;
    /// assert_eq!(params.port, 22);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads connection parameters from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read connection config {:?}", path))?;
        Self::from_json_str(&contents)
            .with_context(|| format!("invalid connection config {:?}", path))
    }

    /// Address to dial, formatted as `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Credentials handed to the dial capability
    pub fn auth(&self) -> AuthConfig {
        AuthConfig {
            user: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

/// Password credentials used while dialing
#[derive(Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}
