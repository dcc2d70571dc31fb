//! Configuration structures for PDU clients.
//!
//! [`PduResourceConfig`] is what the orchestration host hands to the driver;
//! [`ConnectionConfig`] is the frozen connection descriptor the REST client is
//! built from.

use crate::Error;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Default HTTP port
pub const DEFAULT_HTTP_PORT: u16 = 80;
/// Default HTTPS port
pub const DEFAULT_HTTPS_PORT: u16 = 443;

/// URL scheme used to reach the PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Plain HTTP
    Http,
    /// HTTP over TLS
    #[default]
    Https,
}

impl Scheme {
    /// Returns the scheme as it appears in a URL.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(Error::ConfigError(format!("Unsupported API scheme: {other}"))),
        }
    }
}

/// Immutable connection descriptor for a single PDU.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    address: String,
    username: String,
    password: SecretString,
    scheme: Scheme,
    port: u16,
    tls_verify: bool,
}

impl ConnectionConfig {
    /// Create a connection descriptor with the default scheme and port
    /// (`https`, 443) and TLS verification disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is empty.
    pub fn new(
        address: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, Error> {
        let address = address.into().trim().to_string();
        if address.is_empty() {
            return Err(Error::ConfigError("PDU address must not be empty".to_string()));
        }

        Ok(Self {
            address,
            username: username.into(),
            password: SecretString::from(password.into()),
            scheme: Scheme::Https,
            port: DEFAULT_HTTPS_PORT,
            tls_verify: false,
        })
    }

    /// Set the URL scheme.
    #[must_use]
    pub const fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Set the port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// PDU host name or IP address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// API user name; empty means no authentication.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// API password.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// URL scheme.
    #[must_use]
    pub const fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// TCP port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Whether TLS certificates are verified.
    #[must_use]
    pub const fn tls_verify(&self) -> bool {
        self.tls_verify
    }
}

/// Resource attributes the orchestration host provides for a PDU.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PduResourceConfig {
    /// Resource name in the orchestration inventory
    #[validate(length(min = 1))]
    pub name: String,

    /// PDU host name or IP address
    #[validate(length(min = 1))]
    pub address: String,

    /// REST API user
    #[serde(default)]
    pub api_user: String,

    /// REST API password
    #[serde(default = "empty_secret")]
    pub api_password: SecretString,

    /// REST API scheme; empty falls back to `https`
    #[serde(default)]
    pub api_scheme: Option<String>,

    /// REST API port; absent or zero falls back to the scheme's default port
    #[serde(default)]
    pub api_port: Option<u16>,

    /// Whether to verify TLS certificates
    #[serde(default)]
    pub tls_verify: bool,
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

impl PduResourceConfig {
    /// Create a resource configuration with required parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] if the name or address is empty.
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        api_user: impl Into<String>,
        api_password: impl Into<String>,
    ) -> Result<Self, Error> {
        let config = Self {
            name: name.into(),
            address: address.into(),
            api_user: api_user.into(),
            api_password: SecretString::from(api_password.into()),
            api_scheme: None,
            api_port: None,
            tls_verify: false,
        };

        config.validate()?;

        Ok(config)
    }

    /// Parse and validate a resource configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the JSON is malformed and
    /// [`Error::ValidationError`] if validation fails.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::ConfigError(format!("Invalid resource configuration: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Set the API scheme.
    #[must_use]
    pub fn with_api_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.api_scheme = Some(scheme.into());
        self
    }

    /// Set the API port.
    #[must_use]
    pub const fn with_api_port(mut self, port: u16) -> Self {
        self.api_port = Some(port);
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Resolve the API scheme, defaulting to `https` when unset or blank.
    ///
    /// # Errors
    ///
    /// Returns an error for schemes other than `http` and `https`.
    pub fn scheme(&self) -> Result<Scheme, Error> {
        match self.api_scheme.as_deref().map(str::trim) {
            None | Some("") => Ok(Scheme::default()),
            Some(value) => value.parse(),
        }
    }

    /// Resolve the API port, defaulting to the scheme's well-known port.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheme cannot be resolved.
    pub fn port(&self) -> Result<u16, Error> {
        match self.api_port {
            Some(port) if port != 0 => Ok(port),
            _ => Ok(match self.scheme()? {
                Scheme::Http => DEFAULT_HTTP_PORT,
                Scheme::Https => DEFAULT_HTTPS_PORT,
            }),
        }
    }

    /// Build the connection descriptor for the REST client.
    ///
    /// # Errors
    ///
    /// Returns an error if the address, scheme or port are invalid.
    pub fn connection(&self) -> Result<ConnectionConfig, Error> {
        Ok(ConnectionConfig::new(
            self.address.as_str(),
            self.api_user.as_str(),
            self.api_password.expose_secret(),
        )?
        .with_scheme(self.scheme()?)
        .with_port(self.port()?)
        .with_tls_verify(self.tls_verify))
    }
}
