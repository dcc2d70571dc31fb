//! Orchestration entrypoints of the Server Technology PDU shell.

use crate::autoload::AutoloadFlow;
use crate::client::ServerTechApi;
use crate::handler::ServerTechHandler;
use crate::resource::{AutoloadDetails, PduResourceModel};
use crate::state::OutletsStateFlow;
use crate::Result;
use servertech_core::client::ClientConfig;
use servertech_core::config::PduResourceConfig;
use tracing::info;

/// Shell driver: one API client is built per command from the resource config.
#[derive(Debug, Clone, Default)]
pub struct ServerTechDriver {
    http_config: ClientConfig,
}

impl ServerTechDriver {
    /// Operating systems the shell supports.
    pub const SUPPORTED_OS: &'static [&'static str] = &["Server Technology PDU"];

    /// Shell name used to qualify resource models and attributes.
    pub const SHELL_NAME: &'static str = "Server Technology PDU 2G";

    /// Create a driver with default HTTP settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the HTTP client configuration used for every command.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Called once when the driver is loaded.
    #[must_use]
    pub fn initialize(&self) -> &'static str {
        "Finished initializing"
    }

    fn handler(&self, config: &PduResourceConfig) -> Result<ServerTechHandler> {
        let api = ServerTechApi::builder(config.connection()?)
            .with_http_config(self.http_config.clone())
            .build()?;
        Ok(ServerTechHandler::new(api))
    }

    /// Discover the PDU and return its inventory.
    ///
    /// # Errors
    ///
    /// Returns configuration or API errors.
    pub async fn get_inventory(&self, config: &PduResourceConfig) -> Result<AutoloadDetails> {
        let mut resource_model = PduResourceModel::from_resource_config(config, Self::SHELL_NAME);
        let flow = AutoloadFlow::new(self.handler(config)?);

        info!(resource = %config.name, "Autoload started");
        let details = flow.discover(Self::SUPPORTED_OS, &mut resource_model).await?;
        info!(resource = %config.name, "Autoload completed");

        Ok(details)
    }

    async fn change_power_state<S: AsRef<str>>(
        &self,
        config: &PduResourceConfig,
        ports: &[S],
        state: &str,
    ) -> Result<()> {
        let flow = OutletsStateFlow::new(self.handler(config)?);
        let operation = capitalize(state);

        info!(resource = %config.name, "Power {operation} operation started");
        flow.set_outlets_state(ports, state).await?;
        info!(resource = %config.name, "Power {operation} operation completed");

        Ok(())
    }

    /// Switch the given outlets on.
    ///
    /// # Errors
    ///
    /// Returns configuration or API errors.
    pub async fn power_on<S: AsRef<str>>(&self, config: &PduResourceConfig, ports: &[S]) -> Result<()> {
        self.change_power_state(config, ports, "on").await
    }

    /// Switch the given outlets off.
    ///
    /// # Errors
    ///
    /// Returns configuration or API errors.
    pub async fn power_off<S: AsRef<str>>(&self, config: &PduResourceConfig, ports: &[S]) -> Result<()> {
        self.change_power_state(config, ports, "off").await
    }

    /// Power-cycle the given outlets. The PDU applies its own cycle delay, so
    /// `delay` is not sent.
    ///
    /// # Errors
    ///
    /// Returns configuration or API errors.
    pub async fn power_cycle<S: AsRef<str>>(
        &self,
        config: &PduResourceConfig,
        ports: &[S],
        delay: &str,
    ) -> Result<()> {
        info!(resource = %config.name, delay, "Power cycle requested");
        self.change_power_state(config, ports, "reboot").await
    }

    /// Called when the driver instance is destroyed.
    pub fn cleanup(&self) {}
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
