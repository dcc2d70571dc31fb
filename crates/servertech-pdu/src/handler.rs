//! Adapts JAWS payloads into the PDU and outlet views the flows work with.

use crate::client::{PduApi, ServerTechApi};
use crate::models::{OutletState, OutletsInfo, PduInfo};
use crate::Result;
use servertech_core::config::PduResourceConfig;
use tracing::info;

/// Thin layer over a [`PduApi`] implementation.
#[derive(Debug, Clone)]
pub struct ServerTechHandler<A = ServerTechApi> {
    api: A,
}

impl ServerTechHandler<ServerTechApi> {
    /// Build a handler backed by the JAWS client for the given resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &PduResourceConfig) -> Result<Self> {
        info!(resource = %config.name, "Initializing Server Technology API client.");
        Ok(Self::new(ServerTechApi::from_config(config)?))
    }
}

impl<A: PduApi> ServerTechHandler<A> {
    /// Wrap an existing API client.
    #[must_use]
    pub const fn new(api: A) -> Self {
        Self { api }
    }

    /// Access the underlying API client.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Get basic information about the PDU.
    ///
    /// When several units are linked the last one reported wins.
    ///
    /// # Errors
    ///
    /// Propagates API errors.
    pub async fn get_pdu_info(&self) -> Result<PduInfo> {
        let mut pdu_info = PduInfo::default();

        let units = self.api.get_pdu_units_info().await?;
        for unit in units {
            pdu_info.model = unit.model_number.unwrap_or_default();
            pdu_info.serial = unit.product_serial_number.unwrap_or_default();
        }

        let system = self.api.get_pdu_system_info().await?;
        pdu_info.fw = system.firmware.unwrap_or_default();

        Ok(pdu_info)
    }

    /// Get the current control state of every outlet.
    ///
    /// # Errors
    ///
    /// Propagates API errors.
    pub async fn get_outlets_info(&self) -> Result<OutletsInfo> {
        let outlets = self.api.get_outlets().await?;

        Ok(outlets
            .into_iter()
            .map(|outlet| (outlet.id, outlet.control_state))
            .collect())
    }

    /// Set the state of a single outlet.
    ///
    /// # Errors
    ///
    /// Propagates API errors.
    pub async fn set_outlet_state(&self, outlet_id: &str, state: OutletState) -> Result<()> {
        self.api.set_outlet_state(outlet_id, state).await
    }
}
