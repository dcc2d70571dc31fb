//! Outlet power state changes.

use crate::client::{PduApi, ServerTechApi};
use crate::handler::ServerTechHandler;
use crate::models::OutletState;
use crate::resource::POWER_SOCKET_PREFIX;
use crate::Result;
use tracing::info;

/// Convert port addresses (`192.168.30.128/PS4`) into outlet ids (`4`).
#[must_use]
pub fn ports_to_outlet_ids<S: AsRef<str>>(ports: &[S]) -> Vec<String> {
    ports
        .iter()
        .map(|port| {
            let port = port.as_ref();
            let last = port.rsplit('/').next().unwrap_or(port);
            last.replace(POWER_SOCKET_PREFIX, "")
        })
        .collect()
}

/// Changes the power state of one or more outlets.
#[derive(Debug, Clone)]
pub struct OutletsStateFlow<A = ServerTechApi> {
    handler: ServerTechHandler<A>,
}

impl<A: PduApi> OutletsStateFlow<A> {
    /// Create the flow on top of a handler.
    #[must_use]
    pub const fn new(handler: ServerTechHandler<A>) -> Self {
        Self { handler }
    }

    /// Set every outlet behind `ports` to `state`.
    ///
    /// Outlets are switched one after another. The first failure aborts the
    /// remaining outlets; the ones already switched stay switched.
    ///
    /// # Errors
    ///
    /// Returns [`servertech_core::Error::NotSupported`] for a state other than
    /// `on`, `off` or `reboot` before any request is made, or the first API
    /// error.
    pub async fn set_outlets_state<S: AsRef<str>>(&self, ports: &[S], state: &str) -> Result<()> {
        let state: OutletState = state.parse()?;
        let outlets = ports_to_outlet_ids(ports);

        for outlet_id in &outlets {
            info!(outlet_id = outlet_id.as_str(), %state, "Setting outlet state");
            self.handler.set_outlet_state(outlet_id, state).await?;
        }

        info!(count = outlets.len(), %state, "Outlet states changed");
        Ok(())
    }
}
