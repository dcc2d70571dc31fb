//! Discovery of the PDU identity and its outlets.

use crate::client::{PduApi, ServerTechApi};
use crate::handler::ServerTechHandler;
use crate::resource::{AutoloadDetails, PowerSocket, ResourceModel};
use crate::Result;
use tracing::info;

/// Vendor reported for every discovered PDU.
pub const VENDOR: &str = "Server Technology";

/// Populates a [`ResourceModel`] from a live PDU.
#[derive(Debug, Clone)]
pub struct AutoloadFlow<A = ServerTechApi> {
    handler: ServerTechHandler<A>,
}

impl<A: PduApi> AutoloadFlow<A> {
    /// Create the flow on top of a handler.
    #[must_use]
    pub const fn new(handler: ServerTechHandler<A>) -> Self {
        Self { handler }
    }

    /// Run discovery for a shell supporting `supported_os`.
    ///
    /// # Errors
    ///
    /// Propagates API errors; the resource model is left partially filled.
    pub async fn discover<M>(
        &self,
        supported_os: &[&str],
        resource_model: &mut M,
    ) -> Result<AutoloadDetails>
    where
        M: ResourceModel + Send,
    {
        info!(?supported_os, "Start discovery process");

        let outlets_info = self.handler.get_outlets_info().await?;
        let pdu_info = self.handler.get_pdu_info().await?;

        resource_model.set_vendor(VENDOR);
        resource_model.set_model(&pdu_info.model);

        for outlet_id in outlets_info.into_keys() {
            resource_model.connect_power_socket(PowerSocket::new(outlet_id));
        }

        let details = resource_model.build();
        info!(
            model = %pdu_info.model,
            serial = %pdu_info.serial,
            firmware = %pdu_info.fw,
            sockets = details.resources.len(),
            "Discovery process finished successfully"
        );

        Ok(details)
    }
}
