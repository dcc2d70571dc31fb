//! Asynchronous client for the Server Technology JAWS REST API.

use crate::models::{OutletControlRequest, OutletState, OutletStatus, SystemInfo, UnitInfo};
use crate::Result;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use servertech_core::client::{ClientConfig, RetryPolicy};
use servertech_core::config::{ConnectionConfig, PduResourceConfig};
use servertech_core::http::{read_json, RestClient, RestClientBuilder};
use servertech_core::ErrorKind;
use tracing::debug;
use url::Url;

const USER_AGENT: &str = concat!("servertech-pdu/", env!("CARGO_PKG_VERSION"));

/// Base path of the JAWS API.
pub const BASE_PATH: &str = "jaws";

/// Kind of call a status code is interpreted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestContext {
    /// Information reads (`GET`).
    Read,
    /// Outlet control writes (`PATCH control/outlets/{id}`).
    OutletControl,
}

/// Map a JAWS error status to an error kind.
///
/// A 404 means the resource is unavailable for now and is retried, on reads and
/// on outlet control alike. Outlet control adds 400 and 409.
#[must_use]
pub fn status_to_error_kind(status: StatusCode, context: RequestContext) -> Option<ErrorKind> {
    match (status.as_u16(), context) {
        (404, _) => Some(ErrorKind::Unavailable),
        (405, _) => Some(ErrorKind::MethodNotAllowed),
        (503, _) => Some(ErrorKind::ServiceBusy),
        (400, RequestContext::OutletControl) => Some(ErrorKind::MalformedRequest),
        (409, RequestContext::OutletControl) => Some(ErrorKind::Conflict),
        _ => None,
    }
}

/// Operations the driver needs from a PDU.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PduApi: Send + Sync {
    /// Get information about PDU units.
    async fn get_pdu_units_info(&self) -> Result<Vec<UnitInfo>>;

    /// Get basic information about the PDU system.
    async fn get_pdu_system_info(&self) -> Result<SystemInfo>;

    /// Get the control state of every outlet.
    async fn get_outlets(&self) -> Result<Vec<OutletStatus>>;

    /// Set the state of a single outlet.
    async fn set_outlet_state(&self, outlet_id: &str, state: OutletState) -> Result<()>;
}

/// Builder for [`ServerTechApi`].
#[derive(Debug, Clone)]
pub struct ServerTechApiBuilder {
    inner: RestClientBuilder,
}

impl ServerTechApiBuilder {
    /// Create a builder for the given connection.
    #[must_use]
    pub fn new(connection: ConnectionConfig) -> Self {
        let inner = RestClientBuilder::new(connection, BASE_PATH).with_user_agent(USER_AGENT);
        Self { inner }
    }

    /// Override the HTTP client configuration (timeouts, retry policy).
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.inner = self.inner.with_http_config(config);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the transport cannot be built.
    pub fn build(self) -> Result<ServerTechApi> {
        let inner = self.inner.build()?;
        Ok(ServerTechApi { inner })
    }
}

/// Asynchronous JAWS client.
#[derive(Debug, Clone)]
pub struct ServerTechApi {
    inner: RestClient,
}

impl ServerTechApi {
    /// Construct a client with default HTTP settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built.
    pub fn new(connection: ConnectionConfig) -> Result<Self> {
        ServerTechApiBuilder::new(connection).build()
    }

    /// Start a builder for the given connection.
    #[must_use]
    pub fn builder(connection: ConnectionConfig) -> ServerTechApiBuilder {
        ServerTechApiBuilder::new(connection)
    }

    /// Construct a client from the host-provided resource configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &PduResourceConfig) -> Result<Self> {
        Self::new(config.connection()?)
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// Retry policy applied to every call.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        self.inner.retry_policy()
    }

    async fn get_json<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        self.retry_policy()
            .run(move || async move {
                let response = self
                    .inner
                    .get(path, true, |status| {
                        status_to_error_kind(status, RequestContext::Read)
                    })
                    .await?;
                read_json(response).await
            })
            .await
    }
}

#[async_trait]
impl PduApi for ServerTechApi {
    async fn get_pdu_units_info(&self) -> Result<Vec<UnitInfo>> {
        self.get_json("config/info/units").await
    }

    async fn get_pdu_system_info(&self) -> Result<SystemInfo> {
        self.get_json("config/info/system").await
    }

    async fn get_outlets(&self) -> Result<Vec<OutletStatus>> {
        self.get_json("control/outlets").await
    }

    async fn set_outlet_state(&self, outlet_id: &str, state: OutletState) -> Result<()> {
        let url = self
            .inner
            .segments_url(&["control", "outlets", outlet_id])?;
        let url = &url;
        let request = &OutletControlRequest {
            control_action: state,
        };

        self.retry_policy()
            .run(move || async move {
                self.inner
                    .send(Method::PATCH, url.clone(), Some(request), true, |status| {
                        status_to_error_kind(status, RequestContext::OutletControl)
                    })
                    .await?;
                debug!(outlet_id, %state, "Outlet state accepted");
                Ok(())
            })
            .await
    }
}
