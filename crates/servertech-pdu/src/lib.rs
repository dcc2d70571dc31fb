//! Server Technology PDU driver.
//!
//! Provides an asynchronous client for the Server Technology JAWS REST API and
//! the autoload and outlet-state flows an orchestration host drives through
//! [`ServerTechDriver`].

#![deny(missing_docs)]

pub mod autoload;
pub mod client;
pub mod driver;
pub mod handler;
pub mod models;
pub mod resource;
pub mod state;

pub use autoload::AutoloadFlow;
pub use client::{PduApi, RequestContext, ServerTechApi, ServerTechApiBuilder};
pub use driver::ServerTechDriver;
pub use handler::ServerTechHandler;
pub use models::{OutletState, OutletStatus, OutletsInfo, PduInfo, SystemInfo, UnitInfo};
pub use resource::{AutoloadDetails, PduResourceModel, PowerSocket, ResourceModel};
pub use state::{ports_to_outlet_ids, OutletsStateFlow};

/// Convenient result alias that reuses the shared PDU error type.
pub type Result<T> = servertech_core::Result<T>;
