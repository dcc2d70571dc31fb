//! JAWS payloads and the driver-facing views built from them.

use serde::{Deserialize, Serialize};
use servertech_core::Error;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Entry of `GET config/info/units`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitInfo {
    /// Unit identifier (`A`, `B`, ... on linked units).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Unit name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Product model number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_number: Option<String>,
    /// Product serial number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_serial_number: Option<String>,
}

/// Body of `GET config/info/system`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemInfo {
    /// Firmware version string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware: Option<String>,
}

/// Entry of `GET control/outlets`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutletStatus {
    /// Outlet identifier.
    pub id: String,
    /// Current control state (`on`, `off`, `idle on`, ...).
    pub control_state: String,
    /// Outlet name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Requested outlet power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutletState {
    /// Switch the outlet on.
    On,
    /// Switch the outlet off.
    Off,
    /// Power-cycle the outlet.
    Reboot,
}

impl OutletState {
    /// All states the PDU accepts.
    pub const ALL: [Self; 3] = [Self::On, Self::Off, Self::Reboot];

    /// Returns the state as sent in `control_action`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Reboot => "reboot",
        }
    }
}

impl fmt::Display for OutletState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutletState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| Error::NotSupported(format!("State '{s}' is not supported.")))
    }
}

/// Body of `PATCH control/outlets/{id}`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct OutletControlRequest {
    /// Action to apply.
    pub control_action: OutletState,
}

/// Identity of a PDU.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct PduInfo {
    /// Model number; empty when the PDU does not report one.
    pub model: String,
    /// Serial number; empty when the PDU does not report one.
    pub serial: String,
    /// Firmware version; empty when the PDU does not report one.
    pub fw: String,
}

/// Outlet id to current control state.
pub type OutletsInfo = BTreeMap<String, String>;
