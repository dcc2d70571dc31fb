//! PDU resource model populated by autoload.
//!
//! The orchestration host consumes [`AutoloadDetails`]: a flat list of
//! resources addressed relative to the PDU, plus their attributes.

use serde::Serialize;
use servertech_core::config::PduResourceConfig;
use tracing::warn;

/// Relative address prefix of power sockets (`PS4`).
pub const POWER_SOCKET_PREFIX: &str = "PS";

/// A single switchable power socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerSocket {
    index: String,
}

impl PowerSocket {
    /// Create a socket for the given outlet id.
    #[must_use]
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
        }
    }

    /// Outlet id.
    #[must_use]
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> String {
        format!("Power Socket {}", self.index)
    }

    /// Address relative to the PDU.
    #[must_use]
    pub fn relative_address(&self) -> String {
        format!("{POWER_SOCKET_PREFIX}{}", self.index)
    }
}

/// Resource entry of [`AutoloadDetails`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AutoloadResource {
    /// Resource model name (`<shell>.PowerSocket`).
    pub model: String,
    /// Resource name.
    pub name: String,
    /// Address relative to the root resource.
    pub relative_address: String,
    /// Full address, unique within the inventory.
    pub unique_identifier: String,
}

/// Attribute entry of [`AutoloadDetails`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AutoloadAttribute {
    /// Address of the resource the attribute belongs to; empty for the root.
    pub relative_address: String,
    /// Fully qualified attribute name.
    pub attribute_name: String,
    /// Attribute value.
    pub attribute_value: String,
}

/// Descriptor returned to the orchestration host after autoload.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct AutoloadDetails {
    /// Discovered sub-resources.
    pub resources: Vec<AutoloadResource>,
    /// Attributes of the root resource.
    pub attributes: Vec<AutoloadAttribute>,
}

impl AutoloadDetails {
    /// Find an attribute value by relative address and name.
    #[must_use]
    pub fn attribute(&self, relative_address: &str, attribute_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| {
                attr.relative_address == relative_address && attr.attribute_name == attribute_name
            })
            .map(|attr| attr.attribute_value.as_str())
    }
}

/// Resource model the autoload flow populates.
pub trait ResourceModel {
    /// Set the device vendor.
    fn set_vendor(&mut self, vendor: &str);

    /// Set the device model.
    fn set_model(&mut self, model: &str);

    /// Attach a power socket.
    fn connect_power_socket(&mut self, socket: PowerSocket);

    /// Build the descriptor handed back to the host.
    fn build(&self) -> AutoloadDetails;
}

/// Resource model of a PDU shell.
#[derive(Debug, Clone)]
pub struct PduResourceModel {
    resource_name: String,
    address: String,
    shell_name: String,
    vendor: String,
    model: String,
    sockets: Vec<PowerSocket>,
}

impl PduResourceModel {
    /// Create an empty model.
    #[must_use]
    pub fn new(
        resource_name: impl Into<String>,
        address: impl Into<String>,
        shell_name: impl Into<String>,
    ) -> Self {
        Self {
            resource_name: resource_name.into(),
            address: address.into(),
            shell_name: shell_name.into(),
            vendor: String::new(),
            model: String::new(),
            sockets: Vec::new(),
        }
    }

    /// Create an empty model for the resource the host described.
    #[must_use]
    pub fn from_resource_config(config: &PduResourceConfig, shell_name: &str) -> Self {
        Self::new(config.name.as_str(), config.address.as_str(), shell_name)
    }

    /// Resource name.
    #[must_use]
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// Vendor set so far.
    #[must_use]
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Model set so far.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Connected power sockets.
    #[must_use]
    pub fn sockets(&self) -> &[PowerSocket] {
        &self.sockets
    }
}

impl ResourceModel for PduResourceModel {
    fn set_vendor(&mut self, vendor: &str) {
        self.vendor = vendor.to_string();
    }

    fn set_model(&mut self, model: &str) {
        self.model = model.to_string();
    }

    fn connect_power_socket(&mut self, socket: PowerSocket) {
        if self.sockets.iter().any(|s| s.index == socket.index) {
            warn!(
                resource = %self.resource_name,
                index = socket.index(),
                "Power socket already connected, skipping duplicate"
            );
            return;
        }
        self.sockets.push(socket);
    }

    fn build(&self) -> AutoloadDetails {
        let attributes = vec![
            AutoloadAttribute {
                relative_address: String::new(),
                attribute_name: format!("{}.Vendor", self.shell_name),
                attribute_value: self.vendor.clone(),
            },
            AutoloadAttribute {
                relative_address: String::new(),
                attribute_name: format!("{}.Model", self.shell_name),
                attribute_value: self.model.clone(),
            },
        ];

        let resources = self
            .sockets
            .iter()
            .map(|socket| {
                let relative_address = socket.relative_address();
                AutoloadResource {
                    model: format!("{}.PowerSocket", self.shell_name),
                    name: socket.name(),
                    unique_identifier: format!("{}/{relative_address}", self.address),
                    relative_address,
                }
            })
            .collect();

        AutoloadDetails {
            resources,
            attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHELL: &str = "Server Technology PDU 2G";

    #[test]
    fn power_socket_addressing() {
        let socket = PowerSocket::new("4");
        assert_eq!(socket.index(), "4");
        assert_eq!(socket.name(), "Power Socket 4");
        assert_eq!(socket.relative_address(), "PS4");
    }

    #[test]
    fn build_emits_root_attributes_and_sockets() {
        let mut model = PduResourceModel::new("pdu-1", "192.168.30.128", SHELL);
        model.set_vendor("Server Technology");
        model.set_model("PRO2");
        model.connect_power_socket(PowerSocket::new("1"));
        model.connect_power_socket(PowerSocket::new("2"));

        let details = model.build();
        assert_eq!(details.resources.len(), 2);
        assert_eq!(details.resources[0].model, format!("{SHELL}.PowerSocket"));
        assert_eq!(details.resources[1].relative_address, "PS2");
        assert_eq!(details.resources[1].unique_identifier, "192.168.30.128/PS2");
        assert_eq!(
            details.attribute("", &format!("{SHELL}.Vendor")),
            Some("Server Technology")
        );
        assert_eq!(details.attribute("", &format!("{SHELL}.Model")), Some("PRO2"));
    }

    #[test]
    fn duplicate_sockets_are_skipped() {
        let mut model = PduResourceModel::new("pdu-1", "10.0.0.5", SHELL);
        model.connect_power_socket(PowerSocket::new("3"));
        model.connect_power_socket(PowerSocket::new("3"));
        assert_eq!(model.sockets().len(), 1);
        assert_eq!(model.build().resources.len(), 1);
    }

    #[test]
    fn empty_model_builds_root_only() {
        let model = PduResourceModel::new("pdu-1", "10.0.0.5", SHELL);
        let details = model.build();
        assert!(details.resources.is_empty());
        assert_eq!(details.attribute("", &format!("{SHELL}.Model")), Some(""));
    }
}
