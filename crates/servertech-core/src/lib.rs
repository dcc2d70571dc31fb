//! # servertech-core
//!
//! Core types and utilities for Server Technology PDU drivers.
//!
//! ## Modules
//!
//! - [`error`] - Error types and HTTP status classification
//! - [`config`] - Resource and connection configuration
//! - [`client`] - HTTP client settings and the retry policy
//! - [`http`] - Generic REST client with status-to-error mapping

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod http;

// Re-export commonly used types
pub use error::{Error, ErrorKind, Result};
