//! Client for the Roku External Control Protocol (ECP)
//!
//! Devices are found with SSDP ([`find_devices`]), described with
//! [`EcpClient::device_info`] and then driven through the query and command
//! methods on [`EcpClient`]. All calls block the calling thread.

pub mod client;
pub mod command;
pub mod discovery;
pub mod extract;
pub mod query;
pub mod transport;
pub mod typing;
pub mod xml;

pub use client::EcpClient;
pub use command::{TV_INPUT_APP_ID, CHANNEL_PARAM_ALIASES};
pub use discovery::{
    collect_locations, find_devices, find_roku_devices, DiscoveryOptions, SsdpSource, UdpSsdpSource,
    DISCOVERY_TIMEOUT, ECP_SEARCH_TARGET,
};
pub use transport::{HttpTransport, DEFAULT_REQUEST_TIMEOUT};
pub use typing::{TextEncoding, TypingPolicy};

pub use rokuecp_core::*;
