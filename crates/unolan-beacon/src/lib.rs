//! Session discovery for Unolan.
//!
//! A host advertises itself by broadcasting a tiny UDP datagram on the
//! local network at a fixed cadence:
//!
//! ```text
//! <code>:<host-ip>:<host-port>
//! ```
//!
//! The *session code* is the host's TCP listening port, and the datagram
//! is sent to that same port number. A participant who knows the code
//! binds a UDP socket on it, waits for a matching beacon, and learns
//! where to connect.
//!
//! # Pieces
//!
//! - [`SessionCode`] / [`Beacon`]: the values and their text form
//! - [`BeaconScheduler`]: cadence with pause/resume, driven from a
//!   `tokio::select!` loop
//! - [`spawn_beacon`] / [`BeaconHandle`]: the host's broadcast task
//! - [`find_host`]: the participant's search with timeout
//! - [`local_ip`]: the address a host should advertise
//!
//! The host pauses its beacon once every seat is taken and resumes it if
//! someone leaves before the game starts.

mod broadcast;
mod code;
mod config;
mod error;
mod net;
mod scheduler;
mod search;

pub use broadcast::{BeaconHandle, spawn_beacon};
pub use code::{Beacon, SessionCode};
pub use config::BeaconConfig;
pub use error::DiscoveryError;
pub use net::{advertised_ip, local_ip};
pub use scheduler::BeaconScheduler;
pub use search::{find_host, find_host_on};
