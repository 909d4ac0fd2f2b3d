//! Clientes de APIs externas

pub mod fleetop;

pub use fleetop::{FleetopClient, FleetopError, IgnitionSource, IgnitionSummary};
