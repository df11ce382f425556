//! CoreCrew Logistics careers site: position catalog, interview question bank, and the
//! session-driven application wizard with its notification, storage, mail, and identity
//! adapters.

pub mod config;
pub mod error;
pub mod integrations;
pub mod telemetry;
pub mod workflows;
