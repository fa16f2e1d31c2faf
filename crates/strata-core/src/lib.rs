//! Strata Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout Strata:
//! - Record and result shapes exchanged with storage connectors
//! - Connector, provider and settings abstractions
//! - The entity registry and core error types

pub mod config;
pub mod connector;
pub mod error;
pub mod params;
pub mod record;
pub mod registry;
pub mod settings;
pub mod utils;

pub use config::ConnectionConfig;
pub use connector::{ConnectorProvider, Entity, StorageConnector};
pub use error::{Error, ErrorCode, Result};
pub use params::GetParams;
pub use record::{GetResult, Record, Rows};
pub use registry::{EntityKind, Registry};
pub use settings::SettingsSource;
