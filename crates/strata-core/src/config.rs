//! Connection configuration resolved from a tenant record

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Connection attributes extracted from a tenant record.
///
/// Values are carried verbatim, whatever their JSON type; the connector
/// provider receives exactly what the tenant record held. A tenant field
/// that is absent leaves its attribute `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<Value>,
}
