//! Query parameters accepted by `get` operations

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::Record;

/// Parameters for a `get`.
///
/// The named fields are the keys the layer itself understands; everything
/// else (filters, sort orders, driver hints) rides along in `extra` and is
/// handed to the connector untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetParams {
    /// 1-based page number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Rekey the fetched list into a map keyed by this field.
    #[serde(rename = "changeKeys", skip_serializing_if = "Option::is_none")]
    pub change_keys: Option<String>,

    /// Route the fetch through the read role of the tenant datastore.
    #[serde(rename = "readonly", skip_serializing_if = "is_false")]
    pub read_only: bool,

    /// Driver-specific keys, carried through verbatim.
    #[serde(flatten)]
    pub extra: Record,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl GetParams {
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_change_keys(mut self, field: impl Into<String>) -> Self {
        self.change_keys = Some(field.into());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Attach a driver-specific key.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}
