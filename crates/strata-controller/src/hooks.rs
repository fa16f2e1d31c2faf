//! Extension hooks a controller definition may expose
//!
//! Hooks are capabilities: the pipeline asks the definition for each one
//! per call and skips the corresponding stage when the answer is `None`.
//! A definition that wants a hook usually implements the hook trait itself
//! and answers `Some(self)`.

use std::collections::HashMap;

use async_trait::async_trait;

use serde_json::Value;

use strata_core::error::Result;
use strata_core::params::GetParams;
use strata_core::record::Record;

/// Page size used by paged iteration when the request does not set one.
pub const DEFAULT_PAGE_LIMIT: u32 = 500;

/// Per-record formatting hook.
pub trait Formatter: Send + Sync {
    /// Replace a fetched record with its application shape.
    fn format_get(&self, record: Record) -> Result<Record>;
}

/// Batch post-processing hook, run once over the formatted records.
#[async_trait]
pub trait PostProcessor: Send + Sync {
    /// Rework the record batch; the pipeline adopts whatever comes back.
    ///
    /// `index` maps the stringified `id` of each record to its position in
    /// `records`, and `ids` lists the raw `id` values in record order. Both
    /// cover only records carrying a non-null `id`.
    async fn after_get(
        &self,
        records: Vec<Record>,
        params: &GetParams,
        index: &HashMap<String, usize>,
        ids: &[Value],
    ) -> Result<Vec<Record>>;
}

/// Per-entity customization of the result pipeline.
pub trait ControllerDef: Send + Sync {
    /// The per-record formatting hook, when this entity has one.
    fn formatter(&self) -> Option<&dyn Formatter> {
        None
    }

    /// The batch post-processing hook, when this entity has one.
    fn post_processor(&self) -> Option<&dyn PostProcessor> {
        None
    }

    /// Page size for paged iteration when the request does not set one.
    fn default_page_limit(&self) -> u32 {
        DEFAULT_PAGE_LIMIT
    }
}

/// A controller definition with no hooks at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainController;

impl ControllerDef for PlainController {}
