//! Storage connector abstractions
//!
//! A connector is the uniform CRUD surface a storage driver exposes. The
//! layer never talks wire protocols itself; it resolves a connector through
//! a [`ConnectorProvider`] and delegates every operation to it, passing the
//! owning entity along so drivers can map entity types to tables or
//! collections without holding per-entity state.

use std::sync::Arc;

use async_trait::async_trait;

use serde_json::Value;

use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::params::GetParams;
use crate::record::{Record, Rows};

/// The handle a connector receives on every call, identifying which logical
/// entity the operation is for.
pub trait Entity: Send + Sync {
    /// Logical entity type, e.g. `"order"`.
    fn entity_type(&self) -> &str;
}

/// Uniform CRUD surface of a storage driver.
///
/// Return values other than `get` are opaque to the layer; each driver
/// answers in its own shape (inserted ids, matched counts, ...) and the
/// layer forwards them unchanged.
#[async_trait]
pub trait StorageConnector: Send + Sync {
    /// Fetch records for `entity`.
    ///
    /// `Ok(None)` means the driver had no answer at all, which callers
    /// distinguish from an empty list.
    async fn get(&self, entity: &dyn Entity, params: &GetParams) -> Result<Option<Rows>>;

    /// Totals for `entity`, in whatever shape the driver keeps them.
    async fn get_totals(&self, entity: &dyn Entity) -> Result<Value>;

    /// Insert one record.
    async fn insert(&self, entity: &dyn Entity, item: Record) -> Result<Value>;

    /// Insert or replace one record.
    async fn save(&self, entity: &dyn Entity, item: Record) -> Result<Value>;

    /// Apply `values` to every record matching `filter`.
    async fn update(&self, entity: &dyn Entity, values: Value, filter: Value) -> Result<Value>;

    /// Remove one record.
    async fn remove(&self, entity: &dyn Entity, item: Record) -> Result<Value>;

    /// Insert a batch of records.
    async fn multi_insert(&self, entity: &dyn Entity, items: Vec<Record>) -> Result<Value>;

    /// Insert or replace a batch of records.
    async fn multi_save(&self, entity: &dyn Entity, items: Vec<Record>) -> Result<Value>;

    /// Remove every record matching `filter`.
    async fn multi_remove(&self, entity: &dyn Entity, filter: Value) -> Result<Value>;
}

/// Hands out connectors, either by the static key of a shared datastore or
/// from a configuration resolved out of a tenant record.
pub trait ConnectorProvider: Send + Sync {
    /// Connector for the shared datastore registered under `key`.
    fn by_key(&self, key: &str) -> Result<Arc<dyn StorageConnector>>;

    /// Connector for a tenant-derived configuration.
    fn by_config(&self, config: &ConnectionConfig) -> Result<Arc<dyn StorageConnector>>;
}
