//! Result-processing pipeline over a datastore router

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, RwLock};

use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::debug;

use strata_core::error::{Error, Result};
use strata_core::params::GetParams;
use strata_core::record::{GetResult, Record, Rows};
use strata_core::utils::{change_keys, object_key};
use strata_model::factory::ModelFactory;
use strata_model::model::Model;

use crate::hooks::ControllerDef;

/// Result-processing pipeline bound to one logical entity type.
///
/// A controller drives the model registered under its own entity type,
/// building it lazily on first use and keeping it for the controller's
/// lifetime. Fetched records flow through the definition's hooks before
/// they reach the caller; every other operation passes straight through.
pub struct Controller {
    entity_type: String,
    def: Arc<dyn ControllerDef>,
    models: Arc<ModelFactory>,
    client: RwLock<Option<Record>>,
    model: OnceCell<Model>,
}

impl Controller {
    pub fn new(
        entity_type: impl Into<String>,
        def: Arc<dyn ControllerDef>,
        models: Arc<ModelFactory>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            def,
            models,
            client: RwLock::new(None),
            model: OnceCell::new(),
        }
    }

    /// Logical entity type this controller serves.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Attach the tenant record, forwarding it to the model once one exists.
    pub fn set_client(&self, client: Record) {
        *self.client.write().unwrap() = Some(client.clone());
        if let Some(model) = self.model.get() {
            model.set_client(client);
        }
    }

    /// The model this controller drives, resolved under the controller's own
    /// entity type and memoized for the controller's lifetime.
    pub fn model(&self) -> Result<&Model> {
        self.model.get_or_try_init(|| {
            let model = self.models.model(&self.entity_type)?;
            if let Some(client) = self.client.read().unwrap().clone() {
                model.set_client(client);
            }
            Ok(model)
        })
    }

    /// Fetch records and run them through the shaping pipeline.
    ///
    /// `Ok(None)` mirrors a connector that had no answer at all; an empty
    /// `Many` mirrors zero matching rows and skips the hooks entirely.
    /// Otherwise the formatted, post-processed records come back in the
    /// shape the raw answer had, or keyed by `params.change_keys` when set.
    /// A single-record answer stays single and is never rekeyed.
    pub async fn get(&self, params: GetParams) -> Result<Option<GetResult>> {
        let Some(rows) = self.model()?.get(&params).await? else {
            return Ok(None);
        };

        let (was_single, items) = match rows {
            Rows::One(item) => (true, vec![item]),
            Rows::Many(items) => {
                if items.is_empty() {
                    return Ok(Some(GetResult::Many(items)));
                }
                (false, items)
            }
        };

        let items = self.shape(items, &params).await?;

        if was_single {
            return Ok(items.into_iter().next().map(GetResult::One));
        }

        Ok(Some(match params.change_keys.as_deref() {
            Some(field) => GetResult::Keyed(change_keys(items, field)),
            None => GetResult::Many(items),
        }))
    }

    /// Format each record in order, then hand the whole batch to the
    /// post-processor. The id index is only assembled when a post-processor
    /// is there to receive it.
    async fn shape(&self, items: Vec<Record>, params: &GetParams) -> Result<Vec<Record>> {
        let formatter = self.def.formatter();
        let post_processor = self.def.post_processor();

        let mut formatted = Vec::with_capacity(items.len());
        let mut index = HashMap::new();
        let mut ids = Vec::new();

        for (position, item) in items.into_iter().enumerate() {
            let item = match formatter {
                Some(formatter) => formatter.format_get(item)?,
                None => item,
            };
            if post_processor.is_some()
                && let Some(id) = item.get("id").filter(|id| !id.is_null())
            {
                if let Some(key) = object_key(id) {
                    index.insert(key, position);
                }
                ids.push(id.clone());
            }
            formatted.push(item);
        }

        match post_processor {
            Some(post_processor) => post_processor.after_get(formatted, params, &index, &ids).await,
            None => Ok(formatted),
        }
    }

    /// Drive `get` page by page, handing each page of records to `on_page`
    /// together with its page number and the page size in effect.
    ///
    /// The callback is awaited before the next page is fetched. Iteration
    /// stops at the first page shorter than the limit; a final page of
    /// exactly the limit costs one extra confirming fetch. `change_keys`
    /// is rejected up front, the callback consumes record sequences.
    pub async fn get_paged<F, Fut>(&self, params: GetParams, mut on_page: F) -> Result<()>
    where
        F: FnMut(Vec<Record>, u32, u32) -> Fut + Send,
        Fut: Future<Output = Result<()>> + Send,
    {
        if params.change_keys.is_some() {
            return Err(Error::InvalidCallback);
        }

        let mut page = params.page.filter(|page| *page > 0).unwrap_or(1);
        let limit = params
            .limit
            .filter(|limit| *limit > 0)
            .unwrap_or_else(|| self.def.default_page_limit());

        loop {
            let mut page_params = params.clone();
            page_params.page = Some(page);
            page_params.limit = Some(limit);

            let items = match self.get(page_params).await? {
                Some(GetResult::Many(items)) if !items.is_empty() => items,
                // No answer, no rows, or a shape pages cannot carry.
                _ => return Ok(()),
            };

            let count = items.len() as u32;
            debug!(entity = %self.entity_type, page, count, "handing page to the callback");
            on_page(items, page, limit).await?;

            if count != limit {
                return Ok(());
            }
            page += 1;
        }
    }

    /// Totals for this entity, in whatever shape the driver keeps them.
    pub async fn get_totals(&self) -> Result<Value> {
        self.model()?.get_totals().await
    }

    pub async fn insert(&self, item: Record) -> Result<Value> {
        self.model()?.insert(item).await
    }

    pub async fn save(&self, item: Record) -> Result<Value> {
        self.model()?.save(item).await
    }

    pub async fn update(&self, values: Value, filter: Value) -> Result<Value> {
        self.model()?.update(values, filter).await
    }

    pub async fn remove(&self, item: Record) -> Result<Value> {
        self.model()?.remove(item).await
    }

    pub async fn multi_insert(&self, items: Vec<Record>) -> Result<Value> {
        self.model()?.multi_insert(items).await
    }

    pub async fn multi_save(&self, items: Vec<Record>) -> Result<Value> {
        self.model()?.multi_save(items).await
    }

    pub async fn multi_remove(&self, filter: Value) -> Result<Value> {
        self.model()?.multi_remove(filter).await
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("entity_type", &self.entity_type)
            .field("has_client", &self.client.read().unwrap().is_some())
            .field("model_built", &self.model.get().is_some())
            .finish()
    }
}
