//! Model factory
//!
//! Vends fresh [`Model`] instances for registered entity definitions,
//! sharing one connector provider and one tenant field mapping across all
//! of them.

use std::fmt;
use std::sync::Arc;

use strata_core::connector::ConnectorProvider;
use strata_core::error::Result;
use strata_core::registry::{EntityKind, Registry};
use strata_core::settings::SettingsSource;

use crate::client_fields::ClientFields;
use crate::model::{Model, ModelDef};

pub struct ModelFactory {
    registry: Registry<dyn ModelDef>,
    provider: Arc<dyn ConnectorProvider>,
    client_fields: Arc<ClientFields>,
}

impl ModelFactory {
    pub fn new(
        provider: Arc<dyn ConnectorProvider>,
        settings: Arc<dyn SettingsSource>,
        scope: Option<String>,
    ) -> Self {
        Self {
            registry: Registry::scoped(EntityKind::Model, scope),
            provider,
            client_fields: Arc::new(ClientFields::new(settings)),
        }
    }

    /// Register a model definition under `name`.
    pub fn register(&self, name: impl Into<String>, def: Arc<dyn ModelDef>) {
        self.registry.register(name, def);
    }

    /// Register a factory that may decline to produce a definition.
    pub fn register_factory(
        &self,
        name: impl Into<String>,
        factory: impl Fn() -> Option<Arc<dyn ModelDef>> + Send + Sync + 'static,
    ) {
        self.registry.register_factory(name, factory);
    }

    /// A fresh model for the entity registered under `name`.
    pub fn model(&self, name: &str) -> Result<Model> {
        let def = self.registry.resolve(name)?;
        Ok(Model::new(
            name,
            def,
            Arc::clone(&self.provider),
            Arc::clone(&self.client_fields),
        ))
    }

    /// Whether a definition is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// The tenant field mapping shared by every model.
    pub fn client_fields(&self) -> &Arc<ClientFields> {
        &self.client_fields
    }
}

impl fmt::Debug for ModelFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelFactory")
            .field("registry", &self.registry)
            .field("client_fields", &self.client_fields)
            .finish()
    }
}
