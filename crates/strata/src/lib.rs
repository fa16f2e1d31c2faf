//! Strata: tenant-aware data access behind pluggable storage connectors
//!
//! Applications describe each logical entity twice: a model definition that
//! says where the entity's records live (a shared datastore key, or the
//! per-tenant datastore), and a controller definition that says how fetched
//! records are shaped on their way out. [`Strata`] is the composition root
//! holding the connector provider, the settings source and one registry per
//! entity kind.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use strata::{GetParams, PlainController, Strata, TenantDatastore, record};
//!
//! # fn connector_provider() -> Arc<dyn strata::ConnectorProvider> { unimplemented!() }
//! # async fn run() -> strata::Result<()> {
//! let strata = Strata::new(connector_provider());
//! strata.register_model("order", Arc::new(TenantDatastore));
//! strata.register_controller("order", Arc::new(PlainController));
//!
//! let orders = strata.controller("order")?;
//! orders.set_client(record(json!({ "dbReadHost": "replica.internal" })));
//!
//! let result = orders.get(GetParams::default().with_limit(50)).await?;
//! # let _ = result;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::debug;

pub use strata_controller::controller::Controller;
pub use strata_controller::hooks::{
    ControllerDef, DEFAULT_PAGE_LIMIT, Formatter, PlainController, PostProcessor,
};
pub use strata_core::config::ConnectionConfig;
pub use strata_core::connector::{ConnectorProvider, Entity, StorageConnector};
pub use strata_core::error::{BoxError, Error, ErrorCode, Result};
pub use strata_core::params::GetParams;
pub use strata_core::record::{GetResult, Record, Rows, record};
pub use strata_core::registry::{EntityKind, Registry};
pub use strata_core::settings::{NullSettings, SettingsSource, StaticSettings};
pub use strata_core::utils::change_keys;
pub use strata_model::client_fields::{ClientFields, FieldMap, Role, RoleFields};
pub use strata_model::factory::ModelFactory;
pub use strata_model::model::{Model, ModelDef, SharedDatastore, TenantDatastore};

/// Environment variable that sets the registry lookup scope.
pub const SCOPE_ENV: &str = "STRATA_SCOPE";

/// Composition root for the data-access layer.
///
/// Cloning is cheap and every clone shares the same registries, provider
/// and tenant field mapping.
#[derive(Clone)]
pub struct Strata {
    provider: Arc<dyn ConnectorProvider>,
    settings: Arc<dyn SettingsSource>,
    scope: Option<String>,
    models: Arc<ModelFactory>,
    controllers: Arc<Registry<dyn ControllerDef>>,
}

impl Strata {
    /// A root over `provider`, with no settings and the lookup scope taken
    /// from [`SCOPE_ENV`] when that variable is set and non-empty.
    pub fn new(provider: Arc<dyn ConnectorProvider>) -> Self {
        let scope = std::env::var(SCOPE_ENV).ok().filter(|scope| !scope.is_empty());
        if let Some(scope) = &scope {
            debug!(scope = %scope, "lookup scope taken from the environment");
        }
        Self::assemble(provider, Arc::new(NullSettings), scope)
    }

    /// Replace the settings source. The registries are rebuilt, so call this
    /// before registering entities.
    pub fn with_settings(self, settings: Arc<dyn SettingsSource>) -> Self {
        Self::assemble(self.provider, settings, self.scope)
    }

    /// Set the lookup scope explicitly, overriding the environment. The
    /// registries are rebuilt, so call this before registering entities.
    pub fn with_scope(self, scope: impl Into<String>) -> Self {
        Self::assemble(self.provider, self.settings, Some(scope.into()))
    }

    fn assemble(
        provider: Arc<dyn ConnectorProvider>,
        settings: Arc<dyn SettingsSource>,
        scope: Option<String>,
    ) -> Self {
        let models = Arc::new(ModelFactory::new(
            Arc::clone(&provider),
            Arc::clone(&settings),
            scope.clone(),
        ));
        let controllers = Arc::new(Registry::scoped(EntityKind::Controller, scope.clone()));
        Self {
            provider,
            settings,
            scope,
            models,
            controllers,
        }
    }

    /// Register a model definition under `name`.
    pub fn register_model(&self, name: impl Into<String>, def: Arc<dyn ModelDef>) {
        self.models.register(name, def);
    }

    /// Register a model factory that may decline to produce a definition.
    pub fn register_model_factory(
        &self,
        name: impl Into<String>,
        factory: impl Fn() -> Option<Arc<dyn ModelDef>> + Send + Sync + 'static,
    ) {
        self.models.register_factory(name, factory);
    }

    /// Register a controller definition under `name`.
    pub fn register_controller(&self, name: impl Into<String>, def: Arc<dyn ControllerDef>) {
        self.controllers.register(name, def);
    }

    /// Register a controller factory that may decline to produce a
    /// definition.
    pub fn register_controller_factory(
        &self,
        name: impl Into<String>,
        factory: impl Fn() -> Option<Arc<dyn ControllerDef>> + Send + Sync + 'static,
    ) {
        self.controllers.register_factory(name, factory);
    }

    /// A fresh model for the entity registered under `name`.
    pub fn model(&self, name: &str) -> Result<Model> {
        self.models.model(name)
    }

    /// A fresh controller for the entity registered under `name`. Its model
    /// resolves lazily under the same name.
    pub fn controller(&self, name: &str) -> Result<Controller> {
        let def = self.controllers.resolve(name)?;
        Ok(Controller::new(name, def, Arc::clone(&self.models)))
    }

    /// The model factory shared by every controller this root vends.
    pub fn models(&self) -> &Arc<ModelFactory> {
        &self.models
    }
}

impl fmt::Debug for Strata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strata")
            .field("scope", &self.scope)
            .field("models", &self.models)
            .field("controllers", &self.controllers)
            .finish()
    }
}
