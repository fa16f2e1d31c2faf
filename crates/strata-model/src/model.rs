//! Datastore router bound to one logical entity type

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::debug;

use strata_core::config::ConnectionConfig;
use strata_core::connector::{ConnectorProvider, Entity, StorageConnector};
use strata_core::error::{Error, Result};
use strata_core::params::GetParams;
use strata_core::record::{Record, Rows};

use crate::client_fields::{ClientFields, Role};

/// Per-entity customization of the datastore router.
pub trait ModelDef: Send + Sync {
    /// Static key of a shared datastore. `None` routes through the tenant
    /// record attached to the model instead.
    fn database_key(&self) -> Option<&str> {
        None
    }
}

/// Definition for entities living in the per-tenant datastore.
#[derive(Debug, Clone, Copy, Default)]
pub struct TenantDatastore;

impl ModelDef for TenantDatastore {}

/// Definition for entities living in a shared datastore under a fixed key.
#[derive(Debug, Clone)]
pub struct SharedDatastore {
    key: String,
}

impl SharedDatastore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl ModelDef for SharedDatastore {
    fn database_key(&self) -> Option<&str> {
        Some(&self.key)
    }
}

/// Routes datastore operations for one logical entity type.
///
/// Resolution order: a static datastore key from the definition wins
/// unconditionally; otherwise the tenant record attached via [`set_client`]
/// supplies the connection attributes; with neither, every operation fails
/// with [`Error::DatastoreConfigNotFound`].
///
/// The tenant-derived configuration is computed once per instance, under
/// the role of the first operation that needs it, and reused afterwards
/// even if the tenant record mutates.
///
/// [`set_client`]: Model::set_client
pub struct Model {
    entity_type: String,
    def: Arc<dyn ModelDef>,
    provider: Arc<dyn ConnectorProvider>,
    client_fields: Arc<ClientFields>,
    client: RwLock<Option<Record>>,
    use_read_db: AtomicBool,
    config: OnceCell<ConnectionConfig>,
}

impl Model {
    pub fn new(
        entity_type: impl Into<String>,
        def: Arc<dyn ModelDef>,
        provider: Arc<dyn ConnectorProvider>,
        client_fields: Arc<ClientFields>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            def,
            provider,
            client_fields,
            client: RwLock::new(None),
            use_read_db: AtomicBool::new(false),
            config: OnceCell::new(),
        }
    }

    /// Logical entity type this model serves.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Attach the tenant record this model routes through.
    pub fn set_client(&self, client: Record) {
        *self.client.write().unwrap() = Some(client);
    }

    /// The attached tenant record, if any.
    pub fn client(&self) -> Option<Record> {
        self.client.read().unwrap().clone()
    }

    /// The tenant-derived configuration, once one has been computed.
    pub fn cached_config(&self) -> Option<&ConnectionConfig> {
        self.config.get()
    }

    /// The connector this model currently operates against.
    pub fn db(&self) -> Result<Arc<dyn StorageConnector>> {
        if let Some(key) = self.def.database_key() {
            debug!(entity = %self.entity_type, key = %key, "using shared datastore");
            return self.provider.by_key(key);
        }

        if self.client.read().unwrap().is_some() {
            let config = self.config.get_or_init(|| self.client_config());
            return self.provider.by_config(config);
        }

        Err(Error::DatastoreConfigNotFound {
            entity: self.entity_type.clone(),
        })
    }

    fn client_config(&self) -> ConnectionConfig {
        let role = if self.use_read_db.load(Ordering::SeqCst) {
            Role::Read
        } else {
            Role::Write
        };
        let names = self.client_fields.resolve().role(role);
        debug!(entity = %self.entity_type, role = ?role, "deriving tenant datastore configuration");

        let client = self.client.read().unwrap();
        let field = |name: &str| client.as_ref().and_then(|c| c.get(name)).cloned();
        ConnectionConfig {
            host: field(&names.host),
            database: field(&names.database),
            user: field(&names.user),
            password: field(&names.password),
            port: field(&names.port),
        }
    }

    /// Fetch records. The only operation that may route to the read role.
    pub async fn get(&self, params: &GetParams) -> Result<Option<Rows>> {
        self.use_read_db.store(params.read_only, Ordering::SeqCst);
        self.db()?.get(self, params).await
    }

    /// Totals for this entity, in whatever shape the driver keeps them.
    pub async fn get_totals(&self) -> Result<Value> {
        self.db()?.get_totals(self).await
    }

    pub async fn insert(&self, item: Record) -> Result<Value> {
        self.db()?.insert(self, item).await
    }

    pub async fn save(&self, item: Record) -> Result<Value> {
        self.db()?.save(self, item).await
    }

    pub async fn update(&self, values: Value, filter: Value) -> Result<Value> {
        self.db()?.update(self, values, filter).await
    }

    pub async fn remove(&self, item: Record) -> Result<Value> {
        self.db()?.remove(self, item).await
    }

    pub async fn multi_insert(&self, items: Vec<Record>) -> Result<Value> {
        self.db()?.multi_insert(self, items).await
    }

    pub async fn multi_save(&self, items: Vec<Record>) -> Result<Value> {
        self.db()?.multi_save(self, items).await
    }

    pub async fn multi_remove(&self, filter: Value) -> Result<Value> {
        self.db()?.multi_remove(self, filter).await
    }
}

impl Entity for Model {
    fn entity_type(&self) -> &str {
        &self.entity_type
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("entity_type", &self.entity_type)
            .field("database_key", &self.def.database_key())
            .field("has_client", &self.client.read().unwrap().is_some())
            .field("config", &self.config.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use mockall::mock;
    use serde_json::json;

    use strata_core::record::record;
    use strata_core::settings::{SettingsSource, StaticSettings};

    use super::*;

    mock! {
        pub Provider {}
        impl ConnectorProvider for Provider {
            fn by_key(&self, key: &str) -> Result<Arc<dyn StorageConnector>>;
            fn by_config(&self, config: &ConnectionConfig) -> Result<Arc<dyn StorageConnector>>;
        }
    }

    mock! {
        pub Settings {}
        impl SettingsSource for Settings {
            fn get(&self, key: &str) -> Option<Value>;
        }
    }

    /// Records every call it receives and answers with a driver-shaped blob.
    struct RecordingConnector {
        calls: Mutex<Vec<String>>,
        get_answer: Option<Rows>,
    }

    impl RecordingConnector {
        fn new(get_answer: Option<Rows>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                get_answer,
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn note(&self, entity: &dyn Entity, op: &str) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{}:{}", entity.entity_type(), op));
        }
    }

    #[async_trait]
    impl StorageConnector for RecordingConnector {
        async fn get(&self, entity: &dyn Entity, params: &GetParams) -> Result<Option<Rows>> {
            self.note(entity, &format!("get page={:?}", params.page));
            Ok(self.get_answer.clone())
        }

        async fn get_totals(&self, entity: &dyn Entity) -> Result<Value> {
            self.note(entity, "get_totals");
            Ok(json!({ "total": 7 }))
        }

        async fn insert(&self, entity: &dyn Entity, item: Record) -> Result<Value> {
            self.note(entity, &format!("insert {}", Value::Object(item)));
            Ok(json!("inserted-id"))
        }

        async fn save(&self, entity: &dyn Entity, _item: Record) -> Result<Value> {
            self.note(entity, "save");
            Ok(json!("saved-id"))
        }

        async fn update(&self, entity: &dyn Entity, values: Value, filter: Value) -> Result<Value> {
            self.note(entity, &format!("update {values} where {filter}"));
            Ok(json!(1))
        }

        async fn remove(&self, entity: &dyn Entity, _item: Record) -> Result<Value> {
            self.note(entity, "remove");
            Ok(json!(true))
        }

        async fn multi_insert(&self, entity: &dyn Entity, items: Vec<Record>) -> Result<Value> {
            self.note(entity, &format!("multi_insert n={}", items.len()));
            Ok(json!(true))
        }

        async fn multi_save(&self, entity: &dyn Entity, items: Vec<Record>) -> Result<Value> {
            self.note(entity, &format!("multi_save n={}", items.len()));
            Ok(json!(true))
        }

        async fn multi_remove(&self, entity: &dyn Entity, filter: Value) -> Result<Value> {
            self.note(entity, &format!("multi_remove where {filter}"));
            Ok(json!(2))
        }
    }

    fn shared_model(provider: MockProvider) -> Model {
        // Settings must never be consulted on the static-key path.
        let settings = MockSettings::new();
        Model::new(
            "order",
            Arc::new(SharedDatastore::new("core")),
            Arc::new(provider),
            Arc::new(ClientFields::new(Arc::new(settings))),
        )
    }

    fn tenant_model(provider: MockProvider, clients: Value) -> Model {
        let settings = StaticSettings::new(json!({ "clients": clients }));
        Model::new(
            "order",
            Arc::new(TenantDatastore),
            Arc::new(provider),
            Arc::new(ClientFields::new(Arc::new(settings))),
        )
    }

    #[tokio::test]
    async fn static_key_routes_by_key_and_skips_settings() {
        let connector = RecordingConnector::new(Some(Rows::Many(Vec::new())));
        let dyn_conn: Arc<dyn StorageConnector> = connector.clone();

        let mut provider = MockProvider::new();
        provider
            .expect_by_key()
            .withf(|key| key == "core")
            .times(1)
            .returning(move |_| Ok(dyn_conn.clone()));

        let model = shared_model(provider);
        let rows = model.get(&GetParams::default()).await.unwrap();
        assert_eq!(rows, Some(Rows::Many(Vec::new())));
        assert_eq!(connector.calls(), vec!["order:get page=None"]);
    }

    #[tokio::test]
    async fn static_key_wins_even_with_a_client_attached() {
        let connector = RecordingConnector::new(None);
        let dyn_conn: Arc<dyn StorageConnector> = connector.clone();

        let mut provider = MockProvider::new();
        provider
            .expect_by_key()
            .times(1)
            .returning(move |_| Ok(dyn_conn.clone()));
        provider.expect_by_config().times(0);

        let model = shared_model(provider);
        model.set_client(record(json!({ "dbReadHost": "ignored" })));
        assert_eq!(model.get(&GetParams::default()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn without_key_or_client_every_operation_fails() {
        let model = tenant_model(MockProvider::new(), json!({}));

        let err = model.get(&GetParams::default()).await.unwrap_err();
        assert!(matches!(err, Error::DatastoreConfigNotFound { ref entity } if entity == "order"));

        assert!(model.get_totals().await.is_err());
        assert!(model.insert(Record::new()).await.is_err());
        assert!(model.save(Record::new()).await.is_err());
        assert!(model.update(json!({}), json!({})).await.is_err());
        assert!(model.remove(Record::new()).await.is_err());
        assert!(model.multi_insert(Vec::new()).await.is_err());
        assert!(model.multi_save(Vec::new()).await.is_err());
        assert!(model.multi_remove(json!({})).await.is_err());
    }

    #[tokio::test]
    async fn readonly_get_maps_the_read_role_fields() {
        let connector = RecordingConnector::new(Some(Rows::Many(Vec::new())));
        let dyn_conn: Arc<dyn StorageConnector> = connector.clone();

        let mut provider = MockProvider::new();
        provider
            .expect_by_config()
            .withf(|config| {
                config.host == Some(json!("x"))
                    && config.database == Some(json!("y"))
                    && config.user.is_none()
                    && config.password.is_none()
                    && config.port.is_none()
            })
            .times(1)
            .returning(move |_| Ok(dyn_conn.clone()));

        let model = tenant_model(provider, json!({}));
        model.set_client(record(json!({ "dbReadHost": "x", "dbReadName": "y" })));

        let params = GetParams::default().read_only();
        model.get(&params).await.unwrap();
    }

    #[tokio::test]
    async fn writes_map_the_write_role_fields() {
        let connector = RecordingConnector::new(None);
        let dyn_conn: Arc<dyn StorageConnector> = connector.clone();

        let mut provider = MockProvider::new();
        provider
            .expect_by_config()
            .withf(|config| {
                config.host == Some(json!("w.internal")) && config.port == Some(json!(5433))
            })
            .times(1)
            .returning(move |_| Ok(dyn_conn.clone()));

        let model = tenant_model(provider, json!({}));
        model.set_client(record(json!({
            "dbWriteHost": "w.internal",
            "dbWritePort": 5433,
            "dbReadHost": "r.internal"
        })));

        model.insert(record(json!({ "id": 1 }))).await.unwrap();
    }

    #[tokio::test]
    async fn custom_field_mapping_drives_the_extraction() {
        let connector = RecordingConnector::new(None);
        let dyn_conn: Arc<dyn StorageConnector> = connector.clone();

        let mut provider = MockProvider::new();
        provider
            .expect_by_config()
            .withf(|config| config.host == Some(json!("replica.example")))
            .times(1)
            .returning(move |_| Ok(dyn_conn.clone()));

        let model = tenant_model(
            provider,
            json!({ "fields": { "read": { "host": "readReplica" } } }),
        );
        model.set_client(record(json!({
            "readReplica": "replica.example",
            "dbReadHost": "shadowed"
        })));

        let params = GetParams::default().read_only();
        model.get(&params).await.unwrap();
    }

    #[tokio::test]
    async fn configuration_is_cached_under_the_first_role() {
        let connector = RecordingConnector::new(Some(Rows::Many(Vec::new())));
        let dyn_conn: Arc<dyn StorageConnector> = connector.clone();

        let mut provider = MockProvider::new();
        provider
            .expect_by_config()
            .withf(|config| config.host == Some(json!("replica")))
            .times(2)
            .returning(move |_| Ok(dyn_conn.clone()));

        let model = tenant_model(provider, json!({}));
        model.set_client(record(json!({
            "dbReadHost": "replica",
            "dbWriteHost": "primary"
        })));

        // First resolution happens under the read role and sticks.
        let params = GetParams::default().read_only();
        model.get(&params).await.unwrap();
        model.insert(Record::new()).await.unwrap();

        assert_eq!(
            model.cached_config().and_then(|c| c.host.clone()),
            Some(json!("replica"))
        );
    }

    #[tokio::test]
    async fn tenant_mutations_after_first_use_are_ignored() {
        let connector = RecordingConnector::new(Some(Rows::Many(Vec::new())));
        let dyn_conn: Arc<dyn StorageConnector> = connector.clone();

        let mut provider = MockProvider::new();
        provider
            .expect_by_config()
            .withf(|config| config.host == Some(json!("first")))
            .times(2)
            .returning(move |_| Ok(dyn_conn.clone()));

        let model = tenant_model(provider, json!({}));
        model.set_client(record(json!({ "dbWriteHost": "first" })));
        model.get(&GetParams::default()).await.unwrap();

        model.set_client(record(json!({ "dbWriteHost": "second" })));
        model.get(&GetParams::default()).await.unwrap();
    }

    #[tokio::test]
    async fn operations_forward_to_the_connector_with_the_entity() {
        let connector = RecordingConnector::new(Some(Rows::One(record(json!({ "id": 9 })))));
        let dyn_conn: Arc<dyn StorageConnector> = connector.clone();

        let mut provider = MockProvider::new();
        provider
            .expect_by_key()
            .returning(move |_| Ok(dyn_conn.clone()));

        let model = shared_model(provider);

        let params = GetParams::default().with_page(4);
        assert_eq!(
            model.get(&params).await.unwrap(),
            Some(Rows::One(record(json!({ "id": 9 }))))
        );
        assert_eq!(model.get_totals().await.unwrap(), json!({ "total": 7 }));
        assert_eq!(
            model.insert(record(json!({ "id": 1 }))).await.unwrap(),
            json!("inserted-id")
        );
        assert_eq!(
            model
                .update(json!({ "status": "done" }), json!({ "id": 1 }))
                .await
                .unwrap(),
            json!(1)
        );
        assert_eq!(
            model
                .multi_insert(vec![Record::new(), Record::new()])
                .await
                .unwrap(),
            json!(true)
        );
        assert_eq!(
            model.multi_remove(json!({ "status": "stale" })).await.unwrap(),
            json!(2)
        );

        let calls = connector.calls();
        assert_eq!(calls[0], "order:get page=Some(4)");
        assert_eq!(calls[1], "order:get_totals");
        assert_eq!(calls[2], "order:insert {\"id\":1}");
        assert_eq!(calls[3], "order:update {\"status\":\"done\"} where {\"id\":1}");
        assert_eq!(calls[4], "order:multi_insert n=2");
        assert_eq!(calls[5], "order:multi_remove where {\"status\":\"stale\"}");
    }

    #[test]
    fn client_accessor_round_trips() {
        let model = tenant_model(MockProvider::new(), json!({}));
        assert!(model.client().is_none());

        model.set_client(record(json!({ "code": "acme" })));
        assert_eq!(model.client(), Some(record(json!({ "code": "acme" }))));
    }
}
