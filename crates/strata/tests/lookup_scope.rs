//! Integration tests for registry lookup scoping
//!
//! The scope is read from the environment when a root is built, so these
//! tests run serially and restore the variable before asserting.

use std::sync::Arc;

use strata::{
    ConnectionConfig, ConnectorProvider, Error, ErrorCode, PlainController, Result,
    SCOPE_ENV, SharedDatastore, StorageConnector, Strata,
};

struct NoProvider;

impl ConnectorProvider for NoProvider {
    fn by_key(&self, _key: &str) -> Result<Arc<dyn StorageConnector>> {
        Err(Error::connector("no datastores in this test"))
    }

    fn by_config(&self, _config: &ConnectionConfig) -> Result<Arc<dyn StorageConnector>> {
        Err(Error::connector("no datastores in this test"))
    }
}

fn root() -> Strata {
    Strata::new(Arc::new(NoProvider))
}

#[test]
#[serial_test::serial]
fn the_scope_variable_namespaces_every_lookup() {
    unsafe { std::env::set_var(SCOPE_ENV, "billing") };
    let strata = root();
    unsafe { std::env::remove_var(SCOPE_ENV) };

    strata.register_model("billing/order", Arc::new(SharedDatastore::new("core")));
    strata.register_controller("billing/order", Arc::new(PlainController));

    assert!(strata.model("order").is_ok());
    assert!(strata.controller("order").is_ok());

    // The scope is prepended to whatever name is asked for, so the full
    // registration key no longer resolves directly.
    let err = strata.model("billing/order").unwrap_err();
    assert_eq!(err.code(), ErrorCode::EntityTypeNotFound);
}

#[test]
#[serial_test::serial]
fn an_explicit_scope_overrides_the_environment() {
    unsafe { std::env::set_var(SCOPE_ENV, "billing") };
    let strata = root().with_scope("shipping");
    unsafe { std::env::remove_var(SCOPE_ENV) };

    strata.register_model("shipping/order", Arc::new(SharedDatastore::new("core")));
    assert!(strata.model("order").is_ok());
}

#[test]
#[serial_test::serial]
fn an_empty_scope_variable_leaves_lookups_unscoped() {
    unsafe { std::env::set_var(SCOPE_ENV, "") };
    let strata = root();
    unsafe { std::env::remove_var(SCOPE_ENV) };

    strata.register_model("order", Arc::new(SharedDatastore::new("core")));
    assert!(strata.model("order").is_ok());
}

#[test]
#[serial_test::serial]
fn without_a_scope_names_resolve_verbatim() {
    unsafe { std::env::remove_var(SCOPE_ENV) };
    let strata = root();

    strata.register_model("order", Arc::new(SharedDatastore::new("core")));
    assert!(strata.model("order").is_ok());
    assert!(strata.model("billing/order").is_err());
}
