//! Strata Model Layer
//!
//! Models route datastore operations for one logical entity type: they pick
//! a connector (a shared datastore by static key, or the tenant datastore
//! derived from an attached tenant record) and delegate every operation to
//! it. The tenant field mapping that names which tenant-record fields hold
//! connection attributes lives here too.

pub mod client_fields;
pub mod factory;
pub mod model;

pub use client_fields::{ClientFields, FieldMap, Role, RoleFields};
pub use factory::ModelFactory;
pub use model::{Model, ModelDef, SharedDatastore, TenantDatastore};
