//! Entity registry
//!
//! Entities are looked up by name through an explicit registry populated at
//! startup. A lookup miss raises [`Error::EntityTypeNotFound`]; a registered
//! factory that declines to produce a definition raises
//! [`Error::InvalidEntityClass`].

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// The entity kinds with independent registration namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Model,
    Controller,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Model => write!(f, "Model"),
            EntityKind::Controller => write!(f, "Controller"),
        }
    }
}

/// A registered factory, producing a definition or `None` when one cannot
/// be constructed.
pub type EntityFactory<T> = Arc<dyn Fn() -> Option<Arc<T>> + Send + Sync>;

/// Name-to-factory registry for one entity kind.
///
/// Lookups optionally run under a scope: a registry scoped to `"billing"`
/// resolves `"order"` against the key `"billing/order"`. Registration keys
/// are never rewritten; processes hosting several services register fully
/// qualified names.
pub struct Registry<T: ?Sized> {
    kind: EntityKind,
    scope: Option<String>,
    entries: DashMap<String, EntityFactory<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> Registry<T> {
    pub fn new(kind: EntityKind) -> Self {
        Self::scoped(kind, None)
    }

    /// A registry whose lookups are namespaced under `scope`.
    pub fn scoped(kind: EntityKind, scope: Option<String>) -> Self {
        Self {
            kind,
            scope,
            entries: DashMap::new(),
        }
    }

    /// The kind this registry serves.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Register a ready definition under `name`. Registering twice under the
    /// same name replaces the earlier entry.
    pub fn register(&self, name: impl Into<String>, def: Arc<T>) {
        self.register_factory(name, move || Some(Arc::clone(&def)));
    }

    /// Register a factory that may decline to produce a definition.
    pub fn register_factory(
        &self,
        name: impl Into<String>,
        factory: impl Fn() -> Option<Arc<T>> + Send + Sync + 'static,
    ) {
        let name = name.into();
        debug!(kind = %self.kind, name = %name, "registering entity");
        self.entries.insert(name, Arc::new(factory));
    }

    /// Resolve `name` under the active scope and run its factory.
    pub fn resolve(&self, name: &str) -> Result<Arc<T>> {
        let key = self.lookup_key(name);
        let factory = self
            .entries
            .get(key.as_ref())
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| Error::EntityTypeNotFound {
                kind: self.kind,
                name: name.to_string(),
            })?;

        factory().ok_or_else(|| {
            warn!(kind = %self.kind, name = %name, "registered factory produced no definition");
            Error::InvalidEntityClass {
                kind: self.kind,
                name: name.to_string(),
            }
        })
    }

    /// Whether `name` has an entry under the active scope.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(self.lookup_key(name).as_ref())
    }

    fn lookup_key<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match &self.scope {
            Some(scope) => Cow::Owned(format!("{scope}/{name}")),
            None => Cow::Borrowed(name),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("kind", &self.kind)
            .field("scope", &self.scope)
            .field("entries", &self.entries.len())
            .finish()
    }
}
