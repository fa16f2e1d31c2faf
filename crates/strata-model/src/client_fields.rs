//! Tenant field mapping
//!
//! Tenant records carry their datastore connection attributes under
//! configurable field names. The mapping is resolved once per application
//! from the `"clients"` settings blob and memoized; anything missing or
//! malformed degrades to the built-in defaults, never to an error.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::{debug, warn};

use strata_core::settings::SettingsSource;

/// Read or write role of a datastore operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Read,
    Write,
}

/// Tenant-record field names for one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleFields {
    pub host: String,
    pub database: String,
    pub user: String,
    pub password: String,
    pub port: String,
}

impl RoleFields {
    fn defaults(role: Role) -> Self {
        match role {
            Role::Read => Self {
                host: "dbReadHost".into(),
                database: "dbReadName".into(),
                user: "dbReadUser".into(),
                password: "dbReadPassword".into(),
                port: "dbReadPort".into(),
            },
            Role::Write => Self {
                host: "dbWriteHost".into(),
                database: "dbWriteName".into(),
                user: "dbWriteUser".into(),
                password: "dbWritePassword".into(),
                port: "dbWritePort".into(),
            },
        }
    }

    fn from_section(section: Option<&serde_json::Map<String, Value>>, role: Role) -> Self {
        let defaults = Self::defaults(role);
        Self {
            host: field_name(section, "host", defaults.host),
            database: field_name(section, "database", defaults.database),
            user: field_name(section, "user", defaults.user),
            password: field_name(section, "password", defaults.password),
            port: field_name(section, "port", defaults.port),
        }
    }
}

/// An override must be a non-empty string; anything else falls back to the
/// default field name.
fn field_name(
    section: Option<&serde_json::Map<String, Value>>,
    key: &str,
    default: String,
) -> String {
    section
        .and_then(|map| map.get(key))
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .unwrap_or(default)
}

/// The full tenant field mapping, one table per role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    pub read: RoleFields,
    pub write: RoleFields,
}

impl FieldMap {
    /// The field table for `role`.
    pub fn role(&self, role: Role) -> &RoleFields {
        match role {
            Role::Read => &self.read,
            Role::Write => &self.write,
        }
    }
}

/// Application-lifetime resolver for the tenant field mapping.
pub struct ClientFields {
    settings: Arc<dyn SettingsSource>,
    fields: OnceCell<FieldMap>,
}

impl ClientFields {
    pub fn new(settings: Arc<dyn SettingsSource>) -> Self {
        Self {
            settings,
            fields: OnceCell::new(),
        }
    }

    /// The resolved mapping, computed from the `"clients"` settings blob on
    /// first use and memoized for the life of this instance.
    pub fn resolve(&self) -> &FieldMap {
        self.fields.get_or_init(|| self.build())
    }

    /// Drop the memo so the next `resolve` re-reads settings.
    pub fn reset(&mut self) {
        self.fields.take();
    }

    fn build(&self) -> FieldMap {
        let clients = self.settings.get("clients");
        let fields = match clients.as_ref().and_then(|blob| blob.get("fields")) {
            Some(Value::Object(map)) => Some(map),
            Some(_) => {
                warn!("clients settings hold a malformed fields table, using default field names");
                None
            }
            None => None,
        };

        let map = FieldMap {
            read: RoleFields::from_section(role_section(fields, "read"), Role::Read),
            write: RoleFields::from_section(role_section(fields, "write"), Role::Write),
        };
        debug!(customized = fields.is_some(), "resolved tenant field mapping");
        map
    }
}

fn role_section<'a>(
    fields: Option<&'a serde_json::Map<String, Value>>,
    role: &str,
) -> Option<&'a serde_json::Map<String, Value>> {
    fields.and_then(|map| map.get(role)).and_then(Value::as_object)
}

impl fmt::Debug for ClientFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientFields")
            .field("fields", &self.fields.get())
            .finish()
    }
}
