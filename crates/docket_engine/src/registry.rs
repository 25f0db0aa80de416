use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use docket_base::pal::http::HttpService;

use crate::model::DocumentModel;
use crate::unit::HostBinding;

/* 📖 # How is "one endpoint per slot" guaranteed?

The registry is a single `HashMap` behind a mutex. Claiming a key is one
insert-if-absent on that map, performed while the lock is held, so two units racing
for the same (server, host, path) can never both win: whoever takes the lock first
inserts, everyone after sees the occupied entry. Different keys contend only for the
lock itself, never for each other's entries.

Bindings live until their owner undeploys and `release_owned_by` removes them.
*/

/// Endpoint slot: server, virtual host and URL path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistrationKey {
    pub server: String,
    pub host: String,
    pub path: String,
}

impl RegistrationKey {
    pub fn new(binding: &HostBinding, path: impl Into<String>) -> Self {
        Self {
            server: binding.server.clone(),
            host: binding.host.clone(),
            path: path.into(),
        }
    }
}

impl fmt::Display for RegistrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}{}", self.server, self.host, self.path)
    }
}

/// A live endpoint.
#[derive(Clone)]
pub struct EndpointBinding {
    pub key: RegistrationKey,
    pub document: Arc<DocumentModel>,
    pub handler: Arc<dyn HttpService>,
    /// Name of the unit that claimed the key.
    pub owner: String,
}

impl fmt::Debug for EndpointBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointBinding")
            .field("key", &self.key)
            .field("owner", &self.owner)
            .field("sections", &self.document.len())
            .finish_non_exhaustive()
    }
}

/// Result of a claim attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Registered,
    AlreadyTaken { owner: String },
}

/// Process-wide set of live endpoint bindings. Clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    bindings: Arc<Mutex<HashMap<RegistrationKey, EndpointBinding>>>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `key` for `owner` unless it is already bound. An existing binding
    /// is never replaced.
    pub fn register(
        &self,
        key: RegistrationKey,
        owner: &str,
        document: Arc<DocumentModel>,
        handler: Arc<dyn HttpService>,
    ) -> Registration {
        match self.bindings.lock().entry(key) {
            Entry::Occupied(existing) => Registration::AlreadyTaken {
                owner: existing.get().owner.clone(),
            },
            Entry::Vacant(slot) => {
                debug!(key = %slot.key(), owner, "claimed endpoint");
                let key = slot.key().clone();
                slot.insert(EndpointBinding {
                    key,
                    document,
                    handler,
                    owner: owner.to_string(),
                });
                Registration::Registered
            }
        }
    }

    pub fn lookup(&self, key: &RegistrationKey) -> Option<EndpointBinding> {
        self.bindings.lock().get(key).cloned()
    }

    /// Removes every binding owned by `owner`, returning their keys.
    pub fn release_owned_by(&self, owner: &str) -> Vec<RegistrationKey> {
        let mut released = vec![];
        self.bindings.lock().retain(|key, binding| {
            if binding.owner == owner {
                released.push(key.clone());
                false
            } else {
                true
            }
        });
        for key in &released {
            debug!(%key, owner, "released endpoint");
        }
        released
    }

    pub fn len(&self) -> usize {
        self.bindings.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.lock().is_empty()
    }
}
