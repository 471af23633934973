use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use prometheus_client::registry::Registry;

/// A registry that can be cloned and shared between the modules of a chain.
#[derive(Clone, Default)]
pub struct SharedRegistry(Arc<RwLock<Registry>>);

impl SharedRegistry {
    pub fn new(registry: Registry) -> Self {
        Self(Arc::new(RwLock::new(registry)))
    }

    /// The process-wide registry.
    pub fn global() -> &'static Self {
        static REGISTRY: OnceLock<SharedRegistry> = OnceLock::new();
        REGISTRY.get_or_init(SharedRegistry::default)
    }

    // Poisoning is ignored.
    fn read_guard(&self) -> RwLockReadGuard<'_, Registry> {
        self.0.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Registry> {
        self.0.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn read<A>(&self, f: impl FnOnce(&Registry) -> A) -> A {
        f(&self.read_guard())
    }

    /// Register metrics in a sub-registry whose names all start with `prefix`.
    pub fn with_prefix<A>(&self, prefix: impl AsRef<str>, f: impl FnOnce(&mut Registry) -> A) -> A {
        f(self.write_guard().sub_registry_with_prefix(prefix))
    }

    /// Render every metric in the registry in the Prometheus text format.
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        prometheus_client::encoding::text::encode(&mut buffer, &self.read_guard())?;
        Ok(buffer)
    }
}

/// Render the global registry in the Prometheus text format.
pub fn export<W: core::fmt::Write>(writer: &mut W) -> core::fmt::Result {
    SharedRegistry::global().read(|registry| prometheus_client::encoding::text::encode(writer, registry))
}
