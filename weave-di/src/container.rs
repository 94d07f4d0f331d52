//! Core container implementation

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::cycle::CycleTracker;
use crate::decorator::DecoratorPipeline;
use crate::error::{fail, panic_to_error, take_circular, Action, DiError, DiResult, EntryKind};
use crate::provider::ServiceDefinition;
use crate::service::{downcast, Instance, Scope, Service};

type NestedCache = RefCell<Option<FxHashMap<String, Instance>>>;

/// A registered definition plus its cached instance
struct ServiceEntry {
    definition: ServiceDefinition,
    instance: Option<Instance>,
}

impl ServiceEntry {
    fn new(definition: ServiceDefinition) -> Self {
        Self {
            definition,
            instance: None,
        }
    }
}

/// Service container.
///
/// Maps ids to [`ServiceDefinition`]s and materializes them according to
/// their [`Scope`]. Every operation takes `&self` so providers can resolve
/// their own dependencies through the container they receive.
///
/// The container is `Send` but not `Sync`. Wrap it in
/// [`AtomicContainer`](crate::atomic::AtomicContainer) to share it between
/// threads.
#[derive(Default)]
pub struct Container {
    services: RefCell<FxHashMap<String, ServiceEntry>>,
    tracker: CycleTracker,
    decorators: DecoratorPipeline,
    /// Instances shared within the current top-level resolution
    nested: NestedCache,
}

impl Container {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a container from a set of definitions
    pub fn from_definitions<I, S>(definitions: I) -> Self
    where
        I: IntoIterator<Item = (S, ServiceDefinition)>,
        S: Into<String>,
    {
        let services = definitions
            .into_iter()
            .map(|(id, definition)| (id.into(), ServiceEntry::new(definition)))
            .collect();

        Self {
            services: RefCell::new(services),
            ..Self::default()
        }
    }

    /// Register a new service, failing when the id is taken
    pub fn register(&self, id: &str, definition: ServiceDefinition) -> DiResult<()> {
        let mut services = self.services.borrow_mut();
        if services.contains_key(id) {
            return Err(DiError::already_registered(EntryKind::Service, id));
        }

        debug!("Registered service: {} ({})", id, definition.scope);
        services.insert(id.to_string(), ServiceEntry::new(definition));
        Ok(())
    }

    /// Register or replace a service, dropping any cached instance
    pub fn override_service(&self, id: &str, definition: ServiceDefinition) {
        debug!("Overrode service: {} ({})", id, definition.scope);
        self.services
            .borrow_mut()
            .insert(id.to_string(), ServiceEntry::new(definition));
    }

    /// Check if a service is registered
    pub fn has(&self, id: &str) -> bool {
        self.services.borrow().contains_key(id)
    }

    /// All registered ids in lexicographic order
    pub fn service_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.services.borrow().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Append a decorator applied to every service built from now on
    pub fn register_decorator<F>(&self, decorator: F)
    where
        F: Fn(&Container, &str, Instance) -> anyhow::Result<Instance> + Send + Sync + 'static,
    {
        self.decorators.push(decorator);
    }

    /// Number of registered decorators
    pub fn decorator_count(&self) -> usize {
        self.decorators.len()
    }

    /// Resolve a service
    pub fn get(&self, id: &str) -> DiResult<Instance> {
        let mut frame = self.tracker.enter(id);
        if let Some(chain) = frame.take_cycle() {
            warn!("Circular dependency detected: {}", chain.join(" -> "));
            return Err(DiError::CircularDependency { chain });
        }

        if let Some(cached) = self.nested_cached(id) {
            trace!("Nested cache hit for service: {}", id);
            return Ok(cached);
        }

        let definition = {
            let services = self.services.borrow();
            let entry = services
                .get(id)
                .ok_or_else(|| DiError::not_found(EntryKind::Service, id))?;
            if let Some(cached) = &entry.instance {
                trace!("Cache hit for service: {}", id);
                return Ok(cached.clone());
            }
            entry.definition.clone()
        };

        let _nested = NestedScope::open(&self.nested);

        trace!("Creating service: {}", id);
        let service = catch("Provider", id, || (definition.provider)(self))
            .map_err(|cause| {
                self.failure(cause, |cause| DiError::ConstructionFailed {
                    id: id.to_string(),
                    cause,
                })
            })?;

        let service = catch("Decorator", id, || self.decorators.apply(self, id, service))
            .map_err(|cause| {
                self.failure(cause, |cause| DiError::DecorationFailed {
                    id: id.to_string(),
                    cause,
                })
            })?;

        match definition.scope {
            Scope::Shared => {
                // The provider may have replaced its own definition meanwhile.
                if let Some(entry) = self.services.borrow_mut().get_mut(id) {
                    if Arc::ptr_eq(&entry.definition.provider, &definition.provider) {
                        entry.instance = Some(service.clone());
                    }
                }
            }
            Scope::NestedShared => {
                if let Some(cache) = self.nested.borrow_mut().as_mut() {
                    cache.insert(id.to_string(), service.clone());
                }
            }
            Scope::NonShared => {}
        }

        Ok(service)
    }

    /// Resolve a service, panicking on failure
    pub fn must_get(&self, id: &str) -> Instance {
        self.get(id).unwrap_or_else(|err| fail(err))
    }

    /// Resolve a service and downcast it to its concrete type
    pub fn get_as<T: Service>(&self, id: &str) -> DiResult<Arc<T>> {
        downcast(EntryKind::Service, id, self.get(id)?)
    }

    /// Drop the cached instance of a service, keeping its definition
    pub fn revoke(&self, id: &str) -> DiResult<()> {
        let mut services = self.services.borrow_mut();
        let entry = services
            .get_mut(id)
            .ok_or_else(|| DiError::missing(Action::Revoke, EntryKind::Service, id))?;

        entry.instance = None;
        debug!("Revoked service: {}", id);
        Ok(())
    }

    /// Revoke a service, panicking on failure
    pub fn must_revoke(&self, id: &str) {
        if let Err(err) = self.revoke(id) {
            fail(err);
        }
    }

    /// Remove a service completely
    pub fn remove(&self, id: &str) -> DiResult<()> {
        self.services
            .borrow_mut()
            .remove(id)
            .ok_or_else(|| DiError::missing(Action::Remove, EntryKind::Service, id))?;

        debug!("Removed service: {}", id);
        Ok(())
    }

    /// Remove a service, panicking on failure
    pub fn must_remove(&self, id: &str) {
        if let Err(err) = self.remove(id) {
            fail(err);
        }
    }

    fn nested_cached(&self, id: &str) -> Option<Instance> {
        self.nested.borrow().as_ref()?.get(id).cloned()
    }

    /// Only the outermost frame adds context to a circular dependency
    fn failure(
        &self,
        cause: anyhow::Error,
        wrap: impl FnOnce(anyhow::Error) -> DiError,
    ) -> DiError {
        match take_circular(cause) {
            Ok(circular) if self.tracker.depth() > 1 => circular,
            Ok(circular) => wrap(circular.into()),
            Err(cause) => wrap(cause),
        }
    }
}

/// Run a provider or decorator for `id`, turning a panic into an error
pub(crate) fn catch<T>(
    stage: &str,
    id: &str,
    f: impl FnOnce() -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        warn!("{} panicked for {}", stage, id);
        Err(panic_to_error(payload))
    })
}

/// Guard over the nested-shared cache of one top-level resolution.
///
/// The first resolution that finds no active cache opens one and clears it
/// when it returns.
struct NestedScope<'a> {
    slot: &'a NestedCache,
    owner: bool,
}

impl<'a> NestedScope<'a> {
    fn open(slot: &'a NestedCache) -> Self {
        let mut cache = slot.borrow_mut();
        let owner = cache.is_none();
        if owner {
            debug!("Opened nested scope");
            *cache = Some(FxHashMap::default());
        }
        Self { slot, owner }
    }
}

impl Drop for NestedScope<'_> {
    fn drop(&mut self) {
        if self.owner {
            debug!("Closed nested scope");
            self.slot.borrow_mut().take();
        }
    }
}
