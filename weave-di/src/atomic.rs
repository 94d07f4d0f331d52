//! Serializing wrappers for sharing registries between threads
//!
//! [`Atomic`] holds one non-reentrant lock for the whole duration of every
//! call it forwards. This protects the wrapped registry from data races but
//! does not make recursive access safe: a provider that calls back into the
//! *same* `Atomic` while it is being resolved blocks forever. Providers
//! receive the unwrapped [`Container`] for their own lookups; use that one.

use parking_lot::{Mutex, MutexGuard};

use crate::container::Container;
use crate::error::DiResult;
use crate::param::ParamContainer;
use crate::provider::{ParamDefinition, ServiceDefinition};
use crate::registry::{ParamRegistry, ServiceLocator, ServiceRegistry, TagRegistry};
use crate::service::Instance;
use crate::tagged::TaggedContainer;

/// Thread-safe service container
pub type AtomicContainer = Atomic<Container>;

/// Thread-safe parameter container
pub type AtomicParamContainer = Atomic<ParamContainer>;

/// Thread-safe tag index
pub type AtomicTaggedContainer<L> = Atomic<TaggedContainer<L>>;

/// Exclusive-access façade over a registry
#[derive(Default)]
pub struct Atomic<T> {
    inner: Mutex<T>,
}

impl<T> Atomic<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Lock the wrapped registry for a sequence of calls
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T: ServiceLocator> ServiceLocator for Atomic<T> {
    fn locate(&self, id: &str) -> DiResult<Instance> {
        self.lock().locate(id)
    }
}

impl<C: ServiceRegistry> ServiceRegistry for Atomic<C> {
    fn get(&self, id: &str) -> DiResult<Instance> {
        self.lock().get(id)
    }

    fn register(&self, id: &str, definition: ServiceDefinition) -> DiResult<()> {
        self.lock().register(id, definition)
    }

    fn override_service(&self, id: &str, definition: ServiceDefinition) {
        self.lock().override_service(id, definition)
    }

    fn has(&self, id: &str) -> bool {
        self.lock().has(id)
    }

    fn service_ids(&self) -> Vec<String> {
        self.lock().service_ids()
    }

    fn register_decorator<F>(&self, decorator: F)
    where
        F: Fn(&Container, &str, Instance) -> anyhow::Result<Instance> + Send + Sync + 'static,
    {
        self.lock().register_decorator(decorator)
    }

    fn revoke(&self, id: &str) -> DiResult<()> {
        self.lock().revoke(id)
    }

    fn remove(&self, id: &str) -> DiResult<()> {
        self.lock().remove(id)
    }
}

impl<P: ParamRegistry> ParamRegistry for Atomic<P> {
    fn get_param(&self, id: &str) -> DiResult<Instance> {
        self.lock().get_param(id)
    }

    fn register_param(&self, id: &str, definition: ParamDefinition) -> DiResult<()> {
        self.lock().register_param(id, definition)
    }

    fn override_param(&self, id: &str, definition: ParamDefinition) {
        self.lock().override_param(id, definition)
    }

    fn has_param(&self, id: &str) -> bool {
        self.lock().has_param(id)
    }

    fn param_ids(&self) -> Vec<String> {
        self.lock().param_ids()
    }
}

impl<T: TagRegistry> TagRegistry for Atomic<T> {
    fn tag_service(&self, id: &str, tag: &str, priority: i32) -> DiResult<()> {
        self.lock().tag_service(id, tag, priority)
    }

    fn override_tag_service(&self, id: &str, tag: &str, priority: i32) {
        self.lock().override_tag_service(id, tag, priority)
    }

    fn is_tagged_by(&self, id: &str, tag: &str) -> bool {
        self.lock().is_tagged_by(id, tag)
    }

    fn tagged_ids(&self, tag: &str) -> Vec<String> {
        self.lock().tagged_ids(tag)
    }

    fn get_by_tag(&self, tag: &str) -> DiResult<Vec<Instance>> {
        self.lock().get_by_tag(tag)
    }
}
