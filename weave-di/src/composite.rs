//! One façade over a service, a parameter and a tag registry

use std::ops::Deref;
use std::rc::Rc;
use std::sync::Arc;

use crate::atomic::{AtomicContainer, AtomicParamContainer, AtomicTaggedContainer};
use crate::container::Container;
use crate::error::DiResult;
use crate::param::ParamContainer;
use crate::provider::{ParamDefinition, ServiceDefinition};
use crate::registry::{ParamRegistry, ServiceRegistry, TagRegistry};
use crate::service::Instance;
use crate::tagged::TaggedContainer;

/// Single-threaded application container
pub type LocalComposite = Composite<Rc<Container>, ParamContainer, TaggedContainer<Rc<Container>>>;

/// Thread-safe application container
pub type SharedComposite = Composite<
    Arc<AtomicContainer>,
    AtomicParamContainer,
    AtomicTaggedContainer<Arc<AtomicContainer>>,
>;

/// Delegates each registry trait to one of its parts.
///
/// `services` is held through a pointer so the tag index can resolve
/// through the very same service registry.
pub struct Composite<S, P, T> {
    services: S,
    params: P,
    tags: T,
}

impl<S, P, T> Composite<S, P, T> {
    pub fn new(services: S, params: P, tags: T) -> Self {
        Self {
            services,
            params,
            tags,
        }
    }

    pub fn services(&self) -> &S {
        &self.services
    }

    pub fn params(&self) -> &P {
        &self.params
    }

    pub fn tags(&self) -> &T {
        &self.tags
    }
}

impl LocalComposite {
    pub fn local() -> Self {
        let services = Rc::new(Container::new());
        let tags = TaggedContainer::new(services.clone());
        Self::new(services, ParamContainer::new(), tags)
    }
}

impl SharedComposite {
    pub fn shared() -> Self {
        let services = Arc::new(AtomicContainer::new(Container::new()));
        let tags = AtomicTaggedContainer::new(TaggedContainer::new(services.clone()));
        Self::new(services, AtomicParamContainer::new(ParamContainer::new()), tags)
    }
}

impl<S, P, T> ServiceRegistry for Composite<S, P, T>
where
    S: Deref,
    S::Target: ServiceRegistry,
{
    fn get(&self, id: &str) -> DiResult<Instance> {
        self.services.get(id)
    }

    fn register(&self, id: &str, definition: ServiceDefinition) -> DiResult<()> {
        self.services.register(id, definition)
    }

    fn override_service(&self, id: &str, definition: ServiceDefinition) {
        self.services.override_service(id, definition)
    }

    fn has(&self, id: &str) -> bool {
        self.services.has(id)
    }

    fn service_ids(&self) -> Vec<String> {
        self.services.service_ids()
    }

    fn register_decorator<F>(&self, decorator: F)
    where
        F: Fn(&Container, &str, Instance) -> anyhow::Result<Instance> + Send + Sync + 'static,
    {
        self.services.register_decorator(decorator)
    }

    fn revoke(&self, id: &str) -> DiResult<()> {
        self.services.revoke(id)
    }

    fn remove(&self, id: &str) -> DiResult<()> {
        self.services.remove(id)
    }
}

impl<S, P: ParamRegistry, T> ParamRegistry for Composite<S, P, T> {
    fn get_param(&self, id: &str) -> DiResult<Instance> {
        self.params.get_param(id)
    }

    fn register_param(&self, id: &str, definition: ParamDefinition) -> DiResult<()> {
        self.params.register_param(id, definition)
    }

    fn override_param(&self, id: &str, definition: ParamDefinition) {
        self.params.override_param(id, definition)
    }

    fn has_param(&self, id: &str) -> bool {
        self.params.has_param(id)
    }

    fn param_ids(&self) -> Vec<String> {
        self.params.param_ids()
    }
}

impl<S, P, T: TagRegistry> TagRegistry for Composite<S, P, T> {
    fn tag_service(&self, id: &str, tag: &str, priority: i32) -> DiResult<()> {
        self.tags.tag_service(id, tag, priority)
    }

    fn override_tag_service(&self, id: &str, tag: &str, priority: i32) {
        self.tags.override_tag_service(id, tag, priority)
    }

    fn is_tagged_by(&self, id: &str, tag: &str) -> bool {
        self.tags.is_tagged_by(id, tag)
    }

    fn tagged_ids(&self, tag: &str) -> Vec<String> {
        self.tags.tagged_ids(tag)
    }

    fn get_by_tag(&self, tag: &str) -> DiResult<Vec<Instance>> {
        self.tags.get_by_tag(tag)
    }
}
