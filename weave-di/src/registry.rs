//! Registry interfaces shared by plain and atomic containers
//!
//! The three registry traits use disjoint method names so one type can
//! implement all of them (see [`Composite`](crate::composite::Composite))
//! without ambiguous calls.

use std::rc::Rc;
use std::sync::Arc;

use crate::container::Container;
use crate::error::{fail, DiResult, EntryKind};
use crate::param::ParamContainer;
use crate::provider::{ParamDefinition, ServiceDefinition};
use crate::service::{downcast, Instance, Service};

/// The single capability a tag index needs from its service registry
pub trait ServiceLocator {
    fn locate(&self, id: &str) -> DiResult<Instance>;
}

impl ServiceLocator for Container {
    fn locate(&self, id: &str) -> DiResult<Instance> {
        self.get(id)
    }
}

impl<T: ServiceLocator + ?Sized> ServiceLocator for &T {
    fn locate(&self, id: &str) -> DiResult<Instance> {
        (**self).locate(id)
    }
}

impl<T: ServiceLocator + ?Sized> ServiceLocator for Rc<T> {
    fn locate(&self, id: &str) -> DiResult<Instance> {
        (**self).locate(id)
    }
}

impl<T: ServiceLocator + ?Sized> ServiceLocator for Arc<T> {
    fn locate(&self, id: &str) -> DiResult<Instance> {
        (**self).locate(id)
    }
}

/// Service registry operations
pub trait ServiceRegistry {
    fn get(&self, id: &str) -> DiResult<Instance>;

    fn register(&self, id: &str, definition: ServiceDefinition) -> DiResult<()>;

    fn override_service(&self, id: &str, definition: ServiceDefinition);

    fn has(&self, id: &str) -> bool;

    fn service_ids(&self) -> Vec<String>;

    fn register_decorator<F>(&self, decorator: F)
    where
        F: Fn(&Container, &str, Instance) -> anyhow::Result<Instance> + Send + Sync + 'static;

    fn revoke(&self, id: &str) -> DiResult<()>;

    fn remove(&self, id: &str) -> DiResult<()>;

    fn must_get(&self, id: &str) -> Instance {
        self.get(id).unwrap_or_else(|err| fail(err))
    }

    fn get_as<T: Service>(&self, id: &str) -> DiResult<Arc<T>>
    where
        Self: Sized,
    {
        downcast(EntryKind::Service, id, self.get(id)?)
    }

    fn must_revoke(&self, id: &str) {
        if let Err(err) = self.revoke(id) {
            fail(err);
        }
    }

    fn must_remove(&self, id: &str) {
        if let Err(err) = self.remove(id) {
            fail(err);
        }
    }
}

impl ServiceRegistry for Container {
    fn get(&self, id: &str) -> DiResult<Instance> {
        Container::get(self, id)
    }

    fn register(&self, id: &str, definition: ServiceDefinition) -> DiResult<()> {
        Container::register(self, id, definition)
    }

    fn override_service(&self, id: &str, definition: ServiceDefinition) {
        Container::override_service(self, id, definition)
    }

    fn has(&self, id: &str) -> bool {
        Container::has(self, id)
    }

    fn service_ids(&self) -> Vec<String> {
        Container::service_ids(self)
    }

    fn register_decorator<F>(&self, decorator: F)
    where
        F: Fn(&Container, &str, Instance) -> anyhow::Result<Instance> + Send + Sync + 'static,
    {
        Container::register_decorator(self, decorator)
    }

    fn revoke(&self, id: &str) -> DiResult<()> {
        Container::revoke(self, id)
    }

    fn remove(&self, id: &str) -> DiResult<()> {
        Container::remove(self, id)
    }
}

/// Parameter registry operations
pub trait ParamRegistry {
    fn get_param(&self, id: &str) -> DiResult<Instance>;

    fn register_param(&self, id: &str, definition: ParamDefinition) -> DiResult<()>;

    fn override_param(&self, id: &str, definition: ParamDefinition);

    fn has_param(&self, id: &str) -> bool;

    fn param_ids(&self) -> Vec<String>;

    fn must_get_param(&self, id: &str) -> Instance {
        self.get_param(id).unwrap_or_else(|err| fail(err))
    }

    fn get_param_as<T: Service>(&self, id: &str) -> DiResult<Arc<T>>
    where
        Self: Sized,
    {
        downcast(EntryKind::Parameter, id, self.get_param(id)?)
    }
}

impl ParamRegistry for ParamContainer {
    fn get_param(&self, id: &str) -> DiResult<Instance> {
        ParamContainer::get_param(self, id)
    }

    fn register_param(&self, id: &str, definition: ParamDefinition) -> DiResult<()> {
        ParamContainer::register_param(self, id, definition)
    }

    fn override_param(&self, id: &str, definition: ParamDefinition) {
        ParamContainer::override_param(self, id, definition)
    }

    fn has_param(&self, id: &str) -> bool {
        ParamContainer::has_param(self, id)
    }

    fn param_ids(&self) -> Vec<String> {
        ParamContainer::param_ids(self)
    }
}

/// Tag index operations
pub trait TagRegistry {
    fn tag_service(&self, id: &str, tag: &str, priority: i32) -> DiResult<()>;

    fn override_tag_service(&self, id: &str, tag: &str, priority: i32);

    fn is_tagged_by(&self, id: &str, tag: &str) -> bool;

    fn tagged_ids(&self, tag: &str) -> Vec<String>;

    fn get_by_tag(&self, tag: &str) -> DiResult<Vec<Instance>>;

    fn must_get_by_tag(&self, tag: &str) -> Vec<Instance> {
        self.get_by_tag(tag).unwrap_or_else(|err| fail(err))
    }
}
