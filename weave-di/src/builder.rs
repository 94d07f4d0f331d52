//! Container builder for fluent configuration

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::container::Container;
use crate::provider::{Decorator, ServiceDefinition};
use crate::service::{instance, Instance, Scope, Service};

/// Builder for constructing a service container
#[derive(Default)]
pub struct ContainerBuilder {
    definitions: FxHashMap<String, ServiceDefinition>,
    decorators: Vec<Decorator>,
}

impl ContainerBuilder {
    /// Create a new container builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service with an explicit definition, replacing any
    /// earlier registration of `id`
    pub fn register_definition(&mut self, id: &str, definition: ServiceDefinition) -> &mut Self {
        if self.definitions.insert(id.to_string(), definition).is_some() {
            debug!("Builder replaced service: {}", id);
        }
        self
    }

    /// Register a shared service
    pub fn register_shared<F>(&mut self, id: &str, provider: F) -> &mut Self
    where
        F: Fn(&Container) -> anyhow::Result<Instance> + Send + Sync + 'static,
    {
        self.register_definition(id, ServiceDefinition::new(Scope::Shared, provider))
    }

    /// Register a service shared within one top-level resolution
    pub fn register_nested_shared<F>(&mut self, id: &str, provider: F) -> &mut Self
    where
        F: Fn(&Container) -> anyhow::Result<Instance> + Send + Sync + 'static,
    {
        self.register_definition(id, ServiceDefinition::new(Scope::NestedShared, provider))
    }

    /// Register a service built anew on every request
    pub fn register_non_shared<F>(&mut self, id: &str, provider: F) -> &mut Self
    where
        F: Fn(&Container) -> anyhow::Result<Instance> + Send + Sync + 'static,
    {
        self.register_definition(id, ServiceDefinition::new(Scope::NonShared, provider))
    }

    /// Register an existing value as a shared service.
    ///
    /// The value still passes through the decorators when first resolved.
    pub fn register_instance<T: Service>(&mut self, id: &str, value: T) -> &mut Self {
        let value = instance(value);
        self.register_shared(id, move |_| Ok(value.clone()))
    }

    /// Append a decorator
    pub fn decorator<F>(&mut self, decorator: F) -> &mut Self
    where
        F: Fn(&Container, &str, Instance) -> anyhow::Result<Instance> + Send + Sync + 'static,
    {
        let decorator: Decorator = std::sync::Arc::new(decorator);
        self.decorators.push(decorator);
        self
    }

    /// Whether `id` has been registered on this builder
    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Build the container
    pub fn build(self) -> Container {
        debug!(
            "Building container with {} services and {} decorators",
            self.definitions.len(),
            self.decorators.len()
        );
        let container = Container::from_definitions(self.definitions);
        for decorator in self.decorators {
            container.register_decorator(move |c, id, service| decorator(c, id, service));
        }
        container
    }
}

/// Extension methods for fluent builder pattern
impl ContainerBuilder {
    /// Add multiple services using a configuration function
    pub fn add_services<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        configure(&mut self);
        self
    }

    /// Add services from another module
    pub fn add_module<M: Module>(mut self, module: M) -> Self {
        module.configure(&mut self);
        self
    }
}

/// A reusable group of service registrations
pub trait Module {
    /// Configure services for this module
    fn configure(&self, builder: &mut ContainerBuilder);
}
