//! Build recipes for services and parameters

use crate::container::Container;
use crate::param::ParamContainer;
use crate::service::{Instance, Scope};
use std::fmt;
use std::sync::Arc;

/// Builds a service. Receives the registry performing the resolution so
/// nested lookups go through it.
pub type Provider = Arc<dyn Fn(&Container) -> anyhow::Result<Instance> + Send + Sync>;

/// Builds a parameter
pub type ParamProvider = Arc<dyn Fn(&ParamContainer) -> anyhow::Result<Instance> + Send + Sync>;

/// Transforms every newly built service; receives the service id
pub type Decorator =
    Arc<dyn Fn(&Container, &str, Instance) -> anyhow::Result<Instance> + Send + Sync>;

/// Describes how to build one service
#[derive(Clone)]
pub struct ServiceDefinition {
    /// Factory function to create the service
    pub provider: Provider,
    /// Caching policy
    pub scope: Scope,
}

impl ServiceDefinition {
    /// Create a new service definition
    pub fn new<F>(scope: Scope, provider: F) -> Self
    where
        F: Fn(&Container) -> anyhow::Result<Instance> + Send + Sync + 'static,
    {
        Self {
            provider: Arc::new(provider),
            scope,
        }
    }

    /// Create a shared service definition
    pub fn shared<F>(provider: F) -> Self
    where
        F: Fn(&Container) -> anyhow::Result<Instance> + Send + Sync + 'static,
    {
        Self::new(Scope::Shared, provider)
    }

    /// Create a nested-shared service definition
    pub fn nested_shared<F>(provider: F) -> Self
    where
        F: Fn(&Container) -> anyhow::Result<Instance> + Send + Sync + 'static,
    {
        Self::new(Scope::NestedShared, provider)
    }

    /// Create a non-shared service definition
    pub fn non_shared<F>(provider: F) -> Self
    where
        F: Fn(&Container) -> anyhow::Result<Instance> + Send + Sync + 'static,
    {
        Self::new(Scope::NonShared, provider)
    }
}

impl fmt::Debug for ServiceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDefinition")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Describes how to build one parameter
#[derive(Clone)]
pub struct ParamDefinition {
    pub provider: ParamProvider,
    /// Rebuild on every request instead of caching the first value
    pub disposable: bool,
}

impl ParamDefinition {
    /// Create a cached parameter definition
    pub fn new<F>(provider: F) -> Self
    where
        F: Fn(&ParamContainer) -> anyhow::Result<Instance> + Send + Sync + 'static,
    {
        Self {
            provider: Arc::new(provider),
            disposable: false,
        }
    }

    /// Create a parameter definition that is rebuilt on every request
    pub fn disposable<F>(provider: F) -> Self
    where
        F: Fn(&ParamContainer) -> anyhow::Result<Instance> + Send + Sync + 'static,
    {
        Self {
            provider: Arc::new(provider),
            disposable: true,
        }
    }

    /// A parameter with a fixed value
    pub fn value(value: Instance) -> Self {
        Self::new(move |_| Ok(value.clone()))
    }
}

impl fmt::Debug for ParamDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamDefinition")
            .field("disposable", &self.disposable)
            .finish_non_exhaustive()
    }
}

/// Placeholder parameter that always fails, for values that must be
/// supplied before the parameter is read
pub fn todo_param(message: Option<&str>) -> ParamDefinition {
    let message = message.unwrap_or("parameter todo").to_string();
    ParamDefinition::new(move |_| Err(anyhow::anyhow!("{}", message)))
}
