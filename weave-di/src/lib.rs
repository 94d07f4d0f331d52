//! Dependency injection container with scoped service resolution
//!
//! Services are built lazily by provider functions and cached according to
//! their [`Scope`]. On top of the core [`Container`] sit a
//! [`ParamContainer`] for configuration values, a [`TaggedContainer`] that
//! groups services by tag, and the [`Atomic`] wrapper for sharing any of
//! them between threads.

pub mod atomic;
pub mod builder;
pub mod composite;
pub mod container;
pub mod cycle;
pub mod decorator;
pub mod error;
pub mod param;
pub mod provider;
pub mod registry;
pub mod service;
pub mod tagged;

#[cfg(feature = "config")]
pub mod config;

pub use atomic::{Atomic, AtomicContainer, AtomicParamContainer, AtomicTaggedContainer};
pub use builder::{ContainerBuilder, Module};
pub use composite::{Composite, LocalComposite, SharedComposite};
pub use container::Container;
pub use error::{Action, DiError, DiResult, EntryKind};
pub use param::ParamContainer;
pub use provider::{
    todo_param, Decorator, ParamDefinition, ParamProvider, Provider, ServiceDefinition,
};
pub use registry::{ParamRegistry, ServiceLocator, ServiceRegistry, TagRegistry};
pub use service::{instance, Instance, Scope, Service};
pub use tagged::TaggedContainer;

#[cfg(feature = "config")]
pub use config::{ContainerConfig, ParamConfig, ProviderCatalog, ServiceConfig, TagConfig};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::{
        instance, Container, ContainerBuilder, DiError, DiResult, Instance, ParamContainer,
        ParamDefinition, ParamRegistry, Scope, Service, ServiceDefinition, ServiceLocator,
        ServiceRegistry, TagRegistry, TaggedContainer,
    };
}
