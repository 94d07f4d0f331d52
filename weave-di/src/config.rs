//! Configuration-based container bootstrap

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::container::Container;
use crate::error::{DiError, DiResult};
use crate::param::ParamContainer;
use crate::provider::{ParamDefinition, Provider, ServiceDefinition};
use crate::registry::{ParamRegistry, ServiceRegistry, TagRegistry};
use crate::service::{instance, Instance, Scope};

/// Provider functions addressable by name from a configuration file
#[derive(Default)]
pub struct ProviderCatalog {
    providers: FxHashMap<String, Provider>,
}

impl ProviderCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under `name`
    pub fn register_provider<F>(&mut self, name: &str, provider: F) -> DiResult<()>
    where
        F: Fn(&Container) -> anyhow::Result<Instance> + Send + Sync + 'static,
    {
        if self.providers.contains_key(name) {
            return Err(DiError::ConfigError(format!(
                "provider `{}` is already registered",
                name
            )));
        }
        self.providers.insert(name.to_string(), Arc::new(provider));
        Ok(())
    }

    pub fn provider(&self, name: &str) -> Option<Provider> {
        self.providers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Registered provider names in lexicographic order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Tag membership of a configured service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagConfig {
    pub name: String,
    #[serde(default)]
    pub priority: i32,
}

/// Service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub id: String,
    /// Name of a provider in the [`ProviderCatalog`]
    pub provider: String,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub tags: Vec<TagConfig>,
}

/// Parameter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamConfig {
    pub id: String,
    pub value: serde_json::Value,
    #[serde(default)]
    pub disposable: bool,
}

/// Container configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerConfig {
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
    #[serde(default)]
    pub params: Vec<ParamConfig>,
}

impl ContainerConfig {
    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> DiResult<Self> {
        toml::from_str(toml_str)
            .map_err(|e| DiError::ConfigError(format!("Failed to parse TOML: {}", e)))
    }

    /// Load configuration from JSON string
    pub fn from_json(json_str: &str) -> DiResult<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| DiError::ConfigError(format!("Failed to parse JSON: {}", e)))
    }

    /// Load configuration from a `.toml` or `.json` file
    pub fn from_path(path: impl AsRef<Path>) -> DiResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DiError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            _ => Err(DiError::ConfigError(format!(
                "Unsupported configuration format: {}",
                path.display()
            ))),
        }
    }

    /// Register every configured service, tag and parameter.
    ///
    /// Registration does not override: an id that is already present fails
    /// with `AlreadyRegistered`.
    pub fn apply<S, P, T>(
        &self,
        catalog: &ProviderCatalog,
        services: &S,
        params: &P,
        tags: &T,
    ) -> DiResult<()>
    where
        S: ServiceRegistry,
        P: ParamRegistry,
        T: TagRegistry,
    {
        for service in &self.services {
            let provider = catalog.provider(&service.provider).ok_or_else(|| {
                DiError::ConfigError(format!(
                    "unknown provider `{}` for service `{}`",
                    service.provider, service.id
                ))
            })?;
            services.register(
                &service.id,
                ServiceDefinition {
                    provider,
                    scope: service.scope,
                },
            )?;
            for tag in &service.tags {
                tags.tag_service(&service.id, &tag.name, tag.priority)?;
            }
        }

        for param in &self.params {
            let value = param.value.clone();
            let provider =
                move |_: &ParamContainer| -> anyhow::Result<Instance> { Ok(convert(&value)) };
            let definition = if param.disposable {
                ParamDefinition::disposable(provider)
            } else {
                ParamDefinition::new(provider)
            };
            params.register_param(&param.id, definition)?;
        }

        debug!(
            "Applied configuration: {} services, {} parameters",
            self.services.len(),
            self.params.len()
        );
        Ok(())
    }
}

/// Map a configured value onto the Rust type a provider would produce
fn convert(value: &serde_json::Value) -> Instance {
    use serde_json::Value;

    match value {
        Value::String(s) => instance(s.clone()),
        Value::Bool(b) => instance(*b),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => instance(i),
            (None, Some(f)) => instance(f),
            (None, None) => instance(value.clone()),
        },
        _ => instance(value.clone()),
    }
}
