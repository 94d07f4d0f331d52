//! Parameter container

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::container::catch;
use crate::cycle::CycleTracker;
use crate::error::{fail, take_circular, DiError, DiResult, EntryKind};
use crate::provider::ParamDefinition;
use crate::service::{downcast, Instance, Service};

struct ParamEntry {
    definition: ParamDefinition,
    value: Option<Instance>,
}

impl ParamEntry {
    fn new(definition: ParamDefinition) -> Self {
        Self {
            definition,
            value: None,
        }
    }
}

/// Registry of configuration values.
///
/// Works like [`Container`](crate::Container) without scopes or decorators:
/// a parameter is either cached after its first successful build or, when
/// disposable, rebuilt on every request.
#[derive(Default)]
pub struct ParamContainer {
    params: RefCell<FxHashMap<String, ParamEntry>>,
    tracker: CycleTracker,
}

impl ParamContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parameter container from a set of definitions
    pub fn from_definitions<I, S>(definitions: I) -> Self
    where
        I: IntoIterator<Item = (S, ParamDefinition)>,
        S: Into<String>,
    {
        let params = definitions
            .into_iter()
            .map(|(id, definition)| (id.into(), ParamEntry::new(definition)))
            .collect();

        Self {
            params: RefCell::new(params),
            tracker: CycleTracker::new(),
        }
    }

    /// Resolve a parameter
    pub fn get_param(&self, id: &str) -> DiResult<Instance> {
        let mut frame = self.tracker.enter(id);
        if let Some(chain) = frame.take_cycle() {
            warn!("Circular parameter dependency detected: {}", chain.join(" -> "));
            return Err(DiError::CircularDependency { chain });
        }

        let definition = {
            let params = self.params.borrow();
            let entry = params
                .get(id)
                .ok_or_else(|| DiError::not_found(EntryKind::Parameter, id))?;
            if let Some(value) = &entry.value {
                trace!("Cache hit for parameter: {}", id);
                return Ok(value.clone());
            }
            entry.definition.clone()
        };

        let value = catch("Parameter provider", id, || (definition.provider)(self))
            .map_err(|cause| {
                let wrap = |cause: anyhow::Error| DiError::ParameterFailed {
                    id: id.to_string(),
                    cause,
                };
                match take_circular(cause) {
                    Ok(circular) if self.tracker.depth() > 1 => circular,
                    Ok(circular) => wrap(circular.into()),
                    Err(cause) => wrap(cause),
                }
            })?;

        if !definition.disposable {
            if let Some(entry) = self.params.borrow_mut().get_mut(id) {
                if Arc::ptr_eq(&entry.definition.provider, &definition.provider) {
                    entry.value = Some(value.clone());
                }
            }
        }

        Ok(value)
    }

    /// Resolve a parameter, panicking on failure
    pub fn must_get_param(&self, id: &str) -> Instance {
        self.get_param(id).unwrap_or_else(|err| fail(err))
    }

    /// Resolve a parameter and downcast it to its concrete type
    pub fn get_param_as<T: Service>(&self, id: &str) -> DiResult<Arc<T>> {
        downcast(EntryKind::Parameter, id, self.get_param(id)?)
    }

    /// Register a new parameter, failing when the id is taken
    pub fn register_param(&self, id: &str, definition: ParamDefinition) -> DiResult<()> {
        let mut params = self.params.borrow_mut();
        if params.contains_key(id) {
            return Err(DiError::already_registered(EntryKind::Parameter, id));
        }

        debug!("Registered parameter: {}", id);
        params.insert(id.to_string(), ParamEntry::new(definition));
        Ok(())
    }

    /// Register or replace a parameter, dropping any cached value
    pub fn override_param(&self, id: &str, definition: ParamDefinition) {
        debug!("Overrode parameter: {}", id);
        self.params
            .borrow_mut()
            .insert(id.to_string(), ParamEntry::new(definition));
    }

    pub fn has_param(&self, id: &str) -> bool {
        self.params.borrow().contains_key(id)
    }

    /// All registered parameter ids in lexicographic order
    pub fn param_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.params.borrow().keys().cloned().collect();
        ids.sort();
        ids
    }
}
