//! Service values and scopes

use downcast_rs::{impl_downcast, DowncastSync};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult, EntryKind};

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Trait that all services and parameters implement
///
/// Every `Any + Send + Sync` type is a service. Note that `Instance` itself
/// qualifies too, so wrap concrete values with [`instance`] and never an
/// already wrapped instance.
pub trait Service: DowncastSync {}

impl_downcast!(sync Service);

/// Blanket implementation for all suitable types
impl<T: Any + Send + Sync> Service for T {}

/// A materialized service or parameter, shared by reference count
pub type Instance = Arc<dyn Service>;

/// Wrap a value into an [`Instance`]
pub fn instance<T: Service>(value: T) -> Instance {
    Arc::new(value)
}

/// Downcast a resolved entry, reporting a mismatch as `InvalidProvider`
pub(crate) fn downcast<T: Service>(kind: EntryKind, id: &str, value: Instance) -> DiResult<Arc<T>> {
    value.downcast_arc::<T>().map_err(|_| DiError::InvalidProvider {
        kind,
        id: id.to_string(),
        expected: std::any::type_name::<T>(),
    })
}

/// Caching policy of a service definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum Scope {
    /// One instance for the lifetime of the container
    #[default]
    Shared,
    /// One instance per top-level resolution
    NestedShared,
    /// A new instance on every request
    NonShared,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Shared => write!(f, "Shared"),
            Scope::NestedShared => write!(f, "NestedShared"),
            Scope::NonShared => write!(f, "NonShared"),
        }
    }
}
