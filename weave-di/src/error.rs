//! Error types for the DI container

use std::any::Any;
use std::fmt;
use std::panic;
use thiserror::Error;

/// Result type alias for DI operations
pub type DiResult<T> = Result<T, DiError>;

/// Which kind of registry entry an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Service,
    Parameter,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Service => write!(f, "service"),
            EntryKind::Parameter => write!(f, "parameter"),
        }
    }
}

/// Mutating operation that was attempted on a missing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Revoke,
    Remove,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Revoke => write!(f, "revoke"),
            Action::Remove => write!(f, "remove"),
        }
    }
}

/// Errors that can occur during DI operations
#[derive(Error, Debug)]
pub enum DiError {
    /// Entry not found in the registry
    #[error("{kind} `{id}` does not exist")]
    NotFound { kind: EntryKind, id: String },

    /// Revoke or remove called for an unknown entry
    #[error("cannot {action} {kind} `{id}`, because it does not exist")]
    MissingEntry {
        action: Action,
        kind: EntryKind,
        id: String,
    },

    /// Duplicate registration without override
    #[error("{kind} `{id}` is already registered")]
    AlreadyRegistered { kind: EntryKind, id: String },

    /// Duplicate tag without override
    #[error("service `{id}` is already tagged as `{tag}`")]
    AlreadyTagged { id: String, tag: String },

    /// Circular dependency detected; the chain is closed by the repeated id
    #[error("circular dependency: {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    /// Provider returned an error or panicked
    #[error("cannot create service `{id}`: {cause:#}")]
    ConstructionFailed { id: String, cause: anyhow::Error },

    /// A decorator returned an error or panicked
    #[error("cannot decorate service `{id}`: {cause:#}")]
    DecorationFailed { id: String, cause: anyhow::Error },

    /// Parameter provider returned an error or panicked
    #[error("cannot get parameter `{id}`: {cause:#}")]
    ParameterFailed { id: String, cause: anyhow::Error },

    /// One member of a tag could not be resolved
    #[error("cannot get services by tag `{tag}`: {cause}")]
    TagResolutionFailed { tag: String, cause: Box<DiError> },

    /// Provided value does not have the requested type
    #[error("{kind} `{id}` is not provided as `{expected}`")]
    InvalidProvider {
        kind: EntryKind,
        id: String,
        expected: &'static str,
    },

    /// Configuration could not be loaded or applied
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl DiError {
    pub(crate) fn not_found(kind: EntryKind, id: &str) -> Self {
        DiError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn missing(action: Action, kind: EntryKind, id: &str) -> Self {
        DiError::MissingEntry {
            action,
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn already_registered(kind: EntryKind, id: &str) -> Self {
        DiError::AlreadyRegistered {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether this is a raw circular dependency error
    pub fn is_circular(&self) -> bool {
        matches!(self, DiError::CircularDependency { .. })
    }

    /// The dependency chain of a circular error, if this is one
    pub fn chain(&self) -> Option<&[String]> {
        match self {
            DiError::CircularDependency { chain } => Some(chain),
            _ => None,
        }
    }
}

/// Splits a raw circular dependency out of a provider failure.
///
/// Returns the `DiError` when `cause` carries a circular dependency,
/// otherwise hands the cause back untouched.
pub(crate) fn take_circular(cause: anyhow::Error) -> Result<DiError, anyhow::Error> {
    if cause.downcast_ref::<DiError>().is_some_and(DiError::is_circular) {
        cause.downcast::<DiError>()
    } else {
        Err(cause)
    }
}

/// Panics with `err` itself as the payload.
///
/// Registries catching the panic further up get the `DiError` back, so a
/// circular dependency raised through a `must_*` call is still recognised.
pub(crate) fn fail(err: DiError) -> ! {
    panic::panic_any(err)
}

/// Renders a caught panic payload as an error
pub(crate) fn panic_to_error(payload: Box<dyn Any + Send>) -> anyhow::Error {
    let payload = match payload.downcast::<DiError>() {
        Ok(err) => return anyhow::Error::new(*err),
        Err(payload) => payload,
    };
    if let Some(message) = payload.downcast_ref::<&str>() {
        anyhow::anyhow!("{}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        anyhow::anyhow!("{}", message)
    } else {
        anyhow::anyhow!("unexpected panic")
    }
}
