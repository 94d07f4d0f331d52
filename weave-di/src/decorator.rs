//! Post-construction decorator pipeline

use crate::container::Container;
use crate::provider::Decorator;
use crate::service::Instance;
use std::cell::RefCell;
use std::sync::Arc;

/// Ordered list of decorators applied to every newly built service
#[derive(Default)]
pub struct DecoratorPipeline {
    decorators: RefCell<Vec<Decorator>>,
}

impl DecoratorPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decorator; there is no way to remove one
    pub fn push<F>(&self, decorator: F)
    where
        F: Fn(&Container, &str, Instance) -> anyhow::Result<Instance> + Send + Sync + 'static,
    {
        let decorator: Decorator = Arc::new(decorator);
        self.decorators.borrow_mut().push(decorator);
    }

    pub fn len(&self) -> usize {
        self.decorators.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `service` through every decorator in registration order,
    /// stopping at the first failure.
    pub fn apply(
        &self,
        container: &Container,
        id: &str,
        service: Instance,
    ) -> anyhow::Result<Instance> {
        // Decorators may register further decorators while running.
        let decorators = self.decorators.borrow().clone();
        decorators
            .iter()
            .try_fold(service, |service, decorate| decorate(container, id, service))
    }
}
