//! Circular dependency tracking for reentrant resolution

use std::cell::RefCell;

/// Chain of ids currently under construction on one registry
#[derive(Debug, Default)]
pub struct CycleTracker {
    chain: RefCell<Vec<String>>,
}

impl CycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `id` onto the chain.
    ///
    /// The id is pushed even when it closes a cycle, so the depth seen by
    /// the caller stays consistent. The returned frame pops it again when
    /// dropped.
    pub fn enter(&self, id: &str) -> Frame<'_> {
        let mut chain = self.chain.borrow_mut();
        let cycle = if chain.iter().any(|current| current == id) {
            let mut closed = chain.clone();
            closed.push(id.to_string());
            Some(closed)
        } else {
            None
        };
        chain.push(id.to_string());

        Frame {
            tracker: self,
            cycle,
        }
    }

    /// Number of ids currently under construction
    pub fn depth(&self) -> usize {
        self.chain.borrow().len()
    }

    /// Snapshot of the current chain
    pub fn chain(&self) -> Vec<String> {
        self.chain.borrow().clone()
    }

    fn exit(&self) {
        self.chain.borrow_mut().pop();
    }
}

/// One entry on the chain, popped on drop
#[must_use = "dropping the frame immediately pops the id"]
pub struct Frame<'a> {
    tracker: &'a CycleTracker,
    cycle: Option<Vec<String>>,
}

impl Frame<'_> {
    /// The closed chain when entering this frame repeated an id
    pub fn take_cycle(&mut self) -> Option<Vec<String>> {
        self.cycle.take()
    }
}

impl Drop for Frame<'_> {
    fn drop(&mut self) {
        self.tracker.exit();
    }
}
