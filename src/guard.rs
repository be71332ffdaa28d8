//! Reentrancy tracking for in-flight inference queries
//!
//! Types of names can depend on expressions that refer back to the same
//! names (`local a = a`, mutually assigned globals, self-referencing
//! tables). Every guarded routine registers its key before descending and
//! a query that reaches a key already in flight gets Unknown instead of
//! recursing forever.

use crate::ast::NodeId;
use rustc_hash::FxHashSet;
use std::cell::RefCell;

/// What a guarded node is being asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardScope {
    /// Type of the expression at this node
    Expression,
    /// Type of the declaration at this node as a module member
    ModuleMember,
}

/// Identity of one guarded query: the node and the value slot being inferred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GuardKey {
    pub node: NodeId,
    pub index: usize,
    pub scope: GuardScope,
}

impl GuardKey {
    pub fn new(node: NodeId, index: usize) -> Self {
        Self {
            node,
            index,
            scope: GuardScope::Expression,
        }
    }

    pub fn module_member(node: NodeId) -> Self {
        Self {
            node,
            index: 0,
            scope: GuardScope::ModuleMember,
        }
    }
}

/// Set of in-flight keys owned by a single query
#[derive(Debug, Default)]
pub struct RecursionGuard {
    in_flight: RefCell<FxHashSet<GuardKey>>,
}

impl RecursionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` as in flight, or returns `None` if it already is
    ///
    /// The key is released when the returned token is dropped.
    pub fn enter(&self, key: GuardKey) -> Option<GuardToken<'_>> {
        if self.in_flight.borrow_mut().insert(key) {
            Some(GuardToken { guard: self, key })
        } else {
            None
        }
    }

    /// Runs `f` while `key` is held; `None` when `key` was already in flight
    pub fn guarded<T>(&self, key: GuardKey, f: impl FnOnce() -> T) -> Option<T> {
        let _token = self.enter(key)?;
        Some(f())
    }

    pub fn is_active(&self, key: GuardKey) -> bool {
        self.in_flight.borrow().contains(&key)
    }

    /// Number of keys currently held
    pub fn len(&self) -> usize {
        self.in_flight.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.borrow().is_empty()
    }
}

/// Scoped hold on a guard key
#[derive(Debug)]
pub struct GuardToken<'g> {
    guard: &'g RecursionGuard,
    key: GuardKey,
}

impl GuardToken<'_> {
    pub fn key(&self) -> GuardKey {
        self.key
    }
}

impl Drop for GuardToken<'_> {
    fn drop(&mut self) {
        self.guard.in_flight.borrow_mut().remove(&self.key);
    }
}
