use crate::ast::NodeId;
use crate::guard::{GuardKey, RecursionGuard};
use crate::types::Ty;
use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Host-side switch for abandoning a running query
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Mutable state of one top-level query
///
/// Created per query and dropped with it, so no guard entry outlives the
/// query that made it. It is not `Sync`; parallel queries each own one.
///
/// Finished results are memoized per `(node, index)` for the rest of the
/// query, so each expression is inferred at most once per value slot.
#[derive(Debug, Default)]
pub struct QueryState {
    guard: RecursionGuard,
    depth: Cell<usize>,
    truncations: Cell<usize>,
    memo: RefCell<FxHashMap<GuardKey, Ty>>,
    cancellation: Option<CancellationToken>,
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            cancellation: Some(token),
            ..Self::default()
        }
    }

    pub fn guard(&self) -> &RecursionGuard {
        &self.guard
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Number of descents refused by the depth limit so far
    pub fn truncations(&self) -> usize {
        self.truncations.get()
    }

    /// Enters one level of descent, or `None` past `max_depth`
    pub fn descend(&self, max_depth: usize) -> Option<DepthToken<'_>> {
        let depth = self.depth.get();
        if depth >= max_depth {
            self.truncations.set(self.truncations.get() + 1);
            return None;
        }
        self.depth.set(depth + 1);
        Some(DepthToken { state: self })
    }

    /// Result already computed for `key` in this query
    pub fn memoized(&self, key: GuardKey) -> Option<Ty> {
        self.memo.borrow().get(&key).cloned()
    }

    pub fn memoize(&self, key: GuardKey, ty: Ty) {
        self.memo.borrow_mut().insert(key, ty);
    }

    pub fn memo_len(&self) -> usize {
        self.memo.borrow().len()
    }
}

/// Scoped level of descent; restores the depth on drop
#[derive(Debug)]
pub struct DepthToken<'q> {
    state: &'q QueryState,
}

impl Drop for DepthToken<'_> {
    fn drop(&mut self) {
        self.state.depth.set(self.state.depth.get().saturating_sub(1));
    }
}

/// Context threaded through every inference call
///
/// `index` selects the value slot when the expression being inferred sits
/// in a multi-value position (`local a, b = f()`).
#[derive(Debug, Clone, Copy)]
pub struct SearchContext<'q> {
    state: &'q QueryState,
    index: usize,
}

impl<'q> SearchContext<'q> {
    pub fn new(state: &'q QueryState) -> Self {
        Self { state, index: 0 }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn with_index(&self, index: usize) -> Self {
        Self {
            state: self.state,
            index,
        }
    }

    /// Same query, single-value position
    pub fn first(&self) -> Self {
        self.with_index(0)
    }

    pub fn state(&self) -> &'q QueryState {
        self.state
    }

    pub fn guard(&self) -> &'q RecursionGuard {
        self.state.guard()
    }

    pub fn key(&self, node: NodeId) -> GuardKey {
        GuardKey::new(node, self.index)
    }
}
