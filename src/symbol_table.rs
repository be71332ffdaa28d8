use crate::ast::{Expression, NodeId};
use crate::context::SearchContext;
use crate::declaration::{Declaration, DeclarationKind};
use crate::services::NameResolver;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

/// A scope containing local declarations
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    symbols: FxHashMap<&'a str, Declaration<'a>>,
}

impl<'a> Scope<'a> {
    pub fn new() -> Self {
        Self {
            symbols: FxHashMap::with_capacity_and_hasher(32, Default::default()),
        }
    }

    /// Declare a name in this scope, returning the declaration it shadows
    ///
    /// Lua allows `local x` twice in one block; the later one wins.
    pub fn declare(&mut self, decl: Declaration<'a>) -> Option<Declaration<'a>> {
        self.symbols.insert(decl.name, decl)
    }

    /// Look up a symbol only in this scope (not parent scopes)
    pub fn lookup_local(&self, name: &str) -> Option<&Declaration<'a>> {
        self.symbols.get(name)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Declaration<'a>> {
        self.symbols.values()
    }
}

impl<'a> Default for Scope<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped name bindings of the indexed programs
///
/// Built by walking a program: declarations enter the current scope, and
/// each name reference is bound with [`SymbolTable::bind_reference`] at the
/// point it appears. References with no visible local are global.
#[derive(Debug, Default)]
pub struct SymbolTable<'a> {
    current_scope: Scope<'a>,
    scope_stack: Vec<Scope<'a>>,
    references: FxHashMap<NodeId, Declaration<'a>>,
    globals: IndexMap<&'a str, Vec<Declaration<'a>>>,
    targets: FxHashMap<NodeId, Declaration<'a>>,
}

impl<'a> SymbolTable<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a new scope (O(1) - no cloning)
    pub fn enter_scope(&mut self) {
        let parent = std::mem::take(&mut self.current_scope);
        self.scope_stack.push(parent);
    }

    /// Exit current scope
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scope_stack.pop() {
            self.current_scope = parent;
        }
    }

    /// Get the current scope depth (0 = chunk scope, >0 = nested scopes)
    pub fn scope_depth(&self) -> usize {
        self.scope_stack.len()
    }

    /// Declare a local or parameter in the current scope
    pub fn declare(&mut self, decl: Declaration<'a>) -> Option<Declaration<'a>> {
        self.current_scope.declare(decl)
    }

    /// Look up a name in current scope, then walk the scope stack (most recent first)
    pub fn lookup(&self, name: &str) -> Option<&Declaration<'a>> {
        if let Some(decl) = self.current_scope.symbols.get(name) {
            return Some(decl);
        }
        self.scope_stack
            .iter()
            .rev()
            .find_map(|scope| scope.symbols.get(name))
    }

    /// Look up a name only in the current scope
    pub fn lookup_local(&self, name: &str) -> Option<&Declaration<'a>> {
        self.current_scope.lookup_local(name)
    }

    /// Bind a name reference to the local visible at this point
    ///
    /// Returns false when no local is visible and the reference is global.
    pub fn bind_reference(&mut self, expr: &Expression<'a>) -> bool {
        let Some(name) = expr.name() else {
            return false;
        };
        match self.lookup(name).copied() {
            Some(decl) => {
                self.references.insert(expr.id, decl);
                true
            }
            None => false,
        }
    }

    /// Record an assignment to a global name
    pub fn declare_global(&mut self, decl: Declaration<'a>) {
        let decl = Declaration {
            kind: DeclarationKind::Global,
            ..decl
        };
        self.globals.entry(decl.name).or_default().push(decl);
    }

    pub fn globals(&self, name: &str) -> &[Declaration<'a>] {
        self.globals.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Record the declaration introduced by an assignment target
    pub fn set_assignment_target(&mut self, target: &Expression<'a>, decl: Declaration<'a>) {
        self.targets.insert(target.id, decl);
    }

    /// Get all declarations visible from the current scope
    pub fn all_visible_symbols(&self) -> FxHashMap<&'a str, &Declaration<'a>> {
        let mut result = FxHashMap::default();

        // Add from oldest scope to newest so newer scopes shadow older ones
        for scope in &self.scope_stack {
            for (name, decl) in &scope.symbols {
                result.insert(*name, decl);
            }
        }

        for (name, decl) in &self.current_scope.symbols {
            result.insert(*name, decl);
        }

        result
    }
}

impl<'a> NameResolver<'a> for SymbolTable<'a> {
    fn resolve_candidates(
        &self,
        name: &Expression<'a>,
        _ctx: &SearchContext<'_>,
    ) -> Vec<Declaration<'a>> {
        if let Some(decl) = self.references.get(&name.id) {
            return vec![*decl];
        }
        match name.name() {
            Some(name) => self.globals(name).to_vec(),
            None => Vec::new(),
        }
    }

    fn is_global_binding(&self, name: &Expression<'a>) -> bool {
        name.name().is_some() && !self.references.contains_key(&name.id)
    }

    fn declaration_at(&self, target: &Expression<'a>) -> Option<Declaration<'a>> {
        self.targets.get(&target.id).copied()
    }
}
