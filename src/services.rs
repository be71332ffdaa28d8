//! Narrow interfaces to the services the inferencer consumes
//!
//! Name resolution, annotations, class members and module lookup are owned
//! by the host. Every service is `Send + Sync` so a single inferrer can
//! answer queries from several threads at once.

use crate::ast::{Expression, ExpressionKind, FileId, FunctionBody, NodeId};
use crate::context::SearchContext;
use crate::declaration::Declaration;
use crate::module_resolver::ModuleId;
use crate::types::{ClassTy, Ty};

pub trait NameResolver<'a>: Send + Sync {
    /// Every declaration a name reference may bind to
    fn resolve_candidates(
        &self,
        name: &Expression<'a>,
        ctx: &SearchContext<'_>,
    ) -> Vec<Declaration<'a>>;

    /// True when the reference binds to no enclosing local scope
    fn is_global_binding(&self, name: &Expression<'a>) -> bool;

    /// Declaration introduced by an assignment target such as `obj.field = v`
    fn declaration_at(&self, target: &Expression<'a>) -> Option<Declaration<'a>>;

    /// Open record holding the members assigned to a global name
    fn global_record(&self, name: &str) -> Ty {
        Ty::global(name)
    }

    /// Function body a callee refers to, found by identity rather than type
    fn resolve_function_body(
        &self,
        callee: &Expression<'a>,
        ctx: &SearchContext<'_>,
    ) -> Option<&'a FunctionBody<'a>> {
        if !matches!(callee.kind, ExpressionKind::Name(_)) {
            return None;
        }
        self.resolve_candidates(callee, ctx)
            .into_iter()
            .find_map(|decl| {
                decl.body.or_else(|| {
                    let value = decl.value?;
                    match value.values.get(value.index)?.kind {
                        ExpressionKind::Closure(body) => Some(body),
                        _ => None,
                    }
                })
            })
    }
}

/// Declared types from annotations, keyed by declaration site
///
/// Function bodies are keyed by their own node and map to the annotated
/// return type.
pub trait DeclaredTypeSource: Send + Sync {
    fn declared_type(&self, site: NodeId) -> Option<Ty>;
}

pub trait MemberLookup<'a>: Send + Sync {
    /// Every declaration of `field` known for `class`
    fn all_declarations_of(
        &self,
        class: &ClassTy,
        field: &str,
        ctx: &SearchContext<'_>,
    ) -> Vec<Declaration<'a>>;
}

/// A resolved module
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleHandle {
    pub id: ModuleId,
    pub file: FileId,
}

/// What a module evaluates to when required
#[derive(Debug, Clone)]
pub enum ModuleExport<'a> {
    /// Declared export type
    Type(Ty),
    /// Expression returned by the module's main chunk
    Expression(&'a Expression<'a>),
}

pub trait ModuleResolver<'a>: Send + Sync {
    fn resolve(&self, path: &str, from: FileId) -> Option<ModuleHandle>;

    fn module_export(&self, handle: &ModuleHandle) -> Option<ModuleExport<'a>>;
}

/// Method names treated as constructors of their owning class
pub trait ConstructorNamePolicy: Send + Sync {
    fn is_constructor_name(&self, name: &str) -> bool;
}
