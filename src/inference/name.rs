use super::TypeInferrer;
use crate::ast::Expression;
use crate::context::SearchContext;
use crate::declaration::Declaration;
use crate::guard::GuardKey;
use crate::state::InferenceMetrics;
use crate::types::{ClassTy, Ty};
use tracing::{debug, instrument};

impl<'a> TypeInferrer<'a, '_> {
    /// Union of the types of every declaration a name may bind to
    #[instrument(level = "trace", skip(self, expr, ctx), fields(node = %expr.id))]
    pub(super) fn infer_name(
        &self,
        expr: &Expression<'a>,
        name: &str,
        ctx: &SearchContext<'_>,
    ) -> Ty {
        let Some(_token) = ctx.guard().enter(ctx.key(expr.id)) else {
            debug!(name, "Recursion guard hit");
            self.record(InferenceMetrics::record_guard_hit);
            return Ty::Unknown;
        };

        let mut ty = Ty::Unknown;
        for decl in self.names.resolve_candidates(expr, ctx) {
            ty = ty.union(self.binding_type(&decl, ctx));
        }

        // Unresolved names may themselves be the target of an assignment
        if ty.is_invalid() {
            if let Some(decl) = self.names.declaration_at(expr) {
                ty = ty.union(self.binding_type(&decl, ctx));
            }
            if self.names.is_global_binding(expr) {
                ty = ty.union(self.names.global_record(name));
            }
        }

        ty
    }

    fn binding_type(&self, decl: &Declaration<'a>, ctx: &SearchContext<'_>) -> Ty {
        if let Some(module) = decl.module {
            if let Some(ty) = self.module_member_type(module, decl, ctx) {
                return ty;
            }
        }

        let ty = self.declaration_type(decl, ctx);
        if decl.is_global() {
            // globals stay open to members assigned elsewhere
            ty.union(self.names.global_record(decl.name))
        } else {
            ty
        }
    }

    /// Type of a name declared inside a module namespace, looked up as a
    /// member of that module
    fn module_member_type(
        &self,
        module: &str,
        decl: &Declaration<'a>,
        ctx: &SearchContext<'_>,
    ) -> Option<Ty> {
        let _token = ctx.guard().enter(GuardKey::module_member(decl.id))?;
        let ty = self.guess_field_type(decl.name, &ClassTy::declared(module), ctx);
        (!ty.is_invalid()).then_some(ty)
    }
}
