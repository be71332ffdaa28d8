use super::TypeInferrer;
use crate::ast::{Expression, ExpressionKind};
use crate::context::SearchContext;
use crate::services::ModuleExport;
use crate::state::InferenceMetrics;
use crate::types::Ty;
use tracing::{debug, instrument};

impl<'a> TypeInferrer<'a, '_> {
    /// Result type of a call
    ///
    /// Every applicable source contributes: signatures of the callee type,
    /// class callees as constructors, the body of a locally resolved
    /// function, and the owner of a constructor-named method.
    #[instrument(level = "trace", skip_all, fields(node = %expr.id, index = ctx.index()))]
    pub(super) fn infer_call(
        &self,
        expr: &Expression<'a>,
        callee: &Expression<'a>,
        args: &[&Expression<'a>],
        ctx: &SearchContext<'_>,
    ) -> Ty {
        let Some(_token) = ctx.guard().enter(ctx.key(expr.id)) else {
            debug!("Recursion guard hit on call");
            self.record(InferenceMetrics::record_guard_hit);
            return Ty::Unknown;
        };

        if let Some(name) = callee.name() {
            if self.options.is_require_function(name) {
                return self.infer_require(expr, args, ctx);
            }
        }

        let mut ret = Ty::Unknown;
        let callee_ty = self.infer_expr(Some(callee), &ctx.first());
        for member in callee_ty.members() {
            match member {
                Ty::Function(function) => {
                    for signature in &function.signatures {
                        ret = ret.union(signature.return_ty_at(ctx.index()));
                    }
                }
                // a callable class constructs an instance of itself
                Ty::Class(_) if ctx.index() == 0 => ret = ret.union(member.clone()),
                _ => {}
            }
        }

        if ret.is_invalid() {
            if let Some(body) = self.names.resolve_function_body(callee, ctx) {
                ret = self.return_type(body, ctx);
            }
        }

        // Class.new()
        if let ExpressionKind::Index(index) = callee.kind {
            let constructs = index.name().is_some_and(|name| self.is_constructor_name(name));
            if constructs && ctx.index() == 0 {
                ret = ret.union(self.infer_expr(Some(index.object), &ctx.first()));
            }
        }

        ret
    }

    /// Export type of the module named by a require call's string argument
    fn infer_require(
        &self,
        expr: &Expression<'a>,
        args: &[&Expression<'a>],
        ctx: &SearchContext<'_>,
    ) -> Ty {
        let Some(path) = expr.first_string_arg() else {
            debug!(args = args.len(), "Require without a literal path");
            return Ty::Unknown;
        };

        let handle = self.modules.resolve(path, expr.id.file);
        self.record(|metrics| metrics.record_module_resolution(handle.is_some()));
        let Some(handle) = handle else {
            debug!(path, "Unresolved require");
            return Ty::Unknown;
        };

        match self.modules.module_export(&handle) {
            Some(ModuleExport::Type(ty)) => ty,
            Some(ModuleExport::Expression(returned)) => {
                self.infer_expr(Some(returned), &ctx.first())
            }
            None => Ty::Unknown,
        }
    }
}
