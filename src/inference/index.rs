use super::TypeInferrer;
use crate::ast::{Expression, IndexExpression};
use crate::context::SearchContext;
use crate::state::InferenceMetrics;
use crate::types::Ty;
use tracing::{debug, instrument};

impl<'a> TypeInferrer<'a, '_> {
    #[instrument(level = "trace", skip_all, fields(node = %expr.id, field = index.name()))]
    pub(super) fn infer_index(
        &self,
        expr: &Expression<'a>,
        index: &IndexExpression<'a>,
        ctx: &SearchContext<'_>,
    ) -> Ty {
        let Some(_token) = ctx.guard().enter(ctx.key(expr.id)) else {
            debug!("Recursion guard hit on index");
            self.record(InferenceMetrics::record_guard_hit);
            return Ty::Unknown;
        };
        let ctx = ctx.first();

        // t[k]: element of an array, else value of a table<K, V>
        let mut parent = None;
        if index.is_bracket() {
            let parent_ty = self.infer_expr(Some(index.object), &ctx);
            if let Some(element) = parent_ty.find_array_element() {
                return element.clone();
            }
            if let Some(generic) = parent_ty.find_generic() {
                return generic.param(1);
            }
            parent = Some(parent_ty);
        }

        let target = self.names.declaration_at(expr);
        let declared = self.declared.declared_type(expr.id).or_else(|| {
            let decl = target.filter(|decl| decl.id != expr.id)?;
            self.declared.declared_type(decl.id)
        });
        if let Some(ty) = declared {
            return ty;
        }

        // obj.field = value
        let mut ty = Ty::Unknown;
        if let Some(value) = target.and_then(|decl| decl.value) {
            ty = ty.union(self.guess_type_at(value.values, value.index, &ctx));
        }

        if let Some(field) = index.name() {
            let parent = parent.unwrap_or_else(|| self.infer_expr(Some(index.object), &ctx));
            for class in parent.classes() {
                ty = ty.union(self.guess_field_type(field, class, &ctx));
            }
        }

        ty
    }
}
