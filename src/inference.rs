//! Demand-driven expression type inference
//!
//! [`TypeInferrer`] answers "what is the type of this expression?" for any
//! node of an indexed program. Each top-level query owns a fresh
//! [`QueryState`]; the inferrer itself is shared and immutable, so one
//! instance can serve queries from several threads.

mod call;
mod index;
mod name;

use crate::ast::{BinaryOp, Expression, ExpressionKind, FunctionBody, Literal, UnaryOp};
use crate::config::InferenceOptions;
use crate::context::{CancellationToken, QueryState, SearchContext};
use crate::declaration::Declaration;
use crate::services::{
    ConstructorNamePolicy, DeclaredTypeSource, MemberLookup, ModuleResolver, NameResolver,
};
use crate::state::InferenceMetrics;
use crate::types::{ClassTy, Parameter, Ty};
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// Expression type inferencer over a set of host services
pub struct TypeInferrer<'a, 's> {
    names: &'s dyn NameResolver<'a>,
    declared: &'s dyn DeclaredTypeSource,
    members: &'s dyn MemberLookup<'a>,
    modules: &'s dyn ModuleResolver<'a>,
    constructors: Option<&'s dyn ConstructorNamePolicy>,
    options: InferenceOptions,
    metrics: Option<Arc<InferenceMetrics>>,
}

impl<'a, 's> TypeInferrer<'a, 's> {
    pub fn new(
        names: &'s dyn NameResolver<'a>,
        declared: &'s dyn DeclaredTypeSource,
        members: &'s dyn MemberLookup<'a>,
        modules: &'s dyn ModuleResolver<'a>,
    ) -> Self {
        Self {
            names,
            declared,
            members,
            modules,
            constructors: None,
            options: InferenceOptions::default(),
            metrics: None,
        }
    }

    pub fn with_options(mut self, options: InferenceOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a host policy for constructor names instead of the configured list
    pub fn with_constructor_policy(mut self, policy: &'s dyn ConstructorNamePolicy) -> Self {
        self.constructors = Some(policy);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<InferenceMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn options(&self) -> &InferenceOptions {
        &self.options
    }

    pub fn metrics(&self) -> Option<&Arc<InferenceMetrics>> {
        self.metrics.as_ref()
    }

    /// Type of `expr`, computed in a fresh query
    #[instrument(level = "debug", skip_all, fields(node = %expr.id))]
    pub fn infer_type(&self, expr: &Expression<'a>) -> Ty {
        self.record(InferenceMetrics::record_query);
        let state = QueryState::new();
        let ty = self.infer_expr(Some(expr), &SearchContext::new(&state));
        debug!(ty = %ty, "Inferred expression type");
        ty
    }

    /// Like [`TypeInferrer::infer_type`], abandoning the query with Unknown
    /// once `token` is cancelled
    #[instrument(level = "debug", skip_all, fields(node = %expr.id))]
    pub fn infer_type_cancellable(&self, expr: &Expression<'a>, token: &CancellationToken) -> Ty {
        self.record(InferenceMetrics::record_query);
        let state = QueryState::with_cancellation(token.clone());
        let ty = self.infer_expr(Some(expr), &SearchContext::new(&state));
        if state.is_cancelled() {
            debug!("Query cancelled");
            self.record(InferenceMetrics::record_cancellation);
            return Ty::Unknown;
        }
        ty
    }

    /// Type of `expr` within a running query; `None` yields Unknown
    pub fn infer_expr(&self, expr: Option<&Expression<'a>>, ctx: &SearchContext<'_>) -> Ty {
        let Some(expr) = expr else {
            return Ty::Unknown;
        };
        let state = ctx.state();
        if state.is_cancelled() {
            return Ty::Unknown;
        }
        let key = ctx.key(expr.id);
        if let Some(ty) = state.memoized(key) {
            return ty;
        }
        let Some(depth) = state.descend(self.options.max_depth) else {
            debug!(node = %expr.id, depth = state.depth(), "Depth limit reached");
            self.record(InferenceMetrics::record_depth_limit);
            return Ty::Unknown;
        };
        self.record(InferenceMetrics::record_expression);
        trace!(node = %expr.id, index = ctx.index(), "Inferring expression");

        let truncations = state.truncations();
        let ty = self.dispatch(expr, ctx);
        drop(depth);

        // A key still in flight returned a guard placeholder, and results cut
        // short by the depth limit depend on where they were reached
        let settled = state.truncations() == truncations && !ctx.guard().is_active(key);
        if settled && !state.is_cancelled() {
            state.memoize(key, ty.clone());
        }
        ty
    }

    fn dispatch(&self, expr: &Expression<'a>, ctx: &SearchContext<'_>) -> Ty {
        match expr.kind {
            ExpressionKind::Unary(op, operand) => self.infer_unary(op, operand, ctx),
            ExpressionKind::Binary(op, left, right) => self.infer_binary(op, left, right, ctx),
            ExpressionKind::Call(callee, args) => self.infer_call(expr, callee, args, ctx),
            ExpressionKind::Closure(body) => self.function_type(body, ctx),
            ExpressionKind::Table(_) => Ty::table(expr.id),
            ExpressionKind::Paren(inner) => self.infer_expr(inner, &ctx.first()),
            ExpressionKind::Name(name) => self.infer_name(expr, name, ctx),
            ExpressionKind::Literal(literal) => infer_literal(literal),
            ExpressionKind::Index(index) => self.infer_index(expr, &index, ctx),
        }
    }

    fn infer_unary(&self, op: UnaryOp, operand: &Expression<'a>, ctx: &SearchContext<'_>) -> Ty {
        match op {
            UnaryOp::Minus => self.infer_expr(Some(operand), &ctx.first()),
            UnaryOp::Length => Ty::Number,
            UnaryOp::Not | UnaryOp::BitNot => Ty::Unknown,
        }
    }

    fn infer_binary(
        &self,
        op: BinaryOp,
        left: &Expression<'a>,
        right: Option<&Expression<'a>>,
        ctx: &SearchContext<'_>,
    ) -> Ty {
        let ctx = ctx.first();
        match op {
            BinaryOp::Concat => Ty::String,
            BinaryOp::Equal
            | BinaryOp::NotEqual
            | BinaryOp::LessThan
            | BinaryOp::LessThanOrEqual
            | BinaryOp::GreaterThan
            | BinaryOp::GreaterThanOrEqual => Ty::Boolean,
            BinaryOp::Or => {
                let left = self.infer_expr(Some(left), &ctx);
                match right {
                    Some(right) => left.union(self.infer_expr(Some(right), &ctx)),
                    None => left,
                }
            }
            // right-hand narrowing is not modelled
            BinaryOp::And => self.infer_expr(Some(left), &ctx),
            // operator overloads are not resolved; the left operand decides
            BinaryOp::Add
            | BinaryOp::Subtract
            | BinaryOp::Multiply
            | BinaryOp::Divide
            | BinaryOp::FloorDivide
            | BinaryOp::Modulo
            | BinaryOp::Power
            | BinaryOp::BitwiseAnd
            | BinaryOp::BitwiseOr
            | BinaryOp::BitwiseXor
            | BinaryOp::ShiftLeft
            | BinaryOp::ShiftRight => self.infer_expr(Some(left), &ctx),
        }
    }

    /// Type of the value at `index` of an expression list
    ///
    /// Positions past the end take the extra results of a trailing call or
    /// `...`; otherwise they are nil.
    pub fn guess_type_at(
        &self,
        values: &[&Expression<'a>],
        index: usize,
        ctx: &SearchContext<'_>,
    ) -> Ty {
        if let Some(value) = values.get(index) {
            return self.infer_expr(Some(*value), &ctx.first());
        }
        match values.last() {
            Some(last) if last.is_multi_valued() => {
                let slot = index - (values.len() - 1);
                self.infer_expr(Some(*last), &ctx.with_index(slot))
            }
            _ => Ty::Nil,
        }
    }

    /// Type of a declaration: its annotation, else its function body, else
    /// the value assigned to it
    pub fn declaration_type(&self, decl: &Declaration<'a>, ctx: &SearchContext<'_>) -> Ty {
        if let Some(ty) = self.declared.declared_type(decl.id) {
            if !ty.is_invalid() {
                return ty;
            }
        }
        if let Some(body) = decl.body {
            return self.function_type(body, ctx);
        }
        match decl.value {
            Some(value) => self.guess_type_at(value.values, value.index, ctx),
            None => Ty::Unknown,
        }
    }

    /// Function type of a body from its annotations and `return` statements
    pub fn function_type(&self, body: &FunctionBody<'a>, ctx: &SearchContext<'_>) -> Ty {
        let params = body
            .params
            .iter()
            .map(|param| {
                let ty = self.declared.declared_type(param.id).unwrap_or(Ty::Unknown);
                Parameter::new(param.name, ty)
            })
            .collect();

        let returns = match self.declared.declared_type(body.id) {
            Some(ty) => vec![ty],
            None => {
                let arity = body.returns.iter().map(|values| values.len()).max();
                (0..arity.unwrap_or(0))
                    .map(|slot| {
                        Ty::union_all(
                            body.returns
                                .iter()
                                .map(|values| self.guess_type_at(values, slot, ctx)),
                        )
                    })
                    .collect()
            }
        };

        Ty::simple_function(params, returns)
    }

    /// Type of the `ctx.index()`-th value returned by a body
    pub fn return_type(&self, body: &FunctionBody<'a>, ctx: &SearchContext<'_>) -> Ty {
        if let Some(ty) = self.declared.declared_type(body.id) {
            return if ctx.index() == 0 { ty } else { Ty::Nil };
        }
        Ty::union_all(
            body.returns
                .iter()
                .map(|values| self.guess_type_at(values, ctx.index(), ctx)),
        )
    }

    /// Union of the types of every known declaration of `field` in `class`
    pub fn guess_field_type(&self, field: &str, class: &ClassTy, ctx: &SearchContext<'_>) -> Ty {
        Ty::union_all(
            self.members
                .all_declarations_of(class, field, ctx)
                .iter()
                .map(|decl| self.declaration_type(decl, &ctx.first())),
        )
    }

    fn is_constructor_name(&self, name: &str) -> bool {
        match self.constructors {
            Some(policy) => policy.is_constructor_name(name),
            None => self.options.is_constructor_name(name),
        }
    }

    fn record(&self, f: impl FnOnce(&InferenceMetrics)) {
        if let Some(metrics) = &self.metrics {
            f(metrics.as_ref());
        }
    }
}

impl std::fmt::Debug for TypeInferrer<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeInferrer")
            .field("options", &self.options)
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

fn infer_literal(literal: Literal<'_>) -> Ty {
    match literal {
        Literal::Nil => Ty::Nil,
        Literal::Boolean(_) => Ty::Boolean,
        Literal::Number(_) => Ty::Number,
        Literal::String(_) => Ty::String,
        Literal::Varargs => Ty::Unknown,
    }
}

#[cfg(test)]
mod inference_tests;
