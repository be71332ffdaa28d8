#[cfg(test)]
mod tests {
    use crate::annotations::TypeAnnotations;
    use crate::ast::{
        AstBuilder, BinaryOp, Expression, ExpressionKind, FileId, FunctionBody, UnaryOp,
    };
    use crate::config::InferenceOptions;
    use crate::context::{CancellationToken, SearchContext};
    use crate::declaration::{AssignedValues, Declaration};
    use crate::fs::MockFileSystem;
    use crate::inference::TypeInferrer;
    use crate::member_index::ClassMemberIndex;
    use crate::module_resolver::{ModuleConfig, ModuleId, PathModuleResolver};
    use crate::services::{ConstructorNamePolicy, NameResolver};
    use crate::state::InferenceMetrics;
    use crate::symbol_table::SymbolTable;
    use crate::types::{ClassTy, Ty};
    use bumpalo::Bump;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    struct Env<'a> {
        b: AstBuilder<'a>,
        names: SymbolTable<'a>,
        annotations: TypeAnnotations,
        members: ClassMemberIndex<'a>,
        modules: PathModuleResolver<'a>,
    }

    impl<'a> Env<'a> {
        fn new(arena: &'a Bump) -> Self {
            let mut fs = MockFileSystem::new();
            fs.add_file("/project/main.lua");
            fs.add_file("/project/shapes.lua");
            fs.add_file("/project/config.lua");

            let root = Path::new("/project");
            let config = ModuleConfig::from_options(&InferenceOptions::default(), root);
            let mut modules = PathModuleResolver::new(Arc::new(fs), config, root.to_path_buf());
            modules
                .registry_mut()
                .register(ModuleId::new(PathBuf::from("/project/main.lua")), FileId(0));

            Self {
                b: AstBuilder::new(arena, FileId(0)),
                names: SymbolTable::new(),
                annotations: TypeAnnotations::new(),
                members: ClassMemberIndex::new(),
                modules,
            }
        }

        fn inferrer(&self) -> TypeInferrer<'a, '_> {
            TypeInferrer::new(&self.names, &self.annotations, &self.members, &self.modules)
        }

        fn infer(&self, expr: &Expression<'a>) -> Ty {
            self.inferrer().infer_type(expr)
        }

        /// `local a, b = values`
        fn locals(
            &mut self,
            names: &[&str],
            values: &[&'a Expression<'a>],
        ) -> Vec<Declaration<'a>> {
            let values = self.b.list(values);
            names
                .iter()
                .enumerate()
                .map(|(index, name)| {
                    let decl = Declaration::local(self.b.next_id(), self.b.alloc_str(name))
                        .with_value(AssignedValues::new(values, index));
                    self.names.declare(decl);
                    decl
                })
                .collect()
        }

        fn local(&mut self, name: &str, values: &[&'a Expression<'a>]) -> Declaration<'a> {
            self.locals(&[name], values)[0]
        }

        fn local_function(&mut self, name: &str, body: &'a FunctionBody<'a>) -> Declaration<'a> {
            let decl = Declaration::local(self.b.next_id(), self.b.alloc_str(name)).with_body(body);
            self.names.declare(decl);
            decl
        }

        fn global(&mut self, name: &str, values: &[&'a Expression<'a>]) -> Declaration<'a> {
            let values = self.b.list(values);
            let decl = Declaration::global(self.b.next_id(), self.b.alloc_str(name))
                .with_value(AssignedValues::single(values));
            self.names.declare_global(decl);
            decl
        }

        /// A name reference bound at the current point of the program
        fn reference(&mut self, name: &str) -> &'a Expression<'a> {
            let expr = self.b.name(name);
            self.names.bind_reference(expr);
            expr
        }
    }

    #[test]
    fn test_infer_literals() {
        let arena = Bump::new();
        let env = Env::new(&arena);

        assert_eq!(env.infer(env.b.number(42.0)), Ty::Number);
        assert_eq!(env.infer(env.b.string("hi")), Ty::String);
        assert_eq!(env.infer(env.b.boolean(true)), Ty::Boolean);
        assert_eq!(env.infer(env.b.nil()), Ty::Nil);
        assert_eq!(env.infer(env.b.varargs()), Ty::Unknown);
    }

    #[test]
    fn test_infer_missing_expression() {
        let arena = Bump::new();
        let env = Env::new(&arena);
        let state = crate::context::QueryState::new();

        let ty = env.inferrer().infer_expr(None, &SearchContext::new(&state));
        assert_eq!(ty, Ty::Unknown);
    }

    #[test]
    fn test_infer_unary() {
        let arena = Bump::new();
        let env = Env::new(&arena);
        let b = &env.b;

        assert_eq!(env.infer(b.unary(UnaryOp::Minus, b.number(1.0))), Ty::Number);
        assert_eq!(env.infer(b.unary(UnaryOp::Length, b.string("abc"))), Ty::Number);
        assert_eq!(env.infer(b.unary(UnaryOp::Not, b.boolean(true))), Ty::Unknown);
        assert_eq!(env.infer(b.unary(UnaryOp::BitNot, b.number(1.0))), Ty::Unknown);
    }

    #[test]
    fn test_concat_and_comparison() {
        let arena = Bump::new();
        let env = Env::new(&arena);
        let b = &env.b;

        let concat = b.binary(BinaryOp::Concat, b.number(1.0), b.table(&[]));
        assert_eq!(env.infer(concat), Ty::String);

        for op in [
            BinaryOp::Equal,
            BinaryOp::NotEqual,
            BinaryOp::LessThan,
            BinaryOp::LessThanOrEqual,
            BinaryOp::GreaterThan,
            BinaryOp::GreaterThanOrEqual,
        ] {
            assert_eq!(env.infer(b.binary(op, b.string("a"), b.number(1.0))), Ty::Boolean);
        }
    }

    #[test]
    fn test_arithmetic_takes_left_operand() {
        let arena = Bump::new();
        let env = Env::new(&arena);
        let b = &env.b;

        assert_eq!(
            env.infer(b.binary(BinaryOp::Add, b.string("1"), b.number(2.0))),
            Ty::String
        );
        assert_eq!(
            env.infer(b.binary(BinaryOp::ShiftLeft, b.number(1.0), b.string("x"))),
            Ty::Number
        );
    }

    #[test]
    fn test_or_unions_and_and_keeps_left() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        let one = env.b.number(1.0);
        let text = env.b.string("s");
        env.local("a", &[one]);
        env.local("b", &[text]);
        let (a1, b1) = (env.reference("a"), env.reference("b"));
        let (a2, b2) = (env.reference("a"), env.reference("b"));
        let either = env.b.binary(BinaryOp::Or, a1, b1);
        let both = env.b.binary(BinaryOp::And, a2, b2);
        env.local("x", &[either]);
        env.local("y", &[both]);

        let x = env.reference("x");
        let y = env.reference("y");
        assert_eq!(env.infer(x), Ty::Number.union(Ty::String));
        assert_eq!(env.infer(y), Ty::Number);
    }

    #[test]
    fn test_incomplete_or_uses_left() {
        let arena = Bump::new();
        let env = Env::new(&arena);

        let incomplete = env
            .b
            .expr(ExpressionKind::Binary(BinaryOp::Or, env.b.number(1.0), None));
        assert_eq!(env.infer(incomplete), Ty::Number);
    }

    #[test]
    fn test_paren_and_table() {
        let arena = Bump::new();
        let env = Env::new(&arena);

        let table = env.b.table(&[]);
        assert_eq!(env.infer(table), Ty::table(table.id));
        assert_eq!(env.infer(env.b.paren(env.b.string("s"))), Ty::String);
        assert_eq!(env.infer(env.b.expr(ExpressionKind::Paren(None))), Ty::Unknown);
    }

    #[test]
    fn test_self_referencing_local_terminates() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);
        let metrics = Arc::new(InferenceMetrics::new());

        // local a = a
        let rhs = env.b.name("a");
        env.local("a", &[rhs]);
        env.names.bind_reference(rhs);

        let inferrer = env.inferrer().with_metrics(metrics.clone());
        assert_eq!(inferrer.infer_type(rhs), Ty::Unknown);
        assert!(metrics.summary().guard_hits >= 1);
    }

    #[test]
    fn test_self_referencing_global_keeps_record() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        // G = G
        let rhs = env.b.name("G");
        env.global("G", &[rhs]);

        assert_eq!(env.infer(rhs), Ty::global("G"));
    }

    #[test]
    fn test_global_unions_record() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        let one = env.b.number(1.0);
        env.global("G", &[one]);
        let reference = env.reference("G");

        assert_eq!(env.infer(reference), Ty::Number.union(Ty::global("G")));
    }

    #[test]
    fn test_undeclared_global_is_its_record() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        let reference = env.reference("undeclared");
        assert_eq!(env.infer(reference), Ty::global("undeclared"));
    }

    #[test]
    fn test_declared_type_wins_over_value() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        let one = env.b.number(1.0);
        let decl = env.local("x", &[one]);
        env.annotations.annotate(decl.id, Ty::class("Meters"));
        let reference = env.reference("x");

        assert_eq!(env.infer(reference), Ty::class("Meters"));
    }

    #[test]
    fn test_invalid_annotation_falls_back_to_value() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        let one = env.b.number(1.0);
        let decl = env.local("x", &[one]);
        env.annotations.annotate(decl.id, Ty::Invalid);
        let reference = env.reference("x");

        assert_eq!(env.infer(reference), Ty::Number);
    }

    #[test]
    fn test_multi_value_assignment() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        // local function pair() return 1, "s" end
        let one = env.b.number(1.0);
        let text = env.b.string("s");
        let body = env.b.function_body(&[], &[&[one, text]]);
        env.local_function("pair", body);

        // local a, b, c = pair()
        let callee = env.reference("pair");
        let call = env.b.call(callee, &[]);
        env.locals(&["a", "b", "c"], &[call]);

        let a = env.reference("a");
        let b = env.reference("b");
        let c = env.reference("c");
        assert_eq!(env.infer(a), Ty::Number);
        assert_eq!(env.infer(b), Ty::String);
        assert_eq!(env.infer(c), Ty::Nil);
    }

    #[test]
    fn test_missing_values_are_nil() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        // local a, b = 1
        let one = env.b.number(1.0);
        env.locals(&["a", "b"], &[one]);
        // local c, d = ...
        let varargs = env.b.varargs();
        env.locals(&["c", "d"], &[varargs]);

        let b = env.reference("b");
        let d = env.reference("d");
        assert_eq!(env.infer(b), Ty::Nil);
        assert_eq!(env.infer(d), Ty::Unknown);
    }

    #[test]
    fn test_closure_function_type() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        // local function first(x, y) return x end
        let x = env.b.param("x");
        let y = env.b.param("y");
        env.annotations.annotate(x.id, Ty::Number);
        env.names.enter_scope();
        env.names.declare(Declaration::parameter(x.id, x.name));
        env.names.declare(Declaration::parameter(y.id, y.name));
        let returned = env.reference("x");
        env.names.exit_scope();
        let body = env.b.function_body(&[x, y], &[&[returned]]);
        env.local_function("first", body);

        let reference = env.reference("first");
        let ty = env.infer(reference);
        assert_eq!(ty.to_string(), "fun(x: number, y: unknown): number");

        let callee = env.reference("first");
        let call = env.b.call(callee, &[env.b.number(1.0)]);
        assert_eq!(env.infer(call), Ty::Number);
    }

    #[test]
    fn test_return_annotation_overrides_body() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        let nil = env.b.nil();
        let body = env.b.function_body(&[], &[&[nil]]);
        env.annotations.annotate(body.id, Ty::class("Widget"));
        let closure = env.b.closure(body);

        assert_eq!(env.infer(closure).to_string(), "fun(): Widget");
    }

    #[test]
    fn test_call_unions_every_signature() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        let decl = env.local("overloaded", &[]);
        env.annotations.annotate(
            decl.id,
            Ty::function(vec![
                crate::types::Signature::new(vec![], vec![Ty::Number]),
                crate::types::Signature::new(vec![], vec![Ty::String]),
            ]),
        );
        let callee = env.reference("overloaded");
        let call = env.b.call(callee, &[]);

        assert_eq!(env.infer(call), Ty::Number.union(Ty::String));
    }

    #[test]
    fn test_class_callee_constructs_instance() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        let decl = env.local("Foo", &[]);
        env.annotations.annotate(decl.id, Ty::class("Foo"));
        let callee = env.reference("Foo");
        let call = env.b.call(callee, &[]);

        assert_eq!(env.infer(call), Ty::class("Foo"));
    }

    #[test]
    fn test_recursive_function_terminates() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        // local function loop() return loop() end
        let inner_callee = env.b.name("loop");
        let inner = env.b.call(inner_callee, &[]);
        let body = env.b.function_body(&[], &[&[inner]]);
        env.local_function("loop", body);
        env.names.bind_reference(inner_callee);

        let callee = env.reference("loop");
        let call = env.b.call(callee, &[]);
        assert_eq!(env.infer(call), Ty::Unknown);
    }

    struct BodyOnlyResolver<'a> {
        body: &'a FunctionBody<'a>,
    }

    impl<'a> NameResolver<'a> for BodyOnlyResolver<'a> {
        fn resolve_candidates(
            &self,
            _name: &Expression<'a>,
            _ctx: &SearchContext<'_>,
        ) -> Vec<Declaration<'a>> {
            Vec::new()
        }

        fn is_global_binding(&self, _name: &Expression<'a>) -> bool {
            false
        }

        fn declaration_at(&self, _target: &Expression<'a>) -> Option<Declaration<'a>> {
            None
        }

        fn resolve_function_body(
            &self,
            _callee: &Expression<'a>,
            _ctx: &SearchContext<'_>,
        ) -> Option<&'a FunctionBody<'a>> {
            Some(self.body)
        }
    }

    #[test]
    fn test_call_falls_back_to_function_body() {
        let arena = Bump::new();
        let env = Env::new(&arena);

        let text = env.b.string("s");
        let body = env.b.function_body(&[], &[&[text]]);
        let names = BodyOnlyResolver { body };
        let inferrer = TypeInferrer::new(&names, &env.annotations, &env.members, &env.modules);

        let call = env.b.call(env.b.name("opaque"), &[]);
        assert_eq!(inferrer.infer_type(call), Ty::String);
    }

    #[test]
    fn test_constructor_name_idiom() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        // local Point = {}
        let table = env.b.table(&[]);
        env.local("Point", &[table]);

        let (first, second) = (env.reference("Point"), env.reference("Point"));
        let new = env.b.call(env.b.field(first, "new"), &[]);
        let create = env.b.call(env.b.field(second, "create"), &[]);

        assert_eq!(env.infer(new), Ty::table(table.id));
        assert_eq!(env.infer(create), Ty::Unknown);
    }

    struct CreatePolicy;

    impl ConstructorNamePolicy for CreatePolicy {
        fn is_constructor_name(&self, name: &str) -> bool {
            name.starts_with("create")
        }
    }

    #[test]
    fn test_custom_constructor_policy() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        let table = env.b.table(&[]);
        env.local("Point", &[table]);
        let point = env.reference("Point");
        let create = env.b.call(env.b.field(point, "createAt"), &[]);

        let policy = CreatePolicy;
        let inferrer = env.inferrer().with_constructor_policy(&policy);
        assert_eq!(inferrer.infer_type(create), Ty::table(table.id));
    }

    #[test]
    fn test_require_declared_export() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);
        env.modules.registry_mut().register_typed(
            ModuleId::new(PathBuf::from("/project/shapes.lua")),
            FileId(1),
            Ty::class("Shape"),
        );

        let callee = env.reference("require");
        let require = env.b.call(callee, &[env.b.string("shapes")]);
        assert_eq!(env.infer(require), Ty::class("Shape"));
    }

    #[test]
    fn test_require_returned_expression() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);
        let other = AstBuilder::new(&arena, FileId(2));
        let exported = other.table(&[]);
        env.modules.registry_mut().register_returning(
            ModuleId::new(PathBuf::from("/project/config.lua")),
            FileId(2),
            exported,
        );

        let callee = env.reference("require");
        let require = env.b.call(callee, &[env.b.string("config")]);
        assert_eq!(env.infer(require), Ty::table(exported.id));
    }

    #[test]
    fn test_require_cycle_terminates() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);
        let other = AstBuilder::new(&arena, FileId(2));
        // config.lua: return require("config")
        let self_require = other.call(other.name("require"), &[other.string("config")]);
        env.modules.registry_mut().register_returning(
            ModuleId::new(PathBuf::from("/project/config.lua")),
            FileId(2),
            self_require,
        );

        let callee = env.reference("require");
        let require = env.b.call(callee, &[env.b.string("config")]);
        assert_eq!(env.infer(require), Ty::Unknown);
    }

    #[test]
    fn test_require_unresolved() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);
        let metrics = Arc::new(InferenceMetrics::new());

        let (first, second) = (env.reference("require"), env.reference("require"));
        let path = env.reference("path");
        let missing = env.b.call(first, &[env.b.string("missing")]);
        let dynamic = env.b.call(second, &[path]);

        let inferrer = env.inferrer().with_metrics(metrics.clone());
        assert_eq!(inferrer.infer_type(missing), Ty::Unknown);
        assert_eq!(inferrer.infer_type(dynamic), Ty::Unknown);
        assert_eq!(metrics.summary().module_resolutions, 1);
        assert_eq!(metrics.module_failures.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_bracket_index_on_array_and_map() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        let xs = env.local("xs", &[]);
        env.annotations.annotate(xs.id, Ty::array(Ty::Number));
        let map = env.local("map", &[]);
        env.annotations.annotate(map.id, Ty::map(Ty::String, Ty::Boolean));

        let (xs, map, key) = (env.reference("xs"), env.reference("map"), env.reference("key"));
        let element = env.b.bracket(xs, env.b.number(1.0));
        let value = env.b.bracket(map, key);
        assert_eq!(env.infer(element), Ty::Number);
        assert_eq!(env.infer(value), Ty::Boolean);
    }

    #[test]
    fn test_field_from_table_constructor() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        // local t = { x = 1 }
        let one = env.b.number(1.0);
        let table = env.b.table(&[env.b.named_field("x", one)]);
        env.members.index_table_constructor(table);
        env.local("t", &[table]);

        let refs = [env.reference("t"), env.reference("t"), env.reference("t")];
        let field = env.b.field(refs[0], "x");
        let quoted = env.b.bracket(refs[1], env.b.string("x"));
        let missing = env.b.field(refs[2], "y");
        assert_eq!(env.infer(field), Ty::Number);
        assert_eq!(env.infer(quoted), Ty::Number);
        assert_eq!(env.infer(missing), Ty::Unknown);
    }

    #[test]
    fn test_field_from_assignment() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        // local obj = {}; obj.name = "n"
        let table = env.b.table(&[]);
        env.local("obj", &[table]);
        let object = env.reference("obj");
        let target = env.b.field(object, "name");
        let value = env.b.list(&[env.b.string("n")]);
        let decl = Declaration::field(target.id, "name").with_value(AssignedValues::single(value));
        env.names.set_assignment_target(target, decl);
        env.members.add_member(&ClassTy::table(table.id), decl);

        let object = env.reference("obj");
        let read = env.b.field(object, "name");
        assert_eq!(env.infer(target), Ty::String);
        assert_eq!(env.infer(read), Ty::String);
    }

    #[test]
    fn test_annotated_index_short_circuits() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        let one = env.b.number(1.0);
        let table = env.b.table(&[env.b.named_field("x", one)]);
        env.members.index_table_constructor(table);
        env.local("t", &[table]);
        let object = env.reference("t");
        let field = env.b.field(object, "x");
        env.annotations.annotate(field.id, Ty::Boolean);

        assert_eq!(env.infer(field), Ty::Boolean);
    }

    #[test]
    fn test_module_member_declaration() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        let decl = Declaration::local(env.b.next_id(), "helper").in_module("util");
        env.names.declare(decl);
        let member = Declaration::field(env.b.next_id(), "helper");
        env.annotations.annotate(member.id, Ty::String);
        env.members.add_member(&ClassTy::declared("util"), member);

        let reference = env.reference("helper");
        assert_eq!(env.infer(reference), Ty::String);
    }

    #[test]
    fn test_module_member_self_lookup_terminates() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        let one = env.b.number(1.0);
        let values = env.b.list(&[one]);
        let decl = Declaration::local(env.b.next_id(), "count")
            .in_module("util")
            .with_value(AssignedValues::single(values));
        env.names.declare(decl);
        env.members.add_member(&ClassTy::declared("util"), decl);

        let reference = env.reference("count");
        assert_eq!(env.infer(reference), Ty::Number);
    }

    #[test]
    fn test_depth_limit_yields_unknown() {
        let arena = Bump::new();
        let env = Env::new(&arena);
        let metrics = Arc::new(InferenceMetrics::new());

        let mut expr = env.b.number(1.0);
        for _ in 0..4 {
            expr = env.b.paren(expr);
        }

        let options = InferenceOptions {
            max_depth: 3,
            ..InferenceOptions::default()
        };
        let shallow = env
            .inferrer()
            .with_options(options)
            .with_metrics(metrics.clone());
        assert_eq!(shallow.infer_type(expr), Ty::Unknown);
        assert_eq!(metrics.summary().depth_limit_hits, 1);
        assert_eq!(env.infer(expr), Ty::Number);
    }

    #[test]
    fn test_cancelled_query_yields_unknown() {
        let arena = Bump::new();
        let env = Env::new(&arena);
        let metrics = Arc::new(InferenceMetrics::new());
        let inferrer = env.inferrer().with_metrics(metrics.clone());
        let expr = env.b.number(1.0);

        let token = CancellationToken::new();
        assert_eq!(inferrer.infer_type_cancellable(expr, &token), Ty::Number);

        token.cancel();
        assert_eq!(inferrer.infer_type_cancellable(expr, &token), Ty::Unknown);
        let summary = metrics.summary();
        assert_eq!(summary.queries, 2);
        assert_eq!(summary.cancellations, 1);
    }

    #[test]
    fn test_wrapper_chain_is_inferred_once_per_call() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);
        let metrics = Arc::new(InferenceMetrics::new());
        const DEPTH: usize = 40;

        // local function f0(x) return x end
        let x = env.b.param("x");
        env.names.enter_scope();
        env.names.declare(Declaration::parameter(x.id, x.name));
        let returned = env.reference("x");
        env.names.exit_scope();
        let body = env.b.function_body(&[x], &[&[returned]]);
        env.local_function("f0", body);

        // local function fi() return f{i-1}() end
        for i in 1..=DEPTH {
            let callee = env.reference(&format!("f{}", i - 1));
            let call = env.b.call(callee, &[]);
            let body = env.b.function_body(&[], &[&[call]]);
            env.local_function(&format!("f{}", i), body);
        }

        let callee = env.reference(&format!("f{}", DEPTH));
        let call = env.b.call(callee, &[]);
        let inferrer = env.inferrer().with_metrics(metrics.clone());
        assert_eq!(inferrer.infer_type(call), Ty::Unknown);

        let summary = metrics.summary();
        assert!(
            summary.expressions_inferred <= 4 * (DEPTH + 2),
            "inferred {} expressions for a chain of {}",
            summary.expressions_inferred,
            DEPTH
        );
    }

    #[test]
    fn test_repeated_field_increments_stay_linear() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);
        let metrics = Arc::new(InferenceMetrics::new());
        const ASSIGNMENTS: usize = 24;

        // local t = { x = 0 }
        let zero = env.b.number(0.0);
        let table = env.b.table(&[env.b.named_field("x", zero)]);
        env.members.index_table_constructor(table);
        env.local("t", &[table]);

        // t.x = t.x + 1, repeated
        for _ in 0..ASSIGNMENTS {
            let (object, source) = (env.reference("t"), env.reference("t"));
            let target = env.b.field(object, "x");
            let read = env.b.field(source, "x");
            let sum = env.b.binary(BinaryOp::Add, read, env.b.number(1.0));
            let value = env.b.list(&[sum]);
            let decl =
                Declaration::field(target.id, "x").with_value(AssignedValues::single(value));
            env.names.set_assignment_target(target, decl);
            env.members.add_member(&ClassTy::table(table.id), decl);
        }

        let object = env.reference("t");
        let read = env.b.field(object, "x");
        let inferrer = env.inferrer().with_metrics(metrics.clone());
        assert_eq!(inferrer.infer_type(read), Ty::Number);

        let summary = metrics.summary();
        assert!(
            summary.expressions_inferred <= 6 * (ASSIGNMENTS + 2),
            "inferred {} expressions for {} increments",
            summary.expressions_inferred,
            ASSIGNMENTS
        );
    }

    #[test]
    fn test_memoized_results_do_not_leak_across_queries() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        let one = env.b.number(1.0);
        env.global("G", &[one]);
        let reference = env.reference("G");
        let inferrer = env.inferrer();
        let first = inferrer.infer_type(reference);

        // a later assignment is seen by the next query
        let text = env.b.string("s");
        env.global("G", &[text]);
        let second = env.infer(reference);

        assert_eq!(first, Ty::Number.union(Ty::global("G")));
        assert!(second.contains(&Ty::String));
    }

    #[test]
    fn test_inference_is_idempotent() {
        let arena = Bump::new();
        let mut env = Env::new(&arena);

        let one = env.b.number(1.0);
        let text = env.b.string("s");
        env.global("G", &[one]);
        env.global("G", &[text]);
        let reference = env.reference("G");

        let first = env.infer(reference);
        assert_eq!(first, env.infer(reference));
        assert!(first.contains(&Ty::Number.union(Ty::String)));
    }
}
