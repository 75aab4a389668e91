use rustpython_parser::ast::*;

/// Visitor for traversing Python AST with extensible callbacks
///
/// Every `visit_*` method defaults to a full traversal of its node, so an
/// implementor overrides only the hooks it cares about. Overrides that still
/// want the children walked call the matching `walk_*` method.
pub trait AstVisitor {
    fn visit_module(&mut self, module: &Mod) {
        self.walk_module(module)
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        self.walk_stmt(stmt)
    }

    fn visit_expr(&mut self, expr: &Expr) {
        self.walk_expr(expr)
    }

    fn visit_pattern(&mut self, pattern: &Pattern) {
        self.walk_pattern(pattern)
    }

    fn visit_body(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.visit_stmt(stmt);
        }
    }

    fn visit_exprs(&mut self, exprs: &[Expr]) {
        for expr in exprs {
            self.visit_expr(expr);
        }
    }

    fn visit_arguments(&mut self, args: &Arguments) {
        self.walk_arguments(args)
    }

    fn visit_comprehension(&mut self, comprehension: &Comprehension) {
        self.walk_comprehension(comprehension)
    }

    // Statements

    fn visit_function_def(&mut self, func: &StmtFunctionDef) {
        self.visit_exprs(&func.decorator_list);
        self.walk_type_params(&func.type_params);
        self.visit_arguments(&func.args);
        if let Some(returns) = &func.returns {
            self.visit_expr(returns);
        }
        self.visit_body(&func.body);
    }

    fn visit_async_function_def(&mut self, func: &StmtAsyncFunctionDef) {
        self.visit_exprs(&func.decorator_list);
        self.walk_type_params(&func.type_params);
        self.visit_arguments(&func.args);
        if let Some(returns) = &func.returns {
            self.visit_expr(returns);
        }
        self.visit_body(&func.body);
    }

    fn visit_class_def(&mut self, class: &StmtClassDef) {
        self.visit_exprs(&class.decorator_list);
        self.walk_type_params(&class.type_params);
        self.visit_exprs(&class.bases);
        self.walk_keywords(&class.keywords);
        self.visit_body(&class.body);
    }

    fn visit_return(&mut self, ret: &StmtReturn) {
        if let Some(value) = &ret.value {
            self.visit_expr(value);
        }
    }

    fn visit_delete(&mut self, del: &StmtDelete) {
        self.visit_exprs(&del.targets);
    }

    fn visit_assign(&mut self, assign: &StmtAssign) {
        self.visit_expr(&assign.value);
        self.visit_exprs(&assign.targets);
    }

    fn visit_aug_assign(&mut self, aug: &StmtAugAssign) {
        self.visit_expr(&aug.target);
        self.visit_expr(&aug.value);
    }

    fn visit_ann_assign(&mut self, ann: &StmtAnnAssign) {
        self.visit_expr(&ann.annotation);
        if let Some(value) = &ann.value {
            self.visit_expr(value);
        }
        self.visit_expr(&ann.target);
    }

    fn visit_for(&mut self, for_stmt: &StmtFor) {
        self.walk_for(for_stmt)
    }

    fn visit_async_for(&mut self, for_stmt: &StmtAsyncFor) {
        self.visit_expr(&for_stmt.iter);
        self.visit_expr(&for_stmt.target);
        self.visit_body(&for_stmt.body);
        self.visit_body(&for_stmt.orelse);
    }

    fn visit_while(&mut self, while_stmt: &StmtWhile) {
        self.visit_expr(&while_stmt.test);
        self.visit_body(&while_stmt.body);
        self.visit_body(&while_stmt.orelse);
    }

    fn visit_if(&mut self, if_stmt: &StmtIf) {
        self.visit_expr(&if_stmt.test);
        self.visit_body(&if_stmt.body);
        self.visit_body(&if_stmt.orelse);
    }

    fn visit_with(&mut self, with: &StmtWith) {
        self.walk_with_items(&with.items);
        self.visit_body(&with.body);
    }

    fn visit_async_with(&mut self, with: &StmtAsyncWith) {
        self.walk_with_items(&with.items);
        self.visit_body(&with.body);
    }

    fn visit_match(&mut self, match_stmt: &StmtMatch) {
        self.visit_expr(&match_stmt.subject);
        for case in &match_stmt.cases {
            self.visit_pattern(&case.pattern);
            if let Some(guard) = &case.guard {
                self.visit_expr(guard);
            }
            self.visit_body(&case.body);
        }
    }

    fn visit_raise(&mut self, raise: &StmtRaise) {
        if let Some(exc) = &raise.exc {
            self.visit_expr(exc);
        }
        if let Some(cause) = &raise.cause {
            self.visit_expr(cause);
        }
    }

    fn visit_try(&mut self, try_stmt: &StmtTry) {
        self.visit_body(&try_stmt.body);
        self.walk_handlers(&try_stmt.handlers);
        self.visit_body(&try_stmt.orelse);
        self.visit_body(&try_stmt.finalbody);
    }

    fn visit_try_star(&mut self, try_star: &StmtTryStar) {
        self.visit_body(&try_star.body);
        self.walk_handlers(&try_star.handlers);
        self.visit_body(&try_star.orelse);
        self.visit_body(&try_star.finalbody);
    }

    fn visit_assert(&mut self, assert: &StmtAssert) {
        self.visit_expr(&assert.test);
        if let Some(msg) = &assert.msg {
            self.visit_expr(msg);
        }
    }

    fn visit_expr_stmt(&mut self, expr: &StmtExpr) {
        self.visit_expr(&expr.value);
    }

    fn visit_type_alias(&mut self, type_alias: &StmtTypeAlias) {
        self.visit_expr(&type_alias.name);
        self.walk_type_params(&type_alias.type_params);
        self.visit_expr(&type_alias.value);
    }

    // Expressions

    fn visit_bool_op(&mut self, bool_op: &ExprBoolOp) {
        self.visit_exprs(&bool_op.values);
    }

    fn visit_named_expr(&mut self, named: &ExprNamedExpr) {
        self.visit_expr(&named.value);
        self.visit_expr(&named.target);
    }

    fn visit_bin_op(&mut self, bin_op: &ExprBinOp) {
        self.visit_expr(&bin_op.left);
        self.visit_expr(&bin_op.right);
    }

    fn visit_unary_op(&mut self, unary: &ExprUnaryOp) {
        self.visit_expr(&unary.operand);
    }

    fn visit_lambda(&mut self, lambda: &ExprLambda) {
        self.visit_arguments(&lambda.args);
        self.visit_expr(&lambda.body);
    }

    fn visit_if_exp(&mut self, if_exp: &ExprIfExp) {
        self.visit_expr(&if_exp.test);
        self.visit_expr(&if_exp.body);
        self.visit_expr(&if_exp.orelse);
    }

    fn visit_dict(&mut self, dict: &ExprDict) {
        for key in dict.keys.iter().flatten() {
            self.visit_expr(key);
        }
        self.visit_exprs(&dict.values);
    }

    fn visit_set(&mut self, set: &ExprSet) {
        self.visit_exprs(&set.elts);
    }

    fn visit_list_comp(&mut self, comp: &ExprListComp) {
        self.walk_generators(&comp.generators);
        self.visit_expr(&comp.elt);
    }

    fn visit_set_comp(&mut self, comp: &ExprSetComp) {
        self.walk_generators(&comp.generators);
        self.visit_expr(&comp.elt);
    }

    fn visit_dict_comp(&mut self, comp: &ExprDictComp) {
        self.walk_generators(&comp.generators);
        self.visit_expr(&comp.key);
        self.visit_expr(&comp.value);
    }

    fn visit_generator_exp(&mut self, gen: &ExprGeneratorExp) {
        self.walk_generators(&gen.generators);
        self.visit_expr(&gen.elt);
    }

    fn visit_await(&mut self, await_expr: &ExprAwait) {
        self.visit_expr(&await_expr.value);
    }

    fn visit_yield(&mut self, yield_expr: &ExprYield) {
        if let Some(value) = &yield_expr.value {
            self.visit_expr(value);
        }
    }

    fn visit_yield_from(&mut self, yield_from: &ExprYieldFrom) {
        self.visit_expr(&yield_from.value);
    }

    fn visit_compare(&mut self, compare: &ExprCompare) {
        self.visit_expr(&compare.left);
        self.visit_exprs(&compare.comparators);
    }

    fn visit_call(&mut self, call: &ExprCall) {
        self.walk_call(call)
    }

    fn visit_formatted_value(&mut self, formatted: &ExprFormattedValue) {
        self.visit_expr(&formatted.value);
        if let Some(spec) = &formatted.format_spec {
            self.visit_expr(spec);
        }
    }

    fn visit_joined_str(&mut self, joined: &ExprJoinedStr) {
        self.visit_exprs(&joined.values);
    }

    fn visit_attribute(&mut self, attr: &ExprAttribute) {
        self.visit_expr(&attr.value);
    }

    fn visit_subscript(&mut self, subscript: &ExprSubscript) {
        self.visit_expr(&subscript.value);
        self.visit_expr(&subscript.slice);
    }

    fn visit_starred(&mut self, starred: &ExprStarred) {
        self.visit_expr(&starred.value);
    }

    fn visit_name(&mut self, _name: &ExprName) {}

    fn visit_list(&mut self, list: &ExprList) {
        self.visit_exprs(&list.elts);
    }

    fn visit_tuple(&mut self, tuple: &ExprTuple) {
        self.visit_exprs(&tuple.elts);
    }

    fn visit_slice(&mut self, slice: &ExprSlice) {
        if let Some(lower) = &slice.lower {
            self.visit_expr(lower);
        }
        if let Some(upper) = &slice.upper {
            self.visit_expr(upper);
        }
        if let Some(step) = &slice.step {
            self.visit_expr(step);
        }
    }

    // Default walk implementations

    fn walk_module(&mut self, module: &Mod) {
        match module {
            Mod::Module(ModModule { body, .. }) => self.visit_body(body),
            Mod::Interactive(ModInteractive { body, .. }) => self.visit_body(body),
            Mod::Expression(ModExpression { body, .. }) => self.visit_expr(body),
            Mod::FunctionType(ModFunctionType { argtypes, returns, .. }) => {
                self.visit_exprs(argtypes);
                self.visit_expr(returns);
            }
        }
    }

    fn walk_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::FunctionDef(f) => self.visit_function_def(f),
            Stmt::AsyncFunctionDef(f) => self.visit_async_function_def(f),
            Stmt::ClassDef(c) => self.visit_class_def(c),
            Stmt::Return(r) => self.visit_return(r),
            Stmt::Delete(d) => self.visit_delete(d),
            Stmt::Assign(a) => self.visit_assign(a),
            Stmt::AugAssign(a) => self.visit_aug_assign(a),
            Stmt::AnnAssign(a) => self.visit_ann_assign(a),
            Stmt::For(f) => self.visit_for(f),
            Stmt::AsyncFor(f) => self.visit_async_for(f),
            Stmt::While(w) => self.visit_while(w),
            Stmt::If(i) => self.visit_if(i),
            Stmt::With(w) => self.visit_with(w),
            Stmt::AsyncWith(w) => self.visit_async_with(w),
            Stmt::Match(m) => self.visit_match(m),
            Stmt::Raise(r) => self.visit_raise(r),
            Stmt::Try(t) => self.visit_try(t),
            Stmt::TryStar(t) => self.visit_try_star(t),
            Stmt::Assert(a) => self.visit_assert(a),
            Stmt::Expr(e) => self.visit_expr_stmt(e),
            Stmt::TypeAlias(t) => self.visit_type_alias(t),
            Stmt::Import(_)
            | Stmt::ImportFrom(_)
            | Stmt::Global(_)
            | Stmt::Nonlocal(_)
            | Stmt::Pass(_)
            | Stmt::Break(_)
            | Stmt::Continue(_) => {}
        }
    }

    fn walk_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::BoolOp(b) => self.visit_bool_op(b),
            Expr::NamedExpr(n) => self.visit_named_expr(n),
            Expr::BinOp(b) => self.visit_bin_op(b),
            Expr::UnaryOp(u) => self.visit_unary_op(u),
            Expr::Lambda(l) => self.visit_lambda(l),
            Expr::IfExp(i) => self.visit_if_exp(i),
            Expr::Dict(d) => self.visit_dict(d),
            Expr::Set(s) => self.visit_set(s),
            Expr::ListComp(l) => self.visit_list_comp(l),
            Expr::SetComp(s) => self.visit_set_comp(s),
            Expr::DictComp(d) => self.visit_dict_comp(d),
            Expr::GeneratorExp(g) => self.visit_generator_exp(g),
            Expr::Await(a) => self.visit_await(a),
            Expr::Yield(y) => self.visit_yield(y),
            Expr::YieldFrom(y) => self.visit_yield_from(y),
            Expr::Compare(c) => self.visit_compare(c),
            Expr::Call(c) => self.visit_call(c),
            Expr::FormattedValue(f) => self.visit_formatted_value(f),
            Expr::JoinedStr(j) => self.visit_joined_str(j),
            Expr::Constant(_) => {}
            Expr::Attribute(a) => self.visit_attribute(a),
            Expr::Subscript(s) => self.visit_subscript(s),
            Expr::Starred(s) => self.visit_starred(s),
            Expr::Name(n) => self.visit_name(n),
            Expr::List(l) => self.visit_list(l),
            Expr::Tuple(t) => self.visit_tuple(t),
            Expr::Slice(s) => self.visit_slice(s),
        }
    }

    fn walk_pattern(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::MatchValue(p) => self.visit_expr(&p.value),
            Pattern::MatchSingleton(_) | Pattern::MatchStar(_) => {}
            Pattern::MatchSequence(p) => self.walk_patterns(&p.patterns),
            Pattern::MatchMapping(p) => {
                self.visit_exprs(&p.keys);
                self.walk_patterns(&p.patterns);
            }
            Pattern::MatchClass(p) => {
                self.visit_expr(&p.cls);
                self.walk_patterns(&p.patterns);
                self.walk_patterns(&p.kwd_patterns);
            }
            Pattern::MatchAs(p) => {
                if let Some(inner) = &p.pattern {
                    self.visit_pattern(inner);
                }
            }
            Pattern::MatchOr(p) => self.walk_patterns(&p.patterns),
        }
    }

    fn walk_patterns(&mut self, patterns: &[Pattern]) {
        for pattern in patterns {
            self.visit_pattern(pattern);
        }
    }

    /// Annotations and defaults of every parameter kind
    fn walk_arguments(&mut self, args: &Arguments) {
        for arg in args.posonlyargs.iter().chain(&args.args).chain(&args.kwonlyargs) {
            if let Some(annotation) = &arg.def.annotation {
                self.visit_expr(annotation);
            }
            if let Some(default) = &arg.default {
                self.visit_expr(default);
            }
        }
        for arg in args.vararg.iter().chain(&args.kwarg) {
            if let Some(annotation) = &arg.annotation {
                self.visit_expr(annotation);
            }
        }
    }

    fn walk_type_params(&mut self, params: &[TypeParam]) {
        for param in params {
            if let TypeParam::TypeVar(TypeParamTypeVar { bound: Some(bound), .. }) = param {
                self.visit_expr(bound);
            }
        }
    }

    fn walk_keywords(&mut self, keywords: &[Keyword]) {
        for keyword in keywords {
            self.visit_expr(&keyword.value);
        }
    }

    fn walk_with_items(&mut self, items: &[WithItem]) {
        for item in items {
            self.visit_expr(&item.context_expr);
            if let Some(vars) = &item.optional_vars {
                self.visit_expr(vars);
            }
        }
    }

    fn walk_handlers(&mut self, handlers: &[ExceptHandler]) {
        for handler in handlers {
            let ExceptHandler::ExceptHandler(h) = handler;
            if let Some(ty) = &h.type_ {
                self.visit_expr(ty);
            }
            self.visit_body(&h.body);
        }
    }

    fn walk_for(&mut self, for_stmt: &StmtFor) {
        self.visit_expr(&for_stmt.iter);
        self.visit_expr(&for_stmt.target);
        self.visit_body(&for_stmt.body);
        self.visit_body(&for_stmt.orelse);
    }

    fn walk_call(&mut self, call: &ExprCall) {
        self.visit_expr(&call.func);
        self.visit_exprs(&call.args);
        self.walk_keywords(&call.keywords);
    }

    fn walk_generators(&mut self, generators: &[Comprehension]) {
        for generator in generators {
            self.visit_comprehension(generator);
        }
    }

    fn walk_comprehension(&mut self, comprehension: &Comprehension) {
        self.visit_expr(&comprehension.iter);
        self.visit_expr(&comprehension.target);
        self.visit_exprs(&comprehension.ifs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse_module;

    /// Collects every loaded name in visit order
    #[derive(Default)]
    struct Loads(Vec<String>);

    impl AstVisitor for Loads {
        fn visit_name(&mut self, name: &ExprName) {
            if matches!(name.ctx, ExprContext::Load) {
                self.0.push(name.id.as_str().to_string());
            }
        }
    }

    fn loads(source: &str) -> Vec<String> {
        let ast = parse_module(source).unwrap();
        let mut visitor = Loads::default();
        visitor.visit_module(&ast);
        visitor.0
    }

    #[test]
    fn test_function_header_is_walked() {
        let source = "@deco\ndef f(a: A = d1, *args: V, k=d2, **kw: K) -> R:\n    body\n";
        assert_eq!(loads(source), vec!["deco", "A", "d1", "d2", "V", "K", "R", "body"]);
    }

    #[test]
    fn test_class_header_is_walked() {
        let source = "@deco\nclass C(Base, metaclass=Meta):\n    x = y\n";
        assert_eq!(loads(source), vec!["deco", "Base", "Meta", "y"]);
    }

    #[test]
    fn test_match_patterns_are_walked() {
        let source = concat!(
            "match s:\n",
            "    case Point(x=Origin.x) if g:\n",
            "        run\n",
            "    case {k.key: _}:\n",
            "        other\n",
        );
        assert_eq!(loads(source), vec!["s", "Point", "Origin", "g", "run", "k", "other"]);
    }

    #[test]
    fn test_newer_statements_are_walked() {
        assert_eq!(loads("try:\n    a\nexcept* E:\n    b\n"), vec!["a", "E", "b"]);
        assert_eq!(loads("async def f():\n    async with cm as v:\n        w\n"), vec!["cm", "w"]);
        assert_eq!(loads("type Alias = Target\n"), vec!["Target"]);
    }

    #[test]
    fn test_nested_expressions_are_walked() {
        assert_eq!(loads("xs[lo:hi:st]\n"), vec!["xs", "lo", "hi", "st"]);
        assert_eq!(loads("f'{v:{width}}'\n"), vec!["v", "width"]);
        assert_eq!(loads("lambda a=d: a\n"), vec!["d", "a"]);
        assert_eq!(loads("g(x, key=k)\n"), vec!["g", "x", "k"]);
    }
}
