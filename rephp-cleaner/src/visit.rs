//! Tree walkers shared by the passes.
//!
//! [`Visitor`] is a read-only pre-order walk that can abort with a
//! [`CleanError`]; validation passes override the hooks they care about and
//! call the matching `walk_*` function to keep descending. [`VisitorMut`] is
//! the infallible, mutable counterpart used by rewrite passes.

use rephp_parser::ast::{
    Arg, ArrayItem, ArrowFn, Block, ClassDecl, ClassMember, Closure, Expr, FunctionDecl,
    MemberName, MethodDecl, Name, NameOrExpr, NamespaceDecl, Param, Program, Span, Spanned, Stmt,
    TypeHint,
};

use crate::error::CleanError;

/// What a name refers to, which decides how it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRole {
    Class,
    Function,
    Constant,
}

/// Anything with parameters and a body.
#[derive(Debug, Clone, Copy)]
pub enum FunctionLike<'a> {
    Function(&'a FunctionDecl),
    Method(&'a MethodDecl),
    Closure(&'a Closure),
    ArrowFn(&'a ArrowFn),
}

impl<'a> FunctionLike<'a> {
    #[must_use]
    pub fn params(self) -> &'a [Param] {
        match self {
            FunctionLike::Function(f) => &f.params,
            FunctionLike::Method(m) => &m.params,
            FunctionLike::Closure(c) => &c.params,
            FunctionLike::ArrowFn(a) => &a.params,
        }
    }

    #[must_use]
    pub fn return_type(self) -> Option<&'a TypeHint> {
        match self {
            FunctionLike::Function(f) => f.return_type.as_ref(),
            FunctionLike::Method(m) => m.return_type.as_ref(),
            FunctionLike::Closure(c) => c.return_type.as_ref(),
            FunctionLike::ArrowFn(a) => a.return_type.as_ref(),
        }
    }

    /// Statement body; `None` for arrow functions and bodiless methods.
    #[must_use]
    pub fn body(self) -> Option<&'a Block> {
        match self {
            FunctionLike::Function(f) => Some(&f.body),
            FunctionLike::Method(m) => m.body.as_ref(),
            FunctionLike::Closure(c) => Some(&c.body),
            FunctionLike::ArrowFn(_) => None,
        }
    }

    /// Closures and arrow functions.
    #[must_use]
    pub fn is_anonymous(self) -> bool {
        matches!(self, FunctionLike::Closure(_) | FunctionLike::ArrowFn(_))
    }
}

pub type VisitResult = Result<(), CleanError>;

/// Read-only traversal. Every hook defaults to walking its children.
pub trait Visitor {
    fn visit_stmt(&mut self, stmt: &Spanned<Stmt>) -> VisitResult {
        walk_stmt(self, stmt)
    }

    fn visit_expr(&mut self, expr: &Spanned<Expr>) -> VisitResult {
        walk_expr(self, expr)
    }

    fn visit_namespace(&mut self, ns: &NamespaceDecl, _span: &Span) -> VisitResult {
        walk_block(self, &ns.stmts)
    }

    /// Named class-likes and anonymous classes alike.
    fn visit_class(&mut self, class: &ClassDecl, span: &Span) -> VisitResult {
        walk_class(self, class, span)
    }

    fn visit_function(&mut self, func: FunctionLike<'_>, span: &Span) -> VisitResult {
        walk_function(self, func, span)
    }

    /// A static name reference; `span` is that of the enclosing node.
    fn visit_name(&mut self, _name: &Name, _role: NameRole, _span: &Span) -> VisitResult {
        Ok(())
    }
}

pub fn walk_program<V: Visitor + ?Sized>(v: &mut V, program: &Program) -> VisitResult {
    walk_block(v, &program.stmts)
}

pub fn walk_block<V: Visitor + ?Sized>(v: &mut V, stmts: &[Spanned<Stmt>]) -> VisitResult {
    stmts.iter().try_for_each(|stmt| v.visit_stmt(stmt))
}

fn walk_exprs<V: Visitor + ?Sized>(v: &mut V, exprs: &[Spanned<Expr>]) -> VisitResult {
    exprs.iter().try_for_each(|e| v.visit_expr(e))
}

fn walk_opt<V: Visitor + ?Sized>(v: &mut V, expr: Option<&Spanned<Expr>>) -> VisitResult {
    expr.map_or(Ok(()), |e| v.visit_expr(e))
}

pub fn walk_stmt<V: Visitor + ?Sized>(v: &mut V, (stmt, span): &Spanned<Stmt>) -> VisitResult {
    match stmt {
        Stmt::Expression(e) => v.visit_expr(e),
        Stmt::Echo(es) | Stmt::Global(es) | Stmt::Unset(es) => walk_exprs(v, es),
        Stmt::If(s) => {
            v.visit_expr(&s.cond)?;
            walk_block(v, &s.then)?;
            for elseif in &s.elseifs {
                v.visit_expr(&elseif.cond)?;
                walk_block(v, &elseif.body)?;
            }
            s.else_.as_ref().map_or(Ok(()), |b| walk_block(v, b))
        }
        Stmt::While { cond, body } => {
            v.visit_expr(cond)?;
            walk_block(v, body)
        }
        Stmt::DoWhile { body, cond } => {
            walk_block(v, body)?;
            v.visit_expr(cond)
        }
        Stmt::For {
            init,
            cond,
            step,
            body,
        } => {
            walk_exprs(v, init)?;
            walk_exprs(v, cond)?;
            walk_exprs(v, step)?;
            walk_block(v, body)
        }
        Stmt::Foreach {
            expr,
            key,
            value,
            body,
            ..
        } => {
            v.visit_expr(expr)?;
            walk_opt(v, key.as_ref())?;
            v.visit_expr(value)?;
            walk_block(v, body)
        }
        Stmt::Switch { subject, cases } => {
            v.visit_expr(subject)?;
            for case in cases {
                walk_opt(v, case.test.as_ref())?;
                walk_block(v, &case.body)?;
            }
            Ok(())
        }
        Stmt::Break(e) | Stmt::Continue(e) | Stmt::Return(e) => walk_opt(v, e.as_ref()),
        Stmt::Static(vars) => vars
            .iter()
            .try_for_each(|var| walk_opt(v, var.default.as_ref())),
        Stmt::Function(f) => v.visit_function(FunctionLike::Function(f), span),
        Stmt::Class(c) => v.visit_class(c, span),
        Stmt::Namespace(ns) => v.visit_namespace(ns, span),
        Stmt::Const(items) => items.iter().try_for_each(|item| v.visit_expr(&item.value)),
        Stmt::Try(t) => {
            walk_block(v, &t.body)?;
            for catch in &t.catches {
                for ty in &catch.types {
                    v.visit_name(ty, NameRole::Class, span)?;
                }
                walk_block(v, &catch.body)?;
            }
            t.finally.as_ref().map_or(Ok(()), |b| walk_block(v, b))
        }
        Stmt::Declare(d) => {
            for (_, value) in &d.directives {
                v.visit_expr(value)?;
            }
            d.body.as_ref().map_or(Ok(()), |b| walk_block(v, b))
        }
        Stmt::Block(b) => walk_block(v, b),
        Stmt::Use(_) | Stmt::Goto(_) | Stmt::Label(_) | Stmt::Nop => Ok(()),
    }
}

pub fn walk_class<V: Visitor + ?Sized>(v: &mut V, class: &ClassDecl, span: &Span) -> VisitResult {
    for name in class.extends.iter().chain(&class.implements) {
        v.visit_name(name, NameRole::Class, span)?;
    }
    for (member, member_span) in &class.members {
        match member {
            ClassMember::Method(m) => v.visit_function(FunctionLike::Method(m), member_span)?,
            ClassMember::Property(p) => {
                if let Some(ty) = &p.ty {
                    walk_type(v, ty, member_span)?;
                }
                for (_, default) in &p.props {
                    walk_opt(v, default.as_ref())?;
                }
            }
            ClassMember::Const(c) => {
                for item in &c.items {
                    v.visit_expr(&item.value)?;
                }
            }
            ClassMember::TraitUse(names) => {
                for name in names {
                    v.visit_name(name, NameRole::Class, member_span)?;
                }
            }
        }
    }
    Ok(())
}

pub fn walk_function<V: Visitor + ?Sized>(
    v: &mut V,
    func: FunctionLike<'_>,
    span: &Span,
) -> VisitResult {
    for param in func.params() {
        if let Some(ty) = &param.ty {
            walk_type(v, ty, span)?;
        }
        walk_opt(v, param.default.as_ref())?;
    }
    if let Some(ty) = func.return_type() {
        walk_type(v, ty, span)?;
    }
    match func {
        FunctionLike::ArrowFn(a) => v.visit_expr(&a.body),
        _ => func.body().map_or(Ok(()), |b| walk_block(v, b)),
    }
}

pub fn walk_type<V: Visitor + ?Sized>(v: &mut V, ty: &TypeHint, span: &Span) -> VisitResult {
    match ty {
        TypeHint::Builtin(_) => Ok(()),
        TypeHint::Class(name) => v.visit_name(name, NameRole::Class, span),
        TypeHint::Nullable(inner) => walk_type(v, inner, span),
        TypeHint::Union(types) | TypeHint::Intersection(types) => {
            types.iter().try_for_each(|t| walk_type(v, t, span))
        }
    }
}

fn walk_class_ref<V: Visitor + ?Sized>(v: &mut V, class: &NameOrExpr, span: &Span) -> VisitResult {
    match class {
        NameOrExpr::Name(name) => v.visit_name(name, NameRole::Class, span),
        NameOrExpr::Expr(e) => v.visit_expr(e),
    }
}

fn walk_member<V: Visitor + ?Sized>(v: &mut V, name: &MemberName) -> VisitResult {
    match name {
        MemberName::Ident(_) => Ok(()),
        MemberName::Expr(e) => v.visit_expr(e),
    }
}

fn walk_args<V: Visitor + ?Sized>(v: &mut V, args: &[Arg]) -> VisitResult {
    args.iter().try_for_each(|arg| v.visit_expr(&arg.value))
}

fn walk_items<V: Visitor + ?Sized>(v: &mut V, items: &[Option<ArrayItem>]) -> VisitResult {
    for item in items.iter().flatten() {
        walk_opt(v, item.key.as_ref())?;
        v.visit_expr(&item.value)?;
    }
    Ok(())
}

pub fn walk_expr<V: Visitor + ?Sized>(v: &mut V, (expr, span): &Spanned<Expr>) -> VisitResult {
    match expr {
        Expr::Variable(_) | Expr::Literal(_) | Expr::MagicConst(_) => Ok(()),
        Expr::ConstFetch(name) => v.visit_name(name, NameRole::Constant, span),
        Expr::Array { items, .. } | Expr::List(items) => walk_items(v, items),
        Expr::ArrayDimFetch { var, dim } => {
            v.visit_expr(var)?;
            walk_opt(v, dim.as_deref())
        }
        Expr::PropertyFetch { var, name, .. } => {
            v.visit_expr(var)?;
            walk_member(v, name)
        }
        Expr::StaticPropertyFetch { class, .. } | Expr::ClassConstFetch { class, .. } => {
            walk_class_ref(v, class, span)
        }
        Expr::FuncCall { name, args } => {
            match name {
                NameOrExpr::Name(n) => v.visit_name(n, NameRole::Function, span)?,
                NameOrExpr::Expr(e) => v.visit_expr(e)?,
            }
            walk_args(v, args)
        }
        Expr::MethodCall {
            var, name, args, ..
        } => {
            v.visit_expr(var)?;
            walk_member(v, name)?;
            walk_args(v, args)
        }
        Expr::StaticCall { class, name, args } => {
            walk_class_ref(v, class, span)?;
            walk_member(v, name)?;
            walk_args(v, args)
        }
        Expr::New { class, args } => {
            walk_class_ref(v, class, span)?;
            walk_args(v, args)
        }
        Expr::NewAnonymous { class, args } => {
            walk_args(v, args)?;
            v.visit_class(class, span)
        }
        Expr::VariableVariable(e)
        | Expr::Clone(e)
        | Expr::Print(e)
        | Expr::Empty(e)
        | Expr::YieldFrom(e)
        | Expr::Throw(e)
        | Expr::Unary { expr: e, .. }
        | Expr::Cast { expr: e, .. }
        | Expr::IncDec { var: e, .. }
        | Expr::Include { expr: e, .. } => v.visit_expr(e),
        Expr::Assign { var, value }
        | Expr::AssignRef { var, value }
        | Expr::AssignOp { var, value, .. } => {
            v.visit_expr(var)?;
            v.visit_expr(value)
        }
        Expr::Binary { left, right, .. } => {
            v.visit_expr(left)?;
            v.visit_expr(right)
        }
        Expr::Ternary { cond, then, else_ } => {
            v.visit_expr(cond)?;
            walk_opt(v, then.as_deref())?;
            v.visit_expr(else_)
        }
        Expr::Instanceof { expr, class } => {
            v.visit_expr(expr)?;
            walk_class_ref(v, class, span)
        }
        Expr::Isset(es) => walk_exprs(v, es),
        Expr::Exit { expr, .. } => walk_opt(v, expr.as_deref()),
        Expr::Closure(c) => v.visit_function(FunctionLike::Closure(c), span),
        Expr::ArrowFn(a) => v.visit_function(FunctionLike::ArrowFn(a), span),
        Expr::Yield { key, value } => {
            walk_opt(v, key.as_deref())?;
            walk_opt(v, value.as_deref())
        }
        Expr::Match { subject, arms } => {
            v.visit_expr(subject)?;
            for arm in arms {
                if let Some(conds) = &arm.conds {
                    walk_exprs(v, conds)?;
                }
                v.visit_expr(&arm.body)?;
            }
            Ok(())
        }
    }
}

// ── Mutable walk ─────────────────────────────────────────────────────

/// Mutable traversal for rewrites. Hooks default to walking their children.
pub trait VisitorMut {
    fn visit_stmt_mut(&mut self, stmt: &mut Spanned<Stmt>) {
        walk_stmt_mut(self, stmt);
    }

    fn visit_expr_mut(&mut self, expr: &mut Spanned<Expr>) {
        walk_expr_mut(self, expr);
    }

    fn visit_namespace_mut(&mut self, ns: &mut NamespaceDecl) {
        walk_block_mut(self, &mut ns.stmts);
    }

    fn visit_name_mut(&mut self, _name: &mut Name, _role: NameRole) {}
}

pub fn walk_block_mut<V: VisitorMut + ?Sized>(v: &mut V, stmts: &mut [Spanned<Stmt>]) {
    for stmt in stmts {
        v.visit_stmt_mut(stmt);
    }
}

fn walk_exprs_mut<V: VisitorMut + ?Sized>(v: &mut V, exprs: &mut [Spanned<Expr>]) {
    for e in exprs {
        v.visit_expr_mut(e);
    }
}

fn walk_opt_mut<V: VisitorMut + ?Sized>(v: &mut V, expr: Option<&mut Spanned<Expr>>) {
    if let Some(e) = expr {
        v.visit_expr_mut(e);
    }
}

pub fn walk_stmt_mut<V: VisitorMut + ?Sized>(v: &mut V, (stmt, _): &mut Spanned<Stmt>) {
    match stmt {
        Stmt::Expression(e) => v.visit_expr_mut(e),
        Stmt::Echo(es) | Stmt::Global(es) | Stmt::Unset(es) => walk_exprs_mut(v, es),
        Stmt::If(s) => {
            v.visit_expr_mut(&mut s.cond);
            walk_block_mut(v, &mut s.then);
            for elseif in &mut s.elseifs {
                v.visit_expr_mut(&mut elseif.cond);
                walk_block_mut(v, &mut elseif.body);
            }
            if let Some(b) = &mut s.else_ {
                walk_block_mut(v, b);
            }
        }
        Stmt::While { cond, body } | Stmt::DoWhile { body, cond } => {
            v.visit_expr_mut(cond);
            walk_block_mut(v, body);
        }
        Stmt::For {
            init,
            cond,
            step,
            body,
        } => {
            walk_exprs_mut(v, init);
            walk_exprs_mut(v, cond);
            walk_exprs_mut(v, step);
            walk_block_mut(v, body);
        }
        Stmt::Foreach {
            expr,
            key,
            value,
            body,
            ..
        } => {
            v.visit_expr_mut(expr);
            walk_opt_mut(v, key.as_mut());
            v.visit_expr_mut(value);
            walk_block_mut(v, body);
        }
        Stmt::Switch { subject, cases } => {
            v.visit_expr_mut(subject);
            for case in cases {
                walk_opt_mut(v, case.test.as_mut());
                walk_block_mut(v, &mut case.body);
            }
        }
        Stmt::Break(e) | Stmt::Continue(e) | Stmt::Return(e) => walk_opt_mut(v, e.as_mut()),
        Stmt::Static(vars) => {
            for var in vars {
                walk_opt_mut(v, var.default.as_mut());
            }
        }
        Stmt::Function(f) => {
            walk_params_mut(v, &mut f.params, f.return_type.as_mut());
            walk_block_mut(v, &mut f.body);
        }
        Stmt::Class(c) => walk_class_mut(v, c),
        Stmt::Namespace(ns) => v.visit_namespace_mut(ns),
        Stmt::Const(items) => {
            for item in items {
                v.visit_expr_mut(&mut item.value);
            }
        }
        Stmt::Try(t) => {
            walk_block_mut(v, &mut t.body);
            for catch in &mut t.catches {
                for ty in &mut catch.types {
                    v.visit_name_mut(ty, NameRole::Class);
                }
                walk_block_mut(v, &mut catch.body);
            }
            if let Some(b) = &mut t.finally {
                walk_block_mut(v, b);
            }
        }
        Stmt::Declare(d) => {
            for (_, value) in &mut d.directives {
                v.visit_expr_mut(value);
            }
            if let Some(b) = &mut d.body {
                walk_block_mut(v, b);
            }
        }
        Stmt::Block(b) => walk_block_mut(v, b),
        Stmt::Use(_) | Stmt::Goto(_) | Stmt::Label(_) | Stmt::Nop => {}
    }
}

pub fn walk_class_mut<V: VisitorMut + ?Sized>(v: &mut V, class: &mut ClassDecl) {
    for name in class.extends.iter_mut().chain(&mut class.implements) {
        v.visit_name_mut(name, NameRole::Class);
    }
    for (member, _) in &mut class.members {
        match member {
            ClassMember::Method(m) => {
                walk_params_mut(v, &mut m.params, m.return_type.as_mut());
                if let Some(body) = &mut m.body {
                    walk_block_mut(v, body);
                }
            }
            ClassMember::Property(p) => {
                if let Some(ty) = &mut p.ty {
                    walk_type_mut(v, ty);
                }
                for (_, default) in &mut p.props {
                    walk_opt_mut(v, default.as_mut());
                }
            }
            ClassMember::Const(c) => {
                for item in &mut c.items {
                    v.visit_expr_mut(&mut item.value);
                }
            }
            ClassMember::TraitUse(names) => {
                for name in names {
                    v.visit_name_mut(name, NameRole::Class);
                }
            }
        }
    }
}

fn walk_params_mut<V: VisitorMut + ?Sized>(
    v: &mut V,
    params: &mut [Param],
    return_type: Option<&mut TypeHint>,
) {
    for param in params {
        if let Some(ty) = &mut param.ty {
            walk_type_mut(v, ty);
        }
        walk_opt_mut(v, param.default.as_mut());
    }
    if let Some(ty) = return_type {
        walk_type_mut(v, ty);
    }
}

pub fn walk_type_mut<V: VisitorMut + ?Sized>(v: &mut V, ty: &mut TypeHint) {
    match ty {
        TypeHint::Builtin(_) => {}
        TypeHint::Class(name) => {
            if !name.is_special_class_name() {
                v.visit_name_mut(name, NameRole::Class);
            }
        }
        TypeHint::Nullable(inner) => walk_type_mut(v, inner),
        TypeHint::Union(types) | TypeHint::Intersection(types) => {
            for t in types {
                walk_type_mut(v, t);
            }
        }
    }
}

fn walk_class_ref_mut<V: VisitorMut + ?Sized>(v: &mut V, class: &mut NameOrExpr) {
    match class {
        NameOrExpr::Name(name) => {
            if !name.is_special_class_name() {
                v.visit_name_mut(name, NameRole::Class);
            }
        }
        NameOrExpr::Expr(e) => v.visit_expr_mut(e),
    }
}

fn walk_member_mut<V: VisitorMut + ?Sized>(v: &mut V, name: &mut MemberName) {
    if let MemberName::Expr(e) = name {
        v.visit_expr_mut(e);
    }
}

fn walk_args_mut<V: VisitorMut + ?Sized>(v: &mut V, args: &mut [Arg]) {
    for arg in args {
        v.visit_expr_mut(&mut arg.value);
    }
}

fn walk_items_mut<V: VisitorMut + ?Sized>(v: &mut V, items: &mut [Option<ArrayItem>]) {
    for item in items.iter_mut().flatten() {
        walk_opt_mut(v, item.key.as_mut());
        v.visit_expr_mut(&mut item.value);
    }
}

pub fn walk_expr_mut<V: VisitorMut + ?Sized>(v: &mut V, (expr, _): &mut Spanned<Expr>) {
    match expr {
        Expr::Variable(_) | Expr::Literal(_) | Expr::MagicConst(_) => {}
        Expr::ConstFetch(name) => v.visit_name_mut(name, NameRole::Constant),
        Expr::Array { items, .. } | Expr::List(items) => walk_items_mut(v, items),
        Expr::ArrayDimFetch { var, dim } => {
            v.visit_expr_mut(var);
            walk_opt_mut(v, dim.as_deref_mut());
        }
        Expr::PropertyFetch { var, name, .. } => {
            v.visit_expr_mut(var);
            walk_member_mut(v, name);
        }
        Expr::StaticPropertyFetch { class, .. } | Expr::ClassConstFetch { class, .. } => {
            walk_class_ref_mut(v, class);
        }
        Expr::FuncCall { name, args } => {
            match name {
                NameOrExpr::Name(n) => v.visit_name_mut(n, NameRole::Function),
                NameOrExpr::Expr(e) => v.visit_expr_mut(e),
            }
            walk_args_mut(v, args);
        }
        Expr::MethodCall {
            var, name, args, ..
        } => {
            v.visit_expr_mut(var);
            walk_member_mut(v, name);
            walk_args_mut(v, args);
        }
        Expr::StaticCall { class, name, args } => {
            walk_class_ref_mut(v, class);
            walk_member_mut(v, name);
            walk_args_mut(v, args);
        }
        Expr::New { class, args } => {
            walk_class_ref_mut(v, class);
            walk_args_mut(v, args);
        }
        Expr::NewAnonymous { class, args } => {
            walk_args_mut(v, args);
            walk_class_mut(v, class);
        }
        Expr::VariableVariable(e)
        | Expr::Clone(e)
        | Expr::Print(e)
        | Expr::Empty(e)
        | Expr::YieldFrom(e)
        | Expr::Throw(e)
        | Expr::Unary { expr: e, .. }
        | Expr::Cast { expr: e, .. }
        | Expr::IncDec { var: e, .. }
        | Expr::Include { expr: e, .. } => v.visit_expr_mut(e),
        Expr::Assign { var, value }
        | Expr::AssignRef { var, value }
        | Expr::AssignOp { var, value, .. } => {
            v.visit_expr_mut(var);
            v.visit_expr_mut(value);
        }
        Expr::Binary { left, right, .. } => {
            v.visit_expr_mut(left);
            v.visit_expr_mut(right);
        }
        Expr::Ternary { cond, then, else_ } => {
            v.visit_expr_mut(cond);
            walk_opt_mut(v, then.as_deref_mut());
            v.visit_expr_mut(else_);
        }
        Expr::Instanceof { expr, class } => {
            v.visit_expr_mut(expr);
            walk_class_ref_mut(v, class);
        }
        Expr::Isset(es) => walk_exprs_mut(v, es),
        Expr::Exit { expr, .. } => walk_opt_mut(v, expr.as_deref_mut()),
        Expr::Closure(c) => {
            walk_params_mut(v, &mut c.params, c.return_type.as_mut());
            walk_block_mut(v, &mut c.body);
        }
        Expr::ArrowFn(a) => {
            walk_params_mut(v, &mut a.params, a.return_type.as_mut());
            v.visit_expr_mut(&mut a.body);
        }
        Expr::Yield { key, value } => {
            walk_opt_mut(v, key.as_deref_mut());
            walk_opt_mut(v, value.as_deref_mut());
        }
        Expr::Match { subject, arms } => {
            v.visit_expr_mut(subject);
            for arm in arms {
                if let Some(conds) = &mut arm.conds {
                    walk_exprs_mut(v, conds);
                }
                v.visit_expr_mut(&mut arm.body);
            }
        }
    }
}
