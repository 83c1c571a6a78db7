//! Pretty-printer that converts an AST back to PHP source text.
//!
//! The layout is fixed: four-space indentation, function and class braces on
//! their own line, control-structure braces on the same line. Parentheses are
//! emitted only where precedence requires them, so printing a reparsed
//! program reproduces the same text.

use crate::ast::{
    Arg, ArrayItem, BinaryOp, Block, ClassDecl, ClassKind, ClassMember, Expr, IncDecOp, Literal,
    MemberName, Modifiers, NameOrExpr, Param, Program, Spanned, Stmt, TypeHint, UnaryOp,
    UseDecl, UseKind, Visibility, ASSIGN_BP, INSTANCEOF_BP, NOT_BP, PREFIX_BP, TERNARY_BP,
};

/// Format a [`Program`] as PHP source text without the opening tag.
#[must_use]
pub fn format_program(program: &Program) -> String {
    let mut f = Formatter::new();
    f.format_stmts(&program.stmts);
    f.finish()
}

/// Format a single expression.
#[must_use]
pub fn format_expr(expr: &Expr) -> String {
    let mut f = Formatter::new();
    f.format_expr(expr);
    f.output
}

/// Precedence of an expression as an operand: the lowest binding power an
/// enclosing operator may have without parentheses.
fn expr_prec(expr: &Expr) -> u8 {
    match expr {
        Expr::Binary { op, .. } => op.binding_power().0,
        Expr::Assign { .. }
        | Expr::AssignRef { .. }
        | Expr::AssignOp { .. }
        | Expr::Yield { .. }
        | Expr::YieldFrom(_)
        | Expr::Print(_)
        | Expr::Include { .. }
        | Expr::ArrowFn(_) => ASSIGN_BP,
        Expr::Ternary { .. } => TERNARY_BP,
        Expr::Unary {
            op: UnaryOp::Not, ..
        } => NOT_BP,
        Expr::Instanceof { .. } => INSTANCEOF_BP.0,
        Expr::Unary { .. }
        | Expr::Cast { .. }
        | Expr::Clone(_)
        | Expr::IncDec {
            op: IncDecOp::PreInc | IncDecOp::PreDec,
            ..
        } => PREFIX_BP,
        Expr::Throw(_) => 0,
        _ => u8::MAX,
    }
}

/// Expressions that can be dereferenced (`->`, `::`, `[]`, `()`) without
/// parentheses.
fn is_dereferenceable(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Variable(_)
            | Expr::VariableVariable(_)
            | Expr::ArrayDimFetch { .. }
            | Expr::PropertyFetch { .. }
            | Expr::StaticPropertyFetch { .. }
            | Expr::ClassConstFetch { .. }
            | Expr::ConstFetch(_)
            | Expr::FuncCall { .. }
            | Expr::MethodCall { .. }
            | Expr::StaticCall { .. }
            | Expr::Array { .. }
            | Expr::Literal(Literal::String(_))
            | Expr::MagicConst(_)
    )
}

struct Formatter {
    output: String,
    indent: usize,
}

impl Formatter {
    fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    fn finish(mut self) -> String {
        while self.output.ends_with('\n') {
            self.output.pop();
        }
        self.output
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn newline(&mut self) {
        self.output.push('\n');
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
    }

    /// Write a comma-separated list using a per-item formatting closure.
    fn comma_sep<T>(&mut self, items: &[T], mut fmt_item: impl FnMut(&mut Self, &T)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            fmt_item(self, item);
        }
    }

    /// `{`, the indented statements, and the closing `}` at the current indent.
    fn write_braced(&mut self, stmts: &Block) {
        self.write("{");
        self.newline();
        self.indent += 1;
        self.format_stmts(stmts);
        self.indent -= 1;
        self.write_indent();
        self.write("}");
    }

    /// Declaration body with the opening brace on its own line.
    fn write_decl_body(&mut self, stmts: &Block) {
        self.newline();
        self.write_indent();
        self.write_braced(stmts);
    }

    fn write_modifiers(&mut self, m: &Modifiers) {
        if m.is_abstract {
            self.write("abstract ");
        }
        if m.is_final {
            self.write("final ");
        }
        match m.visibility {
            Some(Visibility::Public) => self.write("public "),
            Some(Visibility::Protected) => self.write("protected "),
            Some(Visibility::Private) => self.write("private "),
            None => {}
        }
        if m.is_static {
            self.write("static ");
        }
        if m.is_readonly {
            self.write("readonly ");
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn format_stmts(&mut self, stmts: &[Spanned<Stmt>]) {
        for (stmt, _) in stmts {
            self.write_indent();
            self.format_stmt(stmt);
            self.newline();
        }
    }

    #[expect(
        clippy::too_many_lines,
        reason = "one arm per statement kind keeps the layout in one place"
    )]
    fn format_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expression((expr, _)) => {
                self.format_expr(expr);
                self.write(";");
            }
            Stmt::Echo(exprs) => {
                self.write("echo ");
                self.comma_sep(exprs, |f, (e, _)| f.format_expr(e));
                self.write(";");
            }
            Stmt::If(if_stmt) => {
                self.write("if (");
                self.format_expr(&if_stmt.cond.0);
                self.write(") ");
                self.write_braced(&if_stmt.then);
                for elseif in &if_stmt.elseifs {
                    self.write(" elseif (");
                    self.format_expr(&elseif.cond.0);
                    self.write(") ");
                    self.write_braced(&elseif.body);
                }
                if let Some(else_) = &if_stmt.else_ {
                    self.write(" else ");
                    self.write_braced(else_);
                }
            }
            Stmt::While { cond, body } => {
                self.write("while (");
                self.format_expr(&cond.0);
                self.write(") ");
                self.write_braced(body);
            }
            Stmt::DoWhile { body, cond } => {
                self.write("do ");
                self.write_braced(body);
                self.write(" while (");
                self.format_expr(&cond.0);
                self.write(");");
            }
            Stmt::For {
                init,
                cond,
                step,
                body,
            } => {
                self.write("for (");
                self.comma_sep(init, |f, (e, _)| f.format_expr(e));
                self.write(";");
                if !cond.is_empty() {
                    self.write(" ");
                }
                self.comma_sep(cond, |f, (e, _)| f.format_expr(e));
                self.write(";");
                if !step.is_empty() {
                    self.write(" ");
                }
                self.comma_sep(step, |f, (e, _)| f.format_expr(e));
                self.write(") ");
                self.write_braced(body);
            }
            Stmt::Foreach {
                expr,
                key,
                value,
                by_ref,
                body,
            } => {
                self.write("foreach (");
                self.format_expr(&expr.0);
                self.write(" as ");
                if let Some((key, _)) = key {
                    self.format_expr(key);
                    self.write(" => ");
                }
                if *by_ref {
                    self.write("&");
                }
                self.format_expr(&value.0);
                self.write(") ");
                self.write_braced(body);
            }
            Stmt::Switch { subject, cases } => {
                self.write("switch (");
                self.format_expr(&subject.0);
                self.write(") {");
                self.newline();
                self.indent += 1;
                for case in cases {
                    self.write_indent();
                    match &case.test {
                        Some((test, _)) => {
                            self.write("case ");
                            self.format_expr(test);
                            self.write(":");
                        }
                        None => self.write("default:"),
                    }
                    self.newline();
                    self.indent += 1;
                    self.format_stmts(&case.body);
                    self.indent -= 1;
                }
                self.indent -= 1;
                self.write_indent();
                self.write("}");
            }
            Stmt::Break(level) => self.write_jump("break", level.as_ref()),
            Stmt::Continue(level) => self.write_jump("continue", level.as_ref()),
            Stmt::Return(value) => self.write_jump("return", value.as_ref()),
            Stmt::Global(vars) => {
                self.write("global ");
                self.comma_sep(vars, |f, (e, _)| f.format_expr(e));
                self.write(";");
            }
            Stmt::Static(vars) => {
                self.write("static ");
                self.comma_sep(vars, |f, var| {
                    f.write("$");
                    f.write(&var.name);
                    if let Some((default, _)) = &var.default {
                        f.write(" = ");
                        f.format_expr(default);
                    }
                });
                self.write(";");
            }
            Stmt::Unset(vars) => {
                self.write("unset(");
                self.comma_sep(vars, |f, (e, _)| f.format_expr(e));
                self.write(");");
            }
            Stmt::Function(func) => {
                self.write("function ");
                if func.by_ref {
                    self.write("&");
                }
                self.write(&func.name);
                self.write_params(&func.params);
                self.write_return_type(func.return_type.as_ref());
                self.write_decl_body(&func.body);
            }
            Stmt::Class(class) => self.format_class(class),
            Stmt::Namespace(ns) => {
                self.write("namespace");
                if let Some(name) = &ns.name {
                    self.write(" ");
                    self.write(&name.to_string());
                }
                if ns.braced {
                    self.write(" ");
                    self.write_braced(&ns.stmts);
                } else {
                    self.write(";");
                    if !ns.stmts.is_empty() {
                        self.newline();
                        self.format_stmts(&ns.stmts);
                        self.output.pop();
                    }
                }
            }
            Stmt::Use(decl) => self.format_use(decl),
            Stmt::Const(items) => {
                self.write("const ");
                self.comma_sep(items, |f, item| {
                    f.write(&item.name);
                    f.write(" = ");
                    f.format_expr(&item.value.0);
                });
                self.write(";");
            }
            Stmt::Try(try_stmt) => {
                self.write("try ");
                self.write_braced(&try_stmt.body);
                for catch in &try_stmt.catches {
                    self.write(" catch (");
                    let types: Vec<String> = catch.types.iter().map(ToString::to_string).collect();
                    self.write(&types.join("|"));
                    if let Some(var) = &catch.var {
                        self.write(" $");
                        self.write(var);
                    }
                    self.write(") ");
                    self.write_braced(&catch.body);
                }
                if let Some(finally) = &try_stmt.finally {
                    self.write(" finally ");
                    self.write_braced(finally);
                }
            }
            Stmt::Declare(decl) => {
                self.write("declare(");
                self.comma_sep(&decl.directives, |f, (key, (value, _))| {
                    f.write(key);
                    f.write("=");
                    f.format_expr(value);
                });
                self.write(")");
                match &decl.body {
                    Some(body) => {
                        self.write(" ");
                        self.write_braced(body);
                    }
                    None => self.write(";"),
                }
            }
            Stmt::Goto(label) => {
                self.write("goto ");
                self.write(label);
                self.write(";");
            }
            Stmt::Label(label) => {
                self.write(label);
                self.write(":");
            }
            Stmt::Block(stmts) => self.write_braced(stmts),
            Stmt::Nop => self.write(";"),
        }
    }

    fn write_jump(&mut self, keyword: &str, operand: Option<&Spanned<Expr>>) {
        self.write(keyword);
        if let Some((expr, _)) = operand {
            self.write(" ");
            self.format_expr(expr);
        }
        self.write(";");
    }

    fn format_use(&mut self, decl: &UseDecl) {
        self.write("use ");
        self.write_use_kind(decl.kind);
        if let Some(prefix) = &decl.prefix {
            self.write(&prefix.to_string());
            self.write("\\{");
            self.comma_sep(&decl.items, |f, item| {
                if let Some(kind) = item.kind {
                    f.write_use_kind(kind);
                }
                f.write(&item.name.to_string());
                if let Some(alias) = &item.alias {
                    f.write(" as ");
                    f.write(alias);
                }
            });
            self.write("};");
            return;
        }
        self.comma_sep(&decl.items, |f, item| {
            f.write(&item.name.to_string());
            if let Some(alias) = &item.alias {
                f.write(" as ");
                f.write(alias);
            }
        });
        self.write(";");
    }

    fn write_use_kind(&mut self, kind: UseKind) {
        match kind {
            UseKind::Normal => {}
            UseKind::Function => self.write("function "),
            UseKind::Const => self.write("const "),
        }
    }

    fn format_class(&mut self, class: &ClassDecl) {
        if class.is_abstract {
            self.write("abstract ");
        }
        if class.is_final {
            self.write("final ");
        }
        if class.is_readonly {
            self.write("readonly ");
        }
        self.write(class.kind.as_str());
        if let Some(name) = &class.name {
            self.write(" ");
            self.write(name);
        }
        self.write_class_rest(class);
    }

    /// `extends`, `implements` and the member list.
    fn write_class_rest(&mut self, class: &ClassDecl) {
        if !class.extends.is_empty() {
            self.write(" extends ");
            self.comma_sep(&class.extends, |f, n| f.write(&n.to_string()));
        }
        if !class.implements.is_empty() {
            self.write(" implements ");
            self.comma_sep(&class.implements, |f, n| f.write(&n.to_string()));
        }
        if class.name.is_some() {
            self.newline();
            self.write_indent();
        } else {
            self.write(" ");
        }
        self.write("{");
        self.newline();
        self.indent += 1;
        for (member, _) in &class.members {
            self.write_indent();
            self.format_member(member, class.kind);
            self.newline();
        }
        self.indent -= 1;
        self.write_indent();
        self.write("}");
    }

    fn format_member(&mut self, member: &ClassMember, kind: ClassKind) {
        match member {
            ClassMember::Method(method) => {
                self.write_modifiers(&method.modifiers);
                self.write("function ");
                if method.by_ref {
                    self.write("&");
                }
                self.write(&method.name);
                self.write_params(&method.params);
                self.write_return_type(method.return_type.as_ref());
                match &method.body {
                    Some(body) => self.write_decl_body(body),
                    None => self.write(";"),
                }
            }
            ClassMember::Property(prop) => {
                let mut modifiers = prop.modifiers;
                if modifiers.is_empty() && kind != ClassKind::Interface {
                    modifiers.visibility = Some(Visibility::Public);
                }
                self.write_modifiers(&modifiers);
                if let Some(ty) = &prop.ty {
                    self.write_type(ty);
                    self.write(" ");
                }
                self.comma_sep(&prop.props, |f, (name, default)| {
                    f.write("$");
                    f.write(name);
                    if let Some((default, _)) = default {
                        f.write(" = ");
                        f.format_expr(default);
                    }
                });
                self.write(";");
            }
            ClassMember::Const(decl) => {
                self.write_modifiers(&decl.modifiers);
                self.write("const ");
                self.comma_sep(&decl.items, |f, item| {
                    f.write(&item.name);
                    f.write(" = ");
                    f.format_expr(&item.value.0);
                });
                self.write(";");
            }
            ClassMember::TraitUse(names) => {
                self.write("use ");
                self.comma_sep(names, |f, n| f.write(&n.to_string()));
                self.write(";");
            }
        }
    }

    fn write_params(&mut self, params: &[Param]) {
        self.write("(");
        self.comma_sep(params, |f, param| {
            if let Some(promote) = &param.promote {
                f.write_modifiers(promote);
            }
            if let Some(ty) = &param.ty {
                f.write_type(ty);
                f.write(" ");
            }
            if param.by_ref {
                f.write("&");
            }
            if param.variadic {
                f.write("...");
            }
            f.write("$");
            f.write(&param.name);
            if let Some((default, _)) = &param.default {
                f.write(" = ");
                f.format_expr(default);
            }
        });
        self.write(")");
    }

    fn write_return_type(&mut self, ty: Option<&TypeHint>) {
        if let Some(ty) = ty {
            self.write(": ");
            self.write_type(ty);
        }
    }

    fn write_type(&mut self, ty: &TypeHint) {
        match ty {
            TypeHint::Builtin(name) => self.write(name),
            TypeHint::Class(name) => self.write(&name.to_string()),
            TypeHint::Nullable(inner) => {
                self.write("?");
                self.write_type(inner);
            }
            TypeHint::Union(types) | TypeHint::Intersection(types) => {
                let sep = if matches!(ty, TypeHint::Union(_)) {
                    "|"
                } else {
                    "&"
                };
                for (i, t) in types.iter().enumerate() {
                    if i > 0 {
                        self.write(sep);
                    }
                    self.write_type(t);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    /// Format `expr`, parenthesized when its precedence is below `min`.
    fn format_operand(&mut self, expr: &Expr, min: u8) {
        if expr_prec(expr) < min {
            self.write("(");
            self.format_expr(expr);
            self.write(")");
        } else {
            self.format_expr(expr);
        }
    }

    /// Format the target of `->`, `::`, `[]` or a call.
    fn format_deref_target(&mut self, expr: &Expr) {
        if is_dereferenceable(expr) {
            self.format_expr(expr);
        } else {
            self.write("(");
            self.format_expr(expr);
            self.write(")");
        }
    }

    fn format_class_ref(&mut self, class: &NameOrExpr) {
        match class {
            NameOrExpr::Name(name) => self.write(&name.to_string()),
            NameOrExpr::Expr(expr) => self.format_deref_target(&expr.0),
        }
    }

    fn format_member_name(&mut self, name: &MemberName) {
        match name {
            MemberName::Ident(ident) => self.write(ident),
            MemberName::Expr(expr) => match &expr.0 {
                Expr::Variable(_) | Expr::VariableVariable(_) => self.format_expr(&expr.0),
                other => {
                    self.write("{");
                    self.format_expr(other);
                    self.write("}");
                }
            },
        }
    }

    fn write_args(&mut self, args: &[Arg]) {
        self.write("(");
        self.comma_sep(args, |f, arg| {
            if let Some(name) = &arg.name {
                f.write(name);
                f.write(": ");
            }
            if arg.unpack {
                f.write("...");
            }
            if arg.by_ref {
                f.write("&");
            }
            f.format_expr(&arg.value.0);
        });
        self.write(")");
    }

    fn write_array_items(&mut self, items: &[Option<ArrayItem>]) {
        self.comma_sep(items, |f, item| {
            let Some(item) = item else {
                return;
            };
            if let Some((key, _)) = &item.key {
                f.format_expr(key);
                f.write(" => ");
            }
            if item.unpack {
                f.write("...");
            }
            if item.by_ref {
                f.write("&");
            }
            f.format_expr(&item.value.0);
        });
        // A trailing hole needs its own comma to survive reparsing.
        if matches!(items.last(), Some(None)) {
            self.write(",");
        }
    }

    #[expect(
        clippy::too_many_lines,
        reason = "one arm per expression kind keeps the layout in one place"
    )]
    fn format_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Variable(name) => {
                self.write("$");
                self.write(name);
            }
            Expr::VariableVariable(inner) => match &inner.0 {
                Expr::Variable(_) | Expr::VariableVariable(_) => {
                    self.write("$");
                    self.format_expr(&inner.0);
                }
                other => {
                    self.write("${");
                    self.format_expr(other);
                    self.write("}");
                }
            },
            Expr::Literal(lit) => match lit {
                Literal::Int(s)
                | Literal::Float(s)
                | Literal::String(s)
                | Literal::Heredoc(s)
                | Literal::ShellExec(s) => {
                    self.write(s);
                }
            },
            Expr::ConstFetch(name) => self.write(&name.to_string()),
            Expr::MagicConst(magic) => self.write(magic.as_str()),
            Expr::Array { items, short } => {
                self.write(if *short { "[" } else { "array(" });
                self.write_array_items(items);
                self.write(if *short { "]" } else { ")" });
            }
            Expr::List(items) => {
                self.write("list(");
                self.write_array_items(items);
                self.write(")");
            }
            Expr::ArrayDimFetch { var, dim } => {
                self.format_deref_target(&var.0);
                self.write("[");
                if let Some(dim) = dim {
                    self.format_expr(&dim.0);
                }
                self.write("]");
            }
            Expr::PropertyFetch {
                var,
                name,
                nullsafe,
            } => {
                self.format_deref_target(&var.0);
                self.write(if *nullsafe { "?->" } else { "->" });
                self.format_member_name(name);
            }
            Expr::StaticPropertyFetch { class, name } => {
                self.format_class_ref(class);
                self.write("::$");
                self.write(name);
            }
            Expr::ClassConstFetch { class, name } => {
                self.format_class_ref(class);
                self.write("::");
                self.write(name);
            }
            Expr::FuncCall { name, args } => {
                self.format_class_ref(name);
                self.write_args(args);
            }
            Expr::MethodCall {
                var,
                name,
                args,
                nullsafe,
            } => {
                self.format_deref_target(&var.0);
                self.write(if *nullsafe { "?->" } else { "->" });
                self.format_member_name(name);
                self.write_args(args);
            }
            Expr::StaticCall { class, name, args } => {
                self.format_class_ref(class);
                self.write("::");
                match name {
                    MemberName::Ident(ident) => self.write(ident),
                    MemberName::Expr(expr) => {
                        self.write("{");
                        self.format_expr(&expr.0);
                        self.write("}");
                    }
                }
                self.write_args(args);
            }
            Expr::New { class, args } => {
                self.write("new ");
                match class {
                    NameOrExpr::Name(name) => self.write(&name.to_string()),
                    NameOrExpr::Expr(expr) => match &expr.0 {
                        e @ (Expr::Variable(_)
                        | Expr::VariableVariable(_)
                        | Expr::PropertyFetch { .. }
                        | Expr::ArrayDimFetch { .. }) => self.format_expr(e),
                        e => {
                            self.write("(");
                            self.format_expr(e);
                            self.write(")");
                        }
                    },
                }
                self.write_args(args);
            }
            Expr::NewAnonymous { class, args } => {
                self.write("new class");
                if !args.is_empty() {
                    self.write_args(args);
                }
                self.write_class_rest(class);
            }
            Expr::Clone(inner) => {
                self.write("clone ");
                self.format_operand(&inner.0, PREFIX_BP);
            }
            Expr::Print(inner) => {
                self.write("print ");
                self.format_operand(&inner.0, ASSIGN_BP);
            }
            Expr::Assign { var, value } => {
                self.format_expr(&var.0);
                self.write(" = ");
                self.format_operand(&value.0, ASSIGN_BP);
            }
            Expr::AssignRef { var, value } => {
                self.format_expr(&var.0);
                self.write(" =& ");
                self.format_operand(&value.0, ASSIGN_BP);
            }
            Expr::AssignOp { op, var, value } => {
                self.format_expr(&var.0);
                self.write(" ");
                self.write(op.as_str());
                self.write("= ");
                self.format_operand(&value.0, ASSIGN_BP);
            }
            Expr::Binary { op, left, right } => self.format_binary(*op, &left.0, &right.0),
            Expr::Unary { op, expr: inner } => {
                let (text, min) = match op {
                    UnaryOp::Not => ("!", NOT_BP),
                    UnaryOp::Negate => ("-", PREFIX_BP),
                    UnaryOp::Plus => ("+", PREFIX_BP),
                    UnaryOp::BitNot => ("~", PREFIX_BP),
                    UnaryOp::Silence => ("@", PREFIX_BP),
                };
                self.write(text);
                // `- -$a` must not print as the decrement operator.
                let doubled = match (op, &inner.0) {
                    (UnaryOp::Negate, Expr::Unary { op: UnaryOp::Negate, .. })
                    | (UnaryOp::Plus, Expr::Unary { op: UnaryOp::Plus, .. }) => true,
                    (UnaryOp::Negate, Expr::IncDec { op: IncDecOp::PreDec, .. })
                    | (UnaryOp::Plus, Expr::IncDec { op: IncDecOp::PreInc, .. }) => true,
                    _ => false,
                };
                if doubled {
                    self.write("(");
                    self.format_expr(&inner.0);
                    self.write(")");
                } else {
                    self.format_operand(&inner.0, min);
                }
            }
            Expr::IncDec { op, var } => match op {
                IncDecOp::PreInc => {
                    self.write("++");
                    self.format_expr(&var.0);
                }
                IncDecOp::PreDec => {
                    self.write("--");
                    self.format_expr(&var.0);
                }
                IncDecOp::PostInc => {
                    self.format_expr(&var.0);
                    self.write("++");
                }
                IncDecOp::PostDec => {
                    self.format_expr(&var.0);
                    self.write("--");
                }
            },
            Expr::Cast { kind, expr: inner } => {
                self.write("(");
                self.write(kind.as_str());
                self.write(") ");
                self.format_operand(&inner.0, PREFIX_BP);
            }
            Expr::Ternary { cond, then, else_ } => {
                self.format_operand(&cond.0, TERNARY_BP + 1);
                match then {
                    Some(then) => {
                        self.write(" ? ");
                        self.format_expr(&then.0);
                        self.write(" : ");
                    }
                    None => self.write(" ?: "),
                }
                self.format_operand(&else_.0, TERNARY_BP + 1);
            }
            Expr::Instanceof { expr: inner, class } => {
                self.format_operand(&inner.0, INSTANCEOF_BP.0);
                self.write(" instanceof ");
                match class {
                    NameOrExpr::Name(name) => self.write(&name.to_string()),
                    NameOrExpr::Expr(e) if e.0.is_variable_like() => self.format_expr(&e.0),
                    NameOrExpr::Expr(e) => {
                        self.write("(");
                        self.format_expr(&e.0);
                        self.write(")");
                    }
                }
            }
            Expr::Isset(vars) => {
                self.write("isset(");
                self.comma_sep(vars, |f, (e, _)| f.format_expr(e));
                self.write(")");
            }
            Expr::Empty(inner) => {
                self.write("empty(");
                self.format_expr(&inner.0);
                self.write(")");
            }
            Expr::Exit { die, expr: inner } => {
                self.write(if *die { "die" } else { "exit" });
                if let Some(inner) = inner {
                    self.write("(");
                    self.format_expr(&inner.0);
                    self.write(")");
                }
            }
            Expr::Include { kind, expr: inner } => {
                self.write(kind.as_str());
                self.write(" ");
                self.format_operand(&inner.0, ASSIGN_BP);
            }
            Expr::Closure(closure) => {
                if closure.is_static {
                    self.write("static ");
                }
                self.write("function ");
                if closure.by_ref {
                    self.write("&");
                }
                self.write_params(&closure.params);
                if !closure.uses.is_empty() {
                    self.write(" use (");
                    self.comma_sep(&closure.uses, |f, u| {
                        if u.by_ref {
                            f.write("&");
                        }
                        f.write("$");
                        f.write(&u.name);
                    });
                    self.write(")");
                }
                self.write_return_type(closure.return_type.as_ref());
                self.write(" ");
                self.write_braced(&closure.body);
            }
            Expr::ArrowFn(arrow) => {
                if arrow.is_static {
                    self.write("static ");
                }
                self.write("fn");
                if arrow.by_ref {
                    self.write(" &");
                }
                self.write_params(&arrow.params);
                self.write_return_type(arrow.return_type.as_ref());
                self.write(" => ");
                self.format_expr(&arrow.body.0);
            }
            Expr::Yield { key, value } => {
                self.write("yield");
                if let Some(key) = key {
                    self.write(" ");
                    self.format_operand(&key.0, ASSIGN_BP);
                    self.write(" =>");
                }
                if let Some(value) = value {
                    self.write(" ");
                    self.format_operand(&value.0, ASSIGN_BP);
                }
            }
            Expr::YieldFrom(inner) => {
                self.write("yield from ");
                self.format_operand(&inner.0, ASSIGN_BP);
            }
            Expr::Throw(inner) => {
                self.write("throw ");
                self.format_expr(&inner.0);
            }
            Expr::Match { subject, arms } => {
                self.write("match (");
                self.format_expr(&subject.0);
                self.write(") {");
                self.newline();
                self.indent += 1;
                for arm in arms {
                    self.write_indent();
                    match &arm.conds {
                        Some(conds) => self.comma_sep(conds, |f, (e, _)| f.format_expr(e)),
                        None => self.write("default"),
                    }
                    self.write(" => ");
                    self.format_expr(&arm.body.0);
                    self.write(",");
                    self.newline();
                }
                self.indent -= 1;
                self.write_indent();
                self.write("}");
            }
        }
    }

    fn format_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) {
        let (lbp, rbp) = op.binding_power();
        // Right-associative operators need parentheses around an equal-level
        // left operand.
        let left_min = if lbp > rbp { lbp + 1 } else { lbp };
        self.format_operand(left, left_min);
        self.write(" ");
        self.write(op.as_str());
        self.write(" ");
        self.format_operand(right, rbp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn roundtrip(src: &str) -> String {
        let result = parse(&format!("<?php {src}"));
        assert!(
            result.errors.is_empty(),
            "parse errors: {:?}",
            result.errors
        );
        format_program(&result.program)
    }

    #[test]
    fn simple_statements() {
        assert_eq!(roundtrip("echo 1, 2;"), "echo 1, 2;");
        assert_eq!(roundtrip("return   4 ;"), "return 4;");
        assert_eq!(roundtrip("$a=[1,'b'=>2];"), "$a = [1, 'b' => 2];");
    }

    #[test]
    fn function_declaration() {
        let src = "\
function add(int $a, int $b = 1): int
{
    return $a + $b;
}";
        assert_eq!(roundtrip(src), src);
    }

    #[test]
    fn class_declaration() {
        let src = "\
abstract class Shape extends Base implements Countable
{
    const SIDES = 0;
    protected static ?int $count = null;
    abstract public function area(): float;
    public function __construct(private string $name)
    {
        self::$count++;
    }
}";
        assert_eq!(roundtrip(src), src);
    }

    #[test]
    fn control_flow() {
        let src = "\
if ($a) {
    foo();
} elseif ($b) {
    bar();
} else {
    baz();
}
foreach ($items as $key => &$value) {
    continue;
}
switch ($x) {
    case 1:
        break;
    default:
        echo 'other';
}";
        assert_eq!(roundtrip(src), src);
    }

    #[test]
    fn else_if_becomes_elseif() {
        assert_eq!(
            roundtrip("if ($a) { } else if ($b) { }"),
            "if ($a) {\n} elseif ($b) {\n}"
        );
    }

    #[test]
    fn redundant_parentheses_are_dropped() {
        assert_eq!(roundtrip("(($a + ($b * $c)));"), "$a + $b * $c;");
    }

    #[test]
    fn required_parentheses_are_kept() {
        assert_eq!(roundtrip("($a + $b) * $c;"), "($a + $b) * $c;");
        assert_eq!(roundtrip("$a - ($b - $c);"), "$a - ($b - $c);");
        assert_eq!(roundtrip("($a ** $b) ** $c;"), "($a ** $b) ** $c;");
        assert_eq!(roundtrip("!($a && $b);"), "!($a && $b);");
        assert_eq!(roundtrip("(new Foo)->bar();"), "(new Foo())->bar();");
        assert_eq!(roundtrip("$a ? $b : ($c ? $d : $e);"), "$a ? $b : ($c ? $d : $e);");
    }

    #[test]
    fn double_negation_keeps_its_operators_apart() {
        assert_eq!(roundtrip("-(-1);"), "-(-1);");
    }

    #[test]
    fn closures_and_arrow_functions() {
        assert_eq!(
            roundtrip("$f = function ($x) use (&$y) { return $x; };"),
            "$f = function ($x) use (&$y) {\n    return $x;\n};"
        );
        assert_eq!(roundtrip("$g = fn($x) => $x * 2;"), "$g = fn($x) => $x * 2;");
    }

    #[test]
    fn namespaces_and_uses() {
        assert_eq!(
            roundtrip("namespace Foo; use Bar\\Baz as Q; echo 1;"),
            "namespace Foo;\nuse Bar\\Baz as Q;\necho 1;"
        );
        assert_eq!(roundtrip("use A\\{B, C as D};"), "use A\\{B, C as D};");
        assert_eq!(roundtrip("namespace { }"), "namespace {\n}");
    }

    #[test]
    fn exit_and_throw() {
        assert_eq!(roundtrip("exit;"), "exit;");
        assert_eq!(roundtrip("die('x');"), "die('x');");
        assert_eq!(
            roundtrip("throw new \\Exception('e');"),
            "throw new \\Exception('e');"
        );
    }

    #[test]
    fn array_holes_survive() {
        assert_eq!(roundtrip("[, $b] = $c;"), "[, $b] = $c;");
        assert_eq!(roundtrip("list($a, , ) = $c;"), "list($a, ,) = $c;");
    }

    #[test]
    fn match_expression() {
        assert_eq!(
            roundtrip("echo match ($x) { 1, 2 => 'a', default => 'b' };"),
            "echo match ($x) {\n    1, 2 => 'a',\n    default => 'b',\n};"
        );
    }

    #[test]
    fn format_single_expression() {
        let result = parse("<?php $a->b['c']::D;");
        let Stmt::Expression((expr, _)) = &result.program.stmts[0].0 else {
            panic!("expected expression statement");
        };
        assert_eq!(format_expr(expr), "$a->b['c']::D");
    }
}
