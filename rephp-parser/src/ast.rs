//! Abstract syntax tree types for PHP.

use serde::{Deserialize, Serialize};

/// Source span with byte offsets.
pub type Span = std::ops::Range<usize>;

/// A value with an associated source span.
pub type Spanned<T> = (T, Span);

/// A statement list, e.g. the body of a function or an `if` branch.
pub type Block = Vec<Spanned<Stmt>>;

// ── Program ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub stmts: Vec<Spanned<Stmt>>,
}

// ── Names ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NameKind {
    /// `Foo` or `Foo\Bar`, resolved against the current namespace.
    Normal,
    /// `\Foo\Bar`.
    FullyQualified,
    /// `namespace\Foo`.
    Relative,
}

/// A possibly namespaced symbol reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Name {
    pub parts: Vec<String>,
    pub kind: NameKind,
    /// Spelling before name resolution rewrote this name, if it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
}

impl Name {
    #[must_use]
    pub fn new(parts: Vec<String>, kind: NameKind) -> Self {
        Self {
            parts,
            kind,
            original: None,
        }
    }

    /// Parse `Foo\Bar`, `\Foo\Bar` or `namespace\Foo`.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if let Some(rest) = text.strip_prefix('\\') {
            return Self::new(split_parts(rest), NameKind::FullyQualified);
        }
        if text.len() > 10 && text[..10].eq_ignore_ascii_case("namespace\\") {
            return Self::new(split_parts(&text[10..]), NameKind::Relative);
        }
        Self::new(split_parts(text), NameKind::Normal)
    }

    /// A fully qualified name from a `\`-separated path (leading `\` optional).
    #[must_use]
    pub fn fully_qualified(path: &str) -> Self {
        Self::new(
            split_parts(path.trim_start_matches('\\')),
            NameKind::FullyQualified,
        )
    }

    #[must_use]
    pub fn is_fully_qualified(&self) -> bool {
        self.kind == NameKind::FullyQualified
    }

    /// A single segment with no namespace separator and no leading `\`.
    #[must_use]
    pub fn is_unqualified(&self) -> bool {
        self.kind == NameKind::Normal && self.parts.len() == 1
    }

    #[must_use]
    pub fn first(&self) -> &str {
        self.parts.first().map_or("", String::as_str)
    }

    #[must_use]
    pub fn last(&self) -> &str {
        self.parts.last().map_or("", String::as_str)
    }

    /// Segments joined with `\`, without any leading separator.
    #[must_use]
    pub fn joined(&self) -> String {
        self.parts.join("\\")
    }

    /// `self`, `static` or `parent`.
    #[must_use]
    pub fn is_special_class_name(&self) -> bool {
        self.is_unqualified()
            && matches!(
                self.first().to_ascii_lowercase().as_str(),
                "self" | "static" | "parent"
            )
    }
}

fn split_parts(path: &str) -> Vec<String> {
    path.split('\\')
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            NameKind::Normal => {}
            NameKind::FullyQualified => f.write_str("\\")?,
            NameKind::Relative => f.write_str("namespace\\")?,
        }
        f.write_str(&self.joined())
    }
}

/// Either a static name or a dynamic expression, e.g. the callee of a call
/// or the class operand of `new` and `::`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NameOrExpr {
    Name(Name),
    Expr(Box<Spanned<Expr>>),
}

/// The name after `->` or `::`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemberName {
    Ident(String),
    Expr(Box<Spanned<Expr>>),
}

// ── Types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeHint {
    /// Built-in type keyword such as `int` or `void`, lowercased.
    Builtin(String),
    Class(Name),
    Nullable(Box<TypeHint>),
    Union(Vec<TypeHint>),
    Intersection(Vec<TypeHint>),
}

/// Type names that never refer to a class.
pub const BUILTIN_TYPES: &[&str] = &[
    "array", "bool", "callable", "false", "float", "int", "iterable", "mixed", "never", "null",
    "object", "string", "true", "void",
];

impl TypeHint {
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, TypeHint::Builtin(t) if t == "void")
    }

    #[must_use]
    pub fn is_nullable(&self) -> bool {
        match self {
            TypeHint::Nullable(_) => true,
            TypeHint::Builtin(t) => t == "null" || t == "mixed",
            TypeHint::Union(types) => types.iter().any(TypeHint::is_nullable),
            _ => false,
        }
    }
}

// ── Statements ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Expression(Spanned<Expr>),
    Echo(Vec<Spanned<Expr>>),
    If(IfStmt),
    While {
        cond: Spanned<Expr>,
        body: Block,
    },
    DoWhile {
        body: Block,
        cond: Spanned<Expr>,
    },
    For {
        init: Vec<Spanned<Expr>>,
        cond: Vec<Spanned<Expr>>,
        step: Vec<Spanned<Expr>>,
        body: Block,
    },
    Foreach {
        expr: Spanned<Expr>,
        key: Option<Spanned<Expr>>,
        value: Spanned<Expr>,
        by_ref: bool,
        body: Block,
    },
    Switch {
        subject: Spanned<Expr>,
        cases: Vec<SwitchCase>,
    },
    Break(Option<Spanned<Expr>>),
    Continue(Option<Spanned<Expr>>),
    Return(Option<Spanned<Expr>>),
    Global(Vec<Spanned<Expr>>),
    Static(Vec<StaticVar>),
    Unset(Vec<Spanned<Expr>>),
    Function(FunctionDecl),
    Class(ClassDecl),
    Namespace(NamespaceDecl),
    Use(UseDecl),
    Const(Vec<ConstItem>),
    Try(TryStmt),
    Declare(DeclareStmt),
    Goto(String),
    Label(String),
    Block(Block),
    Nop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub cond: Spanned<Expr>,
    pub then: Block,
    pub elseifs: Vec<ElseIf>,
    pub else_: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElseIf {
    pub cond: Spanned<Expr>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    /// `None` for `default:`.
    pub test: Option<Spanned<Expr>>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticVar {
    pub name: String,
    pub default: Option<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstItem {
    pub name: String,
    pub value: Spanned<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceDecl {
    /// `None` for the global `namespace { ... }` block.
    pub name: Option<Name>,
    pub stmts: Block,
    /// `namespace Foo { ... }` as opposed to `namespace Foo;`.
    pub braced: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UseKind {
    Normal,
    Function,
    Const,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseDecl {
    pub kind: UseKind,
    /// Shared prefix of a group use, `use Foo\{Bar, Baz}`.
    pub prefix: Option<Name>,
    pub items: Vec<UseItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseItem {
    pub name: Name,
    pub alias: Option<String>,
    /// Per-item kind inside a mixed group use.
    pub kind: Option<UseKind>,
}

impl UseItem {
    /// The alias this item binds: explicit, or the last segment of the name.
    #[must_use]
    pub fn alias_name(&self) -> &str {
        self.alias.as_deref().unwrap_or_else(|| self.name.last())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TryStmt {
    pub body: Block,
    pub catches: Vec<CatchClause>,
    pub finally: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub types: Vec<Name>,
    pub var: Option<String>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclareStmt {
    pub directives: Vec<(String, Spanned<Expr>)>,
    pub body: Option<Block>,
}

// ── Functions and classes ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeHint>,
    pub default: Option<Spanned<Expr>>,
    pub by_ref: bool,
    pub variadic: bool,
    /// Constructor property promotion modifiers.
    pub promote: Option<Modifiers>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub by_ref: bool,
    pub params: Vec<Param>,
    pub return_type: Option<TypeHint>,
    pub body: Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
}

impl ClassKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Interface => "interface",
            ClassKind::Trait => "trait",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub kind: ClassKind,
    /// `None` for anonymous classes.
    pub name: Option<String>,
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_readonly: bool,
    /// One parent for classes; any number for interfaces.
    pub extends: Vec<Name>,
    pub implements: Vec<Name>,
    pub members: Vec<Spanned<ClassMember>>,
}

impl ClassDecl {
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|(m, _)| match m {
            ClassMember::Method(method) => Some(method),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub visibility: Option<Visibility>,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_readonly: bool,
}

impl Modifiers {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Modifiers::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClassMember {
    Method(MethodDecl),
    Property(PropertyDecl),
    Const(ClassConstDecl),
    TraitUse(Vec<Name>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub by_ref: bool,
    pub params: Vec<Param>,
    pub return_type: Option<TypeHint>,
    /// `None` for abstract and interface methods.
    pub body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub modifiers: Modifiers,
    pub ty: Option<TypeHint>,
    pub props: Vec<(String, Option<Spanned<Expr>>)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassConstDecl {
    pub modifiers: Modifiers,
    pub items: Vec<ConstItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureUse {
    pub name: String,
    pub by_ref: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Closure {
    pub is_static: bool,
    pub by_ref: bool,
    pub params: Vec<Param>,
    pub uses: Vec<ClosureUse>,
    pub return_type: Option<TypeHint>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowFn {
    pub is_static: bool,
    pub by_ref: bool,
    pub params: Vec<Param>,
    pub return_type: Option<TypeHint>,
    pub body: Box<Spanned<Expr>>,
}

// ── Expressions ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Literal {
    /// Integer literal exactly as written.
    Int(String),
    /// Float literal exactly as written.
    Float(String),
    /// Quoted string, quotes and escapes kept verbatim.
    String(String),
    /// Heredoc or nowdoc, from `<<<` through the closing label.
    Heredoc(String),
    /// Backtick shell command, backticks included.
    ShellExec(String),
}

impl Literal {
    /// Whether this string literal is subject to `$var` interpolation.
    #[must_use]
    pub fn interpolates(&self) -> bool {
        match self {
            Literal::String(s) => s.starts_with('"'),
            Literal::ShellExec(_) => true,
            Literal::Heredoc(s) => !s[3..].trim_start().starts_with('\''),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MagicConst {
    Class,
    Dir,
    File,
    Function,
    Line,
    Method,
    Namespace,
    Trait,
}

impl MagicConst {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MagicConst::Class => "__CLASS__",
            MagicConst::Dir => "__DIR__",
            MagicConst::File => "__FILE__",
            MagicConst::Function => "__FUNCTION__",
            MagicConst::Line => "__LINE__",
            MagicConst::Method => "__METHOD__",
            MagicConst::Namespace => "__NAMESPACE__",
            MagicConst::Trait => "__TRAIT__",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayItem {
    pub key: Option<Spanned<Expr>>,
    pub value: Spanned<Expr>,
    pub by_ref: bool,
    pub unpack: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arg {
    pub value: Spanned<Expr>,
    /// Named argument label, `foo(name: $x)`.
    pub name: Option<String>,
    pub by_ref: bool,
    pub unpack: bool,
}

impl Arg {
    #[must_use]
    pub fn positional(value: Spanned<Expr>) -> Self {
        Self {
            value,
            name: None,
            by_ref: false,
            unpack: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchArm {
    /// `None` for the `default` arm.
    pub conds: Option<Vec<Spanned<Expr>>>,
    pub body: Spanned<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncludeKind {
    Include,
    IncludeOnce,
    Require,
    RequireOnce,
}

impl IncludeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IncludeKind::Include => "include",
            IncludeKind::IncludeOnce => "include_once",
            IncludeKind::Require => "require",
            IncludeKind::RequireOnce => "require_once",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastKind {
    Int,
    Float,
    String,
    Bool,
    Array,
    Object,
    Unset,
}

impl CastKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CastKind::Int => "int",
            CastKind::Float => "float",
            CastKind::String => "string",
            CastKind::Bool => "bool",
            CastKind::Array => "array",
            CastKind::Object => "object",
            CastKind::Unset => "unset",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Negate,
    Plus,
    BitNot,
    Silence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncDecOp {
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Pow,
    Concat,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    BoolAnd,
    BoolOr,
    LogicalAnd,
    LogicalOr,
    LogicalXor,
    Equal,
    NotEqual,
    Identical,
    NotIdentical,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Spaceship,
    Coalesce,
}

impl BinaryOp {
    /// Left and right binding power. Right-associative operators have the
    /// lower power on the right.
    #[must_use]
    pub fn binding_power(self) -> (u8, u8) {
        match self {
            BinaryOp::LogicalOr => (1, 2),
            BinaryOp::LogicalXor => (3, 4),
            BinaryOp::LogicalAnd => (5, 6),
            BinaryOp::Coalesce => (12, 11),
            BinaryOp::BoolOr => (13, 14),
            BinaryOp::BoolAnd => (15, 16),
            BinaryOp::BitOr => (17, 18),
            BinaryOp::BitXor => (19, 20),
            BinaryOp::BitAnd => (21, 22),
            BinaryOp::Equal
            | BinaryOp::NotEqual
            | BinaryOp::Identical
            | BinaryOp::NotIdentical
            | BinaryOp::Spaceship => (23, 24),
            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
                (25, 26)
            }
            BinaryOp::Concat => (27, 28),
            BinaryOp::Shl | BinaryOp::Shr => (29, 30),
            BinaryOp::Add | BinaryOp::Subtract => (31, 32),
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo => (33, 34),
            BinaryOp::Pow => (42, 41),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Concat => ".",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::BoolAnd => "&&",
            BinaryOp::BoolOr => "||",
            BinaryOp::LogicalAnd => "and",
            BinaryOp::LogicalOr => "or",
            BinaryOp::LogicalXor => "xor",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Identical => "===",
            BinaryOp::NotIdentical => "!==",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Spaceship => "<=>",
            BinaryOp::Coalesce => "??",
        }
    }
}

/// Binding power of `=` and friends on their right-hand side.
pub const ASSIGN_BP: u8 = 7;
/// Left binding power of `? :`.
pub const TERNARY_BP: u8 = 9;
/// Binding power of `!` on its operand.
pub const NOT_BP: u8 = 35;
/// `instanceof` binds tighter than `!`.
pub const INSTANCEOF_BP: (u8, u8) = (37, 38);
/// Binding power of the other prefix operators and casts.
pub const PREFIX_BP: u8 = 39;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// `$name`, stored without the `$`.
    Variable(String),
    /// `$$name` or `${expr}`.
    VariableVariable(Box<Spanned<Expr>>),
    Literal(Literal),
    ConstFetch(Name),
    MagicConst(MagicConst),
    Array {
        items: Vec<Option<ArrayItem>>,
        /// `[...]` as opposed to `array(...)`.
        short: bool,
    },
    /// `list(...)` destructuring target.
    List(Vec<Option<ArrayItem>>),
    ArrayDimFetch {
        var: Box<Spanned<Expr>>,
        /// `None` for the append form `$a[]`.
        dim: Option<Box<Spanned<Expr>>>,
    },
    PropertyFetch {
        var: Box<Spanned<Expr>>,
        name: MemberName,
        nullsafe: bool,
    },
    StaticPropertyFetch {
        class: NameOrExpr,
        name: String,
    },
    ClassConstFetch {
        class: NameOrExpr,
        name: String,
    },
    FuncCall {
        name: NameOrExpr,
        args: Vec<Arg>,
    },
    MethodCall {
        var: Box<Spanned<Expr>>,
        name: MemberName,
        args: Vec<Arg>,
        nullsafe: bool,
    },
    StaticCall {
        class: NameOrExpr,
        name: MemberName,
        args: Vec<Arg>,
    },
    New {
        class: NameOrExpr,
        args: Vec<Arg>,
    },
    NewAnonymous {
        class: Box<ClassDecl>,
        args: Vec<Arg>,
    },
    Clone(Box<Spanned<Expr>>),
    Print(Box<Spanned<Expr>>),
    Assign {
        var: Box<Spanned<Expr>>,
        value: Box<Spanned<Expr>>,
    },
    AssignRef {
        var: Box<Spanned<Expr>>,
        value: Box<Spanned<Expr>>,
    },
    AssignOp {
        op: BinaryOp,
        var: Box<Spanned<Expr>>,
        value: Box<Spanned<Expr>>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Spanned<Expr>>,
        right: Box<Spanned<Expr>>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Spanned<Expr>>,
    },
    IncDec {
        op: IncDecOp,
        var: Box<Spanned<Expr>>,
    },
    Cast {
        kind: CastKind,
        expr: Box<Spanned<Expr>>,
    },
    Ternary {
        cond: Box<Spanned<Expr>>,
        /// `None` for the short form `a ?: b`.
        then: Option<Box<Spanned<Expr>>>,
        else_: Box<Spanned<Expr>>,
    },
    Instanceof {
        expr: Box<Spanned<Expr>>,
        class: NameOrExpr,
    },
    Isset(Vec<Spanned<Expr>>),
    Empty(Box<Spanned<Expr>>),
    Exit {
        /// Spelled `die` rather than `exit`.
        die: bool,
        expr: Option<Box<Spanned<Expr>>>,
    },
    Include {
        kind: IncludeKind,
        expr: Box<Spanned<Expr>>,
    },
    Closure(Box<Closure>),
    ArrowFn(Box<ArrowFn>),
    Yield {
        key: Option<Box<Spanned<Expr>>>,
        value: Option<Box<Spanned<Expr>>>,
    },
    YieldFrom(Box<Spanned<Expr>>),
    Throw(Box<Spanned<Expr>>),
    Match {
        subject: Box<Spanned<Expr>>,
        arms: Vec<MatchArm>,
    },
}

impl Expr {
    /// Expressions that denote a storage location.
    #[must_use]
    pub fn is_variable_like(&self) -> bool {
        matches!(
            self,
            Expr::Variable(_)
                | Expr::VariableVariable(_)
                | Expr::ArrayDimFetch { .. }
                | Expr::PropertyFetch { .. }
                | Expr::StaticPropertyFetch { .. }
        )
    }

    /// Function, method, static method or `new` calls.
    #[must_use]
    pub fn is_call(&self) -> bool {
        matches!(
            self,
            Expr::FuncCall { .. } | Expr::MethodCall { .. } | Expr::StaticCall { .. }
        )
    }

    /// Build `new \Fully\Qualified\Class(args)`.
    #[must_use]
    pub fn new_instance(class: &str, args: Vec<Arg>) -> Self {
        Expr::New {
            class: NameOrExpr::Name(Name::fully_qualified(class)),
            args,
        }
    }
}
