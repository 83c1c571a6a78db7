//! Hand-written recursive-descent parser with Pratt precedence for operator expressions.
//!
//! The parser stops at the first syntax error. Error messages follow the
//! wording of PHP's own parser so that callers can classify them.

use crate::ast::{
    Arg, ArrayItem, ArrowFn, BinaryOp, Block, CastKind, CatchClause, ClassConstDecl, ClassDecl,
    ClassKind, ClassMember, Closure, ClosureUse, ConstItem, DeclareStmt, ElseIf, Expr,
    FunctionDecl, IfStmt, IncDecOp, IncludeKind, Literal, MagicConst, MatchArm, MemberName,
    MethodDecl, Modifiers, Name, NameKind, NameOrExpr, NamespaceDecl, Param, Program,
    PropertyDecl, Span, Spanned, StaticVar, Stmt, SwitchCase, TryStmt, TypeHint, UnaryOp,
    UseDecl, UseItem, UseKind, Visibility, ASSIGN_BP, BUILTIN_TYPES, INSTANCEOF_BP, NOT_BP,
    PREFIX_BP, TERNARY_BP,
};
use rephp_lexer::{LexError, Token};
use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// Maximum nesting depth for recursive parse functions.
const MAX_DEPTH: usize = 256;

/// RAII guard that decrements the parser recursion depth on drop.
///
/// Uses a raw pointer to avoid holding a borrow on the `Parser` struct,
/// which would conflict with the mutable borrows needed by parse methods.
#[derive(Debug)]
struct RecursionGuard(*const Cell<usize>);

impl Drop for RecursionGuard {
    fn drop(&mut self) {
        // SAFETY: The pointer targets `Parser::depth`, which lives at least as long
        // as any `RecursionGuard` created from it (guards are local variables in
        // parser methods that take `&mut self`).
        let cell = unsafe { &*self.0 };
        cell.set(cell.get() - 1);
    }
}

/// Broad classification of a syntax error, used to tell "keep typing" apart
/// from genuine mistakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseErrorKind {
    /// Input ended while a construct was still open.
    UnexpectedEof,
    /// A single-quoted string runs to end of input.
    UnclosedString,
    UnterminatedComment,
    TrailingComma,
    /// Any other unexpected token or character.
    Unexpected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Raw message in PHP's wording, e.g. `Syntax error, unexpected EOF`.
    pub message: String,
    pub span: Span,
    /// Optional actionable suggestion for fixing the error.
    pub hint: Option<String>,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug)]
pub struct ParseResult {
    pub program: Program,
    pub errors: Vec<ParseError>,
}

/// Parser state wrapping a token stream.
#[derive(Debug)]
pub struct Parser<'src> {
    tokens: Vec<(Token<'src>, Span)>,
    pos: usize,
    errors: Vec<ParseError>,
    depth: Cell<usize>,
    source: &'src str,
}

impl<'src> Parser<'src> {
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        let mut errors = Vec::new();
        let mut tokens = Vec::new();
        for (index, (tok, s)) in rephp_lexer::lex(source).into_iter().enumerate() {
            let span = s.start..s.end;
            match tok {
                Token::OpenTag if index == 0 => {}
                // `?>` terminates a statement just like `;`.
                Token::CloseTag => tokens.push((Token::Semicolon, span)),
                Token::Error(err) => {
                    if errors.is_empty() {
                        errors.push(lex_error(err, source, span));
                    }
                }
                tok => tokens.push((tok, span)),
            }
        }
        Self {
            tokens,
            pos: 0,
            errors,
            depth: Cell::new(0),
            source,
        }
    }

    // ── Helpers ──
    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_tok(&self) -> Option<Token<'src>> {
        self.peek().cloned()
    }

    /// Peek `n` tokens past the current one.
    fn peek_nth(&self, n: usize) -> Option<&Token<'src>> {
        self.tokens.get(self.pos + n).map(|(t, _)| t)
    }

    fn peek_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map_or(self.source.len()..self.source.len(), |(_, s)| s.clone())
    }

    /// End offset of the most recently consumed token.
    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(0, |(_, s)| s.end)
    }

    fn advance(&mut self) -> Option<(Token<'src>, Span)> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, expected: &Token<'_>) -> bool {
        self.peek()
            .is_some_and(|tok| std::mem::discriminant(tok) == std::mem::discriminant(expected))
    }

    fn expect(&mut self, expected: &Token<'_>) -> Option<Span> {
        if self.check(expected) {
            return self.advance().map(|(_, span)| span);
        }
        self.unexpected_expecting(Some(expected.text()))
    }

    fn eat(&mut self, expected: &Token<'_>) -> bool {
        if self.check(expected) {
            self.advance();
            return true;
        }
        false
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn push_error(&mut self, kind: ParseErrorKind, message: String, span: Span) {
        self.errors.push(ParseError {
            kind,
            message,
            span,
            hint: None,
        });
    }

    fn error_with_hint(&mut self, message: String, hint: impl Into<String>) {
        let span = self.peek_span();
        self.errors.push(ParseError {
            kind: ParseErrorKind::Unexpected,
            message,
            span,
            hint: Some(hint.into()),
        });
    }

    /// Record an error about the current token and return `None`.
    fn unexpected<T>(&mut self) -> Option<T> {
        self.unexpected_expecting(None)
    }

    fn unexpected_expecting<T>(&mut self, expecting: Option<&str>) -> Option<T> {
        let span = self.peek_span();
        match self.peek_tok() {
            None => self.push_error(
                ParseErrorKind::UnexpectedEof,
                "Syntax error, unexpected EOF".to_string(),
                span,
            ),
            Some(Token::UnterminatedString(s)) if s.starts_with('\'') => self.push_error(
                ParseErrorKind::UnclosedString,
                "Syntax error, unexpected T_ENCAPSED_AND_WHITESPACE".to_string(),
                span,
            ),
            Some(Token::UnterminatedString(_)) => self.push_error(
                ParseErrorKind::UnexpectedEof,
                "Syntax error, unexpected EOF".to_string(),
                span,
            ),
            Some(tok) => {
                let message = match expecting {
                    Some(exp) => format!("Syntax error, unexpected {tok}, expecting \"{exp}\""),
                    None => format!("Syntax error, unexpected {tok}"),
                };
                self.push_error(ParseErrorKind::Unexpected, message, span);
            }
        }
        None
    }

    /// Increment recursion depth and return a guard that decrements on drop.
    /// Returns `None` (after recording an error) if `MAX_DEPTH` is exceeded.
    fn enter_recursion(&mut self) -> Option<RecursionGuard> {
        let d = self.depth.get() + 1;
        self.depth.set(d);
        if d > MAX_DEPTH {
            let span = self.peek_span();
            self.push_error(
                ParseErrorKind::Unexpected,
                "Maximum nesting depth exceeded".to_string(),
                span,
            );
            self.depth.set(d - 1);
            return None;
        }
        Some(RecursionGuard(std::ptr::from_ref(&self.depth)))
    }

    /// True when the current token closes a list, so a preceding comma was
    /// a trailing one.
    fn at_list_end(&self) -> bool {
        matches!(
            self.peek(),
            None | Some(
                Token::Semicolon
                    | Token::RightParen
                    | Token::RightBracket
                    | Token::RightBrace
                    | Token::LeftBrace
            )
        )
    }

    /// Parse `item (, item)*`. A trailing comma is only accepted when
    /// `allow_trailing` is set and the list is closed by `end`.
    fn comma_list<T>(
        &mut self,
        allow_trailing: bool,
        end: &Token<'_>,
        mut item: impl FnMut(&mut Self) -> Option<T>,
    ) -> Option<Vec<T>> {
        let mut items = Vec::new();
        if allow_trailing && self.check(end) {
            return Some(items);
        }
        loop {
            items.push(item(self)?);
            if !self.eat(&Token::Comma) {
                break;
            }
            if self.at_list_end() {
                if allow_trailing && self.check(end) {
                    break;
                }
                let span = self.peek_span();
                self.push_error(
                    ParseErrorKind::TrailingComma,
                    "A trailing comma is not allowed here".to_string(),
                    span,
                );
                return None;
            }
        }
        Some(items)
    }

    fn expect_ident(&mut self) -> Option<String> {
        if let Some(Token::Identifier(name)) = self.peek_tok() {
            self.advance();
            return Some(name.to_string());
        }
        self.unexpected_expecting(Some("identifier"))
    }

    /// Any identifier or reserved word, as allowed after `->`, `::` and in
    /// method and constant declarations.
    fn expect_member_ident(&mut self) -> Option<String> {
        if let Some(name) = self.peek().and_then(|t| t.as_member_name().map(str::to_string)) {
            self.advance();
            return Some(name);
        }
        self.unexpected_expecting(Some("identifier"))
    }

    fn expect_variable(&mut self) -> Option<String> {
        if let Some(Token::Variable(v)) = self.peek_tok() {
            self.advance();
            return Some(v[1..].to_string());
        }
        self.unexpected_expecting(Some("variable"))
    }

    fn peek_name(&self) -> Option<Name> {
        match self.peek()? {
            Token::Identifier(s) => Some(Name::new(vec![(*s).to_string()], NameKind::Normal)),
            Token::QualifiedName(s) | Token::FullyQualifiedName(s) => Some(Name::parse(s)),
            _ => None,
        }
    }

    fn expect_name(&mut self) -> Option<Name> {
        if let Some(name) = self.peek_name() {
            self.advance();
            return Some(name);
        }
        self.unexpected_expecting(Some("identifier"))
    }

    // ── Program ──

    fn parse_program(&mut self) -> Program {
        let mut stmts = Vec::new();
        if !self.errors.is_empty() {
            return Program { stmts };
        }
        while !self.at_end() {
            match self.parse_stmt() {
                Some(stmt) => stmts.push(stmt),
                None => break,
            }
        }
        Program { stmts }
    }

    // ── Statements ──

    #[expect(
        clippy::too_many_lines,
        reason = "statement dispatch covers every statement keyword"
    )]
    fn parse_stmt(&mut self) -> Option<Spanned<Stmt>> {
        let _guard = self.enter_recursion()?;
        let start = self.peek_span().start;
        let Some(tok) = self.peek_tok() else {
            return self.unexpected();
        };
        let stmt = match tok {
            Token::LeftBrace => Stmt::Block(self.parse_block()?),
            Token::Semicolon => {
                self.advance();
                Stmt::Nop
            }
            Token::Echo => {
                self.advance();
                let exprs = self.comma_list(false, &Token::Semicolon, Self::parse_expr)?;
                self.expect(&Token::Semicolon)?;
                Stmt::Echo(exprs)
            }
            Token::If => Stmt::If(self.parse_if()?),
            Token::While => {
                self.advance();
                let cond = self.parse_paren_expr()?;
                let body = self.parse_body()?;
                Stmt::While { cond, body }
            }
            Token::Do => {
                self.advance();
                let body = self.parse_body()?;
                self.expect(&Token::While)?;
                let cond = self.parse_paren_expr()?;
                self.expect(&Token::Semicolon)?;
                Stmt::DoWhile { body, cond }
            }
            Token::For => self.parse_for()?,
            Token::Foreach => self.parse_foreach()?,
            Token::Switch => self.parse_switch()?,
            Token::Break | Token::Continue => {
                self.advance();
                let level = if self.check(&Token::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(&Token::Semicolon)?;
                if tok == Token::Break {
                    Stmt::Break(level)
                } else {
                    Stmt::Continue(level)
                }
            }
            Token::Return => {
                self.advance();
                let value = if self.check(&Token::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(&Token::Semicolon)?;
                Stmt::Return(value)
            }
            Token::Global => {
                self.advance();
                let vars = self.comma_list(false, &Token::Semicolon, Self::parse_simple_variable)?;
                self.expect(&Token::Semicolon)?;
                Stmt::Global(vars)
            }
            Token::Static if matches!(self.peek_nth(1), Some(Token::Variable(_))) => {
                self.advance();
                let vars = self.comma_list(false, &Token::Semicolon, |p| {
                    let name = p.expect_variable()?;
                    let default = if p.eat(&Token::Equal) {
                        Some(p.parse_expr()?)
                    } else {
                        None
                    };
                    Some(StaticVar { name, default })
                })?;
                self.expect(&Token::Semicolon)?;
                Stmt::Static(vars)
            }
            Token::Unset => {
                self.advance();
                self.expect(&Token::LeftParen)?;
                let vars = self.comma_list(true, &Token::RightParen, Self::parse_expr)?;
                self.expect(&Token::RightParen)?;
                self.expect(&Token::Semicolon)?;
                Stmt::Unset(vars)
            }
            Token::Function if self.starts_function_decl() => {
                Stmt::Function(self.parse_function_decl()?)
            }
            Token::Abstract | Token::Final | Token::Class | Token::Interface | Token::Trait => {
                Stmt::Class(self.parse_class_decl()?)
            }
            Token::Readonly if self.starts_class_after_modifiers() => {
                Stmt::Class(self.parse_class_decl()?)
            }
            Token::Namespace => Stmt::Namespace(self.parse_namespace()?),
            Token::Use => Stmt::Use(self.parse_use()?),
            Token::Const => {
                self.advance();
                let items = self.comma_list(false, &Token::Semicolon, Self::parse_const_item)?;
                self.expect(&Token::Semicolon)?;
                Stmt::Const(items)
            }
            Token::Try => Stmt::Try(self.parse_try()?),
            Token::Declare => Stmt::Declare(self.parse_declare()?),
            Token::Goto => {
                self.advance();
                let label = self.expect_ident()?;
                self.expect(&Token::Semicolon)?;
                Stmt::Goto(label)
            }
            Token::Identifier(label) if self.peek_nth(1) == Some(&Token::Colon) => {
                self.advance();
                self.advance();
                Stmt::Label(label.to_string())
            }
            Token::AttributeStart => {
                self.error_with_hint(
                    "Syntax error, unexpected token \"#[\"".to_string(),
                    "attributes are not supported",
                );
                return None;
            }
            _ => {
                let expr = self.parse_expr()?;
                self.expect(&Token::Semicolon)?;
                Stmt::Expression(expr)
            }
        };
        Some((stmt, start..self.prev_end()))
    }

    /// `{ stmts }`
    fn parse_block(&mut self) -> Option<Block> {
        self.expect(&Token::LeftBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&Token::RightBrace) {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(&Token::RightBrace)?;
        Some(stmts)
    }

    /// Body of a control structure: a block or a single statement.
    fn parse_body(&mut self) -> Option<Block> {
        match self.peek() {
            Some(Token::LeftBrace) => self.parse_block(),
            Some(Token::Colon) => {
                self.error_with_hint(
                    "Syntax error, unexpected token \":\"".to_string(),
                    "the alternative syntax for control structures is not supported",
                );
                None
            }
            _ => Some(vec![self.parse_stmt()?]),
        }
    }

    fn parse_paren_expr(&mut self) -> Option<Spanned<Expr>> {
        self.expect(&Token::LeftParen)?;
        let expr = self.parse_expr()?;
        self.expect(&Token::RightParen)?;
        Some(expr)
    }

    fn parse_if(&mut self) -> Option<IfStmt> {
        self.expect(&Token::If)?;
        let cond = self.parse_paren_expr()?;
        let then = self.parse_body()?;
        let mut elseifs = Vec::new();
        let mut else_ = None;
        loop {
            if self.eat(&Token::ElseIf) {
                let cond = self.parse_paren_expr()?;
                let body = self.parse_body()?;
                elseifs.push(ElseIf { cond, body });
            } else if self.check(&Token::Else) {
                self.advance();
                // `else if` is the same as `elseif`.
                if self.eat(&Token::If) {
                    let cond = self.parse_paren_expr()?;
                    let body = self.parse_body()?;
                    elseifs.push(ElseIf { cond, body });
                } else {
                    else_ = Some(self.parse_body()?);
                    break;
                }
            } else {
                break;
            }
        }
        Some(IfStmt {
            cond,
            then,
            elseifs,
            else_,
        })
    }

    fn parse_for(&mut self) -> Option<Stmt> {
        self.expect(&Token::For)?;
        self.expect(&Token::LeftParen)?;
        let init = self.parse_for_exprs(&Token::Semicolon)?;
        self.expect(&Token::Semicolon)?;
        let cond = self.parse_for_exprs(&Token::Semicolon)?;
        self.expect(&Token::Semicolon)?;
        let step = self.parse_for_exprs(&Token::RightParen)?;
        self.expect(&Token::RightParen)?;
        let body = self.parse_body()?;
        Some(Stmt::For {
            init,
            cond,
            step,
            body,
        })
    }

    fn parse_for_exprs(&mut self, end: &Token<'_>) -> Option<Vec<Spanned<Expr>>> {
        if self.check(end) {
            return Some(Vec::new());
        }
        self.comma_list(false, end, Self::parse_expr)
    }

    fn parse_foreach(&mut self) -> Option<Stmt> {
        self.expect(&Token::Foreach)?;
        self.expect(&Token::LeftParen)?;
        let expr = self.parse_expr()?;
        self.expect(&Token::As)?;
        let mut by_ref = self.eat(&Token::Ampersand);
        let first = self.parse_expr()?;
        let (key, value) = if !by_ref && self.eat(&Token::FatArrow) {
            by_ref = self.eat(&Token::Ampersand);
            (Some(first), self.parse_expr()?)
        } else {
            (None, first)
        };
        self.expect(&Token::RightParen)?;
        let body = self.parse_body()?;
        Some(Stmt::Foreach {
            expr,
            key,
            value,
            by_ref,
            body,
        })
    }

    fn parse_switch(&mut self) -> Option<Stmt> {
        self.expect(&Token::Switch)?;
        let subject = self.parse_paren_expr()?;
        self.expect(&Token::LeftBrace)?;
        let mut cases = Vec::new();
        while !self.check(&Token::RightBrace) {
            let test = match self.peek() {
                Some(Token::Case) => {
                    self.advance();
                    Some(self.parse_expr()?)
                }
                Some(Token::Default) => {
                    self.advance();
                    None
                }
                _ => return self.unexpected_expecting(Some("case")),
            };
            if !self.eat(&Token::Colon) {
                self.expect(&Token::Semicolon)?;
            }
            let mut body = Vec::new();
            while !matches!(
                self.peek(),
                Some(Token::Case | Token::Default | Token::RightBrace) | None
            ) {
                body.push(self.parse_stmt()?);
            }
            cases.push(SwitchCase { test, body });
        }
        self.expect(&Token::RightBrace)?;
        Some(Stmt::Switch { subject, cases })
    }

    fn parse_try(&mut self) -> Option<TryStmt> {
        self.expect(&Token::Try)?;
        let body = self.parse_block()?;
        let mut catches = Vec::new();
        while self.eat(&Token::Catch) {
            self.expect(&Token::LeftParen)?;
            let mut types = vec![self.expect_name()?];
            while self.eat(&Token::Pipe) {
                types.push(self.expect_name()?);
            }
            let var = match self.peek_tok() {
                Some(Token::Variable(v)) => {
                    self.advance();
                    Some(v[1..].to_string())
                }
                _ => None,
            };
            self.expect(&Token::RightParen)?;
            let body = self.parse_block()?;
            catches.push(CatchClause { types, var, body });
        }
        let finally = if self.eat(&Token::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };
        if catches.is_empty() && finally.is_none() {
            self.error_with_hint(
                "Cannot use try without catch or finally".to_string(),
                "add a `catch` or `finally` block",
            );
            return None;
        }
        Some(TryStmt {
            body,
            catches,
            finally,
        })
    }

    fn parse_declare(&mut self) -> Option<DeclareStmt> {
        self.expect(&Token::Declare)?;
        self.expect(&Token::LeftParen)?;
        let directives = self.comma_list(false, &Token::RightParen, |p| {
            let key = p.expect_ident()?;
            p.expect(&Token::Equal)?;
            let value = p.parse_expr()?;
            Some((key, value))
        })?;
        self.expect(&Token::RightParen)?;
        let body = if self.check(&Token::LeftBrace) {
            Some(self.parse_block()?)
        } else {
            self.expect(&Token::Semicolon)?;
            None
        };
        Some(DeclareStmt { directives, body })
    }

    fn parse_namespace(&mut self) -> Option<NamespaceDecl> {
        self.expect(&Token::Namespace)?;
        let name = match self.peek() {
            Some(Token::LeftBrace) => None,
            _ => Some(self.expect_name()?),
        };
        if self.check(&Token::LeftBrace) {
            let stmts = self.parse_block()?;
            return Some(NamespaceDecl {
                name,
                stmts,
                braced: true,
            });
        }
        if name.is_none() {
            return self.unexpected();
        }
        self.expect(&Token::Semicolon)?;
        // A semicolon namespace owns everything up to the next namespace.
        let mut stmts = Vec::new();
        while !self.at_end() && !self.check(&Token::Namespace) {
            stmts.push(self.parse_stmt()?);
        }
        Some(NamespaceDecl {
            name,
            stmts,
            braced: false,
        })
    }

    fn parse_use(&mut self) -> Option<UseDecl> {
        self.expect(&Token::Use)?;
        let kind = self.parse_use_kind().unwrap_or(UseKind::Normal);
        let first = self.expect_name()?;

        // Group use: `use Foo\{Bar, Baz as Q};`
        if self.check(&Token::Backslash) && self.peek_nth(1) == Some(&Token::LeftBrace) {
            self.advance();
            self.advance();
            let items = self.comma_list(true, &Token::RightBrace, |p| {
                let item_kind = p.parse_use_kind();
                let name = p.expect_name()?;
                let alias = p.parse_use_alias()?;
                Some(UseItem {
                    name,
                    alias,
                    kind: item_kind,
                })
            })?;
            self.expect(&Token::RightBrace)?;
            self.expect(&Token::Semicolon)?;
            return Some(UseDecl {
                kind,
                prefix: Some(first),
                items,
            });
        }

        let alias = self.parse_use_alias()?;
        let mut items = vec![UseItem {
            name: first,
            alias,
            kind: None,
        }];
        if self.eat(&Token::Comma) {
            let rest = self.comma_list(false, &Token::Semicolon, |p| {
                let name = p.expect_name()?;
                let alias = p.parse_use_alias()?;
                Some(UseItem {
                    name,
                    alias,
                    kind: None,
                })
            })?;
            items.extend(rest);
        }
        self.expect(&Token::Semicolon)?;
        Some(UseDecl {
            kind,
            prefix: None,
            items,
        })
    }

    fn parse_use_kind(&mut self) -> Option<UseKind> {
        match self.peek() {
            Some(Token::Function) => {
                self.advance();
                Some(UseKind::Function)
            }
            Some(Token::Const) => {
                self.advance();
                Some(UseKind::Const)
            }
            _ => None,
        }
    }

    fn parse_use_alias(&mut self) -> Option<Option<String>> {
        if self.eat(&Token::As) {
            return Some(Some(self.expect_ident()?));
        }
        Some(None)
    }

    fn parse_const_item(&mut self) -> Option<ConstItem> {
        let name = self.expect_member_ident()?;
        self.expect(&Token::Equal)?;
        let value = self.parse_expr()?;
        Some(ConstItem { name, value })
    }

    // ── Functions ──

    /// `function name(` or `function &name(`, as opposed to a closure.
    fn starts_function_decl(&self) -> bool {
        let offset = usize::from(self.peek_nth(1) == Some(&Token::Ampersand));
        matches!(self.peek_nth(1 + offset), Some(Token::Identifier(_)))
    }

    fn starts_class_after_modifiers(&self) -> bool {
        let mut n = 0;
        while matches!(
            self.peek_nth(n),
            Some(Token::Abstract | Token::Final | Token::Readonly)
        ) {
            n += 1;
        }
        self.peek_nth(n) == Some(&Token::Class)
    }

    fn parse_function_decl(&mut self) -> Option<FunctionDecl> {
        self.expect(&Token::Function)?;
        let by_ref = self.eat(&Token::Ampersand);
        let name = self.expect_ident()?;
        let params = self.parse_params()?;
        let return_type = self.parse_return_type()?;
        let body = self.parse_block()?;
        Some(FunctionDecl {
            name,
            by_ref,
            params,
            return_type,
            body,
        })
    }

    fn parse_params(&mut self) -> Option<Vec<Param>> {
        self.expect(&Token::LeftParen)?;
        let params = self.comma_list(true, &Token::RightParen, Self::parse_param)?;
        self.expect(&Token::RightParen)?;
        Some(params)
    }

    fn parse_param(&mut self) -> Option<Param> {
        let modifiers = self.parse_modifiers();
        let promote = (!modifiers.is_empty()).then_some(modifiers);
        let ty = if matches!(
            self.peek(),
            Some(Token::Variable(_) | Token::Ampersand | Token::Ellipsis)
        ) {
            None
        } else {
            Some(self.parse_type()?)
        };
        let by_ref = self.eat(&Token::Ampersand);
        let variadic = self.eat(&Token::Ellipsis);
        let name = self.expect_variable()?;
        let default = if self.eat(&Token::Equal) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Some(Param {
            name,
            ty,
            default,
            by_ref,
            variadic,
            promote,
        })
    }

    fn parse_return_type(&mut self) -> Option<Option<TypeHint>> {
        if self.eat(&Token::Colon) {
            return Some(Some(self.parse_type()?));
        }
        Some(None)
    }

    fn parse_type(&mut self) -> Option<TypeHint> {
        if self.eat(&Token::Question) {
            return Some(TypeHint::Nullable(Box::new(self.parse_type_atom()?)));
        }
        let first = self.parse_type_atom()?;
        if self.check(&Token::Pipe) {
            let mut types = vec![first];
            while self.eat(&Token::Pipe) {
                types.push(self.parse_type_atom()?);
            }
            return Some(TypeHint::Union(types));
        }
        // `A&B $x` is an intersection, `A &$x` is a by-reference parameter.
        if self.check(&Token::Ampersand)
            && !matches!(self.peek_nth(1), Some(Token::Variable(_) | Token::Ellipsis))
        {
            let mut types = vec![first];
            while self.check(&Token::Ampersand)
                && !matches!(self.peek_nth(1), Some(Token::Variable(_) | Token::Ellipsis))
            {
                self.advance();
                types.push(self.parse_type_atom()?);
            }
            return Some(TypeHint::Intersection(types));
        }
        Some(first)
    }

    fn parse_type_atom(&mut self) -> Option<TypeHint> {
        match self.peek_tok() {
            Some(Token::Array) => {
                self.advance();
                Some(TypeHint::Builtin("array".to_string()))
            }
            Some(Token::Static) => {
                self.advance();
                Some(TypeHint::Class(Name::new(
                    vec!["static".to_string()],
                    NameKind::Normal,
                )))
            }
            Some(Token::Identifier(s)) if BUILTIN_TYPES.contains(&s.to_ascii_lowercase().as_str()) => {
                self.advance();
                Some(TypeHint::Builtin(s.to_ascii_lowercase()))
            }
            _ => Some(TypeHint::Class(self.expect_name()?)),
        }
    }

    // ── Classes ──

    fn parse_modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::default();
        loop {
            match self.peek() {
                Some(Token::Public) => modifiers.visibility = Some(Visibility::Public),
                Some(Token::Protected) => modifiers.visibility = Some(Visibility::Protected),
                Some(Token::Private) => modifiers.visibility = Some(Visibility::Private),
                Some(Token::Static) => modifiers.is_static = true,
                Some(Token::Abstract) => modifiers.is_abstract = true,
                Some(Token::Final) => modifiers.is_final = true,
                Some(Token::Readonly) => modifiers.is_readonly = true,
                _ => return modifiers,
            }
            self.advance();
        }
    }

    fn parse_class_decl(&mut self) -> Option<ClassDecl> {
        let modifiers = self.parse_modifiers();
        let kind = match self.peek() {
            Some(Token::Class) => ClassKind::Class,
            Some(Token::Interface) => ClassKind::Interface,
            Some(Token::Trait) => ClassKind::Trait,
            _ => return self.unexpected_expecting(Some("class")),
        };
        self.advance();
        let name = self.expect_ident()?;
        let mut class = self.parse_class_rest(kind)?;
        class.name = Some(name);
        class.is_abstract = modifiers.is_abstract;
        class.is_final = modifiers.is_final;
        class.is_readonly = modifiers.is_readonly;
        Some(class)
    }

    /// Everything after the class name: `extends`, `implements` and the body.
    fn parse_class_rest(&mut self, kind: ClassKind) -> Option<ClassDecl> {
        let mut extends = Vec::new();
        if self.eat(&Token::Extends) {
            if kind == ClassKind::Interface {
                extends = self.comma_list(false, &Token::LeftBrace, Self::expect_name)?;
            } else {
                extends.push(self.expect_name()?);
            }
        }
        let implements = if kind == ClassKind::Class && self.eat(&Token::Implements) {
            self.comma_list(false, &Token::LeftBrace, Self::expect_name)?
        } else {
            Vec::new()
        };
        self.expect(&Token::LeftBrace)?;
        let mut members = Vec::new();
        while !self.check(&Token::RightBrace) {
            members.push(self.parse_class_member()?);
        }
        self.expect(&Token::RightBrace)?;
        Some(ClassDecl {
            kind,
            name: None,
            is_abstract: false,
            is_final: false,
            is_readonly: false,
            extends,
            implements,
            members,
        })
    }

    fn parse_class_member(&mut self) -> Option<Spanned<ClassMember>> {
        let _guard = self.enter_recursion()?;
        let start = self.peek_span().start;
        if self.eat(&Token::Use) {
            let traits = self.comma_list(false, &Token::Semicolon, Self::expect_name)?;
            if self.check(&Token::LeftBrace) {
                self.error_with_hint(
                    "Syntax error, unexpected token \"{\"".to_string(),
                    "trait adaptations are not supported",
                );
                return None;
            }
            self.expect(&Token::Semicolon)?;
            return Some((ClassMember::TraitUse(traits), start..self.prev_end()));
        }
        let is_var = self.eat(&Token::Var);
        let mut modifiers = self.parse_modifiers();
        if is_var && modifiers.visibility.is_none() {
            modifiers.visibility = Some(Visibility::Public);
        }
        let member = match self.peek() {
            Some(Token::Const) => {
                self.advance();
                let items = self.comma_list(false, &Token::Semicolon, Self::parse_const_item)?;
                self.expect(&Token::Semicolon)?;
                ClassMember::Const(ClassConstDecl { modifiers, items })
            }
            Some(Token::Function) => {
                self.advance();
                let by_ref = self.eat(&Token::Ampersand);
                let name = self.expect_member_ident()?;
                let params = self.parse_params()?;
                let return_type = self.parse_return_type()?;
                let body = if self.eat(&Token::Semicolon) {
                    None
                } else {
                    Some(self.parse_block()?)
                };
                ClassMember::Method(MethodDecl {
                    name,
                    modifiers,
                    by_ref,
                    params,
                    return_type,
                    body,
                })
            }
            _ => {
                let ty = if matches!(self.peek(), Some(Token::Variable(_))) {
                    None
                } else {
                    Some(self.parse_type()?)
                };
                let props = self.comma_list(false, &Token::Semicolon, |p| {
                    let name = p.expect_variable()?;
                    let default = if p.eat(&Token::Equal) {
                        Some(p.parse_expr()?)
                    } else {
                        None
                    };
                    Some((name, default))
                })?;
                self.expect(&Token::Semicolon)?;
                ClassMember::Property(PropertyDecl {
                    modifiers,
                    ty,
                    props,
                })
            }
        };
        Some((member, start..self.prev_end()))
    }

    // ── Expressions (Pratt Precedence) ──

    pub(crate) fn parse_expr(&mut self) -> Option<Spanned<Expr>> {
        let _guard = self.enter_recursion()?;
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Option<Spanned<Expr>> {
        let start = self.peek_span().start;
        let mut lhs = self.parse_unary()?;

        loop {
            let Some(tok) = self.peek_tok() else {
                break;
            };

            // Assignment binds to whatever variable precedes it, regardless of
            // the surrounding precedence: `$a + $b = 1` is `$a + ($b = 1)`.
            if let Some(op) = assign_op(&tok) {
                let assignable = lhs.0.is_variable_like()
                    || (op.is_none()
                        && matches!(lhs.0, Expr::List(_) | Expr::Array { .. }));
                if !assignable {
                    break;
                }
                self.advance();
                let var = Box::new(lhs);
                lhs = if op.is_none() && self.eat(&Token::Ampersand) {
                    let value = self.parse_expr_bp(ASSIGN_BP)?;
                    let end = value.1.end;
                    (
                        Expr::AssignRef {
                            var,
                            value: Box::new(value),
                        },
                        start..end,
                    )
                } else {
                    let value = Box::new(self.parse_expr_bp(ASSIGN_BP)?);
                    let end = value.1.end;
                    let expr = match op {
                        Some(op) => Expr::AssignOp { op, var, value },
                        None => Expr::Assign { var, value },
                    };
                    (expr, start..end)
                };
                continue;
            }

            match tok {
                Token::Question => {
                    if TERNARY_BP < min_bp {
                        break;
                    }
                    self.advance();
                    let then = if self.eat(&Token::Colon) {
                        None
                    } else {
                        let then = self.parse_expr()?;
                        self.expect(&Token::Colon)?;
                        Some(Box::new(then))
                    };
                    let else_ = self.parse_expr_bp(TERNARY_BP + 1)?;
                    let end = else_.1.end;
                    lhs = (
                        Expr::Ternary {
                            cond: Box::new(lhs),
                            then,
                            else_: Box::new(else_),
                        },
                        start..end,
                    );
                }
                Token::Instanceof => {
                    if INSTANCEOF_BP.0 < min_bp {
                        break;
                    }
                    self.advance();
                    let class = self.parse_class_ref(INSTANCEOF_BP.1)?;
                    let end = self.prev_end();
                    lhs = (
                        Expr::Instanceof {
                            expr: Box::new(lhs),
                            class,
                        },
                        start..end,
                    );
                }
                tok => {
                    let Some(op) = token_to_binop(&tok) else {
                        break;
                    };
                    let (lbp, rbp) = op.binding_power();
                    if lbp < min_bp {
                        break;
                    }
                    self.advance();
                    let rhs = self.parse_expr_bp(rbp)?;
                    let end = rhs.1.end;
                    lhs = (
                        Expr::Binary {
                            op,
                            left: Box::new(lhs),
                            right: Box::new(rhs),
                        },
                        start..end,
                    );
                }
            }
        }
        Some(lhs)
    }

    /// Prefix operators and keyword-introduced expressions.
    fn parse_unary(&mut self) -> Option<Spanned<Expr>> {
        let _guard = self.enter_recursion()?;
        let start = self.peek_span().start;
        let Some(tok) = self.peek_tok() else {
            return self.unexpected();
        };
        let prefix = |p: &mut Self, bp: u8| -> Option<Box<Spanned<Expr>>> {
            p.advance();
            Some(Box::new(p.parse_expr_bp(bp)?))
        };
        let expr = match tok {
            Token::Bang => Expr::Unary {
                op: UnaryOp::Not,
                expr: prefix(self, NOT_BP)?,
            },
            Token::Minus | Token::Plus | Token::Tilde | Token::At => {
                let op = match tok {
                    Token::Minus => UnaryOp::Negate,
                    Token::Plus => UnaryOp::Plus,
                    Token::Tilde => UnaryOp::BitNot,
                    _ => UnaryOp::Silence,
                };
                Expr::Unary {
                    op,
                    expr: prefix(self, PREFIX_BP)?,
                }
            }
            Token::Cast(text) => Expr::Cast {
                kind: cast_kind(text),
                expr: prefix(self, PREFIX_BP)?,
            },
            Token::PlusPlus | Token::MinusMinus => {
                let op = if tok == Token::PlusPlus {
                    IncDecOp::PreInc
                } else {
                    IncDecOp::PreDec
                };
                Expr::IncDec {
                    op,
                    var: prefix(self, PREFIX_BP)?,
                }
            }
            Token::Clone => Expr::Clone(prefix(self, PREFIX_BP)?),
            Token::Print => Expr::Print(prefix(self, ASSIGN_BP)?),
            Token::Throw => Expr::Throw(prefix(self, 0)?),
            Token::Include | Token::IncludeOnce | Token::Require | Token::RequireOnce => {
                let kind = match tok {
                    Token::Include => IncludeKind::Include,
                    Token::IncludeOnce => IncludeKind::IncludeOnce,
                    Token::Require => IncludeKind::Require,
                    _ => IncludeKind::RequireOnce,
                };
                Expr::Include {
                    kind,
                    expr: prefix(self, ASSIGN_BP)?,
                }
            }
            Token::Yield => self.parse_yield()?,
            Token::New => {
                let new = self.parse_new()?;
                let end = self.prev_end();
                return self.parse_postfix((new, start..end));
            }
            _ => {
                let primary = self.parse_primary()?;
                return self.parse_postfix(primary);
            }
        };
        Some((expr, start..self.prev_end()))
    }

    fn parse_yield(&mut self) -> Option<Expr> {
        self.expect(&Token::Yield)?;
        if let Some(Token::Identifier(s)) = self.peek() {
            if s.eq_ignore_ascii_case("from") {
                self.advance();
                return Some(Expr::YieldFrom(Box::new(self.parse_expr_bp(ASSIGN_BP)?)));
            }
        }
        if matches!(
            self.peek(),
            None | Some(
                Token::Semicolon | Token::RightParen | Token::RightBracket | Token::Comma
            )
        ) {
            return Some(Expr::Yield {
                key: None,
                value: None,
            });
        }
        let first = self.parse_expr_bp(ASSIGN_BP)?;
        if self.eat(&Token::FatArrow) {
            let value = self.parse_expr_bp(ASSIGN_BP)?;
            return Some(Expr::Yield {
                key: Some(Box::new(first)),
                value: Some(Box::new(value)),
            });
        }
        Some(Expr::Yield {
            key: None,
            value: Some(Box::new(first)),
        })
    }

    fn parse_new(&mut self) -> Option<Expr> {
        self.expect(&Token::New)?;
        if self.eat(&Token::Class) {
            let args = if self.check(&Token::LeftParen) {
                self.parse_args()?
            } else {
                Vec::new()
            };
            let class = self.parse_class_rest(ClassKind::Class)?;
            return Some(Expr::NewAnonymous {
                class: Box::new(class),
                args,
            });
        }
        let class = match self.peek_tok() {
            Some(Token::Static) => {
                self.advance();
                NameOrExpr::Name(Name::new(vec!["static".to_string()], NameKind::Normal))
            }
            Some(Token::LeftParen) => NameOrExpr::Expr(Box::new(self.parse_paren_expr()?)),
            Some(Token::Variable(_) | Token::Dollar) => {
                NameOrExpr::Expr(Box::new(self.parse_new_variable()?))
            }
            _ => NameOrExpr::Name(self.expect_name()?),
        };
        let args = if self.check(&Token::LeftParen) {
            self.parse_args()?
        } else {
            Vec::new()
        };
        Some(Expr::New { class, args })
    }

    /// The dynamic class operand of `new`: a variable with property and
    /// index accesses, but no calls.
    fn parse_new_variable(&mut self) -> Option<Spanned<Expr>> {
        let start = self.peek_span().start;
        let mut expr = self.parse_simple_variable()?;
        loop {
            match self.peek() {
                Some(Token::LeftBracket) => {
                    self.advance();
                    let dim = self.parse_expr()?;
                    self.expect(&Token::RightBracket)?;
                    expr = (
                        Expr::ArrayDimFetch {
                            var: Box::new(expr),
                            dim: Some(Box::new(dim)),
                        },
                        start..self.prev_end(),
                    );
                }
                Some(Token::Arrow | Token::NullsafeArrow) => {
                    let nullsafe = self.check(&Token::NullsafeArrow);
                    self.advance();
                    let name = self.parse_member_name()?;
                    expr = (
                        Expr::PropertyFetch {
                            var: Box::new(expr),
                            name,
                            nullsafe,
                        },
                        start..self.prev_end(),
                    );
                }
                _ => return Some(expr),
            }
        }
    }

    /// `$name`, `$$name` or `${expr}`.
    fn parse_simple_variable(&mut self) -> Option<Spanned<Expr>> {
        let start = self.peek_span().start;
        match self.peek_tok() {
            Some(Token::Variable(v)) => {
                self.advance();
                Some((Expr::Variable(v[1..].to_string()), start..self.prev_end()))
            }
            Some(Token::Dollar) => {
                self.advance();
                let inner = if self.eat(&Token::LeftBrace) {
                    let inner = self.parse_expr()?;
                    self.expect(&Token::RightBrace)?;
                    inner
                } else {
                    self.parse_simple_variable()?
                };
                Some((
                    Expr::VariableVariable(Box::new(inner)),
                    start..self.prev_end(),
                ))
            }
            _ => self.unexpected_expecting(Some("variable")),
        }
    }

    /// Class operand of `instanceof`.
    fn parse_class_ref(&mut self, bp: u8) -> Option<NameOrExpr> {
        match self.peek_tok() {
            Some(Token::Static) => {
                self.advance();
                Some(NameOrExpr::Name(Name::new(
                    vec!["static".to_string()],
                    NameKind::Normal,
                )))
            }
            _ => {
                if let Some(name) = self.peek_name() {
                    self.advance();
                    return Some(NameOrExpr::Name(name));
                }
                Some(NameOrExpr::Expr(Box::new(self.parse_expr_bp(bp)?)))
            }
        }
    }

    #[expect(
        clippy::too_many_lines,
        reason = "primary expressions cover every literal and keyword form"
    )]
    fn parse_primary(&mut self) -> Option<Spanned<Expr>> {
        let start = self.peek_span().start;
        let Some(tok) = self.peek_tok() else {
            return self.unexpected();
        };
        let expr = match tok {
            Token::Variable(_) | Token::Dollar => return self.parse_simple_variable(),
            Token::Integer(s) => {
                self.advance();
                Expr::Literal(Literal::Int(s.to_string()))
            }
            Token::Float(s) => {
                self.advance();
                Expr::Literal(Literal::Float(s.to_string()))
            }
            Token::StringLit(s) => {
                self.advance();
                Expr::Literal(Literal::String(s.to_string()))
            }
            Token::Heredoc(s) => {
                self.advance();
                Expr::Literal(Literal::Heredoc(s.to_string()))
            }
            Token::ShellExec(s) => {
                self.advance();
                Expr::Literal(Literal::ShellExec(s.to_string()))
            }
            Token::Identifier(_) | Token::QualifiedName(_) | Token::FullyQualifiedName(_) => {
                let name = self.expect_name()?;
                Expr::ConstFetch(name)
            }
            Token::Static => match self.peek_nth(1) {
                Some(Token::Function | Token::Fn) => {
                    self.advance();
                    let (mut expr, span) = self.parse_primary()?;
                    match &mut expr {
                        Expr::Closure(closure) => closure.is_static = true,
                        Expr::ArrowFn(arrow) => arrow.is_static = true,
                        _ => {}
                    }
                    return Some((expr, start..span.end));
                }
                Some(Token::ColonColon) => {
                    self.advance();
                    Expr::ConstFetch(Name::new(vec!["static".to_string()], NameKind::Normal))
                }
                _ => return self.unexpected(),
            },
            Token::Array if self.peek_nth(1) == Some(&Token::LeftParen) => {
                self.advance();
                self.advance();
                let items = self.parse_array_items(&Token::RightParen)?;
                self.expect(&Token::RightParen)?;
                Expr::Array {
                    items,
                    short: false,
                }
            }
            Token::List => {
                self.advance();
                self.expect(&Token::LeftParen)?;
                let items = self.parse_array_items(&Token::RightParen)?;
                self.expect(&Token::RightParen)?;
                Expr::List(items)
            }
            Token::LeftBracket => {
                self.advance();
                let items = self.parse_array_items(&Token::RightBracket)?;
                self.expect(&Token::RightBracket)?;
                Expr::Array { items, short: true }
            }
            Token::LeftParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&Token::RightParen)?;
                return Some(inner);
            }
            Token::Isset => {
                self.advance();
                self.expect(&Token::LeftParen)?;
                let vars = self.comma_list(true, &Token::RightParen, Self::parse_expr)?;
                self.expect(&Token::RightParen)?;
                Expr::Isset(vars)
            }
            Token::Empty => {
                self.advance();
                Expr::Empty(Box::new(self.parse_paren_expr()?))
            }
            Token::Exit | Token::Die => {
                self.advance();
                let mut expr = None;
                if self.eat(&Token::LeftParen) {
                    if !self.check(&Token::RightParen) {
                        expr = Some(Box::new(self.parse_expr()?));
                    }
                    self.expect(&Token::RightParen)?;
                }
                Expr::Exit {
                    die: tok == Token::Die,
                    expr,
                }
            }
            Token::Function => Expr::Closure(Box::new(self.parse_closure()?)),
            Token::Fn => Expr::ArrowFn(Box::new(self.parse_arrow_fn()?)),
            Token::Match => self.parse_match()?,
            Token::MagicClass
            | Token::MagicDir
            | Token::MagicFile
            | Token::MagicFunction
            | Token::MagicLine
            | Token::MagicMethod
            | Token::MagicNamespace
            | Token::MagicTrait => {
                self.advance();
                Expr::MagicConst(match tok {
                    Token::MagicClass => MagicConst::Class,
                    Token::MagicDir => MagicConst::Dir,
                    Token::MagicFile => MagicConst::File,
                    Token::MagicFunction => MagicConst::Function,
                    Token::MagicLine => MagicConst::Line,
                    Token::MagicMethod => MagicConst::Method,
                    Token::MagicNamespace => MagicConst::Namespace,
                    _ => MagicConst::Trait,
                })
            }
            _ => return self.unexpected(),
        };
        Some((expr, start..self.prev_end()))
    }

    /// Dereferences, calls and postfix increments following a primary.
    #[expect(
        clippy::too_many_lines,
        reason = "postfix chain handles every dereference form"
    )]
    fn parse_postfix(&mut self, mut lhs: Spanned<Expr>) -> Option<Spanned<Expr>> {
        let start = lhs.1.start;
        loop {
            let Some(tok) = self.peek_tok() else {
                break;
            };
            let expr = match tok {
                Token::LeftBracket => {
                    self.advance();
                    let dim = if self.check(&Token::RightBracket) {
                        None
                    } else {
                        Some(Box::new(self.parse_expr()?))
                    };
                    self.expect(&Token::RightBracket)?;
                    Expr::ArrayDimFetch {
                        var: Box::new(lhs),
                        dim,
                    }
                }
                Token::Arrow | Token::NullsafeArrow => {
                    self.advance();
                    let nullsafe = tok == Token::NullsafeArrow;
                    let name = self.parse_member_name()?;
                    if self.check(&Token::LeftParen) {
                        let args = self.parse_args()?;
                        Expr::MethodCall {
                            var: Box::new(lhs),
                            name,
                            args,
                            nullsafe,
                        }
                    } else {
                        Expr::PropertyFetch {
                            var: Box::new(lhs),
                            name,
                            nullsafe,
                        }
                    }
                }
                Token::ColonColon => {
                    self.advance();
                    let class = match lhs.0 {
                        Expr::ConstFetch(name) => NameOrExpr::Name(name),
                        _ => NameOrExpr::Expr(Box::new(lhs)),
                    };
                    match self.peek_tok() {
                        Some(Token::Variable(v)) => {
                            self.advance();
                            Expr::StaticPropertyFetch {
                                class,
                                name: v[1..].to_string(),
                            }
                        }
                        Some(Token::LeftBrace) => {
                            self.advance();
                            let name = self.parse_expr()?;
                            self.expect(&Token::RightBrace)?;
                            let args = self.parse_args()?;
                            Expr::StaticCall {
                                class,
                                name: MemberName::Expr(Box::new(name)),
                                args,
                            }
                        }
                        _ => {
                            let name = self.expect_member_ident()?;
                            if self.check(&Token::LeftParen) {
                                let args = self.parse_args()?;
                                Expr::StaticCall {
                                    class,
                                    name: MemberName::Ident(name),
                                    args,
                                }
                            } else {
                                Expr::ClassConstFetch { class, name }
                            }
                        }
                    }
                }
                Token::LeftParen => {
                    let args = self.parse_args()?;
                    let name = match lhs.0 {
                        Expr::ConstFetch(name) => NameOrExpr::Name(name),
                        _ => NameOrExpr::Expr(Box::new(lhs)),
                    };
                    Expr::FuncCall { name, args }
                }
                Token::PlusPlus | Token::MinusMinus if lhs.0.is_variable_like() => {
                    self.advance();
                    let op = if tok == Token::PlusPlus {
                        IncDecOp::PostInc
                    } else {
                        IncDecOp::PostDec
                    };
                    let end = self.prev_end();
                    return Some((
                        Expr::IncDec {
                            op,
                            var: Box::new(lhs),
                        },
                        start..end,
                    ));
                }
                _ => break,
            };
            lhs = (expr, start..self.prev_end());
        }
        Some(lhs)
    }

    fn parse_member_name(&mut self) -> Option<MemberName> {
        match self.peek_tok() {
            Some(Token::Variable(_) | Token::Dollar) => Some(MemberName::Expr(Box::new(
                self.parse_simple_variable()?,
            ))),
            Some(Token::LeftBrace) => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(&Token::RightBrace)?;
                Some(MemberName::Expr(Box::new(expr)))
            }
            _ => Some(MemberName::Ident(self.expect_member_ident()?)),
        }
    }

    fn parse_args(&mut self) -> Option<Vec<Arg>> {
        self.expect(&Token::LeftParen)?;
        let args = self.comma_list(true, &Token::RightParen, Self::parse_arg)?;
        self.expect(&Token::RightParen)?;
        Some(args)
    }

    fn parse_arg(&mut self) -> Option<Arg> {
        let unpack = self.eat(&Token::Ellipsis);
        let by_ref = !unpack && self.eat(&Token::Ampersand);
        let name = match (self.peek(), self.peek_nth(1)) {
            (Some(tok), Some(Token::Colon)) if !unpack && !by_ref => {
                let label = tok.as_member_name().map(str::to_string);
                if label.is_some() {
                    self.advance();
                    self.advance();
                }
                label
            }
            _ => None,
        };
        let value = self.parse_expr()?;
        Some(Arg {
            value,
            name,
            by_ref,
            unpack,
        })
    }

    /// Items of `[...]`, `array(...)` or `list(...)`. Empty slots are kept as
    /// `None` so destructuring holes survive; a single trailing comma is not
    /// a hole.
    fn parse_array_items(&mut self, end: &Token<'_>) -> Option<Vec<Option<ArrayItem>>> {
        let mut items = Vec::new();
        loop {
            if self.check(end) {
                break;
            }
            if self.check(&Token::Comma) {
                self.advance();
                items.push(None);
                continue;
            }
            items.push(Some(self.parse_array_item()?));
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Some(items)
    }

    fn parse_array_item(&mut self) -> Option<ArrayItem> {
        if self.eat(&Token::Ellipsis) {
            return Some(ArrayItem {
                key: None,
                value: self.parse_expr()?,
                by_ref: false,
                unpack: true,
            });
        }
        if self.eat(&Token::Ampersand) {
            return Some(ArrayItem {
                key: None,
                value: self.parse_expr()?,
                by_ref: true,
                unpack: false,
            });
        }
        let first = self.parse_expr()?;
        if self.eat(&Token::FatArrow) {
            let by_ref = self.eat(&Token::Ampersand);
            return Some(ArrayItem {
                key: Some(first),
                value: self.parse_expr()?,
                by_ref,
                unpack: false,
            });
        }
        Some(ArrayItem {
            key: None,
            value: first,
            by_ref: false,
            unpack: false,
        })
    }

    fn parse_closure(&mut self) -> Option<Closure> {
        self.expect(&Token::Function)?;
        let by_ref = self.eat(&Token::Ampersand);
        let params = self.parse_params()?;
        let mut uses = Vec::new();
        if self.eat(&Token::Use) {
            self.expect(&Token::LeftParen)?;
            uses = self.comma_list(true, &Token::RightParen, |p| {
                let by_ref = p.eat(&Token::Ampersand);
                let name = p.expect_variable()?;
                Some(ClosureUse { name, by_ref })
            })?;
            self.expect(&Token::RightParen)?;
        }
        let return_type = self.parse_return_type()?;
        let body = self.parse_block()?;
        Some(Closure {
            is_static: false,
            by_ref,
            params,
            uses,
            return_type,
            body,
        })
    }

    fn parse_arrow_fn(&mut self) -> Option<ArrowFn> {
        self.expect(&Token::Fn)?;
        let by_ref = self.eat(&Token::Ampersand);
        let params = self.parse_params()?;
        let return_type = self.parse_return_type()?;
        self.expect(&Token::FatArrow)?;
        let body = self.parse_expr_bp(0)?;
        Some(ArrowFn {
            is_static: false,
            by_ref,
            params,
            return_type,
            body: Box::new(body),
        })
    }

    fn parse_match(&mut self) -> Option<Expr> {
        self.expect(&Token::Match)?;
        let subject = self.parse_paren_expr()?;
        self.expect(&Token::LeftBrace)?;
        let arms = self.comma_list(true, &Token::RightBrace, |p| {
            let conds = if p.check(&Token::Default) && p.peek_nth(1) == Some(&Token::FatArrow) {
                p.advance();
                None
            } else {
                Some(p.comma_list(true, &Token::FatArrow, Self::parse_expr)?)
            };
            p.expect(&Token::FatArrow)?;
            let body = p.parse_expr()?;
            Some(MatchArm { conds, body })
        })?;
        self.expect(&Token::RightBrace)?;
        Some(Expr::Match {
            subject: Box::new(subject),
            arms,
        })
    }
}

fn lex_error(err: LexError, source: &str, span: Span) -> ParseError {
    let (kind, message) = match err {
        LexError::UnterminatedComment => (
            ParseErrorKind::UnterminatedComment,
            "Unterminated comment".to_string(),
        ),
        LexError::UnterminatedHeredoc => (
            ParseErrorKind::UnexpectedEof,
            "Syntax error, unexpected EOF".to_string(),
        ),
        LexError::UnexpectedCharacter => {
            let byte = source.as_bytes().get(span.start).copied().unwrap_or_default();
            (
                ParseErrorKind::Unexpected,
                format!("Syntax error, unexpected character 0x{byte:02X}"),
            )
        }
    };
    ParseError {
        kind,
        message,
        span,
        hint: None,
    }
}

// ── Operator tables ──

/// `Some(None)` for plain `=`, `Some(Some(op))` for compound assignment.
fn assign_op(tok: &Token<'_>) -> Option<Option<BinaryOp>> {
    let op = match tok {
        Token::Equal => return Some(None),
        Token::PlusEqual => BinaryOp::Add,
        Token::MinusEqual => BinaryOp::Subtract,
        Token::StarEqual => BinaryOp::Multiply,
        Token::SlashEqual => BinaryOp::Divide,
        Token::PercentEqual => BinaryOp::Modulo,
        Token::StarStarEqual => BinaryOp::Pow,
        Token::DotEqual => BinaryOp::Concat,
        Token::AmpEqual => BinaryOp::BitAnd,
        Token::PipeEqual => BinaryOp::BitOr,
        Token::CaretEqual => BinaryOp::BitXor,
        Token::LessLessEqual => BinaryOp::Shl,
        Token::GreaterGreaterEqual => BinaryOp::Shr,
        Token::QuestionQuestionEqual => BinaryOp::Coalesce,
        _ => return None,
    };
    Some(Some(op))
}

fn token_to_binop(token: &Token<'_>) -> Option<BinaryOp> {
    match token {
        Token::Plus => Some(BinaryOp::Add),
        Token::Minus => Some(BinaryOp::Subtract),
        Token::Star => Some(BinaryOp::Multiply),
        Token::Slash => Some(BinaryOp::Divide),
        Token::Percent => Some(BinaryOp::Modulo),
        Token::StarStar => Some(BinaryOp::Pow),
        Token::Dot => Some(BinaryOp::Concat),
        Token::Ampersand => Some(BinaryOp::BitAnd),
        Token::Pipe => Some(BinaryOp::BitOr),
        Token::Caret => Some(BinaryOp::BitXor),
        Token::LessLess => Some(BinaryOp::Shl),
        Token::GreaterGreater => Some(BinaryOp::Shr),
        Token::AmpAmp => Some(BinaryOp::BoolAnd),
        Token::PipePipe => Some(BinaryOp::BoolOr),
        Token::LogicalAnd => Some(BinaryOp::LogicalAnd),
        Token::LogicalOr => Some(BinaryOp::LogicalOr),
        Token::LogicalXor => Some(BinaryOp::LogicalXor),
        Token::EqualEqual => Some(BinaryOp::Equal),
        Token::NotEqual => Some(BinaryOp::NotEqual),
        Token::Identical => Some(BinaryOp::Identical),
        Token::NotIdentical => Some(BinaryOp::NotIdentical),
        Token::Less => Some(BinaryOp::Less),
        Token::LessEqual => Some(BinaryOp::LessEqual),
        Token::Greater => Some(BinaryOp::Greater),
        Token::GreaterEqual => Some(BinaryOp::GreaterEqual),
        Token::Spaceship => Some(BinaryOp::Spaceship),
        Token::QuestionQuestion => Some(BinaryOp::Coalesce),
        _ => None,
    }
}

fn cast_kind(text: &str) -> CastKind {
    let inner = text
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim()
        .to_ascii_lowercase();
    match inner.as_str() {
        "int" | "integer" => CastKind::Int,
        "bool" | "boolean" => CastKind::Bool,
        "float" | "double" | "real" => CastKind::Float,
        "array" => CastKind::Array,
        "object" => CastKind::Object,
        "unset" => CastKind::Unset,
        _ => CastKind::String,
    }
}

// ── Public API ──

/// Parse PHP source into an AST. Parsing stops at the first error.
#[must_use]
pub fn parse(source: &str) -> ParseResult {
    let mut parser = Parser::new(source);
    let program = parser.parse_program();
    ParseResult {
        program,
        errors: parser.errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmts(source: &str) -> Vec<Stmt> {
        let result = parse(source);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        result.program.stmts.into_iter().map(|(s, _)| s).collect()
    }

    fn first_error(source: &str) -> ParseError {
        parse(source)
            .errors
            .into_iter()
            .next()
            .expect("expected a parse error")
    }

    fn expr(source: &str) -> Expr {
        match stmts(&format!("<?php {source};")).remove(0) {
            Stmt::Expression((e, _)) => e,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn open_tag_is_optional() {
        assert!(matches!(stmts("<?php echo 1;")[0], Stmt::Echo(_)));
        assert!(matches!(stmts("echo 1;")[0], Stmt::Echo(_)));
    }

    #[test]
    fn close_tag_ends_statement() {
        assert_eq!(stmts("<?php foo() ?>").len(), 1);
    }

    #[test]
    fn assignment_is_right_associative() {
        let Expr::Assign { value, .. } = expr("$a = $b = 1") else {
            panic!("expected assignment");
        };
        assert!(matches!(value.0, Expr::Assign { .. }));
    }

    #[test]
    fn assignment_binds_to_nearest_variable() {
        let Expr::Binary { op, right, .. } = expr("$a + $b = 1") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(right.0, Expr::Assign { .. }));
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let Expr::Binary { op, right, .. } = expr("1 + 2 * 3") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(
            right.0,
            Expr::Binary {
                op: BinaryOp::Multiply,
                ..
            }
        ));
    }

    #[test]
    fn pow_is_right_associative_and_beats_negation() {
        let Expr::Unary { op, expr: inner } = expr("-2 ** 3 ** 2") else {
            panic!("expected unary");
        };
        assert_eq!(op, UnaryOp::Negate);
        let Expr::Binary { right, .. } = inner.0 else {
            panic!("expected pow");
        };
        assert!(matches!(right.0, Expr::Binary { op: BinaryOp::Pow, .. }));
    }

    #[test]
    fn logical_keywords_are_looser_than_assignment() {
        let Expr::Binary { op, left, .. } = expr("$a = true and false") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::LogicalAnd);
        assert!(matches!(left.0, Expr::Assign { .. }));
    }

    #[test]
    fn not_applies_to_instanceof() {
        let Expr::Unary { op, expr: inner } = expr("!$a instanceof Foo") else {
            panic!("expected unary");
        };
        assert_eq!(op, UnaryOp::Not);
        assert!(matches!(inner.0, Expr::Instanceof { .. }));
    }

    #[test]
    fn static_calls_and_constants() {
        assert!(matches!(expr("Foo::bar()"), Expr::StaticCall { .. }));
        assert!(matches!(expr("Foo::BAR"), Expr::ClassConstFetch { .. }));
        assert!(matches!(expr("Foo::$bar"), Expr::StaticPropertyFetch { .. }));
        assert!(matches!(
            expr("Foo::class"),
            Expr::ClassConstFetch { ref name, .. } if name == "class"
        ));
        assert!(matches!(expr("static::create()"), Expr::StaticCall { .. }));
    }

    #[test]
    fn method_chain() {
        let Expr::MethodCall { var, .. } = expr("$a->b()->c()") else {
            panic!("expected method call");
        };
        assert!(matches!(var.0, Expr::MethodCall { .. }));
    }

    #[test]
    fn exit_forms() {
        assert!(matches!(expr("exit"), Expr::Exit { die: false, expr: None }));
        assert!(matches!(expr("die()"), Expr::Exit { die: true, expr: None }));
        assert!(matches!(expr("exit(1)"), Expr::Exit { expr: Some(_), .. }));
    }

    #[test]
    fn array_holes_and_trailing_comma() {
        let Expr::Array { items, .. } = expr("[, $b, ]") else {
            panic!("expected array");
        };
        assert_eq!(items.len(), 2);
        assert!(items[0].is_none());
    }

    #[test]
    fn list_destructuring() {
        let Expr::Assign { var, .. } = expr("list($a, $b) = $c") else {
            panic!("expected assignment");
        };
        assert!(matches!(var.0, Expr::List(_)));
    }

    #[test]
    fn call_time_reference_argument_is_parsed() {
        let Expr::FuncCall { args, .. } = expr("foo(&$x)") else {
            panic!("expected call");
        };
        assert!(args[0].by_ref);
    }

    #[test]
    fn named_arguments() {
        let Expr::FuncCall { args, .. } = expr("foo(bar: 1)") else {
            panic!("expected call");
        };
        assert_eq!(args[0].name.as_deref(), Some("bar"));
    }

    #[test]
    fn semicolon_namespace_owns_following_statements() {
        let parsed = stmts("namespace Foo; echo 1; namespace Bar; echo 2;");
        assert_eq!(parsed.len(), 2);
        let Stmt::Namespace(ns) = &parsed[0] else {
            panic!("expected namespace");
        };
        assert!(!ns.braced);
        assert_eq!(ns.stmts.len(), 1);
    }

    #[test]
    fn group_use() {
        let parsed = stmts(r"use Foo\{Bar, function baz, Qux as Q};");
        let Stmt::Use(decl) = &parsed[0] else {
            panic!("expected use");
        };
        assert_eq!(decl.prefix.as_ref().map(Name::joined).as_deref(), Some("Foo"));
        assert_eq!(decl.items.len(), 3);
        assert_eq!(decl.items[1].kind, Some(UseKind::Function));
        assert_eq!(decl.items[2].alias_name(), "Q");
    }

    #[test]
    fn function_and_closure_statements() {
        assert!(matches!(stmts("function foo() {}")[0], Stmt::Function(_)));
        assert!(matches!(
            stmts("function () {};")[0],
            Stmt::Expression((Expr::Closure(_), _))
        ));
    }

    #[test]
    fn class_with_members() {
        let parsed = stmts(
            "abstract class A extends B implements C, D {
                const X = 1;
                public static ?int $count = 0;
                abstract protected function f(): void;
                public function __construct(private int $x) {}
            }",
        );
        let Stmt::Class(class) = &parsed[0] else {
            panic!("expected class");
        };
        assert!(class.is_abstract);
        assert_eq!(class.implements.len(), 2);
        assert_eq!(class.members.len(), 4);
        assert_eq!(class.methods().count(), 2);
    }

    #[test]
    fn label_and_goto() {
        let parsed = stmts("goto end; end:");
        assert_eq!(parsed, vec![Stmt::Goto("end".into()), Stmt::Label("end".into())]);
    }

    #[test]
    fn missing_semicolon_at_eof() {
        let err = first_error("<?php 4\n");
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEof);
        assert_eq!(err.message, "Syntax error, unexpected EOF");
    }

    #[test]
    fn unclosed_single_quoted_string() {
        let err = first_error("<?php echo 'abc\n");
        assert_eq!(err.kind, ParseErrorKind::UnclosedString);
        assert_eq!(
            err.message,
            "Syntax error, unexpected T_ENCAPSED_AND_WHITESPACE"
        );
    }

    #[test]
    fn unterminated_comment_is_reported_first() {
        let err = first_error("<?php ) /* foo\n");
        assert_eq!(err.kind, ParseErrorKind::UnterminatedComment);
    }

    #[test]
    fn trailing_comma_in_echo() {
        let err = first_error("<?php echo 1, 2,\n");
        assert_eq!(err.kind, ParseErrorKind::TrailingComma);
        assert_eq!(err.message, "A trailing comma is not allowed here");
    }

    #[test]
    fn trailing_comma_allowed_in_calls() {
        assert!(parse("<?php foo(1, 2,);").errors.is_empty());
    }

    #[test]
    fn unexpected_token_message() {
        let err = first_error("<?php $a = ;");
        assert_eq!(err.kind, ParseErrorKind::Unexpected);
        assert_eq!(err.message, "Syntax error, unexpected token \";\"");
    }

    #[test]
    fn alternative_syntax_is_rejected() {
        let err = first_error("<?php if ($a): endif;");
        assert!(err.hint.is_some());
    }

    #[test]
    fn deep_nesting_is_bounded() {
        // Debug builds need more than the default test thread stack.
        let handle = std::thread::Builder::new()
            .stack_size(64 * 1024 * 1024)
            .spawn(|| {
                let source = format!("<?php {}1{};", "(".repeat(600), ")".repeat(600));
                first_error(&source).message
            })
            .unwrap();
        assert_eq!(handle.join().unwrap(), "Maximum nesting depth exceeded");
    }
}
