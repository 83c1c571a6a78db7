//! PHP lexer using logos derive macros.
//!
//! Tokenizes PHP source code into a stream of [`Token`] values with byte-offset
//! [`Span`] information. Built on the [`logos`] crate for compile-time DFA
//! generation. Keywords are matched case-insensitively, like PHP does.

use logos::Logos;

/// Byte-offset span within source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

/// Errors the tokenizer can report on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LexError {
    /// A byte sequence that starts no token.
    #[default]
    UnexpectedCharacter,
    /// `/*` without a matching `*/`.
    UnterminatedComment,
    /// A heredoc or nowdoc whose closing marker never appears.
    UnterminatedHeredoc,
}

/// Whether `c` may start a PHP name. Any non-ASCII character qualifies, as
/// PHP accepts every byte from 0x80 up.
#[must_use]
pub fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Whether `c` may continue a PHP name.
#[must_use]
pub fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit()
}

/// Lex `source` into a vector of (token, span) pairs, skipping whitespace and
/// comments. Invalid bytes produce [`Token::Error`].
#[must_use]
pub fn lex(source: &str) -> Vec<(Token<'_>, Span)> {
    Lexer::new(source).collect()
}

/// Wrapper around the logos lexer iterator with span tracking.
pub struct Lexer<'src> {
    inner: logos::SpannedIter<'src, Token<'src>>,
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer").finish_non_exhaustive()
    }
}

impl<'src> Lexer<'src> {
    /// Create a new lexer over `source`.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: Token::lexer(source).spanned(),
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = (Token<'src>, Span);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(result, span)| {
            let tok = result.unwrap_or_else(Token::Error);
            (
                tok,
                Span {
                    start: span.start,
                    end: span.end,
                },
            )
        })
    }
}

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

fn line_comment<'s>(_lex: &mut logos::Lexer<'s, Token<'s>>) -> logos::Skip {
    logos::Skip
}

/// PHP block comments do not nest: the first `*/` closes the comment.
fn block_comment<'s>(lex: &mut logos::Lexer<'s, Token<'s>>) -> logos::FilterResult<(), LexError> {
    let rest = lex.remainder();
    if let Some(end) = rest.find("*/") {
        lex.bump(end + 2);
        return logos::FilterResult::Skip;
    }
    // Unterminated: bump rest so we don't loop forever.
    lex.bump(rest.len());
    logos::FilterResult::Error(LexError::UnterminatedComment)
}

/// Scan a heredoc/nowdoc body up to and including its closing label. The
/// closing label may be indented and must not be followed by a name character.
fn heredoc<'s>(lex: &mut logos::Lexer<'s, Token<'s>>) -> Result<&'s str, LexError> {
    let opener = lex.slice();
    let label = opener[3..]
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    let rest = lex.remainder();
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_start_matches([' ', '\t']);
        if let Some(after) = trimmed.strip_prefix(label.as_str()) {
            let continues_name = after
                .chars()
                .next()
                .is_some_and(is_name_char);
            if !continues_name {
                let indent = line.len() - trimmed.len();
                lex.bump(offset + indent + label.len());
                return Ok(lex.slice());
            }
        }
        offset += line.len();
    }
    lex.bump(rest.len());
    Err(LexError::UnterminatedHeredoc)
}

// ---------------------------------------------------------------------------
// Token enum
// ---------------------------------------------------------------------------

/// A single token produced by the PHP lexer.
#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash)]
#[logos(error = LexError)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token<'src> {
    // ── Keywords ──────────────────────────────────────────────────────
    #[token("abstract", ignore(case))]
    Abstract,
    #[token("and", ignore(case))]
    LogicalAnd,
    #[token("array", ignore(case))]
    Array,
    #[token("as", ignore(case))]
    As,
    #[token("break", ignore(case))]
    Break,
    #[token("case", ignore(case))]
    Case,
    #[token("catch", ignore(case))]
    Catch,
    #[token("class", ignore(case))]
    Class,
    #[token("clone", ignore(case))]
    Clone,
    #[token("const", ignore(case))]
    Const,
    #[token("continue", ignore(case))]
    Continue,
    #[token("declare", ignore(case))]
    Declare,
    #[token("default", ignore(case))]
    Default,
    #[token("die", ignore(case))]
    Die,
    #[token("do", ignore(case))]
    Do,
    #[token("echo", ignore(case))]
    Echo,
    #[token("else", ignore(case))]
    Else,
    #[token("elseif", ignore(case))]
    ElseIf,
    #[token("empty", ignore(case))]
    Empty,
    #[token("exit", ignore(case))]
    Exit,
    #[token("extends", ignore(case))]
    Extends,
    #[token("final", ignore(case))]
    Final,
    #[token("finally", ignore(case))]
    Finally,
    #[token("fn", ignore(case))]
    Fn,
    #[token("for", ignore(case))]
    For,
    #[token("foreach", ignore(case))]
    Foreach,
    #[token("function", ignore(case))]
    Function,
    #[token("global", ignore(case))]
    Global,
    #[token("goto", ignore(case))]
    Goto,
    #[token("if", ignore(case))]
    If,
    #[token("implements", ignore(case))]
    Implements,
    #[token("include", ignore(case))]
    Include,
    #[token("include_once", ignore(case))]
    IncludeOnce,
    #[token("instanceof", ignore(case))]
    Instanceof,
    #[token("interface", ignore(case))]
    Interface,
    #[token("isset", ignore(case))]
    Isset,
    #[token("list", ignore(case))]
    List,
    #[token("match", ignore(case))]
    Match,
    #[token("namespace", ignore(case))]
    Namespace,
    #[token("new", ignore(case))]
    New,
    #[token("or", ignore(case))]
    LogicalOr,
    #[token("print", ignore(case))]
    Print,
    #[token("private", ignore(case))]
    Private,
    #[token("protected", ignore(case))]
    Protected,
    #[token("public", ignore(case))]
    Public,
    #[token("readonly", ignore(case))]
    Readonly,
    #[token("require", ignore(case))]
    Require,
    #[token("require_once", ignore(case))]
    RequireOnce,
    #[token("return", ignore(case))]
    Return,
    #[token("static", ignore(case))]
    Static,
    #[token("switch", ignore(case))]
    Switch,
    #[token("throw", ignore(case))]
    Throw,
    #[token("trait", ignore(case))]
    Trait,
    #[token("try", ignore(case))]
    Try,
    #[token("unset", ignore(case))]
    Unset,
    #[token("use", ignore(case))]
    Use,
    #[token("var", ignore(case))]
    Var,
    #[token("while", ignore(case))]
    While,
    #[token("xor", ignore(case))]
    LogicalXor,
    #[token("yield", ignore(case))]
    Yield,

    // ── Magic constants ───────────────────────────────────────────────
    #[token("__CLASS__", ignore(case))]
    MagicClass,
    #[token("__DIR__", ignore(case))]
    MagicDir,
    #[token("__FILE__", ignore(case))]
    MagicFile,
    #[token("__FUNCTION__", ignore(case))]
    MagicFunction,
    #[token("__LINE__", ignore(case))]
    MagicLine,
    #[token("__METHOD__", ignore(case))]
    MagicMethod,
    #[token("__NAMESPACE__", ignore(case))]
    MagicNamespace,
    #[token("__TRAIT__", ignore(case))]
    MagicTrait,

    // ── Tags ──────────────────────────────────────────────────────────
    #[token("<?php", ignore(case))]
    OpenTag,
    #[token("?>")]
    CloseTag,

    // ── Operators ─────────────────────────────────────────────────────
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("**")]
    StarStar,
    #[token(".")]
    Dot,
    #[token("=")]
    Equal,
    #[token("+=")]
    PlusEqual,
    #[token("-=")]
    MinusEqual,
    #[token("*=")]
    StarEqual,
    #[token("/=")]
    SlashEqual,
    #[token("%=")]
    PercentEqual,
    #[token("**=")]
    StarStarEqual,
    #[token(".=")]
    DotEqual,
    #[token("&=")]
    AmpEqual,
    #[token("|=")]
    PipeEqual,
    #[token("^=")]
    CaretEqual,
    #[token("<<=")]
    LessLessEqual,
    #[token(">>=")]
    GreaterGreaterEqual,
    #[token("??=")]
    QuestionQuestionEqual,
    #[token("==")]
    EqualEqual,
    #[token("===")]
    Identical,
    #[token("!=")]
    #[token("<>")]
    NotEqual,
    #[token("!==")]
    NotIdentical,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("<=>")]
    Spaceship,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("!")]
    Bang,
    #[token("&")]
    Ampersand,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("<<")]
    LessLess,
    #[token(">>")]
    GreaterGreater,
    #[token("??")]
    QuestionQuestion,
    #[token("?")]
    Question,
    #[token("::")]
    ColonColon,
    #[token("->")]
    Arrow,
    #[token("?->")]
    NullsafeArrow,
    #[token("=>")]
    FatArrow,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("@")]
    At,
    #[token("...")]
    Ellipsis,
    #[token("\\")]
    Backslash,
    #[token("$")]
    Dollar,

    // ── Delimiters ────────────────────────────────────────────────────
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    /// Start of an attribute group, `#[`.
    #[token("#[")]
    AttributeStart,

    // ── Literals ──────────────────────────────────────────────────────
    /// Variable, e.g. `$foo`. The slice keeps the `$`.
    #[regex(r"\$[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*")]
    Variable(&'src str),

    /// Type cast, e.g. `(int)` or `( string )`.
    #[regex(
        r"\([ \t]*(int|integer|bool|boolean|float|double|real|string|binary|array|object|unset)[ \t]*\)",
        ignore(case)
    )]
    Cast(&'src str),

    /// Floating-point literal with optional exponent.
    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9]+)?", priority = 4)]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?", priority = 4)]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+", priority = 4)]
    Float(&'src str),

    /// Integer literal (decimal, hex, octal, or binary with optional `_` separators).
    #[regex(r"0[xX][0-9a-fA-F][0-9a-fA-F_]*", priority = 4)]
    #[regex(r"0[oO][0-7][0-7_]*", priority = 4)]
    #[regex(r"0[bB][01][01_]*", priority = 4)]
    #[regex(r"[0-9][0-9_]*", priority = 3)]
    Integer(&'src str),

    /// Single- or double-quoted string, quotes included, escapes untouched.
    #[regex(r"'([^'\\]|\\.)*'")]
    #[regex(r#""([^"\\]|\\.)*""#)]
    StringLit(&'src str),

    /// Backtick shell command, backticks included. Interpolates like `"`.
    #[regex(r"`([^`\\]|\\.)*`")]
    ShellExec(&'src str),

    /// A quoted string that runs to end of input without its closing quote.
    #[regex(r"'([^'\\]|\\.)*", allow_greedy = true)]
    #[regex(r#""([^"\\]|\\.)*"#, allow_greedy = true)]
    #[regex(r"`([^`\\]|\\.)*", allow_greedy = true)]
    UnterminatedString(&'src str),

    /// Heredoc or nowdoc, from `<<<` through the closing label.
    #[regex(
        r#"<<<[ \t]*([a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*|"[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*"|'[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*')\r?\n"#,
        heredoc
    )]
    Heredoc(&'src str),

    /// Identifier. Keywords have higher priority via `#[token]`.
    #[regex(r"[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*")]
    Identifier(&'src str),

    /// Qualified name, e.g. `Foo\Bar`, or relative `namespace\Foo`.
    #[regex(r"[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*(\\[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*)+")]
    QualifiedName(&'src str),

    /// Fully qualified name, e.g. `\Foo\Bar`.
    #[regex(r"\\[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*(\\[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*)*")]
    FullyQualifiedName(&'src str),

    // ── Comments ──────────────────────────────────────────────────────
    #[regex(r"/\*", block_comment)]
    _BlockComment,

    #[regex(r"//[^\n]*", line_comment, allow_greedy = true)]
    #[regex(r"#([^\[\n][^\n]*)?", line_comment, allow_greedy = true)]
    _LineComment,

    /// Invalid or unterminated input.
    Error(LexError),
}

impl std::fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Variable(s) => write!(f, "variable \"{s}\""),
            Token::Identifier(s) => write!(f, "identifier \"{s}\""),
            Token::QualifiedName(s) => write!(f, "fully qualified name \"{s}\""),
            Token::FullyQualifiedName(s) => write!(f, "fully qualified name \"{s}\""),
            Token::Integer(s) => write!(f, "integer \"{s}\""),
            Token::Float(s) => write!(f, "floating-point number \"{s}\""),
            Token::StringLit(s) if s.starts_with('"') => {
                write!(f, "double-quoted string {s}")
            }
            Token::StringLit(s) => write!(f, "single-quoted string \"{}\"", &s[1..s.len() - 1]),
            Token::UnterminatedString(_) => f.write_str("T_ENCAPSED_AND_WHITESPACE"),
            Token::Heredoc(_) => f.write_str("heredoc"),
            Token::ShellExec(_) => f.write_str("token \"`\""),
            Token::Cast(s) => write!(f, "token \"{s}\""),
            Token::Error(_) => f.write_str("character"),
            Token::_BlockComment | Token::_LineComment => f.write_str("comment"),
            tok => write!(f, "token \"{}\"", tok.text()),
        }
    }
}

impl Token<'_> {
    /// If this token is a keyword, return its canonical lowercase spelling.
    #[must_use]
    pub fn keyword_str(&self) -> Option<&'static str> {
        match self {
            Token::Abstract => Some("abstract"),
            Token::LogicalAnd => Some("and"),
            Token::Array => Some("array"),
            Token::As => Some("as"),
            Token::Break => Some("break"),
            Token::Case => Some("case"),
            Token::Catch => Some("catch"),
            Token::Class => Some("class"),
            Token::Clone => Some("clone"),
            Token::Const => Some("const"),
            Token::Continue => Some("continue"),
            Token::Declare => Some("declare"),
            Token::Default => Some("default"),
            Token::Die => Some("die"),
            Token::Do => Some("do"),
            Token::Echo => Some("echo"),
            Token::Else => Some("else"),
            Token::ElseIf => Some("elseif"),
            Token::Empty => Some("empty"),
            Token::Exit => Some("exit"),
            Token::Extends => Some("extends"),
            Token::Final => Some("final"),
            Token::Finally => Some("finally"),
            Token::Fn => Some("fn"),
            Token::For => Some("for"),
            Token::Foreach => Some("foreach"),
            Token::Function => Some("function"),
            Token::Global => Some("global"),
            Token::Goto => Some("goto"),
            Token::If => Some("if"),
            Token::Implements => Some("implements"),
            Token::Include => Some("include"),
            Token::IncludeOnce => Some("include_once"),
            Token::Instanceof => Some("instanceof"),
            Token::Interface => Some("interface"),
            Token::Isset => Some("isset"),
            Token::List => Some("list"),
            Token::Match => Some("match"),
            Token::Namespace => Some("namespace"),
            Token::New => Some("new"),
            Token::LogicalOr => Some("or"),
            Token::Print => Some("print"),
            Token::Private => Some("private"),
            Token::Protected => Some("protected"),
            Token::Public => Some("public"),
            Token::Readonly => Some("readonly"),
            Token::Require => Some("require"),
            Token::RequireOnce => Some("require_once"),
            Token::Return => Some("return"),
            Token::Static => Some("static"),
            Token::Switch => Some("switch"),
            Token::Throw => Some("throw"),
            Token::Trait => Some("trait"),
            Token::Try => Some("try"),
            Token::Unset => Some("unset"),
            Token::Use => Some("use"),
            Token::Var => Some("var"),
            Token::While => Some("while"),
            Token::LogicalXor => Some("xor"),
            Token::Yield => Some("yield"),
            Token::MagicClass => Some("__CLASS__"),
            Token::MagicDir => Some("__DIR__"),
            Token::MagicFile => Some("__FILE__"),
            Token::MagicFunction => Some("__FUNCTION__"),
            Token::MagicLine => Some("__LINE__"),
            Token::MagicMethod => Some("__METHOD__"),
            Token::MagicNamespace => Some("__NAMESPACE__"),
            Token::MagicTrait => Some("__TRAIT__"),
            _ => None,
        }
    }

    /// Returns `true` if this token is a reserved word.
    #[must_use]
    pub fn is_keyword(&self) -> bool {
        self.keyword_str().is_some()
    }

    /// The identifier spelling of this token when it appears where PHP
    /// accepts any word, such as after `->` or `::`, or as a method name.
    #[must_use]
    pub fn as_member_name(&self) -> Option<&str> {
        match self {
            Token::Identifier(s) => Some(s),
            tok => tok.keyword_str(),
        }
    }

    /// Source text of fixed-spelling tokens; literal tokens return their slice.
    #[must_use]
    pub fn text(&self) -> &str {
        if let Some(kw) = self.keyword_str() {
            return kw;
        }
        match self {
            Token::Variable(s)
            | Token::Cast(s)
            | Token::Float(s)
            | Token::Integer(s)
            | Token::StringLit(s)
            | Token::UnterminatedString(s)
            | Token::ShellExec(s)
            | Token::Heredoc(s)
            | Token::Identifier(s)
            | Token::QualifiedName(s)
            | Token::FullyQualifiedName(s) => s,
            Token::OpenTag => "<?php",
            Token::CloseTag => "?>",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::StarStar => "**",
            Token::Dot => ".",
            Token::Equal => "=",
            Token::PlusEqual => "+=",
            Token::MinusEqual => "-=",
            Token::StarEqual => "*=",
            Token::SlashEqual => "/=",
            Token::PercentEqual => "%=",
            Token::StarStarEqual => "**=",
            Token::DotEqual => ".=",
            Token::AmpEqual => "&=",
            Token::PipeEqual => "|=",
            Token::CaretEqual => "^=",
            Token::LessLessEqual => "<<=",
            Token::GreaterGreaterEqual => ">>=",
            Token::QuestionQuestionEqual => "??=",
            Token::EqualEqual => "==",
            Token::Identical => "===",
            Token::NotEqual => "!=",
            Token::NotIdentical => "!==",
            Token::Less => "<",
            Token::Greater => ">",
            Token::LessEqual => "<=",
            Token::GreaterEqual => ">=",
            Token::Spaceship => "<=>",
            Token::AmpAmp => "&&",
            Token::PipePipe => "||",
            Token::Bang => "!",
            Token::Ampersand => "&",
            Token::Pipe => "|",
            Token::Caret => "^",
            Token::Tilde => "~",
            Token::LessLess => "<<",
            Token::GreaterGreater => ">>",
            Token::QuestionQuestion => "??",
            Token::Question => "?",
            Token::ColonColon => "::",
            Token::Arrow => "->",
            Token::NullsafeArrow => "?->",
            Token::FatArrow => "=>",
            Token::PlusPlus => "++",
            Token::MinusMinus => "--",
            Token::At => "@",
            Token::Ellipsis => "...",
            Token::Backslash => "\\",
            Token::Dollar => "$",
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::LeftBrace => "{",
            Token::RightBrace => "}",
            Token::LeftBracket => "[",
            Token::RightBracket => "]",
            Token::Semicolon => ";",
            Token::Comma => ",",
            Token::Colon => ":",
            Token::AttributeStart => "#[",
            _ => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: collect just the token variants from a source string.
    fn tokens(src: &str) -> Vec<Token<'_>> {
        lex(src).into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(
            tokens("function FUNCTION Function echo ECHO"),
            vec![
                Token::Function,
                Token::Function,
                Token::Function,
                Token::Echo,
                Token::Echo,
            ]
        );
    }

    #[test]
    fn identifiers_vs_keywords() {
        assert_eq!(
            tokens("foo functional if_ true"),
            vec![
                Token::Identifier("foo"),
                Token::Identifier("functional"),
                Token::Identifier("if_"),
                Token::Identifier("true"),
            ]
        );
    }

    #[test]
    fn names() {
        assert_eq!(
            tokens(r"Foo\Bar \Foo\Bar namespace\Baz \strlen"),
            vec![
                Token::QualifiedName(r"Foo\Bar"),
                Token::FullyQualifiedName(r"\Foo\Bar"),
                Token::QualifiedName(r"namespace\Baz"),
                Token::FullyQualifiedName(r"\strlen"),
            ]
        );
    }

    #[test]
    fn group_use_prefix_splits_on_backslash() {
        assert_eq!(
            tokens(r"use Foo\{Bar}"),
            vec![
                Token::Use,
                Token::Identifier("Foo"),
                Token::Backslash,
                Token::LeftBrace,
                Token::Identifier("Bar"),
                Token::RightBrace,
            ]
        );
    }

    #[test]
    fn variables() {
        assert_eq!(
            tokens("$foo $this $$x"),
            vec![
                Token::Variable("$foo"),
                Token::Variable("$this"),
                Token::Dollar,
                Token::Variable("$x"),
            ]
        );
    }

    #[test]
    fn operators_multi_char() {
        assert_eq!(
            tokens("=== !== <=> ?-> ??= ** **= <> ... ::"),
            vec![
                Token::Identical,
                Token::NotIdentical,
                Token::Spaceship,
                Token::NullsafeArrow,
                Token::QuestionQuestionEqual,
                Token::StarStar,
                Token::StarStarEqual,
                Token::NotEqual,
                Token::Ellipsis,
                Token::ColonColon,
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            tokens("42 0x1F 0b101 0o17 1_000 1.5 .5 1e10 2.5e-3"),
            vec![
                Token::Integer("42"),
                Token::Integer("0x1F"),
                Token::Integer("0b101"),
                Token::Integer("0o17"),
                Token::Integer("1_000"),
                Token::Float("1.5"),
                Token::Float(".5"),
                Token::Float("1e10"),
                Token::Float("2.5e-3"),
            ]
        );
    }

    #[test]
    fn strings() {
        assert_eq!(
            tokens(r#"'it\'s' "a \"b\" $c""#),
            vec![
                Token::StringLit(r"'it\'s'"),
                Token::StringLit(r#""a \"b\" $c""#),
            ]
        );
    }

    #[test]
    fn unterminated_strings_run_to_end() {
        assert_eq!(
            tokens("echo 'abc; foo()"),
            vec![Token::Echo, Token::UnterminatedString("'abc; foo()")]
        );
        assert_eq!(
            tokens("'a' . 'b"),
            vec![
                Token::StringLit("'a'"),
                Token::Dot,
                Token::UnterminatedString("'b"),
            ]
        );
    }

    #[test]
    fn shell_commands() {
        assert_eq!(
            tokens(r"$out = `ls -l $dir \` x`;"),
            vec![
                Token::Variable("$out"),
                Token::Equal,
                Token::ShellExec(r"`ls -l $dir \` x`"),
                Token::Semicolon,
            ]
        );
        assert_eq!(tokens("`whoami"), vec![Token::UnterminatedString("`whoami")]);
    }

    #[test]
    fn non_ascii_names() {
        assert_eq!(
            tokens(r"$café = new Größe\Ünit; \Größe\f();"),
            vec![
                Token::Variable("$café"),
                Token::Equal,
                Token::New,
                Token::QualifiedName(r"Größe\Ünit"),
                Token::Semicolon,
                Token::FullyQualifiedName(r"\Größe\f"),
                Token::LeftParen,
                Token::RightParen,
                Token::Semicolon,
            ]
        );
        assert_eq!(tokens("日本"), vec![Token::Identifier("日本")]);
        assert!(is_name_start('é') && !is_name_start('1') && is_name_char('1'));
    }

    #[test]
    fn casts() {
        assert_eq!(
            tokens("(int) $a ( STRING )$b (foo)"),
            vec![
                Token::Cast("(int)"),
                Token::Variable("$a"),
                Token::Cast("( STRING )"),
                Token::Variable("$b"),
                Token::LeftParen,
                Token::Identifier("foo"),
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn heredoc_and_nowdoc() {
        let src = "$a = <<<EOT\nhello $name\n  EOT;\n$b = <<<'RAW'\nx\nRAW;";
        assert_eq!(
            tokens(src),
            vec![
                Token::Variable("$a"),
                Token::Equal,
                Token::Heredoc("<<<EOT\nhello $name\n  EOT"),
                Token::Semicolon,
                Token::Variable("$b"),
                Token::Equal,
                Token::Heredoc("<<<'RAW'\nx\nRAW"),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn unterminated_heredoc_is_an_error() {
        assert_eq!(
            tokens("<<<EOT\nhello\n"),
            vec![Token::Error(LexError::UnterminatedHeredoc)]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            tokens("a // line\nb # hash\nc /* block */ d"),
            vec![
                Token::Identifier("a"),
                Token::Identifier("b"),
                Token::Identifier("c"),
                Token::Identifier("d"),
            ]
        );
    }

    #[test]
    fn block_comments_do_not_nest() {
        assert_eq!(
            tokens("x /* a /* b */ y"),
            vec![Token::Identifier("x"), Token::Identifier("y")]
        );
    }

    #[test]
    fn unterminated_block_comment() {
        assert_eq!(
            tokens("x /* never closed"),
            vec![
                Token::Identifier("x"),
                Token::Error(LexError::UnterminatedComment),
            ]
        );
    }

    #[test]
    fn attribute_start_is_not_a_comment() {
        assert_eq!(
            tokens("#[Attr]"),
            vec![
                Token::AttributeStart,
                Token::Identifier("Attr"),
                Token::RightBracket,
            ]
        );
    }

    #[test]
    fn magic_constants() {
        assert_eq!(
            tokens("__DIR__ __file__ __LINE__"),
            vec![Token::MagicDir, Token::MagicFile, Token::MagicLine]
        );
    }

    #[test]
    fn open_tag() {
        assert_eq!(
            tokens("<?php echo 1;"),
            vec![
                Token::OpenTag,
                Token::Echo,
                Token::Integer("1"),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn span_tracking() {
        let result = lex("<?php $x");
        assert_eq!(result.len(), 2);
        assert_eq!(result[0], (Token::OpenTag, Span { start: 0, end: 5 }));
        assert_eq!(
            result[1],
            (Token::Variable("$x"), Span { start: 6, end: 8 })
        );
    }

    #[test]
    fn lexer_struct_iteration() {
        let mut lexer = Lexer::new("$x = 42;");
        assert_eq!(lexer.next().map(|(t, _)| t), Some(Token::Variable("$x")));
        assert_eq!(lexer.next().map(|(t, _)| t), Some(Token::Equal));
        assert_eq!(lexer.next().map(|(t, _)| t), Some(Token::Integer("42")));
        assert_eq!(lexer.next().map(|(t, _)| t), Some(Token::Semicolon));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn display_matches_php_wording() {
        assert_eq!(Token::Semicolon.to_string(), "token \";\"");
        assert_eq!(Token::Identifier("foo").to_string(), "identifier \"foo\"");
        assert_eq!(Token::Variable("$a").to_string(), "variable \"$a\"");
        assert_eq!(Token::If.to_string(), "token \"if\"");
    }
}
