//! Template parser.
//!
//! A hand-written recursive-descent reader over byte positions that turns
//! template text into a raw node tree.  The grammar is context-sensitive:
//! which bytes terminate a literal text run depends on where the reader is
//! (top level, call argument, at-expression key/value, parenthesized
//! string), so every reader takes the current [`Ctx`].
//!
//! | Construct      | Syntax                                   |
//! |----------------|------------------------------------------|
//! | escape         | `$c` with `c` in `$ @ ( ) : ;`           |
//! | token          | `$name`                                  |
//! | call           | `$name(arg1 arg2 …)` (space-separated)   |
//! | string literal | `(…)` inside calls and at-expressions    |
//! | at-expression  | `@(key:value; key:value; …)`             |
//!
//! Malformed input never aborts the parse (unless [`ParseOptions::raise_errors`]
//! is set): problems are collected as [`Diagnostic`] records on the returned
//! [`ParseTree`] and the reader resynchronizes byte by byte.

// ── Spans and diagnostics ─────────────────────────────────────────────────────

/// Inclusive 1-indexed byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }
}

/// What went wrong (or nearly wrong) at a particular span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCode {
    /// A byte no reader could accept.
    BadChar,
    /// `$name(` with no closing `)` before end of input.
    UnterminatedFunction,
    /// `@(` with no closing `)` before end of input.
    UnterminatedAt,
}

/// An error or warning record attached to the parse tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    pub span: Span,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at bytes {}..{}",
            self.message, self.span.start, self.span.end
        )
    }
}

/// Error returned from [`parse`] in strict mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(pub Diagnostic);

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parse error: {}", self.0)
    }
}

impl std::error::Error for ParseError {}

// ── Nodes ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Tree,
    Text,
    Escape,
    Token,
    String,
    Call,
    Argument,
    AtExpression,
    AtKey,
    AtValue,
}

/// A raw parse-tree node.
///
/// `value` carries the literal bytes for `Text`/`Escape`, the name for
/// `Token`/`Call`.  Structural kinds use `children`.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub value: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    fn new(kind: NodeKind, span: Span) -> Self {
        Node {
            kind,
            span,
            value: None,
            children: Vec::new(),
        }
    }

    fn with_value(kind: NodeKind, span: Span, value: impl Into<String>) -> Self {
        Node {
            kind,
            span,
            value: Some(value.into()),
            children: Vec::new(),
        }
    }
}

/// The parse result: root node, a copy of the source, and any diagnostics.
#[derive(Debug, Clone)]
pub struct ParseTree {
    pub root: Node,
    pub source: String,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

// ── Options ───────────────────────────────────────────────────────────────────

/// Parser switches.  Turning a construct off makes its reader never match,
/// so its syntax falls through to literal text.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub allow_tokens: bool,
    pub allow_functions: bool,
    pub allow_at_expressions: bool,
    /// Abort on the first error instead of collecting it.
    pub raise_errors: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            allow_tokens: true,
            allow_functions: true,
            allow_at_expressions: true,
            raise_errors: false,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Parse template text into a raw tree.
///
/// With `raise_errors` off (the default) this never fails; errors are
/// collected on the tree and evaluation of such a tree produces empty
/// output.  With it on, the first error aborts the parse.
pub fn parse(text: &str, options: &ParseOptions) -> Result<ParseTree, ParseError> {
    let mut parser = Parser {
        src: text.as_bytes(),
        pos: 0,
        opts: options,
        errors: Vec::new(),
        warnings: Vec::new(),
    };

    let mut root = Node::new(NodeKind::Tree, Span::new(1, text.len()));
    while parser.pos < parser.src.len() {
        match parser.read_expression(Ctx::Top) {
            Some(node) => root.children.push(node),
            None => {
                let span = Span::new(parser.pos + 1, parser.pos + 1);
                parser.error(DiagnosticCode::BadChar, span);
                parser.pos += 1; // resynchronize
            }
        }
        if options.raise_errors {
            if let Some(first) = parser.errors.first() {
                return Err(ParseError(first.clone()));
            }
        }
    }

    Ok(ParseTree {
        root,
        source: text.to_owned(),
        errors: parser.errors,
        warnings: parser.warnings,
    })
}

// ── Reader contexts ───────────────────────────────────────────────────────────

// Where the reader currently is; decides which bytes stop a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ctx {
    Top,
    Argument,
    AtKey,
    AtValue,
    Literal,
}

impl Ctx {
    fn stops_at(self, b: u8) -> bool {
        match self {
            Ctx::Top => matches!(b, b'$' | b'@'),
            Ctx::Argument => matches!(b, b' ' | b'$' | b'(' | b')'),
            Ctx::AtKey | Ctx::AtValue => matches!(b, b'$' | b'@' | b':' | b';' | b'(' | b')'),
            Ctx::Literal => matches!(b, b'$' | b')'),
        }
    }
}

const ESCAPABLE: &[u8] = b"$@():;";

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

// ── Parser ────────────────────────────────────────────────────────────────────

struct Parser<'a> {
    src: &'a [u8],
    pos: usize, // 0-based cursor; spans are reported 1-based
    opts: &'a ParseOptions,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn error(&mut self, code: DiagnosticCode, span: Span) {
        self.errors.push(Diagnostic {
            code,
            message: message_for(code),
            span,
        });
    }

    fn warning(&mut self, code: DiagnosticCode, span: Span) {
        self.warnings.push(Diagnostic {
            code,
            message: message_for(code),
            span,
        });
    }

    // Consume a run of space bytes, returning how many.
    fn read_spaces(&mut self) -> usize {
        let start = self.pos;
        while self.peek() == Some(b' ') {
            self.pos += 1;
        }
        self.pos - start
    }

    /// One expression, whatever fits the context.  The readers are tried in
    /// a fixed order; the first to match wins.
    fn read_expression(&mut self, ctx: Ctx) -> Option<Node> {
        self.read_escape()
            .or_else(|| self.read_function())
            .or_else(|| self.read_variable())
            .or_else(|| self.read_at_expression())
            .or_else(|| self.read_text(ctx))
            .or_else(|| self.read_special_text())
    }

    // `$c` for c in the escapable set; yields the literal c.
    fn read_escape(&mut self) -> Option<Node> {
        if self.peek() != Some(b'$') {
            return None;
        }
        let c = self.peek_at(1)?;
        if !ESCAPABLE.contains(&c) {
            return None;
        }
        let span = Span::new(self.pos + 1, self.pos + 2);
        self.pos += 2;
        Some(Node::with_value(
            NodeKind::Escape,
            span,
            (c as char).to_string(),
        ))
    }

    // `$name` — a token reference.
    fn read_variable(&mut self) -> Option<Node> {
        if !self.opts.allow_tokens || self.peek() != Some(b'$') {
            return None;
        }
        let start = self.pos;
        let name = self.ident_after_dollar()?;
        Some(Node::with_value(
            NodeKind::Token,
            Span::new(start + 1, self.pos),
            name,
        ))
    }

    // Consume `$` + identifier run; rewinds and fails on an empty name.
    fn ident_after_dollar(&mut self) -> Option<String> {
        let start = self.pos;
        self.pos += 1; // '$'
        let name_start = self.pos;
        while self.peek().is_some_and(is_ident) {
            self.pos += 1;
        }
        if self.pos == name_start {
            self.pos = start;
            return None;
        }
        Some(String::from_utf8_lossy(&self.src[name_start..self.pos]).into_owned())
    }

    // Maximal run of bytes the context does not stop at.
    fn read_text(&mut self, ctx: Ctx) -> Option<Node> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if ctx.stops_at(b) {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        Some(Node::with_value(
            NodeKind::Text,
            Span::new(start + 1, self.pos),
            String::from_utf8_lossy(&self.src[start..self.pos]).into_owned(),
        ))
    }

    // A single stop byte surfaced as literal text (e.g. a lone `$`).
    fn read_special_text(&mut self) -> Option<Node> {
        let b = self.peek()?;
        if !matches!(b, b'$' | b'@' | b'(' | b')' | b':' | b';') {
            return None;
        }
        let span = Span::new(self.pos + 1, self.pos + 1);
        self.pos += 1;
        Some(Node::with_value(
            NodeKind::Text,
            span,
            (b as char).to_string(),
        ))
    }

    // ── Calls ─────────────────────────────────────────────────────────────────

    // `$name(` … space-separated arguments … `)`.
    fn read_function(&mut self) -> Option<Node> {
        if !self.opts.allow_functions || self.peek() != Some(b'$') {
            return None;
        }
        let start = self.pos;
        let name = self.ident_after_dollar()?;
        if self.peek() != Some(b'(') {
            self.pos = start;
            return None;
        }
        self.pos += 1; // '('

        let mut call = Node::with_value(NodeKind::Call, Span::new(start + 1, self.pos), name);
        let mut arg = Node::new(NodeKind::Argument, Span::new(self.pos + 1, self.pos));

        loop {
            // A run of spaces ends the current argument and starts the next,
            // unless the call is about to close.
            let spaces = self.read_spaces();
            if spaces > 0 && self.peek() != Some(b')') {
                close_child(&mut call, arg, self.pos - spaces);
                arg = Node::new(NodeKind::Argument, Span::new(self.pos + 1, self.pos));
            }

            match self.peek() {
                None => {
                    // Unterminated: degrade to the `$name` token when tokens
                    // are enabled, otherwise report and give up.
                    self.pos = start;
                    if let Some(token) = self.read_variable() {
                        self.warning(
                            DiagnosticCode::UnterminatedFunction,
                            Span::new(start + 1, self.src.len()),
                        );
                        return Some(token);
                    }
                    self.error(
                        DiagnosticCode::UnterminatedFunction,
                        Span::new(start + 1, self.src.len()),
                    );
                    return None;
                }
                Some(b')') => {
                    close_child(&mut call, arg, self.pos);
                    self.pos += 1;
                    break;
                }
                Some(_) => {
                    let node = self
                        .read_string()
                        .or_else(|| self.read_expression(Ctx::Argument));
                    match node {
                        Some(n) => arg.children.push(n),
                        None => {
                            let span = Span::new(self.pos + 1, self.pos + 1);
                            self.error(DiagnosticCode::BadChar, span);
                            self.pos += 1;
                            close_child(&mut call, arg, self.pos);
                            break;
                        }
                    }
                }
            }
        }

        call.span = Span::new(start + 1, self.pos);
        Some(call)
    }

    // ── String literals ───────────────────────────────────────────────────────

    // `(…)` — a literal region; escapes still decode, everything else is
    // verbatim.  On EOF the open paren alone becomes text and the reader
    // resumes right after it.
    fn read_string(&mut self) -> Option<Node> {
        if self.peek() != Some(b'(') {
            return None;
        }
        let start = self.pos;
        self.pos += 1;

        let mut string = Node::new(NodeKind::String, Span::new(start + 1, start + 1));
        loop {
            match self.peek() {
                None => {
                    self.pos = start + 1;
                    return Some(Node::with_value(
                        NodeKind::Text,
                        Span::new(start + 1, start + 1),
                        "(",
                    ));
                }
                Some(b')') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => {
                    let node = self
                        .read_escape()
                        .or_else(|| self.read_text(Ctx::Literal))
                        .or_else(|| self.read_special_text());
                    match node {
                        Some(n) => string.children.push(n),
                        // Unreachable: every byte is either a stop byte
                        // handled above or accepted by a reader.
                        None => {
                            self.pos += 1;
                        }
                    }
                }
            }
        }
        string.span = Span::new(start + 1, self.pos);
        Some(string)
    }

    // ── At-expressions ────────────────────────────────────────────────────────

    // `@(` entry (`;` entry)* `)` where entry is `key`, `key:value`, or
    // `:value`.  Keys and values are expression sequences; a run of `:`
    // transitions key → value, inserting at most one empty key.
    fn read_at_expression(&mut self) -> Option<Node> {
        if !self.opts.allow_at_expressions
            || self.peek() != Some(b'@')
            || self.peek_at(1) != Some(b'(')
        {
            return None;
        }
        let start = self.pos;
        self.pos += 2;

        let mut at = Node::new(NodeKind::AtExpression, Span::new(start + 1, self.pos));
        let mut key: Option<Node> = None;
        let mut value: Option<Node> = None;

        loop {
            match self.peek() {
                None => {
                    // Unterminated: the `@` degrades to literal text and the
                    // reader resumes right after it.
                    self.warning(
                        DiagnosticCode::UnterminatedAt,
                        Span::new(start + 1, self.src.len()),
                    );
                    self.pos = start + 1;
                    return Some(Node::with_value(
                        NodeKind::Text,
                        Span::new(start + 1, start + 1),
                        "@",
                    ));
                }
                Some(b';') => {
                    attach(&mut at, key.take(), self.pos);
                    attach(&mut at, value.take(), self.pos);
                    self.pos += 1;
                }
                // A space run the reader actually reaches (i.e. not one
                // swallowed into a text run) delimits entries when the open
                // key/value has content; otherwise it is leading and skipped.
                Some(b' ') => {
                    let has_content = key.as_ref().is_some_and(|k| !k.children.is_empty())
                        || value.as_ref().is_some_and(|v| !v.children.is_empty());
                    if has_content {
                        attach(&mut at, key.take(), self.pos);
                        attach(&mut at, value.take(), self.pos);
                    }
                    self.pos += 1;
                }
                Some(b':') => {
                    match key.take() {
                        Some(k) => attach(&mut at, Some(k), self.pos),
                        None => {
                            // Mid-value or entry-initial colon: close any open
                            // value and stand in an empty key.
                            attach(&mut at, value.take(), self.pos);
                            at.children.push(Node::new(
                                NodeKind::AtKey,
                                Span::new(self.pos + 1, self.pos),
                            ));
                        }
                    }
                    while self.peek() == Some(b':') {
                        self.pos += 1;
                    }
                    value = Some(Node::new(NodeKind::AtValue, Span::new(self.pos + 1, self.pos)));
                }
                Some(b')') => {
                    attach(&mut at, key.take(), self.pos);
                    attach(&mut at, value.take(), self.pos);
                    self.pos += 1;
                    break;
                }
                Some(_) => {
                    if key.is_none() && value.is_none() {
                        key = Some(Node::new(NodeKind::AtKey, Span::new(self.pos + 1, self.pos)));
                    }
                    let ctx = if value.is_some() { Ctx::AtValue } else { Ctx::AtKey };
                    let node = self.read_string().or_else(|| self.read_expression(ctx));
                    let target = value.as_mut().or(key.as_mut());
                    match (node, target) {
                        (Some(n), Some(t)) => t.children.push(n),
                        _ => {
                            let span = Span::new(self.pos + 1, self.pos + 1);
                            self.error(DiagnosticCode::BadChar, span);
                            attach(&mut at, key.take(), self.pos);
                            attach(&mut at, value.take(), self.pos);
                            break;
                        }
                    }
                }
            }
        }

        at.span = Span::new(start + 1, self.pos);
        Some(at)
    }
}

// Close an in-flight key/value/argument node and attach it to its parent.
fn attach(parent: &mut Node, child: Option<Node>, end_pos: usize) {
    if let Some(mut child) = child {
        child.span.end = end_pos;
        parent.children.push(child);
    }
}

// Arguments only attach when they actually accumulated content.
fn close_child(call: &mut Node, mut arg: Node, end_pos: usize) {
    if arg.children.is_empty() {
        return;
    }
    arg.span.end = end_pos;
    call.children.push(arg);
}

fn message_for(code: DiagnosticCode) -> String {
    match code {
        DiagnosticCode::BadChar => "unexpected character".to_owned(),
        DiagnosticCode::UnterminatedFunction => "unterminated function call".to_owned(),
        DiagnosticCode::UnterminatedAt => "unterminated at-expression".to_owned(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
