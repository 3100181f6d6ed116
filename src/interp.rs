//! The interpolation evaluator and its public facade.
//!
//! An [`Interpolator`] ties the pipeline together: it owns the token
//! environment, the builtin dispatch table, the random stream, and the
//! postprocessed AST of the current pattern.  [`Interpolator::set_pattern`]
//! runs the parser + postprocessor once; [`Interpolator::interpolate`] can
//! then be called repeatedly with fresh token bindings.
//!
//! Evaluation is strict left-to-right.  Each node appends zero or more
//! values to an accumulator; a lone value survives as-is (so a map keeps
//! its identity), while several values collapse to their concatenated
//! string forms.  Builtin failures are absent, not errors: nothing a
//! template does makes `interpolate` fail.

use std::collections::{HashMap, HashSet};

use crate::ast::{postprocess, Ast};
use crate::builtins::{self, Handler, Translator};
use crate::multimap::{Entry, MultiMap};
use crate::parse::{parse, Diagnostic, ParseOptions};
use crate::rng::{Rng, StdStream};
use crate::value::Value;

/// Token bindings supplied by the host.
pub type TokenMap = HashMap<String, Value>;

// ── Options ───────────────────────────────────────────────────────────────────

/// Evaluator configuration.
///
/// The `allow_*` flags gate whole constructs: a disabled construct is not
/// even parsed, so its syntax flows through as literal text.
/// `library_include` / `library_exclude` name builtin modules (`"string"`)
/// or single functions (`"gsub"`); an absent include set means all modules.
pub struct Options {
    pub allow_tokens: bool,
    pub allow_functions: bool,
    pub allow_multimaps: bool,
    pub allow_character_entities: bool,
    /// `$set` may only introduce tokens whose names start with `_`;
    /// existing tokens stay writable.
    pub require_custom_token_underscore: bool,
    pub library_include: Option<HashSet<String>>,
    pub library_exclude: HashSet<String>,
    /// Message catalog behind `$gettext` / `$gettextornull`.
    pub translator: Option<Box<dyn Translator + Send>>,
    /// Replacement random stream (defaults to an entropy-seeded one).
    pub rng: Option<Box<dyn Rng + Send>>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            allow_tokens: true,
            allow_functions: true,
            allow_multimaps: true,
            allow_character_entities: true,
            require_custom_token_underscore: true,
            library_include: None,
            library_exclude: HashSet::new(),
            translator: None,
            rng: None,
        }
    }
}

// ── Interpolator ──────────────────────────────────────────────────────────────

/// The evaluator.  One instance per pattern-and-token-environment; disjoint
/// instances are fully independent (each owns its random stream).
pub struct Interpolator {
    allow_tokens: bool,
    allow_functions: bool,
    allow_multimaps: bool,
    allow_character_entities: bool,
    require_custom_token_underscore: bool,
    tokens: TokenMap,
    functions: HashMap<String, Handler>,
    built: Vec<Ast>,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    rng: Box<dyn Rng + Send>,
    translator: Option<Box<dyn Translator + Send>>,
}

impl Interpolator {
    pub fn new(mut options: Options) -> Self {
        let functions =
            builtins::build_table(options.library_include.as_ref(), &options.library_exclude);
        Interpolator {
            allow_tokens: options.allow_tokens,
            allow_functions: options.allow_functions,
            allow_multimaps: options.allow_multimaps,
            allow_character_entities: options.allow_character_entities,
            require_custom_token_underscore: options.require_custom_token_underscore,
            tokens: TokenMap::new(),
            functions,
            built: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            rng: options
                .rng
                .take()
                .unwrap_or_else(|| Box::new(StdStream::new())),
            translator: options.translator.take(),
        }
    }

    /// Parse and postprocess a new pattern.  Diagnostics are kept for
    /// inspection; a pattern with errors evaluates to empty output.
    pub fn set_pattern(&mut self, text: &str) {
        let opts = ParseOptions {
            allow_tokens: self.allow_tokens,
            allow_functions: self.allow_functions,
            allow_at_expressions: self.allow_multimaps,
            raise_errors: false,
        };
        match parse(text, &opts) {
            Ok(tree) => {
                self.built = postprocess(&tree);
                self.errors = tree.errors;
                self.warnings = tree.warnings;
            }
            // Lenient parsing never fails; treat a failure like an errored
            // tree all the same.
            Err(err) => {
                self.built = Vec::new();
                self.errors = vec![err.0];
                self.warnings = Vec::new();
            }
        }
    }

    /// Evaluate the current pattern, optionally replacing the token map
    /// first, and stringify the result.
    pub fn interpolate(&mut self, tokens: Option<TokenMap>) -> String {
        self.interpolate_value(tokens)
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    /// Like [`interpolate`](Self::interpolate) but keeps the result's
    /// identity: a template that is one big at-expression yields the map.
    pub fn interpolate_value(&mut self, tokens: Option<TokenMap>) -> Option<Value> {
        if let Some(tokens) = tokens {
            self.tokens = tokens;
        }
        let built = self.built.clone();
        let mut acc = Vec::new();
        self.eval_nodes(&built, &mut acc);
        merge_parts(acc)
    }

    /// Parse diagnostics from the last [`set_pattern`](Self::set_pattern).
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Current value of a token.
    pub fn token(&self, name: &str) -> Option<&Value> {
        self.tokens.get(name)
    }

    /// Bind a token unconditionally (host-side; `$set` goes through
    /// validation instead).
    pub fn set_token(&mut self, name: impl Into<String>, value: Value) {
        self.tokens.insert(name.into(), value);
    }

    // ── Evaluation ────────────────────────────────────────────────────────────

    fn eval_nodes(&mut self, nodes: &[Ast], acc: &mut Vec<Value>) {
        for node in nodes {
            self.eval_node(node, acc);
        }
    }

    fn eval_node(&mut self, node: &Ast, acc: &mut Vec<Value>) {
        match node {
            Ast::Text(text) => {
                let text = if self.allow_character_entities {
                    decode_entities(text)
                } else {
                    text.clone()
                };
                acc.push(Value::Str(text));
            }

            // An unbound token contributes nothing.
            Ast::Token(name) => {
                if let Some(value) = self.tokens.get(name) {
                    acc.push(value.clone());
                }
            }

            Ast::Call { name, args } => {
                let Some(handler) = self.functions.get(&name.to_ascii_lowercase()).copied()
                else {
                    return; // unknown function: absent
                };
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    let mut sub = Vec::new();
                    self.eval_nodes(arg, &mut sub);
                    values.push(self.convert(merge_parts(sub)));
                }
                if let Some(result) = handler(self, &values) {
                    acc.push(result);
                }
            }

            Ast::AtExpr { entries } => {
                let map = self.eval_at_expr(entries);
                acc.push(Value::Map(map));
            }
        }
    }

    fn eval_at_expr(&mut self, entries: &[crate::ast::AtEntry]) -> MultiMap {
        let mut out: Vec<Entry> = Vec::new();
        for entry in entries {
            let mut parts = Vec::new();
            self.eval_nodes(&entry.value, &mut parts);
            let value = merge_parts(parts);

            match &entry.key {
                // Bare form: the value stands in for both sides.  A map
                // value splices its entries in (truthy keys only); anything
                // else keys itself by its own string form, provided that
                // form is non-empty.
                None => match value {
                    Some(Value::Map(m)) => {
                        for (key, val) in m.pairs() {
                            if key.is_truthy() {
                                out.push(Entry {
                                    key: key.clone(),
                                    value: val.clone(),
                                });
                            }
                        }
                    }
                    Some(value) => {
                        let projected = value.to_string();
                        if !projected.is_empty() {
                            out.push(Entry {
                                key: Value::Str(projected),
                                value,
                            });
                        }
                    }
                    None => {}
                },

                Some(key_nodes) => {
                    let mut parts = Vec::new();
                    self.eval_nodes(key_nodes, &mut parts);
                    let value = value.unwrap_or_default();
                    match merge_parts(parts) {
                        // A map key fans out: one entry per key-map value,
                        // all sharing this entry's value.
                        Some(Value::Map(keys)) => {
                            for key in keys.values() {
                                out.push(Entry {
                                    key: Value::Str(key.to_string()),
                                    value: value.clone(),
                                });
                            }
                        }
                        Some(key) => {
                            if key.is_truthy() {
                                out.push(Entry { key, value });
                            }
                        }
                        None => {}
                    }
                }
            }
        }
        MultiMap::from_entries(out)
    }

    // Normalize a merged value on its way into a builtin call.
    fn convert(&self, value: Option<Value>) -> Value {
        match value {
            None => Value::default(),
            Some(Value::Map(m)) if !self.allow_multimaps => Value::Str(m.projection()),
            Some(value) => value,
        }
    }

    // ── Library plumbing ──────────────────────────────────────────────────────

    pub(crate) fn rng_mut(&mut self) -> &mut dyn Rng {
        self.rng.as_mut()
    }

    pub(crate) fn translator(&self) -> Option<&(dyn Translator + Send)> {
        self.translator.as_deref()
    }

    /// Re-entrant dispatch used by `$map`.
    pub(crate) fn call_named(&mut self, name: &str, args: &[Value]) -> Option<Value> {
        let handler = self.functions.get(&name.to_ascii_lowercase()).copied()?;
        handler(self, args)
    }

    /// The `$set` write path.  Returns whether the write happened.
    pub(crate) fn set_token_validated(&mut self, name: &str, value: Value) -> bool {
        if self.require_custom_token_underscore
            && !name.starts_with('_')
            && !self.tokens.contains_key(name)
        {
            return false;
        }
        self.tokens.insert(name.to_owned(), value);
        true
    }
}

// ── One-shot entry point ──────────────────────────────────────────────────────

/// Parse, bind, evaluate: the whole pipeline in one call.
pub fn interpolate(text: &str, tokens: TokenMap, options: Options) -> String {
    let mut interpolator = Interpolator::new(options);
    interpolator.set_pattern(text);
    interpolator.interpolate(Some(tokens))
}

// ── Value merging ─────────────────────────────────────────────────────────────

// A single accumulated value keeps its identity; several collapse to their
// concatenated string forms.
fn merge_parts(parts: Vec<Value>) -> Option<Value> {
    match parts.len() {
        0 => None,
        1 => parts.into_iter().next(),
        _ => Some(Value::Str(
            parts.iter().map(|v| v.to_string()).collect(),
        )),
    }
}

// ── Character entities ────────────────────────────────────────────────────────

// Decode `&#NNN;`, `&#xHH;`, and a small named set.  Anything unrecognized
// passes through untouched.
fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_owned();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match entity_at(tail) {
            Some((decoded, consumed)) => {
                out.push(decoded);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

// `s` starts at an ampersand; returns the decoded char and the byte length
// of the whole reference, `None` when this is not a reference.
fn entity_at(s: &str) -> Option<(char, usize)> {
    let semi = s.find(';')?;
    if semi > 12 {
        return None;
    }
    let body = &s[1..semi];
    let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        char::from_u32(u32::from_str_radix(hex, 16).ok()?)?
    } else if let Some(dec) = body.strip_prefix('#') {
        char::from_u32(dec.parse().ok()?)?
    } else {
        match body {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            "nbsp" => '\u{a0}',
            _ => return None,
        }
    };
    Some((decoded, semi + 1))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
