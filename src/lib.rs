//! patter — a string-interpolation engine.
//!
//! Rewrites a template string into an output string, covering:
//!
//! - Token substitution (`$name`, resolved against a caller-supplied map)
//! - Function calls (`$upper(word)`, `$add(1 2)`, ~90 builtins across the
//!   `math`, `string`, `boolean`, `map`, `mutators`, and `translation`
//!   modules)
//! - Inline ordered key/value collections, "at-maps" (`@(a:1;b:2)`)
//! - Dollar escapes (`$$`, `$(`, …) and parenthesized literal regions
//!
//! Parsing is fault-tolerant: malformed templates collect diagnostics and
//! evaluate to empty output instead of failing, and a misbehaving builtin
//! call simply contributes nothing.
//!
//! # Quick start
//!
//! ```rust
//! use patter::{interpolate, Options, TokenMap, Value};
//!
//! let mut tokens = TokenMap::new();
//! tokens.insert("name".to_owned(), Value::from("world"));
//! let out = interpolate("$capitalize($name)$punctuate((, hello))", tokens, Options::default());
//! assert_eq!(out, "World, hello.");
//! ```
//!
//! For repeated evaluation of one pattern, build an
//! [`Interpolator`], call [`Interpolator::set_pattern`] once, and
//! [`Interpolator::interpolate`] per token binding.

pub mod ast;
pub mod builtins;
pub mod interp;
pub mod multimap;
pub mod parse;
pub mod rng;
pub mod value;

// Re-exports for convenience.
pub use builtins::Translator;
pub use interp::{interpolate, Interpolator, Options, TokenMap};
pub use multimap::{Entry, MultiMap};
pub use parse::{parse, Diagnostic, DiagnosticCode, ParseError, ParseOptions, ParseTree};
pub use rng::Rng;
pub use value::Value;
