//! The builtin function library.
//!
//! Functions are grouped into modules (`math`, `string`, `boolean`, `map`,
//! `mutators`, `translation`) and published through a flat descriptor table.
//! The evaluator builds its dispatch map once at construction, filtered
//! through the caller's include/exclude sets; lookups are by lowercased
//! name.
//!
//! Every handler has the same shape: evaluator context plus the evaluated
//! argument values, returning `Option<Value>`.  `None` means *absent* — the
//! call contributes nothing to its surroundings.  Handlers never panic:
//! malformed input (a non-number where one is needed, a missing argument)
//! degrades to absent via the `?` operator on the argument helpers below.
//!
//! Registration order matters for the handful of polymorphic names
//! (`len`, `concat`, `concats`, `first`, `last`, `index`): the `map` module
//! registers after `string` and its versions delegate back to the string
//! behavior whenever the subject is not a map.

use std::collections::{HashMap, HashSet};

use crate::interp::Interpolator;
use crate::value::{format_number, parse_number, Value};

pub mod boolean;
pub mod map;
pub mod math;
pub mod mutators;
pub mod string;
pub mod translation;

pub use self::translation::Translator;

/// Uniform builtin signature.
pub type Handler = fn(&mut Interpolator, &[Value]) -> Option<Value>;

/// One library entry: module name, call name, handler.
pub struct Builtin {
    pub module: &'static str,
    pub name: &'static str,
    pub handler: Handler,
}

/// The whole library, in registration order.
pub fn registry() -> Vec<Builtin> {
    let mut all = Vec::new();
    all.extend(math::entries());
    all.extend(boolean::entries());
    all.extend(string::entries());
    all.extend(translation::entries());
    all.extend(map::entries());
    all.extend(mutators::entries());
    all
}

/// Build the dispatch table, honoring include/exclude sets.  Set members
/// name either a module (`"string"`) or a single function (`"gsub"`);
/// an absent include set means "all modules".
pub fn build_table(
    include: Option<&HashSet<String>>,
    exclude: &HashSet<String>,
) -> HashMap<String, Handler> {
    let mut table = HashMap::new();
    for builtin in registry() {
        let included = match include {
            None => true,
            Some(set) => set.contains(builtin.module) || set.contains(builtin.name),
        };
        if !included || exclude.contains(builtin.module) || exclude.contains(builtin.name) {
            continue;
        }
        table.insert(builtin.name.to_ascii_lowercase(), builtin.handler);
    }
    table
}

// ── Shared argument helpers ───────────────────────────────────────────────────
//
// These play the role of the adapter wrappers: each handler pulls its
// arguments through one of them and bails to absent with `?` on a mismatch.

/// Stringify the argument at `idx`; absent when missing.
pub(crate) fn text(args: &[Value], idx: usize) -> Option<String> {
    args.get(idx).map(|v| v.to_string())
}

/// Number at `idx`; absent when missing or non-numeric.
pub(crate) fn number_at(args: &[Value], idx: usize) -> Option<f64> {
    args.get(idx)?.as_number()
}

/// All arguments stringified and concatenated.
pub(crate) fn joined(args: &[Value]) -> String {
    args.iter().map(|v| v.to_string()).collect()
}

/// A single argument survives untouched (maps keep their identity);
/// several concatenate stringwise; none is the empty string.
pub(crate) fn merged(args: &[Value]) -> Value {
    match args {
        [] => Value::default(),
        [one] => one.clone(),
        many => Value::Str(joined(many)),
    }
}

/// The concatenated arguments parsed as one number.
pub(crate) fn unary_number(args: &[Value]) -> Option<f64> {
    parse_number(&joined(args))
}

/// First argument as one number, the remainder concatenated as another.
pub(crate) fn binary_numbers(args: &[Value]) -> Option<(f64, f64)> {
    let a = args.first()?.as_number()?;
    let b = parse_number(&joined(args.get(1..)?))?;
    Some((a, b))
}

/// Engine booleans: `"1"` for true, `""` for false.
pub(crate) fn truth(b: bool) -> Option<Value> {
    Some(Value::Str(if b { "1".to_owned() } else { String::new() }))
}

pub(crate) fn num(x: f64) -> Option<Value> {
    Some(Value::Str(format_number(x)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
