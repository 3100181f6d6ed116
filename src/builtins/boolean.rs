//! Truthiness, comparisons, and conditionals.
//!
//! A value is truthy iff its string projection is non-empty; the library's
//! boolean results are `"1"` and `""`.  Comparisons go numeric when both
//! sides parse as numbers and lexicographic otherwise, mirroring the value
//! comparison rules.

use std::cmp::Ordering;

use super::{merged, truth, Builtin, Handler};
use crate::interp::Interpolator;
use crate::value::Value;

pub(super) fn entries() -> Vec<Builtin> {
    fn b(name: &'static str, handler: Handler) -> Builtin {
        Builtin {
            module: "boolean",
            name,
            handler,
        }
    }
    vec![
        b("not", not),
        b("eq", eq),
        b("neq", neq),
        b("gt", gt),
        b("lt", lt),
        b("gte", gte),
        b("lte", lte),
        b("any", any),
        b("all", all),
        b("if", if_),
        b("unless", unless),
        b("ifelse", ifelse),
    ]
}

// ── Handlers ──────────────────────────────────────────────────────────────────

fn not(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    truth(!merged(args).is_truthy())
}

fn compare(args: &[Value], accept: impl Fn(Ordering) -> bool) -> Option<Value> {
    let a = args.first()?;
    let b = args.get(1)?;
    truth(accept(a.compare(b)))
}

fn eq(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    compare(args, |o| o == Ordering::Equal)
}

fn neq(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    compare(args, |o| o != Ordering::Equal)
}

fn gt(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    compare(args, |o| o == Ordering::Greater)
}

fn lt(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    compare(args, |o| o == Ordering::Less)
}

fn gte(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    compare(args, |o| o != Ordering::Less)
}

fn lte(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    compare(args, |o| o != Ordering::Greater)
}

/// First truthy argument, absent when none is.
fn any(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    args.iter().find(|v| v.is_truthy()).cloned()
}

/// The last argument — but only when every argument is truthy.
fn all(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    if args.is_empty() || args.iter().any(|v| !v.is_truthy()) {
        return None;
    }
    args.last().cloned()
}

fn if_(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let cond = args.first()?;
    if cond.is_truthy() {
        Some(merged(&args[1..]))
    } else {
        None
    }
}

fn unless(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let cond = args.first()?;
    if cond.is_truthy() {
        None
    } else {
        Some(merged(&args[1..]))
    }
}

/// The then branch is the single argument after the condition; everything
/// after that is the else branch, concatenated when multi-token.
fn ifelse(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let cond = args.first()?;
    if cond.is_truthy() {
        args.get(1).cloned()
    } else if args.len() > 2 {
        Some(merged(&args[2..]))
    } else {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
