//! String builtins.
//!
//! All positions are 1-based character indices; negative indices count back
//! from the end, so `-1` is the last character.  `gsub` and `match` compile
//! their pattern with the [`regex`] crate — replacement strings use `$1` /
//! `${name}` group references and `$$` for a literal dollar.

use regex::Regex;

use super::{joined, number_at, text, truth, Builtin, Handler};
use crate::interp::Interpolator;
use crate::value::Value;

pub(super) fn entries() -> Vec<Builtin> {
    fn b(name: &'static str, handler: Handler) -> Builtin {
        Builtin {
            module: "string",
            name,
            handler,
        }
    }
    vec![
        b("str", str_),
        b("lower", lower),
        b("upper", upper),
        b("reverse", reverse),
        b("trim", trim),
        b("trimleft", trimleft),
        b("trimright", trimright),
        b("first", first),
        b("last", last),
        b("contains", contains),
        b("startswith", startswith),
        b("endswith", endswith),
        b("concat", concat),
        b("concats", concats),
        b("len", len),
        b("capitalize", capitalize),
        b("punctuate", punctuate),
        b("gsub", gsub),
        b("sub", sub),
        b("index", index),
        b("match", match_),
        b("char", char_),
        b("byte", byte),
        b("rep", rep),
    ]
}

// ── Index arithmetic ──────────────────────────────────────────────────────────

// Resolve a possibly-negative 1-based index against `len`.
fn resolve(i: i64, len: i64) -> i64 {
    if i < 0 {
        len + i + 1
    } else {
        i
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────────

pub(super) fn str_(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    Some(Value::Str(joined(args)))
}

fn lower(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    Some(Value::Str(text(args, 0)?.to_lowercase()))
}

fn upper(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    Some(Value::Str(text(args, 0)?.to_uppercase()))
}

fn reverse(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    Some(Value::Str(text(args, 0)?.chars().rev().collect()))
}

fn trim(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    Some(Value::Str(text(args, 0)?.trim().to_owned()))
}

fn trimleft(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    Some(Value::Str(text(args, 0)?.trim_start().to_owned()))
}

fn trimright(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    Some(Value::Str(text(args, 0)?.trim_end().to_owned()))
}

pub(super) fn first(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let s = text(args, 0)?;
    Some(Value::Str(s.chars().next().map(String::from).unwrap_or_default()))
}

pub(super) fn last(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let s = text(args, 0)?;
    Some(Value::Str(s.chars().last().map(String::from).unwrap_or_default()))
}

fn contains(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let s = text(args, 0)?;
    let needle = text(args, 1)?;
    truth(s.contains(&needle))
}

fn startswith(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let s = text(args, 0)?;
    let prefix = text(args, 1)?;
    truth(s.starts_with(&prefix))
}

fn endswith(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let s = text(args, 0)?;
    let suffix = text(args, 1)?;
    truth(s.ends_with(&suffix))
}

pub(super) fn concat(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    Some(Value::Str(joined(args)))
}

pub(super) fn concats(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let sep = text(args, 0)?;
    let parts: Vec<String> = args[1..].iter().map(|v| v.to_string()).collect();
    Some(Value::Str(parts.join(&sep)))
}

pub(super) fn len(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    super::num(text(args, 0)?.chars().count() as f64)
}

fn capitalize(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let s = text(args, 0)?;
    let mut chars = s.chars();
    let out = match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    };
    Some(Value::Str(out))
}

fn punctuate(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let s = text(args, 0)?;
    let mark = text(args, 1).unwrap_or_else(|| ".".to_owned());
    let allowed = text(args, 2);
    let already = s.chars().last().is_some_and(|c| match &allowed {
        Some(set) => set.contains(c),
        None => c.is_ascii_punctuation(),
    });
    if already {
        Some(Value::Str(s))
    } else {
        Some(Value::Str(s + &mark))
    }
}

fn gsub(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let s = text(args, 0)?;
    let pattern = Regex::new(&text(args, 1)?).ok()?;
    let replacement = text(args, 2)?;
    let out = match number_at(args, 3) {
        Some(n) if n >= 0.0 => pattern.replacen(&s, n as usize, replacement.as_str()),
        _ => pattern.replace_all(&s, replacement.as_str()),
    };
    Some(Value::Str(out.into_owned()))
}

fn sub(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let s = text(args, 0)?;
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;
    let i = resolve(number_at(args, 1)? as i64, len).max(1);
    let j = resolve(
        number_at(args, 2).map(|n| n as i64).unwrap_or(-1),
        len,
    )
    .min(len);
    if i > j {
        return Some(Value::Str(String::new()));
    }
    Some(Value::Str(
        chars[(i - 1) as usize..j as usize].iter().collect(),
    ))
}

pub(super) fn index(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let s = text(args, 0)?;
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;
    let i = resolve(number_at(args, 1)? as i64, len);
    if i < 1 || i > len {
        return None;
    }
    Some(Value::Str(chars[(i - 1) as usize].to_string()))
}

fn match_(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let s = text(args, 0)?;
    let pattern = Regex::new(&text(args, 1)?).ok()?;
    let caps = pattern.captures(&s)?;
    // First capture group when the pattern has one, whole match otherwise.
    let m = caps.get(1).or_else(|| caps.get(0))?;
    Some(Value::Str(m.as_str().to_owned()))
}

fn char_(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    if args.is_empty() {
        return None;
    }
    let mut out = String::new();
    for arg in args {
        let code = arg.as_number()? as u32;
        out.push(char::from_u32(code)?);
    }
    Some(Value::Str(out))
}

fn byte(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let s = text(args, 0)?;
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;
    let i = resolve(number_at(args, 1).map(|n| n as i64).unwrap_or(1), len);
    if i < 1 || i > len {
        return None;
    }
    super::num(chars[(i - 1) as usize] as u32 as f64)
}

fn rep(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let s = text(args, 0)?;
    let n = number_at(args, 1)? as i64;
    if n <= 0 {
        return Some(Value::Str(String::new()));
    }
    Some(Value::Str(s.repeat(n as usize)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
