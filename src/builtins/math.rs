//! Numeric builtins.
//!
//! Everything funnels through the unary/binary argument helpers: the
//! concatenated arguments must parse as numbers or the call is absent.
//! Domain errors are not special-cased — `$sqrt(-1)` is `NaN`, `$div(1 0)`
//! is `inf` — which keeps the handlers total and lets `$isnan` do its job.

use std::f64::consts::PI;

use super::{binary_numbers, num, truth, unary_number, Builtin, Handler};
use crate::interp::Interpolator;
use crate::multimap::MultiMap;
use crate::value::Value;

pub(super) fn entries() -> Vec<Builtin> {
    fn b(name: &'static str, handler: Handler) -> Builtin {
        Builtin {
            module: "math",
            name,
            handler,
        }
    }
    vec![
        b("pi", pi),
        b("isnan", isnan),
        b("abs", abs),
        b("acos", acos),
        b("asin", asin),
        b("atan", atan),
        b("atan2", atan2),
        b("ceil", ceil),
        b("cos", cos),
        b("cosh", cosh),
        b("deg", deg),
        b("div", div),
        b("exp", exp),
        b("floor", floor),
        b("fmod", fmod),
        b("frexp", frexp),
        b("int", int),
        b("ldexp", ldexp),
        b("log", log),
        b("log10", log10),
        b("max", max),
        b("min", min),
        b("mod", modulo),
        b("modf", modf),
        b("mul", mul),
        b("num", num_fn),
        b("pow", pow),
        b("rad", rad),
        b("sin", sin),
        b("sinh", sinh),
        b("sqrt", sqrt),
        b("subtract", subtract),
        b("tan", tan),
        b("tanh", tanh),
        b("add", add),
    ]
}

// ── Adapters ──────────────────────────────────────────────────────────────────

fn unary(args: &[Value], f: impl Fn(f64) -> f64) -> Option<Value> {
    num(f(unary_number(args)?))
}

fn binary(args: &[Value], f: impl Fn(f64, f64) -> f64) -> Option<Value> {
    let (a, b) = binary_numbers(args)?;
    num(f(a, b))
}

// Two-result functions wrap their outputs in a fresh list map keyed 1..=2.
fn pair(a: f64, b: f64) -> Option<Value> {
    Some(Value::Map(MultiMap::from_pairs([
        (Value::from("1"), Value::from(a)),
        (Value::from("2"), Value::from(b)),
    ])))
}

// ── Handlers ──────────────────────────────────────────────────────────────────

fn pi(_: &mut Interpolator, _: &[Value]) -> Option<Value> {
    num(PI)
}

fn isnan(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    truth(unary_number(args)?.is_nan())
}

fn abs(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    unary(args, f64::abs)
}

fn acos(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    unary(args, f64::acos)
}

fn asin(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    unary(args, f64::asin)
}

fn atan(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    unary(args, f64::atan)
}

fn atan2(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    binary(args, f64::atan2)
}

fn ceil(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    unary(args, f64::ceil)
}

fn cos(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    unary(args, f64::cos)
}

fn cosh(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    unary(args, f64::cosh)
}

fn deg(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    unary(args, f64::to_degrees)
}

fn div(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    binary(args, |a, b| a / b)
}

fn exp(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    unary(args, f64::exp)
}

fn floor(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    unary(args, f64::floor)
}

fn fmod(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    binary(args, |a, b| a % b)
}

fn frexp(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let x = unary_number(args)?;
    if x == 0.0 || !x.is_finite() {
        return pair(x, 0.0);
    }
    let mut e = (x.abs().log2().floor() as i32) + 1;
    let mut m = x / 2f64.powi(e);
    // log2 rounding can land one step off; nudge into [0.5, 1).
    while m.abs() >= 1.0 {
        m /= 2.0;
        e += 1;
    }
    while m.abs() < 0.5 {
        m *= 2.0;
        e -= 1;
    }
    pair(m, e as f64)
}

fn int(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    unary(args, f64::trunc)
}

fn ldexp(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    binary(args, |m, e| m * 2f64.powi(e as i32))
}

fn log(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    unary(args, f64::ln)
}

fn log10(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    unary(args, f64::log10)
}

fn max(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    extreme(args, true)
}

fn min(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    extreme(args, false)
}

// Numeric when every input parses as a number, lexicographic otherwise.
fn extreme(args: &[Value], want_max: bool) -> Option<Value> {
    if args.is_empty() {
        return None;
    }
    let numbers: Option<Vec<f64>> = args.iter().map(|v| v.as_number()).collect();
    if let Some(ns) = numbers {
        let best = ns
            .into_iter()
            .reduce(|a, b| {
                let pick_b = if want_max { b > a } else { b < a };
                if pick_b {
                    b
                } else {
                    a
                }
            })
            .unwrap_or(f64::NAN);
        return num(best);
    }
    let best = args
        .iter()
        .map(|v| v.to_string())
        .reduce(|a, b| {
            let pick_b = if want_max { b > a } else { b < a };
            if pick_b {
                b
            } else {
                a
            }
        })
        .unwrap_or_default();
    Some(Value::Str(best))
}

fn modulo(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    // Floored modulo: result has the sign of the divisor.
    binary(args, |a, b| a - (a / b).floor() * b)
}

fn modf(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let x = unary_number(args)?;
    pair(x.trunc(), x.fract())
}

fn mul(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    binary(args, |a, b| a * b)
}

fn num_fn(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    unary(args, |x| x)
}

fn pow(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    binary(args, f64::powf)
}

fn rad(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    unary(args, f64::to_radians)
}

fn sin(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    unary(args, f64::sin)
}

fn sinh(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    unary(args, f64::sinh)
}

fn sqrt(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    unary(args, f64::sqrt)
}

fn subtract(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    binary(args, |a, b| a - b)
}

fn tan(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    unary(args, f64::tan)
}

fn tanh(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    unary(args, f64::tanh)
}

fn add(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    binary(args, |a, b| a + b)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
