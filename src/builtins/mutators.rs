//! Builtins with evaluator side effects: the random stream and `$set`.
//!
//! `$set` writes go through the evaluator's validated token store, so a
//! template can only introduce new tokens under the custom-underscore rule
//! (when that flag is on).  Writes become visible to every node evaluated
//! after the call, in document order.

use super::{merged, number_at, text, Builtin, Handler};
use crate::interp::Interpolator;
use crate::value::Value;

pub(super) fn entries() -> Vec<Builtin> {
    fn b(name: &'static str, handler: Handler) -> Builtin {
        Builtin {
            module: "mutators",
            name,
            handler,
        }
    }
    vec![
        b("randomseed", randomseed),
        b("random", random),
        b("choose", choose),
        b("set", set),
    ]
}

// ── Handlers ──────────────────────────────────────────────────────────────────

fn randomseed(ip: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let seed = super::unary_number(args)?;
    ip.rng_mut().seed(seed as i64 as u64);
    None
}

/// `$random()` → decimal in [0,1); `$random(m)` → integer in [1,m];
/// `$random(m n)` → integer in [m,n].
fn random(ip: &mut Interpolator, args: &[Value]) -> Option<Value> {
    match args.len() {
        0 => super::num(ip.rng_mut().next_f64()),
        1 => {
            let hi = number_at(args, 0)? as i64;
            super::num(ip.rng_mut().next_range(1, hi) as f64)
        }
        _ => {
            let lo = number_at(args, 0)? as i64;
            let hi = number_at(args, 1)? as i64;
            super::num(ip.rng_mut().next_range(lo, hi) as f64)
        }
    }
}

/// Pick uniformly among the arguments — or among the values of a single
/// map argument.
fn choose(ip: &mut Interpolator, args: &[Value]) -> Option<Value> {
    if let [Value::Map(m)] = args {
        if m.is_empty() {
            return None;
        }
        let pick = ip.rng_mut().next_range(0, m.size() as i64 - 1) as usize;
        return m.values().nth(pick).cloned();
    }
    if args.is_empty() {
        return None;
    }
    let pick = ip.rng_mut().next_range(0, args.len() as i64 - 1) as usize;
    args.get(pick).cloned()
}

/// `$set(name value…)` — merge the value parts and write the token.
fn set(ip: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let name = text(args, 0)?;
    let value = merged(args.get(1..).unwrap_or(&[]));
    ip.set_token_validated(&name, value);
    None
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::{Interpolator, Options};
    use crate::multimap::MultiMap;

    fn ip() -> Interpolator {
        Interpolator::new(Options::default())
    }

    #[test]
    fn random_unit_interval() {
        let mut ip = ip();
        let v = random(&mut ip, &[]).unwrap();
        let x: f64 = v.to_string().parse().unwrap();
        assert!((0.0..1.0).contains(&x));
    }

    #[test]
    fn random_single_bound() {
        let mut ip = ip();
        for _ in 0..32 {
            let v = random(&mut ip, &[Value::from("6")]).unwrap();
            let n: i64 = v.to_string().parse().unwrap();
            assert!((1..=6).contains(&n));
        }
    }

    #[test]
    fn random_two_bounds() {
        let mut ip = ip();
        for _ in 0..32 {
            let v = random(&mut ip, &[Value::from("10"), Value::from("12")]).unwrap();
            let n: i64 = v.to_string().parse().unwrap();
            assert!((10..=12).contains(&n));
        }
    }

    #[test]
    fn random_non_numeric_is_absent() {
        assert_eq!(random(&mut ip(), &[Value::from("x")]), None);
    }

    #[test]
    fn seeded_streams_repeat() {
        let mut a = ip();
        let mut b = ip();
        randomseed(&mut a, &[Value::from("99")]);
        randomseed(&mut b, &[Value::from("99")]);
        for _ in 0..8 {
            assert_eq!(
                random(&mut a, &[Value::from("1000000")]),
                random(&mut b, &[Value::from("1000000")])
            );
        }
    }

    #[test]
    fn choose_among_args() {
        let mut ip = ip();
        let args = [Value::from("a"), Value::from("b"), Value::from("c")];
        for _ in 0..16 {
            let v = choose(&mut ip, &args).unwrap().to_string();
            assert!(["a", "b", "c"].contains(&v.as_str()));
        }
        assert_eq!(choose(&mut ip, &[]), None);
    }

    #[test]
    fn choose_among_map_values() {
        let mut ip = ip();
        let m = Value::Map(MultiMap::from_pairs([
            (Value::from("k1"), Value::from("x")),
            (Value::from("k2"), Value::from("y")),
        ]));
        for _ in 0..16 {
            let v = choose(&mut ip, std::slice::from_ref(&m)).unwrap().to_string();
            assert!(["x", "y"].contains(&v.as_str()));
        }
        assert_eq!(choose(&mut ip, &[Value::Map(MultiMap::new())]), None);
    }

    #[test]
    fn set_writes_underscore_token() {
        let mut ip = ip();
        set(&mut ip, &[Value::from("_x"), Value::from("5")]);
        assert_eq!(ip.token("_x"), Some(&Value::from("5")));
    }

    #[test]
    fn set_refuses_new_plain_token() {
        let mut ip = ip();
        set(&mut ip, &[Value::from("plain"), Value::from("5")]);
        assert_eq!(ip.token("plain"), None);
    }

    #[test]
    fn set_overwrites_existing_plain_token() {
        let mut ip = ip();
        ip.set_token("plain", Value::from("old"));
        set(&mut ip, &[Value::from("plain"), Value::from("new")]);
        assert_eq!(ip.token("plain"), Some(&Value::from("new")));
    }

    #[test]
    fn set_merges_value_parts() {
        let mut ip = ip();
        set(
            &mut ip,
            &[Value::from("_x"), Value::from("a"), Value::from("b")],
        );
        assert_eq!(ip.token("_x"), Some(&Value::from("ab")));
    }
}
