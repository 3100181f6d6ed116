//! At-map builtins.
//!
//! Several names here are polymorphic (`len`, `concat`, `concats`, `first`,
//! `last`, `index`): they register after the string module and fall back to
//! the string behavior whenever the first argument is not a map, so
//! `$len(@(a;b))` and `$len(word)` both do the expected thing.

use super::{number_at, string, text, truth, Builtin, Handler};
use crate::interp::Interpolator;
use crate::multimap::{Entry, MultiMap};
use crate::value::Value;

pub(super) fn entries() -> Vec<Builtin> {
    fn b(name: &'static str, handler: Handler) -> Builtin {
        Builtin {
            module: "map",
            name,
            handler,
        }
    }
    vec![
        b("list", list),
        b("map", map_apply),
        b("len", len),
        b("concat", concat),
        b("concats", concats),
        b("nthvalue", nthvalue),
        b("first", first),
        b("last", last),
        b("has", has),
        b("get", get),
        b("index", index),
        b("unique", unique),
    ]
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `$list(@(a:1;b:2))` re-keys a single map `1..=n`; any other argument
/// pattern wraps the arguments positionally.
fn list(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let entries: Vec<Entry> = match args {
        [Value::Map(m)] => m
            .values()
            .enumerate()
            .map(|(i, v)| Entry {
                key: Value::from(format!("{}", i + 1)),
                value: v.clone(),
            })
            .collect(),
        other => other
            .iter()
            .enumerate()
            .map(|(i, v)| Entry {
                key: Value::from(format!("{}", i + 1)),
                value: v.clone(),
            })
            .collect(),
    };
    Some(Value::Map(MultiMap::from_entries(entries)))
}

/// `$map(fname m extra…)` applies builtin `fname` to every value of `m`
/// (extras appended), keeping keys.  Absent results become empty strings.
fn map_apply(ip: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let fname = text(args, 0)?.to_ascii_lowercase();
    let subject = args.get(1)?.as_map()?.clone();
    let extras = args.get(2..).unwrap_or(&[]);

    let mut out = Vec::with_capacity(subject.size());
    for (key, value) in subject.pairs() {
        let mut call_args = Vec::with_capacity(1 + extras.len());
        call_args.push(value.clone());
        call_args.extend_from_slice(extras);
        let result = ip.call_named(&fname, &call_args).unwrap_or_default();
        out.push(Entry {
            key: key.clone(),
            value: result,
        });
    }
    Some(Value::Map(MultiMap::from_entries(out)))
}

fn len(ip: &mut Interpolator, args: &[Value]) -> Option<Value> {
    match args.first() {
        Some(Value::Map(m)) => super::num(m.size() as f64),
        _ => string::len(ip, args),
    }
}

fn concat(ip: &mut Interpolator, args: &[Value]) -> Option<Value> {
    match args.first() {
        Some(Value::Map(m)) => {
            let sep = text(args, 1).unwrap_or_default();
            let from = number_at(args, 2).map(|n| n as i64);
            let to = number_at(args, 3).map(|n| n as i64);
            Some(Value::Str(m.concat(&sep, from, to)))
        }
        _ => string::concat(ip, args),
    }
}

fn concats(ip: &mut Interpolator, args: &[Value]) -> Option<Value> {
    match args.first() {
        Some(Value::Map(m)) => {
            let sep = text(args, 1)?;
            let from = number_at(args, 2).map(|n| n as i64);
            let to = number_at(args, 3).map(|n| n as i64);
            Some(Value::Str(m.concat(&sep, from, to)))
        }
        _ => string::concats(ip, args),
    }
}

fn nthvalue(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let m = args.first()?.as_map()?;
    let n = number_at(args, 1)? as i64;
    let n = if n < 0 { m.size() as i64 + n + 1 } else { n };
    if n < 1 {
        return None;
    }
    m.entry(n as usize).map(|e| e.value.clone())
}

fn first(ip: &mut Interpolator, args: &[Value]) -> Option<Value> {
    match args.first() {
        Some(Value::Map(m)) => m.first().cloned(),
        _ => string::first(ip, args),
    }
}

fn last(ip: &mut Interpolator, args: &[Value]) -> Option<Value> {
    match args.first() {
        Some(Value::Map(m)) => m.last().cloned(),
        _ => string::last(ip, args),
    }
}

fn has(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let m = args.first()?.as_map()?;
    let key = text(args, 1)?;
    truth(m.has(&key))
}

/// Value of the first entry under `key`, the supplied default, or absent.
fn get(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let m = args.first()?.as_map()?;
    let key = text(args, 1)?;
    m.get(&key).cloned().or_else(|| args.get(2).cloned())
}

fn index(ip: &mut Interpolator, args: &[Value]) -> Option<Value> {
    match args.first() {
        Some(Value::Map(m)) => {
            let key = text(args, 1)?;
            m.index(&key)
                .map(Value::Map)
                .or_else(|| args.get(2).cloned())
        }
        _ => string::index(ip, args),
    }
}

fn unique(_: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let m = args.first()?.as_map()?;
    Some(Value::Map(m.unique()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::{Interpolator, Options};

    fn ip() -> Interpolator {
        Interpolator::new(Options::default())
    }

    fn sample() -> Value {
        Value::Map(MultiMap::from_pairs([
            (Value::from("a"), Value::from("1")),
            (Value::from("b"), Value::from("2")),
            (Value::from("a"), Value::from("3")),
        ]))
    }

    #[test]
    fn list_wraps_positional_args() {
        let v = list(&mut ip(), &[Value::from("x"), Value::from("y")]).unwrap();
        let m = v.as_map().unwrap();
        assert_eq!(m.get("1"), Some(&Value::from("x")));
        assert_eq!(m.get("2"), Some(&Value::from("y")));
    }

    #[test]
    fn list_rekeys_single_map() {
        let v = list(&mut ip(), &[sample()]).unwrap();
        let m = v.as_map().unwrap();
        assert_eq!(m.size(), 3);
        assert_eq!(m.get("3"), Some(&Value::from("3")));
        assert!(!m.has("a"));
    }

    #[test]
    fn map_applies_builtin_to_values() {
        let args = [Value::from("upper"), Value::Map(MultiMap::from_pairs([
            (Value::from("k"), Value::from("hi")),
        ]))];
        let v = map_apply(&mut ip(), &args).unwrap();
        assert_eq!(v.as_map().unwrap().get("k"), Some(&Value::from("HI")));
    }

    #[test]
    fn map_passes_extra_arguments() {
        let args = [
            Value::from("rep"),
            Value::Map(MultiMap::from_pairs([(Value::from("k"), Value::from("ab"))])),
            Value::from("2"),
        ];
        let v = map_apply(&mut ip(), &args).unwrap();
        assert_eq!(v.as_map().unwrap().get("k"), Some(&Value::from("abab")));
    }

    #[test]
    fn map_unknown_function_blanks_values() {
        let args = [Value::from("nosuch"), sample()];
        let v = map_apply(&mut ip(), &args).unwrap();
        assert_eq!(v.as_map().unwrap().get("a"), Some(&Value::from("")));
    }

    #[test]
    fn len_is_polymorphic() {
        assert_eq!(
            len(&mut ip(), &[sample()]).unwrap(),
            Value::from("3")
        );
        assert_eq!(
            len(&mut ip(), &[Value::from("hello")]).unwrap(),
            Value::from("5")
        );
    }

    #[test]
    fn concat_is_polymorphic() {
        assert_eq!(
            concat(&mut ip(), &[sample(), Value::from(",")]).unwrap(),
            Value::from("1,2,3")
        );
        assert_eq!(
            concat(&mut ip(), &[Value::from("a"), Value::from("b")]).unwrap(),
            Value::from("ab")
        );
    }

    #[test]
    fn concats_requires_separator_for_maps() {
        assert_eq!(
            concats(&mut ip(), &[sample(), Value::from("-")]).unwrap(),
            Value::from("1-2-3")
        );
    }

    #[test]
    fn nthvalue_one_indexed_with_wrap() {
        assert_eq!(
            nthvalue(&mut ip(), &[sample(), Value::from("2")]),
            Some(Value::from("2"))
        );
        assert_eq!(
            nthvalue(&mut ip(), &[sample(), Value::from("-1")]),
            Some(Value::from("3"))
        );
        assert_eq!(nthvalue(&mut ip(), &[sample(), Value::from("9")]), None);
    }

    #[test]
    fn first_last_values() {
        assert_eq!(first(&mut ip(), &[sample()]), Some(Value::from("1")));
        assert_eq!(last(&mut ip(), &[sample()]), Some(Value::from("3")));
        assert_eq!(
            first(&mut ip(), &[Value::from("word")]),
            Some(Value::from("w"))
        );
    }

    #[test]
    fn has_and_get() {
        assert_eq!(has(&mut ip(), &[sample(), Value::from("a")]), Some(Value::from("1")));
        assert_eq!(has(&mut ip(), &[sample(), Value::from("z")]), Some(Value::from("")));
        assert_eq!(get(&mut ip(), &[sample(), Value::from("a")]), Some(Value::from("1")));
        assert_eq!(
            get(&mut ip(), &[sample(), Value::from("z"), Value::from("dflt")]),
            Some(Value::from("dflt"))
        );
        assert_eq!(get(&mut ip(), &[sample(), Value::from("z")]), None);
    }

    #[test]
    fn index_submap_renumbered() {
        let v = index(&mut ip(), &[sample(), Value::from("a")]).unwrap();
        let m = v.as_map().unwrap();
        assert_eq!(m.size(), 2);
        assert_eq!(m.get("1"), Some(&Value::from("1")));
        assert_eq!(m.get("2"), Some(&Value::from("3")));
    }

    #[test]
    fn index_missing_key_uses_default_or_absent() {
        assert_eq!(
            index(&mut ip(), &[sample(), Value::from("z"), Value::from("d")]),
            Some(Value::from("d"))
        );
        assert_eq!(index(&mut ip(), &[sample(), Value::from("z")]), None);
    }

    #[test]
    fn index_delegates_to_string() {
        assert_eq!(
            index(&mut ip(), &[Value::from("hello"), Value::from("2")]),
            Some(Value::from("e"))
        );
    }

    #[test]
    fn unique_by_value() {
        let dup = Value::Map(MultiMap::from_pairs([
            (Value::from("x"), Value::from("1")),
            (Value::from("y"), Value::from("1")),
        ]));
        let v = unique(&mut ip(), &[dup]).unwrap();
        assert_eq!(v.as_map().unwrap().size(), 1);
    }
}
