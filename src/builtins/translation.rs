//! Translation adapters.
//!
//! The engine does not own a message catalog; hosts that have one install a
//! [`Translator`] through the evaluator options.  Without a backend both
//! adapters produce nothing useful: `$gettext` yields the empty string and
//! `$gettextornull` is absent.

use super::{joined, Builtin, Handler};
use crate::interp::Interpolator;
use crate::value::Value;

/// Externally supplied message lookup.
pub trait Translator {
    /// The translated message for `key`, or `None` when the catalog has no
    /// entry.
    fn lookup(&self, key: &str) -> Option<String>;
}

pub(super) fn entries() -> Vec<Builtin> {
    fn b(name: &'static str, handler: Handler) -> Builtin {
        Builtin {
            module: "translation",
            name,
            handler,
        }
    }
    vec![b("gettext", gettext), b("gettextornull", gettextornull)]
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// Translate, falling back to the key itself on a catalog miss.
fn gettext(ip: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let key = joined(args);
    let Some(backend) = ip.translator() else {
        return Some(Value::Str(String::new()));
    };
    let out = backend.lookup(&key).unwrap_or(key);
    Some(Value::Str(out))
}

/// Translate, staying absent on a catalog miss.
fn gettextornull(ip: &mut Interpolator, args: &[Value]) -> Option<Value> {
    let key = joined(args);
    let backend = ip.translator()?;
    backend.lookup(&key).map(Value::Str)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
