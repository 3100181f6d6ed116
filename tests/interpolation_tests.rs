//! End-to-end interpolation tests: template in, string out.
//!
//! Each case runs the full pipeline (parse → postprocess → evaluate)
//! through the one-shot entry point with a standard token environment:
//! `1 = 100`, `token = value`, `other = s`.

use patter::{interpolate, Interpolator, MultiMap, Options, TokenMap, Value};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn default_tokens() -> TokenMap {
    let mut tokens = TokenMap::new();
    tokens.insert("1".to_owned(), Value::from("100"));
    tokens.insert("token".to_owned(), Value::from("value"));
    tokens.insert("other".to_owned(), Value::from("s"));
    tokens
}

fn run(template: &str) -> String {
    interpolate(template, default_tokens(), Options::default())
}

fn check_all(cases: &[(&str, &str)]) {
    for (template, expected) in cases {
        assert_eq!(&run(template), expected, "template {template:?}");
    }
}

// ── Escapes, tokens, literals ─────────────────────────────────────────────────

#[test]
fn escapes_yield_their_literal() {
    check_all(&[
        ("$$ $@ $) $( $: $;", "$ @ ) ( : ;"),
        ("$$token", "$token"),
        ("a$;b", "a;b"),
    ]);
}

#[test]
fn token_substitution() {
    check_all(&[
        ("$token$other", "values"),
        ("$token $other", "value s"),
        ("$1", "100"),
        ("$unbound", ""),
        ("x$unbound y", "x y"),
    ]);
}

#[test]
fn lone_specials_are_literal() {
    check_all(&[("100$", "100$"), ("a@b", "a@b"), ("fn()", "fn()")]);
}

#[test]
fn string_literals_inside_calls() {
    check_all(&[
        ("$str((hello world))", "hello world"),
        ("$str((a$)b))", "a)b"),
        // Literal regions are inert: no token substitution inside.
        ("$str(($token))", "$token"),
    ]);
}

// ── Calls ─────────────────────────────────────────────────────────────────────

#[test]
fn nested_calls() {
    check_all(&[
        ("$upper($token)", "VALUE"),
        ("$len($str(ab cd))", "4"),
        ("$add($len(abc) 1)", "4"),
    ]);
}

#[test]
fn unknown_function_contributes_nothing() {
    check_all(&[("a$nosuchfn(x)b", "ab")]);
}

#[test]
fn math_module_end_to_end() {
    check_all(&[
        ("$add(2 3)", "5"),
        ("$subtract(10 4)", "6"),
        ("$mul(6 7)", "42"),
        ("$div(7 2)", "3.5"),
        ("$pow(2 8)", "256"),
        ("$sqrt(81)", "9"),
        ("$floor(2.9)", "2"),
        ("$ceil(2.1)", "3"),
        ("$abs(-5)", "5"),
        ("$max(3 9 4)", "9"),
        ("$min(3 9 4)", "3"),
        ("$mod(7 3)", "1"),
        ("$num(007)", "7"),
        ("$isnan($div(0 0))", "1"),
        ("$add(one two)", ""),
    ]);
}

#[test]
fn boolean_module_end_to_end() {
    check_all(&[
        ("$if(1 (hello world))", "hello world"),
        ("$if($unbound hidden)", ""),
        ("$unless($unbound shown)", "shown"),
        ("$ifelse(1 yes no)", "yes"),
        ("$ifelse($unbound yes no)", "no"),
        ("$ifelse($unbound yes no way)", "noway"),
        ("$eq($token value)", "1"),
        ("$eq(1.0 1)", "1"),
        ("$neq(a b)", "1"),
        ("$gt(10 9)", "1"),
        ("$lt(10 9)", ""),
        ("$any($unbound b c)", "b"),
        ("$all(a b c)", "c"),
        ("$all(a $unbound c)", ""),
        ("$not($unbound)", "1"),
        ("$not(x)", ""),
    ]);
}

#[test]
fn string_module_end_to_end() {
    check_all(&[
        ("$upper(abc)", "ABC"),
        ("$lower(ABC)", "abc"),
        ("$capitalize(word)", "Word"),
        ("$reverse(abc)", "cba"),
        ("$trim((  pad  ))", "pad"),
        ("$len(hello)", "5"),
        ("$contains(foobar oba)", "1"),
        ("$startswith(foobar foo)", "1"),
        ("$endswith(foobar foo)", ""),
        ("$concat(a b c)", "abc"),
        ("$concats(- a b c)", "a-b-c"),
        ("$sub(hello 2 4)", "ell"),
        ("$sub(hello -3)", "llo"),
        ("$rep(ab 3)", "ababab"),
        ("$char(65 66)", "AB"),
        ("$byte(A)", "65"),
        ("$punctuate(hello)", "hello."),
        ("$punctuate(hello!)", "hello!"),
        ("$gsub(a1b2 (([0-9])) (<$$1>))", "a<1>b<2>"),
        ("$match(foo123 ([0-9]+))", "123"),
        ("$first(abc)$last(abc)", "ac"),
    ]);
}

// ── At-maps ───────────────────────────────────────────────────────────────────

#[test]
fn at_map_stringifies_to_first_value() {
    check_all(&[
        ("@(A;B;C)", "A"),
        ("@(k:v)", "v"),
        ("@()", ""),
        ("x@(A)y", "xAy"),
    ]);
}

#[test]
fn map_module_end_to_end() {
    check_all(&[
        ("$index(@(A:1;A:2) A)", "1"),
        ("$len(@(A;B;C))", "3"),
        ("$concat(@(a:1;b:2) -)", "1-2"),
        ("$concats(@(a:1;b:2) -)", "1-2"),
        ("$nthvalue(@(A;B;C) 2)", "B"),
        ("$first(@(a:1;b:2))$last(@(a:1;b:2))", "12"),
        ("$has(@(a:1) a)", "1"),
        ("$has(@(a:1) b)", ""),
        ("$get(@(a:1;a:2) a)", "1"),
        ("$get(@(a:1) z fallback)", "fallback"),
        ("$len($unique(@(x:1;y:1;z:2)))", "2"),
        ("$concats($list(a b c) .)", "a.b.c"),
        ("$concats($map(upper @(x:a;y:b)) -)", "A-B"),
    ]);
}

#[test]
fn at_map_construction_rules() {
    // Nested bare maps splice; map keys fan out; falsy keys drop.
    check_all(&[
        ("$len(@(@(A;B) @(C)))", "3"),
        ("$concats(@(@(A;B):C) ,)", "C,C"),
        ("$get(@(@(A;B):C) B)", "C"),
        ("$len(@($unbound:v))", "0"),
        ("$len(@(A;$unbound;B))", "2"),
    ]);
}

#[test]
fn at_map_entry_separator_edge_cases() {
    check_all(&[
        // A colon run behaves like a single separator.
        ("$get(@(a::b) a)", "b"),
        // A second separator after a value starts an empty-keyed entry,
        // which drops at construction.
        ("$len(@(a:b::c))", "1"),
    ]);
}

#[test]
fn tokens_can_carry_maps() {
    let mut tokens = default_tokens();
    tokens.insert(
        "colors".to_owned(),
        Value::Map(MultiMap::from_pairs([
            (Value::from("r"), Value::from("red")),
            (Value::from("g"), Value::from("green")),
        ])),
    );
    let out = interpolate("$get($colors g)", tokens, Options::default());
    assert_eq!(out, "green");
}

// ── Mutators ──────────────────────────────────────────────────────────────────

#[test]
fn set_and_read_back() {
    assert_eq!(
        interpolate("$set(_x 5)$_x", TokenMap::new(), Options::default()),
        "5"
    );
}

#[test]
fn set_respects_underscore_rule() {
    assert_eq!(
        interpolate("$set(plain 5)$plain", TokenMap::new(), Options::default()),
        ""
    );
    // Pre-bound names stay writable.
    let mut tokens = TokenMap::new();
    tokens.insert("plain".to_owned(), Value::from("old"));
    assert_eq!(
        interpolate("$set(plain new)$plain", tokens, Options::default()),
        "new"
    );
}

#[test]
fn set_without_underscore_rule() {
    let mut options = Options::default();
    options.require_custom_token_underscore = false;
    assert_eq!(interpolate("$set(x 5)$x", TokenMap::new(), options), "5");
}

#[test]
fn seeded_random_is_deterministic() {
    let template = "$randomseed(7)$random(100) $random(100) $random(100)";
    let a = interpolate(template, TokenMap::new(), Options::default());
    let b = interpolate(template, TokenMap::new(), Options::default());
    assert_eq!(a, b);
    for part in a.split(' ') {
        let n: i64 = part.parse().expect("integer output");
        assert!((1..=100).contains(&n));
    }
}

#[test]
fn choose_picks_an_argument() {
    let out = interpolate("$choose(a b c)", TokenMap::new(), Options::default());
    assert!(["a", "b", "c"].contains(&out.as_str()));
}

// ── Feature flags ─────────────────────────────────────────────────────────────

#[test]
fn functions_disabled_leave_syntax_alone() {
    let mut options = Options::default();
    options.allow_functions = false;
    let mut tokens = TokenMap::new();
    tokens.insert("upper".to_owned(), Value::from("f"));
    assert_eq!(interpolate("$upper(x)", tokens, options), "f(x)");
}

#[test]
fn tokens_disabled_leave_syntax_alone() {
    let mut options = Options::default();
    options.allow_tokens = false;
    let mut tokens = TokenMap::new();
    tokens.insert("name".to_owned(), Value::from("x"));
    assert_eq!(interpolate("$name $upper(y)", tokens, options), "$name Y");
}

#[test]
fn multimaps_disabled_leave_syntax_alone() {
    let mut options = Options::default();
    options.allow_multimaps = false;
    assert_eq!(
        interpolate("@(a:1)", TokenMap::new(), options),
        "@(a:1)"
    );
}

#[test]
fn library_include_narrows_the_table() {
    let mut options = Options::default();
    options.library_include = Some(["string".to_owned()].into());
    assert_eq!(
        interpolate("$upper(x)$add(1 2)", TokenMap::new(), options),
        "X"
    );
}

// ── Degradation ───────────────────────────────────────────────────────────────

#[test]
fn unterminated_call_degrades_to_token() {
    let mut tokens = TokenMap::new();
    tokens.insert("f".to_owned(), Value::from("F"));
    assert_eq!(
        interpolate("$f(never closed", tokens, Options::default()),
        "F(never closed"
    );
}

#[test]
fn unterminated_at_degrades_to_literal() {
    assert_eq!(
        interpolate("@(never closed", TokenMap::new(), Options::default()),
        "@(never closed"
    );
}

#[test]
fn errored_pattern_is_inspectable() {
    let mut options = Options::default();
    options.allow_tokens = false;
    let mut ip = Interpolator::new(options);
    ip.set_pattern("$f(oops");
    assert!(!ip.errors().is_empty());
    assert_eq!(ip.interpolate(None), "");
}
