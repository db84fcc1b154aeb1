//! Equality and ordering of JSON values, plus the sort driver used by every ordering operation.
//!
//! Ordering is deliberately loose so that heterogeneous item lists can still be sorted:
//!
//! - two strings compare by UTF-16 code units;
//! - every other pair is coerced with [`to_number`] and compared numerically. A `NaN` on either
//!   side makes `less_than` false.
//!
//! | value            | [`to_number`]                                                  |
//! |------------------|----------------------------------------------------------------|
//! | absent (`None`)  | `NaN`                                                          |
//! | `null`           | `0`                                                            |
//! | `false` / `true` | `0` / `1`                                                      |
//! | number           | itself                                                         |
//! | string           | trimmed; `""` → `0`; `0x`/`0o`/`0b` literals; `Infinity`; decimal literal; otherwise `NaN` |
//! | array            | elements joined with `,` (null → empty), then as a string      |
//! | record           | `NaN`                                                          |
//!
//! Because of `NaN`, comparators built on [`less_than`] are not total orders. [`sorted_order`] is a
//! merge sort that accepts such comparators (and fallible ones) without panicking.
//!
//! Grouping equal values needs a total order instead: [`equivalence_order`] ranks by JSON type and
//! then by content, and reports `Equal` exactly when [`equals`] holds.

use std::cmp::Ordering;

use crate::types::Value;

/// Deep structural equality.
///
/// Absent equals only absent; numbers compare by value (`1 == 1.0`); records compare regardless of
/// key order.
pub fn equals(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => values_equal(a, b),
        _ => false,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| values_equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(key, l)| y.get(key).is_some_and(|r| values_equal(l, r)))
        }
        _ => a == b,
    }
}

/// Loose "is `a` ordered before `b`" test. See the module docs for the coercion table.
pub fn less_than(a: Option<&Value>, b: Option<&Value>) -> bool {
    if let (Some(Value::String(x)), Some(Value::String(y))) = (a, b) {
        return x.encode_utf16().lt(y.encode_utf16());
    }
    to_number(a) < to_number(b)
}

/// Three-way comparison built from [`equals`] and [`less_than`].
///
/// Unequal values for which `less_than` is false order as [`Ordering::Greater`], so
/// `compare_values(a, b)` and `compare_values(b, a)` may both be `Greater`.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    if equals(a, b) {
        Ordering::Equal
    } else if less_than(a, b) {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// Total order over values whose `Equal` classes are exactly those of [`equals`].
///
/// Values rank `null < bool < number < string < array < record`. Arrays compare element-wise, then
/// by length; records compare their entries in key order, so key insertion order is ignored.
pub fn equivalence_order(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y)
            .map(|(l, r)| equivalence_order(l, r))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Value::Object(x), Value::Object(y)) => {
            let mut left: Vec<_> = x.iter().collect();
            let mut right: Vec<_> = y.iter().collect();
            left.sort_unstable_by(|l, r| l.0.cmp(r.0));
            right.sort_unstable_by(|l, r| l.0.cmp(r.0));
            left.iter()
                .zip(&right)
                .map(|((lk, lv), (rk, rv))| lk.cmp(rk).then_with(|| equivalence_order(lv, rv)))
                .find(|ord| ord.is_ne())
                .unwrap_or_else(|| left.len().cmp(&right.len()))
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Numeric coercion used by [`less_than`].
pub fn to_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => string_to_number(s),
        Some(Value::Array(items)) => string_to_number(&join_array(items)),
        Some(Value::Object(_)) => f64::NAN,
    }
}

fn join_array(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Array(inner) => join_array(inner),
            Value::Object(_) => "[object Object]".to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn string_to_number(raw: &str) -> f64 {
    let s = raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    if s.is_empty() {
        return 0.0;
    }
    if let Some(n) = radix_literal(s) {
        return n;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if is_decimal_literal(s) {
        s.parse::<f64>().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

// `Some` when `s` looks like a `0x`/`0o`/`0b` literal; signed or malformed ones are NaN.
fn radix_literal(s: &str) -> Option<f64> {
    let (body, signed) = match s.strip_prefix(['+', '-']) {
        Some(rest) => (rest, true),
        None => (s, false),
    };
    let prefix = body.get(..2)?.to_ascii_lowercase();
    let radix = match prefix.as_str() {
        "0x" => 16,
        "0o" => 8,
        "0b" => 2,
        _ => return None,
    };
    let digits = &body[2..];
    if signed || digits.is_empty() {
        return Some(f64::NAN);
    }

    let mut acc = 0.0;
    for c in digits.chars() {
        let Some(d) = c.to_digit(radix) else {
            return Some(f64::NAN);
        };
        acc = acc * f64::from(radix) + f64::from(d);
    }
    Some(acc)
}

fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }
    if digits == 0 {
        return false;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }
    i == bytes.len()
}

/// Sort the indices `0..len` with `compare`, returning them in sorted order.
///
/// Bottom-up merge sort: ties keep their input order, non-total comparators are tolerated, and
/// the first comparator error aborts the sort.
pub fn sorted_order<E, F>(len: usize, mut compare: F) -> Result<Vec<usize>, E>
where
    F: FnMut(usize, usize) -> Result<Ordering, E>,
{
    let mut order: Vec<usize> = (0..len).collect();
    let mut merged = vec![0usize; len];

    let mut width = 1;
    while width < len {
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut left, mut right, mut out) = (start, mid, start);

            while left < mid && right < end {
                if compare(order[left], order[right])? == Ordering::Greater {
                    merged[out] = order[right];
                    right += 1;
                } else {
                    merged[out] = order[left];
                    left += 1;
                }
                out += 1;
            }
            merged[out..out + (mid - left)].copy_from_slice(&order[left..mid]);
            out += mid - left;
            merged[out..out + (end - right)].copy_from_slice(&order[right..end]);

            start = end;
        }
        std::mem::swap(&mut order, &mut merged);
        width *= 2;
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::{compare_values, equals, equivalence_order, less_than, sorted_order, to_number};
    use crate::types::Value;
    use serde_json::json;
    use std::cmp::Ordering;
    use std::convert::Infallible;

    #[test]
    fn equality_is_deep_and_numeric() {
        assert!(equals(Some(&json!(1)), Some(&json!(1.0))));
        assert!(equals(
            Some(&json!({"a": [1, {"b": null}], "c": "x"})),
            Some(&json!({"c": "x", "a": [1, {"b": null}]}))
        ));
        assert!(!equals(Some(&json!([1, 2])), Some(&json!([2, 1]))));
        assert!(!equals(Some(&json!({"a": 1})), Some(&json!({"a": 1, "b": 2}))));
        assert!(!equals(Some(&json!("1")), Some(&json!(1))));
        assert!(equals(None, None));
        assert!(!equals(None, Some(&Value::Null)));
    }

    #[test]
    fn coercion_table_per_type() {
        assert!(to_number(None).is_nan());
        assert_eq!(to_number(Some(&json!(null))), 0.0);
        assert_eq!(to_number(Some(&json!(false))), 0.0);
        assert_eq!(to_number(Some(&json!(true))), 1.0);
        assert_eq!(to_number(Some(&json!(-2.5))), -2.5);
        assert_eq!(to_number(Some(&json!(7))), 7.0);
        assert!(to_number(Some(&json!({"a": 1}))).is_nan());
        assert!(to_number(Some(&json!({}))).is_nan());
    }

    #[test]
    fn string_coercion_follows_numeric_literal_rules() {
        let cases: &[(&str, f64)] = &[
            ("", 0.0),
            ("   ", 0.0),
            (" 42 ", 42.0),
            ("-3", -3.0),
            ("+3", 3.0),
            ("1e3", 1000.0),
            ("1E-1", 0.1),
            (".5", 0.5),
            ("5.", 5.0),
            ("0x1F", 31.0),
            ("0b101", 5.0),
            ("0o17", 15.0),
            ("Infinity", f64::INFINITY),
            ("-Infinity", f64::NEG_INFINITY),
        ];
        for (input, expected) in cases {
            assert_eq!(to_number(Some(&json!(input))), *expected, "input {input:?}");
        }

        for input in ["abc", "-0x10", "0x", "0b102", "inf", "NaN", "1_000", ".", "1e", "12px"] {
            assert!(to_number(Some(&json!(input))).is_nan(), "input {input:?}");
        }
    }

    #[test]
    fn array_coercion_goes_through_joined_string() {
        assert_eq!(to_number(Some(&json!([]))), 0.0);
        assert_eq!(to_number(Some(&json!([5]))), 5.0);
        assert_eq!(to_number(Some(&json!([[7]]))), 7.0);
        assert_eq!(to_number(Some(&json!([null]))), 0.0);
        assert_eq!(to_number(Some(&json!([" 8 "]))), 8.0);
        assert!(to_number(Some(&json!([1, 2]))).is_nan());
        assert!(to_number(Some(&json!([true]))).is_nan());
        assert!(to_number(Some(&json!([{}]))).is_nan());
    }

    #[test]
    fn less_than_over_every_type_pair() {
        // One representative per type with its coerced number.
        let table: Vec<(Option<Value>, f64)> = vec![
            (None, f64::NAN),
            (Some(json!(null)), 0.0),
            (Some(json!(true)), 1.0),
            (Some(json!(2.5)), 2.5),
            (Some(json!("10")), 10.0),
            (Some(json!([3])), 3.0),
            (Some(json!({"k": 1})), f64::NAN),
        ];

        for (a, na) in &table {
            for (b, nb) in &table {
                let both_strings = matches!((a, b), (Some(Value::String(_)), Some(Value::String(_))));
                if both_strings {
                    continue;
                }
                assert_eq!(
                    less_than(a.as_ref(), b.as_ref()),
                    na < nb,
                    "less_than({a:?}, {b:?})"
                );
            }
        }
    }

    #[test]
    fn strings_compare_by_utf16_code_units() {
        let lt = |a: &str, b: &str| less_than(Some(&json!(a)), Some(&json!(b)));
        assert!(lt("10", "9"));
        assert!(lt("B", "a"));
        assert!(lt("", "a"));
        assert!(!lt("b", "a"));
        // U+1F600 encodes as a surrogate pair starting 0xD83D, which sorts below U+FF5E.
        assert!(lt("\u{1F600}", "\u{FF5E}"));
        assert!(!lt("\u{FF5E}", "\u{1F600}"));
    }

    #[test]
    fn compare_values_is_not_total_with_absent_operands() {
        let one = json!(1);
        assert_eq!(compare_values(None, Some(&one)), Ordering::Greater);
        assert_eq!(compare_values(Some(&one), None), Ordering::Greater);
        assert_eq!(compare_values(Some(&one), Some(&json!(2))), Ordering::Less);
        assert_eq!(compare_values(Some(&one), Some(&json!(1.0))), Ordering::Equal);
    }

    #[test]
    fn equivalence_order_agrees_with_equals() {
        let values = [
            json!(null),
            json!(false),
            json!(true),
            json!(0),
            json!(-0.0),
            json!(1),
            json!(1.0),
            json!(2.5),
            json!(""),
            json!("x"),
            json!("1"),
            json!([]),
            json!([1, 2]),
            json!([1.0, 2]),
            json!([3, 4]),
            json!([1, 2, 3]),
            json!({}),
            json!({"x": 1, "y": [null]}),
            json!({"y": [null], "x": 1.0}),
            json!({"x": 2}),
            json!({"z": 1}),
        ];
        for a in &values {
            for b in &values {
                let ord = equivalence_order(a, b);
                assert_eq!(ord.is_eq(), equals(Some(a), Some(b)), "{a} vs {b}");
                assert_eq!(ord.reverse(), equivalence_order(b, a), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn equivalence_order_is_transitive_where_less_than_is_not() {
        // null < "x" fails both ways under less_than; the total order still ranks them.
        let (null, x, obj) = (json!(null), json!("x"), json!({"k": 1}));
        assert_eq!(compare_values(Some(&null), Some(&x)), Ordering::Greater);
        assert_eq!(compare_values(Some(&x), Some(&null)), Ordering::Greater);
        assert_eq!(equivalence_order(&null, &x), Ordering::Less);
        assert_eq!(equivalence_order(&x, &obj), Ordering::Less);
        assert_eq!(equivalence_order(&null, &obj), Ordering::Less);
    }

    #[test]
    fn sorted_order_is_stable() {
        let keys = [3, 1, 2, 1, 3, 0];
        let order = sorted_order::<Infallible, _>(keys.len(), |a, b| Ok(keys[a].cmp(&keys[b])))
            .unwrap();
        assert_eq!(order, vec![5, 1, 3, 2, 0, 4]);
    }

    #[test]
    fn sorted_order_tolerates_non_total_comparator() {
        let values: Vec<Option<Value>> = (0..200)
            .map(|i| if i % 3 == 0 { None } else { Some(json!(i % 17)) })
            .collect();
        let order = sorted_order::<Infallible, _>(values.len(), |a, b| {
            Ok(compare_values(values[a].as_ref(), values[b].as_ref()))
        })
        .unwrap();

        let mut seen = order.clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..200).collect::<Vec<_>>());
    }

    #[test]
    fn sorted_order_propagates_comparator_error() {
        let err = sorted_order(4, |a, b| if a == 3 || b == 3 { Err("boom") } else { Ok(a.cmp(&b)) })
            .unwrap_err();
        assert_eq!(err, "boom");
    }

    #[test]
    fn sorted_order_handles_trivial_lengths() {
        let never = |_: usize, _: usize| -> Result<Ordering, Infallible> { unreachable!() };
        assert_eq!(sorted_order(0, never).unwrap(), Vec::<usize>::new());
        assert_eq!(sorted_order(1, never).unwrap(), vec![0]);
    }
}
