//! S-expression helpers — plist lookup and event formatting.
//!
//! Config files, observation scripts, and the coach's event/status output
//! all use Emacs-style plists such as `(:t 66 :hands (...))`.

use lexpr::Value;

/// Find the value following `:key` in a plist.
/// Walks cons pairs directly.  Handles both `Value::Keyword("key")`
/// (elisp parser) and `Value::Symbol(":key")` (default parser) forms.
pub fn get_value<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let prefixed = format!(":{}", key);
    let mut current = value;
    while let Value::Cons(pair) = current {
        let is_key = match pair.car() {
            Value::Keyword(k) => k.as_ref() == key,
            Value::Symbol(s) => s.as_ref() == prefixed,
            _ => false,
        };
        if is_key {
            return match pair.cdr() {
                Value::Cons(next) => Some(next.car()),
                _ => None,
            };
        }
        current = pair.cdr();
    }
    None
}

/// Extract a plist value as a string.  Keywords lose their leading colon;
/// booleans render as `t`/`nil`.
pub fn get_keyword(value: &Value, key: &str) -> Option<String> {
    let val = get_value(value, key)?;
    Some(match val {
        Value::Keyword(v) => v.to_string(),
        Value::Symbol(v) => {
            let s = v.to_string();
            s.strip_prefix(':').unwrap_or(&s).to_string()
        }
        Value::String(v) => v.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => bool_sexp(*b).to_string(),
        Value::Null => "nil".to_string(),
        _ => val.to_string(),
    })
}

/// Extract an integer value from a plist.
pub fn get_int(value: &Value, key: &str) -> Option<i64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

/// Extract a floating-point value from a plist.
pub fn get_float(value: &Value, key: &str) -> Option<f64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

/// Extract a boolean value from a plist.
/// Treats "nil" as false and anything else as true.
pub fn get_bool(value: &Value, key: &str) -> Option<bool> {
    get_keyword(value, key).map(|s| s != "nil")
}

/// Elements of a proper list.  `nil` and `()` are empty; a non-list is
/// `None`.
pub fn list_items(value: &Value) -> Option<Vec<&Value>> {
    let mut items = Vec::new();
    let mut current = value;
    loop {
        match current {
            Value::Cons(pair) => {
                items.push(pair.car());
                current = pair.cdr();
            }
            Value::Null | Value::Nil => return Some(items),
            Value::Symbol(s) if s.as_ref() == "nil" => return Some(items),
            _ => return None,
        }
    }
}

/// Numeric value of a number node.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Escape a string for s-expression output.
pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Quote a string for s-expression output.
pub fn quote(s: &str) -> String {
    format!("\"{}\"", escape_string(s))
}

pub fn bool_sexp(b: bool) -> &'static str {
    if b {
        "t"
    } else {
        "nil"
    }
}

/// Format an event s-expression.
pub fn format_event(event_type: &str, fields: &[(&str, &str)]) -> String {
    let mut s = format!("(:type :event :event :{}", event_type);
    for (key, val) in fields {
        s.push_str(&format!(" :{} {}", key, val));
    }
    s.push(')');
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── escape_string ───────────────────────────────────────

    #[test]
    fn test_escape_string_plain() {
        assert_eq!(escape_string("hello"), "hello");
    }

    #[test]
    fn test_escape_string_quotes() {
        assert_eq!(escape_string("say \"hi\""), "say \\\"hi\\\"");
    }

    #[test]
    fn test_escape_string_backslash() {
        assert_eq!(escape_string("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("Make circular motions"), "\"Make circular motions\"");
    }

    // ── get_keyword ─────────────────────────────────────────

    #[test]
    fn test_get_keyword_from_plist() {
        let v = lexpr::from_str("(:phase :timing :target-ms 20000)").unwrap();
        assert_eq!(get_keyword(&v, "phase"), Some("timing".to_string()));
        assert_eq!(get_keyword(&v, "target-ms"), Some("20000".to_string()));
    }

    #[test]
    fn test_get_keyword_string_value() {
        let v = lexpr::from_str("(:text \"Show both hands\")").unwrap();
        assert_eq!(get_keyword(&v, "text"), Some("Show both hands".to_string()));
    }

    #[test]
    fn test_get_keyword_missing_key() {
        let v = lexpr::from_str("(:t 66)").unwrap();
        assert_eq!(get_keyword(&v, "hands"), None);
    }

    #[test]
    fn test_get_keyword_empty_list() {
        let v = lexpr::from_str("()").unwrap();
        assert_eq!(get_keyword(&v, "t"), None);
    }

    #[test]
    fn test_get_keyword_trailing_key() {
        let v = lexpr::from_str("(:t)").unwrap();
        assert_eq!(get_keyword(&v, "t"), None);
    }

    // ── get_int / get_float / get_bool ──────────────────────

    #[test]
    fn test_get_int() {
        let v = lexpr::from_str("(:t 132 :x -100 :name :foo)").unwrap();
        assert_eq!(get_int(&v, "t"), Some(132));
        assert_eq!(get_int(&v, "x"), Some(-100));
        assert_eq!(get_int(&v, "name"), None);
    }

    #[test]
    fn test_get_float() {
        let v = lexpr::from_str("(:threshold 0.15 :whole 10)").unwrap();
        let t = get_float(&v, "threshold").unwrap();
        assert!((t - 0.15).abs() < 1e-9);
        assert_eq!(get_float(&v, "whole"), Some(10.0));
    }

    #[test]
    fn test_get_bool() {
        let v = lexpr::from_str("(:on t :off nil)").unwrap();
        assert_eq!(get_bool(&v, "on"), Some(true));
        assert_eq!(get_bool(&v, "off"), Some(false));
    }

    // ── list_items ──────────────────────────────────────────

    #[test]
    fn test_list_items() {
        let v = lexpr::from_str("(:hands ((1 2 3) (4 5 6)))").unwrap();
        let hands = get_value(&v, "hands").unwrap();
        let items = list_items(hands).unwrap();
        assert_eq!(items.len(), 2);
        let first = list_items(items[0]).unwrap();
        assert_eq!(first.iter().filter_map(|n| as_number(n)).count(), 3);
    }

    #[test]
    fn test_list_items_empty_and_non_list() {
        let v = lexpr::from_str("(:hands () :t 5)").unwrap();
        assert_eq!(list_items(get_value(&v, "hands").unwrap()).map(|l| l.len()), Some(0));
        assert!(list_items(get_value(&v, "t").unwrap()).is_none());
    }

    // ── format_event ────────────────────────────────────────

    #[test]
    fn test_format_event_no_fields() {
        let e = format_event("test", &[]);
        assert_eq!(e, "(:type :event :event :test)");
    }

    #[test]
    fn test_format_event_with_fields() {
        let e = format_event("phase-changed", &[("from", ":idle"), ("to", ":arming")]);
        assert!(e.starts_with("(:type :event :event :phase-changed"));
        assert!(e.contains(":from :idle"));
        assert!(e.contains(":to :arming"));
        assert!(e.ends_with(')'));
    }

    #[test]
    fn test_format_event_parseable_fields() {
        let e = format_event("completed", &[("elapsed-ms", "20000")]);
        let v = lexpr::from_str(&e).unwrap();
        assert_eq!(get_keyword(&v, "type"), Some("event".to_string()));
        assert_eq!(get_keyword(&v, "event"), Some("completed".to_string()));
        assert_eq!(get_int(&v, "elapsed-ms"), Some(20000));
    }
}
