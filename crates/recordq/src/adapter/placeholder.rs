//! `%s` / `%d` / `%f` placeholder binding.

use crate::error::{OrmError, OrmResult};
use crate::value::{DATETIME_FORMAT, Value};

/// Quote and escape a string literal the way `mysqli_real_escape_string`
/// does: backslash, quotes, NUL, `\n`, `\r` and `\x1a`.
pub fn quote_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x1a' => out.push_str("\\Z"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// SQL literal for a value bound through `%s`.
pub fn literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => i64::from(*b).to_string(),
        Value::Int(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Text(s) => quote_str(s),
        Value::DateTime(dt) => quote_str(&dt.format(DATETIME_FORMAT).to_string()),
        Value::List(items) => items.iter().map(literal).collect::<Vec<_>>().join(", "),
    }
}

/// Number of `%s`, `%d` and `%f` placeholders in `template` (`%%` excluded).
pub fn count_placeholders(template: &str) -> usize {
    let mut count = 0;
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c == '%' {
            match chars.next() {
                Some('s' | 'd' | 'f') => count += 1,
                _ => {}
            }
        }
    }
    count
}

/// Substitute `args` into `template`, in order.
///
/// ```
/// use recordq::Value;
/// use recordq::adapter::placeholder::bind;
///
/// let sql = bind("SELECT * FROM `t` WHERE `name` = %s LIMIT %d", &[
///     Value::from("o'neil"),
///     Value::from(10),
/// ]).unwrap();
/// assert_eq!(sql, "SELECT * FROM `t` WHERE `name` = 'o\\'neil' LIMIT 10");
/// ```
pub fn bind(template: &str, args: &[Value]) -> OrmResult<String> {
    let placeholders = count_placeholders(template);
    if placeholders != args.len() {
        return Err(OrmError::PlaceholderMismatch {
            placeholders,
            args: args.len(),
        });
    }

    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut args = args.iter();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some(spec @ ('s' | 'd' | 'f')) => {
                chars.next();
                let value = args.next().ok_or(OrmError::PlaceholderMismatch {
                    placeholders,
                    args: 0,
                })?;
                match spec {
                    's' => out.push_str(&literal(value)),
                    'd' => out.push_str(&value.to_i64_lossy().to_string()),
                    _ => out.push_str(&format!("{:.6}", value.to_f64_lossy())),
                }
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_in_order() {
        let sql = bind(
            "`a` = %s AND `b` = %s LIMIT %d",
            &[Value::from("x"), Value::Int(2), Value::from("5")],
        )
        .unwrap();
        assert_eq!(sql, "`a` = 'x' AND `b` = 2 LIMIT 5");
    }

    #[test]
    fn escapes_strings() {
        assert_eq!(quote_str(r#"it's a "test" \ "#), r#"'it\'s a \"test\" \\ '"#);
    }

    #[test]
    fn escapes_line_breaks_and_ctrl_z() {
        assert_eq!(quote_str("a\nb\r\x1a"), r"'a\nb\r\Z'");
        let sql = bind("%s", &[Value::from("line 1\nline 2")]).unwrap();
        assert_eq!(sql, r"'line 1\nline 2'");
    }

    #[test]
    fn literal_percent_and_float() {
        let sql = bind("`p` LIKE '100%%' AND `f` > %f", &[Value::Float(1.5)]).unwrap();
        assert_eq!(sql, "`p` LIKE '100%' AND `f` > 1.500000");
    }

    #[test]
    fn booleans_lists_and_datetimes() {
        let dt = chrono::NaiveDateTime::parse_from_str("2018-06-18 08:12:00", DATETIME_FORMAT)
            .unwrap();
        assert_eq!(literal(&Value::Bool(true)), "1");
        assert_eq!(literal(&Value::from(vec!["a", "b"])), "'a', 'b'");
        assert_eq!(literal(&Value::from(dt)), "'2018-06-18 08:12:00'");
    }

    #[test]
    fn count_mismatch_is_an_error() {
        let err = bind("%s %s", &[Value::Int(1)]).unwrap_err();
        assert_eq!(
            err,
            OrmError::PlaceholderMismatch {
                placeholders: 2,
                args: 1
            }
        );
        assert!(bind("%s", &[Value::Int(1), Value::Int(2)]).is_err());
    }
}
