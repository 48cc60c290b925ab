//! Text rendering of SQLite values for the model.
//!
//! Rows come out as tuple literals (`(1, 'Alice', None)`), table listings as
//! list literals (`['users', 'orders']`). Models read this format reliably.

use rusqlite::Row;
use rusqlite::types::ValueRef;

/// Render one column value.
pub fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "None".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => render_real(f),
        ValueRef::Text(bytes) => quote_str(&String::from_utf8_lossy(bytes)),
        ValueRef::Blob(bytes) => quote_bytes(bytes),
    }
}

/// Render a full row as a tuple literal.
pub fn render_row(row: &Row<'_>, column_count: usize) -> rusqlite::Result<String> {
    let values = (0..column_count)
        .map(|i| row.get_ref(i).map(render_value))
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(render_tuple(&values))
}

/// `()`, `(a,)` or `(a, b, ...)`.
pub fn render_tuple(values: &[String]) -> String {
    match values {
        [] => "()".to_string(),
        [single] => format!("({},)", single),
        _ => format!("({})", values.join(", ")),
    }
}

/// A list of strings as a list literal; `[]` when empty.
pub fn render_str_list<S: AsRef<str>>(items: &[S]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| quote_str(s.as_ref())).collect();
    format!("[{}]", quoted.join(", "))
}

/// Reals always carry a fractional part or an exponent.
pub fn render_real(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = f.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        // Rust prints "1.5e-5"; the expected form is "1.5e-05"
        let formatted = format!("{:e}", f);
        if let Some((mantissa, exponent)) = formatted.split_once('e') {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exponent),
            };
            return format!("{}e{}{:0>2}", mantissa, sign, digits);
        }
        return formatted;
    }

    let formatted = f.to_string();
    if formatted.contains('.') {
        formatted
    } else {
        format!("{}.0", formatted)
    }
}

fn pick_quote(has_single: bool, has_double: bool) -> char {
    if has_single && !has_double { '"' } else { '\'' }
}

/// Quote text, escaping backslashes, the quote character and control characters.
pub fn quote_str(s: &str) -> String {
    let quote = pick_quote(s.contains('\''), s.contains('"'));
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn quote_bytes(bytes: &[u8]) -> String {
    let quote = pick_quote(bytes.contains(&b'\''), bytes.contains(&b'"'));
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(quote);
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b as char == quote => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7e => out.push(b as char),
            b => out.push_str(&format!("\\x{:02x}", b)),
        }
    }
    out.push(quote);
    out
}
