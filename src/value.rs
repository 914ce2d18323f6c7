use std::fmt;

/// Scalar accepted by [`Cache::save`](crate::Cache::save).
///
/// Every variant is written to the store as bytes: strings as utf-8, bytes
/// unchanged, integers as decimal text and floats through [`float_repr`]
/// (`1.0`, `2.5`, `1e+20`).
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// utf-8 text
    Str(String),
    /// raw bytes
    Bytes(Vec<u8>),
    /// signed integer
    Int(i64),
    /// double precision float
    Float(f64),
}

impl StoredValue {
    /// Bytes as they are written to the store
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            StoredValue::Str(s) => s.as_bytes().to_vec(),
            StoredValue::Bytes(b) => b.clone(),
            StoredValue::Int(n) => n.to_string().into_bytes(),
            StoredValue::Float(f) => float_repr(*f).into_bytes(),
        }
    }
}

/// Literal form used in the call history: `'text'`, `b'raw'`, `42`, `2.5`
impl fmt::Display for StoredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredValue::Str(s) => {
                let quote = pick_quote(s.contains('\''), s.contains('"'));
                write!(f, "{}", quote)?;
                for c in s.chars() {
                    match c {
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\r' => f.write_str("\\r")?,
                        '\t' => f.write_str("\\t")?,
                        c if c == quote => write!(f, "\\{}", c)?,
                        c if c.is_control() => match c as u32 {
                            n @ 0..=0xff => write!(f, "\\x{:02x}", n)?,
                            n @ 0x100..=0xffff => write!(f, "\\u{:04x}", n)?,
                            n => write!(f, "\\U{:08x}", n)?,
                        },
                        c => write!(f, "{}", c)?,
                    }
                }
                write!(f, "{}", quote)
            }
            StoredValue::Bytes(b) => f.write_str(&byte_literal(b)),
            StoredValue::Int(n) => write!(f, "{}", n),
            StoredValue::Float(x) => f.write_str(&float_repr(*x)),
        }
    }
}

impl From<String> for StoredValue {
    fn from(s: String) -> Self {
        StoredValue::Str(s)
    }
}

impl From<&str> for StoredValue {
    fn from(s: &str) -> Self {
        StoredValue::Str(s.to_string())
    }
}

impl From<Vec<u8>> for StoredValue {
    fn from(b: Vec<u8>) -> Self {
        StoredValue::Bytes(b)
    }
}

impl From<&[u8]> for StoredValue {
    fn from(b: &[u8]) -> Self {
        StoredValue::Bytes(b.to_vec())
    }
}

impl From<i64> for StoredValue {
    fn from(n: i64) -> Self {
        StoredValue::Int(n)
    }
}

impl From<i32> for StoredValue {
    fn from(n: i32) -> Self {
        StoredValue::Int(n.into())
    }
}

impl From<u32> for StoredValue {
    fn from(n: u32) -> Self {
        StoredValue::Int(n.into())
    }
}

impl From<f64> for StoredValue {
    fn from(x: f64) -> Self {
        StoredValue::Float(x)
    }
}

// single quotes unless the text holds a single quote and no double quote
fn pick_quote(has_single: bool, has_double: bool) -> char {
    if has_single && !has_double {
        '"'
    } else {
        '\''
    }
}

/// Render bytes as a `b'...'` literal, escaping anything outside printable ascii.
pub fn byte_literal(bytes: &[u8]) -> String {
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
                out.push(quote);
            }
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{:02x}", b)),
        }
    }
    out.push(quote);
    out
}

/// Shortest decimal text that reads back to `x`.
///
/// Fixed notation with at least one fractional digit for exponents in
/// `-4..16`, otherwise scientific with a signed exponent of at least two
/// digits (`1e+20`, `1.5e-07`). Non finite values are `nan`, `inf`, `-inf`.
pub fn float_repr(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    let sign = if x.is_sign_negative() { "-" } else { "" };
    if x.is_infinite() {
        return format!("{}inf", sign);
    }
    // `{:e}` gives the shortest round-trip digits, e.g. `1.5e-7`
    let sci = format!("{:e}", x.abs());
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    if (-4..16).contains(&exp) {
        let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
        let body = if exp >= 0 {
            let int_len = exp as usize + 1;
            if digits.len() > int_len {
                format!("{}.{}", &digits[..int_len], &digits[int_len..])
            } else {
                format!("{}{}.0", digits, "0".repeat(int_len - digits.len()))
            }
        } else {
            format!("0.{}{}", "0".repeat((-exp - 1) as usize), digits)
        };
        format!("{}{}", sign, body)
    } else {
        let exp_sign = if exp < 0 { '-' } else { '+' };
        format!("{}{}e{}{:02}", sign, mantissa, exp_sign, exp.abs())
    }
}

/// Render positional arguments as a tuple literal, `('foo',)` for a single one.
pub fn tuple_literal(args: &[StoredValue]) -> String {
    let items: Vec<String> = args.iter().map(ToString::to_string).collect();
    if items.len() == 1 {
        format!("({},)", items[0])
    } else {
        format!("({})", items.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_scalars_as_text() {
        assert_eq!(StoredValue::from("foo").to_bytes(), b"foo");
        assert_eq!(StoredValue::from(-42).to_bytes(), b"-42");
        assert_eq!(StoredValue::from(1.0).to_bytes(), b"1.0");
        assert_eq!(StoredValue::from(3.25).to_bytes(), b"3.25");
        assert_eq!(StoredValue::from(vec![0u8, 255]).to_bytes(), vec![0u8, 255]);
    }

    #[test]
    fn floats_render_like_repr() {
        let cases = [
            (1e20, "1e+20"),
            (1e-5, "1e-05"),
            (1.5e-7, "1.5e-07"),
            (1e16, "1e+16"),
            (1e15, "1000000000000000.0"),
            (123.456, "123.456"),
            (0.0001, "0.0001"),
            (0.0, "0.0"),
            (-0.0, "-0.0"),
            (-2.5, "-2.5"),
            (1.2345e100, "1.2345e+100"),
            (f64::NAN, "nan"),
            (f64::INFINITY, "inf"),
            (f64::NEG_INFINITY, "-inf"),
        ];
        for (x, expected) in cases {
            assert_eq!(float_repr(x), expected);
            assert_eq!(StoredValue::from(x).to_bytes(), expected.as_bytes());
        }
        assert_eq!(tuple_literal(&[1e20.into()]), "(1e+20,)");
    }

    #[test]
    fn tuple_of_one_keeps_trailing_comma() {
        assert_eq!(tuple_literal(&["foo".into()]), "('foo',)");
        assert_eq!(tuple_literal(&[7.into()]), "(7,)");
        assert_eq!(tuple_literal(&["a".into(), 1.into()]), "('a', 1)");
        assert_eq!(tuple_literal(&[]), "()");
    }

    #[test]
    fn escapes_quotes_and_control_bytes() {
        assert_eq!(StoredValue::from("it's").to_string(), "\"it's\"");
        assert_eq!(StoredValue::from("say \"hi\"").to_string(), "'say \"hi\"'");
        assert_eq!(StoredValue::from("it's \"x\"").to_string(), "'it\\'s \"x\"'");
        assert_eq!(tuple_literal(&["a\0b".into()]), "('a\\x00b',)");
        assert_eq!(StoredValue::from("\u{7f}\u{85}").to_string(), "'\\x7f\\x85'");
        assert_eq!(byte_literal(b"it's"), "b\"it's\"");
        assert_eq!(byte_literal(b"it's \""), "b'it\\'s \"'");
        assert_eq!(byte_literal(b"a\nb\x00"), "b'a\\nb\\x00'");
        assert_eq!(StoredValue::from(&b"raw"[..]).to_string(), "b'raw'");
    }
}
