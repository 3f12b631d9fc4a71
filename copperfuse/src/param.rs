//! Parameter formats and scanf-style integer conversion.

use std::fmt;

/// Conversion requested by the `%` part of an option template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `%s`: the parameter is copied as a string.
    Str,
    /// `%d`, `%u`, `%x`, ...: the parameter is converted to an integer.
    Int(Radix),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Decimal,
    Hex,
    Octal,
    /// `%i`: base taken from a `0x` or `0` prefix.
    Auto,
}

impl Format {
    /// Parse the text following a template separator, e.g. `%lu`.
    pub fn parse(spec: &str) -> Option<Format> {
        let rest = spec.strip_prefix('%')?;
        let conv = ["hh", "ll", "h", "l", "j", "z", "t"]
            .iter()
            .find_map(|m| rest.strip_prefix(m))
            .unwrap_or(rest);

        match conv {
            "s" => Some(Format::Str),
            "d" | "u" => Some(Format::Int(Radix::Decimal)),
            "i" => Some(Format::Int(Radix::Auto)),
            "x" | "X" => Some(Format::Int(Radix::Hex)),
            "o" => Some(Format::Int(Radix::Octal)),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Str => write!(f, "a string"),
            Format::Int(Radix::Decimal) => write!(f, "a decimal integer"),
            Format::Int(Radix::Hex) => write!(f, "a hexadecimal integer"),
            Format::Int(Radix::Octal) => write!(f, "an octal integer"),
            Format::Int(Radix::Auto) => write!(f, "an integer"),
        }
    }
}

/// Convert the leading integer of `s` the way `sscanf` would.
///
/// Leading whitespace and a sign are accepted, at least one digit is
/// required and anything after the digits is ignored. Returns `None` when
/// no digits were found or the value does not fit in an `i128`.
pub fn scan_integer(s: &str, radix: Radix) -> Option<i128> {
    let s = s.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let has_hex_prefix = |s: &str| {
        let b = s.as_bytes();
        b.len() > 2 && b[0] == b'0' && (b[1] | 0x20) == b'x' && b[2].is_ascii_hexdigit()
    };

    let (base, digits) = match radix {
        Radix::Decimal => (10, s),
        Radix::Octal => (8, s),
        Radix::Hex if has_hex_prefix(s) => (16, &s[2..]),
        Radix::Hex => (16, s),
        Radix::Auto if has_hex_prefix(s) => (16, &s[2..]),
        Radix::Auto if s.starts_with('0') => (8, s),
        Radix::Auto => (10, s),
    };

    let mut value: i128 = 0;
    let mut seen = 0;
    for c in digits.chars() {
        let d = match c.to_digit(base) {
            Some(d) => d,
            None => break,
        };
        value = value
            .checked_mul(i128::from(base))?
            .checked_add(i128::from(d))?;
        seen += 1;
    }

    if seen == 0 {
        return None;
    }
    Some(if negative { -value } else { value })
}
