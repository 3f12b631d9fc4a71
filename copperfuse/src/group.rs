//! Comma separated option groups, as given to `-o`.

use crate::error::{Error, Result};

/// Split an option group into its members.
///
/// Members are separated by unescaped commas. A backslash followed by
/// three octal digits (the first one `0`-`3`) stands for that byte; a
/// backslash followed by anything else stands for that character. A
/// trailing backslash is kept as is.
///
/// Fails with [`Error::InvalidParam`] if a decoded member is not valid
/// UTF-8 or holds a nul byte.
pub fn split_option_group(group: &str) -> Result<Vec<String>> {
    let s = group.as_bytes();
    let mut opts = Vec::new();
    let mut cur: Vec<u8> = Vec::new();
    cur.try_reserve_exact(s.len())?;
    let mut i = 0;

    while i < s.len() {
        match s[i] {
            b',' => {
                let opt = finish(group, &mut cur)?;
                opts.try_reserve(1)?;
                opts.push(opt);
                cur.try_reserve_exact(s.len() - i)?;
            }
            b'\\' if i + 1 < s.len() => {
                i += 1;
                match octal_escape(&s[i..]) {
                    Some(byte) => {
                        cur.push(byte);
                        i += 2;
                    }
                    None => cur.push(s[i]),
                }
            }
            c => cur.push(c),
        }
        i += 1;
    }
    let opt = finish(group, &mut cur)?;
    opts.try_reserve(1)?;
    opts.push(opt);
    Ok(opts)
}

fn octal_escape(s: &[u8]) -> Option<u8> {
    match s {
        [a @ b'0'..=b'3', b @ b'0'..=b'7', c @ b'0'..=b'7', ..] => {
            Some((a - b'0') * 0o100 + (b - b'0') * 0o10 + (c - b'0'))
        }
        _ => None,
    }
}

fn finish(group: &str, cur: &mut Vec<u8>) -> Result<String> {
    let invalid = || Error::InvalidParam {
        arg: group.to_string(),
        format: "UTF-8 option without nul bytes".to_string(),
    };
    let bytes = std::mem::take(cur);
    if bytes.contains(&0) {
        return Err(invalid());
    }
    String::from_utf8(bytes).map_err(|_| invalid())
}

/// Append `opt` to a comma separated option list.
pub fn add_opt(opts: &mut Option<String>, opt: &str) -> Result<()> {
    add_opt_common(opts, opt, false)
}

/// Append `opt` to a comma separated option list, escaping any `,` and
/// `\` it contains so it survives a later split.
pub fn add_opt_escaped(opts: &mut Option<String>, opt: &str) -> Result<()> {
    add_opt_common(opts, opt, true)
}

fn add_opt_common(opts: &mut Option<String>, opt: &str, esc: bool) -> Result<()> {
    let d = opts.get_or_insert_with(String::new);
    d.try_reserve(1 + opt.len() * 2)?;

    if !d.is_empty() {
        d.push(',');
    }
    for c in opt.chars() {
        if esc && (c == ',' || c == '\\') {
            d.push('\\');
        }
        d.push(c);
    }
    Ok(())
}
