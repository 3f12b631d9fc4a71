//! Option templates and option tables.
//!
//! A template describes one recognizable option form. The forms are:
//!
//! 1. `-x`, `--foo`: match only themselves.
//! 2. `foo`, `foo-bar`: match inside an option group (`-ofoo`, `-o foo,bar`).
//! 3. `--foo=`, `bar=`: like 1) and 2) but take a parameter.
//! 4. `--foo=%lu`, `bar=%s`: same matching as 3), and the parameter is
//!    converted and stored in the target field.
//! 5. `-x `: matches `-xparam` or `-x param` as two separate arguments.
//! 6. `-x %s`: combination of 4) and 5).
//!
//! A table is scanned top to bottom and every matching entry fires, so
//! several entries sharing a template can each drive a different field.

use std::fmt;

use crate::args::dup_arg;
use crate::error::{Error, Result};
use crate::param::{scan_integer, Format};

// ============================================================================
// Keys
// ============================================================================

/// Key handed to the processing callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A flag-shaped argument no template matched.
    Opt,
    /// A positional argument.
    NonOpt,
    /// Keep the argument without calling the callback.
    Keep,
    /// Drop the argument without calling the callback.
    Discard,
    /// Caller-defined key attached to a template.
    User(i32),
}

// ============================================================================
// Targets
// ============================================================================

/// What happens when a template matches: a field of the caller's
/// configuration is written, or the callback is invoked with a key.
pub enum Target<T> {
    Key(Key),
    Bool(fn(&mut T) -> &mut bool),
    Int(fn(&mut T) -> &mut i32),
    Uint(fn(&mut T) -> &mut u32),
    Long(fn(&mut T) -> &mut i64),
    Ulong(fn(&mut T) -> &mut u64),
    Str(fn(&mut T) -> &mut String),
    OptStr(fn(&mut T) -> &mut Option<String>),
}

impl<T> Target<T> {
    fn name(&self) -> &'static str {
        match self {
            Target::Key(_) => "key",
            Target::Bool(_) => "bool",
            Target::Int(_) => "i32",
            Target::Uint(_) => "u32",
            Target::Long(_) => "i64",
            Target::Ulong(_) => "u64",
            Target::Str(_) => "String",
            Target::OptStr(_) => "Option<String>",
        }
    }

    fn is_string(&self) -> bool {
        matches!(self, Target::Str(_) | Target::OptStr(_))
    }

    /// Whether a literal `value` can be stored without truncation.
    fn holds(&self, value: i64) -> bool {
        match self {
            Target::Key(_) | Target::Bool(_) | Target::Long(_) => true,
            Target::Int(_) => i32::try_from(value).is_ok(),
            Target::Uint(_) => u32::try_from(value).is_ok(),
            Target::Ulong(_) => u64::try_from(value).is_ok(),
            Target::Str(_) | Target::OptStr(_) => false,
        }
    }

    /// Store the literal value of a flag template. The value was range
    /// checked when the option was built.
    pub(crate) fn set_flag(&self, data: &mut T, value: i64) {
        match self {
            Target::Bool(f) => *f(data) = value != 0,
            Target::Int(f) => *f(data) = value as i32,
            Target::Uint(f) => *f(data) = value as u32,
            Target::Long(f) => *f(data) = value,
            Target::Ulong(f) => *f(data) = value as u64,
            Target::Key(_) | Target::Str(_) | Target::OptStr(_) => {}
        }
    }

    /// Convert `param` according to `format` and store it. `arg` is the
    /// whole option, used for error reporting.
    pub(crate) fn set_param(
        &self,
        data: &mut T,
        format: Format,
        param: &str,
        arg: &str,
    ) -> Result<()> {
        let invalid = || Error::InvalidParam {
            arg: arg.to_string(),
            format: format.to_string(),
        };

        let radix = match format {
            Format::Str => {
                let copy = dup_arg(param)?;
                match self {
                    Target::Str(f) => *f(data) = copy,
                    Target::OptStr(f) => *f(data) = Some(copy),
                    _ => return Err(invalid()),
                }
                return Ok(());
            }
            Format::Int(radix) => radix,
        };

        let n = scan_integer(param, radix).ok_or_else(invalid)?;
        match self {
            Target::Int(f) => *f(data) = i32::try_from(n).map_err(|_| invalid())?,
            Target::Uint(f) => *f(data) = u32::try_from(n).map_err(|_| invalid())?,
            Target::Long(f) => *f(data) = i64::try_from(n).map_err(|_| invalid())?,
            Target::Ulong(f) => *f(data) = u64::try_from(n).map_err(|_| invalid())?,
            _ => return Err(invalid()),
        }
        Ok(())
    }
}

impl<T> fmt::Debug for Target<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Key(key) => write!(f, "Key({:?})", key),
            other => write!(f, "Field({})", other.name()),
        }
    }
}

// ============================================================================
// Template
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SepKind {
    /// `--foo=`: the separator is part of the option text.
    Equals,
    /// `-x `: the parameter may follow directly or as the next argument.
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sep {
    pub index: usize,
    pub kind: SepKind,
}

/// Result of matching a token against a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Offset of the template separator, usable as an offset into the token.
    pub sep: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
    sep: Option<Sep>,
    format: Option<Format>,
}

impl Template {
    pub fn parse(text: &str) -> Result<Template> {
        let found = text
            .find('=')
            .map(|i| (i, SepKind::Equals))
            .or_else(|| text.find(' ').map(|i| (i, SepKind::Space)));

        let mut sep = None;
        let mut format = None;
        if let Some((index, kind)) = found {
            let spec = &text[index + 1..];
            if spec.is_empty() {
                sep = Some(Sep { index, kind });
            } else if spec.starts_with('%') {
                format = Some(Format::parse(spec).ok_or_else(|| Error::BadTemplate {
                    template: text.to_string(),
                    reason: format!("unsupported conversion `{}'", spec),
                })?);
                sep = Some(Sep { index, kind });
            }
        }

        Ok(Template {
            text: text.to_string(),
            sep,
            format,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn sep(&self) -> Option<Sep> {
        self.sep
    }

    pub fn format(&self) -> Option<Format> {
        self.format
    }

    /// Match `arg` against this template.
    ///
    /// A parameterized template matches any token starting with the text
    /// before its separator (including the `=`). Every other template only
    /// matches itself exactly.
    pub fn matches(&self, arg: &str) -> Option<Match> {
        if let Some(sep) = self.sep {
            let prefix_len = match sep.kind {
                SepKind::Equals => sep.index + 1,
                SepKind::Space => sep.index,
            };
            if arg.as_bytes().starts_with(&self.text.as_bytes()[..prefix_len]) {
                return Some(Match {
                    sep: Some(sep.index),
                });
            }
        }

        if self.text == arg {
            return Some(Match { sep: None });
        }
        None
    }

    /// Whether a match of `arg` leaves the parameter for the next token.
    pub fn is_detached(&self, m: Match, arg: &str) -> bool {
        matches!(
            (self.sep, m.sep),
            (Some(Sep { kind: SepKind::Space, .. }), Some(i)) if arg.len() == i
        )
    }

    /// Slice the parameter out of a token matched by this template.
    pub fn param<'s>(&self, m: Match, arg: &'s str) -> Option<&'s str> {
        let sep = self.sep?;
        let i = m.sep?;
        let start = match sep.kind {
            SepKind::Equals => i + 1,
            SepKind::Space => i,
        };
        arg.get(start..)
    }
}

// ============================================================================
// Opt: one table entry
// ============================================================================

pub struct Opt<T> {
    template: Template,
    target: Target<T>,
    value: i64,
}

impl<T> Opt<T> {
    /// Entry writing `target`; flag templates store `1`.
    pub fn new(templ: &str, target: Target<T>) -> Result<Self> {
        Self::with_value(templ, target, 1)
    }

    /// Entry invoking the processing callback with `key`.
    pub fn key(templ: &str, key: Key) -> Result<Self> {
        Self::with_value(templ, Target::Key(key), 0)
    }

    /// Entry writing `target`; flag templates store `value`.
    ///
    /// The template's format must be able to fill the target: `%s` needs a
    /// string field, an integer conversion needs an integer field, and a
    /// template without a format needs a field that can hold `value`.
    pub fn with_value(templ: &str, target: Target<T>, value: i64) -> Result<Self> {
        let template = Template::parse(templ)?;
        let bad = |reason: String| Error::BadTemplate {
            template: templ.to_string(),
            reason,
        };

        match (&target, template.format()) {
            (Target::Key(_), _) => {}
            (t, Some(Format::Str)) if !t.is_string() => {
                return Err(bad(format!("%s cannot fill a {} field", t.name())));
            }
            (t, Some(Format::Int(_))) if t.is_string() || matches!(t, Target::Bool(_)) => {
                return Err(bad(format!(
                    "integer conversion cannot fill a {} field",
                    t.name()
                )));
            }
            (t, None) if t.is_string() => {
                return Err(bad(format!("{} field needs a %s format", t.name())));
            }
            (t, None) if !t.holds(value) => {
                return Err(bad(format!("value {} does not fit a {} field", value, t.name())));
            }
            _ => {}
        }

        Ok(Opt {
            template,
            target,
            value,
        })
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn target(&self) -> &Target<T> {
        &self.target
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

impl<T> fmt::Debug for Opt<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opt")
            .field("template", &self.template.as_str())
            .field("target", &self.target)
            .field("value", &self.value)
            .finish()
    }
}

// ============================================================================
// OptionTable
// ============================================================================

pub struct OptionTable<T> {
    opts: Vec<Opt<T>>,
}

impl<T> OptionTable<T> {
    pub fn new() -> Self {
        OptionTable { opts: Vec::new() }
    }

    pub fn option(mut self, opt: Opt<T>) -> Self {
        self.opts.push(opt);
        self
    }

    pub fn opts(&self) -> &[Opt<T>] {
        &self.opts
    }

    /// First entry at or after `start` that matches `arg`.
    pub fn find_opt(&self, start: usize, arg: &str) -> Option<(usize, Match)> {
        self.opts
            .iter()
            .enumerate()
            .skip(start)
            .find_map(|(idx, opt)| opt.template.matches(arg).map(|m| (idx, m)))
    }

    /// Whether any entry matches `arg`.
    pub fn matches(&self, arg: &str) -> bool {
        self.find_opt(0, arg).is_some()
    }
}

impl<T> Default for OptionTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for OptionTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.opts).finish()
    }
}
