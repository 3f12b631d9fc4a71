//! The option parser: walks an argument list against an option table.

use tracing::{debug, trace};

use crate::args::Args;
use crate::error::{Error, Result};
use crate::group::{add_opt_escaped, split_option_group};
use crate::opt::{Key, Match, Opt, OptionTable, Target};

// ============================================================================
// Processing callback
// ============================================================================

/// What to do with an argument handed to the processing callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Pass the argument on to the output list (or the `-o` list).
    Keep,
    /// Drop the argument.
    Discard,
    /// Pass this string on instead of the argument.
    Replace(String),
}

/// Processing callback, invoked for unmatched options, positional
/// arguments and templates bound to a [`Key::User`] key.
///
/// Returning an error aborts the whole parse.
pub trait OptProc<T> {
    fn process(&mut self, data: &mut T, arg: &str, key: Key) -> Result<Decision>;
}

impl<T, F> OptProc<T> for F
where
    F: FnMut(&mut T, &str, Key) -> Result<Decision>,
{
    fn process(&mut self, data: &mut T, arg: &str, key: Key) -> Result<Decision> {
        self(data, arg, key)
    }
}

// ============================================================================
// Entry point
// ============================================================================

impl Args<'_> {
    /// Parse this argument list against `table`, writing matched options
    /// into `data`.
    ///
    /// On success the list is replaced by the arguments that were not
    /// consumed: the program name, an `-o` group collecting unrecognized
    /// group members, then everything the callback kept, in input order.
    /// On failure the list and `data` are left as the parse reached them
    /// and no output list is produced.
    pub fn parse_opt<T>(
        &mut self,
        data: &mut T,
        table: &OptionTable<T>,
        proc: Option<&mut dyn OptProc<T>>,
    ) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }

        let outargs = {
            let ctx = ParseContext {
                data,
                table,
                proc,
                argv: self.as_slice(),
                argctr: 0,
                outargs: Args::new(),
                opts: None,
                nonopt: None,
            };
            ctx.parse()?
        };
        *self = outargs;
        Ok(())
    }
}

// ============================================================================
// ParseContext
// ============================================================================

struct ParseContext<'c, 'p, T> {
    data: &'c mut T,
    table: &'c OptionTable<T>,
    proc: Option<&'c mut (dyn OptProc<T> + 'p)>,
    argv: &'c [String],
    argctr: usize,
    outargs: Args<'static>,
    /// Unrecognized `-o` members, escaped and comma joined.
    opts: Option<String>,
    /// Output length right after a bare `--`.
    nonopt: Option<usize>,
}

impl<'c, T> ParseContext<'c, '_, T> {
    fn parse(mut self) -> Result<Args<'static>> {
        self.outargs.add_arg(&self.argv[0])?;

        self.argctr = 1;
        while self.argctr < self.argv.len() {
            let argv = self.argv;
            self.process_one(&argv[self.argctr])?;
            self.argctr += 1;
        }

        if let Some(nonopt) = self.nonopt {
            if nonopt == self.outargs.len() && self.outargs.iter().last() == Some("--") {
                self.outargs.pop_arg();
            }
        }

        if let Some(opts) = self.opts.take() {
            debug!(opts = %opts, "merged option group");
            self.outargs.insert_arg(1, "-o")?;
            self.outargs.insert_arg(2, &opts)?;
        }

        Ok(self.outargs)
    }

    fn process_one(&mut self, arg: &str) -> Result<()> {
        trace!(arg, "processing argument");

        if self.nonopt.is_some() || !arg.starts_with('-') {
            self.call_proc(arg, Key::NonOpt, false)
        } else if let Some(group) = arg.strip_prefix("-o") {
            if !group.is_empty() {
                self.process_option_group(group)
            } else {
                let group = self.next_arg(arg)?;
                self.process_option_group(group)
            }
        } else if arg == "--" {
            self.outargs.add_arg(arg)?;
            self.nonopt = Some(self.outargs.len());
            Ok(())
        } else {
            self.process_gopt(arg, false)
        }
    }

    fn process_option_group(&mut self, group: &str) -> Result<()> {
        for opt in split_option_group(group)? {
            self.process_gopt(&opt, true)?;
        }
        Ok(())
    }

    /// Run `arg` through every matching table entry, or hand it to the
    /// callback as [`Key::Opt`] if none matches.
    fn process_gopt(&mut self, arg: &str, iso: bool) -> Result<()> {
        let table = self.table;
        let mut found = table.find_opt(0, arg);
        if found.is_none() {
            return self.call_proc(arg, Key::Opt, iso);
        }

        // Joined "-x value" form, built the first time a detached
        // template fires for this argument.
        let mut joined: Option<String> = None;

        while let Some((idx, m)) = found {
            let opt = &table.opts()[idx];
            trace!(arg, template = opt.template().as_str(), "template matched");

            if opt.template().is_detached(m, arg) {
                if joined.is_none() {
                    let param = self.next_arg(arg)?;
                    joined = Some(format!("{}{}", arg, param));
                }
                if let Some(ref newarg) = joined {
                    self.process_opt(opt, m, newarg, iso)?;
                }
            } else {
                self.process_opt(opt, m, arg, iso)?;
            }
            found = table.find_opt(idx + 1, arg);
        }
        Ok(())
    }

    fn process_opt(&mut self, opt: &Opt<T>, m: Match, arg: &str, iso: bool) -> Result<()> {
        if let Target::Key(key) = opt.target() {
            return self.call_proc(arg, *key, iso);
        }

        match (opt.template().format(), opt.template().param(m, arg)) {
            (Some(format), Some(param)) => {
                opt.target().set_param(self.data, format, param, arg)
            }
            _ => {
                opt.target().set_flag(self.data, opt.value());
                Ok(())
            }
        }
    }

    /// Advance to the argument following `arg`.
    fn next_arg(&mut self, arg: &str) -> Result<&'c str> {
        let argv = self.argv;
        if self.argctr + 1 >= argv.len() {
            return Err(Error::MissingArg(arg.to_string()));
        }
        self.argctr += 1;
        Ok(&argv[self.argctr])
    }

    fn call_proc(&mut self, arg: &str, key: Key, iso: bool) -> Result<()> {
        let decision = match (key, self.proc.as_deref_mut()) {
            (Key::Discard, _) => Decision::Discard,
            (Key::Keep, _) | (_, None) => Decision::Keep,
            (key, Some(proc)) => proc.process(self.data, arg, key)?,
        };
        trace!(arg, ?key, ?decision, "callback decision");

        let kept = match decision {
            Decision::Discard => return Ok(()),
            Decision::Keep => arg,
            Decision::Replace(ref replacement) => replacement.as_str(),
        };
        if iso {
            add_opt_escaped(&mut self.opts, kept)
        } else {
            self.outargs.add_arg(kept)
        }
    }
}
