use std::borrow::Cow;

use tracing::trace;

use crate::error::{Error, Result};

/// Argument list passed between the option parser and the layers below it.
///
/// A list starts out either borrowed from the caller or owned. Appending
/// requires an owned list: a borrowed, non-empty list is never written
/// through. After a successful parse the list is always owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args<'a> {
    argv: Cow<'a, [String]>,
}

impl Args<'static> {
    /// Empty, owned argument list.
    pub fn new() -> Self {
        Args {
            argv: Cow::Owned(Vec::new()),
        }
    }
}

impl Default for Args<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<String>> for Args<'static> {
    fn from(argv: Vec<String>) -> Self {
        Args {
            argv: Cow::Owned(argv),
        }
    }
}

impl<'a> Args<'a> {
    /// Wrap the caller's argument list without copying it.
    pub fn borrowed(argv: &'a [String]) -> Self {
        Args {
            argv: Cow::Borrowed(argv),
        }
    }

    /// Whether the list owns its strings (`allocated` in fuse terms).
    pub fn is_allocated(&self) -> bool {
        matches!(self.argv, Cow::Owned(_))
    }

    pub fn len(&self) -> usize {
        self.argv.len()
    }

    pub fn is_empty(&self) -> bool {
        self.argv.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.argv.get(idx).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.argv.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.argv
    }

    /// Copy every borrowed string, making the list independent of the caller.
    pub fn into_owned(self) -> Args<'static> {
        Args {
            argv: Cow::Owned(self.argv.into_owned()),
        }
    }

    pub fn into_vec(self) -> Vec<String> {
        self.argv.into_owned()
    }

    /// Append a private copy of `arg`.
    ///
    /// On failure the list is left exactly as it was. Arguments holding a
    /// nul byte are rejected.
    pub fn add_arg(&mut self, arg: &str) -> Result<()> {
        if !self.is_allocated() && !self.argv.is_empty() {
            return Err(Error::BorrowedArgs);
        }
        check_nul(arg)?;

        let newarg = dup_arg(arg)?;
        let argv = self.argv.to_mut();
        argv.try_reserve_exact(1)?;
        argv.push(newarg);
        trace!(arg, argc = argv.len(), "argument appended");
        Ok(())
    }

    /// Insert a copy of `arg` at `pos`, shifting later arguments right.
    ///
    /// `pos == len()` behaves like [`Args::add_arg`].
    pub fn insert_arg(&mut self, pos: usize, arg: &str) -> Result<()> {
        if pos > self.len() {
            return Err(Error::InsertOutOfRange {
                pos,
                len: self.len(),
            });
        }
        self.add_arg(arg)?;

        let argv = self.argv.to_mut();
        argv[pos..].rotate_right(1);
        Ok(())
    }

    /// Overwrite the argument at `pos`. Used to blank the program name.
    pub fn set_arg(&mut self, pos: usize, arg: &str) -> Result<()> {
        if !self.is_allocated() {
            return Err(Error::BorrowedArgs);
        }
        check_nul(arg)?;
        let len = self.len();
        let newarg = dup_arg(arg)?;
        match self.argv.to_mut().get_mut(pos) {
            Some(slot) => {
                *slot = newarg;
                Ok(())
            }
            None => Err(Error::InsertOutOfRange { pos, len }),
        }
    }

    /// Drop the last argument, returning it.
    pub(crate) fn pop_arg(&mut self) -> Option<String> {
        if self.argv.is_empty() {
            return None;
        }
        self.argv.to_mut().pop()
    }
}

fn check_nul(arg: &str) -> Result<()> {
    if arg.contains('\0') {
        return Err(Error::NulInArg(arg.to_string()));
    }
    Ok(())
}

/// Duplicate a string, reporting allocation failure instead of aborting.
pub(crate) fn dup_arg(arg: &str) -> Result<String> {
    let mut copy = String::new();
    copy.try_reserve_exact(arg.len())?;
    copy.push_str(arg);
    Ok(copy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    // -- add_arg --

    #[test]
    fn add_to_empty_owned() {
        let mut args = Args::new();
        args.add_arg("prog").unwrap();
        args.add_arg("-f").unwrap();
        assert_eq!(args.as_slice(), strings(&["prog", "-f"]).as_slice());
        assert!(args.is_allocated());
    }

    #[test]
    fn add_to_empty_borrowed_becomes_owned() {
        let empty: Vec<String> = vec![];
        let mut args = Args::borrowed(&empty);
        assert!(!args.is_allocated());
        args.add_arg("prog").unwrap();
        assert!(args.is_allocated());
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn add_to_borrowed_is_rejected() {
        let argv = strings(&["prog", "mnt"]);
        let mut args = Args::borrowed(&argv);
        assert!(matches!(args.add_arg("-d"), Err(Error::BorrowedArgs)));
        assert_eq!(args.len(), 2);
        assert!(!args.is_allocated());
    }

    #[test]
    fn into_owned_allows_append() {
        let argv = strings(&["prog"]);
        let mut args = Args::borrowed(&argv).into_owned();
        args.add_arg("-d").unwrap();
        assert_eq!(args.as_slice(), strings(&["prog", "-d"]).as_slice());
        assert_eq!(argv.len(), 1);
    }

    #[test]
    fn add_with_nul_is_rejected() {
        let mut args = Args::from(strings(&["prog"]));
        match args.add_arg("a\0b") {
            Err(Error::NulInArg(arg)) => assert_eq!(arg, "a\0b"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(args.as_slice(), strings(&["prog"]).as_slice());
    }

    // -- insert_arg --

    #[test]
    fn insert_in_middle_shifts_right() {
        let mut args = Args::from(strings(&["prog", "a", "b"]));
        args.insert_arg(1, "-o").unwrap();
        args.insert_arg(2, "ro").unwrap();
        assert_eq!(
            args.as_slice(),
            strings(&["prog", "-o", "ro", "a", "b"]).as_slice()
        );
    }

    #[test]
    fn insert_at_end_matches_append() {
        let mut appended = Args::from(strings(&["prog"]));
        appended.add_arg("x").unwrap();

        let mut inserted = Args::from(strings(&["prog"]));
        let end = inserted.len();
        inserted.insert_arg(end, "x").unwrap();

        assert_eq!(appended, inserted);
    }

    #[test]
    fn insert_at_front() {
        let mut args = Args::from(strings(&["b"]));
        args.insert_arg(0, "a").unwrap();
        assert_eq!(args.as_slice(), strings(&["a", "b"]).as_slice());
    }

    #[test]
    fn insert_past_end_is_rejected() {
        let mut args = Args::from(strings(&["prog"]));
        assert!(matches!(
            args.insert_arg(3, "x"),
            Err(Error::InsertOutOfRange { pos: 3, len: 1 })
        ));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn insert_with_nul_is_rejected() {
        let mut args = Args::from(strings(&["prog", "mnt"]));
        assert!(matches!(args.insert_arg(1, "\0"), Err(Error::NulInArg(_))));
        assert_eq!(args.as_slice(), strings(&["prog", "mnt"]).as_slice());
    }

    // -- set_arg / pop_arg --

    #[test]
    fn set_arg_with_nul_is_rejected() {
        let mut args = Args::from(strings(&["prog"]));
        assert!(matches!(args.set_arg(0, "p\0"), Err(Error::NulInArg(_))));
        assert_eq!(args.get(0), Some("prog"));
    }

    #[test]
    fn set_arg_blanks_program_name() {
        let mut args = Args::from(strings(&["prog", "mnt"]));
        args.set_arg(0, "").unwrap();
        assert_eq!(args.get(0), Some(""));
        assert_eq!(args.get(1), Some("mnt"));
    }

    #[test]
    fn set_arg_on_borrowed_is_rejected() {
        let argv = strings(&["prog"]);
        let mut args = Args::borrowed(&argv);
        assert!(matches!(args.set_arg(0, ""), Err(Error::BorrowedArgs)));
    }

    #[test]
    fn pop_arg_returns_last() {
        let mut args = Args::from(strings(&["prog", "--"]));
        assert_eq!(args.pop_arg().as_deref(), Some("--"));
        assert_eq!(args.len(), 1);
        assert_eq!(Args::new().pop_arg(), None);
    }
}
