//! Command line option parsing for userspace filesystems.
//!
//! The parser follows the fuse option conventions:
//! - an [`OptionTable`] of templates (`-x`, `--foo=%s`, `bar=%lu`, `-x %s`, ...)
//!   bound to typed fields of the caller's configuration, or to callback keys
//! - `-o a,b,c` option groups with backslash and octal escapes
//! - a processing callback ([`OptProc`]) deciding what happens to
//!   unrecognized and positional arguments
//! - a residual [`Args`] list handed to the layer below
//!
//! [`parse_cmdline`] applies the generic options every filesystem accepts
//! (help, version, debug, thread limits, mountpoint).

pub mod args;
pub mod cmdline;
pub mod context;
pub mod error;
pub mod group;
pub mod mount_util;
pub mod opt;
pub mod param;

pub use args::Args;
pub use cmdline::{cmdline_help, parse_cmdline, CmdlineOpts, LoopConfig};
pub use context::{Decision, OptProc};
pub use error::{Error, Result};
pub use group::{add_opt, add_opt_escaped, split_option_group};
pub use mount_util::parse_fd;
pub use opt::{Key, Opt, OptionTable, Target, Template};
pub use param::Format;

pub const MAJOR: u32 = 1;
pub const MINOR: u32 = 1;
pub const VERSION: u32 = MAJOR * 100 + MINOR;

/// Library version as `major.minor`.
pub fn version() -> String {
    format!("{}.{}", MAJOR, MINOR)
}
