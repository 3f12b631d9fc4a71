//! Generic command line handling shared by every filesystem built on the
//! library: help/version/debug flags, thread limits and the mountpoint.

use std::num::NonZeroUsize;
use std::thread;

use tracing::{debug, info};

use crate::args::Args;
use crate::context::Decision;
use crate::error::{Error, Result};
use crate::mount_util::parse_fd;
use crate::opt::{Key, Opt, OptionTable, Target};

/// Worker thread limit used when the host parallelism is unknown.
const DEFAULT_MAX_THREADS: u32 = 10;

/// Options recognized by [`parse_cmdline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdlineOpts {
    pub singlethread: bool,
    pub foreground: bool,
    pub debug: bool,
    pub nodefault_subtype: bool,
    /// Canonical mountpoint path, or a `/dev/fd/<n>` reference.
    pub mountpoint: Option<String>,
    pub show_version: bool,
    pub show_help: bool,
    pub clone_fd: bool,
    /// `u32::MAX` means no limit.
    pub max_idle_threads: u32,
    pub max_threads: u32,
}

impl Default for CmdlineOpts {
    fn default() -> Self {
        CmdlineOpts {
            singlethread: false,
            foreground: false,
            debug: false,
            nodefault_subtype: false,
            mountpoint: None,
            show_version: false,
            show_help: false,
            clone_fd: false,
            max_idle_threads: u32::MAX,
            max_threads: default_max_threads(),
        }
    }
}

/// Settings for the multi-threaded request loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    pub clone_fd: bool,
    pub max_idle_threads: u32,
    pub max_threads: u32,
}

impl CmdlineOpts {
    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            clone_fd: self.clone_fd,
            max_idle_threads: self.max_idle_threads,
            max_threads: self.max_threads,
        }
    }
}

fn default_max_threads() -> u32 {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .ok()
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(DEFAULT_MAX_THREADS)
}

macro_rules! helper_opt {
    ($templ:expr, $kind:ident, $field:ident) => {
        Opt::new($templ, Target::$kind(|o: &mut CmdlineOpts| &mut o.$field))?
    };
}

fn helper_opts() -> Result<OptionTable<CmdlineOpts>> {
    Ok(OptionTable::new()
        .option(helper_opt!("-h", Bool, show_help))
        .option(helper_opt!("--help", Bool, show_help))
        .option(helper_opt!("-V", Bool, show_version))
        .option(helper_opt!("--version", Bool, show_version))
        .option(helper_opt!("-d", Bool, debug))
        .option(helper_opt!("debug", Bool, debug))
        .option(helper_opt!("-d", Bool, foreground))
        .option(helper_opt!("debug", Bool, foreground))
        .option(Opt::key("-d", Key::Keep)?)
        .option(Opt::key("debug", Key::Keep)?)
        .option(helper_opt!("-f", Bool, foreground))
        .option(helper_opt!("-s", Bool, singlethread))
        .option(helper_opt!("fsname=", Bool, nodefault_subtype))
        .option(Opt::key("fsname=", Key::Keep)?)
        .option(helper_opt!("subtype=", Bool, nodefault_subtype))
        .option(Opt::key("subtype=", Key::Keep)?)
        .option(helper_opt!("clone_fd", Bool, clone_fd))
        .option(helper_opt!("max_idle_threads=%u", Uint, max_idle_threads))
        .option(helper_opt!("max_threads=%u", Uint, max_threads)))
}

/// Accept the first positional argument as the mountpoint and pass every
/// unrecognized option through.
fn helper_opt_proc(opts: &mut CmdlineOpts, arg: &str, key: Key) -> Result<Decision> {
    if key != Key::NonOpt {
        return Ok(Decision::Keep);
    }
    if opts.mountpoint.is_some() {
        return Err(Error::DuplicateMountpoint(arg.to_string()));
    }

    let mountpoint = if parse_fd(arg).is_some() {
        arg.to_string()
    } else {
        let path = std::fs::canonicalize(arg).map_err(|source| Error::InvalidMountpoint {
            mountpoint: arg.to_string(),
            source,
        })?;
        path.to_string_lossy().into_owned()
    };
    info!(mountpoint = %mountpoint, "mountpoint accepted");
    opts.mountpoint = Some(mountpoint);
    Ok(Decision::Discard)
}

/// Append `-osubtype=<program name>` so the mount shows which filesystem
/// serves it.
fn add_default_subtype(args: &mut Args<'_>) -> Result<()> {
    let progname = match args.get(0) {
        Some(p) => p,
        None => return Ok(()),
    };
    let basename = progname.rsplit('/').next().unwrap_or(progname);
    if basename.is_empty() {
        return Ok(());
    }
    let subtype_opt = format!("-osubtype={}", basename);
    debug!(opt = %subtype_opt, "adding default subtype");
    args.add_arg(&subtype_opt)
}

/// Parse the generic options out of `args`.
///
/// Recognized options and the mountpoint are removed from `args`; `-d`,
/// `debug`, `fsname=` and `subtype=` are recorded and also kept for the
/// mount layer, as is everything unrecognized.
pub fn parse_cmdline(args: &mut Args<'_>) -> Result<CmdlineOpts> {
    let mut opts = CmdlineOpts::default();
    let table = helper_opts()?;
    let mut proc = helper_opt_proc;

    args.parse_opt(&mut opts, &table, Some(&mut proc))?;

    if !opts.nodefault_subtype {
        add_default_subtype(args)?;
    }
    Ok(opts)
}

/// Help text for the options handled by [`parse_cmdline`].
pub fn cmdline_help() -> String {
    format!(
        "    -h   --help            print help\n\
         \x20   -V   --version         print version\n\
         \x20   -d   -o debug          enable debug output (implies -f)\n\
         \x20   -f                     foreground operation\n\
         \x20   -s                     disable multi-threaded operation\n\
         \x20   -o clone_fd            use separate fuse device fd for each thread\n\
         \x20                          (may improve performance)\n\
         \x20   -o max_idle_threads    the maximum number of idle worker threads\n\
         \x20                          allowed (default: unlimited)\n\
         \x20   -o max_threads         the maximum number of worker threads\n\
         \x20                          allowed (default: {})\n",
        default_max_threads()
    )
}
