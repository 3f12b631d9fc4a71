use std::io::Write;

use copperfuse::{cmdline_help, parse_cmdline, Args};
use tracing::info;

use crate::arguments::{parse_args, usage, HelloOpts};
use crate::error::{HelloError, Result};

/// Parse the hello options, then the generic ones, and report the session
/// that would be mounted.
pub fn run<W: Write>(argv: &[String], out: &mut W) -> Result<()> {
    let mut args = Args::from(argv.to_vec());
    let opts = parse_args(&mut args)?;

    if opts.show_help {
        let progname = args.get(0).unwrap_or("hello");
        write!(out, "{}", usage(progname))?;
        // Let the generic parser print its own help, without a second
        // usage line.
        args.add_arg("--help")?;
        args.set_arg(0, "")?;
    }

    fuse_main(args, &opts, out)
}

fn fuse_main<W: Write>(mut args: Args<'_>, fs: &HelloOpts, out: &mut W) -> Result<()> {
    let cmd = parse_cmdline(&mut args)?;

    if cmd.show_help {
        if let Some(progname) = args.get(0).filter(|p| !p.is_empty()) {
            write!(out, "usage: {} [options] <mountpoint>\n\n", progname)?;
        }
        write!(out, "FUSE options:\n{}", cmdline_help())?;
        return Ok(());
    }
    if cmd.show_version {
        writeln!(out, "copperfuse version {}", copperfuse::version())?;
        return Ok(());
    }

    let mountpoint = cmd.mountpoint.as_deref().ok_or(HelloError::NoMountpoint)?;
    let lc = cmd.loop_config();
    info!(
        mountpoint,
        file = %fs.filename,
        foreground = cmd.foreground,
        singlethread = cmd.singlethread,
        "session configured"
    );

    writeln!(out, "mountpoint: {}", mountpoint)?;
    writeln!(out, "file: {} ({} bytes)", fs.filename, fs.contents.len())?;
    writeln!(out, "foreground: {}", cmd.foreground)?;
    writeln!(out, "debug: {}", cmd.debug)?;
    writeln!(out, "singlethread: {}", cmd.singlethread)?;
    writeln!(out, "clone_fd: {}", lc.clone_fd)?;
    if lc.max_idle_threads == u32::MAX {
        writeln!(out, "max_idle_threads: unlimited")?;
    } else {
        writeln!(out, "max_idle_threads: {}", lc.max_idle_threads)?;
    }
    writeln!(out, "max_threads: {}", lc.max_threads)?;
    writeln!(out, "args: {}", args.as_slice().join(" "))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_string(argv: &[&str]) -> Result<String> {
        let argv: Vec<String> = argv.iter().map(|s| s.to_string()).collect();
        let mut out = Vec::new();
        run(&argv, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn help_prints_both_sections() {
        let out = run_to_string(&["./hello", "-h"]).unwrap();
        assert!(out.starts_with("usage: ./hello [options] <mountpoint>"));
        assert!(out.contains("File-system specific options:"));
        assert!(out.contains("FUSE options:"));
        assert_eq!(out.matches("usage:").count(), 1);
    }

    #[test]
    fn version() {
        let out = run_to_string(&["hello", "-V"]).unwrap();
        assert_eq!(out, "copperfuse version 1.1\n");
    }

    #[test]
    fn no_mountpoint_is_an_error() {
        assert!(matches!(
            run_to_string(&["hello", "-f"]),
            Err(HelloError::NoMountpoint)
        ));
    }

    #[test]
    fn reports_session() {
        let dir = tempfile::tempdir().unwrap();
        let mnt = std::fs::canonicalize(dir.path()).unwrap();
        let mnt = mnt.to_string_lossy();
        let out = run_to_string(&[
            "hello",
            "--name=greeting",
            "--contents=Hi",
            "-d",
            "-omax_threads=3,ro",
            &mnt,
        ])
        .unwrap();

        assert!(out.contains(&format!("mountpoint: {}\n", mnt)));
        assert!(out.contains("file: greeting (2 bytes)\n"));
        assert!(out.contains("foreground: true\n"));
        assert!(out.contains("debug: true\n"));
        assert!(out.contains("max_idle_threads: unlimited\n"));
        assert!(out.contains("max_threads: 3\n"));
        assert!(out.contains("args: hello -o ro -d -osubtype=hello\n"));
    }

    #[test]
    fn bad_mountpoint_propagates() {
        let err = run_to_string(&["hello", "/nonexistent/copperfuse/mnt"]).unwrap_err();
        assert!(matches!(
            err,
            HelloError::Opt(copperfuse::Error::InvalidMountpoint { .. })
        ));
        assert!(err
            .to_string()
            .starts_with("bad mount point `/nonexistent/copperfuse/mnt': "));
    }
}
