use copperfuse::{Args, Opt, OptionTable, Target};

use crate::error::Result;

/// File-system specific options of the hello filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelloOpts {
    /// Name of the single file in the filesystem root.
    pub filename: String,
    pub contents: String,
    pub show_help: bool,
}

impl Default for HelloOpts {
    fn default() -> Self {
        HelloOpts {
            filename: "hello".to_string(),
            contents: "Hello World!\n".to_string(),
            show_help: false,
        }
    }
}

macro_rules! option {
    ($templ:expr, $kind:ident, $field:ident) => {
        Opt::new($templ, Target::$kind(|o: &mut HelloOpts| &mut o.$field))?
    };
}

fn build_options() -> Result<OptionTable<HelloOpts>> {
    Ok(OptionTable::new()
        .option(option!("--name=%s", Str, filename))
        .option(option!("--contents=%s", Str, contents))
        .option(option!("-h", Bool, show_help))
        .option(option!("--help", Bool, show_help)))
}

/// Parse the hello options out of `args`, leaving everything else for the
/// generic command line parser.
pub fn parse_args(args: &mut Args<'_>) -> Result<HelloOpts> {
    let mut opts = HelloOpts::default();
    let table = build_options()?;
    args.parse_opt(&mut opts, &table, None)?;
    Ok(opts)
}

pub fn usage(progname: &str) -> String {
    format!(
        "usage: {} [options] <mountpoint>\n\
         \n\
         File-system specific options:\n\
         \x20   --name=<s>          Name of the \"hello\" file\n\
         \x20                       (default: \"hello\")\n\
         \x20   --contents=<s>      Contents \"hello\" file\n\
         \x20                       (default \"Hello, World!\\n\")\n\
         \n",
        progname
    )
}
