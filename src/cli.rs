use std::ffi::OsString;

use clap::error::{
    ContextKind,
    ContextValue,
    ErrorKind,
};
use clap::{
    ArgAction,
    Parser,
};

use crate::config::{
    RunConfig,
    DEFAULT_NITERS,
    DEFAULT_NPROCS,
    DEFAULT_NSEMS,
    DEFAULT_NSETS,
};
use crate::error::Error;

#[derive(Debug, Parser)]
#[command(
    author,
    about,
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Args {
    /// Semaphores per set
    #[arg(short = 'n', long = "nsems", default_value_t = DEFAULT_NSEMS)]
    pub nsems: usize,
    /// Number of semaphore sets
    #[arg(short = 's', long = "nsets", default_value_t = DEFAULT_NSETS)]
    pub nsets: usize,
    /// Lock/unlock iterations per process. Both halves add one, so a
    /// semaphore reaches the kernel maximum (32767 on Linux) after about
    /// 16383 * nsets * nsems / nprocs iterations and the run fails.
    #[arg(short = 'i', long = "iters", default_value_t = DEFAULT_NITERS)]
    pub niters: usize,
    /// Number of worker processes
    #[arg(short = 'p', long = "procs", default_value_t = DEFAULT_NPROCS)]
    pub nprocs: usize,
    /// More logging on stderr; repeat for more detail
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
    /// Print help
    #[arg(long = "help", action = ArgAction::Help)]
    pub help: Option<bool>,

    /// Arguments that were not recognized and were dropped.
    #[arg(skip)]
    pub ignored: Vec<String>,
}

impl Args {
    /// Parses `args`, dropping unrecognized arguments instead of failing.
    ///
    /// Malformed values for known options and `--help` still come back as
    /// errors for the caller to report. `-h` is an unknown option like any
    /// other.
    pub fn parse_lenient<I, T>(args: I) -> Result<Args, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let mut ignored = Vec::new();
        loop {
            match Args::try_parse_from(&args) {
                Ok(mut parsed) => {
                    parsed.ignored = ignored;
                    return Ok(parsed);
                }
                Err(e) if e.kind() == ErrorKind::UnknownArgument => {
                    let bad = match e.get(ContextKind::InvalidArg) {
                        Some(ContextValue::String(bad)) => bad.clone(),
                        _ => return Err(e),
                    };
                    if !drop_arg(&mut args, &bad) {
                        return Err(e);
                    }
                    ignored.push(bad);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

// Removes the argument clap rejected, skipping the program name. Tries an
// exact match, then a single flag inside a short cluster: `-vx` loses its
// `x`, and `-x5` becomes `-5` for the next round.
fn drop_arg(args: &mut Vec<OsString>, bad: &str) -> bool {
    if let Some(pos) = (1..args.len()).find(|&i| args[i].to_str() == Some(bad)) {
        args.remove(pos);
        return true;
    }

    let flag = match short_flag(bad) {
        Some(c) => c,
        None => return false,
    };
    let cluster = (1..args.len()).find_map(|i| {
        let a = args[i].to_str()?;
        if a.len() <= 2 || !a.starts_with('-') || a.starts_with("--") {
            return None;
        }
        let at = 1 + a[1..].find(flag)?;
        Some((i, format!("{}{}", &a[..at], &a[at + flag.len_utf8()..])))
    });
    match cluster {
        Some((pos, ref rest)) if rest == "-" => {
            args.remove(pos);
            true
        }
        Some((pos, rest)) => {
            args[pos] = rest.into();
            true
        }
        None => false,
    }
}

fn short_flag(arg: &str) -> Option<char> {
    let mut chars = arg.strip_prefix('-')?.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c != '-' => Some(c),
        _ => None,
    }
}

impl TryFrom<Args> for RunConfig {
    type Error = Error;

    fn try_from(args: Args) -> Result<RunConfig, Error> {
        RunConfig::new(args.nsems, args.nsets, args.niters, args.nprocs)
    }
}
