// park/src/commands.rs
//! CLI front end: argument parsing, action dispatch, output and exit codes.
//!
//! stdout carries only data (`list` records, or the bare path for a jump) so a
//! shell function can `cd "$(park NAME)"`. Everything else goes to stderr.

use anyhow::{
    Context,
    Result
};
use clap::{
    error::ErrorKind,
    ArgAction,
    ArgGroup,
    CommandFactory,
    Parser
};
use std::{
    env,
    io::{
        self,
        Write
    },
    path::PathBuf,
    process::ExitCode
};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use crate::{
    paths,
    store::Store
};

/// Park (bookmark) directories, switch quickly from anywhere to parked
/// directories, and manage the list.
#[derive(Parser, Debug)]
#[command(name = "park", version, about)]
#[command(group(
    ArgGroup::new("action")
        .args(["add", "delete", "list", "clear", "prune"])
        .multiple(false)
))]
pub struct Cli {
    /// Name of bookmarked directory
    pub name: Option<String>,

    /// Directory to park with --add (defaults to the current directory)
    #[arg(requires = "add")]
    pub dir: Option<PathBuf>,

    /// Add a bookmarked directory
    #[arg(short, long)]
    pub add: bool,

    /// Delete a bookmarked directory
    #[arg(short, long)]
    pub delete: bool,

    /// List all of the bookmarked directories
    #[arg(short, long)]
    pub list: bool,

    /// Clear the list of bookmarked directories
    #[arg(short, long)]
    pub clear: bool,

    /// Remove bookmarks whose directory no longer exists
    #[arg(long)]
    pub prune: bool,

    /// Bookmark store file
    #[arg(long, env = paths::STORE_ENV, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// More diagnostics on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// One requested operation. No flag plus a name means jump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add { name: String, dir: Option<PathBuf> },
    Delete { name: String },
    List,
    Clear,
    Prune,
    Jump { name: String },
}

impl Cli {
    /// Usage errors come back as clap errors so they exit with code 2.
    pub fn action(&self) -> std::result::Result<Action, clap::Error> {
        let action = if self.list {
            Action::List
        } else if self.clear {
            Action::Clear
        } else if self.prune {
            Action::Prune
        } else if self.add {
            Action::Add { name: self.require_name("--add")?, dir: self.dir.clone() }
        } else if self.delete {
            Action::Delete { name: self.require_name("--delete")? }
        } else {
            Action::Jump { name: self.require_name("jumping")? }
        };
        Ok(action)
    }

    fn require_name(&self, what: &str) -> std::result::Result<String, clap::Error> {
        self.name.clone().ok_or_else(|| {
            Cli::command().error(
                ErrorKind::MissingRequiredArgument,
                format!("a bookmark name is required for {what}"),
            )
        })
    }
}

pub fn run_cli() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let action = match cli.action() {
        Ok(a) => a,
        Err(e) => e.exit(),
    };

    let result = paths::store_path(cli.store.clone()).and_then(|file| {
        execute(action, file, &mut io::stdout().lock(), &mut io::stderr().lock())
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("park: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run one action against the store at `file`.
/// `out` receives data only; `msg` receives confirmations.
pub fn execute(action: Action, file: PathBuf, out: &mut impl Write, msg: &mut impl Write) -> Result<()> {
    debug!(?action, file = %file.display(), "dispatching");
    let mut store = Store::load(file)?;

    match action {
        Action::Add { name, dir } => {
            let dir = match dir {
                Some(d) => d,
                None => env::current_dir().context("failed to get current directory")?,
            };
            let stored = store.add(&name, &dir)?;
            writeln!(msg, "parked {name} -> {}", stored.display())?;
        }
        Action::Delete { name } => {
            store.delete(&name)?;
            writeln!(msg, "deleted {name}")?;
        }
        Action::List => {
            for (name, path) in store.list() {
                writeln!(out, "{name}\t{}", path.display())?;
            }
        }
        Action::Clear => {
            let n = store.len();
            store.clear()?;
            writeln!(msg, "cleared {n} bookmark(s)")?;
        }
        Action::Prune => {
            let removed = store.prune()?;
            for b in &removed {
                writeln!(msg, "pruned {} ({})", b.name, b.path.display())?;
            }
            if removed.is_empty() {
                writeln!(msg, "nothing to prune")?;
            }
        }
        Action::Jump { name } => {
            let path = store.resolve(&name)?;
            writeln!(out, "{}", path.display())?;
        }
    }
    out.flush()?;
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // stdout is reserved for data; try_init fails only if a subscriber is already set
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParkError;
    use std::fs;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        let mut argv = vec!["park"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv)
    }

    fn run(tmp: &TempDir, action: Action) -> Result<(String, String)> {
        let mut out = Vec::new();
        let mut msg = Vec::new();
        execute(action, tmp.path().join("bookmarks.jsonl"), &mut out, &mut msg)?;
        Ok((String::from_utf8(out).unwrap(), String::from_utf8(msg).unwrap()))
    }

    #[test]
    fn bare_name_is_jump() {
        let cli = parse(&["proj"]).unwrap();
        assert_eq!(cli.action().unwrap(), Action::Jump { name: "proj".into() });
    }

    #[test]
    fn flags_map_to_actions() {
        assert_eq!(parse(&["-l"]).unwrap().action().unwrap(), Action::List);
        assert_eq!(parse(&["--clear"]).unwrap().action().unwrap(), Action::Clear);
        assert_eq!(parse(&["--prune"]).unwrap().action().unwrap(), Action::Prune);
        assert_eq!(
            parse(&["-d", "proj"]).unwrap().action().unwrap(),
            Action::Delete { name: "proj".into() }
        );
        assert_eq!(
            parse(&["--add", "proj", "/srv/proj"]).unwrap().action().unwrap(),
            Action::Add { name: "proj".into(), dir: Some(PathBuf::from("/srv/proj")) }
        );
        assert_eq!(
            parse(&["-a", "proj"]).unwrap().action().unwrap(),
            Action::Add { name: "proj".into(), dir: None }
        );
    }

    #[test]
    fn flags_are_mutually_exclusive() {
        let err = parse(&["-a", "-d", "proj"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_name_is_usage_error() {
        for args in [&["--add"][..], &["--delete"][..], &[][..]] {
            let err = parse(args).unwrap().action().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn store_flag_reads_env_name() {
        let cli = parse(&["--store", "/tmp/alt.jsonl", "-l"]).unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/alt.jsonl")));
        let store_arg = Cli::command()
            .get_arguments()
            .find(|a| a.get_id() == "store")
            .and_then(|a| a.get_env().map(|e| e.to_os_string()));
        assert_eq!(store_arg.as_deref(), Some(std::ffi::OsStr::new(paths::STORE_ENV)));
    }

    #[test]
    fn dir_only_with_add() {
        assert!(parse(&["proj", "/srv"]).is_err());
    }

    #[test]
    fn list_prints_tab_separated_records() {
        let tmp = TempDir::new().unwrap();
        run(&tmp, Action::Add { name: "b".into(), dir: Some("/srv/with space".into()) }).unwrap();
        run(&tmp, Action::Add { name: "a".into(), dir: Some("/srv/a".into()) }).unwrap();

        let (out, _) = run(&tmp, Action::List).unwrap();
        assert_eq!(out, "a\t/srv/a\nb\t/srv/with space\n");
    }

    #[test]
    fn multiline_path_never_reaches_list() {
        let tmp = TempDir::new().unwrap();
        let err = run(&tmp, Action::Add { name: "x".into(), dir: Some("/srv/a\nevil\t/etc".into()) })
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<ParkError>(), Some(ParkError::InvalidPath { .. })));
        assert!(run(&tmp, Action::List).unwrap().0.is_empty());
    }

    #[test]
    fn empty_store_lists_nothing() {
        let tmp = TempDir::new().unwrap();
        let (out, msg) = run(&tmp, Action::List).unwrap();
        assert!(out.is_empty());
        assert!(msg.is_empty());
    }

    #[test]
    fn jump_prints_only_the_path() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("proj");
        fs::create_dir(&target).unwrap();

        let (out, msg) = run(&tmp, Action::Add { name: "proj".into(), dir: Some(target.clone()) }).unwrap();
        assert!(out.is_empty(), "confirmation must not reach stdout");
        assert!(msg.contains("parked proj"));

        let (out, msg) = run(&tmp, Action::Jump { name: "proj".into() }).unwrap();
        assert_eq!(out, format!("{}\n", target.display()));
        assert!(msg.is_empty());
    }

    #[test]
    fn jump_to_stale_fails_with_nothing_on_stdout() {
        let tmp = TempDir::new().unwrap();
        run(&tmp, Action::Add { name: "x".into(), dir: Some(tmp.path().join("gone")) }).unwrap();

        let mut out = Vec::new();
        let err = execute(
            Action::Jump { name: "x".into() },
            tmp.path().join("bookmarks.jsonl"),
            &mut out,
            &mut io::sink(),
        )
        .unwrap_err();
        assert!(matches!(err.downcast_ref::<ParkError>(), Some(ParkError::Stale { .. })));
        assert!(out.is_empty());

        let (listed, _) = run(&tmp, Action::List).unwrap();
        assert!(listed.starts_with("x\t"));
    }

    #[test]
    fn delete_unknown_surfaces_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = run(&tmp, Action::Delete { name: "nope".into() }).unwrap_err();
        assert!(matches!(err.downcast_ref::<ParkError>(), Some(ParkError::NotFound(_))));
    }

    #[test]
    fn prune_then_clear() {
        let tmp = TempDir::new().unwrap();
        run(&tmp, Action::Add { name: "live".into(), dir: Some(tmp.path().to_path_buf()) }).unwrap();
        run(&tmp, Action::Add { name: "dead".into(), dir: Some(tmp.path().join("dead")) }).unwrap();

        let (_, msg) = run(&tmp, Action::Prune).unwrap();
        assert!(msg.contains("pruned dead"));
        let (out, _) = run(&tmp, Action::List).unwrap();
        assert!(out.starts_with("live\t"));

        let (_, msg) = run(&tmp, Action::Clear).unwrap();
        assert_eq!(msg, "cleared 1 bookmark(s)\n");
        assert!(run(&tmp, Action::List).unwrap().0.is_empty());
    }
}
