use anyhow::Result;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, CommandFactory, Parser};
use clap_complete::{generate, Shell};
use std::ffi::OsString;
use std::io;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod testing;

/// Flags also accepted with a single leading dash, as `go` tools spell them
const GO_STYLE_FLAGS: &[&str] = &["showFail", "useCache"];

/// Run the tests of every module in a Go workspace.
///
/// Finds the go.work file governing the current directory, runs
/// `go test -json ./...` in every module it uses, concurrently, and prints a
/// sorted summary with one line per module.
///
/// EXAMPLES:
///     worktest                     Test every workspace module
///     worktest -showFail           Also print failing test output
///     worktest -useCache=false     Force tests to re-run (-count=1)
///     worktest -- -race            Forward flags to `go test`
///
/// ENVIRONMENT VARIABLES:
///     WORKTEST_GO       Path of the go executable (default: $GOROOT/bin/go, then go)
///     WORKTEST_LOG      Log filter, e.g. 'debug' (falls back to RUST_LOG)
///     NO_COLOR          Set to disable colored output
#[derive(Parser, Debug)]
#[command(name = "worktest")]
#[command(version)]
struct Cli {
    /// Print detailed diagnostics for failing packages
    #[arg(
        long = "showFail",
        visible_alias = "show-fail",
        env = "WORKTEST_SHOW_FAIL",
        value_name = "BOOL",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
    )]
    show_fail: bool,

    /// Let `go test` reuse cached results; false passes -count=1
    #[arg(
        long = "useCache",
        visible_alias = "use-cache",
        env = "WORKTEST_USE_CACHE",
        value_name = "BOOL",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
    )]
    use_cache: bool,

    /// Maximum number of modules tested at once (default: all)
    #[arg(long, short = 'j', env = "WORKTEST_JOBS")]
    jobs: Option<NonZeroUsize>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Path of the go executable
    #[arg(long, value_name = "PATH")]
    go: Option<PathBuf>,

    /// Exit with status 0 even when tests fail
    #[arg(long)]
    exit_zero: bool,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,

    /// Extra arguments passed to `go test`
    #[arg(last = true, value_name = "GO_TEST_ARGS")]
    go_args: Vec<String>,
}

impl Cli {
    fn into_test_args(self, config: &config::Config) -> commands::test::TestArgs {
        commands::test::TestArgs {
            show_failures: self.show_fail,
            use_cache: self.use_cache,
            jobs: self.jobs,
            // Command-line flag overrides environment variable
            no_color: self.no_color || config.no_color,
            go: self.go.unwrap_or_else(|| config.go_binary.clone()),
            go_args: self.go_args,
        }
    }
}

/// Rewrite `-showFail` style flags to the `--showFail` form clap expects
///
/// Arguments after `--` belong to `go test` and are left alone.
fn normalize_go_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(|arg| {
            if passthrough {
                return arg;
            }
            if arg == "--" {
                passthrough = true;
                return arg;
            }
            match arg.to_str() {
                Some(s) if is_go_style_flag(s) => OsString::from(format!("-{s}")),
                _ => arg,
            }
        })
        .collect()
}

fn is_go_style_flag(arg: &str) -> bool {
    let Some(flag) = arg.strip_prefix('-') else {
        return false;
    };
    if flag.starts_with('-') {
        return false;
    }
    let name = flag.split_once('=').map_or(flag, |(name, _)| name);
    GO_STYLE_FLAGS.contains(&name)
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse_from(normalize_go_flags(std::env::args_os()));
    let cli_config = config::Config::from_env();
    init_tracing(&cli_config.log_filter);

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let exit_zero = cli.exit_zero;
    let args = cli.into_test_args(&cli_config);
    let outcome = commands::test::run(&args)?;
    tracing::debug!(
        packages = outcome.packages,
        failed = outcome.failed,
        "workspace run finished"
    );

    if outcome.is_success() || exit_zero {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
