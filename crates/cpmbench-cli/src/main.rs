//! CLI entry point for the cpmbench harness binary.

use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;

use cpmbench_core::{run_program, EngineKind, HarnessConfig};
#[cfg(test)]
use tempfile as _;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const PROGRAM_NAME: &str = "cpmbench";

const USAGE_TEXT: &str = "\
Usage: cpmbench [options] <program.com>

Runs a CP/M program image until it terminates, then prints the collected
counters.

Options:
  -i                       Use i8080 emulation (default)
  -z                       Use Z80 emulation (not available in this build)
  -e, --engine <name>      Select the engine by name (i8080)
  -s, --stats <set>        Counters to collect: none, state, memory, all
                           (default: none)
  -h, --help               Show this help message

Environment:
  RUST_LOG                 Diagnostic log filter (default: warn)

Examples:
  cpmbench tests/8080PRE.COM
  cpmbench -i --stats all hello.com
";

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    program: PathBuf,
    config: HarnessConfig,
}

#[derive(Debug)]
enum ParseResult {
    Run(RunArgs),
    Help,
}

fn parse_stats(value: &str, config: &mut HarnessConfig) -> Result<(), String> {
    let (state, memory) = match value {
        "none" => (false, false),
        "state" => (true, false),
        "memory" => (false, true),
        "all" => (true, true),
        other => return Err(format!("unknown stats set: {other}")),
    };
    config.count_state = state;
    config.count_memory = memory;
    Ok(())
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut program: Option<PathBuf> = None;
    let mut config = HarnessConfig::default();

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }

        if arg == "-i" {
            config.engine = EngineKind::I8080;
            continue;
        }

        if arg == "-z" {
            config.engine = "z80"
                .parse::<EngineKind>()
                .map_err(|err| err.to_string())?;
            continue;
        }

        if arg == "-e" || arg == "--engine" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --engine".to_string())?;
            config.engine = value
                .to_string_lossy()
                .parse::<EngineKind>()
                .map_err(|err| err.to_string())?;
            continue;
        }

        if arg == "-s" || arg == "--stats" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --stats".to_string())?;
            parse_stats(&value.to_string_lossy(), &mut config)?;
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if program.is_some() {
            return Err("multiple program paths provided".to_string());
        }
        program = Some(PathBuf::from(arg));
    }

    let program = program.ok_or_else(|| "missing program path".to_string())?;
    Ok(ParseResult::Run(RunArgs { program, config }))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &RunArgs) -> Result<(), i32> {
    debug!(program = %args.program.display(), config = ?args.config, "starting run");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let report = match run_program(&args.config, &args.program, &mut out) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("{PROGRAM_NAME}: {err}");
            return Err(1);
        }
    };

    if let Err(err) = write!(out, "{report}").and_then(|()| out.flush()) {
        eprintln!("{PROGRAM_NAME}: cannot write report: {err}");
        return Err(1);
    }
    Ok(())
}

fn main() {
    init_logging();

    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Run(args)) => match run(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            eprintln!("{PROGRAM_NAME}: {error}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::path::PathBuf;

    fn args(list: &[&str]) -> impl Iterator<Item = OsString> {
        list.iter().map(OsString::from).collect::<Vec<_>>().into_iter()
    }

    fn parse_run(list: &[&str]) -> RunArgs {
        match parse_args(args(list)).expect("valid args should parse") {
            ParseResult::Run(run) => run,
            ParseResult::Help => panic!("expected run arguments"),
        }
    }

    #[test]
    fn parses_bare_program_path() {
        let result = parse_run(&["hello.com"]);

        assert_eq!(
            result,
            RunArgs {
                program: PathBuf::from("hello.com"),
                config: HarnessConfig::default(),
            }
        );
    }

    #[test]
    fn parses_engine_flag_and_stats() {
        let result = parse_run(&["-i", "--stats", "all", "hello.com"]);

        assert_eq!(result.config.engine, EngineKind::I8080);
        assert!(result.config.count_state);
        assert!(result.config.count_memory);
    }

    #[test]
    fn parses_stats_sets() {
        assert!(parse_run(&["-s", "state", "p.com"]).config.count_state);
        assert!(!parse_run(&["-s", "state", "p.com"]).config.count_memory);
        assert!(parse_run(&["-s", "memory", "p.com"]).config.count_memory);
        assert!(!parse_run(&["-s", "all", "-s", "none", "p.com"]).config.count_state);
    }

    #[test]
    fn parses_engine_by_name() {
        let result = parse_run(&["--engine", "8080", "p.com"]);
        assert_eq!(result.config.engine, EngineKind::I8080);
    }

    #[test]
    fn rejects_unknown_engine() {
        let error = parse_args(args(&["--engine", "z80", "p.com"]))
            .expect_err("unknown engine should fail parse");
        assert_eq!(error, "unknown engine 'z80'");
    }

    #[test]
    fn rejects_unknown_stats_set() {
        let error = parse_args(args(&["--stats", "cache", "p.com"]))
            .expect_err("unknown stats set should fail parse");
        assert!(error.contains("unknown stats set"));
    }

    #[test]
    fn parses_help_flag() {
        let result = parse_args(args(&["p.com", "--help"])).expect("help should parse");
        assert!(matches!(result, ParseResult::Help));
    }

    #[test]
    fn rejects_missing_program() {
        let error = parse_args(args(&["-i"])).expect_err("missing program should fail");
        assert!(error.contains("missing program path"));
    }

    #[test]
    fn rejects_second_program() {
        let error = parse_args(args(&["a.com", "b.com"])).expect_err("two programs should fail");
        assert!(error.contains("multiple program paths"));
    }

    #[test]
    fn rejects_z80_flag_as_unknown_engine() {
        let error = parse_args(args(&["-z", "p.com"])).expect_err("z80 should fail parse");
        assert_eq!(error, "unknown engine 'z80'");
    }

    #[test]
    fn rejects_unknown_option() {
        let error = parse_args(args(&["-x", "p.com"])).expect_err("unknown option should fail");
        assert_eq!(error, "unknown option: -x");
    }

    #[test]
    fn rejects_missing_option_value() {
        let error = parse_args(args(&["p.com", "--stats"])).expect_err("missing value should fail");
        assert!(error.contains("missing value for --stats"));
    }
}
