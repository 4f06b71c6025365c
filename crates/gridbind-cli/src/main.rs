// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use gridbind_app::{GridEvent, GridNotice, SearchRequest};
use gridbind_db::Store;
use runtime::{GridOutput, GridRequest, GridRuntime, render_export, render_page};
use std::env;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEMO_ROWS: usize = 120;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `gridbind --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;
    init_logging(config.log_filter())?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or GRIDBIND_DB_PATH",
            db_path.display()
        )
    })?;
    if options.demo {
        gridbind_testkit::seed_products(store.raw_connection(), DEMO_ROWS)?;
    }

    let runtime = GridRuntime::new(&store, config.build_grid()?, config.table());
    let missing = runtime.check()?;
    if options.check_only {
        if !missing.is_empty() {
            return Err(anyhow!(
                "table {:?} lacks bound columns: {}",
                config.table(),
                missing.join(", ")
            ));
        }
        return Ok(());
    }

    let response = runtime.handle(&options.request)?;
    match &response.output {
        GridOutput::Page(page) => {
            print!("{}", render_page(runtime.grid(), page, &response.state));
        }
        GridOutput::Export(table) => print!("{}", render_export(table)),
    }
    for event in &response.events {
        if let GridEvent::SearchRejected { column, errors } = event {
            eprintln!("search on {column} rejected: {}", errors.join("; "));
        }
    }
    println!("state={}", response.state_blob);
    Ok(())
}

fn init_logging(default_filter: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .with_context(|| format!("invalid [logging].filter {default_filter:?}"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct SearchInput {
    operator: Option<String>,
    argument: Option<String>,
    argument_alt: Option<String>,
}

impl SearchInput {
    fn is_empty(&self) -> bool {
        self.operator.is_none() && self.argument.is_none() && self.argument_alt.is_none()
    }

    fn to_request(&self) -> SearchRequest {
        SearchRequest {
            argument: self.argument.clone().unwrap_or_default(),
            argument_alt: self.argument_alt.clone(),
            operator: self.operator.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    request: GridRequest,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
        request: GridRequest::default(),
    };
    let mut search = SearchInput::default();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        let mut value_for = |flag: &str, what: &str| -> Result<String> {
            iter.next()
                .map(|value| value.as_ref().to_owned())
                .ok_or_else(|| anyhow!("{flag} requires {what}"))
        };
        match arg.as_ref() {
            "--config" => {
                options.config_path = PathBuf::from(value_for("--config", "a file path")?);
            }
            "--state" => {
                options.request.state = Some(value_for("--state", "a state blob")?);
            }
            "--event" => {
                let raw = value_for("--event", "Name=Value")?;
                let (name, value) = raw.split_once('=').ok_or_else(|| {
                    anyhow!("--event expects Name=Value, got {raw:?} (for example GoPageIndex=2)")
                })?;
                options.request.notices.push(GridNotice::new(name, value));
            }
            "--search-op" => {
                search.operator = Some(value_for("--search-op", "an operator")?);
            }
            "--search-arg" => {
                search.argument = Some(value_for("--search-arg", "a value")?);
            }
            "--search-alt" => {
                search.argument_alt = Some(value_for("--search-alt", "a value")?);
            }
            "--export" => {
                options.request.export = true;
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if !search.is_empty() {
        options.request.search = Some(search.to_request());
    }
    Ok(options)
}

fn print_help() {
    println!("gridbind");
    println!("  --config <path>          Use a specific config path");
    println!("  --state <blob>           Restore grid state from a previous run");
    println!("  --event <Name=Value>     Raise a grid event (repeatable), for example");
    println!("                           SortByColumn=name|DESC, ApplyFilter=0,");
    println!("                           SearchByColumn=price, GoPageIndex=2");
    println!("  --search-op <OP>         Search operator submitted with SearchByColumn");
    println!("  --search-arg <value>     Search value");
    println!("  --search-alt <value>     Upper bound for BETWEEN");
    println!("  --export                 Print every matching row instead of one page");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Bind against seeded demo data (in-memory)");
    println!("  --check                  Validate config, database and grid definition");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::parse_cli_args;
    use anyhow::Result;
    use gridbind_app::{APPLY_FILTER, GridNotice, SORT_BY_COLUMN};
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/gridbind-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(options.config_path, default_options_path());
        assert!(!options.demo);
        assert!(!options.check_only);
        assert!(options.request.state.is_none());
        assert!(options.request.notices.is_empty());
        assert!(options.request.search.is_none());
        assert!(!options.request.export);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));

        let error = parse_cli_args(vec!["--state"], default_options_path())
            .expect_err("missing state value should fail");
        assert!(error.to_string().contains("--state requires a state blob"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_collects_events_in_order() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--event",
                "SortByColumn=name|DESC",
                "--event",
                "ApplyFilter=1",
                "--state",
                "e30=",
            ],
            default_options_path(),
        )?;
        assert_eq!(
            options.request.notices,
            vec![
                GridNotice::new(SORT_BY_COLUMN, "name|DESC"),
                GridNotice::new(APPLY_FILTER, "1"),
            ]
        );
        assert_eq!(options.request.state.as_deref(), Some("e30="));
        Ok(())
    }

    #[test]
    fn parse_cli_args_rejects_event_without_value() {
        let error = parse_cli_args(vec!["--event", "GoPageIndex"], default_options_path())
            .expect_err("event needs a value");
        assert!(error.to_string().contains("Name=Value"));
    }

    #[test]
    fn parse_cli_args_builds_search_request() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--search-op",
                "BETWEEN",
                "--search-arg",
                "5",
                "--search-alt",
                "9",
                "--export",
            ],
            default_options_path(),
        )?;
        let search = options.request.search.expect("search input");
        assert_eq!(search.operator, "BETWEEN");
        assert_eq!(search.argument, "5");
        assert_eq!(search.argument_alt.as_deref(), Some("9"));
        assert!(options.request.export);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--print-config-path",
                "--print-example-config",
                "--check",
                "--demo",
                "--print-path",
            ],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_db_path);
        assert!(options.demo);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }
}
