//! Merges CLI flags, config-file values and built-in defaults.
//!
//! A flag typed on the command line always wins; otherwise the config file
//! value is used; otherwise clap's default stands.

use std::ffi::OsString;
use std::time::Duration;

use clap::{ArgMatches, CommandFactory, FromArgMatches, parser::ValueSource};
use renamer_core::{DiscoveryOptions, HttpSettings, RenameConfig};

use crate::app_config::{FileConfig, VerbositySetting};
use crate::cli::Args;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) concurrency: bool,
    pub(crate) pages: bool,
    pub(crate) per_host_connections: bool,
    pub(crate) connect_timeout: bool,
    pub(crate) timeout: bool,
    pub(crate) mailto: bool,
    pub(crate) ignore_extension_case: bool,
    pub(crate) dry_run: bool,
    pub(crate) verbose: bool,
    pub(crate) quiet: bool,
}

/// Parses arguments, recording which values were typed on the command line.
pub(crate) fn try_parse_cli_with_sources<I, T>(
    argv: I,
) -> Result<(Args, CliValueSources), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = Args::command().try_get_matches_from(argv)?;
    let args = Args::from_arg_matches(&matches)?;

    let sources = CliValueSources {
        concurrency: is_commandline_value(&matches, "concurrency"),
        pages: is_commandline_value(&matches, "pages"),
        per_host_connections: is_commandline_value(&matches, "per_host_connections"),
        connect_timeout: is_commandline_value(&matches, "connect_timeout"),
        timeout: is_commandline_value(&matches, "timeout"),
        mailto: is_commandline_value(&matches, "mailto"),
        ignore_extension_case: is_commandline_value(&matches, "ignore_extension_case"),
        dry_run: is_commandline_value(&matches, "dry_run"),
        verbose: is_commandline_value(&matches, "verbose"),
        quiet: is_commandline_value(&matches, "quiet"),
    };
    Ok((args, sources))
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Overlays config-file values onto arguments the user did not type.
pub(crate) fn apply_config_defaults(
    mut args: Args,
    cli_sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> Args {
    let Some(file_config) = file_config else {
        return args;
    };

    if !cli_sources.concurrency
        && let Some(concurrency) = file_config.concurrency
    {
        args.concurrency = concurrency;
    }
    if !cli_sources.pages
        && let Some(pages) = file_config.pages
    {
        args.pages = pages;
    }
    if !cli_sources.per_host_connections
        && let Some(limit) = file_config.per_host_connections
    {
        args.per_host_connections = limit;
    }
    if !cli_sources.connect_timeout
        && let Some(secs) = file_config.connect_timeout_secs
    {
        args.connect_timeout = secs;
    }
    if !cli_sources.timeout
        && let Some(secs) = file_config.request_timeout_secs
    {
        args.timeout = secs;
    }
    if !cli_sources.mailto
        && let Some(mailto) = &file_config.mailto
    {
        args.mailto = Some(mailto.clone());
    }
    if !cli_sources.ignore_extension_case
        && let Some(flag) = file_config.ignore_extension_case
    {
        args.ignore_extension_case = flag;
    }
    if !cli_sources.dry_run
        && let Some(flag) = file_config.dry_run
    {
        args.dry_run = flag;
    }
    if !cli_sources.verbose
        && !cli_sources.quiet
        && file_config.verbosity == Some(VerbositySetting::Quiet)
    {
        args.quiet = true;
    }
    args
}

/// Builds the library config from fully merged arguments.
pub(crate) fn rename_config(args: &Args) -> RenameConfig {
    RenameConfig {
        concurrency: usize::from(args.concurrency),
        pages: usize::from(args.pages),
        dry_run: args.dry_run,
        discovery: DiscoveryOptions {
            case_insensitive_extension: args.ignore_extension_case,
        },
        http: HttpSettings {
            connect_timeout: Duration::from_secs(args.connect_timeout),
            request_timeout: Duration::from_secs(args.timeout),
            per_host_connections: usize::from(args.per_host_connections),
            mailto: args.mailto.clone(),
        },
    }
}

/// Picks the default log level.
///
/// Priority: `-q`/`-v` on the command line > config `verbosity` > info.
/// `RUST_LOG` overrides all of these when the subscriber is built.
pub(crate) fn default_log_level(
    args: &Args,
    cli_sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> &'static str {
    if !cli_sources.verbose
        && !cli_sources.quiet
        && let Some(verbosity) = file_config.and_then(|c| c.verbosity)
    {
        return verbosity.log_level();
    }
    if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
