//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use renamer_core::resolver::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_PER_HOST_CONNECTIONS, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use renamer_core::{DEFAULT_CONCURRENCY, DEFAULT_PAGES};

/// Rename PDF papers to "Author, Year - Title.pdf".
///
/// Every PDF under ROOT is scanned for a DOI on its first pages (falling back
/// to a title search), resolved against Crossref, and renamed in place.
#[derive(Parser, Debug)]
#[command(name = "paper-renamer")]
#[command(author, version, about)]
pub struct Args {
    /// Directory tree containing the PDFs to rename
    pub root: PathBuf,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Maximum files processed concurrently (1-100)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: u8,

    /// Leading pages scanned for a DOI (1-20)
    #[arg(short = 'p', long, default_value_t = DEFAULT_PAGES as u8, value_parser = clap::value_parser!(u8).range(1..=20))]
    pub pages: u8,

    /// Maximum simultaneous requests to the metadata registry (1-100)
    #[arg(long, default_value_t = DEFAULT_PER_HOST_CONNECTIONS as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub per_host_connections: u8,

    /// Registry connect timeout in seconds (1-3600)
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: u64,

    /// Total registry request timeout in seconds (1-3600)
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: u64,

    /// Contact email sent to Crossref for its polite pool
    #[arg(long)]
    pub mailto: Option<String>,

    /// Also match .PDF, .Pdf and other extension casings
    #[arg(long)]
    pub ignore_extension_case: bool,

    /// Show planned renames without touching any file
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Read defaults from this config file instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_root_only_uses_defaults() {
        let args = Args::try_parse_from(["paper-renamer", "papers"]).unwrap();
        assert_eq!(args.root, PathBuf::from("papers"));
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert_eq!(args.concurrency, 10); // DEFAULT_CONCURRENCY
        assert_eq!(args.pages, 3); // DEFAULT_PAGES
        assert_eq!(args.per_host_connections, 5);
        assert_eq!(args.connect_timeout, 10);
        assert_eq!(args.timeout, 30);
        assert!(args.mailto.is_none());
        assert!(!args.dry_run);
        assert!(!args.ignore_extension_case);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_cli_missing_root_is_error() {
        let err = Args::try_parse_from(["paper-renamer"]).unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_cli_extra_positional_is_error() {
        let err = Args::try_parse_from(["paper-renamer", "a", "b"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["paper-renamer", "-v", "."]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["paper-renamer", "-vv", "."]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["paper-renamer", "--quiet", "."]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["paper-renamer", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["paper-renamer", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_concurrency_bounds() {
        let args = Args::try_parse_from(["paper-renamer", "-c", "100", "."]).unwrap();
        assert_eq!(args.concurrency, 100);

        for bad in ["0", "101"] {
            let err = Args::try_parse_from(["paper-renamer", "-c", bad, "."]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        }
    }

    #[test]
    fn test_cli_pages_bounds() {
        let args = Args::try_parse_from(["paper-renamer", "--pages", "20", "."]).unwrap();
        assert_eq!(args.pages, 20);

        let err = Args::try_parse_from(["paper-renamer", "-p", "0", "."]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_timeouts_and_mailto() {
        let args = Args::try_parse_from([
            "paper-renamer",
            "--connect-timeout",
            "3",
            "--timeout",
            "12",
            "--mailto",
            "me@example.com",
            ".",
        ])
        .unwrap();
        assert_eq!(args.connect_timeout, 3);
        assert_eq!(args.timeout, 12);
        assert_eq!(args.mailto.as_deref(), Some("me@example.com"));
    }

    #[test]
    fn test_cli_timeout_zero_rejected() {
        let err = Args::try_parse_from(["paper-renamer", "--timeout", "0", "."]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_dry_run_and_extension_flags() {
        let args = Args::try_parse_from(["paper-renamer", "-n", "--ignore-extension-case", "."])
            .unwrap();
        assert!(args.dry_run);
        assert!(args.ignore_extension_case);
    }

    #[test]
    fn test_cli_config_path() {
        let args = Args::try_parse_from(["paper-renamer", "--config", "/tmp/c.toml", "."]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.toml")));
    }
}
