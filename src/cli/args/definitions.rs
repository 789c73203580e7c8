use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, ColorChoice, Parser, Subcommand};

use super::options::OutputFormat;
use super::styles::{cli_styles, long_version};

/// Command-line arguments accepted by the `flint` binary.
#[derive(Parser, Debug)]
#[command(
    name = "flint",
    version,
    long_version = long_version(),
    about = "Query extensions and rank their matches by what you used before",
    color = ColorChoice::Auto,
    styles = cli_styles()
)]
pub(crate) struct CliArgs {
    #[arg(
        short,
        long = "config",
        value_name = "FILE",
        env = "FLINT_CONFIG",
        global = true,
        action = ArgAction::Append,
        help = "Additional configuration file to merge (default: none)"
    )]
    pub(crate) config: Vec<PathBuf>,
    #[arg(
        short = 'n',
        long = "no-config",
        global = true,
        help = "Skip loading default configuration files (default: disabled)"
    )]
    pub(crate) no_config: bool,
    #[arg(
        short = 'o',
        long = "output",
        value_enum,
        global = true,
        default_value_t = OutputFormat::Plain,
        help = "Choose how to print the result"
    )]
    pub(crate) output: OutputFormat,
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        action = ArgAction::Count,
        help = "Log more to stderr; repeat for more detail (default: warnings only)"
    )]
    pub(crate) verbose: u8,
    #[arg(
        long = "fuzzy",
        global = true,
        value_parser = BoolishValueParser::new(),
        help = "Tolerate typos in bookmark lookups (default: disabled)"
    )]
    pub(crate) fuzzy: Option<bool>,
    #[arg(
        short = 'j',
        long = "workers",
        value_name = "NUM",
        global = true,
        help = "Limit the threads one query may use (default: automatic)"
    )]
    pub(crate) workers: Option<usize>,
    #[arg(
        long = "database",
        value_name = "PATH",
        global = true,
        help = "Usage history database (default: core.db in the cache directory)"
    )]
    pub(crate) database: Option<PathBuf>,
    #[arg(
        long = "in-memory",
        global = true,
        help = "Keep usage history in memory only (default: disabled)"
    )]
    pub(crate) in_memory: bool,
    #[arg(
        short = 'p',
        long = "print-config",
        global = true,
        help = "Print the resolved configuration before running (default: disabled)"
    )]
    pub(crate) print_config: bool,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    /// Type each TERM in turn and print the matches for the last one.
    Query {
        #[arg(required = true, value_name = "TERM")]
        terms: Vec<String>,
        #[arg(
            long = "timeout-ms",
            value_name = "MILLIS",
            default_value_t = 10_000,
            help = "Give up waiting for the last query after this long"
        )]
        timeout_ms: u64,
    },
    /// Record that ITEM_ID was chosen for a term.
    Activate {
        #[arg(short, long, value_name = "TERM", default_value = "")]
        term: String,
        #[arg(value_name = "ITEM_ID")]
        item_id: String,
    },
    /// Show handler runtimes and the most used items.
    Stats {
        #[arg(long, value_name = "NUM", default_value_t = 10)]
        top: usize,
    },
}
