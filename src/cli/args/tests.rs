use clap::{CommandFactory, Parser};

use super::{CliArgs, Command, OutputFormat};

#[test]
fn command_definition_is_consistent() {
    CliArgs::command().debug_assert();
}

#[test]
fn query_collects_every_keystroke() {
    let cli = CliArgs::parse_from(["flint", "query", "f", "fi", "fir"]);
    assert_eq!(cli.output, OutputFormat::Plain);
    assert_eq!(cli.verbose, 0);
    match cli.command {
        Command::Query { terms, timeout_ms } => {
            assert_eq!(terms, ["f", "fi", "fir"]);
            assert_eq!(timeout_ms, 10_000);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn global_flags_follow_the_subcommand() {
    let cli = CliArgs::parse_from([
        "flint", "stats", "-vv", "--output", "json", "--fuzzy", "yes", "-j", "2", "--in-memory",
    ]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.output, OutputFormat::Json);
    assert_eq!(cli.fuzzy, Some(true));
    assert_eq!(cli.workers, Some(2));
    assert!(cli.in_memory);
    assert_eq!(cli.command, Command::Stats { top: 10 });
}

#[test]
fn activate_takes_term_and_item() {
    let cli = CliArgs::parse_from(["flint", "activate", "--term", "fi", "bookmarks.mail"]);
    assert_eq!(
        cli.command,
        Command::Activate {
            term: "fi".into(),
            item_id: "bookmarks.mail".into(),
        }
    );
}

#[test]
fn query_requires_a_term() {
    assert!(CliArgs::try_parse_from(["flint", "query"]).is_err());
}
