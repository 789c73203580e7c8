mod cli;
mod settings;
mod workflow;

use std::time::Duration;

use anyhow::Result;
use cli::{Command, OutputFormat, parse_cli, print_json, print_plain};
use flint::logging;
use settings::ResolvedConfig;
use workflow::{LauncherWorkflow, Outcome};

fn main() -> Result<()> {
    let cli = parse_cli();
    logging::initialize(cli.verbose);

    let resolved = settings::load(&cli)?;

    if cli.print_config {
        resolved.print_summary();
    }

    let outcome = run(cli.command, resolved)?;
    print_outcome(cli.output, &outcome)
}

/// Execute the requested command against a fresh session.
fn run(command: Command, settings: ResolvedConfig) -> Result<Outcome> {
    let workflow = LauncherWorkflow::from_config(settings)?;
    match command {
        Command::Query { terms, timeout_ms } => {
            workflow.query(&terms, Duration::from_millis(timeout_ms))
        }
        Command::Activate { term, item_id } => workflow.activate(&term, &item_id),
        Command::Stats { top } => workflow.stats(top),
    }
}

fn print_outcome(format: OutputFormat, outcome: &Outcome) -> Result<()> {
    match format {
        OutputFormat::Plain => print_plain(outcome),
        OutputFormat::Json => print_json(outcome)?,
    }
    Ok(())
}
