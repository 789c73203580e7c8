use anyhow::Result;
use serde_json::{Value, json};

use crate::workflow::{MatchRow, Outcome};

/// Print a plain-text representation of the outcome.
pub(crate) fn print_plain(outcome: &Outcome) {
    match outcome {
        Outcome::Query {
            term,
            state,
            matches,
            ..
        } => {
            if matches.is_empty() {
                println!("No matches for '{term}' ({state})");
                return;
            }
            for row in matches {
                if row.subtext.is_empty() {
                    println!("{}\t{}", row.id, row.text);
                } else {
                    println!("{}\t{}\t{}", row.id, row.text, row.subtext);
                }
            }
        }
        Outcome::Activation { item_id, rank, .. } => match rank {
            Some(rank) => println!("Recorded {item_id} (now ranked #{})", rank + 1),
            None => println!("Recorded {item_id}"),
        },
        Outcome::Stats { runtimes, top } => {
            println!("Handler runtimes:");
            if runtimes.is_empty() {
                println!("  (none recorded)");
            }
            for summary in runtimes {
                println!(
                    "  {}: {:.0} us over {} runs",
                    summary.handler_id, summary.mean_micros, summary.samples
                );
            }
            println!("Most used:");
            if top.is_empty() {
                println!("  (no activations)");
            }
            for (id, weight) in top {
                println!("  {id}: {weight:.2}");
            }
        }
        Outcome::NoExtensions => println!("No extensions are configured"),
    }
}

/// Format the outcome as a JSON string.
pub(crate) fn format_outcome_json(outcome: &Outcome) -> Result<String> {
    let payload = match outcome {
        Outcome::Query {
            term,
            query_id,
            state,
            matches,
            teardown,
        } => json!({
            "type": "query",
            "term": term,
            "query_id": query_id,
            "state": state.to_string(),
            "matches": matches.iter().map(match_json).collect::<Vec<_>>(),
            "teardown": {
                "drained": teardown.drained,
                "runtimes": teardown.runtimes,
                "retained": teardown.retained,
            },
        }),
        Outcome::Activation {
            term,
            item_id,
            rank,
        } => json!({
            "type": "activation",
            "term": term,
            "item_id": item_id,
            "rank": rank,
        }),
        Outcome::Stats { runtimes, top } => json!({
            "type": "stats",
            "runtimes": runtimes
                .iter()
                .map(|summary| json!({
                    "handler_id": summary.handler_id,
                    "samples": summary.samples,
                    "mean_micros": summary.mean_micros,
                }))
                .collect::<Vec<_>>(),
            "top": top
                .iter()
                .map(|(id, weight)| json!({ "id": id, "weight": weight }))
                .collect::<Vec<_>>(),
        }),
        Outcome::NoExtensions => json!({ "type": "no_extensions" }),
    };

    Ok(serde_json::to_string_pretty(&payload)?)
}

fn match_json(row: &MatchRow) -> Value {
    json!({
        "id": row.id,
        "text": row.text,
        "subtext": row.subtext,
        "extension": row.extension,
        "score": row.score,
    })
}

/// Print the JSON representation of the outcome.
pub(crate) fn print_json(outcome: &Outcome) -> Result<()> {
    println!("{}", format_outcome_json(outcome)?);
    Ok(())
}
