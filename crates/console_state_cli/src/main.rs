//! Action replay entry point.
//!
//! # Responsibility
//! - Replay a JSON array of actions through a fully wired store hub.
//! - Print the resulting state as JSON so scripted scenarios can be diffed.
//!
//! Usage: `console_state_cli <actions.json> [--config <config.json>]`

use clap::Parser;
use console_state_core::{Action, CoreConfig, DispatchReport, StoreHub};
use serde_json::{json, Value};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

/// Replay console actions and print the resulting store state.
#[derive(Debug, Parser)]
#[command(name = "console_state_cli", version)]
struct CliArgs {
    /// JSON array of actions to dispatch in order.
    script: PathBuf,
    /// Optional JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run(CliArgs::parse()) {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("console_state_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<String, Box<dyn Error>> {
    let config = match args.config.as_deref() {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };

    let raw = std::fs::read_to_string(&args.script)
        .map_err(|err| format!("failed to read `{}`: {err}", args.script.display()))?;
    let actions: Vec<Action> = serde_json::from_str(&raw)?;

    let hub = StoreHub::start_with_logging(&config)?;
    for action in actions {
        hub.dispatch(action);
    }
    log::info!(
        "event=replay_done module=cli status=ok actions={}",
        hub.dispatch_totals().actions
    );

    Ok(serde_json::to_string_pretty(&summarize(&hub))?)
}

fn summarize(hub: &StoreHub) -> Value {
    let totals: DispatchReport = hub.dispatch_totals();
    json!({
        "context": hub.latest_context().get(),
        "organizations": {
            "loaded": hub.organizations().is_loaded(),
            "slugs": hub
                .organizations()
                .get_all()
                .iter()
                .map(|org| org.slug.clone())
                .collect::<Vec<_>>(),
        },
        "events": hub.events().get_all_item_ids(),
        "dispatch": {
            "actions": totals.actions,
            "deliveries": totals.deliveries,
            "failures": totals.failures,
        },
    })
}
