mod app;
mod export;
mod gateway;
mod notify;
mod parse;
mod record;
mod shell;
mod state;
mod table;

use crate::app::{App, AssumeYes, RemoveOutcome};
use crate::gateway::{HttpGateway, ObservationGateway};
use crate::parse::{Args, Command};
use crate::record::{Observation, Rarity};
use crate::shell::LinePrompt;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

/// Observation counts per rarity, in the order of `Rarity::ALL`.
pub fn count_by_rarity(records: &[Observation]) -> Vec<(Rarity, usize)> {
    let mut counts: HashMap<Rarity, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.rarity).or_insert(0) += 1;
    }

    Rarity::ALL
        .iter()
        .map(|rarity| (*rarity, counts.get(rarity).copied().unwrap_or(0)))
        .collect()
}

pub fn print_summary(records: &[Observation]) {
    if records.is_empty() {
        println!("No observations to summarize");
        return;
    }

    println!("\nSummary:");
    println!("Total observations: {}", records.len());

    let unique_names: std::collections::HashSet<&String> = records
        .iter()
        .map(|r| &r.name)
        .filter(|name| !name.is_empty())
        .collect();
    println!("Unique birds: {}", unique_names.len());

    let first = records.iter().map(|r| r.timestamp).min();
    let last = records.iter().map(|r| r.timestamp).max();
    if let (Some(first), Some(last)) = (first, last) {
        println!(
            "Date range: {} to {}",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        );
    }

    println!("By rarity:");
    for (rarity, count) in count_by_rarity(records) {
        println!("  {}: {}", rarity, count);
    }
}

/// Spinner on stderr while `future` runs.
async fn with_spinner<F: Future>(message: &'static str, future: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));

    let output = future.await;
    spinner.finish_and_clear();
    output
}

fn print_notification<G: ObservationGateway>(app: &App<G>) {
    if let Some(notice) = app.notification() {
        println!("{}", notice);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::try_parse()?;
    let default_level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    // RUST_LOG overrides the default level
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    let gateway = HttpGateway::new(&args.api_url, Duration::from_secs(args.timeout))?;
    let mut app = App::new(gateway);

    let loaded = with_spinner("Loading observations", app.load()).await;

    match args.command {
        Command::List { order } => {
            app = app.with_sort(order.sort_state());
            if loaded {
                println!("{}", app.view().render());
            }
        }
        Command::Add {
            name,
            rarity,
            notes,
        } => {
            let form = app.form_mut();
            form.name = name;
            form.rarity = rarity;
            form.notes = notes;
            app.add().await;
        }
        Command::Delete { ids, yes } => {
            let outcomes = if yes {
                app.remove_many(&ids, &mut AssumeYes).await
            } else {
                app.remove_many(&ids, &mut LinePrompt::stdin()).await
            };
            // One banner only holds the last outcome
            for (id, outcome) in outcomes {
                match outcome {
                    RemoveOutcome::Deleted => println!("{}: deleted", id),
                    RemoveOutcome::AlreadyGone => println!("{}: already gone", id),
                    RemoveOutcome::Cancelled => println!("{}: kept", id),
                    RemoveOutcome::Unknown => println!("{}: unknown id", id),
                }
            }
        }
        Command::Export { output, order } => {
            if loaded {
                let sorted = order.sort_state().apply(app.observations().records());
                export::save_to_csv(&sorted, &output)?;
                println!("Wrote {} observations to {}", sorted.len(), output);
            }
        }
        Command::Summary => {
            if loaded {
                print_summary(app.observations().records());
            }
        }
        Command::Shell => {
            let mut input = LinePrompt::stdin();
            return shell::run(&mut app, &mut input).await;
        }
    }

    print_notification(&app);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ObservationId;
    use chrono::{TimeZone, Utc};

    fn observation(id: &str, rarity: Rarity) -> Observation {
        Observation {
            id: ObservationId::new(id),
            name: format!("Bird {}", id),
            rarity,
            notes: String::new(),
            timestamp: Utc.with_ymd_and_hms(2022, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_count_by_rarity() {
        let records = vec![
            observation("1", Rarity::Rare),
            observation("2", Rarity::Common),
            observation("3", Rarity::Rare),
        ];

        assert_eq!(
            count_by_rarity(&records),
            vec![
                (Rarity::Common, 1),
                (Rarity::Rare, 2),
                (Rarity::ExtremelyRare, 0)
            ]
        );
    }

    #[test]
    fn test_count_by_rarity_empty() {
        assert!(count_by_rarity(&[]).iter().all(|(_, count)| *count == 0));
    }

    #[tokio::test]
    async fn test_spinner_passes_output_through() {
        let value = with_spinner("Working", async { 41 + 1 }).await;
        assert_eq!(value, 42);
    }
}
