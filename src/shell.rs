use crate::app::{App, Confirm};
use crate::gateway::ObservationGateway;
use crate::record::{ObservationId, Rarity};
use crate::table::SortColumn;
use async_trait::async_trait;
use log::warn;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

const HELP: &str = "\
commands:
  list                 show the table
  sort <column>        sort by name, rarity, notes or timestamp (again to flip)
  add                  fill in the form and submit it
  delete <id>...       delete observations after confirming
  reload               fetch the list again
  help                 this text
  quit                 leave";

/// Line-oriented input shared by the shell and its confirmation prompts.
pub struct LinePrompt<R> {
    lines: Lines<R>,
}

impl LinePrompt<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> LinePrompt<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// `None` once input is exhausted.
    pub async fn ask(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        print!("{}", prompt);
        std::io::stdout().flush()?;
        self.lines.next_line().await
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> Confirm for LinePrompt<R> {
    async fn confirm(&mut self, prompt: &str) -> bool {
        match self.ask(&format!("{} [y/N] ", prompt)).await {
            Ok(Some(answer)) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Ok(None) => false,
            Err(e) => {
                warn!("Could not read confirmation: {}", e);
                false
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ShellCommand {
    List,
    Sort(SortColumn),
    Add,
    Delete(Vec<ObservationId>),
    Reload,
    Help,
    Quit,
    Empty,
}

fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(ShellCommand::Empty);
    };
    let rest: Vec<&str> = words.collect();

    match verb.to_lowercase().as_str() {
        "list" | "ls" => Ok(ShellCommand::List),
        "sort" => match rest.as_slice() {
            [column] => column.parse().map(ShellCommand::Sort),
            _ => Err("usage: sort <column>".to_string()),
        },
        "add" => Ok(ShellCommand::Add),
        "delete" | "rm" => {
            if rest.is_empty() {
                return Err("usage: delete <id>...".to_string());
            }
            rest.iter()
                .map(|id| id.parse())
                .collect::<Result<Vec<_>, _>>()
                .map(ShellCommand::Delete)
        }
        "reload" => Ok(ShellCommand::Reload),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command '{}', try 'help'", other)),
    }
}

pub async fn run<G, R>(
    app: &mut App<G>,
    input: &mut LinePrompt<R>,
) -> Result<(), Box<dyn std::error::Error>>
where
    G: ObservationGateway,
    R: AsyncBufRead + Unpin + Send,
{
    println!("{}", app.view().render());
    println!("{}", HELP);

    loop {
        if let Some(notice) = app.notification() {
            println!("{}", notice);
        }
        let Some(line) = input.ask("birdwatch> ").await? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        match command {
            ShellCommand::Empty => {}
            ShellCommand::List => println!("{}", app.view().render()),
            ShellCommand::Sort(column) => {
                app.select_sort(column);
                println!("{}", app.view().render());
            }
            ShellCommand::Add => {
                if !fill_form(app, input).await? {
                    break;
                }
                app.add().await;
            }
            ShellCommand::Delete(ids) => {
                app.remove_many(&ids, input).await;
            }
            ShellCommand::Reload => {
                if app.load().await {
                    println!("{}", app.view().render());
                }
            }
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Quit => break,
        }
    }

    Ok(())
}

/// Prompts for each form field. `false` if input ran out part way.
async fn fill_form<G, R>(
    app: &mut App<G>,
    input: &mut LinePrompt<R>,
) -> Result<bool, Box<dyn std::error::Error>>
where
    G: ObservationGateway,
    R: AsyncBufRead + Unpin + Send,
{
    let Some(name) = input.ask("name: ").await? else {
        return Ok(false);
    };
    app.form_mut().name = name;

    let rarity = loop {
        let Some(answer) = input.ask("rarity [common/rare/extremely rare]: ").await? else {
            return Ok(false);
        };
        if answer.trim().is_empty() {
            break Rarity::default();
        }
        match answer.parse::<Rarity>() {
            Ok(rarity) => break rarity,
            Err(message) => println!("{}", message),
        }
    };
    app.form_mut().rarity = rarity;

    let Some(notes) = input.ask("notes: ").await? else {
        return Ok(false);
    };
    app.form_mut().notes = notes;
    Ok(true)
}
