//! `docintake shell` — line-oriented interactive session.
//!
//! One `ClientState` lives for the whole shell, the way the page view
//! owns it in a browser. Commands map one-to-one onto controller operations.

use std::path::PathBuf;

use console::style;
use docintake_client::{Backend, ClientState, FieldEdit, UploadFile};
use docintake_protocol::DependentField;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

use crate::render;

const HELP: &str = "\
Commands:
  upload [path]                   upload a document (no path: nothing selected)
  show                            print the current form
  set <primary|spouse> <key> <value>
                                  edit a field, e.g. set primary \"First Name\" Jane
  dep add                         append a blank dependent
  dep set <index> <key> <value>   edit one column of a dependent
  ask <question>                  ask about the uploaded document
  transcript                      print the chat history
  status                          print upload status and session
  help                            this text
  quit                            leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    Upload(Option<PathBuf>),
    Show,
    Set {
        section: String,
        key: String,
        value: String,
    },
    DepAdd,
    DepSet {
        index: String,
        key: String,
        value: String,
    },
    Ask(String),
    Transcript,
    Status,
    Help,
    Quit,
}

/// Split on whitespace, keeping double-quoted runs together.
fn split_args(line: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err("unterminated quote".to_string());
    }
    if has_token {
        args.push(current);
    }
    Ok(args)
}

pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let trimmed = line.trim();
    if let Some(rest) = trimmed.strip_prefix("ask") {
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return Ok(ShellCommand::Ask(rest.trim().to_string()));
        }
    }

    let args = split_args(trimmed)?;
    let Some((name, rest)) = args.split_first() else {
        return Ok(ShellCommand::Empty);
    };

    match (name.as_str(), rest) {
        ("upload", []) => Ok(ShellCommand::Upload(None)),
        ("upload", [path]) => Ok(ShellCommand::Upload(Some(PathBuf::from(path)))),
        ("show", []) => Ok(ShellCommand::Show),
        ("set", [section, key, value @ ..]) if !value.is_empty() => Ok(ShellCommand::Set {
            section: section.clone(),
            key: key.clone(),
            value: value.join(" "),
        }),
        // `set primary SSN ""` clears a field
        ("set", [section, key]) => Ok(ShellCommand::Set {
            section: section.clone(),
            key: key.clone(),
            value: String::new(),
        }),
        ("dep", [sub]) if sub == "add" => Ok(ShellCommand::DepAdd),
        ("dep", [sub, index, key, value @ ..]) if sub == "set" => Ok(ShellCommand::DepSet {
            index: index.clone(),
            key: key.clone(),
            value: value.join(" "),
        }),
        ("transcript", []) => Ok(ShellCommand::Transcript),
        ("status", []) => Ok(ShellCommand::Status),
        ("help", []) | ("?", []) => Ok(ShellCommand::Help),
        ("quit", []) | ("exit", []) => Ok(ShellCommand::Quit),
        _ => Err(format!("unrecognized command: {trimmed} (try `help`)")),
    }
}

/// Run one command. Returns false when the shell should exit.
pub async fn execute(state: &mut ClientState, backend: &Backend, command: ShellCommand) -> bool {
    match command {
        ShellCommand::Empty => {}
        ShellCommand::Upload(path) => {
            let file = match path {
                Some(path) => match UploadFile::from_path(&path).await {
                    Ok(file) => Some(file),
                    Err(e) => {
                        println!(
                            "{}",
                            style(format!("Cannot read {}: {e}", path.display())).red()
                        );
                        return true;
                    }
                },
                None => None,
            };
            if let Some(file) = &file {
                println!("{}", style(format!("Uploading {}...", file.name())).dim());
            }
            let _ = state.submit_upload(backend, file).await;
            render::print_status(state);
            if state.upload_status().is_success() {
                render::print_document(state.document());
            }
        }
        ShellCommand::Show => render::print_document(state.document()),
        ShellCommand::Set {
            section,
            key,
            value,
        } => match FieldEdit::parse(&section, &key, &value).and_then(|edit| state.set_field(edit)) {
            Ok(()) => {}
            Err(e) => println!("{}", style(e).red()),
        },
        ShellCommand::DepAdd => {
            let index = state.add_dependent();
            println!("Added dependent {index}.");
        }
        ShellCommand::DepSet { index, key, value } => {
            let result = match (index.parse::<usize>(), DependentField::from_key(&key)) {
                (Ok(index), Some(field)) => state
                    .set_dependent_field(index, field, value)
                    .map_err(|e| e.to_string()),
                (Err(_), _) => Err(format!("Invalid dependent index '{index}'")),
                (_, None) => Err(format!("Unknown field '{key}' in section Dependents")),
            };
            if let Err(message) = result {
                println!("{}", style(message).red());
            }
        }
        ShellCommand::Ask(question) => {
            state.set_chat_input(question);
            let _ = state.submit_chat_input(backend).await;
            if let Some(line) = render::transcript_lines(state).last() {
                println!("{line}");
            }
        }
        ShellCommand::Transcript => render::print_transcript(state),
        ShellCommand::Status => render::print_status(state),
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Quit => return false,
    }
    true
}

pub async fn run(backend: &Backend) -> anyhow::Result<()> {
    let mut state = ClientState::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!(
        "{} (server: {}) - type `help` for commands",
        style("docintake").bold(),
        backend.config().server_url()
    );

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            Ok(command) => {
                if !execute(&mut state, backend, command).await {
                    break;
                }
            }
            Err(message) => {
                warn!(component = "shell", event = "shell.bad_command", line = %line);
                println!("{}", style(message).red());
            }
        }
    }

    Ok(())
}
