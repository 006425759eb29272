//! Terminal rendering of client state.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use console::style;
use docintake_client::{ClientState, UploadStatus};
use docintake_protocol::{DependentField, FormDocument, PrimaryField, SpouseField, TurnRole};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn primary_table(doc: &FormDocument) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Primary", ""]);
    for field in PrimaryField::ALL {
        table.add_row(vec![field.key(), doc.get(field)]);
    }
    table
}

pub fn spouse_table(doc: &FormDocument) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Spouse", ""]);
    for field in SpouseField::ALL {
        table.add_row(vec![field.key(), doc.spouse.get(field)]);
    }
    table
}

pub fn dependents_table(doc: &FormDocument) -> Table {
    let mut table = new_table();
    let mut header = vec!["#"];
    header.extend(DependentField::ALL.iter().map(|f| f.key()));
    table.set_header(header);
    for (idx, dep) in doc.dependents.iter().enumerate() {
        let mut row = vec![idx.to_string()];
        row.extend(DependentField::ALL.iter().map(|f| dep.get(*f).to_string()));
        table.add_row(row);
    }
    table
}

pub fn print_document(doc: &FormDocument) {
    println!("{}", primary_table(doc));
    println!("{}", spouse_table(doc));
    if doc.dependents.is_empty() {
        println!("{}", style("No dependents.").dim());
    } else {
        println!("{}", dependents_table(doc));
    }
    for (key, value) in &doc.extra {
        println!("{} {}", style(format!("{key}:")).dim(), value);
    }
}

/// Status line in the source's colors: green for success, red otherwise.
pub fn status_line(status: &UploadStatus) -> Option<String> {
    let message = status.message();
    if message.is_empty() {
        return None;
    }
    let styled = if status.is_success() {
        style(message).green()
    } else {
        style(message).red()
    };
    Some(styled.to_string())
}

pub fn print_status(state: &ClientState) {
    if let Some(line) = status_line(state.upload_status()) {
        println!("{line}");
    }
    match state.session() {
        Some(session) => println!("{} {}", style("Session:").dim(), session.id()),
        None => println!("{}", style("No session; chat is disabled.").dim()),
    }
}

pub fn transcript_lines(state: &ClientState) -> Vec<String> {
    state
        .transcript()
        .turns()
        .iter()
        .map(|turn| {
            let who = match turn.role {
                TurnRole::User => style("you").cyan().bold(),
                TurnRole::Assistant => style("assistant").magenta().bold(),
            };
            format!("{who}: {}", turn.content)
        })
        .collect()
}

pub fn print_transcript(state: &ClientState) {
    for line in transcript_lines(state) {
        println!("{line}");
    }
    let pending = state.transcript().pending().len();
    if pending > 0 {
        println!("{}", style(format!("({pending} awaiting reply)")).dim());
    }
}
