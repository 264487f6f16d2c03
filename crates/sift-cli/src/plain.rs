//! Plain-terminal modes: one-shot questions and the stdin/stdout REPL

use sift_chat::{
    Cell, ChatWorkflow, EntryBody, EntryId, MessageEntry, Renderer, Role, Session, TableView,
    Transcript,
};
use std::io::Write as _;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Ask one question and print the rendered transcript
pub async fn run_once(workflow: &ChatWorkflow, question: &str) -> anyhow::Result<()> {
    let mut session = Session::new();
    let mut log = Transcript::new();
    workflow.submit(&mut session, &mut log, question).await;
    print!("{}", render_entries(log.entries()));
    Ok(())
}

/// Interactive stdin/stdout loop without the TUI
pub async fn run_repl(workflow: &ChatWorkflow) -> anyhow::Result<()> {
    let mut session = Session::new();
    let mut renderer = PrintRenderer::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("sift - type a question, /reset to start over, /quit to exit");
    loop {
        print!("sift> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "/quit" | "/exit" => break,
            "/reset" => {
                workflow.reset(&mut session, &mut renderer);
                println!("(conversation reset)");
            }
            input => {
                workflow.submit(&mut session, &mut renderer, input).await;
            }
        }
    }
    Ok(())
}

/// Renderer that prints each entry as it is appended.
///
/// A terminal can't unprint, so loading placeholders are swallowed instead
/// of printed and `remove` only updates the id bookkeeping.
#[derive(Default)]
struct PrintRenderer {
    ids: Vec<EntryId>,
}

impl Renderer for PrintRenderer {
    fn append(&mut self, entry: MessageEntry) {
        if !entry.is_loading() {
            print!("{}", render_entry(&entry));
        }
        self.ids.push(entry.id.clone());
    }

    fn remove(&mut self, id: &EntryId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|e| e != id);
        self.ids.len() != before
    }

    fn clear(&mut self) {
        self.ids.clear();
    }
}

/// Format a whole transcript for stdout
pub fn render_entries(entries: &[MessageEntry]) -> String {
    entries.iter().map(render_entry).collect()
}

fn render_entry(entry: &MessageEntry) -> String {
    match (&entry.role, &entry.body) {
        (Role::User, EntryBody::Text { text }) => format!("> {}\n", text),
        (Role::Error, EntryBody::Text { text }) => format!("error: {}\n", text),
        (_, EntryBody::Text { text }) => format!("{}\n", text),
        (_, EntryBody::Loading { .. }) => String::new(),
        (_, EntryBody::Table { table }) => render_table(table),
        (_, EntryBody::FollowUps { questions }) => {
            let mut out = String::from("Suggested follow-ups:\n");
            for (i, q) in questions.iter().enumerate() {
                out.push_str(&format!("  [{}] {}\n", i + 1, q));
            }
            out
        }
    }
}

fn render_table(table: &TableView) -> String {
    let widths = column_widths(table);
    let mut out = String::new();

    let header: Vec<String> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| pad(c, widths[i]))
        .collect();
    out.push_str(&format!("  {}\n", header.join("  ")));

    for row in &table.rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| pad(cell.as_str().unwrap_or("–"), widths.get(i).copied().unwrap_or(0)))
            .collect();
        out.push_str(&format!("  {}\n", cells.join("  ")));
    }

    out.push_str(&format!("  {}\n", table.footer()));
    out
}

fn column_widths(table: &TableView) -> Vec<usize> {
    let column_count = table
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(table.columns.len()))
        .max()
        .unwrap_or(0);

    (0..column_count)
        .map(|i| {
            let header = table.columns.get(i).map_or(0, |c| c.chars().count());
            let cells = table
                .rows
                .iter()
                .map(|row| match row.get(i) {
                    Some(Cell::Text { text }) => text.chars().count(),
                    Some(Cell::Null) => 1,
                    None => 0,
                })
                .max()
                .unwrap_or(0);
            header.max(cells)
        })
        .collect()
}

fn pad(text: &str, width: usize) -> String {
    format!("{:<width$}", text, width = width)
}
