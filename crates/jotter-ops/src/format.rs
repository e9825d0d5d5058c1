//! Plain-text rendering of records and mutation outcomes.

use std::fmt::{self, Write as _};

use chrono::{DateTime, Utc};

use jotter_core::defaults::BODY_PREVIEW_CHARS;
use jotter_core::{CollectionFilter, FolderRecord, ItemKind, ListNotesRequest, NoteRecord, Page};

use crate::gate::{MutationAction, MutationOutcome};

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn noun(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Folder => "notebook",
        ItemKind::Note => "note",
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("1 {}", word)
    } else {
        format!("{} {}s", count, word)
    }
}

/// Checkbox marker for to-dos, empty for plain notes.
fn todo_marker(note: &NoteRecord) -> &'static str {
    match (note.is_todo, note.is_completed()) {
        (false, _) => "",
        (true, false) => "[ ] ",
        (true, true) => "[x] ",
    }
}

fn preview(body: &str) -> Option<String> {
    let line = body.lines().map(str::trim).find(|l| !l.is_empty())?;
    let mut text: String = line.chars().take(BODY_PREVIEW_CHARS).collect();
    if line.chars().count() > BODY_PREVIEW_CHARS {
        text.push_str("...");
    }
    Some(text)
}

/// One summary line for listings.
pub fn render_note_line(note: &NoteRecord) -> String {
    let mut line = format!(
        "{}Note: \"{}\" (note_id: \"{}\")",
        todo_marker(note),
        note.title,
        note.id
    );
    if let Some(due) = note.due() {
        let _ = write!(line, " due {}", format_timestamp(due));
    }
    line
}

/// Full note with metadata header and body.
pub fn render_note(note: &NoteRecord, notebook_title: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Note: \"{}\"", note.title);
    let _ = writeln!(out, "Note ID: {}", note.id);

    match (&note.parent_id, notebook_title) {
        (Some(_), Some(title)) => {
            let _ = writeln!(out, "Notebook: \"{}\"", title);
        }
        (Some(parent), None) => {
            let _ = writeln!(out, "Notebook ID: {}", parent);
        }
        (None, _) => {}
    }

    if note.is_todo {
        let status = match note.completed_at() {
            Some(done) => format!("completed {}", format_timestamp(done)),
            None => "open".to_string(),
        };
        let _ = writeln!(out, "To-do: {}", status);
        if let Some(due) = note.due() {
            let _ = writeln!(out, "Due: {}", format_timestamp(due));
        }
    }
    if let Some(created) = note.created() {
        let _ = writeln!(out, "Created: {}", format_timestamp(created));
    }
    if let Some(updated) = note.updated() {
        let _ = writeln!(out, "Updated: {}", format_timestamp(updated));
    }

    out.push('\n');
    if note.body.trim().is_empty() {
        out.push_str("(empty note)\n");
    } else {
        out.push_str(&note.body);
        if !note.body.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Notebook with its sub-notebooks and notes.
///
/// `subfolders` is `None` when they could not be listed.
pub fn render_notebook(
    folder: &FolderRecord,
    parent_title: Option<&str>,
    subfolders: Option<&[FolderRecord]>,
    notes: &[NoteRecord],
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Notebook: \"{}\" (notebook_id: \"{}\")",
        folder.title, folder.id
    );
    match (&folder.parent_id, parent_title) {
        (None, _) => out.push_str("Location: top level\n"),
        (Some(_), Some(title)) => {
            let _ = writeln!(out, "Inside: \"{}\"", title);
        }
        (Some(parent), None) => {
            let _ = writeln!(out, "Inside notebook_id: \"{}\"", parent);
        }
    }

    match subfolders {
        Some([]) => {}
        Some(children) => {
            let _ = writeln!(out, "\nSub-notebooks ({}):", children.len());
            for child in children {
                let _ = writeln!(
                    out,
                    "  Notebook: \"{}\" (notebook_id: \"{}\")",
                    child.title, child.id
                );
            }
        }
        None => out.push_str("\nSub-notebooks: unavailable\n"),
    }

    if notes.is_empty() {
        out.push_str("\nNo notes in this notebook.\n");
    } else {
        let _ = writeln!(out, "\nNotes ({}):", notes.len());
        for note in notes {
            let _ = writeln!(out, "  {}", render_note_line(note));
        }
    }
    out
}

/// One page of the note listing, with paging hints.
pub fn render_note_page(page: &Page<NoteRecord>, req: &ListNotesRequest) -> String {
    let mut out = String::new();
    let scope = match &req.filter {
        CollectionFilter::All => "All notes".to_string(),
        CollectionFilter::InFolder(id) => format!("Notes in notebook_id \"{}\"", id),
        CollectionFilter::Search(query) => format!("Notes matching \"{}\"", query),
    };

    if page.items.is_empty() {
        let _ = writeln!(out, "{}: no notes on page {}.", scope, req.page);
        return out;
    }

    let _ = write!(out, "{} (page {}, {} shown", scope, req.page, page.items.len());
    if let Some(total) = page.total {
        let _ = write!(out, " of {}", total);
    }
    out.push_str("):\n");

    for note in &page.items {
        let _ = writeln!(out, "  {}", render_note_line(note));
        if let Some(text) = preview(&note.body) {
            let _ = writeln!(out, "    {}", text);
        }
    }
    if page.has_more {
        let _ = writeln!(out, "More notes available: request page {}.", req.page + 1);
    }
    out
}

/// Joins rendered notes and lists the ids that were not found.
pub fn render_note_batch(rendered: &[String], missing: &[String]) -> String {
    let mut out = rendered.join("\n---\n\n");
    if !missing.is_empty() {
        if !out.is_empty() {
            out.push_str("\n---\n\n");
        }
        let _ = writeln!(out, "Not found ({}):", missing.len());
        for id in missing {
            let _ = writeln!(out, "  note_id: \"{}\"", id);
        }
    }
    out
}

impl fmt::Display for MutationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = noun(self.kind);
        let mut head = noun.to_string();
        if let Some(c) = head.get_mut(0..1) {
            c.make_ascii_uppercase();
        }
        write!(f, "{} {}", head, self.action)?;
        if let Some(title) = &self.title {
            write!(f, ": \"{}\"", title)?;
        }
        write!(f, " ({}_id: \"{}\")", noun, self.id)?;

        if let Some(dest) = &self.destination {
            let verb = match self.action {
                MutationAction::Created => "in",
                _ => "moved to",
            };
            match (dest.id.is_empty(), &dest.title) {
                (true, _) if self.kind == ItemKind::Folder => write!(f, ", {} the top level", verb)?,
                (true, _) => write!(f, ", {} the default notebook", verb)?,
                (false, Some(title)) => write!(f, ", {} notebook \"{}\"", verb, title)?,
                (false, None) => write!(f, ", {} notebook_id \"{}\"", verb, dest.id)?,
            }
        }

        if !self.fields.is_empty() {
            write!(f, "; changed: {}", self.fields.join(", "))?;
        }
        if let Some(contents) = &self.contents {
            write!(
                f,
                "; it contained {} and {}",
                plural(contents.notes, "note"),
                plural(contents.subfolders, "sub-notebook")
            )?;
        }
        if let Some(warning) = &self.warning {
            write!(f, "; warning: {}", warning)?;
        }
        Ok(())
    }
}
