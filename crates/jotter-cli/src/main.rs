//! jotter: command-line shell for a notes Data API.
//!
//! Every subcommand maps onto one `NotebookService` entry point and prints
//! the rendered result to stdout. Failures are printed to stderr as
//! actionable messages and the process exits non-zero.

mod dates;
mod report;
mod telemetry;

use std::io::Read;
use std::process::ExitCode;

use clap::{ArgGroup, Parser, Subcommand};
use tracing::{error, info};

use jotter_client::{DataApiBackend, DataApiConfig};
use jotter_core::{
    CollectionFilter, Error, FolderDraft, FolderPatch, ListNotesRequest, NoteDraft, NoteOrder,
    NotePatch, OrderDir, Result,
};
use jotter_ops::NotebookService;

#[derive(Parser)]
#[command(name = "jotter")]
#[command(author, version, about = "Browse and edit notebooks through the notes Data API")]
#[command(propagate_version = true)]
struct Cli {
    /// Data API base URL (overrides JOTTER_API_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Data API token (overrides JOTTER_API_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the notebook hierarchy
    Tree,

    /// Show one notebook with its sub-notebooks and notes
    Notebook {
        /// Notebook id
        id: String,
    },

    /// Show one note
    Note {
        /// Note id
        id: String,
    },

    /// Show several notes
    Notes {
        /// Note ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<String>,
    },

    /// List notes one page at a time
    #[command(group(ArgGroup::new("scope").args(["notebook", "search"])))]
    List {
        /// Only notes in this notebook
        #[arg(long)]
        notebook: Option<String>,

        /// Full-text search query
        #[arg(short, long)]
        search: Option<String>,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Notes per page (1-100)
        #[arg(short, long, default_value_t = 25)]
        limit: u32,

        /// Sort field: title, created_time, updated_time or todo_due
        #[arg(long)]
        order_by: Option<NoteOrder>,

        /// Sort direction: ASC or DESC
        #[arg(long)]
        order_dir: Option<OrderDir>,
    },

    /// Create a note
    CreateNote {
        #[arg(short, long)]
        title: String,

        /// Note body; "-" reads it from stdin
        #[arg(short, long)]
        body: Option<String>,

        /// Destination notebook id
        #[arg(short, long)]
        notebook: Option<String>,

        /// Create as a to-do
        #[arg(long)]
        todo: bool,

        /// Due date (RFC 3339, YYYY-MM-DD or epoch milliseconds); implies --todo
        #[arg(long, value_parser = dates::parse_due)]
        due: Option<i64>,
    },

    /// Change fields of a note; omitted fields are left untouched
    UpdateNote {
        /// Note id
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        /// New body; "-" reads it from stdin
        #[arg(short, long)]
        body: Option<String>,

        /// Move to this notebook
        #[arg(short, long)]
        notebook: Option<String>,

        /// Turn the note into a to-do (true) or a plain note (false)
        #[arg(long)]
        todo: Option<bool>,

        /// Mark the to-do completed (true) or open (false)
        #[arg(long)]
        completed: Option<bool>,

        /// Due date, or "none" to clear it
        #[arg(long, value_parser = dates::parse_due)]
        due: Option<i64>,
    },

    /// Delete a note
    DeleteNote {
        /// Note id
        id: String,
    },

    /// Create a notebook
    CreateFolder {
        #[arg(short, long)]
        title: String,

        /// Parent notebook id (top level when omitted)
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Rename and/or move a notebook
    #[command(group(ArgGroup::new("destination").args(["parent", "root"])))]
    UpdateFolder {
        /// Notebook id
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        /// Move under this notebook
        #[arg(short, long)]
        parent: Option<String>,

        /// Move to the top level
        #[arg(long)]
        root: bool,
    },

    /// Delete a notebook
    DeleteFolder {
        /// Notebook id
        id: String,
    },

    /// Check that the Data API answers
    Ping,
}

/// Read `-` as stdin, pass anything else through.
fn body_arg(body: Option<String>) -> Result<Option<String>> {
    match body.as_deref() {
        Some("-") => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| Error::validation(format!("failed to read body from stdin: {}", e)))?;
            Ok(Some(text))
        }
        _ => Ok(body),
    }
}

fn connect(url: Option<String>, token: Option<String>) -> Result<DataApiBackend> {
    let mut config = DataApiConfig::from_env()?;
    if let Some(url) = url {
        config.base_url = url;
    }
    if let Some(token) = token {
        config.token = Some(token);
    }
    DataApiBackend::new(config)
}

async fn ping(backend: &DataApiBackend) -> Result<String> {
    let url = &backend.config().base_url;
    if backend.health_check().await? {
        Ok(format!("Data API is reachable at {}\n", url))
    } else {
        Err(Error::BackendUnavailable(format!("no answer from {}", url)))
    }
}

async fn run(service: &NotebookService<DataApiBackend>, command: Commands) -> Result<String> {
    match command {
        Commands::Tree => service.list_notebook_tree().await,
        Commands::Notebook { id } => service.read_notebook(&id).await,
        Commands::Note { id } => service.read_note(&id).await,
        Commands::Notes { ids } => service.read_notes(&ids).await,
        Commands::List {
            notebook,
            search,
            page,
            limit,
            order_by,
            order_dir,
        } => {
            let filter = match (notebook, search) {
                (Some(id), _) => CollectionFilter::InFolder(id),
                (None, Some(query)) => CollectionFilter::Search(query),
                (None, None) => CollectionFilter::All,
            };
            service
                .list_notes(ListNotesRequest {
                    filter,
                    page,
                    page_size: limit,
                    order_by,
                    order_dir,
                })
                .await
        }
        Commands::CreateNote {
            title,
            body,
            notebook,
            todo,
            due,
        } => {
            let draft = NoteDraft {
                title,
                body: body_arg(body)?,
                parent_id: notebook,
                is_todo: todo.then_some(true),
                todo_due: due,
            };
            service.create_note(draft).await
        }
        Commands::UpdateNote {
            id,
            title,
            body,
            notebook,
            todo,
            completed,
            due,
        } => {
            let patch = NotePatch {
                title,
                body: body_arg(body)?,
                parent_id: notebook,
                is_todo: todo,
                todo_completed: completed,
                todo_due: due,
            };
            service.update_note(&id, patch).await
        }
        Commands::DeleteNote { id } => service.delete_note(&id).await,
        Commands::CreateFolder { title, parent } => {
            service
                .create_folder(FolderDraft {
                    title,
                    parent_id: parent,
                })
                .await
        }
        Commands::UpdateFolder {
            id,
            title,
            parent,
            root,
        } => {
            let parent_id = if root { Some(String::new()) } else { parent };
            service
                .update_folder(&id, FolderPatch { title, parent_id })
                .await
        }
        Commands::DeleteFolder { id } => service.delete_folder(&id).await,
        Commands::Ping => ping(service.backend()).await,
    }
}

async fn execute(cli: Cli) -> Result<String> {
    let backend = connect(cli.url, cli.token)?;
    let page_limit = backend.config().page_limit;
    let service = NotebookService::new(backend).with_page_limit(page_limit);
    run(&service, cli.command).await
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = telemetry::init();

    match execute(cli).await {
        Ok(text) => {
            print!("{}", text);
            if !text.ends_with('\n') {
                println!();
            }
            info!("Command completed");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(kind = ?e.kind(), error = %e, "Command failed");
            eprintln!("{}", report::describe_error(&e));
            Ok(ExitCode::FAILURE)
        }
    }
}
