//! Command-line front end over a SQLite-backed garden.
//!
//! # Responsibility
//! - Exercise the core note use-cases from a shell.
//! - Print results as JSON for quick inspection.
//!
//! Global options fall back to `GARDEN_DB`, `GARDEN_LOG_DIR` and
//! `GARDEN_LOG_LEVEL` from the environment.

use clap::{Parser, Subcommand};
use garden_core::db::open_db;
use garden_core::{
    default_log_level, init_logging, NewNote, NoteId, NotePatch, NoteService, NoteStore,
    SqliteNoteStore,
};
use log::error;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;

const DEFAULT_DB_FILE_NAME: &str = "garden.sqlite3";

/// Inspect and edit a garden of `[[Title]]`-linked notes
#[derive(Parser)]
#[command(name = "garden_cli")]
#[command(version)]
struct Cli {
    /// SQLite database path
    #[arg(long, env = "GARDEN_DB", default_value = DEFAULT_DB_FILE_NAME)]
    db: PathBuf,

    /// Absolute log directory; logging is off when unset
    #[arg(long, env = "GARDEN_LOG_DIR")]
    log_dir: Option<String>,

    /// Log level, defaults to `debug` in debug builds and `info` otherwise
    #[arg(long, env = "GARDEN_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Create a note, stubbing every unknown `[[Title]]`
    Create {
        /// Note content
        #[arg(default_value = "")]
        content: String,

        /// Note title, `Untitled` when omitted
        #[arg(short, long)]
        title: Option<String>,

        /// Parent note id
        #[arg(long)]
        parent: Option<NoteId>,

        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Show a note with its links and backlinks resolved
    Get { id: NoteId },

    /// Patch a note and rebuild its links; omitted fields are kept
    Update {
        id: NoteId,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        content: Option<String>,

        /// New parent note id
        #[arg(long, conflicts_with = "clear_parent")]
        parent: Option<NoteId>,

        /// Detach the note from its parent
        #[arg(long)]
        clear_parent: bool,

        /// Comma-separated tags, replacing the stored ones
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
    },

    /// Delete a note and retract its outgoing backlinks
    Delete { id: NoteId },

    /// List every note in store order
    List,

    /// Show the note a `[[title]]` marker would resolve to
    Resolve { title: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("warning: {err}");
        }
    }

    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            error!("event=cli_command module=cli status=error error={message}");
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<String, String> {
    let conn = open_db(&cli.db).map_err(|err| err.to_string())?;
    let store = SqliteNoteStore::try_new(&conn).map_err(|err| err.to_string())?;
    let mut service = NoteService::new(store);

    let value = execute(&mut service, &cli.command)?;
    serde_json::to_string_pretty(&value).map_err(|err| err.to_string())
}

fn execute<S: NoteStore>(
    service: &mut NoteService<S>,
    command: &Command,
) -> Result<Value, String> {
    match command {
        Command::Create {
            content,
            title,
            parent,
            tags,
        } => to_json(&service.create_note(NewNote {
            title: title.clone(),
            content: content.clone(),
            parent_id: *parent,
            tags: tags.clone(),
        })),
        Command::Get { id } => to_json(&service.get_note(*id)),
        Command::Update {
            id,
            title,
            content,
            parent,
            clear_parent,
            tags,
        } => {
            let parent_id = match (*parent, *clear_parent) {
                (_, true) => Some(None),
                (Some(parent), false) => Some(Some(parent)),
                (None, false) => None,
            };
            let patch = NotePatch {
                title: title.clone(),
                content: content.clone(),
                parent_id,
                tags: tags.clone(),
            };
            to_json(&service.update_note(*id, patch))
        }
        Command::Delete { id } => {
            service.delete_note(*id).map_err(|err| err.to_string())?;
            Ok(json!({ "deleted": id }))
        }
        Command::List => to_json(&service.list_notes()),
        Command::Resolve { title } => to_json(&service.find_by_title(title)),
    }
}

fn to_json<T: serde::Serialize, E: std::fmt::Display>(
    result: &Result<T, E>,
) -> Result<Value, String> {
    match result {
        Ok(value) => serde_json::to_value(value).map_err(|err| err.to_string()),
        Err(err) => Err(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{execute, Cli, Command};
    use clap::{CommandFactory, Parser};
    use garden_core::{InMemoryNoteStore, NoteService, NoteStore};

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("garden_cli").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn update_accepts_inline_flag_values() {
        let id = "6f1c2d1e-8f57-4b7a-9a43-52f0f2a4c1d9";
        let command = parse(&["update", id, "--content=see [[Home]]", "--tags", "a,b"]);
        assert_eq!(
            command,
            Command::Update {
                id: id.parse().unwrap(),
                title: None,
                content: Some("see [[Home]]".to_string()),
                parent: None,
                clear_parent: false,
                tags: Some(vec!["a".to_string(), "b".to_string()]),
            }
        );
    }

    #[test]
    fn parent_and_clear_parent_conflict() {
        let id = "6f1c2d1e-8f57-4b7a-9a43-52f0f2a4c1d9";
        let result = Cli::try_parse_from([
            "garden_cli",
            "update",
            id,
            "--parent",
            id,
            "--clear-parent",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_note_id_is_rejected_at_parse_time() {
        assert!(Cli::try_parse_from(["garden_cli", "get", "not-a-uuid"]).is_err());
    }

    #[test]
    fn create_and_update_flow_through_the_service() {
        let mut service = NoteService::new(InMemoryNoteStore::new());

        let created = execute(
            &mut service,
            &parse(&["create", "See [[Projects]]", "--title", "Home", "--tags", "inbox"]),
        )
        .unwrap();
        assert_eq!(created["title"], "Home");
        assert_eq!(created["tags"][0], "inbox");
        let home_id = created["id"].as_str().unwrap().to_string();

        let parent = execute(&mut service, &parse(&["create"])).unwrap();
        assert_eq!(parent["title"], "Untitled");
        let parent_id = parent["id"].as_str().unwrap().to_string();

        let updated = execute(
            &mut service,
            &parse(&["update", &home_id, "--parent", &parent_id]),
        )
        .unwrap();
        assert_eq!(updated["parent_id"], parent_id.as_str());
        assert_eq!(updated["content"], "See [[Projects]]");

        let cleared = execute(
            &mut service,
            &parse(&["update", &home_id, "--clear-parent"]),
        )
        .unwrap();
        assert!(cleared["parent_id"].is_null());

        // Home plus the Projects stub plus the untitled parent.
        assert_eq!(service.store().scan_notes().unwrap().len(), 3);
    }
}
