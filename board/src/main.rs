//! Command-line front end for the board.
//!
//! Set `TIDYBOARD_SNAPSHOT_PATH` to keep the board between runs.

use anyhow::{bail, Context};
use chrono::{Duration as ChronoDuration, Utc};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tidyboard::{
    todo_cards, BoardAction, BoardConfig, BoardEnvironment, BoardReducer, BoardSelectors,
    BoardState, JsonFileStore, NewTodo, TodoId,
};
use tidyboard_core::environment::SystemClock;
use tidyboard_runtime::Store;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "tidyboard: an ordered, tagged to-do board", long_about = None)]
struct Cli {
    /// What to do before printing the board; lists when omitted.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Print the board.
    List,
    /// Add a few sample todos with deadlines.
    Demo,
    /// Add a todo at the end of the list.
    Add {
        /// Todo name.
        name: String,
        /// Optional description.
        description: Option<String>,
    },
    /// Toggle completion of a todo.
    Done {
        /// Todo id.
        id: u64,
    },
    /// Move a todo one place earlier.
    Up {
        /// Todo id.
        id: u64,
    },
    /// Move a todo one place later.
    Down {
        /// Todo id.
        id: u64,
    },
    /// Delete a todo and its tag associations.
    Rm {
        /// Todo id.
        id: u64,
    },
    /// Replace the tags of a todo.
    Tag {
        /// Todo id.
        id: u64,
        /// Tag labels; none clears the tags.
        labels: Vec<String>,
    },
}

impl Command {
    fn into_actions(self) -> Vec<BoardAction> {
        match self {
            Self::List => Vec::new(),
            Self::Demo => demo_actions(),
            Self::Add { name, description } => {
                let mut todo = NewTodo::named(name);
                if let Some(description) = description {
                    todo = todo.with_description(description);
                }
                vec![BoardAction::CreateTodo { todo }]
            },
            Self::Done { id } => vec![BoardAction::ToggleComplete { id: TodoId::new(id) }],
            Self::Up { id } => vec![BoardAction::MoveUp { id: TodoId::new(id) }],
            Self::Down { id } => vec![BoardAction::MoveDown { id: TodoId::new(id) }],
            Self::Rm { id } => vec![BoardAction::DeleteTodo { id: TodoId::new(id) }],
            Self::Tag { id, labels } => vec![BoardAction::SetTodoTags {
                todo_id: TodoId::new(id),
                labels,
            }],
        }
    }
}

type BoardStore = Store<BoardState, BoardAction, BoardEnvironment, BoardReducer>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables from .env file (if present)
    let _ = dotenvy::dotenv();

    init_tracing();
    tidyboard_runtime::metrics::register_metrics();
    tidyboard::metrics::register_metrics();

    let config = BoardConfig::from_env().context("reading configuration")?;
    let mut env = BoardEnvironment::new(Arc::new(SystemClock)).with_config(config.clone());
    if let Some(path) = &config.snapshot_path {
        info!(path = %path.display(), "Persisting board snapshots");
        env = env.with_storage(Arc::new(JsonFileStore::new(path)));
    }

    let store = Store::new(BoardState::new(), BoardReducer::new(), env);
    dispatch(&store, BoardAction::Hydrate).await?;
    if let Some(reason) = store.state(|s| s.storage_error.clone()).await {
        bail!("could not load snapshot: {reason}");
    }

    let actions = cli.command.map(Command::into_actions).unwrap_or_default();
    for action in actions {
        dispatch(&store, action).await?;
    }

    print_board(&store, &config).await;

    store.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tidyboard=info,tidyboard_runtime=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// Sends an action, waits for its effects, and surfaces a rejection as an error
async fn dispatch(store: &BoardStore, action: BoardAction) -> anyhow::Result<()> {
    let name = action.name();
    store.send(action).await?.wait().await;

    if let Some(error) = store.state(|s| s.last_error.clone()).await {
        bail!("{name} rejected: {error}");
    }
    Ok(())
}

fn demo_actions() -> Vec<BoardAction> {
    let now = Utc::now();
    vec![
        BoardAction::CreateTodo {
            todo: NewTodo::named("Buy milk").with_finish(now + ChronoDuration::hours(3)),
        },
        BoardAction::CreateTodo {
            todo: NewTodo::named("Walk dog")
                .with_description("Around the park")
                .with_finish(now + ChronoDuration::seconds(30)),
        },
        BoardAction::CreateTodo {
            todo: NewTodo::named("Pay rent").with_finish(now - ChronoDuration::hours(2)),
        },
    ]
}

async fn print_board(store: &BoardStore, config: &BoardConfig) {
    let board = store.state(|s| Arc::clone(&s.board)).await;
    let selectors = BoardSelectors::new();
    let summary = selectors.completion_summary(&board);

    println!(
        "=== Tidyboard (revision {}, {}/{} done) ===",
        board.revision(),
        summary.completed,
        summary.total
    );

    for card in todo_cards(&board, &selectors, Utc::now(), config.overdue_policy) {
        let check = if card.is_complete { "x" } else { " " };
        println!("\n[{check}] #{} {}", card.id, card.title);
        println!("    {}", card.description);
        if !card.tags.is_empty() {
            let labels: Vec<&str> = card.tags.iter().map(|t| t.label.as_str()).collect();
            println!("    tags: {}", labels.join(", "));
        }
        println!("    {}", card.created_line);
        println!("    {}", card.updated_line);
        if let Some(deadline) = &card.deadline {
            println!("    {} ({})", deadline.text, deadline.urgency);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_only_lists() {
        let cli = Cli::try_parse_from(["tidyboard"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["tidyboard", "list"]).unwrap();
        assert_eq!(cli.command, Some(Command::List));
        assert!(Command::List.into_actions().is_empty());
    }

    #[test]
    fn add_with_and_without_description() {
        let cli = Cli::try_parse_from(["tidyboard", "add", "Buy milk"]).unwrap();
        assert_eq!(
            cli.command.unwrap().into_actions(),
            [BoardAction::CreateTodo {
                todo: NewTodo::named("Buy milk"),
            }]
        );

        let cli = Cli::try_parse_from(["tidyboard", "add", "Walk dog", "Around the park"]).unwrap();
        assert_eq!(
            cli.command.unwrap().into_actions(),
            [BoardAction::CreateTodo {
                todo: NewTodo::named("Walk dog").with_description("Around the park"),
            }]
        );
    }

    #[test]
    fn id_subcommands_map_to_intents() {
        let cases = [
            ("done", BoardAction::ToggleComplete { id: TodoId::new(3) }),
            ("up", BoardAction::MoveUp { id: TodoId::new(3) }),
            ("down", BoardAction::MoveDown { id: TodoId::new(3) }),
            ("rm", BoardAction::DeleteTodo { id: TodoId::new(3) }),
        ];
        for (name, expected) in cases {
            let cli = Cli::try_parse_from(["tidyboard", name, "3"]).unwrap();
            assert_eq!(cli.command.unwrap().into_actions(), [expected]);
        }
    }

    #[test]
    fn tag_collects_every_label() {
        let cli = Cli::try_parse_from(["tidyboard", "tag", "1", "home", "errands"]).unwrap();
        assert_eq!(
            cli.command.unwrap().into_actions(),
            [BoardAction::SetTodoTags {
                todo_id: TodoId::new(1),
                labels: vec!["home".into(), "errands".into()],
            }]
        );

        let cli = Cli::try_parse_from(["tidyboard", "tag", "1"]).unwrap();
        assert_eq!(
            cli.command.unwrap(),
            Command::Tag {
                id: 1,
                labels: Vec::new()
            }
        );
    }

    #[test]
    fn non_numeric_id_is_a_usage_error() {
        assert!(Cli::try_parse_from(["tidyboard", "done", "abc"]).is_err());
        assert!(Cli::try_parse_from(["tidyboard", "frobnicate"]).is_err());
    }

    #[test]
    fn demo_adds_three_todos() {
        let actions = Command::Demo.into_actions();
        assert_eq!(actions.len(), 3);
        assert!(actions.iter().all(BoardAction::is_command));
    }
}
