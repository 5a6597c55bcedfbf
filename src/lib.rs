pub mod board;
pub mod models;
pub mod settings;
pub mod timer;
mod utils;

use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
};

use anyhow::{Context, Result};
use log::info;
use tokio::time;

pub use board::{TableBoard, TableDisplay};
pub use models::{SessionWindow, TableBinding, TimerInputError, TimerProps};
pub use settings::{SettingsStore, TimerSettings};
pub use timer::{CursorMode, TimerController, TimerSnapshot, TimerStatus, TICK_INTERVAL};

/// Reads table bindings from a JSON file, or stdin for `None` / `-`.
pub fn read_bindings(source: Option<&str>) -> Result<Vec<TableBinding>> {
    let raw = match source {
        None | Some("-") => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read bindings from stdin")?;
            buf
        }
        Some(path) => fs::read_to_string(Path::new(path))
            .with_context(|| format!("failed to read bindings from {path}"))?,
    };

    parse_bindings(&raw)
}

pub fn parse_bindings(raw: &str) -> Result<Vec<TableBinding>> {
    serde_json::from_str(raw).context("bindings must be a JSON array of table sessions")
}

fn render(displays: &[TableDisplay], out: &mut impl Write) -> io::Result<()> {
    let width = displays
        .iter()
        .map(|display| display.table_id.chars().count())
        .max()
        .unwrap_or(0);
    for display in displays {
        writeln!(
            out,
            "{:<width$}  {}",
            display.table_id, display.snapshot.display
        )?;
    }
    writeln!(out)?;
    out.flush()
}

/// Binds every table from `args[1]` (or stdin) and prints the board once per
/// refresh period until every timer is frozen or Ctrl-C arrives.
pub async fn run(args: Vec<String>) -> Result<()> {
    utils::logging::init();

    info!("lounge-timer starting up...");

    let store = SettingsStore::new(settings::settings_path())?;
    let settings = store.settings();
    let bindings = read_bindings(args.get(1).map(String::as_str))?;
    info!("loaded {} table binding(s)", bindings.len());

    let board = TableBoard::new(settings);
    board.bind_all(bindings).await;

    let mut refresh = time::interval(TICK_INTERVAL);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = refresh.tick() => {
                let displays = board.displays().await;
                render(&displays, &mut io::stdout().lock())
                    .context("failed to write board to stdout")?;
                if board.is_all_frozen().await {
                    info!("all tables frozen; exiting");
                    break;
                }
            }
            _ = &mut shutdown => {
                info!("interrupted; stopping timers");
                break;
            }
        }
    }

    board.shutdown().await;
    Ok(())
}
