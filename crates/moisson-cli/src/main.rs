//! `moisson` — terminal UI for watching reference harvesting.
//!
//! # Usage
//!
//! ```
//! moisson --api-url http://localhost:8000
//! moisson --config ~/.config/moisson/config.toml
//! moisson history 42
//! ```

mod app;
mod form;
mod ui;

use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;

use moisson_client::{
  api::HarvestApi,
  http::{ApiConfig, HttpApi},
};
use moisson_core::memory::FormMemory;
use moisson_store_sqlite::SqliteFormMemory;

use app::App;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "moisson", about = "Watch reference harvesting converge")]
struct Args {
  /// Path to a TOML config file (api_url, store_path, harvesters).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the retrieval service (default: http://localhost:8000).
  #[arg(long, env = "MOISSON_API_URL")]
  api_url: Option<String>,

  /// SQLite file remembering the last form values.
  #[arg(long, env = "MOISSON_STORE")]
  store: Option<PathBuf>,

  /// Harvesters offered in the form (repeatable).
  #[arg(long = "harvester")]
  harvesters: Vec<String>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print a past retrieval as JSON and exit.
  History {
    /// The retrieval id.
    id: i64,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  api_url:    String,
  #[serde(default)]
  store_path: String,
  #[serde(default)]
  harvesters: Vec<String>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_url = args
    .api_url
    .or_else(|| (!file_cfg.api_url.is_empty()).then(|| file_cfg.api_url.clone()))
    .unwrap_or_else(|| "http://localhost:8000".to_string());
  let store_path = args
    .store
    .or_else(|| {
      (!file_cfg.store_path.is_empty())
        .then(|| PathBuf::from(&file_cfg.store_path))
    })
    .unwrap_or_else(|| PathBuf::from("moisson-form.db"));
  let harvesters = if !args.harvesters.is_empty() {
    args.harvesters.clone()
  } else if !file_cfg.harvesters.is_empty() {
    file_cfg.harvesters.clone()
  } else {
    vec![
      "hal".to_owned(),
      "idref".to_owned(),
      "scanr".to_owned(),
      "openalex".to_owned(),
    ]
  };

  let api = HttpApi::new(ApiConfig { base_url: api_url })
    .context("building HTTP client")?;

  // Non-interactive history lookup.
  if let Some(Command::History { id }) = args.command {
    tracing_subscriber::fmt()
      .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
      .init();
    let retrieval = api
      .retrieval(id)
      .await
      .with_context(|| format!("fetching retrieval {id}"))?;
    println!("{}", serde_json::to_string_pretty(&retrieval)?);
    return Ok(());
  }

  let memory = SqliteFormMemory::open(&store_path)
    .await
    .with_context(|| format!("opening form store {}", store_path.display()))?;

  let mut app = App::new(api, memory, &harvesters);
  app.init().await;

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop<M: FormMemory>(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<M>,
) -> Result<()> {
  loop {
    // Apply payloads the controller task produced since the last tick.
    app.pump();

    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(evt) = maybe_event {
      match evt {
        Event::Key(key) => {
          if !app.handle_key(key).await {
            break;
          }
        }
        Event::Resize(_, _) => {
          // Terminal will redraw on next iteration.
        }
        _ => {}
      }
    }
  }

  Ok(())
}
