//! هَوَسْ (Hawas) terminal client.
//!
//! Onboarding, a home screen with the recent-rounds chart, and rounds of
//! "find the invented statement".
//!
//! # Headless Mode
//!
//! Run with `--headless` for a line-oriented interface over stdin/stdout:
//!
//! ```bash
//! cargo run -p hawas -- --headless --offline --name "ليلى"
//! ```

mod app;
mod events;
mod headless;
mod onboarding;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use claude::Claude;
use crossterm::{
    event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use hawas_core::{
    ClaudeFactChecker, ClaudeNoteGenerator, FactChecker, GameConfig, GameSession, NoteGenerator,
    OfflineNoteGenerator, PlayerData, QuestionBank, ScoreEntry, SourceFactChecker,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use app::App;
use events::{handle_event, EventResult};
use ui::render::render;

#[derive(Parser, Debug)]
#[command(
    name = "hawas",
    version,
    about = "هَوَسْ - spot the invented statement among true ones"
)]
struct Args {
    /// Game settings (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Question bank (JSON); the built-in sample bank is used otherwise
    #[arg(long)]
    questions: Option<PathBuf>,

    /// Past round scores (JSON array of {score, date}) for the home chart
    #[arg(long)]
    history: Option<PathBuf>,

    /// Where TUI mode writes its log
    #[arg(long, default_value = "hawas.log")]
    log_file: PathBuf,

    /// Text interface on stdin/stdout instead of the TUI
    #[arg(long)]
    headless: bool,

    /// Player name
    #[arg(long, default_value = "لاعب")]
    name: String,

    /// Don't call Claude; use the fallback note and authored sources only
    #[arg(long)]
    offline: bool,
}

/// Everything loaded before the first screen.
pub struct Setup {
    pub session: GameSession,
    pub username: String,
    pub note_generator: Arc<dyn NoteGenerator>,
    pub fact_checker: Arc<dyn FactChecker>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(&args)?;

    let setup = load_setup(&args)?;

    if args.headless {
        return headless::run_headless(setup).await;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, App::new(setup)).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.context("terminal client failed")
}

fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("hawas=info,hawas_core=info"));

    if args.headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        // The alternate screen owns stdout and stderr.
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&args.log_file)
            .with_context(|| format!("opening log file {}", args.log_file.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Arc::new(file))
            .init();
    }
    Ok(())
}

fn load_setup(args: &Args) -> Result<Setup> {
    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    let bank = match &args.questions {
        Some(path) => QuestionBank::load(path)
            .with_context(|| format!("loading question bank {}", path.display()))?,
        None => QuestionBank::sample(),
    };

    let history = match &args.history {
        Some(path) => load_history(path)?,
        None => Vec::new(),
    };

    let (note_generator, fact_checker) = collaborators(args.offline);

    tracing::info!(
        questions = bank.question_count(),
        history = history.len(),
        offline = args.offline,
        "setup loaded"
    );

    let session = GameSession::new(config, bank, PlayerData::new(args.name.clone()))
        .context("starting game session")?
        .with_history(history);

    Ok(Setup {
        session,
        username: args.name.clone(),
        note_generator,
        fact_checker,
    })
}

fn load_history(path: &Path) -> Result<Vec<ScoreEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading score history {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing score history {}", path.display()))
}

fn collaborators(offline: bool) -> (Arc<dyn NoteGenerator>, Arc<dyn FactChecker>) {
    if offline {
        return (Arc::new(OfflineNoteGenerator), Arc::new(SourceFactChecker));
    }
    match Claude::from_env() {
        Ok(client) => (
            Arc::new(ClaudeNoteGenerator::new(client.clone())),
            Arc::new(ClaudeFactChecker::new(client)),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Claude unavailable, running offline");
            (Arc::new(OfflineNoteGenerator), Arc::new(SourceFactChecker))
        }
    }
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| render(f, &mut app))?;

        // Results of background work
        app.drain_worker();

        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;
            match handle_event(&mut app, ev) {
                EventResult::Quit => return Ok(()),
                EventResult::NeedsRedraw | EventResult::Continue => {}
            }
        } else {
            app.tick();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
