//! Main entry point for the Facecard editor

use std::{
    io::{self, Stdout},
    panic,
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use facecard::{
    avatar::{load_avatar_file, CropSession},
    config::Config,
    export::{
        ExportFormat, ExportJob, ExportMode, ExportPipeline, ExportSettings, EXPORT_FAILED_MESSAGE,
    },
    input::handle_event,
    logging::{self, LogTarget},
    model::{CardPatch, Layout, ViewMode},
    platform::{DirectorySink, JsonFileStorage},
    preview,
    render::fonts::Fonts,
    seed,
    state::AppState,
    store::EditorStore,
    ui,
    worker::{spawn_export_worker, WorkerHandle},
};

/// Target frame time for 60 FPS
const FRAME_TIME_MS: u64 = 16;

/// Terminal card editor with live preview and PNG/SVG export
#[derive(Parser, Debug)]
#[command(name = "facecard", version, about)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// One card or a before/after pair
    #[arg(long, value_enum)]
    layout: Option<Layout>,

    /// Export without starting the editor
    #[arg(long, value_enum)]
    export: Option<ExportMode>,

    /// Output format for --export (comparison exports are always PNG)
    #[arg(long, value_enum, default_value_t = ExportFormat::Png)]
    format: ExportFormat,

    /// Directory export files are written to
    #[arg(long)]
    output: Option<PathBuf>,

    /// Image to use as the avatar on every card
    #[arg(long)]
    avatar: Option<PathBuf>,

    /// Discard the saved editor state and start from the seed cards
    #[arg(long)]
    reset: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };
    let mut config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: {e:#}; using defaults");
            Config::default()
        }
    };
    // First run: write the defaults out so they can be edited.
    if !config_path.exists() {
        if let Err(e) = config.save_to(&config_path) {
            eprintln!("Warning: {e:#}");
        }
    }
    if let Some(layout) = cli.layout {
        config.editor.layout = layout;
    }
    if let Some(output) = &cli.output {
        config.export.output_dir = Some(output.clone());
    }

    let target = if cli.export.is_some() {
        LogTarget::Stderr
    } else {
        LogTarget::File(config.data_dir())
    };
    if let Some(path) = logging::init(&target)? {
        info!(log = %path.display(), "facecard starting");
    }

    let storage = JsonFileStorage::new(config.data_dir());
    let seed_state = seed::initial_state(config.editor.layout);
    let mut store = if cli.reset {
        EditorStore::new(seed_state)
    } else {
        EditorStore::rehydrate(&storage, seed_state)
    };

    if let Some(path) = &cli.avatar {
        let url = load_avatar_file(path)
            .and_then(|url| CropSession::open(&url))
            .and_then(|session| session.finish())
            .with_context(|| format!("Failed to load avatar {:?}", path))?;
        for slot in store.state().cards.slots() {
            store.update(*slot, CardPatch::avatar_url(Some(url.clone())))?;
        }
    }
    if cli.reset || cli.avatar.is_some() {
        store.persist(&storage)?;
    }

    let fonts = match Fonts::load(
        config.export.font_path.as_deref(),
        config.export.bold_font_path.as_deref(),
    ) {
        Ok(fonts) => Some(fonts),
        Err(e) => {
            warn!("{e}; PNG exports with text will fail");
            None
        }
    };
    let pipeline = ExportPipeline::with_backends(
        ExportSettings::from_preferences(&config.export),
        fonts,
        Arc::new(DirectorySink::new(config.output_dir())),
    );

    if let Some(mode) = cli.export {
        return run_headless_export(&store, pipeline, mode, cli.format);
    }

    let workers = spawn_export_worker(pipeline).context("Failed to start export worker")?;
    let mut app_state = AppState::new(config, store, Box::new(storage), workers.request_tx.clone());

    install_panic_hook();
    let mut terminal = setup_terminal()?;
    let result = run_event_loop(&mut terminal, &mut app_state, &workers);
    cleanup_terminal(terminal)?;

    app_state.detach();
    workers.shutdown();
    info!("facecard exiting");

    result.map(|_| ExitCode::SUCCESS)
}

/// Mount the requested node(s) and export once, without the TUI.
fn run_headless_export(
    store: &EditorStore,
    pipeline: ExportPipeline,
    mode: ExportMode,
    format: ExportFormat,
) -> Result<ExitCode> {
    let mut state = (*store.state()).clone();
    let mode = match (state.layout(), mode) {
        (Layout::Single, ExportMode::Single) => mode,
        (Layout::Dual, ExportMode::Before | ExportMode::After | ExportMode::Comparison) => mode,
        (Layout::Single, _) => {
            warn!(%mode, "single layout has one card, exporting it instead");
            ExportMode::Single
        }
        (Layout::Dual, ExportMode::Single) => ExportMode::After,
    };
    state.mode = match mode {
        ExportMode::Single | ExportMode::After => ViewMode::After,
        ExportMode::Before => ViewMode::Before,
        ExportMode::Comparison => ViewMode::CompareSlider,
    };
    let job = ExportJob::from_mounted(&preview::mount(&state), mode, format);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()
        .context("Failed to start async runtime")?;

    match runtime.block_on(pipeline.run(job)) {
        Ok(outcome) => {
            println!("Saved {} ({} bytes)", outcome.path.display(), outcome.bytes);
            Ok(ExitCode::SUCCESS)
        }
        Err(_) => {
            eprintln!("{EXPORT_FAILED_MESSAGE}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Restore the terminal before the default hook prints the panic
fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));
}

/// Set up the terminal for TUI rendering
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn cleanup_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Main event loop - handles input, processes worker messages, renders UI
fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app_state: &mut AppState,
    workers: &WorkerHandle,
) -> Result<()> {
    let frame_duration = Duration::from_millis(FRAME_TIME_MS);
    let size = terminal.size()?;
    app_state.set_terminal_size(size.width, size.height);

    loop {
        let frame_start = Instant::now();

        app_state.refresh_preview();
        terminal.draw(|frame| ui::render(frame, app_state))?;

        // Poll for events with timeout
        let timeout = frame_duration.saturating_sub(frame_start.elapsed());
        if event::poll(timeout)? {
            handle_event(event::read()?, app_state)?;
        }

        // Process worker responses (non-blocking)
        while let Ok(response) = workers.response_rx.try_recv() {
            app_state.handle_worker_response(response);
        }

        if app_state.should_quit {
            break;
        }
    }

    Ok(())
}
