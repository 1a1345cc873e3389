mod audio;
mod audio_api;
mod board;
mod config;
mod loader;
mod orientation;
mod pad;
mod pool;
mod shared;
mod tui;
mod turntable;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossterm::event::{
    DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use audio_api::{AudioOutput, MutedOutput};
use board::Board;
use config::BoardConfig;
use shared::InputEvent;
use tui::layout::BoardLayout;

// used for decoding when there is no device to ask
const FALLBACK_SAMPLE_RATE: u32 = 44100;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let sound_dir: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    let (config, config_err) = match BoardConfig::load(&sound_dir) {
        Ok(c) => (c, None),
        Err(e) => (BoardConfig::default(), Some(e)),
    };
    init_logging(&sound_dir, &config.log_file)?;
    if let Some(e) = config_err {
        log::warn!("ignoring {}: {}", BoardConfig::config_path(&sound_dir).display(), e);
    }
    log::info!("sounds from {}", sound_dir.display());

    // no device is not fatal: the board runs silent
    let (output, sample_rate, muted): (Box<dyn AudioOutput>, u32, bool) = match audio::start_audio() {
        Ok(handle) => {
            let rate = handle.sample_rate();
            (Box::new(handle), rate, false)
        }
        Err(e) => {
            log::warn!("audio unavailable, running muted: {:#}", e);
            (Box::new(MutedOutput), FALLBACK_SAMPLE_RATE, true)
        }
    };

    let sounds = loader::sample_loader::load_sounds(&sound_dir, config.sound_names(), sample_rate);
    let mut board = Board::new(output, &config, sounds, muted);

    terminal::enable_raw_mode()?;
    let _guard = TerminalGuard; // restores the terminal however we leave
    crossterm::execute!(std::io::stdout(), EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)?;
    // real key release events where the terminal can report them
    let key_release = terminal::supports_keyboard_enhancement().unwrap_or(false);
    if key_release {
        crossterm::execute!(
            std::io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let epoch = Instant::now();
    let tick_rate = Duration::from_millis(16); // ~60fps
    let pad_keys = config.pads.iter().map(|p| p.key).collect();
    let mut tui_state = tui::mode::TuiState::new(pad_keys, key_release);

    let (cols, rows) = terminal::size()?;
    board.handle_input(InputEvent::Resize { cols, rows }, epoch.elapsed());

    loop {
        let now = epoch.elapsed();
        board.poll_audio();
        board.tick(now);

        let ds = board.display_state(now);
        let mut layout = BoardLayout::default();
        term.draw(|frame| {
            layout = BoardLayout::new(frame.area(), ds.pads.len());
            tui::view::render(frame, &ds, &layout);
        })?;
        // input resolves against exactly what was just drawn
        tui_state.screen = ds.screen;
        tui_state.layout = layout;

        let events = tui::input::poll_input(tick_rate, &mut tui_state)?;
        for event in events {
            if event == InputEvent::Quit {
                board.cancel_gestures();
                log::info!("quit");
                return Ok(());
            }
            board.handle_input(event, epoch.elapsed());
        }
    }
}

// The log goes to a file next to the sounds; the terminal belongs to the ui
fn init_logging(sound_dir: &Path, log_file: &Path) -> anyhow::Result<()> {
    let path = if log_file.is_absolute() { log_file.to_path_buf() } else { sound_dir.join(log_file) };
    let file = File::create(&path)
        .map_err(|e| anyhow::anyhow!("cannot open log file {}: {}", path.display(), e))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

struct TerminalGuard;
impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            std::io::stdout(),
            PopKeyboardEnhancementFlags,
            DisableFocusChange,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}
