use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseEventKind,
    },
    execute, terminal,
};
use log::{error, info};
use std::io::{self, stdout};
use std::path::Path;
use std::time::{Duration, Instant};

use shuriken::audio::Speaker;
use shuriken::highscore::FileStore;
use shuriken::render::TerminalScreen;
use shuriken::settings::{HIGH_SCORE_FILE, LOG_FILE, SETTINGS_FILE};
use shuriken::{FrameDriver, Settings};

/// What one input event asks the loop to do.
enum Action {
    Flap,
    ToggleSound,
    Quit,
    Resize(u16, u16),
    None,
}

fn action(ev: Event) -> Action {
    match ev {
        Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => Action::Flap,
            KeyCode::Char('m') => Action::ToggleSound,
            _ => Action::None,
        },
        // Mouse clicks and touch taps both arrive as button presses
        Event::Mouse(m) if matches!(m.kind, MouseEventKind::Down(_)) => Action::Flap,
        Event::Resize(c, r) => Action::Resize(c, r),
        _ => Action::None,
    }
}

fn main() -> io::Result<()> {
    let settings_path = Path::new(SETTINGS_FILE);
    let mut settings = Settings::load(settings_path);
    settings.apply_args(std::env::args().skip(1));

    if let Err(e) = simple_logging::log_to_file(LOG_FILE, settings.level_filter()) {
        eprintln!("could not open {}: {}", LOG_FILE, e);
    }
    info!("Starting shuriken-tui");

    let seed = settings.seed.unwrap_or_else(rand::random);
    info!("RNG seed {}", seed);
    let speaker = Speaker::open(settings.sound_enabled, settings.volume);

    terminal::enable_raw_mode()?;
    let mut out = stdout();
    let result = play(&mut out, seed, speaker, &settings, settings_path);
    let restored = cleanup(&mut out);

    if let Err(e) = &result {
        error!("Terminal error: {}", e);
    }
    info!("Exiting");
    result.and(restored)
}

/// Everything between entering and leaving raw mode. Any error returns to
/// `main`, which restores the terminal before reporting it.
fn play(
    out: &mut io::Stdout,
    seed: u64,
    speaker: Speaker,
    settings: &Settings,
    settings_path: &Path,
) -> io::Result<()> {
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
        EnableMouseCapture,
    )?;

    let (cols, rows) = terminal::size()?;
    let screen = TerminalScreen::new(stdout(), cols, rows);
    let store = FileStore::new(HIGH_SCORE_FILE);
    let mut game = FrameDriver::new(seed, screen, speaker, store);
    run(&mut game, settings, settings_path)
}

fn cleanup(out: &mut io::Stdout) -> io::Result<()> {
    execute!(
        out,
        DisableMouseCapture,
        terminal::LeaveAlternateScreen,
        cursor::Show,
        terminal::EnableLineWrap,
    )?;
    terminal::disable_raw_mode()
}

fn run(
    game: &mut FrameDriver<TerminalScreen<io::Stdout>, Speaker, FileStore>,
    settings: &Settings,
    settings_path: &Path,
) -> io::Result<()> {
    let frame_dur = Duration::from_secs_f64(1.0 / settings.fps as f64);

    loop {
        let frame_start = Instant::now();

        while event::poll(Duration::ZERO)? {
            match action(event::read()?) {
                Action::Quit => return Ok(()),
                Action::Flap => game.flap(),
                Action::ToggleSound => {
                    // Persist only the mute state, not one-off command-line flags
                    let mut stored = Settings::load(settings_path);
                    stored.sound_enabled = game.cues_mut().toggle();
                    stored.save(settings_path);
                }
                Action::Resize(c, r) => game.screen_mut().resize(c, r),
                Action::None => {}
            }
        }

        game.frame()?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}
