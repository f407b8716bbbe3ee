//! lineterm - interactive host for the line editor
//!
//! Runs a session on the current terminal: keys are mapped to input chunks,
//! submitted lines are echoed back with the session header, and a few
//! commands switch the session's mode and prompt.
//!
//! # Quick Start
//!
//! ```text
//! lineterm                 # Cooked mode with "> " prompt
//! lineterm -m rawecho      # Echo every keystroke
//! lineterm -t 2            # Background output every 2 seconds
//! ```
//!
//! # Commands (cooked mode)
//!
//! | Command | Action |
//! |---------|--------|
//! | mode <m> | Switch to raw, rawecho or cooked |
//! | prompt <text> | Change the prompt |
//! | clear | Clear the screen |
//! | save | Store the current prompt and mode in the config file |
//! | exit | Close the session |

use std::env;
use std::io;
use std::sync::mpsc::Receiver;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use lineterm::config::{self, Config};
use lineterm::ui::KeyMapper;
use lineterm::{
    InputMode, LineAction, Session, SessionEnv, SessionEvent, SessionHandle, SessionRegistry,
    WriterTransport,
};

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Longest wait for terminal events when no timer is due
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Command line overrides
#[derive(Default)]
struct Args {
    name: Option<String>,
    prompt: Option<String>,
    mode: Option<InputMode>,
    tick_secs: Option<u64>,
}

fn print_version() {
    eprintln!("lineterm {}", VERSION);
}

fn print_help() {
    eprintln!("lineterm {} - line editing for pseudo-terminals", VERSION);
    eprintln!();
    eprintln!("Usage: lineterm [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -n, --name <NAME>     Session name");
    eprintln!("  -p, --prompt <TEXT>   Prompt text");
    eprintln!("  -m, --mode <MODE>     Input mode: cooked, raw, rawecho");
    eprintln!("  -t, --tick <SECS>     Write a background line every SECS seconds");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Keys (cooked mode):");
    eprintln!("  Left/Right, Ctrl+B/F  Move cursor");
    eprintln!("  Home/End, Ctrl+A/E    Start / end of line");
    eprintln!("  Backspace, Ctrl+H     Delete before cursor");
    eprintln!("  Delete                Delete at cursor");
    eprintln!("  Ctrl+K                Kill to end of line");
    eprintln!("  Ctrl+U                Kill line");
    eprintln!("  Ctrl+L                Clear screen");
    eprintln!("  Ctrl+C                Interrupt");
    eprintln!("  Ctrl+D (Ctrl+Z)       End of input");
    eprintln!("  Alt+V                 Paste clipboard");
    eprintln!();
    eprintln!("Configuration: ~/.lineterm/config.toml");
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-n" | "--name" => {
                i += 1;
                let name = args.get(i).ok_or("Missing name argument")?;
                parsed.name = Some(name.clone());
            }
            "-p" | "--prompt" => {
                i += 1;
                let prompt = args.get(i).ok_or("Missing prompt argument")?;
                parsed.prompt = Some(prompt.clone());
            }
            "-m" | "--mode" => {
                i += 1;
                let mode = args.get(i).ok_or("Missing mode argument")?;
                parsed.mode = Some(mode.parse()?);
            }
            "-t" | "--tick" => {
                i += 1;
                let secs = args.get(i).ok_or("Missing tick argument")?;
                let secs = secs
                    .parse()
                    .map_err(|_| format!("Invalid tick interval: {}", secs))?;
                parsed.tick_secs = Some(secs);
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    Ok(parsed)
}

fn init_logging(level: &str) {
    let log_path = config::data_dir()
        .map(|dir| dir.join("lineterm.log"))
        .unwrap_or_else(|| std::path::PathBuf::from("lineterm.log"));

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    let mut config = Config::load();
    if let Some(name) = args.name {
        config.session.name = name;
    }
    if let Some(prompt) = args.prompt {
        config.session.prompt = prompt;
    }
    if let Some(mode) = args.mode {
        config.session.input_mode = mode;
    }
    if let Some(secs) = args.tick_secs {
        config.tick_secs = secs;
    }

    init_logging(&config.log_level);
    info!("lineterm {} starting", VERSION);
    info!(
        "Session '{}', mode {:?}, debounce {}ms",
        config.session.name, config.session.input_mode, config.debounce_ms
    );

    enable_raw_mode()?;
    if let Err(e) = execute!(io::stdout(), EnableBracketedPaste) {
        warn!("Bracketed paste unavailable: {}", e);
    }

    let result = run(&config);

    let _ = execute!(io::stdout(), DisableBracketedPaste);
    let _ = disable_raw_mode();
    if let Err(e) = &result {
        error!("Exiting with error: {}", e);
    }
    result
}

fn run(config: &Config) -> anyhow::Result<()> {
    let registry = SessionRegistry::new();
    let env = SessionEnv {
        debounce: config.debounce(),
        ..SessionEnv::default()
    };
    let transport = Box::new(WriterTransport::new(io::stdout()));
    let session = Session::create(config.session.clone(), transport, &registry, env);
    let events = session.borrow_mut().subscribe();

    // Queued until the session opens
    session
        .borrow_mut()
        .write_with_header(&format!("lineterm {} - type 'help' for commands\n", VERSION))?;
    session.borrow_mut().open()?;

    let tick = (config.tick_secs > 0).then(|| Duration::from_secs(config.tick_secs));
    let mut next_tick = tick.map(|interval| Instant::now() + interval);
    let mut ticks = 0u64;

    loop {
        if event::poll(poll_timeout(&session, next_tick))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(&session, &key),
                Event::Paste(text) => session.borrow_mut().handle_input(&text),
                _ => {}
            }
        }

        if let (Some(interval), Some(at)) = (tick, next_tick) {
            if Instant::now() >= at {
                ticks += 1;
                session
                    .borrow_mut()
                    .write_with_header(&format!("tick {}\n", ticks))?;
                next_tick = Some(at + interval);
            }
        }

        session.borrow_mut().poll_timers()?;

        if !drain_events(config, &session, &events)? {
            break;
        }
    }

    info!("Session ended");
    Ok(())
}

/// Sleep until the next prompt redraw or tick, capped at IDLE_POLL
fn poll_timeout(session: &SessionHandle, next_tick: Option<Instant>) -> Duration {
    let now = Instant::now();
    [session.borrow().next_deadline(), next_tick]
        .into_iter()
        .flatten()
        .min()
        .map(|at| at.saturating_duration_since(now))
        .unwrap_or(IDLE_POLL)
        .min(IDLE_POLL)
}

fn handle_key(session: &SessionHandle, key: &KeyEvent) {
    // Alt+V pastes the clipboard as a single chunk
    if key.code == KeyCode::Char('v') && key.modifiers == KeyModifiers::ALT {
        paste_clipboard(session);
        return;
    }

    let cooked = session.borrow().config().input_mode == InputMode::Cooked;

    // Delete has no escape binding of its own; run the action directly
    if key.code == KeyCode::Delete && cooked {
        if let Err(e) = session
            .borrow_mut()
            .apply_action(LineAction::DeleteCharAtCursor)
        {
            error!("Failed to delete: {}", e);
        }
        return;
    }

    let chunk = if cooked {
        KeyMapper::map_cooked(key)
    } else {
        KeyMapper::map(key)
    };
    if let Some(chunk) = chunk {
        session.borrow_mut().handle_input(&chunk);
    }
}

fn paste_clipboard(session: &SessionHandle) {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.get_text()) {
        Ok(text) if !text.is_empty() => session.borrow_mut().handle_input(&text),
        Ok(_) => {}
        Err(e) => error!("Failed to read clipboard: {}", e),
    }
}

/// Handle pending session events. Returns false once the session has closed.
fn drain_events(
    config: &Config,
    session: &SessionHandle,
    events: &Receiver<SessionEvent>,
) -> anyhow::Result<bool> {
    while let Ok(event) = events.try_recv() {
        match event {
            SessionEvent::Data(data) => handle_data(config, session, &data)?,
            SessionEvent::Break => session.borrow_mut().write("^C\n")?,
            SessionEvent::Eof => {
                info!("End of input");
                session.borrow_mut().close()?;
            }
            SessionEvent::Close => return Ok(false),
        }
    }
    Ok(true)
}

fn handle_data(config: &Config, session: &SessionHandle, data: &str) -> anyhow::Result<()> {
    let mode = session.borrow().config().input_mode;
    if mode != InputMode::Cooked {
        if data == "\x03" {
            switch_mode(session, InputMode::Cooked)?;
            session
                .borrow_mut()
                .write_with_header("back to cooked mode\n")?;
        } else if mode == InputMode::Raw {
            session.borrow_mut().write(&format!("{:?} ", data))?;
        }
        return Ok(());
    }

    let line = data.trim_end_matches(|c| c == '\r' || c == '\n');
    let (command, rest) = match line.split_once(' ') {
        Some((command, rest)) => (command, Some(rest)),
        None => (line, None),
    };

    match (command, rest) {
        ("", None) => {}
        ("help", _) => session.borrow_mut().write_with_header(
            "commands: mode <raw|rawecho|cooked>, prompt <text>, clear, save, exit\n",
        )?,
        ("exit", _) => session.borrow_mut().close()?,
        ("clear", _) => session.borrow_mut().clear()?,
        ("save", _) => save_config(config, session)?,
        ("mode", Some(name)) => match name.trim().parse::<InputMode>() {
            Ok(InputMode::Disabled) => session
                .borrow_mut()
                .write_with_header("disabled mode would ignore all further input\n")?,
            Ok(mode) => {
                switch_mode(session, mode)?;
                session
                    .borrow_mut()
                    .write_with_header(&format!("mode {:?} (Ctrl+C returns to cooked)\n", mode))?;
            }
            Err(e) => session.borrow_mut().write_with_header(&format!("{}\n", e))?,
        },
        ("prompt", Some(prompt)) => {
            let mut updated = session.borrow().config().clone();
            updated.prompt = prompt.to_string();
            session.borrow_mut().reconfigure(updated)?;
        }
        _ => session.borrow_mut().write_with_header(&format!("{}\n", line))?,
    }
    Ok(())
}

/// Persist the session's current prompt and mode
fn save_config(config: &Config, session: &SessionHandle) -> anyhow::Result<()> {
    let mut saved = config.clone();
    saved.session = session.borrow().config().clone();
    let message = match saved.save() {
        Ok(path) => {
            info!("Config saved to {}", path.display());
            format!("saved to {}\n", path.display())
        }
        Err(e) => {
            warn!("{}", e);
            format!("{}\n", e)
        }
    };
    session.borrow_mut().write_with_header(&message)?;
    Ok(())
}

fn switch_mode(session: &SessionHandle, mode: InputMode) -> anyhow::Result<()> {
    let mut updated = session.borrow().config().clone();
    updated.input_mode = mode;
    session.borrow_mut().reconfigure(updated)?;
    Ok(())
}
