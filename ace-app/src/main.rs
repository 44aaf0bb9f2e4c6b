//! ACE - Asset Comparison Engine
//!
//! Terminal front end: duplicates one texture or audio clip into copies A
//! and B, lets each copy's import settings be edited from the keyboard, and
//! plays or snapshots the comparison.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossterm::{
    cursor,
    event::{self, Event, KeyEventKind},
    queue,
    style::Print,
    terminal::{self, disable_raw_mode, enable_raw_mode, ClearType},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ace_analysis::CopyLabel;
use ace_audio::{PlaybackState, SharedSwitcher, TransportEvent};
use ace_input::{Command, InputHandler, Mode};
use ace_library::{EngineConfig, FsAssetDatabase, ImportWorker};
use ace_preview::{theme, Canvas, Rect};
use ace_session::{ClockSource, CompareError, ComparisonSession, CopyState, SessionConfig, SessionState};

/// Frame rate for UI updates
const FPS: u64 = 30;

const USAGE: &str = "usage: ace <asset> [--a key=value,...] [--b key=value,...] [--out DIR] [--snapshot]";

/// Command line arguments
#[derive(Debug, Default)]
struct Args {
    asset: PathBuf,
    /// Initial settings text for copy A
    settings_a: Option<String>,
    settings_b: Option<String>,
    out_dir: Option<PathBuf>,
    /// Write snapshots and exit without entering the interactive loop
    snapshot_only: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut parsed = Args::default();
    let mut asset = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--a" => parsed.settings_a = Some(args.next().context(USAGE)?),
            "--b" => parsed.settings_b = Some(args.next().context(USAGE)?),
            "--out" => parsed.out_dir = Some(PathBuf::from(args.next().context(USAGE)?)),
            "--snapshot" => parsed.snapshot_only = true,
            "-h" | "--help" => bail!(USAGE),
            _ if arg.starts_with("--") => bail!("unknown option {}\n{}", arg, USAGE),
            _ => asset = Some(PathBuf::from(arg)),
        }
    }

    parsed.asset = asset.context(USAGE)?;
    Ok(parsed)
}

fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1))?;

    let mut config = EngineConfig::load();
    let scratch_dir = config.scratch_dir();
    fs::create_dir_all(&scratch_dir)
        .with_context(|| format!("creating scratch dir {}", scratch_dir.display()))?;
    init_logging(&scratch_dir)?;

    let db = FsAssetDatabase::new(&scratch_dir);
    let worker = ImportWorker::spawn_with_flag(Arc::new(db.clone()), Some(db.importing_flag()))?;
    let mut session = ComparisonSession::new(
        Box::new(db),
        SessionConfig::from_engine(&config, ClockSource::Internal),
    );

    if let Err(e) = session.select_source(args.asset.clone()) {
        bail!("{}", session.notice().map(str::to_string).unwrap_or_else(|| e.to_string()));
    }
    for (label, text) in [(CopyLabel::A, &args.settings_a), (CopyLabel::B, &args.settings_b)] {
        if let Some(text) = text {
            session.configure(label, text)?;
        }
    }

    config.last_asset = Some(args.asset.clone());
    if let Err(e) = config.save() {
        warn!("could not save config: {}", e);
    }

    let out_dir = args.out_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let viewport = Rect::new(0.0, 0.0, config.viewport_width as f32, config.viewport_height as f32);

    if args.snapshot_only {
        settle(&mut session, &worker);
        for path in write_snapshots(&session, &out_dir, viewport)? {
            println!("{}", path.display());
        }
        print_stats(&session);
        session.shutdown();
        return Ok(());
    }

    // Audio output drives the transports when available
    let _stream = if session.state() == SessionState::AudioReady {
        match start_audio(session.switcher()) {
            Ok(stream) => {
                session.set_clock(ClockSource::Host);
                Some(stream)
            }
            Err(e) => {
                warn!("audio output unavailable, using internal clock: {}", e);
                None
            }
        }
    } else {
        None
    };

    enable_raw_mode()?;
    let result = run_app(&mut session, &worker, &out_dir, viewport);
    disable_raw_mode()?;
    println!();

    session.shutdown();
    result
}

fn init_logging(dir: &Path) -> anyhow::Result<()> {
    // The terminal belongs to the status line; logs go to a file
    let file = File::create(dir.join("ace.log"))?;
    let filter = EnvFilter::try_from_env("ACE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn start_audio(switcher: SharedSwitcher) -> anyhow::Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("no audio output device found")?;
    let config = device.default_output_config()?;
    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            // Never block the real-time thread; output silence on contention
            match switcher.try_lock() {
                Some(mut switcher) => switcher.render(data, channels, sample_rate),
                None => data.fill(0.0),
            }
        },
        |err| warn!("audio stream error: {}", err),
        None,
    )?;
    stream.play()?;
    info!(sample_rate, channels, "audio output started");
    Ok(stream)
}

/// Run decodes until no request is outstanding
fn settle(session: &mut ComparisonSession, worker: &ImportWorker) {
    let mut in_flight = 0usize;
    loop {
        for request in session.take_decode_requests() {
            if worker.submit(request) {
                in_flight += 1;
            }
        }
        if in_flight == 0 {
            break;
        }
        let Some(outcome) = worker.recv() else {
            break;
        };
        in_flight -= 1;
        report_decode(session.complete_decode(outcome));
    }
}

fn report_decode(result: Result<CopyLabel, CompareError>) -> Option<String> {
    match result {
        Ok(_) | Err(CompareError::StaleCallback { .. }) => None,
        Err(e) => {
            warn!("{}", e);
            Some(e.to_string())
        }
    }
}

fn run_app(
    session: &mut ComparisonSession,
    worker: &ImportWorker,
    out_dir: &Path,
    viewport: Rect,
) -> anyhow::Result<()> {
    let mut input = InputHandler::new();
    let mut message = String::from("space play  tab switch  [ ] quality  c cycle  : edit  w snapshot  q quit");
    let frame_duration = Duration::from_millis(1000 / FPS);
    let mut last_frame = Instant::now();
    let mut stdout = io::stdout();

    loop {
        for request in session.take_decode_requests() {
            worker.submit(request);
        }
        for outcome in worker.drain() {
            if let Some(msg) = report_decode(session.complete_decode(outcome)) {
                message = msg;
            }
        }

        let now = Instant::now();
        if session.tick(now - last_frame) == Some(TransportEvent::Finished) {
            message = "playback finished".to_string();
        }
        last_frame = now;

        draw_status(&mut stdout, session, &input, &message)?;

        if event::poll(frame_duration)? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let Some(cmd) = input.handle_key(key) else {
                continue;
            };
            if cmd == Command::Quit {
                break;
            }
            match handle_command(session, cmd, out_dir, viewport) {
                Ok(Some(msg)) => message = msg,
                Ok(None) => {}
                Err(e) => message = e.to_string(),
            }
        }
    }

    Ok(())
}

/// Apply a command; returns a message for the status line
fn handle_command(
    session: &mut ComparisonSession,
    cmd: Command,
    out_dir: &Path,
    viewport: Rect,
) -> anyhow::Result<Option<String>> {
    let msg = match cmd {
        Command::TogglePlayback => {
            if session.state() != SessionState::AudioReady {
                return Ok(Some("playback needs an audio clip".to_string()));
            }
            match session.toggle_playback() {
                PlaybackState::Playing => None,
                PlaybackState::Stopped => Some("stopped".to_string()),
            }
        }
        Command::SwitchChannel => Some(format!("hearing {}", session.switch_channel())),
        Command::Stop => {
            session.stop_playback();
            None
        }
        Command::Focus(label) => Some(format!("editing copy {}", label)),
        Command::Adjust(label, step) => {
            session.adjust_quality(label, step)?;
            None
        }
        Command::Cycle(label, step) => {
            session.cycle_setting(label, step)?;
            None
        }
        Command::Configure(label, text) => {
            session.configure(label, &text)?;
            Some(format!("{} <- {}", label, text))
        }
        Command::ZoomIn => {
            session.split_view_mut().handle_wheel(-1.0);
            None
        }
        Command::ZoomOut => {
            session.split_view_mut().handle_wheel(1.0);
            None
        }
        Command::MoveDivider(delta) => {
            let split = session.split_view_mut();
            let divider = split.divider();
            split.set_divider(divider + delta);
            None
        }
        Command::ResetView => {
            session.split_view_mut().reset();
            None
        }
        Command::Snapshot => {
            let written = write_snapshots(session, out_dir, viewport)?;
            Some(format!("wrote {} snapshot(s) to {}", written.len(), out_dir.display()))
        }
        Command::Quit | Command::EnterCommandMode | Command::EnterNormalMode => None,
    };
    Ok(msg)
}

/// Render the current preview and each copy's bitmap to PNG files
fn write_snapshots(session: &ComparisonSession, out_dir: &Path, viewport: Rect) -> anyhow::Result<Vec<PathBuf>> {
    let Some(source) = session.source() else {
        bail!("nothing to snapshot");
    };
    fs::create_dir_all(out_dir)?;
    let stem = source
        .path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("asset")
        .to_string();

    let commands = match session.state() {
        SessionState::TextureReady => session.texture_commands(viewport),
        SessionState::AudioReady => session
            .audio_preview(viewport)
            .map(|p| p.commands)
            .unwrap_or_default(),
        _ => bail!("nothing to snapshot"),
    };

    let mut written = Vec::new();
    let mut canvas = Canvas::new(viewport.width as u32, viewport.height as u32, theme::BACKGROUND);
    canvas.draw(&commands, |id| session.resolve_texture(id));
    let path = out_dir.join(format!("{}.preview.png", stem));
    canvas.into_image().save(&path)?;
    written.push(path);

    for label in CopyLabel::ALL {
        let (bitmap, kind) = match session.state() {
            SessionState::TextureReady => (session.texture(label), "texture"),
            _ => (session.waveform(label), "waveform"),
        };
        if let Some(bitmap) = bitmap {
            let path = out_dir.join(format!("{}.{}.{}.png", stem, label, kind));
            bitmap.save(&path)?;
            written.push(path);
        }
    }

    info!(count = written.len(), dir = %out_dir.display(), "snapshots written");
    Ok(written)
}

fn copy_summary(session: &ComparisonSession, label: CopyLabel) -> String {
    let Some(stats) = session.stats() else {
        return "-".to_string();
    };
    let stats = &stats[label.index()];
    let size = match &stats.state {
        CopyState::Pending => "importing".to_string(),
        CopyState::Ready => match (stats.imported_size, stats.ratio()) {
            (Some(size), Some(ratio)) => format!("{} ({:.0}%)", format_size(size), ratio * 100.0),
            (Some(size), None) => format_size(size),
            _ => String::new(),
        },
        CopyState::Unavailable(reason) => format!("unavailable ({})", reason),
    };
    let settings = session.settings(label).unwrap_or(stats.settings);
    format!("{} {}", settings.summary(), size)
}

fn draw_status(
    out: &mut impl Write,
    session: &ComparisonSession,
    input: &InputHandler,
    message: &str,
) -> io::Result<()> {
    let transport = match session.state() {
        SessionState::AudioReady => format!(
            " | {} {} {:>3.0}%",
            if session.playback_state() == PlaybackState::Playing { "PLAY" } else { "STOP" },
            session.audible(),
            session.cursor() * 100.0
        ),
        SessionState::TextureReady => format!(
            " | split {:.2} zoom {:.1}",
            session.split_view().divider(),
            session.split_view().zoom()
        ),
        _ => String::new(),
    };
    let prompt = match input.mode() {
        Mode::Command => format!(":{}", input.command_buffer()),
        Mode::Normal => message.to_string(),
    };
    let focus = |label: CopyLabel| if input.focused() == label { "*" } else { " " };

    let line = format!(
        "[{}]{} |{}A {} |{}B {} | {}",
        session.state().display_name(),
        transport,
        focus(CopyLabel::A),
        copy_summary(session, CopyLabel::A),
        focus(CopyLabel::B),
        copy_summary(session, CopyLabel::B),
        prompt
    );
    queue!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(line)
    )?;
    out.flush()
}

fn print_stats(session: &ComparisonSession) {
    for label in CopyLabel::ALL {
        println!("{}: {}", label, copy_summary(session, label));
    }
}

fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b >= KB * KB {
        format!("{:.1} MB", b / (KB * KB))
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> anyhow::Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["wall.png", "--b", "max_size=256", "--out", "shots"]).unwrap();
        assert_eq!(parsed.asset, PathBuf::from("wall.png"));
        assert_eq!(parsed.settings_b.as_deref(), Some("max_size=256"));
        assert!(parsed.settings_a.is_none());
        assert_eq!(parsed.out_dir, Some(PathBuf::from("shots")));
        assert!(!parsed.snapshot_only);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(args(&[]).is_err());
        assert!(args(&["a.png", "--a"]).is_err());
        assert!(args(&["a.png", "--bogus"]).is_err());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
