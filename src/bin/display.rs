/// Terminal display client for the exam status board.
///
/// Fetches board state over HTTP, listens on the server's WebSocket for
/// change events, ticks once a second, and renders the wall clock, the
/// countdown, early-exit status, and the latest announcements. Display
/// settings resolve per field: a device-local override wins over the
/// server-wide default.
///
/// Usage: display [--api-url URL] [--state-dir DIR] [run|set-clock-size|...]
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use futures_util::StreamExt;
use serde::Deserialize;
use tokio::sync::{Mutex, Notify};
use tokio::time::{interval, sleep, Duration};
use tokio_tungstenite::connect_async;
use tracing::{info, warn};

use examboard_api::models::announcement::AnnouncementKind;
use examboard_api::models::settings::DisplaySettings;
use examboard_api::services::countdown::{self, Urgency};
use examboard_api::services::display::{
    clear_override, effective, override_value, set_override, FileOverrideStore, SettingsField,
};

#[derive(Parser)]
#[command(name = "display", about = "Exam status board display client")]
struct Args {
    /// Base URL of the examboard API
    #[arg(long, default_value = "http://localhost:8080")]
    api_url: String,

    /// Directory for device-local state (display overrides)
    #[arg(long, default_value = ".examboard")]
    state_dir: PathBuf,

    /// Fall back to polling instead of the WebSocket event stream
    #[arg(long)]
    no_ws: bool,

    /// Full refresh period in seconds when events are not flowing
    #[arg(long, default_value_t = 30)]
    refresh_secs: u64,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FieldArg {
    ClockSize,
    FontScale,
}

impl From<FieldArg> for SettingsField {
    fn from(f: FieldArg) -> Self {
        match f {
            FieldArg::ClockSize => SettingsField::ClockSize,
            FieldArg::FontScale => SettingsField::FontScale,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Override the clock size on this device only
    SetClockSize { value: f64 },
    /// Override the font scale on this device only
    SetFontScale { value: f64 },
    /// Clear a local override (or both when no field is given)
    ClearOverride {
        #[arg(value_enum)]
        field: Option<FieldArg>,
    },
    /// Show the stored overrides
    ShowOverrides,
}

#[derive(Debug, Clone, Deserialize)]
struct ExamView {
    name: String,
    subject: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    early_exit_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
struct AnnouncementView {
    kind: AnnouncementKind,
    title: String,
    content: String,
    question_number: Option<i32>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct BoardState {
    exam: Option<ExamView>,
    announcements: Vec<AnnouncementView>,
    server_settings: DisplaySettings,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .init();

    let Args {
        api_url,
        state_dir,
        no_ws,
        refresh_secs,
        command,
    } = Args::parse();
    let overrides_path = state_dir.join("overrides.json");

    if let Some(command) = command {
        let mut store = FileOverrideStore::open(&overrides_path);
        match command {
            Command::SetClockSize { value } => {
                set_override(&mut store, SettingsField::ClockSize, value);
                println!("clock_size override set to {value}");
            }
            Command::SetFontScale { value } => {
                set_override(&mut store, SettingsField::FontScale, value);
                println!("font_scale override set to {value}");
            }
            Command::ClearOverride { field } => match field {
                Some(f) => {
                    clear_override(&mut store, f.into());
                    println!("override cleared");
                }
                None => {
                    clear_override(&mut store, SettingsField::ClockSize);
                    clear_override(&mut store, SettingsField::FontScale);
                    println!("all overrides cleared");
                }
            },
            Command::ShowOverrides => {
                for field in [SettingsField::ClockSize, SettingsField::FontScale] {
                    match override_value(&store, field) {
                        Some(v) => println!("{} = {v} (local override)", field.key()),
                        None => println!("{} = (server default)", field.key()),
                    }
                }
            }
        }
        return Ok(());
    }

    run(api_url, no_ws, refresh_secs, overrides_path).await
}

async fn run(
    api_url: String,
    no_ws: bool,
    refresh_secs: u64,
    overrides_path: PathBuf,
) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let state = Arc::new(Mutex::new(BoardState::default()));
    let refresh = Arc::new(Notify::new());

    if !no_ws {
        let ws_url = format!("{}/ws", api_url.replacen("http", "ws", 1));
        tokio::spawn(watch_events(ws_url, refresh.clone()));
    }

    refetch(&client, &api_url, &state).await;

    let mut tick = interval(Duration::from_secs(1));
    let mut since_refresh = 0u64;
    loop {
        tokio::select! {
            _ = tick.tick() => {
                since_refresh += 1;
                if since_refresh >= refresh_secs {
                    refetch(&client, &api_url, &state).await;
                    since_refresh = 0;
                }
            }
            _ = refresh.notified() => {
                refetch(&client, &api_url, &state).await;
                since_refresh = 0;
            }
        }

        let store = FileOverrideStore::open(&overrides_path);
        let board = state.lock().await;
        render(&board, effective(board.server_settings, &store));
    }
}

/// WebSocket listener: any board event triggers a re-fetch. Each snapshot
/// replaces the previous state wholesale, so the payload itself only matters
/// as a wake-up call. Reconnects with a short delay when the stream drops.
async fn watch_events(ws_url: String, refresh: Arc<Notify>) {
    loop {
        match connect_async(&ws_url).await {
            Ok((mut stream, _response)) => {
                info!("connected to event stream {ws_url}");
                while let Some(next) = stream.next().await {
                    match next {
                        Ok(tokio_tungstenite::tungstenite::Message::Text(_)) => {
                            refresh.notify_one();
                        }
                        Ok(tokio_tungstenite::tungstenite::Message::Close(_)) => break,
                        Ok(_) => {}
                        Err(e) => {
                            warn!("event stream read error: {}", e);
                            break;
                        }
                    }
                }
                warn!("event stream disconnected, retrying");
            }
            Err(e) => {
                warn!("could not connect to event stream: {}", e);
            }
        }
        sleep(Duration::from_secs(2)).await;
    }
}

async fn refetch(client: &reqwest::Client, api_url: &str, state: &Mutex<BoardState>) {
    let exam = match fetch_json::<Option<ExamView>>(client, &format!("{api_url}/exam")).await {
        Ok(e) => e,
        Err(e) => {
            warn!("could not load exam: {}", e);
            return;
        }
    };
    let announcements =
        match fetch_json::<Vec<AnnouncementView>>(client, &format!("{api_url}/announcements")).await {
            Ok(a) => a,
            Err(e) => {
                warn!("could not load announcements: {}", e);
                return;
            }
        };
    let server_settings =
        match fetch_json::<DisplaySettings>(client, &format!("{api_url}/settings")).await {
            Ok(s) => s,
            Err(e) => {
                warn!("could not load settings: {}", e);
                return;
            }
        };

    let mut board = state.lock().await;
    board.exam = exam;
    board.announcements = announcements;
    board.server_settings = server_settings;
}

async fn fetch_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> anyhow::Result<T> {
    Ok(client.get(url).send().await?.error_for_status()?.json().await?)
}

fn kind_label(kind: AnnouncementKind) -> &'static str {
    match kind {
        AnnouncementKind::Info => "INFO",
        AnnouncementKind::Warning => "WARNING",
        AnnouncementKind::Correction => "CORRECTION",
    }
}

fn render(board: &BoardState, settings: DisplaySettings) {
    let now = Utc::now();
    // Banner width tracks the resolved clock size.
    let width = (settings.clock_size * 4.0).clamp(32.0, 120.0) as usize;
    let rule = "═".repeat(width);

    print!("\x1b[2J\x1b[H");
    println!("{rule}");
    println!("{:^width$}", Local::now().format("%H:%M:%S").to_string());

    match &board.exam {
        Some(exam) => {
            println!("{:^width$}", format!("{} — {}", exam.name, exam.subject));
            println!(
                "{:^width$}",
                format!(
                    "{} – {}",
                    exam.start_time.with_timezone(&Local).format("%H:%M"),
                    exam.end_time.with_timezone(&Local).format("%H:%M")
                )
            );
            let countdown = countdown::evaluate(exam.end_time, exam.early_exit_time, now);
            let label = match countdown.urgency {
                Urgency::Finished => "EXAM FINISHED".to_string(),
                Urgency::Danger => format!("{}  !! ", countdown.display),
                Urgency::Warning => format!("{}  !", countdown.display),
                Urgency::Normal => countdown.display.clone(),
            };
            println!("{:^width$}", format!("remaining  {label}"));

            if exam.early_exit_time.is_some() {
                if countdown.can_early_exit {
                    println!("{:^width$}", "early exit: allowed");
                } else if let Some(wait) = countdown.early_exit_remaining {
                    println!(
                        "{:^width$}",
                        format!("early exit in {}", countdown::format_remaining(wait))
                    );
                }
            }
        }
        None => println!("{:^width$}", "No exam configured"),
    }
    println!("{rule}");

    // Announcements, newest first; the font scale stretches how many fit.
    let visible = ((5.0 * settings.font_scale).round() as usize).max(1);
    if board.announcements.is_empty() {
        println!("  (no announcements)");
    }
    for a in board.announcements.iter().take(visible) {
        let question = a
            .question_number
            .map(|n| format!(" [Q{n}]"))
            .unwrap_or_default();
        println!(
            "  {} [{}]{} {} — {}",
            a.created_at.with_timezone(&Local).format("%H:%M"),
            kind_label(a.kind),
            question,
            a.title,
            a.content
        );
    }

    println!();
    println!(
        "  clock_size={} font_scale={}",
        settings.clock_size, settings.font_scale
    );
}
