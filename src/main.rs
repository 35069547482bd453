//! Gomoku GUI
//!
//! Play against another person or a bot, and replay saved matches.
//!
//! Usage: `gomoku [--config <file.toml>] [--replay <match.json>]`

use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use gomoku::config::AppConfig;
use gomoku::service::{BotService, FirstEmptyBot, JsonRecordStore, PbrainEngine};
use gomoku::ui::{GomokuApp, SharedBot};
use gomoku::ReplayEngine;
use tracing::{error, info, warn};

/// Value following `flag` on the command line
fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn load_config(args: &[String]) -> AppConfig {
    let path = arg_value(args, "--config")
        .map(PathBuf::from)
        .or_else(AppConfig::default_path);
    let Some(path) = path else {
        warn!("no config directory on this platform, using defaults");
        return AppConfig::default();
    };
    match AppConfig::load_or_default(&path) {
        Ok(config) => config,
        Err(err) => {
            error!(path = %path.display(), %err, "invalid config, using defaults");
            AppConfig::default()
        }
    }
}

fn build_bot(config: &AppConfig) -> SharedBot {
    let bot: Box<dyn BotService> = match &config.bot.engine_path {
        Some(path) => {
            info!(path = %path.display(), "using gomocup engine");
            Box::new(PbrainEngine::new(path, config.board.size, config.bot.engine_timeout()))
        }
        None => {
            info!("no engine configured, using built-in bot");
            Box::new(FirstEmptyBot::new(config.board.size))
        }
    };
    Arc::new(Mutex::new(bot))
}

/// A replay given on the command line. Anything unreadable falls back to
/// the normal play screen.
fn load_replay(args: &[String], size: usize) -> Option<ReplayEngine> {
    let path = arg_value(args, "--replay")?;
    let payload = match std::fs::read_to_string(&path) {
        Ok(payload) => Some(payload),
        Err(err) => {
            warn!(%path, %err, "cannot read replay file");
            None
        }
    };
    match ReplayEngine::from_payload(payload.as_deref(), size) {
        Ok(replay) => Some(replay),
        Err(err) => {
            error!(%path, %err, "replay unavailable, starting a new game");
            None
        }
    }
}

fn main() -> Result<(), eframe::Error> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let config = load_config(&args);

    let store = match JsonRecordStore::open(config.records_dir()) {
        Ok(store) => Some(store),
        Err(err) => {
            warn!(%err, "record store unavailable, saving is disabled");
            None
        }
    };
    let bot = build_bot(&config);
    let replay = load_replay(&args, config.board.size);

    let mut app = GomokuApp::new(config, store, bot);
    if let Some(replay) = replay {
        app = app.with_replay(replay);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 750.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Gomoku"),
        ..Default::default()
    };

    eframe::run_native("Gomoku", options, Box::new(|_cc| Ok(Box::new(app))))
}
