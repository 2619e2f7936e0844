mod advisory;
mod analytics;
mod config;
mod db;
mod models;
mod proxy;
mod run;
mod session;
mod store;
mod ui;

use anyhow::Result;
use std::fs::{File, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use config::Settings;

/// Where log records go. The TUI owns the terminal, so it logs to a file.
enum LogSink {
    Stderr,
    File(File),
    Off,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args: Vec<String> = std::env::args().collect();
    let settings = Settings::from_env()?;

    match args.get(1).map(String::as_str) {
        None => {
            init_tracing(&settings, tui_log_sink(&settings));
            tracing::info!(advisor = %settings.advisor, "starting tui");
            let mut session = run::open_session(&settings);
            run::as_tui(&mut session, &settings)
        }
        Some("serve") => {
            init_tracing(&settings, LogSink::Stderr);
            run::serve(&settings)
        }
        Some(_) => {
            init_tracing(&settings, LogSink::Stderr);
            let mut session = run::open_session(&settings);
            run::as_cli(&args, &mut session, &settings)
        }
    }
}

fn tui_log_sink(settings: &Settings) -> LogSink {
    let Some(dir) = &settings.data_dir else {
        return LogSink::Off;
    };
    if std::fs::create_dir_all(dir).is_err() {
        return LogSink::Off;
    }
    match OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("spendlens.log"))
    {
        Ok(file) => LogSink::File(file),
        Err(_) => LogSink::Off,
    }
}

fn init_tracing(settings: &Settings, sink: LogSink) {
    let filter =
        EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    match (sink, settings.log_json) {
        (LogSink::Off, _) => {}
        (LogSink::Stderr, true) => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        (LogSink::Stderr, false) => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        (LogSink::File(file), true) => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init(),
        (LogSink::File(file), false) => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init(),
    }
}
