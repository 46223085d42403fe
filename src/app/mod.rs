//! Terminal shell around the playback orchestrator.
//!
//! One main loop drains a single message queue. The stdin reader, verse
//! fetchers, the audio thread and the SIGINT handler only send messages.

mod messages;
mod state;
mod update;
mod view;

pub use state::{App, StartRequest};

use crate::audio::{RodioChannel, RodioChannelOptions};
use crate::config::AppConfig;
use crate::content::HttpVerseSource;
use anyhow::{Context, Result};
use messages::Message;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Build the real collaborators and run until a safe quit.
pub fn run_app(config: AppConfig, start: StartRequest) -> Result<()> {
    let (sender, receiver) = mpsc::channel();

    let channel_sender = sender.clone();
    let channel = RodioChannel::spawn(
        RodioChannelOptions {
            cache_dir: PathBuf::from(&config.cache_dir),
            progress_interval: Duration::from_millis(config.progress_interval_ms.max(20)),
            http_timeout: Duration::from_secs(config.http_timeout_secs.max(1)),
        },
        move |event| {
            let _ = channel_sender.send(Message::Channel(event));
        },
    )
    .context("Failed to open the audio output")?;
    let source = HttpVerseSource::from_config(&config)?;

    let quit_sender = sender.clone();
    ctrlc::set_handler(move || {
        let _ = quit_sender.send(Message::SafeQuit);
    })
    .context("Installing Ctrl-C handler")?;
    spawn_input_reader(sender.clone())?;

    let mut app = App::new(config, channel, Arc::new(source), sender);
    println!("Type `help` for commands.");
    app.start(start);

    for message in receiver.iter() {
        app.update(message);
        if app.exit_requested() {
            break;
        }
    }
    info!("Main loop finished");
    Ok(())
}

fn spawn_input_reader(sender: Sender<Message>) -> Result<()> {
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if sender.send(Message::Input(line)).is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        warn!("Failed to read stdin: {err}");
                        break;
                    }
                }
            }
            debug!("Input reader reached end of stream");
            let _ = sender.send(Message::InputClosed);
        })
        .context("Spawning stdin reader")?;
    Ok(())
}
