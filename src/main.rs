//! Entry point for the ayah player.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load user configuration from `conf/config.toml` and the last session.
//! - Launch the terminal shell with the chosen chapter.

mod app;
mod audio;
mod bookmarks;
mod cache;
mod catalog;
mod config;
mod content;
mod playback;

use crate::app::{StartRequest, run_app};
use crate::cache::load_session;
use crate::catalog::{CHAPTER_COUNT, reciter_by_id};
use crate::config::{load_config, serialize_config};
use crate::content::VerseKey;
use anyhow::{Context, Result, anyhow, bail};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const USAGE: &str =
    "Usage: ayah-player [chapter[:verse]] [--reciter <id>] [--config <path>] [--print-config]";

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    target: Option<StartRequest>,
    reciter: Option<String>,
    config_path: Option<PathBuf>,
    print_config: bool,
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args(env::args().skip(1))?;
    let config_path = args
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from("conf/config.toml"));
    let mut config = load_config(&config_path);
    set_log_level(reload_handle, config.log_level.as_filter_str());

    let session = load_session(Path::new(&config.cache_dir));
    if let Some(session) = &session {
        info!(
            chapter = session.chapter,
            reciter = %session.reciter_id,
            rate = session.playback_rate,
            "Resuming last session"
        );
        config.reciter_id = session.reciter_id.clone();
        config.playback_rate = session.playback_rate;
    }
    if let Some(id) = &args.reciter {
        if reciter_by_id(id).is_none() {
            bail!("Unknown reciter `{id}`");
        }
        config.reciter_id = id.clone();
    }
    if reciter_by_id(&config.reciter_id).is_none() {
        warn!(reciter = %config.reciter_id, "Unknown reciter in config; using default");
    }

    if args.print_config {
        print!("{}", serialize_config(&config)?);
        return Ok(());
    }

    let start = args.target.unwrap_or_else(|| StartRequest {
        chapter: session.as_ref().map(|s| s.chapter).unwrap_or(1),
        verse: None,
    });
    info!(
        chapter = start.chapter,
        verse = ?start.verse,
        reciter = %config.reciter_id,
        level = %config.log_level,
        "Starting ayah player"
    );
    run_app(config, start).context("Player exited with an error")?;
    Ok(())
}

fn parse_args<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--reciter" | "-r" => {
                parsed.reciter = Some(
                    args.next()
                        .ok_or_else(|| anyhow!("--reciter needs a value\n{USAGE}"))?,
                );
            }
            "--config" | "-c" => {
                parsed.config_path = Some(PathBuf::from(
                    args.next()
                        .ok_or_else(|| anyhow!("--config needs a path\n{USAGE}"))?,
                ));
            }
            "--print-config" => parsed.print_config = true,
            "--help" | "-h" => bail!(USAGE),
            other if other.starts_with('-') => bail!("Unknown flag `{other}`\n{USAGE}"),
            target => {
                if parsed.target.is_some() {
                    bail!("Only one chapter may be given\n{USAGE}");
                }
                parsed.target = Some(parse_target(target)?);
            }
        }
    }
    Ok(parsed)
}

fn parse_target(raw: &str) -> Result<StartRequest> {
    let (chapter, verse) = match VerseKey::parse(raw) {
        Some(key) => (key.chapter, Some(key.verse)),
        None => (
            raw.trim()
                .parse::<u32>()
                .with_context(|| format!("Invalid chapter `{raw}`\n{USAGE}"))?,
            None,
        ),
    };
    if !(1..=CHAPTER_COUNT).contains(&chapter) {
        bail!("Chapter must be between 1 and {CHAPTER_COUNT}");
    }
    if verse == Some(0) {
        bail!("Verse numbers start at 1");
    }
    Ok(StartRequest { chapter, verse })
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Result<CliArgs> {
        parse_args(raw.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_chapter_and_verse_target() {
        let parsed = args(&["2:255", "--reciter", "ar.husary"]).expect("valid args");
        assert_eq!(
            parsed.target,
            Some(StartRequest {
                chapter: 2,
                verse: Some(255)
            })
        );
        assert_eq!(parsed.reciter.as_deref(), Some("ar.husary"));
    }

    #[test]
    fn parses_config_flag_without_target() {
        let parsed = args(&["-c", "my.toml", "--print-config"]).expect("valid args");
        assert_eq!(parsed.config_path, Some(PathBuf::from("my.toml")));
        assert!(parsed.print_config);
        assert!(parsed.target.is_none());
    }

    #[test]
    fn rejects_bad_targets_and_flags() {
        assert!(args(&["115"]).is_err());
        assert!(args(&["2:0"]).is_err());
        assert!(args(&["cow"]).is_err());
        assert!(args(&["1", "2"]).is_err());
        assert!(args(&["--volume"]).is_err());
        assert!(args(&["--reciter"]).is_err());
    }
}
