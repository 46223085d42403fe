use super::defaults;
use super::models::{AppConfig, LogLevel};
use serde::Deserialize;

/// Sectioned on-disk layout of `AppConfig`.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    content: ContentConfig,
    #[serde(default)]
    playback: PlaybackConfig,
    #[serde(default)]
    storage: StorageConfig,
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    keys: KeyConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            reciter_id: tables.playback.reciter_id,
            text_edition: tables.content.text_edition,
            translation_edition: tables.content.translation_edition,
            api_base_url: tables.content.api_base_url,
            audio_base_url: tables.content.audio_base_url,
            http_timeout_secs: tables.content.http_timeout_secs,
            playback_rate: tables.playback.playback_rate,
            progress_interval_ms: tables.playback.progress_interval_ms,
            auto_scroll: tables.playback.auto_scroll,
            bookmark_preview_chars: tables.storage.bookmark_preview_chars,
            cache_dir: tables.storage.cache_dir,
            log_level: tables.logging.log_level,
            key_toggle_play_pause: tables.keys.toggle_play_pause,
            key_next_verse: tables.keys.next_verse,
            key_prev_verse: tables.keys.prev_verse,
            key_close_player: tables.keys.close_player,
            key_cycle_rate: tables.keys.cycle_rate,
            key_toggle_bookmark: tables.keys.toggle_bookmark,
            key_safe_quit: tables.keys.safe_quit,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            content: ContentConfig {
                text_edition: config.text_edition.clone(),
                translation_edition: config.translation_edition.clone(),
                api_base_url: config.api_base_url.clone(),
                audio_base_url: config.audio_base_url.clone(),
                http_timeout_secs: config.http_timeout_secs,
            },
            playback: PlaybackConfig {
                reciter_id: config.reciter_id.clone(),
                playback_rate: config.playback_rate,
                progress_interval_ms: config.progress_interval_ms,
                auto_scroll: config.auto_scroll,
            },
            storage: StorageConfig {
                cache_dir: config.cache_dir.clone(),
                bookmark_preview_chars: config.bookmark_preview_chars,
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
            keys: KeyConfig {
                toggle_play_pause: config.key_toggle_play_pause.clone(),
                next_verse: config.key_next_verse.clone(),
                prev_verse: config.key_prev_verse.clone(),
                close_player: config.key_close_player.clone(),
                cycle_rate: config.key_cycle_rate.clone(),
                toggle_bookmark: config.key_toggle_bookmark.clone(),
                safe_quit: config.key_safe_quit.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ContentConfig {
    #[serde(default = "defaults::default_text_edition")]
    text_edition: String,
    #[serde(default = "defaults::default_translation_edition")]
    translation_edition: String,
    #[serde(default = "defaults::default_api_base_url")]
    api_base_url: String,
    #[serde(default = "defaults::default_audio_base_url")]
    audio_base_url: String,
    #[serde(default = "defaults::default_http_timeout_secs")]
    http_timeout_secs: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        ContentConfig {
            text_edition: defaults::default_text_edition(),
            translation_edition: defaults::default_translation_edition(),
            api_base_url: defaults::default_api_base_url(),
            audio_base_url: defaults::default_audio_base_url(),
            http_timeout_secs: defaults::default_http_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct PlaybackConfig {
    #[serde(default = "defaults::default_reciter_id")]
    reciter_id: String,
    #[serde(default = "defaults::default_playback_rate")]
    playback_rate: f32,
    #[serde(default = "defaults::default_progress_interval_ms")]
    progress_interval_ms: u64,
    #[serde(default = "defaults::default_auto_scroll")]
    auto_scroll: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig {
            reciter_id: defaults::default_reciter_id(),
            playback_rate: defaults::default_playback_rate(),
            progress_interval_ms: defaults::default_progress_interval_ms(),
            auto_scroll: defaults::default_auto_scroll(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct StorageConfig {
    #[serde(default = "defaults::default_cache_dir")]
    cache_dir: String,
    #[serde(default = "defaults::default_bookmark_preview_chars")]
    bookmark_preview_chars: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            cache_dir: defaults::default_cache_dir(),
            bookmark_preview_chars: defaults::default_bookmark_preview_chars(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct KeyConfig {
    #[serde(default = "defaults::default_key_toggle_play_pause")]
    toggle_play_pause: String,
    #[serde(default = "defaults::default_key_next_verse")]
    next_verse: String,
    #[serde(default = "defaults::default_key_prev_verse")]
    prev_verse: String,
    #[serde(default = "defaults::default_key_close_player")]
    close_player: String,
    #[serde(default = "defaults::default_key_cycle_rate")]
    cycle_rate: String,
    #[serde(default = "defaults::default_key_toggle_bookmark")]
    toggle_bookmark: String,
    #[serde(default = "defaults::default_key_safe_quit")]
    safe_quit: String,
}

impl Default for KeyConfig {
    fn default() -> Self {
        KeyConfig {
            toggle_play_pause: defaults::default_key_toggle_play_pause(),
            next_verse: defaults::default_key_next_verse(),
            prev_verse: defaults::default_key_prev_verse(),
            close_player: defaults::default_key_close_player(),
            cycle_rate: defaults::default_key_cycle_rate(),
            toggle_bookmark: defaults::default_key_toggle_bookmark(),
            safe_quit: defaults::default_key_safe_quit(),
        }
    }
}
