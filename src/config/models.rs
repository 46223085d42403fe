use serde::Deserialize;

/// High-level app configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct AppConfig {
    #[serde(default = "crate::config::defaults::default_reciter_id")]
    pub reciter_id: String,
    #[serde(default = "crate::config::defaults::default_text_edition")]
    pub text_edition: String,
    #[serde(default = "crate::config::defaults::default_translation_edition")]
    pub translation_edition: String,
    #[serde(default = "crate::config::defaults::default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "crate::config::defaults::default_audio_base_url")]
    pub audio_base_url: String,
    #[serde(default = "crate::config::defaults::default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "crate::config::defaults::default_playback_rate")]
    pub playback_rate: f32,
    #[serde(default = "crate::config::defaults::default_progress_interval_ms")]
    pub progress_interval_ms: u64,
    #[serde(default = "crate::config::defaults::default_auto_scroll")]
    pub auto_scroll: bool,
    #[serde(default = "crate::config::defaults::default_bookmark_preview_chars")]
    pub bookmark_preview_chars: usize,
    #[serde(default = "crate::config::defaults::default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
    #[serde(default = "crate::config::defaults::default_key_toggle_play_pause")]
    pub key_toggle_play_pause: String,
    #[serde(default = "crate::config::defaults::default_key_next_verse")]
    pub key_next_verse: String,
    #[serde(default = "crate::config::defaults::default_key_prev_verse")]
    pub key_prev_verse: String,
    #[serde(default = "crate::config::defaults::default_key_close_player")]
    pub key_close_player: String,
    #[serde(default = "crate::config::defaults::default_key_cycle_rate")]
    pub key_cycle_rate: String,
    #[serde(default = "crate::config::defaults::default_key_toggle_bookmark")]
    pub key_toggle_bookmark: String,
    #[serde(default = "crate::config::defaults::default_key_safe_quit")]
    pub key_safe_quit: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            reciter_id: crate::config::defaults::default_reciter_id(),
            text_edition: crate::config::defaults::default_text_edition(),
            translation_edition: crate::config::defaults::default_translation_edition(),
            api_base_url: crate::config::defaults::default_api_base_url(),
            audio_base_url: crate::config::defaults::default_audio_base_url(),
            http_timeout_secs: crate::config::defaults::default_http_timeout_secs(),
            playback_rate: crate::config::defaults::default_playback_rate(),
            progress_interval_ms: crate::config::defaults::default_progress_interval_ms(),
            auto_scroll: crate::config::defaults::default_auto_scroll(),
            bookmark_preview_chars: crate::config::defaults::default_bookmark_preview_chars(),
            cache_dir: crate::config::defaults::default_cache_dir(),
            log_level: crate::config::defaults::default_log_level(),
            key_toggle_play_pause: crate::config::defaults::default_key_toggle_play_pause(),
            key_next_verse: crate::config::defaults::default_key_next_verse(),
            key_prev_verse: crate::config::defaults::default_key_prev_verse(),
            key_close_player: crate::config::defaults::default_key_close_player(),
            key_cycle_rate: crate::config::defaults::default_key_cycle_rate(),
            key_toggle_bookmark: crate::config::defaults::default_key_toggle_bookmark(),
            key_safe_quit: crate::config::defaults::default_key_safe_quit(),
        }
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
