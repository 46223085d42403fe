pub(crate) fn default_reciter_id() -> String {
    "ar.alafasy".to_string()
}

pub(crate) fn default_text_edition() -> String {
    "quran-uthmani".to_string()
}

pub(crate) fn default_translation_edition() -> String {
    "en.asad".to_string()
}

pub(crate) fn default_api_base_url() -> String {
    "https://api.alquran.cloud/v1".to_string()
}

pub(crate) fn default_audio_base_url() -> String {
    "https://everyayah.com/data".to_string()
}

pub(crate) fn default_http_timeout_secs() -> u64 {
    20
}

pub(crate) fn default_playback_rate() -> f32 {
    1.0
}

pub(crate) fn default_progress_interval_ms() -> u64 {
    250
}

pub(crate) fn default_auto_scroll() -> bool {
    true
}

pub(crate) fn default_bookmark_preview_chars() -> usize {
    140
}

pub(crate) fn default_cache_dir() -> String {
    ".cache".to_string()
}

pub(crate) fn default_log_level() -> super::models::LogLevel {
    super::models::LogLevel::Info
}

pub(crate) fn default_key_toggle_play_pause() -> String {
    "p".to_string()
}

pub(crate) fn default_key_next_verse() -> String {
    "n".to_string()
}

pub(crate) fn default_key_prev_verse() -> String {
    "b".to_string()
}

pub(crate) fn default_key_close_player() -> String {
    "x".to_string()
}

pub(crate) fn default_key_cycle_rate() -> String {
    "r".to_string()
}

pub(crate) fn default_key_toggle_bookmark() -> String {
    "m".to_string()
}

pub(crate) fn default_key_safe_quit() -> String {
    "q".to_string()
}
