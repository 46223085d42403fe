//! On-disk cache for verse audio and the last listening session.
//!
//! Audio files are stored under `<cache_dir>/audio/` using a hash of the
//! source URL as the filename. The session is a tiny TOML file remembering
//! chapter, narrator and rate between runs.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

const AUDIO_DIR: &str = "audio";
const SESSION_FILE: &str = "session.toml";

pub fn hash_key(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Cache location for one audio URL. The extension follows the URL when it
/// has one so decoders can sniff the container.
pub fn audio_cache_path(cache_dir: &Path, url: &str) -> PathBuf {
    let extension = url
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= 5)
        .unwrap_or("bin");
    cache_dir
        .join(AUDIO_DIR)
        .join(format!("{}.{extension}", hash_key(url)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub chapter: u32,
    pub reciter_id: String,
    pub playback_rate: f32,
}

pub fn load_session(cache_dir: &Path) -> Option<SessionState> {
    let data = fs::read_to_string(cache_dir.join(SESSION_FILE)).ok()?;
    toml::from_str(&data).ok()
}

/// Persist the session. Failures are logged and otherwise ignored.
pub fn save_session(cache_dir: &Path, session: &SessionState) {
    if let Err(err) = fs::create_dir_all(cache_dir) {
        warn!(path = %cache_dir.display(), "Failed to create cache dir: {err}");
        return;
    }
    let contents = match toml::to_string(session) {
        Ok(contents) => contents,
        Err(err) => {
            warn!("Failed to serialize session: {err}");
            return;
        }
    };
    let path = cache_dir.join(SESSION_FILE);
    let written = fs::File::create(&path).and_then(|mut file| file.write_all(contents.as_bytes()));
    if let Err(err) = written {
        warn!(path = %path.display(), "Failed to save session: {err}");
    }
}
