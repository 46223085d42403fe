use super::state::{Lifecycle, PlaybackSession, SequenceStatus};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TransportState {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
}

impl From<Lifecycle> for TransportState {
    fn from(lifecycle: Lifecycle) -> Self {
        match lifecycle {
            Lifecycle::Idle => TransportState::Idle,
            Lifecycle::Loading { .. } => TransportState::Loading,
            Lifecycle::Playing => TransportState::Playing,
            Lifecycle::Paused => TransportState::Paused,
        }
    }
}

/// Snapshot of everything a shell renders about the player.
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export)]
pub struct PlayerView {
    pub state: TransportState,
    pub is_playing: bool,
    /// `-1` when no verse is active.
    pub active_index: i32,
    pub current_time: f64,
    pub duration: f64,
    pub playback_rate: f32,
    pub progress_pct: f64,
    pub chapter_number: Option<u32>,
    pub chapter_name: Option<String>,
    pub active_verse_number: Option<u32>,
    pub narrator_name: Option<String>,
    pub verse_count: usize,
    pub sequence_loading: bool,
    pub content_error: Option<String>,
    pub stalled: Option<String>,
}

impl PlayerView {
    pub fn from_session(session: &PlaybackSession) -> Self {
        let active_index = session
            .active_index()
            .and_then(|idx| i32::try_from(idx).ok())
            .unwrap_or(-1);
        let progress_pct = if session.duration() > 0.0 {
            (session.current_time() / session.duration() * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        let content_error = match session.sequence() {
            SequenceStatus::Unavailable(reason) => Some(reason.clone()),
            _ => None,
        };

        Self {
            state: session.lifecycle().into(),
            is_playing: session.is_playing(),
            active_index,
            current_time: session.current_time(),
            duration: session.duration(),
            playback_rate: session.rate().multiplier(),
            progress_pct,
            chapter_number: session.chapter().map(|chapter| chapter.number),
            chapter_name: session.chapter().map(|chapter| chapter.english_name.clone()),
            active_verse_number: session.active_verse().map(|verse| verse.key.verse),
            narrator_name: session.narrator().map(|narrator| narrator.name.clone()),
            verse_count: session.verses().len(),
            sequence_loading: matches!(session.sequence(), SequenceStatus::Loading { .. }),
            content_error,
            stalled: session.stalled().map(str::to_string),
        }
    }
}

/// Format seconds as `M:SS`. Non-finite and negative input renders as zero.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(9.7), "0:09");
        assert_eq!(format_time(75.2), "1:15");
        assert_eq!(format_time(600.0), "10:00");
    }

    #[test]
    fn idle_session_exposes_minus_one_index() {
        let view = PlayerView::from_session(&PlaybackSession::default());
        assert_eq!(view.active_index, -1);
        assert_eq!(view.state, TransportState::Idle);
        assert!(!view.is_playing);
        assert_eq!(view.progress_pct, 0.0);
        assert_eq!(view.playback_rate, 1.0);
    }
}
