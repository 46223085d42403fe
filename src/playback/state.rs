use crate::catalog::Reciter;
use crate::content::{Chapter, Verse};
use std::fmt;
use std::sync::Arc;

/// Fixed cyclic set of playback speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackRate {
    #[default]
    Normal,
    Quick,
    Fast,
    Double,
}

impl PlaybackRate {
    pub const ALL: [PlaybackRate; 4] = [
        PlaybackRate::Normal,
        PlaybackRate::Quick,
        PlaybackRate::Fast,
        PlaybackRate::Double,
    ];

    pub fn multiplier(self) -> f32 {
        match self {
            PlaybackRate::Normal => 1.0,
            PlaybackRate::Quick => 1.25,
            PlaybackRate::Fast => 1.5,
            PlaybackRate::Double => 2.0,
        }
    }

    pub fn next(self) -> Self {
        match self {
            PlaybackRate::Normal => PlaybackRate::Quick,
            PlaybackRate::Quick => PlaybackRate::Fast,
            PlaybackRate::Fast => PlaybackRate::Double,
            PlaybackRate::Double => PlaybackRate::Normal,
        }
    }

    /// Snap an arbitrary multiplier (e.g. from config) to the closest rate.
    pub fn from_multiplier(value: f32) -> Self {
        if !value.is_finite() {
            return PlaybackRate::Normal;
        }
        Self::ALL
            .into_iter()
            .min_by(|a, b| {
                let da = (a.multiplier() - value).abs();
                let db = (b.multiplier() - value).abs();
                da.total_cmp(&db)
            })
            .unwrap_or_default()
    }
}

impl fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.multiplier())
    }
}

/// Transport lifecycle. `Loading` carries the play request awaiting
/// confirmation from the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Idle,
    Loading {
        request: u64,
    },
    Playing,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SequenceStatus {
    #[default]
    Empty,
    Loading {
        request: u64,
    },
    Ready,
    Unavailable(String),
}

/// Owned state of one listening session.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub(super) verses: Arc<[Verse]>,
    pub(super) chapter: Option<Chapter>,
    pub(super) narrator: Option<Reciter>,
    pub(super) sequence: SequenceStatus,
    pub(super) sequence_request: u64,
    pub(super) pending_start: Option<usize>,
    pub(super) active_index: Option<usize>,
    pub(super) lifecycle: Lifecycle,
    pub(super) current_time: f64,
    pub(super) duration: f64,
    pub(super) rate: PlaybackRate,
    pub(super) play_request: u64,
    pub(super) stalled: Option<String>,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new(PlaybackRate::Normal)
    }
}

impl PlaybackSession {
    pub fn new(rate: PlaybackRate) -> Self {
        Self {
            verses: Arc::from(Vec::new()),
            chapter: None,
            narrator: None,
            sequence: SequenceStatus::Empty,
            sequence_request: 0,
            pending_start: None,
            active_index: None,
            lifecycle: Lifecycle::Idle,
            current_time: 0.0,
            duration: 0.0,
            rate,
            play_request: 0,
            stalled: None,
        }
    }

    pub fn verses(&self) -> &Arc<[Verse]> {
        &self.verses
    }

    pub fn chapter(&self) -> Option<&Chapter> {
        self.chapter.as_ref()
    }

    pub fn narrator(&self) -> Option<&Reciter> {
        self.narrator.as_ref()
    }

    pub fn sequence(&self) -> &SequenceStatus {
        &self.sequence
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn active_verse(&self) -> Option<&Verse> {
        self.active_index.and_then(|idx| self.verses.get(idx))
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Transport intent: true while a play request is pending or confirmed.
    pub fn is_playing(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Loading { .. } | Lifecycle::Playing)
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn rate(&self) -> PlaybackRate {
        self.rate
    }

    pub fn play_request(&self) -> u64 {
        self.play_request
    }

    pub fn stalled(&self) -> Option<&str> {
        self.stalled.as_deref()
    }

    pub(super) fn next_play_request(&mut self) -> u64 {
        self.play_request = self.play_request.wrapping_add(1);
        self.play_request
    }

    pub(super) fn reset_position(&mut self) {
        self.current_time = 0.0;
        self.duration = 0.0;
    }
}
