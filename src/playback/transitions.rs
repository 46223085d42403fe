use super::state::{Lifecycle, PlaybackSession, SequenceStatus};
use crate::audio::{ChannelEvent, PlayRejection, PlayRequestId};
use crate::catalog::Reciter;
use crate::content::{Chapter, Verse};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    SelectVerse(usize),
    TogglePlay,
    Next,
    Prev,
    Seek(f64),
    Close,
    CycleRate,
    SequenceRequested {
        chapter: Chapter,
        narrator: Reciter,
        start_at: Option<usize>,
    },
    SequenceLoaded {
        request: u64,
        verses: Vec<Verse>,
    },
    SequenceFailed {
        request: u64,
        reason: String,
    },
    Channel(ChannelEvent),
}

/// Commands for the audio channel, applied in order.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportAction {
    Pause,
    SetSource(String),
    SetRate(f32),
    Play { request: PlayRequestId },
    Seek(f64),
    Stop,
}

/// Things the shell may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerNotice {
    ActiveVerseChanged(Option<usize>),
    PlaybackStalled { reason: String },
    ChapterFinished,
    FetchRequested {
        request: u64,
        chapter: u32,
        narrator: Reciter,
    },
    SequenceReady { verse_count: usize },
    ContentUnavailable { reason: String },
}

#[derive(Debug, Default, PartialEq)]
pub struct Outcome {
    pub actions: Vec<TransportAction>,
    pub notices: Vec<PlayerNotice>,
}

/// Advance the session by one event. `loaded_source` is the URL the channel
/// currently holds, used to decide whether a source swap is needed.
pub fn transition(
    session: &mut PlaybackSession,
    event: PlayerEvent,
    loaded_source: Option<&str>,
) -> Outcome {
    let mut out = Outcome::default();
    match event {
        PlayerEvent::SelectVerse(index) => {
            if index < session.verses.len() {
                activate(session, index, true, loaded_source, &mut out);
            } else {
                debug!(index, len = session.verses.len(), "Ignoring out-of-range verse");
            }
        }
        PlayerEvent::TogglePlay => on_toggle(session, loaded_source, &mut out),
        PlayerEvent::Next => on_next(session, loaded_source, &mut out),
        PlayerEvent::Prev => on_prev(session, loaded_source, &mut out),
        PlayerEvent::Seek(seconds) => on_seek(session, seconds, &mut out),
        PlayerEvent::Close => on_close(session, &mut out),
        PlayerEvent::CycleRate => {
            session.rate = session.rate.next();
            info!(rate = %session.rate, "Playback rate changed");
            out.actions.push(TransportAction::SetRate(session.rate.multiplier()));
        }
        PlayerEvent::SequenceRequested {
            chapter,
            narrator,
            start_at,
        } => on_sequence_requested(session, chapter, narrator, start_at, &mut out),
        PlayerEvent::SequenceLoaded { request, verses } => {
            on_sequence_loaded(session, request, verses, loaded_source, &mut out)
        }
        PlayerEvent::SequenceFailed { request, reason } => {
            on_sequence_failed(session, request, reason, &mut out)
        }
        PlayerEvent::Channel(event) => on_channel(session, event, loaded_source, &mut out),
    }
    out
}

/// Make `index` the active verse, swapping the channel source when it holds
/// a different URL, then request play if `play` is set.
fn activate(
    session: &mut PlaybackSession,
    index: usize,
    play: bool,
    loaded_source: Option<&str>,
    out: &mut Outcome,
) {
    let Some(url) = session.verses.get(index).map(|verse| verse.audio_url.clone()) else {
        return;
    };
    let previous = session.active_index;
    session.active_index = Some(index);
    session.stalled = None;
    if previous != Some(index) {
        out.notices.push(PlayerNotice::ActiveVerseChanged(Some(index)));
    }

    if loaded_source != Some(url.as_str()) {
        debug!(index, %url, "Swapping channel source");
        out.actions.push(TransportAction::Pause);
        session.next_play_request();
        out.actions.push(TransportAction::SetSource(url));
        session.reset_position();
        out.actions.push(TransportAction::SetRate(session.rate.multiplier()));
    }

    if play {
        let request = session.next_play_request();
        session.lifecycle = Lifecycle::Loading { request };
        info!(index, request, "Requesting verse playback");
        out.actions.push(TransportAction::Play { request });
    } else {
        session.lifecycle = Lifecycle::Paused;
    }
}

fn on_toggle(session: &mut PlaybackSession, loaded_source: Option<&str>, out: &mut Outcome) {
    match session.lifecycle {
        Lifecycle::Loading { .. } | Lifecycle::Playing => {
            session.next_play_request();
            session.lifecycle = Lifecycle::Paused;
            info!(index = ?session.active_index, "Pausing playback");
            out.actions.push(TransportAction::Pause);
        }
        Lifecycle::Paused | Lifecycle::Idle => {
            if session.verses.is_empty() {
                debug!("Toggle ignored: no verses loaded");
                return;
            }
            let index = session.active_index.unwrap_or(0);
            activate(session, index, true, loaded_source, out);
        }
    }
}

fn on_next(session: &mut PlaybackSession, loaded_source: Option<&str>, out: &mut Outcome) {
    let len = session.verses.len();
    if len == 0 {
        return;
    }
    let target = match session.active_index {
        None => 0,
        Some(index) if index + 1 < len => index + 1,
        Some(index) => {
            debug!(index, "Already at last verse");
            return;
        }
    };
    activate(session, target, true, loaded_source, out);
}

fn on_prev(session: &mut PlaybackSession, loaded_source: Option<&str>, out: &mut Outcome) {
    match session.active_index {
        Some(index) if index > 0 => activate(session, index - 1, true, loaded_source, out),
        other => debug!(index = ?other, "Already at first verse"),
    }
}

fn on_seek(session: &mut PlaybackSession, seconds: f64, out: &mut Outcome) {
    if session.active_index.is_none() || !seconds.is_finite() {
        return;
    }
    let mut target = seconds.max(0.0);
    if session.duration > 0.0 {
        target = target.min(session.duration);
    }
    session.current_time = target;
    debug!(target, "Seeking within verse");
    out.actions.push(TransportAction::Seek(target));
}

fn on_close(session: &mut PlaybackSession, out: &mut Outcome) {
    let had_active = session.active_index.take().is_some();
    session.next_play_request();
    session.lifecycle = Lifecycle::Idle;
    session.stalled = None;
    session.current_time = 0.0;
    out.actions.push(TransportAction::Stop);
    if had_active {
        info!("Player closed");
        out.notices.push(PlayerNotice::ActiveVerseChanged(None));
    }
}

fn on_sequence_requested(
    session: &mut PlaybackSession,
    chapter: Chapter,
    narrator: Reciter,
    start_at: Option<usize>,
    out: &mut Outcome,
) {
    on_close(session, out);
    session.reset_position();
    session.verses = Arc::from(Vec::new());
    session.sequence_request = session.sequence_request.wrapping_add(1);
    let request = session.sequence_request;
    session.sequence = SequenceStatus::Loading { request };
    session.pending_start = start_at;
    info!(
        request,
        chapter = chapter.number,
        narrator = %narrator.id,
        "Requesting verse sequence"
    );
    out.notices.push(PlayerNotice::FetchRequested {
        request,
        chapter: chapter.number,
        narrator: narrator.clone(),
    });
    session.chapter = Some(chapter);
    session.narrator = Some(narrator);
}

fn on_sequence_loaded(
    session: &mut PlaybackSession,
    request: u64,
    verses: Vec<Verse>,
    loaded_source: Option<&str>,
    out: &mut Outcome,
) {
    if request != session.sequence_request {
        debug!(
            request,
            current = session.sequence_request,
            "Ignoring stale verse sequence"
        );
        return;
    }
    if verses.is_empty() {
        on_sequence_failed(session, request, "chapter has no verses".to_string(), out);
        return;
    }

    let verse_count = verses.len();
    session.verses = Arc::from(verses);
    session.sequence = SequenceStatus::Ready;
    if let Some(chapter) = session.chapter.as_mut() {
        chapter.verse_count = verse_count;
    }
    info!(request, verse_count, "Verse sequence ready");
    out.notices.push(PlayerNotice::SequenceReady { verse_count });

    if let Some(start) = session.pending_start.take() {
        if start < verse_count {
            activate(session, start, false, loaded_source, out);
        } else {
            warn!(start, verse_count, "Requested start verse is out of range");
        }
    }
}

fn on_sequence_failed(
    session: &mut PlaybackSession,
    request: u64,
    reason: String,
    out: &mut Outcome,
) {
    if request != session.sequence_request {
        debug!(
            request,
            current = session.sequence_request,
            "Ignoring stale verse fetch failure"
        );
        return;
    }
    warn!(request, %reason, "Verse sequence unavailable");
    session.pending_start = None;
    session.sequence = SequenceStatus::Unavailable(reason.clone());
    out.notices.push(PlayerNotice::ContentUnavailable { reason });
}

fn on_channel(
    session: &mut PlaybackSession,
    event: ChannelEvent,
    loaded_source: Option<&str>,
    out: &mut Outcome,
) {
    match event {
        ChannelEvent::Progress { position } => {
            if session.active_index.is_some() && position.is_finite() {
                session.current_time = position.max(0.0);
            }
        }
        ChannelEvent::MetadataReady { duration } => {
            if session.active_index.is_some() && duration.is_finite() {
                session.duration = duration.max(0.0);
            }
        }
        ChannelEvent::Ended => on_ended(session, loaded_source, out),
        ChannelEvent::PlayResolved { request, outcome } => {
            on_play_resolved(session, request, outcome, out)
        }
    }
}

fn on_ended(session: &mut PlaybackSession, loaded_source: Option<&str>, out: &mut Outcome) {
    if !session.is_playing() {
        debug!(lifecycle = ?session.lifecycle, "Ignoring ended event outside playback");
        return;
    }
    let Some(index) = session.active_index else {
        return;
    };
    if index + 1 < session.verses.len() {
        activate(session, index + 1, true, loaded_source, out);
        return;
    }

    info!(index, "Chapter finished");
    session.active_index = None;
    session.next_play_request();
    session.lifecycle = Lifecycle::Idle;
    session.current_time = 0.0;
    out.actions.push(TransportAction::Stop);
    out.notices.push(PlayerNotice::ActiveVerseChanged(None));
    out.notices.push(PlayerNotice::ChapterFinished);
}

fn on_play_resolved(
    session: &mut PlaybackSession,
    request: PlayRequestId,
    outcome: Result<(), PlayRejection>,
    out: &mut Outcome,
) {
    if request != session.play_request {
        debug!(
            request,
            current = session.play_request,
            "Ignoring stale play resolution"
        );
        return;
    }
    match outcome {
        Ok(()) => {
            if session.lifecycle == (Lifecycle::Loading { request }) {
                session.lifecycle = Lifecycle::Playing;
            }
        }
        Err(PlayRejection::Superseded) => {
            debug!(request, "Play request superseded");
            if matches!(session.lifecycle, Lifecycle::Loading { .. }) {
                session.lifecycle = Lifecycle::Paused;
            }
        }
        Err(PlayRejection::Failed(reason)) => {
            warn!(request, index = ?session.active_index, %reason, "Playback stalled");
            session.lifecycle = Lifecycle::Paused;
            session.stalled = Some(reason.clone());
            out.notices.push(PlayerNotice::PlaybackStalled { reason });
        }
    }
}
