use super::state::{PlaybackRate, PlaybackSession};
use super::transitions::{PlayerEvent, PlayerNotice, TransportAction, transition};
use super::view::PlayerView;
use crate::audio::AudioChannel;
use crate::content::VerseKey;

/// Identity and preview text handed to the bookmark store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkDraft {
    pub key: VerseKey,
    pub chapter_name: String,
    pub preview: String,
}

/// Owns the session and the one audio channel; every mutation goes through
/// [`Orchestrator::dispatch`].
pub struct Orchestrator<C: AudioChannel> {
    session: PlaybackSession,
    channel: C,
    preview_chars: usize,
}

impl<C: AudioChannel> Orchestrator<C> {
    pub fn new(mut channel: C, rate: PlaybackRate, preview_chars: usize) -> Self {
        channel.set_rate(rate.multiplier());
        Self {
            session: PlaybackSession::new(rate),
            channel,
            preview_chars,
        }
    }

    pub fn dispatch(&mut self, event: PlayerEvent) -> Vec<PlayerNotice> {
        let outcome = transition(&mut self.session, event, self.channel.current_source());
        for action in outcome.actions {
            self.apply(action);
        }
        outcome.notices
    }

    fn apply(&mut self, action: TransportAction) {
        match action {
            TransportAction::Pause => self.channel.pause(),
            TransportAction::SetSource(url) => self.channel.set_source(&url),
            TransportAction::SetRate(multiplier) => self.channel.set_rate(multiplier),
            TransportAction::Play { request } => self.channel.play(request),
            TransportAction::Seek(seconds) => self.channel.seek(seconds),
            TransportAction::Stop => self.channel.stop(),
        }
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn view(&self) -> PlayerView {
        PlayerView::from_session(&self.session)
    }

    /// Bookmark identity for the verse displayed at `index`, regardless of
    /// playback state.
    pub fn bookmark_draft(&self, index: usize) -> Option<BookmarkDraft> {
        let verse = self.session.verses().get(index)?;
        let chapter_name = self
            .session
            .chapter()
            .map(|chapter| chapter.english_name.clone())
            .unwrap_or_else(|| format!("Surah {}", verse.key.chapter));
        Some(BookmarkDraft {
            key: verse.key,
            chapter_name,
            preview: truncate_preview(&verse.translation, self.preview_chars),
        })
    }
}

fn truncate_preview(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut preview: String = text.chars().take(max_chars).collect();
    preview.truncate(preview.trim_end().len());
    preview.push('…');
    preview
}
