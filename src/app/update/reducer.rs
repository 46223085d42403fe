use super::super::messages::Message;
use super::super::state::{App, StartRequest};
use super::super::view::{
    render_bookmarks, render_chapter_header, render_chapters, render_help, render_reciters,
    render_status, render_verse,
};
use super::commands::{Command, normalize_key, parse_command};
use super::Effect;
use crate::audio::AudioChannel;
use crate::bookmarks::{Bookmark, Toggled};
use crate::catalog::{CHAPTER_COUNT, filter_chapters, reciter_by_id, resolve_chapter};
use crate::playback::{PlayerEvent, PlayerNotice};
use tracing::{debug, info, warn};

impl<C: AudioChannel> App<C> {
    pub(super) fn reduce(&mut self, message: Message) -> Vec<Effect> {
        let mut effects = Vec::new();

        match message {
            Message::Input(line) => self.handle_input(&line, &mut effects),
            Message::InputClosed => {
                info!("Input closed; playback continues until interrupted");
            }
            Message::VersesLoaded { request, result } => {
                let event = match result {
                    Ok(verses) => PlayerEvent::SequenceLoaded { request, verses },
                    Err(err) => PlayerEvent::SequenceFailed {
                        request,
                        reason: err.to_string(),
                    },
                };
                let notices = self.player.dispatch(event);
                self.handle_notices(notices, &mut effects);
            }
            Message::ChaptersLoaded(Ok(chapters)) => {
                if chapters.is_empty() {
                    warn!("Chapter list came back empty; keeping built-in table");
                } else {
                    debug!(count = chapters.len(), "Replacing chapter list");
                    self.chapters = chapters;
                }
            }
            Message::ChaptersLoaded(Err(err)) => {
                warn!("Failed to fetch chapter list: {err}");
            }
            Message::Channel(event) => {
                let notices = self.player.dispatch(PlayerEvent::Channel(event));
                self.handle_notices(notices, &mut effects);
            }
            Message::SafeQuit => effects.push(Effect::QuitSafely),
        }

        effects
    }

    pub(super) fn reduce_start(&mut self, start: StartRequest) -> Vec<Effect> {
        let mut effects = vec![Effect::FetchChapters];
        info!(
            chapter = start.chapter,
            verse = ?start.verse,
            reciter = %self.reciter.id,
            "Opening initial chapter"
        );
        self.open_chapter(start.chapter, start.verse, &mut effects);
        effects
    }

    fn handle_input(&mut self, line: &str, effects: &mut Vec<Effect>) {
        match parse_command(line, &self.config) {
            Ok(Some(command)) => self.handle_command(command, effects),
            Ok(None) => {}
            Err(err) => effects.push(Effect::Print(err.to_string())),
        }
    }

    fn handle_command(&mut self, command: Command, effects: &mut Vec<Effect>) {
        match command {
            Command::TogglePlay => self.player_intent(PlayerEvent::TogglePlay, effects),
            Command::Next => self.player_intent(PlayerEvent::Next, effects),
            Command::Prev => self.player_intent(PlayerEvent::Prev, effects),
            Command::Close => self.player_intent(PlayerEvent::Close, effects),
            Command::CycleRate => {
                self.player_intent(PlayerEvent::CycleRate, effects);
                effects.push(Effect::SaveSession);
            }
            Command::Seek(seconds) => self.player_intent(PlayerEvent::Seek(seconds), effects),
            Command::SelectVerse(verse) => {
                let len = self.player.session().verses().len();
                if len == 0 {
                    effects.push(Effect::Print("No chapter loaded yet".to_string()));
                } else if verse as usize > len {
                    effects.push(Effect::Print(format!(
                        "Verse {verse} is out of range (1-{len})"
                    )));
                } else {
                    self.player_intent(PlayerEvent::SelectVerse(verse as usize - 1), effects);
                }
            }
            Command::ToggleBookmark(verse) => self.handle_toggle_bookmark(verse, effects),
            Command::Open { chapter, verse } => self.open_chapter(chapter, verse, effects),
            Command::Reciter(id) => self.handle_reciter_change(&id, effects),
            Command::ListReciters => {
                effects.push(Effect::Print(render_reciters(&self.reciter.id)));
            }
            Command::Chapters(query) => {
                let matches = filter_chapters(&self.chapters, query.as_deref().unwrap_or(""));
                effects.push(Effect::Print(render_chapters(&matches)));
            }
            Command::Bookmarks => {
                effects.push(Effect::Print(render_bookmarks(self.bookmarks.list())));
            }
            Command::Goto(id) => match self.bookmarks.get(&id).map(Bookmark::key) {
                Some(key) => self.open_chapter(key.chapter, Some(key.verse), effects),
                None => effects.push(Effect::Print(format!("No saved verse `{id}`"))),
            },
            Command::Unmark(id) => {
                if self.bookmarks.remove(&id) {
                    info!(%id, "Bookmark removed");
                    effects.push(Effect::SaveBookmarks);
                    effects.push(Effect::Print(format!("Removed {id}")));
                } else {
                    effects.push(Effect::Print(format!("No saved verse `{id}`")));
                }
            }
            Command::Status => {
                let mut status = render_status(&self.player.view());
                if let Some(verse) = self.player.session().active_verse() {
                    status.push('\n');
                    status.push_str(&render_verse(
                        verse,
                        self.bookmarks.is_bookmarked(verse.key),
                    ));
                }
                effects.push(Effect::Print(status));
            }
            Command::Help => effects.push(Effect::Print(render_help(&self.config))),
            Command::Quit => effects.push(Effect::QuitSafely),
        }
    }

    fn player_intent(&mut self, event: PlayerEvent, effects: &mut Vec<Effect>) {
        let notices = self.player.dispatch(event);
        self.handle_notices(notices, effects);
        effects.push(Effect::Print(render_status(&self.player.view())));
    }

    /// `verse` is the 1-based verse number to land on, paused.
    fn open_chapter(&mut self, number: u32, verse: Option<u32>, effects: &mut Vec<Effect>) {
        let Some(chapter) = resolve_chapter(number, &self.chapters) else {
            effects.push(Effect::Print(format!(
                "Chapter must be between 1 and {CHAPTER_COUNT}"
            )));
            return;
        };
        let start_at = verse.and_then(|v| v.checked_sub(1)).map(|v| v as usize);
        let notices = self.player.dispatch(PlayerEvent::SequenceRequested {
            chapter,
            narrator: self.reciter.clone(),
            start_at,
        });
        self.handle_notices(notices, effects);
    }

    fn handle_reciter_change(&mut self, id: &str, effects: &mut Vec<Effect>) {
        let Some(reciter) = reciter_by_id(id) else {
            effects.push(Effect::Print(format!(
                "Unknown reciter `{id}`\n{}",
                render_reciters(&self.reciter.id)
            )));
            return;
        };
        if reciter.id == self.reciter.id {
            effects.push(Effect::Print(format!("Already listening to {}", reciter.name)));
            return;
        }
        info!(from = %self.reciter.id, to = %reciter.id, "Changing reciter");
        self.reciter = reciter.clone();
        self.config.reciter_id = reciter.id.clone();

        match self.player.session().chapter().map(|chapter| chapter.number) {
            Some(number) => self.open_chapter(number, None, effects),
            None => effects.push(Effect::SaveSession),
        }
    }

    /// `verse` is 1-based; without it the active verse is used.
    fn handle_toggle_bookmark(&mut self, verse: Option<u32>, effects: &mut Vec<Effect>) {
        let index = match verse {
            Some(verse) => verse.checked_sub(1).map(|v| v as usize),
            None => self.player.session().active_index(),
        };
        let Some(index) = index else {
            effects.push(Effect::Print("No verse selected".to_string()));
            return;
        };
        let Some(draft) = self.player.bookmark_draft(index) else {
            effects.push(Effect::Print(format!("Verse {} is not loaded", index + 1)));
            return;
        };

        let id = draft.key.to_string();
        let line = match self.bookmarks.toggle(Bookmark::from_draft(&draft)) {
            Toggled::Added => format!("Saved {id}"),
            Toggled::Removed => format!("Removed {id}"),
        };
        info!(%id, "Bookmark toggled");
        effects.push(Effect::SaveBookmarks);
        effects.push(Effect::Print(line));
    }

    fn handle_notices(&mut self, notices: Vec<PlayerNotice>, effects: &mut Vec<Effect>) {
        for notice in notices {
            match notice {
                PlayerNotice::ActiveVerseChanged(Some(index)) => {
                    if !self.config.auto_scroll {
                        continue;
                    }
                    if let Some(verse) = self.player.session().verses().get(index) {
                        effects.push(Effect::Print(render_verse(
                            verse,
                            self.bookmarks.is_bookmarked(verse.key),
                        )));
                    }
                }
                PlayerNotice::ActiveVerseChanged(None) => {}
                PlayerNotice::PlaybackStalled { reason } => {
                    let key = normalize_key(&self.config.key_toggle_play_pause, "p");
                    effects.push(Effect::Print(format!(
                        "Playback stalled: {reason}. Press `{key}` to retry."
                    )));
                }
                PlayerNotice::ChapterFinished => {
                    let name = self
                        .player
                        .session()
                        .chapter()
                        .map(|chapter| chapter.english_name.clone())
                        .unwrap_or_default();
                    effects.push(Effect::Print(format!("Finished {name}")));
                }
                PlayerNotice::FetchRequested {
                    request,
                    chapter,
                    narrator,
                } => {
                    effects.push(Effect::Print(format!(
                        "Loading chapter {chapter} ({})…",
                        narrator.name
                    )));
                    effects.push(Effect::FetchVerses {
                        request,
                        chapter,
                        reciter: narrator,
                    });
                    effects.push(Effect::SaveSession);
                }
                PlayerNotice::SequenceReady { .. } => {
                    if let Some(chapter) = self.player.session().chapter() {
                        effects.push(Effect::Print(render_chapter_header(
                            chapter,
                            &self.reciter.name,
                        )));
                    }
                }
                PlayerNotice::ContentUnavailable { reason } => {
                    effects.push(Effect::Print(format!("Could not load chapter: {reason}")));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::fake::{Command as ChannelCommand, FakeChannel};
    use crate::audio::ChannelEvent;
    use crate::catalog::Reciter;
    use crate::config::AppConfig;
    use crate::content::{Chapter, ContentError, Verse, VerseKey, VerseSource};
    use crate::playback::SequenceStatus;
    use std::sync::mpsc;
    use std::sync::Arc;

    struct NoopSource;

    impl VerseSource for NoopSource {
        fn fetch_verses(&self, _: u32, _: &Reciter) -> Result<Vec<Verse>, ContentError> {
            Ok(Vec::new())
        }

        fn fetch_chapters(&self) -> Result<Vec<Chapter>, ContentError> {
            Ok(Vec::new())
        }
    }

    fn app(name: &str) -> App<FakeChannel> {
        let mut config = AppConfig::default();
        config.cache_dir = std::env::temp_dir()
            .join(format!("ayah-player-reducer-{name}-{}", std::process::id()))
            .to_string_lossy()
            .into_owned();
        let _ = std::fs::remove_dir_all(&config.cache_dir);
        let (sender, _receiver) = mpsc::channel();
        App::new(config, FakeChannel::new(), Arc::new(NoopSource), sender)
    }

    fn verses(chapter: u32, count: u32) -> Vec<Verse> {
        (1..=count)
            .map(|verse| Verse {
                key: VerseKey { chapter, verse },
                number: verse,
                text: format!("ayah {verse}"),
                translation: format!("translation {verse}"),
                audio_url: format!("https://cdn.test/{chapter:03}{verse:03}.mp3"),
            })
            .collect()
    }

    fn fetch_request(effects: &[Effect]) -> Option<(u64, u32, String)> {
        effects.iter().find_map(|effect| match effect {
            Effect::FetchVerses {
                request,
                chapter,
                reciter,
            } => Some((*request, *chapter, reciter.id.clone())),
            _ => None,
        })
    }

    fn printed(effects: &[Effect]) -> Vec<&str> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Print(line) => Some(line.as_str()),
                _ => None,
            })
            .collect()
    }

    fn loaded(app: &mut App<FakeChannel>, chapter: u32, count: u32) {
        let effects = app.reduce(Message::Input(format!("open {chapter}")));
        let (request, _, _) = fetch_request(&effects).expect("fetch requested");
        app.reduce(Message::VersesLoaded {
            request,
            result: Ok(verses(chapter, count)),
        });
    }

    #[test]
    fn start_fetches_chapters_and_initial_verses() {
        let mut app = app("start");
        let effects = app.reduce_start(StartRequest {
            chapter: 36,
            verse: None,
        });
        assert_eq!(effects[0], Effect::FetchChapters);
        assert_eq!(
            fetch_request(&effects),
            Some((1, 36, "ar.alafasy".to_string()))
        );
        assert!(effects.contains(&Effect::SaveSession));
    }

    #[test]
    fn later_open_wins_over_earlier_fetch() {
        let mut app = app("last-wins");
        let first = app.reduce(Message::Input("open 2".to_string()));
        let (first_request, _, _) = fetch_request(&first).expect("first fetch");
        let second = app.reduce(Message::Input("open 3".to_string()));
        let (second_request, chapter, _) = fetch_request(&second).expect("second fetch");
        assert_eq!(chapter, 3);

        app.reduce(Message::VersesLoaded {
            request: first_request,
            result: Ok(verses(2, 286)),
        });
        assert!(matches!(
            app.player.session().sequence(),
            SequenceStatus::Loading { .. }
        ));

        app.reduce(Message::VersesLoaded {
            request: second_request,
            result: Ok(verses(3, 200)),
        });
        assert_eq!(app.player.session().verses().len(), 200);
    }

    #[test]
    fn number_input_plays_that_verse() {
        let mut app = app("select");
        loaded(&mut app, 1, 7);
        let effects = app.reduce(Message::Input("3".to_string()));
        assert_eq!(app.player.session().active_index(), Some(2));
        assert!(app
            .player
            .channel()
            .commands
            .iter()
            .any(|command| matches!(command, ChannelCommand::Play(_))));
        assert!(printed(&effects).iter().any(|line| line.contains("(1:3)")));

        let effects = app.reduce(Message::Input("9".to_string()));
        assert_eq!(printed(&effects), vec!["Verse 9 is out of range (1-7)"]);
    }

    #[test]
    fn bookmark_toggle_uses_given_or_active_verse() {
        let mut app = app("bookmark");
        loaded(&mut app, 18, 110);

        let effects = app.reduce(Message::Input("m".to_string()));
        assert_eq!(printed(&effects), vec!["No verse selected"]);

        let effects = app.reduce(Message::Input("m 10".to_string()));
        assert!(effects.contains(&Effect::SaveBookmarks));
        assert!(app.bookmarks.is_bookmarked(VerseKey { chapter: 18, verse: 10 }));

        app.reduce(Message::Input("10".to_string()));
        let effects = app.reduce(Message::Input("m".to_string()));
        assert_eq!(printed(&effects), vec!["Removed 18:10"]);
    }

    #[test]
    fn goto_opens_bookmarked_verse_paused() {
        let mut app = app("goto");
        loaded(&mut app, 18, 110);
        app.reduce(Message::Input("m 10".to_string()));
        app.reduce(Message::Input("open 1".to_string()));

        let effects = app.reduce(Message::Input("goto 18:10".to_string()));
        let (request, chapter, _) = fetch_request(&effects).expect("fetch for bookmark");
        assert_eq!(chapter, 18);
        app.reduce(Message::VersesLoaded {
            request,
            result: Ok(verses(18, 110)),
        });
        assert_eq!(app.player.session().active_index(), Some(9));
        assert!(!app.player.session().is_playing());

        let effects = app.reduce(Message::Input("goto 99:1".to_string()));
        assert_eq!(printed(&effects), vec!["No saved verse `99:1`"]);
    }

    #[test]
    fn reciter_change_refetches_current_chapter() {
        let mut app = app("reciter");
        loaded(&mut app, 112, 4);
        app.reduce(Message::Input("2".to_string()));

        let effects = app.reduce(Message::Input("reciter ar.husary".to_string()));
        assert_eq!(
            fetch_request(&effects).map(|(_, chapter, id)| (chapter, id)),
            Some((112, "ar.husary".to_string()))
        );
        assert!(app.player.session().active_index().is_none());
        assert_eq!(app.config.reciter_id, "ar.husary");

        let effects = app.reduce(Message::Input("reciter ar.nobody".to_string()));
        assert!(printed(&effects)[0].starts_with("Unknown reciter"));
    }

    #[test]
    fn failed_fetch_is_reported() {
        let mut app = app("failed");
        let effects = app.reduce(Message::Input("open 5".to_string()));
        let (request, _, _) = fetch_request(&effects).expect("fetch");
        let effects = app.reduce(Message::VersesLoaded {
            request,
            result: Err(ContentError::Malformed("bad payload".to_string())),
        });
        assert_eq!(
            printed(&effects),
            vec!["Could not load chapter: malformed content payload: bad payload"]
        );
    }

    #[test]
    fn finishing_last_verse_reports_chapter_done() {
        let mut app = app("finish");
        loaded(&mut app, 1, 1);
        app.reduce(Message::Input("1".to_string()));
        let request = app.player.session().play_request();
        app.reduce(Message::Channel(ChannelEvent::PlayResolved {
            request,
            outcome: Ok(()),
        }));
        let effects = app.reduce(Message::Channel(ChannelEvent::Ended));
        assert_eq!(printed(&effects), vec!["Finished Al-Fatiha"]);
        assert!(app.player.session().active_index().is_none());
    }

    #[test]
    fn invalid_open_and_quit() {
        let mut app = app("quit");
        let effects = app.reduce(Message::Input("open 200".to_string()));
        assert_eq!(printed(&effects), vec!["Chapter must be between 1 and 114"]);
        assert_eq!(
            app.reduce(Message::Input("q".to_string())),
            vec![Effect::QuitSafely]
        );
        assert_eq!(app.reduce(Message::SafeQuit), vec![Effect::QuitSafely]);
    }
}
