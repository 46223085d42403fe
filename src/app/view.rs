//! Plain-text rendering for the terminal shell. Everything here is a pure
//! function of state so the reducer can hand finished lines to the runtime.

use super::update::normalize_key;
use crate::bookmarks::Bookmark;
use crate::catalog::RECITERS;
use crate::config::AppConfig;
use crate::content::{Chapter, Verse};
use crate::playback::{PlayerView, TransportState, format_time};
use std::fmt::Write as _;

pub(super) fn render_status(view: &PlayerView) -> String {
    let state = match view.state {
        TransportState::Idle => "■ idle",
        TransportState::Loading => "… loading",
        TransportState::Playing => "▶ playing",
        TransportState::Paused => "⏸ paused",
    };
    let chapter = view.chapter_name.as_deref().unwrap_or("no chapter");
    let mut line = format!("[{state}] {chapter}");
    if let (Some(number), Some(verse)) = (view.chapter_number, view.active_verse_number) {
        let _ = write!(line, " {number}:{verse}");
    }
    let _ = write!(
        line,
        " | {} / {} ({:.0}%) | {}x",
        format_time(view.current_time),
        format_time(view.duration),
        view.progress_pct,
        view.playback_rate
    );
    if let Some(narrator) = &view.narrator_name {
        let _ = write!(line, " | {narrator}");
    }
    if let Some(reason) = &view.stalled {
        let _ = write!(line, "\n  stalled: {reason}");
    }
    if let Some(reason) = &view.content_error {
        let _ = write!(line, "\n  chapter unavailable: {reason}");
    }
    line
}

pub(super) fn render_verse(verse: &Verse, bookmarked: bool) -> String {
    let marker = if bookmarked { "★" } else { " " };
    format!(
        "{marker} ({}) {}\n    {}",
        verse.key, verse.text, verse.translation
    )
}

pub(super) fn render_chapter_header(chapter: &Chapter, narrator: &str) -> String {
    let mut header = format!("{}. {}", chapter.number, chapter.english_name);
    if !chapter.english_name_translation.is_empty() {
        let _ = write!(header, " ({})", chapter.english_name_translation);
    }
    if !chapter.arabic_name.is_empty() {
        let _ = write!(header, " {}", chapter.arabic_name);
    }
    let _ = write!(header, " | {} verses | {narrator}", chapter.verse_count);
    header
}

pub(super) fn render_chapters(chapters: &[&Chapter]) -> String {
    if chapters.is_empty() {
        return "No matching chapters".to_string();
    }
    chapters
        .iter()
        .map(|chapter| {
            format!(
                "{:>3}. {} ({}) {} verses",
                chapter.number,
                chapter.english_name,
                chapter.english_name_translation,
                chapter.verse_count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(super) fn render_bookmarks(bookmarks: &[Bookmark]) -> String {
    if bookmarks.is_empty() {
        return "No saved verses".to_string();
    }
    bookmarks
        .iter()
        .map(|bookmark| {
            format!(
                "{:>7}  {} {}: {}",
                bookmark.id, bookmark.chapter_name, bookmark.verse_number, bookmark.text_preview
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(super) fn render_reciters(current_id: &str) -> String {
    RECITERS
        .iter()
        .map(|reciter| {
            let marker = if reciter.id == current_id { "*" } else { " " };
            format!("{marker} {:<24} {}", reciter.id, reciter.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(super) fn render_help(config: &AppConfig) -> String {
    let keys = [
        (normalize_key(&config.key_toggle_play_pause, "p"), "play / pause"),
        (normalize_key(&config.key_next_verse, "n"), "next verse"),
        (normalize_key(&config.key_prev_verse, "b"), "previous verse"),
        (normalize_key(&config.key_close_player, "x"), "close player"),
        (normalize_key(&config.key_cycle_rate, "r"), "cycle playback rate"),
        (
            format!("{} [verse]", normalize_key(&config.key_toggle_bookmark, "m")),
            "toggle bookmark",
        ),
        (normalize_key(&config.key_safe_quit, "q"), "quit"),
    ];
    let mut help = String::from("Commands:\n");
    for (key, action) in keys {
        let _ = writeln!(help, "  {key:<22} {action}");
    }
    for (usage, action) in [
        ("<verse>", "play verse by number"),
        ("s <seconds>", "seek within the verse"),
        ("open <chapter>[:<verse>]", "open a chapter"),
        ("reciter <id>", "change reciter"),
        ("reciters", "list reciters"),
        ("chapters [query]", "search chapters"),
        ("bookmarks", "list saved verses"),
        ("goto <id>", "open a saved verse"),
        ("unmark <id>", "remove a saved verse"),
        ("status", "show player status"),
    ] {
        let _ = writeln!(help, "  {usage:<22} {action}");
    }
    help.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::VerseKey;
    use crate::playback::PlaybackSession;

    #[test]
    fn idle_status_has_no_verse() {
        let view = PlayerView::from_session(&PlaybackSession::default());
        let status = render_status(&view);
        assert!(status.starts_with("[■ idle] no chapter |"));
        assert!(status.contains("0:00 / 0:00"));
    }

    #[test]
    fn verse_marks_bookmarks() {
        let verse = Verse {
            key: VerseKey { chapter: 1, verse: 2 },
            number: 2,
            text: "ٱلْحَمْدُ لِلَّهِ".to_string(),
            translation: "All praise is due to God".to_string(),
            audio_url: String::new(),
        };
        assert!(render_verse(&verse, true).starts_with("★ (1:2)"));
        assert!(render_verse(&verse, false).starts_with("  (1:2)"));
    }

    #[test]
    fn help_uses_configured_keys() {
        let mut config = AppConfig::default();
        config.key_next_verse = "j".to_string();
        let help = render_help(&config);
        assert!(help.contains("  j "));
        assert!(help.contains("m [verse]"));
    }

    #[test]
    fn reciter_list_marks_current() {
        let list = render_reciters("ar.husary");
        assert!(list.contains("* ar.husary"));
        assert!(list.contains("  ar.alafasy"));
    }
}
