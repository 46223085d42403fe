//! Saved verses, persisted as a JSON list under the cache directory.

use crate::content::VerseKey;
use crate::playback::BookmarkDraft;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

const BOOKMARKS_FILE: &str = "bookmarks.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    /// `"chapter:verse"`.
    pub id: String,
    pub chapter_number: u32,
    pub chapter_name: String,
    pub verse_number: u32,
    pub text_preview: String,
    /// Unix milliseconds.
    pub timestamp: u64,
}

impl Bookmark {
    pub fn from_draft(draft: &BookmarkDraft) -> Self {
        Self {
            id: draft.key.to_string(),
            chapter_number: draft.key.chapter,
            chapter_name: draft.chapter_name.clone(),
            verse_number: draft.key.verse,
            text_preview: draft.preview.clone(),
            timestamp: now_millis(),
        }
    }

    pub fn key(&self) -> VerseKey {
        VerseKey {
            chapter: self.chapter_number,
            verse: self.verse_number,
        }
    }
}

/// Whether a toggle added or removed the bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

/// Newest-first list of bookmarks backed by one JSON file.
#[derive(Debug)]
pub struct BookmarkStore {
    path: PathBuf,
    entries: Vec<Bookmark>,
}

impl BookmarkStore {
    /// Load bookmarks from `cache_dir`. A missing or unreadable file yields
    /// an empty store.
    pub fn open(cache_dir: &Path) -> Self {
        let path = cache_dir.join(BOOKMARKS_FILE);
        let entries = match fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str::<Vec<Bookmark>>(&data) {
                Ok(entries) => {
                    info!(count = entries.len(), "Loaded bookmarks");
                    entries
                }
                Err(err) => {
                    warn!(path = %path.display(), "Failed to parse bookmarks: {err}");
                    Vec::new()
                }
            },
            Err(err) => {
                debug!(path = %path.display(), "No saved bookmarks: {err}");
                Vec::new()
            }
        };
        Self { path, entries }
    }

    pub fn list(&self) -> &[Bookmark] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&Bookmark> {
        self.entries.iter().find(|bookmark| bookmark.id == id)
    }

    pub fn is_bookmarked(&self, key: VerseKey) -> bool {
        let id = key.to_string();
        self.entries.iter().any(|bookmark| bookmark.id == id)
    }

    pub fn toggle(&mut self, bookmark: Bookmark) -> Toggled {
        if self.remove(&bookmark.id) {
            Toggled::Removed
        } else {
            self.entries.insert(0, bookmark);
            Toggled::Added
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|bookmark| bookmark.id != id);
        self.entries.len() != before
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating {}", parent.display()))?;
        }
        let contents =
            serde_json::to_string_pretty(&self.entries).context("Serializing bookmarks")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("Writing {}", self.path.display()))?;
        debug!(count = self.entries.len(), "Saved bookmarks");
        Ok(())
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "ayah-player-bookmarks-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn draft(chapter: u32, verse: u32) -> BookmarkDraft {
        BookmarkDraft {
            key: VerseKey { chapter, verse },
            chapter_name: format!("Chapter {chapter}"),
            preview: "preview".to_string(),
        }
    }

    #[test]
    fn toggle_adds_newest_first_then_removes() {
        let mut store = BookmarkStore::open(&scratch_dir("toggle"));
        assert_eq!(store.toggle(Bookmark::from_draft(&draft(1, 1))), Toggled::Added);
        assert_eq!(store.toggle(Bookmark::from_draft(&draft(2, 255))), Toggled::Added);
        let ids: Vec<&str> = store.list().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["2:255", "1:1"]);

        assert_eq!(store.toggle(Bookmark::from_draft(&draft(1, 1))), Toggled::Removed);
        assert!(!store.is_bookmarked(VerseKey { chapter: 1, verse: 1 }));
        assert!(store.is_bookmarked(VerseKey { chapter: 2, verse: 255 }));
    }

    #[test]
    fn bookmarks_persist_across_opens() {
        let dir = scratch_dir("persist");
        let mut store = BookmarkStore::open(&dir);
        store.toggle(Bookmark::from_draft(&draft(18, 10)));
        store.save().expect("save bookmarks");

        let reopened = BookmarkStore::open(&dir);
        let bookmark = reopened.get("18:10").expect("bookmark persisted");
        assert_eq!(bookmark.chapter_name, "Chapter 18");
        assert_eq!(bookmark.key(), VerseKey { chapter: 18, verse: 10 });
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn remove_reports_missing_ids() {
        let mut store = BookmarkStore::open(&scratch_dir("remove"));
        store.toggle(Bookmark::from_draft(&draft(3, 3)));
        assert!(store.remove("3:3"));
        assert!(!store.remove("3:3"));
    }

    #[test]
    fn corrupt_file_yields_empty_store() {
        let dir = scratch_dir("corrupt");
        fs::create_dir_all(&dir).expect("create dir");
        fs::write(dir.join(BOOKMARKS_FILE), "{not json").expect("write");
        assert!(BookmarkStore::open(&dir).list().is_empty());
        let _ = fs::remove_dir_all(&dir);
    }
}
