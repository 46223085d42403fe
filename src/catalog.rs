//! Built-in reciter and chapter tables.
//!
//! The chapter table is an offline fallback; the full list comes from the
//! content API when reachable.

use crate::content::Chapter;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A selectable narrator whose per-verse recordings live under `subfolder`
/// on the audio CDN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reciter {
    pub id: String,
    pub name: String,
    pub subfolder: String,
}

const RECITER_TABLE: [(&str, &str, &str); 5] = [
    ("ar.alafasy", "Mishary Rashid Alafasy", "Alafasy_64kbps"),
    (
        "ar.abdulbasitmurattal",
        "Abdul Basit 'Abd us-Samad",
        "Abdul_Basit_Murattal_64kbps",
    ),
    (
        "ar.abdurrahmaansudais",
        "Abdur-Rahman as-Sudais",
        "Abdurrahmaan_As-Sudais_64kbps",
    ),
    ("ar.saoodshuraym", "Sa'ud ash-Shuraym", "Saood_ash-Shuraym_64kbps"),
    ("ar.husary", "Mahmoud Khalil Al-Hussary", "Husary_64kbps"),
];

pub static RECITERS: Lazy<Vec<Reciter>> = Lazy::new(|| {
    RECITER_TABLE
        .iter()
        .map(|(id, name, subfolder)| Reciter {
            id: id.to_string(),
            name: name.to_string(),
            subfolder: subfolder.to_string(),
        })
        .collect()
});

static RECITERS_BY_ID: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    RECITER_TABLE
        .iter()
        .enumerate()
        .map(|(idx, (id, _, _))| (*id, idx))
        .collect()
});

pub fn reciter_by_id(id: &str) -> Option<&'static Reciter> {
    RECITERS_BY_ID
        .get(id.trim())
        .and_then(|idx| RECITERS.get(*idx))
}

pub fn default_reciter() -> &'static Reciter {
    &RECITERS[0]
}

/// Resolve a configured id, falling back to the default narrator.
pub fn reciter_or_default(id: &str) -> &'static Reciter {
    reciter_by_id(id).unwrap_or_else(default_reciter)
}

const CHAPTER_TABLE: [(u32, &str, &str, &str, usize); 11] = [
    (1, "Al-Fatiha", "The Opener", "الفاتحة", 7),
    (2, "Al-Baqarah", "The Cow", "البقرة", 286),
    (3, "Al-Imran", "Family of Imran", "آل عمران", 200),
    (4, "An-Nisa", "The Women", "النساء", 176),
    (5, "Al-Ma'idah", "The Table Spread", "المائدة", 120),
    (6, "Al-An'am", "The Cattle", "الأنعام", 165),
    (7, "Al-A'raf", "The Heights", "الأعراف", 206),
    (8, "Al-Anfal", "The Spoils of War", "الأنفال", 75),
    (18, "Al-Kahf", "The Cave", "الكهف", 110),
    (36, "Ya-Sin", "Ya Sin", "يس", 83),
    (67, "Al-Mulk", "The Sovereignty", "الملك", 30),
];

pub const CHAPTER_COUNT: u32 = 114;

pub fn builtin_chapters() -> Vec<Chapter> {
    CHAPTER_TABLE
        .iter()
        .map(
            |(number, english_name, translation, arabic_name, verse_count)| Chapter {
                number: *number,
                english_name: english_name.to_string(),
                english_name_translation: translation.to_string(),
                arabic_name: arabic_name.to_string(),
                verse_count: *verse_count,
            },
        )
        .collect()
}

/// Look a chapter up in `known`, then in the built-in table, then fall back
/// to a bare placeholder for any number in `1..=114`.
pub fn resolve_chapter(number: u32, known: &[Chapter]) -> Option<Chapter> {
    if !(1..=CHAPTER_COUNT).contains(&number) {
        return None;
    }
    known
        .iter()
        .find(|chapter| chapter.number == number)
        .cloned()
        .or_else(|| {
            builtin_chapters()
                .into_iter()
                .find(|chapter| chapter.number == number)
        })
        .or_else(|| {
            Some(Chapter {
                number,
                english_name: format!("Surah {number}"),
                english_name_translation: String::new(),
                arabic_name: String::new(),
                verse_count: 0,
            })
        })
}

/// Case-insensitive chapter filter over names, plus exact or prefix matches
/// on the chapter number.
pub fn filter_chapters<'a>(chapters: &'a [Chapter], query: &str) -> Vec<&'a Chapter> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return chapters.iter().collect();
    }
    chapters
        .iter()
        .filter(|chapter| {
            let number = chapter.number.to_string();
            chapter.english_name.to_lowercase().contains(&query)
                || chapter
                    .english_name_translation
                    .to_lowercase()
                    .contains(&query)
                || number.starts_with(&query)
        })
        .collect()
}
