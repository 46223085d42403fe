//! Verse data source backed by the alquran.cloud text API and the
//! everyayah.com per-verse audio CDN.

use crate::catalog::Reciter;
use crate::config::AppConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Identity of a verse: `(chapter, verse number within chapter)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VerseKey {
    pub chapter: u32,
    pub verse: u32,
}

impl fmt::Display for VerseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter, self.verse)
    }
}

impl VerseKey {
    /// Parse the `"chapter:verse"` form used as bookmark id.
    pub fn parse(raw: &str) -> Option<Self> {
        let (chapter, verse) = raw.trim().split_once(':')?;
        Some(Self {
            chapter: chapter.trim().parse().ok()?,
            verse: verse.trim().parse().ok()?,
        })
    }
}

/// One verse of a fetched chapter. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    pub key: VerseKey,
    /// Position of the verse across the whole book.
    pub number: u32,
    pub text: String,
    pub translation: String,
    pub audio_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub number: u32,
    pub english_name: String,
    pub english_name_translation: String,
    pub arabic_name: String,
    pub verse_count: usize,
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("content service returned status {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("malformed content payload: {0}")]
    Malformed(String),
    #[error(
        "chapter {chapter} editions disagree: {text} verses vs {translation} translations"
    )]
    EditionMismatch {
        chapter: u32,
        text: usize,
        translation: usize,
    },
    #[error("content worker failed: {0}")]
    Worker(String),
}

/// Resolves verse sequences for a `(chapter, narrator)` pair.
pub trait VerseSource: Send + Sync {
    fn fetch_verses(&self, chapter: u32, reciter: &Reciter) -> Result<Vec<Verse>, ContentError>;

    fn fetch_chapters(&self) -> Result<Vec<Chapter>, ContentError>;
}

pub fn audio_url(audio_base_url: &str, reciter: &Reciter, key: VerseKey) -> String {
    format!(
        "{}/{}/{:03}{:03}.mp3",
        audio_base_url.trim_end_matches('/'),
        reciter.subfolder,
        key.chapter,
        key.verse
    )
}

pub struct HttpVerseSource {
    client: reqwest::blocking::Client,
    api_base_url: String,
    audio_base_url: String,
    text_edition: String,
    translation_edition: String,
}

impl HttpVerseSource {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs.max(1)))
            .build()
            .context("Building content HTTP client")?;
        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            audio_base_url: config.audio_base_url.clone(),
            text_edition: config.text_edition.clone(),
            translation_edition: config.translation_edition.clone(),
        })
    }

    fn get_body(&self, url: &str) -> Result<String, ContentError> {
        debug!(%url, "Requesting content");
        let response = self.client.get(url).send().map_err(|source| ContentError::Http {
            url: url.to_string(),
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().map_err(|source| ContentError::Http {
            url: url.to_string(),
            source,
        })
    }
}

impl VerseSource for HttpVerseSource {
    fn fetch_verses(&self, chapter: u32, reciter: &Reciter) -> Result<Vec<Verse>, ContentError> {
        let url = format!(
            "{}/surah/{}/editions/{},{}",
            self.api_base_url, chapter, self.text_edition, self.translation_edition
        );
        let body = self.get_body(&url)?;
        let verses = parse_chapter_editions(chapter, &body, reciter, &self.audio_base_url)?;
        info!(
            chapter,
            reciter = %reciter.id,
            verse_count = verses.len(),
            "Fetched chapter verses"
        );
        Ok(verses)
    }

    fn fetch_chapters(&self) -> Result<Vec<Chapter>, ContentError> {
        let url = format!("{}/surah", self.api_base_url);
        let body = self.get_body(&url)?;
        let chapters = parse_chapter_list(&body)?;
        info!(count = chapters.len(), "Fetched chapter list");
        Ok(chapters)
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct EditionPayload {
    ayahs: Vec<AyahPayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AyahPayload {
    number: u32,
    text: String,
    number_in_surah: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChapterPayload {
    number: u32,
    name: String,
    english_name: String,
    english_name_translation: String,
    number_of_ayahs: usize,
}

/// Zip the text edition and the translation edition of one chapter by
/// position. Both editions must list the same number of verses.
pub fn parse_chapter_editions(
    chapter: u32,
    body: &str,
    reciter: &Reciter,
    audio_base_url: &str,
) -> Result<Vec<Verse>, ContentError> {
    let envelope: Envelope<Vec<EditionPayload>> =
        serde_json::from_str(body).map_err(|err| ContentError::Malformed(err.to_string()))?;
    let mut editions = envelope.data.into_iter();
    let (Some(text), Some(translation)) = (editions.next(), editions.next()) else {
        return Err(ContentError::Malformed(format!(
            "chapter {chapter} response is missing an edition"
        )));
    };
    if text.ayahs.len() != translation.ayahs.len() {
        return Err(ContentError::EditionMismatch {
            chapter,
            text: text.ayahs.len(),
            translation: translation.ayahs.len(),
        });
    }
    if text.ayahs.is_empty() {
        return Err(ContentError::Malformed(format!("chapter {chapter} has no verses")));
    }

    Ok(text
        .ayahs
        .into_iter()
        .zip(translation.ayahs)
        .map(|(ayah, translated)| {
            let key = VerseKey {
                chapter,
                verse: ayah.number_in_surah,
            };
            Verse {
                key,
                number: ayah.number,
                text: ayah.text,
                translation: translated.text,
                audio_url: audio_url(audio_base_url, reciter, key),
            }
        })
        .collect())
}

pub fn parse_chapter_list(body: &str) -> Result<Vec<Chapter>, ContentError> {
    let envelope: Envelope<Vec<ChapterPayload>> =
        serde_json::from_str(body).map_err(|err| ContentError::Malformed(err.to_string()))?;
    Ok(envelope
        .data
        .into_iter()
        .map(|payload| Chapter {
            number: payload.number,
            english_name: payload.english_name,
            english_name_translation: payload.english_name_translation,
            arabic_name: payload.name,
            verse_count: payload.number_of_ayahs,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::reciter_or_default;

    const TWO_EDITIONS: &str = r#"{
        "code": 200,
        "status": "OK",
        "data": [
            {
                "number": 112,
                "englishName": "Al-Ikhlaas",
                "ayahs": [
                    {"number": 6222, "text": "قُلْ هُوَ ٱللَّهُ أَحَدٌ", "numberInSurah": 1, "juz": 30},
                    {"number": 6223, "text": "ٱللَّهُ ٱلصَّمَدُ", "numberInSurah": 2, "juz": 30}
                ]
            },
            {
                "number": 112,
                "englishName": "Al-Ikhlaas",
                "ayahs": [
                    {"number": 6222, "text": "SAY: He is the One God", "numberInSurah": 1},
                    {"number": 6223, "text": "God the Eternal, the Uncaused Cause", "numberInSurah": 2}
                ]
            }
        ]
    }"#;

    #[test]
    fn builds_zero_padded_audio_url() {
        let reciter = reciter_or_default("ar.alafasy");
        let url = audio_url(
            "https://everyayah.com/data/",
            reciter,
            VerseKey { chapter: 2, verse: 255 },
        );
        assert_eq!(url, "https://everyayah.com/data/Alafasy_64kbps/002255.mp3");
    }

    #[test]
    fn zips_text_and_translation_editions() {
        let reciter = reciter_or_default("ar.husary");
        let verses =
            parse_chapter_editions(112, TWO_EDITIONS, reciter, "https://cdn.test").expect("parses");
        assert_eq!(verses.len(), 2);
        assert_eq!(verses[1].key, VerseKey { chapter: 112, verse: 2 });
        assert_eq!(verses[1].number, 6223);
        assert_eq!(verses[0].translation, "SAY: He is the One God");
        assert_eq!(verses[1].audio_url, "https://cdn.test/Husary_64kbps/112002.mp3");
    }

    #[test]
    fn rejects_mismatched_editions() {
        let body = r#"{"data": [
            {"ayahs": [{"number": 1, "text": "a", "numberInSurah": 1}]},
            {"ayahs": []}
        ]}"#;
        let err = parse_chapter_editions(1, body, reciter_or_default(""), "x").unwrap_err();
        assert!(matches!(
            err,
            ContentError::EditionMismatch {
                text: 1,
                translation: 0,
                ..
            }
        ));
    }

    #[test]
    fn rejects_single_edition_payload() {
        let body = r#"{"data": [{"ayahs": []}]}"#;
        let err = parse_chapter_editions(1, body, reciter_or_default(""), "x").unwrap_err();
        assert!(matches!(err, ContentError::Malformed(_)));
    }

    #[test]
    fn parses_chapter_list() {
        let body = r#"{"data": [{
            "number": 36, "name": "سورة يس", "englishName": "Ya-Sin",
            "englishNameTranslation": "Ya Sin", "numberOfAyahs": 83, "revelationType": "Meccan"
        }]}"#;
        let chapters = parse_chapter_list(body).expect("parses");
        assert_eq!(chapters[0].english_name, "Ya-Sin");
        assert_eq!(chapters[0].verse_count, 83);
    }

    #[test]
    fn verse_key_round_trips_through_bookmark_id() {
        let key = VerseKey { chapter: 18, verse: 10 };
        assert_eq!(VerseKey::parse(&key.to_string()), Some(key));
        assert_eq!(VerseKey::parse("18"), None);
    }
}
