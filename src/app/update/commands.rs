use crate::config::AppConfig;
use thiserror::Error;

/// A parsed stdin command.
#[derive(Debug, Clone, PartialEq)]
pub(in crate::app) enum Command {
    TogglePlay,
    Next,
    Prev,
    Close,
    CycleRate,
    /// Verse number within the chapter, or the active verse.
    ToggleBookmark(Option<u32>),
    SelectVerse(u32),
    Seek(f64),
    Open { chapter: u32, verse: Option<u32> },
    Reciter(String),
    ListReciters,
    Chapters(Option<String>),
    Bookmarks,
    Goto(String),
    Unmark(String),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(in crate::app) enum CommandError {
    #[error("unknown command `{0}` (type `help`)")]
    Unknown(String),
    #[error("`{command}`: {reason}")]
    Invalid {
        command: &'static str,
        reason: &'static str,
    },
}

/// Parse one input line. Returns `Ok(None)` for blank lines.
pub(in crate::app) fn parse_command(
    line: &str,
    config: &AppConfig,
) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let mut parts = line.split_whitespace();
    let head = parts.next().unwrap_or_default().to_ascii_lowercase();
    let rest: Vec<&str> = parts.collect();
    let arg = rest.first().copied();

    if let Ok(verse) = head.parse::<u32>() {
        return if verse == 0 {
            Err(CommandError::Invalid {
                command: "select",
                reason: "verse numbers start at 1",
            })
        } else {
            Ok(Some(Command::SelectVerse(verse)))
        };
    }

    if key_matches(&config.key_toggle_play_pause, "p", &head) {
        return Ok(Some(Command::TogglePlay));
    }
    if key_matches(&config.key_next_verse, "n", &head) {
        return Ok(Some(Command::Next));
    }
    if key_matches(&config.key_prev_verse, "b", &head) {
        return Ok(Some(Command::Prev));
    }
    if key_matches(&config.key_close_player, "x", &head) {
        return Ok(Some(Command::Close));
    }
    if key_matches(&config.key_cycle_rate, "r", &head) {
        return Ok(Some(Command::CycleRate));
    }
    if key_matches(&config.key_safe_quit, "q", &head) {
        return Ok(Some(Command::Quit));
    }
    if key_matches(&config.key_toggle_bookmark, "m", &head) {
        let verse = match arg {
            Some(raw) => Some(parse_verse_number(raw, "bookmark")?),
            None => None,
        };
        return Ok(Some(Command::ToggleBookmark(verse)));
    }

    let command = match head.as_str() {
        "s" | "seek" => {
            let seconds = arg
                .and_then(|raw| raw.parse::<f64>().ok())
                .filter(|secs| secs.is_finite())
                .ok_or(CommandError::Invalid {
                    command: "seek",
                    reason: "expected seconds, e.g. `s 12.5`",
                })?;
            Command::Seek(seconds)
        }
        "open" => {
            let raw = arg.ok_or(CommandError::Invalid {
                command: "open",
                reason: "expected <chapter>[:<verse>]",
            })?;
            parse_open_target(raw)?
        }
        "reciter" => {
            let id = arg.ok_or(CommandError::Invalid {
                command: "reciter",
                reason: "expected a reciter id (see `reciters`)",
            })?;
            Command::Reciter(id.to_string())
        }
        "reciters" => Command::ListReciters,
        "chapters" => {
            let query = rest.join(" ");
            Command::Chapters((!query.is_empty()).then_some(query))
        }
        "bookmarks" => Command::Bookmarks,
        "goto" => Command::Goto(
            arg.ok_or(CommandError::Invalid {
                command: "goto",
                reason: "expected a bookmark id like 2:255",
            })?
            .to_string(),
        ),
        "unmark" => Command::Unmark(
            arg.ok_or(CommandError::Invalid {
                command: "unmark",
                reason: "expected a bookmark id like 2:255",
            })?
            .to_string(),
        ),
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => return Err(CommandError::Unknown(head)),
    };
    Ok(Some(command))
}

fn parse_open_target(raw: &str) -> Result<Command, CommandError> {
    let invalid = CommandError::Invalid {
        command: "open",
        reason: "expected <chapter>[:<verse>] with positive numbers",
    };
    let (chapter, verse) = match raw.split_once(':') {
        Some((chapter, verse)) => (chapter, Some(verse)),
        None => (raw, None),
    };
    let chapter = chapter.parse::<u32>().map_err(|_| invalid.clone())?;
    let verse = match verse {
        Some(verse) => Some(
            verse
                .parse::<u32>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| invalid.clone())?,
        ),
        None => None,
    };
    Ok(Command::Open { chapter, verse })
}

fn parse_verse_number(raw: &str, command: &'static str) -> Result<u32, CommandError> {
    raw.parse::<u32>()
        .ok()
        .filter(|verse| *verse > 0)
        .ok_or(CommandError::Invalid {
            command,
            reason: "expected a verse number",
        })
}

fn key_matches(configured: &str, fallback: &str, typed: &str) -> bool {
    normalize_key(configured, fallback) == typed
}

pub(in crate::app) fn normalize_key(raw: &str, fallback: &str) -> String {
    let normalized = raw.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        fallback.to_string()
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        parse_command(line, &AppConfig::default())
    }

    #[test]
    fn parses_transport_keys() {
        assert_eq!(parse("p"), Ok(Some(Command::TogglePlay)));
        assert_eq!(parse(" N "), Ok(Some(Command::Next)));
        assert_eq!(parse("b"), Ok(Some(Command::Prev)));
        assert_eq!(parse("x"), Ok(Some(Command::Close)));
        assert_eq!(parse("r"), Ok(Some(Command::CycleRate)));
        assert_eq!(parse("q"), Ok(Some(Command::Quit)));
        assert_eq!(parse(""), Ok(None));
    }

    #[test]
    fn honours_rebound_keys() {
        let mut config = AppConfig::default();
        config.key_next_verse = " J ".to_string();
        config.key_prev_verse = String::new();
        assert_eq!(parse_command("j", &config), Ok(Some(Command::Next)));
        assert_eq!(parse_command("b", &config), Ok(Some(Command::Prev)));
        assert!(parse_command("n", &config).is_err());
    }

    #[test]
    fn parses_numbers_as_verse_selection() {
        assert_eq!(parse("7"), Ok(Some(Command::SelectVerse(7))));
        assert!(matches!(parse("0"), Err(CommandError::Invalid { .. })));
    }

    #[test]
    fn parses_open_targets() {
        assert_eq!(
            parse("open 2:255"),
            Ok(Some(Command::Open {
                chapter: 2,
                verse: Some(255)
            }))
        );
        assert_eq!(
            parse("open 36"),
            Ok(Some(Command::Open {
                chapter: 36,
                verse: None
            }))
        );
        assert!(parse("open 2:x").is_err());
        assert!(parse("open").is_err());
    }

    #[test]
    fn parses_arguments() {
        assert_eq!(parse("s 12.5"), Ok(Some(Command::Seek(12.5))));
        assert_eq!(parse("m"), Ok(Some(Command::ToggleBookmark(None))));
        assert_eq!(parse("m 4"), Ok(Some(Command::ToggleBookmark(Some(4)))));
        assert_eq!(
            parse("chapters the cow"),
            Ok(Some(Command::Chapters(Some("the cow".to_string()))))
        );
        assert_eq!(parse("chapters"), Ok(Some(Command::Chapters(None))));
        assert_eq!(
            parse("reciter ar.husary"),
            Ok(Some(Command::Reciter("ar.husary".to_string())))
        );
        assert_eq!(parse("goto 18:10"), Ok(Some(Command::Goto("18:10".to_string()))));
    }

    #[test]
    fn rejects_unknown_commands() {
        assert_eq!(parse("dance"), Err(CommandError::Unknown("dance".to_string())));
        assert!(parse("s soon").is_err());
    }
}
