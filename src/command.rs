//! Textual command surface.
//!
//! A request is an argv list. The first token names the action and the rest
//! is its payload, either plain words (`set-mode icons`) or a JSON object
//! (`show {"mode":"icons"}`). A request that is a JSON object as a whole,
//! `{"action":"next"}`, is accepted too. Every outcome is a plain string.

use std::time::Instant;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{Result, SwitcherError};
use crate::recency::SortMode;
use crate::state::DisplayMode;
use crate::surface::OverlaySurface;
use crate::switcher::Switcher;
use crate::window::WmQuery;

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct ShowOptions {
    #[serde(default)]
    pub mode: Option<DisplayMode>,
    #[serde(default)]
    pub sort: Option<SortMode>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitOptions {
    #[serde(default)]
    pub index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank request, used by clients to probe the daemon.
    Ready,
    Show(ShowOptions),
    Next,
    Prev,
    Commit(CommitOptions),
    Hide,
    SetMode(Option<String>),
    ToggleMode,
    GetMode,
    GetVisibility,
    SetSort(Option<String>),
    GetSort,
    Unknown(String),
}

enum Payload {
    Empty,
    Words(Vec<String>),
    Json(Map<String, Value>),
}

impl Payload {
    fn from_words(words: &[String]) -> Result<Self> {
        let joined = words.join(" ");
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            return Ok(Payload::Empty);
        }
        if trimmed.starts_with('{') {
            return Ok(Payload::Json(serde_json::from_str(trimmed)?));
        }
        Ok(Payload::Words(
            trimmed.split_whitespace().map(str::to_string).collect(),
        ))
    }

    /// Single string argument: first word, or `key` of a JSON payload.
    fn argument(&self, key: &str) -> Option<String> {
        match self {
            Payload::Empty => None,
            Payload::Words(words) => words.first().cloned(),
            Payload::Json(map) => map.get(key).and_then(Value::as_str).map(str::to_string),
        }
    }

    fn options<T: DeserializeOwned + Default>(self) -> Result<T> {
        match self {
            Payload::Empty => Ok(T::default()),
            Payload::Json(map) => Ok(serde_json::from_value(Value::Object(map))?),
            Payload::Words(words) => Err(SwitcherError::InvalidCommand(format!(
                "expected a JSON object, got '{}'",
                words.join(" ")
            ))),
        }
    }
}

/// Parses one request into a [`Command`].
pub fn parse_request(argv: &[String]) -> Result<Command> {
    let joined = argv.join(" ");
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        return Ok(Command::Ready);
    }
    let (action, payload) = if trimmed.starts_with('{') {
        let mut map: Map<String, Value> = serde_json::from_str(trimmed)?;
        let action = match map.remove("action") {
            Some(Value::String(action)) => action,
            Some(other) => {
                return Err(SwitcherError::InvalidCommand(format!(
                    "action must be a string, got {other}"
                )));
            }
            None => String::new(),
        };
        (action, Payload::Json(map))
    } else {
        let mut words = trimmed.split_whitespace().map(str::to_string);
        let action = words.next().unwrap_or_default();
        let rest: Vec<String> = words.collect();
        (action, Payload::from_words(&rest)?)
    };
    Ok(match action.as_str() {
        "show" => Command::Show(payload.options()?),
        "next" => Command::Next,
        "prev" => Command::Prev,
        "commit" => Command::Commit(match payload {
            Payload::Words(ref words) => CommitOptions {
                index: Some(words[0].parse().map_err(|_| {
                    SwitcherError::InvalidCommand(format!("invalid index '{}'", words[0]))
                })?),
            },
            other => other.options()?,
        }),
        "hide" => Command::Hide,
        "set-mode" => Command::SetMode(payload.argument("mode")),
        "toggle-mode" => Command::ToggleMode,
        "get-mode" => Command::GetMode,
        "get-visibility" => Command::GetVisibility,
        "set-sort" => Command::SetSort(payload.argument("sort")),
        "get-sort" => Command::GetSort,
        _ => Command::Unknown(action),
    })
}

/// Runs `command` against the switcher and returns the response text.
pub fn dispatch<W: WmQuery, S: OverlaySurface>(
    switcher: &mut Switcher<W, S>,
    command: Command,
    now: Instant,
) -> Result<String> {
    Ok(match command {
        Command::Ready => "ready".to_string(),
        Command::Show(options) => {
            if let Some(sort) = options.sort {
                switcher.set_sort_mode(sort);
            }
            if let Some(mode) = options.mode {
                switcher.set_display_mode(mode);
            }
            switcher.show(now);
            "shown".to_string()
        }
        Command::Next => {
            switcher.next(now);
            "cycled next".to_string()
        }
        Command::Prev => {
            switcher.prev(now);
            "cycled prev".to_string()
        }
        Command::Commit(options) => {
            match options.index {
                Some(index) => {
                    switcher.commit_index(index, now)?;
                }
                None => {
                    switcher.commit(now);
                }
            }
            "committed".to_string()
        }
        Command::Hide => {
            switcher.hide(now);
            "hidden".to_string()
        }
        Command::SetMode(mode) => match mode.as_deref().map(str::parse::<DisplayMode>) {
            Some(Ok(mode)) => {
                switcher.set_display_mode(mode);
                format!("mode set to {mode}")
            }
            _ => "invalid mode, use 'icons' or 'previews'".to_string(),
        },
        Command::ToggleMode => format!("mode toggled to {}", switcher.toggle_display_mode()),
        Command::GetMode => format!("current mode: {}", switcher.display_mode()),
        Command::GetVisibility => {
            if switcher.is_visible() {
                "visible".to_string()
            } else {
                "hidden".to_string()
            }
        }
        Command::SetSort(sort) => match sort.as_deref().map(str::parse::<SortMode>) {
            Some(Ok(sort)) => {
                switcher.set_sort_mode(sort);
                format!("sort set to {sort}")
            }
            _ => "invalid sort, use 'alphabetical' or 'recency'".to_string(),
        },
        Command::GetSort => format!("current sort: {}", switcher.sort_mode()),
        Command::Unknown(_) => "unknown action".to_string(),
    })
}

/// Parses and runs one request. Failures become `error: ...` responses.
pub fn handle_request<W: WmQuery, S: OverlaySurface>(
    switcher: &mut Switcher<W, S>,
    argv: &[String],
    now: Instant,
) -> String {
    match parse_request(argv).and_then(|command| dispatch(switcher, command, now)) {
        Ok(response) => response,
        Err(err) => {
            warn!("request {argv:?} failed: {err}");
            format!("error: {err}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn blank_request_is_ready() {
        assert_eq!(parse_request(&[]).unwrap(), Command::Ready);
        assert_eq!(parse_request(&argv(&["  ", ""])).unwrap(), Command::Ready);
    }

    #[test]
    fn plain_actions() {
        assert_eq!(parse_request(&argv(&["next"])).unwrap(), Command::Next);
        assert_eq!(parse_request(&argv(&["prev"])).unwrap(), Command::Prev);
        assert_eq!(parse_request(&argv(&["hide"])).unwrap(), Command::Hide);
        assert_eq!(
            parse_request(&argv(&["frobnicate"])).unwrap(),
            Command::Unknown("frobnicate".into())
        );
    }

    #[test]
    fn show_with_json_payload_split_across_argv() {
        let cmd = parse_request(&argv(&["show", "{\"mode\":", "\"icons\"}"])).unwrap();
        assert_eq!(
            cmd,
            Command::Show(ShowOptions {
                mode: Some(DisplayMode::Icons),
                sort: None
            })
        );
    }

    #[test]
    fn whole_request_as_json_object() {
        let cmd = parse_request(&argv(&["{\"action\":\"set-mode\",\"mode\":\"previews\"}"])).unwrap();
        assert_eq!(cmd, Command::SetMode(Some("previews".into())));
        let cmd = parse_request(&argv(&["{\"action\":\"commit\",\"index\":2}"])).unwrap();
        assert_eq!(cmd, Command::Commit(CommitOptions { index: Some(2) }));
    }

    #[test]
    fn commit_accepts_bare_index() {
        assert_eq!(
            parse_request(&argv(&["commit", "3"])).unwrap(),
            Command::Commit(CommitOptions { index: Some(3) })
        );
        assert!(parse_request(&argv(&["commit", "three"])).is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_request(&argv(&["show", "{not json"])).is_err());
        assert!(parse_request(&argv(&["{\"action\": 5}"])).is_err());
        assert!(parse_request(&argv(&["show", "{\"mode\":\"grid\"}"])).is_err());
    }

    #[test]
    fn set_mode_takes_word_argument() {
        assert_eq!(
            parse_request(&argv(&["set-mode", "ICONS"])).unwrap(),
            Command::SetMode(Some("ICONS".into()))
        );
        assert_eq!(
            parse_request(&argv(&["set-mode"])).unwrap(),
            Command::SetMode(None)
        );
    }
}
