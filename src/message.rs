//! Viewer message types
//!
//! Defines the messages delivered to the controller's update function, the
//! one-shot initialization payload, and the commands the controller hands
//! back to its host.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Inbound option-update message, tagged by its `message` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "message", rename_all = "lowercase")]
pub enum Message {
    /// Discard everything and restart the hosting context
    Reload,

    /// Active theme changed
    Theme { theme: String },

    /// Theme-to-appearance catalog replaced
    Themes { themes: HashMap<String, String> },

    /// Notebook source replaced wholesale
    Raw { raw: String },

    /// Periodic refresh cancelled
    Autoreload,
}

impl Message {
    /// Decode a single JSON message
    pub fn from_json(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }

    /// Short name used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Reload => "reload",
            Message::Theme { .. } => "theme",
            Message::Themes { .. } => "themes",
            Message::Raw { .. } => "raw",
            Message::Autoreload => "autoreload",
        }
    }
}

/// Independent rendering enhancements, using the wire field names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentOptions {
    /// Expand `:shortcode:` emoji in prose
    pub emoji: bool,
    /// Syntax-highlight code regions
    pub syntax: bool,
    /// Typeset math after render
    pub mathjax: bool,
    /// Build and show the outline panel
    pub toc: bool,
}

impl Default for ContentOptions {
    fn default() -> Self {
        Self {
            emoji: false,
            syntax: true,
            mathjax: true,
            toc: true,
        }
    }
}

impl ContentOptions {
    pub fn emoji_expansion(&self) -> bool {
        self.emoji
    }

    pub fn syntax_highlighting(&self) -> bool {
        self.syntax
    }

    pub fn math_rendering(&self) -> bool {
        self.mathjax
    }

    pub fn table_of_contents(&self) -> bool {
        self.toc
    }

    /// Copy with one option flipped
    pub fn toggled(self, option: ContentOption) -> Self {
        let mut options = self;
        match option {
            ContentOption::Emoji => options.emoji = !options.emoji,
            ContentOption::Syntax => options.syntax = !options.syntax,
            ContentOption::Math => options.mathjax = !options.mathjax,
            ContentOption::Toc => options.toc = !options.toc,
        }
        options
    }
}

/// A single field of [`ContentOptions`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentOption {
    Emoji,
    Syntax,
    Math,
    Toc,
}

/// Initialization payload, delivered once before the first render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitPayload {
    /// Initial theme name
    pub theme: String,

    /// Document source
    pub raw: String,

    /// Theme-to-appearance catalog
    #[serde(default)]
    pub themes: HashMap<String, String>,

    /// Content options
    #[serde(default)]
    pub content: ContentOptions,

    /// Markdown engine name
    pub compiler: String,

    /// Start in raw mode
    #[serde(default)]
    pub raw_mode: bool,
}

/// Follow-up work the controller asks its host to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Nothing to do
    None,

    /// Tear down and reinitialize the whole viewer
    Restart,

    /// Stop the periodic-refresh loop
    CancelAutoreload,
}

/// Events arriving at the host's event loop
#[derive(Debug, Clone)]
pub enum HostEvent {
    /// Option-update message for the controller
    Message(Message),

    /// Local control: flip between raw and rendered display
    ToggleRawMode,

    /// Local control: flip one content option
    ToggleContentOption(ContentOption),

    /// Host colour-scheme preference changed
    PreferenceChanged { dark: bool },

    /// Periodic-refresh tick observed new source text
    ///
    /// `generation` identifies the refresh loop that sent it.
    AutoreloadTick { generation: u64, raw: String },

    /// Stop the event loop
    Quit,
}

impl HostEvent {
    /// Parse one line of host input: a JSON message or a `:command`
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if let Some(command) = line.strip_prefix(':') {
            return match command {
                "raw" => Some(HostEvent::ToggleRawMode),
                "syntax" => Some(HostEvent::ToggleContentOption(ContentOption::Syntax)),
                "math" => Some(HostEvent::ToggleContentOption(ContentOption::Math)),
                "toc" => Some(HostEvent::ToggleContentOption(ContentOption::Toc)),
                "emoji" => Some(HostEvent::ToggleContentOption(ContentOption::Emoji)),
                "dark" => Some(HostEvent::PreferenceChanged { dark: true }),
                "light" => Some(HostEvent::PreferenceChanged { dark: false }),
                "quit" | "q" => Some(HostEvent::Quit),
                other => {
                    log::warn!("Unknown host command: :{}", other);
                    None
                }
            };
        }

        match Message::from_json(line) {
            Ok(message) => Some(HostEvent::Message(message)),
            Err(e) => {
                log::warn!(
                    "Ignoring malformed message {:?}: {}",
                    crate::utils::text::truncate(line, 80),
                    e
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_messages() {
        assert_eq!(
            Message::from_json(r#"{"message":"reload"}"#).unwrap(),
            Message::Reload
        );
        assert_eq!(
            Message::from_json(r#"{"message":"theme","theme":"github-dark"}"#).unwrap(),
            Message::Theme {
                theme: "github-dark".to_string()
            }
        );
        assert_eq!(
            Message::from_json(r#"{"message":"autoreload"}"#).unwrap(),
            Message::Autoreload
        );

        let themes = Message::from_json(r#"{"message":"themes","themes":{"a":"dark"}}"#).unwrap();
        match themes {
            Message::Themes { themes } => assert_eq!(themes["a"], "dark"),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_decode_unknown_message_fails() {
        assert!(Message::from_json(r#"{"message":"bogus"}"#).is_err());
        assert!(Message::from_json(r#"{"message":"theme"}"#).is_err());
    }

    #[test]
    fn test_init_payload_defaults() {
        let payload: InitPayload = serde_json::from_str(
            r#"{"theme":"github","raw":"{}","compiler":"marked","content":{"toc":false}}"#,
        )
        .unwrap();
        assert!(payload.themes.is_empty());
        assert!(!payload.raw_mode);
        assert!(!payload.content.toc);
        assert!(payload.content.syntax);
    }

    #[test]
    fn test_host_line_parsing() {
        assert!(matches!(
            HostEvent::parse_line(":raw"),
            Some(HostEvent::ToggleRawMode)
        ));
        assert!(matches!(
            HostEvent::parse_line(":math"),
            Some(HostEvent::ToggleContentOption(ContentOption::Math))
        ));
        assert!(matches!(
            HostEvent::parse_line(":dark"),
            Some(HostEvent::PreferenceChanged { dark: true })
        ));
        assert!(matches!(
            HostEvent::parse_line(r#"{"message":"raw","raw":"x"}"#),
            Some(HostEvent::Message(Message::Raw { .. }))
        ));
        assert!(HostEvent::parse_line("   ").is_none());
        assert!(HostEvent::parse_line("not json").is_none());
    }

    #[test]
    fn test_toggled_flips_one_option() {
        let options = ContentOptions::default();
        let toggled = options.toggled(ContentOption::Syntax);
        assert!(!toggled.syntax);
        assert_eq!(toggled.toggled(ContentOption::Syntax), options);
        assert_eq!(
            options.toggled(ContentOption::Math),
            ContentOptions {
                mathjax: false,
                ..options
            }
        );
    }
}
