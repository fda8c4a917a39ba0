//! Platform and language tags

use serde::{Deserialize, Serialize};
use std::fmt;

/// Social platform a conversation was downloaded from
///
/// The platform decides how a post's structural parent is resolved and which
/// size/depth policy applies to a finished tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Twitter / X: posts carry typed references (reply, quote, retweet)
    Twitter,

    /// Reddit: comments carry a single parent id
    Reddit,

    /// Mastodon: toots carry a single `in_reply_to_id`
    Mastodon,
}

impl Platform {
    /// All supported platforms
    pub const ALL: [Platform; 3] = [Platform::Twitter, Platform::Reddit, Platform::Mastodon];

    /// Get the platform name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Reddit => "reddit",
            Platform::Mastodon => "mastodon",
        }
    }

    /// Parse a platform from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "twitter" | "x" => Some(Platform::Twitter),
            "reddit" => Some(Platform::Reddit),
            "mastodon" => Some(Platform::Mastodon),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid platform: {}", s))
    }
}

/// Language a daily sample is drawn for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    /// English (`en`)
    #[default]
    #[serde(rename = "en")]
    English,

    /// German (`de`)
    #[serde(rename = "de")]
    German,
}

impl Language {
    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::German => "de",
        }
    }

    /// Parse a language from its ISO 639-1 code
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Some(Language::English),
            "de" | "german" => Some(Language::German),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parse() {
        assert_eq!(Platform::parse("Reddit"), Some(Platform::Reddit));
        assert_eq!(Platform::parse("x"), Some(Platform::Twitter));
        assert_eq!(Platform::parse("myspace"), None);
        assert!("mastodon".parse::<Platform>().is_ok());
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::default().code(), "en");
        assert_eq!(Language::parse("DE"), Some(Language::German));
        assert_eq!(Language::parse("fr"), None);
    }
}
