use std::fmt::{self, Display};
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub mod consts;
pub mod providers;
pub mod styles;
pub mod wire;

pub use styles::StyleInstructions;

/// Creative direction applied to both prompt suggestion and image generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoStyle {
    #[default]
    None,
    Monogram,
    Abstract,
    Mascot,
}

impl LogoStyle {
    pub const ALL: [LogoStyle; 4] = [
        LogoStyle::None,
        LogoStyle::Monogram,
        LogoStyle::Abstract,
        LogoStyle::Mascot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogoStyle::None => "none",
            LogoStyle::Monogram => "monogram",
            LogoStyle::Abstract => "abstract",
            LogoStyle::Mascot => "mascot",
        }
    }

    /// Unrecognized tags fall back to `None`, the generic style.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "monogram" => LogoStyle::Monogram,
            "abstract" => LogoStyle::Abstract,
            "mascot" => LogoStyle::Mascot,
            _ => LogoStyle::None,
        }
    }

    pub fn instructions(&self) -> &'static StyleInstructions {
        styles::instructions_for(*self)
    }
}

impl Display for LogoStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LogoStyle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(tag.map(|t| LogoStyle::from_tag(&t)).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Processing,
    Done,
    Error,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::Processing => "processing",
            GenerationStatus::Done => "done",
            GenerationStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, GenerationStatus::Processing)
    }

    /// Status only ever moves forward: processing -> done | error.
    pub fn can_transition_to(&self, next: GenerationStatus) -> bool {
        matches!(
            (self, next),
            (GenerationStatus::Processing, GenerationStatus::Done)
                | (GenerationStatus::Processing, GenerationStatus::Error)
        )
    }
}

impl Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "processing" => Ok(GenerationStatus::Processing),
            "done" => Ok(GenerationStatus::Done),
            "error" => Ok(GenerationStatus::Error),
            other => Err(anyhow!("Unknown generation status: {}", other)),
        }
    }
}

/// One request-to-image transaction, as stored and as sent over the wire.
/// A completed (`done`) generation is what the app calls a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    pub id: String,
    pub prompt: String,
    pub style: LogoStyle,
    pub status: GenerationStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Generation {
    /// Checks the field combination against the status: a processing record
    /// carries neither an image nor an error, a terminal one exactly one.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            GenerationStatus::Processing => {
                self.image_url.is_none() && self.error.is_none()
            }
            GenerationStatus::Done => {
                self.image_url.is_some() && self.error.is_none()
            }
            GenerationStatus::Error => {
                self.error.is_some() && self.image_url.is_none()
            }
        }
    }
}

/// Returns the user facing reason a prompt can't be submitted. Checks the
/// trimmed prompt, which is what gets stored.
pub fn validate_prompt(prompt: &str) -> Result<(), &'static str> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err("Prompt is required");
    }
    if prompt.chars().count() > consts::MAX_PROMPT_LENGTH {
        return Err("Prompt must be at most 500 characters");
    }
    Ok(())
}

/// Trims an optional identifier, treating blank as missing.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_style_tags() {
        for style in LogoStyle::ALL {
            assert_eq!(LogoStyle::from_tag(style.as_str()), style);
        }
        assert_eq!(LogoStyle::from_tag("Mascot"), LogoStyle::Mascot);
        assert_eq!(LogoStyle::from_tag("watercolor"), LogoStyle::None);
    }

    #[test]
    fn test_style_deserializes_leniently() {
        let style: LogoStyle = serde_json::from_value(json!("abstract")).unwrap();
        assert_eq!(style, LogoStyle::Abstract);

        let style: LogoStyle = serde_json::from_value(json!("vaporwave")).unwrap();
        assert_eq!(style, LogoStyle::None);

        let style: LogoStyle = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(style, LogoStyle::None);

        assert_eq!(serde_json::to_value(LogoStyle::Monogram).unwrap(), json!("monogram"));
    }

    #[test]
    fn test_status_is_monotonic() {
        use GenerationStatus::*;
        assert!(Processing.can_transition_to(Done));
        assert!(Processing.can_transition_to(Error));
        for terminal in [Done, Error] {
            assert!(terminal.is_terminal());
            for next in [Processing, Done, Error] {
                assert!(!terminal.can_transition_to(next));
            }
        }
        assert!(!Processing.can_transition_to(Processing));
        assert_eq!("done".parse::<GenerationStatus>().unwrap(), Done);
        assert!("finished".parse::<GenerationStatus>().is_err());
    }

    #[test]
    fn test_generation_wire_shape() {
        let generation = Generation {
            id: "abc".to_string(),
            prompt: "A fox".to_string(),
            style: LogoStyle::Mascot,
            status: GenerationStatus::Done,
            image_url: Some("https://img/abc.png".to_string()),
            error: None,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            updated_at: None,
        };
        assert!(generation.is_consistent());

        let value = serde_json::to_value(&generation).unwrap();
        assert_eq!(value["imageUrl"], json!("https://img/abc.png"));
        assert_eq!(value["status"], json!("done"));
        assert_eq!(value["createdAt"], json!("2023-11-14T22:13:20Z"));
        assert!(value.get("error").is_none());
        assert!(value.get("updatedAt").is_none());

        let broken = Generation {
            error: Some("boom".to_string()),
            ..generation
        };
        assert!(!broken.is_consistent());
    }

    #[test]
    fn test_validate_prompt() {
        assert!(validate_prompt("A blue lion").is_ok());
        assert_eq!(validate_prompt("   "), Err("Prompt is required"));
        assert!(validate_prompt(&"x".repeat(500)).is_ok());
        assert_eq!(
            validate_prompt(&"x".repeat(501)),
            Err("Prompt must be at most 500 characters")
        );
        // counted in characters, not bytes
        assert!(validate_prompt(&"é".repeat(500)).is_ok());
        // surrounding whitespace doesn't count toward the limit
        assert!(validate_prompt(&format!("x{}", " ".repeat(500))).is_ok());
        assert!(validate_prompt(&format!("  {}  ", "x".repeat(500))).is_ok());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some(" u1 ")), Some("u1"));
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(None), None);
    }
}
