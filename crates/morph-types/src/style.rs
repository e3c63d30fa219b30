//! Animation style selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The animation styles offered by the upload client.
///
/// The relay forwards the style to the provider verbatim and does not
/// enforce this enumeration server-side, so a future style is a pure
/// client-side addition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationStyle {
    /// Morph smoothly between the two images (the default).
    #[default]
    Morph,
    /// Hard transition from the first image to the second.
    Transition,
    /// Cross-dissolve between the two images.
    Dissolve,
}

impl AnimationStyle {
    /// The wire form sent in the `animationType` multipart field.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationStyle::Morph => "morph",
            AnimationStyle::Transition => "transition",
            AnimationStyle::Dissolve => "dissolve",
        }
    }
}

impl fmt::Display for AnimationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The given string does not name a known animation style.
#[derive(Debug, Clone, Error)]
#[error("unknown animation style `{0}`; expected one of: morph, transition, dissolve")]
pub struct ParseStyleError(pub String);

impl FromStr for AnimationStyle {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "morph" => Ok(AnimationStyle::Morph),
            "transition" => Ok(AnimationStyle::Transition),
            "dissolve" => Ok(AnimationStyle::Dissolve),
            other => Err(ParseStyleError(other.to_owned())),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_style_is_morph() {
        assert_eq!(AnimationStyle::default(), AnimationStyle::Morph);
        assert_eq!(AnimationStyle::default().as_str(), "morph");
    }

    #[test]
    fn parses_known_styles() {
        assert_eq!("transition".parse::<AnimationStyle>().unwrap(), AnimationStyle::Transition);
        assert_eq!("dissolve".parse::<AnimationStyle>().unwrap(), AnimationStyle::Dissolve);
    }

    #[test]
    fn rejects_unknown_style() {
        let err = "explode".parse::<AnimationStyle>().unwrap_err();
        assert!(err.to_string().contains("explode"));
    }
}
