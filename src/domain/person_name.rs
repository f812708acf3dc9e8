use std::convert::TryFrom;

use unicode_segmentation::UnicodeSegmentation;

use crate::domain::errors::MalformedInput;

const FORBIDDEN_CHARS: [char; 9] = ['/', '(', ')', '"', '<', '>', '\\', '{', '}'];
const MAX_LENGTH: usize = 256;

/// First or last name of a user or a subscriber.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PersonName(String);

impl TryFrom<String> for PersonName {
    type Error = MalformedInput;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        let is_empty_or_whitespace = name.trim().is_empty();
        let is_too_long = name.graphemes(true).count() > MAX_LENGTH;
        let contains_forbidden_characters = name.chars().any(|g| FORBIDDEN_CHARS.contains(&g));

        if is_empty_or_whitespace || is_too_long || contains_forbidden_characters {
            Err(MalformedInput::InvalidName {
                message: format!("Invalid name: {}", name),
            })
        } else {
            Ok(Self(name))
        }
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parse an optional name, treating `None` as "not provided".
pub fn parse_optional_name(name: Option<String>) -> Result<Option<PersonName>, MalformedInput> {
    name.map(PersonName::try_from).transpose()
}
