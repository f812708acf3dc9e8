use std::convert::TryFrom;

use unicode_segmentation::UnicodeSegmentation;

use crate::domain::errors::MalformedInput;

const MAX_LENGTH: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ListName(String);

impl TryFrom<String> for ListName {
    type Error = MalformedInput;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        let name = name.trim().to_string();
        if name.is_empty() || name.graphemes(true).count() > MAX_LENGTH {
            Err(MalformedInput::InvalidListName {
                message: format!(
                    "List name must be between 1 and {} characters long",
                    MAX_LENGTH
                ),
            })
        } else {
            Ok(Self(name))
        }
    }
}

impl AsRef<str> for ListName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
