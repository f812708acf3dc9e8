use std::convert::TryFrom;

use crate::domain::errors::MalformedInput;

const MAX_LENGTH: usize = 128;

/// A plain text password as received from a client, before hashing.
#[derive(Clone)]
pub struct Password(String);

impl TryFrom<String> for Password {
    type Error = MalformedInput;

    fn try_from(password: String) -> Result<Self, Self::Error> {
        if password.trim().is_empty() || password.chars().count() > MAX_LENGTH {
            Err(MalformedInput::InvalidPassword {
                message: format!(
                    "Password must be between 1 and {} characters long",
                    MAX_LENGTH
                ),
            })
        } else {
            Ok(Self(password))
        }
    }
}

impl AsRef<str> for Password {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}
