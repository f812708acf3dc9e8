use std::convert::TryFrom;

use validator::validate_email;

use crate::domain::errors::MalformedInput;

/// A syntactically valid email address.
///
/// Used both as the login of a `User` and as the address of a `Subscriber`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Email(String);

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = MalformedInput;

    fn try_from(email: String) -> Result<Self, Self::Error> {
        let email = email.trim().to_string();
        if validate_email(&email) {
            Ok(Email(email))
        } else {
            Err(MalformedInput::InvalidEmail {
                message: format!("Invalid email: {}", email),
            })
        }
    }
}
