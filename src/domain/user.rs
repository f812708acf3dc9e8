use derivative::Derivative;

use crate::domain::{
    Email,
    Gender,
    PersonName,
    Role,
};

/// A registered account; owns zero or more subscriber lists.
#[derive(Derivative, Clone, serde::Serialize)]
#[derivative(Debug)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: Email,
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
    pub gender: Gender,
    pub role: Role,
    #[serde(skip_serializing)]
    #[derivative(Debug = "ignore")]
    pub password_hash: String,
}

/// The fields of a `User` a client may set. The password travels separately
/// because only its hash is stored.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: Email,
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
    pub gender: Gender,
    pub role: Role,
}
