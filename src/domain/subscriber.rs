use chrono::{
    DateTime,
    NaiveDate,
    Utc,
};

use crate::domain::{
    Email,
    Gender,
    PersonName,
};

/// A person who receives newsletters. `join_date` is assigned by the store.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: i64,
    pub email: Email,
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Gender,
    pub join_date: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewSubscriber {
    pub email: Email,
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Gender,
}
