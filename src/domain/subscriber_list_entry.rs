use chrono::{
    DateTime,
    Utc,
};

use crate::domain::Subscriber;

/// Membership of one subscriber in one list.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberListEntry {
    pub id: i64,
    pub date_added: DateTime<Utc>,
    pub confirmed: bool,
    pub source: Option<String>,
    #[serde(skip_serializing)]
    pub list_id: i64,
    #[serde(skip_serializing)]
    pub subscriber_id: i64,
}

/// An entry with its subscriber embedded, as returned to clients.
#[derive(Clone, Debug, serde::Serialize)]
pub struct EntryDetails {
    #[serde(flatten)]
    pub entry: SubscriberListEntry,
    pub subscriber: Subscriber,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEntry {
    pub list_id: i64,
    pub subscriber_id: i64,
    pub confirmed: bool,
    pub source: Option<String>,
}

impl NewEntry {
    pub fn new(list_id: i64, subscriber_id: i64, confirmed: bool, source: Option<String>) -> Self {
        let source = source
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            list_id,
            subscriber_id,
            confirmed,
            source,
        }
    }

    /// An unconfirmed entry with no source, as created by the assign operations.
    pub fn assignment(list_id: i64, subscriber_id: i64) -> Self {
        Self::new(list_id, subscriber_id, false, None)
    }
}
