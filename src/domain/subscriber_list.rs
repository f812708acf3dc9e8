use crate::domain::{
    EntryDetails,
    ListName,
};

/// A named list owned by exactly one user.
///
/// The owner is only ever written: it is not part of the JSON representation.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SubscriberList {
    pub id: i64,
    pub name: ListName,
    #[serde(skip_serializing)]
    pub owner_id: i64,
}

/// A list together with its entries, as returned to clients.
#[derive(Clone, Debug, serde::Serialize)]
pub struct SubscriberListDetails {
    #[serde(flatten)]
    pub list: SubscriberList,
    pub entries: Vec<EntryDetails>,
}
