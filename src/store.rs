//! Persistence for users, subscribers, subscriber lists and their entries.
//!
//! Relationships are plain id references (entry -> list, entry -> subscriber,
//! list -> owner). Deleting a parent removes everything that references it:
//! a user takes its lists with it, a list or a subscriber takes its entries.
//!
//! `PostgresStore` is the backend the server runs on; `InMemoryStore` keeps
//! the same semantics behind a lock and backs the service tests.
use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    ListName,
    NewEntry,
    NewSubscriber,
    NewUser,
    Subscriber,
    SubscriberList,
    SubscriberListEntry,
    User,
};

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

mod memory;
mod postgres;

#[derive(Error)]
pub enum StoreError {
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("missing reference: {0}")]
    MissingReference(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::error_chain_fmt(self, f)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Id-based access to every entity. Lookups of absent ids return `None`,
/// deletes of absent ids return `false`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn get_user(&self, id: i64) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn insert_user(&self, user: &NewUser, password_hash: &str) -> StoreResult<User>;
    /// Replace every field of the user. A `None` hash keeps the stored one.
    async fn update_user(
        &self,
        id: i64,
        user: &NewUser,
        password_hash: Option<&str>,
    ) -> StoreResult<Option<User>>;
    async fn delete_user(&self, id: i64) -> StoreResult<bool>;

    async fn list_subscribers(&self) -> StoreResult<Vec<Subscriber>>;
    async fn get_subscriber(&self, id: i64) -> StoreResult<Option<Subscriber>>;
    async fn find_subscriber_by_email(&self, email: &str) -> StoreResult<Option<Subscriber>>;
    async fn get_subscribers_by_ids(&self, ids: &[i64]) -> StoreResult<Vec<Subscriber>>;
    async fn insert_subscriber(&self, subscriber: &NewSubscriber) -> StoreResult<Subscriber>;
    /// Replace every field of the subscriber but its id and join date.
    async fn update_subscriber(
        &self,
        id: i64,
        subscriber: &NewSubscriber,
    ) -> StoreResult<Option<Subscriber>>;
    async fn delete_subscriber(&self, id: i64) -> StoreResult<bool>;
    async fn delete_subscriber_by_email(&self, email: &str) -> StoreResult<bool>;

    async fn list_lists(&self) -> StoreResult<Vec<SubscriberList>>;
    async fn lists_owned_by(&self, owner_id: i64) -> StoreResult<Vec<SubscriberList>>;
    async fn get_list(&self, id: i64) -> StoreResult<Option<SubscriberList>>;
    async fn insert_list(&self, name: &ListName, owner_id: i64) -> StoreResult<SubscriberList>;
    async fn update_list(
        &self,
        id: i64,
        name: &ListName,
        owner_id: i64,
    ) -> StoreResult<Option<SubscriberList>>;
    async fn delete_list(&self, id: i64) -> StoreResult<bool>;

    async fn list_entries(&self) -> StoreResult<Vec<SubscriberListEntry>>;
    async fn entries_in_lists(&self, list_ids: &[i64]) -> StoreResult<Vec<SubscriberListEntry>>;
    async fn get_entry(&self, id: i64) -> StoreResult<Option<SubscriberListEntry>>;
    async fn insert_entry(&self, entry: &NewEntry) -> StoreResult<SubscriberListEntry>;
    /// Replace every field of the entry but its id and the date it was added.
    async fn update_entry(
        &self,
        id: i64,
        entry: &NewEntry,
    ) -> StoreResult<Option<SubscriberListEntry>>;
    async fn delete_entry(&self, id: i64) -> StoreResult<bool>;
}
