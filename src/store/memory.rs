//! In-memory implementation of `Store`.
//!
//! All tables live in one `State` behind a `tokio::sync::RwLock`, so every
//! operation sees a consistent snapshot. Cascading deletes are done by
//! scanning the dependent maps. Nothing is durable.
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

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
use crate::store::{
    Store,
    StoreError,
    StoreResult,
};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    users: BTreeMap<i64, User>,
    subscribers: BTreeMap<i64, Subscriber>,
    lists: BTreeMap<i64, SubscriberList>,
    entries: BTreeMap<i64, SubscriberListEntry>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn email_taken_by_user(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email.as_ref() == email && Some(u.id) != except)
    }

    fn email_taken_by_subscriber(&self, email: &str, except: Option<i64>) -> bool {
        self.subscribers
            .values()
            .any(|s| s.email.as_ref() == email && Some(s.id) != except)
    }

    fn check_entry_references(&self, entry: &NewEntry) -> StoreResult<()> {
        if !self.lists.contains_key(&entry.list_id) {
            return Err(StoreError::MissingReference(format!(
                "subscriber list {} does not exist",
                entry.list_id
            )));
        }
        if !self.subscribers.contains_key(&entry.subscriber_id) {
            return Err(StoreError::MissingReference(format!(
                "subscriber {} does not exist",
                entry.subscriber_id
            )));
        }
        Ok(())
    }

    fn remove_list(&mut self, id: i64) -> bool {
        let removed = self.lists.remove(&id).is_some();
        self.entries.retain(|_, e| e.list_id != id);
        removed
    }

    fn remove_subscriber(&mut self, id: i64) -> bool {
        let removed = self.subscribers.remove(&id).is_some();
        self.entries.retain(|_, e| e.subscriber_id != id);
        removed
    }
}

fn email_conflict(entity: &str) -> StoreError {
    StoreError::Conflict(format!("{} with the same email already exists", entity))
}

#[async_trait]
impl Store for InMemoryStore {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }

    async fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.email.as_ref() == email)
            .cloned())
    }

    async fn insert_user(&self, user: &NewUser, password_hash: &str) -> StoreResult<User> {
        let mut state = self.state.write().await;
        if state.email_taken_by_user(user.email.as_ref(), None) {
            return Err(email_conflict("user"));
        }
        let id = state.next_id();
        let user = User {
            id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            gender: user.gender,
            role: user.role,
            password_hash: password_hash.to_string(),
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_user(
        &self,
        id: i64,
        user: &NewUser,
        password_hash: Option<&str>,
    ) -> StoreResult<Option<User>> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&id) {
            return Ok(None);
        }
        if state.email_taken_by_user(user.email.as_ref(), Some(id)) {
            return Err(email_conflict("user"));
        }
        Ok(state.users.get_mut(&id).map(|stored| {
            stored.email = user.email.clone();
            stored.first_name = user.first_name.clone();
            stored.last_name = user.last_name.clone();
            stored.gender = user.gender;
            stored.role = user.role;
            if let Some(hash) = password_hash {
                stored.password_hash = hash.to_string();
            }
            stored.clone()
        }))
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let removed = state.users.remove(&id).is_some();
        let owned: Vec<i64> = state
            .lists
            .values()
            .filter(|l| l.owner_id == id)
            .map(|l| l.id)
            .collect();
        for list_id in owned {
            state.remove_list(list_id);
        }
        Ok(removed)
    }

    async fn list_subscribers(&self) -> StoreResult<Vec<Subscriber>> {
        Ok(self.state.read().await.subscribers.values().cloned().collect())
    }

    async fn get_subscriber(&self, id: i64) -> StoreResult<Option<Subscriber>> {
        Ok(self.state.read().await.subscribers.get(&id).cloned())
    }

    async fn find_subscriber_by_email(&self, email: &str) -> StoreResult<Option<Subscriber>> {
        let state = self.state.read().await;
        Ok(state
            .subscribers
            .values()
            .find(|s| s.email.as_ref() == email)
            .cloned())
    }

    async fn get_subscribers_by_ids(&self, ids: &[i64]) -> StoreResult<Vec<Subscriber>> {
        let state = self.state.read().await;
        Ok(state
            .subscribers
            .values()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect())
    }

    async fn insert_subscriber(&self, subscriber: &NewSubscriber) -> StoreResult<Subscriber> {
        let mut state = self.state.write().await;
        if state.email_taken_by_subscriber(subscriber.email.as_ref(), None) {
            return Err(email_conflict("subscriber"));
        }
        let id = state.next_id();
        let subscriber = Subscriber {
            id,
            email: subscriber.email.clone(),
            first_name: subscriber.first_name.clone(),
            last_name: subscriber.last_name.clone(),
            birth_date: subscriber.birth_date,
            gender: subscriber.gender,
            join_date: Utc::now(),
        };
        state.subscribers.insert(id, subscriber.clone());
        Ok(subscriber)
    }

    async fn update_subscriber(
        &self,
        id: i64,
        subscriber: &NewSubscriber,
    ) -> StoreResult<Option<Subscriber>> {
        let mut state = self.state.write().await;
        if !state.subscribers.contains_key(&id) {
            return Ok(None);
        }
        if state.email_taken_by_subscriber(subscriber.email.as_ref(), Some(id)) {
            return Err(email_conflict("subscriber"));
        }
        Ok(state.subscribers.get_mut(&id).map(|stored| {
            stored.email = subscriber.email.clone();
            stored.first_name = subscriber.first_name.clone();
            stored.last_name = subscriber.last_name.clone();
            stored.birth_date = subscriber.birth_date;
            stored.gender = subscriber.gender;
            stored.clone()
        }))
    }

    async fn delete_subscriber(&self, id: i64) -> StoreResult<bool> {
        Ok(self.state.write().await.remove_subscriber(id))
    }

    async fn delete_subscriber_by_email(&self, email: &str) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let id = state
            .subscribers
            .values()
            .find(|s| s.email.as_ref() == email)
            .map(|s| s.id);
        Ok(id.map(|id| state.remove_subscriber(id)).unwrap_or(false))
    }

    async fn list_lists(&self) -> StoreResult<Vec<SubscriberList>> {
        Ok(self.state.read().await.lists.values().cloned().collect())
    }

    async fn lists_owned_by(&self, owner_id: i64) -> StoreResult<Vec<SubscriberList>> {
        let state = self.state.read().await;
        Ok(state
            .lists
            .values()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn get_list(&self, id: i64) -> StoreResult<Option<SubscriberList>> {
        Ok(self.state.read().await.lists.get(&id).cloned())
    }

    async fn insert_list(&self, name: &ListName, owner_id: i64) -> StoreResult<SubscriberList> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&owner_id) {
            return Err(StoreError::MissingReference(format!(
                "user {} does not exist",
                owner_id
            )));
        }
        let id = state.next_id();
        let list = SubscriberList {
            id,
            name: name.clone(),
            owner_id,
        };
        state.lists.insert(id, list.clone());
        Ok(list)
    }

    async fn update_list(
        &self,
        id: i64,
        name: &ListName,
        owner_id: i64,
    ) -> StoreResult<Option<SubscriberList>> {
        let mut state = self.state.write().await;
        if !state.lists.contains_key(&id) {
            return Ok(None);
        }
        if !state.users.contains_key(&owner_id) {
            return Err(StoreError::MissingReference(format!(
                "user {} does not exist",
                owner_id
            )));
        }
        Ok(state.lists.get_mut(&id).map(|stored| {
            stored.name = name.clone();
            stored.owner_id = owner_id;
            stored.clone()
        }))
    }

    async fn delete_list(&self, id: i64) -> StoreResult<bool> {
        Ok(self.state.write().await.remove_list(id))
    }

    async fn list_entries(&self) -> StoreResult<Vec<SubscriberListEntry>> {
        Ok(self.state.read().await.entries.values().cloned().collect())
    }

    async fn entries_in_lists(&self, list_ids: &[i64]) -> StoreResult<Vec<SubscriberListEntry>> {
        let state = self.state.read().await;
        Ok(state
            .entries
            .values()
            .filter(|e| list_ids.contains(&e.list_id))
            .cloned()
            .collect())
    }

    async fn get_entry(&self, id: i64) -> StoreResult<Option<SubscriberListEntry>> {
        Ok(self.state.read().await.entries.get(&id).cloned())
    }

    async fn insert_entry(&self, entry: &NewEntry) -> StoreResult<SubscriberListEntry> {
        let mut state = self.state.write().await;
        state.check_entry_references(entry)?;
        let id = state.next_id();
        let entry = SubscriberListEntry {
            id,
            date_added: Utc::now(),
            confirmed: entry.confirmed,
            source: entry.source.clone(),
            list_id: entry.list_id,
            subscriber_id: entry.subscriber_id,
        };
        state.entries.insert(id, entry.clone());
        Ok(entry)
    }

    async fn update_entry(
        &self,
        id: i64,
        entry: &NewEntry,
    ) -> StoreResult<Option<SubscriberListEntry>> {
        let mut state = self.state.write().await;
        if !state.entries.contains_key(&id) {
            return Ok(None);
        }
        state.check_entry_references(entry)?;
        Ok(state.entries.get_mut(&id).map(|stored| {
            stored.confirmed = entry.confirmed;
            stored.source = entry.source.clone();
            stored.list_id = entry.list_id;
            stored.subscriber_id = entry.subscriber_id;
            stored.clone()
        }))
    }

    async fn delete_entry(&self, id: i64) -> StoreResult<bool> {
        Ok(self.state.write().await.entries.remove(&id).is_some())
    }
}
