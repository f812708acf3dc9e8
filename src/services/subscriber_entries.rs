use std::collections::HashMap;

use crate::domain::{
    EntryDetails,
    NewEntry,
    Principal,
    SubscriberListEntry,
};
use crate::services::ownership::{
    assign_subscriber_to_my_list,
    resolve_owned_entry,
};
use crate::services::{
    not_found,
    require_admin,
    resolve_current_user,
    ServiceError,
    ServiceResult,
};
use crate::store::Store;

/// List and subscriber are required, but checked here so that their absence
/// is a validation failure rather than a malformed body.
fn build_new_entry(
    list_id: Option<i64>,
    subscriber_id: Option<i64>,
    confirmed: bool,
    source: Option<String>,
) -> ServiceResult<NewEntry> {
    let list_id = list_id
        .ok_or_else(|| ServiceError::ValidationFailure("Subscriber list is required".to_string()))?;
    let subscriber_id = subscriber_id
        .ok_or_else(|| ServiceError::ValidationFailure("Subscriber is required".to_string()))?;
    Ok(NewEntry::new(list_id, subscriber_id, confirmed, source))
}

/// Embed each entry's subscriber, keeping the order of `entries`.
pub(crate) async fn entry_details(
    store: &dyn Store,
    entries: Vec<SubscriberListEntry>,
) -> ServiceResult<Vec<EntryDetails>> {
    let mut subscriber_ids: Vec<i64> = entries.iter().map(|e| e.subscriber_id).collect();
    subscriber_ids.sort_unstable();
    subscriber_ids.dedup();
    let subscribers: HashMap<i64, _> = store
        .get_subscribers_by_ids(&subscriber_ids)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            subscribers
                .get(&entry.subscriber_id)
                .cloned()
                .map(|subscriber| EntryDetails { entry, subscriber })
        })
        .collect())
}

async fn single_entry_details(
    store: &dyn Store,
    entry: SubscriberListEntry,
) -> ServiceResult<EntryDetails> {
    let id = entry.id;
    entry_details(store, vec![entry])
        .await?
        .pop()
        .ok_or_else(|| not_found("Subscriber list entry", id))
}

async fn require_list_and_subscriber(store: &dyn Store, entry: &NewEntry) -> ServiceResult<()> {
    store
        .get_list(entry.list_id)
        .await?
        .ok_or_else(|| not_found("Subscriber list", entry.list_id))?;
    store
        .get_subscriber(entry.subscriber_id)
        .await?
        .ok_or_else(|| not_found("Subscriber", entry.subscriber_id))?;
    Ok(())
}

#[tracing::instrument(name = "listing entries", skip(store))]
pub async fn list_entries(
    store: &dyn Store,
    principal: &Principal,
) -> ServiceResult<Vec<EntryDetails>> {
    require_admin(principal)?;
    let entries = store.list_entries().await?;
    entry_details(store, entries).await
}

#[tracing::instrument(name = "getting entry", skip(store))]
pub async fn get_entry(
    store: &dyn Store,
    principal: &Principal,
    id: i64,
) -> ServiceResult<EntryDetails> {
    require_admin(principal)?;
    let entry = store
        .get_entry(id)
        .await?
        .ok_or_else(|| not_found("Subscriber list entry", id))?;
    single_entry_details(store, entry).await
}

#[tracing::instrument(name = "creating entry", skip(store))]
pub async fn create_entry(
    store: &dyn Store,
    principal: &Principal,
    list_id: Option<i64>,
    subscriber_id: Option<i64>,
    confirmed: bool,
    source: Option<String>,
) -> ServiceResult<EntryDetails> {
    require_admin(principal)?;
    let entry = build_new_entry(list_id, subscriber_id, confirmed, source)?;
    require_list_and_subscriber(store, &entry).await?;
    let entry = store.insert_entry(&entry).await?;
    single_entry_details(store, entry).await
}

#[tracing::instrument(name = "updating entry", skip(store))]
pub async fn update_entry(
    store: &dyn Store,
    principal: &Principal,
    id: i64,
    list_id: Option<i64>,
    subscriber_id: Option<i64>,
    confirmed: bool,
    source: Option<String>,
) -> ServiceResult<EntryDetails> {
    require_admin(principal)?;
    let changes = build_new_entry(list_id, subscriber_id, confirmed, source)?;
    store
        .get_entry(id)
        .await?
        .ok_or_else(|| not_found("Subscriber list entry", id))?;
    require_list_and_subscriber(store, &changes).await?;
    let entry = store
        .update_entry(id, &changes)
        .await?
        .ok_or_else(|| not_found("Subscriber list entry", id))?;
    single_entry_details(store, entry).await
}

#[tracing::instrument(name = "deleting entry", skip(store))]
pub async fn delete_entry(store: &dyn Store, principal: &Principal, id: i64) -> ServiceResult<()> {
    require_admin(principal)?;
    if store.delete_entry(id).await? {
        Ok(())
    } else {
        Err(not_found("Subscriber list entry", id))
    }
}

/// Put any existing subscriber on any existing list.
#[tracing::instrument(name = "assigning subscriber to list", skip(store))]
pub async fn assign_subscriber(
    store: &dyn Store,
    principal: &Principal,
    list_id: i64,
    subscriber_id: i64,
) -> ServiceResult<EntryDetails> {
    require_admin(principal)?;
    let entry = NewEntry::assignment(list_id, subscriber_id);
    require_list_and_subscriber(store, &entry).await?;
    let entry = store.insert_entry(&entry).await?;
    single_entry_details(store, entry).await
}

/// The entries of every list owned by the principal.
#[tracing::instrument(name = "listing my entries", skip(store))]
pub async fn my_entries(
    store: &dyn Store,
    principal: &Principal,
) -> ServiceResult<Vec<EntryDetails>> {
    let user = resolve_current_user(store, principal).await?;
    let list_ids: Vec<i64> = store
        .lists_owned_by(user.id)
        .await?
        .into_iter()
        .map(|l| l.id)
        .collect();
    if list_ids.is_empty() {
        return Ok(Vec::new());
    }
    let entries = store.entries_in_lists(&list_ids).await?;
    entry_details(store, entries).await
}

/// Add a subscriber already present in one of the principal's lists to
/// another list of theirs.
#[tracing::instrument(name = "assigning subscriber to my list", skip(store))]
pub async fn assign_to_my_list(
    store: &dyn Store,
    principal: &Principal,
    list_id: i64,
    subscriber_id: i64,
) -> ServiceResult<EntryDetails> {
    let entry = assign_subscriber_to_my_list(store, principal, list_id, subscriber_id).await?;
    single_entry_details(store, entry).await
}

#[tracing::instrument(name = "deleting my entry", skip(store))]
pub async fn delete_my_entry(
    store: &dyn Store,
    principal: &Principal,
    id: i64,
) -> ServiceResult<()> {
    let entry = resolve_owned_entry(store, principal, id).await?;
    if store.delete_entry(entry.id).await? {
        Ok(())
    } else {
        Err(not_found("Subscriber list entry", id))
    }
}
