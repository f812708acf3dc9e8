//! Decides whether a principal may act on a list or an entry through the
//! "my" operations.
//!
//! A list belongs to its owner. An entry belongs to whoever owns the list it
//! sits in. Absent targets fail with `NotFound`, targets owned by someone
//! else fail with `AccessDenied`.
use crate::domain::{
    NewEntry,
    Principal,
    SubscriberList,
    SubscriberListEntry,
};
use crate::services::{
    not_found,
    resolve_current_user,
    ServiceError,
    ServiceResult,
};
use crate::store::Store;

#[tracing::instrument(name = "resolving owned list", skip(store))]
pub async fn resolve_owned_list(
    store: &dyn Store,
    principal: &Principal,
    list_id: i64,
) -> ServiceResult<SubscriberList> {
    let user = resolve_current_user(store, principal).await?;
    let list = store
        .get_list(list_id)
        .await?
        .ok_or_else(|| not_found("Subscriber list", list_id))?;
    if list.owner_id != user.id {
        tracing::warn!(owner_id = list.owner_id, "list owned by another user");
        return Err(ServiceError::AccessDenied(format!(
            "Subscriber list with id {} does not belong to you",
            list_id
        )));
    }
    Ok(list)
}

#[tracing::instrument(name = "resolving owned entry", skip(store))]
pub async fn resolve_owned_entry(
    store: &dyn Store,
    principal: &Principal,
    entry_id: i64,
) -> ServiceResult<SubscriberListEntry> {
    let user = resolve_current_user(store, principal).await?;
    let entry = store
        .get_entry(entry_id)
        .await?
        .ok_or_else(|| not_found("Subscriber list entry", entry_id))?;
    let list = store
        .get_list(entry.list_id)
        .await?
        .ok_or_else(|| not_found("Subscriber list", entry.list_id))?;
    if list.owner_id != user.id {
        tracing::warn!(owner_id = list.owner_id, "entry in a list owned by another user");
        return Err(ServiceError::AccessDenied(format!(
            "Subscriber list entry with id {} does not belong to you",
            entry_id
        )));
    }
    Ok(entry)
}

/// Whether the subscriber already appears in any list owned by the principal.
#[tracing::instrument(name = "looking up subscriber in own lists", skip(store))]
pub async fn is_known_subscriber(
    store: &dyn Store,
    principal: &Principal,
    subscriber_id: i64,
) -> ServiceResult<bool> {
    let list_ids: Vec<i64> = store
        .lists_owned_by(principal.user_id)
        .await?
        .into_iter()
        .map(|l| l.id)
        .collect();
    if list_ids.is_empty() {
        return Ok(false);
    }
    Ok(store
        .entries_in_lists(&list_ids)
        .await?
        .iter()
        .any(|e| e.subscriber_id == subscriber_id))
}

/// Add a subscriber the principal already knows about to one of their lists.
///
/// The list must be owned by the principal and the subscriber must already sit
/// in some list of theirs. The check and the insert are not atomic.
#[tracing::instrument(name = "assigning subscriber to own list", skip(store))]
pub async fn assign_subscriber_to_my_list(
    store: &dyn Store,
    principal: &Principal,
    list_id: i64,
    subscriber_id: i64,
) -> ServiceResult<SubscriberListEntry> {
    let list = resolve_owned_list(store, principal, list_id).await?;
    if !is_known_subscriber(store, principal, subscriber_id).await? {
        return Err(ServiceError::NotFound(
            "Subscriber not found on any of your lists".to_string(),
        ));
    }
    Ok(store
        .insert_entry(&NewEntry::assignment(list.id, subscriber_id))
        .await?)
}
