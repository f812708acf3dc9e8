use std::collections::HashMap;

use crate::domain::{
    ListName,
    Principal,
    SubscriberList,
    SubscriberListDetails,
};
use crate::services::ownership::resolve_owned_list;
use crate::services::subscriber_entries::entry_details;
use crate::services::{
    not_found,
    require_admin,
    resolve_current_user,
    ServiceError,
    ServiceResult,
};
use crate::store::Store;

/// Attach to each list its entries, each entry with its subscriber.
async fn list_details(
    store: &dyn Store,
    lists: Vec<SubscriberList>,
) -> ServiceResult<Vec<SubscriberListDetails>> {
    if lists.is_empty() {
        return Ok(Vec::new());
    }
    let list_ids: Vec<i64> = lists.iter().map(|l| l.id).collect();
    let entries = store.entries_in_lists(&list_ids).await?;
    let mut entries_by_list: HashMap<i64, Vec<_>> = HashMap::new();
    for details in entry_details(store, entries).await? {
        entries_by_list
            .entry(details.entry.list_id)
            .or_default()
            .push(details);
    }
    Ok(lists
        .into_iter()
        .map(|list| SubscriberListDetails {
            entries: entries_by_list.remove(&list.id).unwrap_or_default(),
            list,
        })
        .collect())
}

async fn single_list_details(
    store: &dyn Store,
    list: SubscriberList,
) -> ServiceResult<SubscriberListDetails> {
    let id = list.id;
    list_details(store, vec![list])
        .await?
        .pop()
        .ok_or_else(|| not_found("Subscriber list", id))
}

async fn require_owner(store: &dyn Store, owner_id: Option<i64>) -> ServiceResult<i64> {
    let owner_id = owner_id
        .ok_or_else(|| ServiceError::ValidationFailure("Owner is required".to_string()))?;
    store
        .get_user(owner_id)
        .await?
        .ok_or_else(|| not_found("User", owner_id))?;
    Ok(owner_id)
}

#[tracing::instrument(name = "listing subscriber lists", skip(store))]
pub async fn list_lists(
    store: &dyn Store,
    principal: &Principal,
) -> ServiceResult<Vec<SubscriberListDetails>> {
    require_admin(principal)?;
    let lists = store.list_lists().await?;
    list_details(store, lists).await
}

#[tracing::instrument(name = "getting subscriber list", skip(store))]
pub async fn get_list(
    store: &dyn Store,
    principal: &Principal,
    id: i64,
) -> ServiceResult<SubscriberListDetails> {
    require_admin(principal)?;
    let list = store
        .get_list(id)
        .await?
        .ok_or_else(|| not_found("Subscriber list", id))?;
    single_list_details(store, list).await
}

#[tracing::instrument(name = "creating subscriber list", skip(store, name))]
pub async fn create_list(
    store: &dyn Store,
    principal: &Principal,
    name: ListName,
    owner_id: Option<i64>,
) -> ServiceResult<SubscriberListDetails> {
    require_admin(principal)?;
    let owner_id = require_owner(store, owner_id).await?;
    let list = store.insert_list(&name, owner_id).await?;
    single_list_details(store, list).await
}

/// Rename a list and, when `owner_id` is given, hand it to another user.
#[tracing::instrument(name = "updating subscriber list", skip(store, name))]
pub async fn update_list(
    store: &dyn Store,
    principal: &Principal,
    id: i64,
    name: ListName,
    owner_id: Option<i64>,
) -> ServiceResult<SubscriberListDetails> {
    require_admin(principal)?;
    let existing = store
        .get_list(id)
        .await?
        .ok_or_else(|| not_found("Subscriber list", id))?;
    let owner_id = match owner_id {
        Some(owner_id) => require_owner(store, Some(owner_id)).await?,
        None => existing.owner_id,
    };
    let list = store
        .update_list(id, &name, owner_id)
        .await?
        .ok_or_else(|| not_found("Subscriber list", id))?;
    single_list_details(store, list).await
}

#[tracing::instrument(name = "deleting subscriber list", skip(store))]
pub async fn delete_list(store: &dyn Store, principal: &Principal, id: i64) -> ServiceResult<()> {
    require_admin(principal)?;
    if store.delete_list(id).await? {
        Ok(())
    } else {
        Err(not_found("Subscriber list", id))
    }
}

#[tracing::instrument(name = "listing my subscriber lists", skip(store))]
pub async fn my_lists(
    store: &dyn Store,
    principal: &Principal,
) -> ServiceResult<Vec<SubscriberListDetails>> {
    let user = resolve_current_user(store, principal).await?;
    let lists = store.lists_owned_by(user.id).await?;
    list_details(store, lists).await
}

#[tracing::instrument(name = "getting my subscriber list", skip(store))]
pub async fn get_my_list(
    store: &dyn Store,
    principal: &Principal,
    id: i64,
) -> ServiceResult<SubscriberListDetails> {
    let list = resolve_owned_list(store, principal, id).await?;
    single_list_details(store, list).await
}

/// Create a list owned by the principal. The owner cannot be chosen by the
/// client: a supplied `owner_id` is rejected.
#[tracing::instrument(name = "creating my subscriber list", skip(store, name))]
pub async fn create_my_list(
    store: &dyn Store,
    principal: &Principal,
    name: ListName,
    owner_id: Option<i64>,
) -> ServiceResult<SubscriberListDetails> {
    if owner_id.is_some() {
        return Err(ServiceError::ValidationFailure(
            "Owner is added automatically for current user".to_string(),
        ));
    }
    let user = resolve_current_user(store, principal).await?;
    let list = store.insert_list(&name, user.id).await?;
    single_list_details(store, list).await
}

#[tracing::instrument(name = "updating my subscriber list", skip(store, name))]
pub async fn update_my_list(
    store: &dyn Store,
    principal: &Principal,
    id: i64,
    name: ListName,
) -> ServiceResult<SubscriberListDetails> {
    let list = resolve_owned_list(store, principal, id).await?;
    let list = store
        .update_list(list.id, &name, list.owner_id)
        .await?
        .ok_or_else(|| not_found("Subscriber list", id))?;
    single_list_details(store, list).await
}

#[tracing::instrument(name = "deleting my subscriber list", skip(store))]
pub async fn delete_my_list(
    store: &dyn Store,
    principal: &Principal,
    id: i64,
) -> ServiceResult<()> {
    let list = resolve_owned_list(store, principal, id).await?;
    if store.delete_list(list.id).await? {
        Ok(())
    } else {
        Err(not_found("Subscriber list", id))
    }
}
