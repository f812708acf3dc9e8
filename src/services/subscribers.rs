use std::collections::BTreeSet;

use crate::domain::{
    Email,
    NewSubscriber,
    Principal,
    Subscriber,
};
use crate::services::{
    not_found,
    require_admin,
    resolve_current_user,
    ServiceError,
    ServiceResult,
};
use crate::store::Store;

#[tracing::instrument(name = "listing subscribers", skip(store))]
pub async fn list_subscribers(
    store: &dyn Store,
    principal: &Principal,
) -> ServiceResult<Vec<Subscriber>> {
    require_admin(principal)?;
    Ok(store.list_subscribers().await?)
}

#[tracing::instrument(name = "getting subscriber", skip(store))]
pub async fn get_subscriber(
    store: &dyn Store,
    principal: &Principal,
    id: i64,
) -> ServiceResult<Subscriber> {
    require_admin(principal)?;
    store
        .get_subscriber(id)
        .await?
        .ok_or_else(|| not_found("Subscriber", id))
}

#[tracing::instrument(name = "finding subscriber by email", skip(store, email), fields(email = %email.as_ref()))]
pub async fn find_subscriber_by_email(
    store: &dyn Store,
    principal: &Principal,
    email: &Email,
) -> ServiceResult<Subscriber> {
    require_admin(principal)?;
    store
        .find_subscriber_by_email(email.as_ref())
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Subscriber with email {} not found", email.as_ref()))
        })
}

#[tracing::instrument(name = "creating subscriber", skip(store, subscriber), fields(email = %subscriber.email.as_ref()))]
pub async fn create_subscriber(
    store: &dyn Store,
    principal: &Principal,
    subscriber: NewSubscriber,
) -> ServiceResult<Subscriber> {
    require_admin(principal)?;
    Ok(store.insert_subscriber(&subscriber).await?)
}

#[tracing::instrument(name = "updating subscriber", skip(store, subscriber))]
pub async fn update_subscriber(
    store: &dyn Store,
    principal: &Principal,
    id: i64,
    subscriber: NewSubscriber,
) -> ServiceResult<Subscriber> {
    require_admin(principal)?;
    store
        .update_subscriber(id, &subscriber)
        .await?
        .ok_or_else(|| not_found("Subscriber", id))
}

#[tracing::instrument(name = "deleting subscriber", skip(store))]
pub async fn delete_subscriber(
    store: &dyn Store,
    principal: &Principal,
    id: i64,
) -> ServiceResult<()> {
    require_admin(principal)?;
    if store.delete_subscriber(id).await? {
        Ok(())
    } else {
        Err(not_found("Subscriber", id))
    }
}

#[tracing::instrument(name = "deleting subscriber by email", skip(store, email), fields(email = %email.as_ref()))]
pub async fn delete_subscriber_by_email(
    store: &dyn Store,
    principal: &Principal,
    email: &Email,
) -> ServiceResult<()> {
    require_admin(principal)?;
    if store.delete_subscriber_by_email(email.as_ref()).await? {
        Ok(())
    } else {
        Err(ServiceError::NotFound(format!(
            "Subscriber with email {} not found",
            email.as_ref()
        )))
    }
}

/// Every subscriber that appears in at least one list of the principal,
/// once, ordered by id.
#[tracing::instrument(name = "listing my subscribers", skip(store))]
pub async fn my_subscribers(
    store: &dyn Store,
    principal: &Principal,
) -> ServiceResult<Vec<Subscriber>> {
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
    let subscriber_ids: Vec<i64> = store
        .entries_in_lists(&list_ids)
        .await?
        .into_iter()
        .map(|e| e.subscriber_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    Ok(store.get_subscribers_by_ids(&subscriber_ids).await?)
}
