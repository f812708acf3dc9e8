use anyhow::Context;

use crate::app::spawn_blocking_with_tracing;
use crate::authentication::compute_password_hash;
use crate::domain::{
    NewUser,
    Password,
    Principal,
    User,
};
use crate::services::{
    not_found,
    require_admin,
    ServiceResult,
};
use crate::store::Store;

#[tracing::instrument(name = "listing users", skip(store))]
pub async fn list_users(store: &dyn Store, principal: &Principal) -> ServiceResult<Vec<User>> {
    require_admin(principal)?;
    Ok(store.list_users().await?)
}

#[tracing::instrument(name = "getting user", skip(store))]
pub async fn get_user(store: &dyn Store, principal: &Principal, id: i64) -> ServiceResult<User> {
    require_admin(principal)?;
    store.get_user(id).await?.ok_or_else(|| not_found("User", id))
}

#[tracing::instrument(name = "creating user", skip(store, user, password), fields(email = %user.email.as_ref()))]
pub async fn create_user(
    store: &dyn Store,
    principal: &Principal,
    user: NewUser,
    password: Password,
) -> ServiceResult<User> {
    require_admin(principal)?;
    register_user(store, user, password).await
}

/// Store a new user with the hash of `password`, without any role check.
///
/// Used by `create_user` and by the administrator seeding at startup.
pub async fn register_user(
    store: &dyn Store,
    user: NewUser,
    password: Password,
) -> ServiceResult<User> {
    let password_hash = hash_password(password).await?;
    Ok(store.insert_user(&user, &password_hash).await?)
}

#[tracing::instrument(name = "updating user", skip(store, user, password))]
pub async fn update_user(
    store: &dyn Store,
    principal: &Principal,
    id: i64,
    user: NewUser,
    password: Option<Password>,
) -> ServiceResult<User> {
    require_admin(principal)?;
    let password_hash = match password {
        Some(password) => Some(hash_password(password).await?),
        None => None,
    };
    store
        .update_user(id, &user, password_hash.as_deref())
        .await?
        .ok_or_else(|| not_found("User", id))
}

#[tracing::instrument(name = "deleting user", skip(store))]
pub async fn delete_user(store: &dyn Store, principal: &Principal, id: i64) -> ServiceResult<()> {
    require_admin(principal)?;
    if store.delete_user(id).await? {
        Ok(())
    } else {
        Err(not_found("User", id))
    }
}

async fn hash_password(password: Password) -> ServiceResult<String> {
    Ok(
        spawn_blocking_with_tracing(move || compute_password_hash(password))
            .await
            .context("Failed to spawn blocking task.")??,
    )
}
