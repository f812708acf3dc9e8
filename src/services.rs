//! Entity services: every operation takes the store and the authenticated
//! `Principal` explicitly.
//!
//! Admin operations are gated by `require_admin`. Operations on "my" data go
//! through the `ownership` resolver, which decides whether the principal owns
//! the list or entry it is about to touch.
use thiserror::Error;

use crate::domain::{
    Principal,
    User,
};
use crate::store::{
    Store,
    StoreError,
};

pub mod ownership;
pub mod subscriber_entries;
pub mod subscriber_lists;
pub mod subscribers;
pub mod users;

#[derive(Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    AccessDenied(String),
    #[error("{0}")]
    ValidationFailure(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl std::fmt::Debug for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::error_chain_fmt(self, f)
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(message) => ServiceError::Conflict(message),
            StoreError::MissingReference(message) => ServiceError::NotFound(message),
            StoreError::Unexpected(e) => ServiceError::Unexpected(e),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub(crate) fn not_found(entity: &str, id: i64) -> ServiceError {
    ServiceError::NotFound(format!("{} with id {} not found", entity, id))
}

/// Fail with `AccessDenied` unless the principal is an administrator.
pub fn require_admin(principal: &Principal) -> ServiceResult<()> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::AccessDenied(
            "Administrator role required".to_string(),
        ))
    }
}

/// Load the user record behind the principal.
///
/// The credentials were valid when the request started, but the account may
/// have been deleted since.
#[tracing::instrument(name = "resolving current user", skip(store))]
pub async fn resolve_current_user(store: &dyn Store, principal: &Principal) -> ServiceResult<User> {
    store
        .get_user(principal.user_id)
        .await?
        .ok_or_else(|| not_found("User", principal.user_id))
}
