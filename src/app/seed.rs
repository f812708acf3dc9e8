use std::convert::TryFrom;

use crate::app::AdminSettings;
use crate::domain::{
    parse_optional_name,
    Email,
    Gender,
    NewUser,
    Password,
    Role,
};
use crate::services::users::register_user;
use crate::store::Store;

/// Create the configured administrator unless a user with its email exists.
#[tracing::instrument(name = "seeding administrator", skip(store, settings), fields(email = %settings.email))]
pub async fn seed_admin(store: &dyn Store, settings: &AdminSettings) -> Result<(), anyhow::Error> {
    let email = Email::try_from(settings.email.clone())?;
    if store.find_user_by_email(email.as_ref()).await?.is_some() {
        tracing::info!("administrator already present");
        return Ok(());
    }
    let admin = NewUser {
        email,
        first_name: parse_optional_name(settings.first_name.clone())?,
        last_name: parse_optional_name(settings.last_name.clone())?,
        gender: Gender::Unknown,
        role: Role::Admin,
    };
    let password = Password::try_from(settings.password.clone())?;
    let admin = register_user(store, admin, password).await?;
    tracing::info!(user_id = admin.id, "administrator created");
    Ok(())
}
