//! HTTP Basic authentication against the argon2 hashes stored with each user.
use actix_web::http::header::HeaderMap;
use anyhow::Context;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{
    Algorithm,
    Argon2,
    Params,
    PasswordHash,
    PasswordHasher,
    PasswordVerifier,
    Version,
};
use base64::Engine;
use derivative::Derivative;

use crate::app::spawn_blocking_with_tracing;
use crate::domain::{
    Password,
    Principal,
};
use crate::store::Store;

/// Verified against when the email is unknown, so that a missing user costs
/// as much time as a wrong password.
const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=15000,t=2,p=1$\
gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

#[derive(Derivative)]
#[derivative(Debug)]
pub struct Credentials {
    pub email: String,
    #[derivative(Debug = "ignore")]
    pub password: String,
}

#[derive(thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials.")]
    InvalidCredentials(#[source] anyhow::Error),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::error_chain_fmt(self, f)
    }
}

/// Extract `email:password` from a `Basic` `Authorization` header.
pub fn basic_authentication(headers: &HeaderMap) -> Result<Credentials, anyhow::Error> {
    let authorization_header = headers
        .get("Authorization")
        .context("Missing `Authorization` header")?
        .to_str()
        .context("Invalid `Authorization` content")?;
    let encoded_credentials = authorization_header
        .strip_prefix("Basic ")
        .context("Authorization scheme is not Basic")?;
    let decoded_credentials_bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded_credentials)
        .context("Credentials cannot be base64 decoded")?;
    let decoded_credentials = String::from_utf8(decoded_credentials_bytes)
        .context("Invalid credentials: not UTF8 chars")?;
    let mut credentials = decoded_credentials.splitn(2, ':');
    let email = credentials
        .next()
        .context("Invalid credentials: missing email")?;
    let password = credentials
        .next()
        .context("Invalid credentials: missing password")?;
    Ok(Credentials {
        email: email.to_string(),
        password: password.to_string(),
    })
}

/// Authenticate the caller of a request from its `Authorization` header.
pub async fn authenticate(headers: &HeaderMap, store: &dyn Store) -> Result<Principal, AuthError> {
    let credentials = basic_authentication(headers).map_err(AuthError::InvalidCredentials)?;
    validate_credentials(credentials, store).await
}

#[tracing::instrument(name = "validating credentials", skip(credentials, store), fields(email = %credentials.email))]
pub async fn validate_credentials(
    credentials: Credentials,
    store: &dyn Store,
) -> Result<Principal, AuthError> {
    let user = store
        .find_user_by_email(&credentials.email)
        .await
        .context("Failed to look up the user")?;
    let expected_password_hash = user
        .as_ref()
        .map(|u| u.password_hash.clone())
        .unwrap_or_else(|| DUMMY_PASSWORD_HASH.to_string());

    let password = credentials.password;
    spawn_blocking_with_tracing(move || verify_password_hash(&expected_password_hash, &password))
        .await
        .context("Failed to spawn blocking task.")??;

    user.map(|u| Principal {
        user_id: u.id,
        role: u.role,
    })
    .ok_or_else(|| AuthError::InvalidCredentials(anyhow::anyhow!("Unknown email.")))
}

#[tracing::instrument(name = "verifying password hash", skip(expected_password_hash, password))]
fn verify_password_hash(expected_password_hash: &str, password: &str) -> Result<(), AuthError> {
    let expected_password_hash = PasswordHash::new(expected_password_hash)
        .context("Failed to parse hash in PHC string format.")?;
    Argon2::default()
        .verify_password(password.as_bytes(), &expected_password_hash)
        .context("Invalid password.")
        .map_err(AuthError::InvalidCredentials)
}

pub fn compute_password_hash(password: Password) -> Result<String, anyhow::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let params = Params::new(15000, 2, 1, None).context("Invalid argon2 parameters")?;
    let password_hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_ref().as_bytes(), &salt)
        .context("Failed to hash password")?
        .to_string();
    Ok(password_hash)
}
