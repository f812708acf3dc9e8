use std::convert::TryFrom;

use actix_web::{
    web,
    HttpRequest,
    HttpResponse,
};
use serde::Deserialize;

use crate::authentication::authenticate;
use crate::domain::{
    parse_optional_name,
    Email,
    Gender,
    MalformedInput,
    NewUser,
    Password,
    Role,
};
use crate::routes::RouteError;
use crate::services::require_admin;
use crate::services::users as service;
use crate::store::Store;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    gender: Option<Gender>,
    role: Option<Role>,
    password: Option<String>,
}

#[tracing::instrument(name = "validating user data", skip(body))]
fn build_new_user(body: UserBody) -> Result<(NewUser, Option<Password>), MalformedInput> {
    let new_user = NewUser {
        email: Email::try_from(body.email)?,
        first_name: parse_optional_name(body.first_name)?,
        last_name: parse_optional_name(body.last_name)?,
        gender: body.gender.unwrap_or_default(),
        role: body.role.unwrap_or_default(),
    };
    let password = body.password.map(Password::try_from).transpose()?;
    Ok((new_user, password))
}

#[tracing::instrument(name = "listing users", skip(store, request))]
pub async fn list_users(
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    let users = service::list_users(store.get_ref(), &principal).await?;
    Ok(HttpResponse::Ok().json(users))
}

#[tracing::instrument(name = "getting user", skip(store, request))]
pub async fn get_user(
    path: web::Path<i64>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    let user = service::get_user(store.get_ref(), &principal, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[tracing::instrument(
    name = "adding new user",
    skip(body, store, request),
    fields(email = %body.email)
)]
pub async fn create_user(
    body: web::Json<UserBody>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    require_admin(&principal)?;
    let (new_user, password) = build_new_user(body.into_inner())?;
    let password = password.ok_or_else(|| MalformedInput::InvalidPassword {
        message: "Password is required".to_string(),
    })?;
    let user = service::create_user(store.get_ref(), &principal, new_user, password).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[tracing::instrument(name = "updating user", skip(body, store, request))]
pub async fn update_user(
    path: web::Path<i64>,
    body: web::Json<UserBody>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    require_admin(&principal)?;
    let (new_user, password) = build_new_user(body.into_inner())?;
    let user = service::update_user(
        store.get_ref(),
        &principal,
        path.into_inner(),
        new_user,
        password,
    )
    .await?;
    Ok(HttpResponse::Ok().json(user))
}

#[tracing::instrument(name = "deleting user", skip(store, request))]
pub async fn delete_user(
    path: web::Path<i64>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    service::delete_user(store.get_ref(), &principal, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
