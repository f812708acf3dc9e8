use std::convert::TryFrom;

use actix_web::{
    web,
    HttpRequest,
    HttpResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::authentication::authenticate;
use crate::domain::{
    parse_optional_name,
    Email,
    Gender,
    MalformedInput,
    NewSubscriber,
};
use crate::routes::RouteError;
use crate::services::require_admin;
use crate::services::subscribers as service;
use crate::store::Store;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberBody {
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    birth_date: Option<NaiveDate>,
    gender: Option<Gender>,
}

#[tracing::instrument(name = "validating subscriber data", skip(body))]
fn build_new_subscriber(body: SubscriberBody) -> Result<NewSubscriber, MalformedInput> {
    Ok(NewSubscriber {
        email: Email::try_from(body.email).map_err(|e| {
            tracing::error!("{:?}", e);
            e
        })?,
        first_name: parse_optional_name(body.first_name)?,
        last_name: parse_optional_name(body.last_name)?,
        birth_date: body.birth_date,
        gender: body.gender.unwrap_or_default(),
    })
}

#[tracing::instrument(name = "listing subscribers", skip(store, request))]
pub async fn list_subscribers(
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    let subscribers = service::list_subscribers(store.get_ref(), &principal).await?;
    Ok(HttpResponse::Ok().json(subscribers))
}

#[tracing::instrument(name = "listing my subscribers", skip(store, request))]
pub async fn my_subscribers(
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    let subscribers = service::my_subscribers(store.get_ref(), &principal).await?;
    Ok(HttpResponse::Ok().json(subscribers))
}

#[tracing::instrument(name = "getting subscriber", skip(store, request))]
pub async fn get_subscriber(
    path: web::Path<i64>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    let subscriber =
        service::get_subscriber(store.get_ref(), &principal, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(subscriber))
}

#[tracing::instrument(name = "getting subscriber by email", skip(store, request))]
pub async fn get_subscriber_by_email(
    path: web::Path<String>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    require_admin(&principal)?;
    let email = Email::try_from(path.into_inner())?;
    let subscriber = service::find_subscriber_by_email(store.get_ref(), &principal, &email).await?;
    Ok(HttpResponse::Ok().json(subscriber))
}

#[tracing::instrument(
    name = "adding new subscriber",
    skip(body, store, request),
    fields(email = %body.email)
)]
pub async fn create_subscriber(
    body: web::Json<SubscriberBody>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    require_admin(&principal)?;
    let new_subscriber = build_new_subscriber(body.into_inner())?;
    let subscriber =
        service::create_subscriber(store.get_ref(), &principal, new_subscriber).await?;
    Ok(HttpResponse::Ok().json(subscriber))
}

#[tracing::instrument(name = "updating subscriber", skip(body, store, request))]
pub async fn update_subscriber(
    path: web::Path<i64>,
    body: web::Json<SubscriberBody>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    require_admin(&principal)?;
    let changes = build_new_subscriber(body.into_inner())?;
    let subscriber =
        service::update_subscriber(store.get_ref(), &principal, path.into_inner(), changes)
            .await?;
    Ok(HttpResponse::Ok().json(subscriber))
}

#[tracing::instrument(name = "deleting subscriber", skip(store, request))]
pub async fn delete_subscriber(
    path: web::Path<i64>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    service::delete_subscriber(store.get_ref(), &principal, path.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}

#[tracing::instrument(name = "deleting subscriber by email", skip(store, request))]
pub async fn delete_subscriber_by_email(
    path: web::Path<String>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    require_admin(&principal)?;
    let email = Email::try_from(path.into_inner())?;
    service::delete_subscriber_by_email(store.get_ref(), &principal, &email).await?;
    Ok(HttpResponse::Ok().finish())
}
