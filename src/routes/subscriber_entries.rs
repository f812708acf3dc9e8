use actix_web::{
    web,
    HttpRequest,
    HttpResponse,
};
use serde::Deserialize;

use crate::authentication::authenticate;
use crate::routes::RouteError;
use crate::services::subscriber_entries as service;
use crate::store::Store;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryBody {
    list_id: Option<i64>,
    subscriber_id: Option<i64>,
    #[serde(default)]
    confirmed: bool,
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignParameters {
    list_id: i64,
    subscriber_id: i64,
}

#[tracing::instrument(name = "listing entries", skip(store, request))]
pub async fn list_entries(
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    let entries = service::list_entries(store.get_ref(), &principal).await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[tracing::instrument(name = "getting entry", skip(store, request))]
pub async fn get_entry(
    path: web::Path<i64>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    let entry = service::get_entry(store.get_ref(), &principal, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(entry))
}

#[tracing::instrument(name = "adding new entry", skip(store, request))]
pub async fn create_entry(
    body: web::Json<EntryBody>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    let body = body.into_inner();
    let entry = service::create_entry(
        store.get_ref(),
        &principal,
        body.list_id,
        body.subscriber_id,
        body.confirmed,
        body.source,
    )
    .await?;
    Ok(HttpResponse::Ok().json(entry))
}

#[tracing::instrument(name = "updating entry", skip(store, request))]
pub async fn update_entry(
    path: web::Path<i64>,
    body: web::Json<EntryBody>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    let body = body.into_inner();
    let entry = service::update_entry(
        store.get_ref(),
        &principal,
        path.into_inner(),
        body.list_id,
        body.subscriber_id,
        body.confirmed,
        body.source,
    )
    .await?;
    Ok(HttpResponse::Ok().json(entry))
}

#[tracing::instrument(name = "deleting entry", skip(store, request))]
pub async fn delete_entry(
    path: web::Path<i64>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    service::delete_entry(store.get_ref(), &principal, path.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}

#[tracing::instrument(name = "assigning subscriber to list", skip(store, request))]
pub async fn assign_subscriber(
    parameters: web::Query<AssignParameters>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    let entry = service::assign_subscriber(
        store.get_ref(),
        &principal,
        parameters.list_id,
        parameters.subscriber_id,
    )
    .await?;
    Ok(HttpResponse::Ok().json(entry))
}

#[tracing::instrument(name = "listing my entries", skip(store, request))]
pub async fn my_entries(
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    let entries = service::my_entries(store.get_ref(), &principal).await?;
    Ok(HttpResponse::Ok().json(entries))
}

#[tracing::instrument(name = "assigning subscriber to my list", skip(store, request))]
pub async fn assign_subscriber_to_my_list(
    parameters: web::Query<AssignParameters>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    let entry = service::assign_to_my_list(
        store.get_ref(),
        &principal,
        parameters.list_id,
        parameters.subscriber_id,
    )
    .await?;
    Ok(HttpResponse::Ok().json(entry))
}

#[tracing::instrument(name = "deleting my entry", skip(store, request))]
pub async fn delete_my_entry(
    path: web::Path<i64>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    service::delete_my_entry(store.get_ref(), &principal, path.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}
