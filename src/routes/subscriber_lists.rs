use std::convert::TryFrom;

use actix_web::{
    web,
    HttpRequest,
    HttpResponse,
};
use serde::Deserialize;

use crate::authentication::authenticate;
use crate::domain::ListName;
use crate::routes::RouteError;
use crate::services::require_admin;
use crate::services::subscriber_lists as service;
use crate::store::Store;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBody {
    name: String,
    owner_id: Option<i64>,
}

#[tracing::instrument(name = "listing subscriber lists", skip(store, request))]
pub async fn list_lists(
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    let lists = service::list_lists(store.get_ref(), &principal).await?;
    Ok(HttpResponse::Ok().json(lists))
}

#[tracing::instrument(name = "getting subscriber list", skip(store, request))]
pub async fn get_list(
    path: web::Path<i64>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    let list = service::get_list(store.get_ref(), &principal, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(list))
}

#[tracing::instrument(name = "adding new subscriber list", skip(body, store, request), fields(name = %body.name))]
pub async fn create_list(
    body: web::Json<ListBody>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    require_admin(&principal)?;
    let body = body.into_inner();
    let name = ListName::try_from(body.name)?;
    let list = service::create_list(store.get_ref(), &principal, name, body.owner_id).await?;
    Ok(HttpResponse::Ok().json(list))
}

#[tracing::instrument(name = "updating subscriber list", skip(body, store, request))]
pub async fn update_list(
    path: web::Path<i64>,
    body: web::Json<ListBody>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    require_admin(&principal)?;
    let body = body.into_inner();
    let name = ListName::try_from(body.name)?;
    let list = service::update_list(
        store.get_ref(),
        &principal,
        path.into_inner(),
        name,
        body.owner_id,
    )
    .await?;
    Ok(HttpResponse::Ok().json(list))
}

#[tracing::instrument(name = "deleting subscriber list", skip(store, request))]
pub async fn delete_list(
    path: web::Path<i64>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    service::delete_list(store.get_ref(), &principal, path.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}

#[tracing::instrument(name = "listing my subscriber lists", skip(store, request))]
pub async fn my_lists(
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    let lists = service::my_lists(store.get_ref(), &principal).await?;
    Ok(HttpResponse::Ok().json(lists))
}

#[tracing::instrument(name = "getting my subscriber list", skip(store, request))]
pub async fn get_my_list(
    path: web::Path<i64>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    let list = service::get_my_list(store.get_ref(), &principal, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(list))
}

#[tracing::instrument(name = "adding my subscriber list", skip(body, store, request), fields(name = %body.name))]
pub async fn create_my_list(
    body: web::Json<ListBody>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    let body = body.into_inner();
    let name = ListName::try_from(body.name)?;
    let list = service::create_my_list(store.get_ref(), &principal, name, body.owner_id).await?;
    Ok(HttpResponse::Ok().json(list))
}

#[tracing::instrument(name = "updating my subscriber list", skip(body, store, request))]
pub async fn update_my_list(
    path: web::Path<i64>,
    body: web::Json<ListBody>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    let name = ListName::try_from(body.into_inner().name)?;
    let list =
        service::update_my_list(store.get_ref(), &principal, path.into_inner(), name).await?;
    Ok(HttpResponse::Ok().json(list))
}

#[tracing::instrument(name = "deleting my subscriber list", skip(store, request))]
pub async fn delete_my_list(
    path: web::Path<i64>,
    store: web::Data<dyn Store>,
    request: HttpRequest,
) -> Result<HttpResponse, RouteError> {
    let principal = authenticate(request.headers(), store.get_ref()).await?;
    service::delete_my_list(store.get_ref(), &principal, path.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}
