/// REST API handlers shared by every single-key resource.
/// One generic set of CRUD endpoints, instantiated per store.

use crate::db::models::Page;
use crate::db::record::{Keyed, Record};
use crate::db::{DbPool, Repository};
use crate::error::StoreError;
use actix_web::{web, HttpResponse, Result as ActixResult, Scope};
use serde_json::json;

/// Create a record
/// POST /{resource}
pub async fn create<R: Repository>(
    pool: web::Data<DbPool>,
    req: web::Json<R::New>,
) -> Result<HttpResponse, StoreError> {
    let record = R::create(&pool, &req).await?;
    log::debug!("POST created {} {}", R::Record::KIND, record.id());
    Ok(HttpResponse::Created().json(record))
}

/// List records one page at a time
/// GET /{resource}?skip=&limit=
pub async fn list<R: Repository>(
    pool: web::Data<DbPool>,
    page: web::Query<Page>,
) -> Result<HttpResponse, StoreError> {
    let records = R::list(&pool, page.into_inner()).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Look records up by a named field
/// GET /{resource}/by/{field}/{value}
pub async fn find_by<R: Repository>(
    pool: web::Data<DbPool>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, StoreError> {
    let (field, value) = path.into_inner();
    let found = R::find_by(&pool, &field, &value).await?;
    Ok(HttpResponse::Ok().json(found))
}

/// GET /{resource}/{id}
pub async fn get<R: Repository>(
    pool: web::Data<DbPool>,
    id: web::Path<String>,
) -> Result<HttpResponse, StoreError> {
    match R::get(&pool, &id).await? {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Err(StoreError::not_found(R::Record::KIND, id.into_inner())),
    }
}

/// Apply a partial update
/// PUT /{resource}/{id}
pub async fn update<R: Repository>(
    pool: web::Data<DbPool>,
    id: web::Path<String>,
    req: web::Json<R::Patch>,
) -> Result<HttpResponse, StoreError> {
    let record = R::update(&pool, &id, &req).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Delete a record and return it
/// DELETE /{resource}/{id}
pub async fn delete<R: Repository>(
    pool: web::Data<DbPool>,
    id: web::Path<String>,
) -> Result<HttpResponse, StoreError> {
    let record = R::delete(&pool, &id).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Append the CRUD routes of `R` to `scope`.
///
/// Register resource specific routes on the scope before calling this so
/// that fixed segments like `/search` win over `/{id}`.
pub fn resource_routes<R: Repository>(scope: Scope) -> Scope {
    scope
        .route("", web::post().to(create::<R>))
        .route("", web::get().to(list::<R>))
        .route("/by/{field}/{value}", web::get().to(find_by::<R>))
        .route("/{id}", web::get().to(get::<R>))
        .route("/{id}", web::put().to(update::<R>))
        .route("/{id}", web::delete().to(delete::<R>))
}

/// Health check endpoint
/// GET /health
pub async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "ok"
    })))
}
