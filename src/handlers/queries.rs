/// Read-mostly endpoints beyond plain CRUD: searches, per-user listings and
/// notification bulk updates.

use crate::db::models::{Page, PlaceSearch, TripSearch};
use crate::db::{
    DbPool, DetailStore, NotificationStore, PlaceStore, ReviewStore, TripMemberStore, TripStore,
};
use crate::error::StoreError;
use actix_web::{web, HttpResponse};

/// GET /trips/search?from=&to=&keyword=
pub async fn search_trips(
    pool: web::Data<DbPool>,
    query: web::Query<TripSearch>,
) -> Result<HttpResponse, StoreError> {
    let trips = TripStore::search(&pool, &query).await?;
    Ok(HttpResponse::Ok().json(trips))
}

/// GET /trips/{id}/members
pub async fn trip_members(
    pool: web::Data<DbPool>,
    id_trip: web::Path<String>,
) -> Result<HttpResponse, StoreError> {
    let users = TripMemberStore::members_of_trip(&pool, &id_trip).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// GET /trips/{id}/reviews/best
pub async fn best_reviews(
    pool: web::Data<DbPool>,
    id_trip: web::Path<String>,
) -> Result<HttpResponse, StoreError> {
    let reviews = ReviewStore::best_for_trip(&pool, &id_trip).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

/// GET /places/search?keyword=&place_type=&min_rating=
pub async fn search_places(
    pool: web::Data<DbPool>,
    query: web::Query<PlaceSearch>,
) -> Result<HttpResponse, StoreError> {
    let places = PlaceStore::search(&pool, &query).await?;
    Ok(HttpResponse::Ok().json(places))
}

/// GET /users/{id}/trips
pub async fn user_trips(
    pool: web::Data<DbPool>,
    id_user: web::Path<String>,
) -> Result<HttpResponse, StoreError> {
    let trips = TripMemberStore::trips_of_user(&pool, &id_user).await?;
    Ok(HttpResponse::Ok().json(trips))
}

/// GET /notifications/user/{idUser}/unread
pub async fn unread_notifications(
    pool: web::Data<DbPool>,
    id_user: web::Path<String>,
) -> Result<HttpResponse, StoreError> {
    let notifications = NotificationStore::unread_for_user(&pool, &id_user).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

/// PUT /notifications/{id}/read
pub async fn mark_notification_read(
    pool: web::Data<DbPool>,
    id_notify: web::Path<String>,
) -> Result<HttpResponse, StoreError> {
    let notification = NotificationStore::mark_read(&pool, &id_notify).await?;
    Ok(HttpResponse::Ok().json(notification))
}

/// PUT /notifications/user/{idUser}/read
pub async fn mark_all_notifications_read(
    pool: web::Data<DbPool>,
    id_user: web::Path<String>,
) -> Result<HttpResponse, StoreError> {
    let notifications = NotificationStore::mark_all_read(&pool, &id_user).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

/// DELETE /notifications/user/{idUser}
pub async fn delete_user_notifications(
    pool: web::Data<DbPool>,
    id_user: web::Path<String>,
) -> Result<HttpResponse, StoreError> {
    let removed = NotificationStore::delete_all_for_user(&pool, &id_user).await?;
    Ok(HttpResponse::Ok().json(removed))
}

/// GET /details/trip/{idTrip}?skip=&limit=
pub async fn trip_itinerary(
    pool: web::Data<DbPool>,
    id_trip: web::Path<String>,
    page: web::Query<Page>,
) -> Result<HttpResponse, StoreError> {
    let details = DetailStore::for_trip(&pool, &id_trip, page.into_inner()).await?;
    Ok(HttpResponse::Ok().json(details))
}

/// GET /details/place/{idPlace}?skip=&limit=
pub async fn place_visits(
    pool: web::Data<DbPool>,
    id_place: web::Path<String>,
    page: web::Query<Page>,
) -> Result<HttpResponse, StoreError> {
    let details = DetailStore::for_place(&pool, &id_place, page.into_inner()).await?;
    Ok(HttpResponse::Ok().json(details))
}
