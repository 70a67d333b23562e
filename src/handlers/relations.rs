/// Endpoints for the pair-keyed relations: friendships and trip membership.

use crate::db::friend_store::FriendSelector;
use crate::db::models::{EntityKind, NewFriend, Page, TripMember};
use crate::db::selector::Selector;
use crate::db::{DbPool, FriendStore, TripMemberStore};
use crate::error::StoreError;
use actix_web::{web, HttpResponse};

/// POST /friends
pub async fn create_friend(
    pool: web::Data<DbPool>,
    req: web::Json<NewFriend>,
) -> Result<HttpResponse, StoreError> {
    let friend = FriendStore::create(&pool, &req).await?;
    Ok(HttpResponse::Created().json(friend))
}

/// GET /friends?skip=&limit=
pub async fn list_friends(
    pool: web::Data<DbPool>,
    page: web::Query<Page>,
) -> Result<HttpResponse, StoreError> {
    let friends = FriendStore::list(&pool, page.into_inner()).await?;
    Ok(HttpResponse::Ok().json(friends))
}

/// Friendships of a user, on either side
/// GET /friends/{idUser}
pub async fn friends_of(
    pool: web::Data<DbPool>,
    id_user: web::Path<String>,
) -> Result<HttpResponse, StoreError> {
    let friends = FriendStore::friends_of(&pool, &id_user).await?;
    Ok(HttpResponse::Ok().json(friends))
}

/// GET /friends/by/{field}/{value}
pub async fn find_friends(
    pool: web::Data<DbPool>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, StoreError> {
    let (field, value) = path.into_inner();
    let found = FriendStore::find_by(&pool, &field, &value).await?;
    Ok(HttpResponse::Ok().json(found))
}

/// GET /friends/by/{field} with the value left out
pub async fn find_friends_without_value(
    field: web::Path<String>,
) -> Result<HttpResponse, StoreError> {
    FriendSelector::parse(&field)?;
    Err(StoreError::Validation(format!(
        "missing value for friend selector {field}"
    )))
}

/// GET /friends/{idSelf}/{idFriend}
pub async fn get_friend(
    pool: web::Data<DbPool>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, StoreError> {
    let (id_self, id_friend) = path.into_inner();
    match FriendStore::get(&pool, &id_self, &id_friend).await? {
        Some(friend) => Ok(HttpResponse::Ok().json(friend)),
        None => Err(StoreError::not_found(
            EntityKind::Friend,
            format!("{id_self}/{id_friend}"),
        )),
    }
}

/// PUT /friends/{idSelf}/{idFriend}/accept
pub async fn accept_friend(
    pool: web::Data<DbPool>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, StoreError> {
    let (id_self, id_friend) = path.into_inner();
    let friend = FriendStore::accept(&pool, &id_self, &id_friend).await?;
    Ok(HttpResponse::Ok().json(friend))
}

/// DELETE /friends/{idSelf}/{idFriend}
pub async fn delete_friend(
    pool: web::Data<DbPool>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, StoreError> {
    let (id_self, id_friend) = path.into_inner();
    let friend = FriendStore::delete(&pool, &id_self, &id_friend).await?;
    Ok(HttpResponse::Ok().json(friend))
}

/// POST /trip-members
pub async fn create_trip_member(
    pool: web::Data<DbPool>,
    req: web::Json<TripMember>,
) -> Result<HttpResponse, StoreError> {
    let member = TripMemberStore::create(&pool, &req).await?;
    Ok(HttpResponse::Created().json(member))
}

/// GET /trip-members?skip=&limit=
pub async fn list_trip_members(
    pool: web::Data<DbPool>,
    page: web::Query<Page>,
) -> Result<HttpResponse, StoreError> {
    let members = TripMemberStore::list(&pool, page.into_inner()).await?;
    Ok(HttpResponse::Ok().json(members))
}

/// GET /trip-members/by/{field}/{value}
pub async fn find_trip_members(
    pool: web::Data<DbPool>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, StoreError> {
    let (field, value) = path.into_inner();
    let found = TripMemberStore::find_by(&pool, &field, &value).await?;
    Ok(HttpResponse::Ok().json(found))
}

/// DELETE /trip-members/{idUser}/{idTrip}
pub async fn delete_trip_member(
    pool: web::Data<DbPool>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, StoreError> {
    let (id_user, id_trip) = path.into_inner();
    let member = TripMemberStore::delete(&pool, &id_user, &id_trip).await?;
    Ok(HttpResponse::Ok().json(member))
}
