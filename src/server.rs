/// HTTP server factory and configuration.
/// Provides a reusable function to create and configure the HTTP server
/// for use in both the main binary and tests.

use crate::db::{
    AiRecommendationStore, BookingStore, DbPool, DetailStore, NotificationStore, PlaceStore,
    ReviewStore, TripStore, UserStore,
};
use crate::handlers::{health, queries, relations, resource_routes};
use actix_web::{middleware, web, App, HttpServer};

/// Register every route of the API on `cfg`
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .service(resource_routes::<UserStore>(
            web::scope("/users").route("/{id}/trips", web::get().to(queries::user_trips)),
        ))
        .service(resource_routes::<TripStore>(
            web::scope("/trips")
                .route("/search", web::get().to(queries::search_trips))
                .route("/{id}/members", web::get().to(queries::trip_members))
                .route("/{id}/reviews/best", web::get().to(queries::best_reviews)),
        ))
        .service(resource_routes::<PlaceStore>(
            web::scope("/places").route("/search", web::get().to(queries::search_places)),
        ))
        .service(resource_routes::<BookingStore>(web::scope("/bookings")))
        .service(resource_routes::<ReviewStore>(web::scope("/reviews")))
        .service(resource_routes::<NotificationStore>(
            web::scope("/notifications")
                .route(
                    "/user/{idUser}/unread",
                    web::get().to(queries::unread_notifications),
                )
                .route(
                    "/user/{idUser}/read",
                    web::put().to(queries::mark_all_notifications_read),
                )
                .route(
                    "/user/{idUser}",
                    web::delete().to(queries::delete_user_notifications),
                )
                .route("/{id}/read", web::put().to(queries::mark_notification_read)),
        ))
        .service(resource_routes::<AiRecommendationStore>(web::scope(
            "/ai-recommendations",
        )))
        .service(resource_routes::<DetailStore>(
            web::scope("/details")
                .route("/trip/{idTrip}", web::get().to(queries::trip_itinerary))
                .route("/place/{idPlace}", web::get().to(queries::place_visits)),
        ))
        .service(
            web::scope("/friends")
                .route("", web::post().to(relations::create_friend))
                .route("", web::get().to(relations::list_friends))
                .route("/by/{field}/{value}", web::get().to(relations::find_friends))
                .route(
                    "/by/{field}",
                    web::get().to(relations::find_friends_without_value),
                )
                .route(
                    "/{idSelf}/{idFriend}/accept",
                    web::put().to(relations::accept_friend),
                )
                .route("/{idSelf}/{idFriend}", web::get().to(relations::get_friend))
                .route(
                    "/{idSelf}/{idFriend}",
                    web::delete().to(relations::delete_friend),
                )
                .route("/{idUser}", web::get().to(relations::friends_of)),
        )
        .service(
            web::scope("/trip-members")
                .route("", web::post().to(relations::create_trip_member))
                .route("", web::get().to(relations::list_trip_members))
                .route(
                    "/by/{field}/{value}",
                    web::get().to(relations::find_trip_members),
                )
                .route(
                    "/{idUser}/{idTrip}",
                    web::delete().to(relations::delete_trip_member),
                ),
        );
}

/// Create a configured HTTP server
///
/// Takes a database pool and bind address, then returns a fully configured
/// `Server` ready to be awaited.
///
/// # Example
/// ```ignore
/// let pool = web::Data::new(db::create_pool("trips.db", 64)?);
/// let server = server::create_http_server(pool, "127.0.0.1:4000")?;
/// server.await?;
/// ```
pub fn create_http_server(
    pool: web::Data<DbPool>,
    bind_addr: &str,
) -> std::io::Result<actix_web::dev::Server> {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}

/// Create a test HTTP server with an in-memory database
///
/// Binds to a random available port and returns the server together with
/// the address it is listening on.
pub fn create_test_http_server() -> std::io::Result<(actix_web::dev::Server, String)> {
    let pool = web::Data::new(crate::db::create_test_pool());

    let server = HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind("127.0.0.1:0")?;

    // Get the actual bind address (including the assigned port)
    let addr_str = server
        .addrs()
        .first()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "No bind address found"))?
        .to_string();

    Ok((server.run(), addr_str))
}
