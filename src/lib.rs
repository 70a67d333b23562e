/// Trip planner server library.
///
/// Persistence for users, trips, places, bookings, reviews, notifications,
/// friendships, trip membership and recommendation requests, plus the
/// actix-web routes exposing them.
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod server;
