/// Data models for database operations.
/// Stored records, create inputs and partial-update patches for every entity kind.
use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Default page size for list queries
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Upper bound on a single page
pub const MAX_PAGE_LIMIT: u32 = 1000;

/// The record types managed by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    User,
    Trip,
    Place,
    Booking,
    Review,
    Notification,
    Friend,
    TripMember,
    AiRecommendation,
    Detail,
}

impl EntityKind {
    pub const ALL: [EntityKind; 10] = [
        EntityKind::User,
        EntityKind::Trip,
        EntityKind::Place,
        EntityKind::Booking,
        EntityKind::Review,
        EntityKind::Notification,
        EntityKind::Friend,
        EntityKind::TripMember,
        EntityKind::AiRecommendation,
        EntityKind::Detail,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Trip => "Trip",
            EntityKind::Place => "Place",
            EntityKind::Booking => "Booking",
            EntityKind::Review => "Review",
            EntityKind::Notification => "Notification",
            EntityKind::Friend => "Friend",
            EntityKind::TripMember => "TripMember",
            EntityKind::AiRecommendation => "AIRecommendation",
            EntityKind::Detail => "DetailInformation",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Trip => "trips",
            EntityKind::Place => "places",
            EntityKind::Booking => "bookings",
            EntityKind::Review => "reviews",
            EntityKind::Notification => "notifications",
            EntityKind::Friend => "friends",
            EntityKind::TripMember => "trip_members",
            EntityKind::AiRecommendation => "ai_recommendations",
            EntityKind::Detail => "details",
        }
    }

    /// Resolve the kind from the target of a SQLite constraint message,
    /// e.g. `users.username` or `index 'friends_unordered_pair'`.
    pub fn from_constraint_target(target: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| {
            let table = kind.table();
            target.starts_with(&format!("{table}."))
                || target.starts_with(&format!("index '{table}_"))
        })
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Booking lifecycle: Pending -> Success | Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum BookingStatus {
    #[default]
    Pending,
    Success,
    Failed,
}

impl BookingStatus {
    pub fn code(self) -> i64 {
        match self {
            BookingStatus::Pending => 0,
            BookingStatus::Success => 1,
            BookingStatus::Failed => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }

    /// Pending may move to either terminal state; re-setting the current
    /// status is always allowed.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        self == next || !self.is_terminal()
    }
}

impl TryFrom<i64> for BookingStatus {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(BookingStatus::Pending),
            1 => Ok(BookingStatus::Success),
            2 => Ok(BookingStatus::Failed),
            other => Err(format!("unknown booking status {other}")),
        }
    }
}

impl From<BookingStatus> for i64 {
    fn from(status: BookingStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Success => "Success",
            BookingStatus::Failed => "Failed",
        };
        f.write_str(name)
    }
}

impl ToSql for BookingStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for BookingStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = value.as_i64()?;
        BookingStatus::try_from(code).map_err(|_| FromSqlError::OutOfRange(code))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id_user: String,
    pub name: String,
    pub username: String,
    /// Hashed upstream; never echoed back over HTTP
    #[serde(skip_serializing, default)]
    pub password: String,
    pub gender: Option<i64>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default, with = "base64_bytes")]
    pub avatar: Option<Vec<u8>>,
    pub theme: i64,
    pub language: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub gender: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, with = "base64_bytes")]
    pub avatar: Option<Vec<u8>>,
    #[serde(default)]
    pub theme: Option<i64>,
    #[serde(default)]
    pub language: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub gender: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable_base64")]
    pub avatar: Option<Option<Vec<u8>>>,
    pub theme: Option<i64>,
    pub language: Option<i64>,
}

impl UserPatch {
    pub fn apply_to(&self, user: &mut User) {
        set(&mut user.name, &self.name);
        set(&mut user.username, &self.username);
        set(&mut user.password, &self.password);
        set(&mut user.gender, &self.gender);
        set(&mut user.email, &self.email);
        set(&mut user.phone, &self.phone);
        set(&mut user.avatar, &self.avatar);
        set(&mut user.theme, &self.theme);
        set(&mut user.language, &self.language);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id_trip: String,
    pub name: String,
    pub start_date: NaiveDateTime,
    /// `None` while the trip is ongoing
    pub end_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    pub name: String,
    pub start_date: NaiveDateTime,
    #[serde(default)]
    pub end_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPatch {
    pub name: Option<String>,
    pub start_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "nullable")]
    pub end_date: Option<Option<NaiveDateTime>>,
}

impl TripPatch {
    pub fn apply_to(&self, trip: &mut Trip) {
        set(&mut trip.name, &self.name);
        set(&mut trip.start_date, &self.start_date);
        set(&mut trip.end_date, &self.end_date);
    }
}

/// Trip search filter. The date window applies only when both bounds are
/// given and keeps trips lying entirely inside it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripSearch {
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id_place: String,
    pub name: String,
    pub country: String,
    pub city: String,
    pub province: Option<String>,
    pub address: String,
    pub description: Option<String>,
    /// Image URL
    pub image: Option<String>,
    pub rating: i64,
    #[serde(rename = "type")]
    pub place_type: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlace {
    pub name: String,
    pub country: String,
    pub city: String,
    #[serde(default)]
    pub province: Option<String>,
    pub address: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub rating: i64,
    #[serde(rename = "type")]
    pub place_type: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacePatch {
    pub name: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub province: Option<Option<String>>,
    pub address: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub image: Option<Option<String>>,
    pub rating: Option<i64>,
    #[serde(rename = "type")]
    pub place_type: Option<i64>,
}

impl PlacePatch {
    pub fn apply_to(&self, place: &mut Place) {
        set(&mut place.name, &self.name);
        set(&mut place.country, &self.country);
        set(&mut place.city, &self.city);
        set(&mut place.province, &self.province);
        set(&mut place.address, &self.address);
        set(&mut place.description, &self.description);
        set(&mut place.image, &self.image);
        set(&mut place.rating, &self.rating);
        set(&mut place.place_type, &self.place_type);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceSearch {
    #[serde(default, alias = "query")]
    pub keyword: String,
    #[serde(default)]
    pub place_type: Option<i64>,
    #[serde(default)]
    pub min_rating: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id_booking: String,
    pub id_user: String,
    pub id_place: String,
    pub date: NaiveDateTime,
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub id_user: String,
    pub id_place: String,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub status: BookingStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPatch {
    pub id_user: Option<String>,
    pub id_place: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub status: Option<BookingStatus>,
}

impl BookingPatch {
    pub fn apply_to(&self, booking: &mut Booking) {
        set(&mut booking.id_user, &self.id_user);
        set(&mut booking.id_place, &self.id_place);
        set(&mut booking.date, &self.date);
        set(&mut booking.status, &self.status);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id_review: String,
    pub id_trip: String,
    pub id_user: String,
    pub comment: Option<String>,
    pub rating: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub id_trip: String,
    pub id_user: String,
    #[serde(default)]
    pub comment: Option<String>,
    pub rating: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub comment: Option<Option<String>>,
    pub rating: Option<i64>,
}

impl ReviewPatch {
    pub fn apply_to(&self, review: &mut Review) {
        set(&mut review.comment, &self.comment);
        set(&mut review.rating, &self.rating);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id_notify: String,
    pub id_user: String,
    pub content: String,
    pub is_read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub id_user: String,
    pub content: String,
    #[serde(default)]
    pub is_read: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPatch {
    pub content: Option<String>,
    pub is_read: Option<bool>,
}

impl NotificationPatch {
    pub fn apply_to(&self, notification: &mut Notification) {
        set(&mut notification.content, &self.content);
        set(&mut notification.is_read, &self.is_read);
    }
}

/// Friendship request from `id_self` to `id_friend`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub id_self: String,
    pub id_friend: String,
    pub is_accept: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFriend {
    pub id_self: String,
    pub id_friend: String,
    #[serde(default)]
    pub is_accept: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripMember {
    pub id_user: String,
    pub id_trip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiRecommendation {
    #[serde(rename = "idAIRec")]
    pub id_ai_rec: String,
    pub id_user: String,
    pub input: String,
    /// Filled in by the external recommendation service
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAiRecommendation {
    pub id_user: String,
    pub input: String,
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRecommendationPatch {
    pub input: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub output: Option<Option<String>>,
}

impl AiRecommendationPatch {
    pub fn apply_to(&self, recommendation: &mut AiRecommendation) {
        set(&mut recommendation.input, &self.input);
        set(&mut recommendation.output, &self.output);
    }
}

/// One itinerary entry: a visit to a place during a trip
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Detail {
    pub id_detail: String,
    pub id_trip: String,
    pub id_place: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDetail {
    pub id_trip: String,
    pub id_place: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(default)]
    pub note: Option<String>,
}

/// Only the schedule and note of an entry can change
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailPatch {
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "nullable")]
    pub note: Option<Option<String>>,
}

impl DetailPatch {
    pub fn apply_to(&self, detail: &mut Detail) {
        set(&mut detail.start_time, &self.start_time);
        set(&mut detail.end_time, &self.end_time);
        set(&mut detail.note, &self.note);
    }
}

/// Offset pagination for list queries
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

fn set<T: Clone>(field: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *field = value.clone();
    }
}

/// Keeps an explicit `null` apart from an absent field: absent stays
/// `None` through `#[serde(default)]`, `null` becomes `Some(None)`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn nullable_base64<'de, D>(deserializer: D) -> Result<Option<Option<Vec<u8>>>, D::Error>
where
    D: Deserializer<'de>,
{
    base64_bytes::deserialize(deserializer).map(Some)
}

/// Binary columns travel as standard base64 strings in JSON.
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match bytes {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|encoded| STANDARD.decode(encoded).map_err(de::Error::custom))
            .transpose()
    }
}
