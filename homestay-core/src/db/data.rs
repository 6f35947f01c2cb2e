use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Platform-wide account roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Guest,
    Host,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Host => "host",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "guest" => Some(Role::Guest),
            "host" => Some(Role::Host),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Marker set on a guest account that has asked to become a host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    Requested,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Requested => "requested",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "requested" => Some(UserStatus::Requested),
            _ => None,
        }
    }
}

/// A homestay account
#[derive(Debug, Clone)]
pub struct UserData {
    /// The email is the sole identity key and never changes
    pub email: String,
    pub name: String,
    pub photo_url: Option<String>,
    pub role: Role,
    pub status: Option<UserStatus>,
    /// Set once, when the record is first saved
    pub created_at: DateTime<Utc>,
}

/// The embedded reference shape stored on rooms and bookings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub email: String,
    pub name: String,
    pub photo_url: Option<String>,
}

/// A listed room
#[derive(Debug, Clone)]
pub struct RoomData {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub category: String,
    pub price_per_night: f64,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Single source of truth for availability
    pub booked: bool,
    pub host: UserSummary,
    pub created_at: DateTime<Utc>,
}

/// A reservation of a room
#[derive(Debug, Clone)]
pub struct BookingData {
    pub id: Uuid,
    pub room_id: Uuid,
    pub guest: UserSummary,
    pub host: UserSummary,
    /// The stay date, used as the aggregation key for statistics
    pub date: DateTime<Utc>,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub photo_url: Option<String>,
    pub role: Role,
    pub status: Option<UserStatus>,
}

#[derive(Debug)]
pub struct NewRoom {
    pub title: String,
    pub location: String,
    pub category: String,
    pub price_per_night: f64,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub host: UserSummary,
}

#[derive(Debug)]
pub struct NewBooking {
    pub room_id: Uuid,
    pub guest: UserSummary,
    pub host: UserSummary,
    pub date: DateTime<Utc>,
    pub price: f64,
}
