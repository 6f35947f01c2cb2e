//! All schemas that are exposed from endpoints are defined here
//! along with the conversions from the core data types

use chrono::{DateTime, Utc};
use homestay_core::{
    BookingData, ChartEntry, HostStats as HostStatsData, PaymentIntent,
    PlatformStats as PlatformStatsData, RoomData, UserData, UserSummary as UserSummaryData,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    email: String,
    name: String,
    photo_url: Option<String>,
    role: String,
    status: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    email: String,
    name: String,
    photo_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    id: Uuid,
    title: String,
    location: String,
    category: String,
    price_per_night: f64,
    description: Option<String>,
    image_url: Option<String>,
    booked: bool,
    host: UserSummary,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    id: Uuid,
    room_id: Uuid,
    guest: UserSummary,
    host: UserSummary,
    date: DateTime<Utc>,
    price: f64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResult {
    pub success: bool,
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResult {
    pub success: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    total_users: u64,
    total_rooms: u64,
    total_bookings: u64,
    total_price: f64,
    #[schema(value_type = Vec<Object>)]
    chart: Vec<ChartEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HostStats {
    host_since: DateTime<Utc>,
    total_rooms: u64,
    total_bookings: u64,
    total_price: f64,
    #[schema(value_type = Vec<Object>)]
    chart: Vec<ChartEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResult {
    client_secret: String,
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl ToSerialized<User> for UserData {
    fn to_serialized(&self) -> User {
        User {
            email: self.email.clone(),
            name: self.name.clone(),
            photo_url: self.photo_url.clone(),
            role: self.role.as_str().to_string(),
            status: self.status.map(|s| s.as_str().to_string()),
            created_at: self.created_at,
        }
    }
}

impl ToSerialized<UserSummary> for UserSummaryData {
    fn to_serialized(&self) -> UserSummary {
        UserSummary {
            email: self.email.clone(),
            name: self.name.clone(),
            photo_url: self.photo_url.clone(),
        }
    }
}

impl ToSerialized<Room> for RoomData {
    fn to_serialized(&self) -> Room {
        Room {
            id: self.id,
            title: self.title.clone(),
            location: self.location.clone(),
            category: self.category.clone(),
            price_per_night: self.price_per_night,
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            booked: self.booked,
            host: self.host.to_serialized(),
            created_at: self.created_at,
        }
    }
}

impl ToSerialized<Booking> for BookingData {
    fn to_serialized(&self) -> Booking {
        Booking {
            id: self.id,
            room_id: self.room_id,
            guest: self.guest.to_serialized(),
            host: self.host.to_serialized(),
            date: self.date,
            price: self.price,
            created_at: self.created_at,
        }
    }
}

impl ToSerialized<PlatformStats> for PlatformStatsData {
    fn to_serialized(&self) -> PlatformStats {
        PlatformStats {
            total_users: self.total_users,
            total_rooms: self.total_rooms,
            total_bookings: self.total_bookings,
            total_price: self.total_price,
            chart: self.chart.clone(),
        }
    }
}

impl ToSerialized<HostStats> for HostStatsData {
    fn to_serialized(&self) -> HostStats {
        HostStats {
            host_since: self.host_since,
            total_rooms: self.total_rooms,
            total_bookings: self.total_bookings,
            total_price: self.total_price,
            chart: self.chart.clone(),
        }
    }
}

impl ToSerialized<PaymentIntentResult> for PaymentIntent {
    fn to_serialized(&self) -> PaymentIntentResult {
        PaymentIntentResult {
            client_secret: self.client_secret.clone(),
        }
    }
}
