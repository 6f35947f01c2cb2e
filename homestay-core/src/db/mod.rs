use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

mod data;
pub use data::*;

mod memory;
pub use memory::*;

mod pg;
pub use pg::*;

pub type Result<T> = std::result::Result<T, DatabaseError>;
pub type BoxedDatabase = Box<dyn Database>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An unknown or internal error happened with the database
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
    /// A resource already exists
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        /// The resource in question
        resource: &'static str,
        /// The field that is conflicting
        field: &'static str,
        /// The conflicting value
        value: String,
    },
    /// A resource in the database doesn't exist
    #[error("{resource}:{identifier} doesn't exist")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
}

/// Helper trait to reduce boilerplate
pub trait IntoDatabaseError {
    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError;
    fn any(self) -> DatabaseError;
}

/// Helper trait to reduce boilerplate
pub trait DatabaseResult {
    /// Turns the Result into a conflict error if it's Ok()
    fn conflict_or_ok(self, resource: &'static str, field: &'static str, value: &str)
        -> Result<()>;
}

impl<T> DatabaseResult for Result<T> {
    fn conflict_or_ok(
        self,
        resource: &'static str,
        field: &'static str,
        value: &str,
    ) -> Result<()> {
        match self {
            Ok(_) => Err(DatabaseError::Conflict {
                resource,
                field,
                value: value.to_string(),
            }),
            Err(e) => match e {
                DatabaseError::NotFound {
                    resource: _,
                    identifier: _,
                } => Ok(()),
                e => Err(e),
            },
        }
    }
}

/// Represents a type that can fetch and store homestay data.
///
/// Every filter is a field-equality predicate, including the ones over the
/// embedded `host.email` and `guest.email` references. Listings return
/// records in insertion order.
#[async_trait]
pub trait Database: Send + Sync {
    async fn user_by_email(&self, email: &str) -> Result<UserData>;
    async fn create_user(&self, new_user: NewUser) -> Result<UserData>;
    async fn update_user_status(&self, email: &str, status: Option<UserStatus>)
        -> Result<UserData>;
    async fn update_user_role(
        &self,
        email: &str,
        role: Role,
        status: Option<UserStatus>,
    ) -> Result<UserData>;
    async fn list_users(&self) -> Result<Vec<UserData>>;
    async fn count_users(&self) -> Result<u64>;

    async fn room_by_id(&self, room_id: Uuid) -> Result<RoomData>;
    async fn list_rooms(&self, category: Option<&str>) -> Result<Vec<RoomData>>;
    async fn rooms_by_host_email(&self, email: &str) -> Result<Vec<RoomData>>;
    async fn create_room(&self, new_room: NewRoom) -> Result<RoomData>;
    async fn delete_room(&self, room_id: Uuid) -> Result<()>;
    /// Unconditionally sets the availability flag of a room
    async fn set_room_booked(&self, room_id: Uuid, booked: bool) -> Result<RoomData>;
    /// Atomically flips `booked` from false to true, returning whether this
    /// call won the flip
    async fn reserve_room(&self, room_id: Uuid) -> Result<bool>;
    async fn count_rooms(&self) -> Result<u64>;
    async fn count_rooms_by_host(&self, email: &str) -> Result<u64>;

    async fn booking_by_id(&self, booking_id: Uuid) -> Result<BookingData>;
    async fn create_booking(&self, new_booking: NewBooking) -> Result<BookingData>;
    async fn delete_booking(&self, booking_id: Uuid) -> Result<()>;
    async fn list_bookings(&self) -> Result<Vec<BookingData>>;
    async fn bookings_by_guest_email(&self, email: &str) -> Result<Vec<BookingData>>;
    async fn bookings_by_host_email(&self, email: &str) -> Result<Vec<BookingData>>;
    async fn count_bookings_for_room(&self, room_id: Uuid) -> Result<u64>;
}
