use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    BookingData, Database, DatabaseError, IdentityClaim, NewBooking, NewRoom, RoomData, UserSummary,
};

/// Couples reservations to room availability and enforces ownership of both.
pub struct Bookings<Db> {
    db: Arc<Db>,
}

#[derive(Debug, Error)]
pub enum BookingError {
    /// The booking price must be a positive amount
    #[error("Booking price must be positive")]
    InvalidPrice,
    /// Another booking already holds the room
    #[error("Room is not available")]
    RoomUnavailable,
    /// The room still has bookings referencing it
    #[error("Room still has bookings")]
    RoomOccupied,
    /// The caller does not own the resource it is acting on
    #[error("unauthorized access")]
    Forbidden,
    /// Something else went wrong with the database
    #[error(transparent)]
    Db(DatabaseError),
}

/// A guest's request to book a room
#[derive(Debug)]
pub struct BookingRequest {
    pub room_id: Uuid,
    pub date: DateTime<Utc>,
    pub price: f64,
}

impl<Db> Bookings<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// Creates a booking, reserving the room first.
    ///
    /// The reservation is an atomic flip of the room's `booked` flag, so of
    /// two concurrent requests for the same room exactly one wins; the
    /// loser fails with [BookingError::RoomUnavailable] and writes nothing.
    /// The host reference is copied from the room record, never taken from
    /// the caller.
    pub async fn create_booking(
        &self,
        guest: UserSummary,
        request: BookingRequest,
    ) -> Result<BookingData, BookingError> {
        if !(request.price > 0.0) {
            return Err(BookingError::InvalidPrice);
        }

        let room = self
            .db
            .room_by_id(request.room_id)
            .await
            .map_err(BookingError::Db)?;

        let reserved = self.db.reserve_room(room.id).await.map_err(BookingError::Db)?;

        if !reserved {
            return Err(BookingError::RoomUnavailable);
        }

        let new_booking = NewBooking {
            room_id: room.id,
            guest,
            host: room.host.clone(),
            date: request.date,
            price: request.price,
        };

        match self.db.create_booking(new_booking).await {
            Ok(booking) => {
                info!("Room {} booked by {}", room.id, booking.guest.email);

                Ok(booking)
            }
            Err(e) => {
                // Release the reservation, the booking was never written
                if let Err(release) = self.db.set_room_booked(room.id, false).await {
                    warn!("Failed to release room {}: {}", room.id, release);
                }

                Err(BookingError::Db(e))
            }
        }
    }

    /// Deletes a booking and frees the room it held.
    ///
    /// Permitted to the booking's guest and to the host of the booked room.
    pub async fn delete_booking(
        &self,
        claim: &IdentityClaim,
        booking_id: Uuid,
    ) -> Result<(), BookingError> {
        let booking = self
            .db
            .booking_by_id(booking_id)
            .await
            .map_err(BookingError::Db)?;

        if claim.email != booking.guest.email && claim.email != booking.host.email {
            return Err(BookingError::Forbidden);
        }

        self.db
            .delete_booking(booking_id)
            .await
            .map_err(BookingError::Db)?;

        match self.db.set_room_booked(booking.room_id, false).await {
            // The room may have been deleted in the meantime
            Err(DatabaseError::NotFound {
                resource: _,
                identifier: _,
            }) => Ok(()),
            Err(e) => Err(BookingError::Db(e)),
            Ok(_) => Ok(()),
        }
    }

    /// Creates a room listing on behalf of a host
    pub async fn create_room(&self, new_room: NewRoom) -> Result<RoomData, BookingError> {
        let room = self.db.create_room(new_room).await.map_err(BookingError::Db)?;

        info!("Room {} listed by {}", room.id, room.host.email);

        Ok(room)
    }

    /// Deletes a room owned by the caller.
    ///
    /// Rejected while bookings still reference the room, so no booking is
    /// ever left pointing at a missing record.
    pub async fn delete_room(
        &self,
        claim: &IdentityClaim,
        room_id: Uuid,
    ) -> Result<(), BookingError> {
        let room = self.db.room_by_id(room_id).await.map_err(BookingError::Db)?;

        if room.host.email != claim.email {
            return Err(BookingError::Forbidden);
        }

        let dependents = self
            .db
            .count_bookings_for_room(room_id)
            .await
            .map_err(BookingError::Db)?;

        if dependents > 0 {
            return Err(BookingError::RoomOccupied);
        }

        self.db.delete_room(room_id).await.map_err(BookingError::Db)
    }

    /// Sets the availability flag of a room owned by the caller. Setting the
    /// same value twice is a no-op in effect.
    pub async fn set_availability(
        &self,
        claim: &IdentityClaim,
        room_id: Uuid,
        booked: bool,
    ) -> Result<RoomData, BookingError> {
        let room = self.db.room_by_id(room_id).await.map_err(BookingError::Db)?;

        if room.host.email != claim.email {
            return Err(BookingError::Forbidden);
        }

        self.db
            .set_room_booked(room_id, booked)
            .await
            .map_err(BookingError::Db)
    }

    /// Returns a room if it exists
    pub async fn room_by_id(&self, room_id: Uuid) -> Result<RoomData, DatabaseError> {
        self.db.room_by_id(room_id).await
    }

    /// Returns all rooms, optionally narrowed to a category
    pub async fn list_rooms(&self, category: Option<&str>) -> Result<Vec<RoomData>, DatabaseError> {
        self.db.list_rooms(category).await
    }

    /// Returns the rooms listed by a host
    pub async fn rooms_by_host(&self, email: &str) -> Result<Vec<RoomData>, DatabaseError> {
        self.db.rooms_by_host_email(email).await
    }

    /// Returns the bookings made by a guest
    pub async fn bookings_by_guest(&self, email: &str) -> Result<Vec<BookingData>, DatabaseError> {
        self.db.bookings_by_guest_email(email).await
    }

    /// Returns the bookings held against a host's rooms
    pub async fn bookings_by_host(&self, email: &str) -> Result<Vec<BookingData>, DatabaseError> {
        self.db.bookings_by_host_email(email).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::MemoryDatabase;

    fn summary(email: &str) -> UserSummary {
        UserSummary {
            email: email.to_string(),
            name: email.to_string(),
            photo_url: None,
        }
    }

    fn claim(email: &str) -> IdentityClaim {
        IdentityClaim {
            email: email.to_string(),
        }
    }

    fn new_room(host: &str) -> NewRoom {
        NewRoom {
            title: "Seaside cabin".to_string(),
            location: "Reine".to_string(),
            category: "cabin".to_string(),
            price_per_night: 120.0,
            description: None,
            image_url: None,
            host: summary(host),
        }
    }

    fn request(room_id: Uuid, price: f64) -> BookingRequest {
        BookingRequest {
            room_id,
            date: Utc::now(),
            price,
        }
    }

    async fn setup() -> (Arc<MemoryDatabase>, Bookings<MemoryDatabase>, RoomData) {
        let db = Arc::new(MemoryDatabase::new());
        let bookings = Bookings::new(&db);

        let room = bookings
            .create_room(new_room("host@x.com"))
            .await
            .expect("room is created");

        (db, bookings, room)
    }

    #[tokio::test]
    async fn test_booking_reserves_the_room() {
        let (db, bookings, room) = setup().await;

        bookings
            .create_booking(summary("guest@x.com"), request(room.id, 100.0))
            .await
            .expect("booking succeeds");

        let room = db.room_by_id(room.id).await.unwrap();
        assert!(room.booked, "room should be marked as booked");
    }

    #[tokio::test]
    async fn test_booked_room_cannot_be_booked_again() {
        let (db, bookings, room) = setup().await;

        bookings
            .create_booking(summary("first@x.com"), request(room.id, 100.0))
            .await
            .expect("first booking succeeds");

        let result = bookings
            .create_booking(summary("second@x.com"), request(room.id, 100.0))
            .await;

        assert!(
            matches!(result, Err(BookingError::RoomUnavailable)),
            "second booking should lose the reservation"
        );
        assert_eq!(
            db.list_bookings().await.unwrap().len(),
            1,
            "the losing booking must not be written"
        );
    }

    #[tokio::test]
    async fn test_booking_rejects_non_positive_price() {
        let (db, bookings, room) = setup().await;

        for price in [0.0, -10.0, f64::NAN] {
            let result = bookings
                .create_booking(summary("guest@x.com"), request(room.id, price))
                .await;

            assert!(
                matches!(result, Err(BookingError::InvalidPrice)),
                "price {price} should be rejected"
            );
        }

        let room = db.room_by_id(room.id).await.unwrap();
        assert!(!room.booked, "rejected bookings must not reserve the room");
    }

    #[tokio::test]
    async fn test_booking_host_comes_from_the_room() {
        let (_, bookings, room) = setup().await;

        let booking = bookings
            .create_booking(summary("guest@x.com"), request(room.id, 100.0))
            .await
            .expect("booking succeeds");

        assert_eq!(booking.host.email, "host@x.com");
        assert_eq!(booking.guest.email, "guest@x.com");
    }

    #[tokio::test]
    async fn test_deleting_a_booking_frees_the_room() {
        let (db, bookings, room) = setup().await;

        let booking = bookings
            .create_booking(summary("guest@x.com"), request(room.id, 100.0))
            .await
            .expect("booking succeeds");

        bookings
            .delete_booking(&claim("guest@x.com"), booking.id)
            .await
            .expect("guest deletes own booking");

        let room = db.room_by_id(room.id).await.unwrap();
        assert!(!room.booked, "room should be available again");
    }

    #[tokio::test]
    async fn test_host_may_delete_bookings_on_own_rooms() {
        let (_, bookings, room) = setup().await;

        let booking = bookings
            .create_booking(summary("guest@x.com"), request(room.id, 100.0))
            .await
            .expect("booking succeeds");

        bookings
            .delete_booking(&claim("host@x.com"), booking.id)
            .await
            .expect("host deletes booking on own room");
    }

    #[tokio::test]
    async fn test_stranger_may_not_delete_a_booking() {
        let (db, bookings, room) = setup().await;

        let booking = bookings
            .create_booking(summary("guest@x.com"), request(room.id, 100.0))
            .await
            .expect("booking succeeds");

        let result = bookings
            .delete_booking(&claim("stranger@x.com"), booking.id)
            .await;

        assert!(matches!(result, Err(BookingError::Forbidden)));
        assert_eq!(db.list_bookings().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_availability_toggle_requires_ownership() {
        let (db, bookings, room) = setup().await;

        let result = bookings
            .set_availability(&claim("stranger@x.com"), room.id, true)
            .await;

        assert!(
            matches!(result, Err(BookingError::Forbidden)),
            "only the owner may toggle availability"
        );

        let toggled = bookings
            .set_availability(&claim("host@x.com"), room.id, true)
            .await
            .expect("owner toggles availability");
        assert!(toggled.booked);

        // Setting the same value twice is a no-op in effect
        bookings
            .set_availability(&claim("host@x.com"), room.id, true)
            .await
            .expect("repeated toggle succeeds");
        assert!(db.room_by_id(room.id).await.unwrap().booked);
    }

    #[tokio::test]
    async fn test_room_deletion_requires_ownership() {
        let (_, bookings, room) = setup().await;

        let result = bookings.delete_room(&claim("stranger@x.com"), room.id).await;

        assert!(matches!(result, Err(BookingError::Forbidden)));
    }

    #[tokio::test]
    async fn test_occupied_room_cannot_be_deleted() {
        let (db, bookings, room) = setup().await;

        let booking = bookings
            .create_booking(summary("guest@x.com"), request(room.id, 100.0))
            .await
            .expect("booking succeeds");

        let result = bookings.delete_room(&claim("host@x.com"), room.id).await;
        assert!(
            matches!(result, Err(BookingError::RoomOccupied)),
            "deletion should be rejected while bookings reference the room"
        );

        bookings
            .delete_booking(&claim("guest@x.com"), booking.id)
            .await
            .expect("booking is deleted");

        bookings
            .delete_room(&claim("host@x.com"), room.id)
            .await
            .expect("empty room deletes");

        assert_eq!(db.count_rooms().await.unwrap(), 0);
    }
}
