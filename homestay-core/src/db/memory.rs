use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::{
    BookingData, Database, DatabaseError, NewBooking, NewRoom, NewUser, Result, Role, RoomData,
    UserData, UserStatus,
};

/// An in-memory database implementation, backing tests and local development.
///
/// Collections are plain vectors behind mutexes, so listings keep insertion
/// order and [MemoryDatabase::reserve_room] is serialized the same way the
/// postgres compare-and-set is.
#[derive(Default)]
pub struct MemoryDatabase {
    users: Mutex<Vec<UserData>>,
    rooms: Mutex<Vec<RoomData>>,
    bookings: Mutex<Vec<BookingData>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn user_by_email(&self, email: &str) -> Result<UserData> {
        self.users
            .lock()
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "email",
            })
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        let mut users = self.users.lock();

        if users.iter().any(|u| u.email == new_user.email) {
            return Err(DatabaseError::Conflict {
                resource: "user",
                field: "email",
                value: new_user.email,
            });
        }

        let user = UserData {
            email: new_user.email,
            name: new_user.name,
            photo_url: new_user.photo_url,
            role: new_user.role,
            status: new_user.status,
            created_at: Utc::now(),
        };

        users.push(user.clone());

        Ok(user)
    }

    async fn update_user_status(
        &self,
        email: &str,
        status: Option<UserStatus>,
    ) -> Result<UserData> {
        let mut users = self.users.lock();

        let user = users
            .iter_mut()
            .find(|u| u.email == email)
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "email",
            })?;

        user.status = status;

        Ok(user.clone())
    }

    async fn update_user_role(
        &self,
        email: &str,
        role: Role,
        status: Option<UserStatus>,
    ) -> Result<UserData> {
        let mut users = self.users.lock();

        let user = users
            .iter_mut()
            .find(|u| u.email == email)
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "email",
            })?;

        user.role = role;
        user.status = status;

        Ok(user.clone())
    }

    async fn list_users(&self) -> Result<Vec<UserData>> {
        Ok(self.users.lock().clone())
    }

    async fn count_users(&self) -> Result<u64> {
        Ok(self.users.lock().len() as u64)
    }

    async fn room_by_id(&self, room_id: Uuid) -> Result<RoomData> {
        self.rooms
            .lock()
            .iter()
            .find(|r| r.id == room_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "room",
                identifier: "id",
            })
    }

    async fn list_rooms(&self, category: Option<&str>) -> Result<Vec<RoomData>> {
        let rooms = self.rooms.lock();

        Ok(rooms
            .iter()
            .filter(|r| category.map(|c| r.category == c).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn rooms_by_host_email(&self, email: &str) -> Result<Vec<RoomData>> {
        let rooms = self.rooms.lock();

        Ok(rooms
            .iter()
            .filter(|r| r.host.email == email)
            .cloned()
            .collect())
    }

    async fn create_room(&self, new_room: NewRoom) -> Result<RoomData> {
        let room = RoomData {
            id: Uuid::new_v4(),
            title: new_room.title,
            location: new_room.location,
            category: new_room.category,
            price_per_night: new_room.price_per_night,
            description: new_room.description,
            image_url: new_room.image_url,
            booked: false,
            host: new_room.host,
            created_at: Utc::now(),
        };

        self.rooms.lock().push(room.clone());

        Ok(room)
    }

    async fn delete_room(&self, room_id: Uuid) -> Result<()> {
        let mut rooms = self.rooms.lock();

        let index =
            rooms
                .iter()
                .position(|r| r.id == room_id)
                .ok_or(DatabaseError::NotFound {
                    resource: "room",
                    identifier: "id",
                })?;

        rooms.remove(index);

        Ok(())
    }

    async fn set_room_booked(&self, room_id: Uuid, booked: bool) -> Result<RoomData> {
        let mut rooms = self.rooms.lock();

        let room = rooms
            .iter_mut()
            .find(|r| r.id == room_id)
            .ok_or(DatabaseError::NotFound {
                resource: "room",
                identifier: "id",
            })?;

        room.booked = booked;

        Ok(room.clone())
    }

    async fn reserve_room(&self, room_id: Uuid) -> Result<bool> {
        let mut rooms = self.rooms.lock();

        let room = rooms
            .iter_mut()
            .find(|r| r.id == room_id)
            .ok_or(DatabaseError::NotFound {
                resource: "room",
                identifier: "id",
            })?;

        if room.booked {
            return Ok(false);
        }

        room.booked = true;

        Ok(true)
    }

    async fn count_rooms(&self) -> Result<u64> {
        Ok(self.rooms.lock().len() as u64)
    }

    async fn count_rooms_by_host(&self, email: &str) -> Result<u64> {
        let rooms = self.rooms.lock();

        Ok(rooms.iter().filter(|r| r.host.email == email).count() as u64)
    }

    async fn booking_by_id(&self, booking_id: Uuid) -> Result<BookingData> {
        self.bookings
            .lock()
            .iter()
            .find(|b| b.id == booking_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "booking",
                identifier: "id",
            })
    }

    async fn create_booking(&self, new_booking: NewBooking) -> Result<BookingData> {
        let booking = BookingData {
            id: Uuid::new_v4(),
            room_id: new_booking.room_id,
            guest: new_booking.guest,
            host: new_booking.host,
            date: new_booking.date,
            price: new_booking.price,
            created_at: Utc::now(),
        };

        self.bookings.lock().push(booking.clone());

        Ok(booking)
    }

    async fn delete_booking(&self, booking_id: Uuid) -> Result<()> {
        let mut bookings = self.bookings.lock();

        let index = bookings.iter().position(|b| b.id == booking_id).ok_or(
            DatabaseError::NotFound {
                resource: "booking",
                identifier: "id",
            },
        )?;

        bookings.remove(index);

        Ok(())
    }

    async fn list_bookings(&self) -> Result<Vec<BookingData>> {
        Ok(self.bookings.lock().clone())
    }

    async fn bookings_by_guest_email(&self, email: &str) -> Result<Vec<BookingData>> {
        let bookings = self.bookings.lock();

        Ok(bookings
            .iter()
            .filter(|b| b.guest.email == email)
            .cloned()
            .collect())
    }

    async fn bookings_by_host_email(&self, email: &str) -> Result<Vec<BookingData>> {
        let bookings = self.bookings.lock();

        Ok(bookings
            .iter()
            .filter(|b| b.host.email == email)
            .cloned()
            .collect())
    }

    async fn count_bookings_for_room(&self, room_id: Uuid) -> Result<u64> {
        let bookings = self.bookings.lock();

        Ok(bookings.iter().filter(|b| b.room_id == room_id).count() as u64)
    }
}
