use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, Error as SqlxError, PgPool, Row};
use uuid::Uuid;

use crate::{
    BookingData, Database, DatabaseError, DatabaseResult, IntoDatabaseError, NewBooking, NewRoom,
    NewUser, Result, Role, RoomData, UserData, UserStatus, UserSummary,
};

/// A postgres database implementation for homestay
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    pub async fn new(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        Ok(Self { pool })
    }
}

fn user_from_row(row: &PgRow) -> Result<UserData> {
    let role: String = row.try_get("role").map_err(|e| e.any())?;
    let status: Option<String> = row.try_get("status").map_err(|e| e.any())?;

    Ok(UserData {
        email: row.try_get("email").map_err(|e| e.any())?,
        name: row.try_get("name").map_err(|e| e.any())?,
        photo_url: row.try_get("photo_url").map_err(|e| e.any())?,
        role: Role::parse(&role)
            .ok_or_else(|| DatabaseError::Internal(format!("unknown role {role}").into()))?,
        status: status.as_deref().and_then(UserStatus::parse),
        created_at: row.try_get("created_at").map_err(|e| e.any())?,
    })
}

fn room_from_row(row: &PgRow) -> Result<RoomData> {
    Ok(RoomData {
        id: row.try_get("id").map_err(|e| e.any())?,
        title: row.try_get("title").map_err(|e| e.any())?,
        location: row.try_get("location").map_err(|e| e.any())?,
        category: row.try_get("category").map_err(|e| e.any())?,
        price_per_night: row.try_get("price_per_night").map_err(|e| e.any())?,
        description: row.try_get("description").map_err(|e| e.any())?,
        image_url: row.try_get("image_url").map_err(|e| e.any())?,
        booked: row.try_get("booked").map_err(|e| e.any())?,
        host: UserSummary {
            email: row.try_get("host_email").map_err(|e| e.any())?,
            name: row.try_get("host_name").map_err(|e| e.any())?,
            photo_url: row.try_get("host_photo_url").map_err(|e| e.any())?,
        },
        created_at: row.try_get("created_at").map_err(|e| e.any())?,
    })
}

fn booking_from_row(row: &PgRow) -> Result<BookingData> {
    Ok(BookingData {
        id: row.try_get("id").map_err(|e| e.any())?,
        room_id: row.try_get("room_id").map_err(|e| e.any())?,
        guest: UserSummary {
            email: row.try_get("guest_email").map_err(|e| e.any())?,
            name: row.try_get("guest_name").map_err(|e| e.any())?,
            photo_url: row.try_get("guest_photo_url").map_err(|e| e.any())?,
        },
        host: UserSummary {
            email: row.try_get("host_email").map_err(|e| e.any())?,
            name: row.try_get("host_name").map_err(|e| e.any())?,
            photo_url: row.try_get("host_photo_url").map_err(|e| e.any())?,
        },
        date: row.try_get("date").map_err(|e| e.any())?,
        price: row.try_get("price").map_err(|e| e.any())?,
        created_at: row.try_get("created_at").map_err(|e| e.any())?,
    })
}

#[async_trait]
impl Database for PgDatabase {
    async fn user_by_email(&self, email: &str) -> Result<UserData> {
        let row = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "email"))?;

        user_from_row(&row)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        self.user_by_email(&new_user.email)
            .await
            .conflict_or_ok("user", "email", &new_user.email)?;

        sqlx::query(
            "INSERT INTO users (email, name, photo_url, role, status) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&new_user.email)
        .bind(&new_user.name)
        .bind(&new_user.photo_url)
        .bind(new_user.role.as_str())
        .bind(new_user.status.map(|s| s.as_str()))
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.user_by_email(&new_user.email).await
    }

    async fn update_user_status(
        &self,
        email: &str,
        status: Option<UserStatus>,
    ) -> Result<UserData> {
        // Ensure user exists
        let _ = self.user_by_email(email).await?;

        sqlx::query("UPDATE users SET status = $1 WHERE email = $2")
            .bind(status.map(|s| s.as_str()))
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        self.user_by_email(email).await
    }

    async fn update_user_role(
        &self,
        email: &str,
        role: Role,
        status: Option<UserStatus>,
    ) -> Result<UserData> {
        // Ensure user exists
        let _ = self.user_by_email(email).await?;

        sqlx::query("UPDATE users SET role = $1, status = $2 WHERE email = $3")
            .bind(role.as_str())
            .bind(status.map(|s| s.as_str()))
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        self.user_by_email(email).await
    }

    async fn list_users(&self) -> Result<Vec<UserData>> {
        sqlx::query("SELECT * FROM users ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?
            .iter()
            .map(user_from_row)
            .collect()
    }

    async fn count_users(&self) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())?;

        let count: i64 = row.try_get(0).map_err(|e| e.any())?;

        Ok(count as u64)
    }

    async fn room_by_id(&self, room_id: Uuid) -> Result<RoomData> {
        let row = sqlx::query("SELECT * FROM rooms WHERE id = $1")
            .bind(room_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("room", "id"))?;

        room_from_row(&row)
    }

    async fn list_rooms(&self, category: Option<&str>) -> Result<Vec<RoomData>> {
        let rows = match category {
            Some(category) => {
                sqlx::query("SELECT * FROM rooms WHERE category = $1 ORDER BY created_at")
                    .bind(category)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query("SELECT * FROM rooms ORDER BY created_at")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| e.any())?;

        rows.iter().map(room_from_row).collect()
    }

    async fn rooms_by_host_email(&self, email: &str) -> Result<Vec<RoomData>> {
        sqlx::query("SELECT * FROM rooms WHERE host_email = $1 ORDER BY created_at")
            .bind(email)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?
            .iter()
            .map(room_from_row)
            .collect()
    }

    async fn create_room(&self, new_room: NewRoom) -> Result<RoomData> {
        let id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO rooms
                (id, title, location, category, price_per_night, description,
                 image_url, booked, host_email, host_name, host_photo_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, false, $8, $9, $10)",
        )
        .bind(id)
        .bind(&new_room.title)
        .bind(&new_room.location)
        .bind(&new_room.category)
        .bind(new_room.price_per_night)
        .bind(&new_room.description)
        .bind(&new_room.image_url)
        .bind(&new_room.host.email)
        .bind(&new_room.host.name)
        .bind(&new_room.host.photo_url)
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.room_by_id(id).await
    }

    async fn delete_room(&self, room_id: Uuid) -> Result<()> {
        // Ensure room exists
        let _ = self.room_by_id(room_id).await?;

        sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(room_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn set_room_booked(&self, room_id: Uuid, booked: bool) -> Result<RoomData> {
        // Ensure room exists
        let _ = self.room_by_id(room_id).await?;

        sqlx::query("UPDATE rooms SET booked = $1 WHERE id = $2")
            .bind(booked)
            .bind(room_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        self.room_by_id(room_id).await
    }

    async fn reserve_room(&self, room_id: Uuid) -> Result<bool> {
        // Ensure room exists, so a missing room is NotFound rather than false
        let _ = self.room_by_id(room_id).await?;

        let result = sqlx::query("UPDATE rooms SET booked = true WHERE id = $1 AND booked = false")
            .bind(room_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        Ok(result.rows_affected() == 1)
    }

    async fn count_rooms(&self) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) FROM rooms")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())?;

        let count: i64 = row.try_get(0).map_err(|e| e.any())?;

        Ok(count as u64)
    }

    async fn count_rooms_by_host(&self, email: &str) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) FROM rooms WHERE host_email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())?;

        let count: i64 = row.try_get(0).map_err(|e| e.any())?;

        Ok(count as u64)
    }

    async fn booking_by_id(&self, booking_id: Uuid) -> Result<BookingData> {
        let row = sqlx::query("SELECT * FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("booking", "id"))?;

        booking_from_row(&row)
    }

    async fn create_booking(&self, new_booking: NewBooking) -> Result<BookingData> {
        let id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO bookings
                (id, room_id, guest_email, guest_name, guest_photo_url,
                 host_email, host_name, host_photo_url, date, price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(id)
        .bind(new_booking.room_id)
        .bind(&new_booking.guest.email)
        .bind(&new_booking.guest.name)
        .bind(&new_booking.guest.photo_url)
        .bind(&new_booking.host.email)
        .bind(&new_booking.host.name)
        .bind(&new_booking.host.photo_url)
        .bind(new_booking.date)
        .bind(new_booking.price)
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.booking_by_id(id).await
    }

    async fn delete_booking(&self, booking_id: Uuid) -> Result<()> {
        // Ensure booking exists
        let _ = self.booking_by_id(booking_id).await?;

        sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(booking_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn list_bookings(&self) -> Result<Vec<BookingData>> {
        sqlx::query("SELECT * FROM bookings ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?
            .iter()
            .map(booking_from_row)
            .collect()
    }

    async fn bookings_by_guest_email(&self, email: &str) -> Result<Vec<BookingData>> {
        sqlx::query("SELECT * FROM bookings WHERE guest_email = $1 ORDER BY created_at")
            .bind(email)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?
            .iter()
            .map(booking_from_row)
            .collect()
    }

    async fn bookings_by_host_email(&self, email: &str) -> Result<Vec<BookingData>> {
        sqlx::query("SELECT * FROM bookings WHERE host_email = $1 ORDER BY created_at")
            .bind(email)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?
            .iter()
            .map(booking_from_row)
            .collect()
    }

    async fn count_bookings_for_room(&self, room_id: Uuid) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) FROM bookings WHERE room_id = $1")
            .bind(room_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())?;

        let count: i64 = row.try_get(0).map_err(|e| e.any())?;

        Ok(count as u64)
    }
}

impl IntoDatabaseError for SqlxError {
    fn any(self) -> DatabaseError {
        DatabaseError::Internal(Box::new(self))
    }

    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError {
        match self {
            SqlxError::RowNotFound => DatabaseError::NotFound {
                resource,
                identifier,
            },
            e => Self::any(e),
        }
    }
}
