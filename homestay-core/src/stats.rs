use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::{BookingData, Database, DatabaseError};

/// Read-only rollups over the booking records.
pub struct Stats<Db> {
    db: Arc<Db>,
}

/// One entry of the sales chart. Serializes as a two-element array, so a
/// series renders as `[["Day","Sales"],["5/3",120.0],...]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartEntry {
    Label(&'static str, &'static str),
    Point(String, f64),
}

/// Platform-wide totals, for the admin overview
#[derive(Debug)]
pub struct PlatformStats {
    pub total_users: u64,
    pub total_rooms: u64,
    pub total_bookings: u64,
    pub total_price: f64,
    pub chart: Vec<ChartEntry>,
}

/// Totals scoped to a single host
#[derive(Debug)]
pub struct HostStats {
    /// When the host account was first saved
    pub host_since: DateTime<Utc>,
    pub total_rooms: u64,
    pub total_bookings: u64,
    pub total_price: f64,
    pub chart: Vec<ChartEntry>,
}

impl<Db> Stats<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// Rolls up every booking on the platform
    pub async fn platform_stats(&self) -> Result<PlatformStats, DatabaseError> {
        let bookings = self.db.list_bookings().await?;
        let total_users = self.db.count_users().await?;
        let total_rooms = self.db.count_rooms().await?;

        Ok(PlatformStats {
            total_users,
            total_rooms,
            total_bookings: bookings.len() as u64,
            total_price: total_price(&bookings),
            chart: chart_series(&bookings),
        })
    }

    /// Rolls up the bookings held against a single host's rooms.
    ///
    /// The email must come from the caller's verified identity claim, never
    /// from request input, so one host cannot read another's numbers.
    pub async fn host_stats(&self, email: &str) -> Result<HostStats, DatabaseError> {
        let host = self.db.user_by_email(email).await?;
        let bookings = self.db.bookings_by_host_email(email).await?;
        let total_rooms = self.db.count_rooms_by_host(email).await?;

        Ok(HostStats {
            host_since: host.created_at,
            total_rooms,
            total_bookings: bookings.len() as u64,
            total_price: total_price(&bookings),
            chart: chart_series(&bookings),
        })
    }
}

/// One `day/month` entry per booking, headed by the axis labels.
///
/// Entries keep the order of the query result, and bookings on the same day
/// stay separate; folding them is left to the presentation layer.
fn chart_series(bookings: &[BookingData]) -> Vec<ChartEntry> {
    let mut series = vec![ChartEntry::Label("Day", "Sales")];

    series.extend(bookings.iter().map(|booking| {
        let day = format!("{}/{}", booking.date.day(), booking.date.month());

        ChartEntry::Point(day, booking.price)
    }));

    series
}

fn total_price(bookings: &[BookingData]) -> f64 {
    bookings.iter().map(|b| b.price).sum()
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;
    use crate::{
        Auth, AuthError, Bookings, BookingRequest, CredentialService, IdentityClaim, MemoryDatabase,
        NewRoom, NewUser, Role, UserSummary,
    };

    fn summary(email: &str) -> UserSummary {
        UserSummary {
            email: email.to_string(),
            name: email.to_string(),
            photo_url: None,
        }
    }

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: email.to_string(),
            photo_url: None,
            role,
            status: None,
        }
    }

    fn new_room(host: &str) -> NewRoom {
        NewRoom {
            title: "Loft".to_string(),
            location: "Bergen".to_string(),
            category: "loft".to_string(),
            price_per_night: 90.0,
            description: None,
            image_url: None,
            host: summary(host),
        }
    }

    fn date(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, month, day, 12, 0, 0).unwrap()
    }

    async fn book(
        db: &Arc<MemoryDatabase>,
        host: &str,
        guest: &str,
        month: u32,
        day: u32,
        price: f64,
    ) {
        let bookings = Bookings::new(db);

        let room = bookings
            .create_room(new_room(host))
            .await
            .expect("room is created");

        bookings
            .create_booking(
                summary(guest),
                BookingRequest {
                    room_id: room.id,
                    date: date(month, day),
                    price,
                },
            )
            .await
            .expect("booking succeeds");
    }

    #[tokio::test]
    async fn test_chart_series_shape() {
        let db = Arc::new(MemoryDatabase::new());
        let stats = Stats::new(&db);

        book(&db, "host@x.com", "g1@x.com", 3, 5, 120.0).await;
        book(&db, "host@x.com", "g2@x.com", 3, 5, 80.0).await;
        book(&db, "host@x.com", "g3@x.com", 12, 24, 200.0).await;

        let result = stats.platform_stats().await.expect("stats compute");

        assert_eq!(result.chart.len(), 4, "N bookings produce N+1 entries");
        assert_eq!(result.chart[0], ChartEntry::Label("Day", "Sales"));
        assert_eq!(result.chart[1], ChartEntry::Point("5/3".to_string(), 120.0));
        assert_eq!(
            result.chart[2],
            ChartEntry::Point("5/3".to_string(), 80.0),
            "same-day bookings stay separate entries"
        );
        assert_eq!(
            result.chart[3],
            ChartEntry::Point("24/12".to_string(), 200.0)
        );
    }

    #[test]
    fn test_chart_entries_serialize_as_pairs() {
        let series = chart_series(&[]);

        let json = serde_json::to_string(&series).expect("series serializes");

        assert_eq!(json, r#"[["Day","Sales"]]"#);
    }

    #[tokio::test]
    async fn test_total_price_is_the_exact_sum() {
        let db = Arc::new(MemoryDatabase::new());
        let stats = Stats::new(&db);

        let mut expected = 0.0;

        for (index, price) in [120.0, 80.5, 200.25].into_iter().enumerate() {
            book(&db, "host@x.com", "guest@x.com", 1, index as u32 + 1, price).await;
            expected += price;

            let result = stats.platform_stats().await.expect("stats compute");

            assert_eq!(
                result.total_price, expected,
                "total should grow with each booking"
            );
            assert_eq!(result.total_bookings, index as u64 + 1);
        }
    }

    #[tokio::test]
    async fn test_platform_stats_requires_an_admin_record() {
        let db = Arc::new(MemoryDatabase::new());
        let auth = Auth::new(&db, CredentialService::new("test secret"));
        let stats = Stats::new(&db);

        let token = auth.issue(IdentityClaim {
            email: "a@x.com".to_string(),
        });

        let gate = auth.authorize(Some(&token), Role::Admin).await;
        assert!(
            matches!(gate, Err(AuthError::Forbidden)),
            "an identity without a record must not reach the rollup"
        );

        auth.save_user(new_user("a@x.com", Role::Admin))
            .await
            .expect("admin is saved");

        auth.authorize(Some(&token), Role::Admin)
            .await
            .expect("admin passes the gate");

        let result = stats.platform_stats().await.expect("stats compute");
        assert!(result.total_users >= 1);
    }

    #[tokio::test]
    async fn test_host_stats_are_scoped_to_the_host() {
        let db = Arc::new(MemoryDatabase::new());
        let auth = Auth::new(&db, CredentialService::new("test secret"));
        let stats = Stats::new(&db);

        auth.save_user(new_user("a@x.com", Role::Host))
            .await
            .expect("host a is saved");
        auth.save_user(new_user("b@x.com", Role::Host))
            .await
            .expect("host b is saved");

        book(&db, "a@x.com", "guest@x.com", 2, 1, 100.0).await;
        book(&db, "b@x.com", "guest@x.com", 2, 2, 999.0).await;

        let result = stats.host_stats("a@x.com").await.expect("stats compute");

        assert_eq!(result.total_rooms, 1);
        assert_eq!(result.total_bookings, 1);
        assert_eq!(
            result.total_price, 100.0,
            "host a must not see host b's sales"
        );
        assert_eq!(result.chart.len(), 2);
    }

    #[tokio::test]
    async fn test_host_since_is_the_join_timestamp() {
        let db = Arc::new(MemoryDatabase::new());
        let auth = Auth::new(&db, CredentialService::new("test secret"));
        let stats = Stats::new(&db);

        let saved = auth
            .save_user(new_user("a@x.com", Role::Host))
            .await
            .expect("host is saved");

        let result = stats.host_stats("a@x.com").await.expect("stats compute");

        assert_eq!(result.host_since, saved.created_at);
    }
}
