mod auth;
mod bookings;
mod credentials;
mod db;
mod payments;
mod stats;

use std::sync::Arc;

pub use auth::*;
pub use bookings::*;
pub use credentials::*;
pub use db::*;
pub use payments::*;
pub use stats::*;

/// The homestay marketplace system, facilitating authorization, bookings, statistics, and more.
pub struct Marketplace<P, Db> {
    pub auth: Auth<Db>,
    pub bookings: Bookings<Db>,
    pub stats: Stats<Db>,
    pub payments: Payments<P>,
}

pub struct MarketplaceConfig {
    /// Secret used to sign session tokens
    pub token_secret: String,
}

impl<P, Db> Marketplace<P, Db>
where
    P: PaymentGateway,
    Db: Database,
{
    pub fn new(config: MarketplaceConfig, gateway: P, database: Db) -> Self {
        let database = Arc::new(database);
        let gateway = Arc::new(gateway);

        let credentials = CredentialService::new(&config.token_secret);

        Self {
            auth: Auth::new(&database, credentials),
            bookings: Bookings::new(&database),
            stats: Stats::new(&database),
            payments: Payments::new(&gateway),
        }
    }
}
