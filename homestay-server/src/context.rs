use std::sync::Arc;

use axum::extract::FromRef;
use homestay_core::{Marketplace, PgDatabase, StripeGateway};

#[derive(Clone, FromRef)]
pub struct ServerContext {
    pub marketplace: Arc<Marketplace<StripeGateway, PgDatabase>>,
}
