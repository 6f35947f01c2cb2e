use std::{env, sync::Arc};

use homestay_core::{Marketplace, MarketplaceConfig, PgDatabase, StripeGateway};
use homestay_server::{logging, run_server, ServerContext};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init_logger();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL is set");
    let token_secret = env::var("HOMESTAY_TOKEN_SECRET").expect("HOMESTAY_TOKEN_SECRET is set");
    let stripe_key =
        env::var("HOMESTAY_STRIPE_SECRET_KEY").expect("HOMESTAY_STRIPE_SECRET_KEY is set");

    let database = PgDatabase::new(&database_url)
        .await
        .expect("database connects");
    let gateway = StripeGateway::new(stripe_key);

    let marketplace = Marketplace::new(MarketplaceConfig { token_secret }, gateway, database);

    run_server(ServerContext {
        marketplace: Arc::new(marketplace),
    })
    .await
}
