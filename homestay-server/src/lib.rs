mod auth;
mod bookings;
mod context;
mod docs;
mod errors;
pub mod logging;
mod payments;
mod rooms;
mod schemas;
mod serialized;
mod stats;
mod users;

use std::{
    env,
    net::{Ipv6Addr, SocketAddr},
};

use axum::routing::get;
use log::info;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use context::ServerContext;

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 8000;

pub type Router = axum::Router<ServerContext>;

/// Starts the homestay server
pub async fn run_server(context: ServerContext) {
    let port = env::var("HOMESTAY_SERVER_PORT")
        .map(|x| x.parse::<u16>().expect("Port must be a number"))
        .unwrap_or(DEFAULT_PORT);

    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, port).into();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let version_one_router = Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/rooms", rooms::router())
        .nest("/bookings", bookings::router())
        .nest("/stats", stats::router())
        .nest("/payments", payments::router());

    let root_router = Router::new()
        .nest("/v1", version_one_router)
        .route("/api.json", get(docs::docs))
        .layer(cors)
        .with_state(context);

    let listener = TcpListener::bind(&addr).await.expect("listens on address");

    info!("Listening on port {}", port);

    axum::serve(listener, root_router.into_make_service())
        .await
        .unwrap();
}
