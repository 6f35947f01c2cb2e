use axum::{extract::State, routing::get, Json};

use crate::{
    auth::{AdminSession, HostSession},
    context::ServerContext,
    errors::ServerResult,
    serialized::{HostStats, PlatformStats, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/stats/admin",
    tag = "stats",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = PlatformStats)
    )
)]
pub(crate) async fn platform_stats(
    _session: AdminSession,
    State(context): State<ServerContext>,
) -> ServerResult<Json<PlatformStats>> {
    let stats = context.marketplace.stats.platform_stats().await?;

    Ok(Json(stats.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/stats/host",
    tag = "stats",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = HostStats)
    )
)]
pub(crate) async fn host_stats(
    HostSession(host): HostSession,
    State(context): State<ServerContext>,
) -> ServerResult<Json<HostStats>> {
    // Scoped by the verified session, never by request input
    let stats = context.marketplace.stats.host_stats(&host.email).await?;

    Ok(Json(stats.to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/admin", get(platform_stats))
        .route("/host", get(host_stats))
}
