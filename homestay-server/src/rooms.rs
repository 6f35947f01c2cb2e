use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
    Json,
};
use homestay_core::{IdentityClaim, NewRoom, UserSummary};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{HostSession, Session},
    context::ServerContext,
    errors::ServerResult,
    schemas::{AvailabilitySchema, NewRoomSchema, ValidatedJson},
    serialized::{Room, SuccessResult, ToSerialized},
    Router,
};

#[derive(Debug, Deserialize)]
pub(crate) struct RoomsQuery {
    category: Option<String>,
}

#[utoipa::path(
    get,
    path = "/v1/rooms",
    tag = "rooms",
    responses(
        (status = 200, body = Vec<Room>)
    )
)]
pub(crate) async fn list_rooms(
    State(context): State<ServerContext>,
    Query(query): Query<RoomsQuery>,
) -> ServerResult<Json<Vec<Room>>> {
    // The web client sends the literal string "null" when no category is picked
    let category = query
        .category
        .as_deref()
        .filter(|c| !c.is_empty() && *c != "null");

    let rooms = context.marketplace.bookings.list_rooms(category).await?;

    Ok(Json(rooms.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/rooms/mine",
    tag = "rooms",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Room>)
    )
)]
pub(crate) async fn my_listings(
    HostSession(host): HostSession,
    State(context): State<ServerContext>,
) -> ServerResult<Json<Vec<Room>>> {
    let rooms = context.marketplace.bookings.rooms_by_host(&host.email).await?;

    Ok(Json(rooms.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/rooms/{id}",
    tag = "rooms",
    responses(
        (status = 200, body = Room)
    )
)]
pub(crate) async fn room(
    State(context): State<ServerContext>,
    Path(room_id): Path<Uuid>,
) -> ServerResult<Json<Room>> {
    let room = context.marketplace.bookings.room_by_id(room_id).await?;

    Ok(Json(room.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/rooms",
    tag = "rooms",
    request_body = NewRoomSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Room)
    )
)]
pub(crate) async fn create_room(
    HostSession(host): HostSession,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<NewRoomSchema>,
) -> ServerResult<Json<Room>> {
    let new_room = NewRoom {
        title: body.title,
        location: body.location,
        category: body.category,
        price_per_night: body.price_per_night,
        description: body.description,
        image_url: body.image_url,
        host: UserSummary {
            email: host.email,
            name: host.name,
            photo_url: host.photo_url,
        },
    };

    let room = context.marketplace.bookings.create_room(new_room).await?;

    Ok(Json(room.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/rooms/{id}",
    tag = "rooms",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = SuccessResult)
    )
)]
pub(crate) async fn delete_room(
    HostSession(host): HostSession,
    State(context): State<ServerContext>,
    Path(room_id): Path<Uuid>,
) -> ServerResult<Json<SuccessResult>> {
    let claim = IdentityClaim { email: host.email };

    context
        .marketplace
        .bookings
        .delete_room(&claim, room_id)
        .await?;

    Ok(Json(SuccessResult { success: true }))
}

#[utoipa::path(
    patch,
    path = "/v1/rooms/{id}/availability",
    tag = "rooms",
    request_body = AvailabilitySchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Room)
    )
)]
pub(crate) async fn set_availability(
    Session(claim): Session,
    State(context): State<ServerContext>,
    Path(room_id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<AvailabilitySchema>,
) -> ServerResult<Json<Room>> {
    let room = context
        .marketplace
        .bookings
        .set_availability(&claim, room_id, body.booked)
        .await?;

    Ok(Json(room.to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_rooms))
        .route("/", post(create_room))
        .route("/mine", get(my_listings))
        .route("/:id", get(room))
        .route("/:id", delete(delete_room))
        .route("/:id/availability", patch(set_availability))
}
