use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json,
};
use homestay_core::{BookingRequest, DatabaseError, UserSummary};
use uuid::Uuid;

use crate::{
    auth::{HostSession, Session},
    context::ServerContext,
    errors::ServerResult,
    schemas::{NewBookingSchema, ValidatedJson},
    serialized::{Booking, SuccessResult, ToSerialized},
    Router,
};

#[utoipa::path(
    post,
    path = "/v1/bookings",
    tag = "bookings",
    request_body = NewBookingSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Booking),
        (status = 409, description = "The room is already booked")
    )
)]
pub(crate) async fn create_booking(
    Session(claim): Session,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<NewBookingSchema>,
) -> ServerResult<Json<Booking>> {
    let guest = match context.marketplace.auth.user_by_email(&claim.email).await {
        Ok(user) => UserSummary {
            email: user.email,
            name: user.name,
            photo_url: user.photo_url,
        },
        // A token can be valid before the account record is first saved
        Err(DatabaseError::NotFound {
            resource: _,
            identifier: _,
        }) => UserSummary {
            email: claim.email.clone(),
            name: claim.email.clone(),
            photo_url: None,
        },
        Err(e) => return Err(e.into()),
    };

    let booking = context
        .marketplace
        .bookings
        .create_booking(
            guest,
            BookingRequest {
                room_id: body.room_id,
                date: body.date,
                price: body.price,
            },
        )
        .await?;

    Ok(Json(booking.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/bookings/{id}",
    tag = "bookings",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = SuccessResult)
    )
)]
pub(crate) async fn delete_booking(
    Session(claim): Session,
    State(context): State<ServerContext>,
    Path(booking_id): Path<Uuid>,
) -> ServerResult<Json<SuccessResult>> {
    context
        .marketplace
        .bookings
        .delete_booking(&claim, booking_id)
        .await?;

    Ok(Json(SuccessResult { success: true }))
}

#[utoipa::path(
    get,
    path = "/v1/bookings/mine",
    tag = "bookings",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Booking>)
    )
)]
pub(crate) async fn my_bookings(
    Session(claim): Session,
    State(context): State<ServerContext>,
) -> ServerResult<Json<Vec<Booking>>> {
    let bookings = context
        .marketplace
        .bookings
        .bookings_by_guest(&claim.email)
        .await?;

    Ok(Json(bookings.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/bookings/hosted",
    tag = "bookings",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Booking>)
    )
)]
pub(crate) async fn hosted_bookings(
    HostSession(host): HostSession,
    State(context): State<ServerContext>,
) -> ServerResult<Json<Vec<Booking>>> {
    let bookings = context
        .marketplace
        .bookings
        .bookings_by_host(&host.email)
        .await?;

    Ok(Json(bookings.to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_booking))
        .route("/mine", get(my_bookings))
        .route("/hosted", get(hosted_bookings))
        .route("/:id", delete(delete_booking))
}
