use std::borrow::BorrowMut;

use axum::{response::IntoResponse, Json};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::{auth, bookings, payments, rooms, schemas, serialized, stats, users};

#[derive(OpenApi)]
#[openapi(
    modifiers(&Security),
    info(
        description = "homestay-server exposes endpoints to interact with the homestay marketplace"
    ),
    paths(
        auth::issue_token,
        auth::logout,
        users::save_user,
        users::user,
        users::list_users,
        users::update_role,
        rooms::list_rooms,
        rooms::my_listings,
        rooms::room,
        rooms::create_room,
        rooms::delete_room,
        rooms::set_availability,
        bookings::create_booking,
        bookings::delete_booking,
        bookings::my_bookings,
        bookings::hosted_bookings,
        stats::platform_stats,
        stats::host_stats,
        payments::create_intent,
    ),
    components(schemas(
        schemas::TokenSchema,
        schemas::SaveUserSchema,
        schemas::UpdateRoleSchema,
        schemas::NewRoomSchema,
        schemas::NewBookingSchema,
        schemas::AvailabilitySchema,
        schemas::PaymentIntentSchema,
        serialized::User,
        serialized::UserSummary,
        serialized::Room,
        serialized::Booking,
        serialized::TokenResult,
        serialized::SuccessResult,
        serialized::PlatformStats,
        serialized::HostStats,
        serialized::PaymentIntentResult,
    ))
)]
pub struct ApiDoc;

struct Security;

impl Modify for Security {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.borrow_mut() {
            let scheme = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("Bearer <token>")
                .build();

            components.add_security_scheme("BearerAuth", SecurityScheme::Http(scheme))
        }
    }
}

pub async fn docs() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
