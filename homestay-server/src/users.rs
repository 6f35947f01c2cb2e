use axum::{
    extract::{Path, State},
    routing::{get, patch, put},
    Json,
};
use homestay_core::{NewUser, Role, UserStatus};

use crate::{
    auth::{AdminSession, Session},
    context::ServerContext,
    errors::{ServerError, ServerResult},
    schemas::{SaveUserSchema, UpdateRoleSchema, ValidatedJson},
    serialized::{ToSerialized, User},
    Router,
};

#[utoipa::path(
    put,
    path = "/v1/users",
    tag = "users",
    request_body = SaveUserSchema,
    responses(
        (status = 200, body = User)
    )
)]
pub(crate) async fn save_user(
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<SaveUserSchema>,
) -> ServerResult<Json<User>> {
    let role = match body.role.as_deref() {
        Some(role) => Role::parse(role).ok_or(ServerError::InvalidInput("Unknown role"))?,
        None => Role::Guest,
    };

    let status = match body.status.as_deref() {
        Some(status) => {
            Some(UserStatus::parse(status).ok_or(ServerError::InvalidInput("Unknown status"))?)
        }
        None => None,
    };

    let user = context
        .marketplace
        .auth
        .save_user(NewUser {
            email: body.email,
            name: body.name,
            photo_url: body.photo_url,
            role,
            status,
        })
        .await?;

    Ok(Json(user.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/users/{email}",
    tag = "users",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = User)
    )
)]
pub(crate) async fn user(
    _session: Session,
    State(context): State<ServerContext>,
    Path(email): Path<String>,
) -> ServerResult<Json<User>> {
    let user = context.marketplace.auth.user_by_email(&email).await?;

    Ok(Json(user.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "users",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<User>)
    )
)]
pub(crate) async fn list_users(
    _session: AdminSession,
    State(context): State<ServerContext>,
) -> ServerResult<Json<Vec<User>>> {
    let users = context.marketplace.auth.list_users().await?;

    Ok(Json(users.to_serialized()))
}

#[utoipa::path(
    patch,
    path = "/v1/users/{email}/role",
    tag = "users",
    request_body = UpdateRoleSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = User)
    )
)]
pub(crate) async fn update_role(
    _session: AdminSession,
    State(context): State<ServerContext>,
    Path(email): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateRoleSchema>,
) -> ServerResult<Json<User>> {
    let role = Role::parse(&body.role).ok_or(ServerError::InvalidInput("Unknown role"))?;

    let user = context.marketplace.auth.update_role(&email, role).await?;

    Ok(Json(user.to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/", put(save_user))
        .route("/", get(list_users))
        .route("/:email", get(user))
        .route("/:email/role", patch(update_role))
}
