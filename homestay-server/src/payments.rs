use axum::{extract::State, routing::post, Json};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::ServerResult,
    schemas::{PaymentIntentSchema, ValidatedJson},
    serialized::{PaymentIntentResult, ToSerialized},
    Router,
};

#[utoipa::path(
    post,
    path = "/v1/payments/intent",
    tag = "payments",
    request_body = PaymentIntentSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = PaymentIntentResult)
    )
)]
pub(crate) async fn create_intent(
    _session: Session,
    State(context): State<ServerContext>,
    ValidatedJson(body): ValidatedJson<PaymentIntentSchema>,
) -> ServerResult<Json<PaymentIntentResult>> {
    let intent = context
        .marketplace
        .payments
        .create_intent(body.amount, &body.currency)
        .await?;

    Ok(Json(intent.to_serialized()))
}

pub fn router() -> Router {
    Router::new().route("/intent", post(create_intent))
}
