/// Boost handlers - checkout session creation and the payment webhook
use crate::error::Result;
use crate::services::BoostService;
use actix_web::{web, HttpRequest, HttpResponse};

/// Header carrying the processor's webhook signature
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Start a paid boost for a story
pub async fn create_boost_session(
    boost: web::Data<BoostService>,
    story_id: web::Path<String>,
) -> Result<HttpResponse> {
    let session = boost.start_checkout(&story_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "id": session.id })))
}

/// Payment processor callback. The body is taken as raw bytes because the
/// signature covers them exactly.
pub async fn stripe_webhook(
    boost: web::Data<BoostService>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let outcome = boost.handle_webhook(&body, signature).await?;
    tracing::debug!(?outcome, "webhook acknowledged");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "received": true })))
}
