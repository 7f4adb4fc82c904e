use crate::error::Result;
use crate::services::SubscriptionService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: Option<String>,
}

/// Add an email to the newsletter list
pub async fn subscribe(
    service: web::Data<SubscriptionService>,
    req: web::Json<SubscribeRequest>,
) -> Result<HttpResponse> {
    service.subscribe(req.email.as_deref()).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": "Successfully subscribed!",
    })))
}
