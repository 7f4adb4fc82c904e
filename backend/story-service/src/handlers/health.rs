use crate::db::Store;
use actix_web::{web, HttpResponse};

pub const SERVICE_NAME: &str = "story-service";

/// Liveness plus a write check on the data directory
pub async fn health_summary(store: web::Data<Store>) -> HttpResponse {
    match store.check_writable().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": SERVICE_NAME,
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "error": "data directory is not writable",
                "service": SERVICE_NAME
            }))
        }
    }
}
