/// HTTP handlers for story-service
///
/// This module contains handlers for:
/// - Stories: list, fetch, submit, vote, public payment config
/// - Boost: checkout session creation and the payment webhook
/// - Newsletter: subscriptions
/// - Health: service status
///
/// `configure_routes` mounts everything under `/api`. Handlers expect the
/// services and the `Store` to be registered as app data.
pub mod boost;
pub mod health;
pub mod newsletter;
pub mod stories;

use crate::error::AppError;
use actix_web::web;

// Re-export handler functions at module level
pub use boost::{create_boost_session, stripe_webhook};
pub use health::health_summary;
pub use newsletter::subscribe;
pub use stories::{get_story, list_stories, public_config, submit_story, vote_story};

/// Register the `/api` routes and the JSON/query error handlers.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "rejected request body");
        AppError::ValidationError("Invalid JSON body.".into()).into()
    });
    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "rejected query string");
        AppError::ValidationError("Invalid query string.".into()).into()
    });

    cfg.app_data(json_config).app_data(query_config).service(
        web::scope("/api")
            .route("/health", web::get().to(health_summary))
            .route("/newsletter-subscribe", web::post().to(subscribe))
            .service(
                web::scope("/stories")
                    .service(
                        web::resource("")
                            .route(web::get().to(list_stories))
                            .route(web::post().to(submit_story)),
                    )
                    // Fixed paths before `/{story_id}`
                    .route("/config", web::get().to(public_config))
                    .route("/stripe-webhook", web::post().to(stripe_webhook))
                    .route("/{story_id}", web::get().to(get_story))
                    .route("/{story_id}/vote", web::post().to(vote_story))
                    .route(
                        "/{story_id}/create-boost-session",
                        web::post().to(create_boost_session),
                    ),
            ),
    );
}
