use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use std::io;
use std::sync::Arc;
use story_service::db::Store;
use story_service::handlers;
use story_service::services::{
    BoostService, PaymentGateway, StoryService, StripeClient, SubscriptionService,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Story Service
///
/// Serves the story site API under `/api`: stories, votes, paid boosts via
/// Stripe Checkout, and newsletter sign-ups. State lives in JSON files in
/// `DATA_DIR`.
///
/// Run with `healthcheck` as the only argument to probe a running instance,
/// for container health checks.
#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenvy::dotenv();

    // Support container healthchecks via CLI subcommand
    {
        let mut args = std::env::args();
        let _bin = args.next();
        if let Some(cmd) = args.next() {
            if cmd == "healthcheck" {
                let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
                let url = format!("http://127.0.0.1:{port}/api/health");
                match reqwest::Client::new().get(&url).send().await {
                    Ok(resp) if resp.status().is_success() => return Ok(()),
                    Ok(resp) => {
                        eprintln!("healthcheck HTTP status: {}", resp.status());
                        return Err(io::Error::new(io::ErrorKind::Other, "healthcheck failed"));
                    }
                    Err(e) => {
                        eprintln!("healthcheck HTTP error: {}", e);
                        return Err(io::Error::new(io::ErrorKind::Other, "healthcheck error"));
                    }
                }
            }
        }
    }

    // Load configuration; tracing format depends on it
    let config = story_service::Config::from_env();
    init_tracing(
        config
            .as_ref()
            .map(|cfg| cfg.app.is_production())
            .unwrap_or(false),
    );

    let config = match config {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting story-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    if config.stripe.webhook_secret.is_empty() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET not set; every webhook will be rejected");
    }
    if config.stripe.secret_key.is_empty() {
        tracing::warn!("STRIPE_SECRET_KEY not set; boost checkout is unavailable");
    }

    let store = Arc::new(Store::open(&config.storage.data_dir));
    store.initialize().await.map_err(|e| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("Failed to initialize record store: {e}"),
        )
    })?;
    tracing::info!(path = %store.data_dir().display(), "record store ready");

    let gateway: Arc<dyn PaymentGateway> = Arc::new(
        StripeClient::new(config.stripe.clone(), config.app.site_url.clone()).map_err(|e| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to build payment client: {e}"),
            )
        })?,
    );

    let stories = Arc::new(StoryService::new(store.clone()));
    let boost = Arc::new(BoostService::new(
        stories.clone(),
        gateway,
        config.stripe.clone(),
    ));
    let subscriptions = Arc::new(SubscriptionService::new(store.clone()));

    let store_data = web::Data::from(store);
    let stories_data = web::Data::from(stories);
    let boost_data = web::Data::from(boost);
    let subscriptions_data = web::Data::from(subscriptions);

    let http_bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", http_bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();
    let server = HttpServer::new(move || {
        // Build CORS configuration
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(store_data.clone())
            .app_data(stories_data.clone())
            .app_data(boost_data.clone())
            .app_data(subscriptions_data.clone())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure_routes)
    })
    .bind(&http_bind_address)?
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        result = server_task => {
            match result {
                Ok(Ok(())) => tracing::info!("HTTP server stopped"),
                Ok(Err(e)) => {
                    tracing::error!("HTTP server error: {}", e);
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!("HTTP server task join error: {}", e);
                    return Err(io::Error::new(io::ErrorKind::Other, e.to_string()));
                }
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
            server_handle.stop(true).await;
        }
    }

    tracing::info!("Story-service shutting down");
    Ok(())
}
