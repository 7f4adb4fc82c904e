//! Shared fixtures for the HTTP tests: a temp-dir store and a fake payment
//! gateway wired the same way `main` wires the real one.
#![allow(dead_code)]

use actix_web::web;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use story_service::config::StripeConfig;
use story_service::db::Store;
use story_service::handlers;
use story_service::services::payments::{CheckoutSession, GatewayError, PaymentGateway};
use story_service::services::{BoostService, StoryService, SubscriptionService};
use tempfile::TempDir;

pub const WEBHOOK_SECRET: &str = "whsec_integration";
pub const PUBLISHABLE_KEY: &str = "pk_test_integration";

pub struct FakeGateway {
    fail: bool,
    calls: AtomicUsize,
}

impl FakeGateway {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_boost_session(&self, story_id: &str) -> Result<CheckoutSession, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(GatewayError::Rejected {
                status: 402,
                message: "card declined".into(),
            });
        }
        Ok(CheckoutSession {
            id: format!("cs_test_{story_id}"),
        })
    }
}

pub struct TestContext {
    pub dir: TempDir,
    pub store: web::Data<Store>,
    pub stories: web::Data<StoryService>,
    pub boost: web::Data<BoostService>,
    pub subscriptions: web::Data<SubscriptionService>,
    pub gateway: Arc<FakeGateway>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_gateway(false)
    }

    pub fn with_failing_gateway() -> Self {
        Self::with_gateway(true)
    }

    fn with_gateway(fail: bool) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let store = Arc::new(Store::open(dir.path()));
        let stories = Arc::new(StoryService::new(store.clone()));
        let gateway = Arc::new(FakeGateway {
            fail,
            calls: AtomicUsize::new(0),
        });
        let stripe = StripeConfig {
            secret_key: "sk_test_integration".into(),
            publishable_key: PUBLISHABLE_KEY.into(),
            webhook_secret: WEBHOOK_SECRET.into(),
            ..StripeConfig::default()
        };
        let boost = Arc::new(BoostService::new(stories.clone(), gateway.clone(), stripe));
        let subscriptions = Arc::new(SubscriptionService::new(store.clone()));

        Self {
            dir,
            store: web::Data::from(store),
            stories: web::Data::from(stories),
            boost: web::Data::from(boost),
            subscriptions: web::Data::from(subscriptions),
            gateway,
        }
    }

    /// App data plus the `/api` routes, for `App::configure`.
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.store.clone())
            .app_data(self.stories.clone())
            .app_data(self.boost.clone())
            .app_data(self.subscriptions.clone());
        handlers::configure_routes(cfg);
    }
}

pub fn story_body(title: &str, tag: &str) -> serde_json::Value {
    serde_json::json!({
        "name": "Ada",
        "email": "ada@example.com",
        "title": title,
        "tag": tag,
        "story": "x".repeat(200),
    })
}
