mod common;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use common::{TestContext, WEBHOOK_SECRET};
use serde_json::{json, Value};
use story_service::services::payments::webhook::compute_signature;

fn completed_event(story_id: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "id": "evt_test_1",
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": "cs_test_1",
            "object": "checkout.session",
            "metadata": { "storyId": story_id }
        }}
    }))
    .unwrap()
}

fn sign(payload: &[u8]) -> String {
    let now = chrono::Utc::now().timestamp();
    format!(
        "t={now},v1={}",
        compute_signature(WEBHOOK_SECRET, now, payload).unwrap()
    )
}

#[actix_web::test]
async fn boost_session_for_existing_story() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.register(cfg))).await;
    let story = ctx
        .stories
        .submit("Ada", "ada@example.com", "Boost me", "life", "Body")
        .await
        .unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/stories/{}/create-boost-session", story.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "id": format!("cs_test_{}", story.id) }));
    assert_eq!(ctx.gateway.calls(), 1);
}

#[actix_web::test]
async fn boost_session_for_unknown_story_skips_processor() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.register(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/stories/story-missing/create-boost-session")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(ctx.gateway.calls(), 0);
}

#[actix_web::test]
async fn processor_failure_is_a_server_error() {
    let ctx = TestContext::with_failing_gateway();
    let app = test::init_service(App::new().configure(|cfg| ctx.register(cfg))).await;
    let story = ctx
        .stories
        .submit("Ada", "ada@example.com", "Boost me", "life", "Body")
        .await
        .unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/stories/{}/create-boost-session", story.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let error: Value = test::read_body_json(resp).await;
    assert_eq!(error["error"], "Payment session creation failed.");
    assert!(!error.to_string().contains("card declined"));
}

#[actix_web::test]
async fn signed_completion_boosts_story() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.register(cfg))).await;
    let story = ctx
        .stories
        .submit("Ada", "ada@example.com", "Boost me", "life", "Body")
        .await
        .unwrap();

    let payload = completed_event(&story.id);
    let signature = sign(&payload);

    // Redelivery of the same event is acknowledged again
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/stories/stripe-webhook")
            .insert_header(("stripe-signature", signature.as_str()))
            .insert_header(("content-type", "application/json"))
            .set_payload(payload.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "received": true }));
    }

    assert!(ctx.stories.get(&story.id).await.unwrap().boosted);
}

#[actix_web::test]
async fn bad_signature_is_rejected_without_state_change() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.register(cfg))).await;
    let story = ctx
        .stories
        .submit("Ada", "ada@example.com", "Boost me", "life", "Body")
        .await
        .unwrap();

    let payload = completed_event(&story.id);
    let now = chrono::Utc::now().timestamp();
    let forged = format!(
        "t={now},v1={}",
        compute_signature("whsec_wrong", now, &payload).unwrap()
    );

    let req = test::TestRequest::post()
        .uri("/api/stories/stripe-webhook")
        .insert_header(("stripe-signature", forged.as_str()))
        .set_payload(payload.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error: Value = test::read_body_json(resp).await;
    assert!(error["error"].as_str().unwrap().starts_with("Webhook Error:"));

    let req = test::TestRequest::post()
        .uri("/api/stories/stripe-webhook")
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert!(!ctx.stories.get(&story.id).await.unwrap().boosted);
}

#[actix_web::test]
async fn completion_for_unknown_story_is_acknowledged() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.register(cfg))).await;

    let payload = completed_event("story-gone");
    let req = test::TestRequest::post()
        .uri("/api/stories/stripe-webhook")
        .insert_header(("stripe-signature", sign(&payload)))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(ctx.stories.list(None, None).await.unwrap().is_empty());
}
