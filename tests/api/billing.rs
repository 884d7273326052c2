use crate::helpers::{
    get_json_response_body, json_str, signup, TestApp, WEBHOOK_SECRET,
};
use chrono::Utc;
use procapacity::{domain::WorkspaceId, services::stripe_webhook::signature_header};
use reqwest::StatusCode;
use secrecy::Secret;
use test_context::test_context;
use wiremock::{
    matchers::{body_string_contains, method, path},
    Mock, ResponseTemplate,
};

fn sign(payload: &str, timestamp: i64) -> String {
    signature_header(
        &Secret::new(WEBHOOK_SECRET.to_owned()),
        timestamp,
        payload.as_bytes(),
    )
    .expect("Failed to sign payload")
}

async fn deliver(app: &TestApp, event: serde_json::Value) -> reqwest::Response {
    let payload = event.to_string();
    app.post_webhook(&payload, &sign(&payload, Utc::now().timestamp()))
        .await
}

fn checkout_completed(workspace_id: &WorkspaceId) -> serde_json::Value {
    serde_json::json!({
        "id": "evt_checkout",
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "customer": "cus_123",
                "subscription": "sub_123",
                "client_reference_id": workspace_id.to_string(),
                "metadata": { "workspace_id": workspace_id.to_string(), "plan": "pro" }
            }
        }
    })
}

#[test_context(TestApp)]
#[tokio::test]
async fn billing_summary_reports_plan_and_usage(app: &mut TestApp) {
    signup(app, "Craggy Island").await;

    let response = app.get("/billing").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = get_json_response_body(response).await;
    assert_eq!(json_str(&body, "/plan"), "free");
    assert_eq!(json_str(&body, "/effectivePlan"), "free");
    assert_eq!(json_str(&body, "/billingStatus"), "trialing");
    assert_eq!(body["hasBillingAccount"], false);
    assert_eq!(body["limits"]["maxTeamMembers"], 5);
    assert_eq!(body["limits"]["csvImport"], false);
}

#[test_context(TestApp)]
#[tokio::test]
async fn webhooks_with_bad_signatures_are_rejected(app: &mut TestApp) {
    let session = signup(app, "Craggy Island").await;
    let payload = checkout_completed(&session.workspace_id).to_string();
    let now = Utc::now().timestamp();

    let test_cases = [
        String::from("garbage"),
        format!("t={now},v1=deadbeef"),
        sign(&payload, now - 301),
        format!("t={},v1=00", i64::MIN),
        format!("t={},v1=00", i64::MAX),
        signature_header(
            &Secret::new("whsec_other".to_owned()),
            now,
            payload.as_bytes(),
        )
        .unwrap(),
    ];
    for signature in test_cases.iter() {
        let response = app.post_webhook(&payload, signature).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "Failed for signature: {signature}"
        );
    }

    let response = app
        .http_client
        .post(app.url("/webhooks/stripe"))
        .body(payload)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let billing = get_json_response_body(app.get("/billing").await).await;
    assert_eq!(json_str(&billing, "/plan"), "free");
}

#[test_context(TestApp)]
#[tokio::test]
async fn malformed_but_signed_events_are_rejected(app: &mut TestApp) {
    for payload in ["not json", r#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{}}}"#] {
        let response = app
            .post_webhook(payload, &sign(payload, Utc::now().timestamp()))
            .await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "Failed for payload: {payload}"
        );
    }
}

#[test_context(TestApp)]
#[tokio::test]
async fn subscription_lifecycle_updates_the_workspace(app: &mut TestApp) {
    let session = signup(app, "Craggy Island").await;

    let response = deliver(app, checkout_completed(&session.workspace_id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_json_response_body(response).await["received"], true);

    let billing = get_json_response_body(app.get("/billing").await).await;
    assert_eq!(json_str(&billing, "/plan"), "pro");
    assert_eq!(json_str(&billing, "/billingStatus"), "active");
    assert_eq!(billing["hasBillingAccount"], true);

    let response = deliver(
        app,
        serde_json::json!({
            "id": "evt_updated",
            "type": "customer.subscription.updated",
            "data": {
                "object": {
                    "id": "sub_123",
                    "customer": "cus_123",
                    "status": "active",
                    "items": { "data": [{ "price": { "id": "price_agency" } }] }
                }
            }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let billing = get_json_response_body(app.get("/billing").await).await;
    assert_eq!(json_str(&billing, "/plan"), "agency");

    let response = deliver(
        app,
        serde_json::json!({
            "id": "evt_failed",
            "type": "invoice.payment_failed",
            "data": { "object": { "customer": "cus_123" } }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let billing = get_json_response_body(app.get("/billing").await).await;
    assert_eq!(json_str(&billing, "/billingStatus"), "past_due");

    let response = deliver(
        app,
        serde_json::json!({
            "id": "evt_deleted",
            "type": "customer.subscription.deleted",
            "data": {
                "object": { "id": "sub_123", "customer": "cus_123", "status": "canceled" }
            }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let billing = get_json_response_body(app.get("/billing").await).await;
    assert_eq!(json_str(&billing, "/plan"), "free");
    assert_eq!(json_str(&billing, "/billingStatus"), "canceled");
}

#[test_context(TestApp)]
#[tokio::test]
async fn unknown_customers_and_event_types_are_acknowledged(app: &mut TestApp) {
    let test_cases = [
        serde_json::json!({
            "id": "evt_1",
            "type": "invoice.payment_failed",
            "data": { "object": { "customer": "cus_nobody" } }
        }),
        serde_json::json!({
            "id": "evt_2",
            "type": "customer.created",
            "data": { "object": { "id": "cus_1" } }
        }),
        checkout_completed(&WorkspaceId::default()),
    ];
    for event in test_cases {
        let response = deliver(app, event.clone()).await;
        assert_eq!(response.status(), StatusCode::OK, "Failed for event: {event}");
    }
}

#[test_context(TestApp)]
#[tokio::test]
async fn checkout_and_portal_redirect_to_stripe(app: &mut TestApp) {
    let session = signup(app, "Craggy Island").await;

    Mock::given(path("/v1/checkout/sessions"))
        .and(method("POST"))
        .and(body_string_contains("price_pro"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({ "url": "https://checkout.stripe.com/c/pay_1" }),
        ))
        .expect(1)
        .mount(&app.payment_server)
        .await;

    let response = app
        .post("/billing/checkout", &serde_json::json!({ "plan": "pro" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_str(&get_json_response_body(response).await, "/url"),
        "https://checkout.stripe.com/c/pay_1"
    );

    let response = app
        .post("/billing/checkout", &serde_json::json!({ "plan": "free" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.post_empty("/billing/portal").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    deliver(app, checkout_completed(&session.workspace_id)).await;

    Mock::given(path("/v1/billing_portal/sessions"))
        .and(method("POST"))
        .and(body_string_contains("cus_123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({ "url": "https://billing.stripe.com/p/session_1" }),
        ))
        .expect(1)
        .mount(&app.payment_server)
        .await;

    let response = app.post_empty("/billing/portal").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_str(&get_json_response_body(response).await, "/url"),
        "https://billing.stripe.com/p/session_1"
    );
}

#[test_context(TestApp)]
#[tokio::test]
async fn stripe_failures_surface_as_502(app: &mut TestApp) {
    signup(app, "Craggy Island").await;

    Mock::given(path("/v1/checkout/sessions"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.payment_server)
        .await;

    let response = app
        .post("/billing/checkout", &serde_json::json!({ "plan": "starter" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
