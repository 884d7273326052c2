use crate::helpers::{
    get_json_response_body, get_random_email, invite_token, json_str, login,
    logout, signup, TestApp, PASSWORD,
};
use chrono::{Duration, Utc};
use procapacity::domain::{Email, UserId, UserRole, WorkspaceInvite};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, Secret};
use test_context::test_context;

#[test_context(TestApp)]
#[tokio::test]
async fn invited_user_joins_the_workspace(app: &mut TestApp) {
    let session = signup(app, "Craggy Island").await;
    let email = get_random_email();

    let response = app
        .post("/invites", &serde_json::json!({ "email": email, "role": "member" }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = get_json_response_body(response).await;
    assert!(body.get("token").is_none());
    assert_eq!(json_str(&body, "/role"), "member");

    let response = app
        .post("/invites", &serde_json::json!({ "email": email, "role": "admin" }))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let pending = get_json_response_body(app.get("/invites").await).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let token = invite_token(app, &session.workspace_id, &email).await;
    let response = app.get(&format!("/invites/accept?token={token}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let details = get_json_response_body(response).await;
    assert_eq!(json_str(&details, "/workspaceName"), "Craggy Island");
    assert_eq!(json_str(&details, "/email"), email);

    logout(app).await;
    let accept = serde_json::json!({
        "token": token,
        "name": "Dougal McGuire",
        "password": PASSWORD
    });
    let response = app.post("/invites/accept", &accept).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = get_json_response_body(response).await;
    assert_eq!(json_str(&body, "/user/role"), "member");
    assert_eq!(
        json_str(&body, "/workspace/id"),
        session.workspace_id.to_string()
    );

    let me = get_json_response_body(app.get("/auth/me").await).await;
    assert_eq!(json_str(&me, "/user/email"), email);

    let response = app.post("/invites/accept", &accept).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .post(
            "/invites",
            &serde_json::json!({ "email": get_random_email(), "role": "member" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    logout(app).await;
    login(app, &email, PASSWORD).await;
}

#[test_context(TestApp)]
#[tokio::test]
async fn pending_invites_hold_user_seats(app: &mut TestApp) {
    signup(app, "Craggy Island").await;

    let response = app
        .post(
            "/invites",
            &serde_json::json!({ "email": get_random_email(), "role": "member" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let invite_id = json_str(&get_json_response_body(response).await, "/id");

    let second = serde_json::json!({ "email": get_random_email(), "role": "member" });
    let response = app.post("/invites", &second).await;
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

    let response = app.delete(&format!("/invites/{invite_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.delete(&format!("/invites/{invite_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.post("/invites", &second).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[test_context(TestApp)]
#[tokio::test]
async fn revoked_invites_cannot_be_used(app: &mut TestApp) {
    let session = signup(app, "Craggy Island").await;
    let email = get_random_email();

    let response = app
        .post("/invites", &serde_json::json!({ "email": email, "role": "admin" }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let invite_id = json_str(&get_json_response_body(response).await, "/id");
    let token = invite_token(app, &session.workspace_id, &email).await;

    let response = app.delete(&format!("/invites/{invite_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let pending = get_json_response_body(app.get("/invites").await).await;
    assert!(pending.as_array().unwrap().is_empty());

    let response = app.get(&format!("/invites/accept?token={token}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    logout(app).await;
    let response = app
        .post(
            "/invites/accept",
            &serde_json::json!({
                "token": token,
                "name": "Dougal McGuire",
                "password": PASSWORD
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .post_login(&serde_json::json!({ "email": email, "password": PASSWORD }))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_reject_invalid_invites(app: &mut TestApp) {
    let session = signup(app, "Craggy Island").await;

    let test_cases = [
        serde_json::json!({ "email": get_random_email(), "role": "owner" }),
        serde_json::json!({ "email": get_random_email(), "role": "bishop" }),
        serde_json::json!({ "email": "not-an-email", "role": "member" }),
    ];
    for test_case in test_cases.iter() {
        let response = app.post("/invites", test_case).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "Failed for input: {:?}",
            test_case
        );
    }

    let response = app
        .post(
            "/invites",
            &serde_json::json!({ "email": session.email, "role": "member" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    for token in ["short", "A1b2C3d4E5f6G7h8I9j0K1l2M3n4O5p6"] {
        let response = app.get(&format!("/invites/accept?token={token}")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "token: {token}");
    }
}

#[test_context(TestApp)]
#[tokio::test]
async fn expired_invites_cannot_be_accepted(app: &mut TestApp) {
    let session = signup(app, "Craggy Island").await;
    let owner_id = UserId::parse(&session.user_id).unwrap();

    let invite = WorkspaceInvite::new(
        session.workspace_id,
        Email::parse(Secret::new(get_random_email())).unwrap(),
        UserRole::Member,
        owner_id,
        Utc::now() - Duration::days(8),
    )
    .unwrap();
    let token = invite.token.as_ref().expose_secret().to_owned();
    app.workspace_store
        .write()
        .await
        .add_invite(invite)
        .await
        .unwrap();

    let response = app.get(&format!("/invites/accept?token={token}")).await;
    assert_eq!(response.status(), StatusCode::GONE);

    let response = app
        .post(
            "/invites/accept",
            &serde_json::json!({
                "token": token,
                "name": "Dougal McGuire",
                "password": PASSWORD
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::GONE);

    let pending = get_json_response_body(app.get("/invites").await).await;
    assert!(pending.as_array().unwrap().is_empty());
}
