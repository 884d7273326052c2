use crate::helpers::{
    get_json_response_body, invite_and_accept, json_str, login, logout,
    signup, TestApp, PASSWORD,
};
use reqwest::StatusCode;
use test_context::test_context;

#[test_context(TestApp)]
#[tokio::test]
async fn admins_cannot_manage_owners(app: &mut TestApp) {
    let session = signup(app, "Craggy Island").await;
    let (_, admin_id) =
        invite_and_accept(app, &session.workspace_id, "admin").await;

    let users = get_json_response_body(app.get("/users").await).await;
    assert_eq!(users.as_array().unwrap().len(), 2);

    let response = app
        .put(
            &format!("/users/{}/role", session.user_id),
            &serde_json::json!({ "role": "member" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .post_empty(&format!("/users/{}/deactivate", session.user_id))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .post_empty(&format!("/users/{admin_id}/deactivate"))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .post("/billing/checkout", &serde_json::json!({ "plan": "pro" }))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[test_context(TestApp)]
#[tokio::test]
async fn owner_manages_roles_and_activation(app: &mut TestApp) {
    let session = signup(app, "Craggy Island").await;
    let (member_email, member_id) =
        invite_and_accept(app, &session.workspace_id, "member").await;

    let response = app
        .post("/skills", &serde_json::json!({ "name": "Design" }))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    logout(app).await;
    login(app, &session.email, PASSWORD).await;

    let response = app
        .put(
            &format!("/users/{member_id}/role"),
            &serde_json::json!({ "role": "owner" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .put(
            &format!("/users/{}/role", session.user_id),
            &serde_json::json!({ "role": "admin" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .put(
            &format!("/users/{member_id}/role"),
            &serde_json::json!({ "role": "admin" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_str(&get_json_response_body(response).await, "/role"), "admin");

    let response = app
        .post_empty(&format!("/users/{member_id}/deactivate"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_json_response_body(response).await["active"], false);

    logout(app).await;
    let response = app
        .post_login(&serde_json::json!({
            "email": member_email,
            "password": PASSWORD
        }))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    login(app, &session.email, PASSWORD).await;
    let response = app
        .post_empty(&format!("/users/{member_id}/reactivate"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    logout(app).await;
    login(app, &member_email, PASSWORD).await;
}

#[test_context(TestApp)]
#[tokio::test]
async fn deactivated_users_lose_their_session(app: &mut TestApp) {
    let session = signup(app, "Craggy Island").await;
    let (_, member_id) =
        invite_and_accept(app, &session.workspace_id, "member").await;
    assert_eq!(app.get("/auth/me").await.status(), StatusCode::OK);

    let mut store = app.user_store.write().await;
    let workspace_id = session.workspace_id;
    let member_id = procapacity::domain::UserId::parse(&member_id).unwrap();
    let mut member = store.get_user(&workspace_id, &member_id).await.unwrap();
    member.active = false;
    store.update_user(&member).await.unwrap();
    drop(store);

    assert_eq!(app.get("/auth/me").await.status(), StatusCode::FORBIDDEN);
}

#[test_context(TestApp)]
#[tokio::test]
async fn admins_update_workspace_settings(app: &mut TestApp) {
    signup(app, "Craggy Island").await;

    let response = app
        .put(
            "/workspace/settings",
            &serde_json::json!({
                "name": "Craggy Island Parish",
                "overAllocationThreshold": 110,
                "underUtilizationThreshold": 50
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let workspace = get_json_response_body(app.get("/workspace").await).await;
    assert_eq!(json_str(&workspace, "/name"), "Craggy Island Parish");
    assert_eq!(workspace["thresholds"]["overAllocation"], 110);
    assert_eq!(workspace["thresholds"]["underUtilization"], 50);

    let response = app
        .put(
            "/workspace/settings",
            &serde_json::json!({
                "overAllocationThreshold": 40,
                "underUtilizationThreshold": 50
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
