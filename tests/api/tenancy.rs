use crate::helpers::{
    add_project, add_team_member, get_json_response_body, json_str, logout,
    signup, TestApp,
};
use reqwest::StatusCode;
use test_context::test_context;

#[test_context(TestApp)]
#[tokio::test]
async fn records_of_other_workspaces_are_not_found(app: &mut TestApp) {
    signup(app, "Craggy Island").await;
    let member_id = add_team_member(app, "Ted Crilly", 40.0).await;
    let project_id = add_project(app, "Lovely Girls", "2025-06-02").await;
    let response = app
        .post("/skills", &serde_json::json!({ "name": "Sermons" }))
        .await;
    let skill_id = json_str(&get_json_response_body(response).await, "/id");
    logout(app).await;

    signup(app, "Rugged Island").await;
    let own_member = add_team_member(app, "Dick Byrne", 40.0).await;

    for route in [
        format!("/team-members/{member_id}"),
        format!("/projects/{project_id}"),
        format!("/capacity/members/{member_id}"),
    ] {
        assert_eq!(
            app.get(&route).await.status(),
            StatusCode::NOT_FOUND,
            "Failed for route: {route}"
        );
    }

    let response = app
        .put(
            &format!("/team-members/{member_id}"),
            &serde_json::json!({ "name": "Stolen" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .post(
            "/assignments",
            &serde_json::json!({
                "teamMemberId": own_member,
                "projectId": project_id,
                "startDate": "2025-06-02",
                "endDate": "2025-06-06",
                "hoursPerWeek": 10.0
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .post(
            "/team-members",
            &serde_json::json!({ "name": "Dick", "skillIds": [skill_id] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(
        app.delete(&format!("/skills/{skill_id}")).await.status(),
        StatusCode::NOT_FOUND
    );

    let members = get_json_response_body(app.get("/team-members").await).await;
    assert_eq!(members.as_array().unwrap().len(), 1);
    let projects = get_json_response_body(app.get("/projects").await).await;
    assert!(projects.as_array().unwrap().is_empty());
}

#[test_context(TestApp)]
#[tokio::test]
async fn requests_without_a_session_are_rejected(app: &mut TestApp) {
    for route in ["/workspace", "/team-members", "/projects", "/dashboard", "/billing"] {
        assert_eq!(
            app.get(route).await.status(),
            StatusCode::UNAUTHORIZED,
            "Failed for route: {route}"
        );
    }

    app.cookie_jar.add_cookie_str(
        "jwt=not-a-token",
        &reqwest::Url::parse(&app.address).unwrap(),
    );
    assert_eq!(app.get("/workspace").await.status(), StatusCode::UNAUTHORIZED);
}
