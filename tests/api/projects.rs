use crate::helpers::{
    add_assignment, add_project, add_team_member, get_json_response_body,
    json_str, signup, this_monday, TestApp,
};
use chrono::Duration;
use reqwest::StatusCode;
use test_context::test_context;

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_400_for_invalid_projects(app: &mut TestApp) {
    signup(app, "Craggy Island").await;

    let test_cases = [
        serde_json::json!({ "name": "", "startDate": "2025-06-02" }),
        serde_json::json!({
            "name": "Lovely Girls",
            "startDate": "2025-06-02",
            "endDate": "2025-06-01"
        }),
        serde_json::json!({
            "name": "Lovely Girls",
            "startDate": "2025-06-02",
            "budgetHours": -5.0
        }),
        serde_json::json!({
            "name": "Lovely Girls",
            "startDate": "2025-06-02",
            "status": "finished"
        }),
        serde_json::json!({ "name": "Lovely Girls", "startDate": "+262142-12-31" }),
        serde_json::json!({
            "name": "Lovely Girls",
            "startDate": "2025-06-02",
            "endDate": "+262142-12-31"
        }),
        serde_json::json!({ "name": "Lovely Girls", "startDate": "1850-06-02" }),
    ];
    for test_case in test_cases.iter() {
        let response = app.post("/projects", test_case).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "Failed for input: {:?}",
            test_case
        );
    }

    assert_eq!(app.get("/projects/health").await.status(), StatusCode::OK);
    assert_eq!(app.get("/dashboard").await.status(), StatusCode::OK);
}

#[test_context(TestApp)]
#[tokio::test]
async fn free_plan_is_limited_to_three_open_projects(app: &mut TestApp) {
    signup(app, "Craggy Island").await;

    let mut ids = Vec::new();
    for i in 0..3 {
        ids.push(add_project(app, &format!("Project {i}"), "2025-06-02").await);
    }

    let fourth = serde_json::json!({
        "name": "Funland",
        "startDate": "2025-06-02"
    });
    assert_eq!(
        app.post("/projects", &fourth).await.status(),
        StatusCode::PAYMENT_REQUIRED
    );

    let closed = serde_json::json!({
        "name": "Old Funland",
        "startDate": "2024-06-02",
        "status": "completed"
    });
    assert_eq!(
        app.post("/projects", &closed).await.status(),
        StatusCode::CREATED
    );

    let response = app.post_empty(&format!("/projects/{}/archive", ids[0])).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_json_response_body(response).await["active"], false);

    assert_eq!(
        app.post("/projects", &fourth).await.status(),
        StatusCode::CREATED
    );

    let listed = get_json_response_body(app.get("/projects").await).await;
    assert_eq!(listed.as_array().unwrap().len(), 4);
    let all =
        get_json_response_body(app.get("/projects?includeArchived=true").await)
            .await;
    assert_eq!(all.as_array().unwrap().len(), 5);
}

#[test_context(TestApp)]
#[tokio::test]
async fn reopening_a_closed_project_counts_against_the_limit(app: &mut TestApp) {
    signup(app, "Craggy Island").await;
    for i in 0..3 {
        add_project(app, &format!("Project {i}"), "2025-06-02").await;
    }
    let response = app
        .post(
            "/projects",
            &serde_json::json!({
                "name": "Closed",
                "startDate": "2024-06-02",
                "status": "cancelled"
            }),
        )
        .await;
    let closed_id = json_str(&get_json_response_body(response).await, "/id");

    let response = app
        .put(
            &format!("/projects/{closed_id}"),
            &serde_json::json!({
                "name": "Closed",
                "startDate": "2024-06-02",
                "status": "active"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
}

#[test_context(TestApp)]
#[tokio::test]
async fn project_details_include_assignments_and_health(app: &mut TestApp) {
    signup(app, "Craggy Island").await;
    let monday = this_monday();

    let response = app
        .post(
            "/projects",
            &serde_json::json!({
                "name": "Eurosong",
                "clientName": "RTE",
                "startDate": monday,
                "budgetHours": 10.0
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let project_id = json_str(&get_json_response_body(response).await, "/id");

    let details =
        get_json_response_body(app.get(&format!("/projects/{project_id}")).await)
            .await;
    assert_eq!(json_str(&details, "/health/status"), "at_risk");
    assert_eq!(json_str(&details, "/health/issues/0/type"), "no_assignments");

    let member_id = add_team_member(app, "Dougal McGuire", 40.0).await;
    add_assignment(
        app,
        &member_id,
        &project_id,
        &monday.to_string(),
        &(monday + Duration::days(4)).to_string(),
        20.0,
    )
    .await;

    let details =
        get_json_response_body(app.get(&format!("/projects/{project_id}")).await)
            .await;
    assert_eq!(details["assignments"].as_array().unwrap().len(), 1);
    assert_eq!(json_str(&details, "/health/status"), "critical");
    assert_eq!(details["health"]["plannedHours"], 20.0);

    let rows = get_json_response_body(app.get("/projects/health").await).await;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(json_str(&rows[0], "/projectId"), project_id);
    assert_eq!(json_str(&rows[0], "/health/status"), "critical");
}
