use crate::helpers::{
    add_assignment, add_project, add_team_member, get_json_response_body,
    json_str, set_plan, signup, this_monday, TestApp,
};
use chrono::Duration;
use procapacity::domain::Plan;
use reqwest::StatusCode;
use test_context::test_context;

/// Ted is at 30 of 40 hours in the first week and at 50 in the second.
/// Jack has no capacity and nothing assigned.
async fn seed(app: &TestApp) -> (String, String) {
    let ted = add_team_member(app, "Ted Crilly", 40.0).await;
    let jack = add_team_member(app, "Jack Hackett", 0.0).await;
    let first = add_project(app, "Lovely Girls", "2025-06-02").await;
    let second = add_project(app, "Funland", "2025-06-02").await;
    add_assignment(app, &ted, &first, "2025-06-02", "2025-06-13", 30.0).await;
    add_assignment(app, &ted, &second, "2025-06-09", "2025-06-13", 20.0).await;
    (ted, jack)
}

#[test_context(TestApp)]
#[tokio::test]
async fn utilization_report_covers_each_member_and_week(app: &mut TestApp) {
    signup(app, "Craggy Island").await;
    let (ted, _) = seed(app).await;

    let response = app.get("/capacity/utilization?from=2025-06-04&weeks=2").await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = get_json_response_body(response).await;

    assert_eq!(report["weeks"], serde_json::json!(["2025-06-02", "2025-06-09"]));
    let members = report["members"].as_array().unwrap();
    assert_eq!(members.len(), 2);

    let ted_row = members
        .iter()
        .find(|row| row["teamMemberId"] == ted.as_str())
        .expect("No row for Ted");
    assert_eq!(json_str(ted_row, "/weeks/0/status"), "healthy");
    assert_eq!(ted_row["weeks"][0]["allocatedHours"], 30.0);
    assert_eq!(ted_row["weeks"][0]["availableHours"], 10.0);
    assert_eq!(json_str(ted_row, "/weeks/1/status"), "over_allocated");

    let jack_row = members
        .iter()
        .find(|row| row["teamMemberId"] != ted.as_str())
        .unwrap();
    assert_eq!(json_str(jack_row, "/weeks/0/status"), "unavailable");
    assert!(jack_row["weeks"][0]["ratio"].is_null());

    let over = report["overAllocations"].as_array().unwrap();
    assert_eq!(over.len(), 1);
    assert_eq!(json_str(&over[0], "/weekStart"), "2025-06-09");
}

#[test_context(TestApp)]
#[tokio::test]
async fn report_window_is_validated(app: &mut TestApp) {
    signup(app, "Craggy Island").await;
    for query in [
        "weeks=0",
        "weeks=27",
        "from=yesterday",
        "from=%2B262142-12-20",
        "from=1850-01-06",
    ] {
        let response = app.get(&format!("/capacity/utilization?{query}")).await;
        assert!(
            response.status().is_client_error(),
            "Failed for query: {query}"
        );
    }

    let report =
        get_json_response_body(app.get("/capacity/utilization").await).await;
    assert_eq!(report["weeks"].as_array().unwrap().len(), 4);
    assert_eq!(report["weeks"][0], this_monday().to_string());
}

#[test_context(TestApp)]
#[tokio::test]
async fn over_allocations_and_member_capacity(app: &mut TestApp) {
    signup(app, "Craggy Island").await;
    let (ted, jack) = seed(app).await;

    let over = get_json_response_body(
        app.get("/capacity/over-allocations?from=2025-06-02&weeks=3")
            .await,
    )
    .await;
    let over = over.as_array().unwrap();
    assert_eq!(over.len(), 1);
    assert_eq!(json_str(&over[0], "/teamMemberId"), ted);
    assert_eq!(over[0]["allocatedHours"], 50.0);

    let response = app
        .get(&format!("/capacity/members/{ted}?from=2025-06-02&weeks=2"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = get_json_response_body(response).await;
    assert_eq!(body["assignments"].as_array().unwrap().len(), 2);
    assert_eq!(body["utilization"]["weeks"].as_array().unwrap().len(), 2);

    let body = get_json_response_body(
        app.get(&format!("/capacity/members/{jack}")).await,
    )
    .await;
    assert!(body["assignments"].as_array().unwrap().is_empty());
    assert!(body["utilization"]["averageRatio"].is_null());
}

#[test_context(TestApp)]
#[tokio::test]
async fn dashboard_summarises_the_current_week(app: &mut TestApp) {
    signup(app, "Craggy Island").await;
    let monday = this_monday();
    let sunday = monday + Duration::days(6);

    let ted = add_team_member(app, "Ted Crilly", 40.0).await;
    add_team_member(app, "Dougal McGuire", 40.0).await;
    let project = add_project(app, "Lovely Girls", &monday.to_string()).await;
    add_project(app, "Funland", &monday.to_string()).await;
    add_assignment(
        app,
        &ted,
        &project,
        &monday.to_string(),
        &sunday.to_string(),
        45.0,
    )
    .await;

    let response = app.get("/dashboard").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = get_json_response_body(response).await;

    assert_eq!(body["weekStart"], monday.to_string());
    assert_eq!(body["activeTeamMembers"], 2);
    assert_eq!(body["activeProjects"], 2);
    assert_eq!(body["overAllocatedMembers"].as_array().unwrap().len(), 1);
    // Funland has nobody on it.
    assert_eq!(body["projectsAtRisk"], 1);
    assert_eq!(body["projectsCritical"], 0);

    let average = body["averageUtilization"].as_f64().unwrap();
    assert!((average - (45.0 / 40.0) / 2.0).abs() < 1e-9);
}

#[test_context(TestApp)]
#[tokio::test]
async fn csv_export_requires_a_pro_plan(app: &mut TestApp) {
    let session = signup(app, "Craggy Island").await;
    seed(app).await;

    let route = "/reports/utilization.csv?from=2025-06-02&weeks=2";
    assert_eq!(app.get(route).await.status(), StatusCode::PAYMENT_REQUIRED);

    set_plan(app, &session.workspace_id, Plan::Starter).await;
    assert_eq!(app.get(route).await.status(), StatusCode::PAYMENT_REQUIRED);

    set_plan(app, &session.workspace_id, Plan::Pro).await;
    let response = app.get(route).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"utilization-2025-06-02.csv\""
    );

    let csv = response.text().await.unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("member,role,week_start"));
    assert!(lines.contains(&"Ted Crilly,,2025-06-09,50,40,125.0,over_allocated"));
}
