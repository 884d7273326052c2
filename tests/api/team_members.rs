use crate::helpers::{
    add_team_member, get_json_response_body, json_str, set_plan, signup,
    TestApp,
};
use procapacity::domain::Plan;
use reqwest::StatusCode;
use test_context::test_context;

#[test_context(TestApp)]
#[tokio::test]
async fn should_create_and_fetch_a_team_member(app: &mut TestApp) {
    signup(app, "Craggy Island").await;

    let response = app
        .post("/skills", &serde_json::json!({ "name": "Design" }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let skill_id = json_str(&get_json_response_body(response).await, "/id");

    let response = app
        .post(
            "/team-members",
            &serde_json::json!({
                "name": "Dougal McGuire",
                "email": "dougal@craggy.ie",
                "role": "Designer",
                "skillIds": [skill_id],
                "hourlyRate": 55.0
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = get_json_response_body(response).await;
    assert_eq!(body["weeklyCapacity"], 40.0);
    assert_eq!(body["skillIds"][0], skill_id.as_str());
    assert_eq!(body["active"], true);

    let member_id = json_str(&body, "/id");
    let response = app.get(&format!("/team-members/{member_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = get_json_response_body(response).await;
    assert_eq!(json_str(&body, "/name"), "Dougal McGuire");
    assert_eq!(json_str(&body, "/role"), "Designer");
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_400_for_invalid_team_members(app: &mut TestApp) {
    signup(app, "Craggy Island").await;

    let test_cases = [
        serde_json::json!({ "name": "" }),
        serde_json::json!({ "name": "Ted", "weeklyCapacityHours": -1.0 }),
        serde_json::json!({ "name": "Ted", "weeklyCapacityHours": 200.0 }),
        serde_json::json!({ "name": "Ted", "email": "nope" }),
        serde_json::json!({ "name": "Ted", "skillIds": [uuid::Uuid::new_v4().to_string()] }),
        serde_json::json!({ "name": "Ted", "skillIds": ["not-a-uuid"] }),
    ];
    for test_case in test_cases.iter() {
        let response = app.post("/team-members", test_case).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "Failed for input: {:?}",
            test_case
        );
    }
}

#[test_context(TestApp)]
#[tokio::test]
async fn free_plan_is_limited_to_five_active_team_members(app: &mut TestApp) {
    signup(app, "Craggy Island").await;

    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(add_team_member(app, &format!("Priest {i}"), 40.0).await);
    }

    let response = app
        .post("/team-members", &serde_json::json!({ "name": "Priest 5" }))
        .await;
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

    let response = app
        .post_empty(&format!("/team-members/{}/deactivate", ids[0]))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_json_response_body(response).await["active"], false);

    add_team_member(app, "Priest 5", 40.0).await;

    let response = app
        .post_empty(&format!("/team-members/{}/reactivate", ids[0]))
        .await;
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

    let active = get_json_response_body(app.get("/team-members").await).await;
    assert_eq!(active.as_array().unwrap().len(), 5);
    let all = get_json_response_body(
        app.get("/team-members?includeInactive=true").await,
    )
    .await;
    assert_eq!(all.as_array().unwrap().len(), 6);
}

#[test_context(TestApp)]
#[tokio::test]
async fn update_replaces_the_team_member(app: &mut TestApp) {
    signup(app, "Craggy Island").await;
    let member_id = add_team_member(app, "Jack Hackett", 40.0).await;

    let response = app
        .put(
            &format!("/team-members/{member_id}"),
            &serde_json::json!({
                "name": "Father Jack Hackett",
                "weeklyCapacityHours": 10.0
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = get_json_response_body(response).await;
    assert_eq!(json_str(&body, "/name"), "Father Jack Hackett");
    assert_eq!(body["weeklyCapacity"], 10.0);
    assert_eq!(json_str(&body, "/id"), member_id);
}

#[test_context(TestApp)]
#[tokio::test]
async fn csv_import_requires_a_paid_plan(app: &mut TestApp) {
    let session = signup(app, "Craggy Island").await;
    let csv = "name,email,role,weekly_capacity_hours,skills\n\
               Ted Crilly,ted@craggy.ie,Priest,32,Sermons;Golf\n\
               ,,,,\n\
               Dougal McGuire,,,lots,\n\
               Jack Hackett,,,,Drink\n";

    let response = app
        .http_client
        .post(app.url("/team-members/import"))
        .header("Content-Type", "text/csv")
        .body(csv)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

    set_plan(app, &session.workspace_id, Plan::Starter).await;

    let response = app
        .http_client
        .post(app.url("/team-members/import"))
        .header("Content-Type", "text/csv")
        .body(csv)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = get_json_response_body(response).await;
    assert_eq!(body["imported"].as_array().unwrap().len(), 2);
    assert_eq!(body["createdSkills"].as_array().unwrap().len(), 3);
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["line"], 4);

    let skills = get_json_response_body(app.get("/skills").await).await;
    assert_eq!(skills.as_array().unwrap().len(), 3);
}

#[test_context(TestApp)]
#[tokio::test]
async fn csv_import_over_the_seat_limit_is_rejected_whole(app: &mut TestApp) {
    let session = signup(app, "Craggy Island").await;
    set_plan(app, &session.workspace_id, Plan::Starter).await;
    for name in ["Ted", "Dougal", "Jack"] {
        add_team_member(app, name, 40.0).await;
    }

    // 13 valid rows against 12 free seats, plus one invalid row.
    let mut csv = String::from("name,email,role,weekly_capacity_hours,skills\n");
    for i in 0..13 {
        csv.push_str(&format!("Curate {i},,,,Golf\n"));
    }
    csv.push_str("Bishop Brennan,,,lots,\n");

    let response = app
        .http_client
        .post(app.url("/team-members/import"))
        .header("Content-Type", "text/csv")
        .body(csv)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

    let members = get_json_response_body(app.get("/team-members").await).await;
    assert_eq!(members.as_array().unwrap().len(), 3);
    let skills = get_json_response_body(app.get("/skills").await).await;
    assert!(skills.as_array().unwrap().is_empty());
}

#[test_context(TestApp)]
#[tokio::test]
async fn csv_import_does_not_repeat_skills(app: &mut TestApp) {
    let session = signup(app, "Craggy Island").await;
    set_plan(app, &session.workspace_id, Plan::Starter).await;
    let response = app.post("/skills", &serde_json::json!({ "name": "Golf" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let csv = "name,email,role,weekly_capacity_hours,skills\n\
               Ted Crilly,,,,Golf;golf; GOLF ;Sermons;sermons\n";
    let response = app
        .http_client
        .post(app.url("/team-members/import"))
        .header("Content-Type", "text/csv")
        .body(csv)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = get_json_response_body(response).await;
    assert_eq!(body["createdSkills"].as_array().unwrap().len(), 1);
    let ted = &body["imported"][0];
    assert_eq!(ted["skillIds"].as_array().unwrap().len(), 2);
}

#[test_context(TestApp)]
#[tokio::test]
async fn deleting_a_skill_removes_it_from_members(app: &mut TestApp) {
    signup(app, "Craggy Island").await;
    let response = app
        .post("/skills", &serde_json::json!({ "name": "Golf" }))
        .await;
    let skill_id = json_str(&get_json_response_body(response).await, "/id");

    let response = app
        .post("/skills", &serde_json::json!({ "name": "golf" }))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .post(
            "/team-members",
            &serde_json::json!({ "name": "Ted", "skillIds": [skill_id] }),
        )
        .await;
    let member_id = json_str(&get_json_response_body(response).await, "/id");

    let response = app.delete(&format!("/skills/{skill_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let member =
        get_json_response_body(app.get(&format!("/team-members/{member_id}")).await)
            .await;
    assert!(member["skillIds"].as_array().unwrap().is_empty());

    let response = app.delete(&format!("/skills/{skill_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
