use crate::helpers::{
    get_json_response_body, get_random_email, json_str, login, logout, signup,
    TestApp, PASSWORD,
};
use procapacity::ErrorResponse;
use reqwest::{cookie::CookieStore, StatusCode, Url};
use test_context::test_context;

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_422_if_malformed_input(app: &mut TestApp) {
    let test_cases = [
        serde_json::json!({
            "name": "Ted",
            "email": get_random_email(),
            "password": PASSWORD
        }),
        serde_json::json!({
            "workspaceName": "Craggy Island",
            "name": "Ted",
            "password": PASSWORD
        }),
        serde_json::json!({
            "workspaceName": 42,
            "name": "Ted",
            "email": get_random_email(),
            "password": PASSWORD
        }),
    ];

    for test_case in test_cases.iter() {
        let response = app.post_signup(test_case).await;
        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "Failed for input: {:?}",
            test_case
        );
    }
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_400_if_invalid_input(app: &mut TestApp) {
    let test_cases = [
        serde_json::json!({
            "workspaceName": "Craggy Island",
            "name": "Ted",
            "email": "not-an-email",
            "password": PASSWORD
        }),
        serde_json::json!({
            "workspaceName": "Craggy Island",
            "name": "Ted",
            "email": get_random_email(),
            "password": "short"
        }),
        serde_json::json!({
            "workspaceName": "   ",
            "name": "Ted",
            "email": get_random_email(),
            "password": PASSWORD
        }),
    ];

    for test_case in test_cases.iter() {
        let response = app.post_signup(test_case).await;
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
async fn signup_creates_a_trialing_workspace_owned_by_the_user(app: &mut TestApp) {
    let email = get_random_email();
    let response = app
        .post_signup(&serde_json::json!({
            "workspaceName": "Craggy Island Parish",
            "name": "Father Ted",
            "email": email,
            "password": PASSWORD
        }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let auth_cookie = response
        .cookies()
        .find(|cookie| cookie.name() == "jwt")
        .expect("No auth cookie found");
    assert!(!auth_cookie.value().is_empty());

    let body = get_json_response_body(response).await;
    assert_eq!(json_str(&body, "/user/role"), "owner");
    assert_eq!(json_str(&body, "/user/email"), email);
    assert_eq!(json_str(&body, "/workspace/slug"), "craggy-island-parish");
    assert_eq!(json_str(&body, "/workspace/plan"), "free");
    assert_eq!(json_str(&body, "/workspace/billingStatus"), "trialing");
    assert!(body["workspace"]["trialEndsAt"].is_string());

    let schema = serde_json::json!({
        "type": "object",
        "required": ["user", "workspace"],
        "properties": {
            "user": {
                "type": "object",
                "required": ["id", "email", "name", "role", "active"],
                "not": { "required": ["hash"] }
            },
            "workspace": {
                "type": "object",
                "required": ["id", "name", "slug", "plan", "billingStatus", "thresholds"],
                "not": { "required": ["stripeCustomerId"] }
            }
        }
    });
    let validator = jsonschema::validator_for(&schema).expect("Invalid schema");
    assert!(validator.is_valid(&body), "Unexpected session body: {body}");
}

#[test_context(TestApp)]
#[tokio::test]
async fn workspaces_with_the_same_name_get_distinct_slugs(app: &mut TestApp) {
    let first = signup(app, "Rugged Island").await;
    let second = signup(app, "Rugged Island").await;

    let first = app
        .workspace_store
        .read()
        .await
        .get_workspace(&first.workspace_id)
        .await
        .unwrap();
    let second = app
        .workspace_store
        .read()
        .await
        .get_workspace(&second.workspace_id)
        .await
        .unwrap();
    assert_eq!(first.slug.as_ref(), "rugged-island");
    assert_ne!(first.slug, second.slug);
    assert!(second.slug.as_ref().starts_with("rugged-island-"));
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_409_if_email_already_exists(app: &mut TestApp) {
    let session = signup(app, "Craggy Island").await;
    let response = app
        .post_signup(&serde_json::json!({
            "workspaceName": "Another Island",
            "name": "Dougal",
            "email": session.email.to_uppercase(),
            "password": PASSWORD
        }))
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        response
            .json::<ErrorResponse>()
            .await
            .expect("Could not deserialize response body to ErrorResponse")
            .error,
        "User already exists".to_owned()
    );
}

#[test_context(TestApp)]
#[tokio::test]
async fn login_returns_401_for_incorrect_credentials(app: &mut TestApp) {
    let session = signup(app, "Craggy Island").await;
    logout(app).await;

    let test_cases = [
        serde_json::json!({ "email": session.email, "password": "wrong-password" }),
        serde_json::json!({ "email": get_random_email(), "password": PASSWORD }),
    ];
    for test_case in test_cases.iter() {
        let response = app.post_login(test_case).await;
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "Failed for input: {:?}",
            test_case
        );
    }
}

#[test_context(TestApp)]
#[tokio::test]
async fn login_sets_cookie_and_me_returns_the_session(app: &mut TestApp) {
    let session = signup(app, "Craggy Island").await;
    logout(app).await;
    assert_eq!(app.get("/auth/me").await.status(), StatusCode::UNAUTHORIZED);

    login(app, &session.email, PASSWORD).await;

    let response = app.get("/auth/me").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = get_json_response_body(response).await;
    assert_eq!(json_str(&body, "/user/id"), session.user_id);
    assert_eq!(
        json_str(&body, "/workspace/id"),
        session.workspace_id.to_string()
    );
}

#[test_context(TestApp)]
#[tokio::test]
async fn logout_bans_the_token(app: &mut TestApp) {
    signup(app, "Craggy Island").await;

    let url = Url::parse(&app.address).unwrap();
    let token = app
        .cookie_jar
        .cookies(&url)
        .and_then(|header| {
            header
                .to_str()
                .ok()
                .and_then(|cookies| cookies.strip_prefix("jwt="))
                .map(|token| token.split(';').next().unwrap_or_default().to_owned())
        })
        .expect("No auth cookie in jar");

    let response = app
        .post("/auth/verify-token", &serde_json::json!({ "token": token }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    logout(app).await;

    let response = app
        .post("/auth/verify-token", &serde_json::json!({ "token": token }))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(app.post_logout().await.status(), StatusCode::UNAUTHORIZED);
}
