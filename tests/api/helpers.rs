use procapacity::{
    app_state::{
        AppState, Settings, StripePrices, UserStoreType, WorkspaceStoreType,
    },
    domain::{BillingStatus, Email, Plan, WorkspaceId},
    services::{
        data_stores::{
            HashmapProjectStore, HashmapTeamStore, HashmapUserStore,
            HashmapWorkspaceStore, HashmapBannedTokenStore,
        },
        postmark_email_client::PostmarkEmailClient,
        stripe_payment_client::StripePaymentClient,
    },
    utils::constants::test,
    Application,
};
use reqwest::{cookie::Jar, Client, Response, StatusCode};
use secrecy::Secret;
use serde_json::Value;
use std::sync::Arc;
use test_context::AsyncTestContext;
use tokio::sync::RwLock;
use uuid::Uuid;
use wiremock::{
    matchers::method, matchers::path, Mock, MockServer, ResponseTemplate,
};

pub const PASSWORD: &str = "password123";
pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

pub struct TestApp {
    pub address: String,
    pub cookie_jar: Arc<Jar>,
    pub email_server: MockServer,
    pub payment_server: MockServer,
    pub http_client: reqwest::Client,
    pub user_store: UserStoreType,
    pub workspace_store: WorkspaceStoreType,
}

impl TestApp {
    pub async fn new() -> Self {
        let user_store = Arc::new(RwLock::new(HashmapUserStore::default()));
        let workspace_store =
            Arc::new(RwLock::new(HashmapWorkspaceStore::default()));
        let team_store = Arc::new(RwLock::new(HashmapTeamStore::default()));
        let project_store =
            Arc::new(RwLock::new(HashmapProjectStore::default()));
        let banned_token_store =
            Arc::new(RwLock::new(HashmapBannedTokenStore::default()));

        let email_server = MockServer::start().await;
        Mock::given(path("/email"))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&email_server)
            .await;
        let email_client =
            Arc::new(configure_postmark_email_client(email_server.uri()));

        let payment_server = MockServer::start().await;
        let payment_client =
            Arc::new(configure_stripe_payment_client(payment_server.uri()));

        let app_state = AppState::new(
            user_store.clone(),
            workspace_store.clone(),
            team_store,
            project_store,
            banned_token_store,
            email_client,
            payment_client,
            test_settings(),
        );

        let app = Application::build(app_state, test::APP_ADDRESS)
            .await
            .expect("Failed to build app");
        let address = format!("http://{}", app.address.clone());

        #[allow(clippy::let_underscore_future)]
        let _ = tokio::spawn(app.run());

        let cookie_jar = Arc::new(Jar::default());
        let http_client = reqwest::Client::builder()
            .cookie_provider(cookie_jar.clone())
            .build()
            .unwrap();

        Self {
            address,
            cookie_jar,
            email_server,
            payment_server,
            http_client,
            user_store,
            workspace_store,
        }
    }

    pub fn url(&self, route: &str) -> String {
        format!("{}{}", &self.address, route)
    }

    pub async fn get(&self, route: &str) -> Response {
        self.http_client
            .get(self.url(route))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post<Body>(&self, route: &str, body: &Body) -> Response
    where
        Body: serde::Serialize,
    {
        self.http_client
            .post(self.url(route))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_empty(&self, route: &str) -> Response {
        self.http_client
            .post(self.url(route))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put<Body>(&self, route: &str, body: &Body) -> Response
    where
        Body: serde::Serialize,
    {
        self.http_client
            .put(self.url(route))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, route: &str) -> Response {
        self.http_client
            .delete(self.url(route))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_signup<Body>(&self, body: &Body) -> Response
    where
        Body: serde::Serialize,
    {
        self.post("/auth/signup", body).await
    }

    pub async fn post_login<Body>(&self, body: &Body) -> Response
    where
        Body: serde::Serialize,
    {
        self.post("/auth/login", body).await
    }

    pub async fn post_logout(&self) -> Response {
        self.post_empty("/auth/logout").await
    }

    pub async fn post_webhook(&self, payload: &str, signature: &str) -> Response {
        self.http_client
            .post(self.url("/webhooks/stripe"))
            .header("Stripe-Signature", signature)
            .header("Content-Type", "application/json")
            .body(payload.to_owned())
            .send()
            .await
            .expect("Failed to execute request")
    }
}

impl AsyncTestContext for TestApp {
    async fn setup() -> TestApp {
        TestApp::new().await
    }

    async fn teardown(self) {}
}

pub fn test_settings() -> Settings {
    Settings {
        jwt_secret: Secret::new("test_jwt_secret".to_owned()),
        app_url: "http://localhost:3000".to_owned(),
        stripe_webhook_secret: Secret::new(WEBHOOK_SECRET.to_owned()),
        stripe_prices: StripePrices {
            starter: "price_starter".to_owned(),
            pro: "price_pro".to_owned(),
            agency: "price_agency".to_owned(),
        },
    }
}

pub fn get_random_email() -> String {
    format!("{}@example.com", Uuid::new_v4())
}

fn configure_postmark_email_client(base_url: String) -> PostmarkEmailClient {
    let postmark_auth_token = Secret::new("auth_token".to_owned());

    let sender =
        Email::parse(Secret::new(test::email_client::SENDER.to_owned()))
            .unwrap();

    let http_client = Client::builder()
        .timeout(test::email_client::TIMEOUT)
        .build()
        .expect("Failed to build HTTP client");

    PostmarkEmailClient::new(base_url, sender, postmark_auth_token, http_client)
}

fn configure_stripe_payment_client(base_url: String) -> StripePaymentClient {
    let http_client = Client::builder()
        .timeout(test::email_client::TIMEOUT)
        .build()
        .expect("Failed to build HTTP client");

    StripePaymentClient::new(
        base_url,
        Secret::new("sk_test".to_owned()),
        http_client,
    )
}

pub async fn get_json_response_body(response: Response) -> Value {
    let body: Value = response
        .json()
        .await
        .expect("failed to parse response body JSON");
    body
}

pub fn json_str(body: &Value, pointer: &str) -> String {
    body.pointer(pointer)
        .unwrap_or_else(|| panic!("No {pointer} in {body}"))
        .as_str()
        .unwrap_or_else(|| panic!("{pointer} is not a string in {body}"))
        .to_owned()
}

/// The session of a freshly signed up workspace owner.
pub struct Session {
    pub email: String,
    pub user_id: String,
    pub workspace_id: WorkspaceId,
}

/// Signs up a new workspace owner. The returned cookie stays in the app's
/// cookie jar, so later requests are made as that owner.
pub async fn signup(app: &TestApp, workspace_name: &str) -> Session {
    let email = get_random_email();
    let response = app
        .post_signup(&serde_json::json!({
            "workspaceName": workspace_name,
            "name": "Father Ted",
            "email": email,
            "password": PASSWORD
        }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED, "Failed to sign up");

    let body = get_json_response_body(response).await;
    Session {
        email,
        user_id: json_str(&body, "/user/id"),
        workspace_id: WorkspaceId::parse(&json_str(&body, "/workspace/id"))
            .expect("Invalid workspace id"),
    }
}

pub async fn login(app: &TestApp, email: &str, password: &str) {
    let response = app
        .post_login(&serde_json::json!({
            "email": email,
            "password": password
        }))
        .await;
    assert_eq!(response.status(), StatusCode::OK, "Failed to log in {email}");
}

pub async fn logout(app: &TestApp) {
    assert_eq!(
        app.post_logout().await.status(),
        StatusCode::OK,
        "Failed to log out"
    );
}

pub async fn add_team_member(app: &TestApp, name: &str, capacity: f64) -> String {
    let response = app
        .post(
            "/team-members",
            &serde_json::json!({
                "name": name,
                "weeklyCapacityHours": capacity
            }),
        )
        .await;
    assert_eq!(
        response.status(),
        StatusCode::CREATED,
        "Failed to add team member {name}"
    );
    json_str(&get_json_response_body(response).await, "/id")
}

pub async fn add_project(app: &TestApp, name: &str, start_date: &str) -> String {
    let response = app
        .post(
            "/projects",
            &serde_json::json!({
                "name": name,
                "startDate": start_date
            }),
        )
        .await;
    assert_eq!(
        response.status(),
        StatusCode::CREATED,
        "Failed to add project {name}"
    );
    json_str(&get_json_response_body(response).await, "/id")
}

pub async fn add_assignment(
    app: &TestApp,
    member_id: &str,
    project_id: &str,
    start_date: &str,
    end_date: &str,
    hours_per_week: f64,
) -> Value {
    let response = app
        .post(
            "/assignments",
            &serde_json::json!({
                "teamMemberId": member_id,
                "projectId": project_id,
                "startDate": start_date,
                "endDate": end_date,
                "hoursPerWeek": hours_per_week
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED, "Failed to assign");
    get_json_response_body(response).await
}

/// Puts the workspace on a paid plan without going through checkout.
pub async fn set_plan(app: &TestApp, workspace_id: &WorkspaceId, plan: Plan) {
    let mut store = app.workspace_store.write().await;
    let mut workspace = store
        .get_workspace(workspace_id)
        .await
        .expect("Workspace not found");
    workspace.plan = plan;
    workspace.billing_status = BillingStatus::Active;
    store
        .update_workspace(&workspace)
        .await
        .expect("Failed to update workspace");
}

/// Monday of the current week, as the server sees it.
pub fn this_monday() -> chrono::NaiveDate {
    procapacity::domain::capacity::week_start(chrono::Utc::now().date_naive())
}

/// Token of the pending invite sent to `email`, read straight from the store
/// since it never appears in API responses.
pub async fn invite_token(
    app: &TestApp,
    workspace_id: &WorkspaceId,
    email: &str,
) -> String {
    use secrecy::ExposeSecret;

    app.workspace_store
        .read()
        .await
        .list_pending_invites(workspace_id, chrono::Utc::now())
        .await
        .expect("Failed to list invites")
        .into_iter()
        .find(|invite| invite.email.as_ref().expose_secret() == email)
        .map(|invite| invite.token.as_ref().expose_secret().to_owned())
        .expect("No pending invite for email")
}

/// Invites `email` with `role` and accepts the invite. Afterwards the app's
/// cookie belongs to the new user.
pub async fn invite_and_accept(
    app: &TestApp,
    workspace_id: &WorkspaceId,
    role: &str,
) -> (String, String) {
    let email = get_random_email();
    let response = app
        .post("/invites", &serde_json::json!({ "email": email, "role": role }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED, "Failed to invite");

    let token = invite_token(app, workspace_id, &email).await;
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
    assert_eq!(response.status(), StatusCode::CREATED, "Failed to accept");
    let user_id = json_str(&get_json_response_body(response).await, "/user/id");
    (email, user_id)
}
