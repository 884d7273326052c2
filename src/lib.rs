use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    serve::Serve,
    Json, Router,
};

use redis::{Client, RedisResult};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::error::Error;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Level;

use domain::{AuthAPIError, BillingAPIError, PlanLimitError, WorkspaceAPIError};
pub mod routes;
use crate::utils::tracing::*;
use routes::{
    assignments::{
        create_assignment, delete_assignment, list_assignments,
        update_assignment,
    },
    auth::{login, logout, me, signup, verify_token},
    billing::{billing_summary, checkout, portal, stripe_webhook},
    capacity::{
        dashboard, export_utilization_report, member_capacity,
        over_allocations, utilization_report,
    },
    invites::{
        accept_invite, create_invite, get_invite, list_invites, revoke_invite,
    },
    projects::{
        archive_project, create_project, get_project, list_project_health,
        list_projects, update_project,
    },
    skills::{create_skill, delete_skill, list_skills},
    team_members::{
        create_team_member, deactivate_team_member, get_team_member,
        import_team_members, list_team_members, reactivate_team_member,
        update_team_member,
    },
    users::{change_role, deactivate_user, list_users, reactivate_user},
    workspace::{get_workspace, update_settings},
};
pub mod app_state;
pub mod domain;
pub mod services;
use app_state::AppState;
pub mod utils;

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AuthAPIError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AuthAPIError::UserAlreadyExists => {
                log_error_chain(&self, Level::DEBUG);
                (StatusCode::CONFLICT, "User already exists".to_string())
            }
            AuthAPIError::ValidationError(e) => {
                log_error_chain(&self, Level::DEBUG);
                (StatusCode::BAD_REQUEST, e.as_ref().to_owned())
            }
            AuthAPIError::UserNotFound => {
                log_error_chain(&self, Level::DEBUG);
                (StatusCode::NOT_FOUND, "User not found".to_string())
            }
            AuthAPIError::IncorrectCredentials => {
                log_error_chain(&self, Level::DEBUG);
                (
                    StatusCode::UNAUTHORIZED,
                    "Incorrect credentials".to_string(),
                )
            }
            AuthAPIError::UserDeactivated => {
                log_error_chain(&self, Level::DEBUG);
                (StatusCode::FORBIDDEN, "User is deactivated".to_string())
            }
            AuthAPIError::InvalidInvite => {
                log_error_chain(&self, Level::DEBUG);
                (StatusCode::NOT_FOUND, "Invalid invite token".to_string())
            }
            AuthAPIError::InviteExpired => {
                log_error_chain(&self, Level::DEBUG);
                (StatusCode::GONE, "Invite expired".to_string())
            }
            AuthAPIError::PlanLimitError(e) => {
                log_error_chain(&self, Level::DEBUG);
                plan_limit_response(e)
            }
            AuthAPIError::UnexpectedError(_) => {
                log_error_chain(&self, Level::ERROR);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unexpected error".to_string(),
                )
            }
            AuthAPIError::MissingToken => {
                log_error_chain(&self, Level::DEBUG);
                (StatusCode::UNAUTHORIZED, "Missing token".to_string())
            }
            AuthAPIError::InvalidToken => {
                log_error_chain(&self, Level::DEBUG);
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string())
            }
        };
        let body = Json(ErrorResponse {
            error: error_message,
        });
        (status, body).into_response()
    }
}

impl IntoResponse for WorkspaceAPIError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            WorkspaceAPIError::AuthenticationError(auth_error) => {
                return auth_error.into_response()
            }
            ref e @ WorkspaceAPIError::Conflict(ref message) => {
                log_error_chain(e, Level::DEBUG);
                (StatusCode::CONFLICT, message.clone())
            }
            ref e @ WorkspaceAPIError::Forbidden(ref message) => {
                log_error_chain(e, Level::DEBUG);
                (StatusCode::FORBIDDEN, message.clone())
            }
            ref e @ WorkspaceAPIError::IDNotFoundError(id) => {
                log_error_chain(e, Level::DEBUG);
                (StatusCode::NOT_FOUND, format!("Not found: {id}"))
            }
            ref e @ WorkspaceAPIError::PaymentProviderError(_) => {
                log_error_chain(e, Level::ERROR);
                (
                    StatusCode::BAD_GATEWAY,
                    "Payment provider error".to_string(),
                )
            }
            ref e @ WorkspaceAPIError::PlanLimitError(ref limit) => {
                log_error_chain(e, Level::DEBUG);
                plan_limit_response(limit)
            }
            ref e @ WorkspaceAPIError::UnexpectedError(_) => {
                log_error_chain(e, Level::ERROR);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unexpected error".to_string(),
                )
            }
            ref e @ WorkspaceAPIError::ValidationError(ref validation) => {
                log_error_chain(e, Level::DEBUG);
                (StatusCode::BAD_REQUEST, validation.as_ref().to_owned())
            }
        };
        let body = Json(ErrorResponse {
            error: error_message,
        });
        (status, body).into_response()
    }
}

impl IntoResponse for BillingAPIError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            BillingAPIError::InvalidSignature(_) => {
                log_error_chain(&self, Level::DEBUG);
                (StatusCode::BAD_REQUEST, "Invalid signature".to_string())
            }
            BillingAPIError::MalformedEvent(_) => {
                log_error_chain(&self, Level::DEBUG);
                (StatusCode::BAD_REQUEST, "Malformed event".to_string())
            }
            BillingAPIError::UnexpectedError(_) => {
                log_error_chain(&self, Level::ERROR);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unexpected error".to_string(),
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error_message,
        });
        (status, body).into_response()
    }
}

fn plan_limit_response(e: &PlanLimitError) -> (StatusCode, String) {
    (StatusCode::PAYMENT_REQUIRED, e.to_string())
}

fn log_error_chain(e: &(dyn Error + 'static), debug_level: Level) {
    let separator =
        "\n-----------------------------------------------------------------------------------\n";
    let mut report = format!("{}{:?}\n", separator, e);
    let mut current = e.source();
    while let Some(cause) = current {
        let str = format!("Caused by:\n\n{:?}", cause);
        report = format!("{}\n{}", report, str);
        current = cause.source();
    }
    report = format!("{}\n{}", report, separator);
    match debug_level {
        Level::ERROR => tracing::error!("{}", report),
        Level::WARN => tracing::warn!("{}", report),
        Level::INFO => tracing::info!("{}", report),
        Level::DEBUG => tracing::debug!("{}", report),
        Level::TRACE => tracing::trace!("{}", report),
    }
}

pub struct Application {
    server: Serve<Router, Router>,
    pub address: String,
}

impl Application {
    pub async fn build(
        app_state: AppState,
        address: &str,
    ) -> Result<Self, Box<dyn Error>> {
        let allowed_origins: Vec<HeaderValue> = vec![
            "http://localhost:3000".parse()?,
            "http://127.0.0.1:3000".parse()?,
            app_state.settings.app_url.parse()?,
        ];

        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_credentials(true)
            .allow_origin(allowed_origins);

        let router = Router::new()
            .route("/auth/signup", post(signup))
            .route("/auth/login", post(login))
            .route("/auth/logout", post(logout))
            .route("/auth/verify-token", post(verify_token))
            .route("/auth/me", get(me))
            .route("/workspace", get(get_workspace))
            .route("/workspace/settings", put(update_settings))
            .route("/users", get(list_users))
            .route("/users/:id/role", put(change_role))
            .route("/users/:id/deactivate", post(deactivate_user))
            .route("/users/:id/reactivate", post(reactivate_user))
            .route("/invites", get(list_invites).post(create_invite))
            .route("/invites/accept", get(get_invite).post(accept_invite))
            .route("/invites/:id", axum::routing::delete(revoke_invite))
            .route("/skills", get(list_skills).post(create_skill))
            .route("/skills/:id", axum::routing::delete(delete_skill))
            .route(
                "/team-members",
                get(list_team_members).post(create_team_member),
            )
            .route("/team-members/import", post(import_team_members))
            .route(
                "/team-members/:id",
                get(get_team_member).put(update_team_member),
            )
            .route(
                "/team-members/:id/deactivate",
                post(deactivate_team_member),
            )
            .route(
                "/team-members/:id/reactivate",
                post(reactivate_team_member),
            )
            .route("/projects", get(list_projects).post(create_project))
            .route("/projects/health", get(list_project_health))
            .route("/projects/:id", get(get_project).put(update_project))
            .route("/projects/:id/archive", post(archive_project))
            .route(
                "/assignments",
                get(list_assignments).post(create_assignment),
            )
            .route(
                "/assignments/:id",
                put(update_assignment).delete(delete_assignment),
            )
            .route("/capacity/utilization", get(utilization_report))
            .route("/capacity/over-allocations", get(over_allocations))
            .route("/capacity/members/:id", get(member_capacity))
            .route("/dashboard", get(dashboard))
            .route("/reports/utilization.csv", get(export_utilization_report))
            .route("/billing", get(billing_summary))
            .route("/billing/checkout", post(checkout))
            .route("/billing/portal", post(portal))
            .route("/webhooks/stripe", post(stripe_webhook))
            .with_state(app_state)
            .layer(cors)
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(make_span_with_request_id)
                    .on_request(on_request)
                    .on_response(on_response),
            );

        let listener = tokio::net::TcpListener::bind(address).await?;
        let address = listener.local_addr()?.to_string();
        let server = axum::serve(listener, router);

        Ok(Application { server, address })
    }

    pub async fn run(self) -> Result<(), std::io::Error> {
        tracing::info!("listening on {}", &self.address);
        self.server.with_graceful_shutdown(shutdown_signal()).await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

pub async fn get_postgres_pool(
    url: &Secret<String>,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(url.expose_secret())
        .await
}

pub fn get_redis_client(redis_hostname: String) -> RedisResult<Client> {
    let redis_url = format!("redis://{}/", redis_hostname);
    redis::Client::open(redis_url)
}
