use color_eyre::eyre::Report;
use thiserror::Error;

use super::PlanLimitError;

#[derive(Debug, Error)]
pub enum AuthAPIError {
    #[error("Invalid credentials")]
    IncorrectCredentials,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Missing token")]
    MissingToken,
    #[error("Invalid invite token")]
    InvalidInvite,
    #[error("Invite expired")]
    InviteExpired,
    #[error("Plan limit error")]
    PlanLimitError(#[from] PlanLimitError),
    #[error("Unexpected error")]
    UnexpectedError(#[source] Report),
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("User is deactivated")]
    UserDeactivated,
    #[error("User not found")]
    UserNotFound,
    #[error("Validation error")]
    ValidationError(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum WorkspaceAPIError {
    #[error("Authentication error")]
    AuthenticationError(#[from] AuthAPIError),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Resource with ID not found: {0}")]
    IDNotFoundError(uuid::Uuid),
    #[error("Payment provider error")]
    PaymentProviderError(#[source] Report),
    #[error("Plan limit error")]
    PlanLimitError(#[from] PlanLimitError),
    #[error("Unexpected error")]
    UnexpectedError(#[source] Report),
    #[error("Validation error")]
    ValidationError(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum BillingAPIError {
    #[error("Invalid webhook signature")]
    InvalidSignature(#[source] Report),
    #[error("Malformed webhook event")]
    MalformedEvent(#[source] Report),
    #[error("Unexpected error")]
    UnexpectedError(#[source] Report),
}

#[derive(Debug, Error)]
#[error("Validation error: {0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(message: String) -> Self {
        Self(message)
    }

    pub fn as_ref(&self) -> &String {
        &self.0
    }
}
