use askama::Template;
use tracing::Instrument;

use crate::{app_state::EmailClientType, domain::Email};

pub const WELCOME_SUBJECT: &str = "Welcome to ProCapacity";
pub const INVITE_SUBJECT: &str = "You have been invited to ProCapacity";
pub const PAYMENT_FAILED_SUBJECT: &str = "Payment failed for your ProCapacity plan";

#[derive(Template)]
#[template(path = "emails/welcome.txt")]
pub struct WelcomeEmail<'a> {
    pub name: &'a str,
    pub workspace: &'a str,
    pub trial_days: i64,
    pub app_url: &'a str,
}

#[derive(Template)]
#[template(path = "emails/invite.txt")]
pub struct InviteEmail<'a> {
    pub inviter: &'a str,
    pub workspace: &'a str,
    pub role: &'a str,
    pub accept_url: &'a str,
    pub expires_on: String,
}

#[derive(Template)]
#[template(path = "emails/payment_failed.txt")]
pub struct PaymentFailedEmail<'a> {
    pub workspace: &'a str,
    pub billing_url: &'a str,
}

/// Renders `message` and sends it from a background task. Failures are
/// logged and never reach the caller.
#[tracing::instrument(name = "Queueing email", skip_all)]
pub fn send_in_background<T: Template>(
    email_client: EmailClientType,
    recipient: Email,
    subject: &str,
    message: &T,
) {
    let content = match message.render() {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to render email");
            return;
        }
    };
    let subject = subject.to_owned();

    tokio::spawn(
        async move {
            if let Err(e) = email_client
                .send_email(&recipient, &subject, &content)
                .await
            {
                tracing::warn!(error = ?e, "Failed to send email");
            }
        }
        .instrument(tracing::Span::current()),
    );
}
