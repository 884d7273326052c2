use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use color_eyre::eyre::eyre;
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    domain::{
        BillingAPIError, BillingStatus, Plan, UserRole, Workspace,
        WorkspaceStoreError,
    },
    services::{
        notifications::{
            send_in_background, PaymentFailedEmail, PAYMENT_FAILED_SUBJECT,
        },
        stripe_webhook::{
            verify_signature, BillingEvent, StripeEvent, SIGNATURE_HEADER,
        },
    },
};

#[tracing::instrument(name = "Stripe webhook route handler", skip_all)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<WebhookAck>), BillingAPIError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            BillingAPIError::InvalidSignature(eyre!("missing signature header"))
        })?;
    verify_signature(
        &state.settings.stripe_webhook_secret,
        signature,
        &body,
        Utc::now(),
    )
    .map_err(|e| BillingAPIError::InvalidSignature(eyre!(e)))?;

    let event: StripeEvent = serde_json::from_slice(&body)
        .map_err(|e| BillingAPIError::MalformedEvent(eyre!(e)))?;
    let event_id = event.id.clone();
    let billing_event =
        BillingEvent::try_from(event).map_err(BillingAPIError::MalformedEvent)?;

    tracing::info!(event_id = %event_id, "stripe event received");
    handle_billing_event(&state, billing_event).await?;

    Ok((StatusCode::OK, Json(WebhookAck { received: true })))
}

#[tracing::instrument(name = "Applying billing event", skip_all)]
async fn handle_billing_event(
    state: &AppState,
    event: BillingEvent,
) -> Result<(), BillingAPIError> {
    let mut workspace_store = state.workspace_store.write().await;

    let lookup = match &event {
        BillingEvent::CheckoutCompleted { workspace_id, .. } => {
            workspace_store.get_workspace(workspace_id).await
        }
        BillingEvent::SubscriptionUpdated { customer_id, .. }
        | BillingEvent::SubscriptionDeleted { customer_id }
        | BillingEvent::PaymentFailed { customer_id } => {
            workspace_store.get_workspace_by_customer(customer_id).await
        }
        BillingEvent::Ignored { event_type } => {
            tracing::debug!(event_type = %event_type, "ignoring stripe event");
            return Ok(());
        }
    };

    // Acknowledged so that Stripe does not keep retrying.
    let mut workspace = match lookup {
        Ok(workspace) => workspace,
        Err(WorkspaceStoreError::WorkspaceNotFound) => {
            tracing::warn!("no workspace for stripe event");
            return Ok(());
        }
        Err(e) => return Err(BillingAPIError::UnexpectedError(eyre!(e))),
    };

    let payment_failed = matches!(event, BillingEvent::PaymentFailed { .. });
    apply_billing_event(&mut workspace, event, |price_id| {
        state.settings.stripe_prices.plan_for(price_id)
    });

    workspace_store
        .update_workspace(&workspace)
        .await
        .map_err(|e| BillingAPIError::UnexpectedError(eyre!(e)))?;
    drop(workspace_store);

    tracing::info!(
        workspace_id = %workspace.id,
        plan = %workspace.plan,
        status = workspace.billing_status.as_str(),
        "billing updated"
    );

    if payment_failed {
        notify_owners_of_failed_payment(state, &workspace).await?;
    }
    Ok(())
}

/// Applies a billing event to the workspace. `plan_for_price` resolves Stripe
/// price ids to plans.
pub fn apply_billing_event(
    workspace: &mut Workspace,
    event: BillingEvent,
    plan_for_price: impl Fn(&str) -> Option<Plan>,
) {
    match event {
        BillingEvent::CheckoutCompleted {
            customer_id,
            subscription_id,
            plan,
            ..
        } => {
            workspace.stripe_customer_id = Some(customer_id);
            if subscription_id.is_some() {
                workspace.stripe_subscription_id = subscription_id;
            }
            if let Some(plan) = plan {
                workspace.plan = plan;
            }
            workspace.billing_status = BillingStatus::Active;
        }
        BillingEvent::SubscriptionUpdated {
            subscription_id,
            status,
            price_id,
            ..
        } => {
            workspace.stripe_subscription_id = Some(subscription_id);
            workspace.billing_status = status;
            if let Some(plan) = price_id.as_deref().and_then(&plan_for_price) {
                workspace.plan = plan;
            }
        }
        BillingEvent::SubscriptionDeleted { .. } => {
            workspace.plan = Plan::Free;
            workspace.billing_status = BillingStatus::Canceled;
            workspace.stripe_subscription_id = None;
        }
        BillingEvent::PaymentFailed { .. } => {
            workspace.billing_status = BillingStatus::PastDue;
        }
        BillingEvent::Ignored { .. } => (),
    }
}

async fn notify_owners_of_failed_payment(
    state: &AppState,
    workspace: &Workspace,
) -> Result<(), BillingAPIError> {
    let owners = state
        .user_store
        .read()
        .await
        .list_users(&workspace.id)
        .await
        .map_err(|e| BillingAPIError::UnexpectedError(eyre!(e)))?
        .into_iter()
        .filter(|user| user.active && user.role == UserRole::Owner);

    let billing_url = format!("{}/billing", state.settings.app_url);
    for owner in owners {
        send_in_background(
            state.email_client.clone(),
            owner.email,
            PAYMENT_FAILED_SUBJECT,
            &PaymentFailedEmail {
                workspace: workspace.name.as_ref(),
                billing_url: &billing_url,
            },
        );
    }
    Ok(())
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}
