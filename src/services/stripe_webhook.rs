//! Verification and decoding of Stripe webhook deliveries.
//!
//! Stripe signs each delivery with a `Stripe-Signature` header of the form
//! `t=<unix timestamp>,v1=<hex signature>[,v1=...]`, where the signature is
//! an HMAC-SHA256 of `"{t}.{raw body}"` keyed with the endpoint secret.

use chrono::{DateTime, Utc};
use color_eyre::eyre::{eyre, Report, Result};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use sha2::Sha256;
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::{BillingStatus, Plan, WorkspaceId};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";
pub const SIGNATURE_TOLERANCE_SECONDS: i64 = 300;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("Malformed signature header")]
    MalformedHeader,
    #[error("No signature matches the payload")]
    NoMatchingSignature,
    #[error("Signature timestamp outside the tolerance window")]
    TimestampOutsideTolerance,
    #[error("Unexpected error")]
    UnexpectedError(#[source] Report),
}

fn mac(secret: &Secret<String>, timestamp: i64, payload: &[u8]) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|e| eyre!("invalid webhook signing secret: {e}"))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Hex encoded `v1` signature for a payload sent at `timestamp`.
pub fn sign_payload(
    secret: &Secret<String>,
    timestamp: i64,
    payload: &[u8],
) -> Result<String> {
    let signature = mac(secret, timestamp, payload)?.finalize().into_bytes();
    Ok(hex::encode(signature))
}

/// A complete `Stripe-Signature` header value.
pub fn signature_header(
    secret: &Secret<String>,
    timestamp: i64,
    payload: &[u8],
) -> Result<String> {
    Ok(format!("t={timestamp},v1={}", sign_payload(secret, timestamp, payload)?))
}

pub fn verify_signature(
    secret: &Secret<String>,
    header: &str,
    payload: &[u8],
    now: DateTime<Utc>,
) -> Result<(), SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| SignatureError::MalformedHeader)?,
                );
            }
            Some(("v1", value)) => signatures.push(value),
            Some(_) => {}
            None => return Err(SignatureError::MalformedHeader),
        }
    }
    let timestamp = timestamp.ok_or(SignatureError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(SignatureError::MalformedHeader);
    }

    if now.timestamp().abs_diff(timestamp)
        > SIGNATURE_TOLERANCE_SECONDS.unsigned_abs()
    {
        return Err(SignatureError::TimestampOutsideTolerance);
    }

    for signature in signatures {
        let Ok(expected) = hex::decode(signature) else {
            continue;
        };
        let mac = mac(secret, timestamp, payload)
            .map_err(SignatureError::UnexpectedError)?;
        if mac.verify_slice(&expected).is_ok() {
            return Ok(());
        }
    }
    Err(SignatureError::NoMatchingSignature)
}

#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionObject {
    customer: Option<String>,
    subscription: Option<String>,
    client_reference_id: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionObject {
    id: String,
    customer: String,
    status: String,
    #[serde(default)]
    items: Option<SubscriptionItems>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionItems {
    data: Vec<SubscriptionItem>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionItem {
    price: Price,
}

#[derive(Debug, Deserialize)]
struct Price {
    id: String,
}

#[derive(Debug, Deserialize)]
struct InvoiceObject {
    customer: String,
}

/// The subset of Stripe events that change a workspace's billing state.
#[derive(Debug, Clone, PartialEq)]
pub enum BillingEvent {
    CheckoutCompleted {
        workspace_id: WorkspaceId,
        customer_id: String,
        subscription_id: Option<String>,
        plan: Option<Plan>,
    },
    SubscriptionUpdated {
        customer_id: String,
        subscription_id: String,
        status: BillingStatus,
        price_id: Option<String>,
    },
    SubscriptionDeleted {
        customer_id: String,
    },
    PaymentFailed {
        customer_id: String,
    },
    Ignored {
        event_type: String,
    },
}

impl TryFrom<StripeEvent> for BillingEvent {
    type Error = Report;

    fn try_from(event: StripeEvent) -> Result<Self> {
        let object = event.data.object;
        let billing_event = match event.event_type.as_str() {
            "checkout.session.completed" => {
                let session: CheckoutSessionObject =
                    serde_json::from_value(object)?;
                let workspace_id = session
                    .metadata
                    .get("workspace_id")
                    .or(session.client_reference_id.as_ref())
                    .ok_or_else(|| eyre!("checkout session has no workspace id"))?;
                BillingEvent::CheckoutCompleted {
                    workspace_id: WorkspaceId::parse(workspace_id)?,
                    customer_id: session
                        .customer
                        .ok_or_else(|| eyre!("checkout session has no customer"))?,
                    subscription_id: session.subscription,
                    plan: session
                        .metadata
                        .get("plan")
                        .map(|plan| plan.parse::<Plan>())
                        .transpose()?,
                }
            }
            "customer.subscription.updated" => {
                let subscription: SubscriptionObject =
                    serde_json::from_value(object)?;
                BillingEvent::SubscriptionUpdated {
                    status: map_subscription_status(&subscription.status),
                    price_id: subscription
                        .items
                        .and_then(|items| items.data.into_iter().next())
                        .map(|item| item.price.id),
                    customer_id: subscription.customer,
                    subscription_id: subscription.id,
                }
            }
            "customer.subscription.deleted" => {
                let subscription: SubscriptionObject =
                    serde_json::from_value(object)?;
                BillingEvent::SubscriptionDeleted {
                    customer_id: subscription.customer,
                }
            }
            "invoice.payment_failed" => {
                let invoice: InvoiceObject = serde_json::from_value(object)?;
                BillingEvent::PaymentFailed {
                    customer_id: invoice.customer,
                }
            }
            other => BillingEvent::Ignored {
                event_type: other.to_owned(),
            },
        };
        Ok(billing_event)
    }
}

pub fn map_subscription_status(status: &str) -> BillingStatus {
    match status {
        "active" => BillingStatus::Active,
        "trialing" => BillingStatus::Trialing,
        "past_due" | "unpaid" => BillingStatus::PastDue,
        "canceled" | "incomplete_expired" => BillingStatus::Canceled,
        _ => BillingStatus::Incomplete,
    }
}
