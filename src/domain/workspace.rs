use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::{Name, ValidationError, WorkspaceId};

pub const TRIAL_LENGTH_DAYS: i64 = 14;
pub const DEFAULT_OVER_ALLOCATION_THRESHOLD: u16 = 100;
pub const DEFAULT_UNDER_UTILIZATION_THRESHOLD: u16 = 70;
const MAX_THRESHOLD: u16 = 500;

lazy_static! {
    static ref SLUG_PATTERN: Regex =
        Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Free,
    Starter,
    Pro,
    Agency,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Starter => "starter",
            Plan::Pro => "pro",
            Plan::Agency => "agency",
        }
    }

    pub fn is_paid(&self) -> bool {
        !matches!(self, Plan::Free)
    }
}

impl FromStr for Plan {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Plan::Free),
            "starter" => Ok(Plan::Starter),
            "pro" => Ok(Plan::Pro),
            "agency" => Ok(Plan::Agency),
            _ => Err(ValidationError::new(format!("Unknown plan: {s}"))),
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    Incomplete,
}

impl BillingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingStatus::Active => "active",
            BillingStatus::Trialing => "trialing",
            BillingStatus::PastDue => "past_due",
            BillingStatus::Canceled => "canceled",
            BillingStatus::Incomplete => "incomplete",
        }
    }
}

impl FromStr for BillingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(BillingStatus::Active),
            "trialing" => Ok(BillingStatus::Trialing),
            "past_due" => Ok(BillingStatus::PastDue),
            "canceled" => Ok(BillingStatus::Canceled),
            "incomplete" => Ok(BillingStatus::Incomplete),
            _ => Err(ValidationError::new(format!(
                "Unknown billing status: {s}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slug(String);

impl Slug {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        if s.len() > 63 || !SLUG_PATTERN.is_match(s) {
            return Err(ValidationError::new(format!("Invalid slug: {s}")));
        }
        Ok(Self(s.to_owned()))
    }

    /// Derives a slug from a workspace name, e.g. "Craggy Island Studio!" →
    /// "craggy-island-studio". Falls back to "workspace" when nothing usable
    /// remains.
    pub fn from_name(name: &Name) -> Self {
        let mut slug = String::new();
        for c in name.as_ref().chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        let mut slug = slug.trim_end_matches('-').to_owned();
        slug.truncate(48);
        let slug = slug.trim_end_matches('-');
        if slug.is_empty() {
            Self(String::from("workspace"))
        } else {
            Self(slug.to_owned())
        }
    }

    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self(format!("{}-{}", self.0, suffix))
    }
}

impl AsRef<String> for Slug {
    fn as_ref(&self) -> &String {
        &self.0
    }
}

/// Percent thresholds used to classify weekly utilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationThresholds {
    pub over_allocation: u16,
    pub under_utilization: u16,
}

impl UtilizationThresholds {
    pub fn parse(
        over_allocation: u16,
        under_utilization: u16,
    ) -> Result<Self, ValidationError> {
        for value in [over_allocation, under_utilization] {
            if value == 0 || value > MAX_THRESHOLD {
                return Err(ValidationError::new(format!(
                    "Thresholds must be between 1 and {MAX_THRESHOLD} percent"
                )));
            }
        }
        if under_utilization >= over_allocation {
            return Err(ValidationError::new(String::from(
                "Under-utilization threshold must be below the over-allocation threshold",
            )));
        }
        Ok(Self {
            over_allocation,
            under_utilization,
        })
    }
}

impl Default for UtilizationThresholds {
    fn default() -> Self {
        Self {
            over_allocation: DEFAULT_OVER_ALLOCATION_THRESHOLD,
            under_utilization: DEFAULT_UNDER_UTILIZATION_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: Name,
    pub slug: Slug,
    pub plan: Plan,
    pub billing_status: BillingStatus,
    #[serde(skip_serializing)]
    pub stripe_customer_id: Option<String>,
    #[serde(skip_serializing)]
    pub stripe_subscription_id: Option<String>,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub thresholds: UtilizationThresholds,
    pub created_at: DateTime<Utc>,
}

impl Workspace {
    /// A new workspace starts on the free plan with a trial period.
    pub fn new(name: Name, slug: Slug, now: DateTime<Utc>) -> Self {
        Self {
            id: WorkspaceId::default(),
            name,
            slug,
            plan: Plan::Free,
            billing_status: BillingStatus::Trialing,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            trial_ends_at: Some(now + Duration::days(TRIAL_LENGTH_DAYS)),
            thresholds: UtilizationThresholds::default(),
            created_at: now,
        }
    }

    /// The plan whose limits apply right now. Canceled subscriptions and
    /// lapsed trials fall back to the free plan.
    pub fn effective_plan(&self, now: DateTime<Utc>) -> Plan {
        match self.billing_status {
            BillingStatus::Canceled => Plan::Free,
            BillingStatus::Trialing => match self.trial_ends_at {
                Some(trial_end) if trial_end < now => Plan::Free,
                _ => self.plan,
            },
            _ => self.plan,
        }
    }
}
