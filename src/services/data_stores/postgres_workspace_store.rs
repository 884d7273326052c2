use chrono::{DateTime, Utc};
use color_eyre::eyre::eyre;
use secrecy::{ExposeSecret, Secret};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    Email, InviteId, InviteToken, Name, Slug, UserId, UserRole,
    UtilizationThresholds, Workspace, WorkspaceId, WorkspaceInvite,
    WorkspaceStore, WorkspaceStoreError,
};

pub struct PostgresWorkspaceStore {
    pool: PgPool,
}

impl PostgresWorkspaceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn unexpected(e: impl Into<color_eyre::eyre::Report>) -> WorkspaceStoreError {
    WorkspaceStoreError::UnexpectedError(e.into())
}

#[derive(sqlx::FromRow)]
struct WorkspaceRow {
    id: Uuid,
    name: String,
    slug: String,
    plan: String,
    billing_status: String,
    stripe_customer_id: Option<String>,
    stripe_subscription_id: Option<String>,
    trial_ends_at: Option<DateTime<Utc>>,
    over_allocation_threshold: i32,
    under_utilization_threshold: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<WorkspaceRow> for Workspace {
    type Error = WorkspaceStoreError;

    fn try_from(row: WorkspaceRow) -> Result<Self, Self::Error> {
        let over: u16 = row.over_allocation_threshold.try_into().map_err(|e| {
            unexpected(eyre!("invalid over-allocation threshold: {e}"))
        })?;
        let under: u16 =
            row.under_utilization_threshold.try_into().map_err(|e| {
                unexpected(eyre!("invalid under-utilization threshold: {e}"))
            })?;
        Ok(Workspace {
            id: WorkspaceId::new(row.id),
            name: Name::parse("Workspace name", &row.name).map_err(unexpected)?,
            slug: Slug::parse(&row.slug).map_err(unexpected)?,
            plan: row.plan.parse().map_err(unexpected)?,
            billing_status: row.billing_status.parse().map_err(unexpected)?,
            stripe_customer_id: row.stripe_customer_id,
            stripe_subscription_id: row.stripe_subscription_id,
            trial_ends_at: row.trial_ends_at,
            thresholds: UtilizationThresholds::parse(over, under)
                .map_err(unexpected)?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct InviteRow {
    id: Uuid,
    workspace_id: Uuid,
    email: String,
    role: String,
    token: String,
    invited_by: Uuid,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    accepted_at: Option<DateTime<Utc>>,
}

impl TryFrom<InviteRow> for WorkspaceInvite {
    type Error = WorkspaceStoreError;

    fn try_from(row: InviteRow) -> Result<Self, Self::Error> {
        Ok(WorkspaceInvite {
            id: InviteId::new(row.id),
            workspace_id: WorkspaceId::new(row.workspace_id),
            email: Email::parse(Secret::new(row.email)).map_err(unexpected)?,
            role: row.role.parse::<UserRole>().map_err(unexpected)?,
            token: InviteToken::parse(Secret::new(row.token))
                .map_err(unexpected)?,
            invited_by: UserId::new(row.invited_by),
            created_at: row.created_at,
            expires_at: row.expires_at,
            accepted_at: row.accepted_at,
        })
    }
}

const SELECT_WORKSPACE: &str = r#"
    SELECT id, name, slug, plan, billing_status, stripe_customer_id,
           stripe_subscription_id, trial_ends_at, over_allocation_threshold,
           under_utilization_threshold, created_at
    FROM workspaces
"#;

const SELECT_INVITE: &str = r#"
    SELECT id, workspace_id, email, role, token, invited_by, created_at,
           expires_at, accepted_at
    FROM workspace_invites
"#;

#[async_trait::async_trait]
impl WorkspaceStore for PostgresWorkspaceStore {
    #[tracing::instrument(name = "Adding workspace to PostgreSQL", skip_all)]
    async fn add_workspace(
        &mut self,
        workspace: Workspace,
    ) -> Result<(), WorkspaceStoreError> {
        sqlx::query(
            r#"
            INSERT INTO workspaces (
                id, name, slug, plan, billing_status, stripe_customer_id,
                stripe_subscription_id, trial_ends_at, over_allocation_threshold,
                under_utilization_threshold, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(workspace.id.as_ref())
        .bind(workspace.name.as_ref())
        .bind(workspace.slug.as_ref())
        .bind(workspace.plan.as_str())
        .bind(workspace.billing_status.as_str())
        .bind(&workspace.stripe_customer_id)
        .bind(&workspace.stripe_subscription_id)
        .bind(workspace.trial_ends_at)
        .bind(i32::from(workspace.thresholds.over_allocation))
        .bind(i32::from(workspace.thresholds.under_utilization))
        .bind(workspace.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                WorkspaceStoreError::SlugTaken
            }
            err => unexpected(err),
        })?;
        Ok(())
    }

    #[tracing::instrument(name = "Retrieving workspace from PostgreSQL", skip_all)]
    async fn get_workspace(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Workspace, WorkspaceStoreError> {
        sqlx::query_as::<_, WorkspaceRow>(&format!(
            "{SELECT_WORKSPACE} WHERE id = $1"
        ))
        .bind(workspace_id.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => WorkspaceStoreError::WorkspaceNotFound,
            err => unexpected(err),
        })?
        .try_into()
    }

    #[tracing::instrument(
        name = "Retrieving workspace by Stripe customer from PostgreSQL",
        skip_all
    )]
    async fn get_workspace_by_customer(
        &self,
        stripe_customer_id: &str,
    ) -> Result<Workspace, WorkspaceStoreError> {
        sqlx::query_as::<_, WorkspaceRow>(&format!(
            "{SELECT_WORKSPACE} WHERE stripe_customer_id = $1"
        ))
        .bind(stripe_customer_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => WorkspaceStoreError::WorkspaceNotFound,
            err => unexpected(err),
        })?
        .try_into()
    }

    #[tracing::instrument(name = "Updating workspace in PostgreSQL", skip_all)]
    async fn update_workspace(
        &mut self,
        workspace: &Workspace,
    ) -> Result<(), WorkspaceStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE workspaces
            SET name = $2, plan = $3, billing_status = $4,
                stripe_customer_id = $5, stripe_subscription_id = $6,
                trial_ends_at = $7, over_allocation_threshold = $8,
                under_utilization_threshold = $9
            WHERE id = $1
            "#,
        )
        .bind(workspace.id.as_ref())
        .bind(workspace.name.as_ref())
        .bind(workspace.plan.as_str())
        .bind(workspace.billing_status.as_str())
        .bind(&workspace.stripe_customer_id)
        .bind(&workspace.stripe_subscription_id)
        .bind(workspace.trial_ends_at)
        .bind(i32::from(workspace.thresholds.over_allocation))
        .bind(i32::from(workspace.thresholds.under_utilization))
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(WorkspaceStoreError::WorkspaceNotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Checking workspace slug in PostgreSQL", skip_all)]
    async fn slug_exists(&self, slug: &str) -> Result<bool, WorkspaceStoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM workspaces WHERE slug = $1)",
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)
    }

    #[tracing::instrument(name = "Adding invite to PostgreSQL", skip_all)]
    async fn add_invite(
        &mut self,
        invite: WorkspaceInvite,
    ) -> Result<(), WorkspaceStoreError> {
        sqlx::query(
            r#"
            INSERT INTO workspace_invites (
                id, workspace_id, email, role, token, invited_by, created_at,
                expires_at, accepted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(invite.id.as_ref())
        .bind(invite.workspace_id.as_ref())
        .bind(invite.email.as_ref().expose_secret())
        .bind(invite.role.as_str())
        .bind(invite.token.as_ref().expose_secret())
        .bind(invite.invited_by.as_ref())
        .bind(invite.created_at)
        .bind(invite.expires_at)
        .bind(invite.accepted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                WorkspaceStoreError::WorkspaceNotFound
            }
            err => unexpected(err),
        })?;
        Ok(())
    }

    #[tracing::instrument(name = "Retrieving invite from PostgreSQL", skip_all)]
    async fn get_invite_by_token(
        &self,
        token: &InviteToken,
    ) -> Result<WorkspaceInvite, WorkspaceStoreError> {
        sqlx::query_as::<_, InviteRow>(&format!("{SELECT_INVITE} WHERE token = $1"))
            .bind(token.as_ref().expose_secret())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => WorkspaceStoreError::InviteNotFound,
                err => unexpected(err),
            })?
            .try_into()
    }

    #[tracing::instrument(name = "Listing pending invites from PostgreSQL", skip_all)]
    async fn list_pending_invites(
        &self,
        workspace_id: &WorkspaceId,
        now: DateTime<Utc>,
    ) -> Result<Vec<WorkspaceInvite>, WorkspaceStoreError> {
        sqlx::query_as::<_, InviteRow>(&format!(
            r#"{SELECT_INVITE}
            WHERE workspace_id = $1 AND accepted_at IS NULL AND expires_at > $2
            ORDER BY created_at"#
        ))
        .bind(workspace_id.as_ref())
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?
        .into_iter()
        .map(WorkspaceInvite::try_from)
        .collect()
    }

    #[tracing::instrument(name = "Accepting invite in PostgreSQL", skip_all)]
    async fn mark_invite_accepted(
        &mut self,
        invite_id: &InviteId,
        accepted_at: DateTime<Utc>,
    ) -> Result<(), WorkspaceStoreError> {
        let result = sqlx::query(
            "UPDATE workspace_invites SET accepted_at = $2 WHERE id = $1",
        )
        .bind(invite_id.as_ref())
        .bind(accepted_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(WorkspaceStoreError::InviteNotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Deleting invite from PostgreSQL", skip_all)]
    async fn delete_invite(
        &mut self,
        workspace_id: &WorkspaceId,
        invite_id: &InviteId,
    ) -> Result<(), WorkspaceStoreError> {
        let result = sqlx::query(
            "DELETE FROM workspace_invites WHERE id = $1 AND workspace_id = $2",
        )
        .bind(invite_id.as_ref())
        .bind(workspace_id.as_ref())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(WorkspaceStoreError::InviteNotFound);
        }
        Ok(())
    }
}
