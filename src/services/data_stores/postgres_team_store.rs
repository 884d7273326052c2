use color_eyre::eyre::Report;
use secrecy::{ExposeSecret, Secret};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    Email, Name, Skill, SkillId, TeamMember, TeamMemberId, TeamStore,
    TeamStoreError, WeeklyHours, WorkspaceId,
};

pub struct PostgresTeamStore {
    pool: PgPool,
}

impl PostgresTeamStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn unexpected(e: impl Into<Report>) -> TeamStoreError {
    TeamStoreError::UnexpectedError(e.into())
}

#[derive(sqlx::FromRow)]
struct TeamMemberRow {
    id: Uuid,
    workspace_id: Uuid,
    name: String,
    email: Option<String>,
    role: Option<String>,
    weekly_capacity: f64,
    skill_ids: Vec<Uuid>,
    hourly_rate: Option<f64>,
    active: bool,
}

impl TryFrom<TeamMemberRow> for TeamMember {
    type Error = TeamStoreError;

    fn try_from(row: TeamMemberRow) -> Result<Self, Self::Error> {
        let email = row
            .email
            .map(|e| Email::parse(Secret::new(e)))
            .transpose()
            .map_err(unexpected)?;
        Ok(TeamMember {
            id: TeamMemberId::new(row.id),
            workspace_id: WorkspaceId::new(row.workspace_id),
            name: Name::parse("Name", &row.name).map_err(unexpected)?,
            email,
            role: row.role,
            weekly_capacity: WeeklyHours::capacity(row.weekly_capacity)
                .map_err(unexpected)?,
            skill_ids: row.skill_ids.into_iter().map(SkillId::new).collect(),
            hourly_rate: row.hourly_rate,
            active: row.active,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SkillRow {
    id: Uuid,
    workspace_id: Uuid,
    name: String,
}

impl TryFrom<SkillRow> for Skill {
    type Error = TeamStoreError;

    fn try_from(row: SkillRow) -> Result<Self, Self::Error> {
        Ok(Skill {
            id: SkillId::new(row.id),
            workspace_id: WorkspaceId::new(row.workspace_id),
            name: Skill::parse_name(&row.name).map_err(unexpected)?,
        })
    }
}

fn skill_uuids(skill_ids: &[SkillId]) -> Vec<Uuid> {
    skill_ids.iter().map(|id| *id.as_ref()).collect()
}

const SELECT_TEAM_MEMBER: &str = r#"
    SELECT id, workspace_id, name, email, role, weekly_capacity, skill_ids,
           hourly_rate, active
    FROM team_members
"#;

#[async_trait::async_trait]
impl TeamStore for PostgresTeamStore {
    #[tracing::instrument(name = "Adding team member to PostgreSQL", skip_all)]
    async fn add_team_member(
        &mut self,
        member: TeamMember,
    ) -> Result<(), TeamStoreError> {
        sqlx::query(
            r#"
            INSERT INTO team_members (
                id, workspace_id, name, email, role, weekly_capacity,
                skill_ids, hourly_rate, active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(member.id.as_ref())
        .bind(member.workspace_id.as_ref())
        .bind(member.name.as_ref())
        .bind(member.email.as_ref().map(|e| e.as_ref().expose_secret()))
        .bind(&member.role)
        .bind(member.weekly_capacity.value_of())
        .bind(skill_uuids(&member.skill_ids))
        .bind(member.hourly_rate)
        .bind(member.active)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    #[tracing::instrument(name = "Retrieving team member from PostgreSQL", skip_all)]
    async fn get_team_member(
        &self,
        workspace_id: &WorkspaceId,
        member_id: &TeamMemberId,
    ) -> Result<TeamMember, TeamStoreError> {
        sqlx::query_as::<_, TeamMemberRow>(&format!(
            "{SELECT_TEAM_MEMBER} WHERE id = $1 AND workspace_id = $2"
        ))
        .bind(member_id.as_ref())
        .bind(workspace_id.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => TeamStoreError::TeamMemberNotFound,
            err => unexpected(err),
        })?
        .try_into()
    }

    #[tracing::instrument(name = "Listing team members from PostgreSQL", skip_all)]
    async fn list_team_members(
        &self,
        workspace_id: &WorkspaceId,
        include_inactive: bool,
    ) -> Result<Vec<TeamMember>, TeamStoreError> {
        sqlx::query_as::<_, TeamMemberRow>(&format!(
            "{SELECT_TEAM_MEMBER} WHERE workspace_id = $1 AND (active OR $2) ORDER BY name"
        ))
        .bind(workspace_id.as_ref())
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?
        .into_iter()
        .map(TeamMember::try_from)
        .collect()
    }

    #[tracing::instrument(name = "Updating team member in PostgreSQL", skip_all)]
    async fn update_team_member(
        &mut self,
        member: &TeamMember,
    ) -> Result<(), TeamStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE team_members
            SET name = $3, email = $4, role = $5, weekly_capacity = $6,
                skill_ids = $7, hourly_rate = $8, active = $9
            WHERE id = $1 AND workspace_id = $2
            "#,
        )
        .bind(member.id.as_ref())
        .bind(member.workspace_id.as_ref())
        .bind(member.name.as_ref())
        .bind(member.email.as_ref().map(|e| e.as_ref().expose_secret()))
        .bind(&member.role)
        .bind(member.weekly_capacity.value_of())
        .bind(skill_uuids(&member.skill_ids))
        .bind(member.hourly_rate)
        .bind(member.active)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(TeamStoreError::TeamMemberNotFound);
        }
        Ok(())
    }

    #[tracing::instrument(
        name = "Counting active team members in PostgreSQL",
        skip_all
    )]
    async fn count_active_team_members(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<usize, TeamStoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM team_members WHERE workspace_id = $1 AND active",
        )
        .bind(workspace_id.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(count as usize)
    }

    #[tracing::instrument(name = "Adding skill to PostgreSQL", skip_all)]
    async fn add_skill(&mut self, skill: Skill) -> Result<(), TeamStoreError> {
        sqlx::query(
            "INSERT INTO skills (id, workspace_id, name) VALUES ($1, $2, $3)",
        )
        .bind(skill.id.as_ref())
        .bind(skill.workspace_id.as_ref())
        .bind(skill.name.as_ref())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                TeamStoreError::SkillExists
            }
            err => unexpected(err),
        })?;
        Ok(())
    }

    #[tracing::instrument(name = "Listing skills from PostgreSQL", skip_all)]
    async fn list_skills(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<Skill>, TeamStoreError> {
        sqlx::query_as::<_, SkillRow>(
            "SELECT id, workspace_id, name FROM skills WHERE workspace_id = $1 ORDER BY name",
        )
        .bind(workspace_id.as_ref())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?
        .into_iter()
        .map(Skill::try_from)
        .collect()
    }

    #[tracing::instrument(name = "Deleting skill from PostgreSQL", skip_all)]
    async fn delete_skill(
        &mut self,
        workspace_id: &WorkspaceId,
        skill_id: &SkillId,
    ) -> Result<(), TeamStoreError> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let result =
            sqlx::query("DELETE FROM skills WHERE id = $1 AND workspace_id = $2")
                .bind(skill_id.as_ref())
                .bind(workspace_id.as_ref())
                .execute(&mut *tx)
                .await
                .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(TeamStoreError::SkillNotFound);
        }

        sqlx::query(
            r#"
            UPDATE team_members SET skill_ids = array_remove(skill_ids, $1)
            WHERE workspace_id = $2
            "#,
        )
        .bind(skill_id.as_ref())
        .bind(workspace_id.as_ref())
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)
    }
}
