use chrono::NaiveDate;
use color_eyre::eyre::Report;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::{
    Assignment, AssignmentFilter, AssignmentId, DateRange, Name, Project,
    ProjectId, ProjectStatus, ProjectStore, ProjectStoreError, SkillId,
    TeamMemberId, WeeklyHours, WorkspaceId,
};

pub struct PostgresProjectStore {
    pool: PgPool,
}

impl PostgresProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn unexpected(e: impl Into<Report>) -> ProjectStoreError {
    ProjectStoreError::UnexpectedError(e.into())
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    workspace_id: Uuid,
    name: String,
    client_name: Option<String>,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    status: String,
    budget_hours: Option<f64>,
    required_skill_ids: Vec<Uuid>,
    active: bool,
}

impl TryFrom<ProjectRow> for Project {
    type Error = ProjectStoreError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Project {
            id: ProjectId::new(row.id),
            workspace_id: WorkspaceId::new(row.workspace_id),
            name: Name::parse("Project name", &row.name).map_err(unexpected)?,
            client_name: row.client_name,
            start_date: row.start_date,
            end_date: row.end_date,
            status: row.status.parse::<ProjectStatus>().map_err(unexpected)?,
            budget_hours: row.budget_hours,
            required_skill_ids: row
                .required_skill_ids
                .into_iter()
                .map(SkillId::new)
                .collect(),
            active: row.active,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AssignmentRow {
    id: Uuid,
    workspace_id: Uuid,
    team_member_id: Uuid,
    project_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    hours_per_week: f64,
    billable: bool,
    notes: Option<String>,
}

impl TryFrom<AssignmentRow> for Assignment {
    type Error = ProjectStoreError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        Ok(Assignment {
            id: AssignmentId::new(row.id),
            workspace_id: WorkspaceId::new(row.workspace_id),
            team_member_id: TeamMemberId::new(row.team_member_id),
            project_id: ProjectId::new(row.project_id),
            dates: DateRange::parse(row.start_date, row.end_date)
                .map_err(unexpected)?,
            hours_per_week: WeeklyHours::allocation(row.hours_per_week)
                .map_err(unexpected)?,
            billable: row.billable,
            notes: row.notes,
        })
    }
}

const SELECT_PROJECT: &str = r#"
    SELECT id, workspace_id, name, client_name, start_date, end_date, status,
           budget_hours, required_skill_ids, active
    FROM projects
"#;

const SELECT_ASSIGNMENT: &str = r#"
    SELECT id, workspace_id, team_member_id, project_id, start_date, end_date,
           hours_per_week, billable, notes
    FROM assignments
"#;

#[async_trait::async_trait]
impl ProjectStore for PostgresProjectStore {
    #[tracing::instrument(name = "Adding project to PostgreSQL", skip_all)]
    async fn add_project(
        &mut self,
        project: Project,
    ) -> Result<(), ProjectStoreError> {
        sqlx::query(
            r#"
            INSERT INTO projects (
                id, workspace_id, name, client_name, start_date, end_date,
                status, budget_hours, required_skill_ids, active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(project.id.as_ref())
        .bind(project.workspace_id.as_ref())
        .bind(project.name.as_ref())
        .bind(&project.client_name)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.status.as_str())
        .bind(project.budget_hours)
        .bind(skill_uuids(&project.required_skill_ids))
        .bind(project.active)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    #[tracing::instrument(name = "Retrieving project from PostgreSQL", skip_all)]
    async fn get_project(
        &self,
        workspace_id: &WorkspaceId,
        project_id: &ProjectId,
    ) -> Result<Project, ProjectStoreError> {
        sqlx::query_as::<_, ProjectRow>(&format!(
            "{SELECT_PROJECT} WHERE id = $1 AND workspace_id = $2"
        ))
        .bind(project_id.as_ref())
        .bind(workspace_id.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => ProjectStoreError::ProjectNotFound,
            err => unexpected(err),
        })?
        .try_into()
    }

    #[tracing::instrument(name = "Listing projects from PostgreSQL", skip_all)]
    async fn list_projects(
        &self,
        workspace_id: &WorkspaceId,
        include_archived: bool,
    ) -> Result<Vec<Project>, ProjectStoreError> {
        sqlx::query_as::<_, ProjectRow>(&format!(
            "{SELECT_PROJECT} WHERE workspace_id = $1 AND (active OR $2) ORDER BY start_date, name"
        ))
        .bind(workspace_id.as_ref())
        .bind(include_archived)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?
        .into_iter()
        .map(Project::try_from)
        .collect()
    }

    #[tracing::instrument(name = "Updating project in PostgreSQL", skip_all)]
    async fn update_project(
        &mut self,
        project: &Project,
    ) -> Result<(), ProjectStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET name = $3, client_name = $4, start_date = $5, end_date = $6,
                status = $7, budget_hours = $8, required_skill_ids = $9,
                active = $10
            WHERE id = $1 AND workspace_id = $2
            "#,
        )
        .bind(project.id.as_ref())
        .bind(project.workspace_id.as_ref())
        .bind(project.name.as_ref())
        .bind(&project.client_name)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.status.as_str())
        .bind(project.budget_hours)
        .bind(skill_uuids(&project.required_skill_ids))
        .bind(project.active)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(ProjectStoreError::ProjectNotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Counting active projects in PostgreSQL", skip_all)]
    async fn count_active_projects(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<usize, ProjectStoreError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM projects
            WHERE workspace_id = $1 AND active
              AND status NOT IN ('completed', 'cancelled')
            "#,
        )
        .bind(workspace_id.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(count as usize)
    }

    #[tracing::instrument(name = "Adding assignment to PostgreSQL", skip_all)]
    async fn add_assignment(
        &mut self,
        assignment: Assignment,
    ) -> Result<(), ProjectStoreError> {
        self.get_project(&assignment.workspace_id, &assignment.project_id)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO assignments (
                id, workspace_id, team_member_id, project_id, start_date,
                end_date, hours_per_week, billable, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(assignment.id.as_ref())
        .bind(assignment.workspace_id.as_ref())
        .bind(assignment.team_member_id.as_ref())
        .bind(assignment.project_id.as_ref())
        .bind(assignment.dates.start)
        .bind(assignment.dates.end)
        .bind(assignment.hours_per_week.value_of())
        .bind(assignment.billable)
        .bind(&assignment.notes)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    #[tracing::instrument(name = "Retrieving assignment from PostgreSQL", skip_all)]
    async fn get_assignment(
        &self,
        workspace_id: &WorkspaceId,
        assignment_id: &AssignmentId,
    ) -> Result<Assignment, ProjectStoreError> {
        sqlx::query_as::<_, AssignmentRow>(&format!(
            "{SELECT_ASSIGNMENT} WHERE id = $1 AND workspace_id = $2"
        ))
        .bind(assignment_id.as_ref())
        .bind(workspace_id.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => ProjectStoreError::AssignmentNotFound,
            err => unexpected(err),
        })?
        .try_into()
    }

    #[tracing::instrument(name = "Listing assignments from PostgreSQL", skip_all)]
    async fn list_assignments(
        &self,
        workspace_id: &WorkspaceId,
        filter: &AssignmentFilter,
    ) -> Result<Vec<Assignment>, ProjectStoreError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_ASSIGNMENT);
        query.push(" WHERE workspace_id = ").push_bind(*workspace_id.as_ref());
        if let Some(member_id) = filter.team_member_id {
            query
                .push(" AND team_member_id = ")
                .push_bind(*member_id.as_ref());
        }
        if let Some(project_id) = filter.project_id {
            query.push(" AND project_id = ").push_bind(*project_id.as_ref());
        }
        if let Some(window) = filter.window {
            query
                .push(" AND start_date <= ")
                .push_bind(window.end)
                .push(" AND end_date >= ")
                .push_bind(window.start);
        }
        query.push(" ORDER BY start_date");

        query
            .build_query_as::<AssignmentRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?
            .into_iter()
            .map(Assignment::try_from)
            .collect()
    }

    #[tracing::instrument(name = "Updating assignment in PostgreSQL", skip_all)]
    async fn update_assignment(
        &mut self,
        assignment: &Assignment,
    ) -> Result<(), ProjectStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE assignments
            SET team_member_id = $3, project_id = $4, start_date = $5,
                end_date = $6, hours_per_week = $7, billable = $8, notes = $9
            WHERE id = $1 AND workspace_id = $2
            "#,
        )
        .bind(assignment.id.as_ref())
        .bind(assignment.workspace_id.as_ref())
        .bind(assignment.team_member_id.as_ref())
        .bind(assignment.project_id.as_ref())
        .bind(assignment.dates.start)
        .bind(assignment.dates.end)
        .bind(assignment.hours_per_week.value_of())
        .bind(assignment.billable)
        .bind(&assignment.notes)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(ProjectStoreError::AssignmentNotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Deleting assignment from PostgreSQL", skip_all)]
    async fn delete_assignment(
        &mut self,
        workspace_id: &WorkspaceId,
        assignment_id: &AssignmentId,
    ) -> Result<(), ProjectStoreError> {
        let result = sqlx::query(
            "DELETE FROM assignments WHERE id = $1 AND workspace_id = $2",
        )
        .bind(assignment_id.as_ref())
        .bind(workspace_id.as_ref())
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(ProjectStoreError::AssignmentNotFound);
        }
        Ok(())
    }
}

fn skill_uuids(skill_ids: &[SkillId]) -> Vec<Uuid> {
    skill_ids.iter().map(|id| *id.as_ref()).collect()
}
