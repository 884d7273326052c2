use color_eyre::eyre::eyre;
use secrecy::{ExposeSecret, Secret};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    Email, Name, Password, User, UserId, UserPasswordHash, UserRole,
    UserStore, UserStoreError, WorkspaceId,
};

pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    workspace_id: Uuid,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    active: bool,
}

impl TryFrom<UserRow> for User {
    type Error = UserStoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::new(row.id),
            workspace_id: WorkspaceId::new(row.workspace_id),
            email: Email::parse(Secret::new(row.email))
                .map_err(|e| UserStoreError::UnexpectedError(eyre!(e)))?,
            name: Name::parse("Name", &row.name)
                .map_err(|e| UserStoreError::UnexpectedError(eyre!(e)))?,
            hash: UserPasswordHash::parse(Secret::new(row.password_hash))
                .map_err(UserStoreError::UnexpectedError)?,
            role: row
                .role
                .parse::<UserRole>()
                .map_err(|e| UserStoreError::UnexpectedError(eyre!(e)))?,
            active: row.active,
        })
    }
}

const SELECT_USER: &str = r#"
    SELECT id, workspace_id, email, name, password_hash, role, active
    FROM users
"#;

#[async_trait::async_trait]
impl UserStore for PostgresUserStore {
    #[tracing::instrument(name = "Adding user to PostgreSQL", skip_all)]
    async fn add_user(&mut self, user: User) -> Result<(), UserStoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, workspace_id, email, name, password_hash, role, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.as_ref())
        .bind(user.workspace_id.as_ref())
        .bind(user.email.as_ref().expose_secret())
        .bind(user.name.as_ref())
        .bind(user.hash.as_ref().expose_secret())
        .bind(user.role.as_str())
        .bind(user.active)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                UserStoreError::UserAlreadyExists
            }
            err => UserStoreError::UnexpectedError(eyre!(err)),
        })?;
        Ok(())
    }

    #[tracing::instrument(name = "Retrieving user from PostgreSQL", skip_all)]
    async fn get_user(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<User, UserStoreError> {
        sqlx::query_as::<_, UserRow>(&format!(
            "{SELECT_USER} WHERE id = $1 AND workspace_id = $2"
        ))
        .bind(user_id.as_ref())
        .bind(workspace_id.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => UserStoreError::UserNotFound,
            err => UserStoreError::UnexpectedError(eyre!(err)),
        })?
        .try_into()
    }

    #[tracing::instrument(
        name = "Retrieving user by email from PostgreSQL",
        skip_all
    )]
    async fn get_user_by_email(
        &self,
        email: &Email,
    ) -> Result<User, UserStoreError> {
        sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE email = $1"))
            .bind(email.as_ref().expose_secret())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => UserStoreError::UserNotFound,
                err => UserStoreError::UnexpectedError(eyre!(err)),
            })?
            .try_into()
    }

    #[tracing::instrument(
        name = "Validating user credentials in PostgreSQL",
        skip_all
    )]
    async fn validate_user(
        &self,
        email: &Email,
        password: &Password,
    ) -> Result<(), UserStoreError> {
        let user = self.get_user_by_email(email).await?;
        user.hash
            .verify(password)
            .await
            .map_err(|_| UserStoreError::InvalidCredentials)
    }

    #[tracing::instrument(name = "Listing users from PostgreSQL", skip_all)]
    async fn list_users(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<User>, UserStoreError> {
        sqlx::query_as::<_, UserRow>(&format!(
            "{SELECT_USER} WHERE workspace_id = $1 ORDER BY name"
        ))
        .bind(workspace_id.as_ref())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(eyre!(e)))?
        .into_iter()
        .map(User::try_from)
        .collect()
    }

    #[tracing::instrument(name = "Updating user in PostgreSQL", skip_all)]
    async fn update_user(&mut self, user: &User) -> Result<(), UserStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET name = $3, password_hash = $4, role = $5, active = $6
            WHERE id = $1 AND workspace_id = $2
            "#,
        )
        .bind(user.id.as_ref())
        .bind(user.workspace_id.as_ref())
        .bind(user.name.as_ref())
        .bind(user.hash.as_ref().expose_secret())
        .bind(user.role.as_str())
        .bind(user.active)
        .execute(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(eyre!(e)))?;

        if result.rows_affected() == 0 {
            return Err(UserStoreError::UserNotFound);
        }
        Ok(())
    }

    #[tracing::instrument(name = "Counting active users in PostgreSQL", skip_all)]
    async fn count_active_users(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<usize, UserStoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE workspace_id = $1 AND active",
        )
        .bind(workspace_id.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(eyre!(e)))?;
        Ok(count as usize)
    }
}
