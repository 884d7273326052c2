use crate::domain::{
    Email, Password, User, UserId, UserStore, UserStoreError, WorkspaceId,
};
use std::collections::HashMap;

#[derive(Default)]
pub struct HashmapUserStore {
    users: HashMap<Email, User>,
}

#[async_trait::async_trait]
impl UserStore for HashmapUserStore {
    async fn add_user(&mut self, user: User) -> Result<(), UserStoreError> {
        let email = &user.email;

        if self.users.contains_key(email) {
            return Err(UserStoreError::UserAlreadyExists);
        }

        self.users.insert(email.clone(), user);
        Ok(())
    }

    async fn get_user(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<User, UserStoreError> {
        self.users
            .values()
            .find(|u| &u.id == user_id && &u.workspace_id == workspace_id)
            .cloned()
            .ok_or(UserStoreError::UserNotFound)
    }

    async fn get_user_by_email(
        &self,
        email: &Email,
    ) -> Result<User, UserStoreError> {
        match self.users.get(email) {
            Some(user) => Ok(user.clone()),
            None => Err(UserStoreError::UserNotFound),
        }
    }

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

    async fn list_users(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<User>, UserStoreError> {
        let mut users: Vec<User> = self
            .users
            .values()
            .filter(|u| &u.workspace_id == workspace_id)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.as_ref().cmp(b.name.as_ref()));
        Ok(users)
    }

    async fn update_user(&mut self, user: &User) -> Result<(), UserStoreError> {
        match self.users.get_mut(&user.email) {
            Some(existing) if existing.id == user.id => {
                *existing = user.clone();
                Ok(())
            }
            _ => Err(UserStoreError::UserNotFound),
        }
    }

    async fn count_active_users(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<usize, UserStoreError> {
        Ok(self
            .users
            .values()
            .filter(|u| &u.workspace_id == workspace_id && u.active)
            .count())
    }
}
