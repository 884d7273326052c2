use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::domain::{
    InviteId, InviteToken, Workspace, WorkspaceId, WorkspaceInvite,
    WorkspaceStore, WorkspaceStoreError,
};

#[derive(Default)]
pub struct HashmapWorkspaceStore {
    workspaces: HashMap<WorkspaceId, Workspace>,
    invites: HashMap<InviteId, WorkspaceInvite>,
}

#[async_trait::async_trait]
impl WorkspaceStore for HashmapWorkspaceStore {
    async fn add_workspace(
        &mut self,
        workspace: Workspace,
    ) -> Result<(), WorkspaceStoreError> {
        if self.slug_exists(workspace.slug.as_ref()).await? {
            return Err(WorkspaceStoreError::SlugTaken);
        }
        self.workspaces.insert(workspace.id, workspace);
        Ok(())
    }

    async fn get_workspace(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Workspace, WorkspaceStoreError> {
        self.workspaces
            .get(workspace_id)
            .cloned()
            .ok_or(WorkspaceStoreError::WorkspaceNotFound)
    }

    async fn get_workspace_by_customer(
        &self,
        stripe_customer_id: &str,
    ) -> Result<Workspace, WorkspaceStoreError> {
        self.workspaces
            .values()
            .find(|w| w.stripe_customer_id.as_deref() == Some(stripe_customer_id))
            .cloned()
            .ok_or(WorkspaceStoreError::WorkspaceNotFound)
    }

    async fn update_workspace(
        &mut self,
        workspace: &Workspace,
    ) -> Result<(), WorkspaceStoreError> {
        match self.workspaces.get_mut(&workspace.id) {
            Some(existing) => {
                *existing = workspace.clone();
                Ok(())
            }
            None => Err(WorkspaceStoreError::WorkspaceNotFound),
        }
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, WorkspaceStoreError> {
        Ok(self.workspaces.values().any(|w| w.slug.as_ref() == slug))
    }

    async fn add_invite(
        &mut self,
        invite: WorkspaceInvite,
    ) -> Result<(), WorkspaceStoreError> {
        if !self.workspaces.contains_key(&invite.workspace_id) {
            return Err(WorkspaceStoreError::WorkspaceNotFound);
        }
        self.invites.insert(invite.id, invite);
        Ok(())
    }

    async fn get_invite_by_token(
        &self,
        token: &InviteToken,
    ) -> Result<WorkspaceInvite, WorkspaceStoreError> {
        self.invites
            .values()
            .find(|i| &i.token == token)
            .cloned()
            .ok_or(WorkspaceStoreError::InviteNotFound)
    }

    async fn list_pending_invites(
        &self,
        workspace_id: &WorkspaceId,
        now: DateTime<Utc>,
    ) -> Result<Vec<WorkspaceInvite>, WorkspaceStoreError> {
        let mut invites: Vec<WorkspaceInvite> = self
            .invites
            .values()
            .filter(|i| &i.workspace_id == workspace_id && i.is_pending(now))
            .cloned()
            .collect();
        invites.sort_by_key(|i| i.created_at);
        Ok(invites)
    }

    async fn mark_invite_accepted(
        &mut self,
        invite_id: &InviteId,
        accepted_at: DateTime<Utc>,
    ) -> Result<(), WorkspaceStoreError> {
        let invite = self
            .invites
            .get_mut(invite_id)
            .ok_or(WorkspaceStoreError::InviteNotFound)?;
        invite.accepted_at = Some(accepted_at);
        Ok(())
    }

    async fn delete_invite(
        &mut self,
        workspace_id: &WorkspaceId,
        invite_id: &InviteId,
    ) -> Result<(), WorkspaceStoreError> {
        match self.invites.get(invite_id) {
            Some(invite) if &invite.workspace_id == workspace_id => {
                self.invites.remove(invite_id);
                Ok(())
            }
            _ => Err(WorkspaceStoreError::InviteNotFound),
        }
    }
}
