use std::collections::HashMap;

use crate::domain::{
    Skill, SkillId, TeamMember, TeamMemberId, TeamStore, TeamStoreError,
    WorkspaceId,
};

#[derive(Default)]
pub struct HashmapTeamStore {
    members: HashMap<TeamMemberId, TeamMember>,
    skills: HashMap<SkillId, Skill>,
}

#[async_trait::async_trait]
impl TeamStore for HashmapTeamStore {
    async fn add_team_member(
        &mut self,
        member: TeamMember,
    ) -> Result<(), TeamStoreError> {
        self.members.insert(member.id, member);
        Ok(())
    }

    async fn get_team_member(
        &self,
        workspace_id: &WorkspaceId,
        member_id: &TeamMemberId,
    ) -> Result<TeamMember, TeamStoreError> {
        match self.members.get(member_id) {
            Some(member) if &member.workspace_id == workspace_id => {
                Ok(member.clone())
            }
            _ => Err(TeamStoreError::TeamMemberNotFound),
        }
    }

    async fn list_team_members(
        &self,
        workspace_id: &WorkspaceId,
        include_inactive: bool,
    ) -> Result<Vec<TeamMember>, TeamStoreError> {
        let mut members: Vec<TeamMember> = self
            .members
            .values()
            .filter(|m| &m.workspace_id == workspace_id)
            .filter(|m| include_inactive || m.active)
            .cloned()
            .collect();
        members.sort_by(|a, b| a.name.as_ref().cmp(b.name.as_ref()));
        Ok(members)
    }

    async fn update_team_member(
        &mut self,
        member: &TeamMember,
    ) -> Result<(), TeamStoreError> {
        match self.members.get_mut(&member.id) {
            Some(existing) if existing.workspace_id == member.workspace_id => {
                *existing = member.clone();
                Ok(())
            }
            _ => Err(TeamStoreError::TeamMemberNotFound),
        }
    }

    async fn count_active_team_members(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<usize, TeamStoreError> {
        Ok(self
            .members
            .values()
            .filter(|m| &m.workspace_id == workspace_id && m.active)
            .count())
    }

    async fn add_skill(&mut self, skill: Skill) -> Result<(), TeamStoreError> {
        let exists = self.skills.values().any(|s| {
            s.workspace_id == skill.workspace_id
                && s.matches_name(skill.name.as_ref())
        });
        if exists {
            return Err(TeamStoreError::SkillExists);
        }
        self.skills.insert(skill.id, skill);
        Ok(())
    }

    async fn list_skills(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<Skill>, TeamStoreError> {
        let mut skills: Vec<Skill> = self
            .skills
            .values()
            .filter(|s| &s.workspace_id == workspace_id)
            .cloned()
            .collect();
        skills.sort_by(|a, b| a.name.as_ref().cmp(b.name.as_ref()));
        Ok(skills)
    }

    async fn delete_skill(
        &mut self,
        workspace_id: &WorkspaceId,
        skill_id: &SkillId,
    ) -> Result<(), TeamStoreError> {
        match self.skills.get(skill_id) {
            Some(skill) if &skill.workspace_id == workspace_id => {
                self.skills.remove(skill_id);
            }
            _ => return Err(TeamStoreError::SkillNotFound),
        }
        for member in self.members.values_mut() {
            member.skill_ids.retain(|id| id != skill_id);
        }
        Ok(())
    }
}
