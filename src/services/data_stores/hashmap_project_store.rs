use std::collections::HashMap;

use crate::domain::{
    Assignment, AssignmentFilter, AssignmentId, Project, ProjectId,
    ProjectStore, ProjectStoreError, WorkspaceId,
};

#[derive(Default)]
pub struct HashmapProjectStore {
    projects: HashMap<ProjectId, Project>,
    assignments: HashMap<AssignmentId, Assignment>,
}

#[async_trait::async_trait]
impl ProjectStore for HashmapProjectStore {
    async fn add_project(
        &mut self,
        project: Project,
    ) -> Result<(), ProjectStoreError> {
        self.projects.insert(project.id, project);
        Ok(())
    }

    async fn get_project(
        &self,
        workspace_id: &WorkspaceId,
        project_id: &ProjectId,
    ) -> Result<Project, ProjectStoreError> {
        match self.projects.get(project_id) {
            Some(project) if &project.workspace_id == workspace_id => {
                Ok(project.clone())
            }
            _ => Err(ProjectStoreError::ProjectNotFound),
        }
    }

    async fn list_projects(
        &self,
        workspace_id: &WorkspaceId,
        include_archived: bool,
    ) -> Result<Vec<Project>, ProjectStoreError> {
        let mut projects: Vec<Project> = self
            .projects
            .values()
            .filter(|p| &p.workspace_id == workspace_id)
            .filter(|p| include_archived || p.active)
            .cloned()
            .collect();
        projects.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then_with(|| a.name.as_ref().cmp(b.name.as_ref()))
        });
        Ok(projects)
    }

    async fn update_project(
        &mut self,
        project: &Project,
    ) -> Result<(), ProjectStoreError> {
        match self.projects.get_mut(&project.id) {
            Some(existing) if existing.workspace_id == project.workspace_id => {
                *existing = project.clone();
                Ok(())
            }
            _ => Err(ProjectStoreError::ProjectNotFound),
        }
    }

    async fn count_active_projects(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<usize, ProjectStoreError> {
        Ok(self
            .projects
            .values()
            .filter(|p| &p.workspace_id == workspace_id)
            .filter(|p| p.counts_toward_limit())
            .count())
    }

    async fn add_assignment(
        &mut self,
        assignment: Assignment,
    ) -> Result<(), ProjectStoreError> {
        self.get_project(&assignment.workspace_id, &assignment.project_id)
            .await?;
        self.assignments.insert(assignment.id, assignment);
        Ok(())
    }

    async fn get_assignment(
        &self,
        workspace_id: &WorkspaceId,
        assignment_id: &AssignmentId,
    ) -> Result<Assignment, ProjectStoreError> {
        match self.assignments.get(assignment_id) {
            Some(a) if &a.workspace_id == workspace_id => Ok(a.clone()),
            _ => Err(ProjectStoreError::AssignmentNotFound),
        }
    }

    async fn list_assignments(
        &self,
        workspace_id: &WorkspaceId,
        filter: &AssignmentFilter,
    ) -> Result<Vec<Assignment>, ProjectStoreError> {
        let mut assignments: Vec<Assignment> = self
            .assignments
            .values()
            .filter(|a| &a.workspace_id == workspace_id && filter.matches(a))
            .cloned()
            .collect();
        assignments.sort_by_key(|a| a.dates.start);
        Ok(assignments)
    }

    async fn update_assignment(
        &mut self,
        assignment: &Assignment,
    ) -> Result<(), ProjectStoreError> {
        match self.assignments.get_mut(&assignment.id) {
            Some(existing)
                if existing.workspace_id == assignment.workspace_id =>
            {
                *existing = assignment.clone();
                Ok(())
            }
            _ => Err(ProjectStoreError::AssignmentNotFound),
        }
    }

    async fn delete_assignment(
        &mut self,
        workspace_id: &WorkspaceId,
        assignment_id: &AssignmentId,
    ) -> Result<(), ProjectStoreError> {
        self.get_assignment(workspace_id, assignment_id).await?;
        self.assignments.remove(assignment_id);
        Ok(())
    }
}
