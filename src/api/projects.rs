use super::ApiClient;
use crate::{
    error::AppError,
    models::{CreateProjectData, Project, UpdateProjectData, UserSummary},
};
use serde::de::IgnoredAny;

/// Call sites for `/projects`.
pub struct ProjectService<'a> {
    client: &'a ApiClient,
}

impl<'a> ProjectService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Every project visible to the current user.
    pub async fn list(&self) -> Result<Vec<Project>, AppError> {
        self.client.get("/projects").await
    }

    /// Projects the current user owns or is assigned to.
    pub async fn mine(&self) -> Result<Vec<Project>, AppError> {
        self.client.get("/projects/my-projects").await
    }

    pub async fn get(&self, id: i64) -> Result<Project, AppError> {
        self.client.get(&format!("/projects/{}", id)).await
    }

    /// Users with the site-engineer role, candidates for assignment.
    pub async fn site_engineers(&self) -> Result<Vec<UserSummary>, AppError> {
        self.client.get("/users/site-engineers").await
    }

    pub async fn create(&self, data: &CreateProjectData) -> Result<Project, AppError> {
        self.client.post("/projects", data).await
    }

    pub async fn update(&self, id: i64, data: &UpdateProjectData) -> Result<Project, AppError> {
        self.client.patch(&format!("/projects/{}", id), data).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let _: IgnoredAny = self.client.delete(&format!("/projects/{}", id)).await?;
        Ok(())
    }

    /// Accepts a pending project on behalf of the current contractor.
    pub async fn accept(&self, id: i64) -> Result<Project, AppError> {
        self.client
            .post_empty(&format!("/projects/{}/accept", id))
            .await
    }

    pub async fn assign_site_engineer(
        &self,
        project_id: i64,
        site_engineer_id: &str,
    ) -> Result<Project, AppError> {
        self.client
            .post_empty(&format!(
                "/projects/{}/assign-site-engineer/{}",
                project_id, site_engineer_id
            ))
            .await
    }
}
