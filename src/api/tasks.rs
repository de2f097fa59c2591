use super::ApiClient;
use crate::{
    error::AppError,
    models::{DependencyRequest, Task, TaskInput},
};
use serde::de::IgnoredAny;

/// Call sites for `/projects/:projectId/tasks`.
pub struct TaskService<'a> {
    client: &'a ApiClient,
}

impl<'a> TaskService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn base(project_id: i64) -> String {
        format!("/projects/{}/tasks", project_id)
    }

    pub async fn list(&self, project_id: i64) -> Result<Vec<Task>, AppError> {
        self.client.get(&Self::base(project_id)).await
    }

    pub async fn get(&self, project_id: i64, id: &str) -> Result<Task, AppError> {
        self.client
            .get(&format!("{}/{}", Self::base(project_id), id))
            .await
    }

    pub async fn create(&self, project_id: i64, task: &TaskInput) -> Result<Task, AppError> {
        self.client.post(&Self::base(project_id), task).await
    }

    pub async fn update(
        &self,
        project_id: i64,
        id: &str,
        task: &TaskInput,
    ) -> Result<Task, AppError> {
        self.client
            .patch(&format!("{}/{}", Self::base(project_id), id), task)
            .await
    }

    /// Records that `task_id` cannot start before `dependency_id` is done.
    pub async fn add_dependency(
        &self,
        project_id: i64,
        task_id: &str,
        dependency_id: &str,
    ) -> Result<Task, AppError> {
        let body = DependencyRequest {
            dependency_id: dependency_id.to_string(),
        };
        self.client
            .post(
                &format!("{}/{}/dependencies", Self::base(project_id), task_id),
                &body,
            )
            .await
    }

    pub async fn delete(&self, project_id: i64, id: &str) -> Result<(), AppError> {
        let _: IgnoredAny = self
            .client
            .delete(&format!("{}/{}", Self::base(project_id), id))
            .await?;
        Ok(())
    }
}
