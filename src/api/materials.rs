use super::ApiClient;
use crate::{
    error::AppError,
    models::{Material, MaterialInput, MaterialStatus, MaterialStatusUpdate},
};
use serde::de::IgnoredAny;

/// Call sites for `/projects/:projectId/materials`.
pub struct MaterialService<'a> {
    client: &'a ApiClient,
}

impl<'a> MaterialService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn base(project_id: i64) -> String {
        format!("/projects/{}/materials", project_id)
    }

    pub async fn list(&self, project_id: i64) -> Result<Vec<Material>, AppError> {
        self.client.get(&Self::base(project_id)).await
    }

    pub async fn get(&self, project_id: i64, id: &str) -> Result<Material, AppError> {
        self.client
            .get(&format!("{}/{}", Self::base(project_id), id))
            .await
    }

    pub async fn create(
        &self,
        project_id: i64,
        material: &MaterialInput,
    ) -> Result<Material, AppError> {
        self.client.post(&Self::base(project_id), material).await
    }

    pub async fn update_status(
        &self,
        project_id: i64,
        id: &str,
        status: MaterialStatus,
    ) -> Result<Material, AppError> {
        self.client
            .patch(
                &format!("{}/{}/status", Self::base(project_id), id),
                &MaterialStatusUpdate { status },
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
