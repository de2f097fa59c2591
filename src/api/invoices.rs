use super::ApiClient;
use crate::{
    error::AppError,
    models::{Invoice, InvoiceInput},
};
use serde::de::IgnoredAny;

/// Call sites for project invoices (payments).
pub struct InvoiceService<'a> {
    client: &'a ApiClient,
}

impl<'a> InvoiceService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn base(project_id: i64) -> String {
        format!("/projects/{}/invoices", project_id)
    }

    pub async fn list(&self, project_id: i64) -> Result<Vec<Invoice>, AppError> {
        self.client.get(&Self::base(project_id)).await
    }

    pub async fn create(
        &self,
        project_id: i64,
        invoice: &InvoiceInput,
    ) -> Result<Invoice, AppError> {
        self.client.post(&Self::base(project_id), invoice).await
    }

    pub async fn mark_as_paid(&self, project_id: i64, id: &str) -> Result<Invoice, AppError> {
        self.client
            .patch_empty(&format!("{}/{}/pay", Self::base(project_id), id))
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
