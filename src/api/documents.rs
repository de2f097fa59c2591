use super::ApiClient;
use crate::{
    error::AppError,
    models::{Document, DocumentUpload, DocumentVersion},
};
use reqwest::multipart::{Form, Part};

/// Call sites for `/projects/:projectId/documents`. Uploads are multipart.
pub struct DocumentService<'a> {
    client: &'a ApiClient,
}

impl<'a> DocumentService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    fn base(project_id: i64) -> String {
        format!("/projects/{}/documents", project_id)
    }

    pub async fn list(&self, project_id: i64) -> Result<Vec<Document>, AppError> {
        self.client.get(&Self::base(project_id)).await
    }

    pub async fn versions(
        &self,
        project_id: i64,
        id: &str,
    ) -> Result<Vec<DocumentVersion>, AppError> {
        self.client
            .get(&format!("{}/{}/versions", Self::base(project_id), id))
            .await
    }

    pub async fn latest_version(
        &self,
        project_id: i64,
        id: &str,
    ) -> Result<DocumentVersion, AppError> {
        self.client
            .get(&format!("{}/{}/latest", Self::base(project_id), id))
            .await
    }

    /// Creates a document with its first version.
    pub async fn create(
        &self,
        project_id: i64,
        upload: DocumentUpload,
    ) -> Result<Document, AppError> {
        let mut form = Form::new().text("name", upload.name.clone());
        if let Some(description) = upload.description.clone() {
            form = form.text("description", description);
        }
        let form = form.part("file", file_part(upload)?);
        self.client
            .post_multipart(&Self::base(project_id), form)
            .await
    }

    pub async fn add_version(
        &self,
        project_id: i64,
        id: &str,
        upload: DocumentUpload,
    ) -> Result<DocumentVersion, AppError> {
        let mut form = Form::new();
        if let Some(notes) = upload.description.clone() {
            form = form.text("notes", notes);
        }
        let form = form.part("file", file_part(upload)?);
        self.client
            .post_multipart(&format!("{}/{}/versions", Self::base(project_id), id), form)
            .await
    }
}

fn file_part(upload: DocumentUpload) -> Result<Part, AppError> {
    Ok(Part::bytes(upload.bytes)
        .file_name(upload.file_name)
        .mime_str(&upload.mime_type)?)
}
