use super::ApiClient;
use crate::{
    error::AppError,
    models::{Vendor, VendorInput},
};
use serde::de::IgnoredAny;

pub struct VendorService<'a> {
    client: &'a ApiClient,
}

impl<'a> VendorService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Vendor>, AppError> {
        self.client.get("/vendors").await
    }

    pub async fn get(&self, id: &str) -> Result<Vendor, AppError> {
        self.client.get(&format!("/vendors/{}", id)).await
    }

    pub async fn create(&self, vendor: &VendorInput) -> Result<Vendor, AppError> {
        self.client.post("/vendors", vendor).await
    }

    pub async fn update(&self, id: &str, vendor: &VendorInput) -> Result<Vendor, AppError> {
        self.client.patch(&format!("/vendors/{}", id), vendor).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let _: IgnoredAny = self.client.delete(&format!("/vendors/{}", id)).await?;
        Ok(())
    }
}
