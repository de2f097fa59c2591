use super::ApiClient;
use crate::{
    error::AppError,
    models::{UpdateProfileData, User, UserSummary},
};
use serde::de::IgnoredAny;

/// Administrative call sites for `/users`.
pub struct UserService<'a> {
    client: &'a ApiClient,
}

impl<'a> UserService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<UserSummary>, AppError> {
        self.client.get("/users").await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let _: IgnoredAny = self.client.delete(&format!("/users/{}", id)).await?;
        Ok(())
    }
}

/// Call sites for the current user's own record, `/users/me`.
pub struct ProfileService<'a> {
    client: &'a ApiClient,
}

impl<'a> ProfileService<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> Result<User, AppError> {
        self.client.get("/users/me").await
    }

    pub async fn update(&self, data: &UpdateProfileData) -> Result<User, AppError> {
        self.client.patch("/users/me", data).await
    }
}
