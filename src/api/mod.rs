//! REST client for the construction-management backend.
//!
//! `ApiClient` is the single outbound gateway: every request reads the persisted bearer
//! token, every response goes through the same status handling. The per-resource
//! services are thin typed wrappers borrowing the client.

pub mod documents;
pub mod invoices;
pub mod materials;
pub mod projects;
pub mod tasks;
pub mod users;
pub mod vendors;

use crate::{
    config::Config,
    error::AppError,
    storage::{KeyValueStore, TOKEN_KEY},
};
use log::{debug, warn};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    multipart::Form,
    Method, RequestBuilder, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub use documents::DocumentService;
pub use invoices::InvoiceService;
pub use materials::MaterialService;
pub use projects::ProjectService;
pub use tasks::TaskService;
pub use users::{ProfileService, UserService};
pub use vendors::VendorService;

/// HTTP gateway to the backend. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<Config>,
    storage: Arc<dyn KeyValueStore>,
}

impl ApiClient {
    pub fn new(config: &Config, storage: Arc<dyn KeyValueStore>) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            config: Arc::new(config.clone()),
            storage,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        self.execute(self.request(Method::GET, path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::POST, path).json(body))
            .await
    }

    /// POST without a request body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        self.execute(self.request(Method::POST, path)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::PATCH, path).json(body))
            .await
    }

    /// PATCH without a request body.
    pub async fn patch_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        self.execute(self.request(Method::PATCH, path)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        self.execute(self.request(Method::DELETE, path)).await
    }

    /// POST a multipart form, for file-bearing endpoints.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, AppError> {
        self.execute(self.request(Method::POST, path).multipart(form))
            .await
    }

    pub fn projects(&self) -> ProjectService<'_> {
        ProjectService::new(self)
    }

    pub fn tasks(&self) -> TaskService<'_> {
        TaskService::new(self)
    }

    pub fn materials(&self) -> MaterialService<'_> {
        MaterialService::new(self)
    }

    pub fn documents(&self) -> DocumentService<'_> {
        DocumentService::new(self)
    }

    pub fn invoices(&self) -> InvoiceService<'_> {
        InvoiceService::new(self)
    }

    pub fn vendors(&self) -> VendorService<'_> {
        VendorService::new(self)
    }

    pub fn users(&self) -> UserService<'_> {
        UserService::new(self)
    }

    pub fn profile(&self) -> ProfileService<'_> {
        ProfileService::new(self)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.config.url(path);
        debug!("{} {}", method, url);

        let builder = self.http.request(method, url);
        match self.storage.get(TOKEN_KEY) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, AppError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status == StatusCode::UNAUTHORIZED {
            // The in-memory session is left alone; the next checkAuth fails closed.
            warn!("request unauthorized (401); dropping persisted token");
            if let Err(e) = self.storage.remove(TOKEN_KEY) {
                warn!("failed to drop persisted token: {}", e);
            }
        }

        if !status.is_success() {
            return Err(AppError::from_response(status.as_u16(), &body));
        }

        decode_body(&body)
    }
}

/// Decodes a JSON response body; an empty body decodes as `null` so endpoints
/// answering `204 No Content` can be read into `()` or `Option<_>`.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        Ok(serde_json::from_value(Value::Null)?)
    } else {
        Ok(serde_json::from_slice(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_empty_body() {
        let result: Result<(), AppError> = decode_body(b"");
        assert!(result.is_ok());
        let none: Option<u32> = decode_body(b"  \n").unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn test_decode_invalid_body() {
        let result: Result<Vec<u32>, AppError> = decode_body(b"{not json");
        assert!(matches!(result, Err(AppError::Decode(_))));
    }
}
