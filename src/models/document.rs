use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project document; its content lives in versions.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One uploaded revision of a document.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentVersion {
    pub id: String,
    pub version: u32,
    pub file_url: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A file to upload, sent as a multipart form.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    /// Document name. Ignored when adding a version to an existing document.
    pub name: String,
    pub description: Option<String>,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}
