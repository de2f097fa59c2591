use serde::{Deserialize, Serialize};

use super::vendor::VendorRef;

/// Procurement state of a material.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MaterialStatus {
    Requested,
    Approved,
    Ordered,
    Delivered,
    Rejected,
    #[serde(other)]
    Unknown,
}

/// A material requested for a project, with the vendors able to supply it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub quantity: f64,
    pub unit: String,
    pub status: MaterialStatus,
    #[serde(default)]
    pub vendors: Vec<VendorRef>,
}

/// Payload for `POST /projects/:projectId/materials`.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MaterialInput {
    pub name: String,
    pub description: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(default)]
    pub vendor_ids: Vec<String>,
}

/// Body of `PATCH /projects/:projectId/materials/:id/status`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MaterialStatusUpdate {
    pub status: MaterialStatus,
}
