#![doc = "The `buildforge` library crate."]
#![doc = ""]
#![doc = "Client-side core of the BuildForge construction-management application: session"]
#![doc = "state and authentication flows, the route table and navigation guard, the REST"]
#![doc = "client with its per-resource services, and the toast queue."]
#![doc = "It is used by the `buildforge` binary (`main.rs`) and by any front end embedding it."]

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod storage;
pub mod toast;

pub use crate::app::App;
pub use crate::error::AppError;
