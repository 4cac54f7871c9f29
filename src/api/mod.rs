//! Backend access: wire models and the HTTP client.

mod client;
mod models;

pub use client::{ApiClient, BusinessApi};
pub use models::{Business, BusinessRelationships, Relationship};
