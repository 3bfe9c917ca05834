pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod oauth;
pub mod router;
pub mod service;

pub use error::RetrieverError;
pub use service::retriever::{CREDENTIALS_NOT_FOUND, ResourceRetriever};
