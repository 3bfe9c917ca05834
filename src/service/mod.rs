pub mod credential_loader;
pub mod gateway;
pub mod retriever;

pub use gateway::CredentialGateway;
pub use retriever::{CREDENTIALS_NOT_FOUND, ResourceRetriever};
