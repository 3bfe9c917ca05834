//! OAuth 1.0a request signing.

pub mod credentials;
pub mod signer;

pub use credentials::{AccessToken, ConsumerCredentials};
pub use signer::{HmacSha1Signer, RequestSigner};
