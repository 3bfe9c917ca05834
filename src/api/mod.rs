pub mod fetcher;

pub use fetcher::{FetchFuture, OAuthFetcher, ResourceFetcher};
