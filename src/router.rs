use axum::{Router, routing::get};

use crate::handlers::retrieve::{health_handler, retrieve_handler};
use crate::service::retriever::ResourceRetriever;

#[derive(Clone)]
pub struct RetrieverState {
    pub retriever: ResourceRetriever,
}

impl RetrieverState {
    pub fn new(retriever: ResourceRetriever) -> Self {
        Self { retriever }
    }
}

pub fn retriever_router(state: RetrieverState) -> Router {
    Router::new()
        .route("/retrieve", get(retrieve_handler))
        .route("/healthz", get(health_handler))
        .with_state(state)
}
