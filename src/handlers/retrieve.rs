use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::debug;

use crate::{RetrieverError, router::RetrieverState};

#[derive(Debug, Deserialize)]
pub struct RetrieveQuery {
    pub screenname: Option<String>,
    #[serde(rename = "url-to-fetch", alias = "twitterurl")]
    pub url_to_fetch: Option<String>,
}

/// GET /retrieve?screenname=..&url-to-fetch=..
///
/// Without `screenname` nothing is looked up and the response has no body.
/// The URL is only validated once a credential has been found.
pub async fn retrieve_handler(
    State(state): State<RetrieverState>,
    Query(query): Query<RetrieveQuery>,
) -> Result<Response, RetrieverError> {
    debug!(
        screen_name = query.screenname.as_deref().unwrap_or("<none>"),
        url = query.url_to_fetch.as_deref().unwrap_or("<none>"),
        "retrieve request"
    );

    let Some(screen_name) = query.screenname else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let body = state
        .retriever
        .request_resource(&screen_name, query.url_to_fetch.as_deref())
        .await?;
    Ok(body.into_response())
}

pub async fn health_handler() -> &'static str {
    "ok"
}
