use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use httpmock::prelude::*;
use resource_retriever::{
    CREDENTIALS_NOT_FOUND, ResourceRetriever, RetrieverError,
    api::fetcher::OAuthFetcher,
    config::ProviderConfig,
    db::{MemoryStore, NewCredential, UserCredential},
    oauth::{ConsumerCredentials, HmacSha1Signer},
    router::{RetrieverState, retriever_router},
    service::gateway::{CredentialGateway, GatewayFuture},
};
use std::sync::Arc;
use tower::ServiceExt;

struct UnavailableStore;

impl CredentialGateway for UnavailableStore {
    fn lookup<'a>(&'a self, _screen_name: &'a str) -> GatewayFuture<'a, Option<UserCredential>> {
        Box::pin(async { Err(RetrieverError::DatabaseError(sqlx::Error::PoolTimedOut)) })
    }
}

fn app_with(gateway: Arc<dyn CredentialGateway>) -> Router {
    let signer = HmacSha1Signer::new(ConsumerCredentials::new("app-key", "app-secret"));
    let client = OAuthFetcher::build_client(&ProviderConfig::default())
        .expect("client should build from defaults");
    let fetcher = OAuthFetcher::new(client, Arc::new(signer));
    let retriever = ResourceRetriever::new(gateway, Arc::new(fetcher));
    retriever_router(RetrieverState::new(retriever))
}

fn retrieve_uri(params: &[(&str, &str)]) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    format!("/retrieve?{query}")
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    (
        status,
        String::from_utf8(body.to_vec()).expect("response body was not utf-8"),
    )
}

#[tokio::test]
async fn registered_user_receives_fetched_body() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/1.1/account/verify_credentials.json")
                .header_exists("authorization");
            then.status(200).body(r#"{"screen_name":"jack"}"#);
        })
        .await;

    let store = Arc::new(MemoryStore::default());
    store.save(NewCredential::new("jack", "tok-j", "sec-j"));
    let app = app_with(store.clone());

    let target = server.url("/1.1/account/verify_credentials.json");
    let (status, body) = get(
        &app,
        &retrieve_uri(&[("screenname", "jack"), ("url-to-fetch", target.as_str())]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"screen_name":"jack"}"#);
    assert_eq!(store.lookup_count(), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn unregistered_user_gets_sentinel_and_no_fetch() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/resource");
            then.status(200).body("should not be fetched");
        })
        .await;

    let app = app_with(Arc::new(MemoryStore::default()));
    let target = server.url("/resource");
    let (status, body) = get(
        &app,
        &retrieve_uri(&[("screenname", "nobody"), ("url-to-fetch", target.as_str())]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, CREDENTIALS_NOT_FOUND);
    mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn legacy_twitterurl_parameter_is_accepted() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/legacy");
            then.status(200).body("legacy body");
        })
        .await;

    let store = Arc::new(MemoryStore::default());
    store.save(NewCredential::new("jack", "tok-j", "sec-j"));
    let app = app_with(store);

    let target = server.url("/legacy");
    let (status, body) = get(
        &app,
        &retrieve_uri(&[("screenname", "jack"), ("twitterurl", target.as_str())]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "legacy body");
    mock.assert_async().await;
}

#[tokio::test]
async fn missing_screenname_returns_no_content_without_lookup() {
    let store = Arc::new(MemoryStore::default());
    let app = app_with(store.clone());

    let (status, body) = get(
        &app,
        &retrieve_uri(&[("url-to-fetch", "https://api.twitter.com/1.1/x.json")]),
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
    assert_eq!(store.lookup_count(), 0);

    let (status, _) = get(&app, "/retrieve").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(store.lookup_count(), 0);
}

#[tokio::test]
async fn registered_user_with_bad_url_is_a_bad_request() {
    let store = Arc::new(MemoryStore::default());
    store.save(NewCredential::new("jack", "tok-j", "sec-j"));
    let app = app_with(store.clone());

    let (status, body) = get(&app, &retrieve_uri(&[("screenname", "jack")])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains(r#""code":"MISSING_PARAMETER""#));

    for bad in ["not a url", "ftp://example.com/file.txt"] {
        let (status, body) = get(
            &app,
            &retrieve_uri(&[("screenname", "jack"), ("url-to-fetch", bad)]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains(r#""code":"INVALID_URL""#));
    }
    assert_eq!(store.lookup_count(), 3);
}

#[tokio::test]
async fn unregistered_user_gets_sentinel_for_any_url() {
    let store = Arc::new(MemoryStore::default());
    let app = app_with(store.clone());

    let (status, body) = get(&app, &retrieve_uri(&[("screenname", "nobody")])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, CREDENTIALS_NOT_FOUND);

    for bad in ["not a url", "ftp://example.com/file.txt"] {
        let (status, body) = get(
            &app,
            &retrieve_uri(&[("screenname", "nobody"), ("url-to-fetch", bad)]),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, CREDENTIALS_NOT_FOUND);
    }
    assert_eq!(store.lookup_count(), 3);
}

#[tokio::test]
async fn store_failure_is_distinct_from_sentinel() {
    let app = app_with(Arc::new(UnavailableStore));

    let (status, body) = get(
        &app,
        &retrieve_uri(&[
            ("screenname", "jack"),
            ("url-to-fetch", "https://api.twitter.com/1.1/x.json"),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains(r#""code":"INTERNAL_ERROR""#));
    assert_ne!(body, CREDENTIALS_NOT_FOUND);
}

#[tokio::test]
async fn upstream_rejection_is_reported() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/forbidden");
            then.status(403).body("nope");
        })
        .await;

    let store = Arc::new(MemoryStore::default());
    store.save(NewCredential::new("jack", "tok-j", "sec-j"));
    let app = app_with(store);

    let target = server.url("/forbidden");
    let (status, body) = get(
        &app,
        &retrieve_uri(&[("screenname", "jack"), ("url-to-fetch", target.as_str())]),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains(r#""code":"FORBIDDEN""#));
    mock.assert_async().await;
}

#[tokio::test]
async fn health_endpoint_answers() {
    let app = app_with(Arc::new(MemoryStore::default()));
    let (status, body) = get(&app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}
