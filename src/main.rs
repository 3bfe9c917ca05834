use mimalloc::MiMalloc;
use resource_retriever::api::fetcher::OAuthFetcher;
use resource_retriever::config::Config;
use resource_retriever::db::CredentialsStorage;
use resource_retriever::oauth::{ConsumerCredentials, HmacSha1Signer};
use resource_retriever::router::{RetrieverState, retriever_router};
use resource_retriever::service::{ResourceRetriever, credential_loader};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.store.database_url,
        proxy = %cfg.provider.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        loglevel = %cfg.basic.loglevel,
        consumer_key = %cfg.provider.consumer_key
    );

    let storage = CredentialsStorage::connect(&cfg.store.database_url).await?;
    storage.init_schema().await?;

    if let Some(cred_path) = cfg.store.cred_path.as_ref() {
        match credential_loader::load_from_dir(cred_path) {
            Ok(creds) if !creds.is_empty() => {
                let count = creds.len();
                storage.save_many(creds).await?;
                info!(path = %cred_path.display(), count, "saved credentials loaded from filesystem");
            }
            Ok(_) => {
                info!(path = %cred_path.display(), "no credential files discovered");
            }
            Err(e) => {
                warn!(
                    path = %cred_path.display(),
                    error = %e,
                    "failed to load credentials from directory"
                );
            }
        }
    }

    let signer = HmacSha1Signer::new(ConsumerCredentials::new(
        cfg.provider.consumer_key.clone(),
        cfg.provider.consumer_secret.clone(),
    ));
    let client = OAuthFetcher::build_client(&cfg.provider)?;
    let fetcher = OAuthFetcher::new(client, Arc::new(signer));
    let retriever = ResourceRetriever::new(Arc::new(storage), Arc::new(fetcher));

    let app = retriever_router(RetrieverState::new(retriever));

    let listener = TcpListener::bind(cfg.basic.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.basic.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
