use civicms::{
    build_router, create_s3_client, ensure_tables, registry, AppConfig, AppState, S3BlobStore,
    TokenSigner,
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("civicms=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    let registry = Arc::new(registry());
    ensure_tables(&pool, &registry).await?;

    let s3 = create_s3_client(config.s3_endpoint.as_deref(), &config.s3_region).await;
    let state = AppState {
        pool,
        registry,
        blobs: Arc::new(S3BlobStore::new(s3, config.s3_bucket.clone())),
        tokens: TokenSigner::new(config.auth_secret.clone()),
    };

    let app = build_router(state, config.cors_origin.as_deref());
    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!("civicms listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
