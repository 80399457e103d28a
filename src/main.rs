use clap::Parser;
use dotenvy::dotenv;
use rust_s3_gateway::config::{ServiceConfig, StorageConfig};
use rust_s3_gateway::infrastructure::storage;
use rust_s3_gateway::services::file_service::FileService;
use rust_s3_gateway::services::storage::StorageService;
use rust_s3_gateway::utils::auth::{AcceptAllTokens, JwtTokenValidator, TokenValidator};
use rust_s3_gateway::{AppState, create_app};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port for the API server
    #[arg(short, long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_s3_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting S3 gateway...");

    let storage_config = StorageConfig::from_env()?;
    let service_config = ServiceConfig::from_env(&storage_config)?;
    info!(
        "🛠️  Service Config: Max Size={}MB, Key Strategy={:?}, Return URL={}",
        service_config.max_file_size / 1024 / 1024,
        service_config.key_strategy,
        service_config.return_url
    );

    let token_validator: Arc<dyn TokenValidator> = match &service_config.download_token_secret {
        Some(secret) => {
            info!("🔐 Download tokens are validated as HS256 JWTs");
            Arc::new(JwtTokenValidator::new(secret))
        }
        None => {
            warn!(
                "⚠️  DOWNLOAD_TOKEN_SECRET is not set: GET /{{filePath}}/{{token}} accepts any token"
            );
            Arc::new(AcceptAllTokens)
        }
    };

    let storage_service = storage::setup_storage(&storage_config).await;
    match storage_service.check_connection().await {
        Ok(()) => info!("✅ Bucket '{}' is reachable", storage_service.bucket()),
        Err(e) => warn!(
            "⚠️  Bucket '{}' is not reachable yet: {:#}",
            storage_service.bucket(),
            e
        ),
    }

    let file_service = Arc::new(FileService::new(
        storage_service.clone(),
        token_validator,
        &service_config,
    ));

    let state = AppState {
        storage: storage_service,
        file_service,
        config: service_config,
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::http::Request<_>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        })
        .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
            info!("📥 {} {}", request.method(), request.uri());
        })
        .on_response(
            |response: &axum::http::Response<_>,
             latency: std::time::Duration,
             _span: &tracing::Span| {
                info!(
                    "📤 Finished in {:?} with status {}",
                    latency,
                    response.status()
                );
            },
        );

    let app = create_app(state).layer(trace_layer);
    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("✅ Server ready at http://{}", addr);
    info!("📖 Swagger UI: http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("🛑 Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, starting graceful shutdown...");
        },
    }
}
