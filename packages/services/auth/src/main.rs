//! simple-micro-auth 서버
//!
//! 인증 정보 생성/변경/삭제/비교와 토큰 갱신을 JSON over HTTP로 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "sma_auth=debug,sma_core=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 설정 로드 (서명 키는 Debug 출력에서 가려짐)
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        persistent = config.database_url.is_some(),
        bcrypt_cost = config.bcrypt_cost,
        token_ttl = %humantime::format_duration(config.token_ttl),
        algorithm = ?config.signing.algorithm(),
        "Starting simple-micro-auth"
    );

    // 앱 상태 초기화
    let state = Arc::new(AppState::new(&config).await?);

    // 서버 시작
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));

    // 라우터 구성
    let app = create_router(state);
    tracing::info!("simple-micro-auth listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("simple-micro-auth stopped");
    Ok(())
}

/// 라우터 생성
fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth/create", post(handlers::auth::create_auth))
        .route("/auth/update", post(handlers::auth::update_auth))
        .route("/auth/delete", post(handlers::auth::delete_auth))
        .route("/auth/compare", post(handlers::auth::compare_auth))
        .route("/auth/refresh", post(handlers::auth::refresh_auth))
        // Health check
        .route("/health", get(handlers::health::health_check))
        .fallback(handlers::not_found)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(from_fn(middleware::request_id))
        // State
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("shutdown signal received");
}
