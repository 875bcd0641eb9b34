/// HTTP surface for the compliance pipeline
mod error;
mod routes;

pub use routes::{build_router, AppState, ComplianceResponse};

use log::info;

pub async fn serve(listen_addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!("API server running on {}", listen_addr);
    axum::serve(listener, build_router(state)).await
}
